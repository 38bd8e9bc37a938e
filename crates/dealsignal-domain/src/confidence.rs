//! Confidence scoring for extracted signals
//!
//! A signal's confidence is the product of a method multiplier and the trust
//! weight of the document it came from. AI extraction uses a single fixed
//! multiplier; rule-based extraction uses a lower, per-category one.

use std::fmt;

/// Multiplier applied to every signal produced by the LLM path
pub const AI_MULTIPLIER: f64 = 0.85;

/// Rule-based multiplier for market size signals
pub const MARKET_SIZE_MULTIPLIER: f64 = 0.7;

/// Rule-based multiplier for growth rate signals
pub const GROWTH_RATE_MULTIPLIER: f64 = 0.75;

/// Rule-based multiplier for risk signals
pub const RISK_MULTIPLIER: f64 = 0.6;

/// Rule-based multiplier for trend signals
pub const TREND_MULTIPLIER: f64 = 0.65;

/// Signals strictly above this score count as high confidence
pub const HIGH_CONFIDENCE_THRESHOLD: f64 = 0.7;

/// Trust weight of a source document, always within [0.0, 1.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct SourceWeight(f64);

impl SourceWeight {
    /// Full trust
    pub const FULL: SourceWeight = SourceWeight(1.0);

    /// Create a weight, clamping into [0.0, 1.0]
    ///
    /// NaN is treated as zero trust.
    ///
    /// # Examples
    ///
    /// ```
    /// use dealsignal_domain::SourceWeight;
    ///
    /// assert_eq!(SourceWeight::new(1.4).value(), 1.0);
    /// assert_eq!(SourceWeight::new(-0.2).value(), 0.0);
    /// assert_eq!(SourceWeight::new(0.8).value(), 0.8);
    /// ```
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self(0.0);
        }
        Self(value.clamp(0.0, 1.0))
    }

    /// Get the raw weight
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Score a signal produced with the given method multiplier
    pub fn score(&self, multiplier: f64) -> f64 {
        (multiplier * self.0).clamp(0.0, 1.0)
    }
}

impl Default for SourceWeight {
    fn default() -> Self {
        Self::FULL
    }
}

impl fmt::Display for SourceWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ai_multiplier_dominates_rule_multipliers() {
        for m in [
            MARKET_SIZE_MULTIPLIER,
            GROWTH_RATE_MULTIPLIER,
            RISK_MULTIPLIER,
            TREND_MULTIPLIER,
        ] {
            assert!(m < AI_MULTIPLIER);
        }
    }

    #[test]
    fn test_nan_weight_is_zero() {
        assert_eq!(SourceWeight::new(f64::NAN).value(), 0.0);
    }

    #[test]
    fn test_score_is_product() {
        let w = SourceWeight::new(0.8);
        assert_eq!(w.score(AI_MULTIPLIER), 0.85 * 0.8);
        assert_eq!(w.score(RISK_MULTIPLIER), 0.6 * 0.8);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: scores always stay inside [0, 1]
        #[test]
        fn test_score_in_unit_interval(w in -2.0f64..3.0, m in 0.0f64..1.0) {
            let score = SourceWeight::new(w).score(m);
            prop_assert!((0.0..=1.0).contains(&score));
        }

        /// Property: for any positive weight the AI path outranks every rule category
        #[test]
        fn test_ai_strictly_higher(w in 0.001f64..=1.0) {
            let weight = SourceWeight::new(w);
            let ai = weight.score(AI_MULTIPLIER);
            prop_assert!(ai > weight.score(MARKET_SIZE_MULTIPLIER));
            prop_assert!(ai > weight.score(GROWTH_RATE_MULTIPLIER));
            prop_assert!(ai > weight.score(RISK_MULTIPLIER));
            prop_assert!(ai > weight.score(TREND_MULTIPLIER));
        }
    }
}

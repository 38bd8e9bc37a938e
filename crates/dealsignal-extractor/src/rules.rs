//! Rule-based signal extraction over the pattern table

use crate::patterns::{self, SignalPattern};
use dealsignal_domain::{ExtractedSignal, ExtractionMethod, SignalType, SourceWeight};
use std::ops::Range;
use tracing::debug;

/// Deterministic extractor driven by an ordered pattern table
///
/// Every match of every row produces one signal, except that a row never
/// re-emits a span already claimed by an earlier row of the same signal type.
/// Rows of different types may overlap freely.
#[derive(Debug, Clone)]
pub struct RuleBasedExtractor {
    patterns: Vec<SignalPattern>,
}

impl Default for RuleBasedExtractor {
    fn default() -> Self {
        Self::with_patterns(patterns::signal_patterns().to_vec())
    }
}

impl RuleBasedExtractor {
    /// Extractor over the built-in pattern table
    pub fn new() -> Self {
        Self::default()
    }

    /// Extractor over a custom pattern table
    pub fn with_patterns(patterns: Vec<SignalPattern>) -> Self {
        Self { patterns }
    }

    /// The table this extractor evaluates, in order
    pub fn patterns(&self) -> &[SignalPattern] {
        &self.patterns
    }

    /// Extract signals from `text`; unmatched text yields an empty list
    pub fn extract(&self, text: &str, source_weight: SourceWeight) -> Vec<ExtractedSignal> {
        let mut signals = Vec::new();
        let mut claimed: Vec<(SignalType, Range<usize>)> = Vec::new();

        for pattern in &self.patterns {
            for caps in pattern.regex.captures_iter(text) {
                let Some(whole) = caps.get(0) else {
                    continue;
                };
                let span = whole.range();
                let overlaps = claimed.iter().any(|(signal_type, taken)| {
                    *signal_type == pattern.signal_type
                        && taken.start < span.end
                        && span.start < taken.end
                });
                if overlaps {
                    continue;
                }
                claimed.push((pattern.signal_type, span.clone()));

                let raw_text = whole.as_str().trim();
                let mut signal = ExtractedSignal::new(
                    pattern.signal_type,
                    raw_text,
                    source_weight.score(pattern.multiplier),
                    ExtractionMethod::RuleBased,
                );
                signal.signal_category = Some(pattern.category.to_string());
                let (value, unit) = pattern.captures.apply(&caps);
                signal.normalized_value = value;
                signal.unit = unit;
                signal.timeframe = patterns::find_timeframe(raw_text);

                let sentence = sentence_around(text, span);
                signal.sector =
                    patterns::first_label(patterns::sectors(), sentence).map(str::to_string);
                signal.geography =
                    patterns::first_label(patterns::geographies(), sentence).map(str::to_string);

                signals.push(signal);
            }
        }

        debug!(count = signals.len(), "Rule-based extraction finished");
        signals
    }
}

/// The sentence enclosing `span`, bounded by `.`/`!`/`?` + whitespace or newlines
fn sentence_around(text: &str, span: Range<usize>) -> &str {
    let bytes = text.as_bytes();
    let is_break = |i: usize| -> bool {
        match bytes[i] {
            b'\n' => true,
            b'.' | b'!' | b'?' => bytes.get(i + 1).map_or(true, |b| b.is_ascii_whitespace()),
            _ => false,
        }
    };

    let start = (0..span.start)
        .rev()
        .find(|&i| is_break(i))
        .map_or(0, |i| i + 1);
    let end = (span.end..bytes.len())
        .find(|&i| is_break(i))
        .map_or(bytes.len(), |i| i + 1);

    // Breaks are ASCII, so both bounds sit on char boundaries
    &text[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use dealsignal_domain::confidence::{
        GROWTH_RATE_MULTIPLIER, MARKET_SIZE_MULTIPLIER, RISK_MULTIPLIER, TREND_MULTIPLIER,
    };
    use proptest::prelude::*;

    fn extract(text: &str) -> Vec<ExtractedSignal> {
        RuleBasedExtractor::new().extract(text, SourceWeight::FULL)
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn test_market_acronyms_are_case_sensitive() {
        let signals = extract("Sam joined the board after the company raised $20 million.");
        assert!(signals.iter().all(|s| s.signal_type != SignalType::MarketSize));

        let signals = extract("Our tam and som estimates are $3 billion and $40 million.");
        assert!(signals.iter().all(|s| s.signal_type != SignalType::MarketSize));

        let signals = extract("We size the SAM at $12 billion.");
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].signal_category.as_deref(), Some("SAM"));
        assert_eq!(signals[0].unit.as_deref(), Some("$B"));
    }

    #[test]
    fn test_market_size_example() {
        let signals = extract("The global AI market is projected to reach $407 billion by 2027");

        assert_eq!(signals.len(), 1);
        let s = &signals[0];
        assert_eq!(s.signal_type, SignalType::MarketSize);
        assert_eq!(s.signal_category.as_deref(), Some("TAM"));
        assert_eq!(s.normalized_value.as_deref(), Some("407"));
        assert_eq!(s.unit.as_deref(), Some("$B"));
        assert_eq!(s.timeframe.as_deref(), Some("2027"));
        assert_eq!(s.sector.as_deref(), Some("AI"));
        assert_eq!(s.geography.as_deref(), Some("Global"));
        assert_eq!(s.method, ExtractionMethod::RuleBased);
        assert_close(s.confidence_score, MARKET_SIZE_MULTIPLIER);
    }

    #[test]
    fn test_cagr_example() {
        let signals = extract("CAGR of 23.5%");

        assert_eq!(signals.len(), 1);
        let s = &signals[0];
        assert_eq!(s.signal_type, SignalType::GrowthRate);
        assert_eq!(s.signal_category.as_deref(), Some("CAGR"));
        assert_eq!(s.normalized_value.as_deref(), Some("23.5"));
        assert_eq!(s.unit.as_deref(), Some("%"));
        assert_close(s.confidence_score, GROWTH_RATE_MULTIPLIER);
    }

    #[test]
    fn test_unmatched_text_is_empty() {
        assert!(extract("We had a lovely offsite and planned next quarter.").is_empty());
        assert!(extract("").is_empty());
    }

    #[test]
    fn test_same_type_overlap_is_deduplicated() {
        // Matches both the TAM row and the generic market row
        let signals = extract("Our total addressable market is $50B across payments.");
        let market: Vec<_> = signals
            .iter()
            .filter(|s| s.signal_type == SignalType::MarketSize)
            .collect();
        assert_eq!(market.len(), 1);
        assert_eq!(market[0].raw_text, "total addressable market is $50B");
        assert_eq!(market[0].sector.as_deref(), Some("Fintech"));
    }

    #[test]
    fn test_different_types_are_not_deduplicated() {
        let signals = extract("Market volatility aside, the market could hit $3 trillion.");
        let types: Vec<SignalType> = signals.iter().map(|s| s.signal_type).collect();
        assert!(types.contains(&SignalType::Risk));
        assert!(types.contains(&SignalType::MarketSize));
    }

    #[test]
    fn test_year_range_backfill() {
        let signals = extract("The segment shows a CAGR of 12% over 2024-2030 in Europe.");
        assert_eq!(signals.len(), 1);
        // The match span stops at the percentage, so no year inside it
        assert_eq!(signals[0].timeframe, None);
        assert_eq!(signals[0].geography.as_deref(), Some("Europe"));

        let signals = extract("The TAM for 2024-2030 is $12 billion");
        assert_eq!(signals[0].timeframe.as_deref(), Some("2024-2030"));
    }

    #[test]
    fn test_risk_and_trend_confidence() {
        let weight = SourceWeight::new(0.5);
        let signals = RuleBasedExtractor::new().extract(
            "Regulatory risk remains high. We see growing demand for embedded finance.",
            weight,
        );
        let risk = signals.iter().find(|s| s.signal_type == SignalType::Risk).unwrap();
        let trend = signals.iter().find(|s| s.signal_type == SignalType::Trend).unwrap();

        assert_eq!(risk.signal_category.as_deref(), Some("regulatory"));
        assert_close(risk.confidence_score, RISK_MULTIPLIER * 0.5);
        assert_eq!(trend.raw_text, "growing demand for embedded finance");
        assert_close(trend.confidence_score, TREND_MULTIPLIER * 0.5);
    }

    #[test]
    fn test_multiple_matches_of_one_row() {
        let signals = extract("Revenue grew 40% YoY while users grew 25% YoY.");
        let yoy: Vec<_> = signals
            .iter()
            .filter(|s| s.signal_category.as_deref() == Some("YoY"))
            .collect();
        assert_eq!(yoy.len(), 2);
        assert_eq!(yoy[0].normalized_value.as_deref(), Some("40"));
        assert_eq!(yoy[1].normalized_value.as_deref(), Some("25"));
    }

    #[test]
    fn test_custom_table() {
        let row = SignalPattern::new(
            SignalType::Trend,
            "custom",
            r"(?i)\bvertical ai\b",
            crate::patterns::CaptureMapping::None,
            TREND_MULTIPLIER,
        )
        .unwrap();
        let extractor = RuleBasedExtractor::with_patterns(vec![row]);
        let signals = extractor.extract("Vertical AI is everywhere", SourceWeight::FULL);
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].signal_category.as_deref(), Some("custom"));
    }

    #[test]
    fn test_sentence_around() {
        let text = "First one. The market is $5B here. Last.";
        let start = text.find("market").unwrap();
        let sentence = sentence_around(text, start..start + 6);
        assert_eq!(sentence.trim(), "The market is $5B here.");
    }

    proptest! {
        #[test]
        fn prop_rule_confidence_is_multiplier_times_weight(weight in 0.0f64..=1.0) {
            let text = "The TAM is $4.5 billion. CAGR of 18%. Key risks include churn. \
                        Rising adoption of AI agents.";
            let signals = RuleBasedExtractor::new().extract(text, SourceWeight::new(weight));
            prop_assert!(!signals.is_empty());
            for s in signals {
                let expected = s.signal_type.rule_multiplier() * weight;
                prop_assert!((s.confidence_score - expected).abs() < 1e-12);
                prop_assert!((0.0..=1.0).contains(&s.confidence_score));
            }
        }

        #[test]
        fn prop_never_panics(text in "\\PC{0,300}") {
            let _ = RuleBasedExtractor::new().extract(&text, SourceWeight::FULL);
        }
    }
}

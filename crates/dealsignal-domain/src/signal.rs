//! Signal module - typed observations extracted from source documents

use crate::confidence::{
    GROWTH_RATE_MULTIPLIER, MARKET_SIZE_MULTIPLIER, RISK_MULTIPLIER, TREND_MULTIPLIER,
};
use crate::document::DocumentId;
use std::fmt;
use std::str::FromStr;

/// Unique identifier for a signal based on UUIDv7
///
/// UUIDv7 keeps identifiers sortable by creation time, which the store uses
/// as a tie-breaker when listing recent signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SignalId(u128);

impl SignalId {
    /// Generate a new UUIDv7-based SignalId
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create a SignalId from a raw u128 value (storage deserialization)
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse a SignalId from its hyphenated string form
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid signal id: {}", e))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl Default for SignalId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SignalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

/// Category of an extracted signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SignalType {
    /// Market sizing (TAM / SAM / SOM)
    MarketSize,
    /// Growth figures (CAGR, year-over-year)
    GrowthRate,
    /// Risks and headwinds
    Risk,
    /// Market or adoption trends
    Trend,
}

impl SignalType {
    /// All signal types, in pattern-table order
    pub const ALL: [SignalType; 4] = [
        SignalType::MarketSize,
        SignalType::GrowthRate,
        SignalType::Risk,
        SignalType::Trend,
    ];

    /// Stable string form used in storage and LLM output
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalType::MarketSize => "market_size",
            SignalType::GrowthRate => "growth_rate",
            SignalType::Risk => "risk",
            SignalType::Trend => "trend",
        }
    }

    /// Parse a signal type, accepting a few spellings LLMs commonly produce
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "market_size" | "marketsize" | "market" => Some(SignalType::MarketSize),
            "growth_rate" | "growthrate" | "growth" => Some(SignalType::GrowthRate),
            "risk" | "risks" => Some(SignalType::Risk),
            "trend" | "trends" => Some(SignalType::Trend),
            _ => None,
        }
    }

    /// Fixed confidence multiplier for rule-based extraction of this type
    pub fn rule_multiplier(&self) -> f64 {
        match self {
            SignalType::MarketSize => MARKET_SIZE_MULTIPLIER,
            SignalType::GrowthRate => GROWTH_RATE_MULTIPLIER,
            SignalType::Risk => RISK_MULTIPLIER,
            SignalType::Trend => TREND_MULTIPLIER,
        }
    }
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignalType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Unknown signal type: {}", s))
    }
}

/// How a signal was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtractionMethod {
    /// Structured output from the language model
    Ai,
    /// Pattern-library match
    RuleBased,
}

impl ExtractionMethod {
    /// Stable string form used in storage
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMethod::Ai => "ai",
            ExtractionMethod::RuleBased => "rule_based",
        }
    }

    /// Parse a stored method string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ai" => Some(ExtractionMethod::Ai),
            "rule_based" => Some(ExtractionMethod::RuleBased),
            _ => None,
        }
    }
}

/// A signal candidate before it is attached to a document
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedSignal {
    /// Signal category
    pub signal_type: SignalType,
    /// Sub-type such as TAM or CAGR
    pub signal_category: Option<String>,
    /// Verbatim span the signal was read from
    pub raw_text: String,
    /// Numeric value as written, without grouping separators
    pub normalized_value: Option<String>,
    /// Unit of `normalized_value` (`$B`, `$M`, `$T`, `%`)
    pub unit: Option<String>,
    /// Industry sector, if known
    pub sector: Option<String>,
    /// Geography, if known
    pub geography: Option<String>,
    /// Year or year range the signal refers to
    pub timeframe: Option<String>,
    /// Score in [0, 1]
    pub confidence_score: f64,
    /// Extraction method
    pub method: ExtractionMethod,
}

impl ExtractedSignal {
    /// Create a bare signal with only type, text, score and method set
    pub fn new(
        signal_type: SignalType,
        raw_text: impl Into<String>,
        confidence_score: f64,
        method: ExtractionMethod,
    ) -> Self {
        Self {
            signal_type,
            signal_category: None,
            raw_text: raw_text.into(),
            normalized_value: None,
            unit: None,
            sector: None,
            geography: None,
            timeframe: None,
            confidence_score,
            method,
        }
    }
}

/// A persisted signal
///
/// Signals are immutable once created; re-processing a document deletes its
/// previous signals and inserts new ones.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    /// Unique identifier
    pub id: SignalId,
    /// Owning document
    pub document_id: DocumentId,
    /// Signal category
    pub signal_type: SignalType,
    /// Sub-type such as TAM or CAGR
    pub signal_category: Option<String>,
    /// Verbatim span
    pub raw_text: String,
    /// Numeric value
    pub normalized_value: Option<String>,
    /// Unit of the value
    pub unit: Option<String>,
    /// Industry sector
    pub sector: Option<String>,
    /// Geography
    pub geography: Option<String>,
    /// Year or year range
    pub timeframe: Option<String>,
    /// Score in [0, 1]
    pub confidence_score: f64,
    /// Extraction method
    pub method: ExtractionMethod,
    /// Creation time (ms since Unix epoch)
    pub created_at: u64,
}

impl Signal {
    /// Attach an extracted candidate to a document
    pub fn from_extracted(document_id: DocumentId, extracted: ExtractedSignal, created_at: u64) -> Self {
        Self {
            id: SignalId::new(),
            document_id,
            signal_type: extracted.signal_type,
            signal_category: extracted.signal_category,
            raw_text: extracted.raw_text,
            normalized_value: extracted.normalized_value,
            unit: extracted.unit,
            sector: extracted.sector,
            geography: extracted.geography,
            timeframe: extracted.timeframe,
            confidence_score: extracted.confidence_score,
            method: extracted.method,
            created_at,
        }
    }
}

//! The pattern library
//!
//! Signal patterns are data: an ordered table of `{type, category, regex,
//! capture mapping, multiplier}` rows. The rule-based extractor walks the table
//! in order and never needs to know what an individual row matches. Profile
//! patterns (AUM, check size, stages, contacts, social links) and the keyword
//! tables for sectors and geographies live here as well.
//!
//! Regexes are compiled lazily. A row whose regex fails to compile is dropped
//! from the table rather than panicking. The tests pin the table size.

use dealsignal_domain::confidence::{
    GROWTH_RATE_MULTIPLIER, MARKET_SIZE_MULTIPLIER, RISK_MULTIPLIER, TREND_MULTIPLIER,
};
use dealsignal_domain::SignalType;
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Money amount followed by a scale word, shared by market-size and AUM rows
const AMOUNT: &str = r"\$\s?(\d+(?:,\d{3})*(?:\.\d+)?)\s*(trillion|billion|million|tn|bn|mn|mm|t|b|m)\b";

/// How a row's capture groups map onto `normalized_value` / `unit`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMapping {
    /// Keyword match only; no value
    None,
    /// Amount in group `value`, scale word in group `unit` (normalized to $B/$M/$T)
    MarketAmount {
        /// Capture group holding the number
        value: usize,
        /// Capture group holding the scale word
        unit: usize,
    },
    /// Percentage in group `value`; unit is always `%`
    Percent {
        /// Capture group holding the number
        value: usize,
    },
}

impl CaptureMapping {
    /// Resolve `(normalized_value, unit)` from a match
    pub fn apply(&self, caps: &Captures<'_>) -> (Option<String>, Option<String>) {
        match *self {
            CaptureMapping::None => (None, None),
            CaptureMapping::MarketAmount { value, unit } => {
                let value = caps.get(value).map(|m| m.as_str().replace(',', ""));
                let unit = caps
                    .get(unit)
                    .and_then(|m| normalize_market_unit(m.as_str()))
                    .map(str::to_string);
                (value, unit)
            }
            CaptureMapping::Percent { value } => (
                caps.get(value).map(|m| m.as_str().to_string()),
                Some("%".to_string()),
            ),
        }
    }
}

/// One row of the signal pattern table
#[derive(Debug, Clone)]
pub struct SignalPattern {
    /// Signal type emitted on match
    pub signal_type: SignalType,
    /// Sub-category (TAM, CAGR, regulatory, ...)
    pub category: &'static str,
    /// Compiled expression
    pub regex: Regex,
    /// Capture group mapping
    pub captures: CaptureMapping,
    /// Multiplier applied to the source weight
    pub multiplier: f64,
}

impl SignalPattern {
    /// Compile a row; `None` if the expression is invalid
    pub fn new(
        signal_type: SignalType,
        category: &'static str,
        pattern: &str,
        captures: CaptureMapping,
        multiplier: f64,
    ) -> Option<Self> {
        Regex::new(pattern).ok().map(|regex| Self {
            signal_type,
            category,
            regex,
            captures,
            multiplier,
        })
    }
}

/// Map a market-size scale token to `$B`, `$M` or `$T`
///
/// Total over the recognized tokens and idempotent: an already-normalized
/// unit maps to itself.
///
/// ```
/// use dealsignal_extractor::patterns::normalize_market_unit;
///
/// assert_eq!(normalize_market_unit("billion"), Some("$B"));
/// assert_eq!(normalize_market_unit("mm"), Some("$M"));
/// assert_eq!(normalize_market_unit("$T"), Some("$T"));
/// assert_eq!(normalize_market_unit("kg"), None);
/// ```
pub fn normalize_market_unit(token: &str) -> Option<&'static str> {
    let token = token.trim();
    let token = token.strip_prefix('$').unwrap_or(token);
    match token.to_ascii_lowercase().as_str() {
        "trillion" | "tn" | "t" => Some("$T"),
        "billion" | "bn" | "b" => Some("$B"),
        "million" | "mn" | "mm" | "m" => Some("$M"),
        _ => None,
    }
}

fn amount_after(lead: &str) -> String {
    format!(r"(?i)\b{lead}\b[^.$\n]{{0,60}}?{AMOUNT}")
}

static SIGNAL_PATTERNS: LazyLock<Vec<SignalPattern>> = LazyLock::new(|| {
    use CaptureMapping::{MarketAmount, None as Keyword, Percent};
    use SignalType::*;

    let amount = MarketAmount { value: 1, unit: 2 };
    let rows = [
        // Market size
        SignalPattern::new(
            MarketSize,
            "TAM",
            &amount_after("(?:(?-i:TAM)|total addressable market)"),
            amount,
            MARKET_SIZE_MULTIPLIER,
        ),
        SignalPattern::new(
            MarketSize,
            "SAM",
            &amount_after("(?:(?-i:SAM)|serviceable addressable market|serviceable available market)"),
            amount,
            MARKET_SIZE_MULTIPLIER,
        ),
        SignalPattern::new(
            MarketSize,
            "SOM",
            &amount_after("(?:(?-i:SOM)|serviceable obtainable market)"),
            amount,
            MARKET_SIZE_MULTIPLIER,
        ),
        SignalPattern::new(
            MarketSize,
            "TAM",
            &format!(r"{}(?:\s+by\s+20\d{{2}})?", amount_after("market")),
            amount,
            MARKET_SIZE_MULTIPLIER,
        ),
        // Growth rate
        SignalPattern::new(
            GrowthRate,
            "CAGR",
            r"(?i)\bCAGR\b\s*(?:of\s+|at\s+|:\s*)?(?:approximately\s+|about\s+|~\s*)?(\d+(?:\.\d+)?)\s?%",
            Percent { value: 1 },
            GROWTH_RATE_MULTIPLIER,
        ),
        SignalPattern::new(
            GrowthRate,
            "CAGR",
            r"(?i)(\d+(?:\.\d+)?)\s?%\s+(?:CAGR|compound annual growth(?: rate)?)\b",
            Percent { value: 1 },
            GROWTH_RATE_MULTIPLIER,
        ),
        SignalPattern::new(
            GrowthRate,
            "YoY",
            r"(?i)(\d+(?:\.\d+)?)\s?%\s+(?:YoY|year[- ]over[- ]year)\b",
            Percent { value: 1 },
            GROWTH_RATE_MULTIPLIER,
        ),
        SignalPattern::new(
            GrowthRate,
            "growth",
            r"(?i)\bgrow(?:s|ing|th)?\s+(?:at\s+|of\s+|by\s+)?(\d+(?:\.\d+)?)\s?%",
            Percent { value: 1 },
            GROWTH_RATE_MULTIPLIER,
        ),
        // Risk
        SignalPattern::new(
            Risk,
            "regulatory",
            r"(?i)\b(?:regulatory|regulation|compliance)\s+(?:risks?|uncertainty|headwinds?|scrutiny)\b",
            Keyword,
            RISK_MULTIPLIER,
        ),
        SignalPattern::new(
            Risk,
            "competitive",
            r"(?i)\b(?:competitive|competition)\s+(?:risks?|pressures?|threats?)\b",
            Keyword,
            RISK_MULTIPLIER,
        ),
        SignalPattern::new(
            Risk,
            "market",
            r"(?i)\b(?:market|macro(?:economic)?)\s+(?:risks?|volatility|downturns?|uncertainty)\b",
            Keyword,
            RISK_MULTIPLIER,
        ),
        SignalPattern::new(
            Risk,
            "general",
            r"(?i)\b(?:key|significant|major|material)\s+risks?\b",
            Keyword,
            RISK_MULTIPLIER,
        ),
        // Trend
        SignalPattern::new(
            Trend,
            "adoption",
            r"(?i)\b(?:emerging|growing|rising|increasing|accelerating)\s+(?:trend|demand|adoption|interest)\b(?:\s+(?:in|for|of)\s+[A-Za-z][\w-]*(?:\s+[A-Za-z][\w-]*)?)?",
            Keyword,
            TREND_MULTIPLIER,
        ),
        SignalPattern::new(
            Trend,
            "shift",
            r"(?i)\bshift\s+(?:to|towards?)\s+[A-Za-z][\w-]*(?:\s+[A-Za-z][\w-]*)?",
            Keyword,
            TREND_MULTIPLIER,
        ),
    ];
    rows.into_iter().flatten().collect()
});

/// Number of rows in the built-in signal table
pub const SIGNAL_PATTERN_COUNT: usize = 14;

/// The built-in signal pattern table, in evaluation order
pub fn signal_patterns() -> &'static [SignalPattern] {
    &SIGNAL_PATTERNS
}

/// A named keyword pattern (sectors, geographies, stages)
#[derive(Debug, Clone)]
pub struct KeywordPattern {
    /// Canonical label
    pub label: &'static str,
    /// Compiled expression
    pub regex: Regex,
}

fn keyword_table(rows: &[(&'static str, &str)]) -> Vec<KeywordPattern> {
    rows.iter()
        .filter_map(|&(label, pattern)| {
            Regex::new(pattern)
                .ok()
                .map(|regex| KeywordPattern { label, regex })
        })
        .collect()
}

static SECTORS: LazyLock<Vec<KeywordPattern>> = LazyLock::new(|| {
    keyword_table(&[
        ("AI", r"(?i)\b(?:AI|artificial intelligence|machine learning|generative AI)\b"),
        ("Fintech", r"(?i)\b(?:fintech|financial technology|payments|insurtech)\b"),
        ("Healthcare", r"(?i)\b(?:healthcare|health ?tech|digital health|medtech)\b"),
        ("Biotech", r"(?i)\b(?:biotech|biotechnology|life sciences)\b"),
        ("Climate", r"(?i)\b(?:climate|clean ?tech|renewable energy|decarboni[sz]ation)\b"),
        ("SaaS", r"(?i)\b(?:SaaS|software[- ]as[- ]a[- ]service)\b"),
        ("Enterprise Software", r"(?i)\benterprise (?:software|infrastructure)\b"),
        ("Cybersecurity", r"(?i)\b(?:cybersecurity|cyber security|infosec)\b"),
        ("Consumer", r"(?i)\b(?:consumer|D2C|DTC|direct[- ]to[- ]consumer)\b"),
        ("Edtech", r"(?i)\b(?:edtech|education technology)\b"),
        ("Crypto", r"(?i)\b(?:crypto|blockchain|web3)\b"),
        ("Marketplaces", r"(?i)\bmarketplaces?\b"),
        ("Deep Tech", r"(?i)\bdeep ?tech\b"),
        ("Mobility", r"(?i)\b(?:mobility|autonomous vehicles?|electric vehicles?)\b"),
        ("Real Estate", r"(?i)\b(?:proptech|real estate)\b"),
    ])
});

static GEOGRAPHIES: LazyLock<Vec<KeywordPattern>> = LazyLock::new(|| {
    keyword_table(&[
        ("Global", r"(?i)\b(?:global|worldwide)\b"),
        ("North America", r"(?i)\bnorth america(?:n)?\b"),
        // Case-sensitive so the pronoun "us" is not a country
        ("United States", r"\b(?:U\.S\.|US|USA|United States)\b"),
        ("United Kingdom", r"\b(?:UK|United Kingdom)\b"),
        ("Europe", r"(?i)\b(?:europe|european)\b"),
        ("Asia", r"(?i)\b(?:asia|APAC|asia[- ]pacific)\b"),
        ("China", r"(?i)\b(?:china|chinese)\b"),
        ("India", r"(?i)\b(?:india|indian)\b"),
        ("Latin America", r"(?i)\b(?:latin america|LATAM)\b"),
        ("Middle East", r"(?i)\b(?:middle east|MENA)\b"),
        ("Africa", r"(?i)\b(?:africa|african)\b"),
    ])
});

/// Sector keyword table
pub fn sectors() -> &'static [KeywordPattern] {
    &SECTORS
}

/// Geography keyword table
pub fn geographies() -> &'static [KeywordPattern] {
    &GEOGRAPHIES
}

/// First label (in table order) whose pattern occurs in `text`
pub fn first_label(table: &[KeywordPattern], text: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|k| k.regex.is_match(text))
        .map(|k| k.label)
}

/// Every label (in table order) whose pattern occurs in `text`
pub fn all_labels(table: &[KeywordPattern], text: &str) -> Vec<String> {
    table
        .iter()
        .filter(|k| k.regex.is_match(text))
        .map(|k| k.label.to_string())
        .collect()
}

static YEAR_RANGE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\b(20\d{2})\s*(?:-|–|to)\s*(20\d{2})\b").ok());
static SINGLE_YEAR: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\b20\d{2}\b").ok());

/// Find a timeframe in `text`: a year range wins over a single year
///
/// ```
/// use dealsignal_extractor::patterns::find_timeframe;
///
/// assert_eq!(find_timeframe("from 2023 to 2030").as_deref(), Some("2023-2030"));
/// assert_eq!(find_timeframe("by 2027").as_deref(), Some("2027"));
/// assert_eq!(find_timeframe("next year"), None);
/// ```
pub fn find_timeframe(text: &str) -> Option<String> {
    if let Some(caps) = YEAR_RANGE.as_ref().and_then(|re| re.captures(text)) {
        return Some(format!("{}-{}", &caps[1], &caps[2]));
    }
    SINGLE_YEAR
        .as_ref()
        .and_then(|re| re.find(text))
        .map(|m| m.as_str().to_string())
}

// Profile patterns

pub(crate) static AUM_BEFORE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i){AMOUNT}\s+(?:in\s+)?(?:AUM|assets under management)\b"
    ))
    .ok()
});

pub(crate) static AUM_AFTER: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?:AUM|assets under management)\b[^.$\n]{{0,30}}?{AMOUNT}"
    ))
    .ok()
});

pub(crate) static CHECK_SIZE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:checks?|check sizes?|tickets?|invest(?:s|ing)?|initial investments?)\b[^.$\n]{0,40}?\$\s?(\d+(?:\.\d+)?)\s*(k|m|b|thousand|million|billion)?\s*(?:-|–|to)\s*\$?\s?(\d+(?:\.\d+)?)\s*(k|m|b|thousand|million|billion)\b",
    )
    .ok()
});

pub(crate) static SEED_STAGE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)\b(pre[- ]?)?seed\b").ok());
pub(crate) static SERIES_STAGE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)\bseries\s+([a-d])\b").ok());
pub(crate) static GROWTH_STAGE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:growth[- ]stage|growth equity|late[- ]stage)\b").ok()
});

pub(crate) static LOCATION: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"\b(?:[Bb]ased|[Hh]eadquartered|[Ll]ocated|[Oo]ffices)\s+in\s+([A-Z][\w'-]*(?:,?\s+[A-Z][\w'-]*){0,3})")
        .ok()
});

pub(crate) static FOUNDED: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:founded|established|since)\s+(?:in\s+)?((?:19|20)\d{2})\b").ok()
});

pub(crate) static EMAIL: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}").ok()
});

pub(crate) static PHONE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"\+\d{1,3}[\s.-]?\d{1,4}(?:[\s.-]\d{2,4}){2,3}|\(?\b\d{3}\)?[\s.-]\d{3}[.-]\d{4}\b")
        .ok()
});

pub(crate) static LINKEDIN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"https?://(?:[a-z]{2,3}\.)?linkedin\.com/(?:company|in|school)/[A-Za-z0-9_%-]+").ok()
});

pub(crate) static TWITTER: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"https?://(?:www\.)?(?:twitter|x)\.com/([A-Za-z0-9_]{1,15})\b").ok()
});

pub(crate) static CRUNCHBASE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"https?://(?:www\.)?crunchbase\.com/organization/[A-Za-z0-9_-]+").ok()
});

//! Parse model replies into signals

use crate::error::ExtractorError;
use dealsignal_domain::confidence::AI_MULTIPLIER;
use dealsignal_domain::{ExtractedSignal, ExtractionMethod, SignalType, SourceWeight};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

/// One element of the model's signal array, before validation
#[derive(Debug, Deserialize)]
struct SignalCandidate {
    #[serde(rename = "type")]
    signal_type: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    raw_text: Option<String>,
    #[serde(default)]
    normalized_value: Option<Value>,
    #[serde(default)]
    unit: Option<String>,
    #[serde(default)]
    sector: Option<String>,
    #[serde(default)]
    geography: Option<String>,
    #[serde(default)]
    timeframe: Option<String>,
}

/// Find the first well-formed JSON array in `reply`
///
/// Tries every `[` in order and keeps the first position from which a complete
/// JSON array parses, so prose, code fences and bracketed words around the
/// array are ignored.
pub fn find_json_array(reply: &str) -> Option<Vec<Value>> {
    for (start, _) in reply.match_indices('[') {
        let mut stream = serde_json::Deserializer::from_str(&reply[start..]).into_iter::<Value>();
        if let Some(Ok(Value::Array(items))) = stream.next() {
            return Some(items);
        }
    }
    None
}

/// Parse a model reply into AI-scored signals
///
/// Fails only when no JSON array is present. Elements with an unknown `type`,
/// an empty `raw_text`, or the wrong shape are skipped with a warning.
pub fn parse_signals(
    reply: &str,
    source_weight: SourceWeight,
) -> Result<Vec<ExtractedSignal>, ExtractorError> {
    let items = find_json_array(reply)
        .ok_or_else(|| ExtractorError::InvalidFormat("no JSON array in reply".to_string()))?;

    let confidence = source_weight.score(AI_MULTIPLIER);
    let mut signals = Vec::with_capacity(items.len());

    for (idx, item) in items.into_iter().enumerate() {
        let candidate: SignalCandidate = match serde_json::from_value(item) {
            Ok(c) => c,
            Err(e) => {
                warn!("Skipping signal {}: {}", idx, e);
                continue;
            }
        };

        let Some(signal_type) = SignalType::parse(&candidate.signal_type) else {
            warn!("Skipping signal {}: unknown type '{}'", idx, candidate.signal_type);
            continue;
        };

        let raw_text = candidate.raw_text.as_deref().map(str::trim).unwrap_or("");
        if raw_text.is_empty() {
            warn!("Skipping signal {}: empty raw_text", idx);
            continue;
        }

        let mut signal =
            ExtractedSignal::new(signal_type, raw_text, confidence, ExtractionMethod::Ai);
        signal.signal_category = non_blank(candidate.category);
        signal.normalized_value = candidate.normalized_value.and_then(value_to_string);
        signal.unit = non_blank(candidate.unit);
        signal.sector = non_blank(candidate.sector);
        signal.geography = non_blank(candidate.geography);
        signal.timeframe = non_blank(candidate.timeframe);
        signals.push(signal);
    }

    Ok(signals)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("null"))
}

/// Models return numbers as strings or as JSON numbers
fn value_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => non_blank(Some(s)),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_array() {
        let reply = r#"[
            {
                "type": "market_size",
                "category": "TAM",
                "raw_text": "$407 billion by 2027",
                "normalized_value": "407",
                "unit": "$B",
                "sector": "AI",
                "geography": "Global",
                "timeframe": "2027"
            }
        ]"#;

        let signals = parse_signals(reply, SourceWeight::FULL).unwrap();
        assert_eq!(signals.len(), 1);
        let s = &signals[0];
        assert_eq!(s.signal_type, SignalType::MarketSize);
        assert_eq!(s.normalized_value.as_deref(), Some("407"));
        assert_eq!(s.unit.as_deref(), Some("$B"));
        assert_eq!(s.method, ExtractionMethod::Ai);
        assert_eq!(s.confidence_score, AI_MULTIPLIER);
    }

    #[test]
    fn test_parse_array_inside_prose_and_fences() {
        let reply = "Sure! Here are the [signals] I found:\n```json\n[{\"type\": \"risk\", \"raw_text\": \"regulatory risk\"}]\n```\nLet me know [if] you need more.";
        let signals = parse_signals(reply, SourceWeight::FULL).unwrap();
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].signal_type, SignalType::Risk);
    }

    #[test]
    fn test_numeric_normalized_value() {
        let reply = r#"[{"type": "growth_rate", "raw_text": "CAGR of 23.5%", "normalized_value": 23.5, "unit": "%"}]"#;
        let signals = parse_signals(reply, SourceWeight::FULL).unwrap();
        assert_eq!(signals[0].normalized_value.as_deref(), Some("23.5"));
    }

    #[test]
    fn test_no_array_is_error() {
        assert!(parse_signals("This is not JSON", SourceWeight::FULL).is_err());
        assert!(parse_signals(r#"{"type": "risk"}"#, SourceWeight::FULL).is_err());
        assert!(parse_signals("[unclosed", SourceWeight::FULL).is_err());
    }

    #[test]
    fn test_empty_array_is_ok() {
        assert!(parse_signals("[]", SourceWeight::FULL).unwrap().is_empty());
    }

    #[test]
    fn test_skips_unknown_type_and_empty_text() {
        let reply = r#"[
            {"type": "weather", "raw_text": "sunny"},
            {"type": "trend", "raw_text": "   "},
            {"type": "trend"},
            {"raw_text": "no type"},
            "not an object",
            {"type": "Trend", "raw_text": "shift to usage pricing", "sector": "null"}
        ]"#;
        let signals = parse_signals(reply, SourceWeight::FULL).unwrap();
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].signal_type, SignalType::Trend);
        assert_eq!(signals[0].sector, None);
    }

    #[test]
    fn test_ai_confidence_scales_with_weight() {
        let reply = r#"[{"type": "risk", "raw_text": "churn risk"}]"#;
        let signals = parse_signals(reply, SourceWeight::new(0.6)).unwrap();
        assert!((signals[0].confidence_score - AI_MULTIPLIER * 0.6).abs() < 1e-12);
    }
}

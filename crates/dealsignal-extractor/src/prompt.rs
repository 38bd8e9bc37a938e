//! Fixed instruction prompt for model-assisted extraction

/// System instruction sent with every extraction call
pub const SYSTEM_PROMPT: &str = r#"You are an analyst extracting investment signals from research text.

Return a JSON array. Each element describes one signal:

{
  "type": "market_size" | "growth_rate" | "risk" | "trend",
  "category": "sub-type such as TAM, SAM, SOM, CAGR, YoY, regulatory, competitive",
  "raw_text": "the exact span from the text",
  "normalized_value": "number as a string, e.g. \"407\" or \"23.5\", or null",
  "unit": "$B, $M, $T for money, % for rates, or null",
  "sector": "industry sector or null",
  "geography": "region or null",
  "timeframe": "year or year range such as 2024-2030, or null"
}

Rules:
- Only report what the text states; never infer numbers
- raw_text must be copied verbatim
- Use $B, $M or $T for market sizes regardless of how the text writes the unit
- Return [] when the text holds no signals

Output the JSON array only, with no prose and no code fences."#;

/// Build the user message for one text span
pub fn build_user_message(text: &str) -> String {
    let mut message = String::with_capacity(text.len() + 64);
    message.push_str("Text to analyze:\n---\n");
    message.push_str(text);
    message.push_str("\n---");
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_describes_schema() {
        for field in [
            "\"type\"",
            "\"category\"",
            "\"raw_text\"",
            "\"normalized_value\"",
            "\"unit\"",
            "\"sector\"",
            "\"geography\"",
            "\"timeframe\"",
        ] {
            assert!(SYSTEM_PROMPT.contains(field), "missing {field}");
        }
    }

    #[test]
    fn test_user_message_includes_text() {
        let message = build_user_message("CAGR of 23.5%");
        assert!(message.contains("CAGR of 23.5%"));
        assert!(message.starts_with("Text to analyze:"));
    }
}

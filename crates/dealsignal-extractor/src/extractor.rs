//! Model-assisted extraction with rule-based fallback

use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::parser::parse_signals;
use crate::prompt::{build_user_message, SYSTEM_PROMPT};
use crate::rules::RuleBasedExtractor;
use dealsignal_domain::traits::LlmProvider;
use dealsignal_domain::{ExtractedSignal, SourceWeight};
use std::fmt;
use tracing::{debug, info, warn};

/// Which path produced an extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionSource {
    /// The language model answered with a usable array
    Ai,
    /// The rule-based extractor ran (by choice or as a fallback)
    RuleBased,
    /// The text was too short to extract from
    Skipped,
}

impl ExtractionSource {
    /// Lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionSource::Ai => "ai",
            ExtractionSource::RuleBased => "rule_based",
            ExtractionSource::Skipped => "skipped",
        }
    }
}

impl fmt::Display for ExtractionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why the model path was not used
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// No provider configured (no API key)
    NoProvider,
    /// Transport failure or non-success response
    Llm(String),
    /// Reply held no parseable signal array
    InvalidOutput(String),
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::NoProvider => f.write_str("no language model configured"),
            FallbackReason::Llm(e) => write!(f, "language model call failed: {}", e),
            FallbackReason::InvalidOutput(e) => write!(f, "unusable model output: {}", e),
        }
    }
}

/// Tagged extraction result
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    /// Path that produced `signals`
    pub source: ExtractionSource,
    /// Set when the rule-based path ran in place of the model
    pub fallback: Option<FallbackReason>,
    /// Extracted signals
    pub signals: Vec<ExtractedSignal>,
}

impl Extraction {
    fn skipped() -> Self {
        Self {
            source: ExtractionSource::Skipped,
            fallback: None,
            signals: Vec::new(),
        }
    }
}

/// Extracts signals with a language model, degrading to rules on any failure
///
/// At most one model call is made per `extract`; there are no retries.
pub struct SignalExtractor<L> {
    llm: Option<L>,
    rules: RuleBasedExtractor,
    config: ExtractorConfig,
}

impl<L: LlmProvider> SignalExtractor<L> {
    /// Create an extractor; `None` means rule-based extraction only
    pub fn new(llm: Option<L>, config: ExtractorConfig) -> Result<Self, ExtractorError> {
        config.validate().map_err(ExtractorError::Config)?;
        Ok(Self {
            llm,
            rules: RuleBasedExtractor::new(),
            config,
        })
    }

    /// Replace the rule table used for fallback
    pub fn with_rules(mut self, rules: RuleBasedExtractor) -> Self {
        self.rules = rules;
        self
    }

    /// Whether a language model is configured
    pub fn has_llm(&self) -> bool {
        self.llm.is_some()
    }

    /// The active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// The fallback extractor
    pub fn rules(&self) -> &RuleBasedExtractor {
        &self.rules
    }

    /// Extract signals from one text span
    pub async fn extract(&self, text: &str, source_weight: SourceWeight) -> Extraction {
        let chars = text.chars().count();
        if chars < self.config.min_text_chars {
            debug!(chars, "Text below minimum length, skipping");
            return Extraction::skipped();
        }

        let Some(llm) = &self.llm else {
            return self.fallback(text, source_weight, FallbackReason::NoProvider);
        };

        let truncated = truncate_chars(text, self.config.max_ai_chars);
        let message = build_user_message(truncated);

        let reply = match llm.complete(SYSTEM_PROMPT, &message).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(model = llm.model_name(), "Model call failed, using rules: {}", e);
                return self.fallback(text, source_weight, FallbackReason::Llm(e.to_string()));
            }
        };

        match parse_signals(&reply, source_weight) {
            Ok(signals) => {
                info!(model = llm.model_name(), count = signals.len(), "Model extraction succeeded");
                Extraction {
                    source: ExtractionSource::Ai,
                    fallback: None,
                    signals,
                }
            }
            Err(e) => {
                warn!(model = llm.model_name(), "Unusable model output, using rules: {}", e);
                self.fallback(
                    text,
                    source_weight,
                    FallbackReason::InvalidOutput(e.to_string()),
                )
            }
        }
    }

    fn fallback(&self, text: &str, source_weight: SourceWeight, reason: FallbackReason) -> Extraction {
        debug!(%reason, "Rule-based extraction");
        Extraction {
            source: ExtractionSource::RuleBased,
            fallback: Some(reason),
            signals: self.rules.extract(text, source_weight),
        }
    }
}

/// Prefix of `text` holding at most `max_chars` characters
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

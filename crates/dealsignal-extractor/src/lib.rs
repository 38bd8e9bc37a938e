//! Dealsignal Extractor
//!
//! Turns unstructured investment text into typed signals and firm profile
//! fields.
//!
//! # Architecture
//!
//! ```text
//! Text → SignalExtractor → LLM ──(ok)──────────────→ Extraction { source: Ai }
//!                           └──(no key / error)──→ RuleBasedExtractor → Extraction { source: RuleBased }
//! ```
//!
//! The rule-based path is driven by the ordered pattern table in
//! [`patterns`]; the same module holds the profile patterns used by
//! [`ProfileExtractor`].
//!
//! # Example Usage
//!
//! ```
//! use dealsignal_extractor::{ExtractionSource, ExtractorConfig, SignalExtractor};
//! use dealsignal_domain::SourceWeight;
//! use dealsignal_llm::MockProvider;
//!
//! # tokio_test::block_on(async {
//! let extractor = SignalExtractor::<MockProvider>::new(None, ExtractorConfig::default()).unwrap();
//! let text = "The global AI market is projected to reach $407 billion by 2027, \
//!             according to the latest industry survey of enterprise buyers.";
//!
//! let extraction = extractor.extract(text, SourceWeight::FULL).await;
//! assert_eq!(extraction.source, ExtractionSource::RuleBased);
//! assert_eq!(extraction.signals[0].unit.as_deref(), Some("$B"));
//! # });
//! ```

#![warn(missing_docs)]

mod chunking;
mod config;
mod error;
mod extractor;
mod parser;
pub mod patterns;
mod profile;
mod prompt;
mod rules;

pub use chunking::TextChunker;
pub use config::{ChunkStrategy, ExtractorConfig};
pub use error::ExtractorError;
pub use extractor::{truncate_chars, Extraction, ExtractionSource, FallbackReason, SignalExtractor};
pub use parser::{find_json_array, parse_signals};
pub use profile::ProfileExtractor;
pub use prompt::{build_user_message, SYSTEM_PROMPT};
pub use rules::RuleBasedExtractor;

//! Dealsignal Domain Layer
//!
//! Core model for turning unstructured investment text into typed signals.
//! Apart from `uuid` for identifiers this crate has no external dependencies;
//! storage, LLM access and extraction live in the infrastructure crates and
//! plug in through the traits in [`traits`].
//!
//! ## Key Concepts
//!
//! - **Source Document**: a research file, pitch deck or crawled page, split
//!   into ordered chunks and carrying a trust weight in [0, 1]
//! - **Signal**: a typed observation (market size, growth rate, risk, trend)
//!   extracted from a document, immutable once stored
//! - **Source Weight**: the caller-supplied trust multiplier for a document
//! - **Firm Profile**: an enrichment target overwritten field by field
//!
//! ## Processing lifecycle
//!
//! ```text
//! pending → extracting → completed
//!                      ↘ failed
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod confidence;
pub mod document;
pub mod profile;
pub mod signal;
pub mod traits;

// Re-exports for convenience
pub use confidence::SourceWeight;
pub use document::{
    claim_expired, DocumentChunk, DocumentId, ProcessingStatus, SourceDocument, SourceKind,
};
pub use profile::{FirmProfile, ProfileEnrichment};
pub use signal::{ExtractedSignal, ExtractionMethod, Signal, SignalId, SignalType};

/// Current time in milliseconds since the Unix epoch
///
/// Falls back to zero if the system clock is set before 1970.
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

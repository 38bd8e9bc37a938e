//! Document ingestion

use crate::{with_store, PipelineError, SharedStore};
use dealsignal_domain::traits::SignalStore;
use dealsignal_domain::{now_millis, DocumentChunk, DocumentId, SourceDocument, SourceKind, SourceWeight};
use dealsignal_extractor::{ExtractorConfig, TextChunker};
use std::fmt;
use tracing::info;

/// A document to ingest
#[derive(Debug, Clone, PartialEq)]
pub struct NewDocument {
    /// Display title (usually the file name or page URL)
    pub title: String,
    /// Origin of the text
    pub kind: SourceKind,
    /// Trust weight; the kind's default when `None`
    pub source_weight: Option<f64>,
    /// Full text
    pub text: String,
}

impl NewDocument {
    /// Document with the kind's default weight
    pub fn new(title: impl Into<String>, kind: SourceKind, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            kind,
            source_weight: None,
            text: text.into(),
        }
    }

    /// Override the source weight (clamped to [0, 1])
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.source_weight = Some(weight);
        self
    }
}

/// Splits text into chunks and stores it as a pending document
pub struct Ingestor<S> {
    store: SharedStore<S>,
    chunker: TextChunker,
}

impl<S> Ingestor<S>
where
    S: SignalStore,
    S::Error: fmt::Display,
{
    /// Create an ingestor using the chunking settings of `config`
    pub fn new(store: SharedStore<S>, config: &ExtractorConfig) -> Self {
        Self {
            store,
            chunker: TextChunker::new(config.chunk_strategy, config.max_chunk_size),
        }
    }

    /// Store a document and its chunks; returns the new document's id
    pub fn ingest(&self, new: NewDocument) -> Result<DocumentId, PipelineError> {
        let pieces = self.chunker.chunk(&new.text);
        if pieces.is_empty() {
            return Err(PipelineError::EmptyDocument);
        }

        let weight = new.source_weight.map(SourceWeight::new);
        let document = SourceDocument::new(new.title, new.kind, weight, now_millis());
        let chunks: Vec<DocumentChunk> = pieces
            .into_iter()
            .enumerate()
            .map(|(i, content)| DocumentChunk {
                document_id: document.id,
                chunk_index: i as u32,
                content,
            })
            .collect();

        with_store(&self.store, |s| s.insert_document(&document, &chunks))?;

        info!(
            document = %document.id,
            kind = document.kind.as_str(),
            weight = %document.source_weight,
            chunks = chunks.len(),
            "Ingested document"
        );
        Ok(document.id)
    }
}

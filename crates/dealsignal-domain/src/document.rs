//! Source documents and their processing lifecycle

use crate::confidence::SourceWeight;
use std::fmt;

/// Unique identifier for a source document (UUIDv7)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentId(u128);

impl DocumentId {
    /// Generate a new UUIDv7-based DocumentId
    ///
    /// # Examples
    ///
    /// ```
    /// use dealsignal_domain::DocumentId;
    ///
    /// let id = DocumentId::new();
    /// let parsed = DocumentId::from_string(&id.to_string()).unwrap();
    /// assert_eq!(id, parsed);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create a DocumentId from a raw u128 value
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse a DocumentId from a UUID string
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s.trim())
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid document id: {}", e))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

/// Where a document came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Uploaded research report or market study
    ResearchFile,
    /// Startup pitch deck
    PitchDeck,
    /// Page fetched by the crawler
    WebPage,
}

impl SourceKind {
    /// Stable string form used in storage
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::ResearchFile => "research_file",
            SourceKind::PitchDeck => "pitch_deck",
            SourceKind::WebPage => "web_page",
        }
    }

    /// Parse a stored kind string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "research_file" | "research" => Some(SourceKind::ResearchFile),
            "pitch_deck" | "deck" => Some(SourceKind::PitchDeck),
            "web_page" | "web" => Some(SourceKind::WebPage),
            _ => None,
        }
    }

    /// Trust weight used when ingestion does not supply one
    pub fn default_weight(&self) -> SourceWeight {
        match self {
            SourceKind::ResearchFile => SourceWeight::new(0.9),
            SourceKind::PitchDeck => SourceWeight::new(0.8),
            SourceKind::WebPage => SourceWeight::new(0.6),
        }
    }
}

/// Processing state of a document
///
/// Only [`ProcessingStatus::Pending`] documents are picked up by batch runs.
/// [`ProcessingStatus::Extracting`] acts as a claim: a document in that state
/// is owned by exactly one processing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessingStatus {
    /// Ingested and waiting for extraction
    Pending,
    /// Claimed by a processing run
    Extracting,
    /// Extraction finished
    Completed,
    /// Extraction aborted with an error
    Failed,
}

impl ProcessingStatus {
    /// Stable string form used in storage
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingStatus::Pending => "pending",
            ProcessingStatus::Extracting => "extracting",
            ProcessingStatus::Completed => "completed",
            ProcessingStatus::Failed => "failed",
        }
    }

    /// Parse a stored status string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ProcessingStatus::Pending),
            "extracting" => Some(ProcessingStatus::Extracting),
            "completed" => Some(ProcessingStatus::Completed),
            "failed" => Some(ProcessingStatus::Failed),
            _ => None,
        }
    }

    /// Whether a processing run may take ownership of a document in this state
    pub fn is_claimable(&self) -> bool {
        !matches!(self, ProcessingStatus::Extracting)
    }
}

/// Whether a claim taken at `claimed_at` has outlived its lease at `now`
///
/// A missing claim time counts as expired.
pub fn claim_expired(claimed_at: Option<u64>, now: u64, lease_ms: u64) -> bool {
    claimed_at.map_or(true, |at| now.saturating_sub(at) >= lease_ms)
}

impl fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unit of ingested text
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDocument {
    /// Unique identifier
    pub id: DocumentId,
    /// Human-readable title (file name, page title)
    pub title: String,
    /// Origin of the text
    pub kind: SourceKind,
    /// Trust in the origin
    pub source_weight: SourceWeight,
    /// Processing state
    pub status: ProcessingStatus,
    /// When extraction completed (ms since Unix epoch)
    pub processed_at: Option<u64>,
    /// Last processing error, if the document failed
    pub last_error: Option<String>,
    /// Ingestion time (ms since Unix epoch)
    pub created_at: u64,
}

impl SourceDocument {
    /// Create a pending document
    ///
    /// When no weight is given the kind's default weight applies.
    pub fn new(
        title: impl Into<String>,
        kind: SourceKind,
        source_weight: Option<SourceWeight>,
        created_at: u64,
    ) -> Self {
        Self {
            id: DocumentId::new(),
            title: title.into(),
            kind,
            source_weight: source_weight.unwrap_or_else(|| kind.default_weight()),
            status: ProcessingStatus::Pending,
            processed_at: None,
            last_error: None,
            created_at,
        }
    }
}

/// An ordered slice of a document's text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentChunk {
    /// Owning document
    pub document_id: DocumentId,
    /// Position within the document, starting at 0
    pub chunk_index: u32,
    /// Chunk text
    pub content: String,
}

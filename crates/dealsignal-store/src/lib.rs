//! Dealsignal Storage Layer
//!
//! Implements the `SignalStore` and `ProfileStore` traits on top of SQLite.
//!
//! # Architecture
//!
//! - `documents` / `document_chunks`: ingested text and its processing status
//! - `signals`: append-only extraction results, superseded per document
//! - `firm_profiles`: last-writer-wins enrichment targets
//!
//! # Examples
//!
//! ```no_run
//! use dealsignal_store::SqliteStore;
//!
//! let store = SqliteStore::new(":memory:").unwrap();
//! // Store is now ready for document and signal operations
//! ```

#![warn(missing_docs)]

use dealsignal_domain::traits::{ProfileStore, SignalQuery, SignalStore};
use dealsignal_domain::{
    DocumentChunk, DocumentId, ExtractionMethod, FirmProfile, ProcessingStatus, Signal, SignalId,
    SignalType, SourceDocument, SourceKind, SourceWeight,
};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// JSON column could not be encoded or decoded
    #[error("JSON column error: {0}")]
    Json(#[from] serde_json::Error),
}

const SIGNAL_COLUMNS: &str = "id, document_id, signal_type, signal_category, raw_text, \
     normalized_value, unit, sector, geography, timeframe, confidence_score, method, created_at";

const DOCUMENT_COLUMNS: &str =
    "id, title, kind, source_weight, status, processed_at, last_error, created_at";

/// SQLite-based implementation of `SignalStore` and `ProfileStore`
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Share a store across tasks behind a
/// mutex, or open one store per thread.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) a store at the given path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let mut store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.conn.execute_batch(include_str!("schema.sql"))?;
        Ok(())
    }

    /// List the most recently ingested documents regardless of status
    pub fn list_documents(&self, limit: usize) -> Result<Vec<SourceDocument>, StoreError> {
        let sql = format!(
            "SELECT {} FROM documents ORDER BY created_at DESC, id DESC LIMIT ?1",
            DOCUMENT_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let docs = stmt
            .query_map(params![limit as i64], Self::row_to_document)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(docs)
    }

    fn id_to_bytes(value: u128) -> Vec<u8> {
        value.to_be_bytes().to_vec()
    }

    fn bytes_to_u128(bytes: &[u8]) -> Result<u128, StoreError> {
        if bytes.len() != 16 {
            return Err(StoreError::InvalidData(format!(
                "Expected 16 bytes for id, got {}",
                bytes.len()
            )));
        }
        let mut arr = [0u8; 16];
        arr.copy_from_slice(bytes);
        Ok(u128::from_be_bytes(arr))
    }

    /// Wrap a decoding failure so it can travel through rusqlite's row mapper
    fn conversion_error(
        column: usize,
        ty: rusqlite::types::Type,
        err: StoreError,
    ) -> rusqlite::Error {
        rusqlite::Error::FromSqlConversionFailure(column, ty, Box::new(err))
    }

    fn read_id(row: &Row<'_>, column: usize) -> rusqlite::Result<u128> {
        let bytes: Vec<u8> = row.get(column)?;
        Self::bytes_to_u128(&bytes)
            .map_err(|e| Self::conversion_error(column, rusqlite::types::Type::Blob, e))
    }

    fn row_to_document(row: &Row<'_>) -> rusqlite::Result<SourceDocument> {
        let kind_str: String = row.get(2)?;
        let kind = SourceKind::parse(&kind_str).ok_or_else(|| {
            Self::conversion_error(
                2,
                rusqlite::types::Type::Text,
                StoreError::InvalidData(format!("Unknown source kind: {}", kind_str)),
            )
        })?;
        let status_str: String = row.get(4)?;
        let status = ProcessingStatus::parse(&status_str).ok_or_else(|| {
            Self::conversion_error(
                4,
                rusqlite::types::Type::Text,
                StoreError::InvalidData(format!("Unknown status: {}", status_str)),
            )
        })?;
        let processed_at: Option<i64> = row.get(5)?;

        Ok(SourceDocument {
            id: DocumentId::from_value(Self::read_id(row, 0)?),
            title: row.get(1)?,
            kind,
            source_weight: SourceWeight::new(row.get(3)?),
            status,
            processed_at: processed_at.map(|t| t as u64),
            last_error: row.get(6)?,
            created_at: row.get::<_, i64>(7)? as u64,
        })
    }

    fn row_to_signal(row: &Row<'_>) -> rusqlite::Result<Signal> {
        let type_str: String = row.get(2)?;
        let signal_type = SignalType::parse(&type_str).ok_or_else(|| {
            Self::conversion_error(
                2,
                rusqlite::types::Type::Text,
                StoreError::InvalidData(format!("Unknown signal type: {}", type_str)),
            )
        })?;
        let method_str: String = row.get(11)?;
        let method = ExtractionMethod::parse(&method_str).ok_or_else(|| {
            Self::conversion_error(
                11,
                rusqlite::types::Type::Text,
                StoreError::InvalidData(format!("Unknown extraction method: {}", method_str)),
            )
        })?;

        Ok(Signal {
            id: SignalId::from_value(Self::read_id(row, 0)?),
            document_id: DocumentId::from_value(Self::read_id(row, 1)?),
            signal_type,
            signal_category: row.get(3)?,
            raw_text: row.get(4)?,
            normalized_value: row.get(5)?,
            unit: row.get(6)?,
            sector: row.get(7)?,
            geography: row.get(8)?,
            timeframe: row.get(9)?,
            confidence_score: row.get(10)?,
            method,
            created_at: row.get::<_, i64>(12)? as u64,
        })
    }

    fn row_to_profile(row: &Row<'_>) -> rusqlite::Result<FirmProfile> {
        let list = |column: usize| -> rusqlite::Result<Vec<String>> {
            let raw: String = row.get(column)?;
            serde_json::from_str(&raw).map_err(|e| {
                Self::conversion_error(column, rusqlite::types::Type::Text, StoreError::Json(e))
            })
        };
        let founded_year: Option<i64> = row.get(9)?;
        let updated_at: Option<i64> = row.get(15)?;

        Ok(FirmProfile {
            key: row.get(0)?,
            website: row.get(1)?,
            name: row.get(2)?,
            description: row.get(3)?,
            focus_sectors: list(4)?,
            stages: list(5)?,
            aum: row.get(6)?,
            check_size: row.get(7)?,
            location: row.get(8)?,
            founded_year: founded_year.and_then(|y| u16::try_from(y).ok()),
            emails: list(10)?,
            phones: list(11)?,
            linkedin_url: row.get(12)?,
            twitter_url: row.get(13)?,
            crunchbase_url: row.get(14)?,
            updated_at: updated_at.map(|t| t as u64),
        })
    }

    fn expect_updated(changed: usize, id: DocumentId) -> Result<(), StoreError> {
        if changed == 0 {
            return Err(StoreError::NotFound(format!("document {}", id)));
        }
        Ok(())
    }
}

impl SignalStore for SqliteStore {
    type Error = StoreError;

    fn insert_document(
        &mut self,
        document: &SourceDocument,
        chunks: &[DocumentChunk],
    ) -> Result<(), Self::Error> {
        let id_bytes = Self::id_to_bytes(document.id.value());
        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT INTO documents (id, title, kind, source_weight, status, processed_at, last_error, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                &id_bytes,
                &document.title,
                document.kind.as_str(),
                document.source_weight.value(),
                document.status.as_str(),
                document.processed_at.map(|t| t as i64),
                &document.last_error,
                document.created_at as i64,
            ],
        )?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO document_chunks (document_id, chunk_index, content) VALUES (?1, ?2, ?3)",
            )?;
            for chunk in chunks {
                if chunk.document_id != document.id {
                    return Err(StoreError::InvalidData(format!(
                        "chunk {} belongs to document {}, not {}",
                        chunk.chunk_index, chunk.document_id, document.id
                    )));
                }
                stmt.execute(params![&id_bytes, chunk.chunk_index, &chunk.content])?;
            }
        }

        tx.commit()?;
        debug!(document = %document.id, chunks = chunks.len(), "Inserted document");
        Ok(())
    }

    fn get_document(&self, id: DocumentId) -> Result<Option<SourceDocument>, Self::Error> {
        let sql = format!("SELECT {} FROM documents WHERE id = ?1", DOCUMENT_COLUMNS);
        let doc = self
            .conn
            .query_row(&sql, params![Self::id_to_bytes(id.value())], Self::row_to_document)
            .optional()?;
        Ok(doc)
    }

    fn get_chunks(&self, id: DocumentId) -> Result<Vec<DocumentChunk>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT chunk_index, content FROM document_chunks
             WHERE document_id = ?1 ORDER BY chunk_index ASC",
        )?;
        let chunks = stmt
            .query_map(params![Self::id_to_bytes(id.value())], |row| {
                Ok(DocumentChunk {
                    document_id: id,
                    chunk_index: row.get(0)?,
                    content: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(chunks)
    }

    fn documents_with_status(
        &self,
        status: ProcessingStatus,
    ) -> Result<Vec<SourceDocument>, Self::Error> {
        let sql = format!(
            "SELECT {} FROM documents WHERE status = ?1 ORDER BY created_at ASC, id ASC",
            DOCUMENT_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let docs = stmt
            .query_map(params![status.as_str()], Self::row_to_document)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(docs)
    }

    fn claim_document(
        &mut self,
        id: DocumentId,
        now: u64,
        lease_ms: u64,
    ) -> Result<bool, Self::Error> {
        let changed = self.conn.execute(
            "UPDATE documents SET status = 'extracting', claimed_at = ?2, last_error = NULL
             WHERE id = ?1
               AND (status != 'extracting' OR claimed_at IS NULL OR claimed_at <= ?3)",
            params![
                Self::id_to_bytes(id.value()),
                now as i64,
                now.saturating_sub(lease_ms) as i64
            ],
        )?;
        Ok(changed == 1)
    }

    fn release_stale_claims(&mut self, now: u64, lease_ms: u64) -> Result<usize, Self::Error> {
        let released = self.conn.execute(
            "UPDATE documents SET status = 'pending', claimed_at = NULL
             WHERE status = 'extracting' AND (claimed_at IS NULL OR claimed_at <= ?1)",
            params![now.saturating_sub(lease_ms) as i64],
        )?;
        if released > 0 {
            warn!("Requeued {} document(s) with expired claims", released);
        }
        Ok(released)
    }

    fn mark_completed(&mut self, id: DocumentId, processed_at: u64) -> Result<(), Self::Error> {
        let changed = self.conn.execute(
            "UPDATE documents
             SET status = 'completed', processed_at = ?2, claimed_at = NULL, last_error = NULL
             WHERE id = ?1",
            params![Self::id_to_bytes(id.value()), processed_at as i64],
        )?;
        Self::expect_updated(changed, id)
    }

    fn mark_failed(&mut self, id: DocumentId, reason: &str) -> Result<(), Self::Error> {
        let changed = self.conn.execute(
            "UPDATE documents SET status = 'failed', claimed_at = NULL, last_error = ?2 WHERE id = ?1",
            params![Self::id_to_bytes(id.value()), reason],
        )?;
        Self::expect_updated(changed, id)
    }

    fn replace_signals(&mut self, id: DocumentId, signals: &[Signal]) -> Result<usize, Self::Error> {
        let id_bytes = Self::id_to_bytes(id.value());
        let tx = self.conn.transaction()?;

        let superseded = tx.execute("DELETE FROM signals WHERE document_id = ?1", params![&id_bytes])?;

        {
            let sql = format!(
                "INSERT INTO signals ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                SIGNAL_COLUMNS
            );
            let mut stmt = tx.prepare(&sql)?;
            for signal in signals {
                if signal.document_id != id {
                    return Err(StoreError::InvalidData(format!(
                        "signal {} belongs to document {}, not {}",
                        signal.id, signal.document_id, id
                    )));
                }
                if !(0.0..=1.0).contains(&signal.confidence_score) {
                    return Err(StoreError::InvalidData(format!(
                        "confidence {} out of range [0.0, 1.0]",
                        signal.confidence_score
                    )));
                }
                stmt.execute(params![
                    Self::id_to_bytes(signal.id.value()),
                    &id_bytes,
                    signal.signal_type.as_str(),
                    &signal.signal_category,
                    &signal.raw_text,
                    &signal.normalized_value,
                    &signal.unit,
                    &signal.sector,
                    &signal.geography,
                    &signal.timeframe,
                    signal.confidence_score,
                    signal.method.as_str(),
                    signal.created_at as i64,
                ])?;
            }
        }

        tx.commit()?;
        debug!(document = %id, superseded, inserted = signals.len(), "Replaced signals");
        Ok(signals.len())
    }

    fn query_signals(&self, query: &SignalQuery) -> Result<Vec<Signal>, Self::Error> {
        let mut sql = format!("SELECT {} FROM signals WHERE 1=1", SIGNAL_COLUMNS);
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(document_id) = query.document_id {
            sql.push_str(" AND document_id = ?");
            params.push(Box::new(Self::id_to_bytes(document_id.value())));
        }

        if let Some(signal_type) = query.signal_type {
            sql.push_str(" AND signal_type = ?");
            params.push(Box::new(signal_type.as_str()));
        }

        if let Some(min_conf) = query.min_confidence {
            sql.push_str(" AND confidence_score >= ?");
            params.push(Box::new(min_conf));
        }

        sql.push_str(" ORDER BY created_at DESC, id DESC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            params.push(Box::new(limit as i64));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let signals = stmt
            .query_map(&param_refs[..], Self::row_to_signal)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(signals)
    }

    fn count_signals(&self) -> Result<usize, Self::Error> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM signals", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn count_by_type(&self) -> Result<Vec<(SignalType, usize)>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT signal_type, COUNT(*) AS n FROM signals
             GROUP BY signal_type ORDER BY n DESC, signal_type ASC",
        )?;
        let rows = stmt
            .query_map([], |row| {
                let type_str: String = row.get(0)?;
                let count: i64 = row.get(1)?;
                Ok((type_str, count as usize))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(type_str, count)| {
                SignalType::parse(&type_str)
                    .map(|t| (t, count))
                    .ok_or_else(|| StoreError::InvalidData(format!("Unknown signal type: {}", type_str)))
            })
            .collect()
    }

    fn count_by_sector(&self, limit: usize) -> Result<Vec<(String, usize)>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT sector, COUNT(*) AS n FROM signals
             WHERE sector IS NOT NULL
             GROUP BY sector ORDER BY n DESC, sector ASC LIMIT ?1",
        )?;
        let rows = stmt
            .query_map(params![limit as i64], |row| {
                let count: i64 = row.get(1)?;
                Ok((row.get::<_, String>(0)?, count as usize))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn count_above_confidence(&self, threshold: f64) -> Result<usize, Self::Error> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM signals WHERE confidence_score > ?1",
            params![threshold],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

impl ProfileStore for SqliteStore {
    type Error = StoreError;

    fn get_profile(&self, key: &str) -> Result<Option<FirmProfile>, Self::Error> {
        let profile = self
            .conn
            .query_row(
                "SELECT key, website, name, description, focus_sectors, stages, aum, check_size,
                        location, founded_year, emails, phones, linkedin_url, twitter_url,
                        crunchbase_url, updated_at
                 FROM firm_profiles WHERE key = ?1",
                params![key],
                Self::row_to_profile,
            )
            .optional()?;
        Ok(profile)
    }

    fn save_profile(&mut self, profile: &FirmProfile) -> Result<(), Self::Error> {
        self.conn.execute(
            "INSERT INTO firm_profiles (key, website, name, description, focus_sectors, stages, aum,
                 check_size, location, founded_year, emails, phones, linkedin_url, twitter_url,
                 crunchbase_url, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
             ON CONFLICT(key) DO UPDATE SET
                 website = excluded.website, name = excluded.name,
                 description = excluded.description, focus_sectors = excluded.focus_sectors,
                 stages = excluded.stages, aum = excluded.aum, check_size = excluded.check_size,
                 location = excluded.location, founded_year = excluded.founded_year,
                 emails = excluded.emails, phones = excluded.phones,
                 linkedin_url = excluded.linkedin_url, twitter_url = excluded.twitter_url,
                 crunchbase_url = excluded.crunchbase_url, updated_at = excluded.updated_at",
            params![
                &profile.key,
                &profile.website,
                &profile.name,
                &profile.description,
                serde_json::to_string(&profile.focus_sectors)?,
                serde_json::to_string(&profile.stages)?,
                &profile.aum,
                &profile.check_size,
                &profile.location,
                profile.founded_year.map(i64::from),
                serde_json::to_string(&profile.emails)?,
                serde_json::to_string(&profile.phones)?,
                &profile.linkedin_url,
                &profile.twitter_url,
                &profile.crunchbase_url,
                profile.updated_at.map(|t| t as i64),
            ],
        )?;
        Ok(())
    }
}

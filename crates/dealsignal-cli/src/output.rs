//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use dealsignal_crawler::EnrichmentReport;
use dealsignal_domain::{DocumentId, FirmProfile, Signal};
use dealsignal_pipeline::{BatchOutcome, PipelineMetrics, ProcessOutcome, SignalsSummary};
use serde_json::json;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

const RAW_TEXT_WIDTH: usize = 48;

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// The selected output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format a list of signals.
    pub fn format_signals(&self, signals: &[Signal]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let values: Vec<_> = signals.iter().map(signal_json).collect();
                Ok(serde_json::to_string_pretty(&values)?)
            }
            OutputFormat::Table => Ok(self.format_signals_table(signals)),
            OutputFormat::Quiet => Ok(signals
                .iter()
                .map(|s| s.id.to_string())
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }

    fn format_signals_table(&self, signals: &[Signal]) -> String {
        if signals.is_empty() {
            return self.colorize("No signals found.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record([
            "Type", "Category", "Value", "Unit", "Sector", "Geography", "Timeframe", "Score",
            "Method", "Text",
        ]);

        for signal in signals {
            builder.push_record([
                signal.signal_type.as_str().to_string(),
                opt(&signal.signal_category),
                opt(&signal.normalized_value),
                opt(&signal.unit),
                opt(&signal.sector),
                opt(&signal.geography),
                opt(&signal.timeframe),
                format!("{:.2}", signal.confidence_score),
                signal.method.as_str().to_string(),
                shorten(&signal.raw_text, RAW_TEXT_WIDTH),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Format the aggregate signal summary.
    pub fn format_summary(&self, summary: &SignalsSummary) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let by_type: serde_json::Map<_, _> = summary
                    .by_type
                    .iter()
                    .map(|(t, n)| (t.as_str().to_string(), json!(n)))
                    .collect();
                let by_sector: Vec<_> = summary
                    .by_sector
                    .iter()
                    .map(|(sector, n)| json!({ "sector": sector, "count": n }))
                    .collect();
                Ok(serde_json::to_string_pretty(&json!({
                    "total": summary.total,
                    "high_confidence": summary.high_confidence,
                    "by_type": by_type,
                    "by_sector": by_sector,
                }))?)
            }
            OutputFormat::Quiet => Ok(summary.total.to_string()),
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["Group", "Key", "Count"]);
                builder.push_record(["all".to_string(), "total".to_string(), summary.total.to_string()]);
                builder.push_record([
                    "all".to_string(),
                    "high confidence".to_string(),
                    summary.high_confidence.to_string(),
                ]);
                for (signal_type, count) in &summary.by_type {
                    builder.push_record([
                        "type".to_string(),
                        signal_type.as_str().to_string(),
                        count.to_string(),
                    ]);
                }
                for (sector, count) in &summary.by_sector {
                    builder.push_record(["sector".to_string(), sector.clone(), count.to_string()]);
                }
                let mut table = builder.build();
                table.with(Style::rounded());
                Ok(table.to_string())
            }
        }
    }

    /// Format the result of processing one document.
    pub fn format_outcome(&self, id: DocumentId, outcome: &ProcessOutcome) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
                "document_id": id.to_string(),
                "signals_extracted": outcome.signals_extracted,
                "error": outcome.error,
                "chunks": {
                    "ai": outcome.chunks.ai,
                    "rule_based": outcome.chunks.rule_based,
                    "skipped": outcome.chunks.skipped,
                },
            }))?),
            OutputFormat::Quiet => Ok(outcome.signals_extracted.to_string()),
            OutputFormat::Table => Ok(match &outcome.error {
                None => self.success(&format!(
                    "Document {}: {} signal(s) (ai chunks: {}, rule-based: {}, skipped: {})",
                    id,
                    outcome.signals_extracted,
                    outcome.chunks.ai,
                    outcome.chunks.rule_based,
                    outcome.chunks.skipped
                )),
                Some(error) => self.error(&format!("Document {}: {}", id, error)),
            }),
        }
    }

    /// Format the result of a batch run.
    pub fn format_batch(&self, batch: &BatchOutcome) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
                "processed": batch.processed,
                "failed": batch.failed,
                "signals_extracted": batch.signals_extracted,
                "chunks": {
                    "ai": batch.chunks.ai,
                    "rule_based": batch.chunks.rule_based,
                    "skipped": batch.chunks.skipped,
                },
            }))?),
            OutputFormat::Quiet => Ok(batch.processed.to_string()),
            OutputFormat::Table => {
                let line = format!(
                    "Processed {} document(s), {} signal(s)",
                    batch.processed, batch.signals_extracted
                );
                if batch.failed > 0 {
                    Ok(format!(
                        "{}\n{}",
                        self.success(&line),
                        self.warning(&format!("{} document(s) failed", batch.failed))
                    ))
                } else {
                    Ok(self.success(&line))
                }
            }
        }
    }

    /// Format worker metrics after a watch run.
    pub fn format_metrics(&self, metrics: &PipelineMetrics) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
                "batches": metrics.batches,
                "documents_processed": metrics.documents_processed,
                "documents_failed": metrics.documents_failed,
                "signals_extracted": metrics.signals_extracted,
                "ai_chunks": metrics.ai_chunks,
                "rule_based_chunks": metrics.rule_based_chunks,
                "skipped_chunks": metrics.skipped_chunks,
                "total_runtime_ms": metrics.total_runtime_ms,
            }))?),
            OutputFormat::Quiet => Ok(metrics.documents_processed.to_string()),
            OutputFormat::Table => Ok(metrics.summary()),
        }
    }

    /// Format a firm profile.
    pub fn format_profile(&self, profile: &FirmProfile) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&profile_json(profile))?),
            OutputFormat::Quiet => Ok(profile.key.clone()),
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["Field", "Value"]);
                let rows = [
                    ("Key", Some(profile.key.clone())),
                    ("Name", profile.name.clone()),
                    ("Website", profile.website.clone()),
                    ("Description", profile.description.clone()),
                    ("Sectors", list(&profile.focus_sectors)),
                    ("Stages", list(&profile.stages)),
                    ("AUM", profile.aum.clone()),
                    ("Check size", profile.check_size.clone()),
                    ("Location", profile.location.clone()),
                    ("Founded", profile.founded_year.map(|y| y.to_string())),
                    ("Emails", list(&profile.emails)),
                    ("Phones", list(&profile.phones)),
                    ("LinkedIn", profile.linkedin_url.clone()),
                    ("Twitter", profile.twitter_url.clone()),
                    ("Crunchbase", profile.crunchbase_url.clone()),
                ];
                for (field, value) in rows {
                    builder.push_record([field.to_string(), value.unwrap_or_else(|| "-".to_string())]);
                }
                let mut table = builder.build();
                table.with(Style::rounded());
                Ok(table.to_string())
            }
        }
    }

    /// Format an enrichment report.
    pub fn format_enrichment(&self, report: &EnrichmentReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
                "firm_key": report.firm_key,
                "pages_fetched": report.pages_fetched,
                "pages_failed": report.pages_failed,
                "fields_found": report.fields_found,
                "document_id": report.document_id.map(|id| id.to_string()),
                "profile": profile_json(&report.profile),
            }))?),
            OutputFormat::Quiet => Ok(report
                .document_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| report.firm_key.clone())),
            OutputFormat::Table => {
                let mut lines = vec![self.success(&format!(
                    "Enriched '{}' from {} page(s): {} field(s) found",
                    report.firm_key,
                    report.pages_fetched.len(),
                    report.fields_found
                ))];
                if report.pages_failed > 0 {
                    lines.push(self.warning(&format!("{} page(s) could not be fetched", report.pages_failed)));
                }
                if let Some(id) = report.document_id {
                    lines.push(self.info(&format!("Crawled text stored as document {}", id)));
                }
                lines.push(self.format_profile(&report.profile)?);
                Ok(lines.join("\n"))
            }
        }
    }

    /// Format an ingested document id.
    pub fn document_ingested(&self, id: DocumentId, chunks_hint: &str) -> String {
        match self.format {
            OutputFormat::Table => self.success(&format!("Document ingested: {} ({})", id, chunks_hint)),
            OutputFormat::Json => json!({ "document_id": id.to_string() }).to_string(),
            OutputFormat::Quiet => id.to_string(),
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

fn opt(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "-".to_string())
}

fn list(values: &[String]) -> Option<String> {
    (!values.is_empty()).then(|| values.join(", "))
}

/// Truncate on a character boundary, marking the cut with "..."
fn shorten(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let cut: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{}...", cut)
}

fn signal_json(signal: &Signal) -> serde_json::Value {
    json!({
        "id": signal.id.to_string(),
        "document_id": signal.document_id.to_string(),
        "type": signal.signal_type.as_str(),
        "category": signal.signal_category,
        "raw_text": signal.raw_text,
        "normalized_value": signal.normalized_value,
        "unit": signal.unit,
        "sector": signal.sector,
        "geography": signal.geography,
        "timeframe": signal.timeframe,
        "confidence_score": signal.confidence_score,
        "method": signal.method.as_str(),
        "created_at": signal.created_at,
    })
}

fn profile_json(profile: &FirmProfile) -> serde_json::Value {
    json!({
        "key": profile.key,
        "website": profile.website,
        "name": profile.name,
        "description": profile.description,
        "focus_sectors": profile.focus_sectors,
        "stages": profile.stages,
        "aum": profile.aum,
        "check_size": profile.check_size,
        "location": profile.location,
        "founded_year": profile.founded_year,
        "emails": profile.emails,
        "phones": profile.phones,
        "linkedin_url": profile.linkedin_url,
        "twitter_url": profile.twitter_url,
        "crunchbase_url": profile.crunchbase_url,
        "updated_at": profile.updated_at,
    })
}

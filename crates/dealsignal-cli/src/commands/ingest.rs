//! Ingest command implementation.

use crate::app::App;
use crate::cli::IngestArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use dealsignal_domain::SourceKind;
use dealsignal_pipeline::NewDocument;
use std::fs;

/// Execute the ingest command.
pub fn execute_ingest(args: IngestArgs, app: &App, formatter: &Formatter) -> Result<()> {
    if let Some(weight) = args.weight {
        if !(0.0..=1.0).contains(&weight) {
            return Err(CliError::InvalidInput(
                "Source weight must be between 0.0 and 1.0".to_string(),
            ));
        }
    }

    let text = fs::read_to_string(&args.file)?;
    let title = match args.title {
        Some(title) => title,
        None => args
            .file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| CliError::InvalidInput("File path has no file name".to_string()))?,
    };

    let kind: SourceKind = args.kind.into();
    let mut document = NewDocument::new(title, kind, text);
    if let Some(weight) = args.weight {
        document = document.with_weight(weight);
    }

    let id = app.ingestor().ingest(document)?;
    println!("{}", formatter.document_ingested(id, kind.as_str()));

    Ok(())
}

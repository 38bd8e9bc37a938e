//! Summary, recent and signals command implementations.

use super::parse_document_id;
use crate::app::App;
use crate::cli::{RecentArgs, SignalsArgs};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use dealsignal_domain::traits::SignalStore;

/// Execute the summary command.
pub fn execute_summary(app: &App, formatter: &Formatter) -> Result<()> {
    let summary = app.processor()?.summary()?;
    println!("{}", formatter.format_summary(&summary)?);
    Ok(())
}

/// Execute the recent command.
pub fn execute_recent(args: RecentArgs, app: &App, formatter: &Formatter) -> Result<()> {
    let limit = args.limit.unwrap_or(app.config().pipeline.recent_limit);
    if limit == 0 {
        return Err(CliError::InvalidInput("Limit must be at least 1".to_string()));
    }
    let signals = app.processor()?.recent_signals(limit)?;
    println!("{}", formatter.format_signals(&signals)?);
    Ok(())
}

/// Execute the signals command.
pub fn execute_signals(args: SignalsArgs, app: &App, formatter: &Formatter) -> Result<()> {
    let id = parse_document_id(&args.document)?;
    let exists = app
        .lock_store()?
        .get_document(id)?
        .is_some();
    if !exists {
        return Err(CliError::NotFound(format!("document {}", id)));
    }

    let signals = app.processor()?.document_signals(id)?;
    println!("{}", formatter.format_signals(&signals)?);
    Ok(())
}

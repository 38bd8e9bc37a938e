//! Enrich and profile command implementations.

use crate::app::App;
use crate::cli::{EnrichArgs, ProfileArgs};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use dealsignal_domain::traits::ProfileStore;

/// Execute the enrich command.
pub async fn execute_enrich(args: EnrichArgs, app: &App, formatter: &Formatter) -> Result<()> {
    let key = args.firm.trim();
    if key.is_empty() {
        return Err(CliError::InvalidInput("Firm key must not be empty".to_string()));
    }

    let report = app.enricher(!args.no_ingest)?.enrich(key, &args.url).await?;
    println!("{}", formatter.format_enrichment(&report)?);
    Ok(())
}

/// Execute the profile command.
pub fn execute_profile(args: ProfileArgs, app: &App, formatter: &Formatter) -> Result<()> {
    let profile = app
        .lock_store()?
        .get_profile(&args.firm)?
        .ok_or_else(|| CliError::NotFound(format!("firm profile '{}'", args.firm)))?;

    println!("{}", formatter.format_profile(&profile)?);
    Ok(())
}

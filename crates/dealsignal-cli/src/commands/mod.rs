//! Command implementations.

pub mod config;
pub mod enrich;
pub mod ingest;
pub mod process;
pub mod signals;

pub use self::config::execute_config;
pub use self::enrich::{execute_enrich, execute_profile};
pub use self::ingest::execute_ingest;
pub use self::process::{execute_process, execute_process_all, execute_watch};
pub use self::signals::{execute_recent, execute_signals, execute_summary};

use crate::app::App;
use crate::cli::DataCommand;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use dealsignal_domain::DocumentId;

/// Run a database command.
pub async fn execute(command: DataCommand, app: &App, formatter: &Formatter) -> Result<()> {
    match command {
        DataCommand::Ingest(args) => execute_ingest(args, app, formatter),
        DataCommand::Process(args) => execute_process(args, app, formatter).await,
        DataCommand::ProcessAll => execute_process_all(app, formatter).await,
        DataCommand::Watch(args) => execute_watch(args, app, formatter).await,
        DataCommand::Summary => execute_summary(app, formatter),
        DataCommand::Recent(args) => execute_recent(args, app, formatter),
        DataCommand::Signals(args) => execute_signals(args, app, formatter),
        DataCommand::Enrich(args) => execute_enrich(args, app, formatter).await,
        DataCommand::Profile(args) => execute_profile(args, app, formatter),
    }
}

/// Parse a document ID given on the command line.
pub(crate) fn parse_document_id(raw: &str) -> Result<DocumentId> {
    DocumentId::from_string(raw.trim())
        .map_err(|e| CliError::InvalidInput(format!("Invalid document ID '{}': {}", raw, e)))
}

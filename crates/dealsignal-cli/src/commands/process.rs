//! Process, process-all and watch command implementations.

use super::parse_document_id;
use crate::app::App;
use crate::cli::{ProcessArgs, WatchArgs};
use crate::error::Result;
use crate::output::Formatter;
use dealsignal_pipeline::{Orchestrator, PipelineWorker};

/// Execute the process command.
///
/// A document that could not be processed is reported, not returned as an error.
pub async fn execute_process(args: ProcessArgs, app: &App, formatter: &Formatter) -> Result<()> {
    let id = parse_document_id(&args.id)?;
    let outcome = app.processor()?.process_document(id).await;
    println!("{}", formatter.format_outcome(id, &outcome)?);
    Ok(())
}

/// Execute the process-all command.
pub async fn execute_process_all(app: &App, formatter: &Formatter) -> Result<()> {
    let orchestrator = Orchestrator::new(app.processor()?);
    let batch = orchestrator.process_all_pending().await?;
    println!("{}", formatter.format_batch(&batch)?);
    Ok(())
}

/// Execute the watch command.
pub async fn execute_watch(args: WatchArgs, app: &App, formatter: &Formatter) -> Result<()> {
    let mut worker = PipelineWorker::new(Orchestrator::new(app.processor()?));
    println!(
        "{}",
        formatter.info(&format!(
            "Watching for pending documents every {:?} (Ctrl+C to stop)",
            worker.interval()
        ))
    );

    match args.cycles {
        Some(cycles) => worker.run_cycles(cycles).await?,
        None => worker.run().await?,
    }

    println!("{}", formatter.format_metrics(worker.metrics())?);
    Ok(())
}

//! End-to-end command runs against an on-disk database

use dealsignal_cli::cli::{
    IngestArgs, KindArg, ProcessArgs, ProfileArgs, RecentArgs, SignalsArgs, WatchArgs,
};
use dealsignal_cli::commands;
use dealsignal_cli::config::OutputFormat;
use dealsignal_cli::{App, CliError, Config, DataCommand, Formatter};
use dealsignal_domain::traits::SignalStore;
use dealsignal_domain::ProcessingStatus;
use std::fs;
use tempfile::{tempdir, TempDir};

const BRIEF: &str = "The global AI market is projected to reach $407 billion by 2027, \
growing at a CAGR of 23.5% as enterprises adopt copilots across every function.";

fn setup() -> (TempDir, App, Formatter) {
    let dir = tempdir().unwrap();
    let app = App::open(Config::default(), Some(&dir.path().join("signals.db"))).unwrap();
    (dir, app, Formatter::new(OutputFormat::Quiet, false))
}

fn ingest_brief(dir: &TempDir, app: &App, formatter: &Formatter) {
    let file = dir.path().join("ai-brief.txt");
    fs::write(&file, BRIEF).unwrap();
    let args = IngestArgs {
        file,
        kind: KindArg::ResearchFile,
        weight: Some(1.0),
        title: None,
    };
    commands::execute_ingest(args, app, formatter).unwrap();
}

#[tokio::test]
async fn test_ingest_then_process_all() {
    let (dir, app, formatter) = setup();
    ingest_brief(&dir, &app, &formatter);

    let pending = app
        .lock_store()
        .unwrap()
        .documents_with_status(ProcessingStatus::Pending)
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].title, "ai-brief.txt");

    commands::execute_process_all(&app, &formatter).await.unwrap();

    let store = app.lock_store().unwrap();
    assert_eq!(store.count_signals().unwrap(), 2);
    let document = store.get_document(pending[0].id).unwrap().unwrap();
    assert_eq!(document.status, ProcessingStatus::Completed);
}

#[tokio::test]
async fn test_query_commands_after_processing() {
    let (dir, app, formatter) = setup();
    ingest_brief(&dir, &app, &formatter);
    let id = app
        .lock_store()
        .unwrap()
        .documents_with_status(ProcessingStatus::Pending)
        .unwrap()[0]
        .id;

    commands::execute_process(ProcessArgs { id: id.to_string() }, &app, &formatter)
        .await
        .unwrap();
    commands::execute_summary(&app, &formatter).unwrap();
    commands::execute_recent(RecentArgs { limit: Some(1) }, &app, &formatter).unwrap();
    commands::execute_signals(
        SignalsArgs {
            document: id.to_string(),
        },
        &app,
        &formatter,
    )
    .unwrap();
}

#[tokio::test]
async fn test_watch_runs_bounded_cycles() {
    let (dir, app, formatter) = setup();
    ingest_brief(&dir, &app, &formatter);

    commands::execute_watch(WatchArgs { cycles: Some(1) }, &app, &formatter)
        .await
        .unwrap();
    assert_eq!(app.lock_store().unwrap().count_signals().unwrap(), 2);
}

#[test]
fn test_ingest_rejects_out_of_range_weight() {
    let (dir, app, formatter) = setup();
    let file = dir.path().join("deck.txt");
    fs::write(&file, BRIEF).unwrap();

    let args = IngestArgs {
        file,
        kind: KindArg::PitchDeck,
        weight: Some(1.5),
        title: None,
    };
    let err = commands::execute_ingest(args, &app, &formatter).unwrap_err();
    assert!(matches!(err, CliError::InvalidInput(_)));
}

#[test]
fn test_ingest_empty_file_fails() {
    let (dir, app, formatter) = setup();
    let file = dir.path().join("empty.txt");
    fs::write(&file, "   \n\n").unwrap();

    let args = IngestArgs {
        file,
        kind: KindArg::ResearchFile,
        weight: None,
        title: Some("Empty".to_string()),
    };
    let err = commands::execute_ingest(args, &app, &formatter).unwrap_err();
    assert!(matches!(err, CliError::Pipeline(_)));
}

#[tokio::test]
async fn test_invalid_document_id_is_rejected() {
    let (_dir, app, formatter) = setup();
    let err = commands::execute_process(
        ProcessArgs {
            id: "not-a-uuid".to_string(),
        },
        &app,
        &formatter,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, CliError::InvalidInput(_)));
}

#[test]
fn test_unknown_document_and_profile_are_not_found() {
    let (_dir, app, formatter) = setup();
    let missing = dealsignal_domain::DocumentId::new().to_string();

    let err = commands::execute_signals(SignalsArgs { document: missing }, &app, &formatter)
        .unwrap_err();
    assert!(matches!(err, CliError::NotFound(_)));

    let err = commands::execute_profile(
        ProfileArgs {
            firm: "nobody".to_string(),
        },
        &app,
        &formatter,
    )
    .unwrap_err();
    assert!(matches!(err, CliError::NotFound(_)));
}

#[tokio::test]
async fn test_dispatch_runs_data_commands() {
    let (dir, app, formatter) = setup();
    ingest_brief(&dir, &app, &formatter);

    commands::execute(DataCommand::ProcessAll, &app, &formatter)
        .await
        .unwrap();
    commands::execute(DataCommand::Summary, &app, &formatter)
        .await
        .unwrap();
    assert_eq!(app.lock_store().unwrap().count_signals().unwrap(), 2);
}

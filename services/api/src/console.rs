use crate::infra::{
    parse_kind, ConsoleNotifier, ConsoleStore, InMemoryAccountStore, JsonFileAccountStore,
};
use clap::Args;
use mentor_desk::config::AppConfig;
use mentor_desk::error::AppError;
use mentor_desk::telemetry::{self, LogSink};
use mentor_desk::workflows::roster::{
    template_csv, template_file_name, FailureCause, HttpCredentialNotifier, ImportOutcome,
    RosterImportService, RosterKind, RowStatusBoard,
};
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ImportArgs {
    /// Roster kind: teacher or student
    #[arg(long, value_parser = parse_kind)]
    pub(crate) kind: RosterKind,
    /// CSV file to import
    #[arg(long)]
    pub(crate) file: PathBuf,
    /// JSON store file; created on first use. Defaults to an in-memory store.
    #[arg(long)]
    pub(crate) store: Option<PathBuf>,
    /// Write credentials that could not be e-mailed to this CSV file
    #[arg(long)]
    pub(crate) failures_out: Option<PathBuf>,
    /// Do not e-mail credentials; every new account goes to the failure export
    #[arg(long)]
    pub(crate) skip_notify: bool,
    /// Print the final status of every processed row
    #[arg(long)]
    pub(crate) list_rows: bool,
}

#[derive(Args, Debug)]
pub(crate) struct TemplateArgs {
    /// Roster kind: teacher or student
    #[arg(long, value_parser = parse_kind)]
    pub(crate) kind: RosterKind,
    /// Destination file; prints to stdout when omitted
    #[arg(long)]
    pub(crate) out: Option<PathBuf>,
}

pub(crate) async fn run_import(args: ImportArgs) -> Result<(), AppError> {
    let ImportArgs {
        kind,
        file,
        store,
        failures_out,
        skip_notify,
        list_rows,
    } = args;

    let config = AppConfig::load()?;
    telemetry::init_with_sink(&config.telemetry, LogSink::Stderr)?;

    let store = match store {
        Some(path) => ConsoleStore::File(JsonFileAccountStore::open(path).await?),
        None => ConsoleStore::Memory(InMemoryAccountStore::default()),
    };
    let notifier = if skip_notify {
        ConsoleNotifier::Deferred
    } else {
        ConsoleNotifier::Http(HttpCredentialNotifier::new(&config.notifier)?)
    };

    let service = RosterImportService::new(Arc::new(store), Arc::new(notifier));
    let board = RowStatusBoard::default();
    let reader = BufReader::new(std::fs::File::open(&file)?);
    let outcome = service.import_reader(kind, reader, &board).await?;

    render_import_outcome(&outcome, &file);

    if list_rows {
        println!("\nRow status");
        for (email, status) in board.snapshot() {
            println!("- {email}: {status:?}");
        }
    }

    if let Some(path) = failures_out {
        std::fs::write(&path, outcome.export_failed_credentials())?;
        println!(
            "\nWrote {} credential(s) to {}",
            outcome.notification_failure_count(),
            path.display()
        );
    }

    Ok(())
}

pub(crate) fn run_template(args: TemplateArgs) -> Result<(), AppError> {
    let contents = template_csv(args.kind);
    match args.out {
        Some(path) => {
            std::fs::write(&path, contents)?;
            println!(
                "Wrote {} template to {} (suggested name {})",
                args.kind,
                path.display(),
                template_file_name(args.kind)
            );
        }
        None => println!("{contents}"),
    }
    Ok(())
}

pub(crate) fn render_import_outcome(outcome: &ImportOutcome, file: &std::path::Path) {
    let summary = outcome.summary();

    println!("Roster import ({})", outcome.kind.collection());
    println!("Source: {}", file.display());
    println!("{}", summary.message);

    println!("\nCounts");
    println!("- imported: {}", outcome.imported_count);
    println!("- duplicates skipped: {}", outcome.duplicate_count);
    println!("- credentials e-mailed: {}", outcome.notified_count);
    println!("- invalid rows dropped: {}", outcome.skipped_count);

    if outcome.failures.is_empty() {
        println!("\nFailures: none");
        return;
    }

    println!("\nFailures");
    for failure in &outcome.failures {
        match failure.cause() {
            FailureCause::Notification => {
                println!("- {}: credential e-mail not delivered", failure.email)
            }
            FailureCause::Persistence => println!(
                "- {}: not saved ({})",
                failure.email,
                failure.error.as_deref().unwrap_or("unknown error")
            ),
        }
    }
}

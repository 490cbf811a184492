use crate::console::{run_import, run_template, ImportArgs, TemplateArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use mentor_desk::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Mentor Desk",
    about = "Run the mentorship console backend or import rosters from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Bulk roster import tooling
    Roster {
        #[command(subcommand)]
        command: RosterCommand,
    },
}

#[derive(Subcommand, Debug)]
enum RosterCommand {
    /// Import a teacher or student CSV and provision credentials
    Import(ImportArgs),
    /// Write the CSV template for a roster kind
    Template(TemplateArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Roster {
            command: RosterCommand::Import(args),
        } => run_import(args).await,
        Command::Roster {
            command: RosterCommand::Template(args),
        } => run_template(args),
    }
}

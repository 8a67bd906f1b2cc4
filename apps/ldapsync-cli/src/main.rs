//! ldapsync CLI - Directory sync from the command line
//!
//! This CLI enables operators to:
//! - Fetch a directory and print its user/group membership report
//! - Try out filters against an offline entry dump
//! - Check a user's credentials against the directory server

use clap::{Parser, Subcommand};

use ldapsync_cli::commands;
use ldapsync_cli::error::CliResult;
use ldapsync_cli::logging::{self, LogLevel};

/// ldapsync - Directory user and group sync
#[derive(Parser)]
#[command(name = "ldapsync")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Show progress messages
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Show binds, searches and classification counts
    #[arg(long, global = true)]
    debug: bool,

    /// Show everything
    #[arg(long, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the directory and print the membership report
    Sync(commands::sync::SyncArgs),

    /// Check a user's credentials with a simple bind
    Auth(commands::auth::AuthArgs),

    /// Show how the filters classify an entry dump
    Classify(commands::classify::ClassifyArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    logging::init(LogLevel::from_flags(cli.verbose, cli.debug, cli.trace));

    let result = run(cli).await;

    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            e.print();
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    match cli.command {
        Commands::Sync(args) => commands::sync::execute(args).await,
        Commands::Auth(args) => commands::auth::execute(args).await,
        Commands::Classify(args) => commands::classify::execute(args).await,
    }
}

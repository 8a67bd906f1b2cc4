//! Sync command - fetch the directory and print the membership report

use clap::Args;
use std::path::PathBuf;
use tracing::info;

use ldapsync_core::prelude::*;
use ldapsync_core::sync;
use ldapsync_ldap::LdapSource;

use crate::config::load_sync_config;
use crate::error::CliResult;
use crate::output::{print_summary, render, OutputFormat};

/// Arguments for the sync command
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Sync configuration file (YAML, or JSON with a .json extension)
    #[arg(short, long)]
    pub config: PathBuf,

    /// Read entries from a JSON dump instead of connecting to the server
    #[arg(short, long)]
    pub entries: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Do not print the one-line summary to stderr
    #[arg(short, long)]
    pub quiet: bool,
}

/// Execute the sync command
pub async fn execute(args: SyncArgs) -> CliResult<()> {
    let config = load_sync_config(&args.config)?;
    let rules = config.rules.clone();

    let snapshot = match &args.entries {
        Some(path) => {
            info!(path = %path.display(), "Using offline entry dump");
            let source = StaticSource::from_json_file(path)?;
            sync::run(&source, &rules).await?
        }
        None => {
            let source = LdapSource::new(config)?;
            sync::run(&source, &rules).await?
        }
    };

    let report = snapshot.report();
    println!("{}", render(&report, args.format)?);

    if !args.quiet {
        print_summary(&format!(
            "{} entries, {} users, {} groups, {} memberships",
            snapshot.entries().len(),
            report.users.len(),
            report.groups.len(),
            report.membership_count()
        ));
    }

    Ok(())
}

//! Classify command - show how the filters split an entry dump

use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use ldapsync_core::prelude::*;

use crate::config::load_sync_config;
use crate::error::{CliError, CliResult};
use crate::output::{render, OutputFormat};

/// Arguments for the classify command
#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Sync configuration file providing the filters
    #[arg(short, long)]
    pub config: PathBuf,

    /// JSON dump of directory entries
    #[arg(short, long)]
    pub entries: PathBuf,

    /// Also check whether this user DN belongs to --group
    #[arg(long, requires = "group")]
    pub user: Option<String>,

    /// Group DN for the membership check
    #[arg(long, requires = "user")]
    pub group: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ClassifiedEntry {
    id: String,
    distinguished_name: String,
}

impl From<&Entry> for ClassifiedEntry {
    fn from(entry: &Entry) -> Self {
        Self {
            id: entry.simple_name().to_string(),
            distinguished_name: entry.dn.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MembershipCheck {
    user: String,
    group: String,
    verdict: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ClassifyOutput {
    users: Vec<ClassifiedEntry>,
    groups: Vec<ClassifiedEntry>,
    unclassified: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    membership: Option<MembershipCheck>,
}

fn verdict(membership: Membership) -> &'static str {
    match membership {
        Membership::Member => "member",
        Membership::NotMember => "notMember",
        Membership::UnknownUser => "unknownUser",
        Membership::UnknownGroup => "unknownGroup",
    }
}

/// Execute the classify command
pub async fn execute(args: ClassifyArgs) -> CliResult<()> {
    let config = load_sync_config(&args.config)?;
    let source = StaticSource::from_json_file(&args.entries)?;
    let entries = source.fetch_entries().await?;

    let snapshot = DirectorySnapshot::new(entries, &config.rules);

    let classification = snapshot.classification();
    let unclassified = snapshot
        .entries()
        .iter()
        .filter(|entry| {
            !classification
                .users
                .iter()
                .chain(&classification.groups)
                .any(|classified| std::ptr::eq(*classified, *entry))
        })
        .count();
    let users: Vec<ClassifiedEntry> = classification.users.into_iter().map(Into::into).collect();
    let groups: Vec<ClassifiedEntry> = classification.groups.into_iter().map(Into::into).collect();

    let membership = match (args.user, args.group) {
        (Some(user), Some(group)) => Some(MembershipCheck {
            verdict: verdict(snapshot.membership(&user, &group)),
            user,
            group,
        }),
        (None, None) => None,
        _ => {
            return Err(CliError::Validation(
                "--user and --group must be given together".to_string(),
            ))
        }
    };

    let output = ClassifyOutput {
        users,
        groups,
        unclassified,
        membership,
    };
    println!("{}", render(&output, args.format)?);

    Ok(())
}

//! Sync orchestration: fetch from a source, then classify.

use tracing::{info, instrument};

use crate::error::DirectoryResult;
use crate::rules::SyncRules;
use crate::snapshot::DirectorySnapshot;
use crate::source::DirectorySource;

/// Fetch all entries from `source` and build a snapshot with `rules`.
///
/// Source errors are returned unchanged; everything after the fetch is
/// infallible.
#[instrument(skip_all, fields(source = %source.display_name()))]
pub async fn run<S>(source: &S, rules: &SyncRules) -> DirectoryResult<DirectorySnapshot>
where
    S: DirectorySource + ?Sized,
{
    let entries = source.fetch_entries().await?;
    info!(entries = entries.len(), "Fetched directory entries");

    let snapshot = DirectorySnapshot::new(entries, rules);
    info!(
        users = snapshot.users().len(),
        groups = snapshot.groups().len(),
        "Directory snapshot classified"
    );

    Ok(snapshot)
}

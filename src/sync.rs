//! Album reconciliation — search, diff against current membership, and add
//! whatever is missing. Removal is never performed: assets that drop out of a
//! search result stay in the album.

use std::collections::HashSet;

use tracing::{error, info};

use crate::config::AlbumRule;
use crate::immich::{Asset, ImmichClient, ImmichError};

/// Result of one album pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlbumOutcome {
    /// Every search hit was already a member.
    UpToDate,
    /// All missing assets were added.
    Added(usize),
    /// The server rejected at least one of `attempted` ids.
    AddFailed { attempted: usize },
}

/// Tally of a full pass over the configured albums.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleStats {
    pub albums: usize,
    pub up_to_date: usize,
    pub assets_added: usize,
    pub add_failures: usize,
    pub errors: usize,
}

impl CycleStats {
    fn record(&mut self, outcome: AlbumOutcome) {
        match outcome {
            AlbumOutcome::UpToDate => self.up_to_date += 1,
            AlbumOutcome::Added(n) => self.assets_added += n,
            AlbumOutcome::AddFailed { .. } => self.add_failures += 1,
        }
    }
}

impl std::fmt::Display for CycleStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} albums, {} assets added, {} up to date, {} partial failures, {} errors",
            self.albums, self.assets_added, self.up_to_date, self.add_failures, self.errors
        )
    }
}

/// Ids found by the search but absent from the album, in search order and
/// without duplicates.
pub fn missing_asset_ids(found: &[Asset], members: &[Asset]) -> Vec<String> {
    let member_ids: HashSet<&str> = members.iter().map(|a| a.id.as_str()).collect();
    let mut seen = HashSet::new();
    found
        .iter()
        .map(|a| a.id.as_str())
        .filter(|id| !member_ids.contains(id) && seen.insert(*id))
        .map(str::to_owned)
        .collect()
}

/// Bring one album up to date with its search.
pub async fn sync_album(
    client: &ImmichClient,
    rule: &AlbumRule,
) -> Result<AlbumOutcome, ImmichError> {
    let album = rule.album_id.as_str();

    let found = client.search_assets_by_metadata(&rule.search_params).await?;
    info!(album, count = found.len(), "Found assets from search");

    let members = client.get_album_assets(album).await?;
    info!(album, count = members.len(), "Found assets in album");

    let to_add = missing_asset_ids(&found, &members);
    info!(album, count = to_add.len(), "Assets to add to album");

    if to_add.is_empty() {
        info!(album, "No assets to add");
        return Ok(AlbumOutcome::UpToDate);
    }

    if client.add_assets_to_album(album, &to_add).await? {
        info!(album, count = to_add.len(), "Added assets to album");
        Ok(AlbumOutcome::Added(to_add.len()))
    } else {
        error!(album, attempted = to_add.len(), "Failed to add assets to album");
        Ok(AlbumOutcome::AddFailed {
            attempted: to_add.len(),
        })
    }
}

/// The client plus the album rules it serves, built once at startup.
#[derive(Debug)]
pub struct Reconciler {
    client: ImmichClient,
    rules: Vec<AlbumRule>,
}

impl Reconciler {
    pub fn new(client: ImmichClient, rules: Vec<AlbumRule>) -> Self {
        Self { client, rules }
    }

    /// Sync every album in configured order. A failing album is logged and
    /// skipped so the remaining albums are still processed.
    pub async fn run_cycle(&self) -> CycleStats {
        let mut stats = CycleStats::default();

        for rule in &self.rules {
            info!(album = %rule.album_id, "Processing album");
            stats.albums += 1;
            match sync_album(&self.client, rule).await {
                Ok(outcome) => stats.record(outcome),
                Err(e) => {
                    stats.errors += 1;
                    error!(album = %rule.album_id, error = %e, "Album sync failed");
                }
            }
        }

        info!(
            albums = stats.albums,
            added = stats.assets_added,
            up_to_date = stats.up_to_date,
            partial_failures = stats.add_failures,
            errors = stats.errors,
            "Sync pass complete"
        );
        stats
    }
}

//! # Album Reconciler
//!
//! Mirrors the source album set into the destination and produces the
//! source-to-destination album ID mapping the linking pass runs on.
//!
//! ## Idempotence
//!
//! Reconciliation looks each album up by name before creating it, so
//! re-running against a destination that already carries the albums reuses
//! them instead of minting duplicates.
//!
//! ## Failure Containment
//!
//! A single album that cannot be looked up or created is counted as failed
//! and left out of the mapping; the remaining albums still reconcile. Only
//! a failure to list the source albums aborts the pass.

use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};
use transfer_traits::destination::MediaDestination;
use transfer_traits::media::Album;
use transfer_traits::source::MediaSource;

use crate::error::Result;
use crate::stats::TransferStats;

// ============================================================================
// Album Mapping
// ============================================================================

/// Source album ID to destination album ID mapping
#[derive(Debug, Clone, Default)]
pub struct AlbumMapping {
    map: HashMap<String, String>,
}

impl AlbumMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, source_id: impl Into<String>, destination_id: impl Into<String>) {
        self.map.insert(source_id.into(), destination_id.into());
    }

    pub fn get(&self, source_id: &str) -> Option<&str> {
        self.map.get(source_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.map.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

// ============================================================================
// Album Reconciler
// ============================================================================

/// Ensures every source album has a destination counterpart
pub struct AlbumReconciler<'a> {
    source: &'a dyn MediaSource,
    destination: &'a dyn MediaDestination,

    /// When set, map albums to synthetic IDs without touching the destination
    dry_run: bool,
}

impl<'a> AlbumReconciler<'a> {
    pub fn new(
        source: &'a dyn MediaSource,
        destination: &'a dyn MediaDestination,
        dry_run: bool,
    ) -> Self {
        Self {
            source,
            destination,
            dry_run,
        }
    }

    /// Reconcile all source albums, returning the ID mapping
    #[instrument(skip(self, stats))]
    pub async fn reconcile(&self, stats: &mut TransferStats) -> Result<AlbumMapping> {
        let albums = self.source.list_albums().await?;
        info!("Found {} albums in source library", albums.len());

        let mut mapping = AlbumMapping::new();
        for album in &albums {
            stats.albums_total += 1;

            if self.dry_run {
                info!("[DRY RUN] Would ensure album '{}' exists", album.title);
                mapping.insert(&album.id, format!("dry-run-album-{}", album.id));
                stats.albums_success += 1;
                continue;
            }

            match self.ensure_album(album).await {
                Ok(destination_id) => {
                    mapping.insert(&album.id, destination_id);
                    stats.albums_success += 1;
                }
                Err(e) => {
                    warn!("Failed to reconcile album '{}': {}", album.title, e);
                    stats.albums_failed += 1;
                }
            }
        }

        info!(
            "Album reconciliation complete, {} albums mapped",
            stats.albums_success
        );
        Ok(mapping)
    }

    /// Find the destination album by name, creating it if absent
    async fn ensure_album(&self, album: &Album) -> Result<String> {
        if let Some(existing) = self.destination.get_album_by_name(&album.title).await? {
            debug!("Album '{}' already exists as {}", album.title, existing.id);
            return Ok(existing.id);
        }

        let created = self
            .destination
            .create_album(&album.title, album.description.as_deref())
            .await?;
        info!("Created album '{}' as {}", album.title, created.id);
        Ok(created.id)
    }
}

//! # Transfer Coordinator
//!
//! The highest-level transfer component. Drives a complete migration run
//! from a [`MediaSource`] to a [`MediaDestination`] through its fixed
//! sequence of phases.
//!
//! ## Overview
//!
//! The coordinator owns the source and destination connectors plus a
//! [`TransferConfig`], and produces a [`TransferRun`] describing what
//! happened. It contains no provider-specific logic; everything it knows
//! about the services comes through the connector traits.
//!
//! ## Workflow
//!
//! 1. **Album reconciliation**: mirror the source album set into the
//!    destination, producing the album ID mapping (skippable).
//! 2. **Library transfer**: walk the unaffiliated source library page by
//!    page and transfer every item.
//! 3. **Membership linking**: walk each reconciled album and make sure its
//!    items are members of the destination counterpart, reusing photos the
//!    destination already holds.
//!
//! Each phase advances the run through [`RunPhase`] in order; the counters
//! accumulated along the way end up in [`TransferStats`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! let coordinator = TransferCoordinator::new(config, source, destination);
//! let run = coordinator.run().await?;
//! println!("{} transferred, {} failed", run.stats.success, run.stats.failed);
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};
use transfer_traits::destination::MediaDestination;
use transfer_traits::source::MediaSource;

use crate::album_sync::{AlbumMapping, AlbumReconciler};
use crate::error::Result;
use crate::fetcher::BatchFetcher;
use crate::item_sync::ItemSynchronizer;
use crate::linker::AlbumLinker;
use crate::stats::{RunPhase, TransferRun, TransferStats};

// ============================================================================
// Configuration
// ============================================================================

/// Configuration for a transfer run
#[derive(Debug, Clone)]
pub struct TransferConfig {
    /// Page size requested from the source listing
    pub batch_size: u32,

    /// Cap on items consumed per listing pass (None = no cap)
    pub max_items: Option<u64>,

    /// Log what would happen without calling mutating operations
    pub dry_run: bool,

    /// Whether to reconcile albums and link their membership
    pub transfer_albums: bool,

    /// Directory media is staged in between download and upload
    pub staging_dir: PathBuf,

    /// Pause inserted between consecutive source page fetches
    pub page_delay: Duration,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            batch_size: 50,
            max_items: None,
            dry_run: false,
            transfer_albums: true,
            staging_dir: std::env::temp_dir().join("photoport-staging"),
            page_delay: Duration::from_secs(1),
        }
    }
}

// ============================================================================
// Transfer Coordinator
// ============================================================================

/// Coordinates a complete transfer run
pub struct TransferCoordinator {
    /// Run configuration
    config: TransferConfig,

    /// Service media is read from
    source: Arc<dyn MediaSource>,

    /// Service media is written to
    destination: Arc<dyn MediaDestination>,
}

impl TransferCoordinator {
    pub fn new(
        config: TransferConfig,
        source: Arc<dyn MediaSource>,
        destination: Arc<dyn MediaDestination>,
    ) -> Self {
        Self {
            config,
            source,
            destination,
        }
    }

    /// Execute a full transfer run
    #[instrument(skip(self), fields(dry_run = self.config.dry_run))]
    pub async fn run(&self) -> Result<TransferRun> {
        let mut run = TransferRun::new(self.config.dry_run);
        info!(run_id = %run.id, "Starting transfer run");

        if !self.config.dry_run {
            tokio::fs::create_dir_all(&self.config.staging_dir).await?;
        }

        let mapping = if self.config.transfer_albums {
            let reconciler = AlbumReconciler::new(
                self.source.as_ref(),
                self.destination.as_ref(),
                self.config.dry_run,
            );
            reconciler.reconcile(&mut run.stats).await?
        } else {
            info!("Album transfer disabled, skipping album reconciliation");
            AlbumMapping::default()
        };
        run.advance(RunPhase::AlbumsReconciled)?;

        self.transfer_library_items(&mut run.stats).await?;
        run.advance(RunPhase::ItemsTransferred)?;

        if self.config.transfer_albums && !mapping.is_empty() {
            let linker = AlbumLinker::new(
                self.source.as_ref(),
                self.destination.as_ref(),
                &self.config,
            );
            linker.link_albums(&mapping, &mut run.stats).await?;
        }
        run.advance(RunPhase::AlbumMembershipLinked)?;

        run.advance(RunPhase::Done)?;
        info!(
            run_id = %run.id,
            success = run.stats.success,
            failed = run.stats.failed,
            skipped = run.stats.skipped,
            albums = run.stats.albums_success,
            "Transfer run complete"
        );
        Ok(run)
    }

    /// Transfer the unaffiliated library, counting every item seen
    async fn transfer_library_items(&self, stats: &mut TransferStats) -> Result<()> {
        info!("Transferring unaffiliated library items");

        let mut fetcher = BatchFetcher::new(
            self.source.as_ref(),
            None,
            self.config.batch_size,
            self.config.max_items,
            self.config.page_delay,
        );
        let synchronizer = ItemSynchronizer::new(
            self.source.as_ref(),
            self.destination.as_ref(),
            &self.config.staging_dir,
            self.config.dry_run,
        );

        while let Some(items) = fetcher.next_batch().await? {
            debug!("Fetched page of {} items", items.len());
            for item in items {
                stats.total += 1;
                let outcome = synchronizer.transfer_item(&item).await;
                if outcome.success {
                    stats.success += 1;
                } else {
                    stats.failed += 1;
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::Mutex;
    use transfer_traits::error::{ProviderError, Result as ProviderResult};
    use transfer_traits::media::{
        Album, MediaItem, MediaKind, RemoteAlbum, RemotePhoto, StagedMedia, UploadMetadata,
        UploadOutcome,
    };

    /// Source with an optional top-level library and no albums
    struct FakeSource {
        library_items: Vec<MediaItem>,
        fail_album_listing: bool,
    }

    #[async_trait]
    impl MediaSource for FakeSource {
        async fn list_albums(&self) -> ProviderResult<Vec<Album>> {
            if self.fail_album_listing {
                return Err(ProviderError::OperationFailed(
                    "album listing should not run".to_string(),
                ));
            }
            Ok(Vec::new())
        }

        async fn get_album_details(&self, _album_id: &str) -> ProviderResult<Album> {
            unimplemented!()
        }

        async fn list_media_items(
            &self,
            _page_size: u32,
            _page_token: Option<String>,
            _album_id: Option<&str>,
        ) -> ProviderResult<(Vec<MediaItem>, Option<String>)> {
            Ok((self.library_items.clone(), None))
        }

        async fn download_media_item(
            &self,
            item: &MediaItem,
            staging_dir: &Path,
        ) -> ProviderResult<StagedMedia> {
            let path = staging_dir.join(&item.filename);
            std::fs::write(&path, b"media bytes").map_err(ProviderError::Io)?;
            Ok(StagedMedia {
                source_id: item.id.clone(),
                filename: item.filename.clone(),
                path,
                mime_type: item.mime_type.clone(),
                creation_time: item.creation_time,
                width: item.width,
                height: item.height,
            })
        }
    }

    #[derive(Default)]
    struct FakeDestination {
        uploads: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl MediaDestination for FakeDestination {
        async fn get_album_by_name(&self, _name: &str) -> ProviderResult<Option<RemoteAlbum>> {
            Ok(None)
        }

        async fn create_album(
            &self,
            name: &str,
            _description: Option<&str>,
        ) -> ProviderResult<RemoteAlbum> {
            Ok(RemoteAlbum {
                id: format!("dest-{name}"),
                name: name.to_string(),
            })
        }

        async fn list_photos(&self, _album_id: Option<&str>) -> ProviderResult<Vec<RemotePhoto>> {
            Ok(Vec::new())
        }

        async fn upload_photo(
            &self,
            path: &Path,
            _metadata: Option<&UploadMetadata>,
        ) -> ProviderResult<UploadOutcome> {
            let filename = path.file_name().unwrap().to_string_lossy().to_string();
            self.uploads.lock().unwrap().push(filename.clone());
            Ok(UploadOutcome::succeeded("dest-1", filename))
        }

        async fn add_photo_to_album(
            &self,
            _photo_id: &str,
            _album_id: &str,
        ) -> ProviderResult<bool> {
            Ok(true)
        }
    }

    fn test_config(name: &str) -> TransferConfig {
        TransferConfig {
            staging_dir: std::env::temp_dir().join(format!(
                "coordinator-tests-{}-{}",
                std::process::id(),
                name
            )),
            ..TransferConfig::default()
        }
    }

    fn image(id: &str, filename: &str) -> MediaItem {
        MediaItem {
            id: id.to_string(),
            filename: filename.to_string(),
            kind: MediaKind::Image,
            mime_type: Some("image/jpeg".to_string()),
            size_bytes: None,
            creation_time: None,
            width: None,
            height: None,
            download_url: Some(format!("https://example.com/{id}")),
        }
    }

    #[tokio::test]
    async fn test_empty_source_completes_all_phases() {
        let source = Arc::new(FakeSource {
            library_items: vec![],
            fail_album_listing: false,
        });
        let destination = Arc::new(FakeDestination::default());
        let config = test_config("empty");
        let staging_dir = config.staging_dir.clone();

        let coordinator = TransferCoordinator::new(config, source, destination);
        let run = coordinator.run().await.unwrap();

        assert_eq!(run.phase, RunPhase::Done);
        assert!(run.completed_at.is_some());
        assert_eq!(run.stats, TransferStats::default());

        std::fs::remove_dir_all(&staging_dir).unwrap();
    }

    #[tokio::test]
    async fn test_album_stages_skipped_when_disabled() {
        let source = Arc::new(FakeSource {
            library_items: vec![image("m1", "a.jpg")],
            fail_album_listing: true,
        });
        let destination = Arc::new(FakeDestination::default());
        let config = TransferConfig {
            transfer_albums: false,
            ..test_config("skip-albums")
        };
        let staging_dir = config.staging_dir.clone();

        let coordinator = TransferCoordinator::new(config, source, destination.clone());
        let run = coordinator.run().await.unwrap();

        assert_eq!(run.phase, RunPhase::Done);
        assert_eq!(run.stats.total, 1);
        assert_eq!(run.stats.success, 1);
        assert_eq!(run.stats.albums_total, 0);
        assert_eq!(destination.uploads.lock().unwrap().as_slice(), ["a.jpg"]);

        std::fs::remove_dir_all(&staging_dir).unwrap();
    }
}

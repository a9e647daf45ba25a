//! # Media Item Synchronizer
//!
//! Transfers one media item end-to-end: fetch from the source into a local
//! staging file, push to the destination, release the staging file.
//!
//! ## Outcome Classification
//!
//! Per-item failures are data, not errors: every call returns an
//! [`UploadOutcome`] so one bad item never aborts the surrounding batch.
//! A fetch failure skips the destination entirely; an upload failure still
//! releases the staging file, so local disk usage stays bounded to the item
//! currently in flight.

use std::path::Path;
use tracing::{debug, info, instrument, warn};
use transfer_traits::destination::MediaDestination;
use transfer_traits::media::{MediaItem, UploadMetadata, UploadOutcome};
use transfer_traits::source::MediaSource;

/// Transfers single media items between a source and a destination
pub struct ItemSynchronizer<'a> {
    source: &'a dyn MediaSource,
    destination: &'a dyn MediaDestination,

    /// Directory downloads are staged in before upload
    staging_dir: &'a Path,

    /// When set, synthesize success without touching the network or disk
    dry_run: bool,
}

impl<'a> ItemSynchronizer<'a> {
    pub fn new(
        source: &'a dyn MediaSource,
        destination: &'a dyn MediaDestination,
        staging_dir: &'a Path,
        dry_run: bool,
    ) -> Self {
        Self {
            source,
            destination,
            staging_dir,
            dry_run,
        }
    }

    /// Transfer one media item, classifying the result
    ///
    /// Never returns an error; fetch and upload failures come back as a
    /// failed outcome with the reason attached.
    #[instrument(skip(self, item), fields(item_id = %item.id, filename = %item.filename))]
    pub async fn transfer_item(&self, item: &MediaItem) -> UploadOutcome {
        if self.dry_run {
            info!("[DRY RUN] Would transfer {}", item.filename);
            return UploadOutcome::succeeded("dry-run-id", item.filename.clone());
        }

        let staged = match self.source.download_media_item(item, self.staging_dir).await {
            Ok(staged) => staged,
            Err(e) => {
                warn!("Failed to fetch {}: {}", item.filename, e);
                return UploadOutcome::failed(item.filename.clone(), e.to_string());
            }
        };

        let metadata = UploadMetadata {
            source_id: item.id.clone(),
            creation_time: item.creation_time,
            width: item.width,
            height: item.height,
            kind: item.kind,
        };

        let outcome = match self
            .destination
            .upload_photo(&staged.path, Some(&metadata))
            .await
        {
            Ok(outcome) => {
                if outcome.success {
                    info!("Transferred {}", item.filename);
                } else {
                    warn!(
                        "Failed to upload {}: {}",
                        item.filename,
                        outcome.error.as_deref().unwrap_or("unknown error")
                    );
                }
                outcome
            }
            Err(e) => {
                warn!("Upload of {} failed: {}", item.filename, e);
                UploadOutcome::failed(item.filename.clone(), e.to_string())
            }
        };

        // Release the stage whether the upload succeeded or not
        self.release_stage(&staged.path).await;

        outcome
    }

    async fn release_stage(&self, path: &Path) {
        match tokio::fs::remove_file(path).await {
            Ok(()) => debug!("Removed staged file {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Could not remove staged file {}: {}", path.display(), e),
        }
    }
}

//! # Album Membership Linker
//!
//! Walks each reconciled album's contents and makes sure every item ends up
//! a member of the matching destination album.
//!
//! ## Duplicate Avoidance
//!
//! Before walking an album, the linker snapshots the destination album's
//! photos into a filename index. Items already present are linked without
//! re-uploading; items transferred during the walk are added to the index so
//! later occurrences of the same filename reuse the first upload.
//!
//! ## Counting
//!
//! Album walks never touch `stats.total`; that belongs to the unaffiliated
//! library pass. They do count `success`, `failed` and `skipped`, so an item
//! living in several albums is counted once per album it was walked under.
//! Membership link failures are logged but never counted or escalated.

use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};
use transfer_traits::destination::MediaDestination;
use transfer_traits::source::MediaSource;

use crate::album_sync::AlbumMapping;
use crate::coordinator::TransferConfig;
use crate::error::Result;
use crate::fetcher::BatchFetcher;
use crate::item_sync::ItemSynchronizer;
use crate::stats::TransferStats;

/// Ensures album membership on the destination for every reconciled album
pub struct AlbumLinker<'a> {
    source: &'a dyn MediaSource,
    destination: &'a dyn MediaDestination,
    config: &'a TransferConfig,
}

impl<'a> AlbumLinker<'a> {
    pub fn new(
        source: &'a dyn MediaSource,
        destination: &'a dyn MediaDestination,
        config: &'a TransferConfig,
    ) -> Self {
        Self {
            source,
            destination,
            config,
        }
    }

    /// Walk every mapped album and replicate its membership
    #[instrument(skip(self, mapping, stats), fields(albums = mapping.len()))]
    pub async fn link_albums(
        &self,
        mapping: &AlbumMapping,
        stats: &mut TransferStats,
    ) -> Result<()> {
        for (source_album_id, destination_album_id) in mapping.iter() {
            self.link_album(source_album_id, destination_album_id, stats)
                .await?;
        }
        Ok(())
    }

    /// Replicate one album's membership into its destination counterpart
    async fn link_album(
        &self,
        source_album_id: &str,
        destination_album_id: &str,
        stats: &mut TransferStats,
    ) -> Result<()> {
        let album = self.source.get_album_details(source_album_id).await?;
        info!("Processing album '{}'", album.title);

        let mut fetcher = BatchFetcher::new(
            self.source,
            Some(source_album_id.to_string()),
            self.config.batch_size,
            self.config.max_items,
            self.config.page_delay,
        );

        if self.config.dry_run {
            while let Some(items) = fetcher.next_batch().await? {
                for item in items {
                    info!(
                        "[DRY RUN] Would ensure {} is in album '{}'",
                        item.filename, album.title
                    );
                }
            }
            return Ok(());
        }

        let mut index = self.existing_photos(destination_album_id).await;
        let synchronizer = ItemSynchronizer::new(
            self.source,
            self.destination,
            &self.config.staging_dir,
            false,
        );

        while let Some(items) = fetcher.next_batch().await? {
            for item in items {
                if let Some(photo_id) = index.get(&item.filename).cloned() {
                    debug!("{} already in destination, linking only", item.filename);
                    stats.skipped += 1;
                    self.link_photo(&photo_id, destination_album_id, &item.filename)
                        .await;
                    continue;
                }

                let outcome = synchronizer.transfer_item(&item).await;
                match outcome.photo_id {
                    Some(photo_id) if outcome.success => {
                        stats.success += 1;
                        // Filename is the dedup key: a later item with the
                        // same name reuses this upload instead of its own.
                        index.insert(item.filename.clone(), photo_id.clone());
                        self.link_photo(&photo_id, destination_album_id, &item.filename)
                            .await;
                    }
                    _ => {
                        warn!(
                            "Could not transfer {} for album '{}': {}",
                            item.filename,
                            album.title,
                            outcome.error.as_deref().unwrap_or("unknown error")
                        );
                        stats.failed += 1;
                    }
                }
            }
        }

        Ok(())
    }

    /// Snapshot the destination album's photos as a filename index
    ///
    /// A listing failure degrades to an empty index; the walk then uploads
    /// everything rather than aborting the album.
    async fn existing_photos(&self, destination_album_id: &str) -> HashMap<String, String> {
        match self.destination.list_photos(Some(destination_album_id)).await {
            Ok(photos) => photos.into_iter().map(|p| (p.name, p.id)).collect(),
            Err(e) => {
                warn!(
                    "Could not list photos in destination album {}: {}",
                    destination_album_id, e
                );
                HashMap::new()
            }
        }
    }

    async fn link_photo(&self, photo_id: &str, album_id: &str, filename: &str) {
        match self
            .destination
            .add_photo_to_album(photo_id, album_id)
            .await
        {
            Ok(true) => debug!("Linked {} into album {}", filename, album_id),
            Ok(false) => warn!("Could not link {} into album {}", filename, album_id),
            Err(e) => warn!("Could not link {} into album {}: {}", filename, album_id, e),
        }
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

    struct FakeSource {
        album_items: Vec<MediaItem>,
        downloads: Mutex<Vec<String>>,
    }

    impl FakeSource {
        fn new(album_items: Vec<MediaItem>) -> Self {
            Self {
                album_items,
                downloads: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl MediaSource for FakeSource {
        async fn list_albums(&self) -> ProviderResult<Vec<Album>> {
            unimplemented!()
        }

        async fn get_album_details(&self, album_id: &str) -> ProviderResult<Album> {
            Ok(Album {
                id: album_id.to_string(),
                title: format!("Album {album_id}"),
                description: None,
                item_count: Some(self.album_items.len() as u64),
            })
        }

        async fn list_media_items(
            &self,
            _page_size: u32,
            _page_token: Option<String>,
            album_id: Option<&str>,
        ) -> ProviderResult<(Vec<MediaItem>, Option<String>)> {
            assert!(album_id.is_some());
            Ok((self.album_items.clone(), None))
        }

        async fn download_media_item(
            &self,
            item: &MediaItem,
            staging_dir: &Path,
        ) -> ProviderResult<StagedMedia> {
            self.downloads.lock().unwrap().push(item.id.clone());

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
        album_photos: Vec<RemotePhoto>,
        fail_photo_listing: bool,
        reject_uploads: bool,
        decline_links: bool,
        uploads: Mutex<Vec<String>>,
        links: Mutex<Vec<(String, String)>>,
    }

    impl FakeDestination {
        fn uploaded(&self) -> Vec<String> {
            self.uploads.lock().unwrap().clone()
        }

        fn linked(&self) -> Vec<(String, String)> {
            self.links.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MediaDestination for FakeDestination {
        async fn get_album_by_name(&self, _name: &str) -> ProviderResult<Option<RemoteAlbum>> {
            unimplemented!()
        }

        async fn create_album(
            &self,
            _name: &str,
            _description: Option<&str>,
        ) -> ProviderResult<RemoteAlbum> {
            unimplemented!()
        }

        async fn list_photos(&self, _album_id: Option<&str>) -> ProviderResult<Vec<RemotePhoto>> {
            if self.fail_photo_listing {
                return Err(ProviderError::OperationFailed("listing broke".to_string()));
            }
            Ok(self.album_photos.clone())
        }

        async fn upload_photo(
            &self,
            path: &Path,
            _metadata: Option<&UploadMetadata>,
        ) -> ProviderResult<UploadOutcome> {
            let filename = path.file_name().unwrap().to_string_lossy().to_string();
            if self.reject_uploads {
                return Ok(UploadOutcome::failed(filename, "rejected"));
            }

            let mut uploads = self.uploads.lock().unwrap();
            uploads.push(filename.clone());
            let id = format!("dest-{}", uploads.len());
            Ok(UploadOutcome::succeeded(id, filename))
        }

        async fn add_photo_to_album(
            &self,
            photo_id: &str,
            album_id: &str,
        ) -> ProviderResult<bool> {
            if self.decline_links {
                return Ok(false);
            }
            self.links
                .lock()
                .unwrap()
                .push((photo_id.to_string(), album_id.to_string()));
            Ok(true)
        }
    }

    fn item(id: &str, filename: &str) -> MediaItem {
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

    fn test_config(name: &str) -> TransferConfig {
        let staging_dir = std::env::temp_dir().join(format!(
            "linker-tests-{}-{}",
            std::process::id(),
            name
        ));
        std::fs::create_dir_all(&staging_dir).unwrap();
        TransferConfig {
            staging_dir,
            ..TransferConfig::default()
        }
    }

    fn mapping(source_id: &str, dest_id: &str) -> AlbumMapping {
        let mut mapping = AlbumMapping::new();
        mapping.insert(source_id, dest_id);
        mapping
    }

    fn cleanup(config: &TransferConfig) {
        std::fs::remove_dir_all(&config.staging_dir).unwrap();
    }

    #[tokio::test]
    async fn test_existing_photo_linked_without_upload() {
        let source = FakeSource::new(vec![item("m1", "a.jpg"), item("m2", "b.jpg")]);
        let destination = FakeDestination {
            album_photos: vec![RemotePhoto {
                id: "remote-a".to_string(),
                name: "a.jpg".to_string(),
            }],
            ..Default::default()
        };
        let config = test_config("dedup");

        let linker = AlbumLinker::new(&source, &destination, &config);
        let mut stats = TransferStats::default();
        linker
            .link_albums(&mapping("alb1", "dest-alb1"), &mut stats)
            .await
            .unwrap();

        assert_eq!(destination.uploaded(), vec!["b.jpg"]);
        assert_eq!(
            destination.linked(),
            vec![
                ("remote-a".to_string(), "dest-alb1".to_string()),
                ("dest-1".to_string(), "dest-alb1".to_string()),
            ]
        );
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.success, 1);
        assert_eq!(stats.failed, 0);
        assert_eq!(stats.total, 0);

        cleanup(&config);
    }

    #[tokio::test]
    async fn test_repeated_filename_uploaded_once() {
        // Two distinct items sharing a filename; the second must reuse the
        // upload recorded for the first.
        let source = FakeSource::new(vec![item("m1", "same.jpg"), item("m2", "same.jpg")]);
        let destination = FakeDestination::default();
        let config = test_config("freshness");

        let linker = AlbumLinker::new(&source, &destination, &config);
        let mut stats = TransferStats::default();
        linker
            .link_albums(&mapping("alb1", "dest-alb1"), &mut stats)
            .await
            .unwrap();

        assert_eq!(destination.uploaded(), vec!["same.jpg"]);
        assert_eq!(destination.linked().len(), 2);
        assert_eq!(stats.success, 1);
        assert_eq!(stats.skipped, 1);

        cleanup(&config);
    }

    #[tokio::test]
    async fn test_declined_links_do_not_affect_counters() {
        let source = FakeSource::new(vec![item("m1", "a.jpg")]);
        let destination = FakeDestination {
            decline_links: true,
            ..Default::default()
        };
        let config = test_config("declined");

        let linker = AlbumLinker::new(&source, &destination, &config);
        let mut stats = TransferStats::default();
        linker
            .link_albums(&mapping("alb1", "dest-alb1"), &mut stats)
            .await
            .unwrap();

        assert_eq!(destination.uploaded(), vec!["a.jpg"]);
        assert!(destination.linked().is_empty());
        assert_eq!(stats.success, 1);
        assert_eq!(stats.failed, 0);

        cleanup(&config);
    }

    #[tokio::test]
    async fn test_photo_listing_failure_degrades_to_full_upload() {
        let source = FakeSource::new(vec![item("m1", "a.jpg"), item("m2", "b.jpg")]);
        let destination = FakeDestination {
            fail_photo_listing: true,
            ..Default::default()
        };
        let config = test_config("listing-fail");

        let linker = AlbumLinker::new(&source, &destination, &config);
        let mut stats = TransferStats::default();
        linker
            .link_albums(&mapping("alb1", "dest-alb1"), &mut stats)
            .await
            .unwrap();

        assert_eq!(destination.uploaded(), vec!["a.jpg", "b.jpg"]);
        assert_eq!(stats.success, 2);
        assert_eq!(stats.skipped, 0);

        cleanup(&config);
    }

    #[tokio::test]
    async fn test_failed_transfer_counted_and_not_linked() {
        let source = FakeSource::new(vec![item("m1", "a.jpg")]);
        let destination = FakeDestination {
            reject_uploads: true,
            ..Default::default()
        };
        let config = test_config("reject");

        let linker = AlbumLinker::new(&source, &destination, &config);
        let mut stats = TransferStats::default();
        linker
            .link_albums(&mapping("alb1", "dest-alb1"), &mut stats)
            .await
            .unwrap();

        assert!(destination.uploaded().is_empty());
        assert!(destination.linked().is_empty());
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.success, 0);

        cleanup(&config);
    }

    #[tokio::test]
    async fn test_dry_run_walks_without_destination_calls() {
        let source = FakeSource::new(vec![item("m1", "a.jpg"), item("m2", "b.jpg")]);
        let destination = FakeDestination::default();
        let config = TransferConfig {
            dry_run: true,
            ..test_config("dry-run")
        };

        let linker = AlbumLinker::new(&source, &destination, &config);
        let mut stats = TransferStats::default();
        linker
            .link_albums(&mapping("alb1", "dest-alb1"), &mut stats)
            .await
            .unwrap();

        assert!(source.downloads.lock().unwrap().is_empty());
        assert!(destination.uploaded().is_empty());
        assert!(destination.linked().is_empty());
        assert_eq!(stats, TransferStats::default());

        cleanup(&config);
    }
}

//! # Batch Fetcher
//!
//! Walks a paginated media listing as a bounded sequence of batches.
//!
//! ## Overview
//!
//! Source services hand out media pages behind opaque continuation cursors.
//! The fetcher owns that cursor, shrinks page requests so an optional global
//! item cap is never overshot, and paces page requests with a fixed delay
//! between them. The delay never precedes the first page and never follows
//! the last.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let mut fetcher = BatchFetcher::new(&source, None, 50, Some(120), delay);
//! while let Some(items) = fetcher.next_batch().await? {
//!     for item in items {
//!         // process
//!     }
//! }
//! ```

use crate::error::Result;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;
use transfer_traits::media::MediaItem;
use transfer_traits::source::MediaSource;

/// Cursor-driven batch fetcher over a paginated media listing
pub struct BatchFetcher<'a> {
    source: &'a dyn MediaSource,

    /// Album to list from; `None` walks the whole library
    album_id: Option<String>,

    /// Page size requested from the source, before cap shrinking
    batch_size: u32,

    /// Global cap on items fetched through this fetcher
    max_items: Option<u64>,

    /// Pause inserted between page requests
    page_delay: Duration,

    cursor: Option<String>,
    consumed: u64,
    started: bool,
    exhausted: bool,
}

impl<'a> BatchFetcher<'a> {
    pub fn new(
        source: &'a dyn MediaSource,
        album_id: Option<String>,
        batch_size: u32,
        max_items: Option<u64>,
        page_delay: Duration,
    ) -> Self {
        Self {
            source,
            album_id,
            batch_size,
            max_items,
            page_delay,
            cursor: None,
            consumed: 0,
            started: false,
            exhausted: false,
        }
    }

    /// Fetch the next batch of items
    ///
    /// Returns `Ok(None)` once the listing is exhausted or the item cap is
    /// reached. Listing errors propagate; there is no page-level retry here
    /// beyond what the source connector already does.
    pub async fn next_batch(&mut self) -> Result<Option<Vec<MediaItem>>> {
        if self.exhausted {
            return Ok(None);
        }

        let page_size = self.capped_page_size();
        if page_size == 0 {
            self.exhausted = true;
            return Ok(None);
        }

        if self.started {
            sleep(self.page_delay).await;
        }
        self.started = true;

        let (items, next_cursor) = self
            .source
            .list_media_items(page_size, self.cursor.take(), self.album_id.as_deref())
            .await?;

        debug!(
            "Fetched page of {} items (requested {})",
            items.len(),
            page_size
        );

        self.consumed += items.len() as u64;
        self.cursor = next_cursor;
        if self.cursor.is_none() || items.is_empty() {
            self.exhausted = true;
        }

        if items.is_empty() {
            return Ok(None);
        }

        Ok(Some(items))
    }

    /// Page size for the next request, shrunk so the cap is never overshot
    fn capped_page_size(&self) -> u32 {
        match self.max_items {
            Some(cap) => {
                let remaining = cap.saturating_sub(self.consumed);
                remaining.min(self.batch_size as u64) as u32
            }
            None => self.batch_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::path::Path;
    use std::sync::Mutex;
    use transfer_traits::error::Result as ProviderResult;
    use transfer_traits::media::{Album, MediaKind, StagedMedia};

    /// Replays scripted pages and records every listing request it sees.
    struct ScriptedSource {
        pages: Mutex<VecDeque<(Vec<MediaItem>, Option<String>)>>,
        requests: Mutex<Vec<(u32, Option<String>, Option<String>)>>,
    }

    impl ScriptedSource {
        fn new(pages: Vec<(Vec<MediaItem>, Option<String>)>) -> Self {
            Self {
                pages: Mutex::new(pages.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<(u32, Option<String>, Option<String>)> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MediaSource for ScriptedSource {
        async fn list_albums(&self) -> ProviderResult<Vec<Album>> {
            unimplemented!()
        }

        async fn get_album_details(&self, _album_id: &str) -> ProviderResult<Album> {
            unimplemented!()
        }

        async fn list_media_items(
            &self,
            page_size: u32,
            page_token: Option<String>,
            album_id: Option<&str>,
        ) -> ProviderResult<(Vec<MediaItem>, Option<String>)> {
            self.requests.lock().unwrap().push((
                page_size,
                page_token,
                album_id.map(str::to_string),
            ));
            Ok(self
                .pages
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or((Vec::new(), None)))
        }

        async fn download_media_item(
            &self,
            _item: &MediaItem,
            _staging_dir: &Path,
        ) -> ProviderResult<StagedMedia> {
            unimplemented!()
        }
    }

    fn item(id: &str) -> MediaItem {
        MediaItem {
            id: id.to_string(),
            filename: format!("{}.jpg", id),
            kind: MediaKind::Image,
            mime_type: Some("image/jpeg".to_string()),
            size_bytes: None,
            creation_time: None,
            width: None,
            height: None,
            download_url: None,
        }
    }

    #[tokio::test]
    async fn test_walks_pages_until_cursor_exhausted() {
        let source = ScriptedSource::new(vec![
            (vec![item("a"), item("b")], Some("page-2".to_string())),
            (vec![item("c")], None),
        ]);

        let mut fetcher =
            BatchFetcher::new(&source, None, 2, None, Duration::from_millis(0));

        let first = fetcher.next_batch().await.unwrap().unwrap();
        assert_eq!(first.len(), 2);

        let second = fetcher.next_batch().await.unwrap().unwrap();
        assert_eq!(second.len(), 1);

        assert!(fetcher.next_batch().await.unwrap().is_none());

        let requests = source.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].1, None);
        assert_eq!(requests[1].1, Some("page-2".to_string()));
    }

    #[tokio::test]
    async fn test_cap_shrinks_final_page_request() {
        let source = ScriptedSource::new(vec![
            (vec![item("a"), item("b")], Some("page-2".to_string())),
            (vec![item("c")], Some("page-3".to_string())),
        ]);

        let mut fetcher =
            BatchFetcher::new(&source, None, 2, Some(3), Duration::from_millis(0));

        assert_eq!(fetcher.next_batch().await.unwrap().unwrap().len(), 2);
        assert_eq!(fetcher.next_batch().await.unwrap().unwrap().len(), 1);
        // Cap reached: no third request even though a cursor remains
        assert!(fetcher.next_batch().await.unwrap().is_none());

        let sizes: Vec<u32> = source.requests().iter().map(|r| r.0).collect();
        assert_eq!(sizes, vec![2, 1]);
    }

    #[tokio::test]
    async fn test_zero_cap_requests_nothing() {
        let source = ScriptedSource::new(vec![(vec![item("a")], None)]);

        let mut fetcher =
            BatchFetcher::new(&source, None, 2, Some(0), Duration::from_millis(0));

        assert!(fetcher.next_batch().await.unwrap().is_none());
        assert!(source.requests().is_empty());
    }

    #[tokio::test]
    async fn test_empty_first_page_ends_iteration() {
        let source = ScriptedSource::new(vec![(Vec::new(), None)]);

        let mut fetcher =
            BatchFetcher::new(&source, None, 2, None, Duration::from_millis(0));

        assert!(fetcher.next_batch().await.unwrap().is_none());
        assert!(fetcher.next_batch().await.unwrap().is_none());
        assert_eq!(source.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_album_scoped_requests_carry_album_id() {
        let source = ScriptedSource::new(vec![(vec![item("a")], None)]);

        let mut fetcher = BatchFetcher::new(
            &source,
            Some("album-1".to_string()),
            2,
            None,
            Duration::from_millis(0),
        );

        fetcher.next_batch().await.unwrap();

        assert_eq!(source.requests()[0].2, Some("album-1".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_applies_between_pages_only() {
        let source = ScriptedSource::new(vec![
            (vec![item("a")], Some("page-2".to_string())),
            (vec![item("b")], None),
        ]);

        let mut fetcher =
            BatchFetcher::new(&source, None, 1, None, Duration::from_secs(1));

        let start = tokio::time::Instant::now();

        fetcher.next_batch().await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_secs(0));

        fetcher.next_batch().await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_secs(1));

        // Exhaustion does not pay the delay again
        assert!(fetcher.next_batch().await.unwrap().is_none());
        assert_eq!(start.elapsed(), Duration::from_secs(1));
    }
}

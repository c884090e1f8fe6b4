// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Records feed — infinite-scroll paging over submitted records, with each
// record's image resolved through the raster cache.

use std::sync::Arc;

use registrar_core::{RecordListing, RecordSummary, TransportError};
use tracing::{info, instrument, warn};

use crate::cache::{PreviewImage, RasterCache};

/// A listed record together with what to show for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedRecord {
    pub summary: RecordSummary,
    pub preview: PreviewImage,
}

impl FeedRecord {
    pub fn pdf_url(&self) -> Option<&str> {
        self.summary.pdf_url.as_deref()
    }
}

pub struct RecordsFeed {
    listing: Arc<dyn RecordListing>,
    cache: Arc<RasterCache>,
    records: Vec<FeedRecord>,
    /// Last page loaded; 0 before the first load.
    current_page: u32,
    last_page: u32,
}

impl RecordsFeed {
    pub fn new(listing: Arc<dyn RecordListing>, cache: Arc<RasterCache>) -> Self {
        Self {
            listing,
            cache,
            records: Vec::new(),
            current_page: 0,
            last_page: 1,
        }
    }

    pub fn records(&self) -> &[FeedRecord] {
        &self.records
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn last_page(&self) -> u32 {
        self.last_page
    }

    pub fn has_more(&self) -> bool {
        self.current_page < self.last_page
    }

    /// Records matching `query` by full name or document type.
    pub fn search(&self, query: &str) -> Vec<&FeedRecord> {
        self.records
            .iter()
            .filter(|record| record.summary.matches(query))
            .collect()
    }

    /// Load the next page and append its records.
    ///
    /// Row previews are resolved concurrently and appended in listing order.
    ///
    /// Returns how many records were added; 0 once the last page is loaded.
    /// On failure nothing already loaded is lost and the same page is
    /// requested again next time.
    #[instrument(skip(self), fields(page = self.current_page + 1))]
    pub async fn load_next(&mut self) -> Result<usize, TransportError> {
        if !self.has_more() {
            return Ok(0);
        }
        let page_number = self.current_page + 1;
        let page = self.listing.documents_page(page_number).await.map_err(|err| {
            warn!(page = page_number, error = %err, "failed to load documents");
            err
        })?;

        let added = page.data.len();
        let pending: Vec<_> = page
            .data
            .into_iter()
            .map(|summary| {
                let preview = summary.image_reference().map(|reference| {
                    let cache = Arc::clone(&self.cache);
                    let reference = reference.to_string();
                    tokio::spawn(async move { cache.resolve_preview(&reference).await })
                });
                (summary, preview)
            })
            .collect();
        for (summary, preview) in pending {
            let preview = match preview {
                Some(task) => task.await.unwrap_or_else(|err| {
                    warn!(error = %err, "preview task did not complete");
                    PreviewImage::Placeholder(self.cache.placeholder())
                }),
                None => {
                    warn!(record = ?summary.id, "record has no image");
                    PreviewImage::Placeholder(self.cache.placeholder())
                }
            };
            self.records.push(FeedRecord { summary, preview });
        }
        self.current_page = page_number;
        self.last_page = page.last_page.max(1);

        info!(
            page = page_number,
            last_page = self.last_page,
            added,
            total = self.records.len(),
            "documents loaded"
        );
        Ok(added)
    }

    /// Forget everything loaded and fetch the first page again.
    pub async fn refresh(&mut self) -> Result<usize, TransportError> {
        self.records.clear();
        self.current_page = 0;
        self.last_page = 1;
        self.load_next().await
    }

    /// Keep loading until the last page or `max_pages` pages in total.
    pub async fn load_up_to(&mut self, max_pages: u32) -> Result<usize, TransportError> {
        let mut added = 0;
        while self.has_more() && self.current_page < max_pages {
            added += self.load_next().await?;
        }
        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use registrar_core::{Ack, AppConfig, DocumentPage, Transport, UploadPayload};

    fn summary(id: u64, name: &str, image_url: Option<&str>) -> RecordSummary {
        RecordSummary {
            id: Some(id),
            first_name: name.into(),
            middle_name: None,
            last_name: "Santos".into(),
            suffix: None,
            document_type: "live_birth".into(),
            image_url: image_url.map(Into::into),
            pdf_url: Some(format!("http://backend.local/storage/{id}.pdf")),
        }
    }

    /// Three-page listing; pages in `failing` return a 503 once.
    struct FakeListing {
        requested: Mutex<Vec<u32>>,
        failing: Mutex<Vec<u32>>,
    }

    impl FakeListing {
        fn new(failing: Vec<u32>) -> Self {
            Self {
                requested: Mutex::new(Vec::new()),
                failing: Mutex::new(failing),
            }
        }
    }

    #[async_trait]
    impl RecordListing for FakeListing {
        async fn documents_page(&self, page: u32) -> Result<DocumentPage, TransportError> {
            self.requested.lock().expect("lock").push(page);
            let mut failing = self.failing.lock().expect("lock");
            if let Some(pos) = failing.iter().position(|p| *p == page) {
                failing.remove(pos);
                return Err(TransportError::Status {
                    status: 503,
                    url: format!("http://backend.local/api/documents?page={page}"),
                });
            }
            Ok(DocumentPage {
                data: vec![
                    summary(u64::from(page) * 10, "Ana", Some("http://backend.local/storage/a.jpg")),
                    summary(u64::from(page) * 10 + 1, "Ben", Some("http://backend.local/storage/b.jpg")),
                    summary(u64::from(page) * 10 + 2, "Cy", None),
                ],
                last_page: 3,
                current_page: Some(page),
            })
        }
    }

    struct NoFetch;

    #[async_trait]
    impl Transport for NoFetch {
        async fn fetch_bytes(&self, reference: &str) -> Result<Vec<u8>, TransportError> {
            Err(TransportError::Connect(format!("offline: {reference}")))
        }

        async fn upload_multipart(&self, _payload: &UploadPayload) -> Result<Ack, TransportError> {
            Err(TransportError::Connect("offline".into()))
        }
    }

    fn feed(listing: &Arc<FakeListing>) -> RecordsFeed {
        let cache = Arc::new(RasterCache::new(Arc::new(NoFetch), &AppConfig::default()));
        RecordsFeed::new(Arc::clone(listing) as Arc<dyn RecordListing>, cache)
    }

    #[tokio::test]
    async fn pages_until_last_page() {
        let listing = Arc::new(FakeListing::new(Vec::new()));
        let mut feed = feed(&listing);

        assert_eq!(feed.load_next().await.expect("page 1"), 3);
        assert!(feed.has_more());
        assert_eq!(feed.load_up_to(10).await.expect("rest"), 6);
        assert!(!feed.has_more());
        assert_eq!(feed.load_next().await.expect("past end"), 0);

        assert_eq!(*listing.requested.lock().expect("lock"), vec![1, 2, 3]);
        assert_eq!(feed.records().len(), 9);
        assert_eq!(feed.current_page(), 3);
    }

    #[tokio::test]
    async fn failure_keeps_loaded_records_and_retries_same_page() {
        let listing = Arc::new(FakeListing::new(vec![2]));
        let mut feed = feed(&listing);

        feed.load_next().await.expect("page 1");
        assert!(feed.load_next().await.is_err());
        assert_eq!(feed.records().len(), 3);
        assert_eq!(feed.current_page(), 1);

        feed.load_next().await.expect("page 2 on retry");
        assert_eq!(*listing.requested.lock().expect("lock"), vec![1, 2, 2]);
        assert_eq!(feed.records().len(), 6);
    }

    #[tokio::test]
    async fn previews_and_pdf_links_are_attached() {
        let listing = Arc::new(FakeListing::new(Vec::new()));
        let mut feed = feed(&listing);
        feed.load_next().await.expect("page 1");

        let first = &feed.records()[0];
        assert_eq!(
            first.preview,
            PreviewImage::Remote("http://backend.local/storage/a.jpg".into())
        );
        assert_eq!(first.pdf_url(), Some("http://backend.local/storage/10.pdf"));
    }

    #[tokio::test]
    async fn rows_keep_listing_order_and_missing_images_show_placeholder() {
        let listing = Arc::new(FakeListing::new(Vec::new()));
        let mut feed = feed(&listing);
        feed.load_next().await.expect("page 1");

        let names: Vec<_> = feed
            .records()
            .iter()
            .map(|record| record.summary.first_name.as_str())
            .collect();
        assert_eq!(names, ["Ana", "Ben", "Cy"]);

        let imageless = &feed.records()[2];
        assert!(imageless.preview.is_placeholder());
        assert_eq!(imageless.pdf_url(), Some("http://backend.local/storage/12.pdf"));
    }

    #[tokio::test]
    async fn search_and_refresh() {
        let listing = Arc::new(FakeListing::new(Vec::new()));
        let mut feed = feed(&listing);
        feed.load_up_to(2).await.expect("two pages");

        assert_eq!(feed.search("ben").len(), 2);
        assert_eq!(feed.search("LIVE BIRTH").len(), 0);
        assert_eq!(feed.search("live_birth").len(), 6);

        assert_eq!(feed.refresh().await.expect("refresh"), 3);
        assert_eq!(feed.records().len(), 3);
        assert_eq!(feed.current_page(), 1);
    }
}

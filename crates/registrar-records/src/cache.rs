// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster cache — resolve an image reference to something the list view can
// display, decoding archival TIFFs to PNG once and memoizing the result.
//
// Failure policy:
//   - fetch returned an error (unreachable,
//     timeout, HTTP error status)             -> placeholder, not memoized
//   - bytes received but unusable (corrupt
//     or non-TIFF container)                  -> placeholder, memoized
//
// The entry map is locked only around lookup and insert, never across a fetch
// or a decode.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use lru::LruCache;
use registrar_archive::{RenderedPreview, is_archival_name, placeholder, render_preview};
use registrar_core::{AppConfig, CachePolicy, Transport};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::normalize::normalize;

/// What a caller should display for a reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewImage {
    /// Directly displayable reference (JPEG, PNG, ...), normalized but not fetched.
    Remote(String),
    /// First frame of an archival container, re-encoded as PNG.
    Rendered(Arc<RenderedPreview>),
    /// Shown whenever a preview could not be produced.
    Placeholder(Arc<RenderedPreview>),
}

impl PreviewImage {
    /// Value for an `<img src>`: the remote URL or a PNG `data:` URL.
    pub fn data_url(&self) -> String {
        match self {
            Self::Remote(url) => url.clone(),
            Self::Rendered(preview) | Self::Placeholder(preview) => preview.data_url(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder(_))
    }

    /// PNG bytes, when the preview was rendered locally.
    pub fn png(&self) -> Option<&[u8]> {
        match self {
            Self::Remote(_) => None,
            Self::Rendered(preview) | Self::Placeholder(preview) => Some(&preview.png),
        }
    }
}

/// Counters reported by [`RasterCache::stats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub fetches: u64,
    pub entries: usize,
}

#[derive(Debug, Clone)]
enum CacheEntry {
    Preview(Arc<RenderedPreview>),
    Fallback,
}

#[derive(Debug)]
struct Slot {
    entry: CacheEntry,
    inserted: Instant,
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    fetches: AtomicU64,
}

/// Memoizing archival preview resolver.
///
/// Share it behind an `Arc`; all methods take `&self`.
pub struct RasterCache {
    transport: Arc<dyn Transport>,
    entries: Mutex<LruCache<String, Slot>>,
    ttl: Option<Duration>,
    max_dimension: Option<u32>,
    placeholder: Arc<RenderedPreview>,
    counters: Counters,
}

impl RasterCache {
    pub fn new(transport: Arc<dyn Transport>, config: &AppConfig) -> Self {
        let entries = match config.cache_policy {
            CachePolicy::MaxEntries { limit } => LruCache::new(limit),
            CachePolicy::Unbounded | CachePolicy::Ttl { .. } => LruCache::unbounded(),
        };
        debug!(policy = ?config.cache_policy, "raster cache created");
        Self {
            transport,
            entries: Mutex::new(entries),
            ttl: config.cache_policy.ttl(),
            max_dimension: config.preview_max_dimension,
            placeholder: Arc::new(placeholder()),
            counters: Counters::default(),
        }
    }

    /// Resolve `reference` to a displayable image. Never fails.
    #[instrument(skip(self))]
    pub async fn resolve_preview(&self, reference: &str) -> PreviewImage {
        let key = normalize(reference);
        if !is_archival_name(&key) {
            return PreviewImage::Remote(key);
        }

        if let Some(entry) = self.lookup(&key) {
            self.counters.hits.fetch_add(1, Ordering::Relaxed);
            debug!(%key, "preview cache hit");
            return self.to_image(entry);
        }
        self.counters.misses.fetch_add(1, Ordering::Relaxed);

        self.counters.fetches.fetch_add(1, Ordering::Relaxed);
        let bytes = match self.transport.fetch_bytes(&key).await {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(%key, error = %err, class = ?err.class(), "fetch failed; will retry on next request");
                return PreviewImage::Placeholder(Arc::clone(&self.placeholder));
            }
        };

        let max_dimension = self.max_dimension;
        let rendered =
            tokio::task::spawn_blocking(move || render_preview(&bytes, max_dimension)).await;
        match rendered {
            Ok(Ok(preview)) => {
                info!(%key, width = preview.width, height = preview.height, "preview rendered");
                self.insert(key, CacheEntry::Preview(Arc::new(preview)))
            }
            Ok(Err(err)) => {
                warn!(%key, error = %err, "archival decode failed; caching placeholder");
                self.insert(key, CacheEntry::Fallback)
            }
            Err(join) => {
                warn!(%key, error = %join, "decode task did not complete");
                PreviewImage::Placeholder(Arc::clone(&self.placeholder))
            }
        }
    }

    /// Drop the entry for `reference`, if any, so the next request refetches.
    pub fn invalidate(&self, reference: &str) -> bool {
        self.entries().pop(&normalize(reference)).is_some()
    }

    pub fn clear(&self) {
        self.entries().clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            fetches: self.counters.fetches.load(Ordering::Relaxed),
            entries: self.entries().len(),
        }
    }

    /// The image served on failure; identical for every call.
    pub fn placeholder(&self) -> Arc<RenderedPreview> {
        Arc::clone(&self.placeholder)
    }

    // -- Map access -----------------------------------------------------------

    fn entries(&self) -> MutexGuard<'_, LruCache<String, Slot>> {
        // Entries are plain data; a panic elsewhere cannot leave one half-written.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lookup(&self, key: &str) -> Option<CacheEntry> {
        let mut entries = self.entries();
        let expired = match entries.get(key) {
            None => return None,
            Some(slot) => self
                .ttl
                .is_some_and(|ttl| slot.inserted.elapsed() >= ttl),
        };
        if expired {
            debug!(%key, "preview cache entry expired");
            entries.pop(key);
            return None;
        }
        entries.peek(key).map(|slot| slot.entry.clone())
    }

    fn insert(&self, key: String, entry: CacheEntry) -> PreviewImage {
        let image = self.to_image(entry.clone());
        let evicted = self.entries().push(
            key.clone(),
            Slot {
                entry,
                inserted: Instant::now(),
            },
        );
        if let Some((old_key, _)) = evicted.filter(|(old_key, _)| *old_key != key) {
            debug!(evicted = %old_key, "preview cache full; evicted least recently used");
        }
        image
    }

    fn to_image(&self, entry: CacheEntry) -> PreviewImage {
        match entry {
            CacheEntry::Preview(preview) => PreviewImage::Rendered(preview),
            CacheEntry::Fallback => PreviewImage::Placeholder(Arc::clone(&self.placeholder)),
        }
    }
}

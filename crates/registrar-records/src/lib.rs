// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Registrar Records — the read side: reference normalization, the memoizing
// archival preview cache, paging over submitted records, and the HTTP
// transport both sides talk through.

pub mod cache;
pub mod feed;
pub mod http;
pub mod normalize;

pub use cache::{CacheStats, PreviewImage, RasterCache};
pub use feed::{FeedRecord, RecordsFeed};
pub use http::HttpTransport;
pub use normalize::normalize;

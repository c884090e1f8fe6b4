// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait for the scanning engine.

use registrar_core::Document;
use registrar_core::error::Result;

/// Source of captured documents.
///
/// Implementations return pages in capture order; the first page is the front.
pub trait ScanningEngine: Send + Sync {
    /// Human-readable engine name (e.g. "Directory store").
    fn engine_name(&self) -> &str;

    /// Hand the licence key to the engine. `None` runs it unlicensed, which
    /// engines may treat as a trial or refuse.
    fn initialize(&self, license_key: Option<&str>) -> Result<()>;

    /// Load a captured document by id.
    fn load_document(&self, id: &str) -> Result<Document>;

    /// Ids of every stored document.
    fn list_documents(&self) -> Result<Vec<String>>;
}

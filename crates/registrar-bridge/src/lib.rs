// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Registrar — Scanning-engine bridge.
//
// The capture flow (camera, edge detection, cropping) belongs to a native
// scanning SDK. This crate defines the seam the export pipeline reads captured
// documents through, plus a directory-backed store for desktop and CI builds.

pub mod directory;
pub mod traits;

pub use directory::DirectoryScanStore;
pub use traits::ScanningEngine;

use std::path::PathBuf;

/// Scanning engine for this build, reading captures from `root`.
pub fn scanning_engine(root: impl Into<PathBuf>) -> Box<dyn ScanningEngine> {
    Box::new(DirectoryScanStore::new(root))
}

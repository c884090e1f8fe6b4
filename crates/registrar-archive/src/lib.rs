// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// registrar-archive — Archival container handling for captured civil records.
//
// Encodes page images into 300 DPI Adobe-Deflate TIFF buffers, walks the frame
// directory of received containers, and renders the first frame as a PNG
// preview (or a neutral placeholder when that fails).

pub mod container;
pub mod preview;

// Re-export the primary structs so callers can use `registrar_archive::TiffWriter` etc.
pub use container::{FrameInfo, TiffReader, TiffWriter, is_archival_name};
pub use preview::{RenderedPreview, placeholder, render_preview};

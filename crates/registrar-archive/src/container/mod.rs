// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Archival container module — TIFF writing (export path) and reading
// (preview path).

pub mod reader;
pub mod writer;

pub use reader::{FrameInfo, TiffReader};
pub use writer::TiffWriter;

/// File extensions that identify the archival format.
pub const ARCHIVAL_EXTENSIONS: [&str; 2] = ["tif", "tiff"];

/// Whether `name` (a path or URL) names an archival-format resource.
///
/// Only the path is inspected: query strings and fragments are ignored, and the
/// extension comparison is case-insensitive.
pub fn is_archival_name(name: &str) -> bool {
    let path = name.split(['?', '#']).next().unwrap_or_default();
    let Some((stem, extension)) = path.rsplit_once('.') else {
        return false;
    };
    !stem.is_empty()
        && !extension.contains('/')
        && ARCHIVAL_EXTENSIONS
            .iter()
            .any(|known| extension.eq_ignore_ascii_case(known))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn archival_suffixes_are_case_insensitive() {
        assert!(is_archival_name("http://host/storage/scan.tiff"));
        assert!(is_archival_name("http://host/storage/SCAN.TIF"));
        assert!(is_archival_name("/data/page.Tif?v=2"));
    }

    #[test]
    fn displayable_formats_are_not_archival() {
        assert!(!is_archival_name("http://host/storage/scan.png"));
        assert!(!is_archival_name("http://host/storage/scan.jpeg"));
        assert!(!is_archival_name("http://host.tiff/storage/scan"));
        assert!(!is_archival_name(""));
        assert!(!is_archival_name("tiff"));
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Directory-backed scan store for desktop/CI builds where the native scanning
// SDK is unavailable.
//
// Layout:
//   <root>/<document-id>/document.json
//   <root>/<document-id>/<page images...>
//
// Image paths in the manifest may be relative to the document directory.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use registrar_core::error::{RegistrarError, Result};
use registrar_core::{Document, Page};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::traits::ScanningEngine;

/// Manifest file name inside each document directory.
pub const MANIFEST_FILE: &str = "document.json";

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(default)]
    pages: Vec<Page>,
}

/// Reads captured documents from a directory tree.
#[derive(Debug)]
pub struct DirectoryScanStore {
    root: PathBuf,
    licensed: Mutex<bool>,
}

impl DirectoryScanStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            licensed: Mutex::new(false),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether `initialize` received a licence key.
    pub fn is_licensed(&self) -> bool {
        *self.licensed.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn document_dir(&self, id: &str) -> Result<PathBuf> {
        let valid = !id.is_empty()
            && id != "."
            && id != ".."
            && !id.contains(['/', '\\']);
        if !valid {
            return Err(RegistrarError::DocumentNotFound(id.to_string()));
        }
        Ok(self.root.join(id))
    }
}

impl ScanningEngine for DirectoryScanStore {
    fn engine_name(&self) -> &str {
        "Directory store"
    }

    fn initialize(&self, license_key: Option<&str>) -> Result<()> {
        if !self.root.is_dir() {
            return Err(RegistrarError::Scanner(format!(
                "scan directory {} does not exist",
                self.root.display()
            )));
        }
        let licensed = license_key.is_some_and(|key| !key.trim().is_empty());
        if !licensed {
            warn!("scanning engine running without a licence key");
        }
        *self.licensed.lock().unwrap_or_else(PoisonError::into_inner) = licensed;
        info!(root = %self.root.display(), licensed, "scan store initialized");
        Ok(())
    }

    #[instrument(skip(self), fields(root = %self.root.display()))]
    fn load_document(&self, id: &str) -> Result<Document> {
        let dir = self.document_dir(id)?;
        let manifest_path = dir.join(MANIFEST_FILE);
        let raw = match std::fs::read_to_string(&manifest_path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(RegistrarError::DocumentNotFound(id.to_string()));
            }
            Err(err) => return Err(err.into()),
        };
        let manifest: Manifest = serde_json::from_str(&raw)?;

        let pages = manifest
            .pages
            .into_iter()
            .map(|page| Page {
                original_image: dir.join(page.original_image),
                processed_image: page.processed_image.map(|path| dir.join(path)),
                id: page.id,
            })
            .collect::<Vec<_>>();

        debug!(pages = pages.len(), "document loaded");
        Ok(Document::new(id, pages))
    }

    fn list_documents(&self) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.path().join(MANIFEST_FILE).is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                ids.push(name.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_document(root: &Path, id: &str, manifest: &str) {
        let dir = root.join(id);
        std::fs::create_dir_all(&dir).expect("mkdir");
        std::fs::write(dir.join(MANIFEST_FILE), manifest).expect("write manifest");
    }

    const TWO_PAGES: &str = r#"{
        "pages": [
            {"id": "p1", "original_image": "p1.jpg", "processed_image": "p1-doc.jpg"},
            {"id": "p2", "original_image": "/abs/p2.jpg"}
        ]
    }"#;

    #[test]
    fn loads_pages_in_capture_order() {
        let tmp = tempfile::tempdir().expect("tempdir");
        write_document(tmp.path(), "doc-1", TWO_PAGES);
        let store = DirectoryScanStore::new(tmp.path());

        let document = store.load_document("doc-1").expect("load");
        assert_eq!(document.id, "doc-1");
        assert_eq!(document.pages.len(), 2);
        assert_eq!(document.pages[0].id, "p1");
        assert_eq!(
            document.pages[0].processed_image.as_deref(),
            Some(tmp.path().join("doc-1").join("p1-doc.jpg").as_path())
        );
        // Absolute paths are kept as-is.
        assert_eq!(document.pages[1].original_image, PathBuf::from("/abs/p2.jpg"));
        assert_eq!(document.pages[1].processed_image, None);
        assert_eq!(
            document.pages[1].display_image(),
            Path::new("/abs/p2.jpg")
        );
    }

    #[test]
    fn unknown_or_unsafe_ids_are_not_found() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let store = DirectoryScanStore::new(tmp.path());
        for id in ["missing", "", "..", "../etc", "a/b"] {
            assert!(
                matches!(
                    store.load_document(id),
                    Err(RegistrarError::DocumentNotFound(_))
                ),
                "id {id:?}"
            );
        }
    }

    #[test]
    fn malformed_manifest_is_a_serialization_error() {
        let tmp = tempfile::tempdir().expect("tempdir");
        write_document(tmp.path(), "bad", "{ not json");
        let store = DirectoryScanStore::new(tmp.path());
        assert!(matches!(
            store.load_document("bad"),
            Err(RegistrarError::Serialization(_))
        ));
    }

    #[test]
    fn lists_only_directories_with_manifests() {
        let tmp = tempfile::tempdir().expect("tempdir");
        write_document(tmp.path(), "b", TWO_PAGES);
        write_document(tmp.path(), "a", TWO_PAGES);
        std::fs::create_dir(tmp.path().join("empty")).expect("mkdir");
        std::fs::write(tmp.path().join("stray.txt"), "x").expect("write");

        let store = DirectoryScanStore::new(tmp.path());
        assert_eq!(store.list_documents().expect("list"), ["a", "b"]);
    }

    #[test]
    fn initialize_records_licence_state() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let store = DirectoryScanStore::new(tmp.path());

        store.initialize(Some("  ")).expect("init");
        assert!(!store.is_licensed());
        store.initialize(Some("KEY-123")).expect("init");
        assert!(store.is_licensed());

        let missing = DirectoryScanStore::new(tmp.path().join("nope"));
        assert!(matches!(
            missing.initialize(None),
            Err(RegistrarError::Scanner(_))
        ));
    }
}

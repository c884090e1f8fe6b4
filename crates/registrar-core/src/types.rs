// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types: captured documents, archival buffers, and the upload
// payload handed to the transport collaborator.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Number of pages a civil-registry document must have at export time.
pub const REQUIRED_PAGE_COUNT: usize = 2;

/// Fixed output resolution of archival buffers.
pub const ARCHIVAL_DPI: u32 = 300;

/// Logical position of a page within an exported document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageLabel {
    Front,
    Back,
}

impl PageLabel {
    /// Labels in export order; index `i` labels page `i`.
    pub const ORDER: [PageLabel; REQUIRED_PAGE_COUNT] = [PageLabel::Front, PageLabel::Back];

    /// Multipart field name for this page.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Front => "front",
            Self::Back => "back",
        }
    }

    /// Capitalised form used in user-facing messages.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Front => "Front",
            Self::Back => "Back",
        }
    }

    /// File name the backend expects for this page's archival part.
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Front => "front.tiff",
            Self::Back => "back.tiff",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Self::Front => 0,
            Self::Back => 1,
        }
    }
}

impl std::fmt::Display for PageLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One captured page, as handed over by the scanning engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    /// Full-resolution camera capture.
    pub original_image: PathBuf,
    /// Cropped/filtered variant produced by the scanning engine, if any.
    #[serde(default)]
    pub processed_image: Option<PathBuf>,
}

impl Page {
    pub fn new(id: impl Into<String>, original_image: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            original_image: original_image.into(),
            processed_image: None,
        }
    }

    pub fn with_processed(mut self, processed_image: impl Into<PathBuf>) -> Self {
        self.processed_image = Some(processed_image.into());
        self
    }

    /// Image to show on screen: the processed variant when present.
    pub fn display_image(&self) -> &Path {
        self.processed_image
            .as_deref()
            .unwrap_or(self.original_image.as_path())
    }
}

/// A captured document: pages in capture order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(default)]
    pub pages: Vec<Page>,
}

impl Document {
    pub fn new(id: impl Into<String>, pages: Vec<Page>) -> Self {
        Self {
            id: id.into(),
            pages,
        }
    }
}

/// Compression scheme written into the TIFF `Compression` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Compression {
    /// Lossless zlib/deflate, TIFF tag value 8.
    AdobeDeflate,
}

impl Compression {
    /// Value stored in TIFF tag 259.
    pub fn tag_value(&self) -> u16 {
        match self {
            Self::AdobeDeflate => 8,
        }
    }
}

/// Parameters an archival buffer was encoded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodeParams {
    pub dpi: u32,
    pub compression: Compression,
}

impl EncodeParams {
    /// The only parameter set the backend accepts: 300 DPI, Adobe Deflate,
    /// no binarization.
    pub const ARCHIVAL: Self = Self {
        dpi: ARCHIVAL_DPI,
        compression: Compression::AdobeDeflate,
    };
}

impl Default for EncodeParams {
    fn default() -> Self {
        Self::ARCHIVAL
    }
}

/// One page encoded into the archival format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivalBuffer {
    pub bytes: Vec<u8>,
    pub params: EncodeParams,
    pub width: u32,
    pub height: u32,
}

impl ArchivalBuffer {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Body of one multipart field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldBody<'a> {
    Text(String),
    File {
        file_name: &'static str,
        mime_type: &'static str,
        bytes: &'a [u8],
    },
}

/// One named field of the submission body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartField<'a> {
    pub name: &'static str,
    pub body: FieldBody<'a>,
}

/// Everything the submit endpoint needs, produced by a successful export.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadPayload {
    /// Form-wizard answers; passed through unchanged.
    pub form_metadata: serde_json::Value,
    pub front: ArchivalBuffer,
    pub back: ArchivalBuffer,
    /// Submitting user's id, empty when the session has none.
    pub user_id: String,
}

impl UploadPayload {
    pub const METADATA_FIELD: &'static str = "formData";
    pub const USER_FIELD: &'static str = "user_Id";
    pub const ARCHIVAL_MIME: &'static str = "image/tiff";

    pub fn buffer(&self, label: PageLabel) -> &ArchivalBuffer {
        match label {
            PageLabel::Front => &self.front,
            PageLabel::Back => &self.back,
        }
    }

    /// The multipart fields in the order the backend reads them.
    pub fn fields(&self) -> Result<Vec<MultipartField<'_>>, serde_json::Error> {
        let mut fields = Vec::with_capacity(4);
        fields.push(MultipartField {
            name: Self::METADATA_FIELD,
            body: FieldBody::Text(serde_json::to_string(&self.form_metadata)?),
        });
        for label in PageLabel::ORDER {
            fields.push(MultipartField {
                name: label.as_str(),
                body: FieldBody::File {
                    file_name: label.file_name(),
                    mime_type: Self::ARCHIVAL_MIME,
                    bytes: &self.buffer(label).bytes,
                },
            });
        }
        fields.push(MultipartField {
            name: Self::USER_FIELD,
            body: FieldBody::Text(self.user_id.clone()),
        });
        Ok(fields)
    }
}

/// Acknowledgement returned by the submit endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ack {
    pub status: u16,
    pub body: String,
}

/// Whether repeating an operation can change its outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureClass {
    /// The operation did not complete; repeating it may succeed.
    Transient,
    /// The operation completed and will fail identically if repeated.
    Deterministic,
}

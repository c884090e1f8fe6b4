// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Registrar.
//
// Each concern gets its own enum so callers can match on exactly the failures
// their step can produce; `RegistrarError` wraps them for the application layer.

use std::fmt;

use thiserror::Error;

use crate::types::{FailureClass, PageLabel};

/// Top-level error type for all Registrar operations.
#[derive(Debug, Error)]
pub enum RegistrarError {
    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    // -- Scanning engine --
    #[error("scanning engine error: {0}")]
    Scanner(String),

    #[error("document {0} not found")]
    DocumentNotFound(String),

    // -- Configuration / persistence --
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, RegistrarError>;

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

/// Failure of a `finalize` call or of the upload that follows it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    /// The document did not have exactly two pages. No encoding was attempted.
    #[error("document must have exactly two pages (front and back), got {0}")]
    WrongPageCount(usize),

    /// One or more pages could not be encoded. Every failing page is listed.
    #[error("failed to process pages:\n{}", FailureList(.0))]
    PageFailures(Vec<PageFailure>),

    /// The two-buffer postcondition did not hold although no page failed.
    #[error("internal invariant violated: {0}")]
    Internal(String),

    /// The assembled payload could not be delivered.
    #[error("upload failed: {0}")]
    Transport(#[from] TransportError),
}

/// Why a single page could not be turned into an archival buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageFailureKind {
    /// The page has no processed (cropped/filtered) image to encode.
    MissingSource,
    /// The encoder rejected the page.
    EncodeFailed(String),
}

/// A labeled per-page failure collected during export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFailure {
    pub label: PageLabel,
    pub page_id: String,
    pub kind: PageFailureKind,
}

impl PageFailure {
    pub fn missing_source(label: PageLabel, page_id: impl Into<String>) -> Self {
        Self {
            label,
            page_id: page_id.into(),
            kind: PageFailureKind::MissingSource,
        }
    }

    pub fn encode_failed(
        label: PageLabel,
        page_id: impl Into<String>,
        cause: impl fmt::Display,
    ) -> Self {
        Self {
            label,
            page_id: page_id.into(),
            kind: PageFailureKind::EncodeFailed(cause.to_string()),
        }
    }
}

impl fmt::Display for PageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            PageFailureKind::MissingSource => write!(
                f,
                "{} page ({}): no processed document image",
                self.label.title(),
                self.page_id
            ),
            PageFailureKind::EncodeFailed(cause) => {
                write!(f, "{} page ({}): {}", self.label.title(), self.page_id, cause)
            }
        }
    }
}

/// One failure per line, in page order.
struct FailureList<'a>(&'a [PageFailure]);

impl fmt::Display for FailureList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, failure) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{failure}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Encoding (write path)
// ---------------------------------------------------------------------------

/// Failure while producing an archival buffer from a page image.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("failed to read source image {path}: {reason}")]
    Source { path: String, reason: String },

    #[error("source image has invalid dimensions {width}x{height}")]
    EmptyImage { width: u32, height: u32 },

    #[error("TIFF generation failed: {0}")]
    Tiff(String),
}

// ---------------------------------------------------------------------------
// Decoding (read path)
// ---------------------------------------------------------------------------

/// Failure while turning fetched archival bytes into a preview.
///
/// These are deterministic: the same bytes always fail the same way.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("archival container is empty")]
    Empty,

    #[error("not a readable TIFF container: {0}")]
    Container(String),

    #[error("failed to decode frame {index}: {reason}")]
    Frame { index: usize, reason: String },

    #[error("invalid frame dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("unsupported pixel layout: {0}")]
    UnsupportedLayout(String),

    #[error("preview encoding failed: {0}")]
    Encode(String),
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// Failure reported by the transport collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("invalid request URL '{0}'")]
    InvalidUrl(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("server returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("failed to read response body: {0}")]
    Body(String),

    #[error("unexpected response: {0}")]
    InvalidResponse(String),
}

impl TransportError {
    /// Whether the request may succeed if simply repeated.
    ///
    /// A request that never completed (connect, timeout, truncated body) and
    /// server-side overload statuses are transient. A completed request with a
    /// client-error status, or a malformed URL or response, is deterministic.
    pub fn class(&self) -> FailureClass {
        match self {
            Self::Connect(_) | Self::Timeout(_) | Self::Body(_) => FailureClass::Transient,
            Self::Status { status, .. } => match status {
                408 | 425 | 429 => FailureClass::Transient,
                500..=599 => FailureClass::Transient,
                _ => FailureClass::Deterministic,
            },
            Self::InvalidUrl(_) | Self::InvalidResponse(_) => FailureClass::Deterministic,
        }
    }

    pub fn is_transient(&self) -> bool {
        self.class() == FailureClass::Transient
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_failures_render_every_entry() {
        let err = ExportError::PageFailures(vec![
            PageFailure::missing_source(PageLabel::Front, "p-1"),
            PageFailure::encode_failed(PageLabel::Back, "p-2", "disk full"),
        ]);
        let text = err.to_string();
        assert!(text.contains("Front page (p-1): no processed document image"));
        assert!(text.contains("Back page (p-2): disk full"));
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn connection_failures_are_transient() {
        assert!(TransportError::Connect("refused".into()).is_transient());
        assert!(TransportError::Timeout("30s".into()).is_transient());
        assert!(TransportError::Body("reset".into()).is_transient());
    }

    #[test]
    fn status_classification() {
        let status = |status| TransportError::Status {
            status,
            url: "http://host/x.tiff".into(),
        };
        assert_eq!(status(503).class(), FailureClass::Transient);
        assert_eq!(status(429).class(), FailureClass::Transient);
        assert_eq!(status(404).class(), FailureClass::Deterministic);
        assert_eq!(status(403).class(), FailureClass::Deterministic);
    }

    #[test]
    fn wrong_page_count_message_names_count() {
        assert_eq!(
            ExportError::WrongPageCount(3).to_string(),
            "document must have exactly two pages (front and back), got 3"
        );
    }
}

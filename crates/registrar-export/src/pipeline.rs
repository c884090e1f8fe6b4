// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Export pipeline — validate a captured document, encode its front and back
// pages into archival buffers, and assemble the upload payload.
//
// Validating -> Encoding -> Aggregating -> Failed
//                        -> Assembling  -> Ready

use std::path::Path;
use std::sync::Arc;

use registrar_archive::TiffWriter;
use registrar_core::{
    Ack, ArchivalBuffer, Document, EncodeError, ExportError, Page, PageFailure, PageLabel,
    REQUIRED_PAGE_COUNT, Transport, UploadPayload,
};
use tracing::{error, info, instrument, warn};

use crate::upload::{RetryConfig, submit_with_retry};

/// Turns one page image into an archival buffer.
///
/// Called from the blocking pool; implementations may do synchronous I/O.
pub trait PageEncoder: Send + Sync + 'static {
    fn encode_page(&self, label: PageLabel, source: &Path) -> Result<ArchivalBuffer, EncodeError>;
}

/// Default encoder: reads the processed image from disk and writes a 300 DPI
/// Adobe-Deflate TIFF.
#[derive(Debug, Clone, Copy, Default)]
pub struct TiffPageEncoder {
    writer: TiffWriter,
}

impl TiffPageEncoder {
    pub fn new(writer: TiffWriter) -> Self {
        Self { writer }
    }
}

impl PageEncoder for TiffPageEncoder {
    fn encode_page(&self, _label: PageLabel, source: &Path) -> Result<ArchivalBuffer, EncodeError> {
        self.writer.encode_file(source)
    }
}

/// Produces [`UploadPayload`]s from captured two-page documents.
pub struct ExportPipeline<E: PageEncoder = TiffPageEncoder> {
    encoder: Arc<E>,
}

impl Default for ExportPipeline<TiffPageEncoder> {
    fn default() -> Self {
        Self::new(TiffPageEncoder::default())
    }
}

impl<E: PageEncoder> ExportPipeline<E> {
    pub fn new(encoder: E) -> Self {
        Self {
            encoder: Arc::new(encoder),
        }
    }

    /// Validate, encode and assemble.
    ///
    /// A document without exactly two pages is rejected before any encoder
    /// call. Otherwise both pages are encoded concurrently and every per-page
    /// failure is reported together; no buffer escapes unless both succeed.
    #[instrument(skip(self, document, form_metadata, user_id), fields(document_id = %document.id))]
    pub async fn finalize(
        &self,
        document: &Document,
        form_metadata: serde_json::Value,
        user_id: impl Into<String>,
    ) -> Result<UploadPayload, ExportError> {
        // -- Validating --
        let pages = document.pages.as_slice();
        if pages.len() != REQUIRED_PAGE_COUNT {
            warn!(pages = pages.len(), "rejecting document with wrong page count");
            return Err(ExportError::WrongPageCount(pages.len()));
        }

        // -- Encoding --
        let (front, back) = tokio::join!(
            self.encode_one(PageLabel::Front, &pages[PageLabel::Front.index()]),
            self.encode_one(PageLabel::Back, &pages[PageLabel::Back.index()]),
        );

        // -- Aggregating --
        let mut buffers = Vec::with_capacity(REQUIRED_PAGE_COUNT);
        let mut failures = Vec::new();
        for outcome in [front, back] {
            match outcome {
                Ok(buffer) => buffers.push(buffer),
                Err(failure) => failures.push(failure),
            }
        }
        if !failures.is_empty() {
            warn!(failed = failures.len(), "export failed");
            return Err(ExportError::PageFailures(failures));
        }

        let [front, back]: [ArchivalBuffer; REQUIRED_PAGE_COUNT] =
            buffers.try_into().map_err(|produced: Vec<ArchivalBuffer>| {
                error!(produced = produced.len(), "buffer count mismatch");
                ExportError::Internal(format!(
                    "expected {REQUIRED_PAGE_COUNT} archival buffers, produced {}",
                    produced.len()
                ))
            })?;

        // -- Assembling --
        info!(
            front_bytes = front.len(),
            back_bytes = back.len(),
            "export payload ready"
        );
        Ok(UploadPayload {
            form_metadata,
            front,
            back,
            user_id: user_id.into(),
        })
    }

    /// Finalize, then submit through `transport`, retrying transient failures.
    ///
    /// Retries resend the payload built once; pages are never re-encoded.
    pub async fn export_and_submit(
        &self,
        transport: &dyn Transport,
        document: &Document,
        form_metadata: serde_json::Value,
        user_id: impl Into<String>,
        retry: &RetryConfig,
    ) -> Result<Ack, ExportError> {
        let payload = self.finalize(document, form_metadata, user_id).await?;
        Ok(submit_with_retry(transport, &payload, retry).await?)
    }

    async fn encode_one(
        &self,
        label: PageLabel,
        page: &Page,
    ) -> Result<ArchivalBuffer, PageFailure> {
        let Some(source) = page.processed_image.clone() else {
            warn!(%label, page_id = %page.id, "page has no processed image");
            return Err(PageFailure::missing_source(label, &page.id));
        };

        let encoder = Arc::clone(&self.encoder);
        match tokio::task::spawn_blocking(move || encoder.encode_page(label, &source)).await {
            Ok(Ok(buffer)) => Ok(buffer),
            Ok(Err(err)) => {
                warn!(%label, page_id = %page.id, error = %err, "page encode failed");
                Err(PageFailure::encode_failed(label, &page.id, err))
            }
            Err(join) => {
                error!(%label, page_id = %page.id, error = %join, "encoder task did not complete");
                Err(PageFailure::encode_failed(
                    label,
                    &page.id,
                    format!("encoder task did not complete: {join}"),
                ))
            }
        }
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Collaborator traits for the network side.
//
// The export pipeline and the preview cache depend only on these traits; the
// reqwest-backed implementation lives in `registrar-records`.

use async_trait::async_trait;

use crate::error::TransportError;
use crate::records::DocumentPage;
use crate::types::{Ack, UploadPayload};

/// Byte fetch and document submission.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch the raw bytes behind a resource reference.
    async fn fetch_bytes(&self, reference: &str) -> Result<Vec<u8>, TransportError>;

    /// Send an assembled payload as `multipart/form-data` to the submit endpoint.
    async fn upload_multipart(&self, payload: &UploadPayload) -> Result<Ack, TransportError>;
}

/// Paginated listing of submitted records.
#[async_trait]
pub trait RecordListing: Send + Sync {
    /// Fetch listing page `page` (1-based).
    async fn documents_page(&self, page: u32) -> Result<DocumentPage, TransportError>;
}

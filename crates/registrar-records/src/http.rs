// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// HTTP transport — reqwest implementation of the transport and listing
// collaborators against the records backend.
//
// Endpoints (relative to the configured base URL):
//   GET  {base}/documents?page=N     listing
//   POST {base}/documents/submit     multipart submission
// Absolute references are fetched as given; relative ones are joined to base.

use async_trait::async_trait;
use registrar_core::records::ListingBody;
use registrar_core::{
    Ack, AppConfig, DocumentPage, FieldBody, RecordListing, RegistrarError, Transport,
    TransportError, UploadPayload,
};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, Url};
use tracing::{debug, info, instrument};

const SUBMIT_PATH: &str = "documents/submit";
const LISTING_PATH: &str = "documents";

/// Transport backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(config: &AppConfig) -> Result<Self, RegistrarError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|err| RegistrarError::Config(format!("failed to build HTTP client: {err}")))?;
        Ok(Self {
            client,
            base_url: config.base_url().to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for `reference`.
    pub fn resolve(&self, reference: &str) -> Result<Url, TransportError> {
        let reference = reference.trim();
        let candidate = if reference.contains("://") {
            reference.to_string()
        } else {
            format!("{}/{}", self.base_url, reference.trim_start_matches('/'))
        };
        Url::parse(&candidate).map_err(|_| TransportError::InvalidUrl(candidate))
    }

    async fn check(response: Response) -> Result<Response, TransportError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        Err(TransportError::Status {
            status: status.as_u16(),
            url: response.url().to_string(),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self))]
    async fn fetch_bytes(&self, reference: &str) -> Result<Vec<u8>, TransportError> {
        let url = self.resolve(reference)?;
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|err| request_error(err, &url))?;
        let bytes = Self::check(response)
            .await?
            .bytes()
            .await
            .map_err(|err| TransportError::Body(err.to_string()))?;
        debug!(%url, bytes = bytes.len(), "fetched");
        Ok(bytes.to_vec())
    }

    #[instrument(skip_all, fields(user_id = %payload.user_id))]
    async fn upload_multipart(&self, payload: &UploadPayload) -> Result<Ack, TransportError> {
        let url = self.resolve(SUBMIT_PATH)?;
        let form = build_form(payload)?;
        let response = self
            .client
            .post(url.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|err| request_error(err, &url))?;
        let response = Self::check(response).await?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|err| TransportError::Body(err.to_string()))?;
        info!(%url, status, "submission accepted");
        Ok(Ack { status, body })
    }
}

#[async_trait]
impl RecordListing for HttpTransport {
    #[instrument(skip(self))]
    async fn documents_page(&self, page: u32) -> Result<DocumentPage, TransportError> {
        let url = self.resolve(LISTING_PATH)?;
        let response = self
            .client
            .get(url.clone())
            .query(&[("page", page)])
            .send()
            .await
            .map_err(|err| request_error(err, &url))?;
        let text = Self::check(response)
            .await?
            .text()
            .await
            .map_err(|err| TransportError::Body(err.to_string()))?;
        let listing: ListingBody = serde_json::from_str(&text)
            .map_err(|err| TransportError::InvalidResponse(format!("documents listing: {err}")))?;
        Ok(listing.into_page())
    }
}

/// Multipart form in the order the backend reads it.
fn build_form(payload: &UploadPayload) -> Result<Form, TransportError> {
    let fields = payload
        .fields()
        .map_err(|err| TransportError::InvalidResponse(format!("form metadata: {err}")))?;
    let mut form = Form::new();
    for field in fields {
        form = match field.body {
            FieldBody::Text(text) => form.text(field.name, text),
            FieldBody::File {
                file_name,
                mime_type,
                bytes,
            } => {
                let part = Part::bytes(bytes.to_vec())
                    .file_name(file_name)
                    .mime_str(mime_type)
                    .map_err(|err| TransportError::InvalidResponse(err.to_string()))?;
                form.part(field.name, part)
            }
        };
    }
    Ok(form)
}

/// Map a send failure to the transport taxonomy.
fn request_error(err: reqwest::Error, url: &Url) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout(format!("{url}: {err}"))
    } else if err.is_builder() {
        TransportError::InvalidUrl(url.to_string())
    } else if err.is_body() || err.is_decode() {
        TransportError::Body(err.to_string())
    } else {
        TransportError::Connect(format!("{url}: {err}"))
    }
}

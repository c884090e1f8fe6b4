// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Registrar — Core types, errors, configuration, and collaborator traits shared
// across all crates.

pub mod config;
pub mod error;
pub mod human_errors;
pub mod records;
pub mod session;
pub mod transport;
pub mod types;

pub use config::{AppConfig, CachePolicy, UploadRetry};
pub use error::{
    DecodeError, EncodeError, ExportError, PageFailure, PageFailureKind, RegistrarError,
    TransportError,
};
pub use records::{DocumentPage, RecordSummary};
pub use transport::{RecordListing, Transport};
pub use types::*;

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// registrar-export — Turns a captured front/back document into the archival
// upload payload, and delivers that payload with bounded retries.

pub mod pipeline;
pub mod upload;

pub use pipeline::{ExportPipeline, PageEncoder, TiffPageEncoder};
pub use upload::{RetryConfig, RetryDecision, should_retry, submit_with_retry};

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Upload with exponential backoff + jitter.
//
// Only transient transport failures (connection, timeout, 5xx, 408/429) are
// retried. The payload is built once by the pipeline and resent as-is.

use std::time::Duration;

use registrar_core::{Ack, FailureClass, Transport, TransportError, UploadPayload, UploadRetry};
use tracing::{debug, info, instrument, warn};

/// Retry configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the first send.
    pub max_retries: u32,
    /// Base delay between retries (exponential backoff).
    pub base_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        UploadRetry::default().into()
    }
}

impl From<UploadRetry> for RetryConfig {
    fn from(settings: UploadRetry) -> Self {
        Self {
            max_retries: settings.max_retries,
            base_delay: Duration::from_millis(settings.base_delay_ms),
            max_delay: Duration::from_millis(settings.max_delay_ms),
        }
    }
}

/// Result of evaluating whether to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry after this delay.
    RetryAfter(Duration),
    /// Do not retry — repeating the request cannot change the outcome.
    GiveUp(FailureClass),
    /// Maximum retries exhausted.
    Exhausted,
}

/// Decide whether to retry based on the error class and attempt count.
pub fn should_retry(err: &TransportError, attempt: u32, config: &RetryConfig) -> RetryDecision {
    match err.class() {
        FailureClass::Deterministic => {
            info!(error = %err, "deterministic upload failure — not retrying");
            RetryDecision::GiveUp(FailureClass::Deterministic)
        }
        FailureClass::Transient => {
            if attempt >= config.max_retries {
                warn!(attempt, max = config.max_retries, "retry limit exhausted");
                RetryDecision::Exhausted
            } else {
                let delay = compute_delay(attempt, config);
                debug!(attempt, delay_ms = delay.as_millis(), "scheduling retry");
                RetryDecision::RetryAfter(delay)
            }
        }
    }
}

/// Send `payload`, retrying transient failures per `config`.
///
/// Returns the last error once retries are exhausted or a deterministic
/// failure is seen.
#[instrument(skip_all, fields(front_bytes = payload.front.len(), back_bytes = payload.back.len()))]
pub async fn submit_with_retry(
    transport: &dyn Transport,
    payload: &UploadPayload,
    config: &RetryConfig,
) -> Result<Ack, TransportError> {
    let mut attempt = 0;
    loop {
        match transport.upload_multipart(payload).await {
            Ok(ack) => {
                info!(status = ack.status, attempt, "document submitted");
                return Ok(ack);
            }
            Err(err) => match should_retry(&err, attempt, config) {
                RetryDecision::RetryAfter(delay) => {
                    warn!(error = %err, attempt, "upload failed, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                RetryDecision::GiveUp(_) | RetryDecision::Exhausted => return Err(err),
            },
        }
    }
}

/// Compute exponential backoff delay with jitter.
///
/// delay = min(base * 2^attempt + jitter, max_delay)
fn compute_delay(attempt: u32, config: &RetryConfig) -> Duration {
    let base_ms = config.base_delay.as_millis() as u64;
    let exp_ms = base_ms.saturating_mul(1u64 << attempt.min(10));
    let total_ms = exp_ms.saturating_add(jitter(base_ms, attempt));
    let capped_ms = total_ms.min(config.max_delay.as_millis() as u64);

    Duration::from_millis(capped_ms)
}

/// Deterministic spread in [0, base) derived from the attempt number.
fn jitter(base_ms: u64, attempt: u32) -> u64 {
    let hash = (attempt as u64).wrapping_mul(6364136223846793005);
    hash % base_ms.max(1)
}

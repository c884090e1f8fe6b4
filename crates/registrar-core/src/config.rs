// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.
//
// Passed explicitly into every component at construction; nothing reads
// settings from ambient storage.

use std::num::NonZeroUsize;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Backend used when the user has not overridden the API URL.
pub const DEFAULT_BASE_URL: &str = "http://192.168.1.2:8000/api";

/// How long decoded previews are retained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CachePolicy {
    /// Keep every entry for the lifetime of the process.
    #[default]
    Unbounded,
    /// Keep at most `limit` entries, evicting the least recently used.
    MaxEntries { limit: NonZeroUsize },
    /// Treat entries older than `seconds` as misses.
    Ttl { seconds: u64 },
}

impl CachePolicy {
    pub fn ttl(&self) -> Option<Duration> {
        match self {
            Self::Ttl { seconds } => Some(Duration::from_secs(*seconds)),
            _ => None,
        }
    }
}

/// Backoff settings for re-sending an already assembled upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadRetry {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for UploadRetry {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 1_000,
            max_delay_ms: 30_000,
        }
    }
}

/// Persistent application settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Backend URL compiled into the build.
    pub default_base_url: String,
    /// User-entered backend URL; wins over the default when set.
    pub base_url_override: Option<String>,
    /// Licence key handed opaquely to the scanning engine.
    pub license_key: Option<String>,
    /// Per-request timeout for the HTTP transport.
    pub request_timeout_secs: u64,
    /// Retention of decoded archival previews.
    pub cache_policy: CachePolicy,
    /// Longest preview edge in pixels; `None` keeps the frame's own size.
    pub preview_max_dimension: Option<u32>,
    /// Retry behaviour for the submit request.
    pub upload_retry: UploadRetry,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_base_url: DEFAULT_BASE_URL.to_string(),
            base_url_override: None,
            license_key: None,
            request_timeout_secs: 30,
            cache_policy: CachePolicy::default(),
            preview_max_dimension: None,
            upload_retry: UploadRetry::default(),
        }
    }
}

impl AppConfig {
    /// Apply the plain-string settings kept in local storage.
    ///
    /// Values are trimmed; blank values count as unset.
    pub fn with_persisted(mut self, base_url: Option<&str>, license_key: Option<&str>) -> Self {
        self.base_url_override = non_blank(base_url);
        self.license_key = non_blank(license_key);
        self
    }

    /// The backend URL requests should target, without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.base_url_override
            .as_deref()
            .and_then(non_blank_str)
            .unwrap_or(self.default_base_url.trim())
            .trim_end_matches('/')
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.and_then(non_blank_str).map(str::to_string)
}

fn non_blank_str(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_base_url_when_no_override() {
        let config = AppConfig::default();
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn override_is_trimmed_and_wins() {
        let config =
            AppConfig::default().with_persisted(Some("  https://records.example/api/ "), None);
        assert_eq!(config.base_url(), "https://records.example/api");
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = AppConfig::default().with_persisted(Some("   "), Some(""));
        assert!(config.base_url_override.is_none());
        assert!(config.license_key.is_none());
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: AppConfig = serde_json::from_str(
            r#"{"cache_policy":{"kind":"max_entries","limit":64},"license_key":"abc"}"#,
        )
        .expect("parse");
        assert_eq!(
            config.cache_policy,
            CachePolicy::MaxEntries {
                limit: NonZeroUsize::new(64).expect("non-zero")
            }
        );
        assert_eq!(config.license_key.as_deref(), Some("abc"));
        assert_eq!(config.request_timeout_secs, 30);
    }
}

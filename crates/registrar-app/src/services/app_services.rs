// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Central service layer — loads the persisted configuration and wires the
// scanning engine, export pipeline, HTTP transport and preview cache together.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use registrar_bridge::ScanningEngine;
use registrar_core::error::Result;
use registrar_core::session::user_id_from_session;
use registrar_core::{Ack, AppConfig, RecordListing, Transport};
use registrar_export::{ExportPipeline, RetryConfig};
use registrar_records::{HttpTransport, PreviewImage, RasterCache, RecordsFeed};
use tracing::{info, warn};

use super::data_dir;

const CONFIG_FILE: &str = "config.json";

/// Everything a command needs, built once at start-up.
pub struct AppServices {
    data_dir: PathBuf,
    /// What `config.json` holds; settings changes are applied to this.
    persisted: AppConfig,
    /// `persisted` plus any run-only override; what the services use.
    config: AppConfig,
    run_base_url: Option<String>,
    transport: Arc<HttpTransport>,
    cache: Arc<RasterCache>,
    scanner: Box<dyn ScanningEngine>,
    pipeline: ExportPipeline,
}

impl AppServices {
    /// Initialise all services. Call once at start-up.
    ///
    /// `base_url` overrides the persisted backend for this run only.
    pub fn init(
        data_dir_override: Option<&Path>,
        scans_dir: Option<&Path>,
        base_url: Option<&str>,
    ) -> Result<Self> {
        let dir = data_dir::data_dir(data_dir_override);
        info!(path = %dir.display(), "initialising app services");

        let persisted = load_config(&dir);
        let run_base_url = base_url.map(str::to_string);
        let config = effective_config(&persisted, run_base_url.as_deref());

        let transport = Arc::new(HttpTransport::new(&config)?);
        let cache = Arc::new(RasterCache::new(
            Arc::clone(&transport) as Arc<dyn Transport>,
            &config,
        ));
        let scans = match scans_dir {
            Some(path) => path.to_path_buf(),
            None => data_dir::data_subdir(&dir, "scans"),
        };
        let scanner = registrar_bridge::scanning_engine(scans);

        info!(base_url = config.base_url(), "app services initialised");
        Ok(Self {
            data_dir: dir,
            persisted,
            config,
            run_base_url,
            transport,
            cache,
            scanner,
            pipeline: ExportPipeline::default(),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn cache(&self) -> &RasterCache {
        &self.cache
    }

    // -- Export ---------------------------------------------------------------

    /// Load a captured document, export it and submit it.
    pub async fn export_document(
        &self,
        document_id: &str,
        form_metadata: serde_json::Value,
        session_user: Option<&str>,
    ) -> Result<Ack> {
        self.scanner
            .initialize(self.config.license_key.as_deref())?;
        let document = self.scanner.load_document(document_id)?;
        let user_id = user_id_from_session(session_user);
        let retry = RetryConfig::from(self.config.upload_retry);

        let ack = self
            .pipeline
            .export_and_submit(
                self.transport.as_ref(),
                &document,
                form_metadata,
                user_id,
                &retry,
            )
            .await?;
        Ok(ack)
    }

    pub fn list_scans(&self) -> Result<Vec<String>> {
        self.scanner.list_documents()
    }

    // -- Records --------------------------------------------------------------

    pub async fn preview(&self, reference: &str) -> PreviewImage {
        self.cache.resolve_preview(reference).await
    }

    /// A feed over the configured backend sharing this run's preview cache.
    pub fn records_feed(&self) -> RecordsFeed {
        RecordsFeed::new(
            Arc::clone(&self.transport) as Arc<dyn RecordListing>,
            Arc::clone(&self.cache),
        )
    }

    // -- Settings -------------------------------------------------------------

    /// Persist a new backend URL; blank clears the override.
    pub fn set_base_url(&mut self, url: &str) -> Result<()> {
        let license = self.persisted.license_key.clone();
        self.update_config(|config| config.with_persisted(Some(url), license.as_deref()))
    }

    /// Persist a new licence key; blank clears it.
    pub fn set_license_key(&mut self, key: &str) -> Result<()> {
        let url = self.persisted.base_url_override.clone();
        self.update_config(|config| config.with_persisted(url.as_deref(), Some(key)))
    }

    fn update_config(&mut self, apply: impl FnOnce(AppConfig) -> AppConfig) -> Result<()> {
        let updated = apply(self.persisted.clone());
        persist_config(&self.data_dir, &updated)?;
        self.config = effective_config(&updated, self.run_base_url.as_deref());
        self.persisted = updated;
        Ok(())
    }
}

/// Apply a run-only backend URL on top of the persisted settings.
fn effective_config(persisted: &AppConfig, run_base_url: Option<&str>) -> AppConfig {
    match run_base_url {
        Some(url) => persisted
            .clone()
            .with_persisted(Some(url), persisted.license_key.as_deref()),
        None => persisted.clone(),
    }
}

/// Load persisted config, falling back to defaults.
fn load_config(data_dir: &Path) -> AppConfig {
    let path = data_dir.join(CONFIG_FILE);
    let Ok(data) = std::fs::read_to_string(&path) else {
        return AppConfig::default();
    };
    match serde_json::from_str(&data) {
        Ok(config) => config,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring unreadable config");
            AppConfig::default()
        }
    }
}

fn persist_config(data_dir: &Path, config: &AppConfig) -> Result<()> {
    let path = data_dir.join(CONFIG_FILE);
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(&path, json)?;
    Ok(())
}

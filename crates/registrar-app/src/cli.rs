// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "registrar", version, about = "Civil-registry capture: export scans and browse submitted records")]
pub struct Cli {
    /// Directory holding config.json and the scan store.
    #[arg(long, global = true, env = "REGISTRAR_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Backend API URL for this run; not persisted.
    #[arg(long, global = true, env = "REGISTRAR_BASE_URL")]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Export a captured front/back document as TIFF and submit it.
    Export {
        /// Id of the captured document in the scan store.
        document_id: String,

        /// JSON file with the form answers sent as `formData`.
        #[arg(long)]
        metadata: PathBuf,

        /// Stored session user JSON; its `id` becomes `user_Id`.
        #[arg(long, env = "REGISTRAR_SESSION_USER")]
        user: Option<String>,

        /// Scan store directory (defaults to <data-dir>/scans).
        #[arg(long)]
        scans: Option<PathBuf>,
    },

    /// List captured documents in the scan store.
    Scans {
        #[arg(long)]
        scans: Option<PathBuf>,
    },

    /// Resolve an image reference and write its preview as PNG.
    Preview {
        reference: String,

        #[arg(long)]
        out: PathBuf,
    },

    /// Page through submitted records.
    Records {
        /// Maximum number of listing pages to load.
        #[arg(long, default_value_t = 1)]
        pages: u32,

        /// Only show records whose name or document type matches.
        #[arg(long)]
        search: Option<String>,
    },

    /// Show or change persisted settings.
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum SettingsAction {
    /// Print the effective configuration.
    Show,
    /// Set the backend API URL (blank clears the override).
    SetUrl { url: String },
    /// Set the scanning-engine licence key (blank clears it).
    SetLicense { key: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_export() {
        let cli = Cli::try_parse_from([
            "registrar",
            "export",
            "doc-1",
            "--metadata",
            "form.json",
            "--user",
            r#"{"id":7}"#,
        ])
        .expect("parse");
        match cli.command {
            Commands::Export {
                document_id, user, ..
            } => {
                assert_eq!(document_id, "doc-1");
                assert_eq!(user.as_deref(), Some(r#"{"id":7}"#));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn parses_settings() {
        let cli = Cli::try_parse_from(["registrar", "settings", "set-url", "http://h/api"])
            .expect("parse");
        assert!(matches!(
            cli.command,
            Commands::Settings {
                action: SettingsAction::SetUrl { ref url }
            } if url == "http://h/api"
        ));
    }
}

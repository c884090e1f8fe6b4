// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Registrar — civil-registry capture core
//
// Entry point. Initialises logging, loads the persisted configuration, and
// dispatches the requested command.

mod cli;
mod services;

use std::path::Path;

use clap::Parser;
use registrar_core::error::{RegistrarError, Result};
use registrar_core::human_errors::humanize_error;
use registrar_records::PreviewImage;

use cli::{Cli, Commands, SettingsAction};
use services::app_services::AppServices;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Registrar starting");

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        let human = humanize_error(&e);
        tracing::error!(error = %e, "command failed");
        eprintln!("{}\n{}", human.message, human.suggestion);
        if human.retriable {
            eprintln!("Running the same command again may succeed.");
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let scans = match &cli.command {
        Commands::Export { scans, .. } | Commands::Scans { scans } => scans.clone(),
        _ => None,
    };
    let mut svc = AppServices::init(
        cli.data_dir.as_deref(),
        scans.as_deref(),
        cli.base_url.as_deref(),
    )?;

    match cli.command {
        Commands::Export {
            document_id,
            metadata,
            user,
            ..
        } => {
            let form_metadata = read_metadata(&metadata)?;
            let ack = svc
                .export_document(&document_id, form_metadata, user.as_deref())
                .await?;
            println!("submitted {document_id}: HTTP {}", ack.status);
            if !ack.body.is_empty() {
                println!("{}", ack.body);
            }
        }

        Commands::Scans { .. } => {
            for id in svc.list_scans()? {
                println!("{id}");
            }
        }

        Commands::Preview { reference, out } => {
            let preview = svc.preview(&reference).await;
            match &preview {
                PreviewImage::Remote(url) => {
                    println!("directly displayable, not decoded: {url}");
                }
                PreviewImage::Rendered(image) | PreviewImage::Placeholder(image) => {
                    std::fs::write(&out, &image.png)?;
                    let kind = if preview.is_placeholder() {
                        "placeholder"
                    } else {
                        "preview"
                    };
                    println!(
                        "wrote {kind} {}x{} to {}",
                        image.width,
                        image.height,
                        out.display()
                    );
                }
            }
        }

        Commands::Records { pages, search } => {
            let mut feed = svc.records_feed();
            feed.load_up_to(pages.max(1)).await?;
            let shown = feed.search(search.as_deref().unwrap_or_default());
            for record in &shown {
                let preview = match &record.preview {
                    PreviewImage::Remote(_) => "remote",
                    PreviewImage::Rendered(_) => "rendered",
                    PreviewImage::Placeholder(_) => "placeholder",
                };
                println!(
                    "{}\t{}\t{}\t{}",
                    record.summary.full_name(),
                    record.summary.document_type_label(),
                    preview,
                    record.pdf_url().unwrap_or("-")
                );
            }
            let stats = svc.cache().stats();
            println!(
                "{} of {} records (page {}/{}); previews: {} rendered, {} hits, {} fetches",
                shown.len(),
                feed.records().len(),
                feed.current_page(),
                feed.last_page(),
                stats.entries,
                stats.hits,
                stats.fetches
            );
        }

        Commands::Settings { action } => match action {
            SettingsAction::Show => {
                println!("data dir: {}", svc.data_dir().display());
                println!("{}", serde_json::to_string_pretty(&masked(svc.config()))?);
            }
            SettingsAction::SetUrl { url } => {
                svc.set_base_url(&url)?;
                println!("backend URL: {}", svc.config().base_url());
            }
            SettingsAction::SetLicense { key } => {
                svc.set_license_key(&key)?;
                let state = if svc.config().license_key.is_some() {
                    "set"
                } else {
                    "cleared"
                };
                println!("licence key {state}");
            }
        },
    }
    Ok(())
}

fn read_metadata(path: &Path) -> Result<serde_json::Value> {
    let raw = std::fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&raw)?;
    if !value.is_object() {
        return Err(RegistrarError::Config(format!(
            "{} must contain a JSON object of form answers",
            path.display()
        )));
    }
    Ok(value)
}

/// Config for display, with the licence key hidden.
fn masked(config: &registrar_core::AppConfig) -> registrar_core::AppConfig {
    let mut shown = config.clone();
    if shown.license_key.is_some() {
        shown.license_key = Some("********".into());
    }
    shown
}

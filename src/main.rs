//! DocFlow - local-first rich-text document editor
//!
//! Documents live in a key-value store on disk and are edited as block
//! markup, with a simulated writing assistant and exporter.

mod app;
mod core;
mod ui;

use anyhow::Context;
use eframe::egui;
use tracing_subscriber::{filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::{DocflowApp, Route};
use crate::core::config::AppConfig;

fn main() -> anyhow::Result<()> {
    let (config, config_error) = match AppConfig::load_or_create() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    // Initialize logging
    let level = config.logging.level.parse().unwrap_or(LevelFilter::INFO);
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(level)
        .init();

    if let Some(e) = config_error {
        tracing::warn!("Failed to load config, using defaults: {:#}", e);
    }
    tracing::info!("Starting DocFlow...");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let handle = runtime.handle().clone();

    let initial = std::env::args()
        .nth(1)
        .map(|path| Route::parse(&path))
        .unwrap_or_default();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window.width, config.window.height])
            .with_min_inner_size([720.0, 540.0])
            .with_title("DocFlow"),
        ..Default::default()
    };

    eframe::run_native(
        "DocFlow",
        native_options,
        Box::new(move |cc| {
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Ok(Box::new(DocflowApp::new(cc, config, handle, initial)))
        }),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run DocFlow: {}", e))?;

    runtime.shutdown_background();
    Ok(())
}

// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Siteplan desktop application.

mod app;
mod ui;

use anyhow::Result;
use app::SiteplanApp;
use siteplan::config::Settings;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let settings = Settings::load_or_default();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(settings.window_size)
            .with_min_inner_size([800.0, 600.0])
            .with_title("Siteplan"),
        ..Default::default()
    };

    eframe::run_native(
        "Siteplan",
        options,
        Box::new(move |_cc| Ok(Box::new(SiteplanApp::new(settings)))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}

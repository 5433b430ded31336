// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Budget summary and pricing editor.

use siteplan::budget::{BudgetSummary, Tally};
use siteplan::config::PricingConfig;

fn tally_row(ui: &mut egui::Ui, label: &str, tally: &Tally) {
    ui.label(label);
    ui.label(tally.count.to_string());
    ui.label(format!("${:.2}", tally.total));
    ui.end_row();
}

fn price_field(ui: &mut egui::Ui, label: &str, value: &mut f64, suffix: &str) -> bool {
    ui.label(label);
    let changed = ui
        .add(egui::DragValue::new(value).speed(10.0).suffix(suffix))
        .changed();
    ui.end_row();
    changed
}

/// Display the budget. Returns new pricing when the user edited it.
pub fn show(ui: &mut egui::Ui, budget: &BudgetSummary, pricing: &PricingConfig) -> Option<PricingConfig> {
    ui.heading("Budget");
    egui::Grid::new("budget_summary")
        .num_columns(3)
        .striped(true)
        .show(ui, |ui| {
            tally_row(ui, "New cameras", &budget.cameras);
            tally_row(ui, "Switches", &budget.switches);
            tally_row(ui, "NVRs", &budget.nvrs);
            tally_row(ui, "PtP antennas", &budget.antennas);
            ui.label(egui::RichText::new("Existing cameras").weak());
            ui.label(egui::RichText::new(budget.existing_cameras.count.to_string()).weak());
            ui.label("");
            ui.end_row();
            ui.label(egui::RichText::new("Network drops").weak());
            ui.label(egui::RichText::new(budget.drops.count.to_string()).weak());
            ui.label("");
            ui.end_row();
        });

    ui.separator();
    egui::Grid::new("budget_totals").num_columns(2).show(ui, |ui| {
        ui.label("Equipment");
        ui.label(format!("${:.2}", budget.equipment));
        ui.end_row();
        ui.label("Subtotal");
        ui.label(format!("${:.2}", budget.subtotal));
        ui.end_row();
        ui.label(format!("Tax ({}%)", budget.tax_rate));
        ui.label(format!("${:.2}", budget.tax));
        ui.end_row();
        ui.label(egui::RichText::new("Total").strong());
        ui.label(egui::RichText::new(format!("${:.2}", budget.total)).strong());
        ui.end_row();
    });

    let mut edited = *pricing;
    let mut changed = false;
    ui.collapsing("Pricing", |ui| {
        egui::Grid::new("pricing").num_columns(2).show(ui, |ui| {
            changed |= price_field(ui, "Camera", &mut edited.default_camera_price, " $");
            changed |= price_field(ui, "Switch", &mut edited.default_switch_price, " $");
            changed |= price_field(ui, "NVR", &mut edited.default_nvr_price, " $");
            changed |= price_field(ui, "PtP antenna", &mut edited.connection_cost, " $");
            changed |= price_field(ui, "Sales tax", &mut edited.tax_rate, " %");
        });
    });

    changed.then(|| PricingConfig {
        default_camera_price: edited.default_camera_price.max(0.0),
        default_switch_price: edited.default_switch_price.max(0.0),
        default_nvr_price: edited.default_nvr_price.max(0.0),
        connection_cost: edited.connection_cost.max(0.0),
        tax_rate: edited.tax_rate.max(0.0),
    })
}

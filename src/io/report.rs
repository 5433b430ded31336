// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Itemized cost export (CSV).

use crate::config::PricingConfig;
use crate::models::link::LinkStore;
use crate::models::marker::MarkerStore;
use crate::models::region::RegionStore;
use crate::util::geometry::round2;
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::Path;

pub const ANTENNA_LABEL: &str = "PtP Antenna";

/// One detail line of the report.
#[derive(Debug, Clone, PartialEq)]
pub struct CostRow {
    pub building: String,
    pub kind: String,
    pub name: String,
    pub cost: f64,
    pub phase: String,
}

impl CostRow {
    /// Blank buildings sort after named ones.
    fn sort_key(&self) -> (bool, &str, &str, &str) {
        (self.building.is_empty(), self.building.as_str(), self.kind.as_str(), self.name.as_str())
    }
}

/// Detail rows: one per marker and one per distinct antenna, sorted.
pub fn cost_rows(
    markers: &MarkerStore,
    links: &LinkStore,
    regions: &RegionStore,
    pricing: &PricingConfig,
) -> Vec<CostRow> {
    let mut rows: Vec<CostRow> = markers
        .iter()
        .map(|m| CostRow {
            building: regions
                .region_at(m.position())
                .map(|r| r.name.clone())
                .unwrap_or_default(),
            kind: m.kind.label().to_string(),
            name: m.name.clone(),
            cost: m.price,
            phase: m.phase.clone().unwrap_or_default(),
        })
        .collect();
    rows.extend(links.antennas().into_iter().map(|a| CostRow {
        building: String::new(),
        kind: ANTENNA_LABEL.to_string(),
        name: a.name,
        cost: pricing.connection_cost,
        phase: String::new(),
    }));
    rows.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    rows
}

fn escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn line<I, S>(fields: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    fields
        .into_iter()
        .map(|f| escape(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Render the CSV report.
pub fn render_csv(rows: &[CostRow], tax_rate: f64) -> String {
    let mut lines = vec![line(["Building", "Type", "Name", "Unit Cost", "Phase"])];
    let mut summary: BTreeMap<(bool, &str, &str), (usize, f64)> = BTreeMap::new();
    let mut subtotal = 0.0;
    for row in rows {
        lines.push(line([
            row.building.as_str(),
            row.kind.as_str(),
            row.name.as_str(),
            row.cost.to_string().as_str(),
            row.phase.as_str(),
        ]));
        let entry = summary
            .entry((row.building.is_empty(), row.building.as_str(), row.kind.as_str()))
            .or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += row.cost;
        subtotal += row.cost;
    }

    lines.push(String::new());
    lines.push(String::new());
    lines.push(line(["Building", "Type", "Quantity", "Total Cost"]));
    for ((_, building, kind), (quantity, total)) in &summary {
        lines.push(line([*building, *kind, quantity.to_string().as_str(), total.to_string().as_str()]));
    }

    let tax = round2(subtotal * tax_rate / 100.0);
    lines.push(String::new());
    lines.push(line(["", "", "Subtotal", subtotal.to_string().as_str()]));
    lines.push(line(["", "", format!("Sales Tax ({}%)", tax_rate).as_str(), tax.to_string().as_str()]));
    lines.push(line(["", "", "Grand Total", (subtotal + tax).to_string().as_str()]));
    lines.join("\r\n")
}

/// Build and render the report for the current stores.
pub fn cost_report(
    markers: &MarkerStore,
    links: &LinkStore,
    regions: &RegionStore,
    pricing: &PricingConfig,
) -> String {
    render_csv(&cost_rows(markers, links, regions, pricing), pricing.tax_rate)
}

/// Write the report to a file.
pub fn export_csv(csv: &str, path: &Path) -> Result<()> {
    std::fs::write(path, csv).with_context(|| format!("writing {}", path.display()))?;
    log::info!("Exported cost report to {}", path.display());
    Ok(())
}

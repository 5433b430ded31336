// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Cost aggregation.
//!
//! `BudgetSummary::compute` is a pure function of the markers, the number of
//! distinct antennas and the pricing parameters. The editor recomputes it
//! after every change.

use crate::config::PricingConfig;
use crate::models::marker::{Marker, MarkerKind};
use crate::util::geometry::round2;

/// Count and summed cost of one line item.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Tally {
    pub count: usize,
    pub total: f64,
}

impl Tally {
    fn add(&mut self, price: f64) {
        self.count += 1;
        self.total += price;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BudgetSummary {
    pub cameras: Tally,
    pub existing_cameras: Tally,
    pub switches: Tally,
    pub nvrs: Tally,
    pub drops: Tally,
    pub antennas: Tally,
    /// Cameras, switches and NVRs.
    pub equipment: f64,
    pub subtotal: f64,
    pub tax_rate: f64,
    pub tax: f64,
    pub total: f64,
}

impl BudgetSummary {
    pub fn compute<'a, I>(markers: I, antenna_count: usize, pricing: &PricingConfig) -> Self
    where
        I: IntoIterator<Item = &'a Marker>,
    {
        let mut summary = BudgetSummary {
            tax_rate: pricing.tax_rate,
            ..Default::default()
        };
        for marker in markers {
            let tally = match marker.kind {
                MarkerKind::Camera => &mut summary.cameras,
                MarkerKind::ExistingCamera => &mut summary.existing_cameras,
                MarkerKind::Switch => &mut summary.switches,
                MarkerKind::Nvr => &mut summary.nvrs,
                MarkerKind::Drop => &mut summary.drops,
            };
            tally.add(marker.price);
            if marker.kind.is_equipment() {
                summary.equipment += marker.price;
            }
        }
        summary.antennas = Tally {
            count: antenna_count,
            total: antenna_count as f64 * pricing.connection_cost,
        };
        summary.subtotal = summary.equipment + summary.antennas.total;
        summary.tax = round2(summary.subtotal * pricing.tax_rate / 100.0);
        summary.total = summary.subtotal + summary.tax;
        summary
    }
}

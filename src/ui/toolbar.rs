// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Toolbar with mode selection and layer toggles.

use siteplan::filters::LayerFilters;
use siteplan::models::marker::MarkerKind;
use siteplan::viewport::Mode;

const MODES: [(Mode, &str); 10] = [
    (Mode::Select, "⬆ Select"),
    (Mode::Pan, "✋ Pan"),
    (Mode::PlaceMarker(MarkerKind::Drop), "◉ Drop"),
    (Mode::PlaceMarker(MarkerKind::Camera), "📷 Camera"),
    (Mode::PlaceMarker(MarkerKind::ExistingCamera), "📷 Existing"),
    (Mode::PlaceMarker(MarkerKind::Switch), "🖧 Switch"),
    (Mode::PlaceMarker(MarkerKind::Nvr), "🖴 NVR"),
    (Mode::PlaceLink, "⟋ PtP Link"),
    (Mode::PlaceRegion, "▱ Building"),
    (Mode::PlaceRegionRect, "▭ Building (rect)"),
];

fn hint(mode: Mode) -> &'static str {
    match mode {
        Mode::Select => "Click to select, drag markers to move, drag handles to resize or aim",
        Mode::Pan => "Drag to pan, scroll to zoom",
        Mode::PlaceMarker(_) => "Click on the floor plan to place",
        Mode::PlaceLink => "Click the start point, then the end point; Escape cancels",
        Mode::PlaceRegion => "Click to add corners, click the first corner or press Enter to close",
        Mode::PlaceRegionRect => "Drag to draw a rectangle",
    }
}

/// Display the toolbar. Returns the newly chosen mode, if any.
pub fn show(ui: &mut egui::Ui, current: Mode, layers: &mut LayerFilters) -> Option<Mode> {
    let mut chosen = None;
    ui.horizontal_wrapped(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;
        ui.label("Tools:");
        ui.separator();
        for (mode, label) in MODES {
            if ui.selectable_label(current == mode, label).clicked() && current != mode {
                chosen = Some(mode);
            }
        }
    });

    ui.horizontal_wrapped(|ui| {
        ui.label("Layers:");
        ui.separator();
        for kind in MarkerKind::ALL {
            ui.checkbox(layers.kind_mut(kind), kind.label());
        }
        ui.checkbox(&mut layers.links, "PtP Links");
        ui.checkbox(&mut layers.fov, "Field of View");
        ui.checkbox(&mut layers.buildings, "Buildings");
        ui.separator();
        ui.label(egui::RichText::new(hint(chosen.unwrap_or(current))).italics().weak());
    });

    chosen
}

// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Properties panel for the selected marker, link or building.
//!
//! Widgets are rebuilt from editor state every frame; any edit comes back
//! as a `PropertiesAction` for the app to apply.

use siteplan::editor::Editor;
use siteplan::events::Selection;
use siteplan::models::marker::{Marker, MarkerKind, MarkerUpdate, PIN_SCALE_LIMITS};
use siteplan::util::geometry::{FOV_RANGE_LIMITS, FOV_SPREAD_LIMITS};

/// Result of properties panel interaction.
pub enum PropertiesAction {
    None,
    UpdateMarker(String, MarkerUpdate),
    RenameLink(String, String),
    RenameRegion(String, String),
    DeleteSelected,
}

pub fn show(ui: &mut egui::Ui, editor: &Editor) -> PropertiesAction {
    ui.heading("Properties");
    ui.separator();

    let action = match editor.selection() {
        None => {
            ui.label(egui::RichText::new("Nothing selected").weak());
            PropertiesAction::None
        }
        Some(Selection::Marker(id)) => match editor.markers().get(id) {
            Some(marker) => marker_properties(ui, editor, marker),
            None => PropertiesAction::None,
        },
        Some(Selection::Link(id)) => match editor.links().get(id) {
            Some(link) => {
                let mut name = link.name.clone();
                ui.horizontal(|ui| {
                    ui.label("Name:");
                    ui.text_edit_singleline(&mut name);
                });
                ui.label(format!("From: ({:.0}, {:.0})", link.x1, link.y1));
                ui.label(format!("To: ({:.0}, {:.0})", link.x2, link.y2));
                ui.label(format!("Length: {:.0} px", link.length()));
                if name != link.name {
                    PropertiesAction::RenameLink(id.clone(), name)
                } else {
                    PropertiesAction::None
                }
            }
            None => PropertiesAction::None,
        },
        Some(Selection::Region(id)) => match editor.regions().get(id) {
            Some(region) => {
                let mut name = region.name.clone();
                ui.horizontal(|ui| {
                    ui.label("Name:");
                    ui.text_edit_singleline(&mut name);
                });
                ui.label(format!("Corners: {}", region.points.len()));
                ui.label(format!("Markers inside: {}", editor.markers_in_region(id)));
                if name != region.name {
                    PropertiesAction::RenameRegion(id.clone(), name)
                } else {
                    PropertiesAction::None
                }
            }
            None => PropertiesAction::None,
        },
    };

    if editor.selection().is_some() {
        ui.add_space(8.0);
        if ui.button("🗑 Delete").clicked() {
            return PropertiesAction::DeleteSelected;
        }
    }
    action
}

fn marker_properties(ui: &mut egui::Ui, editor: &Editor, marker: &Marker) -> PropertiesAction {
    let mut update = MarkerUpdate::default();

    ui.label(egui::RichText::new(marker.kind.label()).strong());
    let mut name = marker.name.clone();
    ui.horizontal(|ui| {
        ui.label("Name:");
        if ui.text_edit_singleline(&mut name).changed() {
            update.name = Some(name.clone());
        }
    });
    ui.label(format!("Position: ({:.0}, {:.0})", marker.x, marker.y));
    if let Some(region) = editor.region_of(&marker.id) {
        ui.label(format!("Building: {}", region.name));
    }

    let mut price = marker.price;
    ui.horizontal(|ui| {
        ui.label("Price:");
        if ui.add(egui::DragValue::new(&mut price).speed(10.0).prefix("$")).changed() {
            update.price = Some(price);
        }
    });

    if marker.kind != MarkerKind::Drop {
        let mut linked = marker.linked_drop.clone();
        let linked_name = linked
            .as_deref()
            .and_then(|id| editor.markers().get(id))
            .map_or("None".to_string(), |d| d.name.clone());
        egui::ComboBox::from_label("Linked drop")
            .selected_text(linked_name)
            .show_ui(ui, |ui| {
                ui.selectable_value(&mut linked, None, "None");
                for drop in editor.markers().of_kind(MarkerKind::Drop) {
                    ui.selectable_value(&mut linked, Some(drop.id.clone()), drop.name.as_str());
                }
            });
        if linked != marker.linked_drop {
            update.linked_drop = Some(linked);
        }
    }

    let mut phase = marker.phase.clone();
    egui::ComboBox::from_label("Phase")
        .selected_text(phase.clone().unwrap_or_else(|| "Unassigned".to_string()))
        .show_ui(ui, |ui| {
            ui.selectable_value(&mut phase, None, "Unassigned");
            for p in editor.phases() {
                ui.selectable_value(&mut phase, Some(p.clone()), p.as_str());
            }
        });
    if phase != marker.phase {
        update.phase = Some(phase);
    }

    let mut scale = marker.pin_scale;
    if ui
        .add(egui::Slider::new(&mut scale, PIN_SCALE_LIMITS.0..=PIN_SCALE_LIMITS.1).text("Size"))
        .changed()
    {
        update.pin_scale = Some(scale);
    }

    if marker.kind.is_camera() {
        ui.separator();
        ui.label("Field of view");
        let (mut angle, mut spread, mut range) = (marker.fov_angle, marker.fov_spread, marker.fov_range);
        if ui.add(egui::Slider::new(&mut angle, 0.0..=359.0).text("Direction °")).changed() {
            update.fov_angle = Some(angle);
        }
        if ui
            .add(egui::Slider::new(&mut spread, FOV_SPREAD_LIMITS.0..=FOV_SPREAD_LIMITS.1).text("Spread °"))
            .changed()
        {
            update.fov_spread = Some(spread);
        }
        if ui
            .add(egui::Slider::new(&mut range, FOV_RANGE_LIMITS.0..=FOV_RANGE_LIMITS.1).text("Range"))
            .changed()
        {
            update.fov_range = Some(range);
        }
    }

    if update.is_empty() {
        PropertiesAction::None
    } else {
        PropertiesAction::UpdateMarker(marker.id.clone(), update)
    }
}

// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Side panel listing every entity, plus phase management.

use siteplan::editor::Editor;
use siteplan::events::Selection;
use siteplan::models::marker::MarkerKind;

pub enum ListAction {
    None,
    Select(Selection),
    AddPhase(String),
    RemovePhase(String),
    SetPhaseVisible(String, bool),
    SetUnassignedVisible(bool),
}

pub fn show(ui: &mut egui::Ui, editor: &Editor, new_phase: &mut String) -> ListAction {
    let mut action = ListAction::None;
    let selection = editor.selection();

    egui::ScrollArea::vertical().show(ui, |ui| {
        for kind in MarkerKind::ALL {
            let markers: Vec<_> = editor.markers().of_kind(kind).collect();
            ui.collapsing(format!("{} ({})", kind.label(), markers.len()), |ui| {
                for marker in markers {
                    let selected = selection == Some(&Selection::Marker(marker.id.clone()));
                    let mut text = egui::RichText::new(marker.name.as_str());
                    if !editor.is_marker_visible(marker) {
                        text = text.weak();
                    }
                    if ui.selectable_label(selected, text).clicked() {
                        action = ListAction::Select(Selection::Marker(marker.id.clone()));
                    }
                }
            });
        }

        ui.collapsing(format!("PtP Links ({})", editor.links().len()), |ui| {
            for link in editor.links().iter() {
                let selected = selection == Some(&Selection::Link(link.id.clone()));
                if ui.selectable_label(selected, link.name.as_str()).clicked() {
                    action = ListAction::Select(Selection::Link(link.id.clone()));
                }
            }
        });

        ui.collapsing(format!("Buildings ({})", editor.regions().len()), |ui| {
            for region in editor.regions().iter() {
                let selected = selection == Some(&Selection::Region(region.id.clone()));
                let label = format!("{} ({})", region.name, editor.markers_in_region(&region.id));
                if ui.selectable_label(selected, label).clicked() {
                    action = ListAction::Select(Selection::Region(region.id.clone()));
                }
            }
        });

        ui.separator();
        ui.heading("Phases");

        ui.horizontal(|ui| {
            let response = ui.text_edit_singleline(new_phase);
            let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if (ui.button("Add").clicked() || submitted) && !new_phase.trim().is_empty() {
                action = ListAction::AddPhase(std::mem::take(new_phase));
            }
        });

        let mut unassigned = editor.phase_filters().is_unassigned_shown();
        if ui.checkbox(&mut unassigned, "Unassigned").changed() {
            action = ListAction::SetUnassignedVisible(unassigned);
        }
        for phase in editor.phases() {
            ui.horizontal(|ui| {
                let mut shown = editor.phase_filters().is_phase_shown(phase);
                if ui.checkbox(&mut shown, phase.as_str()).changed() {
                    action = ListAction::SetPhaseVisible(phase.clone(), shown);
                }
                if ui.small_button("✖").on_hover_text("Remove phase").clicked() {
                    action = ListAction::RemovePhase(phase.clone());
                }
            });
        }
    });

    action
}

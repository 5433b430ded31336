// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! `SiteplanApp` owns the editor and the background texture, runs file
//! loading on a worker thread, and routes panel and canvas actions into
//! editor calls.

use crate::ui::{budget, canvas, entity_list, properties, toolbar};
use siteplan::config::Settings;
use siteplan::editor::{Background, Editor};
use siteplan::events::Event;
use siteplan::io::media::{self, LoadedImage};
use siteplan::io::report;
use siteplan::io::serialization::{self, LoadedProject};
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver};

/// Result of a background load.
enum Loaded {
    Image(LoadedImage),
    Project(LoadedProject),
}

/// Main application state.
pub struct SiteplanApp {
    editor: Editor,

    /// Background image texture for display
    texture: Option<egui::TextureHandle>,

    /// Receiver for background loading
    loader: Option<Receiver<Result<Loaded, String>>>,

    /// Loading state message
    loading_message: Option<String>,

    /// Last error or status message for the status bar
    status: Option<String>,

    /// Text field for new phase names
    new_phase: String,
}

impl SiteplanApp {
    pub fn new(settings: Settings) -> Self {
        Self {
            editor: Editor::new(&settings),
            texture: None,
            loader: None,
            loading_message: None,
            status: None,
            new_phase: String::new(),
        }
    }

    /// Run `job` on a worker thread; the result is picked up in `update`.
    fn spawn_load<F>(&mut self, message: &str, job: F)
    where
        F: FnOnce() -> Result<Loaded, String> + Send + 'static,
    {
        let (sender, receiver) = channel();
        self.loader = Some(receiver);
        self.loading_message = Some(message.to_string());
        std::thread::spawn(move || {
            let _ = sender.send(job());
        });
    }

    fn open_image(&mut self, path: PathBuf) {
        self.spawn_load("Loading floor plan...", move || {
            media::load_image(&path)
                .map(Loaded::Image)
                .map_err(|e| format!("Failed to load {}: {}", path.display(), e))
        });
    }

    fn open_project(&mut self, path: PathBuf) {
        self.spawn_load("Loading project...", move || {
            serialization::load_project(&path)
                .map(Loaded::Project)
                .map_err(|e| format!("{:#}", e))
        });
    }

    fn save_project(&mut self, path: PathBuf) {
        match serialization::export_project(&self.editor.export(), &path) {
            Ok(()) => self.status = Some(format!("Saved {}", path.display())),
            Err(e) => self.report_error(format!("Failed to save project: {:#}", e)),
        }
    }

    fn export_costs(&mut self, path: PathBuf) {
        let csv = report::cost_report(
            self.editor.markers(),
            self.editor.links(),
            self.editor.regions(),
            self.editor.pricing(),
        );
        match report::export_csv(&csv, &path) {
            Ok(()) => self.status = Some(format!("Exported costs to {}", path.display())),
            Err(e) => self.report_error(format!("Failed to export costs: {:#}", e)),
        }
    }

    fn report_error(&mut self, message: String) {
        log::error!("{}", message);
        self.status = Some(message);
    }

    fn set_texture(&mut self, ctx: &egui::Context, image: Option<&LoadedImage>) {
        self.texture = image.map(|image| {
            let size = [image.width as usize, image.height as usize];
            let color_image = egui::ColorImage::from_rgba_unmultiplied(size, &image.pixels);
            ctx.load_texture("floor_plan", color_image, egui::TextureOptions::LINEAR)
        });
    }

    fn poll_loader(&mut self, ctx: &egui::Context) {
        let Some(receiver) = &self.loader else {
            return;
        };
        let Ok(result) = receiver.try_recv() else {
            return;
        };
        self.loader = None;
        self.loading_message = None;

        match result {
            Ok(Loaded::Image(image)) => {
                self.set_texture(ctx, Some(&image));
                self.editor.set_background(Background::from(&image));
                self.status = None;
            }
            Ok(Loaded::Project(project)) => {
                self.set_texture(ctx, project.background.as_ref());
                let background = project.background.as_ref().map(Background::from);
                self.editor.import(project.document, background);
                self.status = None;
            }
            Err(e) => self.report_error(e),
        }
    }

    fn drain_events(&mut self) {
        for event in self.editor.drain_events() {
            match &event {
                Event::Created { id, .. } => self.status = Some(format!("Created {}", id)),
                Event::Removed { id, .. } => self.status = Some(format!("Deleted {}", id)),
                _ => {}
            }
            log::debug!("{:?}", event);
        }
    }

    fn menu_bar(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        egui::menu::bar(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui.button("New Project").clicked() {
                    self.editor.new_project();
                    self.texture = None;
                    ui.close_menu();
                }
                if ui.button("Open Floor Plan...").clicked() {
                    if let Some(path) = rfd::FileDialog::new()
                        .add_filter("Images", &["png", "jpg", "jpeg", "gif", "bmp", "webp", "tif", "tiff"])
                        .pick_file()
                    {
                        self.open_image(path);
                    }
                    ui.close_menu();
                }
                if ui.button("Open Project...").clicked() {
                    if let Some(path) = rfd::FileDialog::new()
                        .add_filter("Projects", &["json", "yaml", "yml"])
                        .pick_file()
                    {
                        self.open_project(path);
                    }
                    ui.close_menu();
                }
                ui.separator();
                ui.menu_button("Save Project", |ui| {
                    if ui.button("Save as JSON...").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("JSON", &["json"])
                            .set_file_name("siteplan.json")
                            .save_file()
                        {
                            self.save_project(path);
                        }
                        ui.close_menu();
                    }
                    if ui.button("Save as YAML...").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("YAML", &["yaml", "yml"])
                            .set_file_name("siteplan.yaml")
                            .save_file()
                        {
                            self.save_project(path);
                        }
                        ui.close_menu();
                    }
                });
                if ui.button("Export Costs (CSV)...").clicked() {
                    if let Some(path) = rfd::FileDialog::new()
                        .add_filter("CSV", &["csv"])
                        .set_file_name("siteplan-costs.csv")
                        .save_file()
                    {
                        self.export_costs(path);
                    }
                    ui.close_menu();
                }
                ui.separator();
                if ui.button("Quit").clicked() {
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });

            ui.menu_button("Edit", |ui| {
                let has_selection = self.editor.selection().is_some();
                if ui.add_enabled(has_selection, egui::Button::new("Delete Selected")).clicked() {
                    self.editor.delete_selected();
                    ui.close_menu();
                }
                if ui.add_enabled(has_selection, egui::Button::new("Deselect")).clicked() {
                    self.editor.deselect_all(false);
                    ui.close_menu();
                }
            });

            ui.menu_button("View", |ui| {
                if ui.button("Zoom In").clicked() {
                    self.editor.zoom_in();
                    ui.close_menu();
                }
                if ui.button("Zoom Out").clicked() {
                    self.editor.zoom_out();
                    ui.close_menu();
                }
                if ui.button("Fit to Window").clicked() {
                    self.editor.fit_to_view();
                    ui.close_menu();
                }
            });
        });
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.editor.escape();
        }

        // Only process if no text field is focused
        if ctx.wants_keyboard_input() {
            return;
        }
        if ctx.input(|i| i.key_pressed(egui::Key::Enter)) {
            self.editor.enter();
        }
        if ctx.input(|i| i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace)) {
            self.editor.delete_selected();
        }
    }
}

impl eframe::App for SiteplanApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_loader(ctx);

        // Request repaint if still loading (to update spinner)
        if self.loading_message.is_some() {
            ctx.request_repaint();
        }

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            self.menu_bar(ui, ctx);
        });

        let mut layers = *self.editor.layers();
        let chosen_mode = egui::TopBottomPanel::top("toolbar")
            .show(ctx, |ui| toolbar::show(ui, self.editor.mode(), &mut layers))
            .inner;
        if let Some(mode) = chosen_mode {
            self.editor.set_mode(mode);
        }
        if layers != *self.editor.layers() {
            self.editor.set_layers(layers);
        }

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| match &self.status {
                Some(message) => ui.label(message.as_str()),
                None => ui.label(egui::RichText::new("Ready").weak()),
            });
        });

        let list_action = egui::SidePanel::left("entities")
            .default_width(220.0)
            .show(ctx, |ui| entity_list::show(ui, &self.editor, &mut self.new_phase))
            .inner;
        match list_action {
            entity_list::ListAction::Select(selection) => {
                self.editor.select(selection);
            }
            entity_list::ListAction::AddPhase(name) => {
                if !self.editor.add_phase(&name) {
                    self.status = Some(format!("Phase {:?} already exists", name.trim()));
                }
            }
            entity_list::ListAction::RemovePhase(name) => {
                self.editor.remove_phase(&name);
            }
            entity_list::ListAction::SetPhaseVisible(name, visible) => {
                self.editor.set_phase_visible(&name, visible);
            }
            entity_list::ListAction::SetUnassignedVisible(visible) => {
                self.editor.set_unassigned_visible(visible);
            }
            entity_list::ListAction::None => {}
        }

        let (properties_action, pricing) = egui::SidePanel::right("properties")
            .default_width(260.0)
            .show(ctx, |ui| {
                let action = properties::show(ui, &self.editor);
                ui.separator();
                let pricing = budget::show(ui, self.editor.budget(), self.editor.pricing());
                (action, pricing)
            })
            .inner;
        match properties_action {
            properties::PropertiesAction::UpdateMarker(id, update) => {
                self.editor.update_marker(&id, update);
            }
            properties::PropertiesAction::RenameLink(id, name) => {
                self.editor.rename_link(&id, &name);
            }
            properties::PropertiesAction::RenameRegion(id, name) => {
                self.editor.rename_region(&id, &name);
            }
            properties::PropertiesAction::DeleteSelected => {
                self.editor.delete_selected();
            }
            properties::PropertiesAction::None => {}
        }
        if let Some(pricing) = pricing {
            self.editor.set_pricing(pricing);
        }

        self.handle_keys(ctx);

        // Main canvas (center)
        let canvas_actions = egui::CentralPanel::default()
            .show(ctx, |ui| {
                if let Some(ref message) = self.loading_message {
                    ui.centered_and_justified(|ui| {
                        ui.vertical_centered(|ui| {
                            ui.add_space(20.0);
                            ui.spinner();
                            ui.add_space(10.0);
                            ui.label(
                                egui::RichText::new(message)
                                    .size(16.0)
                                    .color(egui::Color32::from_gray(200)),
                            );
                        });
                    });
                    Vec::new()
                } else {
                    canvas::show(ui, &self.editor, self.texture.as_ref())
                }
            })
            .inner;

        for action in canvas_actions {
            match action {
                canvas::CanvasAction::Resized(width, height) => self.editor.set_container_size(width, height),
                canvas::CanvasAction::PointerDown(at, button) => {
                    if let Some(siteplan::models::Placement::Rejected(reason)) =
                        self.editor.pointer_down(at, button)
                    {
                        log::debug!("Click ignored: {:?}", reason);
                    }
                }
                canvas::CanvasAction::PointerMove(at) => self.editor.pointer_move(at),
                canvas::CanvasAction::PointerUp(at, button) => {
                    self.editor.pointer_up(at, button);
                }
                canvas::CanvasAction::Wheel(at, delta) => self.editor.wheel(at, delta),
            }
        }

        self.drain_events();
    }
}

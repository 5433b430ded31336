// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! The document controller.
//!
//! `Editor` owns the viewport, the three entity stores, pricing, phases and
//! filters, and turns raw pointer and key input into store mutations. Every
//! mutation pushes id-keyed [`Event`]s and recomputes the derived state
//! (marker containment and the budget) before returning.
//!
//! Pointer positions are screen coordinates relative to the canvas origin.

use crate::budget::BudgetSummary;
use crate::config::{PricingConfig, Settings};
use crate::events::{EntityKind, Event, EventQueue, Selection};
use crate::filters::{self, LayerFilters, PhaseFilters};
use crate::hit::{self, HitPart, Scene};
use crate::io::media::LoadedImage;
use crate::models::link::{Antenna, LinkStore, LinkTool};
use crate::models::marker::{Marker, MarkerKind, MarkerStore, MarkerUpdate, PIN_SCALE_LIMITS};
use crate::models::project::{ProjectDocument, DOCUMENT_VERSION};
use crate::models::region::{OutlineTool, RectTool, Region, RegionStore};
use crate::models::{Placement, Rejection};
use crate::util::geometry::{fov_from_range_drag, fov_spread_from_drag, resize_scale, Point};
use crate::viewport::{ImageBounds, Mode, Viewport, ZOOM_IN_STEP, ZOOM_OUT_STEP};
use std::collections::HashMap;

/// Screen distance on either axis a pressed marker must travel before it starts moving.
pub const DRAG_THRESHOLD: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Middle,
    Secondary,
}

/// The loaded background raster.
#[derive(Debug, Clone, PartialEq)]
pub struct Background {
    pub data_url: String,
    pub bounds: ImageBounds,
}

impl From<&LoadedImage> for Background {
    fn from(image: &LoadedImage) -> Self {
        Self {
            data_url: image.data_url.clone(),
            bounds: ImageBounds {
                width: image.width,
                height: image.height,
            },
        }
    }
}

/// Pointer gesture in progress.
#[derive(Debug, Clone, PartialEq, Default)]
enum Gesture {
    #[default]
    Idle,
    Panning {
        last: Point,
    },
    /// Marker pressed but not yet moved past the threshold.
    Pressing {
        id: String,
        start: Point,
        origin: Point,
    },
    Moving {
        id: String,
        start: Point,
        origin: Point,
    },
    Resizing {
        id: String,
        start_scale: f64,
        start_distance: f64,
    },
    Aiming {
        id: String,
    },
    Spreading {
        id: String,
    },
}

pub struct Editor {
    snap_radius: f64,
    default_pricing: PricingConfig,
    pricing: PricingConfig,
    viewport: Viewport,
    container: (f64, f64),
    mode: Mode,
    background: Option<Background>,
    markers: MarkerStore,
    links: LinkStore,
    regions: RegionStore,
    phases: Vec<String>,
    layers: LayerFilters,
    phase_filters: PhaseFilters,
    selection: Option<Selection>,
    link_tool: LinkTool,
    outline_tool: OutlineTool,
    rect_tool: RectTool,
    gesture: Gesture,
    /// Marker id to the id of the first region containing it.
    containment: HashMap<String, String>,
    budget: BudgetSummary,
    events: EventQueue,
}

impl Editor {
    pub fn new(settings: &Settings) -> Self {
        let mut editor = Self {
            snap_radius: settings.snap_radius,
            default_pricing: settings.pricing,
            pricing: settings.pricing,
            viewport: Viewport::default(),
            container: (
                f64::from(settings.window_size[0]),
                f64::from(settings.window_size[1]),
            ),
            mode: Mode::Select,
            background: None,
            markers: MarkerStore::new(),
            links: LinkStore::new(),
            regions: RegionStore::new(),
            phases: Vec::new(),
            layers: LayerFilters::default(),
            phase_filters: PhaseFilters::default(),
            selection: None,
            link_tool: LinkTool::default(),
            outline_tool: OutlineTool::default(),
            rect_tool: RectTool::default(),
            gesture: Gesture::Idle,
            containment: HashMap::new(),
            budget: BudgetSummary::default(),
            events: EventQueue::default(),
        };
        editor.refresh();
        editor
    }

    // ---- read access ----

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn background(&self) -> Option<&Background> {
        self.background.as_ref()
    }

    pub fn markers(&self) -> &MarkerStore {
        &self.markers
    }

    pub fn links(&self) -> &LinkStore {
        &self.links
    }

    pub fn regions(&self) -> &RegionStore {
        &self.regions
    }

    pub fn pricing(&self) -> &PricingConfig {
        &self.pricing
    }

    pub fn snap_radius(&self) -> f64 {
        self.snap_radius
    }

    pub fn phases(&self) -> &[String] {
        &self.phases
    }

    pub fn layers(&self) -> &LayerFilters {
        &self.layers
    }

    pub fn phase_filters(&self) -> &PhaseFilters {
        &self.phase_filters
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn selected_marker(&self) -> Option<&Marker> {
        match &self.selection {
            Some(Selection::Marker(id)) => self.markers.get(id),
            _ => None,
        }
    }

    pub fn budget(&self) -> &BudgetSummary {
        &self.budget
    }

    pub fn antennas(&self) -> Vec<Antenna> {
        self.links.antennas()
    }

    /// Region containing the marker, first match wins.
    pub fn region_of(&self, marker_id: &str) -> Option<&Region> {
        self.containment
            .get(marker_id)
            .and_then(|region_id| self.regions.get(region_id))
    }

    pub fn markers_in_region(&self, region_id: &str) -> usize {
        self.containment.values().filter(|r| *r == region_id).count()
    }

    pub fn is_marker_visible(&self, marker: &Marker) -> bool {
        filters::is_marker_visible(marker, &self.layers, &self.phase_filters)
    }

    /// Pending link segment for the live preview.
    pub fn link_preview(&self) -> Option<(Point, Point)> {
        self.link_tool.preview()
    }

    /// Captured outline vertices.
    pub fn outline_points(&self) -> &[Point] {
        self.outline_tool.points()
    }

    pub fn outline_preview_edge(&self) -> Option<(Point, Point)> {
        self.outline_tool.preview_edge()
    }

    pub fn rect_preview(&self) -> Option<(Point, Point)> {
        self.rect_tool.preview()
    }

    pub fn is_dragging(&self) -> bool {
        self.gesture != Gesture::Idle
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        self.events.drain()
    }

    // ---- mode and viewport ----

    /// Switch the interaction mode. Pending placements are discarded and
    /// leaving select mode clears the selection.
    pub fn set_mode(&mut self, mode: Mode) {
        if self.cancel_placement() {
            log::debug!("Pending placement discarded on mode change");
        }
        self.gesture = Gesture::Idle;
        if mode != Mode::Select {
            self.deselect_all(false);
        }
        if mode != self.mode {
            log::debug!("Mode {} -> {}", self.mode.label(), mode.label());
            self.mode = mode;
            self.events.push(Event::ModeChanged(mode));
        }
    }

    pub fn set_container_size(&mut self, width: f64, height: f64) {
        self.container = (width, height);
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = Viewport::from_state(viewport);
        self.events.push(Event::ViewportChanged);
    }

    /// Fit the background into the container.
    pub fn fit_to_view(&mut self) {
        if let Some(bg) = &self.background {
            self.viewport.fit(self.container, bg.bounds);
            self.events.push(Event::ViewportChanged);
        }
    }

    pub fn zoom_at(&mut self, screen: Point, factor: f64) {
        self.viewport.zoom_at(screen, factor);
        self.events.push(Event::ViewportChanged);
    }

    pub fn zoom_in(&mut self) {
        self.zoom_at(self.container_center(), ZOOM_IN_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.zoom_at(self.container_center(), ZOOM_OUT_STEP);
    }

    /// One wheel tick at `screen`. Positive `delta_y` zooms out.
    pub fn wheel(&mut self, screen: Point, delta_y: f64) {
        if delta_y == 0.0 {
            return;
        }
        self.viewport.zoom_wheel(screen, delta_y);
        self.events.push(Event::ViewportChanged);
    }

    fn container_center(&self) -> Point {
        Point::new(self.container.0 / 2.0, self.container.1 / 2.0)
    }

    // ---- pointer input ----

    /// Returns the placement outcome when a placement tool consumed the press.
    pub fn pointer_down(&mut self, screen: Point, button: PointerButton) -> Option<Placement> {
        let pans = button == PointerButton::Middle
            || (button == PointerButton::Primary && self.mode == Mode::Pan);
        if pans {
            self.gesture = Gesture::Panning { last: screen };
            return None;
        }
        if button != PointerButton::Primary {
            return None;
        }

        let at = self.viewport.to_image_space(screen);
        match self.mode {
            Mode::Select => {
                self.press_select(screen, at);
                None
            }
            Mode::Pan => None,
            Mode::PlaceMarker(kind) => Some(self.place_marker(kind, at)),
            Mode::PlaceLink => Some(self.place_link(at)),
            Mode::PlaceRegion => Some(self.place_outline_vertex(at)),
            Mode::PlaceRegionRect => Some(self.start_rect(at)),
        }
    }

    pub fn pointer_move(&mut self, screen: Point) {
        let gesture = std::mem::take(&mut self.gesture);
        self.gesture = match gesture {
            Gesture::Idle => {
                let at = self.viewport.to_image_space(screen);
                self.link_tool.hover(at);
                self.outline_tool.hover(at);
                self.rect_tool.drag(at);
                Gesture::Idle
            }
            Gesture::Panning { last } => {
                self.viewport.pan_by(screen.x - last.x, screen.y - last.y);
                self.events.push(Event::ViewportChanged);
                Gesture::Panning { last: screen }
            }
            Gesture::Pressing { id, start, origin } => {
                if (screen.x - start.x).abs() > DRAG_THRESHOLD || (screen.y - start.y).abs() > DRAG_THRESHOLD {
                    log::debug!("Drag started on {}", id);
                    self.drag_marker(&id, start, origin, screen);
                    Gesture::Moving { id, start, origin }
                } else {
                    Gesture::Pressing { id, start, origin }
                }
            }
            Gesture::Moving { id, start, origin } => {
                self.drag_marker(&id, start, origin, screen);
                Gesture::Moving { id, start, origin }
            }
            Gesture::Resizing {
                id,
                start_scale,
                start_distance,
            } => {
                self.drag_resize(&id, start_scale, start_distance, screen);
                Gesture::Resizing {
                    id,
                    start_scale,
                    start_distance,
                }
            }
            Gesture::Aiming { id } => {
                self.drag_range(&id, screen);
                Gesture::Aiming { id }
            }
            Gesture::Spreading { id } => {
                self.drag_spread(&id, screen);
                Gesture::Spreading { id }
            }
        };
    }

    /// Returns the placement outcome when a rectangle drag was released.
    pub fn pointer_up(&mut self, screen: Point, button: PointerButton) -> Option<Placement> {
        match std::mem::take(&mut self.gesture) {
            Gesture::Idle | Gesture::Pressing { .. } => {}
            Gesture::Panning { .. } => log::debug!("Pan finished"),
            Gesture::Moving { id, .. }
            | Gesture::Resizing { id, .. }
            | Gesture::Aiming { id }
            | Gesture::Spreading { id } => log::debug!("Drag finished on {}", id),
        }

        if button != PointerButton::Primary
            || self.mode != Mode::PlaceRegionRect
            || !self.rect_tool.is_dragging()
        {
            return None;
        }
        let mut at = self.viewport.to_image_space(screen);
        if let Some(bg) = &self.background {
            at.x = at.x.clamp(0.0, f64::from(bg.bounds.width));
            at.y = at.y.clamp(0.0, f64::from(bg.bounds.height));
        }
        let outcome = self.rect_tool.release(at, &mut self.regions);
        Some(self.placed(EntityKind::Region, outcome))
    }

    fn scene(&self) -> Scene<'_> {
        let handles_for = if self.mode == Mode::Select {
            self.selected_marker().filter(|m| self.is_marker_visible(m))
        } else {
            None
        };
        Scene {
            markers: self.markers.iter().filter(|m| self.is_marker_visible(m)).collect(),
            links: if self.layers.links { self.links.iter().collect() } else { Vec::new() },
            regions: if self.layers.buildings { self.regions.iter().collect() } else { Vec::new() },
            handles_for,
            show_fov: self.layers.fov,
        }
    }

    fn press_select(&mut self, screen: Point, at: Point) {
        let found = hit::hit_test(&self.scene(), at, self.viewport.scale);
        let Some(found) = found else {
            self.deselect_all(false);
            return;
        };
        match found.part {
            HitPart::ResizeHandle => {
                let Some(marker) = self.markers.get(&found.id) else {
                    return;
                };
                let start_distance = marker.position().distance_to(at);
                if start_distance >= 1.0 {
                    self.gesture = Gesture::Resizing {
                        start_scale: marker.pin_scale,
                        start_distance,
                        id: found.id,
                    };
                }
            }
            HitPart::RangeHandle => self.gesture = Gesture::Aiming { id: found.id },
            HitPart::SpreadHandle(_) => self.gesture = Gesture::Spreading { id: found.id },
            HitPart::MarkerBody => {
                let Some(origin) = self.markers.get(&found.id).map(Marker::position) else {
                    return;
                };
                self.select(Selection::Marker(found.id.clone()));
                self.gesture = Gesture::Pressing {
                    id: found.id,
                    start: screen,
                    origin,
                };
            }
            HitPart::LinkEndpoint(..) | HitPart::LinkBody => {
                self.select(Selection::Link(found.id));
            }
            HitPart::RegionBody => {
                self.select(Selection::Region(found.id));
            }
        }
    }

    fn drag_marker(&mut self, id: &str, start: Point, origin: Point, screen: Point) {
        let scale = self.viewport.scale;
        let to = origin.offset((screen.x - start.x) / scale, (screen.y - start.y) / scale);
        if self.markers.move_to(id, to) {
            self.events.push(Event::Updated {
                kind: EntityKind::Marker,
                id: id.to_string(),
            });
            self.refresh();
        }
    }

    fn drag_resize(&mut self, id: &str, start_scale: f64, start_distance: f64, screen: Point) {
        let Some(center) = self.markers.get(id).map(Marker::position) else {
            return;
        };
        let distance = center.distance_to(self.viewport.to_image_space(screen));
        let scale = resize_scale(start_scale, start_distance, distance, PIN_SCALE_LIMITS);
        if self.markers.resize(id, scale) {
            self.events.push(Event::Updated {
                kind: EntityKind::Marker,
                id: id.to_string(),
            });
        }
    }

    /// Screen vector from the marker center to the pointer, and the marker's pin scale.
    fn drag_vector(&self, id: &str, screen: Point) -> Option<(f64, f64, &Marker)> {
        let marker = self.markers.get(id)?;
        let center = self.viewport.to_screen_space(marker.position());
        Some((screen.x - center.x, screen.y - center.y, marker))
    }

    fn drag_range(&mut self, id: &str, screen: Point) {
        let Some((dx, dy, marker)) = self.drag_vector(id, screen) else {
            return;
        };
        let units_per_pixel = 1.0 / (self.viewport.scale * marker.pin_scale);
        let (angle, range) = fov_from_range_drag(dx, dy, units_per_pixel);
        self.update_marker(
            id,
            MarkerUpdate {
                fov_angle: Some(angle),
                fov_range: Some(range),
                ..Default::default()
            },
        );
    }

    fn drag_spread(&mut self, id: &str, screen: Point) {
        let Some((dx, dy, marker)) = self.drag_vector(id, screen) else {
            return;
        };
        let spread = fov_spread_from_drag(marker.fov_angle, dx, dy);
        self.update_marker(
            id,
            MarkerUpdate {
                fov_spread: Some(spread),
                ..Default::default()
            },
        );
    }

    // ---- placement ----

    fn check_bounds(&self, at: Point) -> Result<(), Rejection> {
        match &self.background {
            None => Err(Rejection::NoImage),
            Some(bg) if !bg.bounds.contains(at) => Err(Rejection::OutOfBounds),
            Some(_) => Ok(()),
        }
    }

    /// Record the outcome of a placement tool.
    fn placed(&mut self, kind: EntityKind, outcome: Placement) -> Placement {
        match &outcome {
            Placement::Created(id) => {
                self.events.push(Event::Created {
                    kind,
                    id: id.clone(),
                });
                self.refresh();
            }
            Placement::Rejected(reason) => log::debug!("{:?} placement rejected: {:?}", kind, reason),
            Placement::Pending => {}
        }
        outcome
    }

    fn place_marker(&mut self, kind: MarkerKind, at: Point) -> Placement {
        if let Err(reason) = self.check_bounds(at) {
            return self.placed(EntityKind::Marker, Placement::Rejected(reason));
        }
        let id = self.markers.create(kind, at, &self.pricing).id.clone();
        self.placed(EntityKind::Marker, Placement::Created(id))
    }

    /// Exact coordinate of a visible link endpoint under the pointer.
    fn endpoint_under(&self, at: Point) -> Option<Point> {
        if !self.layers.links {
            return None;
        }
        let scene = Scene {
            markers: Vec::new(),
            links: self.links.iter().collect(),
            regions: Vec::new(),
            handles_for: None,
            show_fov: false,
        };
        match hit::hit_test(&scene, at, self.viewport.scale)?.part {
            HitPart::LinkEndpoint(_, point) => Some(point),
            _ => None,
        }
    }

    fn place_link(&mut self, at: Point) -> Placement {
        let target = self.endpoint_under(at).unwrap_or(at);
        if let Err(reason) = self.check_bounds(target) {
            return self.placed(EntityKind::Link, Placement::Rejected(reason));
        }
        let outcome = self.link_tool.click(target, &mut self.links, self.snap_radius);
        self.placed(EntityKind::Link, outcome)
    }

    fn place_outline_vertex(&mut self, at: Point) -> Placement {
        if let Err(reason) = self.check_bounds(at) {
            return self.placed(EntityKind::Region, Placement::Rejected(reason));
        }
        let outcome = self.outline_tool.click(at, &mut self.regions, self.snap_radius);
        self.placed(EntityKind::Region, outcome)
    }

    fn start_rect(&mut self, at: Point) -> Placement {
        if let Err(reason) = self.check_bounds(at) {
            return self.placed(EntityKind::Region, Placement::Rejected(reason));
        }
        self.rect_tool.press(at);
        Placement::Pending
    }

    /// Discard every in-progress placement. Returns true if anything was pending.
    fn cancel_placement(&mut self) -> bool {
        self.link_tool.cancel() | self.outline_tool.cancel() | self.rect_tool.cancel()
    }

    // ---- keyboard ----

    /// Cancel the pending placement, or clear the selection if nothing was pending.
    pub fn escape(&mut self) {
        if self.cancel_placement() {
            log::debug!("Placement cancelled");
        } else if self.mode == Mode::Select {
            self.deselect_all(false);
        }
    }

    /// Finish the outline being captured.
    pub fn enter(&mut self) -> Option<Placement> {
        if self.mode != Mode::PlaceRegion || !self.outline_tool.is_capturing() {
            return None;
        }
        let outcome = self.outline_tool.finish(&mut self.regions);
        Some(self.placed(EntityKind::Region, outcome))
    }

    pub fn delete_selected(&mut self) -> bool {
        match self.selection.clone() {
            Some(Selection::Marker(id)) => self.delete_marker(&id),
            Some(Selection::Link(id)) => self.delete_link(&id),
            Some(Selection::Region(id)) => self.delete_region(&id),
            None => false,
        }
    }

    // ---- selection ----

    fn exists(&self, selection: &Selection) -> bool {
        match selection {
            Selection::Marker(id) => self.markers.get(id).is_some(),
            Selection::Link(id) => self.links.get(id).is_some(),
            Selection::Region(id) => self.regions.get(id).is_some(),
        }
    }

    /// Select one entity. The previous selection is dropped silently.
    /// Unknown ids are ignored.
    pub fn select(&mut self, selection: Selection) -> bool {
        if !self.exists(&selection) {
            return false;
        }
        if self.selection.as_ref() == Some(&selection) {
            return true;
        }
        self.deselect_all(true);
        self.events.push(Event::Selected(selection.clone()));
        self.selection = Some(selection);
        true
    }

    pub fn select_marker(&mut self, id: &str) -> bool {
        self.select(Selection::Marker(id.to_string()))
    }

    pub fn select_link(&mut self, id: &str) -> bool {
        self.select(Selection::Link(id.to_string()))
    }

    pub fn select_region(&mut self, id: &str) -> bool {
        self.select(Selection::Region(id.to_string()))
    }

    /// Clear the selection, announcing it unless `silent`.
    pub fn deselect_all(&mut self, silent: bool) {
        if let Some(previous) = self.selection.take() {
            if !silent {
                self.events.push(Event::Deselected(previous));
            }
        }
    }

    fn deselect_if(&mut self, kind: EntityKind, id: &str) {
        let selected = self
            .selection
            .as_ref()
            .is_some_and(|s| s.kind() == kind && s.id() == id);
        if selected {
            self.deselect_all(false);
        }
    }

    // ---- entity edits ----

    /// Apply a property edit. Phases must already exist.
    pub fn update_marker(&mut self, id: &str, mut update: MarkerUpdate) -> bool {
        if let Some(Some(phase)) = &update.phase {
            if !self.phases.contains(phase) {
                log::warn!("Ignoring unknown phase {:?}", phase);
                update.phase = None;
            }
        }
        if !self.markers.update(id, update) {
            return false;
        }
        self.events.push(Event::Updated {
            kind: EntityKind::Marker,
            id: id.to_string(),
        });
        self.refresh();
        true
    }

    pub fn rename_link(&mut self, id: &str, name: &str) -> bool {
        let renamed = self.links.rename(id, name);
        if renamed {
            self.events.push(Event::Updated {
                kind: EntityKind::Link,
                id: id.to_string(),
            });
        }
        renamed
    }

    pub fn rename_region(&mut self, id: &str, name: &str) -> bool {
        let renamed = self.regions.rename(id, name);
        if renamed {
            self.events.push(Event::Updated {
                kind: EntityKind::Region,
                id: id.to_string(),
            });
        }
        renamed
    }

    /// Delete a marker. Markers linked to a deleted drop are unlinked.
    pub fn delete_marker(&mut self, id: &str) -> bool {
        self.deselect_if(EntityKind::Marker, id);
        let Some((_, unlinked)) = self.markers.delete(id) else {
            return false;
        };
        self.events.push(Event::Removed {
            kind: EntityKind::Marker,
            id: id.to_string(),
        });
        for other in unlinked {
            self.events.push(Event::Updated {
                kind: EntityKind::Marker,
                id: other,
            });
        }
        self.refresh();
        true
    }

    pub fn delete_link(&mut self, id: &str) -> bool {
        self.deselect_if(EntityKind::Link, id);
        if self.links.delete(id).is_none() {
            return false;
        }
        self.events.push(Event::Removed {
            kind: EntityKind::Link,
            id: id.to_string(),
        });
        self.refresh();
        true
    }

    /// Delete a region. Markers inside it are untouched.
    pub fn delete_region(&mut self, id: &str) -> bool {
        self.deselect_if(EntityKind::Region, id);
        if self.regions.delete(id).is_none() {
            return false;
        }
        self.events.push(Event::Removed {
            kind: EntityKind::Region,
            id: id.to_string(),
        });
        self.refresh();
        true
    }

    pub fn set_pricing(&mut self, pricing: PricingConfig) {
        self.pricing = pricing;
        self.refresh();
    }

    // ---- phases and filters ----

    /// Add a phase. Names are trimmed; empty and duplicate names are refused.
    pub fn add_phase(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.phases.iter().any(|p| p == name) {
            return false;
        }
        self.phases.push(name.to_string());
        self.events.push(Event::PhasesChanged);
        log::info!("Added phase {}", name);
        true
    }

    /// Remove a phase and unassign it from every marker.
    pub fn remove_phase(&mut self, name: &str) -> bool {
        let Some(index) = self.phases.iter().position(|p| p == name) else {
            return false;
        };
        self.phases.remove(index);
        self.phase_filters.forget(name);
        for id in self.markers.clear_phase(name) {
            self.events.push(Event::Updated {
                kind: EntityKind::Marker,
                id,
            });
        }
        self.events.push(Event::PhasesChanged);
        log::info!("Removed phase {}", name);
        true
    }

    pub fn set_layers(&mut self, layers: LayerFilters) {
        self.layers = layers;
    }

    pub fn set_phase_visible(&mut self, phase: &str, visible: bool) {
        self.phase_filters.set_phase_shown(phase, visible);
    }

    pub fn set_unassigned_visible(&mut self, visible: bool) {
        self.phase_filters.set_unassigned_shown(visible);
    }

    // ---- project lifecycle ----

    /// Install a new background image, fit it and return to select mode.
    pub fn set_background(&mut self, background: Background) {
        log::info!(
            "Background set ({}x{})",
            background.bounds.width,
            background.bounds.height
        );
        self.background = Some(background);
        self.fit_to_view();
        self.set_mode(Mode::Select);
        self.events.push(Event::BackgroundChanged);
    }

    /// Start over with an empty plan.
    pub fn new_project(&mut self) {
        self.background = None;
        self.viewport = Viewport::default();
        self.markers = MarkerStore::new();
        self.links = LinkStore::new();
        self.regions = RegionStore::new();
        self.pricing = self.default_pricing;
        self.phases.clear();
        self.reset_interaction();
        self.refresh();
        log::info!("New project");
    }

    fn reset_interaction(&mut self) {
        self.layers = LayerFilters::default();
        self.phase_filters = PhaseFilters::default();
        self.selection = None;
        self.cancel_placement();
        self.gesture = Gesture::Idle;
        self.mode = Mode::Select;
        self.events.clear();
        self.events.push(Event::Reset);
    }

    pub fn export(&self) -> ProjectDocument {
        ProjectDocument {
            version: DOCUMENT_VERSION,
            background_image: self.background.as_ref().map(|bg| bg.data_url.clone()),
            markers: self.markers.to_state(),
            links: self.links.to_state(),
            regions: self.regions.to_state(),
            budget: self.pricing,
            viewport: self.viewport,
            phases: self.phases.clone(),
        }
    }

    /// Replace the whole plan with an imported document.
    ///
    /// The document is already parsed and its image decoded, so this cannot fail.
    pub fn import(&mut self, document: ProjectDocument, background: Option<Background>) {
        if document.version > DOCUMENT_VERSION {
            log::warn!("Document version {} is newer than {}", document.version, DOCUMENT_VERSION);
        }
        if document.background_image.is_some() && background.is_none() {
            log::warn!("Imported document image was not decoded; background cleared");
        }
        let mut markers = MarkerStore::from_state(document.markers, &document.budget);
        markers.drop_dangling_links();

        let mut phases: Vec<String> = Vec::new();
        for phase in document.phases {
            let phase = phase.trim().to_string();
            if !phase.is_empty() && !phases.contains(&phase) {
                phases.push(phase);
            }
        }

        self.markers = markers;
        self.links = LinkStore::from_state(document.links);
        self.regions = RegionStore::from_state(document.regions);
        self.pricing = document.budget;
        self.viewport = Viewport::from_state(document.viewport);
        self.background = background;
        self.phases = phases;
        self.reset_interaction();
        self.refresh();
        log::info!(
            "Imported {} markers, {} links, {} regions",
            self.markers.len(),
            self.links.len(),
            self.regions.len()
        );
    }

    // ---- derived state ----

    fn refresh(&mut self) {
        self.containment = self
            .markers
            .iter()
            .filter_map(|m| {
                self.regions
                    .region_at(m.position())
                    .map(|r| (m.id.clone(), r.id.clone()))
            })
            .collect();
        self.budget = BudgetSummary::compute(self.markers.iter(), self.links.antenna_count(), &self.pricing);
    }
}

// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Drawing canvas for the floor plan and its annotations.
//!
//! The canvas only paints what the editor holds and reports raw pointer
//! input back as `CanvasAction`s. All coordinates handed to the editor are
//! relative to the canvas origin.

use siteplan::editor::{Editor, PointerButton};
use siteplan::events::Selection;
use siteplan::hit::{RANGE_HANDLE_RADIUS, RESIZE_HANDLE_RADIUS, SPREAD_HANDLE_RADIUS};
use siteplan::models::marker::{Marker, MarkerKind};
use siteplan::util::geometry::Point;
use siteplan::viewport::Mode;

/// Pointer input collected during one frame, in order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CanvasAction {
    /// Canvas size this frame.
    Resized(f64, f64),
    PointerDown(Point, PointerButton),
    PointerMove(Point),
    PointerUp(Point, PointerButton),
    Wheel(Point, f64),
}

const SELECTED: egui::Color32 = egui::Color32::from_rgb(255, 200, 0);
const LINK_COLOR: egui::Color32 = egui::Color32::from_rgb(120, 90, 220);
const REGION_COLOR: egui::Color32 = egui::Color32::from_rgb(60, 170, 90);
const PREVIEW_COLOR: egui::Color32 = egui::Color32::LIGHT_BLUE;

pub fn kind_color(kind: MarkerKind) -> egui::Color32 {
    match kind {
        MarkerKind::Drop => egui::Color32::from_rgb(40, 120, 220),
        MarkerKind::Camera => egui::Color32::from_rgb(220, 60, 60),
        MarkerKind::ExistingCamera => egui::Color32::from_rgb(150, 150, 150),
        MarkerKind::Switch => egui::Color32::from_rgb(30, 160, 140),
        MarkerKind::Nvr => egui::Color32::from_rgb(230, 130, 30),
    }
}

fn kind_glyph(kind: MarkerKind) -> &'static str {
    match kind {
        MarkerKind::Drop => "D",
        MarkerKind::Camera => "C",
        MarkerKind::ExistingCamera => "E",
        MarkerKind::Switch => "S",
        MarkerKind::Nvr => "N",
    }
}

/// Image space to absolute screen position.
struct Projection {
    origin: egui::Pos2,
    scale: f64,
    translate: (f64, f64),
}

impl Projection {
    fn pos(&self, p: Point) -> egui::Pos2 {
        self.origin
            + egui::vec2(
                (p.x * self.scale + self.translate.0) as f32,
                (p.y * self.scale + self.translate.1) as f32,
            )
    }

    fn len(&self, image_units: f64) -> f32 {
        (image_units * self.scale) as f32
    }
}

fn to_button(button: egui::PointerButton) -> Option<PointerButton> {
    match button {
        egui::PointerButton::Primary => Some(PointerButton::Primary),
        egui::PointerButton::Middle => Some(PointerButton::Middle),
        egui::PointerButton::Secondary => Some(PointerButton::Secondary),
        _ => None,
    }
}

/// Button presses and releases at the positions egui recorded for them.
/// Presses count only where `accepts_press` says the canvas was hit.
fn button_actions(
    events: &[egui::Event],
    origin: egui::Pos2,
    accepts_press: impl Fn(egui::Pos2) -> bool,
) -> Vec<CanvasAction> {
    let local = |pos: egui::Pos2| Point::new(f64::from(pos.x - origin.x), f64::from(pos.y - origin.y));
    events
        .iter()
        .filter_map(|event| match event {
            egui::Event::PointerButton {
                pos, button, pressed, ..
            } => {
                let button = to_button(*button)?;
                if *pressed {
                    accepts_press(*pos).then(|| CanvasAction::PointerDown(local(*pos), button))
                } else {
                    Some(CanvasAction::PointerUp(local(*pos), button))
                }
            }
            _ => None,
        })
        .collect()
}

/// Display the canvas and collect pointer input.
pub fn show(
    ui: &mut egui::Ui,
    editor: &Editor,
    texture: Option<&egui::TextureHandle>,
) -> Vec<CanvasAction> {
    let mut actions = Vec::new();
    ui.style_mut().visuals.extreme_bg_color = egui::Color32::from_gray(40);

    let available = ui.available_size() - egui::vec2(0.0, 24.0);
    let (response, painter) = ui.allocate_painter(available.max(egui::vec2(1.0, 1.0)), egui::Sense::click_and_drag());
    let rect = response.rect;
    painter.rect_filled(rect, 0.0, egui::Color32::from_gray(40));
    actions.push(CanvasAction::Resized(f64::from(rect.width()), f64::from(rect.height())));

    let local = |pos: egui::Pos2| Point::new(f64::from(pos.x - rect.min.x), f64::from(pos.y - rect.min.y));
    ui.input(|i| {
        let pointer = &i.pointer;
        let hovered = response.hovered();
        actions.extend(button_actions(&i.events, rect.min, |pos| hovered && rect.contains(pos)));
        if pointer.delta() != egui::Vec2::ZERO {
            if let Some(pos) = pointer.latest_pos() {
                actions.push(CanvasAction::PointerMove(local(pos)));
            }
        }
        if response.hovered() && i.raw_scroll_delta.y != 0.0 {
            if let Some(pos) = pointer.hover_pos() {
                // egui scrolls positive upwards
                actions.push(CanvasAction::Wheel(local(pos), -f64::from(i.raw_scroll_delta.y)));
            }
        }
    });

    if editor.mode() == Mode::Pan && response.hovered() {
        ui.ctx().set_cursor_icon(egui::CursorIcon::Grab);
    } else if editor.mode().is_placement() && response.hovered() {
        ui.ctx().set_cursor_icon(egui::CursorIcon::Crosshair);
    }

    let viewport = editor.viewport();
    let proj = Projection {
        origin: rect.min,
        scale: viewport.scale,
        translate: (viewport.translate_x, viewport.translate_y),
    };
    let painter = painter.with_clip_rect(rect);

    match (editor.background(), texture) {
        (Some(background), Some(texture)) => {
            let image_rect = egui::Rect::from_min_max(
                proj.pos(Point::default()),
                proj.pos(Point::new(
                    f64::from(background.bounds.width),
                    f64::from(background.bounds.height),
                )),
            );
            painter.image(
                texture.id(),
                image_rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );
        }
        _ => {
            painter.text(
                rect.center() - egui::vec2(0.0, 20.0),
                egui::Align2::CENTER_CENTER,
                "Siteplan",
                egui::FontId::proportional(32.0),
                egui::Color32::from_gray(200),
            );
            painter.text(
                rect.center() + egui::vec2(0.0, 16.0),
                egui::Align2::CENTER_CENTER,
                "File → Open Floor Plan... to begin",
                egui::FontId::proportional(14.0),
                egui::Color32::from_gray(150),
            );
        }
    }

    draw_regions(&painter, &proj, editor);
    draw_links(&painter, &proj, editor);
    draw_markers(&painter, &proj, editor);
    draw_previews(&painter, &proj, editor);

    // Status line
    ui.horizontal(|ui| {
        ui.label(format!("Mode: {}", editor.mode().label()));
        ui.separator();
        ui.label(format!("Zoom: {:.0}%", viewport.scale * 100.0));
        if let Some(pos) = response.hover_pos() {
            let at = viewport.to_image_space(local(pos));
            ui.separator();
            ui.label(format!("({:.0}, {:.0})", at.x, at.y));
        }
        if editor.background().is_none() {
            ui.separator();
            ui.label("No floor plan loaded");
        }
    });

    actions
}

fn draw_regions(painter: &egui::Painter, proj: &Projection, editor: &Editor) {
    if !editor.layers().buildings {
        return;
    }
    for region in editor.regions().iter() {
        let selected = editor.selection() == Some(&Selection::Region(region.id.clone()));
        let color = if selected { SELECTED } else { REGION_COLOR };
        let points: Vec<egui::Pos2> = region.points.iter().map(|p| proj.pos(*p)).collect();
        painter.add(egui::Shape::closed_line(points, egui::Stroke::new(if selected { 3.0 } else { 2.0 }, color)));

        let count = editor.markers_in_region(&region.id);
        painter.text(
            proj.pos(region.centroid()),
            egui::Align2::CENTER_CENTER,
            format!("{} ({})", region.name, count),
            egui::FontId::proportional(13.0),
            color,
        );
    }
}

fn draw_links(painter: &egui::Painter, proj: &Projection, editor: &Editor) {
    if !editor.layers().links {
        return;
    }
    for link in editor.links().iter() {
        let selected = editor.selection() == Some(&Selection::Link(link.id.clone()));
        let color = if selected { SELECTED } else { LINK_COLOR };
        painter.line_segment(
            [proj.pos(link.start()), proj.pos(link.end())],
            egui::Stroke::new(if selected { 4.0 } else { 3.0 }, color),
        );
    }
    for antenna in editor.antennas() {
        let pos = proj.pos(antenna.position);
        painter.circle_filled(pos, 5.0, LINK_COLOR);
        painter.circle_stroke(pos, 5.0, egui::Stroke::new(1.0, egui::Color32::WHITE));
    }
}

fn draw_markers(painter: &egui::Painter, proj: &Projection, editor: &Editor) {
    let selected_id = match editor.selection() {
        Some(Selection::Marker(id)) => Some(id.as_str()),
        _ => None,
    };
    let visible: Vec<&Marker> = editor.markers().iter().filter(|m| editor.is_marker_visible(m)).collect();

    if editor.layers().fov {
        for marker in &visible {
            if let Some(cone) = marker.fov_cone() {
                let points: Vec<egui::Pos2> = cone.outline(24).into_iter().map(|p| proj.pos(p)).collect();
                let fill = egui::Color32::from_rgba_unmultiplied(255, 80, 80, 50);
                painter.add(egui::Shape::convex_polygon(
                    points,
                    fill,
                    egui::Stroke::new(1.0, egui::Color32::from_rgba_unmultiplied(255, 80, 80, 160)),
                ));
            }
        }
    }

    for marker in &visible {
        let pos = proj.pos(marker.position());
        let radius = proj.len(marker.radius());
        let selected = selected_id == Some(marker.id.as_str());
        painter.circle_filled(pos, radius, kind_color(marker.kind));
        painter.circle_stroke(
            pos,
            radius,
            egui::Stroke::new(if selected { 3.0 } else { 1.5 }, if selected { SELECTED } else { egui::Color32::WHITE }),
        );
        painter.text(
            pos,
            egui::Align2::CENTER_CENTER,
            kind_glyph(marker.kind),
            egui::FontId::proportional(radius.max(6.0)),
            egui::Color32::WHITE,
        );
        painter.text(
            pos + egui::vec2(0.0, radius + 2.0),
            egui::Align2::CENTER_TOP,
            &marker.name,
            egui::FontId::proportional(11.0),
            egui::Color32::WHITE,
        );
        if selected && editor.mode() == Mode::Select {
            draw_handles(painter, proj, marker, editor.layers().fov);
        }
    }
}

fn draw_handles(painter: &egui::Painter, proj: &Projection, marker: &Marker, show_fov: bool) {
    let s = marker.pin_scale;
    let stroke = egui::Stroke::new(1.0, egui::Color32::BLACK);
    let resize = proj.pos(marker.resize_handle());
    painter.circle_filled(resize, proj.len(RESIZE_HANDLE_RADIUS * s), SELECTED);
    painter.circle_stroke(resize, proj.len(RESIZE_HANDLE_RADIUS * s), stroke);

    if !show_fov {
        return;
    }
    if let Some(cone) = marker.fov_cone() {
        let range = proj.pos(cone.range_handle);
        painter.circle_filled(range, proj.len(RANGE_HANDLE_RADIUS * s), egui::Color32::WHITE);
        painter.circle_stroke(range, proj.len(RANGE_HANDLE_RADIUS * s), stroke);
        for handle in [cone.left_spread_handle, cone.right_spread_handle] {
            let pos = proj.pos(handle);
            painter.circle_filled(pos, proj.len(SPREAD_HANDLE_RADIUS * s), egui::Color32::LIGHT_GRAY);
            painter.circle_stroke(pos, proj.len(SPREAD_HANDLE_RADIUS * s), stroke);
        }
    }
}

fn draw_previews(painter: &egui::Painter, proj: &Projection, editor: &Editor) {
    let stroke = egui::Stroke::new(2.0, PREVIEW_COLOR);

    if let Some((start, cursor)) = editor.link_preview() {
        painter.extend(egui::Shape::dashed_line(&[proj.pos(start), proj.pos(cursor)], stroke, 8.0, 4.0));
        painter.circle_filled(proj.pos(start), 5.0, PREVIEW_COLOR);
    }

    let outline = editor.outline_points();
    if !outline.is_empty() {
        let points: Vec<egui::Pos2> = outline.iter().map(|p| proj.pos(*p)).collect();
        painter.add(egui::Shape::line(points.clone(), stroke));
        if let Some((last, cursor)) = editor.outline_preview_edge() {
            painter.extend(egui::Shape::dashed_line(&[proj.pos(last), proj.pos(cursor)], stroke, 8.0, 4.0));
        }
        for point in &points {
            painter.circle_filled(*point, 4.0, egui::Color32::WHITE);
            painter.circle_stroke(*point, 4.0, egui::Stroke::new(1.0, egui::Color32::BLACK));
        }
        // first vertex doubles as the close target
        painter.circle_stroke(points[0], proj.len(editor.snap_radius()), egui::Stroke::new(1.0, PREVIEW_COLOR));
    }

    if let Some((min, max)) = editor.rect_preview() {
        painter.rect_stroke(egui::Rect::from_two_pos(proj.pos(min), proj.pos(max)), 0.0, stroke);
    }
}

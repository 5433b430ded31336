// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Screen/image coordinate transform and interaction modes.
//!
//! The viewport maps screen points (relative to the canvas container) into
//! the fixed pixel space of the background image: `image = (screen - translate) / scale`.
//! Only pan and zoom gestures mutate it.

use crate::models::marker::MarkerKind;
use crate::util::geometry::Point;
use serde::{Deserialize, Serialize};

pub const MIN_SCALE: f64 = 0.1;
pub const MAX_SCALE: f64 = 5.0;
/// Zoom factor applied per wheel tick towards the user.
pub const ZOOM_IN_STEP: f64 = 1.1;
/// Zoom factor applied per wheel tick away from the user.
pub const ZOOM_OUT_STEP: f64 = 0.9;

/// Active interaction mode. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Select,
    Pan,
    PlaceMarker(MarkerKind),
    PlaceLink,
    PlaceRegion,
    PlaceRegionRect,
}

impl Mode {
    /// Whether the mode creates entities on click.
    pub fn is_placement(&self) -> bool {
        !matches!(self, Mode::Select | Mode::Pan)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Mode::Select => "Select",
            Mode::Pan => "Pan",
            Mode::PlaceMarker(kind) => kind.label(),
            Mode::PlaceLink => "Connection",
            Mode::PlaceRegion => "Building",
            Mode::PlaceRegionRect => "Building (rectangle)",
        }
    }
}

/// Natural pixel size of the background image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageBounds {
    pub width: u32,
    pub height: u32,
}

impl ImageBounds {
    /// Inclusive bounds check in image space.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= 0.0
            && point.y >= 0.0
            && point.x <= f64::from(self.width)
            && point.y <= f64::from(self.height)
    }
}

/// Pan/zoom state. Serialized as the document's `map` block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Viewport {
    pub scale: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scale: 1.0,
            translate_x: 0.0,
            translate_y: 0.0,
        }
    }
}

impl Viewport {
    /// Build a viewport from stored values, clamping the scale.
    pub fn from_state(state: Viewport) -> Self {
        let scale = if state.scale.is_finite() {
            state.scale.clamp(MIN_SCALE, MAX_SCALE)
        } else {
            1.0
        };
        Self { scale, ..state }
    }

    pub fn to_image_space(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.translate_x) / self.scale,
            (screen.y - self.translate_y) / self.scale,
        )
    }

    pub fn to_screen_space(&self, image: Point) -> Point {
        Point::new(
            image.x * self.scale + self.translate_x,
            image.y * self.scale + self.translate_y,
        )
    }

    /// Zoom by `factor` keeping the image point under `screen` fixed.
    pub fn zoom_at(&mut self, screen: Point, factor: f64) {
        let new_scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        let ratio = new_scale / self.scale;
        self.translate_x = screen.x - (screen.x - self.translate_x) * ratio;
        self.translate_y = screen.y - (screen.y - self.translate_y) * ratio;
        self.scale = new_scale;
    }

    /// One wheel tick. Positive `delta_y` (scrolling down) zooms out.
    pub fn zoom_wheel(&mut self, screen: Point, delta_y: f64) {
        let factor = if delta_y > 0.0 { ZOOM_OUT_STEP } else { ZOOM_IN_STEP };
        self.zoom_at(screen, factor);
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.translate_x += dx;
        self.translate_y += dy;
    }

    /// Fit and center an image inside the container, never enlarging past 90% of natural size.
    pub fn fit(&mut self, container: (f64, f64), image: ImageBounds) {
        let (cw, ch) = container;
        let (iw, ih) = (f64::from(image.width.max(1)), f64::from(image.height.max(1)));
        let scale = (cw / iw).min(ch / ih).min(1.0) * 0.9;
        self.scale = if scale.is_finite() && scale > 0.0 {
            scale.clamp(MIN_SCALE, MAX_SCALE)
        } else {
            1.0
        };
        self.translate_x = (cw - iw * self.scale) / 2.0;
        self.translate_y = (ch - ih * self.scale) / 2.0;
    }
}

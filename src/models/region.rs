// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Building outlines.
//!
//! A region is a simple polygon with at least three vertices, closed
//! implicitly. Two tools create them: `OutlineTool` captures clicks until the
//! user clicks back near the first vertex, and `RectTool` turns a drag into an
//! axis-aligned rectangle.

use super::{new_id, retain_unique_ids, Placement, Rejection};
use crate::util::geometry::{point_in_polygon, polygon_centroid, Point};
use serde::{Deserialize, Serialize};

/// Drags smaller than this in both axes are treated as accidental clicks.
pub const MIN_RECT_EXTENT: f64 = 5.0;

/// A closed polygon annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub id: String,
    pub name: String,
    pub points: Vec<Point>,
}

impl Region {
    pub fn contains(&self, point: Point) -> bool {
        point_in_polygon(point, &self.points)
    }

    /// Label anchor.
    pub fn centroid(&self) -> Point {
        polygon_centroid(&self.points)
    }
}

/// Owns all regions.
#[derive(Debug, Clone, Default)]
pub struct RegionStore {
    regions: Vec<Region>,
    counter: u32,
}

impl RegionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter()
    }

    pub fn as_slice(&self) -> &[Region] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn counter(&self) -> u32 {
        self.counter
    }

    /// First region whose polygon contains `point`.
    pub fn region_at(&self, point: Point) -> Option<&Region> {
        self.regions.iter().find(|r| r.contains(point))
    }

    fn add(&mut self, points: Vec<Point>) -> &Region {
        self.counter += 1;
        let region = Region {
            id: new_id("building"),
            name: format!("Building-{}", self.counter),
            points,
        };
        log::info!("Created {} with {} vertices", region.name, region.points.len());
        self.regions.push(region);
        &self.regions[self.regions.len() - 1]
    }

    pub fn rename(&mut self, id: &str, name: &str) -> bool {
        match self.regions.iter_mut().find(|r| r.id == id) {
            Some(region) => {
                region.name = name.to_string();
                true
            }
            None => false,
        }
    }

    pub fn delete(&mut self, id: &str) -> Option<Region> {
        let index = self.regions.iter().position(|r| r.id == id)?;
        let removed = self.regions.remove(index);
        log::info!("Deleted {}, {} regions remain", removed.name, self.regions.len());
        Some(removed)
    }

    pub fn to_state(&self) -> RegionState {
        RegionState {
            buildings: self.regions.clone(),
            building_counter: Some(self.counter),
        }
    }

    /// Rebuild a store from its serialized form. Outlines with fewer than
    /// three vertices and repeated ids are dropped.
    pub fn from_state(state: RegionState) -> Self {
        let mut regions = state.buildings;
        regions.retain(|r| {
            let keep = r.points.len() >= 3;
            if !keep {
                log::warn!("Dropping building {} with {} vertices", r.id, r.points.len());
            }
            keep
        });
        retain_unique_ids(&mut regions, |r| r.id.as_str(), "building");
        let counter = match state.building_counter {
            Some(n) if n > 0 => n,
            _ => regions.len() as u32,
        };
        Self { regions, counter }
    }
}

/// Serialized region collection (`buildings` block of the document).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionState {
    #[serde(default)]
    pub buildings: Vec<Region>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building_counter: Option<u32>,
}

/// Click-by-click outline capture.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutlineTool {
    points: Vec<Point>,
    cursor: Option<Point>,
}

impl OutlineTool {
    /// Append a vertex, or close the outline when clicking near the first one.
    pub fn click(&mut self, at: Point, regions: &mut RegionStore, snap_radius: f64) -> Placement {
        if self.points.len() >= 3 && self.points[0].distance_to(at) < snap_radius {
            return self.finish(regions);
        }
        self.points.push(at);
        log::debug!("Outline vertex {} at ({:.1}, {:.1})", self.points.len(), at.x, at.y);
        Placement::Pending
    }

    /// Complete with the captured vertices. Fewer than three are discarded.
    pub fn finish(&mut self, regions: &mut RegionStore) -> Placement {
        let points = std::mem::take(&mut self.points);
        self.cursor = None;
        if points.len() < 3 {
            log::debug!("Outline with {} vertices discarded", points.len());
            return Placement::Rejected(Rejection::TooFewPoints);
        }
        Placement::Created(regions.add(points).id.clone())
    }

    pub fn hover(&mut self, at: Point) {
        if !self.points.is_empty() {
            self.cursor = Some(at);
        }
    }

    /// Discard captured vertices. Returns true if something was discarded.
    pub fn cancel(&mut self) -> bool {
        let had_points = self.is_capturing();
        self.points.clear();
        self.cursor = None;
        had_points
    }

    pub fn is_capturing(&self) -> bool {
        !self.points.is_empty()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Live edge from the last vertex to the pointer.
    pub fn preview_edge(&self) -> Option<(Point, Point)> {
        Some((*self.points.last()?, self.cursor?))
    }
}

/// Drag-to-rectangle outline capture.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RectTool {
    #[default]
    Idle,
    Dragging { origin: Point, cursor: Point },
}

impl RectTool {
    pub fn press(&mut self, at: Point) {
        *self = RectTool::Dragging { origin: at, cursor: at };
    }

    pub fn drag(&mut self, at: Point) {
        if let RectTool::Dragging { cursor, .. } = self {
            *cursor = at;
        }
    }

    /// Finish the drag and create the rectangle unless it is too small.
    pub fn release(&mut self, at: Point, regions: &mut RegionStore) -> Placement {
        let RectTool::Dragging { origin, .. } = std::mem::take(self) else {
            return Placement::Rejected(Rejection::NotPlacing);
        };
        if (at.x - origin.x).abs() < MIN_RECT_EXTENT && (at.y - origin.y).abs() < MIN_RECT_EXTENT {
            log::debug!("Rectangle drag too small, discarded");
            return Placement::Rejected(Rejection::TooSmall);
        }
        let (min, max) = rect_corners(origin, at);
        let points = vec![
            Point::new(min.x, min.y),
            Point::new(max.x, min.y),
            Point::new(max.x, max.y),
            Point::new(min.x, max.y),
        ];
        Placement::Created(regions.add(points).id.clone())
    }

    pub fn cancel(&mut self) -> bool {
        let was_dragging = self.is_dragging();
        *self = RectTool::Idle;
        was_dragging
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, RectTool::Dragging { .. })
    }

    /// Current `(min, max)` corners while dragging.
    pub fn preview(&self) -> Option<(Point, Point)> {
        match self {
            RectTool::Idle => None,
            RectTool::Dragging { origin, cursor } => Some(rect_corners(*origin, *cursor)),
        }
    }
}

fn rect_corners(a: Point, b: Point) -> (Point, Point) {
    (
        Point::new(a.x.min(b.x), a.y.min(b.y)),
        Point::new(a.x.max(b.x), a.y.max(b.y)),
    )
}

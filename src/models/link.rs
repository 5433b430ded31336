// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Point-to-point links and the antennas derived from their endpoints.
//!
//! Link endpoints are plain coordinates. Endpoints that coincide exactly are
//! the same antenna, which is what makes snapping important: the two-click
//! `LinkTool` coerces clicks near an existing endpoint onto it.

use super::{new_id, retain_unique_ids, Placement, Rejection};
use crate::util::geometry::{nearest_within, Point};
use serde::{Deserialize, Serialize};

/// An undirected segment between two image-space points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub id: String,
    pub name: String,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Link {
    pub fn start(&self) -> Point {
        Point::new(self.x1, self.y1)
    }

    pub fn end(&self) -> Point {
        Point::new(self.x2, self.y2)
    }

    pub fn length(&self) -> f64 {
        self.start().distance_to(self.end())
    }
}

/// A distinct link endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Antenna {
    pub position: Point,
    pub name: String,
}

/// Owns all links.
#[derive(Debug, Clone, Default)]
pub struct LinkStore {
    links: Vec<Link>,
    counter: u32,
}

impl LinkStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&Link> {
        self.links.iter().find(|l| l.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Link> {
        self.links.iter()
    }

    pub fn as_slice(&self) -> &[Link] {
        &self.links
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn counter(&self) -> u32 {
        self.counter
    }

    /// Every endpoint in stored order, duplicates included.
    pub fn endpoints(&self) -> impl Iterator<Item = Point> + '_ {
        self.links.iter().flat_map(|l| [l.start(), l.end()])
    }

    /// Distinct endpoints, named `Antenna-N` in first-seen order.
    pub fn antennas(&self) -> Vec<Antenna> {
        let mut antennas: Vec<Antenna> = Vec::new();
        for point in self.endpoints() {
            if !antennas.iter().any(|a| a.position == point) {
                let name = format!("Antenna-{}", antennas.len() + 1);
                antennas.push(Antenna { position: point, name });
            }
        }
        antennas
    }

    pub fn antenna_count(&self) -> usize {
        self.antennas().len()
    }

    /// Closest existing endpoint strictly within `radius`.
    pub fn snap(&self, at: Point, radius: f64) -> Option<Point> {
        nearest_within(at, self.endpoints(), radius)
    }

    fn add(&mut self, start: Point, end: Point) -> &Link {
        self.counter += 1;
        let link = Link {
            id: new_id("connection"),
            name: format!("Connection-{}", self.counter),
            x1: start.x,
            y1: start.y,
            x2: end.x,
            y2: end.y,
        };
        log::info!(
            "Created {} ({:.1}, {:.1}) -> ({:.1}, {:.1})",
            link.name,
            start.x,
            start.y,
            end.x,
            end.y
        );
        self.links.push(link);
        &self.links[self.links.len() - 1]
    }

    /// Only the name is editable; endpoints are fixed after creation.
    pub fn rename(&mut self, id: &str, name: &str) -> bool {
        match self.links.iter_mut().find(|l| l.id == id) {
            Some(link) => {
                link.name = name.to_string();
                true
            }
            None => false,
        }
    }

    pub fn delete(&mut self, id: &str) -> Option<Link> {
        let index = self.links.iter().position(|l| l.id == id)?;
        let removed = self.links.remove(index);
        log::info!("Deleted {}, {} links remain", removed.name, self.links.len());
        Some(removed)
    }

    pub fn to_state(&self) -> LinkState {
        LinkState {
            connections: self.links.clone(),
            connection_counter: Some(self.counter),
        }
    }

    /// Rebuild a store from its serialized form. Zero-length links and
    /// repeated ids are dropped.
    pub fn from_state(state: LinkState) -> Self {
        let mut links = state.connections;
        links.retain(|l| {
            let keep = l.start() != l.end();
            if !keep {
                log::warn!("Dropping zero-length link {}", l.id);
            }
            keep
        });
        retain_unique_ids(&mut links, |l| l.id.as_str(), "link");
        let counter = match state.connection_counter {
            Some(n) if n > 0 => n,
            _ => links.len() as u32,
        };
        Self { links, counter }
    }
}

/// Serialized link collection (`connections` block of the document).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkState {
    #[serde(default)]
    pub connections: Vec<Link>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_counter: Option<u32>,
}

/// Two-click link placement.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum LinkTool {
    #[default]
    Idle,
    /// First endpoint fixed; `cursor` follows the pointer for the preview.
    Pending { start: Point, cursor: Point },
}

impl LinkTool {
    /// Feed a placement click. The click is snapped onto an existing endpoint first.
    pub fn click(&mut self, at: Point, links: &mut LinkStore, snap_radius: f64) -> Placement {
        let resolved = links.snap(at, snap_radius).unwrap_or(at);
        match *self {
            LinkTool::Idle => {
                log::debug!("Link started at ({:.1}, {:.1})", resolved.x, resolved.y);
                *self = LinkTool::Pending {
                    start: resolved,
                    cursor: resolved,
                };
                Placement::Pending
            }
            LinkTool::Pending { start, .. } => {
                *self = LinkTool::Idle;
                if resolved == start {
                    log::debug!("Zero-length link discarded");
                    return Placement::Rejected(Rejection::ZeroLength);
                }
                Placement::Created(links.add(start, resolved).id.clone())
            }
        }
    }

    /// Track the pointer for the live preview.
    pub fn hover(&mut self, at: Point) {
        if let LinkTool::Pending { cursor, .. } = self {
            *cursor = at;
        }
    }

    /// Drop the pending endpoint. Returns true if something was discarded.
    pub fn cancel(&mut self) -> bool {
        let was_pending = self.is_pending();
        *self = LinkTool::Idle;
        was_pending
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, LinkTool::Pending { .. })
    }

    /// Segment from the pending endpoint to the pointer.
    pub fn preview(&self) -> Option<(Point, Point)> {
        match self {
            LinkTool::Idle => None,
            LinkTool::Pending { start, cursor } => Some((*start, *cursor)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAP: f64 = 15.0;

    fn place(tool: &mut LinkTool, links: &mut LinkStore, a: Point, b: Point) -> Placement {
        tool.click(a, links, SNAP);
        tool.click(b, links, SNAP)
    }

    #[test]
    fn test_two_clicks_create_link() {
        let mut links = LinkStore::new();
        let mut tool = LinkTool::default();
        assert_eq!(tool.click(Point::new(10.0, 10.0), &mut links, SNAP), Placement::Pending);
        assert!(tool.is_pending());
        let Placement::Created(id) = tool.click(Point::new(100.0, 40.0), &mut links, SNAP) else {
            panic!("expected a link");
        };
        assert!(!tool.is_pending());
        let link = links.get(&id).unwrap();
        assert_eq!(link.name, "Connection-1");
        assert_eq!((link.x1, link.y1, link.x2, link.y2), (10.0, 10.0, 100.0, 40.0));
    }

    #[test]
    fn test_endpoint_snaps_to_existing() {
        let mut links = LinkStore::new();
        let mut tool = LinkTool::default();
        place(&mut tool, &mut links, Point::new(100.0, 100.0), Point::new(300.0, 100.0));

        for offset in [0.0, 0.3, 7.5, 14.999] {
            let Placement::Created(id) =
                place(&mut tool, &mut links, Point::new(100.0 + offset, 100.0), Point::new(100.0, 400.0))
            else {
                panic!("expected a link");
            };
            assert_eq!(links.get(&id).unwrap().start(), Point::new(100.0, 100.0));
        }

        let Placement::Created(id) =
            place(&mut tool, &mut links, Point::new(115.0, 100.0), Point::new(200.0, 400.0))
        else {
            panic!("expected a link");
        };
        assert_eq!(links.get(&id).unwrap().start(), Point::new(115.0, 100.0));
    }

    #[test]
    fn test_zero_length_rejected() {
        let mut links = LinkStore::new();
        let mut tool = LinkTool::default();
        place(&mut tool, &mut links, Point::new(0.0, 0.0), Point::new(50.0, 0.0));
        // both clicks snap onto the same endpoint
        let outcome = place(&mut tool, &mut links, Point::new(52.0, 1.0), Point::new(48.0, -2.0));
        assert_eq!(outcome, Placement::Rejected(Rejection::ZeroLength));
        assert_eq!(links.len(), 1);
        assert!(!tool.is_pending());
    }

    #[test]
    fn test_preview_and_cancel() {
        let mut links = LinkStore::new();
        let mut tool = LinkTool::default();
        assert_eq!(tool.preview(), None);
        tool.click(Point::new(1.0, 2.0), &mut links, SNAP);
        tool.hover(Point::new(30.0, 40.0));
        assert_eq!(tool.preview(), Some((Point::new(1.0, 2.0), Point::new(30.0, 40.0))));
        assert!(tool.cancel());
        assert!(!tool.cancel());
        assert!(links.is_empty());
    }

    #[test]
    fn test_antenna_dedup() {
        let mut links = LinkStore::new();
        let mut tool = LinkTool::default();
        let hub = Point::new(500.0, 500.0);
        place(&mut tool, &mut links, hub, Point::new(100.0, 100.0));
        place(&mut tool, &mut links, Point::new(900.0, 100.0), hub);
        place(&mut tool, &mut links, hub, Point::new(500.0, 900.0));

        let antennas = links.antennas();
        assert_eq!(antennas.len(), 4);
        assert_eq!(antennas[0].position, hub);
        assert_eq!(antennas[0].name, "Antenna-1");
        assert_eq!(antennas[3].name, "Antenna-4");
        assert_eq!(links.antenna_count(), 4);
        assert_eq!(links.endpoints().count(), 6);
    }

    #[test]
    fn test_rename_and_delete() {
        let mut links = LinkStore::new();
        let mut tool = LinkTool::default();
        let Placement::Created(id) = place(&mut tool, &mut links, Point::new(0.0, 0.0), Point::new(1.0, 1.0)) else {
            panic!("expected a link");
        };
        assert!(links.rename(&id, "Roof to barn"));
        assert_eq!(links.get(&id).unwrap().name, "Roof to barn");
        assert!(!links.rename("nope", "x"));
        assert!(links.delete(&id).is_some());
        assert!(links.delete(&id).is_none());
        // counter keeps counting after deletes
        place(&mut tool, &mut links, Point::new(0.0, 0.0), Point::new(1.0, 1.0));
        assert_eq!(links.iter().next().unwrap().name, "Connection-2");
    }

    #[test]
    fn test_state_roundtrip() {
        let mut links = LinkStore::new();
        let mut tool = LinkTool::default();
        place(&mut tool, &mut links, Point::new(0.5, 0.25), Point::new(10.0, 1.0));
        place(&mut tool, &mut links, Point::new(10.0, 1.0), Point::new(40.0, 2.0));
        assert_eq!(links.len(), 2);
        let json = serde_json::to_string(&links.to_state()).unwrap();
        let restored = LinkStore::from_state(serde_json::from_str(&json).unwrap());
        assert_eq!(restored.as_slice(), links.as_slice());
        assert_eq!(restored.counter(), 2);
    }

    #[test]
    fn test_load_drops_degenerate_and_duplicate_links() {
        let state: LinkState = serde_json::from_str(
            r#"{"connections": [
                {"id": "c1", "name": "A", "x1": 0, "y1": 0, "x2": 5, "y2": 5},
                {"id": "c2", "name": "B", "x1": 5, "y1": 5, "x2": 5, "y2": 5},
                {"id": "c1", "name": "C", "x1": 9, "y1": 9, "x2": 20, "y2": 20}
            ]}"#,
        )
        .unwrap();
        let links = LinkStore::from_state(state);
        assert_eq!(links.len(), 1);
        assert_eq!(links.get("c1").unwrap().name, "A");
        assert_eq!(links.counter(), 1);
    }

    #[test]
    fn test_missing_counter_uses_count() {
        let state: LinkState = serde_json::from_str(
            r#"{"connections": [{"id": "c1", "name": "A", "x1": 0, "y1": 0, "x2": 5, "y2": 5}]}"#,
        )
        .unwrap();
        assert_eq!(LinkStore::from_state(state).counter(), 1);
    }
}

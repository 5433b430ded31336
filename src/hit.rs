// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Hit testing in image space.
//!
//! Handles of the selected marker are tested first, then marker bodies, link
//! endpoints, link bodies and finally region interiors. Within each layer the
//! most recently created entity (drawn on top) wins.

use crate::events::EntityKind;
use crate::models::link::Link;
use crate::models::marker::Marker;
use crate::models::region::Region;
use crate::util::geometry::{distance_to_segment, Point};

/// Range handle radius at pin scale 1, in image units.
pub const RANGE_HANDLE_RADIUS: f64 = 8.0;
/// Spread handle radius at pin scale 1, in image units.
pub const SPREAD_HANDLE_RADIUS: f64 = 6.0;
/// Resize handle radius at pin scale 1, in image units.
pub const RESIZE_HANDLE_RADIUS: f64 = 6.0;
/// Link endpoint pick radius in screen pixels.
pub const ENDPOINT_RADIUS: f64 = 6.0;
/// Link body pick tolerance in screen pixels.
pub const LINK_TOLERANCE: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpreadSide {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEnd {
    Start,
    End,
}

/// Which part of an entity was hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HitPart {
    MarkerBody,
    ResizeHandle,
    RangeHandle,
    SpreadHandle(SpreadSide),
    /// Carries the exact endpoint coordinate.
    LinkEndpoint(LinkEnd, Point),
    LinkBody,
    RegionBody,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub kind: EntityKind,
    pub id: String,
    pub part: HitPart,
}

impl Hit {
    fn new(kind: EntityKind, id: &str, part: HitPart) -> Self {
        Self {
            kind,
            id: id.to_string(),
            part,
        }
    }
}

/// Everything a hit test looks at. Hidden entities are filtered out by the caller.
pub struct Scene<'a> {
    pub markers: Vec<&'a Marker>,
    pub links: Vec<&'a Link>,
    pub regions: Vec<&'a Region>,
    /// Marker whose handles are live.
    pub handles_for: Option<&'a Marker>,
    /// Whether the FOV handles of `handles_for` are shown.
    pub show_fov: bool,
}

/// Find the topmost thing under `at`. `scale` is the viewport zoom, used to
/// keep pixel tolerances constant on screen.
pub fn hit_test(scene: &Scene<'_>, at: Point, scale: f64) -> Option<Hit> {
    if let Some(marker) = scene.handles_for {
        if let Some(part) = handle_at(marker, at, scene.show_fov) {
            return Some(Hit::new(EntityKind::Marker, &marker.id, part));
        }
    }

    if let Some(marker) = scene
        .markers
        .iter()
        .rev()
        .find(|m| m.position().distance_to(at) <= m.radius())
    {
        return Some(Hit::new(EntityKind::Marker, &marker.id, HitPart::MarkerBody));
    }

    let endpoint_radius = ENDPOINT_RADIUS / scale;
    for link in scene.links.iter().rev() {
        for (end, point) in [(LinkEnd::Start, link.start()), (LinkEnd::End, link.end())] {
            if point.distance_to(at) <= endpoint_radius {
                return Some(Hit::new(EntityKind::Link, &link.id, HitPart::LinkEndpoint(end, point)));
            }
        }
    }

    let tolerance = LINK_TOLERANCE / scale;
    if let Some(link) = scene
        .links
        .iter()
        .rev()
        .find(|l| distance_to_segment(at, l.start(), l.end()) <= tolerance)
    {
        return Some(Hit::new(EntityKind::Link, &link.id, HitPart::LinkBody));
    }

    scene
        .regions
        .iter()
        .rev()
        .find(|r| r.contains(at))
        .map(|r| Hit::new(EntityKind::Region, &r.id, HitPart::RegionBody))
}

/// Hit one of a marker's drag handles.
pub fn handle_at(marker: &Marker, at: Point, show_fov: bool) -> Option<HitPart> {
    let s = marker.pin_scale;
    if show_fov {
        if let Some(cone) = marker.fov_cone() {
            if cone.range_handle.distance_to(at) <= RANGE_HANDLE_RADIUS * s {
                return Some(HitPart::RangeHandle);
            }
            if cone.left_spread_handle.distance_to(at) <= SPREAD_HANDLE_RADIUS * s {
                return Some(HitPart::SpreadHandle(SpreadSide::Left));
            }
            if cone.right_spread_handle.distance_to(at) <= SPREAD_HANDLE_RADIUS * s {
                return Some(HitPart::SpreadHandle(SpreadSide::Right));
            }
        }
    }
    if marker.resize_handle().distance_to(at) <= RESIZE_HANDLE_RADIUS * s {
        return Some(HitPart::ResizeHandle);
    }
    None
}

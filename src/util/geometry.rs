// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! Stateless helpers shared by the entity stores and the editor: distances,
//! nearest-point snapping, polygon containment, and the field-of-view cone
//! math used for camera markers. All coordinates are image-space pixels.

use serde::{Deserialize, Serialize};

/// A 2D point in image (or screen) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn offset(&self, dx: f64, dy: f64) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }
}

/// Lens offset from the marker center along the view direction, in pin units.
pub const FOV_LENS_OFFSET: f64 = 7.0;
/// Spread handles sit at this fraction of the range along each boundary ray.
pub const FOV_SPREAD_HANDLE_RATIO: f64 = 0.7;
/// Valid `fov_range` interval.
pub const FOV_RANGE_LIMITS: (f64, f64) = (20.0, 500.0);
/// Valid `fov_spread` interval.
pub const FOV_SPREAD_LIMITS: (f64, f64) = (10.0, 180.0);

/// Round to the nearest 0.01.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Find the closest candidate strictly closer than `radius`.
///
/// Ties keep the first candidate found.
pub fn nearest_within<I>(query: Point, candidates: I, radius: f64) -> Option<Point>
where
    I: IntoIterator<Item = Point>,
{
    let mut nearest = None;
    let mut best = radius;
    for candidate in candidates {
        let dist = candidate.distance_to(query);
        if dist < best {
            best = dist;
            nearest = Some(candidate);
        }
    }
    nearest
}

/// Even-odd ray casting test. Points on the right/top boundary are outside.
pub fn point_in_polygon(point: Point, polygon: &[Point]) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (pi, pj) = (polygon[i], polygon[j]);
        if (pi.y > point.y) != (pj.y > point.y)
            && point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Vertex average of a polygon, used to anchor labels.
pub fn polygon_centroid(points: &[Point]) -> Point {
    if points.is_empty() {
        return Point::default();
    }
    let n = points.len() as f64;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Point::new(sx / n, sy / n)
}

/// Shortest distance from `point` to the segment `a`-`b`.
pub fn distance_to_segment(point: Point, a: Point, b: Point) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return point.distance_to(a);
    }
    let t = (((point.x - a.x) * dx + (point.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    point.distance_to(Point::new(a.x + t * dx, a.y + t * dy))
}

/// Convert a stored FOV angle (0 = up, clockwise) to a screen-space direction in radians.
pub fn fov_direction(fov_angle: f64) -> f64 {
    (fov_angle - 90.0).to_radians()
}

/// Field-of-view sector geometry relative to the marker center, in pin units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FovCone {
    /// Apex of the sector.
    pub lens: Point,
    /// End of the `angle - spread/2` boundary ray.
    pub left_edge: Point,
    /// End of the `angle + spread/2` boundary ray.
    pub right_edge: Point,
    /// Drag handle on the center ray at full range.
    pub range_handle: Point,
    pub left_spread_handle: Point,
    pub right_spread_handle: Point,
    /// Screen-space direction of the center ray in radians.
    pub direction: f64,
    pub half_spread: f64,
    pub range: f64,
}

impl FovCone {
    pub fn new(fov_angle: f64, fov_spread: f64, fov_range: f64) -> Self {
        let direction = fov_direction(fov_angle);
        let half_spread = (fov_spread / 2.0).to_radians();
        let lens = Point::new(
            FOV_LENS_OFFSET * direction.cos(),
            FOV_LENS_OFFSET * direction.sin(),
        );
        let ray = |angle: f64, length: f64| lens.offset(angle.cos() * length, angle.sin() * length);
        let (left, right) = (direction - half_spread, direction + half_spread);
        let handle_range = fov_range * FOV_SPREAD_HANDLE_RATIO;

        Self {
            lens,
            left_edge: ray(left, fov_range),
            right_edge: ray(right, fov_range),
            range_handle: ray(direction, fov_range),
            left_spread_handle: ray(left, handle_range),
            right_spread_handle: ray(right, handle_range),
            direction,
            half_spread,
            range: fov_range,
        }
    }

    /// Move the cone into image space around `center`, scaled by the marker size.
    pub fn placed(&self, center: Point, pin_scale: f64) -> FovCone {
        let place = |p: Point| Point::new(center.x + p.x * pin_scale, center.y + p.y * pin_scale);
        FovCone {
            lens: place(self.lens),
            left_edge: place(self.left_edge),
            right_edge: place(self.right_edge),
            range_handle: place(self.range_handle),
            left_spread_handle: place(self.left_spread_handle),
            right_spread_handle: place(self.right_spread_handle),
            direction: self.direction,
            half_spread: self.half_spread,
            range: self.range * pin_scale,
        }
    }

    /// Outline of the sector: lens, then `segments + 1` points along the arc.
    pub fn outline(&self, segments: usize) -> Vec<Point> {
        let segments = segments.max(1);
        let start = self.direction - self.half_spread;
        let step = 2.0 * self.half_spread / segments as f64;
        let mut points = Vec::with_capacity(segments + 2);
        points.push(self.lens);
        for i in 0..=segments {
            let angle = start + step * i as f64;
            points.push(self.lens.offset(angle.cos() * self.range, angle.sin() * self.range));
        }
        points
    }
}

/// New `(fov_angle, fov_range)` from a range-handle drag.
///
/// `dx`/`dy` is the screen vector from the marker center to the pointer;
/// `units_per_pixel` converts it back to pin units (1 / (zoom * pin scale)).
pub fn fov_from_range_drag(dx: f64, dy: f64, units_per_pixel: f64) -> (f64, f64) {
    let distance = dx.hypot(dy) * units_per_pixel;
    let angle = (dy.atan2(dx).to_degrees() + 90.0).rem_euclid(360.0);
    let angle = angle.round() % 360.0;
    let range = distance.clamp(FOV_RANGE_LIMITS.0, FOV_RANGE_LIMITS.1).round();
    (angle, range)
}

/// New `fov_spread` from a spread-handle drag: twice the deviation from the view direction.
pub fn fov_spread_from_drag(fov_angle: f64, dx: f64, dy: f64) -> f64 {
    let pointer = dy.atan2(dx).to_degrees();
    let mut deviation = (pointer - (fov_angle - 90.0)).rem_euclid(360.0);
    if deviation > 180.0 {
        deviation = 360.0 - deviation;
    }
    (deviation * 2.0)
        .clamp(FOV_SPREAD_LIMITS.0, FOV_SPREAD_LIMITS.1)
        .round()
}

/// New pin scale from a resize drag, rounded to 0.01 and clamped to `limits`.
pub fn resize_scale(start_scale: f64, start_distance: f64, distance: f64, limits: (f64, f64)) -> f64 {
    round2(start_scale * distance / start_distance).clamp(limits.0, limits.1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn square() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ]
    }

    #[test]
    fn test_point_in_square() {
        let poly = square();
        assert!(point_in_polygon(Point::new(5.0, 5.0), &poly));
        assert!(!point_in_polygon(Point::new(10.0, 10.0), &poly));
        assert!(!point_in_polygon(Point::new(15.0, 15.0), &poly));
    }

    #[test]
    fn test_point_in_concave_polygon() {
        // L-shape, notch in the upper right
        let poly = vec![
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(4.0, 2.0),
            Point::new(2.0, 2.0),
            Point::new(2.0, 4.0),
            Point::new(0.0, 4.0),
        ];
        assert!(point_in_polygon(Point::new(1.0, 3.0), &poly));
        assert!(point_in_polygon(Point::new(3.0, 1.0), &poly));
        assert!(!point_in_polygon(Point::new(3.0, 3.0), &poly));
    }

    #[test]
    fn test_degenerate_polygon_contains_nothing() {
        let line = vec![Point::new(0.0, 0.0), Point::new(10.0, 10.0)];
        assert!(!point_in_polygon(Point::new(5.0, 5.0), &line));
    }

    #[test]
    fn test_nearest_within_radius() {
        let candidates = vec![Point::new(100.0, 100.0), Point::new(200.0, 200.0)];
        assert_eq!(
            nearest_within(Point::new(110.0, 105.0), candidates.clone(), 15.0),
            Some(Point::new(100.0, 100.0))
        );
        // exactly on the radius does not snap
        assert_eq!(nearest_within(Point::new(115.0, 100.0), candidates.clone(), 15.0), None);
        assert_eq!(nearest_within(Point::new(150.0, 150.0), candidates, 15.0), None);
    }

    #[test]
    fn test_nearest_prefers_closest_then_first() {
        let candidates = vec![Point::new(0.0, 0.0), Point::new(4.0, 0.0), Point::new(-4.0, 0.0)];
        assert_eq!(nearest_within(Point::new(3.0, 0.0), candidates.clone(), 15.0), Some(Point::new(4.0, 0.0)));
        // equidistant: first found wins
        let tied = vec![Point::new(2.0, 0.0), Point::new(-2.0, 0.0)];
        assert_eq!(nearest_within(Point::new(0.0, 0.0), tied, 15.0), Some(Point::new(2.0, 0.0)));
    }

    #[test]
    fn test_centroid() {
        let c = polygon_centroid(&square());
        assert!(close(c.x, 5.0) && close(c.y, 5.0));
        assert_eq!(polygon_centroid(&[]), Point::default());
    }

    #[test]
    fn test_distance_to_segment() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert!(close(distance_to_segment(Point::new(5.0, 3.0), a, b), 3.0));
        assert!(close(distance_to_segment(Point::new(-3.0, 4.0), a, b), 5.0));
        assert!(close(distance_to_segment(Point::new(3.0, 4.0), a, a), 5.0));
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(210.0), 210.0);
        assert_eq!(round2(2310.0), 2310.0);
        assert!(close(round2(12.3456), 12.35));
    }

    #[test]
    fn test_fov_cone_points_up_at_zero() {
        let cone = FovCone::new(0.0, 60.0, 100.0);
        assert!(close(cone.lens.x, 0.0) && close(cone.lens.y, -7.0));
        assert!(close(cone.range_handle.x, 0.0) && close(cone.range_handle.y, -107.0));
        // boundary rays are symmetric about the vertical
        assert!(close(cone.left_edge.x, -cone.right_edge.x));
        assert!(close(cone.left_edge.y, cone.right_edge.y));
        let left_len = cone.left_edge.distance_to(cone.lens);
        assert!(close(left_len, 100.0));
        let handle_len = cone.left_spread_handle.distance_to(cone.lens);
        assert!(close(handle_len, 70.0));
    }

    #[test]
    fn test_fov_cone_points_right_at_ninety() {
        let cone = FovCone::new(90.0, 40.0, 50.0);
        assert!(close(cone.range_handle.x, 57.0) && close(cone.range_handle.y, 0.0));
    }

    #[test]
    fn test_fov_cone_placement_scales() {
        let cone = FovCone::new(180.0, 60.0, 100.0).placed(Point::new(50.0, 50.0), 2.0);
        assert!(close(cone.lens.x, 50.0) && close(cone.lens.y, 64.0));
        assert!(close(cone.range_handle.y, 50.0 + 2.0 * 107.0));
        assert!(close(cone.range, 200.0));
    }

    #[test]
    fn test_fov_outline_spans_arc() {
        let cone = FovCone::new(0.0, 90.0, 10.0);
        let outline = cone.outline(8);
        assert_eq!(outline.len(), 10);
        assert_eq!(outline[0], cone.lens);
        assert!(close(outline[1].x, cone.left_edge.x) && close(outline[1].y, cone.left_edge.y));
        assert!(close(outline[9].x, cone.right_edge.x) && close(outline[9].y, cone.right_edge.y));
    }

    #[test]
    fn test_range_drag_sets_angle_and_range() {
        // pointer straight right of center, 150px away at zoom 1
        let (angle, range) = fov_from_range_drag(150.0, 0.0, 1.0);
        assert_eq!(angle, 90.0);
        assert_eq!(range, 150.0);
        // straight up
        let (angle, _) = fov_from_range_drag(0.0, -80.0, 1.0);
        assert_eq!(angle, 0.0);
        // straight left
        let (angle, _) = fov_from_range_drag(-80.0, 0.0, 1.0);
        assert_eq!(angle, 270.0);
    }

    #[test]
    fn test_range_drag_clamps_and_scales() {
        let (_, range) = fov_from_range_drag(0.0, 10.0, 1.0);
        assert_eq!(range, 20.0);
        let (_, range) = fov_from_range_drag(0.0, 2000.0, 1.0);
        assert_eq!(range, 500.0);
        // zoomed in 2x: 300 screen px is 150 image units
        let (_, range) = fov_from_range_drag(300.0, 0.0, 0.5);
        assert_eq!(range, 150.0);
    }

    #[test]
    fn test_range_drag_angle_never_reaches_360() {
        // just left of straight up: 359.7 would round to 360
        let dx = -(0.3_f64.to_radians().sin());
        let dy = -(0.3_f64.to_radians().cos());
        let (angle, _) = fov_from_range_drag(dx * 100.0, dy * 100.0, 1.0);
        assert_eq!(angle, 0.0);
    }

    #[test]
    fn test_spread_drag() {
        // facing up; pointer 30 degrees to the right of up
        let rad = 30_f64.to_radians();
        let spread = fov_spread_from_drag(0.0, rad.sin() * 100.0, -rad.cos() * 100.0);
        assert_eq!(spread, 60.0);
        // pointer behind the camera clamps at 180
        assert_eq!(fov_spread_from_drag(0.0, 0.0, 100.0), 180.0);
        // pointer on the axis clamps at 10
        assert_eq!(fov_spread_from_drag(0.0, 0.0, -100.0), 10.0);
    }

    #[test]
    fn test_spread_drag_wraps_across_zero() {
        // facing 350 degrees, pointer at 20 degrees: 30 degree deviation
        let rad = 20_f64.to_radians();
        let spread = fov_spread_from_drag(350.0, rad.sin() * 100.0, -rad.cos() * 100.0);
        assert_eq!(spread, 60.0);
    }

    #[test]
    fn test_resize_scale() {
        assert_eq!(resize_scale(1.0, 20.0, 40.0, (0.3, 5.0)), 2.0);
        assert_eq!(resize_scale(1.0, 20.0, 1.0, (0.3, 5.0)), 0.3);
        assert_eq!(resize_scale(2.0, 10.0, 100.0, (0.3, 5.0)), 5.0);
        assert_eq!(resize_scale(1.0, 30.0, 37.0, (0.3, 5.0)), 1.23);
    }
}

// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Point markers: network drops, cameras, switches and NVRs.
//!
//! This module defines the `Marker` entity, the `MarkerStore` collection that
//! owns name counters and the sticky pin size, and the `MarkerState` wire
//! format including the import path for legacy camera records.

use super::{new_id, retain_unique_ids};
use crate::config::PricingConfig;
use crate::util::geometry::{FovCone, Point, FOV_RANGE_LIMITS, FOV_SPREAD_LIMITS};
use serde::{Deserialize, Deserializer, Serialize};

/// Valid `pin_scale` interval.
pub const PIN_SCALE_LIMITS: (f64, f64) = (0.3, 5.0);
/// Radius of the pin body at scale 1, in image units.
pub const PIN_RADIUS: f64 = 14.0;

pub const DEFAULT_FOV_ANGLE: f64 = 0.0;
pub const DEFAULT_FOV_SPREAD: f64 = 60.0;
pub const DEFAULT_FOV_RANGE: f64 = 100.0;

/// Type of marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MarkerKind {
    Drop,
    Camera,
    ExistingCamera,
    Switch,
    Nvr,
}

impl MarkerKind {
    pub const ALL: [MarkerKind; 5] = [
        MarkerKind::Drop,
        MarkerKind::Camera,
        MarkerKind::ExistingCamera,
        MarkerKind::Switch,
        MarkerKind::Nvr,
    ];

    /// Cameras carry a field-of-view cone.
    pub fn is_camera(self) -> bool {
        matches!(self, MarkerKind::Camera | MarkerKind::ExistingCamera)
    }

    /// Counted in the equipment subtotal.
    pub fn is_equipment(self) -> bool {
        matches!(self, MarkerKind::Camera | MarkerKind::Switch | MarkerKind::Nvr)
    }

    pub fn label(self) -> &'static str {
        match self {
            MarkerKind::Drop => "Network Drop",
            MarkerKind::Camera => "New Camera",
            MarkerKind::ExistingCamera => "Existing Camera",
            MarkerKind::Switch => "Network Switch",
            MarkerKind::Nvr => "NVR",
        }
    }

    fn name_prefix(self) -> &'static str {
        match self {
            MarkerKind::Drop => "Drop",
            MarkerKind::Camera => "Camera",
            MarkerKind::ExistingCamera => "ExCam",
            MarkerKind::Switch => "Switch",
            MarkerKind::Nvr => "NVR",
        }
    }

    fn id_prefix(self) -> &'static str {
        match self {
            MarkerKind::Drop => "drop",
            MarkerKind::Camera => "camera",
            MarkerKind::ExistingCamera => "existing-camera",
            MarkerKind::Switch => "switch",
            MarkerKind::Nvr => "nvr",
        }
    }

    /// Price given to a freshly placed marker.
    pub fn default_price(self, pricing: &PricingConfig) -> f64 {
        match self {
            MarkerKind::Camera => pricing.default_camera_price,
            MarkerKind::Switch => pricing.default_switch_price,
            MarkerKind::Nvr => pricing.default_nvr_price,
            MarkerKind::Drop | MarkerKind::ExistingCamera => 0.0,
        }
    }
}

/// A typed point annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub id: String,
    pub kind: MarkerKind,
    pub x: f64,
    pub y: f64,
    pub name: String,
    pub price: f64,
    /// Weak reference to a drop marker id.
    pub linked_drop: Option<String>,
    pub pin_scale: f64,
    pub phase: Option<String>,
    pub fov_angle: f64,
    pub fov_spread: f64,
    pub fov_range: f64,
}

impl Marker {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Radius of the pin body in image units.
    pub fn radius(&self) -> f64 {
        PIN_RADIUS * self.pin_scale
    }

    /// Resize handle at the lower right corner of the pin bounds.
    pub fn resize_handle(&self) -> Point {
        let r = self.radius();
        Point::new(self.x + r, self.y + r)
    }

    /// Field-of-view cone in image space, for camera markers only.
    pub fn fov_cone(&self) -> Option<FovCone> {
        if !self.kind.is_camera() {
            return None;
        }
        Some(FovCone::new(self.fov_angle, self.fov_spread, self.fov_range).placed(self.position(), self.pin_scale))
    }
}

/// Sparse marker update. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkerUpdate {
    pub name: Option<String>,
    pub price: Option<f64>,
    /// `Some(None)` unlinks.
    pub linked_drop: Option<Option<String>>,
    pub pin_scale: Option<f64>,
    /// `Some(None)` unassigns.
    pub phase: Option<Option<String>>,
    pub fov_angle: Option<f64>,
    pub fov_spread: Option<f64>,
    pub fov_range: Option<f64>,
}

impl MarkerUpdate {
    pub fn is_empty(&self) -> bool {
        *self == MarkerUpdate::default()
    }
}

fn normalize_angle(angle: f64) -> f64 {
    let angle = angle.rem_euclid(360.0);
    if angle >= 360.0 {
        0.0
    } else {
        angle
    }
}

/// Per-kind naming counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarkerCounters {
    pub drop: u32,
    pub camera: u32,
    pub existing_camera: u32,
    pub switch: u32,
    pub nvr: u32,
}

impl MarkerCounters {
    fn slot(&mut self, kind: MarkerKind) -> &mut u32 {
        match kind {
            MarkerKind::Drop => &mut self.drop,
            MarkerKind::Camera => &mut self.camera,
            MarkerKind::ExistingCamera => &mut self.existing_camera,
            MarkerKind::Switch => &mut self.switch,
            MarkerKind::Nvr => &mut self.nvr,
        }
    }

    /// Bump and return the counter for `kind`.
    fn next(&mut self, kind: MarkerKind) -> u32 {
        let slot = self.slot(kind);
        *slot += 1;
        *slot
    }
}

/// Owns all markers.
#[derive(Debug, Clone)]
pub struct MarkerStore {
    markers: Vec<Marker>,
    counters: MarkerCounters,
    default_pin_scale: f64,
}

impl Default for MarkerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkerStore {
    pub fn new() -> Self {
        Self {
            markers: Vec::new(),
            counters: MarkerCounters::default(),
            default_pin_scale: 1.0,
        }
    }

    /// Place a new marker with default name, price, size and FOV.
    pub fn create(&mut self, kind: MarkerKind, at: Point, pricing: &PricingConfig) -> &Marker {
        let n = self.counters.next(kind);
        let marker = Marker {
            id: new_id(kind.id_prefix()),
            kind,
            x: at.x,
            y: at.y,
            name: format!("{}-{}", kind.name_prefix(), n),
            price: kind.default_price(pricing),
            linked_drop: None,
            pin_scale: self.default_pin_scale,
            phase: None,
            fov_angle: DEFAULT_FOV_ANGLE,
            fov_spread: DEFAULT_FOV_SPREAD,
            fov_range: DEFAULT_FOV_RANGE,
        };
        log::info!("Created {} at ({:.1}, {:.1})", marker.name, at.x, at.y);
        self.markers.push(marker);
        &self.markers[self.markers.len() - 1]
    }

    pub fn get(&self, id: &str) -> Option<&Marker> {
        self.markers.iter().find(|m| m.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Marker> {
        self.markers.iter_mut().find(|m| m.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.markers.iter()
    }

    pub fn as_slice(&self) -> &[Marker] {
        &self.markers
    }

    pub fn of_kind(&self, kind: MarkerKind) -> impl Iterator<Item = &Marker> {
        self.markers.iter().filter(move |m| m.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn counters(&self) -> MarkerCounters {
        self.counters
    }

    /// Size given to the next placed marker.
    pub fn default_pin_scale(&self) -> f64 {
        self.default_pin_scale
    }

    /// Apply a sparse update. Returns false when the id is unknown.
    ///
    /// A `linked_drop` that does not name an existing drop is ignored.
    pub fn update(&mut self, id: &str, update: MarkerUpdate) -> bool {
        let linked_drop = match update.linked_drop {
            Some(Some(drop_id)) => {
                if self.of_kind(MarkerKind::Drop).any(|d| d.id == drop_id) {
                    Some(Some(drop_id))
                } else {
                    log::warn!("Ignoring link to unknown drop {}", drop_id);
                    None
                }
            }
            other => other,
        };

        let Some(marker) = self.get_mut(id) else {
            return false;
        };
        if let Some(name) = update.name {
            marker.name = name;
        }
        if let Some(price) = update.price {
            marker.price = price.max(0.0);
        }
        if let Some(linked_drop) = linked_drop {
            marker.linked_drop = linked_drop;
        }
        if let Some(scale) = update.pin_scale {
            marker.pin_scale = scale.clamp(PIN_SCALE_LIMITS.0, PIN_SCALE_LIMITS.1);
        }
        if let Some(phase) = update.phase {
            marker.phase = phase.filter(|p| !p.is_empty());
        }
        if let Some(angle) = update.fov_angle {
            marker.fov_angle = normalize_angle(angle);
        }
        if let Some(spread) = update.fov_spread {
            marker.fov_spread = spread.clamp(FOV_SPREAD_LIMITS.0, FOV_SPREAD_LIMITS.1);
        }
        if let Some(range) = update.fov_range {
            marker.fov_range = range.clamp(FOV_RANGE_LIMITS.0, FOV_RANGE_LIMITS.1);
        }
        true
    }

    pub fn move_to(&mut self, id: &str, at: Point) -> bool {
        match self.get_mut(id) {
            Some(marker) => {
                marker.x = at.x;
                marker.y = at.y;
                true
            }
            None => false,
        }
    }

    /// Set the size of one marker from a resize drag; it becomes the default for new markers.
    pub fn resize(&mut self, id: &str, scale: f64) -> bool {
        let scale = scale.clamp(PIN_SCALE_LIMITS.0, PIN_SCALE_LIMITS.1);
        match self.get_mut(id) {
            Some(marker) => {
                marker.pin_scale = scale;
                self.default_pin_scale = scale;
                true
            }
            None => false,
        }
    }

    /// Remove a marker. Deleting a drop unlinks every marker that referenced it.
    ///
    /// Returns the removed marker and the ids of markers that were unlinked.
    pub fn delete(&mut self, id: &str) -> Option<(Marker, Vec<String>)> {
        let index = self.markers.iter().position(|m| m.id == id)?;
        let removed = self.markers.remove(index);
        let mut unlinked = Vec::new();
        if removed.kind == MarkerKind::Drop {
            for marker in &mut self.markers {
                if marker.linked_drop.as_deref() == Some(removed.id.as_str()) {
                    marker.linked_drop = None;
                    unlinked.push(marker.id.clone());
                }
            }
        }
        log::info!("Deleted {}, {} markers remain", removed.name, self.markers.len());
        Some((removed, unlinked))
    }

    /// Clear `linked_drop` wherever it does not name an existing drop.
    pub fn drop_dangling_links(&mut self) -> Vec<String> {
        let drops: Vec<String> = self.of_kind(MarkerKind::Drop).map(|d| d.id.clone()).collect();
        let mut cleared = Vec::new();
        for marker in &mut self.markers {
            if let Some(target) = &marker.linked_drop {
                if !drops.contains(target) {
                    log::warn!("{} referenced missing drop {}, unlinked", marker.name, target);
                    marker.linked_drop = None;
                    cleared.push(marker.id.clone());
                }
            }
        }
        cleared
    }

    /// Unassign `phase` from every marker. Returns the ids touched.
    pub fn clear_phase(&mut self, phase: &str) -> Vec<String> {
        self.markers
            .iter_mut()
            .filter(|m| m.phase.as_deref() == Some(phase))
            .map(|m| {
                m.phase = None;
                m.id.clone()
            })
            .collect()
    }

    pub fn to_state(&self) -> MarkerState {
        MarkerState {
            pins: self.markers.iter().map(MarkerRecord::from).collect(),
            drop_counter: Some(self.counters.drop),
            camera_counter: Some(self.counters.camera),
            switch_counter: Some(self.counters.switch),
            existing_camera_counter: Some(self.counters.existing_camera),
            nvr_counter: Some(self.counters.nvr),
            default_pin_scale: Some(self.default_pin_scale),
        }
    }

    /// Rebuild a store from its serialized form.
    ///
    /// Missing or zero counters fall back to the number of markers of that kind.
    /// Only the first marker with a given id is kept.
    pub fn from_state(state: MarkerState, pricing: &PricingConfig) -> Self {
        let mut markers: Vec<Marker> = state
            .pins
            .into_iter()
            .map(|record| record.into_marker(pricing))
            .collect();
        retain_unique_ids(&mut markers, |m| m.id.as_str(), "marker");
        let count = |kind: MarkerKind| markers.iter().filter(|m| m.kind == kind).count() as u32;
        let counter = |stored: Option<u32>, kind: MarkerKind| match stored {
            Some(n) if n > 0 => n,
            _ => count(kind),
        };
        let counters = MarkerCounters {
            drop: counter(state.drop_counter, MarkerKind::Drop),
            camera: counter(state.camera_counter, MarkerKind::Camera),
            existing_camera: counter(state.existing_camera_counter, MarkerKind::ExistingCamera),
            switch: counter(state.switch_counter, MarkerKind::Switch),
            nvr: counter(state.nvr_counter, MarkerKind::Nvr),
        };
        let default_pin_scale = state
            .default_pin_scale
            .filter(|s| s.is_finite())
            .map_or(1.0, |s| s.clamp(PIN_SCALE_LIMITS.0, PIN_SCALE_LIMITS.1));
        Self {
            markers,
            counters,
            default_pin_scale,
        }
    }
}

/// Serialized marker collection (`pins` block of the document).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerState {
    #[serde(default)]
    pub pins: Vec<MarkerRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drop_counter: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera_counter: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub switch_counter: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub existing_camera_counter: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nvr_counter: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_pin_scale: Option<f64>,
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

/// One marker on the wire. Older files may carry `cameraType`/`customPrice`
/// instead of `price`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: MarkerKind,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub linked_drop: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pin_scale: Option<f64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub phase: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fov_angle: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fov_spread: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fov_range: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_price: Option<f64>,
}

/// Camera price implied by a legacy `cameraType`.
pub fn legacy_camera_price(camera_type: Option<&str>, custom_price: Option<f64>, pricing: &PricingConfig) -> f64 {
    match camera_type {
        Some("custom") => custom_price.unwrap_or(0.0),
        Some("basic-indoor") => 150.0,
        Some("basic-outdoor") => 200.0,
        Some("ptz-indoor") => 400.0,
        Some("ptz-outdoor") => 500.0,
        _ => pricing.default_camera_price,
    }
}

impl MarkerRecord {
    /// Convert to a marker, deriving a missing price and clamping ranges.
    pub fn into_marker(self, pricing: &PricingConfig) -> Marker {
        let price = match self.price {
            Some(price) => price,
            None if self.kind == MarkerKind::Camera => {
                legacy_camera_price(self.camera_type.as_deref(), self.custom_price, pricing)
            }
            None => self.kind.default_price(pricing),
        };
        // zero spread/range means unset in older files
        let nonzero = |v: Option<f64>| v.filter(|v| *v != 0.0 && v.is_finite());
        Marker {
            id: self.id,
            kind: self.kind,
            x: self.x,
            y: self.y,
            name: self.name,
            price: price.max(0.0),
            linked_drop: self.linked_drop,
            pin_scale: nonzero(self.pin_scale)
                .unwrap_or(1.0)
                .clamp(PIN_SCALE_LIMITS.0, PIN_SCALE_LIMITS.1),
            phase: self.phase,
            fov_angle: normalize_angle(self.fov_angle.filter(|a| a.is_finite()).unwrap_or(DEFAULT_FOV_ANGLE)),
            fov_spread: nonzero(self.fov_spread)
                .unwrap_or(DEFAULT_FOV_SPREAD)
                .clamp(FOV_SPREAD_LIMITS.0, FOV_SPREAD_LIMITS.1),
            fov_range: nonzero(self.fov_range)
                .unwrap_or(DEFAULT_FOV_RANGE)
                .clamp(FOV_RANGE_LIMITS.0, FOV_RANGE_LIMITS.1),
        }
    }
}

impl From<&Marker> for MarkerRecord {
    fn from(marker: &Marker) -> Self {
        Self {
            id: marker.id.clone(),
            kind: marker.kind,
            x: marker.x,
            y: marker.y,
            name: marker.name.clone(),
            price: Some(marker.price),
            linked_drop: marker.linked_drop.clone(),
            pin_scale: Some(marker.pin_scale),
            phase: marker.phase.clone(),
            fov_angle: Some(marker.fov_angle),
            fov_spread: Some(marker.fov_spread),
            fov_range: Some(marker.fov_range),
            camera_type: None,
            custom_price: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pricing() -> PricingConfig {
        PricingConfig::default()
    }

    fn store_with(kinds: &[MarkerKind]) -> (MarkerStore, Vec<String>) {
        let mut store = MarkerStore::new();
        let ids = kinds
            .iter()
            .enumerate()
            .map(|(i, kind)| store.create(*kind, Point::new(i as f64 * 10.0, 5.0), &pricing()).id.clone())
            .collect();
        (store, ids)
    }

    #[test]
    fn test_create_names_and_defaults() {
        let (store, ids) = store_with(&[
            MarkerKind::Camera,
            MarkerKind::Camera,
            MarkerKind::Drop,
            MarkerKind::ExistingCamera,
            MarkerKind::Switch,
            MarkerKind::Nvr,
        ]);
        let names: Vec<&str> = store.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Camera-1", "Camera-2", "Drop-1", "ExCam-1", "Switch-1", "NVR-1"]);

        let camera = store.get(&ids[0]).unwrap();
        assert!(camera.id.starts_with("camera-"));
        assert_eq!(camera.price, 1500.0);
        assert_eq!(camera.pin_scale, 1.0);
        assert_eq!((camera.fov_angle, camera.fov_spread, camera.fov_range), (0.0, 60.0, 100.0));
        assert_eq!(store.get(&ids[2]).unwrap().price, 0.0);
        assert_eq!(store.get(&ids[3]).unwrap().price, 0.0);
        assert_eq!(store.get(&ids[4]).unwrap().price, 1600.0);
        assert_eq!(store.get(&ids[5]).unwrap().price, 3000.0);
    }

    #[test]
    fn test_ids_are_unique() {
        let (_, ids) = store_with(&[MarkerKind::Drop; 20]);
        let mut sorted = ids.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), ids.len());
    }

    #[test]
    fn test_update_clamps_fields() {
        let (mut store, ids) = store_with(&[MarkerKind::Camera]);
        let applied = store.update(
            &ids[0],
            MarkerUpdate {
                name: Some("Lobby".into()),
                price: Some(-5.0),
                pin_scale: Some(9.0),
                fov_angle: Some(-90.0),
                fov_spread: Some(2.0),
                fov_range: Some(9999.0),
                ..Default::default()
            },
        );
        assert!(applied);
        let m = store.get(&ids[0]).unwrap();
        assert_eq!(m.name, "Lobby");
        assert_eq!(m.price, 0.0);
        assert_eq!(m.pin_scale, 5.0);
        assert_eq!(m.fov_angle, 270.0);
        assert_eq!(m.fov_spread, 10.0);
        assert_eq!(m.fov_range, 500.0);
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let (mut store, _) = store_with(&[MarkerKind::Camera]);
        assert!(!store.update("missing", MarkerUpdate { name: Some("x".into()), ..Default::default() }));
        assert!(!store.move_to("missing", Point::default()));
        assert!(store.delete("missing").is_none());
    }

    #[test]
    fn test_link_only_to_existing_drop() {
        let (mut store, ids) = store_with(&[MarkerKind::Drop, MarkerKind::Camera, MarkerKind::Switch]);
        store.update(&ids[1], MarkerUpdate { linked_drop: Some(Some(ids[2].clone())), ..Default::default() });
        assert_eq!(store.get(&ids[1]).unwrap().linked_drop, None);
        store.update(&ids[1], MarkerUpdate { linked_drop: Some(Some(ids[0].clone())), ..Default::default() });
        assert_eq!(store.get(&ids[1]).unwrap().linked_drop.as_deref(), Some(ids[0].as_str()));
        store.update(&ids[1], MarkerUpdate { linked_drop: Some(None), ..Default::default() });
        assert_eq!(store.get(&ids[1]).unwrap().linked_drop, None);
    }

    #[test]
    fn test_deleting_drop_unlinks_references() {
        let (mut store, ids) = store_with(&[MarkerKind::Drop, MarkerKind::Camera, MarkerKind::Camera, MarkerKind::Drop]);
        for camera in &ids[1..3] {
            store.update(camera, MarkerUpdate { linked_drop: Some(Some(ids[0].clone())), ..Default::default() });
        }
        let (removed, unlinked) = store.delete(&ids[0]).unwrap();
        assert_eq!(removed.id, ids[0]);
        assert_eq!(unlinked, vec![ids[1].clone(), ids[2].clone()]);
        assert!(store.iter().all(|m| m.linked_drop.is_none()));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_resize_is_sticky() {
        let (mut store, ids) = store_with(&[MarkerKind::Switch]);
        assert!(store.resize(&ids[0], 2.5));
        assert_eq!(store.default_pin_scale(), 2.5);
        let next = store.create(MarkerKind::Nvr, Point::default(), &pricing());
        assert_eq!(next.pin_scale, 2.5);
        store.resize(&ids[0], 0.01);
        assert_eq!(store.get(&ids[0]).unwrap().pin_scale, 0.3);
    }

    #[test]
    fn test_clear_phase() {
        let (mut store, ids) = store_with(&[MarkerKind::Camera, MarkerKind::Drop]);
        store.update(&ids[0], MarkerUpdate { phase: Some(Some("Phase 1".into())), ..Default::default() });
        store.update(&ids[1], MarkerUpdate { phase: Some(Some("Phase 2".into())), ..Default::default() });
        assert_eq!(store.clear_phase("Phase 1"), vec![ids[0].clone()]);
        assert_eq!(store.get(&ids[0]).unwrap().phase, None);
        assert_eq!(store.get(&ids[1]).unwrap().phase.as_deref(), Some("Phase 2"));
    }

    #[test]
    fn test_drop_dangling_links() {
        let json = r#"{"pins": [
            {"id": "drop-1", "type": "drop", "x": 0, "y": 0},
            {"id": "camera-1", "type": "camera", "x": 1, "y": 1, "linkedDrop": "drop-1"},
            {"id": "camera-2", "type": "camera", "x": 2, "y": 2, "linkedDrop": "drop-9"}
        ]}"#;
        let mut store = MarkerStore::from_state(serde_json::from_str(json).unwrap(), &pricing());
        assert_eq!(store.drop_dangling_links(), vec!["camera-2".to_string()]);
        assert_eq!(store.get("camera-1").unwrap().linked_drop.as_deref(), Some("drop-1"));
        assert_eq!(store.get("camera-2").unwrap().linked_drop, None);
    }

    #[test]
    fn test_load_keeps_first_of_duplicate_ids() {
        let json = r#"{"pins": [
            {"id": "dup", "type": "drop", "x": 0, "y": 0},
            {"id": "dup", "type": "camera", "x": 1, "y": 1}
        ]}"#;
        let mut store = MarkerStore::from_state(serde_json::from_str(json).unwrap(), &pricing());
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("dup").unwrap().kind, MarkerKind::Drop);
        assert_eq!(store.counters().camera, 0);
        assert!(store.delete("dup").is_some());
        assert!(store.is_empty());
    }

    #[test]
    fn test_fov_cone_only_for_cameras() {
        let (store, ids) = store_with(&[MarkerKind::Camera, MarkerKind::ExistingCamera, MarkerKind::Drop]);
        assert!(store.get(&ids[0]).unwrap().fov_cone().is_some());
        assert!(store.get(&ids[1]).unwrap().fov_cone().is_some());
        assert!(store.get(&ids[2]).unwrap().fov_cone().is_none());
    }

    #[test]
    fn test_state_roundtrip() {
        let (mut store, ids) = store_with(&[MarkerKind::Camera, MarkerKind::Drop, MarkerKind::Nvr]);
        store.update(&ids[0], MarkerUpdate { linked_drop: Some(Some(ids[1].clone())), fov_angle: Some(45.0), ..Default::default() });
        store.resize(&ids[2], 1.7);
        store.delete(&ids[2]);

        let json = serde_json::to_string(&store.to_state()).unwrap();
        let restored = MarkerStore::from_state(serde_json::from_str(&json).unwrap(), &pricing());
        assert_eq!(restored.as_slice(), store.as_slice());
        assert_eq!(restored.counters(), store.counters());
        assert_eq!(restored.default_pin_scale(), 1.7);
    }

    #[test]
    fn test_legacy_camera_prices() {
        let json = r#"{"pins": [
            {"id": "camera-1", "type": "camera", "x": 1, "y": 2, "name": "A", "cameraType": "ptz-outdoor", "linkedDrop": ""},
            {"id": "camera-2", "type": "camera", "x": 1, "y": 2, "name": "B", "cameraType": "custom", "customPrice": 725},
            {"id": "camera-3", "type": "camera", "x": 1, "y": 2, "name": "C", "cameraType": "mystery"},
            {"id": "camera-4", "type": "camera", "x": 1, "y": 2, "name": "D", "cameraType": "ptz-outdoor", "price": 99},
            {"id": "switch-1", "type": "switch", "x": 1, "y": 2, "name": "E"}
        ]}"#;
        let state: MarkerState = serde_json::from_str(json).unwrap();
        let pricing = PricingConfig { default_camera_price: 1234.0, ..PricingConfig::default() };
        let store = MarkerStore::from_state(state, &pricing);
        let prices: Vec<f64> = store.iter().map(|m| m.price).collect();
        assert_eq!(prices, [500.0, 725.0, 1234.0, 99.0, 1600.0]);
        assert_eq!(store.get("camera-1").unwrap().linked_drop, None);
        // counters fall back to per-kind counts
        assert_eq!(store.counters().camera, 4);
        assert_eq!(store.counters().switch, 1);
        assert_eq!(store.counters().drop, 0);
    }

    #[test]
    fn test_legacy_fov_defaults() {
        let json = r#"{"id": "c", "type": "existing-camera", "x": 0, "y": 0, "fovSpread": 0, "fovAngle": 400}"#;
        let marker = serde_json::from_str::<MarkerRecord>(json).unwrap().into_marker(&pricing());
        assert_eq!(marker.fov_spread, 60.0);
        assert_eq!(marker.fov_range, 100.0);
        assert_eq!(marker.fov_angle, 40.0);
        assert_eq!(marker.pin_scale, 1.0);
        assert_eq!(marker.name, "");
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let json = r#"{"id": "x", "type": "router", "x": 0, "y": 0}"#;
        assert!(serde_json::from_str::<MarkerRecord>(json).is_err());
    }
}

// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Project document.
//!
//! This is the complete saved state of a plan: the embedded background image,
//! the three entity collections with their counters, pricing, the viewport
//! framing and the phase list. Every block is optional on import so older or
//! hand-edited files still load.

use super::link::LinkState;
use super::marker::MarkerState;
use super::region::RegionState;
use crate::config::PricingConfig;
use crate::viewport::Viewport;
use serde::{Deserialize, Serialize};

/// Current document format version.
pub const DOCUMENT_VERSION: u32 = 1;

/// Complete project data for serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectDocument {
    #[serde(default = "default_version")]
    pub version: u32,
    /// Background image as a `data:` URL.
    #[serde(default, rename = "image", alias = "backgroundImageData")]
    pub background_image: Option<String>,
    #[serde(default, rename = "pins")]
    pub markers: MarkerState,
    #[serde(default, rename = "connections")]
    pub links: LinkState,
    #[serde(default, rename = "buildings")]
    pub regions: RegionState,
    #[serde(default)]
    pub budget: PricingConfig,
    #[serde(default, rename = "map")]
    pub viewport: Viewport,
    #[serde(default)]
    pub phases: Vec<String>,
}

fn default_version() -> u32 {
    DOCUMENT_VERSION
}

impl Default for ProjectDocument {
    fn default() -> Self {
        Self {
            version: DOCUMENT_VERSION,
            background_image: None,
            markers: MarkerState::default(),
            links: LinkState::default(),
            regions: RegionState::default(),
            budget: PricingConfig::default(),
            viewport: Viewport::default(),
            phases: Vec::new(),
        }
    }
}

impl ProjectDocument {
    pub fn entity_count(&self) -> usize {
        self.markers.pins.len() + self.links.connections.len() + self.regions.buildings.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_loads_defaults() {
        let doc: ProjectDocument = serde_json::from_str("{}").unwrap();
        assert_eq!(doc, ProjectDocument::default());
    }

    #[test]
    fn test_wire_names() {
        let doc = ProjectDocument {
            background_image: Some("data:image/png;base64,AAAA".into()),
            phases: vec!["Phase 1".into()],
            ..Default::default()
        };
        let value = serde_json::to_value(&doc).unwrap();
        for key in ["version", "image", "pins", "connections", "buildings", "budget", "map", "phases"] {
            assert!(value.get(key).is_some(), "missing {}", key);
        }
        assert_eq!(value["map"]["translateX"], 0.0);
        assert_eq!(value["budget"]["connectionCost"], 400.0);
    }

    #[test]
    fn test_legacy_image_key() {
        let doc: ProjectDocument =
            serde_json::from_str(r#"{"backgroundImageData": "data:image/png;base64,AA"}"#).unwrap();
        assert_eq!(doc.background_image.as_deref(), Some("data:image/png;base64,AA"));
    }

    #[test]
    fn test_explicit_zero_prices_survive() {
        let doc: ProjectDocument =
            serde_json::from_str(r#"{"budget": {"connectionCost": 0, "taxRate": 8.5}}"#).unwrap();
        assert_eq!(doc.budget.connection_cost, 0.0);
        assert_eq!(doc.budget.tax_rate, 8.5);
        assert_eq!(doc.budget.default_camera_price, 1500.0);
    }

    #[test]
    fn test_null_image() {
        let doc: ProjectDocument = serde_json::from_str(r#"{"image": null, "phases": ["A", "B"]}"#).unwrap();
        assert_eq!(doc.background_image, None);
        assert_eq!(doc.phases, ["A", "B"]);
        assert_eq!(doc.entity_count(), 0);
    }
}

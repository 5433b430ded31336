// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Layer and phase visibility filters.

use crate::models::marker::{Marker, MarkerKind};
use std::collections::BTreeSet;

/// Per-layer visibility toggles. Everything is shown by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerFilters {
    pub drops: bool,
    pub cameras: bool,
    pub existing_cameras: bool,
    pub switches: bool,
    pub nvrs: bool,
    pub links: bool,
    pub fov: bool,
    pub buildings: bool,
}

impl Default for LayerFilters {
    fn default() -> Self {
        Self {
            drops: true,
            cameras: true,
            existing_cameras: true,
            switches: true,
            nvrs: true,
            links: true,
            fov: true,
            buildings: true,
        }
    }
}

impl LayerFilters {
    pub fn shows_kind(&self, kind: MarkerKind) -> bool {
        match kind {
            MarkerKind::Drop => self.drops,
            MarkerKind::Camera => self.cameras,
            MarkerKind::ExistingCamera => self.existing_cameras,
            MarkerKind::Switch => self.switches,
            MarkerKind::Nvr => self.nvrs,
        }
    }

    pub fn kind_mut(&mut self, kind: MarkerKind) -> &mut bool {
        match kind {
            MarkerKind::Drop => &mut self.drops,
            MarkerKind::Camera => &mut self.cameras,
            MarkerKind::ExistingCamera => &mut self.existing_cameras,
            MarkerKind::Switch => &mut self.switches,
            MarkerKind::Nvr => &mut self.nvrs,
        }
    }
}

/// Phases hidden by the user. Phases not listed are visible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhaseFilters {
    hidden: BTreeSet<String>,
    hide_unassigned: bool,
}

impl PhaseFilters {
    pub fn is_phase_shown(&self, phase: &str) -> bool {
        !self.hidden.contains(phase)
    }

    pub fn set_phase_shown(&mut self, phase: &str, shown: bool) {
        if shown {
            self.hidden.remove(phase);
        } else {
            self.hidden.insert(phase.to_string());
        }
    }

    pub fn is_unassigned_shown(&self) -> bool {
        !self.hide_unassigned
    }

    pub fn set_unassigned_shown(&mut self, shown: bool) {
        self.hide_unassigned = !shown;
    }

    /// Forget a removed phase.
    pub fn forget(&mut self, phase: &str) {
        self.hidden.remove(phase);
    }

    pub fn shows(&self, phase: Option<&str>) -> bool {
        match phase {
            None => self.is_unassigned_shown(),
            Some(phase) => self.is_phase_shown(phase),
        }
    }
}

/// Combined marker visibility: layer toggle for its kind and its phase toggle.
pub fn is_marker_visible(marker: &Marker, layers: &LayerFilters, phases: &PhaseFilters) -> bool {
    layers.shows_kind(marker.kind) && phases.shows(marker.phase.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PricingConfig;
    use crate::models::marker::{MarkerStore, MarkerUpdate};
    use crate::util::geometry::Point;

    #[test]
    fn test_marker_visibility() {
        let mut store = MarkerStore::new();
        let pricing = PricingConfig::default();
        let cam = store.create(MarkerKind::Camera, Point::default(), &pricing).id.clone();
        let drop = store.create(MarkerKind::Drop, Point::default(), &pricing).id.clone();
        store.update(&cam, MarkerUpdate { phase: Some(Some("Phase 1".into())), ..Default::default() });

        let mut layers = LayerFilters::default();
        let mut phases = PhaseFilters::default();
        let visible = |layers: &LayerFilters, phases: &PhaseFilters, id: &str| {
            is_marker_visible(store.get(id).unwrap(), layers, phases)
        };
        assert!(visible(&layers, &phases, &cam));
        assert!(visible(&layers, &phases, &drop));

        phases.set_phase_shown("Phase 1", false);
        assert!(!visible(&layers, &phases, &cam));
        assert!(visible(&layers, &phases, &drop));

        phases.set_unassigned_shown(false);
        assert!(!visible(&layers, &phases, &drop));

        phases.forget("Phase 1");
        phases.set_unassigned_shown(true);
        *layers.kind_mut(MarkerKind::Drop) = false;
        assert!(visible(&layers, &phases, &cam));
        assert!(!visible(&layers, &phases, &drop));
    }
}

// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Application settings and pricing parameters.
//!
//! `PricingConfig` is owned by the editor and handed explicitly to marker
//! creation and to the budget aggregator. `Settings` holds the startup
//! defaults read from `settings.yaml` in the platform config directory.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable that overrides the settings file location.
pub const SETTINGS_ENV: &str = "SITEPLAN_CONFIG";

/// Default snap radius in image units.
pub const DEFAULT_SNAP_RADIUS: f64 = 15.0;

/// Prices used for new markers and for the budget.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PricingConfig {
    pub default_camera_price: f64,
    pub default_switch_price: f64,
    pub default_nvr_price: f64,
    /// Cost per distinct PtP antenna.
    pub connection_cost: f64,
    /// Sales tax in percent.
    pub tax_rate: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            default_camera_price: 1500.0,
            default_switch_price: 1600.0,
            default_nvr_price: 3000.0,
            connection_cost: 400.0,
            tax_rate: 0.0,
        }
    }
}

/// Startup settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Shared by link endpoint snapping and outline closing.
    pub snap_radius: f64,
    pub pricing: PricingConfig,
    pub window_size: [f32; 2],
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            snap_radius: DEFAULT_SNAP_RADIUS,
            pricing: PricingConfig::default(),
            window_size: [1280.0, 720.0],
        }
    }
}

impl Settings {
    /// Parse settings from YAML text. Missing fields take their defaults.
    pub fn from_yaml(text: &str) -> Result<Self> {
        let settings: Settings =
            serde_yaml::from_str(text).map_err(|e| Error::Settings(e.to_string()))?;
        if settings.snap_radius.is_nan() || settings.snap_radius <= 0.0 {
            return Err(Error::Settings(format!(
                "snap_radius must be positive, got {}",
                settings.snap_radius
            )));
        }
        Ok(settings)
    }

    /// Read settings from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    /// Settings file location: `$SITEPLAN_CONFIG`, else `<config dir>/siteplan/settings.yaml`.
    pub fn default_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(SETTINGS_ENV) {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|dir| dir.join("siteplan").join("settings.yaml"))
    }

    /// Load settings from the default location, falling back to defaults.
    pub fn load_or_default() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };
        if !path.exists() {
            log::debug!("No settings file at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load(&path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Ignoring settings file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let settings = Settings::from_yaml("snap_radius: 20\npricing:\n  connectionCost: 100\n").unwrap();
        assert_eq!(settings.snap_radius, 20.0);
        assert_eq!(settings.pricing.connection_cost, 100.0);
        assert_eq!(settings.pricing.default_camera_price, 1500.0);
        assert_eq!(settings.window_size, [1280.0, 720.0]);
    }

    #[test]
    fn test_rejects_non_positive_snap_radius() {
        assert!(matches!(Settings::from_yaml("snap_radius: 0"), Err(Error::Settings(_))));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(Settings::from_yaml("pricing: [1, 2").is_err());
    }
}

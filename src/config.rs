// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Application configuration management.
//!
//! This module handles persistent configuration storage using TOML format:
//! the WMS endpoints for the background, default and catalog layers, the
//! layers offered in the layer list, and map display preferences.

use serde::{Deserialize, Serialize};
use wms_context::protocol::{EPSG_3857, IMAGE_PNG};
use wms_context::LayerSources;

const APP_NAME: &str = "wms-explorer";
const CONFIG_NAME: &str = "config";

/// Default WMS endpoint for the background and default data layers
pub const DEFAULT_BASE_URL: &str = "http://labs.metacarta.com/wms/vmap0";

/// Default feature catalog endpoint for named layers and GetContext
pub const DEFAULT_CATALOG_URL: &str = "http://localhost:5000/wms";

/// Application configuration stored in TOML format
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    /// Configuration schema version for migrations
    #[serde(default = "default_config_version")]
    pub config_version: u32,

    /// WMS endpoint of the coastline background layer
    #[serde(default = "default_base_url")]
    pub background_url: String,

    /// LAYERS value of the background layer
    #[serde(default = "default_background_layers")]
    pub background_layers: String,

    /// WMS endpoint of the default data layer
    #[serde(default = "default_base_url")]
    pub default_layer_url: String,

    /// LAYERS value of the default data layer
    #[serde(default = "default_data_layers")]
    pub default_layers: String,

    /// Feature catalog endpoint serving named layers and their metadata
    #[serde(default = "default_catalog_url")]
    pub catalog_url: String,

    /// Layer names offered in the layer list
    #[serde(default)]
    pub layers: Vec<String>,

    /// Image format requested for catalog layers
    #[serde(default = "default_image_format")]
    pub image_format: String,

    /// Spatial reference system used for GetMap bounding boxes.
    ///
    /// The map is drawn in web mercator, so EPSG:3857 (or EPSG:900913 for
    /// older servers) lines up. EPSG:4326 is accepted, but its evenly spaced
    /// latitudes are stretched onto mercator rows and land off position.
    #[serde(default = "default_srs")]
    pub srs: String,

    /// Data layer opacity (0.0 - 1.0)
    #[serde(default = "default_opacity")]
    pub data_layer_opacity: f32,

    /// Zoom level showing the whole world
    #[serde(default = "default_max_extent_zoom")]
    pub max_extent_zoom: f64,

    /// Keep downloaded map tiles on disk
    #[serde(default = "default_true")]
    pub tile_disk_cache: bool,

    /// Details panel width in pixels
    #[serde(default = "default_panel_width")]
    pub panel_width: f32,
}

// Default value functions for serde
fn default_config_version() -> u32 {
    1
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_background_layers() -> String {
    "coastline_01".to_string()
}

fn default_data_layers() -> String {
    "basic".to_string()
}

fn default_catalog_url() -> String {
    DEFAULT_CATALOG_URL.to_string()
}

fn default_image_format() -> String {
    IMAGE_PNG.to_string()
}

fn default_srs() -> String {
    EPSG_3857.to_string()
}

fn default_opacity() -> f32 {
    1.0
}

fn default_max_extent_zoom() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}

fn default_panel_width() -> f32 {
    320.0
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_version: default_config_version(),
            background_url: default_base_url(),
            background_layers: default_background_layers(),
            default_layer_url: default_base_url(),
            default_layers: default_data_layers(),
            catalog_url: default_catalog_url(),
            layers: Vec::new(),
            image_format: default_image_format(),
            srs: default_srs(),
            data_layer_opacity: default_opacity(),
            max_extent_zoom: default_max_extent_zoom(),
            tile_disk_cache: true,
            panel_width: default_panel_width(),
        }
    }
}

impl AppConfig {
    /// Load configuration from disk, creating it with defaults if missing
    pub fn load() -> Result<Self, confy::ConfyError> {
        confy::load(APP_NAME, CONFIG_NAME)
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<(), confy::ConfyError> {
        confy::store(APP_NAME, CONFIG_NAME, self)
    }

    /// Get the config file path for display to user
    pub fn get_config_path() -> Result<std::path::PathBuf, confy::ConfyError> {
        confy::get_configuration_file_path(APP_NAME, CONFIG_NAME)
    }

    /// Data layer sources for the layer manager
    pub fn layer_sources(&self) -> LayerSources {
        LayerSources {
            default_url: self.default_layer_url.clone(),
            default_layers: self.default_layers.clone(),
            catalog_url: self.catalog_url.clone(),
            image_format: self.image_format.clone(),
        }
    }

    /// Remember a layer name in the layer list
    pub fn add_layer(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.layers.iter().any(|l| l == name) {
            return false;
        }
        self.layers.push(name.to_string());
        true
    }

    /// Remove a layer name from the layer list
    pub fn remove_layer(&mut self, name: &str) -> bool {
        if let Some(pos) = self.layers.iter().position(|l| l == name) {
            self.layers.remove(pos);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_take_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{"catalog_url": "http://host/wms"}"#).unwrap();
        assert_eq!(config.catalog_url, "http://host/wms");
        assert_eq!(config.background_layers, "coastline_01");
        assert_eq!(config.default_layers, "basic");
        assert_eq!(config.srs, "EPSG:3857");
        assert!(config.tile_disk_cache);
        assert_eq!(config, AppConfig { catalog_url: "http://host/wms".to_string(), ..AppConfig::default() });
    }

    #[test]
    fn test_layer_list_edits() {
        let mut config = AppConfig::default();
        assert!(config.add_layer(" vmap0 "));
        assert!(!config.add_layer("vmap0"));
        assert!(!config.add_layer("   "));
        assert_eq!(config.layers, vec!["vmap0"]);

        assert!(config.remove_layer("vmap0"));
        assert!(!config.remove_layer("vmap0"));
    }

    #[test]
    fn test_layer_sources() {
        let config = AppConfig::default();
        let sources = config.layer_sources();
        assert_eq!(sources.default_url, DEFAULT_BASE_URL);
        assert_eq!(sources.catalog_url, DEFAULT_CATALOG_URL);
        assert_eq!(sources.image_format, "image/png");
    }
}

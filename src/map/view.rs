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

//! Slippy map holding an ordered stack of WMS layers.

use std::path::PathBuf;

use eframe::egui;
use log::{debug, error, info};
use walkers::{lon_lat, HttpOptions, HttpTiles, MapMemory, Plugin, Projector, Tiles};
use wms_context::{Extent, LayerId, MapSurface, WmsLayer};

use super::wms_source::WmsTileSource;

/// One layer on the map and the tiles fetched for it
struct MapLayer {
    id: LayerId,
    layer: WmsLayer,
    /// Built on the next frame; dropped whenever the request parameters change
    tiles: Option<HttpTiles>,
    /// Why tiles can't be built for this layer
    source_error: Option<String>,
}

impl MapLayer {
    fn invalidate(&mut self) {
        self.tiles = None;
        self.source_error = None;
    }
}

/// The map widget state: layers bottom to top, view position and the extent
/// seen on the last frame
pub struct MapView {
    layers: Vec<MapLayer>,
    memory: MapMemory,
    srs: String,
    cache_dir: Option<PathBuf>,
    max_extent: Extent,
    overlay_opacity: f32,
    visible_extent: Option<Extent>,
    next_id: u64,
}

impl MapView {
    pub fn new(srs: &str, cache_dir: Option<PathBuf>) -> Self {
        Self {
            layers: Vec::new(),
            memory: MapMemory::default(),
            srs: srs.to_string(),
            cache_dir,
            max_extent: Extent::MAX,
            overlay_opacity: 1.0,
            visible_extent: None,
            next_id: 0,
        }
    }

    /// Default tile cache location
    pub fn default_cache_dir() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from(".cache"))
            .join("wms-explorer")
            .join("tiles")
    }

    pub fn overlay_opacity(&self) -> f32 {
        self.overlay_opacity
    }

    /// Opacity of every layer above the base layer
    pub fn set_overlay_opacity(&mut self, opacity: f32) {
        self.overlay_opacity = opacity.clamp(0.0, 1.0);
    }

    pub fn max_extent(&self) -> Extent {
        self.max_extent
    }

    /// Layers bottom to top, with any error preventing them from loading
    pub fn layers(&self) -> impl Iterator<Item = (&WmsLayer, Option<&str>)> {
        self.layers
            .iter()
            .map(|l| (&l.layer, l.source_error.as_deref()))
    }

    /// Center on the maximum extent at the given zoom level
    pub fn zoom_to_max_extent(&mut self, zoom: f64) {
        self.memory.follow_my_position();
        if let Err(e) = self.memory.set_zoom(zoom) {
            error!("Cannot zoom to {}: {:?}", zoom, e);
        }
    }

    fn ensure_tiles(&mut self, ctx: &egui::Context) {
        for map_layer in &mut self.layers {
            if map_layer.tiles.is_some() || map_layer.source_error.is_some() {
                continue;
            }

            match WmsTileSource::new(map_layer.layer.clone(), &self.srs) {
                Ok(source) => {
                    debug!("Creating tiles for layer '{}'", map_layer.layer.title);
                    let http_options = HttpOptions {
                        cache: self.cache_dir.clone(),
                        ..Default::default()
                    };
                    map_layer.tiles = Some(HttpTiles::with_options(source, http_options, ctx.clone()));
                }
                Err(e) => {
                    error!("Layer '{}' cannot be displayed: {}", map_layer.layer.title, e);
                    map_layer.source_error = Some(e.to_string());
                }
            }
        }
    }

    /// Render the map into the remaining space of `ui`
    pub fn show(&mut self, ui: &mut egui::Ui) {
        self.ensure_tiles(ui.ctx());

        let (center_lon, center_lat) = self.max_extent.center();
        let my_position = lon_lat(center_lon, center_lat);
        let mut recorded = None;

        let Some((base, overlays)) = self.layers.split_first_mut() else {
            ui.centered_and_justified(|ui| ui.label("No map layers"));
            return;
        };

        let mut map = walkers::Map::new(
            base.tiles.as_mut().map(|t| t as &mut dyn Tiles),
            &mut self.memory,
            my_position,
        );

        for overlay in overlays {
            if let Some(tiles) = overlay.tiles.as_mut() {
                map = map.with_layer(tiles, self.overlay_opacity);
            }
        }

        map = map.with_plugin(ExtentRecorder {
            extent: &mut recorded,
        });

        ui.add(map);

        if recorded.is_some() {
            self.visible_extent = recorded;
        }
        self.restrict_center();
    }

    /// Keep the view center inside the maximum extent
    fn restrict_center(&mut self) {
        if let Some(position) = self.memory.detached() {
            let (lon, lat) = self.max_extent.clamp_center(position.x(), position.y());
            if (lon, lat) != (position.x(), position.y()) {
                self.memory.center_at(lon_lat(lon, lat));
            }
        }
    }
}

impl MapSurface for MapView {
    fn add_layer(&mut self, layer: WmsLayer) -> LayerId {
        self.next_id += 1;
        let id = LayerId(self.next_id);
        info!("Adding map layer '{}'", layer.title);
        self.layers.push(MapLayer {
            id,
            layer,
            tiles: None,
            source_error: None,
        });
        id
    }

    fn remove_layer(&mut self, id: LayerId) -> Option<WmsLayer> {
        let pos = self.layers.iter().position(|l| l.id == id)?;
        let removed = self.layers.remove(pos);
        info!("Removed map layer '{}'", removed.layer.title);
        Some(removed.layer)
    }

    fn layer(&self, id: LayerId) -> Option<&WmsLayer> {
        self.layers.iter().find(|l| l.id == id).map(|l| &l.layer)
    }

    fn merge_params(&mut self, id: LayerId, key: &str, value: &str) -> bool {
        let Some(map_layer) = self.layers.iter_mut().find(|l| l.id == id) else {
            return false;
        };

        let changed = map_layer.layer.merge_params(key, value);
        if changed {
            // New parameters mean new tile URLs, so start over with fresh tiles
            map_layer.invalidate();
        }
        changed
    }

    fn extent(&self) -> Option<Extent> {
        self.visible_extent
    }
}

/// Records the geographic extent covered by the map widget
struct ExtentRecorder<'a> {
    extent: &'a mut Option<Extent>,
}

impl Plugin for ExtentRecorder<'_> {
    fn run(
        self: Box<Self>,
        _ui: &mut egui::Ui,
        response: &egui::Response,
        projector: &Projector,
        _memory: &MapMemory,
    ) {
        let rect = response.rect;
        let top_left = projector.unproject(rect.left_top().to_vec2());
        let bottom_right = projector.unproject(rect.right_bottom().to_vec2());

        *self.extent = Some(Extent::new(
            top_left.x(),
            bottom_right.y(),
            bottom_right.x(),
            top_left.y(),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wms_context::protocol::IMAGE_PNG;

    fn view() -> MapView {
        MapView::new("EPSG:4326", None)
    }

    #[test]
    fn test_layers_keep_insertion_order() {
        let mut map = view();
        map.add_layer(WmsLayer::background("http://example.org/wms", "coastline_01"));
        let data = map.add_layer(WmsLayer::default_data("http://example.org/wms", "basic"));

        let titles: Vec<&str> = map.layers().map(|(l, _)| l.title.as_str()).collect();
        assert_eq!(titles, vec!["Coastline", "Data Layer"]);

        assert_eq!(map.remove_layer(data).unwrap().title, "Data Layer");
        assert!(map.remove_layer(data).is_none());
        assert_eq!(map.layers().count(), 1);
    }

    #[test]
    fn test_merge_params_invalidates_only_on_change() {
        let mut map = view();
        let id = map.add_layer(WmsLayer::named("vmap0", "http://example.org/wms", IMAGE_PNG));
        map.layers[0].source_error = Some("stale".to_string());

        assert!(!map.merge_params(id, "format", IMAGE_PNG));
        assert_eq!(map.layers[0].source_error.as_deref(), Some("stale"));

        assert!(map.merge_params(id, "time", "2001"));
        assert!(map.layers[0].source_error.is_none());
        assert_eq!(map.layer(id).unwrap().params.get("TIME"), Some("2001"));

        assert!(!map.merge_params(LayerId(99), "time", "2001"));
    }

    #[test]
    fn test_no_extent_before_first_frame() {
        let mut map = view();
        assert!(map.extent().is_none());
        map.set_overlay_opacity(1.5);
        assert!((map.overlay_opacity() - 1.0).abs() < f32::EPSILON);
    }
}

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

//! WMS tile source implementation.

use log::warn;
use walkers::sources::{Attribution, TileSource};
use walkers::TileId;
use wms_context::{tile_bbox, ProtocolError, WmsLayer};

/// Pixel size of the GetMap image requested for each tile
const TILE_SIZE: u32 = 256;

/// Tile source that turns every slippy-map tile into a WMS GetMap request
/// for the tile's bounding box
pub struct WmsTileSource {
    layer: WmsLayer,
    srs: String,
}

impl WmsTileSource {
    /// Create a tile source for a snapshot of `layer`.
    ///
    /// Fails if the endpoint URL or SRS can't produce a request.
    pub fn new(layer: WmsLayer, srs: &str) -> Result<Self, ProtocolError> {
        let bbox = tile_bbox(0, 0, 0, srs)?;
        layer.get_map_url(&bbox, TILE_SIZE, TILE_SIZE, srs)?;

        Ok(Self {
            layer,
            srs: srs.to_string(),
        })
    }
}

impl TileSource for WmsTileSource {
    fn tile_url(&self, tile_id: TileId) -> String {
        tile_bbox(tile_id.x, tile_id.y, tile_id.zoom, &self.srs)
            .and_then(|bbox| self.layer.get_map_url(&bbox, TILE_SIZE, TILE_SIZE, &self.srs))
            .unwrap_or_else(|e| {
                // Checked in new(), so this only trips on a broken invariant
                warn!("Cannot build GetMap URL for '{}': {}", self.layer.title, e);
                String::new()
            })
    }

    fn attribution(&self) -> Attribution {
        Attribution {
            text: "Imagery from OGC Web Map Services",
            url: "https://www.ogc.org/standards/wms",
            logo_light: None,
            logo_dark: None,
        }
    }

    fn tile_size(&self) -> u32 {
        TILE_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use wms_context::protocol::IMAGE_PNG;

    #[test]
    fn test_tile_url_requests_tile_bbox() {
        let layer = WmsLayer::named("vmap0", "http://example.org/wms", IMAGE_PNG);
        let source = WmsTileSource::new(layer, "EPSG:4326").unwrap();

        let url = source.tile_url(TileId { x: 1, y: 0, zoom: 1 });
        assert!(url.starts_with("http://example.org/wms?LAYERS=vmap0"));
        assert!(url.contains("BBOX=0%2C0%2C180%2C85.0511"));
        assert!(url.contains("WIDTH=256&HEIGHT=256"));
    }

    #[test]
    fn test_default_config_requests_mercator_tiles() {
        let srs = AppConfig::default().srs;
        let layer = WmsLayer::named("vmap0", "http://example.org/wms", IMAGE_PNG);
        let source = WmsTileSource::new(layer, &srs).unwrap();

        let url = source.tile_url(TileId { x: 1, y: 1, zoom: 1 });
        assert!(url.contains("SRS=EPSG%3A3857"));
        assert!(url.contains("BBOX=0%2C-20037508.34"));
        assert!(!url.contains("85.05"));
    }

    #[test]
    fn test_rejects_unknown_srs() {
        let layer = WmsLayer::named("vmap0", "http://example.org/wms", IMAGE_PNG);
        assert!(WmsTileSource::new(layer, "EPSG:27700").is_err());
    }
}

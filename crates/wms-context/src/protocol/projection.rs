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

use std::f64::consts::PI;
use std::fmt;

use super::ProtocolError;

pub const EPSG_4326: &str = "EPSG:4326";
pub const EPSG_3857: &str = "EPSG:3857";

/// Half the width of the web mercator plane in metres
const MERCATOR_ORIGIN_SHIFT: f64 = 20_037_508.342_789_244;

/// Highest latitude reachable on a web mercator map
const MAX_MERCATOR_LAT: f64 = 85.0;

/// Web Mercator projection utilities
#[derive(Debug)]
pub struct WebMercator;

impl WebMercator {
    /// Convert tile coordinates back to latitude
    #[must_use]
    pub fn tile_to_lat(y: f64, zoom: u8) -> f64 {
        let n = 2_f64.powi(i32::from(zoom));
        let lat_rad = (PI * (1.0 - 2.0 * y / n)).sinh().atan();
        lat_rad.to_degrees()
    }

    /// Convert tile coordinates back to longitude
    #[must_use]
    pub fn tile_to_lon(x: f64, zoom: u8) -> f64 {
        let n = 2_f64.powi(i32::from(zoom));
        x / n * 360.0 - 180.0
    }
}

/// Axis-aligned bounding box, `(min_x, min_y)` to `(max_x, max_y)`.
///
/// In geographic coordinates x is longitude and y latitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Extent {
    /// Whole-world extent; also the map's restricted extent.
    pub const MAX: Extent = Extent {
        min_x: -180.0,
        min_y: -90.0,
        max_x: 180.0,
        max_y: 90.0,
    };

    #[must_use]
    pub const fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    #[must_use]
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Clamp a geographic map center into this extent.
    ///
    /// Latitude is further limited to what a web mercator map can show.
    #[must_use]
    pub fn clamp_center(&self, lon: f64, lat: f64) -> (f64, f64) {
        let min_lat = self.min_y.max(-MAX_MERCATOR_LAT);
        let max_lat = self.max_y.min(MAX_MERCATOR_LAT);
        (lon.clamp(self.min_x, self.max_x), lat.clamp(min_lat, max_lat))
    }
}

impl fmt::Display for Extent {
    /// `left,bottom,right,top`, the form WMS expects for BBOX
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.min_x, self.min_y, self.max_x, self.max_y)
    }
}

/// Bounding box of a slippy-map tile in the given spatial reference system.
pub fn tile_bbox(x: u32, y: u32, zoom: u8, srs: &str) -> Result<Extent, ProtocolError> {
    let (x, y) = (f64::from(x), f64::from(y));

    match srs.to_uppercase().as_str() {
        EPSG_4326 | "CRS:84" => Ok(Extent::new(
            WebMercator::tile_to_lon(x, zoom),
            WebMercator::tile_to_lat(y + 1.0, zoom),
            WebMercator::tile_to_lon(x + 1.0, zoom),
            WebMercator::tile_to_lat(y, zoom),
        )),
        EPSG_3857 | "EPSG:900913" => {
            let size = 2.0 * MERCATOR_ORIGIN_SHIFT / 2_f64.powi(i32::from(zoom));
            Ok(Extent::new(
                -MERCATOR_ORIGIN_SHIFT + x * size,
                MERCATOR_ORIGIN_SHIFT - (y + 1.0) * size,
                -MERCATOR_ORIGIN_SHIFT + (x + 1.0) * size,
                MERCATOR_ORIGIN_SHIFT - y * size,
            ))
        }
        _ => Err(ProtocolError::UnsupportedSrs(srs.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_tile_edges() {
        assert!(close(WebMercator::tile_to_lon(0.0, 3), -180.0));
        assert!(close(WebMercator::tile_to_lon(4.0, 3), 0.0));
        assert!(close(WebMercator::tile_to_lat(1.0, 1), 0.0));
        assert!((WebMercator::tile_to_lat(0.0, 0) - 85.0511).abs() < 1e-3);
    }

    #[test]
    fn test_tile_bbox_geographic() {
        let bbox = tile_bbox(0, 0, 0, EPSG_4326).unwrap();
        assert!(close(bbox.min_x, -180.0));
        assert!(close(bbox.max_x, 180.0));
        assert!((bbox.max_y - 85.0511).abs() < 1e-3);
        assert!((bbox.min_y + 85.0511).abs() < 1e-3);

        let bbox = tile_bbox(1, 0, 1, "epsg:4326").unwrap();
        assert!(close(bbox.min_x, 0.0));
        assert!(close(bbox.min_y, 0.0));
        assert!(close(bbox.max_x, 180.0));
    }

    #[test]
    fn test_tile_bbox_mercator() {
        let bbox = tile_bbox(0, 0, 0, EPSG_3857).unwrap();
        assert!(close(bbox.min_x, -MERCATOR_ORIGIN_SHIFT));
        assert!(close(bbox.max_y, MERCATOR_ORIGIN_SHIFT));

        let bbox = tile_bbox(1, 1, 1, EPSG_3857).unwrap();
        assert!(close(bbox.min_x, 0.0));
        assert!(close(bbox.max_y, 0.0));
        assert!(close(bbox.min_y, -MERCATOR_ORIGIN_SHIFT));
    }

    #[test]
    fn test_tile_bbox_unknown_srs() {
        assert!(matches!(
            tile_bbox(0, 0, 0, "EPSG:27700"),
            Err(ProtocolError::UnsupportedSrs(_))
        ));
    }

    #[test]
    fn test_extent_display_and_clamp() {
        assert_eq!(Extent::MAX.to_string(), "-180,-90,180,90");
        assert_eq!(Extent::MAX.center(), (0.0, 0.0));
        assert_eq!(Extent::MAX.clamp_center(200.0, -89.0), (180.0, -85.0));
        assert_eq!(Extent::MAX.clamp_center(10.5, 45.0), (10.5, 45.0));
    }
}

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

use reqwest::Url;

use super::projection::Extent;
use super::ProtocolError;

/// MIME type used for every layer the viewer renders.
pub const IMAGE_PNG: &str = "image/png";

/// WMS request parameters a dimension cannot be sent under verbatim.
///
/// A dimension with one of these names would be shadowed by the real
/// request parameter, so servers expect it with a `_dim` suffix instead.
const RESERVED_PARAMS: &[&str] = &[
    "width",
    "height",
    "version",
    "request",
    "layers",
    "styles",
    "crs",
    "srs",
    "bbox",
    "format",
    "transparent",
    "bgcolor",
    "exceptions",
];

/// Map a dimension name to the request parameter that carries its value.
#[must_use]
pub fn dimension_param(dimension: &str) -> String {
    if RESERVED_PARAMS.contains(&dimension.to_lowercase().as_str()) {
        format!("{dimension}_dim")
    } else {
        dimension.to_string()
    }
}

/// Ordered, case-insensitive WMS parameter set.
///
/// Keys are stored upper-cased. Insertion order is kept so generated URLs
/// are stable, and merging an existing key overwrites it in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WmsParams {
    entries: Vec<(String, String)>,
}

impl WmsParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style merge.
    #[must_use]
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.merge(key, value);
        self
    }

    /// Look up a parameter regardless of key case.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        let key = key.to_uppercase();
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Merge a single parameter, returning whether the set changed.
    pub fn merge(&mut self, key: &str, value: &str) -> bool {
        let key = key.to_uppercase();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) if existing == value => false,
            Some((_, existing)) => {
                value.clone_into(existing);
                true
            }
            None => {
                self.entries.push((key, value.to_string()));
                true
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A named raster source: a WMS endpoint plus the parameters sent with
/// every GetMap request for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WmsLayer {
    /// Display name of the layer on the map
    pub title: String,

    /// Base URL of the WMS endpoint
    pub url: String,

    /// Layer-specific request parameters (LAYERS, FORMAT, dimensions, ...)
    pub params: WmsParams,
}

impl WmsLayer {
    #[must_use]
    pub fn new(title: impl Into<String>, url: impl Into<String>, params: WmsParams) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            params,
        }
    }

    /// Fixed transparent background layer drawn under everything else.
    #[must_use]
    pub fn background(url: &str, layers: &str) -> Self {
        Self::new(
            "Coastline",
            url,
            WmsParams::new()
                .with("layers", layers)
                .with("format", IMAGE_PNG)
                .with("transparent", "true"),
        )
    }

    /// Opaque data layer shown when no named layer is selected.
    #[must_use]
    pub fn default_data(url: &str, layers: &str) -> Self {
        Self::new(
            "Data Layer",
            url,
            WmsParams::new()
                .with("layers", layers)
                .with("format", IMAGE_PNG)
                .with("transparent", "false"),
        )
    }

    /// Data layer for a layer published by the feature catalog service.
    /// No transparency flag is sent, leaving it to the server default.
    #[must_use]
    pub fn named(name: &str, url: &str, format: &str) -> Self {
        Self::new(
            name,
            url,
            WmsParams::new().with("layers", name).with("format", format),
        )
    }

    /// Value of the LAYERS parameter
    #[must_use]
    pub fn layers(&self) -> Option<&str> {
        self.params.get("layers")
    }

    pub fn merge_params(&mut self, key: &str, value: &str) -> bool {
        self.params.merge(key, value)
    }

    /// Build a GetMap request for the given bounding box and image size.
    ///
    /// The layer's own parameters come first; the standard request
    /// parameters are added only where the layer doesn't already set them.
    pub fn get_map_url(
        &self,
        bbox: &Extent,
        width: u32,
        height: u32,
        srs: &str,
    ) -> Result<String, ProtocolError> {
        let mut url = Url::parse(&self.url).map_err(|e| ProtocolError::InvalidUrl {
            url: self.url.clone(),
            reason: e.to_string(),
        })?;

        let bbox = bbox.to_string();
        let width = width.to_string();
        let height = height.to_string();
        let standard = [
            ("SERVICE", "WMS"),
            ("VERSION", "1.1.1"),
            ("REQUEST", "GetMap"),
            ("STYLES", ""),
            ("SRS", srs),
            ("BBOX", bbox.as_str()),
            ("WIDTH", width.as_str()),
            ("HEIGHT", height.as_str()),
        ];

        {
            let mut query = url.query_pairs_mut();
            for (key, value) in self.params.iter() {
                query.append_pair(key, value);
            }
            for (key, value) in standard {
                if self.params.get(key).is_none() {
                    query.append_pair(key, value);
                }
            }
        }

        Ok(url.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_param_escapes_reserved_names() {
        assert_eq!(dimension_param("time"), "time");
        assert_eq!(dimension_param("elevation"), "elevation");
        assert_eq!(dimension_param("width"), "width_dim");
        assert_eq!(dimension_param("Format"), "Format_dim");
    }

    #[test]
    fn test_merge_is_case_insensitive_and_overwrites() {
        let mut params = WmsParams::new().with("layers", "basic");

        assert!(params.merge("time", "2000"));
        assert!(params.merge("TIME", "2001"));
        assert!(!params.merge("Time", "2001"));

        assert_eq!(params.len(), 2);
        assert_eq!(params.get("time"), Some("2001"));
        let keys: Vec<&str> = params.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["LAYERS", "TIME"]);
    }

    #[test]
    fn test_layer_constructors() {
        let coast = WmsLayer::background("http://example.org/wms", "coastline_01");
        assert_eq!(coast.params.get("transparent"), Some("true"));

        let data = WmsLayer::default_data("http://example.org/wms", "basic");
        assert_eq!(data.title, "Data Layer");
        assert_eq!(data.params.get("transparent"), Some("false"));

        let named = WmsLayer::named("vmap0", "http://example.org/cat", IMAGE_PNG);
        assert_eq!(named.title, "vmap0");
        assert_eq!(named.layers(), Some("vmap0"));
        assert_eq!(named.params.get("transparent"), None);
    }

    #[test]
    fn test_get_map_url() {
        let mut layer = WmsLayer::named("vmap0", "http://example.org/wms", IMAGE_PNG);
        layer.merge_params("time", "2000-01-01T00:00:00Z");

        let url = layer
            .get_map_url(&Extent::new(-180.0, -90.0, 0.0, 90.0), 256, 256, "EPSG:4326")
            .unwrap();

        assert!(url.starts_with("http://example.org/wms?LAYERS=vmap0&FORMAT=image%2Fpng"));
        assert!(url.contains("TIME=2000-01-01T00%3A00%3A00Z"));
        assert!(url.contains("REQUEST=GetMap"));
        assert!(url.contains("SRS=EPSG%3A4326"));
        assert!(url.contains("BBOX=-180%2C-90%2C0%2C90"));
        assert!(url.contains("WIDTH=256&HEIGHT=256"));
    }

    #[test]
    fn test_get_map_url_keeps_existing_query() {
        let layer = WmsLayer::named("a", "http://example.org/cows?fileoruri=x", IMAGE_PNG);
        let url = layer.get_map_url(&Extent::MAX, 256, 256, "EPSG:4326").unwrap();
        assert!(url.starts_with("http://example.org/cows?fileoruri=x&LAYERS=a"));
    }

    #[test]
    fn test_get_map_url_rejects_bad_base() {
        let layer = WmsLayer::named("a", "not a url", IMAGE_PNG);
        assert!(matches!(
            layer.get_map_url(&Extent::MAX, 256, 256, "EPSG:4326"),
            Err(ProtocolError::InvalidUrl { .. })
        ));
    }
}

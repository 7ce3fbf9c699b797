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

//! Data layer management.
//!
//! The map holds a fixed background layer plus at most one data layer.
//! [`LayerManager`] owns the reference to that data layer: switching layers
//! removes the old one before adding the new one, and dimension changes are
//! merged into whichever layer is current.

use log::{debug, info, warn};

use crate::panel::{PanelBuilder, PanelRequest};
use crate::protocol::{dimension_param, Extent, WmsLayer, IMAGE_PNG};

/// Handle of a layer added to a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerId(pub u64);

/// The map operations the layer manager relies on.
pub trait MapSurface {
    /// Append a layer on top of the existing ones.
    fn add_layer(&mut self, layer: WmsLayer) -> LayerId;

    /// Remove a layer, handing it back if it was on the map.
    fn remove_layer(&mut self, id: LayerId) -> Option<WmsLayer>;

    fn layer(&self, id: LayerId) -> Option<&WmsLayer>;

    /// Merge one request parameter into a layer.
    ///
    /// Returns `true` when the parameter changed and the layer has to
    /// request new imagery.
    fn merge_params(&mut self, id: LayerId, key: &str, value: &str) -> bool;

    /// Currently visible extent, if the map has been laid out.
    fn extent(&self) -> Option<Extent>;
}

/// Where data layers come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerSources {
    /// WMS endpoint of the default data layer
    pub default_url: String,

    /// LAYERS value of the default data layer
    pub default_layers: String,

    /// Feature catalog endpoint serving named layers and their metadata
    pub catalog_url: String,

    /// Image format requested for named layers
    pub image_format: String,
}

impl LayerSources {
    #[must_use]
    pub fn new(default_url: &str, default_layers: &str, catalog_url: &str) -> Self {
        Self {
            default_url: default_url.to_string(),
            default_layers: default_layers.to_string(),
            catalog_url: catalog_url.to_string(),
            image_format: IMAGE_PNG.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
struct CurrentLayer {
    id: LayerId,
    name: Option<String>,
}

#[derive(Debug)]
pub struct LayerManager {
    sources: LayerSources,
    current: Option<CurrentLayer>,
}

impl LayerManager {
    #[must_use]
    pub fn new(sources: LayerSources) -> Self {
        Self {
            sources,
            current: None,
        }
    }

    #[must_use]
    pub fn sources(&self) -> &LayerSources {
        &self.sources
    }

    /// Replace the data layer.
    ///
    /// `None` or an empty name installs the default layer and clears the
    /// details panel. A layer name installs that layer from the feature
    /// catalog and starts loading its panel; the returned request has to be
    /// fetched by the caller.
    pub fn set_layer<M>(
        &mut self,
        name: Option<&str>,
        map: &mut M,
        panels: &mut PanelBuilder,
    ) -> Option<PanelRequest>
    where
        M: MapSurface + ?Sized,
    {
        if let Some(previous) = self.current.take() {
            if map.remove_layer(previous.id).is_none() {
                warn!("Data layer {:?} was already gone from the map", previous.id);
            }
        }

        match name.filter(|n| !n.is_empty()) {
            None => {
                let layer =
                    WmsLayer::default_data(&self.sources.default_url, &self.sources.default_layers);
                let id = map.add_layer(layer);
                info!("Showing default data layer '{}'", self.sources.default_layers);
                self.current = Some(CurrentLayer { id, name: None });
                panels.clear();
                None
            }
            Some(name) => {
                let layer =
                    WmsLayer::named(name, &self.sources.catalog_url, &self.sources.image_format);
                let id = map.add_layer(layer);
                info!("Showing layer '{}' from {}", name, self.sources.catalog_url);
                self.current = Some(CurrentLayer {
                    id,
                    name: Some(name.to_string()),
                });
                Some(panels.begin(name))
            }
        }
    }

    /// The data layer currently on the map
    #[must_use]
    pub fn current_layer<'m, M>(&self, map: &'m M) -> Option<&'m WmsLayer>
    where
        M: MapSurface + ?Sized,
    {
        self.current.as_ref().and_then(|c| map.layer(c.id))
    }

    #[must_use]
    pub fn current_id(&self) -> Option<LayerId> {
        self.current.as_ref().map(|c| c.id)
    }

    /// Name of the selected catalog layer; `None` for the default layer
    #[must_use]
    pub fn current_name(&self) -> Option<&str> {
        self.current.as_ref().and_then(|c| c.name.as_deref())
    }

    /// Set a dimension value on the current data layer.
    ///
    /// The value is not checked against the dimension's extent.
    pub fn set_layer_dim<M>(&self, dimension: &str, value: &str, map: &mut M) -> bool
    where
        M: MapSurface + ?Sized,
    {
        let Some(current) = &self.current else {
            warn!("No data layer to set {}={} on", dimension, value);
            return false;
        };

        let changed = map.merge_params(current.id, &dimension_param(dimension), value);
        debug!("Set layer dimension {}={} (changed: {})", dimension, value, changed);
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::parse_context;
    use crate::panel::PanelState;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Add(String),
        Remove(LayerId),
        Merge(LayerId, String, String),
    }

    /// Map fake that records every call.
    #[derive(Default)]
    struct RecordingMap {
        layers: Vec<(LayerId, WmsLayer)>,
        calls: Vec<Call>,
        next_id: u64,
    }

    impl MapSurface for RecordingMap {
        fn add_layer(&mut self, layer: WmsLayer) -> LayerId {
            self.next_id += 1;
            let id = LayerId(self.next_id);
            self.calls.push(Call::Add(layer.title.clone()));
            self.layers.push((id, layer));
            id
        }

        fn remove_layer(&mut self, id: LayerId) -> Option<WmsLayer> {
            self.calls.push(Call::Remove(id));
            let pos = self.layers.iter().position(|(i, _)| *i == id)?;
            Some(self.layers.remove(pos).1)
        }

        fn layer(&self, id: LayerId) -> Option<&WmsLayer> {
            self.layers.iter().find(|(i, _)| *i == id).map(|(_, l)| l)
        }

        fn merge_params(&mut self, id: LayerId, key: &str, value: &str) -> bool {
            self.calls
                .push(Call::Merge(id, key.to_string(), value.to_string()));
            self.layers
                .iter_mut()
                .find(|(i, _)| *i == id)
                .is_some_and(|(_, l)| l.merge_params(key, value))
        }

        fn extent(&self) -> Option<Extent> {
            Some(Extent::MAX)
        }
    }

    fn manager() -> LayerManager {
        LayerManager::new(LayerSources::new(
            "http://example.org/vmap0",
            "basic",
            "http://example.org/cat",
        ))
    }

    fn with_background() -> RecordingMap {
        let mut map = RecordingMap::default();
        map.add_layer(WmsLayer::background("http://example.org/vmap0", "coastline_01"));
        map.calls.clear();
        map
    }

    #[test]
    fn test_default_layer_twice() {
        let mut map = with_background();
        let mut panels = PanelBuilder::new();
        let mut layers = manager();

        assert!(layers.set_layer(None, &mut map, &mut panels).is_none());
        let first = layers.current_id().unwrap();
        assert!(layers.set_layer(None, &mut map, &mut panels).is_none());

        assert_eq!(
            map.calls,
            vec![
                Call::Add("Data Layer".to_string()),
                Call::Remove(first),
                Call::Add("Data Layer".to_string()),
            ]
        );
        // background plus exactly one data layer
        assert_eq!(map.layers.len(), 2);
        assert_eq!(layers.current_layer(&map).unwrap().layers(), Some("basic"));
        assert_eq!(layers.current_name(), None);
    }

    #[test]
    fn test_named_layer_starts_panel() {
        let mut map = with_background();
        let mut panels = PanelBuilder::new();
        let mut layers = manager();

        layers.set_layer(None, &mut map, &mut panels);
        let request = layers
            .set_layer(Some("vmap0"), &mut map, &mut panels)
            .unwrap();

        assert_eq!(request.layer, "vmap0");
        assert!(matches!(panels.state(), PanelState::Loading { layer } if layer == "vmap0"));

        let current = layers.current_layer(&map).unwrap();
        assert_eq!(current.url, "http://example.org/cat");
        assert_eq!(current.layers(), Some("vmap0"));
        assert_eq!(current.params.get("format"), Some("image/png"));
        assert_eq!(layers.current_name(), Some("vmap0"));
        assert_eq!(map.layers.len(), 2);
    }

    #[test]
    fn test_empty_name_means_default() {
        let mut map = with_background();
        let mut panels = PanelBuilder::new();
        let mut layers = manager();

        let request = layers.set_layer(Some("vmap0"), &mut map, &mut panels).unwrap();
        panels.complete(&request, parse_context(r#"{"vmap0": {"title": "V"}}"#, "vmap0"));
        assert!(panels.panel().is_some());

        assert!(layers.set_layer(Some(""), &mut map, &mut panels).is_none());
        assert_eq!(layers.current_layer(&map).unwrap().title, "Data Layer");
        assert_eq!(panels.state(), &PanelState::Empty);
    }

    #[test]
    fn test_set_layer_dim_merges_once() {
        let mut map = with_background();
        let mut panels = PanelBuilder::new();
        let mut layers = manager();
        layers.set_layer(Some("vmap0"), &mut map, &mut panels);
        let id = layers.current_id().unwrap();
        map.calls.clear();

        assert!(layers.set_layer_dim("time", "2001", &mut map));
        assert_eq!(
            map.calls,
            vec![Call::Merge(id, "time".to_string(), "2001".to_string())]
        );
        assert_eq!(layers.current_layer(&map).unwrap().params.get("TIME"), Some("2001"));

        // same value again is merged but changes nothing
        assert!(!layers.set_layer_dim("time", "2001", &mut map));

        // reserved names travel under an escaped parameter
        layers.set_layer_dim("width", "10", &mut map);
        assert_eq!(
            map.calls.last(),
            Some(&Call::Merge(id, "width_dim".to_string(), "10".to_string()))
        );
    }

    #[test]
    fn test_set_layer_dim_without_layer() {
        let mut map = with_background();
        let layers = manager();
        assert!(!layers.set_layer_dim("time", "2001", &mut map));
        assert!(map.calls.is_empty());
    }
}

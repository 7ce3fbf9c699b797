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

//! Layer details panel.
//!
//! [`PanelBuilder`] turns layer metadata into a [`LayerPanel`]: a title, an
//! abstract and one selector row per dimension. It owns the mapping from
//! selector controls to dimension names and tracks the asynchronous
//! lifecycle of the metadata request behind the panel (loading, ready,
//! failed), discarding responses for layers that are no longer selected.
//!
//! Every rebuild replaces the whole panel, so rows never accumulate across
//! layer switches and the download control exists at most once.

use std::collections::HashMap;
use std::fmt;

use log::{debug, warn};

use crate::context::{ContextError, LayerMetadata};

/// Identifier of the download control
pub const DOWNLOAD_CONTROL_ID: &str = "wcsdownload";

/// Caption of the download control
pub const DOWNLOAD_LABEL: &str = "Download (not working yet)";

/// Identifier of a dimension selector control.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ControlId(String);

impl ControlId {
    fn for_dimension(dimension: &str) -> Self {
        Self(format!("dimopt_{dimension}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One labelled selector row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionRow {
    pub control: ControlId,

    /// e.g. `time:`
    pub label: String,

    /// Option values in extent order; each value is also its caption
    pub options: Vec<String>,

    /// Trailing units text, e.g. ` year`
    pub units_text: String,

    /// Index into `options` currently shown as selected
    pub selected: usize,
}

impl DimensionRow {
    #[must_use]
    pub fn selected_value(&self) -> Option<&str> {
        self.options.get(self.selected).map(String::as_str)
    }
}

/// The download button placed after the dimension rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadControl {
    pub id: &'static str,
    pub label: &'static str,
}

/// Rendered details of the selected layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerPanel {
    pub layer: String,
    pub title_line: String,
    pub abstract_line: String,
    pub rows: Vec<DimensionRow>,
    pub download: Option<DownloadControl>,
}

impl LayerPanel {
    fn from_metadata(layer: &str, metadata: &LayerMetadata) -> (Self, HashMap<ControlId, String>) {
        let mut controls = HashMap::with_capacity(metadata.dimensions.len());
        let mut rows = Vec::with_capacity(metadata.dimensions.len());

        for (name, dimension) in &metadata.dimensions {
            let control = ControlId::for_dimension(name);
            controls.insert(control.clone(), name.clone());
            rows.push(DimensionRow {
                control,
                label: format!("{name}:"),
                options: dimension.extent.iter().map(ToString::to_string).collect(),
                units_text: format!(" {}", dimension.units()),
                selected: 0,
            });
        }

        let download = (!rows.is_empty()).then_some(DownloadControl {
            id: DOWNLOAD_CONTROL_ID,
            label: DOWNLOAD_LABEL,
        });

        let panel = Self {
            layer: layer.to_string(),
            title_line: format!("Title: {}", metadata.title),
            abstract_line: format!("Abstract: {}", metadata.abstract_text),
            rows,
            download,
        };

        (panel, controls)
    }

    #[must_use]
    pub fn row(&self, control: &ControlId) -> Option<&DimensionRow> {
        self.rows.iter().find(|r| r.control == *control)
    }
}

/// What the details panel currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PanelState {
    /// No named layer selected
    #[default]
    Empty,

    /// Metadata for `layer` has been requested
    Loading { layer: String },

    Ready(LayerPanel),

    /// The metadata request for `layer` failed
    Failed { layer: String, message: String },
}

/// A pending metadata request for the panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelRequest {
    pub token: u64,
    pub layer: String,
}

/// A dimension value chosen in the panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionChange {
    pub dimension: String,
    pub value: String,
}

#[derive(Debug, Default)]
pub struct PanelBuilder {
    state: PanelState,
    /// Selector control to the dimension it drives
    controls: HashMap<ControlId, String>,
    generation: u64,
}

impl PanelBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> &PanelState {
        &self.state
    }

    #[must_use]
    pub fn panel(&self) -> Option<&LayerPanel> {
        match &self.state {
            PanelState::Ready(panel) => Some(panel),
            _ => None,
        }
    }

    /// Reset to an empty panel, invalidating any request in flight.
    pub fn clear(&mut self) {
        self.generation += 1;
        self.state = PanelState::Empty;
        self.controls.clear();
    }

    /// Start loading the panel for `layer`.
    ///
    /// The returned request must be handed back to [`Self::complete`] along
    /// with the fetch result.
    pub fn begin(&mut self, layer: &str) -> PanelRequest {
        self.generation += 1;
        self.state = PanelState::Loading {
            layer: layer.to_string(),
        };
        self.controls.clear();

        PanelRequest {
            token: self.generation,
            layer: layer.to_string(),
        }
    }

    #[must_use]
    pub fn is_current(&self, request: &PanelRequest) -> bool {
        request.token == self.generation
    }

    /// Apply the result of a metadata request.
    ///
    /// Returns `false` when the request has been superseded and the result
    /// was dropped.
    pub fn complete(
        &mut self,
        request: &PanelRequest,
        result: Result<LayerMetadata, ContextError>,
    ) -> bool {
        if !self.is_current(request) {
            debug!("Discarding stale metadata for layer '{}'", request.layer);
            return false;
        }

        match result {
            Ok(metadata) => self.build(&request.layer, &metadata),
            Err(e) => {
                warn!("Failed to load details for layer '{}': {}", request.layer, e);
                self.controls.clear();
                self.state = PanelState::Failed {
                    layer: request.layer.clone(),
                    message: e.to_string(),
                };
            }
        }

        true
    }

    /// Replace the panel with one built from `metadata`.
    pub fn build(&mut self, layer: &str, metadata: &LayerMetadata) {
        let (panel, controls) = LayerPanel::from_metadata(layer, metadata);
        debug!(
            "Built panel for layer '{}' with {} dimension(s)",
            layer,
            panel.rows.len()
        );
        self.controls = controls;
        self.state = PanelState::Ready(panel);
    }

    /// Dimension driven by a selector control
    #[must_use]
    pub fn dimension_for(&self, control: &ControlId) -> Option<&str> {
        self.controls.get(control).map(String::as_str)
    }

    /// Select option `index` of a selector.
    ///
    /// Returns the change to apply to the map, or `None` when the control is
    /// unknown, the index is out of range, or the option was already selected.
    pub fn select(&mut self, control: &ControlId, index: usize) -> Option<DimensionChange> {
        let dimension = self.controls.get(control)?.clone();
        let PanelState::Ready(panel) = &mut self.state else {
            return None;
        };
        let row = panel.rows.iter_mut().find(|r| r.control == *control)?;
        let value = row.options.get(index)?.clone();

        if row.selected == index {
            return None;
        }
        row.selected = index;

        Some(DimensionChange { dimension, value })
    }

    /// Currently selected value of every dimension, in panel order.
    #[must_use]
    pub fn selected_dimensions(&self) -> Vec<(String, String)> {
        let Some(panel) = self.panel() else {
            return Vec::new();
        };

        panel
            .rows
            .iter()
            .filter_map(|row| {
                let dimension = self.controls.get(&row.control)?;
                Some((dimension.clone(), row.selected_value()?.to_string()))
            })
            .collect()
    }
}

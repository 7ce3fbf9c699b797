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

//! Layer and dimension handling for WMS map clients.
//!
//! This library holds the UI-independent half of a WMS layer browser:
//!
//! - **Protocol layer**: WMS parameter sets, GetMap URLs, dimension
//!   parameter escaping and tile bounding boxes
//! - **Context layer**: layer metadata from the JSON `GetContext` operation
//! - **Layer management**: the single current data layer on a map and the
//!   dimension values merged into it
//! - **Panel**: the details panel model built from layer metadata
//! - **Download**: the coverage download extension point
//!
//! The map itself is abstracted behind [`MapSurface`], so everything here
//! can be driven by any tile widget, or by a test double.
//!
//! # Example
//!
//! ```
//! use wms_context::{parse_context, PanelBuilder};
//!
//! let body = r#"{"vmap0": {
//!     "title": "Vector Map 0",
//!     "abstract": "Base data",
//!     "dimensions": {"time": {"extent": ["2000", "2001", "2002"], "units": "year"}}
//! }}"#;
//!
//! let mut panels = PanelBuilder::new();
//! let request = panels.begin("vmap0");
//! panels.complete(&request, parse_context(body, "vmap0"));
//!
//! let panel = panels.panel().unwrap();
//! assert_eq!(panel.title_line, "Title: Vector Map 0");
//! assert_eq!(panel.rows[0].options, ["2000", "2001", "2002"]);
//! ```

pub mod context;
pub mod download;
pub mod layers;
pub mod panel;
pub mod protocol;

pub use context::{parse_context, ContextError, ContextFetcher, Dimension, ExtentValue, LayerMetadata};
pub use download::{DownloadContext, DownloadHandler, LogOnlyDownload};
pub use layers::{LayerId, LayerManager, LayerSources, MapSurface};
pub use panel::{
    ControlId, DimensionChange, DimensionRow, LayerPanel, PanelBuilder, PanelRequest, PanelState,
};
pub use protocol::{dimension_param, tile_bbox, Extent, ProtocolError, WmsLayer, WmsParams};

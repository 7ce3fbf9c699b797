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

//! WMS request plumbing.
//!
//! This module covers everything needed to ask a WMS server for imagery:
//! parameter sets with the case-insensitive merge semantics map clients
//! expect, GetMap URL construction, dimension parameter escaping, and the
//! extent/tile geometry used to compute request bounding boxes.

mod params;
mod projection;

pub use params::{dimension_param, WmsLayer, WmsParams, IMAGE_PNG};
pub use projection::{tile_bbox, Extent, WebMercator, EPSG_3857, EPSG_4326};

use thiserror::Error;

/// Errors that can occur while building WMS requests.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("unsupported spatial reference system: {0}")]
    UnsupportedSrs(String),

    #[error("invalid service URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

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

//! Layer metadata from the WMS `GetContext` operation.
//!
//! The JSON flavour of `GetContext` returns an object keyed by layer name,
//! each entry carrying a title, an abstract and the layer's dimensions with
//! their discrete extents and units.

mod fetch;
mod metadata;

pub use fetch::ContextFetcher;
pub use metadata::{parse_context, Dimension, ExtentValue, LayerMetadata};

use thiserror::Error;

/// Errors that can occur while fetching or decoding layer metadata.
#[derive(Debug, Error)]
pub enum ContextError {
    #[error("GetContext request for layer '{layer}' failed: {source}")]
    Request {
        layer: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("GetContext for layer '{layer}' returned HTTP {status}")]
    Status {
        layer: String,
        status: reqwest::StatusCode,
    },

    #[error("malformed GetContext response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("GetContext response has no entry for layer '{0}'")]
    MissingLayer(String),
}

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

use log::debug;

use super::metadata::{parse_context, LayerMetadata};
use super::ContextError;

/// Fetches layer metadata from a WMS endpoint's `GetContext` operation.
///
/// Every call goes to the server; nothing is cached, so switching back to
/// a layer always picks up its current dimensions.
#[derive(Debug, Clone)]
pub struct ContextFetcher {
    client: reqwest::Client,
    url: String,
}

impl ContextFetcher {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), url)
    }

    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Query parameters of a GetContext request for `layer`
    #[must_use]
    pub fn query(layer: &str) -> [(&'static str, &str); 3] {
        [
            ("layers", layer),
            ("request", "GetContext"),
            ("format", "application/json"),
        ]
    }

    /// Fetch and decode the metadata for a single layer.
    pub async fn fetch(&self, layer: &str) -> Result<LayerMetadata, ContextError> {
        debug!("Requesting GetContext for layer '{}' from {}", layer, self.url);

        let response = self
            .client
            .get(&self.url)
            .query(&Self::query(layer))
            .send()
            .await
            .map_err(|source| ContextError::Request {
                layer: layer.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ContextError::Status {
                layer: layer.to_string(),
                status,
            });
        }

        let body = response.text().await.map_err(|source| ContextError::Request {
            layer: layer.to_string(),
            source,
        })?;

        parse_context(&body, layer)
    }
}

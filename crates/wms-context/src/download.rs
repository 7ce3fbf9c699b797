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

//! Coverage download trigger.
//!
//! Downloads are meant to become WCS `GetCoverage` requests built from the
//! current layer, map extent and dimension selection. Only the logging
//! handler exists so far; a real request builder plugs in through
//! [`DownloadHandler`].

use log::info;

use crate::protocol::Extent;

/// Map state at the moment the download button was pressed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DownloadContext {
    /// Name of the current data layer
    pub layer_name: Option<String>,

    /// Visible map extent
    pub extent: Option<Extent>,

    /// Selected dimension values, in panel order
    pub dimensions: Vec<(String, String)>,
}

pub trait DownloadHandler {
    fn trigger(&self, context: &DownloadContext);
}

/// Handler that only reports what would be requested.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogOnlyDownload;

impl LogOnlyDownload {
    #[must_use]
    pub fn messages(context: &DownloadContext) -> Vec<String> {
        let extent = context
            .extent
            .map_or_else(|| "unknown".to_string(), |e| e.to_string());

        vec![
            "making WCS request".to_string(),
            format!(
                "layer name: {}",
                context.layer_name.as_deref().unwrap_or("<none>")
            ),
            format!("map extent: {extent}"),
        ]
    }
}

impl DownloadHandler for LogOnlyDownload {
    fn trigger(&self, context: &DownloadContext) {
        for message in Self::messages(context) {
            info!("{}", message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_only_messages() {
        let context = DownloadContext {
            layer_name: Some("vmap0".to_string()),
            extent: Some(Extent::new(-10.0, 40.0, 5.5, 60.0)),
            dimensions: vec![("time".to_string(), "2001".to_string())],
        };

        assert_eq!(
            LogOnlyDownload::messages(&context),
            vec![
                "making WCS request",
                "layer name: vmap0",
                "map extent: -10,40,5.5,60",
            ]
        );
    }

    #[test]
    fn test_log_only_messages_without_map_state() {
        let messages = LogOnlyDownload::messages(&DownloadContext::default());
        assert_eq!(messages[1], "layer name: <none>");
        assert_eq!(messages[2], "map extent: unknown");
    }
}

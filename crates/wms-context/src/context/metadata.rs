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

use std::collections::HashMap;
use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

use super::ContextError;

/// Descriptive metadata for a single layer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LayerMetadata {
    #[serde(default)]
    pub title: String,

    #[serde(rename = "abstract", default)]
    pub abstract_text: String,

    /// Dimensions in the order the server listed them
    #[serde(default, deserialize_with = "ordered_dimensions")]
    pub dimensions: Vec<(String, Dimension)>,
}

impl LayerMetadata {
    #[must_use]
    pub fn dimension(&self, name: &str) -> Option<&Dimension> {
        self.dimensions
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, d)| d)
    }
}

/// A layer dimension (time, elevation, ...) with its discrete values.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Dimension {
    #[serde(default)]
    pub extent: Vec<ExtentValue>,

    #[serde(default)]
    pub units: Option<String>,
}

impl Dimension {
    #[must_use]
    pub fn units(&self) -> &str {
        self.units.as_deref().unwrap_or_default()
    }
}

/// One entry of a dimension extent, kept as the server sent it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ExtentValue {
    Text(String),
    Number(serde_json::Number),
    Flag(bool),
}

impl fmt::Display for ExtentValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtentValue::Text(s) => f.write_str(s),
            ExtentValue::Number(n) => match n.as_f64() {
                // Whole floats render without a fraction: `1000.0` and `1e3` both as `1000`
                Some(v) if n.is_f64() && v.fract() == 0.0 && v.abs() < 1e21 => {
                    if v == 0.0 {
                        f.write_str("0")
                    } else {
                        write!(f, "{v}")
                    }
                }
                _ => write!(f, "{n}"),
            },
            ExtentValue::Flag(b) => write!(f, "{b}"),
        }
    }
}

// serde_json's own map type sorts keys unless `preserve_order` is enabled,
// so dimensions are collected straight off the parser.
fn ordered_dimensions<'de, D>(deserializer: D) -> Result<Vec<(String, Dimension)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct DimensionsVisitor;

    impl<'de> Visitor<'de> for DimensionsVisitor {
        type Value = Vec<(String, Dimension)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of dimension names to dimensions")
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut dimensions: Vec<(String, Dimension)> =
                Vec::with_capacity(access.size_hint().unwrap_or(0));

            while let Some((name, dimension)) = access.next_entry::<String, Dimension>()? {
                // A repeated key replaces the earlier value but keeps its slot
                if let Some(slot) = dimensions.iter_mut().find(|(n, _)| *n == name) {
                    slot.1 = dimension;
                } else {
                    dimensions.push((name, dimension));
                }
            }

            Ok(dimensions)
        }
    }

    deserializer.deserialize_any(DimensionsVisitor)
}

/// Decode a `GetContext` JSON body and pick out the entry for `layer`.
pub fn parse_context(body: &str, layer: &str) -> Result<LayerMetadata, ContextError> {
    let mut layers: HashMap<String, LayerMetadata> = serde_json::from_str(body)?;
    layers
        .remove(layer)
        .ok_or_else(|| ContextError::MissingLayer(layer.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const VMAP0: &str = r#"{
        "vmap0": {
            "title": "Vector Map 0",
            "abstract": "Base data",
            "dimensions": {
                "time": { "extent": ["2000", "2001", "2002"], "units": "year" }
            }
        }
    }"#;

    #[test]
    fn test_parse_context() {
        let metadata = parse_context(VMAP0, "vmap0").unwrap();

        assert_eq!(metadata.title, "Vector Map 0");
        assert_eq!(metadata.abstract_text, "Base data");
        assert_eq!(metadata.dimensions.len(), 1);

        let time = metadata.dimension("time").unwrap();
        let values: Vec<String> = time.extent.iter().map(ToString::to_string).collect();
        assert_eq!(values, vec!["2000", "2001", "2002"]);
        assert_eq!(time.units(), "year");
    }

    #[test]
    fn test_dimension_order_follows_document() {
        let body = r#"{"l": {"title": "t", "abstract": "a", "dimensions": {
            "time": {"extent": ["b", "a", "b"], "units": "iso8601"},
            "elevation": {"extent": [1000, 850.5], "units": "hPa"},
            "ensemble": {"extent": [true], "units": ""}
        }}}"#;

        let metadata = parse_context(body, "l").unwrap();
        let names: Vec<&str> = metadata.dimensions.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["time", "elevation", "ensemble"]);

        // no sorting, no dedup, raw rendering of numbers
        let time: Vec<String> = metadata.dimensions[0].1.extent.iter().map(ToString::to_string).collect();
        assert_eq!(time, vec!["b", "a", "b"]);
        let elevation: Vec<String> = metadata.dimensions[1].1.extent.iter().map(ToString::to_string).collect();
        assert_eq!(elevation, vec!["1000", "850.5"]);
        assert_eq!(metadata.dimensions[2].1.extent[0].to_string(), "true");
    }

    #[test]
    fn test_whole_numbers_render_without_fraction() {
        let body = r#"{"l": {"title": "t", "dimensions": {
            "elevation": {"extent": [1000.0, 1e3, 850.5, -0.0, 42], "units": "hPa"}
        }}}"#;

        let metadata = parse_context(body, "l").unwrap();
        let values: Vec<String> = metadata.dimensions[0].1.extent.iter().map(ToString::to_string).collect();
        assert_eq!(values, vec!["1000", "1000", "850.5", "0", "42"]);
    }

    #[test]
    fn test_missing_title_still_parses() {
        let body = r#"{"l": {"abstract": "No title here", "dimensions": {"time": {"extent": ["2000"]}}}}"#;
        let metadata = parse_context(body, "l").unwrap();
        assert_eq!(metadata.title, "");
        assert_eq!(metadata.abstract_text, "No title here");
        assert_eq!(metadata.dimensions.len(), 1);
    }

    #[test]
    fn test_missing_optional_fields() {
        let body = r#"{"l": {"title": "Only a title", "dimensions": null}}"#;
        let metadata = parse_context(body, "l").unwrap();
        assert_eq!(metadata.abstract_text, "");
        assert!(metadata.dimensions.is_empty());

        let body = r#"{"l": {"title": "t", "dimensions": {"time": {"extent": ["x"]}}}}"#;
        let metadata = parse_context(body, "l").unwrap();
        assert_eq!(metadata.dimensions[0].1.units(), "");
    }

    #[test]
    fn test_missing_layer() {
        assert!(matches!(
            parse_context(VMAP0, "other"),
            Err(ContextError::MissingLayer(name)) if name == "other"
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            parse_context("<ServiceExceptionReport/>", "vmap0"),
            Err(ContextError::Json(_))
        ));
    }
}

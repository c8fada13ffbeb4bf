//! Point features built from tabular records

use geo_types::Point;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attribute value types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl AttributeValue {
    /// Infer a typed value from a raw CSV cell
    pub fn from_cell(cell: &str) -> Self {
        let trimmed = cell.trim();
        if crate::io::is_na(trimmed) {
            return AttributeValue::Null;
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return AttributeValue::Int(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            return AttributeValue::Float(f);
        }
        match trimmed {
            "True" | "true" | "TRUE" => AttributeValue::Bool(true),
            "False" | "false" | "FALSE" => AttributeValue::Bool(false),
            _ => AttributeValue::String(cell.to_string()),
        }
    }
}

/// A located record: one CSV row with usable coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    /// Row index in the source table
    pub index: usize,
    /// Position, x = longitude, y = latitude
    pub point: Point<f64>,
    /// Cell values keyed by column name
    pub properties: BTreeMap<String, AttributeValue>,
}

impl Feature {
    pub fn new(index: usize, point: Point<f64>) -> Self {
        Self {
            index,
            point,
            properties: BTreeMap::new(),
        }
    }

    pub fn latitude(&self) -> f64 {
        self.point.y()
    }

    pub fn longitude(&self) -> f64 {
        self.point.x()
    }

    /// Set an attribute
    pub fn set_property(&mut self, key: impl Into<String>, value: AttributeValue) {
        self.properties.insert(key.into(), value);
    }
}

/// Collection of features
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new() -> Self {
        Self { features: Vec::new() }
    }

    pub fn push(&mut self, feature: Feature) {
        self.features.push(feature);
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter()
    }
}

impl FromIterator<Feature> for FeatureCollection {
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        Self {
            features: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for FeatureCollection {
    type Item = Feature;
    type IntoIter = std::vec::IntoIter<Feature>;

    fn into_iter(self) -> Self::IntoIter {
        self.features.into_iter()
    }
}

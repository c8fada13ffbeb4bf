//! GeoJSON FeatureCollection output

use crate::error::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use verdant_core::vector::{AttributeValue, FeatureCollection};

#[derive(Serialize)]
struct GeoJsonCollection<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    features: Vec<GeoJsonFeature<'a>>,
}

#[derive(Serialize)]
struct GeoJsonFeature<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    id: usize,
    geometry: GeoJsonPoint,
    properties: &'a BTreeMap<String, AttributeValue>,
}

#[derive(Serialize)]
struct GeoJsonPoint {
    #[serde(rename = "type")]
    kind: &'static str,
    /// [longitude, latitude]
    coordinates: [f64; 2],
}

/// Serialize point features as a GeoJSON FeatureCollection.
///
/// Feature ids are the source row indices; NaN property values are
/// written as `null`.
pub fn to_geojson(features: &FeatureCollection) -> Result<serde_json::Value> {
    let collection = GeoJsonCollection {
        kind: "FeatureCollection",
        features: features
            .iter()
            .map(|f| GeoJsonFeature {
                kind: "Feature",
                id: f.index,
                geometry: GeoJsonPoint {
                    kind: "Point",
                    coordinates: [f.longitude(), f.latitude()],
                },
                properties: &f.properties,
            })
            .collect(),
    };
    Ok(serde_json::to_value(collection)?)
}

/// Write point features to a pretty-printed GeoJSON file
pub fn write_geojson<P: AsRef<Path>>(features: &FeatureCollection, path: P) -> Result<()> {
    let value = to_geojson(features)?;
    let file = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(file, &value)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use verdant_core::io::read_point_table;

    #[test]
    fn features_become_points() {
        let fc = read_point_table("Name,Latitude,Longitude\nLake,-33.5,-70.6\nRiver,,1\n".as_bytes())
            .unwrap()
            .to_features("Latitude", "Longitude")
            .unwrap();

        let json = to_geojson(&fc).unwrap();
        assert_eq!(json["type"], "FeatureCollection");
        assert_eq!(json["features"].as_array().unwrap().len(), 1);

        let feature = &json["features"][0];
        assert_eq!(feature["id"], 0);
        assert_eq!(feature["geometry"]["coordinates"][0], -70.6);
        assert_eq!(feature["geometry"]["coordinates"][1], -33.5);
        assert_eq!(feature["properties"]["Name"], "Lake");
    }
}

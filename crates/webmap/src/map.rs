//! Leaflet page generation

use crate::error::{Result, WebMapError};
use serde::Serialize;
use std::path::Path;
use verdant_algorithms::vector::centroid;
use verdant_core::vector::FeatureCollection;

const LEAFLET_VERSION: &str = "1.9.4";

/// Parameters for the generated map page
#[derive(Debug, Clone)]
pub struct MapParams {
    /// Initial zoom level. Default: 10
    pub zoom: u8,
    /// Slippy tile URL template
    pub tile_url: String,
    pub attribution: String,
    /// Page title
    pub title: String,
}

impl Default for MapParams {
    fn default() -> Self {
        Self {
            zoom: 10,
            tile_url: "https://tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            attribution: "&copy; OpenStreetMap contributors".to_string(),
            title: "Map of Locations".to_string(),
        }
    }
}

/// A map pin with its popup text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub lat: f64,
    pub lon: f64,
    pub popup: String,
}

/// A point map ready to be rendered
#[derive(Debug, Clone)]
pub struct WebMap {
    /// Initial view center (latitude, longitude)
    pub center: (f64, f64),
    pub markers: Vec<Marker>,
    pub params: MapParams,
}

impl WebMap {
    /// Center the view on the mean position and add one marker per
    /// feature, labeled with its source row index.
    pub fn from_features(features: &FeatureCollection, params: MapParams) -> Result<Self> {
        let center = centroid(features).ok_or(WebMapError::NoPoints)?;
        let markers = features
            .iter()
            .map(|f| Marker {
                lat: f.latitude(),
                lon: f.longitude(),
                popup: format!("Row {}", f.index),
            })
            .collect();

        Ok(Self {
            center,
            markers,
            params,
        })
    }

    /// Render a standalone HTML page
    pub fn to_html(&self) -> Result<String> {
        let markers = serde_json::to_string(&self.markers)?.replace("</", "<\\/");
        let tile_url = serde_json::to_string(&self.params.tile_url)?;
        let attribution = serde_json::to_string(&self.params.attribution)?;
        let (lat, lon) = self.center;

        Ok(format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8"/>
<meta name="viewport" content="width=device-width, initial-scale=1.0"/>
<title>{title}</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@{v}/dist/leaflet.css"/>
<script src="https://unpkg.com/leaflet@{v}/dist/leaflet.js"></script>
<style>html, body, #map {{ height: 100%; margin: 0; }}</style>
</head>
<body>
<div id="map"></div>
<script>
var map = L.map("map").setView([{lat}, {lon}], {zoom});
L.tileLayer({tile_url}, {{ attribution: {attribution}, maxZoom: 19 }}).addTo(map);
var markers = {markers};
markers.forEach(function (m) {{
  L.marker([m.lat, m.lon]).bindPopup(m.popup).addTo(map);
}});
</script>
</body>
</html>
"#,
            title = escape_html(&self.params.title),
            v = LEAFLET_VERSION,
            lat = lat,
            lon = lon,
            zoom = self.params.zoom,
            tile_url = tile_url,
            attribution = attribution,
            markers = markers,
        ))
    }

    /// Write the HTML page to a file
    pub fn write_html<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_html()?)?;
        Ok(())
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

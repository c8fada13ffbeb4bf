//! Point-feature summaries used to frame a map view

use geo::{BoundingRect, Centroid, MultiPoint, Point};
use verdant_core::vector::FeatureCollection;

/// Axis-aligned extent in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

fn multi_point(features: &FeatureCollection) -> MultiPoint<f64> {
    features.iter().map(|f| f.point).collect()
}

/// Mean position of the features, as (latitude, longitude).
///
/// `None` when the collection is empty.
pub fn centroid(features: &FeatureCollection) -> Option<(f64, f64)> {
    let center: Point<f64> = multi_point(features).centroid()?;
    Some((center.y(), center.x()))
}

/// Extent of the features, `None` when the collection is empty
pub fn bounding_box(features: &FeatureCollection) -> Option<BoundingBox> {
    let rect = multi_point(features).bounding_rect()?;
    Some(BoundingBox {
        min_lon: rect.min().x,
        min_lat: rect.min().y,
        max_lon: rect.max().x,
        max_lat: rect.max().y,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use verdant_core::io::read_point_table;

    fn features(csv: &str) -> FeatureCollection {
        read_point_table(csv.as_bytes())
            .unwrap()
            .to_features("Latitude", "Longitude")
            .unwrap()
    }

    #[test]
    fn centroid_is_mean_of_kept_points() {
        let fc = features("Latitude,Longitude\n10,20\n,50\n20,40\n30,NaN\n");
        let (lat, lon) = centroid(&fc).unwrap();
        assert_relative_eq!(lat, 15.0);
        assert_relative_eq!(lon, 30.0);
    }

    #[test]
    fn empty_collection_has_no_centroid() {
        let fc = features("Latitude,Longitude\n,\n");
        assert!(fc.is_empty());
        assert!(centroid(&fc).is_none());
        assert!(bounding_box(&fc).is_none());
    }

    #[test]
    fn extent_covers_all_points() {
        let fc = features("Latitude,Longitude\n-33.4,-70.6\n-33.0,-71.6\n-36.8,-73.0\n");
        let bbox = bounding_box(&fc).unwrap();
        assert_relative_eq!(bbox.min_lat, -36.8);
        assert_relative_eq!(bbox.max_lat, -33.0);
        assert_relative_eq!(bbox.min_lon, -73.0);
        assert_relative_eq!(bbox.max_lon, -70.6);
    }
}

//! Geographic primitives and GeoJSON wire types
//!
//! ## Responsibilities
//!
//! - Longitude/latitude point type used across the console
//! - GeoJSON geometry / feature / feature-collection payload shapes
//! - Bounds accumulation for viewport fitting

use serde::{Deserialize, Serialize};

/// A geographic point, longitude first (GeoJSON axis order)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lng: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

impl From<GeoPoint> for Geometry {
    fn from(point: GeoPoint) -> Self {
        Geometry::Point {
            coordinates: [point.lng, point.lat],
        }
    }
}

// On the wire a point is always a GeoJSON Point object.
impl Serialize for GeoPoint {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        Geometry::from(*self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for GeoPoint {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let geometry = Geometry::deserialize(deserializer)?;
        geometry
            .as_point()
            .ok_or_else(|| serde::de::Error::custom("expected a Point geometry"))
    }
}

/// GeoJSON geometry
///
/// Only the variants the drawing toolbar can produce are modelled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: [f64; 2] },
    LineString { coordinates: Vec<[f64; 2]> },
    Polygon { coordinates: Vec<Vec<[f64; 2]>> },
}

impl Geometry {
    /// The point for point geometries, none otherwise
    pub fn as_point(&self) -> Option<GeoPoint> {
        match self {
            Geometry::Point { coordinates } => {
                Some(GeoPoint::new(coordinates[0], coordinates[1]))
            }
            _ => None,
        }
    }

    /// Every coordinate pair in the geometry, in order
    pub fn coordinates(&self) -> Vec<GeoPoint> {
        match self {
            Geometry::Point { coordinates } => {
                vec![GeoPoint::new(coordinates[0], coordinates[1])]
            }
            Geometry::LineString { coordinates } => coordinates
                .iter()
                .map(|c| GeoPoint::new(c[0], c[1]))
                .collect(),
            Geometry::Polygon { coordinates } => coordinates
                .iter()
                .flatten()
                .map(|c| GeoPoint::new(c[0], c[1]))
                .collect(),
        }
    }
}

/// GeoJSON feature with typed properties
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feature<P> {
    #[serde(rename = "type")]
    pub feature_type: String,
    pub geometry: Geometry,
    pub properties: P,
}

/// GeoJSON feature collection with typed properties
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureCollection<P> {
    #[serde(rename = "type")]
    pub collection_type: String,
    #[serde(default)]
    pub features: Vec<Feature<P>>,
}

/// Axis-aligned geographic bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBounds {
    pub min_lng: f64,
    pub min_lat: f64,
    pub max_lng: f64,
    pub max_lat: f64,
}

impl GeoBounds {
    /// Bounds covering a single point
    pub fn of(point: GeoPoint) -> Self {
        Self {
            min_lng: point.lng,
            min_lat: point.lat,
            max_lng: point.lng,
            max_lat: point.lat,
        }
    }

    /// Grow the bounds to include `point`
    pub fn extend(&mut self, point: GeoPoint) {
        self.min_lng = self.min_lng.min(point.lng);
        self.min_lat = self.min_lat.min(point.lat);
        self.max_lng = self.max_lng.max(point.lng);
        self.max_lat = self.max_lat.max(point.lat);
    }

    /// Bounds covering every coordinate of `geometries`, none when empty
    pub fn covering<'a, I>(geometries: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Geometry>,
    {
        let mut bounds: Option<GeoBounds> = None;
        for geometry in geometries {
            for point in geometry.coordinates() {
                match bounds.as_mut() {
                    Some(b) => b.extend(point),
                    None => bounds = Some(GeoBounds::of(point)),
                }
            }
        }
        bounds
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.min_lng + self.max_lng) / 2.0,
            (self.min_lat + self.max_lat) / 2.0,
        )
    }

    /// Largest axis span in degrees
    pub fn span(&self) -> f64 {
        (self.max_lng - self.min_lng).max(self.max_lat - self.min_lat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_geometry_roundtrip() {
        let json = r#"{"type": "Point", "coordinates": [10.2, 36.8]}"#;
        let geometry: Geometry = serde_json::from_str(json).unwrap();
        assert_eq!(geometry.as_point(), Some(GeoPoint::new(10.2, 36.8)));

        let encoded = serde_json::to_value(&geometry).unwrap();
        assert_eq!(encoded["type"], "Point");
        assert_eq!(encoded["coordinates"][0], 10.2);
        assert_eq!(encoded["coordinates"][1], 36.8);
    }

    #[test]
    fn test_line_string_is_not_a_point() {
        let geometry = Geometry::LineString {
            coordinates: vec![[0.0, 0.0], [1.0, 1.0]],
        };
        assert!(geometry.as_point().is_none());
        assert_eq!(geometry.coordinates().len(), 2);
    }

    #[test]
    fn test_bounds_cover_all_coordinates() {
        let geometries = vec![
            Geometry::Point {
                coordinates: [10.0, 36.0],
            },
            Geometry::LineString {
                coordinates: vec![[9.5, 35.0], [11.0, 37.5]],
            },
        ];
        let bounds = GeoBounds::covering(&geometries).unwrap();
        assert_eq!(bounds.min_lng, 9.5);
        assert_eq!(bounds.max_lng, 11.0);
        assert_eq!(bounds.min_lat, 35.0);
        assert_eq!(bounds.max_lat, 37.5);
        assert_eq!(bounds.center(), GeoPoint::new(10.25, 36.25));
    }

    #[test]
    fn test_bounds_of_nothing_is_none() {
        assert!(GeoBounds::covering(&[]).is_none());
    }

    #[test]
    fn test_geo_point_serializes_as_geojson_point() {
        let point = GeoPoint::new(10.2, 36.8);
        let encoded = serde_json::to_value(point).unwrap();
        assert_eq!(
            encoded,
            serde_json::json!({"type": "Point", "coordinates": [10.2, 36.8]})
        );

        let decoded: GeoPoint = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, point);
    }
}

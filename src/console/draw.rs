//! Drawing toolbar and gesture model
//!
//! The toolbar exposes a closed set of tools, each with a begin/complete
//! contract. No map-library internals leak through here; a completed
//! gesture is just a tool tag plus the GeoJSON geometry it produced.

use crate::geometry::{GeoPoint, Geometry};

/// The closed set of drawing tools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawTool {
    Polyline,
    Polygon,
    Rectangle,
    Circle,
    /// Freehand point marker (disabled by default)
    PointMarker,
    /// Camera placement gesture
    CameraPlacement,
}

/// Toolbar configuration: which tools the user can pick up
#[derive(Debug, Clone)]
pub struct DrawToolbar {
    pub polyline: bool,
    pub polygon: bool,
    pub rectangle: bool,
    pub circle: bool,
    pub point_marker: bool,
    pub camera_placement: bool,
}

impl Default for DrawToolbar {
    fn default() -> Self {
        Self {
            polyline: true,
            polygon: true,
            rectangle: true,
            circle: true,
            point_marker: false,
            camera_placement: true,
        }
    }
}

impl DrawToolbar {
    pub fn is_enabled(&self, tool: DrawTool) -> bool {
        match tool {
            DrawTool::Polyline => self.polyline,
            DrawTool::Polygon => self.polygon,
            DrawTool::Rectangle => self.rectangle,
            DrawTool::Circle => self.circle,
            DrawTool::PointMarker => self.point_marker,
            DrawTool::CameraPlacement => self.camera_placement,
        }
    }

    /// Begin a gesture with `tool`, when the toolbar has it enabled
    pub fn begin(&self, tool: DrawTool) -> Option<DrawGesture> {
        if !self.is_enabled(tool) {
            tracing::debug!(tool = ?tool, "Drawing tool is disabled");
            return None;
        }
        Some(DrawGesture {
            tool,
            points: Vec::new(),
        })
    }
}

/// An in-progress gesture accumulating clicked points
#[derive(Debug, Clone)]
pub struct DrawGesture {
    tool: DrawTool,
    points: Vec<GeoPoint>,
}

impl DrawGesture {
    pub fn tool(&self) -> DrawTool {
        self.tool
    }

    pub fn add_point(&mut self, point: GeoPoint) {
        self.points.push(point);
    }

    /// Finish the gesture, producing its geometry.
    ///
    /// Returns none when too few points were collected for the tool.
    /// Point-producing tools (marker, camera, circle center) take the
    /// first click; rectangles span the first and last corner.
    pub fn complete(self) -> Option<DrawOutput> {
        let geometry = match self.tool {
            DrawTool::PointMarker | DrawTool::CameraPlacement | DrawTool::Circle => {
                let point = self.points.first()?;
                Geometry::Point {
                    coordinates: [point.lng, point.lat],
                }
            }
            DrawTool::Polyline => {
                if self.points.len() < 2 {
                    return None;
                }
                Geometry::LineString {
                    coordinates: self.points.iter().map(|p| [p.lng, p.lat]).collect(),
                }
            }
            DrawTool::Polygon => {
                if self.points.len() < 3 {
                    return None;
                }
                let mut ring: Vec<[f64; 2]> =
                    self.points.iter().map(|p| [p.lng, p.lat]).collect();
                ring.push(ring[0]);
                Geometry::Polygon {
                    coordinates: vec![ring],
                }
            }
            DrawTool::Rectangle => {
                if self.points.len() < 2 {
                    return None;
                }
                let a = self.points[0];
                let b = self.points[self.points.len() - 1];
                Geometry::Polygon {
                    coordinates: vec![vec![
                        [a.lng, a.lat],
                        [b.lng, a.lat],
                        [b.lng, b.lat],
                        [a.lng, b.lat],
                        [a.lng, a.lat],
                    ]],
                }
            }
        };

        Some(DrawOutput {
            tool: self.tool,
            geometry,
        })
    }
}

/// A completed drawing gesture
#[derive(Debug, Clone, PartialEq)]
pub struct DrawOutput {
    pub tool: DrawTool,
    pub geometry: Geometry,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_toolbar_disables_the_point_marker() {
        let toolbar = DrawToolbar::default();
        assert!(toolbar.is_enabled(DrawTool::Polyline));
        assert!(toolbar.is_enabled(DrawTool::CameraPlacement));
        assert!(!toolbar.is_enabled(DrawTool::PointMarker));
        assert!(toolbar.begin(DrawTool::PointMarker).is_none());
    }

    #[test]
    fn test_camera_placement_completes_on_one_click() {
        let toolbar = DrawToolbar::default();
        let mut gesture = toolbar.begin(DrawTool::CameraPlacement).unwrap();
        gesture.add_point(GeoPoint::new(10.2, 36.8));

        let output = gesture.complete().unwrap();
        assert_eq!(output.tool, DrawTool::CameraPlacement);
        assert_eq!(
            output.geometry.as_point(),
            Some(GeoPoint::new(10.2, 36.8))
        );
    }

    #[test]
    fn test_polygon_ring_is_closed() {
        let toolbar = DrawToolbar::default();
        let mut gesture = toolbar.begin(DrawTool::Polygon).unwrap();
        for point in [
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(1.0, 0.0),
            GeoPoint::new(1.0, 1.0),
        ] {
            gesture.add_point(point);
        }

        match gesture.complete().unwrap().geometry {
            Geometry::Polygon { coordinates } => {
                let ring = &coordinates[0];
                assert_eq!(ring.len(), 4);
                assert_eq!(ring.first(), ring.last());
            }
            other => panic!("unexpected geometry {:?}", other),
        }
    }

    #[test]
    fn test_rectangle_spans_opposite_corners() {
        let toolbar = DrawToolbar::default();
        let mut gesture = toolbar.begin(DrawTool::Rectangle).unwrap();
        gesture.add_point(GeoPoint::new(0.0, 0.0));
        gesture.add_point(GeoPoint::new(2.0, 1.0));

        match gesture.complete().unwrap().geometry {
            Geometry::Polygon { coordinates } => {
                assert_eq!(coordinates[0].len(), 5);
                assert!(coordinates[0].contains(&[2.0, 0.0]));
                assert!(coordinates[0].contains(&[0.0, 1.0]));
            }
            other => panic!("unexpected geometry {:?}", other),
        }
    }

    #[test]
    fn test_underdrawn_gestures_produce_nothing() {
        let toolbar = DrawToolbar::default();
        let mut gesture = toolbar.begin(DrawTool::Polyline).unwrap();
        gesture.add_point(GeoPoint::new(0.0, 0.0));
        assert!(gesture.complete().is_none());

        let gesture = toolbar.begin(DrawTool::CameraPlacement).unwrap();
        assert!(gesture.complete().is_none());
    }
}

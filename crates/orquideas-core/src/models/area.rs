use geo::{Area, BoundingRect, Contains, MultiPolygon, Point, Rect};

/// A protected area polygon with its identifying name.
///
/// Names are expected to be unique but nothing enforces it; aggregation merges
/// areas that share a name.
#[derive(Debug, Clone, PartialEq)]
pub struct ConservationArea {
    pub area_name: String,
    pub geometry: MultiPolygon<f64>,
}

impl ConservationArea {
    pub fn new(area_name: impl Into<String>, geometry: MultiPolygon<f64>) -> Self {
        Self { area_name: area_name.into(), geometry }
    }

    /// Strict containment: a point lying on the boundary is not inside
    pub fn contains_point(&self, point: &Point<f64>) -> bool {
        self.geometry.contains(point)
    }

    /// Planar area in squared CRS units (square degrees for WGS 84)
    pub fn planar_area(&self) -> f64 {
        self.geometry.unsigned_area()
    }

    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        self.geometry.bounding_rect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, MultiPolygon};

    fn square(min: f64, max: f64) -> ConservationArea {
        let poly = polygon![
            (x: min, y: min),
            (x: max, y: min),
            (x: max, y: max),
            (x: min, y: max),
            (x: min, y: min),
        ];
        ConservationArea::new("AC", MultiPolygon::new(vec![poly]))
    }

    #[test]
    fn test_interior_point_is_contained() {
        let area = square(0.0, 10.0);
        assert!(area.contains_point(&Point::new(5.0, 5.0)));
    }

    #[test]
    fn test_boundary_point_is_not_contained() {
        let area = square(0.0, 10.0);
        assert!(!area.contains_point(&Point::new(0.0, 5.0)));
        assert!(!area.contains_point(&Point::new(10.0, 10.0)));
    }

    #[test]
    fn test_planar_area() {
        let area = square(0.0, 10.0);
        assert!((area.planar_area() - 100.0).abs() < 1e-9);
    }
}

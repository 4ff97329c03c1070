//! Structural checks for conservation-area geometries

use geo::{Geometry, LineString, MultiPolygon, Polygon};

/// Validation result with details
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

/// Validation error with location details
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub location: String,
    pub reason: String,
}

impl ValidationResult {
    /// Create a valid result
    pub fn valid() -> Self {
        Self { is_valid: true, errors: Vec::new() }
    }

    /// Add an error to the result
    pub fn add_error(&mut self, location: String, reason: String) {
        self.is_valid = false;
        self.errors.push(ValidationError { location, reason });
    }

    /// Merge another result into this one
    fn absorb(&mut self, other: ValidationResult) {
        if !other.is_valid {
            self.is_valid = false;
        }
        self.errors.extend(other.errors);
    }

    /// All errors on one line
    pub fn summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| format!("{}: {}", e.location, e.reason))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Validate a geometry meant to be a conservation-area boundary
pub fn validate_area_geometry(geometry: &Geometry<f64>) -> ValidationResult {
    match geometry {
        Geometry::Polygon(poly) => validate_polygon(poly, "Polygon"),
        Geometry::MultiPolygon(mp) => validate_multipolygon(mp),
        other => {
            let mut result = ValidationResult::valid();
            result.add_error(
                geometry_kind(other).to_string(),
                "Expected Polygon or MultiPolygon".to_string(),
            );
            result
        }
    }
}

/// Normalize a polygonal geometry to a multipolygon; None for any other kind
pub fn into_multipolygon(geometry: Geometry<f64>) -> Option<MultiPolygon<f64>> {
    match geometry {
        Geometry::Polygon(poly) => Some(MultiPolygon::new(vec![poly])),
        Geometry::MultiPolygon(mp) => Some(mp),
        _ => None,
    }
}

fn validate_multipolygon(multipolygon: &MultiPolygon<f64>) -> ValidationResult {
    let mut result = ValidationResult::valid();

    if multipolygon.0.is_empty() {
        result.add_error("MultiPolygon".to_string(), "MultiPolygon has no parts".to_string());
        return result;
    }

    for (i, poly) in multipolygon.0.iter().enumerate() {
        result.absorb(validate_polygon(poly, &format!("MultiPolygon[{}]", i)));
    }

    result
}

fn validate_polygon(polygon: &Polygon<f64>, location: &str) -> ValidationResult {
    let mut result = ValidationResult::valid();

    validate_ring(polygon.exterior(), &format!("{} exterior", location), &mut result);
    for (i, interior) in polygon.interiors().iter().enumerate() {
        validate_ring(interior, &format!("{} interior[{}]", location, i), &mut result);
    }

    result
}

fn validate_ring(ring: &LineString<f64>, location: &str, result: &mut ValidationResult) {
    if ring.0.len() < 4 {
        result.add_error(
            location.to_string(),
            format!("Ring must have at least 4 positions, found {}", ring.0.len()),
        );
    }

    if let (Some(first), Some(last)) = (ring.0.first(), ring.0.last()) {
        if first != last {
            result.add_error(
                location.to_string(),
                "Ring must be closed (first position == last position)".to_string(),
            );
        }
    }

    if let Some(i) = ring.0.iter().position(|c| !c.x.is_finite() || !c.y.is_finite()) {
        result.add_error(format!("{}[{}]", location, i), "Coordinates must be finite".to_string());
    }
}

fn geometry_kind(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{line_string, polygon, Coord, Point};

    #[test]
    fn test_valid_polygon() {
        let poly = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 0.0)];
        let result = validate_area_geometry(&Geometry::Polygon(poly));
        assert!(result.is_valid, "{}", result.summary());
    }

    #[test]
    fn test_degenerate_ring() {
        // Polygon::new closes the ring, leaving three positions
        let poly = Polygon::new(line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0)], vec![]);
        let result = validate_area_geometry(&Geometry::Polygon(poly));

        assert!(!result.is_valid);
        assert!(result.summary().contains("at least 4 positions"));
    }

    #[test]
    fn test_non_finite_coordinates() {
        let poly = Polygon::new(
            LineString::from(vec![
                Coord { x: 0.0, y: 0.0 },
                Coord { x: f64::NAN, y: 0.0 },
                Coord { x: 1.0, y: 1.0 },
                Coord { x: 0.0, y: 0.0 },
            ]),
            vec![],
        );
        let result = validate_area_geometry(&Geometry::MultiPolygon(MultiPolygon::new(vec![poly])));

        assert!(!result.is_valid);
        assert_eq!(result.errors[0].location, "MultiPolygon[0] exterior[1]");
    }

    #[test]
    fn test_non_polygonal_geometry() {
        let result = validate_area_geometry(&Geometry::Point(Point::new(1.0, 2.0)));
        assert!(!result.is_valid);
        assert_eq!(result.errors[0].location, "Point");

        assert!(into_multipolygon(Geometry::Point(Point::new(1.0, 2.0))).is_none());
    }

    #[test]
    fn test_empty_multipolygon() {
        let result = validate_area_geometry(&Geometry::MultiPolygon(MultiPolygon::new(vec![])));
        assert!(!result.is_valid);
    }

    #[test]
    fn test_into_multipolygon_wraps_polygon() {
        let poly = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 0.0)];
        let mp = into_multipolygon(Geometry::Polygon(poly.clone())).unwrap();
        assert_eq!(mp.0, vec![poly]);
    }
}

//! Shapefile polygon layer reader
//!
//! Shapefiles consist of multiple component files (.shp, .shx, .dbf, .prj);
//! the first three must be present, the .prj carries the CRS.

use geo::{Coord, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon};
use shapefile::dbase::FieldValue;
use shapefile::{PolygonRing, Shape};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{OrquideaError, Result};
use crate::formats::validation::FormatValidator;
use crate::formats::{dataset_name, FormatDataset, FormatFeature, FormatValidation, PolygonReader};
use crate::models::{Crs, WGS84_EPSG};

const REQUIRED_COMPONENTS: [&str; 3] = ["shp", "shx", "dbf"];

/// Shapefile format reader
pub struct ShapefileReader;

impl PolygonReader for ShapefileReader {
    fn read(&self, path: &Path) -> Result<FormatDataset> {
        let base = shapefile_base(path)?;
        verify_components(path, &base)?;

        let crs = extract_crs(path, &base)?;

        let mut reader = shapefile::Reader::from_path(path).map_err(|e| OrquideaError::Load {
            path: path.to_path_buf(),
            reason: format!("Failed to open Shapefile: {}", e),
        })?;

        let mut features = Vec::new();
        for (idx, result) in reader.iter_shapes_and_records().enumerate() {
            let (shape, record) = result.map_err(|e| OrquideaError::Load {
                path: path.to_path_buf(),
                reason: format!("Failed to read feature {}: {}", idx, e),
            })?;

            let mut properties = HashMap::new();
            for (name, value) in record {
                properties.insert(name, convert_dbase_value(value));
            }

            features.push(FormatFeature {
                id: idx.to_string(),
                geometry: convert_shape(shape),
                defect: None,
                properties,
            });
        }

        tracing::debug!("Read {} shapes from {}", features.len(), path.display());

        Ok(FormatDataset {
            name: dataset_name(path),
            format_name: "Shapefile".to_string(),
            crs,
            features,
        })
    }

    fn supported_extensions(&self) -> &[&str] {
        &["shp"]
    }

    fn format_name(&self) -> &str {
        "Shapefile"
    }

    fn validate(&self, path: &Path) -> Result<FormatValidation> {
        let validation = FormatValidator::validate_file_exists(path);
        if !validation.is_valid() {
            return Ok(validation);
        }

        let base = shapefile_base(path)?;
        let components =
            FormatValidator::validate_component_files(&base, &REQUIRED_COMPONENTS, &["prj"]);

        Ok(FormatValidator::merge_validations(vec![validation, components]))
    }
}

/// Path of the layer without extension
fn shapefile_base(path: &Path) -> Result<PathBuf> {
    let is_shp = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("shp"))
        .unwrap_or(false);

    if !is_shp {
        return Err(OrquideaError::Load {
            path: path.to_path_buf(),
            reason: "Not a Shapefile (.shp)".to_string(),
        });
    }

    Ok(path.with_extension(""))
}

fn verify_components(path: &Path, base: &Path) -> Result<()> {
    let missing: Vec<String> = REQUIRED_COMPONENTS
        .iter()
        .filter(|ext| !base.with_extension(ext).exists())
        .map(|ext| format!(".{}", ext))
        .collect();

    if !missing.is_empty() {
        return Err(OrquideaError::Load {
            path: path.to_path_buf(),
            reason: format!("Missing required component files: {}", missing.join(", ")),
        });
    }

    Ok(())
}

/// CRS from the .prj sidecar; a layer without one is taken as WGS 84
fn extract_crs(path: &Path, base: &Path) -> Result<Crs> {
    let prj_path = base.with_extension("prj");
    if !prj_path.exists() {
        tracing::warn!("{} has no .prj file, assuming EPSG:4326", path.display());
        return Ok(Crs::wgs84());
    }

    let prj = fs::read_to_string(&prj_path).map_err(|e| OrquideaError::Load {
        path: prj_path.clone(),
        reason: format!("Failed to read .prj file: {}", e),
    })?;

    match parse_epsg_from_prj(&prj) {
        Some(epsg) => Ok(Crs::from_epsg(epsg)),
        None if prj.trim_start().starts_with("PROJCS") => Err(OrquideaError::CrsMismatch {
            dataset_crs: prj.chars().take(60).collect(),
            target_crs: Crs::wgs84().to_string(),
            reason: "unrecognized projected CRS in .prj".to_string(),
        }),
        None => {
            tracing::warn!(
                "Could not identify the geographic CRS in {}, assuming EPSG:4326",
                prj_path.display()
            );
            Ok(Crs::wgs84())
        }
    }
}

/// Identify the EPSG code of a .prj WKT string.
///
/// OGC WKT carries an AUTHORITY clause; ESRI WKT only names the system, so the
/// names used by Costa Rican and web layers are matched as well.
fn parse_epsg_from_prj(wkt: &str) -> Option<u32> {
    // The outermost AUTHORITY clause closes last
    if let Some(start) = wkt.rfind("AUTHORITY[\"EPSG\",") {
        let digits: String = wkt[start + 17..]
            .chars()
            .skip_while(|c| !c.is_ascii_digit())
            .take_while(|c| c.is_ascii_digit())
            .collect();
        if let Ok(code) = digits.parse::<u32>() {
            return Some(code);
        }
    }

    if let Some(start) = wkt.find("EPSG:") {
        let digits: String =
            wkt[start + 5..].chars().take_while(|c| c.is_ascii_digit()).collect();
        if let Ok(code) = digits.parse::<u32>() {
            return Some(code);
        }
    }

    let upper = wkt.to_ascii_uppercase();
    if upper.contains("CRTM05") {
        Some(5367)
    } else if upper.contains("WEB_MERCATOR") || upper.contains("PSEUDO-MERCATOR") {
        Some(3857)
    } else if upper.starts_with("GEOGCS") && upper.contains("WGS_1984") {
        Some(WGS84_EPSG)
    } else {
        None
    }
}

/// Convert a shape to a geo geometry; null shapes and multipatches have none
fn convert_shape(shape: Shape) -> Option<geo::Geometry<f64>> {
    let xy = |x: f64, y: f64| Coord { x, y };

    match shape {
        Shape::NullShape | Shape::Multipatch(_) => None,
        Shape::Point(p) => Some(Point::new(p.x, p.y).into()),
        Shape::PointM(p) => Some(Point::new(p.x, p.y).into()),
        Shape::PointZ(p) => Some(Point::new(p.x, p.y).into()),
        Shape::Multipoint(mp) => {
            Some(MultiPoint::from(mp.points().iter().map(|p| Point::new(p.x, p.y)).collect::<Vec<_>>()).into())
        }
        Shape::MultipointM(mp) => {
            Some(MultiPoint::from(mp.points().iter().map(|p| Point::new(p.x, p.y)).collect::<Vec<_>>()).into())
        }
        Shape::MultipointZ(mp) => {
            Some(MultiPoint::from(mp.points().iter().map(|p| Point::new(p.x, p.y)).collect::<Vec<_>>()).into())
        }
        Shape::Polyline(line) => Some(
            MultiLineString::new(
                line.parts()
                    .iter()
                    .map(|part| LineString::new(part.iter().map(|p| xy(p.x, p.y)).collect()))
                    .collect(),
            )
            .into(),
        ),
        Shape::PolylineM(line) => Some(
            MultiLineString::new(
                line.parts()
                    .iter()
                    .map(|part| LineString::new(part.iter().map(|p| xy(p.x, p.y)).collect()))
                    .collect(),
            )
            .into(),
        ),
        Shape::PolylineZ(line) => Some(
            MultiLineString::new(
                line.parts()
                    .iter()
                    .map(|part| LineString::new(part.iter().map(|p| xy(p.x, p.y)).collect()))
                    .collect(),
            )
            .into(),
        ),
        Shape::Polygon(polygon) => Some(
            assemble_polygons(polygon.rings().iter().map(|ring| ring_coords(ring, |p| xy(p.x, p.y))))
                .into(),
        ),
        Shape::PolygonM(polygon) => Some(
            assemble_polygons(polygon.rings().iter().map(|ring| ring_coords(ring, |p| xy(p.x, p.y))))
                .into(),
        ),
        Shape::PolygonZ(polygon) => Some(
            assemble_polygons(polygon.rings().iter().map(|ring| ring_coords(ring, |p| xy(p.x, p.y))))
                .into(),
        ),
    }
}

/// Ring coordinates tagged with whether the ring is an outer boundary
fn ring_coords<P>(ring: &PolygonRing<P>, to_coord: impl Fn(&P) -> Coord<f64>) -> (bool, Vec<Coord<f64>>) {
    match ring {
        PolygonRing::Outer(points) => (true, points.iter().map(to_coord).collect()),
        PolygonRing::Inner(points) => (false, points.iter().map(to_coord).collect()),
    }
}

/// Group rings into polygons: each outer ring opens a polygon, inner rings
/// become holes of the polygon opened before them.
fn assemble_polygons(rings: impl Iterator<Item = (bool, Vec<Coord<f64>>)>) -> MultiPolygon<f64> {
    let mut polygons: Vec<(LineString<f64>, Vec<LineString<f64>>)> = Vec::new();

    for (outer, coords) in rings {
        let ring = LineString::new(coords);
        match polygons.last_mut() {
            Some((_, holes)) if !outer => holes.push(ring),
            // A hole with no preceding shell is kept as a shell
            _ => polygons.push((ring, Vec::new())),
        }
    }

    MultiPolygon::new(
        polygons
            .into_iter()
            .map(|(exterior, interiors)| Polygon::new(exterior, interiors))
            .collect(),
    )
}

/// Convert dBase field value to JSON value
fn convert_dbase_value(value: FieldValue) -> serde_json::Value {
    match value {
        FieldValue::Character(Some(s)) => serde_json::Value::String(s),
        FieldValue::Memo(s) => serde_json::Value::String(s),
        FieldValue::Numeric(Some(n)) => number(n),
        FieldValue::Float(Some(f)) => number(f as f64),
        FieldValue::Double(d) => number(d),
        FieldValue::Currency(c) => number(c),
        FieldValue::Integer(i) => serde_json::Value::Number(i.into()),
        FieldValue::Logical(Some(b)) => serde_json::Value::Bool(b),
        _ => serde_json::Value::Null,
    }
}

fn number(n: f64) -> serde_json::Value {
    serde_json::Number::from_f64(n).map(serde_json::Value::Number).unwrap_or(serde_json::Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_extensions() {
        assert_eq!(ShapefileReader.supported_extensions(), &["shp"]);
        assert_eq!(ShapefileReader.format_name(), "Shapefile");
    }

    #[test]
    fn test_validation_missing_file() {
        let validation = ShapefileReader.validate(Path::new("/nonexistent/asp.shp")).unwrap();
        assert!(!validation.is_valid());
    }

    #[test]
    fn test_parse_epsg_from_ogc_wkt() {
        let wkt = r#"PROJCS["CR05 / CRTM05",GEOGCS["CR05",AUTHORITY["EPSG","5365"]],AUTHORITY["EPSG","5367"]]"#;
        assert_eq!(parse_epsg_from_prj(wkt), Some(5367));
        assert_eq!(parse_epsg_from_prj("EPSG:3857"), Some(3857));
    }

    #[test]
    fn test_parse_epsg_from_esri_wkt() {
        let crtm = r#"PROJCS["CR05_CRTM05",GEOGCS["GCS_CR05",DATUM["D_Costa_Rica_2005",SPHEROID["WGS_1984",6378137.0,298.257223563]]],PROJECTION["Transverse_Mercator"]]"#;
        assert_eq!(parse_epsg_from_prj(crtm), Some(5367));

        let wgs = r#"GEOGCS["GCS_WGS_1984",DATUM["D_WGS_1984",SPHEROID["WGS_1984",6378137.0,298.257223563]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]]"#;
        assert_eq!(parse_epsg_from_prj(wgs), Some(4326));

        assert_eq!(parse_epsg_from_prj(r#"PROJCS["Lambert_Norte"]"#), None);
    }

    #[test]
    fn test_assemble_polygons_attaches_holes() {
        let shell = vec![
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 0.0, y: 10.0 },
            Coord { x: 10.0, y: 10.0 },
            Coord { x: 10.0, y: 0.0 },
            Coord { x: 0.0, y: 0.0 },
        ];
        let hole = vec![
            Coord { x: 4.0, y: 4.0 },
            Coord { x: 6.0, y: 4.0 },
            Coord { x: 6.0, y: 6.0 },
            Coord { x: 4.0, y: 6.0 },
            Coord { x: 4.0, y: 4.0 },
        ];
        let second_shell: Vec<Coord<f64>> = shell.iter().map(|c| Coord { x: c.x + 20.0, y: c.y }).collect();

        let mp = assemble_polygons(
            vec![(true, shell), (false, hole), (true, second_shell)].into_iter(),
        );

        assert_eq!(mp.0.len(), 2);
        assert_eq!(mp.0[0].interiors().len(), 1);
        assert!(mp.0[1].interiors().is_empty());
    }

    #[test]
    fn test_convert_dbase_value() {
        assert_eq!(
            convert_dbase_value(FieldValue::Character(Some("Osa".to_string()))),
            serde_json::json!("Osa")
        );
        assert_eq!(convert_dbase_value(FieldValue::Character(None)), serde_json::Value::Null);
        assert_eq!(convert_dbase_value(FieldValue::Integer(7)), serde_json::json!(7));
    }
}

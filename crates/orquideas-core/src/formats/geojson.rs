//! GeoJSON polygon layer reader

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{OrquideaError, Result};
use crate::formats::validation::FormatValidator;
use crate::formats::{dataset_name, FormatDataset, FormatFeature, FormatValidation, PolygonReader};
use crate::models::{Crs, WGS84_EPSG};

/// GeoJSON format reader
pub struct GeoJsonReader;

impl PolygonReader for GeoJsonReader {
    fn read(&self, path: &Path) -> Result<FormatDataset> {
        let content = fs::read_to_string(path).map_err(|e| OrquideaError::Load {
            path: path.to_path_buf(),
            reason: format!("Cannot read file: {}", e),
        })?;

        let geojson: geojson::GeoJson = content.parse().map_err(|e| OrquideaError::Load {
            path: path.to_path_buf(),
            reason: format!("Failed to parse GeoJSON: {}", e),
        })?;

        let (features, epsg) = extract_features_and_crs(path, geojson)?;

        Ok(FormatDataset {
            name: dataset_name(path),
            format_name: "GeoJSON".to_string(),
            crs: Crs::from_epsg(epsg),
            features,
        })
    }

    fn supported_extensions(&self) -> &[&str] {
        &["geojson", "json"]
    }

    fn format_name(&self) -> &str {
        "GeoJSON"
    }

    fn validate(&self, path: &Path) -> Result<FormatValidation> {
        Ok(FormatValidator::validate_file_exists(path))
    }
}

/// Extract features and the EPSG code of the legacy `crs` member
fn extract_features_and_crs(
    path: &Path,
    geojson: geojson::GeoJson,
) -> Result<(Vec<FormatFeature>, u32)> {
    match geojson {
        geojson::GeoJson::FeatureCollection(fc) => {
            let epsg = fc
                .foreign_members
                .as_ref()
                .and_then(|fm| fm.get("crs"))
                .and_then(extract_epsg_from_crs)
                .unwrap_or(WGS84_EPSG);

            let features: Vec<FormatFeature> = fc
                .features
                .into_iter()
                .enumerate()
                .map(|(idx, feature)| convert_feature(feature, idx))
                .collect();

            Ok((features, epsg))
        }
        geojson::GeoJson::Feature(feature) => Ok((vec![convert_feature(feature, 0)], WGS84_EPSG)),
        geojson::GeoJson::Geometry(_) => Err(OrquideaError::Load {
            path: path.to_path_buf(),
            reason: "Bare geometry has no attributes; expected a Feature or FeatureCollection"
                .to_string(),
        }),
    }
}

/// Convert a GeoJSON feature to FormatFeature.
///
/// Unusable geometry is reported through `defect` rather than as an error so the
/// loader's malformed-record policy applies to it.
fn convert_feature(feature: geojson::Feature, idx: usize) -> FormatFeature {
    let id = feature
        .id
        .as_ref()
        .map(|id| match id {
            geojson::feature::Id::String(s) => s.clone(),
            geojson::feature::Id::Number(n) => n.to_string(),
        })
        .unwrap_or_else(|| idx.to_string());

    let (geometry, defect) = match feature.geometry {
        None => (None, None),
        Some(geometry) => match ring_defect(&geometry.value) {
            Some(defect) => (None, Some(defect)),
            None => match geo::Geometry::<f64>::try_from(geometry) {
                Ok(geometry) => (Some(geometry), None),
                Err(e) => (None, Some(format!("Unusable geometry: {}", e))),
            },
        },
    };

    let properties: HashMap<String, serde_json::Value> =
        feature.properties.map(|props| props.into_iter().collect()).unwrap_or_default();

    FormatFeature { id, geometry, defect, properties }
}

/// First ring that is too short or not closed, checked on the raw positions
/// since conversion to `geo` closes rings silently
fn ring_defect(value: &geojson::Value) -> Option<String> {
    match value {
        geojson::Value::Polygon(rings) => check_rings(rings, "Polygon"),
        geojson::Value::MultiPolygon(polygons) => polygons
            .iter()
            .enumerate()
            .find_map(|(i, rings)| check_rings(rings, &format!("MultiPolygon[{}]", i))),
        _ => None,
    }
}

fn check_rings<P: PartialEq>(rings: &[Vec<P>], location: &str) -> Option<String> {
    rings.iter().enumerate().find_map(|(i, ring)| {
        if ring.len() < 4 {
            Some(format!(
                "{} ring {}: ring must have at least 4 positions, found {}",
                location,
                i,
                ring.len()
            ))
        } else if ring.first() != ring.last() {
            Some(format!(
                "{} ring {}: ring must be closed (first position == last position)",
                location, i
            ))
        } else {
            None
        }
    })
}

/// Extract EPSG code from a named CRS object ("EPSG:5367" or "urn:ogc:def:crs:EPSG::5367")
fn extract_epsg_from_crs(crs: &serde_json::Value) -> Option<u32> {
    let name = crs.get("properties")?.get("name")?.as_str()?;
    if name.contains("CRS84") {
        return Some(WGS84_EPSG);
    }
    name.rsplit(':').next()?.parse().ok()
}

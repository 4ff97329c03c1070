//! Geometry loader: turns both input files into WGS 84 records

use std::collections::HashSet;
use std::path::Path;

use orquideas_core::config::LayeredConfig;
use orquideas_core::error::{OrquideaError, Result};
use orquideas_core::formats::occurrences::{CoordinateColumns, OccurrenceDataset, OccurrenceReader};
use orquideas_core::formats::{FormatFeature, FormatRegistry};
use orquideas_core::models::{ConservationArea, Crs, MalformedPolicy, SkippedRecord};

use crate::transform::CrsTransform;
use crate::validation::{into_multipolygon, validate_area_geometry};

/// Conservation areas as loaded from a polygon layer
#[derive(Debug, Clone)]
pub struct AreaLoad {
    /// Dataset name (file stem)
    pub name: String,
    pub format_name: String,
    /// CRS declared by the source, before normalization
    pub source_crs: Crs,
    pub areas: Vec<ConservationArea>,
    /// Features dropped under [`MalformedPolicy::Skip`]
    pub skipped: Vec<SkippedRecord>,
}

/// Loads polygon layers and occurrence tables, normalizing both to WGS 84
pub struct GeometryLoader {
    registry: FormatRegistry,
    area_field: String,
    columns: CoordinateColumns,
    policy: MalformedPolicy,
    target_crs: Crs,
}

impl GeometryLoader {
    pub fn new(area_field: impl Into<String>, columns: CoordinateColumns) -> Self {
        Self {
            registry: FormatRegistry::with_defaults(),
            area_field: area_field.into(),
            columns,
            policy: MalformedPolicy::default(),
            target_crs: Crs::wgs84(),
        }
    }

    /// Loader set up from the effective configuration
    pub fn from_config(config: &LayeredConfig) -> Self {
        Self::new(
            config.area_field.value.clone(),
            CoordinateColumns {
                longitude: config.lon_column.value.clone(),
                latitude: config.lat_column.value.clone(),
            },
        )
        .with_policy(config.on_malformed.value)
    }

    pub fn with_policy(mut self, policy: MalformedPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Load a polygon layer into conservation areas
    pub fn load_areas(&self, path: &Path) -> Result<AreaLoad> {
        if !path.exists() {
            return Err(OrquideaError::FileNotFound { path: path.to_path_buf() });
        }

        let reader = self.registry.detect_format(path)?;

        let validation = reader.validate(path)?;
        for warning in &validation.warnings {
            tracing::warn!("{}", warning);
        }
        if !validation.is_valid() {
            return Err(OrquideaError::Load {
                path: path.to_path_buf(),
                reason: validation.errors.join("; "),
            });
        }

        let dataset = reader.read(path)?;
        tracing::info!(
            "Read {} features from {} ({}, {})",
            dataset.features.len(),
            path.display(),
            dataset.format_name,
            dataset.crs
        );

        if !dataset.features.is_empty()
            && !dataset.features.iter().any(|f| f.properties.contains_key(&self.area_field))
        {
            return Err(OrquideaError::MissingColumn {
                path: path.to_path_buf(),
                column: self.area_field.clone(),
            });
        }

        let transform = CrsTransform::new(&dataset.crs, &self.target_crs)?;
        let dataset_label = path.display().to_string();

        let mut areas = Vec::with_capacity(dataset.features.len());
        let mut skipped = Vec::new();

        for feature in dataset.features {
            let record = format!("feature {}", feature.id);
            match self.build_area(feature, &transform) {
                Ok(area) => areas.push(area),
                Err(AreaRejection::Malformed(reason)) => match self.policy {
                    MalformedPolicy::Abort => {
                        return Err(OrquideaError::MalformedRecord {
                            dataset: dataset_label,
                            record,
                            reason,
                        })
                    }
                    MalformedPolicy::Skip => {
                        tracing::warn!("Skipping {} of {}: {}", record, dataset_label, reason);
                        skipped.push(SkippedRecord { record, reason });
                    }
                },
                Err(AreaRejection::Fatal(e)) => return Err(e),
            }
        }

        warn_duplicate_names(&areas);
        tracing::info!(
            "Loaded {} conservation areas from {} ({} skipped)",
            areas.len(),
            dataset_label,
            skipped.len()
        );

        Ok(AreaLoad {
            name: dataset.name,
            format_name: dataset.format_name,
            source_crs: dataset.crs,
            areas,
            skipped,
        })
    }

    /// Load an occurrence table; points are taken as WGS 84 as-is
    pub fn load_occurrences(&self, path: &Path) -> Result<OccurrenceDataset> {
        OccurrenceReader::new(self.columns.clone()).with_policy(self.policy).read(path)
    }

    fn build_area(
        &self,
        feature: FormatFeature,
        transform: &CrsTransform,
    ) -> std::result::Result<ConservationArea, AreaRejection> {
        let area_name = feature.text_property(&self.area_field).ok_or_else(|| {
            AreaRejection::Malformed(format!("missing or blank '{}'", self.area_field))
        })?;

        let geometry = match (feature.geometry, feature.defect) {
            (_, Some(defect)) => return Err(AreaRejection::Malformed(defect)),
            (None, None) => return Err(AreaRejection::Malformed("null geometry".to_string())),
            (Some(geometry), None) => geometry,
        };

        let validation = validate_area_geometry(&geometry);
        if !validation.is_valid {
            return Err(AreaRejection::Malformed(validation.summary()));
        }

        let multipolygon = into_multipolygon(geometry)
            .ok_or_else(|| AreaRejection::Malformed("not a polygon".to_string()))?;
        let multipolygon = transform.apply(&multipolygon).map_err(AreaRejection::Fatal)?;

        Ok(ConservationArea::new(area_name, multipolygon))
    }
}

/// Why a feature did not become an area
enum AreaRejection {
    /// Record-level problem, subject to the malformed-record policy
    Malformed(String),
    Fatal(OrquideaError),
}

fn warn_duplicate_names(areas: &[ConservationArea]) {
    let mut seen = HashSet::new();
    for area in areas {
        if !seen.insert(area.area_name.as_str()) {
            tracing::warn!(
                "Area name '{}' appears more than once; its parts are counted together",
                area.area_name
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn feature(name: serde_json::Value, geometry: serde_json::Value) -> serde_json::Value {
        serde_json::json!({
            "type": "Feature",
            "geometry": geometry,
            "properties": { "nombre_ac": name }
        })
    }

    fn square(min: f64, max: f64) -> serde_json::Value {
        serde_json::json!({
            "type": "Polygon",
            "coordinates": [[[min, min], [max, min], [max, max], [min, max], [min, min]]]
        })
    }

    fn write_layer(dir: &TempDir, features: Vec<serde_json::Value>) -> std::path::PathBuf {
        let path = dir.path().join("areas.geojson");
        let layer = serde_json::json!({ "type": "FeatureCollection", "features": features });
        fs::write(&path, layer.to_string()).unwrap();
        path
    }

    fn loader() -> GeometryLoader {
        GeometryLoader::new("nombre_ac", CoordinateColumns::default())
    }

    #[test]
    fn test_loads_polygons_as_multipolygons() {
        let dir = TempDir::new().unwrap();
        let path = write_layer(
            &dir,
            vec![feature("AC1".into(), square(0.0, 10.0)), feature("AC2".into(), square(20.0, 30.0))],
        );

        let load = loader().load_areas(&path).unwrap();

        assert_eq!(load.format_name, "GeoJSON");
        assert!(load.source_crs.is_wgs84());
        assert_eq!(load.areas.len(), 2);
        assert_eq!(load.areas[0].area_name, "AC1");
        assert_eq!(load.areas[0].geometry.0.len(), 1);
        assert!(load.skipped.is_empty());
    }

    #[test]
    fn test_abort_on_null_geometry() {
        let dir = TempDir::new().unwrap();
        let path = write_layer(
            &dir,
            vec![feature("AC1".into(), square(0.0, 10.0)), feature("AC2".into(), serde_json::Value::Null)],
        );

        let err = loader().load_areas(&path).unwrap_err();
        assert!(matches!(err, OrquideaError::MalformedRecord { .. }));
        assert!(err.is_load_error());
    }

    #[test]
    fn test_skip_policy_drops_bad_features() {
        let dir = TempDir::new().unwrap();
        let path = write_layer(
            &dir,
            vec![
                feature("AC1".into(), square(0.0, 10.0)),
                feature("AC2".into(), serde_json::Value::Null),
                feature("".into(), square(20.0, 30.0)),
                feature("AC4".into(), serde_json::json!({ "type": "Point", "coordinates": [1.0, 1.0] })),
            ],
        );

        let load = loader().with_policy(MalformedPolicy::Skip).load_areas(&path).unwrap();

        assert_eq!(load.areas.len(), 1);
        assert_eq!(load.skipped.len(), 3);
        assert_eq!(load.skipped[0].reason, "null geometry");
        assert!(load.skipped[1].reason.contains("nombre_ac"));
        assert!(load.skipped[2].reason.contains("Expected Polygon"));
    }

    #[test]
    fn test_unclosed_ring_follows_malformed_policy() {
        let dir = TempDir::new().unwrap();
        let unclosed = serde_json::json!({
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0], [10.0, 0.0], [10.0, 10.0]]]
        });
        let path = write_layer(
            &dir,
            vec![feature("AC1".into(), unclosed), feature("AC2".into(), square(20.0, 30.0))],
        );

        match loader().load_areas(&path).unwrap_err() {
            OrquideaError::MalformedRecord { record, reason, .. } => {
                assert_eq!(record, "feature 0");
                assert!(reason.contains("at least 4 positions"), "{}", reason);
            }
            other => panic!("unexpected error: {other}"),
        }

        let load = loader().with_policy(MalformedPolicy::Skip).load_areas(&path).unwrap();
        assert_eq!(load.areas.len(), 1);
        assert_eq!(load.areas[0].area_name, "AC2");
        assert_eq!(load.skipped.len(), 1);
    }

    #[test]
    fn test_open_ring_is_not_closed_silently() {
        let dir = TempDir::new().unwrap();
        let open = serde_json::json!({
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]]]
        });
        let path = write_layer(&dir, vec![feature("AC1".into(), open)]);

        let err = loader().load_areas(&path).unwrap_err();
        assert!(err.to_string().contains("closed"), "{}", err);
    }

    #[test]
    fn test_wrong_area_field_is_missing_column() {
        let dir = TempDir::new().unwrap();
        let path = write_layer(&dir, vec![feature("AC1".into(), square(0.0, 10.0))]);

        let err = GeometryLoader::new("NOMBRE", CoordinateColumns::default())
            .with_policy(MalformedPolicy::Skip)
            .load_areas(&path)
            .unwrap_err();

        match err {
            OrquideaError::MissingColumn { column, .. } => assert_eq!(column, "NOMBRE"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_and_unsupported_files() {
        let dir = TempDir::new().unwrap();

        let missing = loader().load_areas(&dir.path().join("nada.geojson")).unwrap_err();
        assert!(matches!(missing, OrquideaError::FileNotFound { .. }));

        let kml = dir.path().join("areas.kml");
        fs::write(&kml, "<kml/>").unwrap();
        let unsupported = loader().load_areas(&kml).unwrap_err();
        assert!(matches!(unsupported, OrquideaError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_from_config_uses_columns_and_policy() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("occ.csv");
        fs::write(&path, "species,lon,lat\nA,-84.0,10.0\nB,x,10.0\n").unwrap();

        let mut config = LayeredConfig::with_defaults();
        config.update_from_cli(orquideas_core::config::CliConfigOverrides {
            lon_column: Some("lon".to_string()),
            lat_column: Some("lat".to_string()),
            on_malformed: Some(MalformedPolicy::Skip),
            ..Default::default()
        });

        let dataset = GeometryLoader::from_config(&config).load_occurrences(&path).unwrap();
        assert_eq!(dataset.occurrences.len(), 1);
        assert_eq!(dataset.skipped.len(), 1);
    }
}

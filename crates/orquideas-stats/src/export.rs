//! Static report files consumed by the map and chart front end

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use geojson::{Feature, FeatureCollection, Geometry, JsonObject};
use orquideas_core::config::PresentationConfig;
use orquideas_core::error::{OrquideaError, Result};
use serde::Serialize;
use serde_json::json;

use crate::pipeline::PipelineOutput;

pub const RICHNESS_FILE: &str = "richness.json";
pub const TOP_SPECIES_FILE: &str = "top_species.json";
pub const SUMMARY_FILE: &str = "summary.json";
pub const AREAS_FILE: &str = "areas.geojson";
pub const OCCURRENCES_FILE: &str = "occurrences.geojson";
pub const PRESENTATION_FILE: &str = "presentation.json";

/// Presentation settings plus the value range the color ramp has to cover
#[derive(Serialize)]
struct PresentationExport<'a> {
    #[serde(flatten)]
    config: &'a PresentationConfig,
    richness_range: [usize; 2],
}

/// Writes a pipeline result into an output directory
pub struct ReportWriter {
    out_dir: PathBuf,
    presentation: PresentationConfig,
}

impl ReportWriter {
    pub fn new(out_dir: impl Into<PathBuf>, presentation: PresentationConfig) -> Self {
        Self { out_dir: out_dir.into(), presentation }
    }

    /// Write every report file, returning their paths in write order.
    ///
    /// Either all files are written or none are left behind.
    pub fn write(&self, output: &PipelineOutput) -> Result<Vec<PathBuf>> {
        let richness_range = [
            output.richness.iter().map(|r| r.richness).min().unwrap_or(0),
            output.richness.iter().map(|r| r.richness).max().unwrap_or(0),
        ];

        let documents = [
            (RICHNESS_FILE, render(RICHNESS_FILE, &output.richness)?),
            (TOP_SPECIES_FILE, render(TOP_SPECIES_FILE, &output.top_species)?),
            (SUMMARY_FILE, render(SUMMARY_FILE, &output.summary)?),
            (AREAS_FILE, render(AREAS_FILE, &areas_collection(output))?),
            (OCCURRENCES_FILE, render(OCCURRENCES_FILE, &occurrences_collection(output))?),
            (
                PRESENTATION_FILE,
                render(
                    PRESENTATION_FILE,
                    &PresentationExport { config: &self.presentation, richness_range },
                )?,
            ),
        ];

        let created_dir = !self.out_dir.exists();
        fs::create_dir_all(&self.out_dir)?;

        let mut written = Vec::with_capacity(documents.len());
        for (file_name, content) in &documents {
            let path = self.out_dir.join(file_name);
            if let Err(e) = fs::write(&path, content) {
                tracing::warn!("Failed to write {}: {}; removing partial report", path.display(), e);
                self.discard(&written, created_dir);
                return Err(e.into());
            }
            tracing::debug!("Wrote {}", path.display());
            written.push(path);
        }

        tracing::info!("Wrote {} report files to {}", written.len(), self.out_dir.display());
        Ok(written)
    }

    fn discard(&self, written: &[PathBuf], created_dir: bool) {
        for path in written {
            if let Err(e) = fs::remove_file(path) {
                tracing::warn!("Could not remove {}: {}", path.display(), e);
            }
        }
        if created_dir {
            let _ = fs::remove_dir(&self.out_dir);
        }
    }
}

fn render<T: Serialize + ?Sized>(file_name: &str, value: &T) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| OrquideaError::Serialization(format!("{}: {}", file_name, e)))
}

/// Areas with their richness, the choropleth layer
fn areas_collection(output: &PipelineOutput) -> FeatureCollection {
    let richness: HashMap<&str, usize> =
        output.richness.iter().map(|r| (r.area_name.as_str(), r.richness)).collect();

    let features = output
        .areas
        .iter()
        .map(|area| {
            let mut properties = JsonObject::new();
            properties.insert("area_name".to_string(), json!(area.area_name));
            properties.insert(
                "richness".to_string(),
                json!(richness.get(area.area_name.as_str()).copied().unwrap_or(0)),
            );
            feature(Geometry::new(geojson::Value::from(&area.geometry)), properties)
        })
        .collect();

    collection(features)
}

/// One point per joined occurrence, the marker layer
fn occurrences_collection(output: &PipelineOutput) -> FeatureCollection {
    let features = output
        .joined
        .iter()
        .map(|joined| {
            let occ = &joined.occurrence;
            let mut properties = JsonObject::new();
            properties.insert("species".to_string(), json!(occ.species));
            properties.insert("locality".to_string(), json!(occ.locality));
            properties.insert("event_date".to_string(), json!(occ.event_date));
            properties.insert("institution_code".to_string(), json!(occ.institution_code));
            properties.insert("occurrence_id".to_string(), json!(occ.occurrence_id));
            properties.insert("area_name".to_string(), json!(joined.area_name));
            feature(Geometry::new(geojson::Value::from(&occ.location)), properties)
        })
        .collect();

    collection(features)
}

fn feature(geometry: Geometry, properties: JsonObject) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(geometry),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

fn collection(features: Vec<Feature>) -> FeatureCollection {
    FeatureCollection { bbox: None, features, foreign_members: None }
}

use orquideas_core::config::PresentationConfig;
use orquideas_core::models::{Crs, RichnessRecord, SkippedRecord, TopSpeciesRecord};
use orquideas_stats::PipelineSummary;
use serde::Serialize;

/// Output for report command
#[derive(Debug, Serialize)]
pub struct ReportOutput {
    pub richness: Vec<RichnessRecord>,
    pub top_species: Vec<TopSpeciesRecord>,
    pub summary: PipelineSummary,
    /// Files written with --out
    pub report_files: Vec<String>,
}

/// Output for inspect command
#[derive(Debug, Serialize)]
pub struct InspectOutput {
    pub areas: DatasetInfo,
    pub occurrences: DatasetInfo,
    pub distinct_area_names: usize,
    pub distinct_species: usize,
    pub occurrences_without_species: usize,
}

#[derive(Debug, Serialize)]
pub struct DatasetInfo {
    pub path: String,
    pub name: String,
    pub format: String,
    pub crs: Crs,
    pub records: usize,
    pub skipped: Vec<SkippedRecord>,
}

/// Output for config command
#[derive(Debug, Serialize)]
pub struct ConfigOutput {
    pub config_file: Option<String>,
    pub values: Vec<ConfigEntry>,
    pub presentation: PresentationConfig,
}

#[derive(Debug, Serialize)]
pub struct ConfigEntry {
    pub key: String,
    pub value: String,
    pub source: String,
}

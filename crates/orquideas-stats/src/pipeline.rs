//! End-to-end run: load, join, aggregate

use std::path::Path;

use chrono::NaiveDate;
use orquideas_core::config::{LayeredConfig, DEFAULT_TOP_N};
use orquideas_core::error::Result;
use orquideas_core::formats::occurrences::OccurrenceDataset;
use orquideas_core::models::{
    ConservationArea, Crs, JoinedOccurrence, OrchidOccurrence, RichnessRecord, TieMode,
    TopSpeciesRecord,
};
use orquideas_geo::{join, AreaLoad, GeometryLoader, JoinOptions, JoinStats};
use serde::{Deserialize, Serialize};

use crate::ranking::top_species;
use crate::richness::{aggregate_richness, total_distinct_species};

/// Join and aggregation settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    pub join: JoinOptions,
    pub top_n: usize,
    pub ties: TieMode,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self { join: JoinOptions::default(), top_n: DEFAULT_TOP_N, ties: TieMode::default() }
    }
}

impl PipelineOptions {
    pub fn from_config(config: &LayeredConfig) -> Self {
        Self {
            join: JoinOptions { overlap: config.overlap.value, strategy: config.strategy.value },
            top_n: config.top_n.value,
            ties: config.ties.value,
        }
    }
}

/// Both inputs after loading, before the join
#[derive(Debug, Clone)]
pub struct LoadedInputs {
    pub areas: AreaLoad,
    pub occurrences: OccurrenceDataset,
}

/// Totals describing one run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineSummary {
    pub areas: usize,
    pub distinct_area_names: usize,
    pub occurrences: usize,
    #[serde(flatten)]
    pub join: JoinStats,
    pub distinct_species: usize,
    /// Occurrences without a species name
    pub unnamed_occurrences: usize,
    pub skipped_areas: usize,
    pub skipped_occurrences: usize,
    /// CRS the polygon layer was declared in
    pub source_crs: Option<Crs>,
    pub first_event: Option<NaiveDate>,
    pub last_event: Option<NaiveDate>,
}

/// Everything a run produces
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub areas: Vec<ConservationArea>,
    pub joined: Vec<JoinedOccurrence>,
    pub richness: Vec<RichnessRecord>,
    pub top_species: Vec<TopSpeciesRecord>,
    pub summary: PipelineSummary,
}

/// Orchid richness pipeline
pub struct Pipeline {
    loader: GeometryLoader,
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(loader: GeometryLoader, options: PipelineOptions) -> Self {
        Self { loader, options }
    }

    /// Pipeline configured from the effective configuration
    pub fn from_config(config: &LayeredConfig) -> Self {
        Self::new(GeometryLoader::from_config(config), PipelineOptions::from_config(config))
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Load both inputs without joining
    pub fn load(&self, areas_path: &Path, occurrences_path: &Path) -> Result<LoadedInputs> {
        let areas = self.loader.load_areas(areas_path)?;
        let occurrences = self.loader.load_occurrences(occurrences_path)?;
        Ok(LoadedInputs { areas, occurrences })
    }

    /// Load, join, and aggregate
    pub fn run(&self, areas_path: &Path, occurrences_path: &Path) -> Result<PipelineOutput> {
        let inputs = self.load(areas_path, occurrences_path)?;

        let skipped_areas = inputs.areas.skipped.len();
        let skipped_occurrences = inputs.occurrences.skipped.len();
        let source_crs = inputs.areas.source_crs;

        let mut output = compute(inputs.areas.areas, inputs.occurrences.occurrences, &self.options);
        output.summary.skipped_areas = skipped_areas;
        output.summary.skipped_occurrences = skipped_occurrences;
        output.summary.source_crs = Some(source_crs);

        Ok(output)
    }
}

/// Join and aggregate records that are already loaded
pub fn compute(
    areas: Vec<ConservationArea>,
    occurrences: Vec<OrchidOccurrence>,
    options: &PipelineOptions,
) -> PipelineOutput {
    let outcome = join(&occurrences, &areas, options.join);

    let richness = aggregate_richness(&outcome.joined, &areas);
    let top = top_species(&outcome.joined, options.top_n, options.ties);

    let event_days: Vec<NaiveDate> =
        occurrences.iter().filter_map(OrchidOccurrence::event_day).collect();

    let summary = PipelineSummary {
        areas: areas.len(),
        distinct_area_names: richness.len(),
        occurrences: occurrences.len(),
        join: outcome.stats,
        distinct_species: total_distinct_species(&outcome.joined),
        unnamed_occurrences: occurrences.iter().filter(|o| !o.has_species()).count(),
        skipped_areas: 0,
        skipped_occurrences: 0,
        source_crs: None,
        first_event: event_days.iter().min().copied(),
        last_event: event_days.iter().max().copied(),
    };

    let empty_areas = richness.iter().filter(|r| r.richness == 0).count();
    tracing::info!(
        "{} distinct species across {} area names ({} without records)",
        summary.distinct_species,
        summary.distinct_area_names,
        empty_areas
    );

    PipelineOutput { areas, joined: outcome.joined, richness, top_species: top, summary }
}

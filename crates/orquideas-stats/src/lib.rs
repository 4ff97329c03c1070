//! Orquideas Stats - richness and ranking aggregation over joined occurrences
//!
//! The [`pipeline`] module wires loading, joining, and both aggregators together;
//! [`export`] writes the results as static files for the map and charts.

pub mod export;
pub mod pipeline;
pub mod ranking;
pub mod richness;

pub use export::ReportWriter;
pub use pipeline::{compute, LoadedInputs, Pipeline, PipelineOptions, PipelineOutput, PipelineSummary};
pub use ranking::{species_counts, top_species};
pub use richness::{aggregate_richness, total_distinct_species};

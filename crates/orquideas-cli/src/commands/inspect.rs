//! Inspect command implementation

use crate::cli::InspectArgs;
use crate::config_loader::{load_config_with_overrides, resolve_config_file};
use crate::output::OutputWriter;
use crate::output_types::{DatasetInfo, InspectOutput};
use anyhow::{Context, Result};
use orquideas_core::models::SkippedRecord;
use orquideas_stats::Pipeline;
use std::collections::HashSet;
use std::path::Path;
use tabled::Tabled;

#[derive(Tabled)]
struct DatasetRow {
    #[tabled(rename = "Dataset")]
    name: String,
    #[tabled(rename = "Format")]
    format: String,
    #[tabled(rename = "CRS")]
    crs: String,
    #[tabled(rename = "Records")]
    records: usize,
    #[tabled(rename = "Skipped")]
    skipped: usize,
}

#[derive(Tabled)]
struct SkippedRow {
    #[tabled(rename = "Dataset")]
    dataset: String,
    #[tabled(rename = "Record")]
    record: String,
    #[tabled(rename = "Reason")]
    reason: String,
}

pub fn execute(args: InspectArgs, config_file: Option<&Path>, output: &OutputWriter) -> Result<()> {
    let config_file = resolve_config_file(config_file);
    let config = load_config_with_overrides(config_file.as_deref(), args.overrides.into())?;

    let inputs = Pipeline::from_config(&config)
        .load(&args.inputs.areas, &args.inputs.occurrences)
        .context("Failed to load input datasets")?;

    let distinct_area_names =
        inputs.areas.areas.iter().map(|a| a.area_name.as_str()).collect::<HashSet<_>>().len();
    let distinct_species = inputs
        .occurrences
        .occurrences
        .iter()
        .filter_map(|o| o.species.as_deref())
        .collect::<HashSet<_>>()
        .len();
    let occurrences_without_species =
        inputs.occurrences.occurrences.iter().filter(|o| !o.has_species()).count();

    let areas = DatasetInfo {
        path: args.inputs.areas.display().to_string(),
        name: inputs.areas.name,
        format: inputs.areas.format_name,
        crs: inputs.areas.source_crs,
        records: inputs.areas.areas.len(),
        skipped: inputs.areas.skipped,
    };
    let occurrences = DatasetInfo {
        path: args.inputs.occurrences.display().to_string(),
        name: inputs.occurrences.name,
        format: "Delimited text".to_string(),
        crs: inputs.occurrences.crs,
        records: inputs.occurrences.occurrences.len(),
        skipped: inputs.occurrences.skipped,
    };

    if output.is_json() {
        return output.result(InspectOutput {
            areas,
            occurrences,
            distinct_area_names,
            distinct_species,
            occurrences_without_species,
        });
    }

    output.section("Input datasets");
    output.table(
        [&areas, &occurrences]
            .iter()
            .map(|d| DatasetRow {
                name: d.name.clone(),
                format: d.format.clone(),
                crs: d.crs.to_string(),
                records: d.records,
                skipped: d.skipped.len(),
            })
            .collect(),
    );

    output.kv("Distinct area names", distinct_area_names);
    output.kv("Distinct species", distinct_species);
    output.kv("Occurrences without species", occurrences_without_species);

    let skipped_total = areas.skipped.len() + occurrences.skipped.len();
    if skipped_total > 0 {
        if args.show_skipped {
            output.section("Skipped records");
            let rows = skipped_rows(&areas.name, &areas.skipped)
                .chain(skipped_rows(&occurrences.name, &occurrences.skipped))
                .collect();
            output.table(rows);
        } else {
            output.warning(format!("{} records skipped; pass --show-skipped to list them", skipped_total));
        }
    }

    Ok(())
}

fn skipped_rows<'a>(
    dataset: &'a str,
    skipped: &'a [SkippedRecord],
) -> impl Iterator<Item = SkippedRow> + 'a {
    skipped.iter().map(move |s| SkippedRow {
        dataset: dataset.to_string(),
        record: s.record.clone(),
        reason: s.reason.clone(),
    })
}

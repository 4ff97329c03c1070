//! Report command implementation

use crate::cli::ReportArgs;
use crate::config_loader::{load_config_with_overrides, resolve_config_file};
use crate::output::OutputWriter;
use crate::output_types::ReportOutput;
use anyhow::{Context, Result};
use orquideas_stats::{Pipeline, ReportWriter};
use std::path::Path;
use tabled::Tabled;

#[derive(Tabled)]
struct RichnessRow {
    #[tabled(rename = "Conservation area")]
    area_name: String,
    #[tabled(rename = "Species")]
    richness: usize,
}

#[derive(Tabled)]
struct SpeciesRow {
    #[tabled(rename = "#")]
    rank: usize,
    #[tabled(rename = "Species")]
    species: String,
    #[tabled(rename = "Occurrences")]
    occurrence_count: usize,
}

pub fn execute(args: ReportArgs, config_file: Option<&Path>, output: &OutputWriter) -> Result<()> {
    let config_file = resolve_config_file(config_file);
    let config = load_config_with_overrides(config_file.as_deref(), args.overrides.into())?;

    let pipeline = Pipeline::from_config(&config);
    let result = pipeline
        .run(&args.inputs.areas, &args.inputs.occurrences)
        .context("Failed to compute orchid richness")?;

    // Files are written only once the whole run has succeeded
    let report_files = match &args.out {
        Some(out) => ReportWriter::new(out, config.presentation.clone())
            .write(&result)
            .with_context(|| format!("Failed to write report to {}", out.display()))?,
        None => Vec::new(),
    };

    let skipped = (result.summary.skipped_areas, result.summary.skipped_occurrences);
    if skipped.0 + skipped.1 > 0 {
        output.warning(format!(
            "Skipped {} area features and {} occurrence rows (run inspect --show-skipped for details)",
            skipped.0, skipped.1
        ));
    }

    if output.is_json() {
        return output.result(ReportOutput {
            richness: result.richness,
            top_species: result.top_species,
            summary: result.summary,
            report_files: report_files.iter().map(|p| p.display().to_string()).collect(),
        });
    }

    output.section("Orchid richness by conservation area");
    output.table(
        result
            .richness
            .iter()
            .map(|r| RichnessRow { area_name: r.area_name.clone(), richness: r.richness })
            .collect(),
    );

    output.section(format!("Top {} species by occurrences", pipeline.options().top_n));
    output.table(
        result
            .top_species
            .iter()
            .enumerate()
            .map(|(i, r)| SpeciesRow {
                rank: i + 1,
                species: r.species.clone(),
                occurrence_count: r.occurrence_count,
            })
            .collect(),
    );

    let summary = &result.summary;
    output.section("Summary");
    output.kv("Conservation areas", summary.distinct_area_names);
    output.kv("Occurrences", summary.occurrences);
    output.kv("Inside an area", summary.join.matched);
    output.kv("Outside every area", summary.join.unmatched);
    if summary.join.multi_matched > 0 {
        output.kv("Inside overlapping areas", summary.join.multi_matched);
    }
    output.kv("Distinct species", summary.distinct_species);
    if let (Some(first), Some(last)) = (summary.first_event, summary.last_event) {
        output.kv("Event dates", format!("{} to {}", first, last));
    }
    println!();

    match &args.out {
        Some(out) => output.success(format!("Wrote {} files to {}", report_files.len(), out.display())),
        None => output.info("Pass --out <DIR> to write the map and chart files"),
    }

    Ok(())
}

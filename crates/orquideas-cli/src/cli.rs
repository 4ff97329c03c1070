use clap::{Args, Parser, Subcommand};
use orquideas_core::config::{
    parse_join_strategy, parse_malformed_policy, parse_overlap_policy, parse_tie_mode,
    CliConfigOverrides,
};
use orquideas_core::models::{JoinStrategy, MalformedPolicy, OverlapPolicy, TieMode};
use std::path::PathBuf;

/// Orquideas - orchid species richness per conservation area
#[derive(Parser, Debug)]
#[command(name = "orquideas")]
#[command(about = "Orchid species richness per conservation area", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to ./orquideas.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Join occurrences to areas and report richness and top species
    Report(ReportArgs),

    /// Load both inputs and describe them without joining
    Inspect(InspectArgs),

    /// Show the effective configuration and where each value comes from
    Config(ConfigArgs),
}

/// Paths of the two input datasets
#[derive(Args, Debug)]
pub struct InputArgs {
    /// Conservation-area polygons (GeoJSON or Shapefile)
    #[arg(long, value_name = "PATH")]
    pub areas: PathBuf,

    /// Orchid occurrence table (CSV or TSV)
    #[arg(long, value_name = "PATH")]
    pub occurrences: PathBuf,
}

#[derive(Args, Debug)]
pub struct ReportArgs {
    #[command(flatten)]
    pub inputs: InputArgs,

    /// Directory to write the report files into
    #[arg(long, value_name = "DIR")]
    pub out: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: OverrideArgs,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    #[command(flatten)]
    pub inputs: InputArgs,

    /// List every skipped record
    #[arg(long)]
    pub show_skipped: bool,

    #[command(flatten)]
    pub overrides: OverrideArgs,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Configuration file to inspect (same as the global --config)
    #[arg(long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: OverrideArgs,
}

/// Per-run overrides, highest precedence
#[derive(Args, Debug, Default)]
pub struct OverrideArgs {
    /// Number of species in the ranking
    #[arg(long)]
    pub top_n: Option<usize>,

    /// Polygon attribute holding the area name
    #[arg(long)]
    pub area_field: Option<String>,

    /// Occurrence column holding the longitude
    #[arg(long)]
    pub lon_column: Option<String>,

    /// Occurrence column holding the latitude
    #[arg(long)]
    pub lat_column: Option<String>,

    /// Malformed records: abort or skip
    #[arg(long, value_name = "POLICY", value_parser = parse_malformed_policy)]
    pub on_malformed: Option<MalformedPolicy>,

    /// Point inside several areas: first or smallest
    #[arg(long, value_name = "POLICY", value_parser = parse_overlap_policy)]
    pub overlap: Option<OverlapPolicy>,

    /// Ties at the ranking cutoff: truncate or keep-all
    #[arg(long, value_name = "MODE", value_parser = parse_tie_mode)]
    pub ties: Option<TieMode>,

    /// Candidate search: scan or indexed
    #[arg(long, value_name = "STRATEGY", value_parser = parse_join_strategy)]
    pub strategy: Option<JoinStrategy>,
}

impl From<OverrideArgs> for CliConfigOverrides {
    fn from(args: OverrideArgs) -> Self {
        Self {
            area_field: args.area_field,
            lon_column: args.lon_column,
            lat_column: args.lat_column,
            top_n: args.top_n,
            on_malformed: args.on_malformed,
            overlap: args.overlap,
            ties: args.ties,
            strategy: args.strategy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_report_with_overrides() {
        let cli = Cli::try_parse_from([
            "orquideas",
            "report",
            "--areas",
            "areas.geojson",
            "--occurrences",
            "orquideas.csv",
            "--top-n",
            "5",
            "--overlap",
            "smallest",
            "--ties",
            "keep-all",
            "--json",
        ])
        .unwrap();

        assert!(cli.json);
        let Commands::Report(args) = cli.command else {
            panic!("expected report");
        };
        assert_eq!(args.inputs.areas, PathBuf::from("areas.geojson"));
        assert!(args.out.is_none());

        let overrides: CliConfigOverrides = args.overrides.into();
        assert_eq!(overrides.top_n, Some(5));
        assert_eq!(overrides.overlap, Some(OverlapPolicy::SmallestArea));
        assert_eq!(overrides.ties, Some(TieMode::KeepAll));
        assert!(overrides.strategy.is_none());
    }

    #[test]
    fn test_invalid_policy_is_rejected() {
        let result = Cli::try_parse_from([
            "orquideas",
            "inspect",
            "--areas",
            "a.geojson",
            "--occurrences",
            "o.csv",
            "--strategy",
            "quadtree",
        ]);
        assert!(result.is_err());
    }
}

//! Config command implementation

use crate::cli::ConfigArgs;
use crate::config_loader::{load_config_with_overrides, resolve_config_file};
use crate::output::OutputWriter;
use crate::output_types::{ConfigEntry, ConfigOutput};
use anyhow::Result;
use std::path::Path;
use tabled::Tabled;

#[derive(Tabled)]
struct ConfigRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Source")]
    source: String,
}

pub fn execute(args: ConfigArgs, config_file: Option<&Path>, output: &OutputWriter) -> Result<()> {
    let config_file = resolve_config_file(args.file.as_deref().or(config_file));
    let config = load_config_with_overrides(config_file.as_deref(), args.overrides.into())?;

    let values: Vec<ConfigEntry> = config
        .to_inspection_map()
        .into_iter()
        .map(|(key, (value, source))| ConfigEntry { key, value, source: format!("{:?}", source) })
        .collect();

    if output.is_json() {
        return output.result(ConfigOutput {
            config_file: config_file.map(|p| p.display().to_string()),
            values,
            presentation: config.presentation,
        });
    }

    output.section("Effective configuration");
    match &config_file {
        Some(path) => output.kv("Config file", path.display()),
        None => output.kv("Config file", "(none)"),
    }

    output.table(
        values
            .into_iter()
            .map(|e| ConfigRow { key: e.key, value: e.value, source: e.source })
            .collect(),
    );

    let presentation = &config.presentation;
    output.section("Presentation");
    output.kv("Palette", presentation.palette.join(", "));
    output.kv(
        "Map center",
        format!("{}, {}", presentation.map_center[0], presentation.map_center[1]),
    );
    output.kv("Zoom", presentation.zoom);
    output.kv("Tiles", &presentation.tiles);
    output.kv("Chart top-N", presentation.chart_top_n);

    Ok(())
}

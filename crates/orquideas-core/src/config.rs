use crate::error::{OrquideaError, Result};
use crate::models::{JoinStrategy, MalformedPolicy, OverlapPolicy, TieMode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;

/// Attribute of the conservation-area layer holding the area name
pub const DEFAULT_AREA_FIELD: &str = "nombre_ac";
pub const DEFAULT_LON_COLUMN: &str = "decimalLongitude";
pub const DEFAULT_LAT_COLUMN: &str = "decimalLatitude";
pub const DEFAULT_TOP_N: usize = 10;

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Settings handed to the presentation layer.
///
/// The report writer serializes this verbatim; nothing in the pipeline reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresentationConfig {
    /// Sequential color ramp for the richness choropleth, low to high
    pub palette: Vec<String>,
    /// Initial map center as [latitude, longitude]
    pub map_center: [f64; 2],
    pub zoom: u8,
    pub tiles: String,
    /// Bars shown in each chart
    pub chart_top_n: usize,
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            palette: ["#ffffcc", "#d9f0a3", "#addd8e", "#78c679", "#31a354", "#006837"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            map_center: [9.7489, -83.7534],
            zoom: 7,
            tiles: "OpenStreetMap".to_string(),
            chart_top_n: DEFAULT_TOP_N,
        }
    }
}

/// Layered configuration for the richness pipeline
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub area_field: ConfigValue<String>,
    pub lon_column: ConfigValue<String>,
    pub lat_column: ConfigValue<String>,
    pub top_n: ConfigValue<usize>,
    pub on_malformed: ConfigValue<MalformedPolicy>,
    pub overlap: ConfigValue<OverlapPolicy>,
    pub ties: ConfigValue<TieMode>,
    pub strategy: ConfigValue<JoinStrategy>,
    pub presentation: PresentationConfig,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            area_field: ConfigValue::new(DEFAULT_AREA_FIELD.to_string(), ConfigSource::Default),
            lon_column: ConfigValue::new(DEFAULT_LON_COLUMN.to_string(), ConfigSource::Default),
            lat_column: ConfigValue::new(DEFAULT_LAT_COLUMN.to_string(), ConfigSource::Default),
            top_n: ConfigValue::new(DEFAULT_TOP_N, ConfigSource::Default),
            on_malformed: ConfigValue::new(MalformedPolicy::default(), ConfigSource::Default),
            overlap: ConfigValue::new(OverlapPolicy::default(), ConfigSource::Default),
            ties: ConfigValue::new(TieMode::default(), ConfigSource::Default),
            strategy: ConfigValue::new(JoinStrategy::default(), ConfigSource::Default),
            presentation: PresentationConfig::default(),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| OrquideaError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| OrquideaError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(area_field) = file_config.area_field {
            self.area_field.update(area_field, ConfigSource::File);
        }

        if let Some(lon_column) = file_config.lon_column {
            self.lon_column.update(lon_column, ConfigSource::File);
        }

        if let Some(lat_column) = file_config.lat_column {
            self.lat_column.update(lat_column, ConfigSource::File);
        }

        if let Some(top_n) = file_config.top_n {
            self.top_n.update(top_n, ConfigSource::File);
        }

        if let Some(on_malformed) = file_config.on_malformed {
            self.on_malformed.update(on_malformed, ConfigSource::File);
        }

        if let Some(overlap) = file_config.overlap {
            self.overlap.update(overlap, ConfigSource::File);
        }

        if let Some(ties) = file_config.ties {
            self.ties.update(ties, ConfigSource::File);
        }

        if let Some(strategy) = file_config.strategy {
            self.strategy.update(strategy, ConfigSource::File);
        }

        if let Some(presentation) = file_config.presentation {
            self.presentation = presentation;
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        if let Ok(field) = env::var("ORQUIDEAS_AREA_FIELD") {
            self.area_field.update(field, ConfigSource::Environment);
        }

        if let Ok(column) = env::var("ORQUIDEAS_LON_COLUMN") {
            self.lon_column.update(column, ConfigSource::Environment);
        }

        if let Ok(column) = env::var("ORQUIDEAS_LAT_COLUMN") {
            self.lat_column.update(column, ConfigSource::Environment);
        }

        if let Ok(top_n_str) = env::var("ORQUIDEAS_TOP_N") {
            match top_n_str.parse::<usize>() {
                Ok(top_n) => self.top_n.update(top_n, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid ORQUIDEAS_TOP_N value '{}': expected a non-negative integer",
                    top_n_str
                ),
            }
        }

        if let Ok(policy_str) = env::var("ORQUIDEAS_ON_MALFORMED") {
            match parse_malformed_policy(&policy_str) {
                Ok(policy) => self.on_malformed.update(policy, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid ORQUIDEAS_ON_MALFORMED value '{}': expected abort or skip",
                    policy_str
                ),
            }
        }

        if let Ok(overlap_str) = env::var("ORQUIDEAS_OVERLAP") {
            match parse_overlap_policy(&overlap_str) {
                Ok(overlap) => self.overlap.update(overlap, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid ORQUIDEAS_OVERLAP value '{}': expected first or smallest",
                    overlap_str
                ),
            }
        }

        if let Ok(ties_str) = env::var("ORQUIDEAS_TIES") {
            match parse_tie_mode(&ties_str) {
                Ok(ties) => self.ties.update(ties, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid ORQUIDEAS_TIES value '{}': expected truncate or keep-all",
                    ties_str
                ),
            }
        }

        if let Ok(strategy_str) = env::var("ORQUIDEAS_STRATEGY") {
            match parse_join_strategy(&strategy_str) {
                Ok(strategy) => self.strategy.update(strategy, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid ORQUIDEAS_STRATEGY value '{}': expected scan or indexed",
                    strategy_str
                ),
            }
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(area_field) = overrides.area_field {
            self.area_field.update(area_field, ConfigSource::Cli);
        }

        if let Some(lon_column) = overrides.lon_column {
            self.lon_column.update(lon_column, ConfigSource::Cli);
        }

        if let Some(lat_column) = overrides.lat_column {
            self.lat_column.update(lat_column, ConfigSource::Cli);
        }

        if let Some(top_n) = overrides.top_n {
            self.top_n.update(top_n, ConfigSource::Cli);
        }

        if let Some(on_malformed) = overrides.on_malformed {
            self.on_malformed.update(on_malformed, ConfigSource::Cli);
        }

        if let Some(overlap) = overrides.overlap {
            self.overlap.update(overlap, ConfigSource::Cli);
        }

        if let Some(ties) = overrides.ties {
            self.ties.update(ties, ConfigSource::Cli);
        }

        if let Some(strategy) = overrides.strategy {
            self.strategy.update(strategy, ConfigSource::Cli);
        }
    }

    /// Reject combinations the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        for (key, value) in [
            ("area_field", &self.area_field.value),
            ("lon_column", &self.lon_column.value),
            ("lat_column", &self.lat_column.value),
        ] {
            if value.trim().is_empty() {
                return Err(OrquideaError::ConfigMissing { key: key.to_string() });
            }
        }

        if self.lon_column.value == self.lat_column.value {
            return Err(OrquideaError::ConfigInvalid {
                key: "lat_column".to_string(),
                reason: format!(
                    "longitude and latitude both point at column '{}'",
                    self.lat_column.value
                ),
            });
        }

        Ok(())
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> BTreeMap<String, (String, ConfigSource)> {
        let mut map = BTreeMap::new();

        map.insert(
            "area_field".to_string(),
            (self.area_field.value.clone(), self.area_field.source),
        );
        map.insert(
            "lon_column".to_string(),
            (self.lon_column.value.clone(), self.lon_column.source),
        );
        map.insert(
            "lat_column".to_string(),
            (self.lat_column.value.clone(), self.lat_column.source),
        );
        map.insert("top_n".to_string(), (self.top_n.value.to_string(), self.top_n.source));
        map.insert(
            "on_malformed".to_string(),
            (format!("{:?}", self.on_malformed.value), self.on_malformed.source),
        );
        map.insert(
            "overlap".to_string(),
            (format!("{:?}", self.overlap.value), self.overlap.source),
        );
        map.insert("ties".to_string(), (format!("{:?}", self.ties.value), self.ties.source));
        map.insert(
            "strategy".to_string(),
            (format!("{:?}", self.strategy.value), self.strategy.source),
        );

        map
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    area_field: Option<String>,
    lon_column: Option<String>,
    lat_column: Option<String>,
    top_n: Option<usize>,
    on_malformed: Option<MalformedPolicy>,
    overlap: Option<OverlapPolicy>,
    ties: Option<TieMode>,
    strategy: Option<JoinStrategy>,
    presentation: Option<PresentationConfig>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub area_field: Option<String>,
    pub lon_column: Option<String>,
    pub lat_column: Option<String>,
    pub top_n: Option<usize>,
    pub on_malformed: Option<MalformedPolicy>,
    pub overlap: Option<OverlapPolicy>,
    pub ties: Option<TieMode>,
    pub strategy: Option<JoinStrategy>,
}

/// Parse malformed-record policy from string
pub fn parse_malformed_policy(s: &str) -> Result<MalformedPolicy> {
    match s.to_lowercase().as_str() {
        "abort" | "fail" => Ok(MalformedPolicy::Abort),
        "skip" => Ok(MalformedPolicy::Skip),
        _ => Err(OrquideaError::ConfigInvalid {
            key: "on_malformed".to_string(),
            reason: format!("Invalid malformed-record policy: {}. Use abort or skip", s),
        }),
    }
}

/// Parse overlap policy from string
pub fn parse_overlap_policy(s: &str) -> Result<OverlapPolicy> {
    match s.to_lowercase().as_str() {
        "first" | "first-match" => Ok(OverlapPolicy::FirstMatch),
        "smallest" | "smallest-area" => Ok(OverlapPolicy::SmallestArea),
        _ => Err(OrquideaError::ConfigInvalid {
            key: "overlap".to_string(),
            reason: format!("Invalid overlap policy: {}. Use first or smallest", s),
        }),
    }
}

/// Parse top-N tie mode from string
pub fn parse_tie_mode(s: &str) -> Result<TieMode> {
    match s.to_lowercase().as_str() {
        "truncate" => Ok(TieMode::Truncate),
        "keep-all" | "keep_all" | "all" => Ok(TieMode::KeepAll),
        _ => Err(OrquideaError::ConfigInvalid {
            key: "ties".to_string(),
            reason: format!("Invalid tie mode: {}. Use truncate or keep-all", s),
        }),
    }
}

/// Parse join strategy from string
pub fn parse_join_strategy(s: &str) -> Result<JoinStrategy> {
    match s.to_lowercase().as_str() {
        "scan" => Ok(JoinStrategy::Scan),
        "indexed" | "rtree" => Ok(JoinStrategy::Indexed),
        _ => Err(OrquideaError::ConfigInvalid {
            key: "strategy".to_string(),
            reason: format!("Invalid join strategy: {}. Use scan or indexed", s),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = LayeredConfig::with_defaults();
        assert_eq!(config.area_field.value, "nombre_ac");
        assert_eq!(config.area_field.source, ConfigSource::Default);
        assert_eq!(config.top_n.value, 10);
        assert_eq!(config.on_malformed.value, MalformedPolicy::Abort);
        assert_eq!(config.overlap.value, OverlapPolicy::FirstMatch);
        assert_eq!(config.ties.value, TieMode::Truncate);
        assert_eq!(config.strategy.value, JoinStrategy::Scan);
    }

    #[test]
    fn test_config_precedence() {
        let mut value = ConfigValue::new(10, ConfigSource::Default);

        value.update(20, ConfigSource::File);
        assert_eq!(value.value, 20);

        value.update(30, ConfigSource::Environment);
        assert_eq!(value.value, 30);

        value.update(40, ConfigSource::Cli);
        assert_eq!(value.value, 40);

        // Lower precedence should not override
        value.update(50, ConfigSource::File);
        assert_eq!(value.value, 40);
        assert_eq!(value.source, ConfigSource::Cli);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
area_field = "NOMBRE"
top_n = 5
on_malformed = "skip"
overlap = "smallest-area"
ties = "keep-all"
strategy = "indexed"

[presentation]
zoom = 8
"#
        )
        .unwrap();

        let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap();

        assert_eq!(config.area_field.value, "NOMBRE");
        assert_eq!(config.area_field.source, ConfigSource::File);
        assert_eq!(config.top_n.value, 5);
        assert_eq!(config.on_malformed.value, MalformedPolicy::Skip);
        assert_eq!(config.overlap.value, OverlapPolicy::SmallestArea);
        assert_eq!(config.ties.value, TieMode::KeepAll);
        assert_eq!(config.strategy.value, JoinStrategy::Indexed);
        assert_eq!(config.lon_column.source, ConfigSource::Default);
        assert_eq!(config.presentation.zoom, 8);
        // Unset presentation keys keep their defaults
        assert_eq!(config.presentation.palette.len(), 6);
    }

    #[test]
    fn test_load_from_file_rejects_bad_policy() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"on_malformed = "ignore""#).unwrap();

        let result = LayeredConfig::with_defaults().load_from_file(file.path());
        assert!(matches!(result, Err(OrquideaError::ConfigInvalid { .. })));
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = LayeredConfig::with_defaults();

        config.update_from_cli(CliConfigOverrides {
            top_n: Some(3),
            ties: Some(TieMode::KeepAll),
            ..Default::default()
        });

        assert_eq!(config.top_n.value, 3);
        assert_eq!(config.top_n.source, ConfigSource::Cli);
        assert_eq!(config.ties.value, TieMode::KeepAll);
        assert_eq!(config.area_field.source, ConfigSource::Default);
    }

    #[test]
    fn test_validate_rejects_same_coordinate_column() {
        let mut config = LayeredConfig::with_defaults();
        config.update_from_cli(CliConfigOverrides {
            lat_column: Some("decimalLongitude".to_string()),
            ..Default::default()
        });
        assert!(config.validate().is_err());
        assert!(LayeredConfig::with_defaults().validate().is_ok());
    }

    #[test]
    fn test_parsers() {
        assert_eq!(parse_malformed_policy("SKIP").unwrap(), MalformedPolicy::Skip);
        assert_eq!(parse_overlap_policy("smallest").unwrap(), OverlapPolicy::SmallestArea);
        assert_eq!(parse_tie_mode("keep-all").unwrap(), TieMode::KeepAll);
        assert_eq!(parse_join_strategy("rtree").unwrap(), JoinStrategy::Indexed);
        assert!(parse_join_strategy("quadtree").is_err());
    }

    #[test]
    fn test_inspection_map() {
        let map = LayeredConfig::with_defaults().to_inspection_map();
        assert_eq!(map.len(), 8);

        let (value, source) = &map["top_n"];
        assert_eq!(value, "10");
        assert_eq!(*source, ConfigSource::Default);
    }
}

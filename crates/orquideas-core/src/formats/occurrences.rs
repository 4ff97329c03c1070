//! Delimited-text reader for occurrence tables (GBIF-style exports).
//!
//! Each row becomes an [`OrchidOccurrence`] whose point is built straight from
//! the longitude/latitude columns. The CRS is assigned, never inferred: the
//! coordinates are taken to be WGS 84 degrees.

use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::error::{OrquideaError, Result};
use crate::formats::dataset_name;
use crate::formats::validation::FormatValidator;
use crate::models::occurrence::normalize_text;
use crate::models::{Crs, MalformedPolicy, OrchidOccurrence, SkippedRecord};

pub const SPECIES_COLUMN: &str = "species";
pub const LOCALITY_COLUMN: &str = "locality";
pub const EVENT_DATE_COLUMN: &str = "eventDate";
pub const INSTITUTION_COLUMN: &str = "institutionCode";
pub const OCCURRENCE_ID_COLUMN: &str = "occurrenceID";

/// Names of the coordinate columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinateColumns {
    pub longitude: String,
    pub latitude: String,
}

impl Default for CoordinateColumns {
    fn default() -> Self {
        Self {
            longitude: crate::config::DEFAULT_LON_COLUMN.to_string(),
            latitude: crate::config::DEFAULT_LAT_COLUMN.to_string(),
        }
    }
}

/// Occurrence table as loaded
#[derive(Debug, Clone)]
pub struct OccurrenceDataset {
    pub name: String,
    pub crs: Crs,
    pub occurrences: Vec<OrchidOccurrence>,
    /// Rows dropped under [`MalformedPolicy::Skip`]
    pub skipped: Vec<SkippedRecord>,
}

/// Column positions resolved from the header row
struct ColumnIndex {
    longitude: usize,
    latitude: usize,
    species: Option<usize>,
    locality: Option<usize>,
    event_date: Option<usize>,
    institution_code: Option<usize>,
    occurrence_id: Option<usize>,
}

/// Occurrence table reader
#[derive(Debug, Clone, Default)]
pub struct OccurrenceReader {
    columns: CoordinateColumns,
    policy: MalformedPolicy,
    delimiter: Option<u8>,
}

impl OccurrenceReader {
    pub fn new(columns: CoordinateColumns) -> Self {
        Self { columns, ..Default::default() }
    }

    pub fn with_policy(mut self, policy: MalformedPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Force a delimiter instead of inferring it from the extension
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    pub fn supported_extensions(&self) -> &[&str] {
        &["csv", "tsv", "txt"]
    }

    /// Read an occurrence table from disk
    pub fn read(&self, path: &Path) -> Result<OccurrenceDataset> {
        let validation = FormatValidator::validate_file_exists(path);
        if !validation.is_valid() {
            if !path.exists() {
                return Err(OrquideaError::FileNotFound { path: path.to_path_buf() });
            }
            return Err(OrquideaError::Load {
                path: path.to_path_buf(),
                reason: validation.errors.join("; "),
            });
        }

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        let delimiter = match self.delimiter {
            Some(d) => d,
            None => match extension.as_str() {
                "csv" => b',',
                "tsv" | "txt" => b'\t',
                other => {
                    return Err(OrquideaError::UnsupportedFormat {
                        extension: other.to_string(),
                        supported: self.supported_extensions().iter().map(|s| s.to_string()).collect(),
                    })
                }
            },
        };

        let file = std::fs::File::open(path).map_err(|e| OrquideaError::Load {
            path: path.to_path_buf(),
            reason: format!("Cannot open file: {}", e),
        })?;

        let mut dataset = self.read_from(file, path, delimiter)?;
        dataset.name = dataset_name(path);
        Ok(dataset)
    }

    /// Read an occurrence table from any reader; `path` is only used in messages
    pub fn read_from<R: Read>(&self, input: R, path: &Path, delimiter: u8) -> Result<OccurrenceDataset> {
        // GBIF tab-separated exports are unquoted and may contain stray quotes
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .quoting(delimiter != b'\t')
            .from_reader(input);

        let headers = reader
            .headers()
            .map_err(|e| OrquideaError::Load {
                path: path.to_path_buf(),
                reason: format!("Cannot read header row: {}", e),
            })?
            .clone();

        let index = self.resolve_columns(&headers, path)?;
        let dataset_label = path.display().to_string();

        let mut occurrences = Vec::new();
        let mut skipped = Vec::new();

        for (row, result) in reader.records().enumerate() {
            // Header is line 1
            let fallback_line = row as u64 + 2;

            let parsed = result
                .map_err(|e| {
                    let line = e.position().map(|p| p.line()).unwrap_or(fallback_line);
                    (line, e.to_string())
                })
                .and_then(|record| {
                    let line = record.position().map(|p| p.line()).unwrap_or(fallback_line);
                    parse_record(&record, &index).map_err(|reason| (line, reason))
                });

            match parsed {
                Ok(occurrence) => occurrences.push(occurrence),
                Err((line, reason)) => match self.policy {
                    MalformedPolicy::Abort => {
                        return Err(OrquideaError::MalformedRecord {
                            dataset: dataset_label,
                            record: format!("line {}", line),
                            reason,
                        })
                    }
                    MalformedPolicy::Skip => {
                        tracing::warn!("Skipping line {} of {}: {}", line, dataset_label, reason);
                        skipped.push(SkippedRecord { record: format!("line {}", line), reason });
                    }
                },
            }
        }

        tracing::info!(
            "Loaded {} occurrences from {} ({} skipped)",
            occurrences.len(),
            dataset_label,
            skipped.len()
        );

        Ok(OccurrenceDataset {
            name: dataset_name(path),
            crs: Crs::wgs84(),
            occurrences,
            skipped,
        })
    }

    fn resolve_columns(&self, headers: &StringRecord, path: &Path) -> Result<ColumnIndex> {
        let position = |name: &str| {
            headers.iter().position(|h| h.trim_start_matches('\u{feff}').trim() == name)
        };

        let required = |name: &str| {
            position(name).ok_or_else(|| OrquideaError::MissingColumn {
                path: path.to_path_buf(),
                column: name.to_string(),
            })
        };

        let index = ColumnIndex {
            longitude: required(&self.columns.longitude)?,
            latitude: required(&self.columns.latitude)?,
            species: position(SPECIES_COLUMN),
            locality: position(LOCALITY_COLUMN),
            event_date: position(EVENT_DATE_COLUMN),
            institution_code: position(INSTITUTION_COLUMN),
            occurrence_id: position(OCCURRENCE_ID_COLUMN),
        };

        if index.species.is_none() {
            tracing::warn!(
                "{} has no '{}' column; every occurrence will be unnamed",
                path.display(),
                SPECIES_COLUMN
            );
        }

        Ok(index)
    }
}

fn parse_record(record: &StringRecord, index: &ColumnIndex) -> std::result::Result<OrchidOccurrence, String> {
    let longitude = parse_coordinate(record.get(index.longitude), "longitude", 180.0)?;
    let latitude = parse_coordinate(record.get(index.latitude), "latitude", 90.0)?;

    let text = |column: Option<usize>| normalize_text(column.and_then(|i| record.get(i)).map(str::to_string));

    Ok(OrchidOccurrence {
        location: geo::Point::new(longitude, latitude),
        species: text(index.species),
        locality: text(index.locality),
        event_date: text(index.event_date),
        institution_code: text(index.institution_code),
        occurrence_id: text(index.occurrence_id),
    })
}

/// Parse a coordinate in degrees, rejecting blanks, non-numbers, and out-of-range values
fn parse_coordinate(raw: Option<&str>, axis: &str, limit: f64) -> std::result::Result<f64, String> {
    let raw = raw.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Err(format!("missing {}", axis));
    }

    let value: f64 = raw.parse().map_err(|_| format!("invalid {} '{}'", axis, raw))?;
    if !value.is_finite() || value.abs() > limit {
        return Err(format!("{} {} outside [-{}, {}]", axis, value, limit, limit));
    }

    Ok(value)
}

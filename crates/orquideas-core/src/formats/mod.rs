//! Format abstraction layer for the two input datasets
//!
//! Polygon layers come in several vector formats, so each one implements the
//! `PolygonReader` trait and the `FormatRegistry` dispatches on file extension.
//! Occurrence tables have a single delimited-text reader in [`occurrences`].

use geo::Geometry;
use std::collections::HashMap;
use std::path::Path;

use crate::error::{OrquideaError, Result};
use crate::models::Crs;

pub mod geojson;
pub mod occurrences;
pub mod shapefile;
pub mod validation;

/// Reader for a polygon layer format
pub trait PolygonReader: Send + Sync {
    /// Read a layer from the given path
    fn read(&self, path: &Path) -> Result<FormatDataset>;

    /// Get supported file extensions (e.g., ["shp"])
    fn supported_extensions(&self) -> &[&str];

    /// Get human-readable format name (e.g., "Shapefile", "GeoJSON")
    fn format_name(&self) -> &str;

    /// Validate file structure without full read
    fn validate(&self, _path: &Path) -> Result<FormatValidation> {
        Ok(FormatValidation::default())
    }
}

/// Result of format validation
#[derive(Debug, Clone, Default)]
pub struct FormatValidation {
    /// Validation errors that prevent reading
    pub errors: Vec<String>,

    /// Warnings that don't prevent reading but indicate potential issues
    pub warnings: Vec<String>,
}

impl FormatValidation {
    /// Check if validation passed (no errors)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Check if there are any warnings
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Layer contents as read from disk, before validation and reprojection
#[derive(Debug, Clone)]
pub struct FormatDataset {
    /// Dataset name (file stem)
    pub name: String,

    /// Format name (e.g., "Shapefile", "GeoJSON")
    pub format_name: String,

    /// CRS the coordinates are expressed in
    pub crs: Crs,

    pub features: Vec<FormatFeature>,
}

/// Feature extracted from a polygon layer
#[derive(Debug, Clone)]
pub struct FormatFeature {
    /// Feature identifier (source id or position in the layer)
    pub id: String,

    /// Geometry, None for null shapes and for shapes the reader could not use
    pub geometry: Option<Geometry<f64>>,

    /// Why the source geometry was unusable, when it was
    pub defect: Option<String>,

    pub properties: HashMap<String, serde_json::Value>,
}

impl FormatFeature {
    /// Property rendered as text; numbers are formatted, null and blank yield None
    pub fn text_property(&self, key: &str) -> Option<String> {
        match self.properties.get(key)? {
            serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            serde_json::Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

/// Central registry for polygon readers
pub struct FormatRegistry {
    readers: Vec<Box<dyn PolygonReader>>,
}

impl FormatRegistry {
    /// Create a new empty format registry
    pub fn new() -> Self {
        Self { readers: Vec::new() }
    }

    /// Registry with every polygon format this crate ships
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(geojson::GeoJsonReader));
        registry.register(Box::new(shapefile::ShapefileReader));
        registry
    }

    /// Register a format reader
    pub fn register(&mut self, reader: Box<dyn PolygonReader>) {
        self.readers.push(reader);
    }

    /// Detect format and return appropriate reader
    pub fn detect_format(&self, path: &Path) -> Result<&dyn PolygonReader> {
        let extension = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            OrquideaError::UnsupportedFormat {
                extension: "none".to_string(),
                supported: self.supported_formats(),
            }
        })?;

        self.readers
            .iter()
            .find(|r| r.supported_extensions().iter().any(|ext| ext.eq_ignore_ascii_case(extension)))
            .map(|r| r.as_ref())
            .ok_or_else(|| OrquideaError::UnsupportedFormat {
                extension: extension.to_string(),
                supported: self.supported_formats(),
            })
    }

    /// Get list of all supported format extensions
    pub fn supported_formats(&self) -> Vec<String> {
        self.readers
            .iter()
            .flat_map(|r| r.supported_extensions())
            .map(|s| s.to_string())
            .collect()
    }

    /// Get all registered readers
    pub fn readers(&self) -> &[Box<dyn PolygonReader>] {
        &self.readers
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Dataset name derived from the file stem
pub(crate) fn dataset_name(path: &Path) -> String {
    path.file_stem().and_then(|s| s.to_str()).unwrap_or("unnamed").to_string()
}

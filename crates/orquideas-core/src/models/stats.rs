use serde::{Deserialize, Serialize};

/// Distinct species observed inside one conservation area
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichnessRecord {
    pub area_name: String,
    pub richness: usize,
}

/// Number of occurrence rows recorded for one species
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopSpeciesRecord {
    pub species: String,
    pub occurrence_count: usize,
}

/// A record dropped while loading under the skip policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRecord {
    /// Where the record sits in its source (e.g. "line 12", "feature 3")
    pub record: String,
    pub reason: String,
}

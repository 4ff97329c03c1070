//! Policies that pin down the behaviors the data alone leaves open.

use serde::{Deserialize, Serialize};

/// What to do with a record that cannot be parsed or validated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum MalformedPolicy {
    /// Fail the whole load
    #[default]
    Abort,
    /// Drop the record, log a warning, and keep loading
    Skip,
}

/// Which area wins when a point lies inside more than one polygon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OverlapPolicy {
    /// First containing area in the supplied order
    #[default]
    #[serde(alias = "first")]
    FirstMatch,
    /// Containing area with the smallest planar area; supplied order breaks ties
    #[serde(alias = "smallest")]
    SmallestArea,
}

/// How to treat entries tied with the last place of a top-N ranking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TieMode {
    /// Cut at exactly N entries
    #[default]
    Truncate,
    /// Keep every entry whose count equals the N-th count
    KeepAll,
}

/// How candidate polygons are found for each point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum JoinStrategy {
    /// Test every polygon for every point
    #[default]
    Scan,
    /// Prefilter polygons with an R-tree over their bounding boxes
    #[serde(alias = "rtree")]
    Indexed,
}

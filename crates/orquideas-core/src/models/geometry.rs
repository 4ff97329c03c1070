//! Coordinate reference system handling shared by every dataset.

use serde::{Deserialize, Serialize};
use std::fmt;

/// EPSG code of WGS 84, the datum every loaded record ends up in
pub const WGS84_EPSG: u32 = 4326;

/// Coordinate Reference System identified by EPSG code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crs {
    pub epsg: u32,
    pub name: String,
}

impl Default for Crs {
    fn default() -> Self {
        Self::wgs84()
    }
}

impl Crs {
    pub fn new(epsg: u32, name: impl Into<String>) -> Self {
        Self { epsg, name: name.into() }
    }

    /// WGS 84 (EPSG:4326)
    pub fn wgs84() -> Self {
        Self::new(WGS84_EPSG, "WGS 84")
    }

    /// Build a CRS from a bare EPSG code, naming the ones this system meets in practice
    pub fn from_epsg(epsg: u32) -> Self {
        let name = match epsg {
            4326 => "WGS 84",
            3857 => "Web Mercator",
            5367 => "CR05 / CRTM05",
            8908 => "CR-SIRGAS",
            _ => "Unknown",
        };
        Self::new(epsg, name)
    }

    pub fn is_wgs84(&self) -> bool {
        self.epsg == WGS84_EPSG
    }

    /// Authority string understood by PROJ (e.g. "EPSG:4326")
    pub fn authority(&self) -> String {
        format!("EPSG:{}", self.epsg)
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{} ({})", self.epsg, self.name)
    }
}

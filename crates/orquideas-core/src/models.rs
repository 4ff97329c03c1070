pub mod area;
pub mod geometry;
pub mod occurrence;
pub mod policy;
pub mod stats;

pub use area::ConservationArea;
pub use geometry::{Crs, WGS84_EPSG};
pub use occurrence::{JoinedOccurrence, OrchidOccurrence};
pub use policy::{JoinStrategy, MalformedPolicy, OverlapPolicy, TieMode};
pub use stats::{RichnessRecord, SkippedRecord, TopSpeciesRecord};

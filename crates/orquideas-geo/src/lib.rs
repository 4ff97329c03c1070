//! Orquideas Geo - geometry validation, CRS normalization, and the spatial join
//!
//! The loader turns raw format datasets into WGS 84 conservation areas and
//! occurrences; the join engine attaches each occurrence to its containing area.

pub mod index;
pub mod join;
pub mod loader;
pub mod transform;
pub mod validation;

pub use join::{join, JoinOptions, JoinOutcome, JoinStats};
pub use loader::{AreaLoad, GeometryLoader};

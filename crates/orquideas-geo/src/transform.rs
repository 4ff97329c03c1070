//! CRS normalization for polygon layers

use geo::MultiPolygon;
use orquideas_core::error::{OrquideaError, Result};
use orquideas_core::models::Crs;

#[cfg(feature = "reproject")]
use proj::Proj;

/// Check if two CRS are the same
pub fn crs_match(crs1: &Crs, crs2: &Crs) -> bool {
    crs1.epsg == crs2.epsg
}

/// Coordinate transformation between two CRS, built once per layer
pub struct CrsTransform {
    from: Crs,
    to: Crs,
    #[cfg(feature = "reproject")]
    proj: Option<Proj>,
}

impl CrsTransform {
    /// Prepare a transformation; identical CRS yield an identity transform
    pub fn new(from: &Crs, to: &Crs) -> Result<Self> {
        if crs_match(from, to) {
            return Ok(Self::identity(from, to));
        }

        #[cfg(feature = "reproject")]
        {
            let proj = Proj::new_known_crs(&from.authority(), &to.authority(), None).map_err(
                |e| OrquideaError::CrsMismatch {
                    dataset_crs: from.to_string(),
                    target_crs: to.to_string(),
                    reason: format!("Failed to create projection: {}", e),
                },
            )?;

            tracing::info!("Reprojecting from {} to {}", from, to);
            Ok(Self { from: from.clone(), to: to.clone(), proj: Some(proj) })
        }

        #[cfg(not(feature = "reproject"))]
        {
            Err(OrquideaError::CrsMismatch {
                dataset_crs: from.to_string(),
                target_crs: to.to_string(),
                reason: "built without the 'reproject' feature".to_string(),
            })
        }
    }

    fn identity(from: &Crs, to: &Crs) -> Self {
        Self {
            from: from.clone(),
            to: to.clone(),
            #[cfg(feature = "reproject")]
            proj: None,
        }
    }

    pub fn is_identity(&self) -> bool {
        crs_match(&self.from, &self.to)
    }

    /// Transform every coordinate of a multipolygon
    pub fn apply(&self, geometry: &MultiPolygon<f64>) -> Result<MultiPolygon<f64>> {
        #[cfg(feature = "reproject")]
        if let Some(proj) = &self.proj {
            use geo::MapCoords;

            return geometry
                .try_map_coords(|coord| {
                    proj.convert((coord.x, coord.y)).map(|(x, y)| geo::Coord { x, y })
                })
                .map_err(|e| OrquideaError::CrsMismatch {
                    dataset_crs: self.from.to_string(),
                    target_crs: self.to.to_string(),
                    reason: format!("Projection failed: {}", e),
                });
        }

        Ok(geometry.clone())
    }
}

//! Point-in-polygon join of occurrences against conservation areas

use orquideas_core::models::{
    ConservationArea, JoinStrategy, JoinedOccurrence, OrchidOccurrence, OverlapPolicy,
};
use serde::{Deserialize, Serialize};

use crate::index::AreaIndex;

/// Knobs for [`join`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoinOptions {
    pub overlap: OverlapPolicy,
    pub strategy: JoinStrategy,
}

/// Match counts for one join run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinStats {
    pub matched: usize,
    pub unmatched: usize,
    /// Occurrences inside more than one area, resolved by the overlap policy
    pub multi_matched: usize,
}

#[derive(Debug, Clone)]
pub struct JoinOutcome {
    /// One entry per input occurrence, in input order
    pub joined: Vec<JoinedOccurrence>,
    pub stats: JoinStats,
}

/// Attach to each occurrence the name of the area strictly containing it.
///
/// Points on a boundary or outside every area come back unmatched. When several
/// areas contain a point, `options.overlap` picks the winner; the indexed
/// strategy only narrows the candidates and never changes the result.
pub fn join(
    occurrences: &[OrchidOccurrence],
    areas: &[ConservationArea],
    options: JoinOptions,
) -> JoinOutcome {
    let index = match options.strategy {
        JoinStrategy::Scan => None,
        JoinStrategy::Indexed => {
            let index = AreaIndex::build(areas);
            tracing::debug!("Indexed {} of {} areas", index.area_count(), areas.len());
            Some(index)
        }
    };

    let planar_areas: Vec<f64> = match options.overlap {
        OverlapPolicy::SmallestArea => areas.iter().map(ConservationArea::planar_area).collect(),
        OverlapPolicy::FirstMatch => Vec::new(),
    };

    let mut stats = JoinStats::default();
    let mut joined = Vec::with_capacity(occurrences.len());

    for occurrence in occurrences {
        let point = occurrence.location;

        let containing: Vec<usize> = match &index {
            Some(index) => index
                .candidates(point.x(), point.y())
                .into_iter()
                .filter(|&i| areas[i].contains_point(&point))
                .collect(),
            None => areas
                .iter()
                .enumerate()
                .filter(|(_, area)| area.contains_point(&point))
                .map(|(i, _)| i)
                .collect(),
        };

        let winner = match containing.as_slice() {
            [] => None,
            [only] => Some(*only),
            many => {
                stats.multi_matched += 1;
                Some(resolve_overlap(many, options.overlap, &planar_areas))
            }
        };

        let area_name = match winner {
            Some(i) => {
                stats.matched += 1;
                Some(areas[i].area_name.clone())
            }
            None => {
                stats.unmatched += 1;
                None
            }
        };

        joined.push(JoinedOccurrence::new(occurrence.clone(), area_name));
    }

    tracing::info!(
        "Joined {} occurrences against {} areas: {} matched, {} unmatched, {} in overlapping areas",
        occurrences.len(),
        areas.len(),
        stats.matched,
        stats.unmatched,
        stats.multi_matched
    );

    JoinOutcome { joined, stats }
}

/// Pick one of several containing areas; `positions` is ascending and non-empty
fn resolve_overlap(positions: &[usize], overlap: OverlapPolicy, planar_areas: &[f64]) -> usize {
    match overlap {
        OverlapPolicy::FirstMatch => positions[0],
        OverlapPolicy::SmallestArea => positions
            .iter()
            .copied()
            .min_by(|&a, &b| planar_areas[a].total_cmp(&planar_areas[b]).then(a.cmp(&b)))
            .unwrap_or(positions[0]),
    }
}

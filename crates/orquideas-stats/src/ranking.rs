//! Raw occurrence counts per species and the top-N ranking

use std::collections::HashMap;

use orquideas_core::models::{JoinedOccurrence, TieMode, TopSpeciesRecord};

/// Occurrence rows per named species, most recorded first.
///
/// Every occurrence counts, matched to an area or not; rows without a species
/// are left out. Equal counts keep the order in which species first appear.
pub fn species_counts(joined: &[JoinedOccurrence]) -> Vec<TopSpeciesRecord> {
    let mut position: HashMap<&str, usize> = HashMap::new();
    let mut records: Vec<TopSpeciesRecord> = Vec::new();

    for species in joined.iter().filter_map(JoinedOccurrence::species) {
        match position.get(species) {
            Some(&i) => records[i].occurrence_count += 1,
            None => {
                position.insert(species, records.len());
                records.push(TopSpeciesRecord { species: species.to_string(), occurrence_count: 1 });
            }
        }
    }

    // Stable sort keeps first-appearance order among ties
    records.sort_by(|a, b| b.occurrence_count.cmp(&a.occurrence_count));
    records
}

/// The `n` most recorded species.
///
/// Under [`TieMode::KeepAll`] species tied with the n-th count are kept as
/// well, so the result may be longer than `n`.
pub fn top_species(joined: &[JoinedOccurrence], n: usize, ties: TieMode) -> Vec<TopSpeciesRecord> {
    if n == 0 {
        return Vec::new();
    }

    let mut ranked = species_counts(joined);
    if ranked.len() <= n {
        return ranked;
    }

    let keep = match ties {
        TieMode::Truncate => n,
        TieMode::KeepAll => {
            let cutoff = ranked[n - 1].occurrence_count;
            n + ranked[n..].iter().take_while(|r| r.occurrence_count == cutoff).count()
        }
    };

    ranked.truncate(keep);
    ranked
}

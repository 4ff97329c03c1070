//! Property tests for the richness and ranking aggregators

use geo::{polygon, MultiPolygon};
use orquideas_core::models::{ConservationArea, JoinedOccurrence, OrchidOccurrence, TieMode};
use orquideas_stats::{aggregate_richness, species_counts, top_species, total_distinct_species};
use proptest::prelude::*;
use std::collections::HashSet;

fn area(name: &str) -> ConservationArea {
    let poly = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 0.0)];
    ConservationArea::new(name, MultiPolygon::new(vec![poly]))
}

fn areas_strategy() -> impl Strategy<Value = Vec<ConservationArea>> {
    // Small name pool so duplicates show up
    prop::collection::vec(0u8..6, 0..8)
        .prop_map(|ids| ids.into_iter().map(|i| area(&format!("AC{}", i))).collect())
}

fn joined_strategy() -> impl Strategy<Value = Vec<JoinedOccurrence>> {
    prop::collection::vec((prop::option::of(0u8..8), prop::option::of(0u8..6)), 0..60).prop_map(
        |rows| {
            rows.into_iter()
                .map(|(species, area)| {
                    let mut occurrence = OrchidOccurrence::at(0.5, 0.5);
                    if let Some(s) = species {
                        occurrence = occurrence.with_species(format!("sp{}", s));
                    }
                    JoinedOccurrence::new(occurrence, area.map(|a| format!("AC{}", a)))
                })
                .collect()
        },
    )
}

proptest! {
    #[test]
    fn richness_has_one_row_per_area_name(areas in areas_strategy(), joined in joined_strategy()) {
        let richness = aggregate_richness(&joined, &areas);

        let expected: HashSet<&str> = areas.iter().map(|a| a.area_name.as_str()).collect();
        let names: Vec<&str> = richness.iter().map(|r| r.area_name.as_str()).collect();
        let unique: HashSet<&str> = names.iter().copied().collect();

        prop_assert_eq!(names.len(), unique.len());
        prop_assert_eq!(unique, expected);
    }

    #[test]
    fn richness_is_bounded_and_sorted(areas in areas_strategy(), joined in joined_strategy()) {
        let richness = aggregate_richness(&joined, &areas);
        let total = total_distinct_species(&joined);

        for record in &richness {
            prop_assert!(record.richness <= total);
        }
        for pair in richness.windows(2) {
            prop_assert!(
                pair[0].richness > pair[1].richness
                    || (pair[0].richness == pair[1].richness && pair[0].area_name < pair[1].area_name)
            );
        }
    }

    #[test]
    fn top_species_respects_n(joined in joined_strategy(), n in 0usize..12) {
        let truncated = top_species(&joined, n, TieMode::Truncate);
        let keep_all = top_species(&joined, n, TieMode::KeepAll);

        prop_assert!(truncated.len() <= n);
        prop_assert!(keep_all.len() >= truncated.len());
        prop_assert_eq!(&keep_all[..truncated.len()], &truncated[..]);

        for pair in keep_all.windows(2) {
            prop_assert!(pair[0].occurrence_count >= pair[1].occurrence_count);
        }
    }

    #[test]
    fn counts_cover_every_named_row(joined in joined_strategy()) {
        let counts = species_counts(&joined);
        let named = joined.iter().filter(|j| j.species().is_some()).count();

        prop_assert_eq!(counts.iter().map(|r| r.occurrence_count).sum::<usize>(), named);
        prop_assert_eq!(counts.len(), total_distinct_species(&joined));
    }
}

//! Distinct-species richness per conservation area

use std::collections::{HashMap, HashSet};

use orquideas_core::models::{ConservationArea, JoinedOccurrence, RichnessRecord};

/// Count distinct named species per area.
///
/// Every area name in `areas` gets exactly one record, zero when nothing
/// matched it; areas sharing a name are merged. Occurrences without an area or
/// without a species are ignored. Sorted by richness descending, then name.
pub fn aggregate_richness(
    joined: &[JoinedOccurrence],
    areas: &[ConservationArea],
) -> Vec<RichnessRecord> {
    let mut species_by_area: HashMap<&str, HashSet<&str>> = HashMap::new();
    for occurrence in joined {
        if let (Some(area), Some(species)) = (occurrence.area_name.as_deref(), occurrence.species()) {
            species_by_area.entry(area).or_default().insert(species);
        }
    }

    let mut seen = HashSet::new();
    let mut records: Vec<RichnessRecord> = areas
        .iter()
        .map(|area| area.area_name.as_str())
        .filter(|name| seen.insert(*name))
        .map(|name| RichnessRecord {
            area_name: name.to_string(),
            richness: species_by_area.get(name).map_or(0, HashSet::len),
        })
        .collect();

    records.sort_by(|a, b| b.richness.cmp(&a.richness).then_with(|| a.area_name.cmp(&b.area_name)));
    records
}

/// Distinct named species across every occurrence, matched or not
pub fn total_distinct_species(joined: &[JoinedOccurrence]) -> usize {
    joined.iter().filter_map(JoinedOccurrence::species).collect::<HashSet<_>>().len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, MultiPolygon};
    use orquideas_core::models::OrchidOccurrence;

    fn area(name: &str) -> ConservationArea {
        let poly = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 0.0)];
        ConservationArea::new(name, MultiPolygon::new(vec![poly]))
    }

    fn joined(species: Option<&str>, area: Option<&str>) -> JoinedOccurrence {
        let mut occurrence = OrchidOccurrence::at(0.0, 0.0);
        if let Some(species) = species {
            occurrence = occurrence.with_species(species);
        }
        JoinedOccurrence::new(occurrence, area.map(str::to_string))
    }

    fn record(name: &str, richness: usize) -> RichnessRecord {
        RichnessRecord { area_name: name.to_string(), richness }
    }

    #[test]
    fn test_two_area_scenario() {
        let areas = vec![area("AC1"), area("AC2")];
        let rows = vec![
            joined(Some("A"), Some("AC1")),
            joined(Some("B"), Some("AC1")),
            joined(Some("A"), Some("AC2")),
            joined(Some("C"), None),
        ];

        assert_eq!(aggregate_richness(&rows, &areas), vec![record("AC1", 2), record("AC2", 1)]);
        assert_eq!(total_distinct_species(&rows), 3);
    }

    #[test]
    fn test_species_counted_once_per_area() {
        let areas = vec![area("AC1")];
        let rows = vec![joined(Some("A"), Some("AC1")), joined(Some("A"), Some("AC1"))];

        assert_eq!(aggregate_richness(&rows, &areas), vec![record("AC1", 1)]);
    }

    #[test]
    fn test_empty_areas_are_zero_filled() {
        let areas = vec![area("Tortuguero"), area("Osa"), area("Arenal")];
        let rows = vec![joined(Some("A"), Some("Osa"))];

        assert_eq!(
            aggregate_richness(&rows, &areas),
            vec![record("Osa", 1), record("Arenal", 0), record("Tortuguero", 0)]
        );
    }

    #[test]
    fn test_null_species_do_not_count() {
        let areas = vec![area("AC1")];
        let rows = vec![joined(None, Some("AC1")), joined(Some("  "), Some("AC1"))];

        assert_eq!(aggregate_richness(&rows, &areas), vec![record("AC1", 0)]);
        assert_eq!(total_distinct_species(&rows), 0);
    }

    #[test]
    fn test_duplicate_area_names_merge() {
        let areas = vec![area("Guanacaste"), area("Guanacaste")];
        let rows = vec![joined(Some("A"), Some("Guanacaste")), joined(Some("B"), Some("Guanacaste"))];

        assert_eq!(aggregate_richness(&rows, &areas), vec![record("Guanacaste", 2)]);
    }

    #[test]
    fn test_no_areas() {
        let rows = vec![joined(Some("A"), None)];
        assert!(aggregate_richness(&rows, &[]).is_empty());
    }
}

//! Facet option sets for filter selectors
//!
//! Facets are derived from the unfiltered base set only. Deriving them from a
//! filtered view would make a selector shrink its own options as soon as a
//! sibling selector is used.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::record::GrantRecord;

/// Distinct selectable values per filterable field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetOptions {
    /// Ascending, byte order
    pub directions: Vec<String>,
    /// Descending, most recent first
    pub years: Vec<i32>,
    /// Ascending, byte order
    pub regions: Vec<String>,
}

impl FacetOptions {
    pub fn is_empty(&self) -> bool {
        self.directions.is_empty() && self.years.is_empty() && self.regions.is_empty()
    }
}

/// Extract facet options from a record set
pub fn extract_facets(records: &[GrantRecord]) -> FacetOptions {
    let mut directions = BTreeSet::new();
    let mut years = BTreeSet::new();
    let mut regions = BTreeSet::new();

    for record in records {
        if let Some(direction) = record.direction().filter(|d| !d.is_empty()) {
            directions.insert(direction);
        }
        if let Some(region) = record.region().filter(|r| !r.is_empty()) {
            regions.insert(region);
        }
        if let Some(year) = record.year {
            years.insert(year);
        }
    }

    FacetOptions {
        directions: directions.into_iter().map(str::to_string).collect(),
        years: years.into_iter().rev().collect(),
        regions: regions.into_iter().map(str::to_string).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::FilterCriteria;
    use crate::filter::filter_records;

    fn sample() -> Vec<GrantRecord> {
        vec![
            GrantRecord::new(1).with_direction("Образование").with_year(2021).with_region("Казань"),
            GrantRecord::new(2).with_direction("Культура").with_year(2023).with_region("Москва"),
            GrantRecord::new(3).with_direction("Образование").with_year(2022).with_region(""),
            GrantRecord::new(4).with_direction("").with_year(2023),
            GrantRecord::new(5).with_region("Белгородская область"),
        ]
    }

    #[test]
    fn test_distinct_sorted_values() {
        let facets = extract_facets(&sample());
        assert_eq!(facets.directions, vec!["Культура", "Образование"]);
        assert_eq!(facets.years, vec![2023, 2022, 2021]);
        assert_eq!(facets.regions, vec!["Белгородская область", "Казань", "Москва"]);
    }

    #[test]
    fn test_strings_sort_case_sensitively() {
        let records = vec![
            GrantRecord::new(1).with_direction("b"),
            GrantRecord::new(2).with_direction("B"),
            GrantRecord::new(3).with_direction("a"),
        ];
        assert_eq!(extract_facets(&records).directions, vec!["B", "a", "b"]);
    }

    #[test]
    fn test_facets_unaffected_by_filtering() {
        let records = sample();
        let before = extract_facets(&records);
        let _ = filter_records(&records, &FilterCriteria::new().with_year(2021));
        assert_eq!(extract_facets(&records), before);
    }

    #[test]
    fn test_empty_input() {
        assert!(extract_facets(&[]).is_empty());
    }
}

//! Free-text search and categorical filtering
//!
//! Filtering is order preserving: the output keeps the relative order of the
//! input and never mutates it. An empty result is a normal outcome.

use crate::criteria::FilterCriteria;
use crate::record::GrantRecord;

/// Criteria prepared for repeated matching.
///
/// Lower-cases the query once instead of once per record.
pub struct CompiledFilter<'c> {
    criteria: &'c FilterCriteria,
    query: Option<String>,
}

impl<'c> CompiledFilter<'c> {
    pub fn new(criteria: &'c FilterCriteria) -> Self {
        // Only the empty query passes everything; whitespace is searched as typed
        let query = if criteria.query.is_empty() {
            None
        } else {
            Some(criteria.query.to_lowercase())
        };

        Self { criteria, query }
    }

    /// Check whether a record passes every active constraint
    pub fn matches(&self, record: &GrantRecord) -> bool {
        self.matches_query(record)
            && matches_text(self.criteria.direction.as_deref(), record.direction())
            && matches_text(self.criteria.region.as_deref(), record.region())
            && self.criteria.year.map_or(true, |year| record.year == Some(year))
            && self.criteria.status.map_or(true, |status| status.matches(record.winner))
    }

    fn matches_query(&self, record: &GrantRecord) -> bool {
        let Some(query) = &self.query else {
            return true;
        };

        [record.name(), record.region(), record.organization()]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(query.as_str()))
    }
}

/// Exact equality; an absent or empty wanted value is no constraint
fn matches_text(wanted: Option<&str>, actual: Option<&str>) -> bool {
    match wanted {
        None | Some("") => true,
        Some(wanted) => actual == Some(wanted),
    }
}

/// Filter records, returning references in input order
pub fn filter_records<'a>(records: &'a [GrantRecord], criteria: &FilterCriteria) -> Vec<&'a GrantRecord> {
    let compiled = CompiledFilter::new(criteria);
    records.iter().filter(|record| compiled.matches(record)).collect()
}

/// Filter records, returning the indices of matches in ascending order
pub fn filter_indices(records: &[GrantRecord], criteria: &FilterCriteria) -> Vec<usize> {
    let compiled = CompiledFilter::new(criteria);
    let matches: Vec<usize> = records
        .iter()
        .enumerate()
        .filter(|(_, record)| compiled.matches(record))
        .map(|(idx, _)| idx)
        .collect();

    tracing::trace!("Filter matched {} of {} records", matches.len(), records.len());
    matches
}

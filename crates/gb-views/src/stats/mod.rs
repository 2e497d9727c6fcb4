//! Summary statistics over grant records

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use gb_core::GrantRecord;

/// Headline numbers for a record set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OverviewStats {
    pub total_projects: usize,
    pub total_winners: usize,
    /// Requested amount summed over winners only
    pub winners_requested: u64,
    pub regions: usize,
    pub organizations: usize,
}

/// Aggregates for one group of records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupStats {
    pub projects: usize,
    pub winners: usize,
    pub winners_requested: u64,
}

impl GroupStats {
    fn add(&mut self, record: &GrantRecord) {
        self.projects += 1;
        if record.winner {
            self.winners += 1;
            self.winners_requested = self.winners_requested.saturating_add(record.requested_grant_amount);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionStats {
    pub region: String,
    #[serde(flatten)]
    pub stats: GroupStats,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearStats {
    pub year: Option<i32>,
    #[serde(flatten)]
    pub stats: GroupStats,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

pub fn overview_stats(records: &[GrantRecord]) -> OverviewStats {
    let mut totals = GroupStats::default();
    let mut regions = BTreeSet::new();
    let mut organizations = BTreeSet::new();

    for record in records {
        totals.add(record);
        if let Some(region) = non_empty(record.region()) {
            regions.insert(region);
        }
        if let Some(org) = non_empty(record.organization()) {
            organizations.insert(org);
        }
    }

    OverviewStats {
        total_projects: totals.projects,
        total_winners: totals.winners,
        winners_requested: totals.winners_requested,
        regions: regions.len(),
        organizations: organizations.len(),
    }
}

/// Per-region aggregates sorted by region; records without a region are skipped
pub fn stats_by_region(records: &[GrantRecord]) -> Vec<RegionStats> {
    let mut groups: BTreeMap<&str, GroupStats> = BTreeMap::new();
    for record in records {
        if let Some(region) = non_empty(record.region()) {
            groups.entry(region).or_default().add(record);
        }
    }

    groups
        .into_iter()
        .map(|(region, stats)| RegionStats {
            region: region.to_string(),
            stats,
        })
        .collect()
}

/// Per-year aggregates ascending by year, records without a year last
pub fn stats_by_year(records: &[GrantRecord]) -> Vec<YearStats> {
    // (true, None) sorts after every (false, Some(year))
    let mut groups: BTreeMap<(bool, Option<i32>), GroupStats> = BTreeMap::new();
    for record in records {
        groups.entry((record.year.is_none(), record.year)).or_default().add(record);
    }

    groups
        .into_iter()
        .map(|((_, year), stats)| YearStats { year, stats })
        .collect()
}

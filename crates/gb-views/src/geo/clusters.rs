//! Marker clusters: records grouped by resolved coordinate

use std::sync::Arc;

use ahash::AHashMap;
use indexmap::IndexMap;
use rand::Rng;
use serde::Serialize;

use gb_core::{Coordinate, GrantId, GrantRecord};

use super::resolver::RegionResolver;
use crate::format::{format_money, truncate_chars};

/// Default display jitter half-width, in degrees
pub const DEFAULT_JITTER: f64 = 0.005;

/// Member records listed in a cluster preview
pub const PREVIEW_LIMIT: usize = 5;

const PREVIEW_NAME_CHARS: usize = 50;
const PREVIEW_ORG_CHARS: usize = 40;

/// Short description of one member record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterEntry {
    pub id: GrantId,
    pub name: String,
    pub organization: String,
    pub amount: String,
    pub winner: bool,
}

impl ClusterEntry {
    fn from_record(record: &GrantRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: truncate_chars(record.name().unwrap_or(""), PREVIEW_NAME_CHARS),
            organization: truncate_chars(record.organization().unwrap_or(""), PREVIEW_ORG_CHARS),
            amount: format_money(record.requested_grant_amount),
            winner: record.winner,
        }
    }
}

/// Records sharing one resolved coordinate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cluster {
    /// Resolved coordinate shared by every member
    pub coordinate: Coordinate,
    /// Where to draw the marker; jittered when the cluster has several members
    pub display: Coordinate,
    /// Region text of the first member
    pub label: String,
    pub count: usize,
    pub winners: usize,
    pub has_winner: bool,
    /// Sum of requested amounts across members
    pub total_requested: u64,
    /// Member ids in input order
    pub members: Vec<GrantId>,
    /// First members, for popups
    pub preview: Vec<ClusterEntry>,
    /// Members not in the preview
    pub remaining: usize,
}

struct ClusterAccumulator {
    coordinate: Coordinate,
    label: String,
    winners: usize,
    total_requested: u64,
    members: Vec<GrantId>,
    preview: Vec<ClusterEntry>,
}

impl ClusterAccumulator {
    fn new(coordinate: Coordinate, label: &str) -> Self {
        Self {
            coordinate,
            label: label.to_string(),
            winners: 0,
            total_requested: 0,
            members: Vec::new(),
            preview: Vec::new(),
        }
    }

    fn push(&mut self, record: &GrantRecord) {
        if record.winner {
            self.winners += 1;
        }
        self.total_requested = self.total_requested.saturating_add(record.requested_grant_amount);
        self.members.push(record.id.clone());
        if self.preview.len() < PREVIEW_LIMIT {
            self.preview.push(ClusterEntry::from_record(record));
        }
    }

    fn finish(self, display: Coordinate) -> Cluster {
        let count = self.members.len();
        Cluster {
            coordinate: self.coordinate,
            display,
            label: self.label,
            count,
            winners: self.winners,
            has_winner: self.winners > 0,
            total_requested: self.total_requested,
            remaining: count - self.preview.len(),
            members: self.members,
            preview: self.preview,
        }
    }
}

/// Groups records by resolved region coordinate
pub struct ClusterBuilder {
    resolver: Arc<dyn RegionResolver>,
    jitter: f64,
}

impl ClusterBuilder {
    pub fn new(resolver: Arc<dyn RegionResolver>) -> Self {
        Self {
            resolver,
            jitter: DEFAULT_JITTER,
        }
    }

    /// Set the jitter half-width; negative or non-finite values disable it
    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = if jitter.is_finite() && jitter > 0.0 { jitter } else { 0.0 };
        self
    }

    pub fn jitter(&self) -> f64 {
        self.jitter
    }

    /// Build clusters in order of first appearance.
    ///
    /// Membership depends only on resolved coordinates. `rng` affects the
    /// display coordinate of multi-member clusters and nothing else.
    pub fn build<R: Rng + ?Sized>(&self, records: &[GrantRecord], rng: &mut R) -> Vec<Cluster> {
        let mut resolved: AHashMap<&str, Coordinate> = AHashMap::new();
        let mut groups: IndexMap<(u64, u64), ClusterAccumulator> = IndexMap::new();

        for record in records {
            let region = record.region_or_empty();
            let coordinate = *resolved
                .entry(region)
                .or_insert_with(|| self.resolver.resolve(region));

            groups
                .entry(coordinate.key())
                .or_insert_with(|| ClusterAccumulator::new(coordinate, region))
                .push(record);
        }

        let clusters: Vec<Cluster> = groups
            .into_values()
            .map(|group| {
                let display = if group.members.len() > 1 {
                    self.jittered(group.coordinate, rng)
                } else {
                    group.coordinate
                };
                group.finish(display)
            })
            .collect();

        tracing::debug!(
            "Built {} clusters from {} records ({} distinct regions)",
            clusters.len(),
            records.len(),
            resolved.len()
        );
        clusters
    }

    fn jittered<R: Rng + ?Sized>(&self, coordinate: Coordinate, rng: &mut R) -> Coordinate {
        if self.jitter == 0.0 {
            return coordinate;
        }
        coordinate.offset(
            rng.gen_range(-self.jitter..self.jitter),
            rng.gen_range(-self.jitter..self.jitter),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::resolver::{GazetteerResolver, NATIONAL_CENTER};
    use crate::geo::Gazetteer;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn builder() -> ClusterBuilder {
        ClusterBuilder::new(Arc::new(GazetteerResolver::russian_cities()))
    }

    fn record(id: i64, region: &str) -> GrantRecord {
        GrantRecord::new(id).with_region(region)
    }

    #[test]
    fn test_groups_by_resolved_coordinate() {
        let records = vec![record(1, "Москва"), record(2, "Москва"), record(3, "Нижний Тагил")];
        let clusters = builder().build(&records, &mut StdRng::seed_from_u64(1));

        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].count, 2);
        assert_eq!(clusters[0].label, "Москва");
        assert_eq!(clusters[1].count, 1);
        assert_eq!(clusters[1].label, "Нижний Тагил");
        assert_eq!(
            clusters[1].coordinate,
            Gazetteer::russian_cities().get("Нижний Новгород").unwrap()
        );
    }

    #[test]
    fn test_different_texts_share_a_cluster() {
        // Both resolve to the national center: one exactly, one by fallback
        let records = vec![record(1, "Якутия"), record(2, "Москва"), GrantRecord::new(3)];
        let clusters = builder().build(&records, &mut StdRng::seed_from_u64(2));

        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].coordinate, NATIONAL_CENTER);
        assert_eq!(clusters[0].label, "Якутия");
        assert_eq!(clusters[0].members, vec![GrantId::Number(1), GrantId::Number(2), GrantId::Number(3)]);
    }

    #[test]
    fn test_counts_sum_to_input() {
        let regions = ["Казань", "г. Казань", "Пермь", "Самарская область", "", "Уфа", "Омск"];
        let records: Vec<GrantRecord> = (0..70)
            .map(|i| record(i, regions[i as usize % regions.len()]))
            .collect();

        let clusters = builder().build(&records, &mut StdRng::seed_from_u64(3));
        let total: usize = clusters.iter().map(|c| c.count).sum();
        assert_eq!(total, records.len());
    }

    #[test]
    fn test_winner_flags_and_totals() {
        let records = vec![
            record(1, "Пермь").with_amount(100),
            record(2, "Пермь").with_winner(true).with_amount(250),
            record(3, "Омск").with_amount(5),
        ];
        let clusters = builder().build(&records, &mut StdRng::seed_from_u64(4));

        assert!(clusters[0].has_winner);
        assert_eq!(clusters[0].winners, 1);
        assert_eq!(clusters[0].total_requested, 350);
        assert!(!clusters[1].has_winner);
    }

    #[test]
    fn test_jitter_is_bounded_and_only_for_groups() {
        let records = vec![record(1, "Казань"), record(2, "Казань"), record(3, "Омск")];
        let builder = builder().with_jitter(0.01);
        let clusters = builder.build(&records, &mut StdRng::seed_from_u64(5));

        let kazan = &clusters[0];
        assert!((kazan.display.lat - kazan.coordinate.lat).abs() < 0.01);
        assert!((kazan.display.lng - kazan.coordinate.lng).abs() < 0.01);
        assert_eq!(clusters[1].display, clusters[1].coordinate);
    }

    #[test]
    fn test_membership_independent_of_seed() {
        let records: Vec<GrantRecord> = ["Казань", "Москва", "Казань", "Пермь", "Нижний Тагил"]
            .iter()
            .enumerate()
            .map(|(i, r)| record(i as i64, r))
            .collect();

        let a = builder().build(&records, &mut StdRng::seed_from_u64(10));
        let b = builder().build(&records, &mut StdRng::seed_from_u64(99));

        let membership = |clusters: &[Cluster]| -> Vec<Vec<GrantId>> {
            clusters.iter().map(|c| c.members.clone()).collect()
        };
        assert_eq!(membership(&a), membership(&b));

        let same_seed = builder().build(&records, &mut StdRng::seed_from_u64(10));
        assert_eq!(a, same_seed);
    }

    #[test]
    fn test_zero_jitter_keeps_coordinates() {
        let records = vec![record(1, "Уфа"), record(2, "Уфа")];
        let clusters = builder().with_jitter(0.0).build(&records, &mut StdRng::seed_from_u64(6));
        assert_eq!(clusters[0].display, clusters[0].coordinate);
    }

    #[test]
    fn test_preview_is_limited() {
        let records: Vec<GrantRecord> = (0..8)
            .map(|i| record(i, "Воронеж").with_name("Очень длинное название проекта, которое не помещается во всплывающее окно"))
            .collect();
        let clusters = builder().build(&records, &mut StdRng::seed_from_u64(7));

        assert_eq!(clusters[0].preview.len(), PREVIEW_LIMIT);
        assert_eq!(clusters[0].remaining, 3);
        assert!(clusters[0].preview[0].name.ends_with("..."));
        assert_eq!(clusters[0].preview[0].name.chars().count(), PREVIEW_NAME_CHARS + 3);
    }

    #[test]
    fn test_empty_input() {
        assert!(builder().build(&[], &mut StdRng::seed_from_u64(8)).is_empty());
    }
}

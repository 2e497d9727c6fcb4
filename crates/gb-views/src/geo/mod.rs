//! Geographic placement of grant records
//!
//! The gazetteer-plus-heuristics resolver stands in for a geocoding service.
//! Cluster building only talks to the [`RegionResolver`] trait, so a real
//! geocoder can replace it without touching filtering or clustering.

mod clusters;
mod gazetteer;
mod resolver;

pub use clusters::{Cluster, ClusterBuilder, ClusterEntry, DEFAULT_JITTER, PREVIEW_LIMIT};
pub use gazetteer::{Gazetteer, GazetteerEntry};
pub use resolver::{GazetteerResolver, MatchKind, RegionResolver, Resolution, NATIONAL_CENTER};

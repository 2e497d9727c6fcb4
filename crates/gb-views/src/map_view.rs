//! Map view: cached clusters for the session's filtered set

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use gb_core::{BrowseSession, Coordinate, SessionContext, SessionSubscriber, ViewMode};

use crate::geo::{Cluster, ClusterBuilder};

/// Initial map center when there is nothing to frame
pub const MAP_CENTER: Coordinate = Coordinate::new(61.5240, 105.3188);

/// Fraction of the extent added on every side when framing markers
const BOUNDS_PADDING: f64 = 0.1;

/// Latitude/longitude box for framing the map
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl MapBounds {
    pub fn center(&self) -> Coordinate {
        Coordinate::new((self.south + self.north) / 2.0, (self.west + self.east) / 2.0)
    }

    /// Padded box around resolved cluster coordinates
    pub fn around(clusters: &[Cluster]) -> Self {
        let mut coords = clusters.iter().map(|c| c.coordinate);
        let Some(first) = coords.next() else {
            return Self::point(MAP_CENTER);
        };

        let mut bounds = Self::point(first);
        for c in coords {
            bounds.south = bounds.south.min(c.lat);
            bounds.north = bounds.north.max(c.lat);
            bounds.west = bounds.west.min(c.lng);
            bounds.east = bounds.east.max(c.lng);
        }

        let pad_lat = (bounds.north - bounds.south) * BOUNDS_PADDING;
        let pad_lng = (bounds.east - bounds.west) * BOUNDS_PADDING;
        Self {
            south: bounds.south - pad_lat,
            north: bounds.north + pad_lat,
            west: bounds.west - pad_lng,
            east: bounds.east + pad_lng,
        }
    }

    fn point(c: Coordinate) -> Self {
        Self {
            south: c.lat,
            north: c.lat,
            west: c.lng,
            east: c.lng,
        }
    }
}

struct CachedClusters {
    session: u64,
    revision: u64,
    clusters: Arc<Vec<Cluster>>,
}

impl CachedClusters {
    fn key(&self) -> (u64, u64) {
        (self.session, self.revision)
    }
}

/// Builds clusters for the map and reuses them until the filtered set changes
///
/// The cache is keyed on session identity and revision, so one view can be
/// shared by several sessions.
pub struct MapView {
    builder: ClusterBuilder,
    rng: Mutex<StdRng>,
    cache: RwLock<Option<CachedClusters>>,
    stale: AtomicBool,
}

impl MapView {
    /// Create a map view with an explicit generator for display jitter
    pub fn new(builder: ClusterBuilder, rng: StdRng) -> Self {
        Self {
            builder,
            rng: Mutex::new(rng),
            cache: RwLock::new(None),
            stale: AtomicBool::new(true),
        }
    }

    pub fn with_seed(builder: ClusterBuilder, seed: u64) -> Self {
        Self::new(builder, StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy(builder: ClusterBuilder) -> Self {
        Self::new(builder, StdRng::from_entropy())
    }

    /// Clusters for the session's current filtered set
    pub fn clusters(&self, session: &BrowseSession) -> Arc<Vec<Cluster>> {
        let key = (session.id(), session.get_context().revision);

        if let Some(cached) = self.cache.read().as_ref() {
            if cached.key() == key {
                return cached.clusters.clone();
            }
        }

        let filtered = session.filtered();
        let clusters = Arc::new(self.builder.build(&filtered, &mut *self.rng.lock()));
        tracing::debug!(
            "Map view rebuilt {} clusters (session {}, revision {})",
            clusters.len(),
            key.0,
            key.1
        );

        *self.cache.write() = Some(CachedClusters {
            session: key.0,
            revision: key.1,
            clusters: clusters.clone(),
        });
        self.stale.store(false, Ordering::SeqCst);
        clusters
    }

    /// Framing box for the current clusters
    pub fn bounds(&self, session: &BrowseSession) -> MapBounds {
        MapBounds::around(&self.clusters(session))
    }

    /// Whether the filtered set changed since the last build while on the map
    pub fn is_stale(&self) -> bool {
        self.stale.load(Ordering::SeqCst)
    }

    fn cached_key(&self) -> Option<(u64, u64)> {
        self.cache.read().as_ref().map(CachedClusters::key)
    }
}

impl SessionSubscriber for MapView {
    fn on_session_change(&self, context: &SessionContext) {
        if context.view_mode != ViewMode::Map {
            return;
        }
        if self.cached_key() != Some((context.session_id, context.revision)) {
            self.stale.store(true, Ordering::SeqCst);
        }
    }
}

//! Presentation-side views over the browse session
//!
//! Region resolution and marker clustering for the map, the table of the
//! current page and summary statistics.

mod format;
pub mod geo;
mod map_view;
mod stats;
mod tables;

pub use format::{format_money, projects_label, truncate_chars};
pub use geo::{Cluster, ClusterBuilder, GazetteerResolver, RegionResolver};
pub use map_view::{MapBounds, MapView, MAP_CENTER};
pub use stats::{
    overview_stats, stats_by_region, stats_by_year, GroupStats, OverviewStats, RegionStats,
    YearStats,
};
pub use tables::{status_label, table_rows, TableConfig, TableRow, TableView};

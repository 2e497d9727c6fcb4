use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

mod engine;
mod subscriber;

pub use engine::BrowseSession;
pub use subscriber::SessionSubscriber;

use crate::criteria::FilterCriteria;
use crate::pagination::PageState;

/// How the filtered set is presented
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Paginated table
    #[default]
    Table,
    /// Clustered map markers
    Map,
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewMode::Table => f.write_str("table"),
            ViewMode::Map => f.write_str("map"),
        }
    }
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "table" => Ok(ViewMode::Table),
            "map" => Ok(ViewMode::Map),
            other => Err(format!("unknown view mode '{}'", other)),
        }
    }
}

/// Snapshot of session state passed to subscribers
#[derive(Debug, Clone, PartialEq)]
pub struct SessionContext {
    /// Identity of the session that produced this snapshot
    pub session_id: u64,
    pub criteria: FilterCriteria,
    pub page: PageState,
    pub view_mode: ViewMode,
    pub total_records: usize,
    pub total_matches: usize,
    pub total_pages: usize,
    /// Bumped whenever the filtered set may have changed
    pub revision: u64,
}

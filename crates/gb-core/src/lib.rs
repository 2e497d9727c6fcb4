//! Core functionality for the grant browser
//!
//! This crate provides the record model and the browse pipeline: free-text
//! search with categorical filters, facet extraction from the base set and
//! page slicing, plus the session that keeps them consistent.

pub mod criteria;
pub mod events;
pub mod facets;
pub mod filter;
pub mod pagination;
pub mod record;
pub mod session;

// Re-export commonly used types
pub use criteria::{FilterCriteria, ParseStatusError, StatusFilter};
pub use facets::{extract_facets, FacetOptions};
pub use filter::{filter_indices, filter_records, CompiledFilter};
pub use pagination::{paginate, PageState, DEFAULT_PAGE_SIZE};
pub use record::{Coordinate, GrantId, GrantRecord};
pub use session::{BrowseSession, SessionContext, SessionSubscriber, ViewMode};
pub use data::RecordSource;

pub mod data {
    use crate::record::GrantRecord;

    /// Trait for record sources.
    ///
    /// Sources validate record shape; anything they return is well typed.
    #[async_trait::async_trait]
    pub trait RecordSource: Send + Sync {
        /// Load every record
        async fn load(&self) -> anyhow::Result<Vec<GrantRecord>>;

        /// Get total record count
        async fn record_count(&self) -> anyhow::Result<usize> {
            Ok(self.load().await?.len())
        }

        /// Get the source name/path
        fn source_name(&self) -> &str;
    }
}

//! Session subscriber trait

use super::SessionContext;

/// Trait for components that need to respond to session changes
pub trait SessionSubscriber: Send + Sync {
    /// Called after the base set, criteria, page or view mode changes
    fn on_session_change(&self, context: &SessionContext);
}

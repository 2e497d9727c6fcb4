use std::sync::Arc;
use parking_lot::Mutex;
use ahash::AHashMap;

/// System-wide event bus
pub struct EventBus {
    handlers: Arc<Mutex<AHashMap<std::any::TypeId, Vec<Box<dyn EventHandler>>>>>,
}

/// Event trait that all events must implement
pub trait Event: Send + Sync + 'static {
    fn as_any(&self) -> &dyn std::any::Any;
}

/// Handler trait for event handlers
pub trait EventHandler: Send + Sync {
    fn handle(&mut self, event: &dyn Event);
}

/// Common browse events
pub mod events {
    use chrono::{DateTime, Utc};

    use super::Event;
    use crate::criteria::FilterCriteria;
    use crate::session::ViewMode;

    /// Base record set replaced
    #[derive(Debug, Clone)]
    pub struct RecordsLoaded {
        pub source_name: String,
        pub record_count: usize,
        pub loaded_at: DateTime<Utc>,
    }

    /// A record source failed to load
    #[derive(Debug, Clone)]
    pub struct SourceFailed {
        pub source_name: String,
        pub error: String,
    }

    /// Filter criteria replaced
    #[derive(Debug, Clone)]
    pub struct CriteriaChanged {
        pub criteria: FilterCriteria,
        pub total_matches: usize,
    }

    /// Current page moved
    #[derive(Debug, Clone)]
    pub struct PageChanged {
        pub page: usize,
        pub total_pages: usize,
    }

    /// Switched between table and map
    #[derive(Debug, Clone)]
    pub struct ViewModeChanged {
        pub mode: ViewMode,
    }

    macro_rules! impl_event {
        ($($t:ty),*) => {
            $(
                impl Event for $t {
                    fn as_any(&self) -> &dyn std::any::Any {
                        self
                    }
                }
            )*
        }
    }

    impl_event!(
        RecordsLoaded,
        SourceFailed,
        CriteriaChanged,
        PageChanged,
        ViewModeChanged
    );
}

impl EventBus {
    /// Create a new event bus
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Mutex::new(AHashMap::new())),
        }
    }

    /// Subscribe to events of a specific type
    pub fn subscribe<E: Event>(&self, handler: Box<dyn EventHandler>) {
        let type_id = std::any::TypeId::of::<E>();
        let mut handlers = self.handlers.lock();
        handlers.entry(type_id).or_insert_with(Vec::new).push(handler);
    }

    /// Publish an event.
    ///
    /// Handlers run while the bus is locked and must not publish themselves.
    pub fn publish<E: Event>(&self, event: E) {
        let type_id = std::any::TypeId::of::<E>();
        let mut handlers = self.handlers.lock();

        if let Some(event_handlers) = handlers.get_mut(&type_id) {
            for handler in event_handlers.iter_mut() {
                handler.handle(&event);
            }
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper struct for creating event handlers from closures
pub struct ClosureEventHandler<F> {
    handler: F,
}

impl<F> EventHandler for ClosureEventHandler<F>
where
    F: FnMut(&dyn Event) + Send + Sync,
{
    fn handle(&mut self, event: &dyn Event) {
        (self.handler)(event);
    }
}

/// Create an event handler from a closure
pub fn handler_from_fn<F>(f: F) -> Box<dyn EventHandler>
where
    F: FnMut(&dyn Event) + Send + Sync + 'static,
{
    Box::new(ClosureEventHandler { handler: f })
}

//! Browse session implementation

use super::{SessionContext, SessionSubscriber, ViewMode};
use crate::criteria::FilterCriteria;
use crate::events::{events, EventBus};
use crate::facets::{extract_facets, FacetOptions};
use crate::filter::filter_indices;
use crate::pagination::{paginate, PageState};
use crate::record::{GrantId, GrantRecord};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use parking_lot::RwLock;

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Session state stored internally
struct SessionState {
    source_name: String,
    records: Arc<Vec<GrantRecord>>,
    facets: Arc<FacetOptions>,
    criteria: FilterCriteria,
    /// Indices into `records`, ascending
    matches: Arc<Vec<usize>>,
    page: PageState,
    view_mode: ViewMode,
    revision: u64,
}

/// Holds the base record set and derives the filtered, paginated view.
///
/// Facets are computed only in [`BrowseSession::load`]. Every criteria change
/// refilters and resets the page to 1 under the same write lock, so no reader
/// ever sees the new filtered set paired with a stale page number.
pub struct BrowseSession {
    id: u64,
    state: Arc<RwLock<SessionState>>,
    subscribers: Arc<RwLock<Vec<Weak<dyn SessionSubscriber>>>>,
    events: Option<Arc<EventBus>>,
}

impl BrowseSession {
    /// Create an empty session
    pub fn new(page_size: usize) -> Self {
        let state = SessionState {
            source_name: String::new(),
            records: Arc::new(Vec::new()),
            facets: Arc::new(FacetOptions::default()),
            criteria: FilterCriteria::default(),
            matches: Arc::new(Vec::new()),
            page: PageState::new(page_size),
            view_mode: ViewMode::default(),
            revision: 0,
        };

        Self {
            id: NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed),
            state: Arc::new(RwLock::new(state)),
            subscribers: Arc::new(RwLock::new(Vec::new())),
            events: None,
        }
    }

    /// Process-unique identity of this session
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Publish session events on the given bus
    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.events = Some(bus);
        self
    }

    /// Replace the base record set.
    ///
    /// Recomputes facets, reapplies the current criteria and returns to page 1.
    pub fn load(&self, source_name: impl Into<String>, records: Vec<GrantRecord>) {
        let source_name = source_name.into();
        let facets = extract_facets(&records);

        let mut state = self.state.write();
        let matches = filter_indices(&records, &state.criteria);
        tracing::info!(
            "Loaded {} records from '{}' ({} directions, {} years, {} regions)",
            records.len(),
            source_name,
            facets.directions.len(),
            facets.years.len(),
            facets.regions.len()
        );

        state.source_name = source_name.clone();
        state.records = Arc::new(records);
        state.facets = Arc::new(facets);
        state.matches = Arc::new(matches);
        state.page = state.page.reset();
        state.revision += 1;
        let record_count = state.records.len();
        drop(state);

        self.publish(events::RecordsLoaded {
            source_name,
            record_count,
            loaded_at: chrono::Utc::now(),
        });
        self.notify_subscribers();
    }

    /// Replace the filter criteria.
    ///
    /// Returns the number of matching records. Identical criteria leave the
    /// session (and its page) untouched.
    pub fn set_criteria(&self, criteria: FilterCriteria) -> usize {
        let criteria = criteria.normalized();
        let mut state = self.state.write();

        if state.criteria == criteria {
            return state.matches.len();
        }

        let matches = filter_indices(&state.records, &criteria);
        tracing::debug!(
            "Criteria changed: {} of {} records match {:?}",
            matches.len(),
            state.records.len(),
            criteria
        );

        let total_matches = matches.len();
        state.criteria = criteria.clone();
        state.matches = Arc::new(matches);
        state.page = state.page.reset();
        state.revision += 1;
        drop(state);

        self.publish(events::CriteriaChanged {
            criteria,
            total_matches,
        });
        self.notify_subscribers();
        total_matches
    }

    /// Drop every constraint
    pub fn clear_criteria(&self) -> usize {
        self.set_criteria(FilterCriteria::default())
    }

    /// Move to a page, clamped into the valid range. Returns the page reached.
    pub fn set_page(&self, number: usize) -> usize {
        let mut state = self.state.write();
        let total = state.matches.len();
        let page = state.page.with_number(number).clamped(total);

        if page.number() != number {
            tracing::debug!(
                "Requested page {} clamped to {} ({} matches)",
                number,
                page.number(),
                total
            );
        }

        let changed = page != state.page;
        state.page = page;
        let total_pages = page.total_pages(total);
        drop(state);

        if changed {
            self.publish(events::PageChanged {
                page: page.number(),
                total_pages,
            });
            self.notify_subscribers();
        }
        page.number()
    }

    /// Navigate forward by one page
    pub fn next_page(&self) -> Result<(), String> {
        let context = self.get_context();
        if context.page.number() >= context.total_pages {
            return Err("Already at last page".to_string());
        }
        self.set_page(context.page.number() + 1);
        Ok(())
    }

    /// Navigate backward by one page
    pub fn previous_page(&self) -> Result<(), String> {
        let context = self.get_context();
        if context.page.number() <= 1 {
            return Err("Already at first page".to_string());
        }
        self.set_page(context.page.number() - 1);
        Ok(())
    }

    /// Switch between table and map presentation
    pub fn set_view_mode(&self, mode: ViewMode) {
        let mut state = self.state.write();
        if state.view_mode == mode {
            return;
        }
        state.view_mode = mode;
        drop(state);

        self.publish(events::ViewModeChanged { mode });
        self.notify_subscribers();
    }

    /// Get current session context
    pub fn get_context(&self) -> SessionContext {
        let state = self.state.read();
        let total_matches = state.matches.len();
        SessionContext {
            session_id: self.id,
            criteria: state.criteria.clone(),
            page: state.page,
            view_mode: state.view_mode,
            total_records: state.records.len(),
            total_matches,
            total_pages: state.page.total_pages(total_matches),
            revision: state.revision,
        }
    }

    /// Name of the source the base set came from
    pub fn source_name(&self) -> String {
        self.state.read().source_name.clone()
    }

    /// The unfiltered base set
    pub fn records(&self) -> Arc<Vec<GrantRecord>> {
        self.state.read().records.clone()
    }

    /// Look up a record of the base set by identity, ignoring the filters
    pub fn record(&self, id: &GrantId) -> Option<GrantRecord> {
        let state = self.state.read();
        let found = state.records.iter().find(|record| &record.id == id).cloned();
        if found.is_none() {
            tracing::debug!("No record with id {} in '{}'", id, state.source_name);
        }
        found
    }

    /// Facets of the base set
    pub fn facets(&self) -> Arc<FacetOptions> {
        self.state.read().facets.clone()
    }

    /// Every record matching the current criteria, in base order
    pub fn filtered(&self) -> Vec<GrantRecord> {
        let state = self.state.read();
        state.matches.iter().map(|&idx| state.records[idx].clone()).collect()
    }

    /// Records on the current page
    pub fn current_page(&self) -> Vec<GrantRecord> {
        let state = self.state.read();
        paginate(&state.matches, state.page)
            .iter()
            .map(|&idx| state.records[idx].clone())
            .collect()
    }

    /// Add a subscriber
    pub fn add_subscriber(&self, subscriber: Arc<dyn SessionSubscriber>) {
        let mut subscribers = self.subscribers.write();
        subscribers.push(Arc::downgrade(&subscriber));
    }

    fn publish<E: crate::events::Event>(&self, event: E) {
        if let Some(bus) = &self.events {
            bus.publish(event);
        }
    }

    /// Notify all subscribers of a session change
    fn notify_subscribers(&self) {
        let context = self.get_context();
        let mut subscribers = self.subscribers.write();

        // Remove any dead weak references
        subscribers.retain(|weak| weak.strong_count() > 0);

        for weak in subscribers.iter() {
            if let Some(subscriber) = weak.upgrade() {
                subscriber.on_session_change(&context);
            }
        }
    }
}

impl Default for BrowseSession {
    fn default() -> Self {
        Self::new(crate::pagination::DEFAULT_PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::StatusFilter;
    use crate::events::handler_from_fn;
    use parking_lot::Mutex;

    fn records(n: usize) -> Vec<GrantRecord> {
        (0..n)
            .map(|i| {
                GrantRecord::new(i as i64)
                    .with_name(format!("Проект {}", i))
                    .with_region(if i % 2 == 0 { "Москва" } else { "Казань" })
                    .with_year(2020 + (i % 3) as i32)
                    .with_winner(i % 5 == 0)
            })
            .collect()
    }

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<SessionContext>>,
    }

    impl SessionSubscriber for Recorder {
        fn on_session_change(&self, context: &SessionContext) {
            self.seen.lock().push(context.clone());
        }
    }

    #[test]
    fn test_load_computes_facets_and_pages() {
        let session = BrowseSession::new(25);
        session.load("test", records(55));

        let context = session.get_context();
        assert_eq!(context.total_records, 55);
        assert_eq!(context.total_matches, 55);
        assert_eq!(context.total_pages, 3);
        assert_eq!(session.facets().years, vec![2022, 2021, 2020]);
        assert_eq!(session.current_page().len(), 25);
    }

    #[test]
    fn test_set_page_clamps_to_last_page() {
        let session = BrowseSession::new(25);
        session.load("test", records(55));

        assert_eq!(session.set_page(4), 3);
        assert_eq!(session.current_page().len(), 5);
        assert_eq!(session.set_page(0), 1);
    }

    #[test]
    fn test_criteria_change_resets_page() {
        let session = BrowseSession::new(10);
        session.load("test", records(55));
        session.set_page(5);

        let matches = session.set_criteria(FilterCriteria::new().with_region("Москва"));
        assert_eq!(matches, 28);

        let context = session.get_context();
        assert_eq!(context.page.number(), 1);
        assert_eq!(context.total_pages, 3);
        assert!(session.filtered().iter().all(|r| r.region() == Some("Москва")));
    }

    #[test]
    fn test_identical_criteria_keep_page() {
        let session = BrowseSession::new(10);
        session.load("test", records(55));
        session.set_criteria(FilterCriteria::new().with_year(2020));
        session.set_page(2);

        session.set_criteria(FilterCriteria::new().with_year(2020));
        assert_eq!(session.get_context().page.number(), 2);
    }

    #[test]
    fn test_facets_survive_filtering() {
        let session = BrowseSession::new(10);
        session.load("test", records(30));
        let before = session.facets();

        session.set_criteria(
            FilterCriteria::new()
                .with_region("Казань")
                .with_status(StatusFilter::Winner),
        );
        assert_eq!(*session.facets(), *before);
        assert_eq!(session.facets().regions, vec!["Казань", "Москва"]);
    }

    #[test]
    fn test_record_lookup_ignores_filters() {
        let session = BrowseSession::new(10);
        session.load("test", records(6));
        session.set_criteria(FilterCriteria::new().with_region("Москва"));

        // id 3 is in Казань, outside the filtered set
        let found = session.record(&GrantId::Number(3));
        assert_eq!(found.as_ref().and_then(|r| r.region()), Some("Казань"));

        assert_eq!(session.record(&GrantId::Number(99)), None);
        assert_eq!(session.record(&GrantId::from("3")), None);
    }

    #[test]
    fn test_sessions_have_distinct_ids() {
        let a = BrowseSession::new(10);
        let b = BrowseSession::new(10);
        assert_ne!(a.id(), b.id());
        assert_eq!(a.get_context().session_id, a.id());
    }

    #[test]
    fn test_next_and_previous_stop_at_bounds() {
        let session = BrowseSession::new(25);
        session.load("test", records(30));

        assert!(session.previous_page().is_err());
        assert!(session.next_page().is_ok());
        assert!(session.next_page().is_err());
        assert_eq!(session.get_context().page.number(), 2);
    }

    #[test]
    fn test_subscribers_notified_and_pruned() {
        let session = BrowseSession::new(25);
        let recorder = Arc::new(Recorder::default());
        session.add_subscriber(recorder.clone());

        session.load("test", records(3));
        session.set_view_mode(ViewMode::Map);
        session.set_view_mode(ViewMode::Map);

        {
            let seen = recorder.seen.lock();
            assert_eq!(seen.len(), 2);
            assert_eq!(seen[1].view_mode, ViewMode::Map);
            assert_eq!(seen[0].revision, seen[1].revision);
        }

        drop(recorder);
        session.clear_criteria();
        session.set_criteria(FilterCriteria::new().with_query("проект 1"));
        assert!(session.subscribers.read().is_empty());
    }

    #[test]
    fn test_events_published_on_bus() {
        let bus = Arc::new(EventBus::new());
        let loaded = Arc::new(Mutex::new(Vec::new()));

        let sink = loaded.clone();
        bus.subscribe::<events::RecordsLoaded>(handler_from_fn(move |event| {
            if let Some(e) = event.as_any().downcast_ref::<events::RecordsLoaded>() {
                sink.lock().push((e.source_name.clone(), e.record_count));
            }
        }));

        let session = BrowseSession::new(25).with_event_bus(bus);
        session.load("grants.json", records(7));

        assert_eq!(*loaded.lock(), vec![("grants.json".to_string(), 7)]);
    }
}

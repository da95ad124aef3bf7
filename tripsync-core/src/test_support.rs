//! In-memory test doubles for the I/O seams.
//!
//! [`StubTripBackend`] keeps a trip in memory and applies mutations to it the
//! way the real backend would, recording every call. [`StubPlaceSearch`]
//! answers text searches from a fixed table.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::{
    AuthToken, BackendError, Destination, DestinationId, NewDestination, PlaceCandidate,
    PlaceSearch, RescheduleDestination, SearchError, TextQuery, Trip, TripBackend, TripId,
    TripSummary,
};

const STUB_URL: &str = "stub://backend";

/// Kinds of backend call, used to target injected failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    /// `fetch_trip`.
    Fetch,
    /// `create_destination`.
    Create,
    /// `reschedule_destination`.
    Reschedule,
    /// `delete_destination`.
    Delete,
}

/// A recorded backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    /// The trip was read.
    Fetch,
    /// A destination was created.
    Create {
        /// Destination name.
        name: String,
        /// Requested visit time, rendered as ISO-8601.
        visit_time: Option<String>,
    },
    /// A destination was rescheduled.
    Reschedule {
        /// Destination moved.
        destination_id: DestinationId,
        /// New visit time, rendered as ISO-8601.
        visit_time: Option<String>,
    },
    /// A destination was deleted.
    Delete {
        /// Destination removed.
        destination_id: DestinationId,
    },
}

impl BackendCall {
    /// The kind of this call.
    #[must_use]
    pub const fn kind(&self) -> CallKind {
        match self {
            Self::Fetch => CallKind::Fetch,
            Self::Create { .. } => CallKind::Create,
            Self::Reschedule { .. } => CallKind::Reschedule,
            Self::Delete { .. } => CallKind::Delete,
        }
    }
}

#[derive(Debug)]
struct StubState {
    trip: Trip,
    next_id: DestinationId,
    calls: Vec<BackendCall>,
    failures: Vec<(CallKind, BackendError)>,
    fetch_delays: VecDeque<Duration>,
    token: Option<AuthToken>,
}

/// In-memory [`TripBackend`] holding a single trip.
///
/// Created destinations receive increasing ids starting after the largest id
/// already present. Deleting or rescheduling an unknown id answers with a
/// 404, like the real backend.
#[derive(Debug)]
pub struct StubTripBackend {
    state: Mutex<StubState>,
}

impl StubTripBackend {
    /// A backend holding trip `id` with the given destinations.
    pub fn new(id: impl Into<TripId>, destinations: Vec<Destination>) -> Self {
        Self::with_trip(Trip {
            id: id.into(),
            summary: TripSummary::default(),
            destinations,
        })
    }

    /// A backend holding `trip`.
    #[must_use]
    pub fn with_trip(trip: Trip) -> Self {
        let next_id = trip
            .destinations
            .iter()
            .map(|d| d.id)
            .max()
            .map_or(1, |max| max + 1);
        Self {
            state: Mutex::new(StubState {
                trip,
                next_id,
                calls: Vec::new(),
                failures: Vec::new(),
                fetch_delays: VecDeque::new(),
                token: None,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, StubState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make the next call of `kind` fail with `error`.
    ///
    /// Failures queue per kind and are consumed in order.
    pub fn fail_next(&self, kind: CallKind, error: BackendError) {
        self.state().failures.push((kind, error));
    }

    /// Delay the next `fetch_trip` response by `delay`.
    ///
    /// The trip is captured when the call starts, so a delayed fetch returns
    /// the state as it was before any concurrent mutation.
    pub fn delay_next_fetch(&self, delay: Duration) {
        self.state().fetch_delays.push_back(delay);
    }

    /// Replace the stored destinations without recording a call.
    pub fn set_destinations(&self, destinations: Vec<Destination>) {
        let mut state = self.state();
        if let Some(max) = destinations.iter().map(|d| d.id).max() {
            state.next_id = state.next_id.max(max + 1);
        }
        state.trip.destinations = destinations;
    }

    /// The stored trip.
    #[must_use]
    pub fn trip(&self) -> Trip {
        self.state().trip.clone()
    }

    /// Every call received so far.
    #[must_use]
    pub fn calls(&self) -> Vec<BackendCall> {
        self.state().calls.clone()
    }

    /// Number of calls of `kind` received so far.
    #[must_use]
    pub fn count(&self, kind: CallKind) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|call| call.kind() == kind)
            .count()
    }

    /// The token most recently installed via `set_auth_token`.
    #[must_use]
    pub fn token(&self) -> Option<AuthToken> {
        self.state().token.clone()
    }

    fn begin(&self, call: BackendCall) -> Result<MutexGuard<'_, StubState>, BackendError> {
        let mut state = self.state();
        let kind = call.kind();
        state.calls.push(call);
        if let Some(pos) = state.failures.iter().position(|(k, _)| *k == kind) {
            let (_, error) = state.failures.remove(pos);
            return Err(error);
        }
        Ok(state)
    }
}

fn not_found(destination_id: DestinationId) -> BackendError {
    BackendError::Http {
        url: STUB_URL.to_owned(),
        status: 404,
        message: format!("destination {destination_id} not found"),
    }
}

fn check_trip(state: &StubState, trip: &TripId) -> Result<(), BackendError> {
    if state.trip.id == *trip {
        Ok(())
    } else {
        Err(BackendError::Http {
            url: STUB_URL.to_owned(),
            status: 404,
            message: format!("trip {trip} not found"),
        })
    }
}

#[async_trait]
impl TripBackend for StubTripBackend {
    fn set_auth_token(&self, token: &AuthToken) {
        self.state().token = Some(token.clone());
    }

    async fn fetch_trip(&self, trip: &TripId) -> Result<Trip, BackendError> {
        let (snapshot, delay) = {
            let mut state = self.begin(BackendCall::Fetch)?;
            check_trip(&state, trip)?;
            (state.trip.clone(), state.fetch_delays.pop_front())
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(snapshot)
    }

    async fn create_destination(
        &self,
        trip: &TripId,
        destination: &NewDestination,
    ) -> Result<(), BackendError> {
        let visit_time = destination.visit_time.map(|t| t.to_string());
        let mut state = self.begin(BackendCall::Create {
            name: destination.name.clone(),
            visit_time: visit_time.clone(),
        })?;
        check_trip(&state, trip)?;
        let id = state.next_id;
        state.next_id += 1;
        state
            .trip
            .destinations
            .push(Destination::new(id, destination.name.clone(), visit_time));
        Ok(())
    }

    async fn reschedule_destination(
        &self,
        trip: &TripId,
        request: &RescheduleDestination,
    ) -> Result<(), BackendError> {
        let visit_time = request.visit_time.map(|t| t.to_string());
        let mut state = self.begin(BackendCall::Reschedule {
            destination_id: request.destination_id,
            visit_time: visit_time.clone(),
        })?;
        check_trip(&state, trip)?;
        let destination = state
            .trip
            .destinations
            .iter_mut()
            .find(|d| d.id == request.destination_id)
            .ok_or_else(|| not_found(request.destination_id))?;
        destination.visit_time = visit_time;
        Ok(())
    }

    async fn delete_destination(
        &self,
        trip: &TripId,
        destination_id: DestinationId,
    ) -> Result<(), BackendError> {
        let mut state = self.begin(BackendCall::Delete { destination_id })?;
        check_trip(&state, trip)?;
        let before = state.trip.destinations.len();
        state.trip.destinations.retain(|d| d.id != destination_id);
        if state.trip.destinations.len() == before {
            return Err(not_found(destination_id));
        }
        Ok(())
    }
}

/// [`PlaceSearch`] answering from a fixed table keyed by query text.
///
/// Unknown queries answer with [`SearchError::NoResults`].
#[derive(Debug, Default)]
pub struct StubPlaceSearch {
    results: HashMap<String, Vec<PlaceCandidate>>,
    failures: HashMap<String, SearchError>,
    queries: Mutex<Vec<TextQuery>>,
    calls: AtomicUsize,
}

impl StubPlaceSearch {
    /// An empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `text` with a single candidate.
    #[must_use]
    pub fn with_place(mut self, text: impl Into<String>, candidate: PlaceCandidate) -> Self {
        self.results.insert(text.into(), vec![candidate]);
        self
    }

    /// Answer `text` with several candidates, best first.
    #[must_use]
    pub fn with_results(mut self, text: impl Into<String>, candidates: Vec<PlaceCandidate>) -> Self {
        self.results.insert(text.into(), candidates);
        self
    }

    /// Answer `text` with `error`.
    #[must_use]
    pub fn with_failure(mut self, text: impl Into<String>, error: SearchError) -> Self {
        self.failures.insert(text.into(), error);
        self
    }

    /// Number of searches performed.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every query received, in order.
    #[must_use]
    pub fn queries(&self) -> Vec<TextQuery> {
        self.queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl PlaceSearch for StubPlaceSearch {
    async fn text_search(&self, query: &TextQuery) -> Result<Vec<PlaceCandidate>, SearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(query.clone());
        if let Some(error) = self.failures.get(&query.text) {
            return Err(error.clone());
        }
        self.results
            .get(&query.text)
            .cloned()
            .ok_or_else(|| SearchError::NoResults {
                query: query.text.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Coord;
    use jiff::civil::date;
    use rstest::{fixture, rstest};

    fn block_on<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("runtime")
            .block_on(future)
    }

    #[fixture]
    fn backend() -> StubTripBackend {
        StubTripBackend::new(
            "t",
            vec![
                Destination::new(4, "A", Some("2024-05-01T09:00:00".into())),
                Destination::new(9, "B", None),
            ],
        )
    }

    #[rstest]
    fn create_assigns_next_id(backend: StubTripBackend) {
        let request = NewDestination {
            name: "C".into(),
            location: Coord { x: 0.0, y: 0.0 },
            visit_time: Some(date(2024, 5, 1).at(10, 0, 0, 0)),
        };
        block_on(backend.create_destination(&TripId::from("t"), &request)).expect("create");
        let created = backend.trip().destinations.pop().expect("created");
        assert_eq!(created.id, 10);
        assert_eq!(created.visit_time.as_deref(), Some("2024-05-01T10:00:00"));
    }

    #[rstest]
    fn delete_of_unknown_id_is_not_found(backend: StubTripBackend) {
        let err = block_on(backend.delete_destination(&TripId::from("t"), 77))
            .expect_err("missing id");
        assert!(matches!(err, BackendError::Http { status: 404, .. }));
        assert_eq!(backend.count(CallKind::Delete), 1);
    }

    #[rstest]
    fn injected_failure_is_consumed_once(backend: StubTripBackend) {
        backend.fail_next(
            CallKind::Fetch,
            BackendError::Network {
                url: STUB_URL.into(),
                message: "down".into(),
            },
        );
        let trip = TripId::from("t");
        assert!(block_on(backend.fetch_trip(&trip)).is_err());
        assert!(block_on(backend.fetch_trip(&trip)).is_ok());
    }

    #[rstest]
    fn search_reports_unknown_queries() {
        let search = StubPlaceSearch::new();
        let query = TextQuery::new("Atlantis", Coord { x: 0.0, y: 0.0 });
        let err = block_on(search.text_search(&query)).expect_err("no results");
        assert_eq!(err, SearchError::NoResults { query: "Atlantis".into() });
        assert_eq!(search.calls(), 1);
    }
}

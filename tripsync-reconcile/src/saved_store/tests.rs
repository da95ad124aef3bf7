//! Unit tests for the saved-places store.

use std::sync::Arc;

use geo::Coord;
use rstest::{fixture, rstest};
use tripsync_core::test_support::{BackendCall, CallKind, StubPlaceSearch, StubTripBackend};
use tripsync_core::{AuthToken, BackendError, MemoryCredentials, PlaceCandidate, TripSummary};

use super::*;
use crate::remote::MissingAuthPolicy;

type Store = SavedPlacesStore<StubTripBackend, StubPlaceSearch, MemoryCredentials>;

struct Harness {
    backend: Arc<StubTripBackend>,
    store: Store,
}

fn candidate(name: &str, x: f64, y: f64) -> PlaceCandidate {
    PlaceCandidate::located(format!("p-{name}"), name, Coord { x, y })
}

fn harness_with(destinations: Vec<Destination>, signed_in: bool) -> Harness {
    let backend = Arc::new(StubTripBackend::with_trip(Trip {
        id: TripId::from("trip-1"),
        summary: TripSummary::default(),
        destinations,
    }));
    let credentials = Arc::new(if signed_in {
        MemoryCredentials::with_token(AuthToken::new("token-1").expect("non-blank"))
    } else {
        MemoryCredentials::default()
    });
    let search = StubPlaceSearch::new()
        .with_place("Met", candidate("Met", -73.963, 40.779))
        .with_place("MoMA", candidate("MoMA", -73.977, 40.761))
        .with_place("Frick", candidate("Frick", -73.967, 40.771));
    let remote = Remote::new(
        Arc::clone(&backend),
        credentials,
        MissingAuthPolicy::Skip,
    );
    let store = SavedPlacesStore::new("trip-1", remote, Arc::new(PlaceResolver::new(search)));
    Harness { backend, store }
}

#[fixture]
fn mixed() -> Harness {
    harness_with(
        vec![
            Destination::new(1, "Met", None),
            Destination::new(2, "MoMA", Some("2024-05-01T10:00:00".to_owned())),
            Destination::new(3, "Nowhere Special", None),
        ],
        true,
    )
}

fn place_ids(store: &Store) -> Vec<String> {
    store
        .saved()
        .places()
        .iter()
        .map(|saved| saved.place.id.clone())
        .collect()
}

#[rstest]
#[tokio::test]
async fn load_keeps_only_resolved_unscheduled_destinations(mixed: Harness) {
    let outcome = mixed.store.load().await.expect("load");
    assert_eq!(
        outcome,
        LoadOutcome::Published {
            entries: 1,
            unresolved: 1
        }
    );
    assert_eq!(place_ids(&mixed.store), vec!["p-Met".to_owned()]);
    assert_eq!(
        mixed.store.saved().places().first().map(|saved| saved.destination_id),
        Some(1)
    );
}

#[rstest]
#[tokio::test]
async fn add_place_posts_without_visit_time(mixed: Harness) {
    mixed.store.load().await.expect("load");
    let frick = Place::new("p-Frick", "Frick", Coord { x: -73.967, y: 40.771 });

    let outcome = mixed.store.add_place(&frick).await.expect("add");

    assert_eq!(outcome, MutationOutcome::Applied);
    assert!(mixed.backend.calls().contains(&BackendCall::Create {
        name: "Frick".to_owned(),
        visit_time: None,
    }));
    assert!(mixed.store.saved().contains("p-Frick"));
}

#[rstest]
#[tokio::test]
async fn adding_a_saved_place_again_is_a_no_op(mixed: Harness) {
    mixed.store.load().await.expect("load");
    let met = Place::new("p-Met", "Met", Coord { x: -73.963, y: 40.779 });
    let calls_before = mixed.backend.calls().len();

    let outcome = mixed.store.add_place(&met).await.expect("no-op");

    assert_eq!(outcome, MutationOutcome::Unchanged);
    assert_eq!(mixed.backend.calls().len(), calls_before);
}

#[rstest]
#[tokio::test]
async fn remove_place_deletes_backing_destination(mixed: Harness) {
    mixed.store.load().await.expect("load");

    let outcome = mixed.store.remove_place("p-Met").await.expect("remove");

    assert_eq!(outcome, MutationOutcome::Applied);
    assert!(
        mixed
            .backend
            .calls()
            .contains(&BackendCall::Delete { destination_id: 1 })
    );
    assert!(mixed.store.saved().is_empty());
}

#[rstest]
#[tokio::test]
async fn removing_an_unknown_place_sends_nothing(mixed: Harness) {
    mixed.store.load().await.expect("load");
    let err = mixed
        .store
        .remove_place("p-Guggenheim")
        .await
        .expect_err("not saved");
    assert!(matches!(err, SyncError::UnknownPlace { ref place_id } if place_id == "p-Guggenheim"));
    assert_eq!(mixed.backend.count(CallKind::Delete), 0);
}

#[rstest]
#[tokio::test]
async fn failed_delete_keeps_saved_places(mixed: Harness) {
    mixed.store.load().await.expect("load");
    let before = mixed.store.saved();
    mixed.backend.fail_next(
        CallKind::Delete,
        BackendError::Network {
            url: "stub".into(),
            message: "connection reset".into(),
        },
    );

    let err = mixed.store.remove_place("p-Met").await.expect_err("fails");

    assert!(matches!(err, SyncError::Backend(BackendError::Network { .. })));
    assert_eq!(mixed.store.saved(), before);
}

#[rstest]
#[tokio::test]
async fn signed_out_store_skips_everything() {
    let harness = harness_with(vec![Destination::new(1, "Met", None)], false);
    assert_eq!(harness.store.load().await.expect("load"), LoadOutcome::Skipped);
    let frick = Place::new("p-Frick", "Frick", Coord { x: -73.967, y: 40.771 });
    assert_eq!(
        harness.store.add_place(&frick).await.expect("add"),
        MutationOutcome::Skipped
    );
    assert!(harness.backend.calls().is_empty());
}

#[rstest]
#[tokio::test]
async fn detached_store_discards_loads(mixed: Harness) {
    mixed.store.detach();
    assert_eq!(mixed.store.load().await.expect("load"), LoadOutcome::Detached);
    assert!(mixed.store.saved().is_empty());
}

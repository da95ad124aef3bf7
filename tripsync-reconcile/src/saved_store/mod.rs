//! Remote-backed store for a trip's saved (unscheduled) destinations.

use std::sync::Arc;

use tokio::sync::watch;
use tripsync_core::{
    CredentialStore, Destination, NewDestination, Place, PlaceSearch, SavedPlace, SavedPlaces,
    Trip, TripBackend, TripId,
};

use crate::error::{LoadOutcome, MutationOutcome, SyncError};
use crate::projection::{Projection, Publication, Snapshot};
use crate::remote::Remote;
use crate::resolver::PlaceResolver;

/// Reconciles one trip's saved places with the backend.
///
/// Saved places are destinations without a visit time. There is no slot
/// limit; otherwise the store follows [`ItineraryStore`](crate::ItineraryStore):
/// send, then reload.
pub struct SavedPlacesStore<B, S, C> {
    trip: TripId,
    remote: Remote<B, C>,
    resolver: Arc<PlaceResolver<S>>,
    projection: Projection<SavedPlaces>,
}

impl<B, S, C> SavedPlacesStore<B, S, C>
where
    B: TripBackend,
    S: PlaceSearch,
    C: CredentialStore,
{
    /// A store for `trip`.
    pub fn new(
        trip: impl Into<TripId>,
        remote: Remote<B, C>,
        resolver: Arc<PlaceResolver<S>>,
    ) -> Self {
        Self {
            trip: trip.into(),
            remote,
            resolver,
            projection: Projection::new(SavedPlaces::default()),
        }
    }

    /// The trip this store reconciles.
    #[must_use]
    pub const fn trip_id(&self) -> &TripId {
        &self.trip
    }

    /// The published saved places.
    #[must_use]
    pub fn saved(&self) -> SavedPlaces {
        self.projection.current()
    }

    /// Watch published saved places.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Snapshot<SavedPlaces>> {
        self.projection.subscribe()
    }

    /// Stop publishing; loads in flight discard their results.
    pub fn detach(&self) {
        self.projection.detach();
    }

    /// Rebuild the saved places from the backend and publish them.
    ///
    /// Destinations that cannot be resolved are left out.
    ///
    /// # Errors
    ///
    /// Fails when credentials cannot be read, when auth is required but
    /// missing, or when the backend read fails.
    pub async fn load(&self) -> Result<LoadOutcome, SyncError> {
        let ticket = self.projection.ticket();
        let Some(trip) = self.remote.fetch(&self.trip).await? else {
            return Ok(LoadOutcome::Skipped);
        };
        let (saved, unresolved) = self.project(&trip).await;
        let entries = saved.len();
        Ok(match self.projection.publish(ticket, saved) {
            Publication::Published => {
                log::debug!(
                    "published saved places v{ticket} for trip {}: {entries} places",
                    self.trip
                );
                LoadOutcome::Published {
                    entries,
                    unresolved,
                }
            }
            Publication::Superseded => LoadOutcome::Superseded,
            Publication::Detached => LoadOutcome::Detached,
        })
    }

    /// Save `place` without a visit time.
    ///
    /// A place whose id is already saved is left alone.
    ///
    /// # Errors
    ///
    /// As for [`load`](Self::load); a failed reload after an accepted create
    /// is reported as [`SyncError::RefreshAfterMutation`].
    pub async fn add_place(&self, place: &Place) -> Result<MutationOutcome, SyncError> {
        if self
            .projection
            .with_current(|saved| saved.contains(&place.id))
        {
            return Ok(MutationOutcome::Unchanged);
        }
        if !self.remote.authorize()? {
            return Ok(MutationOutcome::Skipped);
        }
        let request = NewDestination {
            name: place.name.clone(),
            location: place.location,
            visit_time: None,
        };
        self.remote
            .backend()
            .create_destination(&self.trip, &request)
            .await?;
        log::info!("saved {:?} to trip {}", place.name, self.trip);
        self.refresh().await
    }

    /// Delete the destination backing the saved place `place_id`.
    ///
    /// # Errors
    ///
    /// [`SyncError::UnknownPlace`] when no published saved place has that id,
    /// otherwise as for [`add_place`](Self::add_place).
    pub async fn remove_place(&self, place_id: &str) -> Result<MutationOutcome, SyncError> {
        let destination_id = self
            .projection
            .with_current(|saved| saved.find(place_id).map(|found| found.destination_id))
            .ok_or_else(|| SyncError::UnknownPlace {
                place_id: place_id.to_owned(),
            })?;
        if !self.remote.authorize()? {
            return Ok(MutationOutcome::Skipped);
        }
        self.remote
            .backend()
            .delete_destination(&self.trip, destination_id)
            .await?;
        log::info!("removed saved place {place_id} from trip {}", self.trip);
        self.refresh().await
    }

    async fn refresh(&self) -> Result<MutationOutcome, SyncError> {
        match self.load().await {
            Ok(_) => Ok(MutationOutcome::Applied),
            Err(err) => Err(SyncError::RefreshAfterMutation {
                source: Box::new(err),
            }),
        }
    }

    async fn project(&self, trip: &Trip) -> (SavedPlaces, usize) {
        let destinations: Vec<Destination> = trip.unscheduled().cloned().collect();
        let places = self.resolver.resolve_all(&destinations).await;
        let total = destinations.len();
        let saved: Vec<SavedPlace> = destinations
            .iter()
            .zip(places)
            .filter_map(|(destination, place)| {
                place.map(|place| SavedPlace {
                    destination_id: destination.id,
                    place,
                })
            })
            .collect();
        let unresolved = total - saved.len();
        (SavedPlaces::new(saved), unresolved)
    }
}

#[cfg(test)]
mod tests;

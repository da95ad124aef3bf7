//! Remote-backed store for a trip's scheduled destinations.
//!
//! The backend owns the destination list. Every mutation is sent first and,
//! once confirmed, followed by a full reload; the store never patches its
//! projection optimistically. A failed mutation leaves the published
//! itinerary untouched.

use std::sync::Arc;

use jiff::Zoned;
use jiff::civil::DateTime;
use tokio::sync::watch;
use tripsync_core::{
    CredentialStore, Destination, DestinationId, Entry, Itinerary, NewDestination, Place,
    PlaceSearch, RescheduleDestination, Slot, SlotCapacity, Trip, TripBackend, TripId,
};

use crate::error::{LoadOutcome, MutationOutcome, SyncError};
use crate::projection::{Projection, Publication, Snapshot};
use crate::remote::Remote;
use crate::resolver::PlaceResolver;

/// Reconciles one trip's itinerary with the backend.
pub struct ItineraryStore<B, S, C> {
    trip: TripId,
    remote: Remote<B, C>,
    resolver: Arc<PlaceResolver<S>>,
    capacity: SlotCapacity,
    projection: Projection<Itinerary>,
}

impl<B, S, C> ItineraryStore<B, S, C>
where
    B: TripBackend,
    S: PlaceSearch,
    C: CredentialStore,
{
    /// A store for `trip` with the default slot capacity.
    pub fn new(
        trip: impl Into<TripId>,
        remote: Remote<B, C>,
        resolver: Arc<PlaceResolver<S>>,
    ) -> Self {
        Self {
            trip: trip.into(),
            remote,
            resolver,
            capacity: SlotCapacity::default(),
            projection: Projection::new(Itinerary::default()),
        }
    }

    /// Use a different slot capacity.
    #[must_use]
    pub fn with_capacity(mut self, capacity: SlotCapacity) -> Self {
        self.capacity = capacity;
        self
    }

    /// The trip this store reconciles.
    #[must_use]
    pub const fn trip_id(&self) -> &TripId {
        &self.trip
    }

    /// The published itinerary.
    #[must_use]
    pub fn itinerary(&self) -> Itinerary {
        self.projection.current()
    }

    /// Watch published itineraries.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Snapshot<Itinerary>> {
        self.projection.subscribe()
    }

    /// Stop publishing; loads in flight discard their results.
    pub fn detach(&self) {
        self.projection.detach();
    }

    /// Rebuild the itinerary from the backend and publish it.
    ///
    /// Scheduled destinations are enriched concurrently. Those that fail to
    /// resolve are left out of the entries but still count against their
    /// slot's capacity.
    ///
    /// # Errors
    ///
    /// Fails when credentials cannot be read, when auth is required but
    /// missing, or when the backend read fails. The published itinerary is
    /// unchanged in every error case.
    pub async fn load(&self) -> Result<LoadOutcome, SyncError> {
        let ticket = self.projection.ticket();
        let Some(trip) = self.remote.fetch(&self.trip).await? else {
            return Ok(LoadOutcome::Skipped);
        };
        let itinerary = self.project(trip).await;
        let entries = itinerary.entries().len();
        let unresolved = itinerary.unresolved().len();
        Ok(match self.projection.publish(ticket, itinerary) {
            Publication::Published => {
                log::debug!(
                    "published itinerary v{ticket} for trip {}: {entries} entries, {unresolved} unresolved",
                    self.trip
                );
                LoadOutcome::Published {
                    entries,
                    unresolved,
                }
            }
            Publication::Superseded => {
                log::debug!("discarding stale itinerary load v{ticket} for trip {}", self.trip);
                LoadOutcome::Superseded
            }
            Publication::Detached => LoadOutcome::Detached,
        })
    }

    /// Schedule `place` at `slot`.
    ///
    /// The capacity check runs against the published itinerary before any
    /// network call. The visit time is the trip's start date at `slot`, or
    /// today when the trip has no start.
    ///
    /// # Errors
    ///
    /// [`SyncError::CapacityExceeded`] when the slot is full, otherwise as
    /// for [`load`](Self::load). A failed reload after an accepted create is
    /// reported as [`SyncError::RefreshAfterMutation`].
    pub async fn add(&self, place: &Place, slot: Slot) -> Result<MutationOutcome, SyncError> {
        self.check_capacity(slot)?;
        if !self.remote.authorize()? {
            return Ok(MutationOutcome::Skipped);
        }
        let request = NewDestination {
            name: place.name.clone(),
            location: place.location,
            visit_time: Some(self.visit_time(slot)),
        };
        self.remote
            .backend()
            .create_destination(&self.trip, &request)
            .await?;
        log::info!("added {:?} at {slot} to trip {}", place.name, self.trip);
        self.refresh().await
    }

    /// Delete a destination.
    ///
    /// Only `destination_id` identifies the target; `slot` is accepted so
    /// callers can pass the entry they are displaying. The delete is sent even
    /// when the destination is not in the local projection.
    ///
    /// # Errors
    ///
    /// As for [`add`](Self::add), minus the capacity check.
    pub async fn remove(
        &self,
        destination_id: DestinationId,
        _slot: Option<Slot>,
    ) -> Result<MutationOutcome, SyncError> {
        if !self.remote.authorize()? {
            return Ok(MutationOutcome::Skipped);
        }
        self.remote
            .backend()
            .delete_destination(&self.trip, destination_id)
            .await?;
        log::info!("removed destination {destination_id} from trip {}", self.trip);
        self.refresh().await
    }

    /// Move a destination to `slot`.
    ///
    /// Moving a destination into the slot it already holds is a no-op. A
    /// saved destination with no slot becomes scheduled.
    ///
    /// # Errors
    ///
    /// As for [`add`](Self::add).
    pub async fn reschedule(
        &self,
        destination_id: DestinationId,
        slot: Slot,
    ) -> Result<MutationOutcome, SyncError> {
        let current = self
            .projection
            .with_current(|itinerary| itinerary.slot_of(destination_id));
        if current == Some(slot) {
            return Ok(MutationOutcome::Unchanged);
        }
        self.check_capacity(slot)?;
        if !self.remote.authorize()? {
            return Ok(MutationOutcome::Skipped);
        }
        let request = RescheduleDestination {
            destination_id,
            visit_time: Some(self.visit_time(slot)),
        };
        self.remote
            .backend()
            .reschedule_destination(&self.trip, &request)
            .await?;
        log::info!("moved destination {destination_id} to {slot} in trip {}", self.trip);
        self.refresh().await
    }

    fn check_capacity(&self, slot: Slot) -> Result<(), SyncError> {
        let admitted = self
            .projection
            .with_current(|itinerary| self.capacity.admits(itinerary.occupied_slots(), &slot));
        if admitted {
            Ok(())
        } else {
            Err(SyncError::CapacityExceeded {
                slot,
                limit: self.capacity.limit(),
            })
        }
    }

    fn visit_time(&self, slot: Slot) -> DateTime {
        let start = self
            .projection
            .with_current(|itinerary| itinerary.summary().start.map(|start| start.date()));
        slot.on(start.unwrap_or_else(|| Zoned::now().date()))
    }

    async fn refresh(&self) -> Result<MutationOutcome, SyncError> {
        match self.load().await {
            Ok(_) => Ok(MutationOutcome::Applied),
            Err(err) => Err(SyncError::RefreshAfterMutation {
                source: Box::new(err),
            }),
        }
    }

    async fn project(&self, trip: Trip) -> Itinerary {
        let (destinations, slots): (Vec<Destination>, Vec<Slot>) = trip
            .destinations
            .into_iter()
            .filter_map(|destination| match destination.slot() {
                Ok(Some(slot)) => Some((destination, slot)),
                Ok(None) => None,
                Err(err) => {
                    log::warn!(
                        "ignoring destination {} with unusable visit time: {err}",
                        destination.id
                    );
                    None
                }
            })
            .unzip();

        let places = self.resolver.resolve_all(&destinations).await;
        let mut entries = Vec::with_capacity(destinations.len());
        let mut unresolved = Vec::new();
        for ((destination, slot), place) in destinations.iter().zip(slots).zip(places) {
            match place {
                Some(place) => entries.push(Entry {
                    destination_id: destination.id,
                    slot,
                    place,
                }),
                None => unresolved.push((destination.id, slot)),
            }
        }
        Itinerary::new(trip.summary, entries, unresolved)
    }
}

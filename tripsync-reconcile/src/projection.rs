//! Version-stamped publication of derived state.
//!
//! Each load takes a ticket before it starts talking to the backend. When it
//! finishes, it publishes only if its ticket is newer than the published
//! version, so a slow load can never overwrite the result of a load that
//! started after it. After [`Projection::detach`] nothing is published.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tokio::sync::watch;

/// A published value together with the ticket of the load that produced it.
///
/// Version `0` is the initial empty value.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<T> {
    /// Ticket of the producing load.
    pub version: u64,
    /// Derived state.
    pub value: T,
}

/// What happened to a result handed to [`Projection::publish`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Publication {
    /// The value is now current.
    Published,
    /// A newer load had already published; the value was discarded.
    Superseded,
    /// The projection was detached; the value was discarded.
    Detached,
}

/// Latest-wins holder for a store's derived state.
#[derive(Debug)]
pub struct Projection<T> {
    sender: watch::Sender<Snapshot<T>>,
    tickets: AtomicU64,
    detached: AtomicBool,
}

impl<T> Projection<T> {
    /// A projection holding `initial` at version `0`.
    pub fn new(initial: T) -> Self {
        let (sender, _) = watch::channel(Snapshot {
            version: 0,
            value: initial,
        });
        Self {
            sender,
            tickets: AtomicU64::new(0),
            detached: AtomicBool::new(false),
        }
    }

    /// Reserve the next ticket. Tickets start at `1` and strictly increase.
    #[must_use]
    pub fn ticket(&self) -> u64 {
        self.tickets.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Publish `value` if `ticket` is newer than the current version.
    #[must_use]
    pub fn publish(&self, ticket: u64, value: T) -> Publication {
        if self.is_detached() {
            return Publication::Detached;
        }
        let published = self.sender.send_if_modified(|current| {
            if ticket <= current.version {
                return false;
            }
            *current = Snapshot {
                version: ticket,
                value,
            };
            true
        });
        if published {
            Publication::Published
        } else {
            Publication::Superseded
        }
    }

    /// Version of the current value.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.sender.borrow().version
    }

    /// Run `f` against the current value without cloning it.
    #[must_use]
    pub fn with_current<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.sender.borrow().value)
    }

    /// Watch for newly published snapshots.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Snapshot<T>> {
        self.sender.subscribe()
    }

    /// Stop publishing. Loads already in flight finish but discard their result.
    pub fn detach(&self) {
        self.detached.store(true, Ordering::SeqCst);
    }

    /// Whether [`detach`](Self::detach) has been called.
    #[must_use]
    pub fn is_detached(&self) -> bool {
        self.detached.load(Ordering::SeqCst)
    }
}

impl<T: Clone> Projection<T> {
    /// A copy of the current value.
    #[must_use]
    pub fn current(&self) -> T {
        self.sender.borrow().value.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    fn newer_ticket_wins_regardless_of_completion_order() {
        let projection = Projection::new("empty");
        let slow = projection.ticket();
        let fast = projection.ticket();

        assert_eq!(projection.publish(fast, "fast"), Publication::Published);
        assert_eq!(projection.publish(slow, "slow"), Publication::Superseded);
        assert_eq!(projection.current(), "fast");
        assert_eq!(projection.version(), fast);
    }

    #[rstest]
    fn detached_projection_ignores_results() {
        let projection = Projection::new(0);
        let ticket = projection.ticket();
        projection.detach();
        assert_eq!(projection.publish(ticket, 7), Publication::Detached);
        assert_eq!(projection.current(), 0);
    }

    #[rstest]
    fn subscribers_see_publications() {
        let projection = Projection::new(0);
        let mut receiver = projection.subscribe();
        let ticket = projection.ticket();
        assert_eq!(projection.publish(ticket, 3), Publication::Published);
        assert!(receiver.has_changed().expect("sender alive"));
        assert_eq!(receiver.borrow_and_update().value, 3);
    }

    proptest! {
        /// Whatever order loads finish in, the newest ticket's value is current.
        #[test]
        fn latest_ticket_always_ends_current(order in Just((1_u64..=8).collect::<Vec<_>>()).prop_shuffle()) {
            let projection = Projection::new(0_u64);
            let tickets: Vec<u64> = (0..order.len()).map(|_| projection.ticket()).collect();
            for index in order {
                let ticket = tickets[usize::try_from(index - 1).expect("small index")];
                let outcome = projection.publish(ticket, ticket);
                prop_assert_ne!(outcome, Publication::Detached);
            }
            let newest = tickets.iter().copied().max().unwrap_or(0);
            prop_assert_eq!(projection.current(), newest);
            prop_assert_eq!(projection.version(), newest);
        }
    }
}

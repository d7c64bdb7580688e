//! # Resources and the Ring
//!
//! A [`Resource`] is an exclusively-lockable unit with a stable numeric identity
//! (the "fork" of the dining philosophers). A [`ResourceRing`] lays N of them out in
//! a circle so that seat `i` shares resource `i` with its left neighbour and resource
//! `(i + 1) % N` with its right neighbour.
//!
//! ## Ordered Acquisition
//!
//! A ring of holders that each grab "left, then right" can close a cycle of waits
//! and deadlock. [`AcquisitionOrder`] breaks the cycle: each holder sorts its two
//! resources by identity once and always acquires the lower one first. In the ring
//! `0..N` every seat acquires left-then-right except the last one, whose resources
//! are `(N - 1, 0)`; it acquires `0` first. One reversed edge is enough to make the
//! wait-for graph acyclic.
//!
//! Identities are compared numerically. Comparing their string form would sort
//! `"10"` before `"2"` and break the argument for rings larger than ten.
//!
//! ## Instrumentation
//!
//! Every resource carries a held-by marker next to its lock. The marker is set
//! right after the lock is obtained and cleared right before it is released, which
//! lets tests observe holders and count any double-hold.

use crate::error::RingError;
use std::cmp::Ordering as CmpOrdering;
use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

const NO_HOLDER: usize = usize::MAX;

/// Stable identity of a resource. Ordering is numeric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceId(pub u32);

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of whoever holds a resource (a seat at the table).
///
/// `usize::MAX` is reserved as the "nobody" marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HolderId(pub usize);

impl fmt::Display for HolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "seat-{}", self.0)
    }
}

/// A mutually-exclusive resource with a held-by marker.
///
/// Waiters are served in FIFO order because the lock is a `tokio::sync::Mutex`.
#[derive(Debug)]
pub struct Resource {
    id: ResourceId,
    lock: Mutex<()>,
    holder: AtomicUsize,
    acquisitions: AtomicU64,
    double_holds: AtomicU64,
}

impl Resource {
    pub fn new(id: ResourceId) -> Self {
        Self {
            id,
            lock: Mutex::new(()),
            holder: AtomicUsize::new(NO_HOLDER),
            acquisitions: AtomicU64::new(0),
            double_holds: AtomicU64::new(0),
        }
    }

    pub fn id(&self) -> ResourceId {
        self.id
    }

    /// The current holder, if any.
    pub fn holder(&self) -> Option<HolderId> {
        match self.holder.load(Ordering::SeqCst) {
            NO_HOLDER => None,
            seat => Some(HolderId(seat)),
        }
    }

    /// How many times the resource has been acquired.
    pub fn acquisitions(&self) -> u64 {
        self.acquisitions.load(Ordering::SeqCst)
    }

    /// How many times an acquire found the marker still set by someone else.
    /// Always zero unless mutual exclusion is broken.
    pub fn double_holds(&self) -> u64 {
        self.double_holds.load(Ordering::SeqCst)
    }

    /// Blocks until the resource is free, then marks it held by `holder`.
    ///
    /// # Errors
    ///
    /// Returns [`RingError::AlreadyHeld`] if `holder` already holds this resource.
    /// Waiting on it would never finish.
    pub async fn acquire(&self, holder: HolderId) -> Result<ResourceGuard<'_>, RingError> {
        if self.holder.load(Ordering::SeqCst) == holder.0 {
            return Err(RingError::AlreadyHeld {
                resource: self.id,
                holder,
            });
        }

        let permit = self.lock.lock().await;
        let previous = self.holder.swap(holder.0, Ordering::SeqCst);
        if previous != NO_HOLDER {
            self.double_holds.fetch_add(1, Ordering::SeqCst);
            warn!(resource = %self.id, %holder, previous, "Double hold observed");
        }
        self.acquisitions.fetch_add(1, Ordering::SeqCst);
        debug!(resource = %self.id, %holder, "Acquired");

        Ok(ResourceGuard {
            resource: self,
            holder,
            released: false,
            _permit: permit,
        })
    }
}

/// Proof of holding a [`Resource`]. Dropping it releases the resource.
#[derive(Debug)]
pub struct ResourceGuard<'a> {
    resource: &'a Resource,
    holder: HolderId,
    released: bool,
    // Declared last so the marker is cleared before the lock is let go.
    _permit: MutexGuard<'a, ()>,
}

impl ResourceGuard<'_> {
    /// Clears the held-by marker and unlocks the resource.
    ///
    /// # Errors
    ///
    /// Returns [`RingError::NotHeld`] if the marker no longer names this holder.
    /// The lock is still released in that case.
    pub fn release(mut self) -> Result<(), RingError> {
        self.released = true;
        let cleared = self.resource.holder.compare_exchange(
            self.holder.0,
            NO_HOLDER,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
        debug!(resource = %self.resource.id, holder = %self.holder, "Released");
        cleared.map(|_| ()).map_err(|_| RingError::NotHeld {
            resource: self.resource.id,
            holder: self.holder,
        })
    }
}

impl Drop for ResourceGuard<'_> {
    fn drop(&mut self) {
        if !self.released {
            let _ = self.resource.holder.compare_exchange(
                self.holder.0,
                NO_HOLDER,
                Ordering::SeqCst,
                Ordering::SeqCst,
            );
        }
    }
}

/// The fixed order in which one holder takes its two resources.
///
/// Computed once from the (left, right) ring assignment and never re-derived.
#[derive(Debug, Clone)]
pub struct AcquisitionOrder {
    first: Arc<Resource>,
    second: Arc<Resource>,
}

impl AcquisitionOrder {
    /// Sorts `left` and `right` by identity, lowest first.
    ///
    /// # Errors
    ///
    /// Returns [`RingError::DuplicateResource`] if both share an identity, since
    /// there would be no total order to follow.
    pub fn new(left: Arc<Resource>, right: Arc<Resource>) -> Result<Self, RingError> {
        match left.id().cmp(&right.id()) {
            CmpOrdering::Less => Ok(Self {
                first: left,
                second: right,
            }),
            CmpOrdering::Greater => Ok(Self {
                first: right,
                second: left,
            }),
            CmpOrdering::Equal => Err(RingError::DuplicateResource(left.id())),
        }
    }

    pub fn first(&self) -> &Arc<Resource> {
        &self.first
    }

    pub fn second(&self) -> &Arc<Resource> {
        &self.second
    }

    pub fn ids(&self) -> [ResourceId; 2] {
        [self.first.id(), self.second.id()]
    }
}

/// N resources arranged in a circle.
#[derive(Debug, Clone)]
pub struct ResourceRing {
    resources: Vec<Arc<Resource>>,
}

impl ResourceRing {
    /// Builds a ring of `size` resources identified `0..size`.
    ///
    /// # Errors
    ///
    /// - [`RingError::RingTooSmall`] for fewer than two resources.
    /// - [`RingError::RingTooLarge`] if the identities would not fit in a `u32`.
    pub fn new(size: usize) -> Result<Self, RingError> {
        let size_u32 = u32::try_from(size).map_err(|_| RingError::RingTooLarge { size })?;
        Self::from_ids((0..size_u32).map(ResourceId))
    }

    /// Builds a ring from explicit identities, in ring order.
    ///
    /// # Errors
    ///
    /// - [`RingError::RingTooSmall`] for fewer than two resources.
    /// - [`RingError::DuplicateResource`] if an identity repeats.
    pub fn from_ids(ids: impl IntoIterator<Item = ResourceId>) -> Result<Self, RingError> {
        let ids: Vec<ResourceId> = ids.into_iter().collect();
        if ids.len() < 2 {
            return Err(RingError::RingTooSmall { size: ids.len() });
        }
        let mut seen = HashSet::with_capacity(ids.len());
        for id in &ids {
            if !seen.insert(*id) {
                return Err(RingError::DuplicateResource(*id));
            }
        }
        Ok(Self {
            resources: ids
                .into_iter()
                .map(|id| Arc::new(Resource::new(id)))
                .collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// The (left, right) resources of `seat`: `seat` and `seat + 1`, wrapping.
    pub fn neighbors(&self, seat: usize) -> (Arc<Resource>, Arc<Resource>) {
        let n = self.resources.len();
        (
            Arc::clone(&self.resources[seat % n]),
            Arc::clone(&self.resources[(seat + 1) % n]),
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Resource>> {
        self.resources.iter()
    }

    /// Resources currently held, with their holders.
    pub fn held(&self) -> Vec<(ResourceId, HolderId)> {
        self.resources
            .iter()
            .filter_map(|r| r.holder().map(|h| (r.id(), h)))
            .collect()
    }

    /// Total double-holds observed across the ring.
    pub fn double_holds(&self) -> u64 {
        self.resources.iter().map(|r| r.double_holds()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn order_for(ring: &ResourceRing, seat: usize) -> [ResourceId; 2] {
        let (left, right) = ring.neighbors(seat);
        AcquisitionOrder::new(left, right).unwrap().ids()
    }

    #[test]
    fn test_wrap_around_seat_acquires_lowest_first() {
        let ring = ResourceRing::new(5).unwrap();

        assert_eq!(order_for(&ring, 0), [ResourceId(0), ResourceId(1)]);
        assert_eq!(order_for(&ring, 4), [ResourceId(0), ResourceId(4)]);
    }

    #[test]
    fn test_exactly_one_seat_reverses_ring_order() {
        for size in 2..=12 {
            let ring = ResourceRing::new(size).unwrap();
            let reversed = (0..size)
                .filter(|&seat| {
                    let (_, right) = ring.neighbors(seat);
                    order_for(&ring, seat)[0] == right.id()
                })
                .collect::<Vec<_>>();
            assert_eq!(reversed, vec![size - 1], "ring of {size}");
        }
    }

    #[test]
    fn test_order_is_numeric_not_lexical() {
        let ring = ResourceRing::new(11).unwrap();
        // Seat 9 holds 9 and 10; a string sort would put "10" first.
        assert_eq!(order_for(&ring, 9), [ResourceId(9), ResourceId(10)]);
    }

    #[test]
    fn test_ring_too_small() {
        assert_eq!(
            ResourceRing::new(1).unwrap_err(),
            RingError::RingTooSmall { size: 1 }
        );
        assert_eq!(
            ResourceRing::new(0).unwrap_err(),
            RingError::RingTooSmall { size: 0 }
        );
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_ring_too_large() {
        let size = u32::MAX as usize + 1;
        assert_eq!(
            ResourceRing::new(size).unwrap_err(),
            RingError::RingTooLarge { size }
        );
    }

    #[test]
    fn test_duplicate_identities_rejected() {
        let err = ResourceRing::from_ids([ResourceId(3), ResourceId(7), ResourceId(3)]).unwrap_err();
        assert_eq!(err, RingError::DuplicateResource(ResourceId(3)));

        let a = Arc::new(Resource::new(ResourceId(2)));
        let b = Arc::new(Resource::new(ResourceId(2)));
        let err = AcquisitionOrder::new(a, b).unwrap_err();
        assert_eq!(err, RingError::DuplicateResource(ResourceId(2)));
    }

    #[tokio::test]
    async fn test_reentrant_acquire_fails_fast() {
        let fork = Resource::new(ResourceId(0));
        let guard = fork.acquire(HolderId(1)).await.unwrap();

        let err = fork.acquire(HolderId(1)).await.unwrap_err();
        assert_eq!(
            err,
            RingError::AlreadyHeld {
                resource: ResourceId(0),
                holder: HolderId(1)
            }
        );

        guard.release().unwrap();
        assert_eq!(fork.holder(), None);
    }

    #[tokio::test]
    async fn test_release_of_resource_not_held() {
        let fork = Resource::new(ResourceId(0));
        let guard = fork.acquire(HolderId(1)).await.unwrap();

        // Simulate a bookkeeping bug: someone else's name ends up on the marker.
        fork.holder.store(2, Ordering::SeqCst);

        let err = guard.release().unwrap_err();
        assert_eq!(
            err,
            RingError::NotHeld {
                resource: ResourceId(0),
                holder: HolderId(1)
            }
        );
        // The lock itself was still let go.
        assert!(fork.lock.try_lock().is_ok());
    }

    #[tokio::test]
    async fn test_dropped_guard_clears_marker() {
        let fork = Resource::new(ResourceId(4));
        {
            let _guard = fork.acquire(HolderId(0)).await.unwrap();
            assert_eq!(fork.holder(), Some(HolderId(0)));
        }
        assert_eq!(fork.holder(), None);
        assert_eq!(fork.acquisitions(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_contended_resource_is_handed_over_not_shared() {
        let fork = Arc::new(Resource::new(ResourceId(0)));
        let guard = fork.acquire(HolderId(0)).await.unwrap();

        let waiter = {
            let fork = Arc::clone(&fork);
            tokio::spawn(async move {
                let guard = fork.acquire(HolderId(1)).await.unwrap();
                let seen = fork.holder();
                guard.release().unwrap();
                seen
            })
        };

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(fork.holder(), Some(HolderId(0)));
        guard.release().unwrap();

        assert_eq!(waiter.await.unwrap(), Some(HolderId(1)));
        assert_eq!(fork.holder(), None);
        assert_eq!(fork.double_holds(), 0);
        assert_eq!(fork.acquisitions(), 2);
    }
}

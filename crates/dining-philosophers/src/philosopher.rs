//! # The Philosopher Protocol
//!
//! Each philosopher is one Tokio task running an unbounded cycle:
//!
//! ```text
//! Thinking -> AcquiringFirst -> HoldingFirst -> Eating -> (release) -> Thinking
//!                                                                  \-> Stopped
//! ```
//!
//! ## Ordered Acquisition
//!
//! At startup the philosopher sorts its left and right resources by identity and
//! keeps that [`AcquisitionOrder`] for life. The wrap-around seat of the ring is the
//! only one whose order differs from "left, then right", which is what keeps the ring
//! free of circular waits.
//!
//! ## Cancellation Checkpoints
//!
//! The [`CancellationToken`] is polled at exactly three places per cycle:
//!
//! 1. before the first acquire (nothing held, so just leave);
//! 2. after the second acquire (skip the meal, release both, then leave);
//! 3. after releasing (leave instead of thinking).
//!
//! It is never checked mid-acquire or mid-sleep. A philosopher blocked on a contended
//! resource finishes acquiring it, then releases before stopping, so a held resource
//! never outlives the loop iteration that took it.

use crate::config::{TableConfig, UnitRange};
use rand::rngs::StdRng;
use ring_framework::{
    AcquisitionOrder, CancellationToken, DisplaySink, HolderId, Resource, RingError, Seat,
    StateTracker,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// How long the timed phases last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub eat: UnitRange,
    pub think: UnitRange,
    pub unit: Duration,
}

impl From<&TableConfig> for Timing {
    fn from(config: &TableConfig) -> Self {
        Self {
            eat: config.eat,
            think: config.think,
            unit: config.time_unit,
        }
    }
}

/// What a philosopher hands back once it has stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhilosopherReport {
    pub name: String,
    pub seat: usize,
    /// Resource identities in the order they were always acquired.
    pub order: [u32; 2],
    pub meals: u64,
}

/// One diner: two neighbouring resources, a tracker, and a random source for timing.
pub struct Philosopher<S: DisplaySink> {
    left: Arc<Resource>,
    right: Arc<Resource>,
    tracker: StateTracker<S>,
    timing: Timing,
    rng: StdRng,
}

impl<S: DisplaySink> Philosopher<S> {
    pub fn new(
        seat: Seat,
        left: Arc<Resource>,
        right: Arc<Resource>,
        sink: Arc<S>,
        timing: Timing,
        rng: StdRng,
    ) -> Self {
        Self {
            left,
            right,
            tracker: StateTracker::new(seat, sink),
            timing,
            rng,
        }
    }

    pub fn seat(&self) -> &Seat {
        self.tracker.seat()
    }

    /// The order this philosopher will acquire its resources in.
    pub fn acquisition_order(&self) -> Result<AcquisitionOrder, RingError> {
        AcquisitionOrder::new(Arc::clone(&self.left), Arc::clone(&self.right))
    }

    /// Runs the eat/think cycle until `signal` is observed set.
    ///
    /// # Errors
    ///
    /// Only programming errors in the ring ([`RingError`]) end the loop early. Any
    /// resource held at that point is released on the way out.
    pub async fn run(mut self, signal: CancellationToken) -> Result<PhilosopherReport, RingError> {
        let name = self.seat().name.clone();
        let me = HolderId(self.seat().index);
        info!(
            philosopher = %name,
            left = %self.left.id(),
            right = %self.right.id(),
            "Seated"
        );

        let order = self.acquisition_order()?;
        let [first_id, second_id] = order.ids();
        info!(philosopher = %name, first = %first_id, second = %second_id, "Order computed");

        loop {
            if signal.is_set() {
                break;
            }

            self.tracker.acquiring_first();
            let first = order.first().acquire(me).await?;
            self.tracker.got_first();
            let second = order.second().acquire(me).await?;

            if !signal.is_set() {
                let units = self.timing.eat.sample(&mut self.rng);
                let meals = self.tracker.eating();
                info!(philosopher = %name, units, meals, "Eating");
                tokio::time::sleep(self.timing.unit * units).await;
            }

            second.release()?;
            first.release()?;

            if signal.is_set() {
                break;
            }

            let units = self.timing.think.sample(&mut self.rng);
            self.tracker.thinking();
            info!(philosopher = %name, units, "Thinking");
            tokio::time::sleep(self.timing.unit * units).await;
        }

        self.tracker.stopped();
        let meals = self.tracker.meals();
        info!(philosopher = %name, meals, "Stopped");

        Ok(PhilosopherReport {
            name,
            seat: me.0,
            order: [first_id.0, second_id.0],
            meals,
        })
    }
}

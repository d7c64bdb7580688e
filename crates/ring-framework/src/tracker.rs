//! # State Tracking
//!
//! Each actor reports its transitions through a [`StateTracker`], which forwards
//! them to an injected [`DisplaySink`]. The tracker owns the actor's meal counter
//! and nothing else; it carries no protocol state back to the caller.
//!
//! Sinks are shared by every actor at the table, so they take `&self` and must
//! serialize internally. Notifications run on the actor's task between lock
//! operations, so a sink must never block.

use std::fmt;
use std::sync::Arc;

/// A seat at the table: ring position plus display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Seat {
    pub index: usize,
    pub name: String,
}

impl Seat {
    pub fn new(index: usize, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
        }
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// The states an actor moves through in one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhilosopherState {
    Thinking,
    AcquiringFirst,
    HoldingFirst,
    Eating,
    Stopped,
}

impl fmt::Display for PhilosopherState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PhilosopherState::Thinking => "thinking",
            PhilosopherState::AcquiringFirst => "acquiring first",
            PhilosopherState::HoldingFirst => "holding first",
            PhilosopherState::Eating => "eating",
            PhilosopherState::Stopped => "stopped",
        };
        f.write_str(label)
    }
}

/// Receives transition notifications from every actor at the table.
///
/// One call stream per seat, serialized per seat; streams from different seats
/// interleave arbitrarily.
pub trait DisplaySink: Send + Sync + 'static {
    /// About to block on the lower-ordered resource.
    fn acquiring_first(&self, seat: &Seat);

    /// Holds the lower-ordered resource, about to block on the other one.
    fn got_first(&self, seat: &Seat);

    /// Holds both resources. `meals` is the cumulative count including this one.
    fn eating(&self, seat: &Seat, meals: u64);

    /// Holds neither resource.
    fn thinking(&self, seat: &Seat);

    /// The actor left its loop for good.
    fn stopped(&self, _seat: &Seat) {}
}

/// A sink that ignores everything. For headless runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DisplaySink for NullSink {
    fn acquiring_first(&self, _seat: &Seat) {}
    fn got_first(&self, _seat: &Seat) {}
    fn eating(&self, _seat: &Seat, _meals: u64) {}
    fn thinking(&self, _seat: &Seat) {}
}

/// Per-actor observer. Owns the meal counter.
pub struct StateTracker<S: DisplaySink> {
    seat: Seat,
    sink: Arc<S>,
    meals: u64,
}

impl<S: DisplaySink> StateTracker<S> {
    pub fn new(seat: Seat, sink: Arc<S>) -> Self {
        Self {
            seat,
            sink,
            meals: 0,
        }
    }

    pub fn seat(&self) -> &Seat {
        &self.seat
    }

    pub fn meals(&self) -> u64 {
        self.meals
    }

    pub fn acquiring_first(&self) {
        self.sink.acquiring_first(&self.seat);
    }

    pub fn got_first(&self) {
        self.sink.got_first(&self.seat);
    }

    /// Counts a meal and reports it. Returns the new total.
    pub fn eating(&mut self) -> u64 {
        self.meals += 1;
        self.sink.eating(&self.seat, self.meals);
        self.meals
    }

    pub fn thinking(&self) {
        self.sink.thinking(&self.seat);
    }

    pub fn stopped(&self) {
        self.sink.stopped(&self.seat);
    }
}

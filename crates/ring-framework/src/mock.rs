//! # Mock Display
//!
//! Utilities for testing actors without a real display.
//!
//! [`RecordingSink`] implements [`DisplaySink`] by appending every notification to a
//! per-seat log. Hand it to a table, run the simulation, then inspect the logs or call
//! [`RecordingSink::verify`] to check that every seat followed the state machine:
//!
//! ```text
//! AcquiringFirst -> GotFirst -> Eating(n) -> Thinking -> AcquiringFirst ...
//!                            \-> Stopped     \-> Stopped   \-> Stopped
//! ```
//!
//! and that meal counts went up by exactly one each time.
//!
//! # Example
//! ```ignore
//! let sink = Arc::new(RecordingSink::new());
//! let table = Table::new(config, Arc::clone(&sink))?;
//! // ... run and shut down ...
//! sink.verify();
//! assert!(sink.meals_for(0).len() > 0);
//! ```

use crate::tracker::{DisplaySink, Seat};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// One recorded notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkEvent {
    AcquiringFirst,
    GotFirst,
    Eating(u64),
    Thinking,
    Stopped,
}

/// A display sink that remembers everything it was told.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<BTreeMap<usize, Vec<SinkEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn log(&self) -> MutexGuard<'_, BTreeMap<usize, Vec<SinkEvent>>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, seat: &Seat, event: SinkEvent) {
        self.log().entry(seat.index).or_default().push(event);
    }

    /// Every notification received for `seat`, in order.
    pub fn events_for(&self, seat: usize) -> Vec<SinkEvent> {
        self.log().get(&seat).cloned().unwrap_or_default()
    }

    /// The meal counts reported for `seat`, in order.
    pub fn meals_for(&self, seat: usize) -> Vec<u64> {
        self.events_for(seat)
            .into_iter()
            .filter_map(|e| match e {
                SinkEvent::Eating(n) => Some(n),
                _ => None,
            })
            .collect()
    }

    /// Seats that reported at least once.
    pub fn seats(&self) -> Vec<usize> {
        self.log().keys().copied().collect()
    }

    /// Panics unless every seat followed the state machine and counted meals one by one.
    pub fn verify(&self) {
        for (seat, events) in self.log().iter() {
            let mut previous: Option<SinkEvent> = None;
            let mut meals = 0;
            for event in events {
                let allowed = match (previous, event) {
                    (None, SinkEvent::AcquiringFirst | SinkEvent::Stopped) => true,
                    (Some(SinkEvent::AcquiringFirst), SinkEvent::GotFirst) => true,
                    (Some(SinkEvent::GotFirst), SinkEvent::Eating(_) | SinkEvent::Stopped) => true,
                    (Some(SinkEvent::Eating(_)), SinkEvent::Thinking | SinkEvent::Stopped) => true,
                    (Some(SinkEvent::Thinking), SinkEvent::AcquiringFirst | SinkEvent::Stopped) => {
                        true
                    }
                    _ => false,
                };
                assert!(
                    allowed,
                    "seat {seat}: unexpected transition {previous:?} -> {event:?}"
                );
                if let SinkEvent::Eating(n) = event {
                    meals += 1;
                    assert_eq!(*n, meals, "seat {seat}: meal counter skipped");
                }
                previous = Some(*event);
            }
        }
    }
}

impl DisplaySink for RecordingSink {
    fn acquiring_first(&self, seat: &Seat) {
        self.record(seat, SinkEvent::AcquiringFirst);
    }

    fn got_first(&self, seat: &Seat) {
        self.record(seat, SinkEvent::GotFirst);
    }

    fn eating(&self, seat: &Seat, meals: u64) {
        self.record(seat, SinkEvent::Eating(meals));
    }

    fn thinking(&self, seat: &Seat) {
        self.record(seat, SinkEvent::Thinking);
    }

    fn stopped(&self, seat: &Seat) {
        self.record(seat, SinkEvent::Stopped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_accepts_a_full_cycle() {
        let sink = RecordingSink::new();
        let pat = Seat::new(0, "Pat");
        sink.acquiring_first(&pat);
        sink.got_first(&pat);
        sink.eating(&pat, 1);
        sink.thinking(&pat);
        sink.acquiring_first(&pat);
        sink.got_first(&pat);
        sink.stopped(&pat);

        sink.verify();
        assert_eq!(sink.meals_for(0), vec![1]);
        assert_eq!(sink.seats(), vec![0]);
    }

    #[test]
    #[should_panic(expected = "unexpected transition")]
    fn test_verify_rejects_eating_without_both_resources() {
        let sink = RecordingSink::new();
        let john = Seat::new(1, "John");
        sink.acquiring_first(&john);
        sink.eating(&john, 1);
        sink.verify();
    }

    #[test]
    #[should_panic(expected = "meal counter skipped")]
    fn test_verify_rejects_skipped_meal() {
        let sink = RecordingSink::new();
        let becky = Seat::new(2, "Becky");
        sink.acquiring_first(&becky);
        sink.got_first(&becky);
        sink.eating(&becky, 2);
        sink.verify();
    }
}

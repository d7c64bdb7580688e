//! # Board Display
//!
//! A terminal stand-in for the classic window: one cell per seat showing the
//! philosopher's name, what they are doing, and how many meals they have had.
//!
//! ```text
//! Pat: eating (4) | John: thinking (3) | Becky: eating (4) | Lauren: holding first (3) | Emily: acquiring first (2)
//! ```
//!
//! Notifications arrive concurrently from every philosopher task, so the cells sit
//! behind the board's own lock. Each update is a constant-time write.

use ring_framework::{DisplaySink, PhilosopherState, Seat};
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// One seat as the board shows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub name: String,
    pub state: PhilosopherState,
    pub meals: u64,
}

/// A [`DisplaySink`] that keeps the latest state of every seat.
#[derive(Debug)]
pub struct BoardSink {
    cells: Mutex<Vec<Cell>>,
}

impl BoardSink {
    /// Everyone starts out thinking with no meals.
    pub fn new<N: AsRef<str>>(names: &[N]) -> Self {
        let cells = names
            .iter()
            .map(|name| Cell {
                name: name.as_ref().to_string(),
                state: PhilosopherState::Thinking,
                meals: 0,
            })
            .collect();
        Self {
            cells: Mutex::new(cells),
        }
    }

    fn cells(&self) -> MutexGuard<'_, Vec<Cell>> {
        self.cells.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set(&self, seat: &Seat, state: PhilosopherState, meals: Option<u64>) {
        if let Some(cell) = self.cells().get_mut(seat.index) {
            cell.state = state;
            if let Some(meals) = meals {
                cell.meals = meals;
            }
        }
    }

    /// A copy of every cell, in seat order.
    pub fn snapshot(&self) -> Vec<Cell> {
        self.cells().clone()
    }

    /// The board as a single line.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for BoardSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, cell) in self.cells().iter().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            write!(f, "{}: {} ({})", cell.name, cell.state, cell.meals)?;
        }
        Ok(())
    }
}

impl DisplaySink for BoardSink {
    fn acquiring_first(&self, seat: &Seat) {
        self.set(seat, PhilosopherState::AcquiringFirst, None);
    }

    fn got_first(&self, seat: &Seat) {
        self.set(seat, PhilosopherState::HoldingFirst, None);
    }

    fn eating(&self, seat: &Seat, meals: u64) {
        self.set(seat, PhilosopherState::Eating, Some(meals));
    }

    fn thinking(&self, seat: &Seat) {
        self.set(seat, PhilosopherState::Thinking, None);
    }

    fn stopped(&self, seat: &Seat) {
        self.set(seat, PhilosopherState::Stopped, None);
    }
}

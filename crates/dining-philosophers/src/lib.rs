//! # Dining Philosophers
//!
//! N philosophers sit in a ring with one resource (a fork) between each pair of
//! neighbours. To eat, a philosopher needs both of its resources; then it puts them
//! down and thinks for a while. Everyone grabbing "left, then right" can deadlock.
//! Here each philosopher always grabs its *lower-numbered* resource first, so the
//! last seat (resources `N-1` and `0`) goes right-then-left and no cycle of waits
//! can form.
//!
//! ## Modules
//!
//! - [`philosopher`]: the per-actor protocol (ordered acquisition, eating, release,
//!   thinking, cancellation checkpoints).
//! - [`table`]: the coordinator that builds the ring, spawns everyone and shuts the
//!   run down.
//! - [`board`]: a terminal display sink.
//! - [`config`]: startup parameters and their environment overrides.
//! - [`error`]: [`TableError`](error::TableError).
//!
//! The generic pieces (resources, the acquisition order, trackers, the cancellation
//! signal) live in [`ring_framework`].
//!
//! ## Running the Demo
//!
//! ```bash
//! cargo run -p dining-philosophers                       # until Ctrl-C
//! DINING_RUN_UNITS=30 DINING_TIME_UNIT_MS=100 cargo run -p dining-philosophers
//! ```

pub mod board;
pub mod config;
pub mod error;
pub mod philosopher;
pub mod table;

pub use board::BoardSink;
pub use config::{TableConfig, UnitRange, DEFAULT_NAMES};
pub use error::TableError;
pub use philosopher::{Philosopher, PhilosopherReport, Timing};
pub use table::{RunningTable, Table, TableReport};

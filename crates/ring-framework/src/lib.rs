//! # Ring Framework
//!
//! Building blocks for simulations in which N actors sit in a ring and compete for
//! the two exclusive resources on either side of them. The crate knows nothing about
//! philosophers; it provides the pieces whose correctness the protocol depends on.
//!
//! ## Components
//!
//! - [`resource`]: [`Resource`], a lockable unit with a numeric identity and a
//!   held-by marker; [`ResourceRing`], which lays resources out in a circle; and
//!   [`AcquisitionOrder`], the fixed lowest-identity-first order that rules out
//!   circular waits.
//! - [`tracker`]: the [`DisplaySink`] seam and the per-actor [`StateTracker`] that
//!   owns the meal counter.
//! - [`signal`]: the write-once [`CancellationSignal`], its read-only
//!   [`CancellationToken`], and the [`ShutdownTrigger`] the host waits on.
//! - [`error`]: [`RingError`], the programming errors that are refused outright.
//! - [`tracing`]: subscriber setup for the trace log.
//!
//! ## Why Ordering Avoids Deadlock
//!
//! Deadlock needs a cycle of holders each waiting on the next. In a ring where
//! everyone takes "left, then right", that cycle is one bad interleaving away. If
//! every holder instead takes its lower-numbered resource first, every wait points
//! from a lower to a higher identity, and a chain of strictly increasing identities
//! cannot close back on itself.
//!
//! ```rust
//! use ring_framework::{AcquisitionOrder, ResourceId, ResourceRing};
//!
//! let ring = ResourceRing::new(5).unwrap();
//! let (left, right) = ring.neighbors(4);
//! let order = AcquisitionOrder::new(left, right).unwrap();
//! assert_eq!(order.ids(), [ResourceId(0), ResourceId(4)]);
//! ```
//!
//! ## Testing
//!
//! The [`mock`] module provides [`RecordingSink`](mock::RecordingSink), a display sink
//! that records every notification and can verify the transition sequence of each seat.

pub mod error;
pub mod mock;
pub mod resource;
pub mod signal;
pub mod tracing;
pub mod tracker;

pub use error::RingError;
pub use resource::{AcquisitionOrder, HolderId, Resource, ResourceGuard, ResourceId, ResourceRing};
pub use signal::{After, CancellationSignal, CancellationToken, CtrlC, ShutdownTrigger};
pub use tracker::{DisplaySink, NullSink, PhilosopherState, Seat, StateTracker};

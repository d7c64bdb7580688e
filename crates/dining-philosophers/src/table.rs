//! # The Table (Simulation Coordinator)
//!
//! [`Table`] plays the orchestrator role: it builds the resource ring, seats one
//! [`Philosopher`] per name between two neighbouring resources, and spawns each one
//! in its own Tokio task. It holds the only writer of the [`CancellationSignal`];
//! philosophers get read-only tokens.
//!
//! ## Lifecycle
//!
//! ```rust,ignore
//! let table = Table::new(config, sink)?;   // 1. build ring + philosophers
//! let running = table.start();             // 2. spawn every task
//! let report = running
//!     .run_until(CtrlC)                    // 3. wait for the host to say stop
//!     .await?;                             // 4. set the signal, join everyone
//! ```
//!
//! ## Graceful Shutdown
//!
//! Shutdown never interrupts a philosopher. Setting the signal only asks each task to
//! leave at its next checkpoint; the coordinator then awaits every join handle before
//! returning, even if one of them failed. Latency is bounded by the longest meal plus
//! the longest thought still in progress.

use crate::config::TableConfig;
use crate::error::TableError;
use crate::philosopher::{Philosopher, PhilosopherReport, Timing};
use ring_framework::{
    CancellationSignal, DisplaySink, ResourceRing, RingError, Seat, ShutdownTrigger,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// The outcome of a run, one entry per seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableReport {
    pub philosophers: Vec<PhilosopherReport>,
    /// Double-holds observed on any resource. Zero unless mutual exclusion broke.
    pub double_holds: u64,
}

impl TableReport {
    pub fn total_meals(&self) -> u64 {
        self.philosophers.iter().map(|p| p.meals).sum()
    }

    pub fn philosopher(&self, name: &str) -> Option<&PhilosopherReport> {
        self.philosophers.iter().find(|p| p.name == name)
    }
}

/// A table that is set but not yet running.
pub struct Table<S: DisplaySink> {
    ring: ResourceRing,
    philosophers: Vec<Philosopher<S>>,
    signal: CancellationSignal,
}

impl<S: DisplaySink> Table<S> {
    /// Builds the ring and seats everyone.
    ///
    /// Seat `i` gets resource `i` on its left and `(i + 1) % n` on its right.
    pub fn new(config: TableConfig, sink: Arc<S>) -> Result<Self, TableError> {
        config.validate()?;
        let ring = ResourceRing::new(config.names.len())?;
        let timing = Timing::from(&config);

        let philosophers = config
            .names
            .iter()
            .enumerate()
            .map(|(index, name)| {
                let (left, right) = ring.neighbors(index);
                Philosopher::new(
                    Seat::new(index, name.clone()),
                    left,
                    right,
                    Arc::clone(&sink),
                    timing,
                    config.rng_for(index),
                )
            })
            .collect();

        Ok(Self {
            ring,
            philosophers,
            signal: CancellationSignal::new(),
        })
    }

    pub fn ring(&self) -> &ResourceRing {
        &self.ring
    }

    /// Spawns every philosopher. The signal stays clear until shutdown.
    pub fn start(self) -> RunningTable {
        let handles = self
            .philosophers
            .into_iter()
            .map(|philosopher| {
                let seat = philosopher.seat().clone();
                info!(philosopher = %seat, "Starting");
                let handle = tokio::spawn(philosopher.run(self.signal.token()));
                (seat, handle)
            })
            .collect();

        RunningTable {
            ring: self.ring,
            signal: self.signal,
            handles,
        }
    }
}

/// A table whose philosophers are running.
pub struct RunningTable {
    ring: ResourceRing,
    signal: CancellationSignal,
    handles: Vec<(Seat, JoinHandle<Result<PhilosopherReport, RingError>>)>,
}

impl RunningTable {
    pub fn ring(&self) -> &ResourceRing {
        &self.ring
    }

    /// Waits for `trigger`, then shuts down.
    ///
    /// The table is shut down even if waiting on the trigger failed.
    pub async fn run_until<T: ShutdownTrigger>(
        self,
        mut trigger: T,
    ) -> Result<TableReport, TableError> {
        let fired = trigger.wait().await;
        if let Err(e) = &fired {
            error!(error = %e, "Shutdown trigger failed");
        }
        let report = self.shutdown().await?;
        fired?;
        Ok(report)
    }

    /// Sets the cancellation signal and waits for every philosopher to stop.
    ///
    /// # Returns
    ///
    /// - `Ok(report)` once every task has stopped cleanly
    /// - `Err` with the first failure, after *all* tasks have been joined
    pub async fn shutdown(self) -> Result<TableReport, TableError> {
        info!("Shutting down table...");
        self.signal.set();

        let mut philosophers = Vec::with_capacity(self.handles.len());
        let mut failure = None;
        for (seat, handle) in self.handles {
            match handle.await {
                Ok(Ok(report)) => philosophers.push(report),
                Ok(Err(e)) => {
                    error!(philosopher = %seat, error = %e, "Philosopher failed");
                    if failure.is_none() {
                        failure = Some(TableError::Ring(e));
                    }
                }
                Err(e) => {
                    error!(philosopher = %seat, error = %e, "Philosopher task failed");
                    if failure.is_none() {
                        failure = Some(TableError::ActorPanicked {
                            name: seat.name,
                            source: e,
                        });
                    }
                }
            }
        }
        if let Some(e) = failure {
            return Err(e);
        }

        let report = TableReport {
            philosophers,
            double_holds: self.ring.double_holds(),
        };
        info!(
            meals = report.total_meals(),
            double_holds = report.double_holds,
            "Table shutdown complete."
        );
        Ok(report)
    }
}

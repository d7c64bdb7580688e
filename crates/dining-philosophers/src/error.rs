//! Error types for the dining table.

use ring_framework::RingError;
use thiserror::Error;

/// Errors that can occur while setting up, running or tearing down a table.
#[derive(Debug, Error)]
pub enum TableError {
    /// The configuration was rejected before anything started.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The resource ring was built or used incorrectly.
    #[error(transparent)]
    Ring(#[from] RingError),

    /// A philosopher task panicked or was cancelled by the runtime.
    #[error("Philosopher {name} did not finish: {source}")]
    ActorPanicked {
        name: String,
        #[source]
        source: tokio::task::JoinError,
    },

    /// Waiting for the shutdown trigger failed.
    #[error("Shutdown trigger failed: {0}")]
    Signal(#[from] std::io::Error),
}

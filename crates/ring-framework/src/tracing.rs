//! # Observability & Tracing
//!
//! The trace log is the "log sink" of the simulation: fire-and-forget, never on the
//! critical path. Actors emit structured events tagged with their name:
//!
//! ```text
//! INFO Order computed philosopher=Emily left=4 right=0 first=0 second=4
//! INFO Eating philosopher=Pat units=3 meals=7
//! INFO Thinking philosopher=Pat units=1
//! INFO Stopped philosopher=Pat meals=7
//! ```
//!
//! Acquire/release detail for each resource is logged at `debug`.
//!
//! ```bash
//! RUST_LOG=info cargo run          # lifecycle and phases (default)
//! RUST_LOG=debug cargo run         # every acquire and release
//! RUST_LOG=ring_framework=debug,dining_philosophers=info cargo run
//! ```

use tracing_subscriber::EnvFilter;

/// Installs a compact `fmt` subscriber filtered by `RUST_LOG` (default `info`).
pub fn setup_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

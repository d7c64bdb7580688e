//! # Framework Errors
//!
//! The ordering protocol itself cannot fail: acquiring a resource only ever blocks.
//! What this module covers are the *programming errors* around it, the ones that
//! would silently break the deadlock-avoidance argument if they were tolerated.
//! They are surfaced as values so tests can fail fast on them.

use crate::resource::{HolderId, ResourceId};

/// Errors raised when the resource ring is built or used incorrectly.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RingError {
    /// A ring needs at least two resources shared by at least two holders.
    #[error("Ring too small: {size} (minimum 2)")]
    RingTooSmall { size: usize },

    /// Resource identities are `u32`; a ring cannot have more than `u32::MAX` of them.
    #[error("Ring too large: {size} (maximum {max})", max = u32::MAX)]
    RingTooLarge { size: usize },

    /// Two resources in the same ring (or the same pair) share an identity.
    #[error("Duplicate resource identity: {0}")]
    DuplicateResource(ResourceId),

    /// The caller tried to acquire a resource it already holds.
    #[error("Resource {resource} already held by {holder}")]
    AlreadyHeld {
        resource: ResourceId,
        holder: HolderId,
    },

    /// The caller tried to release a resource it does not hold.
    #[error("Resource {resource} is not held by {holder}")]
    NotHeld {
        resource: ResourceId,
        holder: HolderId,
    },
}

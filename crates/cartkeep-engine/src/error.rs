//! # Cart Error Type
//!
//! What cart collaborators can observe going wrong.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in cartkeep                               │
//! │                                                                         │
//! │  Source                         Handling                                │
//! │  ──────                         ────────                                │
//! │                                                                         │
//! │  CartHandle used after its  ──► Err(UninitializedAccess)  ──► caller    │
//! │  engine is gone                 (the only hard error)                   │
//! │                                                                         │
//! │  store.get fails            ──► PersistenceReadFailed  ─┐               │
//! │  blob does not decode       ──► PersistenceReadCorrupt ─┼─► warn! log   │
//! │  store.set fails            ──► PersistenceWriteFailed ─┘   + broadcast │
//! │                                                             warnings()  │
//! │                                                                         │
//! │  Persistence faults never roll back or block the in-memory cart.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Errors surfaced by the cart engine.
///
/// `Clone` so persistence faults can be fanned out on the warnings channel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// The access surface was used without a live engine behind it.
    ///
    /// ## When This Occurs
    /// - A `CartHandle::detached()` handle is used
    /// - A handle outlives the `CartEngine` that issued it
    ///
    /// This is a lifecycle bug in the caller, not a transient condition.
    #[error("Cart used outside the engine scope that owns it")]
    UninitializedAccess,

    /// The store could not be read during hydration. The cart starts empty.
    #[error("Cart read failed: {0}")]
    PersistenceReadFailed(String),

    /// The stored blob could not be decoded. The cart starts empty.
    #[error("Persisted cart is corrupt: {0}")]
    PersistenceReadCorrupt(String),

    /// A snapshot could not be written. The in-memory cart is unaffected.
    #[error("Persisting cart revision {revision} failed: {reason}")]
    PersistenceWriteFailed { revision: u64, reason: String },

    /// The background writer stopped before settling a write.
    #[error("Cart persistence writer is not running")]
    PersistenceUnavailable,
}

impl CartError {
    /// Returns true for errors that indicate caller misuse.
    ///
    /// Everything else is a degraded-durability warning.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CartError::UninitializedAccess)
    }
}

/// Result type for cart operations.
pub type CartResult<T> = Result<T, CartError>;

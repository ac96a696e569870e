//! # Error Types
//!
//! Domain-specific error types for cartkeep-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  cartkeep-core errors (this file)                                      │
//! │  └── CoreError        - Blob encode/decode failures                    │
//! │                                                                         │
//! │  cartkeep-db errors (separate crate)                                   │
//! │  └── DbError          - Store operation failures                       │
//! │                                                                         │
//! │  cartkeep-engine errors                                                │
//! │  └── CartError        - What collaborators see                         │
//! │                                                                         │
//! │  Flow: CoreError / DbError → CartError (absorbed or surfaced)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The state derivations themselves are total and never produce an error.

use thiserror::Error;

/// Core model errors.
///
/// Only the blob codec can fail; every cart derivation is total.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The persisted blob is not a valid cart line collection.
    ///
    /// ## When This Occurs
    /// - Blob is not JSON (truncated write, foreign data under our key)
    /// - JSON has the wrong shape (missing `quantity`, object instead of array)
    #[error("Corrupt cart blob: {0}")]
    CorruptBlob(String),

    /// The cart could not be serialized.
    #[error("Cart encoding failed: {0}")]
    Encode(String),
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::CorruptBlob("expected value at line 1 column 1".to_string());
        assert_eq!(
            err.to_string(),
            "Corrupt cart blob: expected value at line 1 column 1"
        );
    }
}

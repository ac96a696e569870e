//! # Blob Codec
//!
//! Converts a [`CartState`] to and from the blob stored under the cart key.
//!
//! ## Format
//! A JSON array of lines in display order:
//! ```json
//! [
//!   { "id": "x", "title": "T", "image_url": "u", "price": 10, "quantity": 1 }
//! ]
//! ```

use crate::cart::CartState;
use crate::error::{CoreError, CoreResult};
use crate::types::CartLine;

/// Serializes the cart into its persisted blob.
pub fn encode_lines(state: &CartState) -> CoreResult<String> {
    serde_json::to_string(state).map_err(|e| CoreError::Encode(e.to_string()))
}

/// Parses a persisted blob back into a cart.
///
/// Repeated ids are folded into one line (see [`CartState::from_lines`]).
/// Stored quantities are kept as they are; a negative quantity written by
/// an unbounded decrement loads unchanged.
pub fn decode_lines(blob: &str) -> CoreResult<CartState> {
    let lines: Vec<CartLine> =
        serde_json::from_str(blob).map_err(|e| CoreError::CorruptBlob(e.to_string()))?;

    Ok(CartState::from_lines(lines))
}

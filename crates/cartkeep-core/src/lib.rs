//! # cartkeep-core: Pure Cart Model
//!
//! This crate holds the cart data model and the pure derivations the engine
//! uses to move from one cart snapshot to the next. Nothing here performs I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        cartkeep Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 UI collaborators (external)                     │   │
//! │  │        product list ──► cart screen ──► checkout badge          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ CartHandle                             │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 cartkeep-engine (CartEngine)                    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ cartkeep-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌────────────────┐  ┌───────────┐             │   │
//! │  │   │   types   │  │      cart      │  │   codec   │             │   │
//! │  │   │  Product  │  │   CartState    │  │  encode   │             │   │
//! │  │   │  CartLine │  │ DecrementPolicy│  │  decode   │             │   │
//! │  │   └───────────┘  └────────────────┘  └───────────┘             │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO CHANNELS • PURE FUNCTIONS                         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - `Product` descriptor and `CartLine`
//! - [`cart`] - `CartState` and its derivations
//! - [`codec`] - Persisted blob format
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use cartkeep_core::{CartState, DecrementPolicy, Product};
//!
//! let shoe = Product::new("x", "Trail shoe", "https://cdn/x.png", 10.0);
//!
//! let cart = CartState::new()
//!     .with_upserted_line(shoe.clone())
//!     .with_upserted_line(shoe);
//! assert_eq!(cart.get("x").map(|l| l.quantity), Some(2));
//!
//! let cart = cart.with_quantity_delta("x", -1, DecrementPolicy::ClampAtZero);
//! assert_eq!(cart.get("x").map(|l| l.quantity), Some(1));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod codec;
pub mod error;
pub mod types;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{CartState, DecrementPolicy};
pub use codec::{decode_lines, encode_lines};
pub use error::{CoreError, CoreResult};
pub use types::{CartLine, Product};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Key under which the cart blob is stored unless configured otherwise.
///
/// Namespaced so the cart can share a key-value store with other features.
pub const DEFAULT_STORAGE_KEY: &str = "@GoMarketplace:products";

/// Quantity every freshly added line starts with.
pub const INITIAL_QUANTITY: i64 = 1;

//! # Domain Types
//!
//! The two records the cart deals in.
//!
//! ```text
//! ┌─────────────────┐                 ┌─────────────────┐
//! │    Product      │  from_product   │    CartLine     │
//! │  ─────────────  │ ──────────────► │  ─────────────  │
//! │  id             │                 │  id             │
//! │  title          │                 │  title          │
//! │  image_url      │                 │  image_url      │
//! │  price          │                 │  price          │
//! └─────────────────┘                 │  quantity = 1   │
//!                                     └─────────────────┘
//! ```
//!
//! `title`, `image_url` and `price` are opaque to the cart: they are carried
//! through untouched and never validated or used in arithmetic.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::INITIAL_QUANTITY;

// =============================================================================
// Product
// =============================================================================

/// A product descriptor as handed to `add_to_cart` (no quantity).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    /// Opaque identifier, unique within the cart.
    pub id: String,

    /// Display name.
    pub title: String,

    /// Product image location.
    pub image_url: String,

    /// Unit price, opaque to the cart.
    pub price: f64,
}

impl Product {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        image_url: impl Into<String>,
        price: f64,
    ) -> Self {
        Product {
            id: id.into(),
            title: title.into(),
            image_url: image_url.into(),
            price,
        }
    }
}

// =============================================================================
// Cart Line
// =============================================================================

/// One product and its quantity in the cart.
///
/// Serialized field names (`id`, `title`, `image_url`, `price`, `quantity`)
/// are the persisted blob format and must not change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLine {
    pub id: String,
    pub title: String,
    pub image_url: String,
    pub price: f64,

    /// Signed so the `AllowNegative` decrement policy can be represented.
    #[ts(type = "number")]
    pub quantity: i64,
}

impl CartLine {
    /// Creates a new line for a product. Lines always start at quantity 1.
    pub fn from_product(product: Product) -> Self {
        CartLine {
            id: product.id,
            title: product.title,
            image_url: product.image_url,
            price: product.price,
            quantity: INITIAL_QUANTITY,
        }
    }

    /// Returns the product descriptor this line was built from.
    pub fn product(&self) -> Product {
        Product {
            id: self.id.clone(),
            title: self.title.clone(),
            image_url: self.image_url.clone(),
            price: self.price,
        }
    }
}

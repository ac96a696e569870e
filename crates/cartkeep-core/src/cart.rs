//! # Cart State
//!
//! The ordered collection of cart lines and the pure derivations used to go
//! from one snapshot to the next.
//!
//! ## Snapshot Discipline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart State Derivations                               │
//! │                                                                         │
//! │  Operation              Derivation                  Result              │
//! │  ─────────              ──────────                  ──────              │
//! │                                                                         │
//! │  add_to_cart(p) ──────► with_upserted_line(p) ────► new CartState       │
//! │                         (append qty 1, or +1)                           │
//! │                                                                         │
//! │  increment(id) ───────► with_quantity_delta(+1) ──► Owned | Borrowed    │
//! │                                                                         │
//! │  decrement(id) ───────► with_quantity_delta(-1) ──► Owned | Borrowed    │
//! │                                                                         │
//! │  NOTE: a CartState is never mutated in place. Every derivation builds   │
//! │        a new value; `Cow::Borrowed` means "nothing changed".            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - At most one line per `id`
//! - New lines start at quantity 1 and are appended at the end
//! - Delta updates on an absent `id` are identity

use std::borrow::Cow;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::{CartLine, Product};

// =============================================================================
// Decrement Policy
// =============================================================================

/// What happens to a line whose quantity is decremented towards zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DecrementPolicy {
    /// Quantity never drops below 0. A line at 0 stays in the cart and
    /// further decrements leave it unchanged, so decrement followed by
    /// increment does not restore a line that was already at 0. A quantity
    /// that is already negative is left where it is.
    #[default]
    ClampAtZero,

    /// A line whose quantity would reach 0 is removed from the cart.
    RemoveAtZero,

    /// Quantity is decremented without a floor and the line is kept.
    AllowNegative,
}

impl DecrementPolicy {
    /// Applies `delta` to `quantity`. `None` means the line is removed.
    fn apply(self, quantity: i64, delta: i64) -> Option<i64> {
        let next = quantity.saturating_add(delta);

        if delta >= 0 {
            return Some(next);
        }

        match self {
            // Never pushes a quantity below zero, nor lower than it already is.
            DecrementPolicy::ClampAtZero => Some(next.max(quantity.min(0))),
            DecrementPolicy::RemoveAtZero if next <= 0 => None,
            DecrementPolicy::RemoveAtZero | DecrementPolicy::AllowNegative => Some(next),
        }
    }
}

impl FromStr for DecrementPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clamp" | "clamp-at-zero" => Ok(DecrementPolicy::ClampAtZero),
            "remove" | "remove-at-zero" => Ok(DecrementPolicy::RemoveAtZero),
            "allow-negative" | "negative" => Ok(DecrementPolicy::AllowNegative),
            other => Err(format!("unknown decrement policy '{other}'")),
        }
    }
}

// =============================================================================
// Cart State
// =============================================================================

/// The ordered sequence of cart lines.
///
/// Serializes as a bare JSON array of lines, which is the persisted blob.
/// Decoding goes through [`crate::codec::decode_lines`] so duplicates fold.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CartState {
    lines: Vec<CartLine>,
}

impl CartState {
    /// Creates an empty cart.
    pub fn new() -> Self {
        CartState { lines: Vec::new() }
    }

    /// Builds a cart from lines, folding repeated ids into the first
    /// occurrence (quantities are summed) so the unique-id invariant holds.
    ///
    /// Quantities are otherwise kept as given, zero and negative included.
    pub fn from_lines(lines: impl IntoIterator<Item = CartLine>) -> Self {
        let mut folded: Vec<CartLine> = Vec::new();

        for line in lines {
            match folded.iter_mut().find(|l| l.id == line.id) {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(line.quantity)
                }
                None => folded.push(line),
            }
        }

        CartState { lines: folded }
    }

    /// Returns a new cart with `product` added.
    ///
    /// ## Behavior
    /// - If a line with the same id exists: its quantity increases by 1
    /// - Otherwise: the product is appended with quantity 1
    pub fn with_upserted_line(&self, product: Product) -> CartState {
        let mut lines = self.lines.clone();

        match lines.iter_mut().find(|l| l.id == product.id) {
            Some(line) => line.quantity = line.quantity.saturating_add(1),
            None => lines.push(CartLine::from_product(product)),
        }

        CartState { lines }
    }

    /// Returns the cart with `delta` applied to the line with `id`.
    ///
    /// `Cow::Borrowed(self)` is returned when nothing changes: the id is
    /// absent, or `policy` leaves the quantity where it was.
    pub fn with_quantity_delta(
        &self,
        id: &str,
        delta: i64,
        policy: DecrementPolicy,
    ) -> Cow<'_, CartState> {
        let Some(index) = self.position(id) else {
            return Cow::Borrowed(self);
        };

        let current = self.lines[index].quantity;
        let next = policy.apply(current, delta);
        if next == Some(current) {
            return Cow::Borrowed(self);
        }

        let mut lines = self.lines.clone();
        match next {
            Some(quantity) => lines[index].quantity = quantity,
            None => {
                lines.remove(index);
            }
        }

        Cow::Owned(CartState { lines })
    }

    /// Returns the lines in display order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Consumes the cart, returning its lines.
    pub fn into_lines(self) -> Vec<CartLine> {
        self.lines
    }

    /// Iterates over lines in display order.
    pub fn iter(&self) -> std::slice::Iter<'_, CartLine> {
        self.lines.iter()
    }

    /// Returns the line with `id`, if present.
    pub fn get(&self, id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.id == id)
    }

    /// Checks whether a line with `id` is present.
    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    /// Returns the number of distinct lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Returns the total quantity across all lines (badge count).
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.lines.iter().position(|l| l.id == id)
    }
}

impl<'a> IntoIterator for &'a CartState {
    type Item = &'a CartLine;
    type IntoIter = std::slice::Iter<'a, CartLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}

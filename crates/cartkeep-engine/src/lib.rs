//! # cartkeep-engine: Persistent Shopping Cart Engine
//!
//! Keeps one authoritative in-memory cart, shares it with any number of
//! collaborators, and persists every change to a key-value store on a best
//! effort basis.
//!
//! ## Guarantees
//! - The in-memory cart is the source of truth; store failures never block
//!   or roll back a mutation.
//! - Every mutation derives from the latest snapshot, so concurrent changes
//!   are never lost.
//! - Writes reach the store in the order they were issued.
//! - The stored cart is loaded once at startup, replacing the placeholder
//!   wholesale.
//!
//! ## Module Organization
//!
//! - [`engine`] - `CartEngine`, snapshots and hydration
//! - [`handle`] - `CartHandle`, the weak access surface
//! - [`persistence`] - The background writer and `PendingWrite`
//! - [`config`] - `CartConfig`
//! - [`error`] - `CartError`
//! - [`telemetry`] - Tracing subscriber setup
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cartkeep_db::{default_database_path, Database, DbConfig};
//! use cartkeep_engine::{telemetry, CartConfig, CartEngine};
//! use cartkeep_core::Product;
//!
//! telemetry::init_tracing();
//!
//! let db = Database::new(DbConfig::new(default_database_path()?)).await?;
//! let engine = CartEngine::new(db, CartConfig::from_env());
//! engine.initialize().await;
//!
//! let cart = engine.handle();
//! cart.add_to_cart(Product::new("x", "Trail shoe", "https://cdn/x.png", 10.0))?;
//! engine.flush().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod engine;
pub mod error;
pub mod handle;
pub mod persistence;
pub mod telemetry;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::CartConfig;
pub use engine::{CartEngine, CartSnapshot, Hydration};
pub use error::{CartError, CartResult};
pub use handle::CartHandle;
pub use persistence::{PendingWrite, PersistOutcome};

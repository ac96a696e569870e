//! # cartkeep-db: Store Adapter for cartkeep
//!
//! This crate provides the key-value storage the cart engine persists into.
//! It uses SQLite via sqlx for durable storage and offers an in-memory
//! store for tests and throwaway carts.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        cartkeep Data Flow                               │
//! │                                                                         │
//! │  CartEngine (initialize / persistence writer)                          │
//! │       │                                                                 │
//! │       │  store.get(key) / store.set(key, blob)                          │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   cartkeep-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │ KeyValueStore │    │  KvRepository │    │  Migrations  │  │   │
//! │  │   │  (store.rs)   │    │   (kv.rs)     │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ Database ─────┼───►│ get / set     │    │ 001_kv_store │  │   │
//! │  │   │ MemoryStore   │    │ delete / keys │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   <platform data dir>/cartkeep/cart.db                          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - The `kv_store` repository
//! - [`store`] - The `KeyValueStore` contract and its implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cartkeep_db::{Database, DbConfig, KeyValueStore};
//!
//! let db = Database::new(DbConfig::new("path/to/cart.db")).await?;
//!
//! db.set("@GoMarketplace:products", "[]").await?;
//! let blob = db.get("@GoMarketplace:products").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{default_database_path, Database, DbConfig};
pub use repository::kv::KvRepository;
pub use store::{KeyValueStore, MemoryStore};

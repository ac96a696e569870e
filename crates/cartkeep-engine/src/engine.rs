//! # Cart Engine
//!
//! Owns the single authoritative cart and keeps the store eventually
//! consistent with it.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Engine Lifecycle                                │
//! │                                                                         │
//! │  CartEngine::new(store, config)                                         │
//! │       │      revision 0, empty, initialized = false                     │
//! │       ▼                                                                 │
//! │  initialize().await                                                     │
//! │       │      store.get(key) ──► decode ──► replace state wholesale      │
//! │       │      (missing / unreadable / corrupt ──► empty cart)            │
//! │       │      spawn persistence writer                                   │
//! │       ▼                                                                 │
//! │  add_to_cart / increment / decrement                                    │
//! │       │      1. read the CURRENT snapshot (under the write lock)        │
//! │       │      2. derive the next CartState (pure, cartkeep-core)         │
//! │       │      3. publish to subscribers (revision + 1)                   │
//! │       │      4. enqueue one write job                                   │
//! │       ▼                                                                 │
//! │  PendingWrite (drop it, or .settled().await for durability)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Thread Safety
//! Snapshots live in a `tokio::sync::watch` channel. Mutations run their
//! read-derive-publish step inside `send_if_modified`, which holds the
//! channel's write lock, so no mutation can derive from a stale snapshot and
//! revisions are handed out in the same order jobs reach the writer.
//! Readers only clone an `Arc`.

use std::borrow::Cow;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tracing::{debug, info, warn};

use cartkeep_core::{decode_lines, CartState, DecrementPolicy, Product};
use cartkeep_db::KeyValueStore;

use crate::config::CartConfig;
use crate::error::{CartError, CartResult};
use crate::handle::CartHandle;
use crate::persistence::{PendingWrite, WriteJob, Writer};

// =============================================================================
// Snapshots
// =============================================================================

/// One published version of the cart.
#[derive(Debug, Clone)]
pub struct CartSnapshot {
    /// Bumped by one for every published change (hydration included).
    pub revision: u64,

    /// False until hydration has replaced the startup placeholder.
    pub initialized: bool,

    /// The cart lines. Shared, never mutated.
    pub state: Arc<CartState>,
}

impl CartSnapshot {
    fn empty() -> Self {
        CartSnapshot {
            revision: 0,
            initialized: false,
            state: Arc::new(CartState::new()),
        }
    }
}

/// What `initialize()` found in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hydration {
    /// Nothing stored yet; the cart starts empty.
    Fresh,

    /// A stored cart was loaded.
    Restored { lines: usize },

    /// The stored cart was unreadable or corrupt; the cart starts empty.
    Discarded { reason: String },

    /// `initialize()` had already been called on this engine.
    AlreadyInitialized,
}

// =============================================================================
// Shared state
// =============================================================================

/// The part of the engine reachable from handles.
pub(crate) struct Shared {
    snapshots: watch::Sender<CartSnapshot>,
    jobs: mpsc::UnboundedSender<WriteJob>,
    warnings: broadcast::Sender<CartError>,
    settled: Arc<watch::Sender<u64>>,
    policy: DecrementPolicy,
}

impl Shared {
    pub(crate) fn snapshot(&self) -> CartSnapshot {
        self.snapshots.borrow().clone()
    }

    pub(crate) fn products(&self) -> Arc<CartState> {
        Arc::clone(&self.snapshots.borrow().state)
    }

    pub(crate) fn is_initialized(&self) -> bool {
        self.snapshots.borrow().initialized
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<CartSnapshot> {
        self.snapshots.subscribe()
    }

    pub(crate) fn warnings(&self) -> broadcast::Receiver<CartError> {
        self.warnings.subscribe()
    }

    pub(crate) fn add_to_cart(&self, product: Product) -> PendingWrite {
        let id = product.id.clone();
        let pending = self.mutate(|state| Some(state.with_upserted_line(product)));
        debug!(id = %id, revision = pending.revision(), "add_to_cart");
        pending
    }

    pub(crate) fn increment(&self, id: &str) -> PendingWrite {
        self.apply_delta(id, 1)
    }

    pub(crate) fn decrement(&self, id: &str) -> PendingWrite {
        self.apply_delta(id, -1)
    }

    fn apply_delta(&self, id: &str, delta: i64) -> PendingWrite {
        let policy = self.policy;
        let pending = self.mutate(|state| {
            match state.with_quantity_delta(id, delta, policy) {
                Cow::Owned(next) => Some(next),
                Cow::Borrowed(_) => None,
            }
        });

        debug!(
            id = %id,
            delta,
            revision = pending.revision(),
            unchanged = pending.is_unchanged(),
            "quantity change"
        );
        pending
    }

    /// Derives the next state from the current snapshot, publishes it and
    /// enqueues its write, all under the snapshot write lock.
    ///
    /// `derive` returning `None` means "unchanged": nothing is published and
    /// no write is issued.
    fn mutate(&self, derive: impl FnOnce(&CartState) -> Option<CartState>) -> PendingWrite {
        let mut pending = None;

        self.snapshots.send_if_modified(|snapshot| {
            let Some(next) = derive(&snapshot.state) else {
                pending = Some(PendingWrite::unchanged(snapshot.revision));
                return false;
            };

            let revision = snapshot.revision + 1;
            let state = Arc::new(next);
            snapshot.revision = revision;
            snapshot.state = Arc::clone(&state);

            let (done, receipt) = oneshot::channel();
            if self
                .jobs
                .send(WriteJob {
                    revision,
                    state,
                    done,
                })
                .is_err()
            {
                warn!(revision, "Persistence writer is gone; change kept in memory only");
            }

            pending = Some(PendingWrite::queued(revision, receipt));
            true
        });

        // send_if_modified always runs the closure exactly once
        pending.unwrap_or_else(|| PendingWrite::unchanged(self.snapshots.borrow().revision))
    }

    /// Replaces the cart wholesale with the hydrated state.
    fn hydrate(&self, state: CartState) -> u64 {
        let mut revision = 0;

        self.snapshots.send_modify(|snapshot| {
            snapshot.revision += 1;
            snapshot.initialized = true;
            snapshot.state = Arc::new(state);
            revision = snapshot.revision;
        });

        revision
    }

    fn report(&self, err: CartError) {
        warn!(error = %err, "Cart persistence degraded");
        let _ = self.warnings.send(err);
    }
}

// =============================================================================
// Engine
// =============================================================================

/// The cart engine.
///
/// Construct one per application at startup, call [`initialize`], and pass
/// it (or [`CartHandle`]s from [`handle`]) to whatever needs the cart.
///
/// [`initialize`]: CartEngine::initialize
/// [`handle`]: CartEngine::handle
pub struct CartEngine<S> {
    shared: Arc<Shared>,
    store: Arc<S>,
    config: CartConfig,
    /// Taken by the first `initialize()` call.
    pending_jobs: Mutex<Option<mpsc::UnboundedReceiver<WriteJob>>>,
}

impl<S: KeyValueStore> CartEngine<S> {
    /// Creates an engine with an empty, not yet hydrated cart.
    pub fn new(store: S, config: CartConfig) -> Self {
        let (snapshots, _) = watch::channel(CartSnapshot::empty());
        let (jobs, pending_jobs) = mpsc::unbounded_channel();
        let (warnings, _) = broadcast::channel(config.warning_capacity.max(1));
        let (settled, _) = watch::channel(0);

        let shared = Shared {
            snapshots,
            jobs,
            warnings,
            settled: Arc::new(settled),
            policy: config.decrement_policy,
        };

        CartEngine {
            shared: Arc::new(shared),
            store: Arc::new(store),
            config,
            pending_jobs: Mutex::new(Some(pending_jobs)),
        }
    }

    /// Loads the stored cart and starts the persistence writer.
    ///
    /// ## Behavior
    /// - Runs once; later calls return [`Hydration::AlreadyInitialized`]
    /// - Missing blob: empty cart
    /// - Unreadable or corrupt blob: empty cart plus a warning; never fails
    /// - Mutations made before this resolves are replaced by the hydrated
    ///   cart and their writes are superseded
    pub async fn initialize(&self) -> Hydration {
        let jobs = self
            .pending_jobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(jobs) = jobs else {
            return Hydration::AlreadyInitialized;
        };

        let key = self.config.storage_key.clone();
        info!(key = %key, "Hydrating cart");

        let (state, hydration) = match self.store.get(&key).await {
            Ok(None) => (CartState::new(), Hydration::Fresh),
            Ok(Some(blob)) => match decode_lines(&blob) {
                Ok(state) => {
                    let lines = state.len();
                    (state, Hydration::Restored { lines })
                }
                Err(e) => self.discard(CartError::PersistenceReadCorrupt(e.to_string())),
            },
            Err(e) => self.discard(CartError::PersistenceReadFailed(e.to_string())),
        };

        let durable = self.shared.hydrate(state);
        self.shared
            .settled
            .send_modify(|settled| *settled = (*settled).max(durable));

        let writer = Writer {
            store: Arc::clone(&self.store),
            key,
            jobs,
            warnings: self.shared.warnings.clone(),
            settled: Arc::clone(&self.shared.settled),
            durable,
        };
        tokio::spawn(writer.run());

        info!(revision = durable, ?hydration, "Cart initialized");
        hydration
    }

    fn discard(&self, err: CartError) -> (CartState, Hydration) {
        let reason = err.to_string();
        self.shared.report(err);
        (CartState::new(), Hydration::Discarded { reason })
    }

    /// Returns a cloneable access handle for collaborators.
    pub fn handle(&self) -> CartHandle {
        CartHandle::new(Arc::downgrade(&self.shared))
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &CartConfig {
        &self.config
    }

    /// Returns the current cart lines.
    pub fn products(&self) -> Arc<CartState> {
        self.shared.products()
    }

    /// Returns the current snapshot (lines, revision, initialized flag).
    pub fn snapshot(&self) -> CartSnapshot {
        self.shared.snapshot()
    }

    /// Checks whether hydration has completed.
    pub fn is_initialized(&self) -> bool {
        self.shared.is_initialized()
    }

    /// Subscribes to published snapshots.
    pub fn subscribe(&self) -> watch::Receiver<CartSnapshot> {
        self.shared.subscribe()
    }

    /// Subscribes to persistence warnings (read/corrupt/write failures).
    pub fn warnings(&self) -> broadcast::Receiver<CartError> {
        self.shared.warnings()
    }

    /// Adds a product, or bumps its quantity if already in the cart.
    pub fn add_to_cart(&self, product: Product) -> PendingWrite {
        self.shared.add_to_cart(product)
    }

    /// Increments the quantity of the line with `id`. No-op if absent.
    pub fn increment(&self, id: &str) -> PendingWrite {
        self.shared.increment(id)
    }

    /// Decrements the quantity of the line with `id` per the configured
    /// [`DecrementPolicy`]. No-op if absent.
    pub fn decrement(&self, id: &str) -> PendingWrite {
        self.shared.decrement(id)
    }

    /// Waits until every write issued so far has been settled.
    ///
    /// Mutations made before `initialize()` settle once hydration has run.
    pub async fn flush(&self) -> CartResult<()> {
        let target = self.shared.snapshots.borrow().revision;
        let mut settled = self.shared.settled.subscribe();

        settled
            .wait_for(|revision| *revision >= target)
            .await
            .map(|_| ())
            .map_err(|_| CartError::PersistenceUnavailable)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::PersistOutcome;
    use async_trait::async_trait;
    use cartkeep_core::{decode_lines, encode_lines, CartLine};
    use cartkeep_db::{Database, DbConfig, DbError, DbResult, MemoryStore};
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicBool, Ordering};

    const KEY: &str = "@GoMarketplace:products";

    fn product(id: &str) -> Product {
        Product::new(id, format!("Product {id}"), format!("https://img/{id}.png"), 10.0)
    }

    fn quantity(engine: &CartEngine<impl KeyValueStore>, id: &str) -> Option<i64> {
        engine.products().get(id).map(|l| l.quantity)
    }

    async fn stored(store: &impl KeyValueStore) -> Option<CartState> {
        store
            .get(KEY)
            .await
            .unwrap()
            .map(|blob| decode_lines(&blob).unwrap())
    }

    async fn ready_engine(store: MemoryStore) -> CartEngine<MemoryStore> {
        let engine = CartEngine::new(store, CartConfig::default());
        engine.initialize().await;
        engine
    }

    /// MemoryStore with switchable read/write failures.
    #[derive(Clone, Default)]
    struct FlakyStore {
        inner: MemoryStore,
        fail_reads: Arc<AtomicBool>,
        fail_writes: Arc<AtomicBool>,
    }

    #[async_trait]
    impl KeyValueStore for FlakyStore {
        async fn get(&self, key: &str) -> DbResult<Option<String>> {
            if self.fail_reads.load(Ordering::SeqCst) {
                return Err(DbError::QueryFailed("disk I/O error".to_string()));
            }
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, blob: &str) -> DbResult<()> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(DbError::QueryFailed("database or disk is full".to_string()));
            }
            self.inner.set(key, blob).await
        }
    }

    // -------------------------------------------------------------------------
    // Hydration
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_fresh_store_starts_empty() {
        let engine = CartEngine::new(MemoryStore::new(), CartConfig::default());
        assert!(!engine.is_initialized());

        assert_eq!(engine.initialize().await, Hydration::Fresh);

        assert!(engine.is_initialized());
        assert!(engine.products().is_empty());
    }

    #[tokio::test]
    async fn test_hydrates_persisted_cart_before_any_mutation() {
        let blob = r#"[{"id":"a","title":"A","image_url":"u","price":1.5,"quantity":3}]"#;
        let engine = CartEngine::new(MemoryStore::with_entry(KEY, blob), CartConfig::default());

        assert_eq!(engine.initialize().await, Hydration::Restored { lines: 1 });

        let products = engine.products();
        assert_eq!(products.len(), 1);
        assert_eq!(quantity(&engine, "a"), Some(3));
        assert_eq!(*products, decode_lines(blob).unwrap());
    }

    #[tokio::test]
    async fn test_corrupt_blob_degrades_to_empty_cart() {
        let engine = CartEngine::new(
            MemoryStore::with_entry(KEY, "{not a cart"),
            CartConfig::default(),
        );
        let mut warnings = engine.warnings();

        let hydration = engine.initialize().await;

        assert!(matches!(hydration, Hydration::Discarded { .. }));
        assert!(engine.is_initialized());
        assert!(engine.products().is_empty());
        assert!(matches!(
            warnings.recv().await.unwrap(),
            CartError::PersistenceReadCorrupt(_)
        ));
    }

    #[tokio::test]
    async fn test_read_failure_degrades_to_empty_cart() {
        let store = FlakyStore::default();
        store.fail_reads.store(true, Ordering::SeqCst);
        let engine = CartEngine::new(store, CartConfig::default());
        let mut warnings = engine.warnings();

        assert!(matches!(
            engine.initialize().await,
            Hydration::Discarded { .. }
        ));
        assert!(engine.products().is_empty());
        assert!(matches!(
            warnings.recv().await.unwrap(),
            CartError::PersistenceReadFailed(_)
        ));
    }

    #[tokio::test]
    async fn test_initialize_runs_once() {
        let engine = ready_engine(MemoryStore::new()).await;
        engine.add_to_cart(product("a"));

        assert_eq!(engine.initialize().await, Hydration::AlreadyInitialized);
        assert_eq!(quantity(&engine, "a"), Some(1));
    }

    #[tokio::test]
    async fn test_negative_stored_quantity_is_kept_under_clamp() {
        let blob = r#"[{"id":"a","title":"A","image_url":"u","price":1,"quantity":-2}]"#;
        let engine = CartEngine::new(MemoryStore::with_entry(KEY, blob), CartConfig::default());
        engine.initialize().await;

        assert!(engine.decrement("a").is_unchanged());
        assert_eq!(quantity(&engine, "a"), Some(-2));

        engine.increment("a");
        assert_eq!(quantity(&engine, "a"), Some(-1));
    }

    #[tokio::test]
    async fn test_custom_storage_key() {
        let store = MemoryStore::new();
        let engine = CartEngine::new(
            store.clone(),
            CartConfig::default().with_storage_key("@Shop:cart"),
        );
        assert_eq!(engine.config().storage_key, "@Shop:cart");
        engine.initialize().await;

        engine.add_to_cart(product("a")).settled().await.unwrap();

        assert!(store.get("@Shop:cart").await.unwrap().is_some());
        assert!(store.get(KEY).await.unwrap().is_none());
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_add_same_product_twice() {
        let engine = ready_engine(MemoryStore::new()).await;

        engine.add_to_cart(product("p"));
        engine.add_to_cart(product("p"));

        assert_eq!(engine.products().len(), 1);
        assert_eq!(quantity(&engine, "p"), Some(2));
    }

    #[tokio::test]
    async fn test_cart_scenario_with_clamp_policy() {
        let store = MemoryStore::new();
        let engine = ready_engine(store.clone()).await;

        engine.add_to_cart(Product::new("x", "T", "u", 10.0));
        assert_eq!(
            engine.products().lines(),
            &[CartLine::from_product(Product::new("x", "T", "u", 10.0))]
        );

        engine.increment("x");
        assert_eq!(quantity(&engine, "x"), Some(2));

        engine.decrement("x");
        let last = engine.decrement("x");
        assert_eq!(quantity(&engine, "x"), Some(0));

        // Clamped: the line stays at zero and nothing more is written
        assert!(engine.decrement("x").is_unchanged());
        assert_eq!(quantity(&engine, "x"), Some(0));

        assert_eq!(last.settled().await, Ok(PersistOutcome::Written));
        assert_eq!(stored(&store).await.as_ref(), Some(&*engine.products()));
    }

    #[tokio::test]
    async fn test_cart_scenario_with_remove_policy() {
        let engine = CartEngine::new(
            MemoryStore::new(),
            CartConfig::default().with_decrement_policy(DecrementPolicy::RemoveAtZero),
        );
        engine.initialize().await;

        engine.add_to_cart(product("x"));
        engine.increment("x");
        engine.decrement("x");
        engine.decrement("x");

        assert!(!engine.products().contains("x"));
        assert!(engine.products().is_empty());
    }

    #[tokio::test]
    async fn test_increment_absent_id_changes_nothing() {
        let store = MemoryStore::new();
        let engine = ready_engine(store.clone()).await;
        engine.add_to_cart(product("a")).settled().await.unwrap();
        let before = engine.snapshot();

        let pending = engine.increment("missing");

        assert!(pending.is_unchanged());
        assert_eq!(pending.revision(), before.revision);
        assert!(Arc::ptr_eq(&before.state, &engine.products()));
        assert_eq!(pending.settled().await, Ok(PersistOutcome::Unchanged));
        assert!(engine.decrement("missing").is_unchanged());
    }

    #[tokio::test]
    async fn test_decrement_then_increment_restores_quantity() {
        let engine = ready_engine(MemoryStore::new()).await;
        engine.add_to_cart(product("a"));
        engine.add_to_cart(product("a"));

        engine.decrement("a");
        engine.increment("a");

        assert_eq!(quantity(&engine, "a"), Some(2));
    }

    #[tokio::test]
    async fn test_unaffected_lines_are_preserved() {
        let engine = ready_engine(MemoryStore::new()).await;
        engine.add_to_cart(product("a"));
        engine.add_to_cart(product("b"));
        let before = engine.products();

        engine.increment("b");

        let after = engine.products();
        assert_eq!(after.get("a"), before.get("a"));
        assert_eq!(after.lines()[0].id, "a");
        assert_eq!(after.lines()[1].id, "b");
    }

    #[tokio::test]
    async fn test_distinct_ids_bounded_by_added_ids() {
        let engine = ready_engine(MemoryStore::new()).await;
        let mut added = HashSet::new();

        for step in 0..60u32 {
            let id = format!("p{}", step % 7);
            match step % 3 {
                0 => {
                    engine.add_to_cart(product(&id));
                    added.insert(id);
                }
                1 => {
                    engine.increment(&id);
                }
                _ => {
                    engine.decrement(&format!("p{}", step % 11));
                }
            }

            let products = engine.products();
            let distinct: HashSet<&str> = products.iter().map(|l| l.id.as_str()).collect();
            assert_eq!(distinct.len(), products.len());
            assert!(distinct.len() <= added.len());
        }
    }

    #[tokio::test]
    async fn test_subscribers_observe_each_change() {
        let engine = ready_engine(MemoryStore::new()).await;
        let mut rx = engine.subscribe();
        let start = rx.borrow_and_update().revision;

        engine.add_to_cart(product("a"));
        rx.changed().await.unwrap();
        let seen = rx.borrow_and_update().clone();
        assert_eq!(seen.revision, start + 1);
        assert!(seen.initialized);
        assert!(seen.state.contains("a"));

        engine.increment("missing");
        assert!(!rx.has_changed().unwrap());
    }

    // -------------------------------------------------------------------------
    // Persistence
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_persisted_blob_matches_state_at_issue_time() {
        let store = MemoryStore::new();
        let engine = ready_engine(store.clone()).await;

        let first = engine.add_to_cart(product("a"));
        let at_first = engine.products();
        assert_eq!(first.settled().await, Ok(PersistOutcome::Written));
        assert_eq!(stored(&store).await.as_ref(), Some(&*at_first));

        engine.add_to_cart(product("b"));
        engine.increment("a");
        engine.flush().await.unwrap();

        assert_eq!(stored(&store).await.as_ref(), Some(&*engine.products()));
    }

    #[tokio::test]
    async fn test_write_failure_keeps_in_memory_state() {
        let store = FlakyStore::default();
        let engine = CartEngine::new(store.clone(), CartConfig::default());
        engine.initialize().await;
        let mut warnings = engine.warnings();

        store.fail_writes.store(true, Ordering::SeqCst);
        let pending = engine.add_to_cart(product("a"));
        let revision = pending.revision();

        assert_eq!(quantity(&engine, "a"), Some(1));
        assert!(matches!(
            pending.settled().await,
            Err(CartError::PersistenceWriteFailed { revision: r, .. }) if r == revision
        ));
        assert!(matches!(
            warnings.recv().await.unwrap(),
            CartError::PersistenceWriteFailed { .. }
        ));
        assert!(store.get(KEY).await.unwrap().is_none());

        // Durability recovers with the next write
        store.fail_writes.store(false, Ordering::SeqCst);
        engine.increment("a").settled().await.unwrap();
        assert_eq!(stored(&store).await.as_ref(), Some(&*engine.products()));
    }

    #[tokio::test]
    async fn test_mutations_before_initialize_never_clobber_store() {
        let original = CartState::new()
            .with_upserted_line(product("a"))
            .with_upserted_line(product("a"))
            .with_upserted_line(product("a"));
        let blob = encode_lines(&original).unwrap();
        let store = MemoryStore::with_entry(KEY, blob.clone());
        let engine = CartEngine::new(store.clone(), CartConfig::default());

        let early = engine.add_to_cart(product("b"));
        assert!(!engine.is_initialized());

        engine.initialize().await;

        assert_eq!(*engine.products(), original);
        assert_eq!(early.settled().await, Ok(PersistOutcome::Superseded));
        assert_eq!(store.get(KEY).await.unwrap(), Some(blob));
    }

    #[tokio::test]
    async fn test_flush_with_nothing_pending() {
        let engine = ready_engine(MemoryStore::new()).await;

        engine.flush().await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_mutations_are_not_lost() {
        let store = MemoryStore::new();
        let engine = Arc::new(ready_engine(store.clone()).await);

        let tasks: Vec<_> = (0..50)
            .map(|_| {
                let engine = Arc::clone(&engine);
                tokio::spawn(async move { engine.add_to_cart(product("hot")).settled().await })
            })
            .collect();

        for task in tasks {
            let outcome = task.await.unwrap().unwrap();
            assert_eq!(outcome, PersistOutcome::Written);
        }

        assert_eq!(engine.products().get("hot").map(|l| l.quantity), Some(50));
        engine.flush().await.unwrap();
        assert_eq!(stored(&store).await.as_ref(), Some(&*engine.products()));
    }

    #[tokio::test]
    async fn test_cart_survives_restart_on_sqlite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart.db");

        {
            let db = Database::new(DbConfig::new(&path)).await.unwrap();
            let engine = CartEngine::new(db.clone(), CartConfig::default());
            engine.initialize().await;

            engine.add_to_cart(product("a"));
            engine.add_to_cart(product("b"));
            engine.increment("a");
            engine.flush().await.unwrap();
            db.close().await;
        }

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        let engine = CartEngine::new(db.clone(), CartConfig::default());

        assert_eq!(engine.initialize().await, Hydration::Restored { lines: 2 });
        assert_eq!(quantity(&engine, "a"), Some(2));
        assert_eq!(quantity(&engine, "b"), Some(1));
        db.close().await;
    }
}

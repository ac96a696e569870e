//! # Cart Access Surface
//!
//! `CartHandle` is what collaborators (screens, commands, other services)
//! hold to read and change the cart. It does not keep the engine alive: once
//! the owning [`CartEngine`](crate::CartEngine) is dropped, or for a handle
//! that was never attached to one, every call fails with
//! [`CartError::UninitializedAccess`].

use std::sync::{Arc, Weak};

use tokio::sync::{broadcast, watch};
use tracing::error;

use cartkeep_core::{CartState, Product};

use crate::engine::{CartSnapshot, Shared};
use crate::error::{CartError, CartResult};
use crate::persistence::PendingWrite;

/// Cloneable access to a running cart engine.
#[derive(Clone, Default)]
pub struct CartHandle {
    shared: Weak<Shared>,
}

impl std::fmt::Debug for CartHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartHandle")
            .field("attached", &(self.shared.strong_count() > 0))
            .finish()
    }
}

impl CartHandle {
    pub(crate) fn new(shared: Weak<Shared>) -> Self {
        CartHandle { shared }
    }

    /// A handle with no engine behind it. Every operation fails.
    pub fn detached() -> Self {
        CartHandle::default()
    }

    /// Checks whether the owning engine is still alive.
    pub fn is_attached(&self) -> bool {
        self.shared.strong_count() > 0
    }

    fn engine(&self, operation: &'static str) -> CartResult<Arc<Shared>> {
        self.shared.upgrade().ok_or_else(|| {
            error!(operation, "Cart accessed without a live engine");
            CartError::UninitializedAccess
        })
    }

    pub fn products(&self) -> CartResult<Arc<CartState>> {
        Ok(self.engine("products")?.products())
    }

    pub fn snapshot(&self) -> CartResult<CartSnapshot> {
        Ok(self.engine("snapshot")?.snapshot())
    }

    pub fn is_initialized(&self) -> CartResult<bool> {
        Ok(self.engine("is_initialized")?.is_initialized())
    }

    pub fn subscribe(&self) -> CartResult<watch::Receiver<CartSnapshot>> {
        Ok(self.engine("subscribe")?.subscribe())
    }

    pub fn warnings(&self) -> CartResult<broadcast::Receiver<CartError>> {
        Ok(self.engine("warnings")?.warnings())
    }

    /// See [`CartEngine::add_to_cart`](crate::CartEngine::add_to_cart).
    pub fn add_to_cart(&self, product: Product) -> CartResult<PendingWrite> {
        Ok(self.engine("add_to_cart")?.add_to_cart(product))
    }

    /// See [`CartEngine::increment`](crate::CartEngine::increment).
    pub fn increment(&self, id: &str) -> CartResult<PendingWrite> {
        Ok(self.engine("increment")?.increment(id))
    }

    /// See [`CartEngine::decrement`](crate::CartEngine::decrement).
    pub fn decrement(&self, id: &str) -> CartResult<PendingWrite> {
        Ok(self.engine("decrement")?.decrement(id))
    }

    /// Waits until the engine has hydrated the cart.
    ///
    /// Fails if the engine is dropped before hydration completes.
    pub async fn ready(&self) -> CartResult<()> {
        // Only the receiver is held while waiting, so the engine can still drop
        let mut snapshots = self.engine("ready")?.subscribe();

        snapshots
            .wait_for(|snapshot| snapshot.initialized)
            .await
            .map(|_| ())
            .map_err(|_| {
                error!("Cart engine dropped before hydration completed");
                CartError::UninitializedAccess
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CartConfig, CartEngine};
    use cartkeep_db::MemoryStore;
    use std::time::Duration;

    fn product(id: &str) -> Product {
        Product::new(id, "Title", "https://img/1.png", 4.5)
    }

    #[tokio::test]
    async fn test_detached_handle_refuses_every_operation() {
        let handle = CartHandle::detached();

        assert!(!handle.is_attached());
        assert_eq!(handle.products().unwrap_err(), CartError::UninitializedAccess);
        assert_eq!(handle.is_initialized().unwrap_err(), CartError::UninitializedAccess);
        assert!(handle.snapshot().is_err());
        assert!(handle.subscribe().is_err());
        assert!(handle.add_to_cart(product("a")).is_err());
        assert!(handle.increment("a").is_err());
        assert!(handle.decrement("a").is_err());
        assert_eq!(handle.ready().await, Err(CartError::UninitializedAccess));
    }

    #[tokio::test]
    async fn test_handle_outliving_engine() {
        let engine = CartEngine::new(MemoryStore::new(), CartConfig::default());
        engine.initialize().await;
        let handle = engine.handle();
        assert!(handle.is_attached());

        drop(engine);

        assert!(!handle.is_attached());
        assert_eq!(
            handle.add_to_cart(product("a")).unwrap_err(),
            CartError::UninitializedAccess
        );
    }

    #[tokio::test]
    async fn test_handle_operates_on_engine_cart() {
        let engine = CartEngine::new(MemoryStore::new(), CartConfig::default());
        engine.initialize().await;
        let handle = engine.handle();
        let other = handle.clone();

        handle.add_to_cart(product("a")).unwrap();
        other.increment("a").unwrap();
        handle.add_to_cart(product("b")).unwrap();
        other.decrement("b").unwrap().settled().await.unwrap();

        assert_eq!(engine.products().get("a").map(|l| l.quantity), Some(2));
        assert_eq!(handle.products().unwrap().get("b").map(|l| l.quantity), Some(0));
        assert_eq!(handle.snapshot().unwrap().revision, engine.snapshot().revision);
    }

    #[tokio::test]
    async fn test_attached_handle_receives_warnings() {
        let store = MemoryStore::with_entry(cartkeep_core::DEFAULT_STORAGE_KEY, "{oops");
        let engine = CartEngine::new(
            store,
            CartConfig::default().with_warning_capacity(0),
        );
        assert_eq!(engine.config().warning_capacity, 0);
        let handle = engine.handle();
        let mut warnings = handle.warnings().unwrap();

        engine.initialize().await;

        assert!(matches!(
            warnings.recv().await.unwrap(),
            CartError::PersistenceReadCorrupt(_)
        ));
    }

    #[tokio::test]
    async fn test_ready_waits_for_hydration() {
        let engine = CartEngine::new(MemoryStore::new(), CartConfig::default());
        let handle = engine.handle();
        assert!(!handle.is_initialized().unwrap());

        let waiter = tokio::spawn(async move { handle.ready().await });
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!waiter.is_finished());

        engine.initialize().await;

        assert_eq!(waiter.await.unwrap(), Ok(()));
    }

    #[tokio::test]
    async fn test_ready_fails_when_engine_dropped_first() {
        let engine = CartEngine::new(MemoryStore::new(), CartConfig::default());
        let handle = engine.handle();

        let waiter = tokio::spawn(async move { handle.ready().await });
        tokio::time::sleep(Duration::from_millis(10)).await;
        drop(engine);

        assert_eq!(waiter.await.unwrap(), Err(CartError::UninitializedAccess));
    }
}

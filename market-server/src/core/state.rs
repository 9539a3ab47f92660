use std::path::PathBuf;

use crate::cart::CartService;
use crate::catalog::CatalogReader;
use crate::core::Config;
use crate::db::MarketStore;
use crate::orders::OrderService;

/// Server state holding the store and the services built on it
///
/// All members clone cheaply (the store is an `Arc` around the database),
/// so handlers receive the state by value.
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub store: MarketStore,
    pub catalog: CatalogReader,
    pub carts: CartService,
    pub orders: OrderService,
}

impl ServerState {
    /// Open the database under the configured work dir and wire up the
    /// services. Failures here are unrecoverable at startup.
    pub fn initialize(config: &Config) -> Self {
        let db_dir = PathBuf::from(&config.work_dir).join("database");
        std::fs::create_dir_all(&db_dir)
            .unwrap_or_else(|e| panic!("Failed to create {}: {}", db_dir.display(), e));
        let store = MarketStore::open(db_dir.join("market.redb"))
            .unwrap_or_else(|e| panic!("Failed to open database: {}", e));

        Self::with_store(config.clone(), store)
    }

    fn with_store(config: Config, store: MarketStore) -> Self {
        let catalog = CatalogReader::new(store.clone());
        let carts = CartService::new(store.clone());
        let orders = OrderService::new(
            store.clone(),
            config.txn_retry_limit,
            config.checkout_deadline(),
        );
        Self {
            config,
            store,
            catalog,
            carts,
            orders,
        }
    }

    /// State over an in-memory database (for testing)
    #[cfg(test)]
    pub fn in_memory() -> Self {
        let store = MarketStore::open_in_memory().unwrap();
        Self::with_store(Config::with_overrides("/tmp/market-test", 0), store)
    }
}

//! redb-based storage layer for the marketplace
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `meals` | `meal_id` | `Meal` | Catalog entries with embedded variants |
//! | `providers` | `provider_id` | `ProviderProfile` | Provider profiles |
//! | `addresses` | `address_id` | `Address` | Customer delivery addresses |
//! | `carts` | `user_id` | `Cart` | One cart per customer |
//! | `cart_items` | `(cart_id, item_id)` | `CartItem` | Cart lines |
//! | `orders` | `order_id` | `Order` | Orders with embedded items |
//!
//! # Isolation
//!
//! redb serializes write transactions, so a checkout's check-then-decrement
//! runs under single-writer isolation: two simultaneous checkouts cannot
//! both pass a stock check only one of them can satisfy.

use redb::{
    Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction,
};
use shared::models::{Address, Cart, CartItem, Meal, Order, ProviderProfile};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Catalog entries: key = meal_id, value = JSON-serialized Meal
const MEALS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("meals");

/// Provider profiles: key = provider_id, value = JSON-serialized ProviderProfile
const PROVIDERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("providers");

/// Delivery addresses: key = address_id, value = JSON-serialized Address
const ADDRESSES_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("addresses");

/// Carts: key = user_id, value = JSON-serialized Cart (one cart per customer)
const CARTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("carts");

/// Cart lines: key = (cart_id, item_id), value = JSON-serialized CartItem
const CART_ITEMS_TABLE: TableDefinition<(&str, &str), &[u8]> =
    TableDefinition::new("cart_items");

/// Orders: key = order_id, value = JSON-serialized Order
const ORDERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("orders");

/// Storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Marketplace storage backed by redb
///
/// Commits are durable as soon as `commit()` returns; the database file is
/// always left in a consistent state (copy-on-write with atomic pointer
/// swap), so a failed transaction never leaves partial writes behind.
#[derive(Clone)]
pub struct MarketStore {
    db: Arc<Database>,
}

impl MarketStore {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let db = Database::create(path)?;
        let store = Self { db: Arc::new(db) };
        store.init_tables()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StoreResult<Self> {
        let db =
            Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        let store = Self { db: Arc::new(db) };
        store.init_tables()?;
        Ok(store)
    }

    /// Create all tables so later read transactions never hit a missing table
    fn init_tables(&self) -> StoreResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let _ = write_txn.open_table(MEALS_TABLE)?;
            let _ = write_txn.open_table(PROVIDERS_TABLE)?;
            let _ = write_txn.open_table(ADDRESSES_TABLE)?;
            let _ = write_txn.open_table(CARTS_TABLE)?;
            let _ = write_txn.open_table(CART_ITEMS_TABLE)?;
            let _ = write_txn.open_table(ORDERS_TABLE)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Begin a write transaction
    pub fn begin_write(&self) -> StoreResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== Meals ==========

    /// Insert or replace a meal (within transaction)
    pub fn put_meal(&self, txn: &WriteTransaction, meal: &Meal) -> StoreResult<()> {
        let mut table = txn.open_table(MEALS_TABLE)?;
        let bytes = serde_json::to_vec(meal)?;
        table.insert(meal.id.as_str(), bytes.as_slice())?;
        Ok(())
    }

    /// Get a meal by id (read-only)
    pub fn get_meal(&self, meal_id: &str) -> StoreResult<Option<Meal>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(MEALS_TABLE)?;
        match table.get(meal_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Get a meal by id (within write transaction)
    pub fn get_meal_txn(
        &self,
        txn: &WriteTransaction,
        meal_id: &str,
    ) -> StoreResult<Option<Meal>> {
        let table = txn.open_table(MEALS_TABLE)?;
        match table.get(meal_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    // ========== Providers ==========

    /// Insert or replace a provider profile (within transaction)
    pub fn put_provider(
        &self,
        txn: &WriteTransaction,
        provider: &ProviderProfile,
    ) -> StoreResult<()> {
        let mut table = txn.open_table(PROVIDERS_TABLE)?;
        let bytes = serde_json::to_vec(provider)?;
        table.insert(provider.id.as_str(), bytes.as_slice())?;
        Ok(())
    }

    /// Get a provider by id (read-only)
    pub fn get_provider(&self, provider_id: &str) -> StoreResult<Option<ProviderProfile>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PROVIDERS_TABLE)?;
        match table.get(provider_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Get a provider by id (within write transaction)
    pub fn get_provider_txn(
        &self,
        txn: &WriteTransaction,
        provider_id: &str,
    ) -> StoreResult<Option<ProviderProfile>> {
        let table = txn.open_table(PROVIDERS_TABLE)?;
        match table.get(provider_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Find the provider profile backed by a user account
    pub fn get_provider_by_user(&self, user_id: &str) -> StoreResult<Option<ProviderProfile>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PROVIDERS_TABLE)?;
        for entry in table.iter()? {
            let (_, value) = entry?;
            let provider: ProviderProfile = serde_json::from_slice(value.value())?;
            if provider.user_id == user_id {
                return Ok(Some(provider));
            }
        }
        Ok(None)
    }

    // ========== Addresses ==========

    /// Insert or replace an address (within transaction)
    pub fn put_address(&self, txn: &WriteTransaction, address: &Address) -> StoreResult<()> {
        let mut table = txn.open_table(ADDRESSES_TABLE)?;
        let bytes = serde_json::to_vec(address)?;
        table.insert(address.id.as_str(), bytes.as_slice())?;
        Ok(())
    }

    /// Get an address by id (within write transaction)
    pub fn get_address_txn(
        &self,
        txn: &WriteTransaction,
        address_id: &str,
    ) -> StoreResult<Option<Address>> {
        let table = txn.open_table(ADDRESSES_TABLE)?;
        match table.get(address_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    // ========== Carts ==========

    /// Get a customer's cart (read-only)
    pub fn get_cart_by_user(&self, user_id: &str) -> StoreResult<Option<Cart>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CARTS_TABLE)?;
        match table.get(user_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Get a customer's cart (within write transaction)
    pub fn get_cart_by_user_txn(
        &self,
        txn: &WriteTransaction,
        user_id: &str,
    ) -> StoreResult<Option<Cart>> {
        let table = txn.open_table(CARTS_TABLE)?;
        match table.get(user_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Insert or replace a cart (within transaction)
    pub fn put_cart(&self, txn: &WriteTransaction, cart: &Cart) -> StoreResult<()> {
        let mut table = txn.open_table(CARTS_TABLE)?;
        let bytes = serde_json::to_vec(cart)?;
        table.insert(cart.user_id.as_str(), bytes.as_slice())?;
        Ok(())
    }

    // ========== Cart items ==========

    /// Insert or replace a cart line (within transaction)
    pub fn put_cart_item(&self, txn: &WriteTransaction, item: &CartItem) -> StoreResult<()> {
        let mut table = txn.open_table(CART_ITEMS_TABLE)?;
        let bytes = serde_json::to_vec(item)?;
        table.insert((item.cart_id.as_str(), item.id.as_str()), bytes.as_slice())?;
        Ok(())
    }

    /// List all lines of a cart (read-only)
    pub fn get_cart_items(&self, cart_id: &str) -> StoreResult<Vec<CartItem>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CART_ITEMS_TABLE)?;
        let mut items = Vec::new();
        for entry in table.iter()? {
            let (key, value) = entry?;
            if key.value().0 == cart_id {
                items.push(serde_json::from_slice(value.value())?);
            }
        }
        Ok(items)
    }

    /// List all lines of a cart (within write transaction)
    pub fn get_cart_items_txn(
        &self,
        txn: &WriteTransaction,
        cart_id: &str,
    ) -> StoreResult<Vec<CartItem>> {
        let table = txn.open_table(CART_ITEMS_TABLE)?;
        let mut items = Vec::new();
        for entry in table.iter()? {
            let (key, value) = entry?;
            if key.value().0 == cart_id {
                items.push(serde_json::from_slice(value.value())?);
            }
        }
        Ok(items)
    }

    /// Get a single cart line (within write transaction)
    pub fn get_cart_item_txn(
        &self,
        txn: &WriteTransaction,
        cart_id: &str,
        item_id: &str,
    ) -> StoreResult<Option<CartItem>> {
        let table = txn.open_table(CART_ITEMS_TABLE)?;
        match table.get((cart_id, item_id))? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Remove a single cart line; returns whether it existed
    pub fn remove_cart_item(
        &self,
        txn: &WriteTransaction,
        cart_id: &str,
        item_id: &str,
    ) -> StoreResult<bool> {
        let mut table = txn.open_table(CART_ITEMS_TABLE)?;
        Ok(table.remove((cart_id, item_id))?.is_some())
    }

    /// Remove all lines of a cart; returns the number removed
    pub fn clear_cart_items(&self, txn: &WriteTransaction, cart_id: &str) -> StoreResult<usize> {
        let mut table = txn.open_table(CART_ITEMS_TABLE)?;
        let mut item_ids = Vec::new();
        for entry in table.iter()? {
            let (key, _) = entry?;
            let (owner, item_id) = key.value();
            if owner == cart_id {
                item_ids.push(item_id.to_string());
            }
        }
        for item_id in &item_ids {
            table.remove((cart_id, item_id.as_str()))?;
        }
        Ok(item_ids.len())
    }

    // ========== Orders ==========

    /// Insert or replace an order (within transaction)
    pub fn put_order(&self, txn: &WriteTransaction, order: &Order) -> StoreResult<()> {
        let mut table = txn.open_table(ORDERS_TABLE)?;
        let bytes = serde_json::to_vec(order)?;
        table.insert(order.id.as_str(), bytes.as_slice())?;
        Ok(())
    }

    /// Get an order by id (read-only)
    pub fn get_order(&self, order_id: &str) -> StoreResult<Option<Order>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        match table.get(order_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Get an order by id (within write transaction)
    pub fn get_order_txn(
        &self,
        txn: &WriteTransaction,
        order_id: &str,
    ) -> StoreResult<Option<Order>> {
        let table = txn.open_table(ORDERS_TABLE)?;
        match table.get(order_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// List a customer's orders, newest first
    pub fn orders_for_user(&self, user_id: &str) -> StoreResult<Vec<Order>> {
        self.orders_where(|order| order.user_id == user_id)
    }

    /// List a provider's incoming orders, newest first
    pub fn orders_for_provider(&self, provider_id: &str) -> StoreResult<Vec<Order>> {
        self.orders_where(|order| order.provider_id == provider_id)
    }

    fn orders_where(&self, predicate: impl Fn(&Order) -> bool) -> StoreResult<Vec<Order>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        let mut orders = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            let order: Order = serde_json::from_slice(value.value())?;
            if predicate(&order) {
                orders.push(order);
            }
        }
        orders.sort_by(|a, b| b.placed_at.cmp(&a.placed_at));
        Ok(orders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{OrderStatus, PaymentMethod};
    use shared::util::{new_id, now_millis};

    fn meal(id: &str, stock: Option<i64>) -> Meal {
        Meal {
            id: id.to_string(),
            provider_id: "prov-1".into(),
            title: "Meal".into(),
            description: None,
            price: "9.50".parse().unwrap(),
            currency: "EUR".into(),
            stock,
            is_active: true,
            deleted_at: None,
            variants: Vec::new(),
            created_at: now_millis(),
            updated_at: now_millis(),
        }
    }

    fn order(id: &str, user_id: &str, provider_id: &str, placed_at: i64) -> Order {
        Order {
            id: id.to_string(),
            order_number: 1,
            user_id: user_id.to_string(),
            provider_id: provider_id.to_string(),
            delivery_address_id: "addr-1".into(),
            status: OrderStatus::Placed,
            total_amount: "9.50".parse().unwrap(),
            currency: "EUR".into(),
            payment_method: PaymentMethod::CashOnDelivery,
            notes: None,
            items: Vec::new(),
            placed_at,
            prepared_at: None,
            ready_at: None,
            delivered_at: None,
            cancelled_at: None,
        }
    }

    #[test]
    fn test_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("market.redb");

        {
            let store = MarketStore::open(&path).unwrap();
            let txn = store.begin_write().unwrap();
            store.put_meal(&txn, &meal("m1", Some(7))).unwrap();
            txn.commit().unwrap();
        }

        let store = MarketStore::open(&path).unwrap();
        assert_eq!(store.get_meal("m1").unwrap().unwrap().stock, Some(7));
    }

    #[test]
    fn test_meal_roundtrip() {
        let store = MarketStore::open_in_memory().unwrap();
        let txn = store.begin_write().unwrap();
        store.put_meal(&txn, &meal("m1", Some(3))).unwrap();
        txn.commit().unwrap();

        let loaded = store.get_meal("m1").unwrap().unwrap();
        assert_eq!(loaded.stock, Some(3));
        assert!(store.get_meal("missing").unwrap().is_none());
    }

    #[test]
    fn test_uncommitted_writes_are_invisible() {
        let store = MarketStore::open_in_memory().unwrap();
        let txn = store.begin_write().unwrap();
        store.put_meal(&txn, &meal("m1", None)).unwrap();
        // Dropped without commit: nothing must be observable
        drop(txn);

        assert!(store.get_meal("m1").unwrap().is_none());
    }

    #[test]
    fn test_cart_items_scoped_by_cart() {
        let store = MarketStore::open_in_memory().unwrap();
        let txn = store.begin_write().unwrap();
        for (cart_id, item_id) in [("c1", "i1"), ("c1", "i2"), ("c2", "i3")] {
            let item = CartItem {
                id: item_id.to_string(),
                cart_id: cart_id.to_string(),
                meal_id: "m1".into(),
                option_ids: Vec::new(),
                quantity: 1,
                created_at: now_millis(),
                updated_at: now_millis(),
            };
            store.put_cart_item(&txn, &item).unwrap();
        }
        txn.commit().unwrap();

        assert_eq!(store.get_cart_items("c1").unwrap().len(), 2);
        assert_eq!(store.get_cart_items("c2").unwrap().len(), 1);

        let txn = store.begin_write().unwrap();
        let removed = store.clear_cart_items(&txn, "c1").unwrap();
        txn.commit().unwrap();
        assert_eq!(removed, 2);
        assert!(store.get_cart_items("c1").unwrap().is_empty());
        assert_eq!(store.get_cart_items("c2").unwrap().len(), 1);
    }

    #[test]
    fn test_orders_listed_newest_first() {
        let store = MarketStore::open_in_memory().unwrap();
        let txn = store.begin_write().unwrap();
        store.put_order(&txn, &order("o1", "u1", "p1", 100)).unwrap();
        store.put_order(&txn, &order("o2", "u1", "p1", 300)).unwrap();
        store.put_order(&txn, &order("o3", "u2", "p1", 200)).unwrap();
        txn.commit().unwrap();

        let mine = store.orders_for_user("u1").unwrap();
        assert_eq!(
            mine.iter().map(|o| o.id.as_str()).collect::<Vec<_>>(),
            vec!["o2", "o1"]
        );
        let incoming = store.orders_for_provider("p1").unwrap();
        assert_eq!(incoming.len(), 3);
        assert_eq!(incoming[0].id, "o2");
        assert_eq!(incoming[0].placed_at, 300);
    }

    #[test]
    fn test_provider_lookup_by_user() {
        let store = MarketStore::open_in_memory().unwrap();
        let txn = store.begin_write().unwrap();
        store
            .put_provider(
                &txn,
                &ProviderProfile {
                    id: new_id(),
                    user_id: "user-7".into(),
                    name: "Trattoria".into(),
                    is_verified: true,
                    created_at: now_millis(),
                },
            )
            .unwrap();
        txn.commit().unwrap();

        let found = store.get_provider_by_user("user-7").unwrap().unwrap();
        assert_eq!(found.name, "Trattoria");
        assert!(store.get_provider_by_user("nobody").unwrap().is_none());
    }
}

//! Repositories persisting the cart and the address through a
//! [`KeyValueStore`].
//!
//! Loading never fails: unreadable or malformed records are logged and
//! treated as absent, so a corrupted store cannot prevent startup.

use grubline_core::{Address, Cart, CartState};
use serde::de::DeserializeOwned;

use super::{KeyValueStore, StorageError, keys};

/// Persistence for the cart state machine.
pub trait CartRepository {
    /// Load the stored cart, `Empty` when absent or malformed.
    fn load(&self) -> CartState;

    /// Persist `state`; `Empty` removes the record.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store rejects the write.
    fn save(&self, state: &CartState) -> Result<(), StorageError>;
}

/// Persistence for the address holder.
pub trait AddressRepository {
    /// Load the stored address, `None` when absent or malformed.
    fn load(&self) -> Option<Address>;

    /// Persist `address`; `None` removes the record.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store rejects the write.
    fn save(&self, address: Option<&Address>) -> Result<(), StorageError>;
}

/// Read and decode `key`, logging and discarding anything unusable.
fn load_json<T: DeserializeOwned>(store: &impl KeyValueStore, key: &str) -> Option<T> {
    let raw = match store.get(key) {
        Ok(raw) => raw?,
        Err(e) => {
            tracing::warn!(key, error = %e, "Failed to read stored record, treating as absent");
            return None;
        }
    };

    match serde_json::from_str::<Option<T>>(&raw) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(key, error = %e, "Malformed stored record, treating as absent");
            None
        }
    }
}

fn save_json<T: serde::Serialize>(
    store: &impl KeyValueStore,
    key: &str,
    value: Option<&T>,
) -> Result<(), StorageError> {
    match value {
        Some(value) => store.set(key, &serde_json::to_string(value)?),
        None => store.remove(key),
    }
}

/// Cart repository over a key-value store, under [`keys::CART`].
#[derive(Debug, Clone)]
pub struct KvCartRepository<S> {
    store: S,
}

impl<S: KeyValueStore> KvCartRepository<S> {
    /// Create a repository over `store`.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S: KeyValueStore> CartRepository for KvCartRepository<S> {
    fn load(&self) -> CartState {
        let Some(cart) = load_json::<Cart>(&self.store, keys::CART) else {
            return CartState::Empty;
        };
        if !cart.is_well_formed() {
            tracing::warn!(
                restaurant_id = %cart.restaurant_id,
                "Stored cart violates cart invariants, treating as absent"
            );
            return CartState::Empty;
        }
        CartState::Active(cart)
    }

    fn save(&self, state: &CartState) -> Result<(), StorageError> {
        save_json(&self.store, keys::CART, state.cart())
    }
}

/// Address repository over a key-value store, under [`keys::USER_ADDRESS`].
#[derive(Debug, Clone)]
pub struct KvAddressRepository<S> {
    store: S,
}

impl<S: KeyValueStore> KvAddressRepository<S> {
    /// Create a repository over `store`.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S: KeyValueStore> AddressRepository for KvAddressRepository<S> {
    fn load(&self) -> Option<Address> {
        load_json(&self.store, keys::USER_ADDRESS)
    }

    fn save(&self, address: Option<&Address>) -> Result<(), StorageError> {
        save_json(&self.store, keys::USER_ADDRESS, address)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use grubline_core::{AddressDraft, CartItem, MenuItemId, RestaurantId};
    use rust_decimal::Decimal;

    use super::*;
    use crate::storage::MemoryStore;

    fn cart() -> Cart {
        Cart::new(
            RestaurantId::new(3),
            "Dosirak House".to_string(),
            CartItem {
                id: MenuItemId::new(10),
                name: "Bulgogi box".to_string(),
                unit_price: Decimal::from(9500),
                quantity: 2,
                options: Vec::new(),
                image: None,
            },
        )
    }

    #[test]
    fn test_cart_round_trip_through_store() {
        let store = MemoryStore::new();
        let repo = KvCartRepository::new(store.clone());

        repo.save(&CartState::Active(cart())).unwrap();
        assert!(store.raw(keys::CART).is_some());
        assert_eq!(repo.load(), CartState::Active(cart()));

        repo.save(&CartState::Empty).unwrap();
        assert_eq!(store.raw(keys::CART), None);
        assert_eq!(repo.load(), CartState::Empty);
    }

    #[test]
    fn test_malformed_cart_loads_as_empty() {
        let store = MemoryStore::new();
        store.set(keys::CART, "{not json").unwrap();
        assert_eq!(KvCartRepository::new(store).load(), CartState::Empty);
    }

    #[test]
    fn test_null_cart_loads_as_empty() {
        let store = MemoryStore::new();
        store.set(keys::CART, "null").unwrap();
        assert_eq!(KvCartRepository::new(store).load(), CartState::Empty);
    }

    #[test]
    fn test_cart_with_zero_quantity_loads_as_empty() {
        let store = MemoryStore::new();
        store
            .set(
                keys::CART,
                r#"{"restaurantId":1,"restaurantName":"A","items":[
                    {"id":1,"name":"a","unitPrice":"1000","quantity":0}]}"#,
            )
            .unwrap();
        assert_eq!(KvCartRepository::new(store).load(), CartState::Empty);
    }

    #[test]
    fn test_address_round_trip() {
        let store = MemoryStore::new();
        let repo = KvAddressRepository::new(store.clone());
        let address = AddressDraft::new("1 Jongno", "").validate().unwrap();

        repo.save(Some(&address)).unwrap();
        assert_eq!(repo.load(), Some(address));

        repo.save(None).unwrap();
        assert_eq!(store.raw(keys::USER_ADDRESS), None);
        assert_eq!(repo.load(), None);
    }

    #[test]
    fn test_malformed_address_loads_as_none() {
        let store = MemoryStore::new();
        store.set(keys::USER_ADDRESS, "[1,2,3]").unwrap();
        assert_eq!(KvAddressRepository::new(store).load(), None);
    }
}

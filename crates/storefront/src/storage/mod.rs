//! Durable local storage for the cart and the delivery address.
//!
//! # Keys
//!
//! - `cart` - serialized [`Cart`](grubline_core::Cart), absent when empty
//! - `userAddress` - serialized [`Address`](grubline_core::Address), absent when cleared
//!
//! The store itself is a plain string key-value interface; the repositories
//! in [`repository`] own serialization and decide what counts as malformed.

mod file;
mod memory;
pub mod repository;

pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use repository::{AddressRepository, CartRepository, KvAddressRepository, KvCartRepository};

use thiserror::Error;

/// Storage keys.
pub mod keys {
    /// Key for the active cart.
    pub const CART: &str = "cart";

    /// Key for the delivery address.
    pub const USER_ADDRESS: &str = "userAddress";
}

/// Errors from the durable store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("I/O error on key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// Key contains characters that cannot be stored.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    /// Value could not be serialized.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Synchronous string key-value store.
pub trait KeyValueStore: Send + Sync {
    /// Read a value. Missing keys are `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be persisted.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value. Deleting a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing medium cannot be modified.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

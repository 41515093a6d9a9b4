//! Core types for Grubline.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod address;
pub mod cart;
pub mod email;
pub mod id;
pub mod language;
pub mod price;

pub use address::{Address, AddressDraft, AddressError};
pub use cart::{Cart, CartItem, CartOption, CartOptionItem, CartState, PendingReplacement};
pub use email::{Email, EmailError};
pub use id::*;
pub use language::{Language, LocalizedText, UnsupportedLanguage};
pub use price::{CurrencyCode, Price};

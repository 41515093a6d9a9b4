//! Grubline Core - Shared domain types.
//!
//! This crate provides the types shared by every Grubline component:
//! - `storefront` - Cart, address, cache and catalog services
//! - `cli` - Command-line front end over the storefront library
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no storage access,
//! no HTTP clients. Pricing arithmetic and validation live here because they
//! are pure functions of the data.
//!
//! # Modules
//!
//! - [`types`] - IDs, money, languages, cart and address models
//! - [`clock`] - Injectable time source for expiry and timed signals

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod clock;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use types::*;

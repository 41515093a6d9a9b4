//! Grubline storefront library.
//!
//! Stateful services of the food-ordering storefront: the single-restaurant
//! cart, the delivery address, checkout, and catalog reads through a
//! language-aware response cache. Front ends (the `grubline` CLI, tests)
//! drive it through [`state::AppState`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod i18n;
pub mod services;
pub mod state;
pub mod storage;

//! Command implementations.
//!
//! Commands print to stdout and return `AppError` for anything the user
//! should see as a failure.

#![allow(clippy::print_stdout, clippy::print_stderr)]

pub mod address;
pub mod browse;
pub mod cart;
pub mod checkout;

use grubline_core::Price;
use grubline_storefront::error::AppError;
use grubline_storefront::state::AppState;
use rust_decimal::Decimal;

/// Print the user-facing message for `error`.
pub fn print_error(state: &AppState, error: &AppError) {
    eprintln!(
        "error: {}",
        error.user_message(state.localizer(), state.language())
    );
}

/// Format an amount in won.
fn won(amount: Decimal) -> String {
    Price::krw(amount).to_string()
}

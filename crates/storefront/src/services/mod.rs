//! Stateful storefront services.
//!
//! # Services
//!
//! - `cart` - Single-restaurant cart state machine with the replace-cart
//!   confirmation flow and minimum-order gating
//! - `address` - Delivery address holder
//! - `checkout` - Payment request assembly and order submission
//!
//! Each service owns its state, is mutated through `&mut self`, and writes
//! through to its repository after every accepted change.

pub mod address;
pub mod cart;
pub mod checkout;
mod transient;

pub use address::AddressService;
pub use cart::{AddOutcome, CartNotice, CartService};
pub use checkout::{
    CheckoutError, PaymentLineItem, PaymentOutcome, PaymentRequest, build_payment_request,
    complete_order,
};
pub use transient::Transient;

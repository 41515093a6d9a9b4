//! Checkout: payment request assembly and order submission.
//!
//! The payment widget charges in US dollars with two decimal places. Menu
//! prices are in won, so each line's unit price is converted with the
//! configured rate and rounded to the cent; the charged total is the sum of
//! the rounded lines, which keeps the breakdown and the total consistent.

use grubline_core::{
    Address, AddressId, CurrencyCode, Email, Language, MenuItemId, OptionId, OptionItemId, Price,
    RestaurantId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, instrument, warn};

use super::address::AddressService;
use super::cart::CartService;
use crate::api::{ApiError, Transport};
use crate::catalog::{CatalogService, OrderConfirmation};
use crate::error::add_breadcrumb;
use crate::storage::{AddressRepository, CartRepository};

/// Reasons checkout cannot proceed.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Nothing to order.
    #[error("Cart is empty")]
    EmptyCart,

    /// No validated delivery address.
    #[error("Delivery address is not set")]
    AddressRequired,

    /// The cart total is below the restaurant's minimum.
    #[error("Minimum order amount not reached ({missing} short)")]
    BelowMinOrder { missing: Decimal },

    /// The configured exchange rate cannot convert prices.
    #[error("Invalid exchange rate: {0}")]
    InvalidRate(Decimal),

    /// The cart no longer matches the payment that was captured.
    #[error("Cart changed after payment was started")]
    CartChanged,

    /// The payment widget reported a failure.
    #[error("Payment failed: {0}")]
    PaymentFailed(String),

    /// Submitting the order failed.
    #[error("Order submission failed: {0}")]
    Api(#[from] ApiError),
}

/// One line of the payment breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentLineItem {
    pub menu_item_id: MenuItemId,
    pub name: String,
    pub quantity: u32,
    /// Unit price including options, in the payment currency.
    pub unit_amount: Decimal,
    /// `unit_amount * quantity`.
    pub amount: Decimal,
}

/// What the payment widget is asked to charge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub restaurant_id: RestaurantId,
    pub restaurant_name: String,
    pub currency: CurrencyCode,
    /// Sum of the line amounts, two decimal places.
    pub total: Decimal,
    pub items: Vec<PaymentLineItem>,
    /// Cart total in won, for the order record.
    pub source_total: Price,
}

impl PaymentRequest {
    /// The charged total as a displayable price.
    #[must_use]
    pub const fn total_price(&self) -> Price {
        Price::new(self.total, self.currency)
    }
}

/// Result reported by the payment widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum PaymentOutcome {
    /// Funds captured. `payload` is passed to the API untouched.
    Captured {
        reference: String,
        #[serde(default)]
        payload: Value,
    },
    /// Payment declined or aborted.
    Failed { message: String },
}

/// Body of `POST /orders`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub restaurant_id: RestaurantId,
    pub address_id: Option<AddressId>,
    pub main_address: String,
    pub detail_address: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub items: Vec<OrderLine>,
    pub total_price: Decimal,
    pub payment: OrderPayment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<Email>,
    pub lang: Language,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub menu_item_id: MenuItemId,
    pub quantity: u32,
    pub options: Vec<OrderLineOption>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineOption {
    pub option_id: OptionId,
    pub option_item_ids: Vec<OptionItemId>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayment {
    pub reference: String,
    pub currency: CurrencyCode,
    pub amount: Decimal,
    pub payload: Value,
}

/// Assemble the payment request for the current cart.
///
/// # Errors
///
/// Fails when the cart is empty, no validated address is set, the recorded
/// minimum order is not reached, or `krw_per_usd` is not positive.
pub fn build_payment_request<R: CartRepository, A: AddressRepository>(
    cart: &CartService<R>,
    address: &AddressService<A>,
    krw_per_usd: Decimal,
) -> Result<PaymentRequest, CheckoutError> {
    let Some(active) = cart.cart() else {
        return Err(CheckoutError::EmptyCart);
    };
    if !address.is_address_set() {
        return Err(CheckoutError::AddressRequired);
    }
    if !cart.delivery_available() {
        return Err(CheckoutError::BelowMinOrder {
            missing: cart.amount_to_recorded_min_order(),
        });
    }

    let items = active
        .items()
        .iter()
        .map(|item| {
            let unit = Price::krw(item.unit_total())
                .convert(CurrencyCode::USD, krw_per_usd)
                .ok_or(CheckoutError::InvalidRate(krw_per_usd))?;
            let amount = unit
                .amount
                .checked_mul(Decimal::from(item.quantity))
                .ok_or(CheckoutError::InvalidRate(krw_per_usd))?;
            Ok(PaymentLineItem {
                menu_item_id: item.id,
                name: item.name.clone(),
                quantity: item.quantity,
                unit_amount: unit.amount,
                amount,
            })
        })
        .collect::<Result<Vec<_>, CheckoutError>>()?;
    let total = items
        .iter()
        .try_fold(Decimal::ZERO, |total, line| total.checked_add(line.amount))
        .ok_or(CheckoutError::InvalidRate(krw_per_usd))?;

    Ok(PaymentRequest {
        restaurant_id: active.restaurant_id,
        restaurant_name: active.restaurant_name.clone(),
        currency: CurrencyCode::USD,
        total,
        items,
        source_total: Price::krw(active.total_price()),
    })
}

fn order_lines<R: CartRepository>(cart: &CartService<R>) -> Vec<OrderLine> {
    cart.cart()
        .map(|active| {
            active
                .items()
                .iter()
                .map(|item| OrderLine {
                    menu_item_id: item.id,
                    quantity: item.quantity,
                    options: item
                        .options
                        .iter()
                        .map(|option| OrderLineOption {
                            option_id: option.id,
                            option_item_ids: option.option_items.iter().map(|i| i.id).collect(),
                        })
                        .collect(),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Submit the order for a captured payment and clear the cart.
///
/// The cart is left untouched on any failure.
///
/// # Errors
///
/// Returns [`CheckoutError::PaymentFailed`] for a failed outcome,
/// [`CheckoutError::CartChanged`] when the cart no longer matches `payment`,
/// and [`CheckoutError::Api`] when the order is rejected.
#[instrument(skip_all, fields(restaurant_id = %payment.restaurant_id, total = %payment.total))]
pub async fn complete_order<T, R, A>(
    catalog: &CatalogService<T>,
    cart: &mut CartService<R>,
    address: &AddressService<A>,
    payment: &PaymentRequest,
    outcome: PaymentOutcome,
    contact_email: Option<Email>,
) -> Result<OrderConfirmation, CheckoutError>
where
    T: Transport,
    R: CartRepository,
    A: AddressRepository,
{
    let (reference, payload) = match outcome {
        PaymentOutcome::Captured { reference, payload } => (reference, payload),
        PaymentOutcome::Failed { message } => {
            warn!(message, "Payment failed");
            add_breadcrumb("checkout", "Payment failed", None);
            return Err(CheckoutError::PaymentFailed(message));
        }
    };

    let active = cart.cart().ok_or(CheckoutError::EmptyCart)?;
    if active.restaurant_id != payment.restaurant_id
        || active.total_price() != payment.source_total.amount
    {
        return Err(CheckoutError::CartChanged);
    }
    let delivery: &Address = address
        .address()
        .filter(|a| a.is_complete)
        .ok_or(CheckoutError::AddressRequired)?;

    let order = OrderRequest {
        restaurant_id: active.restaurant_id,
        address_id: delivery.address_id,
        main_address: delivery.main_address.clone(),
        detail_address: delivery.detail_address.clone(),
        lat: delivery.lat,
        lng: delivery.lng,
        items: order_lines(cart),
        total_price: active.total_price(),
        payment: OrderPayment {
            reference,
            currency: payment.currency,
            amount: payment.total,
            payload,
        },
        contact_email,
        lang: catalog.language().current(),
    };

    let confirmation = catalog.create_order(&order).await?;

    info!(order_id = %confirmation.order_id, "Order placed");
    add_breadcrumb(
        "checkout",
        "Order placed",
        Some(&[("order_id", &confirmation.order_id.to_string())]),
    );
    cart.clear_cart();
    Ok(confirmation)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::Arc;

    use grubline_core::{AddressDraft, CartItem, ManualClock};

    use super::*;
    use crate::storage::{KvAddressRepository, KvCartRepository, MemoryStore};

    type Cart = CartService<KvCartRepository<MemoryStore>>;
    type Addresses = AddressService<KvAddressRepository<MemoryStore>>;

    fn services() -> (Cart, Addresses) {
        let store = MemoryStore::new();
        (
            CartService::load(
                KvCartRepository::new(store.clone()),
                Arc::new(ManualClock::default()),
            ),
            AddressService::load(KvAddressRepository::new(store)),
        )
    }

    fn item(id: i64, won: i64, quantity: u32) -> CartItem {
        CartItem {
            id: MenuItemId::new(id),
            name: format!("item-{id}"),
            unit_price: Decimal::from(won),
            quantity,
            options: Vec::new(),
            image: None,
        }
    }

    fn rate() -> Decimal {
        Decimal::from(1350)
    }

    #[test]
    fn test_empty_cart_is_rejected() {
        let (cart, address) = services();
        assert!(matches!(
            build_payment_request(&cart, &address, rate()),
            Err(CheckoutError::EmptyCart)
        ));
    }

    #[test]
    fn test_address_is_required() {
        let (mut cart, address) = services();
        let _ = cart.add_item(RestaurantId::new(1), "A", item(1, 13_500, 1));
        assert!(matches!(
            build_payment_request(&cart, &address, rate()),
            Err(CheckoutError::AddressRequired)
        ));
    }

    #[test]
    fn test_min_order_gates_checkout() {
        let (mut cart, mut address) = services();
        address
            .save_validated(&AddressDraft::new("1 Jongno", ""))
            .unwrap();
        let _ = cart.add_item(RestaurantId::new(1), "A", item(1, 12_000, 1));
        cart.set_min_order_amount(RestaurantId::new(1), Some(Decimal::from(15_000)));

        let err = build_payment_request(&cart, &address, rate()).unwrap_err();
        assert!(
            matches!(err, CheckoutError::BelowMinOrder { missing } if missing == Decimal::from(3_000))
        );
    }

    #[test]
    fn test_lines_are_converted_and_summed() {
        let (mut cart, mut address) = services();
        address
            .save_validated(&AddressDraft::new("1 Jongno", ""))
            .unwrap();
        let _ = cart.add_item(RestaurantId::new(1), "A", item(1, 13_500, 2));
        let _ = cart.add_item(RestaurantId::new(1), "A", item(2, 1_000, 3));

        let request = build_payment_request(&cart, &address, rate()).unwrap();

        assert_eq!(request.currency, CurrencyCode::USD);
        assert_eq!(request.items[0].unit_amount, Decimal::new(1000, 2));
        assert_eq!(request.items[0].amount, Decimal::new(2000, 2));
        // 1000 / 1350 = 0.7407 -> 0.74
        assert_eq!(request.items[1].unit_amount, Decimal::new(74, 2));
        assert_eq!(request.items[1].amount, Decimal::new(222, 2));
        assert_eq!(request.total, Decimal::new(2222, 2));
        assert_eq!(request.source_total, Price::krw(Decimal::from(30_000)));
        assert_eq!(request.total_price().to_string(), "$22.22");
    }

    #[test]
    fn test_invalid_rate() {
        let (mut cart, mut address) = services();
        address
            .save_validated(&AddressDraft::new("1 Jongno", ""))
            .unwrap();
        let _ = cart.add_item(RestaurantId::new(1), "A", item(1, 1_000, 1));
        assert!(matches!(
            build_payment_request(&cart, &address, Decimal::ZERO),
            Err(CheckoutError::InvalidRate(_))
        ));
    }

    #[test]
    fn test_tiny_rate_overflow_is_an_invalid_rate() {
        let (mut cart, mut address) = services();
        address
            .save_validated(&AddressDraft::new("1 Jongno", ""))
            .unwrap();
        let _ = cart.add_item(RestaurantId::new(1), "A", item(1, 1_000, 1));
        assert!(matches!(
            build_payment_request(&cart, &address, Decimal::new(1, 28)),
            Err(CheckoutError::InvalidRate(_))
        ));
        // Each unit fits but the line amount does not
        let _ = cart.update_item_quantity(MenuItemId::new(1), 999);
        assert!(matches!(
            build_payment_request(&cart, &address, Decimal::new(1, 25)),
            Err(CheckoutError::InvalidRate(_))
        ));
    }

    #[test]
    fn test_payment_outcome_wire_format() {
        let captured: PaymentOutcome = serde_json::from_str(
            r#"{"status":"captured","reference":"PAY-123","payload":{"id":"x"}}"#,
        )
        .unwrap();
        assert!(matches!(captured, PaymentOutcome::Captured { ref reference, .. } if reference == "PAY-123"));

        let failed: PaymentOutcome =
            serde_json::from_str(r#"{"status":"failed","message":"card declined"}"#).unwrap();
        assert_eq!(
            failed,
            PaymentOutcome::Failed {
                message: "card declined".to_string()
            }
        );
    }
}

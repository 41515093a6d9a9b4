//! Checkout command.
//!
//! Without a payment result this prints the breakdown the payment widget
//! would charge. With `--payment-ref` it places the order for that captured
//! payment; with `--payment-failed` it reports the failure.

use grubline_core::Email;
use grubline_storefront::error::AppError;
use grubline_storefront::i18n::keys;
use grubline_storefront::services::PaymentOutcome;
use grubline_storefront::state::AppState;

use super::cart::refresh_min_order;
use super::won;

/// Arguments of `grubline checkout`.
pub struct CheckoutRequest {
    pub payment_ref: Option<String>,
    pub payment_failed: Option<String>,
    pub email: Option<String>,
}

pub async fn run(state: &mut AppState, request: CheckoutRequest) -> Result<(), AppError> {
    // Validate before touching anything
    let email = request.email.as_deref().map(Email::parse).transpose()?;

    refresh_min_order(state).await;
    let payment = state.payment_request()?;

    println!("{}", payment.restaurant_name);
    for line in &payment.items {
        println!(
            "  {} x{}  ${:.2}",
            line.name, line.quantity, line.amount
        );
    }
    println!(
        "{}: {} ({} at {} per USD)",
        state.message(keys::CART_TOTAL),
        payment.total_price(),
        won(payment.source_total.amount),
        state.currency().krw_per_usd,
    );

    let outcome = match (request.payment_ref, request.payment_failed) {
        (Some(reference), _) => PaymentOutcome::Captured {
            reference,
            payload: serde_json::Value::Null,
        },
        (None, Some(message)) => PaymentOutcome::Failed { message },
        (None, None) => return Ok(()),
    };

    let confirmation = state.complete_order(&payment, outcome, email).await?;
    println!(
        "{} (#{})",
        state.message(keys::ORDER_PLACED),
        confirmation.order_id
    );
    if let Some(minutes) = confirmation.estimated_delivery_minutes {
        println!("~{minutes} min");
    }
    Ok(())
}

//! Cart commands.

use std::io::{self, BufRead, Write};

use grubline_core::cart::MAX_QUANTITY;
use grubline_core::{MenuItemId, OptionItemId, RestaurantId};
use grubline_storefront::error::AppError;
use grubline_storefront::i18n::keys;
use grubline_storefront::services::AddOutcome;
use grubline_storefront::state::AppState;

use super::won;

/// Arguments of `grubline cart add`.
pub struct AddRequest {
    pub restaurant_id: RestaurantId,
    pub menu_item_id: MenuItemId,
    pub quantity: u32,
    pub options: Vec<OptionItemId>,
    pub assume_yes: bool,
}

/// Ask a yes/no question on stdin. Anything but "y"/"yes" is no.
fn confirm(question: &str) -> Result<bool, AppError> {
    print!("{question} [y/N] ");
    io::stdout()
        .flush()
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

/// Refresh the minimum order of the cart's restaurant.
///
/// The threshold is not persisted with the cart, so it is looked up again on
/// every run. A failed lookup leaves it unset.
pub async fn refresh_min_order(state: &mut AppState) {
    let Some(restaurant_id) = state.cart().state().restaurant_id() else {
        return;
    };
    if let Some(restaurant) = state.catalog().restaurant(restaurant_id).await {
        state
            .cart_mut()
            .set_min_order_amount(restaurant_id, restaurant.min_order_amount);
    }
}

pub async fn show(state: &mut AppState) -> Result<(), AppError> {
    refresh_min_order(state).await;

    let cart = state.cart();
    let Some(active) = cart.cart() else {
        println!("{}", state.message(keys::CART_EMPTY));
        return Ok(());
    };

    println!("{}", active.restaurant_name);
    for item in active.items() {
        println!(
            "{:>6}  {} x{}  {}",
            item.id.as_i64(),
            item.name,
            item.quantity,
            won(item.line_total())
        );
        for option in &item.options {
            let choices: Vec<&str> = option.option_items.iter().map(|i| i.name.as_str()).collect();
            println!("        {}: {}", option.name, choices.join(", "));
        }
    }
    println!(
        "\n{}: {}  ({})",
        state.message(keys::CART_TOTAL),
        won(cart.total_price()),
        state.format_message(
            keys::CART_ITEM_COUNT,
            &[("count", &cart.total_items().to_string())]
        ),
    );

    if cart.delivery_available() {
        if cart.min_order_amount().is_some() {
            println!("{}", state.message(keys::DELIVERY_AVAILABLE));
        }
    } else {
        println!(
            "{}",
            state.format_message(
                keys::CART_MIN_ORDER_REMAINING,
                &[("amount", &won(cart.amount_to_recorded_min_order()))],
            )
        );
    }
    Ok(())
}

pub async fn add(state: &mut AppState, request: AddRequest) -> Result<(), AppError> {
    let restaurant = state
        .catalog()
        .try_restaurant(request.restaurant_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("restaurant {}", request.restaurant_id)))?;
    let menu_item = state
        .catalog()
        .try_menu(request.menu_item_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("menu item {}", request.menu_item_id)))?;

    if menu_item
        .restaurant_id
        .is_some_and(|id| id != request.restaurant_id)
    {
        return Err(AppError::BadRequest(format!(
            "menu item {} is not on the menu of restaurant {}",
            menu_item.id, request.restaurant_id
        )));
    }
    if !menu_item.is_available {
        return Err(AppError::BadRequest(format!("{} is sold out", menu_item.name)));
    }
    let missing = menu_item.missing_required_options(&request.options);
    if let Some(option) = missing.first() {
        return Err(AppError::BadRequest(format!(
            "choose an option for \"{}\"",
            option.name
        )));
    }

    let item = menu_item.to_cart_item(request.quantity, &request.options);
    state
        .cart_mut()
        .set_min_order_amount(restaurant.id, restaurant.min_order_amount);

    match state
        .cart_mut()
        .add_item(restaurant.id, restaurant.name.clone(), item)
    {
        AddOutcome::Added => {
            println!("Added {} x{}", menu_item.name, request.quantity);
        }
        AddOutcome::Ignored => {
            println!("Nothing added: quantity or price out of range.");
        }
        AddOutcome::ReplacementRequired(pending) => {
            let current = state
                .cart()
                .cart()
                .map(|c| c.restaurant_name.clone())
                .unwrap_or_default();
            let question = state.format_message(
                keys::CART_REPLACE_PROMPT,
                &[("current", &current), ("restaurant", &pending.restaurant_name)],
            );

            if request.assume_yes || confirm(&question)? {
                state.cart_mut().confirm_replace();
                if let Some(notice) = state.cart().notice() {
                    println!("{}", notice.message(state.localizer(), state.language()));
                }
            } else {
                state.cart_mut().cancel_replace();
                println!("Cart unchanged.");
            }
        }
    }
    Ok(())
}

pub async fn set(state: &mut AppState, item_id: MenuItemId, quantity: i64) -> Result<(), AppError> {
    if quantity > i64::from(MAX_QUANTITY) {
        return Err(AppError::BadRequest(format!("quantity above {MAX_QUANTITY}")));
    }
    if !state.cart_mut().update_item_quantity(item_id, quantity) {
        return Err(AppError::NotFound(format!("item {item_id} in cart")));
    }
    show(state).await
}

pub fn clear(state: &mut AppState) {
    state.cart_mut().clear_cart();
    println!("{}", state.message(keys::CART_EMPTY));
}

//! Cart flows through the application state, with menu items fetched from
//! the fake API.

#![allow(clippy::unwrap_used)]

use grubline_core::{Language, MenuItemId, OptionItemId, RestaurantId};
use grubline_integration_tests::fixtures::{self, BONJUK, KYOCHON};
use grubline_integration_tests::{FakeApi, TestContext};
use grubline_storefront::services::{AddOutcome, CartNotice};
use grubline_storefront::storage::{MemoryStore, keys};
use rust_decimal::Decimal;

fn api() -> FakeApi {
    FakeApi::new()
        .with_get("/restaurants/1", fixtures::restaurant(KYOCHON))
        .with_get("/restaurants/2", fixtures::restaurant(BONJUK))
        .with_get("/menus/101", fixtures::menu_item(101, KYOCHON, 18_000))
        .with_get("/menus/102", fixtures::menu_item(102, KYOCHON, 9_000))
        .with_get("/menus/201", fixtures::menu_item(201, BONJUK, 11_000))
}

/// Fetch the restaurant and item, then add `quantity` with `options`.
async fn add(
    ctx: &mut TestContext<MemoryStore>,
    restaurant: i64,
    item: i64,
    quantity: u32,
    options: &[OptionItemId],
) -> AddOutcome {
    let restaurant = ctx
        .state
        .catalog()
        .restaurant(RestaurantId::new(restaurant))
        .await
        .unwrap();
    let menu_item = ctx
        .state
        .catalog()
        .menu(MenuItemId::new(item))
        .await
        .unwrap();
    ctx.state
        .cart_mut()
        .set_min_order_amount(restaurant.id, restaurant.min_order_amount);
    ctx.state.cart_mut().add_item(
        restaurant.id,
        restaurant.name,
        menu_item.to_cart_item(quantity, options),
    )
}

// =============================================================================
// Same restaurant
// =============================================================================

#[tokio::test]
async fn test_adding_same_item_sums_quantities() {
    let mut ctx = TestContext::new(api());

    assert_eq!(add(&mut ctx, KYOCHON, 101, 1, &[]).await, AddOutcome::Added);
    assert_eq!(add(&mut ctx, KYOCHON, 101, 2, &[]).await, AddOutcome::Added);

    let cart = ctx.state.cart();
    assert_eq!(cart.quantity_of(MenuItemId::new(101)), 3);
    assert_eq!(cart.cart().unwrap().items().len(), 1);
    assert_eq!(cart.total_price(), Decimal::from(54_000));
    assert_eq!(cart.cart().unwrap().restaurant_name, "Kyochon Chicken");
}

#[tokio::test]
async fn test_option_prices_count_towards_total() {
    let mut ctx = TestContext::new(api());

    let large = OptionItemId::new(10_100);
    add(&mut ctx, KYOCHON, 101, 2, &[large]).await;

    // (18,000 + 2,000) * 2
    assert_eq!(ctx.state.cart().total_price(), Decimal::from(40_000));
}

#[tokio::test]
async fn test_min_order_threshold_tracks_cart() {
    let mut ctx = TestContext::new(api());

    add(&mut ctx, KYOCHON, 102, 1, &[]).await;
    let cart = ctx.state.cart();
    assert_eq!(cart.min_order_amount(), Some(Decimal::from(15_000)));
    assert!(!cart.delivery_available());
    assert_eq!(cart.amount_to_recorded_min_order(), Decimal::from(6_000));

    add(&mut ctx, KYOCHON, 102, 1, &[]).await;
    assert!(ctx.state.cart().delivery_available());
    assert_eq!(ctx.state.cart().amount_to_recorded_min_order(), Decimal::ZERO);
}

#[tokio::test]
async fn test_quantity_zero_removes_last_item_and_empties_cart() {
    let mut ctx = TestContext::new(api());
    add(&mut ctx, KYOCHON, 101, 1, &[]).await;

    assert!(ctx.state.cart_mut().update_item_quantity(MenuItemId::new(101), 0));

    assert!(ctx.state.cart().state().is_empty());
    assert!(ctx.store.raw(keys::CART).is_none());
}

// =============================================================================
// Switching restaurants
// =============================================================================

#[tokio::test]
async fn test_replace_flow_confirmed() {
    let mut ctx = TestContext::new(api());
    add(&mut ctx, KYOCHON, 101, 2, &[]).await;

    let outcome = add(&mut ctx, BONJUK, 201, 1, &[]).await;
    let AddOutcome::ReplacementRequired(pending) = outcome else {
        panic!("expected a replacement prompt, got {outcome:?}");
    };
    assert_eq!(pending.restaurant_name, "Bonjuk");

    // Nothing changes until the user answers
    assert_eq!(ctx.state.cart().quantity_of(MenuItemId::new(101)), 2);

    assert!(ctx.state.cart_mut().confirm_replace());
    let cart = ctx.state.cart().cart().unwrap();
    assert_eq!(cart.restaurant_id, RestaurantId::new(BONJUK));
    assert_eq!(cart.items().len(), 1);
    assert_eq!(ctx.state.cart().quantity_of(MenuItemId::new(201)), 1);

    // Bonjuk has no minimum
    assert_eq!(ctx.state.cart().min_order_amount(), None);
    assert!(ctx.state.cart().delivery_available());
}

#[tokio::test]
async fn test_switch_notice_expires_after_three_seconds() {
    let mut ctx = TestContext::new(api());
    add(&mut ctx, KYOCHON, 101, 1, &[]).await;
    let _ = add(&mut ctx, BONJUK, 201, 1, &[]).await;
    ctx.state.cart_mut().confirm_replace();

    let notice = ctx.state.cart().notice().cloned().unwrap();
    assert_eq!(
        notice,
        CartNotice::SwitchedRestaurant {
            restaurant_name: "Bonjuk".to_string()
        }
    );
    assert_eq!(
        notice.message(ctx.state.localizer(), ctx.state.language()),
        "Switched to Bonjuk"
    );

    ctx.clock.advance(chrono::Duration::milliseconds(2_999));
    assert!(ctx.state.cart().notice().is_some());
    ctx.clock.advance(chrono::Duration::milliseconds(1));
    assert!(ctx.state.cart().notice().is_none());
}

#[tokio::test]
async fn test_replace_flow_canceled() {
    let mut ctx = TestContext::new(api());
    add(&mut ctx, KYOCHON, 101, 2, &[]).await;
    let before = ctx.store.raw(keys::CART);

    let _ = add(&mut ctx, BONJUK, 201, 1, &[]).await;
    assert_eq!(
        ctx.state.cart_mut().cancel_replace(),
        Some(MenuItemId::new(201))
    );

    assert_eq!(ctx.state.cart().quantity_of(MenuItemId::new(101)), 2);
    assert!(ctx.state.cart().pending_replacement().is_none());
    assert_eq!(ctx.store.raw(keys::CART), before);

    assert_eq!(ctx.state.cart().canceled_item(), Some(MenuItemId::new(201)));
    ctx.clock.advance(chrono::Duration::milliseconds(100));
    assert_eq!(ctx.state.cart().canceled_item(), None);
}

#[tokio::test]
async fn test_cart_keeps_names_resolved_when_item_was_added() {
    let mut ctx = TestContext::new(api());
    ctx.state.set_language(Language::Ja);

    add(&mut ctx, KYOCHON, 101, 1, &[]).await;
    ctx.state.set_language(Language::En);

    let cart = ctx.state.cart().cart().unwrap();
    assert_eq!(cart.restaurant_name, "キョチョンチキン");
    // No Japanese name for the item, so the English one was used
    assert_eq!(cart.item(MenuItemId::new(101)).unwrap().name, "Menu 101");
}

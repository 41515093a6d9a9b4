//! Smoke tests against a running restaurant API.
//!
//! These tests require `GRUBLINE_API_BASE_URL` (and `GRUBLINE_API_TOKEN` if
//! the API needs one) in the environment or a `.env` file.
//!
//! Run with: cargo test -p grubline-integration-tests -- --ignored

#![allow(clippy::unwrap_used)]

use grubline_storefront::catalog::NearbyQuery;
use grubline_storefront::config::StorefrontConfig;
use grubline_storefront::state::AppState;

fn live_state() -> AppState {
    let config = StorefrontConfig::from_env().expect("GRUBLINE_API_BASE_URL must be set");
    AppState::from_config(&config).expect("Failed to build application state")
}

#[tokio::test]
#[ignore = "Requires a running API"]
async fn test_live_categories_and_chains() {
    let state = live_state();

    let categories = state.catalog().try_categories().await.unwrap();
    assert!(categories.iter().all(|c| !c.name.is_empty()));

    let chains = state.catalog().try_popular_chains().await.unwrap();
    assert!(chains.iter().all(|c| !c.name.is_empty()));
}

#[tokio::test]
#[ignore = "Requires a running API"]
async fn test_live_nearby_restaurants_and_menu() {
    let state = live_state();

    let restaurants = state
        .catalog()
        .try_nearby_restaurants(&NearbyQuery::at(37.5665, 126.978))
        .await
        .unwrap();
    let Some(first) = restaurants.first() else {
        return;
    };

    let menu = state.catalog().try_menus(first.id).await.unwrap();
    assert!(menu.iter().all(|item| item.restaurant_id == Some(first.id)));
}

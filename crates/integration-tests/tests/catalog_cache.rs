//! Catalog reads through the response cache.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use grubline_core::{Language, RestaurantId};
use grubline_integration_tests::fixtures::{self, BONJUK, KYOCHON};
use grubline_integration_tests::{FakeApi, Method, TestContext};
use grubline_storefront::catalog::NearbyQuery;
use serde_json::json;

fn api() -> FakeApi {
    FakeApi::new()
        .with_get(
            "/restaurants/nearby",
            json!({"data": [fixtures::restaurant(KYOCHON), fixtures::restaurant(BONJUK)]}),
        )
        .with_get("/restaurants/1", fixtures::restaurant(KYOCHON))
}

#[tokio::test]
async fn test_repeated_read_is_served_from_cache() {
    let ctx = TestContext::new(api());
    let query = NearbyQuery::at(37.5, 127.0);

    let first = ctx.state.catalog().nearby_restaurants(&query).await;
    let second = ctx.state.catalog().nearby_restaurants(&query).await;

    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
    assert_eq!(ctx.api.count(Method::Get, "/restaurants/nearby"), 1);
}

#[tokio::test]
async fn test_cached_entry_expires_after_ttl() {
    let ctx = TestContext::new(api());
    let id = RestaurantId::new(KYOCHON);

    ctx.state.catalog().restaurant(id).await.unwrap();
    ctx.clock.advance(chrono::Duration::minutes(10) + chrono::Duration::seconds(1));
    ctx.state.catalog().restaurant(id).await.unwrap();

    assert_eq!(ctx.api.count(Method::Get, "/restaurants/1"), 2);
}

#[tokio::test]
async fn test_language_switch_refetches_in_new_language() {
    let ctx = TestContext::new(api());
    let id = RestaurantId::new(KYOCHON);

    let english = ctx.state.catalog().restaurant(id).await.unwrap();
    assert_eq!(english.name, "Kyochon Chicken");

    assert_eq!(ctx.state.set_language(Language::Ja), Some(Language::En));
    let japanese = ctx.state.catalog().restaurant(id).await.unwrap();
    assert_eq!(japanese.name, "キョチョンチキン");

    let requests = ctx.api.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].param("lang"), Some("en"));
    assert_eq!(requests[1].param("lang"), Some("ja"));
}

#[tokio::test]
async fn test_setting_same_language_keeps_cache() {
    let ctx = TestContext::new(api());
    let id = RestaurantId::new(KYOCHON);

    ctx.state.catalog().restaurant(id).await.unwrap();
    assert_eq!(ctx.state.set_language(Language::En), None);
    ctx.state.catalog().restaurant(id).await.unwrap();

    assert_eq!(ctx.api.count(Method::Get, "/restaurants/1"), 1);
}

#[tokio::test]
async fn test_failed_read_is_not_cached() {
    let api = FakeApi::new().with_failure(Method::Get, "/categories", 503, "maintenance");
    let ctx = TestContext::new(api.clone());

    let err = ctx.state.catalog().try_categories().await.unwrap_err();
    assert_eq!(err.status, Some(503));
    assert_eq!(err.message, "maintenance");
    assert!(ctx.state.catalog().categories().await.is_empty());

    let _ = api.with_get("/categories", json!([{"id": 1, "name": "치킨", "nameTranslations": {"en": "Chicken"}}]));
    let categories = ctx.state.catalog().categories().await;
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0].name, "Chicken");
    assert_eq!(ctx.api.count(Method::Get, "/categories"), 3);
}

#[tokio::test]
async fn test_unknown_restaurant_is_none() {
    let ctx = TestContext::new(api());

    let missing = ctx
        .state
        .catalog()
        .try_restaurant(RestaurantId::new(999))
        .await
        .unwrap();

    assert!(missing.is_none());
}

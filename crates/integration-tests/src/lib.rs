//! Integration tests for Grubline.
//!
//! # Running Tests
//!
//! ```bash
//! # Offline tests against the in-process fake API
//! cargo test -p grubline-integration-tests
//!
//! # Live API tests (needs GRUBLINE_API_BASE_URL)
//! cargo test -p grubline-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `cart_flow` - Cart state machine through the application state
//! - `catalog_cache` - Catalog reads, caching and language switches
//! - `checkout_flow` - Payment request and order submission
//! - `persistence` - Cart and address surviving a restart
//! - `live_api` - Smoke tests against a real API (ignored by default)

use std::sync::{Arc, Mutex, PoisonError};

use grubline_core::{Language, ManualClock};
use grubline_storefront::api::{Transport, TransportError};
use grubline_storefront::config::CurrencyConfig;
use grubline_storefront::state::AppState;
use grubline_storefront::storage::{KeyValueStore, MemoryStore};
use serde_json::Value;

/// HTTP method of a recorded request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// A request the fake API received.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl RecordedRequest {
    /// Value of a query parameter.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Default)]
struct FakeApiInner {
    routes: Vec<(Method, String, Result<Value, (u16, String)>)>,
    requests: Vec<RecordedRequest>,
}

/// In-process stand-in for the restaurant API.
///
/// Answers from a route table keyed by method and path; unknown routes are
/// a 404 with an API error body. Clones share routes and the request log.
#[derive(Debug, Clone, Default)]
pub struct FakeApi {
    inner: Arc<Mutex<FakeApiInner>>,
}

impl FakeApi {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `GET path` with `body`, replacing any previous route.
    #[must_use]
    pub fn with_get(self, path: &str, body: Value) -> Self {
        self.set_route(Method::Get, path, Ok(body));
        self
    }

    /// Answer `POST path` with `body`, replacing any previous route.
    #[must_use]
    pub fn with_post(self, path: &str, body: Value) -> Self {
        self.set_route(Method::Post, path, Ok(body));
        self
    }

    /// Fail `method path` with `status` and an API error body.
    #[must_use]
    pub fn with_failure(self, method: Method, path: &str, status: u16, message: &str) -> Self {
        let body = serde_json::json!({"message": message, "code": "E_FAKE"}).to_string();
        self.set_route(method, path, Err((status, body)));
        self
    }

    fn set_route(&self, method: Method, path: &str, response: Result<Value, (u16, String)>) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.routes.retain(|(m, p, _)| !(*m == method && p == path));
        inner.routes.push((method, path.to_string(), response));
    }

    /// Every request received so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .requests
            .clone()
    }

    /// Number of requests to `path` with `method`.
    #[must_use]
    pub fn count(&self, method: Method, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    fn answer(&self, request: RecordedRequest) -> Result<Value, TransportError> {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let response = inner
            .routes
            .iter()
            .find(|(m, p, _)| *m == request.method && *p == request.path)
            .map(|(_, _, response)| response.clone());
        inner.requests.push(request);

        match response {
            Some(Ok(value)) => Ok(value),
            Some(Err((status, body))) => Err(TransportError::Status { status, body }),
            None => Err(TransportError::Status {
                status: 404,
                body: r#"{"message":"Not found"}"#.to_string(),
            }),
        }
    }
}

impl Transport for FakeApi {
    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, TransportError> {
        self.answer(RecordedRequest {
            method: Method::Get,
            path: path.to_string(),
            query: query
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            body: None,
        })
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, TransportError> {
        self.answer(RecordedRequest {
            method: Method::Post,
            path: path.to_string(),
            query: Vec::new(),
            body: Some(body.clone()),
        })
    }
}

/// Application state over the fake API, a simulated clock and `store`.
pub struct TestContext<S = MemoryStore> {
    pub api: FakeApi,
    pub clock: ManualClock,
    pub store: S,
    pub state: AppState<FakeApi, S>,
}

impl TestContext {
    /// Fresh context with an empty in-memory store.
    #[must_use]
    pub fn new(api: FakeApi) -> Self {
        Self::with_store(api, MemoryStore::new())
    }
}

impl<S: KeyValueStore + Clone> TestContext<S> {
    /// Context over an existing store, as after a restart.
    #[must_use]
    pub fn with_store(api: FakeApi, store: S) -> Self {
        let clock = ManualClock::default();
        let state = AppState::new(
            api.clone(),
            store.clone(),
            Arc::new(clock.clone()),
            Language::En,
            chrono::Duration::minutes(10),
            CurrencyConfig::default(),
        );
        Self {
            api,
            clock,
            store,
            state,
        }
    }
}

/// Sample catalog data.
pub mod fixtures {
    use serde_json::{Value, json};

    pub const KYOCHON: i64 = 1;
    pub const BONJUK: i64 = 2;

    #[must_use]
    pub fn restaurant(id: i64) -> Value {
        match id {
            KYOCHON => json!({
                "id": KYOCHON,
                "name": "교촌치킨",
                "nameTranslations": {"en": "Kyochon Chicken", "ja": "キョチョンチキン"},
                "minOrderAmount": 15000,
                "deliveryFee": 3000,
                "isOpen": true
            }),
            _ => json!({
                "id": id,
                "name": "본죽",
                "nameTranslations": {"en": "Bonjuk"},
                "minOrderAmount": null,
                "deliveryFee": 2000
            }),
        }
    }

    #[must_use]
    pub fn menu_item(id: i64, restaurant_id: i64, price: i64) -> Value {
        json!({
            "id": id,
            "restaurantId": restaurant_id,
            "name": format!("메뉴 {id}"),
            "nameTranslations": {"en": format!("Menu {id}")},
            "price": price,
            "options": [{
                "id": id * 10,
                "name": "Size",
                "price": 0,
                "required": false,
                "optionItems": [{"id": id * 100, "name": "Large", "price": 2000}]
            }]
        })
    }
}

//! Catalog data adapters.
//!
//! # Architecture
//!
//! - Every read goes through the [`ResponseCache`] first, keyed by endpoint
//!   plus sorted parameters and tagged with the active language.
//! - Every GET carries `lang` from the [`LanguageContext`]. The language is
//!   captured once per call, before the request is sent, so a response that
//!   arrives after a language switch is cached under the language it was
//!   fetched in.
//! - Raw bodies are cached; view models are rebuilt on each read.
//! - Plain readers (`restaurant`, `menus`, ...) log failures and return an
//!   empty list or `None`. The `try_` variants return the [`ApiError`] so the
//!   caller can show a retryable "failed to load" state.
//!
//! # Example
//!
//! ```rust,ignore
//! use grubline_storefront::catalog::{CatalogService, NearbyQuery};
//!
//! let catalog = CatalogService::new(transport, cache, language);
//! let restaurants = catalog.nearby_restaurants(&NearbyQuery::at(37.57, 126.98)).await;
//! let menu = catalog.menus(restaurants[0].id).await;
//! ```

mod conversions;
pub mod types;

use std::sync::{Arc, LazyLock};

use grubline_core::{Address, Language, MenuItemId, RestaurantId};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument, warn};

pub use types::{
    Category, CategoryFilter, DeliveryAddress, Franchise, MenuItem, MenuOption, MenuOptionItem,
    NearbyQuery, OrderConfirmation, Restaurant,
};

use crate::api::types::{
    AddressDto, CategoryDto, CreateAddressBody, FranchiseDto, MenuItemDto, OrderCreatedDto,
    RestaurantDto,
};
use crate::api::{ApiError, Transport};
use crate::cache::{QueryParams, ResponseCache, make_key};
use crate::i18n::LanguageContext;
use conversions::{
    convert_address, convert_category, convert_franchise, convert_menu_item, convert_order,
    convert_restaurant, unwrap_envelope,
};

/// Cache keys of the saved-address list.
static ADDRESSES_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/addresses\?").expect("Invalid regex"));

/// Reads catalog data through the response cache.
///
/// Cheap to clone; clones share the transport, cache and language.
pub struct CatalogService<T> {
    inner: Arc<CatalogInner<T>>,
}

struct CatalogInner<T> {
    transport: T,
    cache: ResponseCache,
    language: LanguageContext,
}

impl<T> Clone for CatalogService<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Transport> CatalogService<T> {
    /// Create a catalog over `transport`.
    #[must_use]
    pub fn new(transport: T, cache: ResponseCache, language: LanguageContext) -> Self {
        Self {
            inner: Arc::new(CatalogInner {
                transport,
                cache,
                language,
            }),
        }
    }

    /// The shared response cache.
    #[must_use]
    pub fn cache(&self) -> &ResponseCache {
        &self.inner.cache
    }

    /// The shared language context.
    #[must_use]
    pub fn language(&self) -> &LanguageContext {
        &self.inner.language
    }

    /// Switch the display language and drop entries cached in the old one.
    ///
    /// Returns the previous language when it changed.
    pub fn set_language(&self, language: Language) -> Option<Language> {
        let previous = self.inner.language.set(language)?;
        let removed = self.inner.cache.invalidate_for_language(previous);
        debug!(%previous, removed, "Invalidated cache entries of previous language");
        Some(previous)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// GET `endpoint`, serving from the cache when fresh.
    async fn fetch<D: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: QueryParams,
    ) -> Result<(D, Language), ApiError> {
        let language = self.inner.language.current();
        let params = params.with("lang", Some(language.code()));
        let key = make_key(endpoint, &params);

        if let Some(value) = self.inner.cache.get(&key, language) {
            debug!(key, "Cache hit");
            return decode(value).map(|data| (data, language));
        }

        let value = {
            let query = params.present_sorted();
            self.inner.transport.get(endpoint, &query).await?
        };
        let value = unwrap_envelope(value);
        let data = decode(value.clone())?;
        self.inner.cache.put(key, value, language);
        Ok((data, language))
    }

    async fn post<D: DeserializeOwned>(&self, endpoint: &str, body: &Value) -> Result<D, ApiError> {
        let value = self.inner.transport.post(endpoint, body).await?;
        decode(unwrap_envelope(value))
    }

    // =========================================================================
    // Restaurants
    // =========================================================================

    /// Restaurants near a point, optionally filtered by category or chain.
    ///
    /// # Errors
    ///
    /// Returns the normalized API error if the request or decoding fails.
    #[instrument(skip(self))]
    pub async fn try_nearby_restaurants(
        &self,
        query: &NearbyQuery,
    ) -> Result<Vec<Restaurant>, ApiError> {
        let (category_id, category_name) = match &query.category {
            Some(CategoryFilter::Id(id)) => (Some(*id), None),
            Some(CategoryFilter::Name(name)) => (None, Some(name.as_str())),
            None => (None, None),
        };
        let params = QueryParams::new()
            .with("lat", query.lat)
            .with("lng", query.lng)
            .with("categoryId", category_id)
            .with("category", category_name)
            .with("franchiseId", query.franchise_id);

        let (dtos, language) = self
            .fetch::<Vec<RestaurantDto>>("/restaurants/nearby", params)
            .await?;
        Ok(dtos
            .into_iter()
            .map(|dto| convert_restaurant(dto, language))
            .collect())
    }

    /// [`Self::try_nearby_restaurants`], logging failures as an empty list.
    pub async fn nearby_restaurants(&self, query: &NearbyQuery) -> Vec<Restaurant> {
        self.try_nearby_restaurants(query)
            .await
            .unwrap_or_else(|e| log_read_failure("nearby restaurants", &e))
    }

    /// One restaurant. `Ok(None)` when the API reports it does not exist.
    ///
    /// # Errors
    ///
    /// Returns the normalized API error for any other failure.
    #[instrument(skip(self), fields(restaurant_id = %id))]
    pub async fn try_restaurant(&self, id: RestaurantId) -> Result<Option<Restaurant>, ApiError> {
        match self
            .fetch::<RestaurantDto>(&format!("/restaurants/{id}"), QueryParams::new())
            .await
        {
            Ok((dto, language)) => Ok(Some(convert_restaurant(dto, language))),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// [`Self::try_restaurant`], logging failures as `None`.
    pub async fn restaurant(&self, id: RestaurantId) -> Option<Restaurant> {
        self.try_restaurant(id)
            .await
            .unwrap_or_else(|e| log_read_failure("restaurant", &e))
    }

    // =========================================================================
    // Menus
    // =========================================================================

    /// Menu of a restaurant.
    ///
    /// # Errors
    ///
    /// Returns the normalized API error if the request or decoding fails.
    #[instrument(skip(self), fields(restaurant_id = %restaurant_id))]
    pub async fn try_menus(&self, restaurant_id: RestaurantId) -> Result<Vec<MenuItem>, ApiError> {
        let (dtos, language) = self
            .fetch::<Vec<MenuItemDto>>(
                &format!("/restaurants/{restaurant_id}/menus"),
                QueryParams::new(),
            )
            .await?;
        Ok(dtos
            .into_iter()
            .map(|dto| {
                let mut item = convert_menu_item(dto, language);
                item.restaurant_id.get_or_insert(restaurant_id);
                item
            })
            .collect())
    }

    /// [`Self::try_menus`], logging failures as an empty list.
    pub async fn menus(&self, restaurant_id: RestaurantId) -> Vec<MenuItem> {
        self.try_menus(restaurant_id)
            .await
            .unwrap_or_else(|e| log_read_failure("menus", &e))
    }

    /// One menu item with its option groups. `Ok(None)` when not found.
    ///
    /// # Errors
    ///
    /// Returns the normalized API error for any other failure.
    #[instrument(skip(self), fields(menu_item_id = %id))]
    pub async fn try_menu(&self, id: MenuItemId) -> Result<Option<MenuItem>, ApiError> {
        match self
            .fetch::<MenuItemDto>(&format!("/menus/{id}"), QueryParams::new())
            .await
        {
            Ok((dto, language)) => Ok(Some(convert_menu_item(dto, language))),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// [`Self::try_menu`], logging failures as `None`.
    pub async fn menu(&self, id: MenuItemId) -> Option<MenuItem> {
        self.try_menu(id)
            .await
            .unwrap_or_else(|e| log_read_failure("menu", &e))
    }

    // =========================================================================
    // Browse
    // =========================================================================

    /// Popular restaurant chains.
    ///
    /// # Errors
    ///
    /// Returns the normalized API error if the request or decoding fails.
    #[instrument(skip(self))]
    pub async fn try_popular_chains(&self) -> Result<Vec<Franchise>, ApiError> {
        let (dtos, language) = self
            .fetch::<Vec<FranchiseDto>>("/franchises/popular", QueryParams::new())
            .await?;
        Ok(dtos
            .into_iter()
            .map(|dto| convert_franchise(dto, language))
            .collect())
    }

    /// [`Self::try_popular_chains`], logging failures as an empty list.
    pub async fn popular_chains(&self) -> Vec<Franchise> {
        self.try_popular_chains()
            .await
            .unwrap_or_else(|e| log_read_failure("popular chains", &e))
    }

    /// Food categories.
    ///
    /// # Errors
    ///
    /// Returns the normalized API error if the request or decoding fails.
    #[instrument(skip(self))]
    pub async fn try_categories(&self) -> Result<Vec<Category>, ApiError> {
        let (dtos, language) = self
            .fetch::<Vec<CategoryDto>>("/categories", QueryParams::new())
            .await?;
        Ok(dtos
            .into_iter()
            .map(|dto| convert_category(dto, language))
            .collect())
    }

    /// [`Self::try_categories`], logging failures as an empty list.
    pub async fn categories(&self) -> Vec<Category> {
        self.try_categories()
            .await
            .unwrap_or_else(|e| log_read_failure("categories", &e))
    }

    // =========================================================================
    // Addresses
    // =========================================================================

    /// Delivery addresses saved on the server.
    ///
    /// # Errors
    ///
    /// Returns the normalized API error if the request or decoding fails.
    #[instrument(skip(self))]
    pub async fn try_delivery_addresses(&self) -> Result<Vec<DeliveryAddress>, ApiError> {
        let (dtos, _) = self
            .fetch::<Vec<AddressDto>>("/addresses", QueryParams::new())
            .await?;
        Ok(dtos.into_iter().map(convert_address).collect())
    }

    /// [`Self::try_delivery_addresses`], logging failures as an empty list.
    pub async fn delivery_addresses(&self) -> Vec<DeliveryAddress> {
        self.try_delivery_addresses()
            .await
            .unwrap_or_else(|e| log_read_failure("delivery addresses", &e))
    }

    /// Save `address` on the server.
    ///
    /// Drops the cached address list in every language.
    ///
    /// # Errors
    ///
    /// Returns the normalized API error if the request or decoding fails.
    #[instrument(skip(self, address))]
    pub async fn create_address(&self, address: &Address) -> Result<DeliveryAddress, ApiError> {
        let body = CreateAddressBody {
            main_address: &address.main_address,
            detail_address: &address.detail_address,
            lat: address.lat,
            lng: address.lng,
        };
        let body = serde_json::to_value(body).map_err(|e| ApiError::new(e.to_string()))?;

        let dto: AddressDto = self.post("/addresses", &body).await?;
        let removed = self.inner.cache.invalidate(&ADDRESSES_KEY_RE);
        debug!(address_id = %dto.id, removed, "Address created");
        Ok(convert_address(dto))
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Submit an order.
    ///
    /// # Errors
    ///
    /// Returns the normalized API error if the request or decoding fails.
    #[instrument(skip(self, order))]
    pub async fn create_order(
        &self,
        order: &impl serde::Serialize,
    ) -> Result<OrderConfirmation, ApiError> {
        let body = serde_json::to_value(order).map_err(|e| ApiError::new(e.to_string()))?;
        let dto: OrderCreatedDto = self.post("/orders", &body).await?;
        Ok(convert_order(dto))
    }
}

fn decode<D: DeserializeOwned>(value: Value) -> Result<D, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError {
        message: format!("Unexpected response shape: {e}"),
        code: Some("invalid_response".to_string()),
        status: None,
    })
}

fn log_read_failure<D: Default>(what: &str, error: &ApiError) -> D {
    warn!(
        what,
        error = %error,
        status = ?error.status,
        code = ?error.code,
        "Catalog read failed"
    );
    D::default()
}

//! Raw response and request bodies of the restaurant API.
//!
//! Field names follow the API's camelCase JSON. Translated fields arrive as
//! a `{languageCode: text}` map next to the default-language value.

use grubline_core::{
    AddressId, CategoryId, FranchiseId, LocalizedText, MenuItemId, OptionId, OptionItemId,
    OrderId, RestaurantId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Restaurant as listed by `/restaurants/nearby` and `/restaurants/{id}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantDto {
    pub id: RestaurantId,
    pub name: String,
    #[serde(default)]
    pub name_translations: LocalizedText,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub description_translations: LocalizedText,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub review_count: Option<u32>,
    #[serde(default)]
    pub min_order_amount: Option<Decimal>,
    #[serde(default)]
    pub delivery_fee: Option<Decimal>,
    #[serde(default)]
    pub delivery_time_minutes: Option<u32>,
    #[serde(default)]
    pub distance: Option<f64>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub franchise_id: Option<FranchiseId>,
    #[serde(default)]
    pub is_open: Option<bool>,
}

/// Menu item as returned by `/restaurants/{id}/menus` and `/menus/{id}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemDto {
    pub id: MenuItemId,
    #[serde(default)]
    pub restaurant_id: Option<RestaurantId>,
    pub name: String,
    #[serde(default)]
    pub name_translations: LocalizedText,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub description_translations: LocalizedText,
    pub price: Decimal,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub section: Option<String>,
    #[serde(default)]
    pub section_translations: LocalizedText,
    #[serde(default)]
    pub is_available: Option<bool>,
    #[serde(default)]
    pub options: Vec<MenuOptionDto>,
}

/// Option group of a menu item ("Size", "Extra toppings").
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuOptionDto {
    pub id: OptionId,
    pub name: String,
    #[serde(default)]
    pub name_translations: LocalizedText,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub max_select: Option<u32>,
    #[serde(default)]
    pub option_items: Vec<OptionItemDto>,
}

/// Choice within an option group.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionItemDto {
    pub id: OptionItemId,
    pub name: String,
    #[serde(default)]
    pub name_translations: LocalizedText,
    #[serde(default)]
    pub price: Decimal,
}

/// Restaurant chain from `/franchises/popular`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FranchiseDto {
    pub id: FranchiseId,
    pub name: String,
    #[serde(default)]
    pub name_translations: LocalizedText,
    #[serde(default)]
    pub logo_url: Option<String>,
}

/// Food category from `/categories`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDto {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub name_translations: LocalizedText,
    #[serde(default)]
    pub icon_url: Option<String>,
}

/// Saved delivery address from `/addresses`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressDto {
    pub id: AddressId,
    pub main_address: String,
    #[serde(default)]
    pub detail_address: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
}

/// Body of `POST /addresses`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAddressBody<'a> {
    pub main_address: &'a str,
    pub detail_address: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
}

/// Response of `POST /orders`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreatedDto {
    pub id: OrderId,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub estimated_delivery_minutes: Option<u32>,
}

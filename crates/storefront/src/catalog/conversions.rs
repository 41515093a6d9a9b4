//! Conversions from API bodies to view models.

use grubline_core::{Language, Price};
use rust_decimal::Decimal;
use serde_json::Value;

use super::types::{
    Category, DeliveryAddress, Franchise, MenuItem, MenuOption, MenuOptionItem, OrderConfirmation,
    Restaurant,
};
use crate::api::types::{
    AddressDto, CategoryDto, FranchiseDto, MenuItemDto, MenuOptionDto, OptionItemDto,
    OrderCreatedDto, RestaurantDto,
};
use crate::i18n::resolve_localized_field;

/// Strip a `{"data": ...}` envelope if the API wrapped the payload in one.
pub fn unwrap_envelope(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.len() == 1 && map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

pub fn convert_restaurant(dto: RestaurantDto, language: Language) -> Restaurant {
    let name = resolve_localized_field(&dto.name, &dto.name_translations, language).to_owned();
    let description = dto.description.as_deref().map(|default| {
        resolve_localized_field(default, &dto.description_translations, language).to_owned()
    });

    Restaurant {
        id: dto.id,
        name,
        description,
        image_url: dto.image_url,
        rating: dto.rating,
        review_count: dto.review_count.unwrap_or(0),
        min_order_amount: dto.min_order_amount.filter(|amount| *amount > Decimal::ZERO),
        delivery_fee: dto.delivery_fee.unwrap_or(Decimal::ZERO),
        delivery_time_minutes: dto.delivery_time_minutes,
        distance_km: dto.distance,
        category_id: dto.category_id,
        franchise_id: dto.franchise_id,
        is_open: dto.is_open.unwrap_or(true),
    }
}

pub fn convert_menu_item(dto: MenuItemDto, language: Language) -> MenuItem {
    let name = resolve_localized_field(&dto.name, &dto.name_translations, language).to_owned();
    let description = dto.description.as_deref().map(|default| {
        resolve_localized_field(default, &dto.description_translations, language).to_owned()
    });
    let section = dto.section.as_deref().map(|default| {
        resolve_localized_field(default, &dto.section_translations, language).to_owned()
    });

    MenuItem {
        id: dto.id,
        restaurant_id: dto.restaurant_id,
        name,
        description,
        price: Price::krw(dto.price),
        image_url: dto.image_url,
        section,
        is_available: dto.is_available.unwrap_or(true),
        options: dto
            .options
            .into_iter()
            .map(|option| convert_option(option, language))
            .collect(),
    }
}

fn convert_option(dto: MenuOptionDto, language: Language) -> MenuOption {
    MenuOption {
        id: dto.id,
        name: resolve_localized_field(&dto.name, &dto.name_translations, language).to_owned(),
        price: dto.price,
        required: dto.required,
        max_select: dto.max_select,
        items: dto
            .option_items
            .into_iter()
            .map(|item| convert_option_item(item, language))
            .collect(),
    }
}

fn convert_option_item(dto: OptionItemDto, language: Language) -> MenuOptionItem {
    MenuOptionItem {
        id: dto.id,
        name: resolve_localized_field(&dto.name, &dto.name_translations, language).to_owned(),
        price: dto.price,
    }
}

pub fn convert_franchise(dto: FranchiseDto, language: Language) -> Franchise {
    Franchise {
        id: dto.id,
        name: resolve_localized_field(&dto.name, &dto.name_translations, language).to_owned(),
        logo_url: dto.logo_url,
    }
}

pub fn convert_category(dto: CategoryDto, language: Language) -> Category {
    Category {
        id: dto.id,
        name: resolve_localized_field(&dto.name, &dto.name_translations, language).to_owned(),
        icon_url: dto.icon_url,
    }
}

pub fn convert_address(dto: AddressDto) -> DeliveryAddress {
    DeliveryAddress {
        id: dto.id,
        main_address: dto.main_address,
        detail_address: dto.detail_address.unwrap_or_default(),
        lat: dto.lat,
        lng: dto.lng,
    }
}

pub fn convert_order(dto: OrderCreatedDto) -> OrderConfirmation {
    OrderConfirmation {
        order_id: dto.id,
        status: dto.status,
        estimated_delivery_minutes: dto.estimated_delivery_minutes,
    }
}

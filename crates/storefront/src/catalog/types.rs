//! Catalog view models, resolved to one display language.

use grubline_core::{
    Address, AddressId, CartItem, CartOption, CartOptionItem, CategoryId, FranchiseId, MenuItemId,
    OptionId, OptionItemId, OrderId, Price, RestaurantId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Restaurant summary or detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub id: RestaurantId,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub rating: Option<f64>,
    pub review_count: u32,
    /// `None` when the restaurant has no minimum.
    pub min_order_amount: Option<Decimal>,
    pub delivery_fee: Decimal,
    pub delivery_time_minutes: Option<u32>,
    /// Kilometres from the query point.
    pub distance_km: Option<f64>,
    pub category_id: Option<CategoryId>,
    pub franchise_id: Option<FranchiseId>,
    pub is_open: bool,
}

/// Orderable menu item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: MenuItemId,
    pub restaurant_id: Option<RestaurantId>,
    pub name: String,
    pub description: Option<String>,
    pub price: Price,
    pub image_url: Option<String>,
    pub section: Option<String>,
    pub is_available: bool,
    pub options: Vec<MenuOption>,
}

/// Option group of a menu item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuOption {
    pub id: OptionId,
    pub name: String,
    /// Surcharge for choosing anything from this group.
    pub price: Decimal,
    pub required: bool,
    pub max_select: Option<u32>,
    pub items: Vec<MenuOptionItem>,
}

/// Choice within an option group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuOptionItem {
    pub id: OptionItemId,
    pub name: String,
    pub price: Decimal,
}

impl MenuItem {
    /// Build a cart line for `quantity` of this item with the chosen option
    /// items.
    ///
    /// Option groups with no chosen item are left out; unknown option item
    /// IDs are ignored.
    #[must_use]
    pub fn to_cart_item(&self, quantity: u32, selected: &[OptionItemId]) -> CartItem {
        let options = self
            .options
            .iter()
            .filter_map(|option| {
                let option_items: Vec<CartOptionItem> = option
                    .items
                    .iter()
                    .filter(|item| selected.contains(&item.id))
                    .map(|item| CartOptionItem {
                        id: item.id,
                        name: item.name.clone(),
                        price: item.price,
                    })
                    .collect();
                (!option_items.is_empty()).then(|| CartOption {
                    id: option.id,
                    name: option.name.clone(),
                    price: option.price,
                    option_items,
                })
            })
            .collect();

        CartItem {
            id: self.id,
            name: self.name.clone(),
            unit_price: self.price.amount,
            quantity,
            options,
            image: self.image_url.clone(),
        }
    }

    /// Required option groups with no chosen item among `selected`.
    #[must_use]
    pub fn missing_required_options(&self, selected: &[OptionItemId]) -> Vec<&MenuOption> {
        self.options
            .iter()
            .filter(|option| {
                option.required && !option.items.iter().any(|item| selected.contains(&item.id))
            })
            .collect()
    }
}

/// Restaurant chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Franchise {
    pub id: FranchiseId,
    pub name: String,
    pub logo_url: Option<String>,
}

/// Food category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub icon_url: Option<String>,
}

/// Delivery address saved on the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryAddress {
    pub id: AddressId,
    pub main_address: String,
    pub detail_address: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl From<DeliveryAddress> for Address {
    /// Server-side addresses were validated when created.
    fn from(address: DeliveryAddress) -> Self {
        Self {
            main_address: address.main_address,
            detail_address: address.detail_address,
            is_complete: true,
            lat: address.lat,
            lng: address.lng,
            address_id: Some(address.id),
        }
    }
}

/// Restaurant filter for nearby searches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryFilter {
    /// By category ID (`categoryId`).
    Id(CategoryId),
    /// By category name (`category`).
    Name(String),
}

/// Parameters of a nearby-restaurant search.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NearbyQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub category: Option<CategoryFilter>,
    pub franchise_id: Option<FranchiseId>,
}

impl NearbyQuery {
    /// Search around a point.
    #[must_use]
    pub const fn at(lat: f64, lng: f64) -> Self {
        Self {
            lat: Some(lat),
            lng: Some(lng),
            category: None,
            franchise_id: None,
        }
    }

    /// Search around the coordinates of `address`, when it has them.
    #[must_use]
    pub const fn around(address: &Address) -> Self {
        Self {
            lat: address.lat,
            lng: address.lng,
            category: None,
            franchise_id: None,
        }
    }

    #[must_use]
    pub fn with_category(mut self, category: CategoryFilter) -> Self {
        self.category = Some(category);
        self
    }

    #[must_use]
    pub const fn with_franchise(mut self, franchise_id: FranchiseId) -> Self {
        self.franchise_id = Some(franchise_id);
        self
    }
}

/// Confirmation of a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmation {
    pub order_id: OrderId,
    pub status: Option<String>,
    pub estimated_delivery_minutes: Option<u32>,
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use grubline_core::CurrencyCode;

    use super::*;

    fn menu_item() -> MenuItem {
        MenuItem {
            id: MenuItemId::new(11),
            restaurant_id: Some(RestaurantId::new(1)),
            name: "Fried chicken".to_string(),
            description: None,
            price: Price::new(Decimal::from(18_000), CurrencyCode::KRW),
            image_url: Some("https://cdn.grubline.test/chicken.jpg".to_string()),
            section: None,
            is_available: true,
            options: vec![
                MenuOption {
                    id: OptionId::new(1),
                    name: "Sauce".to_string(),
                    price: Decimal::ZERO,
                    required: true,
                    max_select: Some(1),
                    items: vec![
                        MenuOptionItem {
                            id: OptionItemId::new(100),
                            name: "Soy garlic".to_string(),
                            price: Decimal::ZERO,
                        },
                        MenuOptionItem {
                            id: OptionItemId::new(101),
                            name: "Spicy".to_string(),
                            price: Decimal::from(1_000),
                        },
                    ],
                },
                MenuOption {
                    id: OptionId::new(2),
                    name: "Extras".to_string(),
                    price: Decimal::from(500),
                    required: false,
                    max_select: None,
                    items: vec![MenuOptionItem {
                        id: OptionItemId::new(200),
                        name: "Cheese".to_string(),
                        price: Decimal::from(1_500),
                    }],
                },
            ],
        }
    }

    #[test]
    fn test_to_cart_item_keeps_only_chosen_options() {
        let item = menu_item().to_cart_item(2, &[OptionItemId::new(101), OptionItemId::new(999)]);

        assert_eq!(item.quantity, 2);
        assert_eq!(item.options.len(), 1);
        assert_eq!(item.options[0].id, OptionId::new(1));
        assert_eq!(item.options[0].option_items.len(), 1);
        assert_eq!(item.unit_total(), Decimal::from(19_000));
    }

    #[test]
    fn test_to_cart_item_includes_group_surcharge() {
        let item = menu_item().to_cart_item(1, &[OptionItemId::new(100), OptionItemId::new(200)]);
        // 18000 + (0 + 0) + (500 + 1500)
        assert_eq!(item.unit_total(), Decimal::from(20_000));
    }

    #[test]
    fn test_missing_required_options() {
        let item = menu_item();
        assert_eq!(item.missing_required_options(&[]).len(), 1);
        assert!(
            item.missing_required_options(&[OptionItemId::new(100)])
                .is_empty()
        );
    }

    #[test]
    fn test_delivery_address_converts_to_complete_address() {
        let address = Address::from(DeliveryAddress {
            id: AddressId::new(4),
            main_address: "1 Jongno".to_string(),
            detail_address: "3F".to_string(),
            lat: Some(37.57),
            lng: Some(126.98),
        });
        assert!(address.is_complete);
        assert_eq!(address.address_id, Some(AddressId::new(4)));
    }
}

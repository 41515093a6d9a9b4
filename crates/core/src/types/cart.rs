//! Cart model and pricing.
//!
//! A cart holds items from exactly one restaurant. The state machine that
//! enforces this across user actions lives in the storefront crate; this
//! module only provides the data and the arithmetic on it.

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{MenuItemId, OptionId, OptionItemId, RestaurantId};

/// Tolerance applied when comparing a cart total against a minimum order
/// amount, in currency units.
pub const MIN_ORDER_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Largest quantity a single cart line may hold.
pub const MAX_QUANTITY: u32 = 999;

/// Largest unit, option or option-item price a cart line may carry (10^12).
///
/// Together with [`MAX_QUANTITY`] this keeps line and cart totals far inside
/// the range of `Decimal`, so the pricing arithmetic cannot overflow.
pub const MAX_PRICE: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

fn is_valid_price(price: Decimal) -> bool {
    price >= Decimal::ZERO && price <= MAX_PRICE
}

/// A selectable item inside an option group (e.g. "Extra cheese").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartOptionItem {
    pub id: OptionItemId,
    pub name: String,
    pub price: Decimal,
}

/// An option group chosen for a cart item (e.g. "Toppings").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartOption {
    pub id: OptionId,
    pub name: String,
    /// Surcharge of the group itself, usually zero.
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub option_items: Vec<CartOptionItem>,
}

impl CartOption {
    /// Group surcharge plus every selected item's price.
    #[must_use]
    pub fn price_total(&self) -> Decimal {
        self.price + self.option_items.iter().map(|item| item.price).sum::<Decimal>()
    }
}

/// One line of the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: MenuItemId,
    pub name: String,
    pub unit_price: Decimal,
    /// Always at least 1 while the item is in a cart.
    pub quantity: u32,
    #[serde(default)]
    pub options: Vec<CartOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl CartItem {
    /// Price of a single unit including all selected options.
    ///
    /// Option prices are per unit: only the item quantity scales the line.
    #[must_use]
    pub fn unit_total(&self) -> Decimal {
        self.unit_price + self.options.iter().map(CartOption::price_total).sum::<Decimal>()
    }

    /// Price of the whole line.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_total() * Decimal::from(self.quantity)
    }

    /// Whether the line may enter a cart: quantity in `1..=MAX_QUANTITY`
    /// and every price in `0..=MAX_PRICE`.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        (1..=MAX_QUANTITY).contains(&self.quantity)
            && is_valid_price(self.unit_price)
            && self.options.iter().all(|opt| {
                is_valid_price(opt.price)
                    && opt.option_items.iter().all(|oi| is_valid_price(oi.price))
            })
    }
}

/// A non-empty cart bound to one restaurant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub restaurant_id: RestaurantId,
    pub restaurant_name: String,
    items: Vec<CartItem>,
}

impl Cart {
    /// Start a cart with a single item.
    #[must_use]
    pub fn new(restaurant_id: RestaurantId, restaurant_name: String, item: CartItem) -> Self {
        Self {
            restaurant_id,
            restaurant_name,
            items: vec![item],
        }
    }

    /// Items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Look up an item by ID.
    #[must_use]
    pub fn item(&self, id: MenuItemId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Add an item, summing quantities when the ID is already present.
    ///
    /// Returns `false` and leaves the cart unchanged when the summed
    /// quantity would exceed [`MAX_QUANTITY`].
    pub fn merge_item(&mut self, item: CartItem) -> bool {
        match self.items.iter_mut().find(|existing| existing.id == item.id) {
            Some(existing) => match existing.quantity.checked_add(item.quantity) {
                Some(quantity) if quantity <= MAX_QUANTITY => {
                    existing.quantity = quantity;
                    true
                }
                _ => false,
            },
            None => {
                self.items.push(item);
                true
            }
        }
    }

    /// Set an item's quantity. Returns `false` when the item is absent.
    ///
    /// A zero quantity is not accepted here; callers remove the item instead.
    pub fn set_quantity(&mut self, id: MenuItemId, quantity: u32) -> bool {
        debug_assert!(quantity > 0, "zero quantity must go through remove_item");
        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.quantity = quantity;
                true
            }
            None => false,
        }
    }

    /// Remove an item, returning it if it was present.
    pub fn remove_item(&mut self, id: MenuItemId) -> Option<CartItem> {
        let index = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(index))
    }

    /// Sum of all line totals.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Sum of all quantities.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.items
            .iter()
            .fold(0_u32, |acc, item| acc.saturating_add(item.quantity))
    }

    /// Whether the cart satisfies its structural invariants: at least one
    /// item, unique item IDs and every line [`CartItem::is_valid`].
    ///
    /// Used to reject tampered or truncated records read back from storage.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        let mut seen = HashSet::new();
        !self.items.is_empty()
            && self
                .items
                .iter()
                .all(|item| item.is_valid() && seen.insert(item.id))
    }
}

/// The cart as seen by the rest of the system: absent or active.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CartState {
    #[default]
    Empty,
    Active(Cart),
}

impl CartState {
    /// The active cart, if any.
    #[must_use]
    pub const fn cart(&self) -> Option<&Cart> {
        match self {
            Self::Empty => None,
            Self::Active(cart) => Some(cart),
        }
    }

    /// Whether there is no active cart.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// The restaurant the cart is bound to.
    #[must_use]
    pub fn restaurant_id(&self) -> Option<RestaurantId> {
        self.cart().map(|cart| cart.restaurant_id)
    }

    /// Total price, zero when empty.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.cart().map_or(Decimal::ZERO, Cart::total_price)
    }

    /// Total quantity, zero when empty.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.cart().map_or(0, Cart::total_items)
    }
}

impl From<Option<Cart>> for CartState {
    /// A cart without items collapses to `Empty`.
    fn from(cart: Option<Cart>) -> Self {
        match cart {
            Some(cart) if !cart.items.is_empty() => Self::Active(cart),
            _ => Self::Empty,
        }
    }
}

/// An add-to-cart request for another restaurant, waiting for the user to
/// confirm that the current cart should be discarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingReplacement {
    pub restaurant_id: RestaurantId,
    pub restaurant_name: String,
    pub item: CartItem,
}

/// Whether `total` reaches `min_order`, within [`MIN_ORDER_EPSILON`].
///
/// No minimum means delivery is always available.
#[must_use]
pub fn meets_min_order(total: Decimal, min_order: Option<Decimal>) -> bool {
    min_order.is_none_or(|min| total + MIN_ORDER_EPSILON >= min)
}

/// How much is missing to reach `min_order`, never negative.
///
/// Shortfalls inside [`MIN_ORDER_EPSILON`] count as zero.
#[must_use]
pub fn amount_to_min_order(total: Decimal, min_order: Decimal) -> Decimal {
    if meets_min_order(total, Some(min_order)) {
        Decimal::ZERO
    } else {
        min_order - total
    }
}

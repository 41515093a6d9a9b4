//! Cart state machine.
//!
//! # Invariants
//!
//! - At most one restaurant's items are in the cart at any time.
//! - Every item has a quantity of at least 1; an item that would reach zero
//!   is removed, and a cart that loses its last item becomes `Empty`.
//!
//! # Replacing the cart
//!
//! Adding an item from a different restaurant does not touch the cart.
//! Instead the request is staged as a [`PendingReplacement`] and the caller
//! is told to ask the user. [`CartService::confirm_replace`] swaps the cart
//! for one holding only the staged item; [`CartService::cancel_replace`]
//! drops the request and raises a short-lived "canceled item" signal so that
//! optimistic quantity controls can resynchronize.
//!
//! Every accepted transition is written to the [`CartRepository`] before the
//! call returns. Write failures are logged and do not fail the transition.

use std::sync::Arc;

use chrono::Duration;
use grubline_core::cart::{MAX_QUANTITY, amount_to_min_order, meets_min_order};
use grubline_core::{
    Cart, CartItem, CartState, Clock, Language, MenuItemId, PendingReplacement, RestaurantId,
};
use rust_decimal::Decimal;
use tracing::{debug, info, instrument};

use super::transient::Transient;
use crate::error::add_breadcrumb;
use crate::i18n::{Localizer, keys};
use crate::storage::CartRepository;

/// How long the canceled-item signal stays raised.
pub const CANCELED_ITEM_SIGNAL_MS: i64 = 100;

/// How long the "switched restaurant" notice stays visible.
pub const SWITCH_NOTICE_MS: i64 = 3_000;

/// Result of [`CartService::add_item`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum AddOutcome {
    /// The item is in the cart.
    Added,
    /// The cart belongs to another restaurant; the request is staged until
    /// the user confirms or cancels.
    ReplacementRequired(PendingReplacement),
    /// Out-of-range quantities or prices, and merges past the quantity
    /// limit, are dropped.
    Ignored,
}

/// One-shot informational notice about the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartNotice {
    /// The cart was replaced by one from this restaurant.
    SwitchedRestaurant { restaurant_name: String },
}

impl CartNotice {
    /// Display text in `language`.
    #[must_use]
    pub fn message(&self, localizer: &Localizer, language: Language) -> String {
        match self {
            Self::SwitchedRestaurant { restaurant_name } => localizer.format(
                keys::CART_SWITCHED_RESTAURANT,
                language,
                &[("restaurant", restaurant_name)],
            ),
        }
    }
}

/// Minimum order amount of the restaurant whose menu is being ordered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MinOrderThreshold {
    restaurant_id: RestaurantId,
    amount: Decimal,
}

/// Owns the single active cart.
#[derive(Debug)]
pub struct CartService<R> {
    state: CartState,
    pending: Option<PendingReplacement>,
    notice: Option<Transient<CartNotice>>,
    canceled_item: Option<Transient<MenuItemId>>,
    min_order: Option<MinOrderThreshold>,
    repository: R,
    clock: Arc<dyn Clock>,
}

impl<R: CartRepository> CartService<R> {
    /// Rehydrate the cart from `repository`.
    pub fn load(repository: R, clock: Arc<dyn Clock>) -> Self {
        let state = repository.load();
        debug!(
            restaurant_id = ?state.restaurant_id(),
            total_items = state.total_items(),
            "Cart loaded"
        );
        Self {
            state,
            pending: None,
            notice: None,
            canceled_item: None,
            min_order: None,
            repository,
            clock,
        }
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Add `item` to the cart for `restaurant_id`.
    ///
    /// Same restaurant (or no cart): merged, summing quantities for an item
    /// already present. Different restaurant: nothing changes and the
    /// request is staged for confirmation.
    ///
    /// Items the stored cart could not be reloaded with (see
    /// [`CartItem::is_valid`]) and merges past [`MAX_QUANTITY`] are ignored.
    #[instrument(skip(self, restaurant_name, item), fields(item_id = %item.id, quantity = item.quantity))]
    pub fn add_item(
        &mut self,
        restaurant_id: RestaurantId,
        restaurant_name: impl Into<String>,
        item: CartItem,
    ) -> AddOutcome {
        if !item.is_valid() {
            debug!("Ignoring add with out-of-range quantity or price");
            return AddOutcome::Ignored;
        }

        match &mut self.state {
            CartState::Active(cart) if cart.restaurant_id != restaurant_id => {
                let pending = PendingReplacement {
                    restaurant_id,
                    restaurant_name: restaurant_name.into(),
                    item,
                };
                info!(
                    current = %cart.restaurant_id,
                    requested = %restaurant_id,
                    "Cart belongs to another restaurant, confirmation required"
                );
                self.pending = Some(pending.clone());
                return AddOutcome::ReplacementRequired(pending);
            }
            CartState::Active(cart) => {
                if !cart.merge_item(item) {
                    debug!(max = MAX_QUANTITY, "Ignoring add past the quantity limit");
                    return AddOutcome::Ignored;
                }
            }
            CartState::Empty => {
                self.state =
                    CartState::Active(Cart::new(restaurant_id, restaurant_name.into(), item));
            }
        }

        add_breadcrumb(
            "cart",
            "Item added",
            Some(&[("restaurant_id", &restaurant_id.to_string())]),
        );
        self.persist();
        AddOutcome::Added
    }

    /// Replace the cart with the staged item.
    ///
    /// Returns `false` (and does nothing) when nothing is staged.
    pub fn confirm_replace(&mut self) -> bool {
        let Some(pending) = self.pending.take() else {
            debug!("confirm_replace without a pending replacement");
            return false;
        };

        let now = self.clock.now();
        info!(
            restaurant_id = %pending.restaurant_id,
            "Cart replaced with item from another restaurant"
        );

        self.notice = Some(Transient::new(
            CartNotice::SwitchedRestaurant {
                restaurant_name: pending.restaurant_name.clone(),
            },
            now,
            Duration::milliseconds(SWITCH_NOTICE_MS),
        ));
        self.canceled_item = None;
        if self
            .min_order
            .is_some_and(|min| min.restaurant_id != pending.restaurant_id)
        {
            self.min_order = None;
        }
        self.state = CartState::Active(Cart::new(
            pending.restaurant_id,
            pending.restaurant_name,
            pending.item,
        ));

        add_breadcrumb("cart", "Cart replaced", None);
        self.persist();
        true
    }

    /// Drop the staged item without touching the cart.
    ///
    /// Returns the ID of the dropped item, which is also exposed through
    /// [`Self::canceled_item`] for [`CANCELED_ITEM_SIGNAL_MS`].
    pub fn cancel_replace(&mut self) -> Option<MenuItemId> {
        let pending = self.pending.take()?;
        let item_id = pending.item.id;

        debug!(%item_id, "Cart replacement canceled");
        self.canceled_item = Some(Transient::new(
            item_id,
            self.clock.now(),
            Duration::milliseconds(CANCELED_ITEM_SIGNAL_MS),
        ));
        Some(item_id)
    }

    /// Set an item's quantity. Zero or less removes the item; more than
    /// [`MAX_QUANTITY`] is rejected.
    ///
    /// Returns whether the cart changed.
    pub fn update_item_quantity(&mut self, item_id: MenuItemId, quantity: i64) -> bool {
        if quantity <= 0 {
            return self.remove_item(item_id);
        }
        let Some(quantity) = u32::try_from(quantity)
            .ok()
            .filter(|quantity| *quantity <= MAX_QUANTITY)
        else {
            debug!(%item_id, quantity, max = MAX_QUANTITY, "Rejecting quantity above the limit");
            return false;
        };

        let CartState::Active(cart) = &mut self.state else {
            return false;
        };
        if !cart.set_quantity(item_id, quantity) {
            return false;
        }

        self.persist();
        true
    }

    /// Remove an item. Removing the last one empties the cart.
    ///
    /// Returns whether the cart changed.
    pub fn remove_item(&mut self, item_id: MenuItemId) -> bool {
        let CartState::Active(cart) = &mut self.state else {
            return false;
        };
        if cart.remove_item(item_id).is_none() {
            return false;
        }

        if cart.items().is_empty() {
            debug!("Last item removed, cart is now empty");
            self.state = CartState::Empty;
            self.min_order = None;
        }

        self.persist();
        true
    }

    /// Empty the cart and reset every cart-scoped value.
    pub fn clear_cart(&mut self) {
        self.state = CartState::Empty;
        self.pending = None;
        self.notice = None;
        self.canceled_item = None;
        self.min_order = None;

        add_breadcrumb("cart", "Cart cleared", None);
        self.persist();
    }

    /// Record the minimum order amount of the restaurant being ordered from.
    ///
    /// `None` means the restaurant has no minimum.
    pub fn set_min_order_amount(&mut self, restaurant_id: RestaurantId, amount: Option<Decimal>) {
        self.min_order = amount.map(|amount| MinOrderThreshold {
            restaurant_id,
            amount,
        });
    }

    /// Hide the current notice before it expires.
    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &CartState {
        &self.state
    }

    /// The active cart, if any.
    #[must_use]
    pub const fn cart(&self) -> Option<&Cart> {
        self.state.cart()
    }

    /// Quantity of an item in the cart, zero when absent.
    #[must_use]
    pub fn quantity_of(&self, item_id: MenuItemId) -> u32 {
        self.cart()
            .and_then(|cart| cart.item(item_id))
            .map_or(0, |item| item.quantity)
    }

    /// Sum of `(unit price + option prices) * quantity` over all items.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.state.total_price()
    }

    /// Sum of quantities.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.state.total_items()
    }

    /// Whether the total reaches `min_order`, within one hundredth of a unit.
    #[must_use]
    pub fn is_delivery_available(&self, min_order: Option<Decimal>) -> bool {
        meets_min_order(self.total_price(), min_order)
    }

    /// Amount missing to reach `min_order`, never negative.
    #[must_use]
    pub fn amount_to_min_order(&self, min_order: Decimal) -> Decimal {
        amount_to_min_order(self.total_price(), min_order)
    }

    /// Minimum order amount applying to the current cart.
    ///
    /// A threshold recorded for another restaurant does not apply.
    #[must_use]
    pub fn min_order_amount(&self) -> Option<Decimal> {
        let min = self.min_order?;
        match self.state.restaurant_id() {
            Some(id) if id != min.restaurant_id => None,
            _ => Some(min.amount),
        }
    }

    /// [`Self::is_delivery_available`] against the recorded threshold.
    #[must_use]
    pub fn delivery_available(&self) -> bool {
        self.is_delivery_available(self.min_order_amount())
    }

    /// [`Self::amount_to_min_order`] against the recorded threshold.
    #[must_use]
    pub fn amount_to_recorded_min_order(&self) -> Decimal {
        self.min_order_amount()
            .map_or(Decimal::ZERO, |min| self.amount_to_min_order(min))
    }

    /// The staged cross-restaurant add, while the prompt is open.
    #[must_use]
    pub const fn pending_replacement(&self) -> Option<&PendingReplacement> {
        self.pending.as_ref()
    }

    /// The one-shot notice, until it expires or is dismissed.
    #[must_use]
    pub fn notice(&self) -> Option<&CartNotice> {
        self.notice.as_ref()?.get(self.clock.now())
    }

    /// ID of the item whose replacement was just canceled, briefly.
    #[must_use]
    pub fn canceled_item(&self) -> Option<MenuItemId> {
        self.canceled_item
            .as_ref()?
            .get(self.clock.now())
            .copied()
    }

    fn persist(&self) {
        if let Err(e) = self.repository.save(&self.state) {
            tracing::error!(error = %e, "Failed to persist cart");
        }
    }
}

//! Catalog browsing commands.

use grubline_core::{CategoryId, FranchiseId, RestaurantId};
use grubline_storefront::catalog::{CategoryFilter, MenuItem, NearbyQuery, Restaurant};
use grubline_storefront::error::AppError;
use grubline_storefront::i18n::keys;
use grubline_storefront::state::AppState;

use super::won;

/// Filters of `grubline restaurants`.
pub struct NearbyFilter {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub category_id: Option<CategoryId>,
    pub category: Option<String>,
    pub franchise: Option<FranchiseId>,
}

impl NearbyFilter {
    /// Explicit coordinates win; otherwise the saved address's.
    fn into_query(self, state: &AppState) -> NearbyQuery {
        let mut query = match (self.lat, self.lng, state.address().address()) {
            (Some(lat), Some(lng), _) => NearbyQuery::at(lat, lng),
            (_, _, Some(address)) => NearbyQuery::around(address),
            _ => NearbyQuery::default(),
        };
        if let Some(id) = self.category_id {
            query = query.with_category(CategoryFilter::Id(id));
        } else if let Some(name) = self.category {
            query = query.with_category(CategoryFilter::Name(name));
        }
        if let Some(franchise) = self.franchise {
            query = query.with_franchise(franchise);
        }
        query
    }
}

fn print_restaurant_line(restaurant: &Restaurant) {
    let min_order = restaurant
        .min_order_amount
        .map_or_else(|| "no minimum".to_string(), |min| format!("min {}", won(min)));
    let distance = restaurant
        .distance_km
        .map(|km| format!(", {km:.1} km"))
        .unwrap_or_default();
    let closed = if restaurant.is_open { "" } else { " [closed]" };
    println!(
        "{:>6}  {}{closed}  ({min_order}, delivery {}{distance})",
        restaurant.id.as_i64(),
        restaurant.name,
        won(restaurant.delivery_fee),
    );
}

fn print_menu_item(item: &MenuItem) {
    let unavailable = if item.is_available { "" } else { " [sold out]" };
    println!("{:>6}  {}  {}{unavailable}", item.id.as_i64(), item.name, item.price);
    if let Some(description) = &item.description {
        println!("        {description}");
    }
    for option in &item.options {
        let required = if option.required { " (required)" } else { "" };
        println!("        - {}{required}", option.name);
        for choice in &option.items {
            println!("            {:>6}  {}  +{}", choice.id.as_i64(), choice.name, won(choice.price));
        }
    }
}

pub async fn restaurants(state: &AppState, filter: NearbyFilter) -> Result<(), AppError> {
    let query = filter.into_query(state);
    let restaurants = state.catalog().try_nearby_restaurants(&query).await?;
    if restaurants.is_empty() {
        println!("No restaurants found.");
    }
    for restaurant in &restaurants {
        print_restaurant_line(restaurant);
    }
    Ok(())
}

pub async fn restaurant(state: &AppState, id: RestaurantId) -> Result<(), AppError> {
    let restaurant = state
        .catalog()
        .try_restaurant(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("restaurant {id}")))?;

    print_restaurant_line(&restaurant);
    if let Some(description) = &restaurant.description {
        println!("\n{description}");
    }
    if let Some(rating) = restaurant.rating {
        println!("\nRating {rating:.1} ({} reviews)", restaurant.review_count);
    }
    Ok(())
}

pub async fn menu(state: &mut AppState, restaurant_id: RestaurantId) -> Result<(), AppError> {
    let restaurant = state.catalog().try_restaurant(restaurant_id).await?;
    let items = state.catalog().try_menus(restaurant_id).await?;

    if let Some(restaurant) = &restaurant {
        println!("{}\n", restaurant.name);
        state
            .cart_mut()
            .set_min_order_amount(restaurant_id, restaurant.min_order_amount);
    }

    let mut section: Option<&str> = None;
    for item in &items {
        if item.section.as_deref() != section {
            section = item.section.as_deref();
            if let Some(name) = section {
                println!("[{name}]");
            }
        }
        print_menu_item(item);
    }

    if let Some(min) = state.cart().min_order_amount()
        && state.cart().state().restaurant_id() == Some(restaurant_id)
        && !state.cart().delivery_available()
    {
        println!(
            "\n{} ({})",
            state.format_message(
                keys::CART_MIN_ORDER_REMAINING,
                &[("amount", &won(state.cart().amount_to_min_order(min)))],
            ),
            won(min),
        );
    }
    Ok(())
}

pub async fn chains(state: &AppState) -> Result<(), AppError> {
    for chain in state.catalog().try_popular_chains().await? {
        println!("{:>6}  {}", chain.id.as_i64(), chain.name);
    }
    Ok(())
}

pub async fn categories(state: &AppState) -> Result<(), AppError> {
    for category in state.catalog().try_categories().await? {
        println!("{:>6}  {}", category.id.as_i64(), category.name);
    }
    Ok(())
}

//! Grubline CLI - browse restaurants, build a cart and check out.
//!
//! # Usage
//!
//! ```bash
//! # Restaurants near the saved address (or explicit coordinates)
//! grubline restaurants --category chicken
//! grubline restaurants --lat 37.57 --lng 126.98
//!
//! # A restaurant's menu, in Korean
//! grubline --lang ko menu 12
//!
//! # Cart
//! grubline cart add 12 305 --qty 2 --option 9001
//! grubline cart set 305 1
//! grubline cart show
//!
//! # Address and checkout
//! grubline address set "12 Sejong-daero" --detail "Apt 301" --lat 37.57 --lng 126.98
//! grubline checkout
//! grubline checkout --payment-ref PAY-8841 --email me@grubline.app
//! ```
//!
//! # Commands
//!
//! - `restaurants`, `restaurant`, `menu`, `chains`, `categories` - Catalog reads
//! - `cart` - Show and edit the cart
//! - `address` - Manage the delivery address
//! - `checkout` - Show the payment breakdown or place the order

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use grubline_core::{CategoryId, FranchiseId, Language, MenuItemId, OptionItemId, RestaurantId};
use grubline_storefront::config::StorefrontConfig;
use grubline_storefront::error::AppError;
use grubline_storefront::state::AppState;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "grubline")]
#[command(author, version, about = "Grubline food-ordering storefront")]
struct Cli {
    /// Display language (en, ko, ja, zh); defaults to `GRUBLINE_LANGUAGE`
    #[arg(long, global = true)]
    lang: Option<Language>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List restaurants near a point
    Restaurants {
        /// Latitude; defaults to the saved address
        #[arg(long, requires = "lng")]
        lat: Option<f64>,

        /// Longitude; defaults to the saved address
        #[arg(long, requires = "lat")]
        lng: Option<f64>,

        /// Filter by category ID
        #[arg(long, conflicts_with = "category")]
        category_id: Option<CategoryId>,

        /// Filter by category name
        #[arg(long)]
        category: Option<String>,

        /// Filter by restaurant chain
        #[arg(long)]
        franchise: Option<FranchiseId>,
    },
    /// Show one restaurant
    Restaurant {
        id: RestaurantId,
    },
    /// Show a restaurant's menu
    Menu {
        restaurant_id: RestaurantId,
    },
    /// List popular restaurant chains
    Chains,
    /// List food categories
    Categories,
    /// Show or edit the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Manage the delivery address
    Address {
        #[command(subcommand)]
        action: AddressAction,
    },
    /// Show the payment breakdown, or place the order for a captured payment
    Checkout {
        /// Reference of the captured payment
        #[arg(long, conflicts_with = "payment_failed")]
        payment_ref: Option<String>,

        /// Report a failed payment with this message
        #[arg(long)]
        payment_failed: Option<String>,

        /// Contact email for the order
        #[arg(long)]
        email: Option<String>,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart
    Show,
    /// Add a menu item
    Add {
        restaurant_id: RestaurantId,
        menu_item_id: MenuItemId,

        /// Quantity to add
        #[arg(short, long, default_value_t = 1)]
        qty: u32,

        /// Chosen option item (repeatable)
        #[arg(short, long = "option")]
        options: Vec<OptionItemId>,

        /// Replace a cart from another restaurant without asking
        #[arg(short, long)]
        yes: bool,
    },
    /// Set an item's quantity (0 removes it)
    Set {
        menu_item_id: MenuItemId,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove an item
    Remove {
        menu_item_id: MenuItemId,
    },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum AddressAction {
    /// Show the delivery address
    Show,
    /// Validate and save a delivery address locally
    Set {
        main_address: String,

        /// Unit, floor, building name
        #[arg(long, default_value = "")]
        detail: String,

        #[arg(long, requires = "lng")]
        lat: Option<f64>,

        #[arg(long, requires = "lat")]
        lng: Option<f64>,
    },
    /// Validate and save a delivery address on the server
    Create {
        main_address: String,

        #[arg(long, default_value = "")]
        detail: String,

        #[arg(long, requires = "lng")]
        lat: Option<f64>,

        #[arg(long, requires = "lat")]
        lng: Option<f64>,
    },
    /// List addresses saved on the server
    List,
    /// Forget the delivery address
    Clear,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    // Quiet by default: command output goes to stdout, logs to stderr
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "grubline=warn,grubline_storefront=warn".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing();
            tracing::error!(error = %e, "Failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);
    init_tracing();

    let mut state = match AppState::from_config(&config) {
        Ok(state) => state,
        Err(e) => {
            e.report();
            return ExitCode::FAILURE;
        }
    };
    if let Some(lang) = cli.lang {
        state.set_language(lang);
    }

    match run(&mut state, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            e.report();
            commands::print_error(&state, &e);
            ExitCode::FAILURE
        }
    }
}

async fn run(state: &mut AppState, command: Commands) -> Result<(), AppError> {
    match command {
        Commands::Restaurants {
            lat,
            lng,
            category_id,
            category,
            franchise,
        } => {
            let filter = commands::browse::NearbyFilter {
                lat,
                lng,
                category_id,
                category,
                franchise,
            };
            commands::browse::restaurants(state, filter).await
        }
        Commands::Restaurant { id } => commands::browse::restaurant(state, id).await,
        Commands::Menu { restaurant_id } => commands::browse::menu(state, restaurant_id).await,
        Commands::Chains => commands::browse::chains(state).await,
        Commands::Categories => commands::browse::categories(state).await,
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(state).await,
            CartAction::Add {
                restaurant_id,
                menu_item_id,
                qty,
                options,
                yes,
            } => {
                let request = commands::cart::AddRequest {
                    restaurant_id,
                    menu_item_id,
                    quantity: qty,
                    options,
                    assume_yes: yes,
                };
                commands::cart::add(state, request).await
            }
            CartAction::Set {
                menu_item_id,
                quantity,
            } => commands::cart::set(state, menu_item_id, quantity).await,
            CartAction::Remove { menu_item_id } => {
                commands::cart::set(state, menu_item_id, 0).await
            }
            CartAction::Clear => {
                commands::cart::clear(state);
                Ok(())
            }
        },
        Commands::Address { action } => match action {
            AddressAction::Show => {
                commands::address::show(state);
                Ok(())
            }
            AddressAction::Set {
                main_address,
                detail,
                lat,
                lng,
            } => commands::address::set(state, &main_address, &detail, lat.zip(lng)),
            AddressAction::Create {
                main_address,
                detail,
                lat,
                lng,
            } => commands::address::create(state, &main_address, &detail, lat.zip(lng)).await,
            AddressAction::List => commands::address::list(state).await,
            AddressAction::Clear => {
                commands::address::clear(state);
                Ok(())
            }
        },
        Commands::Checkout {
            payment_ref,
            payment_failed,
            email,
        } => {
            let request = commands::checkout::CheckoutRequest {
                payment_ref,
                payment_failed,
                email,
            };
            commands::checkout::run(state, request).await
        }
    }
}

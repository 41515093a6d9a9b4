//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type for the front ends. Server-class
//! failures are captured to Sentry with [`AppError::report`]; everything is
//! shown to the user through [`AppError::user_message`], which never exposes
//! internal details.

use grubline_core::{AddressError, EmailError, Language, UnsupportedLanguage};
use thiserror::Error;

use crate::api::{ApiError, TransportError};
use crate::config::ConfigError;
use crate::i18n::{Localizer, keys};
use crate::services::CheckoutError;
use crate::storage::StorageError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Durable storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The API transport could not be set up or used.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// An API call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Address validation failed.
    #[error("Invalid address: {0}")]
    Address(#[from] AddressError),

    /// Email validation failed.
    #[error("Invalid email: {0}")]
    Email(#[from] EmailError),

    /// Checkout could not proceed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Unknown language code.
    #[error(transparent)]
    Language(#[from] UnsupportedLanguage),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad input from the user.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether this failure is on our side rather than the user's.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        match self {
            Self::Config(_) | Self::Storage(_) | Self::Transport(_) | Self::Internal(_) => true,
            Self::Api(e) | Self::Checkout(CheckoutError::Api(e)) => match e.status {
                Some(status) => status >= 500,
                None => true,
            },
            _ => false,
        }
    }

    /// Log the error and capture server-class failures to Sentry.
    pub fn report(&self) {
        if self.is_server_error() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Storefront error"
            );
        } else {
            tracing::warn!(error = %self, "Storefront error");
        }
    }

    /// Message safe to show the user, in `language`.
    #[must_use]
    pub fn user_message(&self, localizer: &Localizer, language: Language) -> String {
        match self {
            Self::Config(_) | Self::Storage(_) | Self::Internal(_) => {
                "Something went wrong. Please try again later.".to_string()
            }
            Self::Transport(_) => localizer.resolve(keys::LOAD_FAILED, language).to_string(),
            Self::Api(e) => api_message(e, localizer, language),
            Self::Address(_) => localizer.resolve(keys::ADDRESS_INVALID, language).to_string(),
            Self::Email(_) => localizer.resolve(keys::EMAIL_INVALID, language).to_string(),
            Self::Checkout(e) => match e {
                CheckoutError::EmptyCart => localizer.resolve(keys::CART_EMPTY, language).to_string(),
                CheckoutError::AddressRequired => {
                    localizer.resolve(keys::ADDRESS_REQUIRED, language).to_string()
                }
                CheckoutError::BelowMinOrder { .. } => localizer
                    .resolve(keys::CHECKOUT_BELOW_MIN_ORDER, language)
                    .to_string(),
                CheckoutError::PaymentFailed(reason) => localizer.format(
                    keys::CHECKOUT_PAYMENT_FAILED,
                    language,
                    &[("reason", reason)],
                ),
                CheckoutError::Api(e) => api_message(e, localizer, language),
                CheckoutError::InvalidRate(_) | CheckoutError::CartChanged => {
                    "Something went wrong. Please try again later.".to_string()
                }
            },
            Self::Language(e) => e.to_string(),
            Self::NotFound(what) => format!("Not found: {what}"),
            Self::BadRequest(message) => message.clone(),
        }
    }
}

/// Client errors carry a message meant for the user; server errors do not.
fn api_message(error: &ApiError, localizer: &Localizer, language: Language) -> String {
    match error.status {
        Some(status) if (400..500).contains(&status) && status != 429 => error.message.clone(),
        _ => localizer.resolve(keys::LOAD_FAILED, language).to_string(),
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Item added", Some(&[("restaurant_id", "12")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn api(status: Option<u16>, message: &str) -> ApiError {
        ApiError {
            message: message.to_string(),
            code: None,
            status,
        }
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("restaurant 12".to_string());
        assert_eq!(err.to_string(), "Not found: restaurant 12");

        let err = AppError::from(AddressError::EmptyMainAddress);
        assert_eq!(err.to_string(), "Invalid address: main address cannot be empty");
    }

    #[test]
    fn test_server_error_classification() {
        assert!(AppError::Internal("x".to_string()).is_server_error());
        assert!(AppError::Api(api(Some(502), "bad gateway")).is_server_error());
        assert!(AppError::Api(api(None, "connection reset")).is_server_error());
        assert!(!AppError::Api(api(Some(422), "out of area")).is_server_error());
        assert!(!AppError::from(AddressError::EmptyMainAddress).is_server_error());
        assert!(!AppError::Checkout(CheckoutError::EmptyCart).is_server_error());
    }

    #[test]
    fn test_user_message_hides_internals() {
        let localizer = Localizer::new();
        let msg = AppError::Internal("pool exhausted at 0x7f".to_string())
            .user_message(&localizer, Language::En);
        assert!(!msg.contains("0x7f"));

        let msg = AppError::Api(api(Some(500), "NullPointerException in OrderController"))
            .user_message(&localizer, Language::En);
        assert_eq!(msg, "Failed to load. Please try again.");
    }

    #[test]
    fn test_user_message_passes_client_errors_through() {
        let msg = AppError::Api(api(Some(422), "Address is outside the delivery area"))
            .user_message(&Localizer::new(), Language::En);
        assert_eq!(msg, "Address is outside the delivery area");
    }

    #[test]
    fn test_user_message_is_localized() {
        let localizer = Localizer::new();
        let err = AppError::Checkout(CheckoutError::BelowMinOrder {
            missing: Decimal::from(3000),
        });
        assert_eq!(
            err.user_message(&localizer, Language::Ko),
            "최소 주문 금액을 채워 주세요"
        );

        let err = AppError::Checkout(CheckoutError::PaymentFailed("card declined".to_string()));
        assert_eq!(
            err.user_message(&localizer, Language::En),
            "Payment failed: card declined"
        );
    }
}

//! Application state bundle.

use std::sync::Arc;

use grubline_core::{Address, AddressDraft, Clock, Email, Language, SystemClock};
use tracing::info;

use crate::api::{HttpTransport, Transport};
use crate::cache::ResponseCache;
use crate::catalog::{CatalogService, OrderConfirmation};
use crate::config::{CurrencyConfig, StorefrontConfig};
use crate::error::AppError;
use crate::i18n::{LanguageContext, Localizer};
use crate::services::{
    AddressService, CartService, CheckoutError, PaymentOutcome, PaymentRequest,
    build_payment_request, complete_order,
};
use crate::storage::{JsonFileStore, KeyValueStore, KvAddressRepository, KvCartRepository};

/// Everything a front end needs: catalog reads, the cart, the address and
/// message localization.
///
/// The cart and address are owned here and mutated through `&mut self`.
pub struct AppState<T = HttpTransport, S = JsonFileStore> {
    catalog: CatalogService<T>,
    cart: CartService<KvCartRepository<S>>,
    address: AddressService<KvAddressRepository<S>>,
    localizer: Localizer,
    currency: CurrencyConfig,
}

impl AppState {
    /// Build the production state from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP transport cannot be built.
    pub fn from_config(config: &StorefrontConfig) -> Result<Self, AppError> {
        let transport = HttpTransport::new(
            &config.api.base_url,
            config.api.token.clone(),
            config.api.timeout,
        )?;
        let store = JsonFileStore::new(&config.data_dir);
        info!(data_dir = %config.data_dir.display(), "Using file store");

        Ok(Self::new(
            transport,
            store,
            Arc::new(SystemClock),
            config.language,
            config.cache_ttl,
            config.currency,
        ))
    }
}

impl<T: Transport, S: KeyValueStore + Clone> AppState<T, S> {
    /// Assemble state from its parts and rehydrate the cart and address.
    #[must_use]
    pub fn new(
        transport: T,
        store: S,
        clock: Arc<dyn Clock>,
        language: Language,
        cache_ttl: chrono::Duration,
        currency: CurrencyConfig,
    ) -> Self {
        let cache = ResponseCache::new(Arc::clone(&clock), cache_ttl);
        let catalog = CatalogService::new(transport, cache, LanguageContext::new(language));

        Self {
            catalog,
            cart: CartService::load(KvCartRepository::new(store.clone()), clock),
            address: AddressService::load(KvAddressRepository::new(store)),
            localizer: Localizer::new(),
            currency,
        }
    }

    #[must_use]
    pub const fn catalog(&self) -> &CatalogService<T> {
        &self.catalog
    }

    #[must_use]
    pub const fn cart(&self) -> &CartService<KvCartRepository<S>> {
        &self.cart
    }

    pub const fn cart_mut(&mut self) -> &mut CartService<KvCartRepository<S>> {
        &mut self.cart
    }

    #[must_use]
    pub const fn address(&self) -> &AddressService<KvAddressRepository<S>> {
        &self.address
    }

    pub const fn address_mut(&mut self) -> &mut AddressService<KvAddressRepository<S>> {
        &mut self.address
    }

    #[must_use]
    pub const fn localizer(&self) -> &Localizer {
        &self.localizer
    }

    #[must_use]
    pub const fn currency(&self) -> CurrencyConfig {
        self.currency
    }

    /// The active display language.
    #[must_use]
    pub fn language(&self) -> Language {
        self.catalog.language().current()
    }

    /// Switch the display language; cached responses of the old one are
    /// dropped.
    pub fn set_language(&self, language: Language) -> Option<Language> {
        self.catalog.set_language(language)
    }

    /// Message `key` in the active language.
    #[must_use]
    pub fn message(&self, key: &str) -> String {
        self.localizer.resolve(key, self.language()).to_owned()
    }

    /// Message `key` in the active language with `{name}` placeholders
    /// substituted.
    #[must_use]
    pub fn format_message(&self, key: &str, args: &[(&str, &str)]) -> String {
        self.localizer.format(key, self.language(), args)
    }

    /// Validate `draft`, save it on the server and keep it as the delivery
    /// address with the server-assigned ID.
    ///
    /// # Errors
    ///
    /// Returns the validation failure (nothing stored) or the API failure
    /// (the address is kept locally without an ID).
    pub async fn save_address(&mut self, draft: &AddressDraft) -> Result<Address, AppError> {
        let address = self.address.save_validated(draft)?;
        let created = self.catalog.create_address(&address).await?;
        self.address.set_address_id(created.id);
        Ok(self
            .address
            .address()
            .cloned()
            .unwrap_or(address))
    }

    /// Payment request for the current cart.
    ///
    /// # Errors
    ///
    /// See [`build_payment_request`].
    pub fn payment_request(&self) -> Result<PaymentRequest, CheckoutError> {
        build_payment_request(&self.cart, &self.address, self.currency.krw_per_usd)
    }

    /// Submit the order for `outcome` and clear the cart on success.
    ///
    /// # Errors
    ///
    /// See [`complete_order`].
    pub async fn complete_order(
        &mut self,
        payment: &PaymentRequest,
        outcome: PaymentOutcome,
        contact_email: Option<Email>,
    ) -> Result<OrderConfirmation, CheckoutError> {
        complete_order(
            &self.catalog,
            &mut self.cart,
            &self.address,
            payment,
            outcome,
            contact_email,
        )
        .await
    }
}

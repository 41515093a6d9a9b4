//! Delivery address holder.

use grubline_core::{Address, AddressDraft, AddressError, AddressId};
use tracing::{debug, info};

use crate::storage::AddressRepository;

/// Holds the user's single delivery address and mirrors it to storage.
#[derive(Debug)]
pub struct AddressService<R> {
    address: Option<Address>,
    repository: R,
}

impl<R: AddressRepository> AddressService<R> {
    /// Rehydrate the address from `repository`.
    pub fn load(repository: R) -> Self {
        let address = repository.load();
        debug!(present = address.is_some(), "Address loaded");
        Self {
            address,
            repository,
        }
    }

    /// The stored address, if any.
    #[must_use]
    pub const fn address(&self) -> Option<&Address> {
        self.address.as_ref()
    }

    /// Whether an address exists and was saved through validation.
    ///
    /// Completeness is the stored flag; field contents are not re-checked.
    #[must_use]
    pub fn is_address_set(&self) -> bool {
        self.address.as_ref().is_some_and(|a| a.is_complete)
    }

    /// Replace the address as given.
    pub fn set_address(&mut self, address: Address) {
        self.address = Some(address);
        self.persist();
    }

    /// Validate `draft` and store the result as a complete address.
    ///
    /// # Errors
    ///
    /// Returns the validation failure; the stored address is unchanged.
    pub fn save_validated(&mut self, draft: &AddressDraft) -> Result<Address, AddressError> {
        let address = draft.validate()?;
        info!("Delivery address saved");
        self.set_address(address.clone());
        Ok(address)
    }

    /// Attach the server-assigned ID. Does nothing without an address.
    pub fn set_address_id(&mut self, id: AddressId) {
        let Some(address) = self.address.as_mut() else {
            debug!(%id, "No address to attach ID to");
            return;
        };
        address.address_id = Some(id);
        self.persist();
    }

    /// Forget the address and remove the stored record.
    pub fn clear_address(&mut self) {
        self.address = None;
        self.persist();
    }

    fn persist(&self) {
        if let Err(e) = self.repository.save(self.address.as_ref()) {
            tracing::error!(error = %e, "Failed to persist address");
        }
    }
}

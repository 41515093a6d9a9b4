//! Delivery address types.

use serde::{Deserialize, Serialize};

use super::id::AddressId;

/// Errors that can occur when validating an [`AddressDraft`].
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum AddressError {
    /// The main address line is empty or whitespace.
    #[error("main address cannot be empty")]
    EmptyMainAddress,
    /// The main address line is too long.
    #[error("main address must be at most {max} characters")]
    MainAddressTooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The detail line (unit, floor) is too long.
    #[error("detail address must be at most {max} characters")]
    DetailAddressTooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// Latitude outside [-90, 90].
    #[error("latitude {0} is out of range")]
    InvalidLatitude(f64),
    /// Longitude outside [-180, 180].
    #[error("longitude {0} is out of range")]
    InvalidLongitude(f64),
    /// Only one of latitude and longitude was given.
    #[error("latitude and longitude must be given together")]
    IncompleteCoordinates,
}

/// The delivery address an order is composed against.
///
/// `is_complete` is set only when a draft passes validation and is saved; it
/// is never derived from the field contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub main_address: String,
    #[serde(default)]
    pub detail_address: String,
    #[serde(default)]
    pub is_complete: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_id: Option<AddressId>,
}

/// Address fields as entered by the user, before validation.
///
/// ## Constraints
///
/// - Main address: 1-200 characters after trimming
/// - Detail address: at most 100 characters after trimming, may be empty
/// - Coordinates: both or neither, within WGS84 ranges
///
/// ## Examples
///
/// ```
/// use grubline_core::AddressDraft;
///
/// let draft = AddressDraft::new("12 Teheran-ro, Gangnam-gu", "Apt 301");
/// let address = draft.validate().unwrap();
/// assert!(address.is_complete);
///
/// assert!(AddressDraft::new("   ", "Apt 301").validate().is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressDraft {
    pub main_address: String,
    #[serde(default)]
    pub detail_address: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
}

impl AddressDraft {
    /// Maximum length of the main address line.
    pub const MAX_MAIN_LENGTH: usize = 200;
    /// Maximum length of the detail line.
    pub const MAX_DETAIL_LENGTH: usize = 100;

    /// Draft without coordinates.
    #[must_use]
    pub fn new(main_address: impl Into<String>, detail_address: impl Into<String>) -> Self {
        Self {
            main_address: main_address.into(),
            detail_address: detail_address.into(),
            lat: None,
            lng: None,
        }
    }

    /// Attach map coordinates.
    #[must_use]
    pub const fn with_coordinates(mut self, lat: f64, lng: f64) -> Self {
        self.lat = Some(lat);
        self.lng = Some(lng);
        self
    }

    /// Validate and produce a complete [`Address`].
    ///
    /// # Errors
    ///
    /// Returns the first constraint the draft violates.
    pub fn validate(&self) -> Result<Address, AddressError> {
        let main = self.main_address.trim();
        if main.is_empty() {
            return Err(AddressError::EmptyMainAddress);
        }
        if main.chars().count() > Self::MAX_MAIN_LENGTH {
            return Err(AddressError::MainAddressTooLong {
                max: Self::MAX_MAIN_LENGTH,
            });
        }

        let detail = self.detail_address.trim();
        if detail.chars().count() > Self::MAX_DETAIL_LENGTH {
            return Err(AddressError::DetailAddressTooLong {
                max: Self::MAX_DETAIL_LENGTH,
            });
        }

        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => {
                if !(-90.0..=90.0).contains(&lat) {
                    return Err(AddressError::InvalidLatitude(lat));
                }
                if !(-180.0..=180.0).contains(&lng) {
                    return Err(AddressError::InvalidLongitude(lng));
                }
            }
            (None, None) => {}
            _ => return Err(AddressError::IncompleteCoordinates),
        }

        Ok(Address {
            main_address: main.to_owned(),
            detail_address: detail.to_owned(),
            is_complete: true,
            lat: self.lat,
            lng: self.lng,
            address_id: None,
        })
    }
}

impl Address {
    /// Single-line form for display and order payloads.
    #[must_use]
    pub fn one_line(&self) -> String {
        if self.detail_address.is_empty() {
            self.main_address.clone()
        } else {
            format!("{}, {}", self.main_address, self.detail_address)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_trims_and_marks_complete() {
        let address = AddressDraft::new("  12 Main St ", " 3F ")
            .with_coordinates(37.5, 127.0)
            .validate()
            .unwrap();

        assert_eq!(address.main_address, "12 Main St");
        assert_eq!(address.detail_address, "3F");
        assert!(address.is_complete);
        assert_eq!(address.lat, Some(37.5));
    }

    #[test]
    fn test_validate_empty_main() {
        assert_eq!(
            AddressDraft::new("", "x").validate(),
            Err(AddressError::EmptyMainAddress)
        );
    }

    #[test]
    fn test_validate_lengths() {
        let long_main = "a".repeat(AddressDraft::MAX_MAIN_LENGTH + 1);
        assert!(matches!(
            AddressDraft::new(long_main, "").validate(),
            Err(AddressError::MainAddressTooLong { .. })
        ));

        let long_detail = "b".repeat(AddressDraft::MAX_DETAIL_LENGTH + 1);
        assert!(matches!(
            AddressDraft::new("x", long_detail).validate(),
            Err(AddressError::DetailAddressTooLong { .. })
        ));
    }

    #[test]
    fn test_validate_coordinates() {
        assert!(matches!(
            AddressDraft::new("x", "").with_coordinates(91.0, 0.0).validate(),
            Err(AddressError::InvalidLatitude(_))
        ));
        assert!(matches!(
            AddressDraft::new("x", "").with_coordinates(0.0, -181.0).validate(),
            Err(AddressError::InvalidLongitude(_))
        ));

        let mut draft = AddressDraft::new("x", "");
        draft.lat = Some(1.0);
        assert_eq!(draft.validate(), Err(AddressError::IncompleteCoordinates));
    }

    #[test]
    fn test_deserialized_incomplete_address_stays_incomplete() {
        let address: Address =
            serde_json::from_str(r#"{"mainAddress":"x","detailAddress":"y"}"#).unwrap();
        assert!(!address.is_complete);
    }

    #[test]
    fn test_one_line() {
        let mut address = AddressDraft::new("12 Main St", "").validate().unwrap();
        assert_eq!(address.one_line(), "12 Main St");
        address.detail_address = "Apt 4".to_string();
        assert_eq!(address.one_line(), "12 Main St, Apt 4");
    }
}

//! Money representation using decimal arithmetic.
//!
//! Menu prices arrive from the restaurant API in Korean won. The payment
//! widget expects US dollars with two decimal places, so conversion happens
//! once, at checkout, with a configured rate.

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (won, dollars).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a price in won.
    #[must_use]
    pub const fn krw(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::KRW)
    }

    /// Round to the currency's minor unit, half away from zero.
    #[must_use]
    pub fn rounded(self) -> Self {
        Self {
            amount: self.amount.round_dp_with_strategy(
                self.currency_code.minor_units(),
                RoundingStrategy::MidpointAwayFromZero,
            ),
            currency_code: self.currency_code,
        }
    }

    /// Convert into another currency.
    ///
    /// `units_per_target` is how many units of this price's currency buy one
    /// unit of `target` (e.g. 1350 won per dollar). The result is rounded to
    /// the target's minor unit. Returns `None` for a non-positive rate or
    /// one so small the result overflows.
    #[must_use]
    pub fn convert(self, target: CurrencyCode, units_per_target: Decimal) -> Option<Self> {
        if self.currency_code == target {
            return Some(self.rounded());
        }
        if units_per_target <= Decimal::ZERO {
            return None;
        }
        let amount = self.amount.checked_div(units_per_target)?;
        Some(Self::new(amount, target).rounded())
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self.rounded();
        match self.currency_code {
            CurrencyCode::KRW => write!(f, "₩{}", rounded.amount.normalize()),
            CurrencyCode::USD => write!(f, "${:.2}", rounded.amount),
        }
    }
}

/// ISO 4217 currency codes used by the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    KRW,
    USD,
}

impl CurrencyCode {
    /// Number of decimal places in the currency's minor unit.
    #[must_use]
    pub const fn minor_units(self) -> u32 {
        match self {
            Self::KRW => 0,
            Self::USD => 2,
        }
    }

    /// The ISO code as a string.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::KRW => "KRW",
            Self::USD => "USD",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_krw_to_usd() {
        let price = Price::krw(Decimal::from(27_000));
        let usd = price.convert(CurrencyCode::USD, Decimal::from(1350)).unwrap();
        assert_eq!(usd.amount, Decimal::new(2000, 2));
        assert_eq!(usd.currency_code, CurrencyCode::USD);
    }

    #[test]
    fn test_convert_rounds_half_away_from_zero() {
        // 1000 / 1600 = 0.625
        let price = Price::krw(Decimal::from(1000));
        let usd = price.convert(CurrencyCode::USD, Decimal::from(1600)).unwrap();
        assert_eq!(usd.amount, Decimal::new(63, 2));
    }

    #[test]
    fn test_convert_rejects_non_positive_rate() {
        let price = Price::krw(Decimal::from(1000));
        assert!(price.convert(CurrencyCode::USD, Decimal::ZERO).is_none());
    }

    #[test]
    fn test_convert_rejects_overflowing_rate() {
        let price = Price::krw(Decimal::from(1000));
        assert!(price.convert(CurrencyCode::USD, Decimal::new(1, 28)).is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(Price::krw(Decimal::from(15_000)).to_string(), "₩15000");
        assert_eq!(
            Price::new(Decimal::new(199, 1), CurrencyCode::USD).to_string(),
            "$19.90"
        );
    }
}

//! Percentage-off configuration shared by the percentage offers.

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::iso::Currency;

use crate::{
    offers::{OfferConfiguration, OfferError},
    prices::{Price, PriceError, currency_from_code},
};

/// Validated configuration for a percentage-off offer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PercentageOffConfiguration {
    percentage: Percentage,
    currency: Option<&'static Currency>,
}

impl PercentageOffConfiguration {
    /// Create a configuration from a fraction in `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns [`OfferError::InvalidConfiguration`] if `amount` is out of range.
    pub fn new(offer: &str, amount: Decimal) -> Result<Self, OfferError> {
        if amount < Decimal::ZERO || amount > Decimal::ONE {
            return Err(OfferError::invalid(
                offer,
                format!("amount {amount} must be between 0 and 1"),
            ));
        }

        Ok(Self {
            percentage: Percentage::from(amount),
            currency: None,
        })
    }

    /// Only apply to targets priced in `currency`.
    #[must_use]
    pub fn with_currency(mut self, currency: &'static Currency) -> Self {
        self.currency = Some(currency);
        self
    }

    /// Read the `amount` (and optional `currency`) parameters.
    ///
    /// # Errors
    ///
    /// Returns [`OfferError::InvalidConfiguration`] if `amount` is missing, not
    /// a decimal, or outside `[0, 1]`, or if `currency` is not an ISO code.
    pub fn from_configuration(
        offer: &str,
        configuration: &OfferConfiguration,
    ) -> Result<Self, OfferError> {
        let raw = configuration
            .parameter_str("amount")
            .ok_or_else(|| OfferError::invalid(offer, "missing amount"))?;

        let amount = raw
            .trim()
            .parse::<Decimal>()
            .map_err(|_err| OfferError::invalid(offer, format!("amount {raw:?} is not a decimal")))?;

        let config = Self::new(offer, amount)?;

        match configuration.parameter("currency") {
            None => Ok(config),
            Some(_) => {
                let code = configuration
                    .parameter_str("currency")
                    .ok_or_else(|| OfferError::invalid(offer, "currency must be a string"))?;

                let currency = currency_from_code(&code).map_err(|err| {
                    OfferError::invalid(offer, err.to_string())
                })?;

                Ok(config.with_currency(currency))
            }
        }
    }

    /// The configured fraction, e.g. `0.10` for 10% off.
    pub fn amount(&self) -> Decimal {
        self.percentage * Decimal::ONE
    }

    /// The configured percentage.
    pub fn percentage(&self) -> Percentage {
        self.percentage
    }

    /// Currency the offer is restricted to, if any.
    pub fn currency(&self) -> Option<&'static Currency> {
        self.currency
    }

    /// Fail if the offer expects a different currency than the target's.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::CurrencyMismatch`].
    pub fn ensure_currency(&self, target: &'static Currency) -> Result<(), PriceError> {
        match self.currency {
            Some(expected) if expected != target => Err(PriceError::CurrencyMismatch {
                expected: expected.iso_alpha_code,
                actual: target.iso_alpha_code,
            }),
            _ => Ok(()),
        }
    }

    /// The (negative) adjustment granted on `price`, rounded half-up.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Overflow`] if the amount cannot be represented.
    pub fn discount_on(&self, price: Price) -> Result<Price, PriceError> {
        price.multiply(self.amount())?.negate()
    }
}

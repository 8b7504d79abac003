//! Prices
//!
//! An immutable amount of money in a single currency. Amounts are held in the
//! currency's minor units, so arithmetic never touches binary floating point;
//! any operation that could produce a fraction of a minor unit rounds half-up
//! (midpoint away from zero).

use std::{fmt, str::FromStr};

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{
    Money, MoneyError,
    iso::{self, Currency},
};
use thiserror::Error;

/// Errors raised by price construction and arithmetic.
#[derive(Debug, Error, PartialEq)]
pub enum PriceError {
    /// Two prices in different currencies were combined.
    #[error("currency mismatch: expected {expected}, found {actual}")]
    CurrencyMismatch {
        /// Currency of the left-hand operand.
        expected: &'static str,

        /// Currency of the right-hand operand.
        actual: &'static str,
    },

    /// The amount could not be parsed as a decimal.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// The currency code is not a known ISO currency.
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),

    /// The result does not fit in the minor-unit representation.
    #[error("price arithmetic overflowed")]
    Overflow,

    /// Any other money arithmetic error.
    #[error(transparent)]
    Money(MoneyError),
}

impl From<MoneyError> for PriceError {
    fn from(error: MoneyError) -> Self {
        match error {
            MoneyError::CurrencyMismatch { expected, actual } => {
                Self::CurrencyMismatch { expected, actual }
            }
            other => Self::Money(other),
        }
    }
}

/// Look up an ISO currency by its alphabetic code (case-insensitive).
///
/// # Errors
///
/// Returns [`PriceError::UnknownCurrency`] if the code is not recognised.
pub fn currency_from_code(code: &str) -> Result<&'static Currency, PriceError> {
    let code = code.trim().to_ascii_uppercase();

    iso::find(&code).ok_or(PriceError::UnknownCurrency(code))
}

/// A currency-checked amount of money.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Price {
    money: Money<'static, Currency>,
}

impl Price {
    /// Create a price from an amount in minor units (e.g. cents).
    pub fn from_minor(minor: i64, currency: &'static Currency) -> Self {
        Self {
            money: Money::from_minor(minor, currency),
        }
    }

    /// A zero price in the given currency.
    pub fn zero(currency: &'static Currency) -> Self {
        Self::from_minor(0, currency)
    }

    /// Create a price from a decimal amount in major units, rounding half-up to
    /// the currency's minor unit.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Overflow`] if the amount does not fit in minor units.
    pub fn new(amount: Decimal, currency: &'static Currency) -> Result<Self, PriceError> {
        let minor = to_minor(amount, currency.exponent)?;

        Ok(Self::from_minor(minor, currency))
    }

    /// Parse a price from a decimal string and an ISO currency code, e.g.
    /// `Price::parse("20.00", "USD")`.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is not a decimal, the currency is unknown,
    /// or the amount overflows.
    pub fn parse(amount: &str, currency_code: &str) -> Result<Self, PriceError> {
        let currency = currency_from_code(currency_code)?;
        let amount = amount
            .trim()
            .parse::<Decimal>()
            .map_err(|_err| PriceError::InvalidAmount(amount.to_string()))?;

        Self::new(amount, currency)
    }

    /// Amount in minor units.
    pub fn to_minor_units(&self) -> i64 {
        self.money.to_minor_units()
    }

    /// Amount in major units, at the currency's precision.
    pub fn amount(&self) -> Decimal {
        Decimal::new(self.to_minor_units(), self.currency().exponent)
    }

    /// Currency of this price.
    pub fn currency(&self) -> &'static Currency {
        self.money.currency()
    }

    /// Returns `true` if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.to_minor_units() == 0
    }

    /// Returns `true` if the amount is below zero.
    pub fn is_negative(&self) -> bool {
        self.to_minor_units() < 0
    }

    /// Add another price in the same currency.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::CurrencyMismatch`] if the currencies differ.
    pub fn add(self, other: Price) -> Result<Price, PriceError> {
        Ok(Self::from(self.money.add(other.money)?))
    }

    /// Subtract another price in the same currency.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::CurrencyMismatch`] if the currencies differ.
    pub fn subtract(self, other: Price) -> Result<Price, PriceError> {
        Ok(Self::from(self.money.sub(other.money)?))
    }

    /// Multiply by a decimal factor, rounding half-up to the minor unit.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Overflow`] if the product cannot be represented.
    pub fn multiply(self, factor: Decimal) -> Result<Price, PriceError> {
        let product = Decimal::from(self.to_minor_units())
            .checked_mul(factor)
            .ok_or(PriceError::Overflow)?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .ok_or(PriceError::Overflow)?;

        Ok(Self::from_minor(product, self.currency()))
    }

    /// The same amount with the opposite sign.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Overflow`] for the one minor-unit value without a
    /// positive counterpart.
    pub fn negate(self) -> Result<Price, PriceError> {
        let negated = self
            .to_minor_units()
            .checked_neg()
            .ok_or(PriceError::Overflow)?;

        Ok(Self::from_minor(negated, self.currency()))
    }
}

impl From<Money<'static, Currency>> for Price {
    fn from(money: Money<'static, Currency>) -> Self {
        Self { money }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount(), self.currency().iso_alpha_code)
    }
}

/// Parses the `"AMOUNT CURRENCY"` form, e.g. `"20.00 USD"`.
impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();

        match (parts.next(), parts.next(), parts.next()) {
            (Some(amount), Some(code), None) => Self::parse(amount, code),
            _ => Err(PriceError::InvalidAmount(s.to_string())),
        }
    }
}

fn to_minor(amount: Decimal, exponent: u32) -> Result<i64, PriceError> {
    let scale = 10_i64.checked_pow(exponent).ok_or(PriceError::Overflow)?;

    amount
        .checked_mul(Decimal::from(scale))
        .ok_or(PriceError::Overflow)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(PriceError::Overflow)
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{GBP, JPY, USD};
    use testresult::TestResult;

    use super::*;

    #[test]
    fn parse_reads_amount_and_currency() -> TestResult {
        let price = Price::parse("20.00", "USD")?;

        assert_eq!(price, Price::from_minor(2000, USD));
        assert_eq!(price.currency(), USD);

        Ok(())
    }

    #[test]
    fn parse_accepts_lowercase_codes() -> TestResult {
        assert_eq!(Price::parse("1.50", "gbp")?, Price::from_minor(150, GBP));

        Ok(())
    }

    #[test]
    fn parse_rejects_unknown_currency() {
        let result = Price::parse("1.00", "ABC");

        assert_eq!(result, Err(PriceError::UnknownCurrency("ABC".to_string())));
    }

    #[test]
    fn parse_rejects_garbage_amount() {
        assert!(matches!(
            Price::parse("twenty", "USD"),
            Err(PriceError::InvalidAmount(_))
        ));
    }

    #[test]
    fn new_rounds_half_up_to_minor_units() -> TestResult {
        assert_eq!(
            Price::new("0.125".parse()?, USD)?,
            Price::from_minor(13, USD)
        );
        assert_eq!(
            Price::new("-0.125".parse()?, USD)?,
            Price::from_minor(-13, USD)
        );

        Ok(())
    }

    #[test]
    fn new_respects_currency_exponent() -> TestResult {
        let yen = Price::new("1500".parse()?, JPY)?;

        assert_eq!(yen.to_minor_units(), 1500);
        assert_eq!(yen.to_string(), "1500 JPY");

        Ok(())
    }

    #[test]
    fn from_str_reads_amount_currency_pairs() -> TestResult {
        let price: Price = "36.00 USD".parse()?;

        assert_eq!(price, Price::from_minor(3600, USD));

        Ok(())
    }

    #[test]
    fn from_str_rejects_missing_currency() {
        assert!(matches!(
            "36.00".parse::<Price>(),
            Err(PriceError::InvalidAmount(_))
        ));
        assert!(matches!(
            "36.00 USD extra".parse::<Price>(),
            Err(PriceError::InvalidAmount(_))
        ));
    }

    #[test]
    fn add_and_subtract_same_currency() -> TestResult {
        let a = Price::from_minor(2000, USD);
        let b = Price::from_minor(500, USD);

        assert_eq!(a.add(b)?, Price::from_minor(2500, USD));
        assert_eq!(a.subtract(b)?, Price::from_minor(1500, USD));
        assert_eq!(b.subtract(a)?, Price::from_minor(-1500, USD));

        Ok(())
    }

    #[test]
    fn add_rejects_currency_mismatch() {
        let result = Price::from_minor(100, USD).add(Price::from_minor(100, GBP));

        assert_eq!(
            result,
            Err(PriceError::CurrencyMismatch {
                expected: USD.iso_alpha_code,
                actual: GBP.iso_alpha_code,
            })
        );
    }

    #[test]
    fn subtract_rejects_currency_mismatch() {
        let result = Price::from_minor(100, GBP).subtract(Price::from_minor(100, USD));

        assert!(matches!(result, Err(PriceError::CurrencyMismatch { .. })));
    }

    #[test]
    fn multiply_rounds_half_up() -> TestResult {
        let price = Price::from_minor(1005, USD);

        // 10.05 * 0.5 = 5.025 -> 5.03
        assert_eq!(price.multiply("0.5".parse()?)?, Price::from_minor(503, USD));
        assert_eq!(price.multiply(Decimal::ZERO)?, Price::zero(USD));
        assert_eq!(price.multiply(Decimal::ONE)?, price);

        Ok(())
    }

    #[test]
    fn multiply_reports_overflow() {
        let price = Price::from_minor(i64::MAX, USD);

        assert_eq!(
            price.multiply(Decimal::from(2)),
            Err(PriceError::Overflow)
        );
    }

    #[test]
    fn negate_flips_sign() -> TestResult {
        let price = Price::from_minor(500, USD);

        assert_eq!(price.negate()?, Price::from_minor(-500, USD));
        assert!(price.negate()?.is_negative());
        assert_eq!(price.negate()?.negate()?, price);
        assert_eq!(Price::from_minor(i64::MIN, USD).negate(), Err(PriceError::Overflow));

        Ok(())
    }

    #[test]
    fn display_uses_currency_precision() {
        assert_eq!(Price::from_minor(3600, USD).to_string(), "36.00 USD");
        assert_eq!(Price::from_minor(-500, USD).to_string(), "-5.00 USD");
        assert_eq!(Price::zero(GBP).to_string(), "0.00 GBP");
    }

    #[test]
    fn zero_is_zero() {
        assert!(Price::zero(USD).is_zero());
        assert!(!Price::zero(USD).is_negative());
    }
}

//! Adjustments
//!
//! A signed price delta attached to an order or line item. Adjustments never
//! modify the base price of what they are attached to; totals fold them in.

use rusty_money::iso::Currency;

use crate::{
    prices::{Price, PriceError},
    promotions::PromotionKey,
};

/// What produced an adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdjustmentKind {
    /// Produced by a promotion offer; derived state that is cleared on re-pricing.
    Promotion,

    /// Added by hand; survives re-pricing.
    Custom,
}

/// An immutable price adjustment.
#[derive(Debug, Clone, PartialEq)]
pub struct Adjustment {
    kind: AdjustmentKind,
    label: String,
    amount: Price,
    source: Option<PromotionKey>,
}

impl Adjustment {
    /// Create an adjustment with no source.
    pub fn new(kind: AdjustmentKind, label: impl Into<String>, amount: Price) -> Self {
        Self {
            kind,
            label: label.into(),
            amount,
            source: None,
        }
    }

    /// Create a promotion adjustment.
    pub fn promotion(label: impl Into<String>, amount: Price) -> Self {
        Self::new(AdjustmentKind::Promotion, label, amount)
    }

    /// Create a custom (manual) adjustment.
    pub fn custom(label: impl Into<String>, amount: Price) -> Self {
        Self::new(AdjustmentKind::Custom, label, amount)
    }

    /// Return a copy attributed to the promotion that produced it.
    #[must_use]
    pub fn with_source(self, source: PromotionKey, label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            source: Some(source),
            ..self
        }
    }

    /// Adjustment kind
    pub fn kind(&self) -> AdjustmentKind {
        self.kind
    }

    /// Human readable label
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Signed amount
    pub fn amount(&self) -> Price {
        self.amount
    }

    /// Promotion that produced this adjustment, if any
    pub fn source(&self) -> Option<PromotionKey> {
        self.source
    }
}

/// Sum a list of adjustments.
///
/// # Errors
///
/// Returns [`PriceError::CurrencyMismatch`] if any adjustment is not in `currency`.
pub fn sum_adjustments(
    adjustments: &[Adjustment],
    currency: &'static Currency,
) -> Result<Price, PriceError> {
    adjustments
        .iter()
        .try_fold(Price::zero(currency), |acc, adjustment| {
            acc.add(adjustment.amount())
        })
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{GBP, USD};
    use slotmap::SlotMap;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn with_source_keeps_kind_and_amount() {
        let mut keys = SlotMap::<PromotionKey, ()>::with_key();
        let key = keys.insert(());

        let adjustment = Adjustment::promotion("10% off", Price::from_minor(-400, USD))
            .with_source(key, "Promotion 1");

        assert_eq!(adjustment.kind(), AdjustmentKind::Promotion);
        assert_eq!(adjustment.amount(), Price::from_minor(-400, USD));
        assert_eq!(adjustment.label(), "Promotion 1");
        assert_eq!(adjustment.source(), Some(key));
    }

    #[test]
    fn custom_adjustments_have_no_source() {
        let adjustment = Adjustment::custom("Goodwill", Price::from_minor(-100, USD));

        assert_eq!(adjustment.kind(), AdjustmentKind::Custom);
        assert_eq!(adjustment.source(), None);
    }

    #[test]
    fn sum_of_nothing_is_zero() -> TestResult {
        assert_eq!(sum_adjustments(&[], USD)?, Price::zero(USD));

        Ok(())
    }

    #[test]
    fn sum_adds_signed_amounts() -> TestResult {
        let adjustments = [
            Adjustment::promotion("a", Price::from_minor(-500, USD)),
            Adjustment::custom("b", Price::from_minor(200, USD)),
        ];

        assert_eq!(
            sum_adjustments(&adjustments, USD)?,
            Price::from_minor(-300, USD)
        );

        Ok(())
    }

    #[test]
    fn sum_rejects_foreign_currency() {
        let adjustments = [Adjustment::promotion("a", Price::from_minor(-500, GBP))];

        assert!(matches!(
            sum_adjustments(&adjustments, USD),
            Err(PriceError::CurrencyMismatch { .. })
        ));
    }
}

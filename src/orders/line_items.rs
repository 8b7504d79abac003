//! Line Items

use rust_decimal::Decimal;
use rusty_money::iso::Currency;
use smallvec::SmallVec;

use crate::{
    adjustments::{Adjustment, AdjustmentKind, sum_adjustments},
    orders::{Promotable, StoreUuid},
    prices::{Price, PriceError},
};

/// A priced line on an order.
///
/// Adjustments on a line item are per-unit deltas. They never change
/// [`LineItem::total_price`]; the owning order folds them in, multiplied by the
/// quantity, when it computes its own total.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    title: String,
    order_type: String,
    store: Option<StoreUuid>,
    unit_price: Price,
    quantity: u32,
    adjustments: Vec<Adjustment>,
}

impl LineItem {
    /// Create a line item for orders of the given type.
    pub fn new(
        title: impl Into<String>,
        order_type: impl Into<String>,
        unit_price: Price,
        quantity: u32,
    ) -> Self {
        Self {
            title: title.into(),
            order_type: order_type.into(),
            store: None,
            unit_price,
            quantity,
            adjustments: Vec::new(),
        }
    }

    /// Set the store this line item is being sold from.
    #[must_use]
    pub fn with_store(mut self, store: StoreUuid) -> Self {
        self.store = Some(store);
        self
    }

    pub(crate) fn assign_store(&mut self, store: StoreUuid) {
        self.store = Some(store);
    }

    /// Title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Unit price
    pub fn unit_price(&self) -> Price {
        self.unit_price
    }

    /// Quantity
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Change the unit price. Promotion adjustments are derived from the old
    /// price, so they are dropped and must be recomputed.
    pub fn set_unit_price(&mut self, unit_price: Price) {
        self.unit_price = unit_price;
        self.clear_adjustments(AdjustmentKind::Promotion);
    }

    /// Change the quantity, dropping promotion adjustments.
    pub fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
        self.clear_adjustments(AdjustmentKind::Promotion);
    }

    /// Attach a single adjustment.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::CurrencyMismatch`] if the adjustment is in another currency.
    pub fn add_adjustment(&mut self, adjustment: Adjustment) -> Result<(), PriceError> {
        self.extend_adjustments([adjustment])
    }

    /// Remove all adjustments of a kind.
    pub fn clear_adjustments(&mut self, kind: AdjustmentKind) {
        self.adjustments.retain(|adjustment| adjustment.kind() != kind);
    }

    /// Unit price multiplied by quantity. Unaffected by adjustments.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Overflow`] if the total cannot be represented.
    pub fn total_price(&self) -> Result<Price, PriceError> {
        self.unit_price.multiply(Decimal::from(self.quantity))
    }

    /// Sum of the per-unit adjustments.
    ///
    /// # Errors
    ///
    /// Returns an error if an adjustment is in another currency.
    pub fn adjustments_total(&self) -> Result<Price, PriceError> {
        sum_adjustments(&self.adjustments, self.currency())
    }

    /// Total price with every per-unit adjustment applied to each unit.
    ///
    /// # Errors
    ///
    /// Returns an error on currency mismatch or overflow.
    pub fn adjusted_total_price(&self) -> Result<Price, PriceError> {
        let adjustments = self
            .adjustments_total()?
            .multiply(Decimal::from(self.quantity))?;

        self.total_price()?.add(adjustments)
    }
}

impl Promotable for LineItem {
    fn order_type(&self) -> &str {
        &self.order_type
    }

    fn store(&self) -> Option<StoreUuid> {
        self.store
    }

    fn currency(&self) -> &'static Currency {
        self.unit_price.currency()
    }

    fn adjustments(&self) -> &[Adjustment] {
        &self.adjustments
    }

    fn extend_adjustments<I>(&mut self, adjustments: I) -> Result<(), PriceError>
    where
        I: IntoIterator<Item = Adjustment>,
    {
        let adjustments: SmallVec<[Adjustment; 2]> = adjustments.into_iter().collect();

        ensure_currency(&adjustments, self.currency())?;

        self.adjustments.extend(adjustments);

        Ok(())
    }
}

/// Fail unless every adjustment is in `currency`.
pub(crate) fn ensure_currency(
    adjustments: &[Adjustment],
    currency: &'static Currency,
) -> Result<(), PriceError> {
    adjustments.iter().try_for_each(|adjustment| {
        let actual = adjustment.amount().currency();

        if actual == currency {
            Ok(())
        } else {
            Err(PriceError::CurrencyMismatch {
                expected: currency.iso_alpha_code,
                actual: actual.iso_alpha_code,
            })
        }
    })
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{GBP, USD};
    use testresult::TestResult;

    use super::*;

    fn line_item() -> LineItem {
        LineItem::new("Widget", "default", Price::from_minor(1000, USD), 2)
    }

    #[test]
    fn total_price_is_unit_price_times_quantity() -> TestResult {
        assert_eq!(line_item().total_price()?, Price::from_minor(2000, USD));

        Ok(())
    }

    #[test]
    fn adjustments_do_not_change_total_price() -> TestResult {
        let mut item = line_item();

        item.add_adjustment(Adjustment::promotion("half off", Price::from_minor(-500, USD)))?;

        assert_eq!(item.total_price()?, Price::from_minor(2000, USD));
        assert_eq!(item.adjustments().len(), 1);

        Ok(())
    }

    #[test]
    fn adjusted_total_applies_adjustments_per_unit() -> TestResult {
        let mut item = line_item();

        item.add_adjustment(Adjustment::promotion("half off", Price::from_minor(-500, USD)))?;

        assert_eq!(item.adjusted_total_price()?, Price::from_minor(1000, USD));

        Ok(())
    }

    #[test]
    fn extend_is_all_or_nothing() {
        let mut item = line_item();

        let result = item.extend_adjustments([
            Adjustment::promotion("ok", Price::from_minor(-100, USD)),
            Adjustment::promotion("wrong", Price::from_minor(-100, GBP)),
        ]);

        assert!(matches!(result, Err(PriceError::CurrencyMismatch { .. })));
        assert!(item.adjustments().is_empty());
    }

    #[test]
    fn repricing_inputs_drop_promotion_adjustments_only() -> TestResult {
        let mut item = line_item();

        item.add_adjustment(Adjustment::promotion("promo", Price::from_minor(-500, USD)))?;
        item.add_adjustment(Adjustment::custom("manual", Price::from_minor(-100, USD)))?;

        item.set_quantity(3);

        assert_eq!(item.quantity(), 3);
        assert_eq!(item.adjustments().len(), 1);
        assert_eq!(
            item.adjustments().first().map(Adjustment::kind),
            Some(AdjustmentKind::Custom)
        );

        item.set_unit_price(Price::from_minor(1200, USD));

        assert_eq!(item.total_price()?, Price::from_minor(3600, USD));

        Ok(())
    }

    #[test]
    fn with_store_sets_store() {
        let store = StoreUuid::new_v4();
        let item = line_item().with_store(store);

        assert_eq!(item.store(), Some(store));
        assert_eq!(line_item().store(), None);
    }
}

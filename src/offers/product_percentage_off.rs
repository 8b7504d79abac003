//! Product Percentage Off
//!
//! Takes a percentage off a line item's unit price. The adjustment is attached
//! to the line item as a per-unit delta: the line item keeps showing its full
//! price and the saving surfaces in the order total.

use smallvec::smallvec;

use crate::{
    adjustments::Adjustment,
    offers::{
        Offer, OfferAdjustments, OfferConfiguration, OfferError, OfferTarget, TargetKind,
        percentage::PercentageOffConfiguration,
    },
    orders::Promotable,
};

/// A percentage off each unit of a line item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProductPercentageOff {
    config: PercentageOffConfiguration,
}

impl ProductPercentageOff {
    /// Plugin id
    pub const PLUGIN_ID: &'static str = "product_percentage_off";

    /// Alternative plugin id accepted by the default registry
    pub const ALIAS: &'static str = "commerce_promotion_product_percentage_off";

    /// Create the offer from an already validated configuration.
    pub fn new(config: PercentageOffConfiguration) -> Self {
        Self { config }
    }

    /// Build the offer from its raw configuration.
    ///
    /// # Errors
    ///
    /// Returns [`OfferError::InvalidConfiguration`] if the parameters are invalid.
    pub fn from_configuration(configuration: &OfferConfiguration) -> Result<Self, OfferError> {
        PercentageOffConfiguration::from_configuration(Self::PLUGIN_ID, configuration)
            .map(Self::new)
    }

    /// Configuration
    pub fn configuration(&self) -> &PercentageOffConfiguration {
        &self.config
    }
}

impl Offer for ProductPercentageOff {
    fn plugin_id(&self) -> &'static str {
        Self::PLUGIN_ID
    }

    fn target_kind(&self) -> TargetKind {
        TargetKind::LineItem
    }

    fn evaluate(&self, target: OfferTarget<'_>) -> Result<OfferAdjustments, OfferError> {
        let OfferTarget::LineItem(line_item) = target else {
            return Err(OfferError::UnsupportedTarget {
                offer: Self::PLUGIN_ID,
                target: target.kind(),
            });
        };

        self.config.ensure_currency(line_item.currency())?;

        let amount = self.config.discount_on(line_item.unit_price())?;

        Ok(smallvec![Adjustment::promotion("Product percentage off", amount)])
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{GBP, USD};
    use testresult::TestResult;

    use crate::{
        orders::{LineItem, Order, StoreUuid},
        prices::{Price, PriceError},
    };

    use super::*;

    fn offer(amount: &str) -> Result<ProductPercentageOff, OfferError> {
        ProductPercentageOff::from_configuration(
            &OfferConfiguration::new(ProductPercentageOff::PLUGIN_ID)
                .with_parameter("amount", amount),
        )
    }

    #[test]
    fn takes_percentage_of_unit_price() -> TestResult {
        let line_item = LineItem::new("Widget", "default", Price::from_minor(1000, USD), 2);
        let adjustments = offer("0.50")?.evaluate((&line_item).into())?;

        assert_eq!(adjustments.len(), 1);
        assert_eq!(
            adjustments.first().map(Adjustment::amount),
            Some(Price::from_minor(-500, USD))
        );

        Ok(())
    }

    #[test]
    fn rounds_half_up() -> TestResult {
        // 0.15 * 0.75 = 0.1125 -> 0.11
        let line_item = LineItem::new("Apple", "default", Price::from_minor(75, USD), 4);
        let adjustments = offer("0.15")?.evaluate((&line_item).into())?;

        assert_eq!(
            adjustments.first().map(Adjustment::amount),
            Some(Price::from_minor(-11, USD))
        );

        Ok(())
    }

    #[test]
    fn rejects_order_targets() -> TestResult {
        let order = Order::new("default", StoreUuid::new_v4(), USD);
        let result = offer("0.50")?.evaluate((&order).into());

        assert_eq!(
            result,
            Err(OfferError::UnsupportedTarget {
                offer: ProductPercentageOff::PLUGIN_ID,
                target: TargetKind::Order,
            })
        );

        Ok(())
    }

    #[test]
    fn rejects_line_items_in_unexpected_currency() -> TestResult {
        let configuration = OfferConfiguration::new(ProductPercentageOff::PLUGIN_ID)
            .with_parameter("amount", "0.50")
            .with_parameter("currency", "USD");
        let line_item = LineItem::new("Tea", "default", Price::from_minor(300, GBP), 1);

        let result =
            ProductPercentageOff::from_configuration(&configuration)?.evaluate((&line_item).into());

        assert!(matches!(
            result,
            Err(OfferError::Price(PriceError::CurrencyMismatch { .. }))
        ));

        Ok(())
    }
}

//! Order Percentage Off
//!
//! Takes a percentage off the order subtotal, as a single order-level adjustment.

use smallvec::smallvec;

use crate::{
    adjustments::Adjustment,
    offers::{
        Offer, OfferAdjustments, OfferConfiguration, OfferError, OfferTarget, TargetKind,
        percentage::PercentageOffConfiguration,
    },
    orders::Promotable,
};

/// A percentage off the whole order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderPercentageOff {
    config: PercentageOffConfiguration,
}

impl OrderPercentageOff {
    /// Plugin id
    pub const PLUGIN_ID: &'static str = "order_percentage_off";

    /// Alternative plugin id accepted by the default registry
    pub const ALIAS: &'static str = "commerce_promotion_order_percentage_off";

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

impl Offer for OrderPercentageOff {
    fn plugin_id(&self) -> &'static str {
        Self::PLUGIN_ID
    }

    fn target_kind(&self) -> TargetKind {
        TargetKind::Order
    }

    fn evaluate(&self, target: OfferTarget<'_>) -> Result<OfferAdjustments, OfferError> {
        let OfferTarget::Order(order) = target else {
            return Err(OfferError::UnsupportedTarget {
                offer: Self::PLUGIN_ID,
                target: target.kind(),
            });
        };

        self.config.ensure_currency(order.currency())?;

        let amount = self.config.discount_on(order.subtotal_price()?)?;

        Ok(smallvec![Adjustment::promotion("Order percentage off", amount)])
    }
}

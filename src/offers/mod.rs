//! Offers
//!
//! An offer is the computational rule of a promotion: given a target (an order
//! or a line item) it produces the adjustments the promotion grants. Offers are
//! pure, they never mutate the target; attaching the result is the job of
//! [`Promotion::apply`](crate::promotions::Promotion::apply).

use std::{borrow::Cow, collections::BTreeMap, fmt};

use rusty_money::iso::Currency;
use serde::Deserialize;
use serde_norway::Value;
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    adjustments::Adjustment,
    orders::{LineItem, Order, Promotable},
    prices::PriceError,
};

pub mod order_percentage_off;
pub mod percentage;
pub mod product_percentage_off;
pub mod registry;

pub use order_percentage_off::OrderPercentageOff;
pub use percentage::PercentageOffConfiguration;
pub use product_percentage_off::ProductPercentageOff;
pub use registry::{OfferFactory, OfferManager, OfferRegistry};

/// Errors raised while resolving, configuring or evaluating an offer.
#[derive(Debug, Error, PartialEq)]
pub enum OfferError {
    /// No offer is registered under this plugin id.
    #[error("unknown offer type: {0}")]
    UnknownOfferType(String),

    /// A configuration parameter is missing or out of its domain.
    #[error("invalid configuration for {offer}: {reason}")]
    InvalidConfiguration {
        /// Plugin id of the offer being configured
        offer: String,

        /// What was wrong
        reason: String,
    },

    /// The offer was evaluated against the wrong kind of target.
    #[error("{offer} cannot be applied to a {target}")]
    UnsupportedTarget {
        /// Plugin id of the offer
        offer: &'static str,

        /// Kind of target it was given
        target: TargetKind,
    },

    /// Wrapped price arithmetic or currency mismatch error.
    #[error(transparent)]
    Price(#[from] PriceError),
}

impl OfferError {
    pub(crate) fn invalid(offer: &str, reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            offer: offer.to_string(),
            reason: reason.into(),
        }
    }
}

/// The kind of entity an offer targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    /// A whole order
    Order,

    /// A single line item
    LineItem,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetKind::Order => f.write_str("order"),
            TargetKind::LineItem => f.write_str("line item"),
        }
    }
}

/// A read-only view of what an offer is evaluated against.
#[derive(Debug, Clone, Copy)]
pub enum OfferTarget<'t> {
    /// An order
    Order(&'t Order),

    /// A line item
    LineItem(&'t LineItem),
}

impl OfferTarget<'_> {
    /// The kind of this target.
    pub fn kind(&self) -> TargetKind {
        match self {
            OfferTarget::Order(_) => TargetKind::Order,
            OfferTarget::LineItem(_) => TargetKind::LineItem,
        }
    }

    /// Currency of the target's prices.
    pub fn currency(&self) -> &'static Currency {
        match self {
            OfferTarget::Order(order) => order.currency(),
            OfferTarget::LineItem(line_item) => line_item.currency(),
        }
    }
}

impl<'t> From<&'t Order> for OfferTarget<'t> {
    fn from(order: &'t Order) -> Self {
        OfferTarget::Order(order)
    }
}

impl<'t> From<&'t LineItem> for OfferTarget<'t> {
    fn from(line_item: &'t LineItem) -> Self {
        OfferTarget::LineItem(line_item)
    }
}

/// Adjustments produced by one evaluation.
pub type OfferAdjustments = SmallVec<[Adjustment; 1]>;

/// A configured offer.
pub trait Offer: fmt::Debug {
    /// Plugin id this offer is registered under.
    fn plugin_id(&self) -> &'static str;

    /// The kind of target this offer applies to.
    fn target_kind(&self) -> TargetKind;

    /// Compute the adjustments this offer grants the target.
    ///
    /// # Errors
    ///
    /// Returns [`OfferError::UnsupportedTarget`] for the wrong kind of target,
    /// or [`OfferError::Price`] on currency mismatch or overflow.
    fn evaluate(&self, target: OfferTarget<'_>) -> Result<OfferAdjustments, OfferError>;
}

/// The declarative offer configuration stored on a promotion: which offer to
/// use and its raw parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OfferConfiguration {
    /// Plugin id resolved through an [`OfferRegistry`].
    pub target_plugin_id: String,

    /// Offer parameters, e.g. `amount: "0.10"`.
    #[serde(default)]
    pub target_plugin_configuration: BTreeMap<String, Value>,
}

impl OfferConfiguration {
    /// Configuration for the given plugin id with no parameters.
    pub fn new(target_plugin_id: impl Into<String>) -> Self {
        Self {
            target_plugin_id: target_plugin_id.into(),
            target_plugin_configuration: BTreeMap::new(),
        }
    }

    /// Set a parameter.
    #[must_use]
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.target_plugin_configuration
            .insert(name.into(), value.into());
        self
    }

    /// Raw parameter value.
    pub fn parameter(&self, name: &str) -> Option<&Value> {
        self.target_plugin_configuration.get(name)
    }

    /// Scalar parameter as text. Numbers are rendered as written in YAML;
    /// anything other than a string or number is `None`.
    pub fn parameter_str(&self, name: &str) -> Option<Cow<'_, str>> {
        match self.parameter(name)? {
            Value::String(value) => Some(Cow::Borrowed(value.as_str())),
            Value::Number(value) => Some(Cow::Owned(value.to_string())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn parameter_str_reads_strings_and_numbers() {
        let configuration = OfferConfiguration::new("order_percentage_off")
            .with_parameter("amount", "0.10")
            .with_parameter("ratio", 0.5)
            .with_parameter("enabled", true);

        assert_eq!(configuration.parameter_str("amount").as_deref(), Some("0.10"));
        assert_eq!(configuration.parameter_str("ratio").as_deref(), Some("0.5"));
        assert_eq!(configuration.parameter_str("enabled"), None);
        assert_eq!(configuration.parameter_str("missing"), None);
    }

    #[test]
    fn deserializes_from_yaml() -> TestResult {
        let yaml = r#"
target_plugin_id: order_percentage_off
target_plugin_configuration:
  amount: "0.10"
"#;
        let configuration: OfferConfiguration = serde_norway::from_str(yaml)?;

        assert_eq!(configuration.target_plugin_id, "order_percentage_off");
        assert_eq!(configuration.parameter_str("amount").as_deref(), Some("0.10"));

        Ok(())
    }

    #[test]
    fn parameters_default_to_empty() -> TestResult {
        let configuration: OfferConfiguration =
            serde_norway::from_str("target_plugin_id: custom")?;

        assert!(configuration.target_plugin_configuration.is_empty());

        Ok(())
    }

    #[test]
    fn target_kind_displays_readably() {
        assert_eq!(TargetKind::Order.to_string(), "order");
        assert_eq!(TargetKind::LineItem.to_string(), "line item");
    }
}

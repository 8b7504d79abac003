//! Offer registry
//!
//! Resolves the plugin id stored on a promotion to a configured [`Offer`].

use std::fmt;

use rustc_hash::FxHashMap;

use crate::offers::{
    Offer, OfferConfiguration, OfferError, order_percentage_off::OrderPercentageOff,
    product_percentage_off::ProductPercentageOff,
};

/// Builds a configured offer from its raw configuration.
pub type OfferFactory = fn(&OfferConfiguration) -> Result<Box<dyn Offer>, OfferError>;

/// Resolves offer configurations to offers.
pub trait OfferRegistry: fmt::Debug {
    /// Resolve and configure the offer named by `configuration.target_plugin_id`.
    ///
    /// # Errors
    ///
    /// Returns [`OfferError::UnknownOfferType`] for unregistered ids, or
    /// [`OfferError::InvalidConfiguration`] if the parameters are invalid.
    fn resolve(&self, configuration: &OfferConfiguration) -> Result<Box<dyn Offer>, OfferError>;
}

/// Map-backed [`OfferRegistry`].
///
/// [`OfferManager::default`] registers the built-in offers;
/// [`OfferManager::new`] starts empty.
#[derive(Debug, Clone)]
pub struct OfferManager {
    factories: FxHashMap<String, OfferFactory>,
}

impl OfferManager {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            factories: FxHashMap::default(),
        }
    }

    /// Register a factory, returning the one it replaced.
    pub fn register(
        &mut self,
        plugin_id: impl Into<String>,
        factory: OfferFactory,
    ) -> Option<OfferFactory> {
        self.factories.insert(plugin_id.into(), factory)
    }

    /// Whether a plugin id is registered.
    pub fn contains(&self, plugin_id: &str) -> bool {
        self.factories.contains_key(plugin_id)
    }

    /// Registered plugin ids, sorted.
    pub fn plugin_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.factories.keys().map(String::as_str).collect();

        ids.sort_unstable();

        ids
    }
}

impl Default for OfferManager {
    fn default() -> Self {
        let mut manager = Self::new();

        for plugin_id in [OrderPercentageOff::PLUGIN_ID, OrderPercentageOff::ALIAS] {
            manager.register(plugin_id, |configuration| {
                Ok(Box::new(OrderPercentageOff::from_configuration(configuration)?))
            });
        }

        for plugin_id in [ProductPercentageOff::PLUGIN_ID, ProductPercentageOff::ALIAS] {
            manager.register(plugin_id, |configuration| {
                Ok(Box::new(ProductPercentageOff::from_configuration(configuration)?))
            });
        }

        manager
    }
}

impl OfferRegistry for OfferManager {
    fn resolve(&self, configuration: &OfferConfiguration) -> Result<Box<dyn Offer>, OfferError> {
        let factory = self
            .factories
            .get(&configuration.target_plugin_id)
            .ok_or_else(|| OfferError::UnknownOfferType(configuration.target_plugin_id.clone()))?;

        factory(configuration)
    }
}

#[cfg(test)]
mod tests {
    use smallvec::SmallVec;
    use testresult::TestResult;

    use crate::offers::{OfferAdjustments, OfferTarget, TargetKind};

    use super::*;

    #[derive(Debug)]
    struct NothingOff;

    impl Offer for NothingOff {
        fn plugin_id(&self) -> &'static str {
            "nothing_off"
        }

        fn target_kind(&self) -> TargetKind {
            TargetKind::Order
        }

        fn evaluate(&self, _target: OfferTarget<'_>) -> Result<OfferAdjustments, OfferError> {
            Ok(SmallVec::new())
        }
    }

    #[test]
    fn default_registers_builtin_offers() {
        let manager = OfferManager::default();

        assert_eq!(
            manager.plugin_ids(),
            vec![
                OrderPercentageOff::ALIAS,
                ProductPercentageOff::ALIAS,
                OrderPercentageOff::PLUGIN_ID,
                ProductPercentageOff::PLUGIN_ID,
            ]
        );
    }

    #[test]
    fn aliases_resolve_to_builtin_offers() -> TestResult {
        let manager = OfferManager::default();
        let configuration = OfferConfiguration::new("commerce_promotion_order_percentage_off")
            .with_parameter("amount", "0.10");

        let offer = manager.resolve(&configuration)?;

        assert_eq!(offer.plugin_id(), OrderPercentageOff::PLUGIN_ID);
        assert_eq!(offer.target_kind(), TargetKind::Order);

        Ok(())
    }

    #[test]
    fn resolves_configured_offer() -> TestResult {
        let manager = OfferManager::default();
        let configuration = OfferConfiguration::new(ProductPercentageOff::PLUGIN_ID)
            .with_parameter("amount", "0.50");

        let offer = manager.resolve(&configuration)?;

        assert_eq!(offer.plugin_id(), ProductPercentageOff::PLUGIN_ID);
        assert_eq!(offer.target_kind(), TargetKind::LineItem);

        Ok(())
    }

    #[test]
    fn unknown_ids_fail() {
        let manager = OfferManager::default();
        let result = manager.resolve(&OfferConfiguration::new("buy_one_get_one"));

        assert_eq!(
            result.err(),
            Some(OfferError::UnknownOfferType("buy_one_get_one".to_string()))
        );
    }

    #[test]
    fn invalid_configuration_surfaces_on_resolve() {
        let manager = OfferManager::default();
        let configuration =
            OfferConfiguration::new(OrderPercentageOff::PLUGIN_ID).with_parameter("amount", "2");

        assert!(matches!(
            manager.resolve(&configuration),
            Err(OfferError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn custom_offers_can_be_registered() -> TestResult {
        let mut manager = OfferManager::new();

        assert!(!manager.contains("nothing_off"));

        let replaced = manager.register("nothing_off", |_configuration| Ok(Box::new(NothingOff)));

        assert!(replaced.is_none());
        assert!(manager.contains("nothing_off"));

        let offer = manager.resolve(&OfferConfiguration::new("nothing_off"))?;

        assert_eq!(offer.plugin_id(), "nothing_off");

        Ok(())
    }
}

//! Promotions catalog

use jiff::Timestamp;
use slotmap::{SlotMap, basic::Values};
use tracing::{info, warn};

use crate::{
    adjustments::AdjustmentKind,
    offers::{OfferManager, OfferRegistry},
    orders::{Order, Promotable},
    promotions::{ApplyOutcome, Promotion, PromotionError, PromotionKey},
};

/// What happened when a catalog was applied to an order.
#[derive(Debug, Default, PartialEq)]
pub struct ApplyReport {
    /// Number of adjustments attached, across the order and its line items.
    pub applied: usize,

    /// Promotions that failed, with the error they failed with. A failing
    /// promotion never stops the others.
    pub failures: Vec<(PromotionKey, PromotionError)>,
}

impl ApplyReport {
    /// Whether every promotion ran without error.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    fn record(&mut self, promotion: &Promotion, result: Result<ApplyOutcome, PromotionError>) {
        match result {
            Ok(ApplyOutcome::Applied(count)) => self.applied += count,
            Ok(
                ApplyOutcome::Ineligible(_)
                | ApplyOutcome::NotApplicable(_)
                | ApplyOutcome::AlreadyApplied,
            ) => {}
            Err(error) => {
                warn!(promotion = %promotion.name(), %error, "promotion failed");

                self.failures.push((promotion.key(), error));
            }
        }
    }
}

/// A set of saved promotions and the registry their offers resolve against.
#[derive(Debug)]
pub struct Promotions<R: OfferRegistry = OfferManager> {
    registry: R,
    promotions: SlotMap<PromotionKey, Promotion>,
}

impl Promotions {
    /// An empty catalog backed by the built-in offers.
    pub fn new() -> Self {
        Self::with_registry(OfferManager::default())
    }
}

impl Default for Promotions {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: OfferRegistry> Promotions<R> {
    /// An empty catalog backed by `registry`.
    pub fn with_registry(registry: R) -> Self {
        Self {
            registry,
            promotions: SlotMap::with_key(),
        }
    }

    /// Offer registry
    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Validate and store a promotion. `build` receives the key the promotion
    /// will be stored under.
    ///
    /// # Errors
    ///
    /// Returns the validation error; nothing is stored in that case.
    pub fn save<F>(&mut self, build: F) -> Result<PromotionKey, PromotionError>
    where
        F: FnOnce(PromotionKey) -> Promotion,
    {
        let registry = &self.registry;

        self.promotions.try_insert_with_key(|key| {
            let promotion = build(key);

            promotion.validate(registry)?;

            Ok(promotion)
        })
    }

    /// Get a promotion
    pub fn get(&self, key: PromotionKey) -> Option<&Promotion> {
        self.promotions.get(key)
    }

    /// Remove a promotion
    pub fn remove(&mut self, key: PromotionKey) -> Option<Promotion> {
        self.promotions.remove(key)
    }

    /// Number of promotions
    pub fn len(&self) -> usize {
        self.promotions.len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.promotions.is_empty()
    }

    /// Iterate over the promotions
    pub fn iter(&self) -> Values<'_, PromotionKey, Promotion> {
        self.promotions.values()
    }

    /// Promotions eligible for `target` at `at`.
    pub fn applicable_to<'a, T>(
        &'a self,
        target: &'a T,
        at: Timestamp,
    ) -> impl Iterator<Item = &'a Promotion>
    where
        T: Promotable + ?Sized,
    {
        self.promotions
            .values()
            .filter(move |promotion| promotion.eligibility(target, at).is_ok())
    }

    /// Apply every promotion to the order and to each of its line items. A
    /// target that already carries a promotion's adjustments is skipped, so
    /// applying twice does not stack discounts.
    pub fn apply_to_order(&self, order: &mut Order, at: Timestamp) -> ApplyReport {
        let mut report = ApplyReport::default();

        for promotion in self.promotions.values() {
            report.record(promotion, promotion.apply(&self.registry, &mut *order, at));

            let mut changed = false;

            for line_item in order.line_items_unversioned() {
                let result = promotion.apply(&self.registry, line_item, at);

                changed |= matches!(result, Ok(ApplyOutcome::Applied(count)) if count > 0);

                report.record(promotion, result);
            }

            if changed {
                order.mark_changed();
            }
        }

        report
    }

    /// Drop the order's promotion adjustments and apply the catalog again.
    /// Custom adjustments are kept.
    #[tracing::instrument(name = "promotions.reprice", skip_all, fields(order = %order.uuid()))]
    pub fn reprice(&self, order: &mut Order, at: Timestamp) -> ApplyReport {
        order.clear_adjustments(AdjustmentKind::Promotion);

        let report = self.apply_to_order(order, at);

        info!(
            applied = report.applied,
            failed = report.failures.len(),
            "order repriced"
        );

        report
    }
}

impl<'a, R: OfferRegistry> IntoIterator for &'a Promotions<R> {
    type Item = &'a Promotion;
    type IntoIter = Values<'a, PromotionKey, Promotion>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

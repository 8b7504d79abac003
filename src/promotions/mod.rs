//! Promotions
//!
//! A promotion pairs one offer with the conditions under which it is granted:
//! an enabled flag, the order types and stores it runs in, and a validity
//! window.

use jiff::Timestamp;
use rustc_hash::FxHashSet;
use slotmap::new_key_type;
use thiserror::Error;
use tracing::debug;

use crate::{
    adjustments::Adjustment,
    offers::{OfferConfiguration, OfferError, OfferRegistry, OfferTarget, TargetKind},
    orders::{LineItem, Order, Promotable, StoreUuid},
    prices::PriceError,
};

pub mod catalog;
pub mod eligibility;

pub use catalog::{ApplyReport, Promotions};
pub use eligibility::{Ineligibility, ValidityWindow};

new_key_type! {
    /// Promotion Key
    pub struct PromotionKey;
}

/// Errors raised while validating or applying a promotion.
#[derive(Debug, Error, PartialEq)]
pub enum PromotionError {
    /// The promotion's validity window ends before it starts.
    #[error("promotion {name:?} ends at {end}, which is not after its start at {start}")]
    InvalidWindow {
        /// Promotion name
        name: String,

        /// Start of the window
        start: Timestamp,

        /// End of the window
        end: Timestamp,
    },

    /// The offer could not be resolved, configured or evaluated.
    #[error(transparent)]
    Offer(#[from] OfferError),

    /// The adjustments could not be attached to the target.
    #[error(transparent)]
    Price(#[from] PriceError),
}

/// The result of applying a promotion to one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The offer ran and this many adjustments were attached.
    Applied(usize),

    /// The promotion's conditions excluded the target.
    Ineligible(Ineligibility),

    /// The promotion's offer targets the other kind of entity.
    NotApplicable(TargetKind),

    /// The target already carries this promotion's adjustments.
    AlreadyApplied,
}

/// A mutable order or line item a promotion is applied to.
#[derive(Debug)]
pub enum PromotionTarget<'t> {
    /// An order
    Order(&'t mut Order),

    /// A line item
    LineItem(&'t mut LineItem),
}

impl PromotionTarget<'_> {
    /// The kind of this target.
    pub fn kind(&self) -> TargetKind {
        self.as_offer_target().kind()
    }

    /// A read-only view for offer evaluation.
    pub fn as_offer_target(&self) -> OfferTarget<'_> {
        match self {
            PromotionTarget::Order(order) => OfferTarget::Order(order),
            PromotionTarget::LineItem(line_item) => OfferTarget::LineItem(line_item),
        }
    }

    fn adjustments(&self) -> &[Adjustment] {
        match self {
            PromotionTarget::Order(order) => order.adjustments(),
            PromotionTarget::LineItem(line_item) => line_item.adjustments(),
        }
    }

    fn eligibility(&self, promotion: &Promotion, at: Timestamp) -> Result<(), Ineligibility> {
        match self {
            PromotionTarget::Order(order) => promotion.eligibility(&**order, at),
            PromotionTarget::LineItem(line_item) => promotion.eligibility(&**line_item, at),
        }
    }

    fn extend_adjustments<I>(&mut self, adjustments: I) -> Result<(), PriceError>
    where
        I: IntoIterator<Item = Adjustment>,
    {
        match self {
            PromotionTarget::Order(order) => order.extend_adjustments(adjustments),
            PromotionTarget::LineItem(line_item) => line_item.extend_adjustments(adjustments),
        }
    }
}

impl<'t> From<&'t mut Order> for PromotionTarget<'t> {
    fn from(order: &'t mut Order) -> Self {
        PromotionTarget::Order(order)
    }
}

impl<'t> From<&'t mut LineItem> for PromotionTarget<'t> {
    fn from(line_item: &'t mut LineItem) -> Self {
        PromotionTarget::LineItem(line_item)
    }
}

/// A promotion.
#[derive(Debug, Clone)]
pub struct Promotion {
    key: PromotionKey,
    name: String,
    order_types: FxHashSet<String>,
    stores: FxHashSet<StoreUuid>,
    enabled: bool,
    window: ValidityWindow,
    offer: OfferConfiguration,
}

impl Promotion {
    /// Create an enabled promotion starting at `starts_at`, with no end and no
    /// eligible order types or stores yet.
    pub fn new(
        key: PromotionKey,
        name: impl Into<String>,
        offer: OfferConfiguration,
        starts_at: Timestamp,
    ) -> Self {
        Self {
            key,
            name: name.into(),
            order_types: FxHashSet::default(),
            stores: FxHashSet::default(),
            enabled: true,
            window: ValidityWindow::starting(starts_at),
            offer,
        }
    }

    /// Add eligible order types.
    #[must_use]
    pub fn with_order_types<I, S>(mut self, order_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.order_types
            .extend(order_types.into_iter().map(Into::into));
        self
    }

    /// Add eligible stores.
    #[must_use]
    pub fn with_stores(mut self, stores: impl IntoIterator<Item = StoreUuid>) -> Self {
        self.stores.extend(stores);
        self
    }

    /// Enable or disable the promotion.
    #[must_use]
    pub fn with_status(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// End the promotion at `ends_at` (exclusive).
    #[must_use]
    pub fn ending(mut self, ends_at: Timestamp) -> Self {
        self.window = self.window.until(ends_at);
        self
    }

    /// Promotion key
    pub fn key(&self) -> PromotionKey {
        self.key
    }

    /// Promotion name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Offer configuration
    pub fn offer(&self) -> &OfferConfiguration {
        &self.offer
    }

    /// Whether the promotion is switched on
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Validity window
    pub fn window(&self) -> ValidityWindow {
        self.window
    }

    /// Whether `order_type` is eligible
    pub fn has_order_type(&self, order_type: &str) -> bool {
        self.order_types.contains(order_type)
    }

    /// Whether `store` is eligible
    pub fn has_store(&self, store: StoreUuid) -> bool {
        self.stores.contains(&store)
    }

    /// Check whether the promotion may apply to `target` at `at`. Conditions are
    /// checked in order: enabled, order type, store, validity window.
    ///
    /// # Errors
    ///
    /// Returns the first condition the target fails.
    pub fn eligibility<T>(&self, target: &T, at: Timestamp) -> Result<(), Ineligibility>
    where
        T: Promotable + ?Sized,
    {
        if !self.enabled {
            return Err(Ineligibility::Disabled);
        }

        if !self.has_order_type(target.order_type()) {
            return Err(Ineligibility::OrderType(target.order_type().to_string()));
        }

        match target.store() {
            Some(store) if self.has_store(store) => {}
            store => return Err(Ineligibility::Store(store)),
        }

        self.window.check(at)
    }

    /// Save-time validation: the offer resolves with a valid configuration and
    /// the validity window is not empty.
    ///
    /// # Errors
    ///
    /// Returns [`PromotionError::InvalidWindow`] or the offer's resolution error.
    pub fn validate(&self, registry: &dyn OfferRegistry) -> Result<(), PromotionError> {
        if let Some(end) = self.window.end().filter(|_| self.window.is_empty()) {
            return Err(PromotionError::InvalidWindow {
                name: self.name.clone(),
                start: self.window.start(),
                end,
            });
        }

        registry.resolve(&self.offer)?;

        Ok(())
    }

    /// Apply the promotion to an order or line item at the instant `at`.
    ///
    /// An ineligible target, a target of the kind the offer does not handle, or
    /// a target already carrying adjustments from this promotion is left
    /// untouched. Otherwise every adjustment the offer produces is
    /// attached, attributed to this promotion; if anything fails nothing is
    /// attached.
    ///
    /// # Errors
    ///
    /// Returns [`PromotionError::Offer`] if the offer is unknown, misconfigured
    /// or fails to evaluate, and [`PromotionError::Price`] if its adjustments
    /// cannot be attached.
    pub fn apply<'t>(
        &self,
        registry: &dyn OfferRegistry,
        target: impl Into<PromotionTarget<'t>>,
        at: Timestamp,
    ) -> Result<ApplyOutcome, PromotionError> {
        self.apply_to(registry, target.into(), at)
    }

    #[tracing::instrument(
        name = "promotions.apply",
        skip_all,
        fields(promotion = %self.name, target = %target.kind(), offer = %self.offer.target_plugin_id)
    )]
    fn apply_to(
        &self,
        registry: &dyn OfferRegistry,
        mut target: PromotionTarget<'_>,
        at: Timestamp,
    ) -> Result<ApplyOutcome, PromotionError> {
        if let Err(reason) = target.eligibility(self, at) {
            debug!(%reason, "promotion not eligible");

            return Ok(ApplyOutcome::Ineligible(reason));
        }

        let offer = registry.resolve(&self.offer)?;

        if offer.target_kind() != target.kind() {
            return Ok(ApplyOutcome::NotApplicable(offer.target_kind()));
        }

        if target
            .adjustments()
            .iter()
            .any(|adjustment| adjustment.source() == Some(self.key))
        {
            debug!("promotion already applied");

            return Ok(ApplyOutcome::AlreadyApplied);
        }

        let adjustments = offer.evaluate(target.as_offer_target())?;
        let count = adjustments.len();

        target.extend_adjustments(
            adjustments
                .into_iter()
                .map(|adjustment| adjustment.with_source(self.key, self.name.clone())),
        )?;

        debug!(adjustments = count, "promotion applied");

        Ok(ApplyOutcome::Applied(count))
    }
}

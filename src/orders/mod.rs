//! Orders
//!
//! Priced aggregates: an [`Order`] owns its [`LineItem`]s and its own
//! order-level adjustments. Totals are computed on demand and never cached.

use rust_decimal::Decimal;
use rusty_money::iso::Currency;
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    adjustments::{Adjustment, AdjustmentKind, sum_adjustments},
    prices::{Price, PriceError},
    uuids::TypedUuid,
};

pub mod line_items;

pub use line_items::LineItem;

/// Store record marker.
#[derive(Debug, Clone, Copy)]
pub struct Store;

/// Store UUID
pub type StoreUuid = TypedUuid<Store>;

/// Order UUID
pub type OrderUuid = TypedUuid<Order>;

/// Errors related to order construction, mutation and totals.
#[derive(Debug, Error, PartialEq)]
pub enum OrderError {
    /// A line item's currency differs from the order currency.
    #[error("line item has currency {actual}, but order has currency {expected}")]
    CurrencyMismatch {
        /// Order currency
        expected: &'static str,

        /// Line item currency
        actual: &'static str,
    },

    /// A line item's order type differs from the order's.
    #[error("line item has order type {actual:?}, but order has order type {expected:?}")]
    OrderTypeMismatch {
        /// Order type of the order
        expected: String,

        /// Order type of the line item
        actual: String,
    },

    /// The order changed since the caller last read it.
    #[error("order version conflict: expected {expected}, found {actual}")]
    VersionConflict {
        /// Version the caller read
        expected: u64,

        /// Current version
        actual: u64,
    },

    /// Wrapped price arithmetic error.
    #[error(transparent)]
    Price(#[from] PriceError),
}

/// Something promotions can be applied to: an order or a line item.
pub trait Promotable {
    /// Order type (bundle) used for eligibility.
    fn order_type(&self) -> &str;

    /// Store the target is sold from, if known.
    fn store(&self) -> Option<StoreUuid>;

    /// Currency of the target's prices.
    fn currency(&self) -> &'static Currency;

    /// Adjustments attached directly to the target.
    fn adjustments(&self) -> &[Adjustment];

    /// Attach several adjustments at once. Either all are attached or none.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::CurrencyMismatch`] if any adjustment is in another currency.
    fn extend_adjustments<I>(&mut self, adjustments: I) -> Result<(), PriceError>
    where
        I: IntoIterator<Item = Adjustment>;
}

/// An order.
#[derive(Debug, Clone)]
pub struct Order {
    uuid: OrderUuid,
    order_type: String,
    store: StoreUuid,
    currency: &'static Currency,
    line_items: Vec<LineItem>,
    adjustments: Vec<Adjustment>,
    version: u64,
}

impl Order {
    /// Create an empty order.
    pub fn new(order_type: impl Into<String>, store: StoreUuid, currency: &'static Currency) -> Self {
        Self {
            uuid: OrderUuid::new_v4(),
            order_type: order_type.into(),
            store,
            currency,
            line_items: Vec::new(),
            adjustments: Vec::new(),
            version: 0,
        }
    }

    /// Replace the generated uuid.
    #[must_use]
    pub fn with_uuid(mut self, uuid: OrderUuid) -> Self {
        self.uuid = uuid;
        self
    }

    /// Order UUID
    pub fn uuid(&self) -> OrderUuid {
        self.uuid
    }

    /// Line items, in the order they were added.
    pub fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }

    /// Mutable access to the line items. Counts as a mutation.
    pub fn line_items_mut(&mut self) -> &mut [LineItem] {
        self.bump();
        &mut self.line_items
    }

    /// Line items without a version bump; pair with [`Order::mark_changed`]
    /// once something was actually changed.
    pub(crate) fn line_items_unversioned(&mut self) -> &mut [LineItem] {
        &mut self.line_items
    }

    pub(crate) fn mark_changed(&mut self) {
        self.bump();
    }

    /// Add a line item. The line item is assigned to the order's store.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::CurrencyMismatch`] if the line item is priced in
    /// another currency, and [`OrderError::OrderTypeMismatch`] if it belongs to
    /// another order type.
    pub fn add_line_item(&mut self, mut line_item: LineItem) -> Result<(), OrderError> {
        let item_currency = line_item.currency();

        if line_item.order_type() != self.order_type {
            return Err(OrderError::OrderTypeMismatch {
                expected: self.order_type.clone(),
                actual: line_item.order_type().to_string(),
            });
        }

        if item_currency != self.currency {
            return Err(OrderError::CurrencyMismatch {
                expected: self.currency.iso_alpha_code,
                actual: item_currency.iso_alpha_code,
            });
        }

        line_item.assign_store(self.store);

        self.line_items.push(line_item);
        self.bump();

        Ok(())
    }

    /// Remove and return the line item at `index`.
    pub fn remove_line_item(&mut self, index: usize) -> Option<LineItem> {
        if index >= self.line_items.len() {
            return None;
        }

        self.bump();

        Some(self.line_items.remove(index))
    }

    /// Attach an order-level adjustment.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::CurrencyMismatch`] if the adjustment is in another currency.
    pub fn add_adjustment(&mut self, adjustment: Adjustment) -> Result<(), PriceError> {
        self.extend_adjustments([adjustment])
    }

    /// Remove adjustments of a kind from the order and all of its line items.
    pub fn clear_adjustments(&mut self, kind: AdjustmentKind) {
        self.adjustments.retain(|adjustment| adjustment.kind() != kind);

        for line_item in &mut self.line_items {
            line_item.clear_adjustments(kind);
        }

        self.bump();
    }

    /// Sum of the line items' undiscounted totals.
    ///
    /// # Errors
    ///
    /// Returns an error on currency mismatch or overflow.
    pub fn subtotal_price(&self) -> Result<Price, PriceError> {
        self.line_items
            .iter()
            .try_fold(Price::zero(self.currency), |acc, line_item| {
                acc.add(line_item.total_price()?)
            })
    }

    /// Sum of all adjustments: order-level ones plus each line item's per-unit
    /// adjustments multiplied by its quantity.
    ///
    /// # Errors
    ///
    /// Returns an error on currency mismatch or overflow.
    pub fn adjustments_total(&self) -> Result<Price, PriceError> {
        let order_level = sum_adjustments(&self.adjustments, self.currency)?;

        self.line_items
            .iter()
            .try_fold(order_level, |acc, line_item| {
                let per_unit = line_item.adjustments_total()?;

                acc.add(per_unit.multiply(Decimal::from(line_item.quantity()))?)
            })
    }

    /// The order total: adjusted line item totals plus order-level adjustments.
    ///
    /// # Errors
    ///
    /// Returns an error on currency mismatch or overflow.
    pub fn total_price(&self) -> Result<Price, PriceError> {
        let line_items = self
            .line_items
            .iter()
            .try_fold(Price::zero(self.currency), |acc, line_item| {
                acc.add(line_item.adjusted_total_price()?)
            })?;

        line_items.add(sum_adjustments(&self.adjustments, self.currency)?)
    }

    /// Monotonic mutation counter.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Fail if the order has been mutated since `expected` was read.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::VersionConflict`] if the versions differ.
    pub fn check_version(&self, expected: u64) -> Result<(), OrderError> {
        if self.version == expected {
            Ok(())
        } else {
            Err(OrderError::VersionConflict {
                expected,
                actual: self.version,
            })
        }
    }

    fn bump(&mut self) {
        self.version = self.version.wrapping_add(1);
    }
}

impl Promotable for Order {
    fn order_type(&self) -> &str {
        &self.order_type
    }

    fn store(&self) -> Option<StoreUuid> {
        Some(self.store)
    }

    fn currency(&self) -> &'static Currency {
        self.currency
    }

    fn adjustments(&self) -> &[Adjustment] {
        &self.adjustments
    }

    fn extend_adjustments<I>(&mut self, adjustments: I) -> Result<(), PriceError>
    where
        I: IntoIterator<Item = Adjustment>,
    {
        let adjustments: SmallVec<[Adjustment; 2]> = adjustments.into_iter().collect();

        line_items::ensure_currency(&adjustments, self.currency)?;

        if !adjustments.is_empty() {
            self.adjustments.extend(adjustments);
            self.bump();
        }

        Ok(())
    }
}

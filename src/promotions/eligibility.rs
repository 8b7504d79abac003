//! Promotion eligibility

use std::fmt;

use jiff::Timestamp;

use crate::orders::StoreUuid;

/// The half-open interval `[start, end)` a promotion is active in. A missing
/// end means the promotion never expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidityWindow {
    start: Timestamp,
    end: Option<Timestamp>,
}

impl ValidityWindow {
    /// A window starting at `start` with no end.
    pub fn starting(start: Timestamp) -> Self {
        Self { start, end: None }
    }

    /// Set the (exclusive) end.
    #[must_use]
    pub fn until(mut self, end: Timestamp) -> Self {
        self.end = Some(end);
        self
    }

    /// Start (inclusive)
    pub fn start(&self) -> Timestamp {
        self.start
    }

    /// End (exclusive)
    pub fn end(&self) -> Option<Timestamp> {
        self.end
    }

    /// Whether no instant can fall inside the window.
    pub fn is_empty(&self) -> bool {
        self.end.is_some_and(|end| end <= self.start)
    }

    /// Check `at` against the window.
    ///
    /// # Errors
    ///
    /// Returns [`Ineligibility::NotStarted`] or [`Ineligibility::Expired`].
    pub fn check(&self, at: Timestamp) -> Result<(), Ineligibility> {
        if at < self.start {
            return Err(Ineligibility::NotStarted { starts: self.start });
        }

        match self.end {
            Some(end) if at >= end => Err(Ineligibility::Expired { ended: end }),
            _ => Ok(()),
        }
    }
}

/// Why a promotion did not apply to a target. Not an error: an ineligible
/// promotion is a silent no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ineligibility {
    /// The promotion is switched off.
    Disabled,

    /// The target's order type is not one the promotion is offered on.
    OrderType(String),

    /// The target's store is unknown or not one the promotion runs in.
    Store(Option<StoreUuid>),

    /// The promotion has not started yet.
    NotStarted {
        /// Start of the promotion
        starts: Timestamp,
    },

    /// The promotion has ended.
    Expired {
        /// End of the promotion
        ended: Timestamp,
    },
}

impl fmt::Display for Ineligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ineligibility::Disabled => f.write_str("promotion is disabled"),
            Ineligibility::OrderType(order_type) => {
                write!(f, "order type {order_type:?} is not eligible")
            }
            Ineligibility::Store(Some(store)) => write!(f, "store {store} is not eligible"),
            Ineligibility::Store(None) => f.write_str("target has no store"),
            Ineligibility::NotStarted { starts } => write!(f, "promotion starts at {starts}"),
            Ineligibility::Expired { ended } => write!(f, "promotion ended at {ended}"),
        }
    }
}

//! Rebate prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    adjustments::{Adjustment, AdjustmentKind},
    config::{ConfigError, OrderFile, PromotionsFile},
    offers::{
        Offer, OfferConfiguration, OfferError, OfferManager, OfferRegistry, OfferTarget,
        OrderPercentageOff, PercentageOffConfiguration, ProductPercentageOff, TargetKind,
    },
    orders::{LineItem, Order, OrderError, OrderUuid, Promotable, StoreUuid},
    prices::{Price, PriceError},
    promotions::{
        ApplyOutcome, ApplyReport, Ineligibility, Promotion, PromotionError, PromotionKey,
        PromotionTarget, Promotions, ValidityWindow,
    },
    summary::{OrderSummary, SummaryError},
};

//! Rebate
//!
//! Rebate is a promotion engine for orders: it checks which promotions an order
//! or line item is eligible for, evaluates their offers and attaches the
//! resulting price adjustments without touching base prices.

pub mod adjustments;
pub mod config;
pub mod offers;
pub mod orders;
pub mod prelude;
pub mod prices;
pub mod promotions;
pub mod summary;
pub mod uuids;

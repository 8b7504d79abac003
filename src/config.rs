//! YAML configuration
//!
//! Promotions and orders can be described in YAML files and loaded into a
//! [`Promotions`] catalog and an [`Order`].

use std::{fs, path::Path};

use jiff::Timestamp;
use serde::{Deserialize, de::DeserializeOwned};
use thiserror::Error;

use crate::{
    adjustments::Adjustment,
    offers::{OfferConfiguration, OfferRegistry},
    orders::{LineItem, Order, OrderError, OrderUuid, StoreUuid},
    prices::{Price, PriceError, currency_from_code},
    promotions::{Promotion, PromotionError, PromotionKey, Promotions},
};

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading a configuration file
    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price or currency
    #[error(transparent)]
    Price(#[from] PriceError),

    /// The order could not be assembled
    #[error(transparent)]
    Order(#[from] OrderError),

    /// A promotion failed save-time validation
    #[error("invalid promotion {name:?}: {source}")]
    Promotion {
        /// Promotion name
        name: String,

        /// Validation error
        #[source]
        source: PromotionError,
    },
}

fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let contents = fs::read_to_string(path)?;

    Ok(serde_norway::from_str(&contents)?)
}

/// Wrapper for promotions in YAML
#[derive(Debug, Deserialize)]
pub struct PromotionsFile {
    /// Promotions, in the order they are applied
    pub promotions: Vec<PromotionConfig>,
}

impl PromotionsFile {
    /// Read a promotions file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        read_yaml(path.as_ref())
    }

    /// Parse promotions from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the YAML is malformed.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_norway::from_str(yaml)?)
    }

    /// Validate and save every promotion into `catalog`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Promotion`] for the first promotion that fails
    /// validation. Promotions before it stay saved.
    pub fn save_into<R: OfferRegistry>(
        self,
        catalog: &mut Promotions<R>,
    ) -> Result<Vec<PromotionKey>, ConfigError> {
        self.promotions
            .into_iter()
            .map(|config| {
                let name = config.name.clone();

                catalog
                    .save(|key| config.into_promotion(key))
                    .map_err(|source| ConfigError::Promotion { name, source })
            })
            .collect()
    }

    /// Build a catalog backed by the built-in offers.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Promotion`] if a promotion fails validation.
    pub fn into_catalog(self) -> Result<Promotions, ConfigError> {
        let mut catalog = Promotions::new();

        self.save_into(&mut catalog)?;

        Ok(catalog)
    }
}

fn enabled() -> bool {
    true
}

/// Promotion from YAML
#[derive(Debug, Clone, Deserialize)]
pub struct PromotionConfig {
    /// Promotion name
    pub name: String,

    /// Eligible order types
    #[serde(default)]
    pub order_types: Vec<String>,

    /// Eligible stores
    #[serde(default)]
    pub stores: Vec<StoreUuid>,

    /// Whether the promotion is enabled
    #[serde(default = "enabled")]
    pub status: bool,

    /// Start of the promotion (inclusive)
    pub start_date: Timestamp,

    /// End of the promotion (exclusive), if any
    #[serde(default)]
    pub end_date: Option<Timestamp>,

    /// Offer plugin id and its configuration
    pub offer: OfferConfiguration,
}

impl PromotionConfig {
    /// Convert to a [`Promotion`] stored under `key`.
    pub fn into_promotion(self, key: PromotionKey) -> Promotion {
        let promotion = Promotion::new(key, self.name, self.offer, self.start_date)
            .with_order_types(self.order_types)
            .with_stores(self.stores)
            .with_status(self.status);

        match self.end_date {
            Some(end) => promotion.ending(end),
            None => promotion,
        }
    }
}

/// Wrapper for an order in YAML
#[derive(Debug, Deserialize)]
pub struct OrderFile {
    /// The order
    pub order: OrderConfig,
}

impl OrderFile {
    /// Read an order file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        read_yaml(path.as_ref())
    }

    /// Parse an order from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the YAML is malformed.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_norway::from_str(yaml)?)
    }

    /// Build the order.
    ///
    /// # Errors
    ///
    /// See [`OrderConfig::into_order`].
    pub fn into_order(self) -> Result<Order, ConfigError> {
        self.order.into_order()
    }
}

/// Order from YAML
#[derive(Debug, Clone, Deserialize)]
pub struct OrderConfig {
    /// Order UUID; generated when missing
    #[serde(default)]
    pub uuid: Option<OrderUuid>,

    /// Order type
    pub order_type: String,

    /// Store the order is placed in
    pub store: StoreUuid,

    /// ISO 4217 currency code
    pub currency: String,

    /// Line items
    #[serde(default)]
    pub line_items: Vec<LineItemConfig>,

    /// Manual order-level adjustments
    #[serde(default)]
    pub adjustments: Vec<AdjustmentConfig>,
}

impl OrderConfig {
    /// Build the order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Price`] for unknown currencies or malformed
    /// prices, and [`ConfigError::Order`] if a line item is priced in another
    /// currency than the order.
    pub fn into_order(self) -> Result<Order, ConfigError> {
        let currency = currency_from_code(&self.currency)?;
        let mut order = Order::new(self.order_type.clone(), self.store, currency);

        if let Some(uuid) = self.uuid {
            order = order.with_uuid(uuid);
        }

        for line_item in self.line_items {
            order.add_line_item(line_item.into_line_item(&self.order_type)?)?;
        }

        for adjustment in self.adjustments {
            order.add_adjustment(adjustment.into_adjustment()?)?;
        }

        Ok(order)
    }
}

/// Line item from YAML
#[derive(Debug, Clone, Deserialize)]
pub struct LineItemConfig {
    /// Title
    pub title: String,

    /// Unit price, e.g. `"20.00 USD"`
    pub unit_price: String,

    /// Quantity
    pub quantity: u32,
}

impl LineItemConfig {
    /// Convert to a [`LineItem`] for orders of `order_type`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Price`] if the unit price is malformed.
    pub fn into_line_item(self, order_type: &str) -> Result<LineItem, ConfigError> {
        let unit_price: Price = self.unit_price.parse()?;

        Ok(LineItem::new(self.title, order_type, unit_price, self.quantity))
    }
}

/// Manual adjustment from YAML
#[derive(Debug, Clone, Deserialize)]
pub struct AdjustmentConfig {
    /// Label
    pub label: String,

    /// Signed amount, e.g. `"-1.50 USD"`
    pub amount: String,
}

impl AdjustmentConfig {
    /// Convert to a custom [`Adjustment`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Price`] if the amount is malformed.
    pub fn into_adjustment(self) -> Result<Adjustment, ConfigError> {
        Ok(Adjustment::custom(self.label, self.amount.parse()?))
    }
}

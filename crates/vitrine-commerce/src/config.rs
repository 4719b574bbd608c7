//! Store configuration.
//!
//! Defaults reproduce the storefront as it ships: prices in BRL, free
//! shipping strictly above R$500.00, three shipping tiers with "standard"
//! preselected.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::checkout::ShippingOption;
use crate::error::CommerceError;
use crate::ids::ShippingOptionId;
use crate::money::{Currency, Money};

/// Maximum quantity allowed per line item unless configured otherwise.
pub const MAX_QUANTITY_PER_ITEM: i64 = 9999;

/// Largest per-line limit a configuration may set.
pub const QUANTITY_LIMIT_CEILING: i64 = 1_000_000;

/// Pricing, shipping and checkout settings for one storefront.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    /// Currency every price is expected in.
    pub currency: Currency,
    /// Subtotal above which shipping is free, in minor units.
    pub free_shipping_threshold_cents: i64,
    /// Shipping price used when the selected option cannot be resolved.
    pub fallback_shipping_cents: i64,
    /// Option preselected when checkout begins.
    pub default_shipping_option: ShippingOptionId,
    /// Upper bound on a single line's quantity.
    pub max_quantity_per_item: i64,
    /// Available shipping tiers.
    pub shipping_options: Vec<ShippingOption>,
    /// Checkout submission settings.
    pub checkout: CheckoutConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        let currency = Currency::BRL;
        Self {
            currency,
            free_shipping_threshold_cents: 50000,
            fallback_shipping_cents: 2990,
            default_shipping_option: ShippingOptionId::new("standard"),
            max_quantity_per_item: MAX_QUANTITY_PER_ITEM,
            shipping_options: vec![
                ShippingOption::new("standard", "Padrão", Money::new(2990, currency), "5-7 dias úteis"),
                ShippingOption::new("express", "Expresso", Money::new(4990, currency), "2-3 dias úteis"),
                ShippingOption::new("same-day", "Same Day", Money::new(7990, currency), "Hoje"),
            ],
            checkout: CheckoutConfig::default(),
        }
    }
}

impl StoreConfig {
    /// Load config from a TOML or JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CommerceError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            CommerceError::Config(format!("failed to read {}: {e}", path.display()))
        })?;

        let config = if path.extension().is_some_and(|ext| ext == "json") {
            Self::from_json_str(&content)?
        } else {
            Self::from_toml_str(&content)?
        };
        tracing::debug!(path = %path.display(), "store config loaded");
        Ok(config)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, CommerceError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(content: &str) -> Result<Self, CommerceError> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Render as TOML.
    pub fn to_toml_string(&self) -> Result<String, CommerceError> {
        toml::to_string_pretty(self).map_err(|e| CommerceError::SerializationError(e.to_string()))
    }

    /// Check internal consistency.
    pub fn validate(&self) -> Result<(), CommerceError> {
        if self.shipping_options.is_empty() {
            return Err(CommerceError::Config("no shipping options configured".to_string()));
        }
        for (i, option) in self.shipping_options.iter().enumerate() {
            if self.shipping_options[..i].iter().any(|o| o.id == option.id) {
                return Err(CommerceError::Config(format!(
                    "duplicate shipping option {}",
                    option.id
                )));
            }
            if option.price.currency != self.currency {
                return Err(CommerceError::Config(format!(
                    "shipping option {} is priced in {}, store uses {}",
                    option.id, option.price.currency, self.currency
                )));
            }
            if option.price.is_negative() {
                return Err(CommerceError::Config(format!(
                    "shipping option {} has a negative price",
                    option.id
                )));
            }
        }
        if !self
            .shipping_options
            .iter()
            .any(|o| o.id == self.default_shipping_option)
        {
            return Err(CommerceError::Config(format!(
                "default shipping option {} is not offered",
                self.default_shipping_option
            )));
        }
        if self.free_shipping_threshold_cents < 0 || self.fallback_shipping_cents < 0 {
            return Err(CommerceError::Config("negative shipping amounts".to_string()));
        }
        if !(1..=QUANTITY_LIMIT_CEILING).contains(&self.max_quantity_per_item) {
            return Err(CommerceError::Config(format!(
                "max_quantity_per_item must be between 1 and {QUANTITY_LIMIT_CEILING}"
            )));
        }
        if self.checkout.submit_timeout_ms == 0 {
            return Err(CommerceError::Config("submit_timeout_ms must be positive".to_string()));
        }
        Ok(())
    }

    /// Free-shipping threshold as money.
    pub fn free_shipping_threshold(&self) -> Money {
        Money::new(self.free_shipping_threshold_cents, self.currency)
    }

    /// Fallback shipping price as money.
    pub fn fallback_shipping(&self) -> Money {
        Money::new(self.fallback_shipping_cents, self.currency)
    }
}

/// Checkout submission settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CheckoutConfig {
    /// Upper bound on one order submission.
    pub submit_timeout_ms: u64,
    /// Latency of the simulated order gateway.
    pub simulated_latency_ms: u64,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            submit_timeout_ms: 10_000,
            simulated_latency_ms: 2_000,
        }
    }
}

impl CheckoutConfig {
    pub fn submit_timeout(&self) -> Duration {
        Duration::from_millis(self.submit_timeout_ms)
    }

    pub fn simulated_latency(&self) -> Duration {
        Duration::from_millis(self.simulated_latency_ms)
    }
}

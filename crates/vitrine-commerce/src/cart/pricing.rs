//! Cart pricing calculations.
//!
//! Shipping is free whenever the subtotal is strictly above the threshold,
//! whichever tier is selected. Otherwise the selected tier's price applies,
//! or the fallback price when the selection does not resolve.

use serde::{Deserialize, Serialize};

use crate::cart::CartLineItem;
use crate::checkout::ShippingOption;
use crate::config::StoreConfig;
use crate::error::CommerceError;
use crate::ids::ShippingOptionId;
use crate::money::{Currency, Money};

/// Pricing breakdown for a cart and shipping choice.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Totals {
    /// Sum of price times quantity.
    pub subtotal: Money,
    /// Shipping after the free-shipping override.
    pub shipping_cost: Money,
    /// Subtotal plus shipping.
    pub total: Money,
    /// Whether the free-shipping override applied.
    pub free_shipping: bool,
}

/// Computes cart totals. Holds no state besides its settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricingEngine {
    currency: Currency,
    free_shipping_threshold: Money,
    fallback_shipping: Money,
}

impl PricingEngine {
    /// Create an engine with explicit settings.
    pub fn new(currency: Currency, free_shipping_threshold: Money, fallback_shipping: Money) -> Self {
        Self {
            currency,
            free_shipping_threshold,
            fallback_shipping,
        }
    }

    /// Create an engine from the store config.
    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(
            config.currency,
            config.free_shipping_threshold(),
            config.fallback_shipping(),
        )
    }

    /// Compute subtotal, shipping and total.
    pub fn compute_totals(
        &self,
        items: &[CartLineItem],
        shipping_options: &[ShippingOption],
        selected_shipping: Option<&ShippingOptionId>,
    ) -> Result<Totals, CommerceError> {
        let subtotal = subtotal(items, self.currency)?;
        let free_shipping = self.qualifies_for_free_shipping(&subtotal);

        let shipping_cost = if free_shipping {
            Money::zero(self.currency)
        } else {
            self.shipping_price(shipping_options, selected_shipping)
        };

        let total = subtotal
            .try_add(&shipping_cost)
            .ok_or_else(|| self.mismatch_or_overflow(&shipping_cost))?;

        Ok(Totals {
            subtotal,
            shipping_cost,
            total,
            free_shipping,
        })
    }

    /// Whether a subtotal gets free shipping.
    pub fn qualifies_for_free_shipping(&self, subtotal: &Money) -> bool {
        subtotal.amount_cents > self.free_shipping_threshold.amount_cents
    }

    /// How much more must be spent before shipping becomes free.
    ///
    /// The threshold is exclusive, so at exactly the threshold one minor
    /// unit is still missing.
    pub fn amount_until_free_shipping(&self, subtotal: &Money) -> Result<Money, CommerceError> {
        if self.qualifies_for_free_shipping(subtotal) {
            return Ok(Money::zero(self.currency));
        }
        self.free_shipping_threshold
            .try_subtract(subtotal)
            .and_then(|gap| gap.try_add(&Money::new(1, self.currency)))
            .ok_or_else(|| self.mismatch_or_overflow(subtotal))
    }

    /// Price of the selected option before any free-shipping override.
    pub fn shipping_price(
        &self,
        shipping_options: &[ShippingOption],
        selected_shipping: Option<&ShippingOptionId>,
    ) -> Money {
        match selected_shipping.and_then(|id| ShippingOption::find(shipping_options, id)) {
            Some(option) => option.price,
            None => {
                tracing::warn!(
                    selected = ?selected_shipping.map(ShippingOptionId::as_str),
                    fallback = %self.fallback_shipping,
                    "shipping option unresolved, using fallback price"
                );
                self.fallback_shipping
            }
        }
    }

    /// Amount for one line of the order summary.
    pub fn line_total(&self, item: &CartLineItem) -> Result<Money, CommerceError> {
        item.line_total()
    }

    /// Free-shipping threshold.
    pub fn free_shipping_threshold(&self) -> Money {
        self.free_shipping_threshold
    }

    fn mismatch_or_overflow(&self, other: &Money) -> CommerceError {
        if other.currency != self.currency {
            CommerceError::CurrencyMismatch {
                expected: self.currency.code().to_string(),
                got: other.currency.code().to_string(),
            }
        } else {
            CommerceError::Overflow
        }
    }
}

impl Default for PricingEngine {
    fn default() -> Self {
        Self::from_config(&StoreConfig::default())
    }
}

/// Sum of price times quantity over the lines.
pub fn subtotal(items: &[CartLineItem], currency: Currency) -> Result<Money, CommerceError> {
    let mut sum = Money::zero(currency);
    for item in items {
        let line = item.line_total()?;
        if line.currency != currency {
            return Err(CommerceError::CurrencyMismatch {
                expected: currency.code().to_string(),
                got: line.currency.code().to_string(),
            });
        }
        sum = sum.try_add(&line).ok_or(CommerceError::Overflow)?;
    }
    Ok(sum)
}

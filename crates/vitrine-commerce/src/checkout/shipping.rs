//! Shipping option types.

use crate::ids::ShippingOptionId;
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// A shipping tier offered at checkout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShippingOption {
    /// Unique identifier (e.g., "standard").
    pub id: ShippingOptionId,
    /// Display name.
    pub name: String,
    /// Delivery estimate as shown to the customer (e.g., "5-7 dias úteis").
    pub estimated_days: String,
    /// Shipping price before any free-shipping override.
    pub price: Money,
}

impl ShippingOption {
    /// Create a new shipping option.
    pub fn new(
        id: impl Into<ShippingOptionId>,
        name: impl Into<String>,
        price: Money,
        estimated_days: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            estimated_days: estimated_days.into(),
            price,
        }
    }

    /// Check if this option costs nothing on its own.
    pub fn is_free(&self) -> bool {
        self.price.is_zero()
    }

    /// Find an option by id.
    pub fn find<'a>(options: &'a [ShippingOption], id: &ShippingOptionId) -> Option<&'a ShippingOption> {
        options.iter().find(|o| &o.id == id)
    }
}

//! Order types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cart::{CartLineItem, Totals};
use crate::checkout::{AddressForm, IdentityForm, PaymentForm};
use crate::error::CommerceError;
use crate::ids::{CheckoutId, OrderId, ProductId, ShippingOptionId};
use crate::money::Money;

/// A line of an order, copied out of the cart at submission time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderLine {
    /// Product ID.
    pub product_id: ProductId,
    /// Product name at time of order.
    pub name: String,
    /// Variant color.
    pub color: String,
    /// Variant size.
    pub size: String,
    /// Quantity ordered.
    pub quantity: i64,
    /// Unit price at time of order.
    pub unit_price: Money,
    /// Total price for this line.
    pub total_price: Money,
}

impl OrderLine {
    /// Copy a cart line.
    pub fn from_cart_line(item: &CartLineItem) -> Result<Self, CommerceError> {
        Ok(Self {
            product_id: item.product.id.clone(),
            name: item.product.name.clone(),
            color: item.selected_color.clone(),
            size: item.selected_size.clone(),
            quantity: item.quantity,
            unit_price: item.product.price,
            total_price: item.line_total()?,
        })
    }
}

/// Everything the gateway needs to place an order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderRequest {
    /// Checkout that produced the request.
    pub checkout_id: CheckoutId,
    /// Ordered lines.
    pub lines: Vec<OrderLine>,
    /// Customer identity.
    pub identity: IdentityForm,
    /// Delivery address.
    pub address: AddressForm,
    /// Card details. Skipped when serialized.
    #[serde(skip)]
    pub payment: PaymentForm,
    /// Selected shipping tier.
    pub shipping_option: ShippingOptionId,
    /// Totals quoted to the customer.
    pub totals: Totals,
}

impl OrderRequest {
    /// Get total item count.
    pub fn item_count(&self) -> i64 {
        self.lines
            .iter()
            .fold(0_i64, |acc, l| acc.saturating_add(l.quantity))
    }
}

/// What the gateway answers when it accepts an order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderReceipt {
    /// Unique order identifier.
    pub order_id: OrderId,
    /// Human-readable order number.
    pub order_number: String,
}

impl OrderReceipt {
    /// Mint a receipt with a fresh id and order number.
    pub fn generate() -> Self {
        Self {
            order_id: OrderId::generate(),
            order_number: generate_order_number(Utc::now()),
        }
    }
}

/// Terminal outcome of a successful checkout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderConfirmation {
    /// Unique order identifier.
    pub order_id: OrderId,
    /// Human-readable order number.
    pub order_number: String,
    /// Checkout that placed the order.
    pub checkout_id: CheckoutId,
    /// Customer email.
    pub email: String,
    /// Number of items ordered.
    pub item_count: i64,
    /// Amounts charged.
    pub totals: Totals,
    /// When the order was accepted.
    pub placed_at: DateTime<Utc>,
}

impl OrderConfirmation {
    /// Combine a request with the gateway's receipt.
    pub fn new(request: &OrderRequest, receipt: OrderReceipt) -> Self {
        Self {
            order_id: receipt.order_id,
            order_number: receipt.order_number,
            checkout_id: request.checkout_id.clone(),
            email: request.identity.email.clone(),
            item_count: request.item_count(),
            totals: request.totals,
            placed_at: Utc::now(),
        }
    }
}

/// Generate an order number such as `VT-20260119-1A2B3C`.
pub fn generate_order_number(at: DateTime<Utc>) -> String {
    let suffix: String = uuid::Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(6)
        .collect();
    format!("VT-{}-{}", at.format("%Y%m%d"), suffix.to_uppercase())
}

//! Shopping cart module.
//!
//! Contains the cart store, its line items and the pricing engine.

mod cart;
pub mod pricing;

pub use cart::{CartLineItem, CartSnapshot, CartStore, LineKey};
pub use pricing::{PricingEngine, Totals};

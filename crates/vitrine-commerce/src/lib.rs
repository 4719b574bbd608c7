//! Storefront core for Vitrine.
//!
//! This crate holds the parts of the storefront with real state:
//!
//! - **Catalog**: Products, color variants with per-size stock, shelves and
//!   catalog page queries
//! - **Cart**: Line items keyed by product, color and size, observable snapshots
//! - **Pricing**: Subtotal, shipping with the free-shipping threshold, total
//! - **Checkout**: Three-step flow with a guarded, cancellable order submission
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::{Arc, Mutex};
//! use vitrine_commerce::prelude::*;
//!
//! let config = StoreConfig::default();
//! let catalog = StaticCatalog::seeded()?;
//! let shirt = catalog.get_by_id(&ProductId::new("classic-white-shirt")).unwrap();
//!
//! let mut cart = CartStore::from_config(&config);
//! cart.add_item(shirt, "Branco", "M", 1)?;
//!
//! let gateway = Arc::new(SimulatedGateway::from_config(&config.checkout));
//! let mut flow = CheckoutFlow::begin(&cart, &config, gateway)?;
//! // fill the forms, advance to payment...
//! let cart = Mutex::new(cart);
//! let confirmation = flow.submit(&cart).await?;
//! println!("Order {}", confirmation.order_number);
//! ```

pub mod config;
pub mod error;
pub mod ids;
pub mod money;

pub mod cart;
pub mod catalog;
pub mod checkout;

pub use config::StoreConfig;
pub use error::{CommerceError, ErrorKind, SubmissionError};
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::{CheckoutConfig, StoreConfig};
    pub use crate::error::{CommerceError, ErrorKind, SubmissionError};
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};

    // Catalog
    pub use crate::catalog::{
        CatalogQuery, Category, FlagFilter, Product, ProductCatalog, SizeStock, SortOption,
        StaticCatalog, Variant,
    };

    // Cart
    pub use crate::cart::{CartLineItem, CartSnapshot, CartStore, LineKey, PricingEngine, Totals};

    // Checkout
    pub use crate::checkout::{
        buy_now, AddressForm, CheckoutFlow, CheckoutStep, IdentityForm, OrderConfirmation,
        OrderGateway, OrderReceipt, OrderRequest, PaymentForm, ShippingOption, SimulatedGateway,
    };
}

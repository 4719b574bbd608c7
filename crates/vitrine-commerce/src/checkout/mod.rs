//! Checkout module.
//!
//! Contains the checkout flow, its forms, shipping tiers, orders and the
//! gateway orders are submitted through.

mod flow;
mod forms;
mod gateway;
mod order;
mod shipping;

pub use flow::{buy_now, CheckoutFlow, CheckoutStep};
pub use forms::{AddressForm, IdentityForm, PaymentForm};
pub use gateway::{OrderGateway, SimulatedGateway};
pub use order::{generate_order_number, OrderConfirmation, OrderLine, OrderReceipt, OrderRequest};
pub use shipping::ShippingOption;

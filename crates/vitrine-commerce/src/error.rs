//! Commerce error types.

use std::time::Duration;

use thiserror::Error;

/// Broad classification of a [`CommerceError`].
///
/// Presentation layers use this to pick the kind of notification to show;
/// none of these are fatal to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The caller passed something the cart or checkout refuses.
    Validation,
    /// The operation is not allowed in the current state.
    State,
    /// Order submission failed.
    Submission,
    /// Arithmetic, configuration or serialization failure.
    Internal,
}

/// Errors that can occur in storefront operations.
#[derive(Error, Debug)]
pub enum CommerceError {
    /// Invalid quantity.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Quantity exceeds maximum allowed.
    #[error("Quantity {0} exceeds maximum allowed ({1})")]
    QuantityExceedsLimit(i64, i64),

    /// The product has no variant in the requested color.
    #[error("Product {product_id} is not offered in color {color:?}")]
    VariantNotFound { product_id: String, color: String },

    /// The variant has no such size (or no size was selected).
    #[error("Product {product_id} ({color}) is not offered in size {size:?}")]
    SizeNotFound {
        product_id: String,
        color: String,
        size: String,
    },

    /// Variant record rejected at construction.
    #[error("Invalid variant: {0}")]
    InvalidVariant(String),

    /// Currency mismatch.
    #[error("Currency mismatch: expected {expected}, got {got}")]
    CurrencyMismatch { expected: String, got: String },

    /// Checkout forms incomplete.
    #[error("Checkout incomplete: missing {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// Checkout needs a non-empty cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Invalid checkout state transition.
    #[error("Invalid checkout transition from {from} to {to}")]
    InvalidCheckoutTransition { from: String, to: String },

    /// The checkout already produced an order.
    #[error("Checkout already completed as order {0}")]
    CheckoutCompleted(String),

    /// Another submission is still in flight.
    #[error("An order submission is already in progress")]
    SubmissionInProgress,

    /// Order submission failed.
    #[error("Order submission failed: {0}")]
    Submission(#[from] SubmissionError),

    /// Arithmetic overflow.
    #[error("Arithmetic overflow in money calculation")]
    Overflow,

    /// Invalid store configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl CommerceError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CommerceError::InvalidQuantity(_)
            | CommerceError::QuantityExceedsLimit(..)
            | CommerceError::VariantNotFound { .. }
            | CommerceError::SizeNotFound { .. }
            | CommerceError::InvalidVariant(_)
            | CommerceError::CurrencyMismatch { .. }
            | CommerceError::MissingFields(_) => ErrorKind::Validation,
            CommerceError::EmptyCart
            | CommerceError::InvalidCheckoutTransition { .. }
            | CommerceError::CheckoutCompleted(_)
            | CommerceError::SubmissionInProgress => ErrorKind::State,
            CommerceError::Submission(_) => ErrorKind::Submission,
            CommerceError::Overflow
            | CommerceError::Config(_)
            | CommerceError::SerializationError(_) => ErrorKind::Internal,
        }
    }
}

impl From<serde_json::Error> for CommerceError {
    fn from(e: serde_json::Error) -> Self {
        CommerceError::SerializationError(e.to_string())
    }
}

impl From<toml::de::Error> for CommerceError {
    fn from(e: toml::de::Error) -> Self {
        CommerceError::SerializationError(e.to_string())
    }
}

/// Reasons an order submission did not go through.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    /// The gateway answered and refused the order.
    #[error("Order rejected: {0}")]
    Rejected(String),

    /// No answer within the configured bound.
    #[error("Submission timed out after {0:?}")]
    Timeout(Duration),

    /// The caller cancelled the in-flight submission.
    #[error("Submission cancelled")]
    Cancelled,

    /// Transport or gateway failure.
    #[error("Gateway error: {0}")]
    Gateway(String),
}

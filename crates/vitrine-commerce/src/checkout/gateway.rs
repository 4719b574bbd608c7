//! Order submission backends.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::checkout::{OrderReceipt, OrderRequest};
use crate::config::CheckoutConfig;
use crate::error::SubmissionError;

/// Places orders on behalf of a checkout.
///
/// Implementations must not have side effects visible to the cart; the
/// checkout clears the cart itself once a receipt comes back.
#[async_trait]
pub trait OrderGateway: Send + Sync + 'static {
    async fn place_order(&self, request: &OrderRequest) -> Result<OrderReceipt, SubmissionError>;
}

/// Gateway that waits a fixed latency, then accepts (or rejects) every order.
#[derive(Debug)]
pub struct SimulatedGateway {
    latency: Duration,
    reject_reason: Option<String>,
    calls: AtomicU64,
}

impl SimulatedGateway {
    /// Accept every order after `latency`.
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            reject_reason: None,
            calls: AtomicU64::new(0),
        }
    }

    /// Use the configured simulated latency.
    pub fn from_config(config: &CheckoutConfig) -> Self {
        Self::new(config.simulated_latency())
    }

    /// Reject every order with `reason` instead.
    pub fn rejecting(mut self, reason: impl Into<String>) -> Self {
        self.reject_reason = Some(reason.into());
        self
    }

    /// Number of orders this gateway has been asked to place.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }
}

impl Default for SimulatedGateway {
    fn default() -> Self {
        Self::from_config(&CheckoutConfig::default())
    }
}

#[async_trait]
impl OrderGateway for SimulatedGateway {
    async fn place_order(&self, request: &OrderRequest) -> Result<OrderReceipt, SubmissionError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if let Some(reason) = &self.reject_reason {
            return Err(SubmissionError::Rejected(reason.clone()));
        }
        let receipt = OrderReceipt::generate();
        tracing::debug!(
            checkout_id = %request.checkout_id,
            order_number = %receipt.order_number,
            "simulated gateway accepted order"
        );
        Ok(receipt)
    }
}

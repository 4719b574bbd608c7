//! Checkout flow state machine.
//!
//! Three ordered steps (identity, shipping, payment) followed by a single
//! guarded submission. A successful submission is the only way to reach
//! the terminal outcome, and it is the only place the cart gets cleared.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Notify;

use crate::cart::{CartStore, PricingEngine, Totals};
use crate::catalog::Product;
use crate::checkout::{
    AddressForm, IdentityForm, OrderConfirmation, OrderGateway, OrderLine, OrderRequest,
    PaymentForm, ShippingOption,
};
use crate::config::StoreConfig;
use crate::error::{CommerceError, SubmissionError};
use crate::ids::{CheckoutId, ShippingOptionId};

/// Steps in the checkout flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CheckoutStep {
    /// Contact information.
    Identity,
    /// Delivery address and shipping tier.
    Shipping,
    /// Card details.
    Payment,
}

impl CheckoutStep {
    /// All steps in order.
    pub const ALL: [CheckoutStep; 3] = [
        CheckoutStep::Identity,
        CheckoutStep::Shipping,
        CheckoutStep::Payment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutStep::Identity => "identity",
            CheckoutStep::Shipping => "shipping",
            CheckoutStep::Payment => "payment",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            CheckoutStep::Identity => "Dados",
            CheckoutStep::Shipping => "Entrega",
            CheckoutStep::Payment => "Pagamento",
        }
    }

    /// Get the step number (1-indexed).
    pub fn number(&self) -> u8 {
        match self {
            CheckoutStep::Identity => 1,
            CheckoutStep::Shipping => 2,
            CheckoutStep::Payment => 3,
        }
    }

    /// The following step, if any.
    pub fn next(&self) -> Option<CheckoutStep> {
        match self {
            CheckoutStep::Identity => Some(CheckoutStep::Shipping),
            CheckoutStep::Shipping => Some(CheckoutStep::Payment),
            CheckoutStep::Payment => None,
        }
    }

    /// The preceding step, if any.
    pub fn previous(&self) -> Option<CheckoutStep> {
        match self {
            CheckoutStep::Identity => None,
            CheckoutStep::Shipping => Some(CheckoutStep::Identity),
            CheckoutStep::Payment => Some(CheckoutStep::Shipping),
        }
    }
}

impl fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Holds the submission flag for as long as it lives.
struct SubmitGuard<'a>(&'a AtomicBool);

impl<'a> SubmitGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// One checkout session over a non-empty cart.
pub struct CheckoutFlow {
    id: CheckoutId,
    step: CheckoutStep,
    identity: IdentityForm,
    address: AddressForm,
    payment: PaymentForm,
    selected_shipping: ShippingOptionId,
    shipping_options: Vec<ShippingOption>,
    pricing: PricingEngine,
    submit_timeout: Duration,
    gateway: Arc<dyn OrderGateway>,
    submitting: AtomicBool,
    cancel: Notify,
    confirmation: OnceLock<OrderConfirmation>,
}

impl CheckoutFlow {
    /// Begin checkout. Fails with [`CommerceError::EmptyCart`] when there is
    /// nothing to buy.
    pub fn begin(
        cart: &CartStore,
        config: &StoreConfig,
        gateway: Arc<dyn OrderGateway>,
    ) -> Result<Self, CommerceError> {
        if cart.is_empty() {
            return Err(CommerceError::EmptyCart);
        }

        let flow = Self {
            id: CheckoutId::generate(),
            step: CheckoutStep::Identity,
            identity: IdentityForm::default(),
            address: AddressForm::default(),
            payment: PaymentForm::default(),
            selected_shipping: config.default_shipping_option.clone(),
            shipping_options: config.shipping_options.clone(),
            pricing: PricingEngine::from_config(config),
            submit_timeout: config.checkout.submit_timeout(),
            gateway,
            submitting: AtomicBool::new(false),
            cancel: Notify::new(),
            confirmation: OnceLock::new(),
        };
        tracing::info!(
            checkout_id = %flow.id,
            items = cart.total_items(),
            "checkout started"
        );
        Ok(flow)
    }

    pub fn id(&self) -> &CheckoutId {
        &self.id
    }

    pub fn step(&self) -> CheckoutStep {
        self.step
    }

    /// Get progress percentage.
    pub fn progress_percent(&self) -> u8 {
        let percent = u32::from(self.step.number()) * 100 / CheckoutStep::ALL.len() as u32;
        percent as u8
    }

    /// Move to the next step. At the last step this does nothing; the
    /// last step is left only through [`CheckoutFlow::submit`].
    pub fn advance(&mut self) -> CheckoutStep {
        if let Some(next) = self.step.next() {
            self.move_to(next);
        }
        self.step
    }

    /// Move to the previous step. Does nothing at the first step.
    pub fn back(&mut self) -> CheckoutStep {
        if let Some(previous) = self.step.previous() {
            self.move_to(previous);
        }
        self.step
    }

    /// Like [`CheckoutFlow::advance`], but only once the current step's
    /// form is complete.
    pub fn try_advance(&mut self) -> Result<CheckoutStep, CommerceError> {
        let missing = self.missing_for_step(self.step);
        if !missing.is_empty() {
            return Err(CommerceError::MissingFields(missing));
        }
        Ok(self.advance())
    }

    fn move_to(&mut self, step: CheckoutStep) {
        tracing::info!(
            checkout_id = %self.id,
            from = %self.step,
            to = %step,
            "checkout step changed"
        );
        self.step = step;
    }

    /// Required fields still blank for a step.
    pub fn missing_for_step(&self, step: CheckoutStep) -> Vec<&'static str> {
        match step {
            CheckoutStep::Identity => self.identity.missing_fields(),
            CheckoutStep::Shipping => self.address.missing_fields(),
            CheckoutStep::Payment => self.payment.missing_fields(),
        }
    }

    /// Required fields still blank across all steps.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        CheckoutStep::ALL
            .iter()
            .flat_map(|step| self.missing_for_step(*step))
            .collect()
    }

    pub fn identity(&self) -> &IdentityForm {
        &self.identity
    }

    pub fn set_identity(&mut self, identity: IdentityForm) {
        self.identity = identity;
    }

    pub fn address(&self) -> &AddressForm {
        &self.address
    }

    pub fn set_address(&mut self, address: AddressForm) {
        self.address = address;
    }

    pub fn payment(&self) -> &PaymentForm {
        &self.payment
    }

    pub fn set_payment(&mut self, payment: PaymentForm) {
        self.payment = payment;
    }

    /// Shipping tiers offered in this checkout.
    pub fn shipping_options(&self) -> &[ShippingOption] {
        &self.shipping_options
    }

    pub fn selected_shipping(&self) -> &ShippingOptionId {
        &self.selected_shipping
    }

    /// Record the chosen shipping tier. Prices are only recomputed by
    /// [`CheckoutFlow::quote`].
    pub fn select_shipping(&mut self, option: impl Into<ShippingOptionId>) {
        self.selected_shipping = option.into();
        tracing::debug!(
            checkout_id = %self.id,
            shipping = %self.selected_shipping,
            "shipping option selected"
        );
    }

    /// Totals for the live cart and the selected tier.
    pub fn quote(&self, cart: &CartStore) -> Result<Totals, CommerceError> {
        self.pricing.compute_totals(
            cart.items(),
            &self.shipping_options,
            Some(&self.selected_shipping),
        )
    }

    /// Whether an order submission is in flight.
    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    /// Whether an order was placed.
    pub fn is_complete(&self) -> bool {
        self.confirmation.get().is_some()
    }

    /// The placed order, once submission succeeded.
    pub fn confirmation(&self) -> Option<&OrderConfirmation> {
        self.confirmation.get()
    }

    /// Abort the in-flight submission, if any. Returns whether there was one.
    pub fn cancel_submission(&self) -> bool {
        if !self.is_submitting() {
            return false;
        }
        self.cancel.notify_waiters();
        true
    }

    /// Place the order.
    ///
    /// Only one submission runs at a time. The cart is cleared only after
    /// the gateway confirms; on any failure the flow stays at the payment
    /// step with every field intact.
    #[tracing::instrument(name = "checkout.submit", skip_all, fields(checkout_id = %self.id))]
    pub async fn submit(&self, cart: &Mutex<CartStore>) -> Result<OrderConfirmation, CommerceError> {
        // Registered before the flag is raised, so any cancel that observes
        // `is_submitting()` reaches this attempt.
        let cancelled = self.cancel.notified();
        tokio::pin!(cancelled);
        cancelled.as_mut().enable();

        let Some(_guard) = SubmitGuard::acquire(&self.submitting) else {
            tracing::warn!("submission already in progress");
            return Err(CommerceError::SubmissionInProgress);
        };
        if let Some(done) = self.confirmation.get() {
            return Err(CommerceError::CheckoutCompleted(done.order_number.clone()));
        }
        if self.step != CheckoutStep::Payment {
            return Err(CommerceError::InvalidCheckoutTransition {
                from: self.step.as_str().to_string(),
                to: "submitted".to_string(),
            });
        }

        let request = {
            let cart = lock(cart);
            self.build_request(&cart)?
        };

        let cancelled_early = tokio::select! {
            biased;
            () = &mut cancelled => true,
            () = std::future::ready(()) => false,
        };

        let timeout = self.submit_timeout;
        let outcome = if cancelled_early {
            Err(SubmissionError::Cancelled)
        } else {
            // A receipt already in hand wins over a cancel in the same poll.
            tokio::select! {
                biased;
                result = tokio::time::timeout(timeout, self.gateway.place_order(&request)) => {
                    match result {
                        Ok(outcome) => outcome,
                        Err(_) => Err(SubmissionError::Timeout(timeout)),
                    }
                }
                () = &mut cancelled => Err(SubmissionError::Cancelled),
            }
        };

        let receipt = match outcome {
            Ok(receipt) => receipt,
            Err(e) => {
                match &e {
                    SubmissionError::Rejected(reason) => {
                        tracing::warn!(%reason, "order rejected by gateway")
                    }
                    _ => tracing::error!(error = %e, "order submission failed"),
                }
                return Err(e.into());
            }
        };

        let confirmation = OrderConfirmation::new(&request, receipt);
        lock(cart).clear();
        tracing::info!(
            order_number = %confirmation.order_number,
            total = %confirmation.totals.total,
            "order placed"
        );
        Ok(self.confirmation.get_or_init(|| confirmation).clone())
    }

    fn build_request(&self, cart: &CartStore) -> Result<OrderRequest, CommerceError> {
        if cart.is_empty() {
            return Err(CommerceError::EmptyCart);
        }
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(CommerceError::MissingFields(missing));
        }

        let lines = cart
            .items()
            .iter()
            .map(OrderLine::from_cart_line)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(OrderRequest {
            checkout_id: self.id.clone(),
            lines,
            identity: self.identity.clone(),
            address: self.address.clone(),
            payment: self.payment.clone(),
            shipping_option: self.selected_shipping.clone(),
            totals: self.quote(cart)?,
        })
    }
}

impl fmt::Debug for CheckoutFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckoutFlow")
            .field("id", &self.id)
            .field("step", &self.step)
            .field("identity", &self.identity)
            .field("address", &self.address)
            .field("payment", &self.payment)
            .field("selected_shipping", &self.selected_shipping)
            .field("submitting", &self.is_submitting())
            .field("confirmation", &self.confirmation.get())
            .finish_non_exhaustive()
    }
}

/// Add a product and go straight to checkout.
pub fn buy_now(
    cart: &mut CartStore,
    product: Arc<Product>,
    color: &str,
    size: &str,
    quantity: i64,
    config: &StoreConfig,
    gateway: Arc<dyn OrderGateway>,
) -> Result<CheckoutFlow, CommerceError> {
    cart.add_item(product, color, size, quantity)?;
    CheckoutFlow::begin(cart, config, gateway)
}

fn lock(cart: &Mutex<CartStore>) -> MutexGuard<'_, CartStore> {
    cart.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Variant;
    use crate::checkout::{OrderReceipt, SimulatedGateway};
    use crate::error::ErrorKind;
    use crate::money::{Currency, Money};

    fn product(price_cents: i64) -> Arc<Product> {
        Arc::new(
            Product::new("shirt", "Camisa", Money::new(price_cents, Currency::BRL), "camisas")
                .with_variant(Variant::new("Black", "#000000", [("M", 5), ("G", 2)]).unwrap()),
        )
    }

    fn cart_with(price_cents: i64, quantity: i64) -> CartStore {
        let mut cart = CartStore::default();
        cart.add_item(product(price_cents), "Black", "M", quantity).unwrap();
        cart
    }

    fn config(latency_ms: u64, timeout_ms: u64) -> StoreConfig {
        let mut config = StoreConfig::default();
        config.checkout.simulated_latency_ms = latency_ms;
        config.checkout.submit_timeout_ms = timeout_ms;
        config
    }

    fn gateway(config: &StoreConfig) -> Arc<SimulatedGateway> {
        Arc::new(SimulatedGateway::from_config(&config.checkout))
    }

    fn fill(flow: &mut CheckoutFlow) {
        flow.set_identity(IdentityForm::new("Ana", "ana@example.com", "11 99999-0000", "123.456.789-00"));
        flow.set_address(AddressForm {
            zip: "01310-100".to_string(),
            state: "SP".to_string(),
            city: "São Paulo".to_string(),
            neighborhood: "Bela Vista".to_string(),
            street: "Av. Paulista".to_string(),
            number: "1000".to_string(),
            complement: None,
        });
        flow.set_payment(PaymentForm::new("4111 1111 1111 1111", "ANA", "12/30", "123"));
    }

    fn ready_flow(cart: &CartStore, config: &StoreConfig, gateway: Arc<SimulatedGateway>) -> CheckoutFlow {
        let mut flow = CheckoutFlow::begin(cart, config, gateway).unwrap();
        fill(&mut flow);
        flow.advance();
        flow.advance();
        flow
    }

    #[test]
    fn test_begin_requires_items() {
        let config = StoreConfig::default();
        let err = CheckoutFlow::begin(&CartStore::default(), &config, gateway(&config)).unwrap_err();
        assert!(matches!(err, CommerceError::EmptyCart));
        assert_eq!(err.kind(), ErrorKind::State);
    }

    #[test]
    fn test_steps_clamp_at_bounds() {
        let config = StoreConfig::default();
        let mut flow = CheckoutFlow::begin(&cart_with(1000, 1), &config, gateway(&config)).unwrap();

        assert_eq!(flow.back(), CheckoutStep::Identity);
        assert_eq!(flow.advance(), CheckoutStep::Shipping);
        assert_eq!(flow.advance(), CheckoutStep::Payment);
        assert_eq!(flow.advance(), CheckoutStep::Payment);
        assert_eq!(flow.progress_percent(), 100);
        assert_eq!(flow.back(), CheckoutStep::Shipping);
        assert_eq!(flow.progress_percent(), 66);
    }

    #[test]
    fn test_try_advance_requires_current_form() {
        let config = StoreConfig::default();
        let mut flow = CheckoutFlow::begin(&cart_with(1000, 1), &config, gateway(&config)).unwrap();

        let err = flow.try_advance().unwrap_err();
        assert!(matches!(err, CommerceError::MissingFields(ref f) if f.contains(&"email")));
        assert_eq!(flow.step(), CheckoutStep::Identity);

        fill(&mut flow);
        assert_eq!(flow.try_advance().unwrap(), CheckoutStep::Shipping);
    }

    #[test]
    fn test_quote_follows_selection() {
        let config = StoreConfig::default();
        let cart = cart_with(10000, 1);
        let mut flow = CheckoutFlow::begin(&cart, &config, gateway(&config)).unwrap();

        assert_eq!(flow.selected_shipping().as_str(), "standard");
        assert_eq!(flow.quote(&cart).unwrap().shipping_cost.amount_cents, 2990);

        flow.select_shipping("express");
        let totals = flow.quote(&cart).unwrap();
        assert_eq!(totals.shipping_cost.amount_cents, 4990);
        assert_eq!(totals.subtotal.amount_cents, 10000);
    }

    #[test]
    fn test_buy_now_adds_then_begins() {
        let config = StoreConfig::default();
        let mut cart = CartStore::default();
        let flow = buy_now(&mut cart, product(5000), "Black", "G", 1, &config, gateway(&config)).unwrap();
        assert_eq!(cart.total_items(), 1);
        assert_eq!(flow.step(), CheckoutStep::Identity);
    }

    #[test]
    fn test_buy_now_rejects_unselected_size() {
        let config = StoreConfig::default();
        let mut cart = CartStore::default();
        let err = buy_now(&mut cart, product(5000), "Black", "", 1, &config, gateway(&config)).unwrap_err();
        assert!(matches!(err, CommerceError::SizeNotFound { .. }));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_debug_masks_payment() {
        let config = StoreConfig::default();
        let mut flow = CheckoutFlow::begin(&cart_with(1000, 1), &config, gateway(&config)).unwrap();
        fill(&mut flow);
        let debug = format!("{flow:?}");
        assert!(!debug.contains("4111 1111"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_success_clears_cart() {
        let config = config(2000, 10_000);
        let gateway = gateway(&config);
        let cart = Mutex::new(cart_with(20000, 2));
        let flow = ready_flow(&cart.lock().unwrap(), &config, gateway.clone());

        let confirmation = flow.submit(&cart).await.unwrap();

        assert!(cart.lock().unwrap().is_empty());
        assert!(flow.is_complete());
        assert!(!flow.is_submitting());
        assert_eq!(flow.confirmation(), Some(&confirmation));
        assert_eq!(confirmation.item_count, 2);
        assert_eq!(confirmation.totals.total.amount_cents, 40000 + 2990);
        assert_eq!(gateway.calls(), 1);

        let again = flow.submit(&cart).await.unwrap_err();
        assert!(matches!(again, CommerceError::CheckoutCompleted(_)));
        assert_eq!(gateway.calls(), 1);
    }

    #[tokio::test]
    async fn test_submit_outside_payment_step() {
        let config = config(0, 10_000);
        let cart = Mutex::new(cart_with(1000, 1));
        let mut flow = CheckoutFlow::begin(&cart.lock().unwrap(), &config, gateway(&config)).unwrap();
        fill(&mut flow);
        flow.advance();

        let err = flow.submit(&cart).await.unwrap_err();
        assert!(matches!(err, CommerceError::InvalidCheckoutTransition { .. }));
        assert!(!flow.is_submitting());
    }

    #[tokio::test]
    async fn test_submit_with_blank_fields_keeps_cart() {
        let config = config(0, 10_000);
        let gateway = gateway(&config);
        let cart = Mutex::new(cart_with(1000, 1));
        let mut flow = ready_flow(&cart.lock().unwrap(), &config, gateway.clone());
        flow.set_payment(PaymentForm::default());

        let err = flow.submit(&cart).await.unwrap_err();
        assert!(matches!(err, CommerceError::MissingFields(ref f) if f.len() == 4));
        assert_eq!(cart.lock().unwrap().total_items(), 1);
        assert_eq!(gateway.calls(), 0);
    }

    #[tokio::test]
    async fn test_submit_with_emptied_cart() {
        let config = config(0, 10_000);
        let cart = Mutex::new(cart_with(1000, 1));
        let flow = ready_flow(&cart.lock().unwrap(), &config, gateway(&config));
        cart.lock().unwrap().clear();

        let err = flow.submit(&cart).await.unwrap_err();
        assert!(matches!(err, CommerceError::EmptyCart));
    }

    #[tokio::test]
    async fn test_rejected_submission_keeps_state() {
        let config = config(0, 10_000);
        let gateway = Arc::new(SimulatedGateway::new(Duration::ZERO).rejecting("card declined"));
        let cart = Mutex::new(cart_with(1000, 3));
        let flow = ready_flow(&cart.lock().unwrap(), &config, gateway);

        let err = flow.submit(&cart).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Submission);
        assert_eq!(flow.step(), CheckoutStep::Payment);
        assert!(!flow.is_submitting());
        assert!(!flow.is_complete());
        assert!(flow.payment().is_complete());
        assert_eq!(cart.lock().unwrap().total_items(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submission_times_out() {
        let config = config(20_000, 10_000);
        let cart = Mutex::new(cart_with(1000, 1));
        let flow = ready_flow(&cart.lock().unwrap(), &config, gateway(&config));

        let err = flow.submit(&cart).await.unwrap_err();
        assert!(matches!(
            err,
            CommerceError::Submission(SubmissionError::Timeout(d)) if d == Duration::from_secs(10)
        ));
        assert!(!cart.lock().unwrap().is_empty());
        assert!(!flow.is_submitting());
    }

    #[tokio::test(start_paused = true)]
    async fn test_double_submit_runs_once() {
        let config = config(2000, 10_000);
        let gateway = gateway(&config);
        let cart = Mutex::new(cart_with(1000, 1));
        let flow = ready_flow(&cart.lock().unwrap(), &config, gateway.clone());

        let (first, second) = tokio::join!(flow.submit(&cart), flow.submit(&cart));

        assert!(first.is_ok());
        assert!(matches!(second, Err(CommerceError::SubmissionInProgress)));
        assert_eq!(gateway.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_in_flight_submission() {
        let config = config(2000, 10_000);
        let cart = Mutex::new(cart_with(1000, 1));
        let flow = ready_flow(&cart.lock().unwrap(), &config, gateway(&config));

        assert!(!flow.cancel_submission());
        let (result, cancelled) = tokio::join!(flow.submit(&cart), async {
            tokio::task::yield_now().await;
            flow.cancel_submission()
        });

        assert!(cancelled);
        assert!(matches!(
            result,
            Err(CommerceError::Submission(SubmissionError::Cancelled))
        ));
        assert_eq!(cart.lock().unwrap().total_items(), 1);
        assert!(!flow.is_submitting());
    }

    #[test]
    fn test_cancel_while_waiting_for_cart_is_honored() {
        let config = config(0, 10_000);
        let gateway = gateway(&config);
        let cart = Mutex::new(cart_with(1000, 1));
        let flow = ready_flow(&cart.lock().unwrap(), &config, gateway.clone());

        let held = cart.lock().unwrap();
        let result = std::thread::scope(|s| {
            let submitting = s.spawn(|| {
                tokio::runtime::Builder::new_current_thread()
                    .enable_time()
                    .build()
                    .unwrap()
                    .block_on(flow.submit(&cart))
            });
            while !flow.is_submitting() {
                std::thread::yield_now();
            }
            assert!(flow.cancel_submission());
            drop(held);
            submitting.join().unwrap()
        });

        assert!(matches!(
            result,
            Err(CommerceError::Submission(SubmissionError::Cancelled))
        ));
        assert_eq!(gateway.calls(), 0);
        assert_eq!(cart.lock().unwrap().total_items(), 1);
        assert!(!flow.is_submitting());
    }

    /// Accepts immediately, but asks the flow to cancel while doing so.
    struct CancelsWhileAccepting {
        flow: OnceLock<std::sync::Weak<CheckoutFlow>>,
    }

    #[async_trait::async_trait]
    impl OrderGateway for CancelsWhileAccepting {
        async fn place_order(&self, _request: &OrderRequest) -> Result<OrderReceipt, SubmissionError> {
            if let Some(flow) = self.flow.get().and_then(std::sync::Weak::upgrade) {
                assert!(flow.cancel_submission());
            }
            Ok(OrderReceipt::generate())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_receipt_wins_over_simultaneous_cancel() {
        let config = config(0, 10_000);
        let gateway = Arc::new(CancelsWhileAccepting { flow: OnceLock::new() });
        let cart = Mutex::new(cart_with(1000, 1));

        let mut flow = CheckoutFlow::begin(&cart.lock().unwrap(), &config, gateway.clone()).unwrap();
        fill(&mut flow);
        flow.advance();
        flow.advance();
        let flow = Arc::new(flow);
        gateway.flow.set(Arc::downgrade(&flow)).unwrap();

        let confirmation = flow.submit(&cart).await.unwrap();

        assert!(flow.is_complete());
        assert_eq!(flow.confirmation(), Some(&confirmation));
        assert!(cart.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_submission_releases_guard() {
        let config = config(2000, 10_000);
        let cart = Mutex::new(cart_with(1000, 1));
        let flow = ready_flow(&cart.lock().unwrap(), &config, gateway(&config));

        let abandoned = tokio::time::timeout(Duration::from_millis(100), flow.submit(&cart)).await;
        assert!(abandoned.is_err());
        assert!(!flow.is_submitting());

        assert!(flow.submit(&cart).await.is_ok());
    }
}

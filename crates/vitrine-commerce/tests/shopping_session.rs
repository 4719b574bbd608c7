//! End-to-end shopping sessions through the public API.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use vitrine_commerce::prelude::*;

fn seeded() -> StaticCatalog {
    StaticCatalog::seeded().expect("bundled catalog loads")
}

fn product(catalog: &StaticCatalog, id: &str) -> Arc<Product> {
    catalog
        .get_by_id(&ProductId::new(id))
        .unwrap_or_else(|| panic!("{id} is in the bundled catalog"))
}

fn priced(id: &str, cents: i64) -> Arc<Product> {
    Arc::new(
        Product::new(id, id, Money::new(cents, Currency::BRL), "test")
            .with_variant(Variant::new("Black", "#000000", [("M", 3), ("G", 1)]).unwrap()),
    )
}

fn fill_forms(flow: &mut CheckoutFlow) {
    flow.set_identity(IdentityForm::new(
        "Ana Souza",
        "ana@example.com",
        "11 99999-0000",
        "123.456.789-00",
    ));
    flow.set_address(AddressForm {
        zip: "01310-100".to_string(),
        state: "SP".to_string(),
        city: "São Paulo".to_string(),
        neighborhood: "Bela Vista".to_string(),
        street: "Av. Paulista".to_string(),
        number: "1000".to_string(),
        complement: Some("ap 12".to_string()),
    });
    flow.set_payment(PaymentForm::new("4111 1111 1111 1111", "ANA SOUZA", "12/30", "123"));
}

#[test]
fn test_repeated_adds_merge_into_one_line() {
    let a = priced("a", 1000);
    let mut cart = CartStore::default();

    cart.add_item(Arc::clone(&a), "Black", "M", 1).unwrap();
    cart.add_item(Arc::clone(&a), "Black", "M", 2).unwrap();

    assert_eq!(cart.unique_item_count(), 1);
    assert_eq!(cart.items()[0].quantity, 3);
    assert!(Arc::ptr_eq(&cart.items()[0].product, &a));
}

#[test]
fn test_total_price_matches_independent_sum() {
    let catalog = seeded();
    let mut cart = CartStore::default();
    cart.add_item(product(&catalog, "classic-white-shirt"), "Branco", "M", 2).unwrap();
    cart.add_item(product(&catalog, "luxury-polo-black"), "Preto", "G", 1).unwrap();
    cart.add_item(product(&catalog, "classic-white-shirt"), "Branco", "GG", 1).unwrap();
    cart.update_quantity(&ProductId::new("luxury-polo-black"), "Preto", "G", 4).unwrap();

    let expected: i64 = cart
        .items()
        .iter()
        .map(|i| i.product.price.amount_cents * i.quantity)
        .sum();
    assert_eq!(cart.total_price().unwrap().amount_cents, expected);
    assert_eq!(cart.total_items(), 7);
}

#[test]
fn test_update_to_zero_matches_remove() {
    let a = priced("a", 1000);
    let b = priced("b", 2500);
    let build = || {
        let mut cart = CartStore::default();
        cart.add_item(Arc::clone(&a), "Black", "M", 2).unwrap();
        cart.add_item(Arc::clone(&b), "Black", "G", 1).unwrap();
        cart
    };

    let mut updated = build();
    updated.update_quantity(&ProductId::new("a"), "Black", "M", 0).unwrap();
    let mut removed = build();
    removed.remove_item(&ProductId::new("a"), "Black", "M");

    assert_eq!(updated.items(), removed.items());
    assert!(!removed.remove_item(&ProductId::new("a"), "Black", "M"));
}

#[test]
fn test_subtotal_above_threshold_waives_every_tier() {
    let config = StoreConfig::default();
    let engine = PricingEngine::from_config(&config);
    let mut cart = CartStore::from_config(&config);
    cart.add_item(priced("a", 30000), "Black", "M", 2).unwrap();

    for option in &config.shipping_options {
        let totals = engine
            .compute_totals(cart.items(), &config.shipping_options, Some(&option.id))
            .unwrap();
        assert_eq!(totals.subtotal.amount_cents, 60000);
        assert_eq!(totals.total, totals.subtotal);
    }
}

#[test]
fn test_catalog_shelves() {
    let catalog = seeded();
    assert_eq!(catalog.len(), 6);
    assert_eq!(catalog.list_featured().len(), 3);
    assert_eq!(catalog.list_best_sellers().len(), 3);
    assert_eq!(catalog.list_new_arrivals().len(), 3);
    assert_eq!(catalog.list_by_category(&CategoryId::new("jackets")).len(), 1);

    let cheapest_first = CatalogQuery::new().with_sort(SortOption::PriceAsc).run(&catalog);
    assert_eq!(cheapest_first[0].id.as_str(), "luxury-polo-black");
}

#[tokio::test(start_paused = true)]
async fn test_checkout_happy_path_empties_cart() {
    let config = StoreConfig::default();
    let catalog = seeded();
    let gateway = Arc::new(SimulatedGateway::from_config(&config.checkout));

    let mut cart = CartStore::from_config(&config);
    cart.add_item(product(&catalog, "cashmere-turtleneck"), "Cinza Chumbo", "M", 1).unwrap();
    let mut observer = cart.subscribe();

    let mut flow = CheckoutFlow::begin(&cart, &config, gateway.clone()).unwrap();
    assert_eq!(flow.step(), CheckoutStep::Identity);
    fill_forms(&mut flow);
    flow.select_shipping("same-day");
    assert_eq!(flow.advance(), CheckoutStep::Shipping);
    assert_eq!(flow.advance(), CheckoutStep::Payment);

    let quoted = flow.quote(&cart).unwrap();
    assert!(quoted.free_shipping);

    let cart = Mutex::new(cart);
    let confirmation = flow.submit(&cart).await.unwrap();

    assert!(cart.lock().unwrap().is_empty());
    assert!(flow.is_complete());
    assert_eq!(confirmation.totals, quoted);
    assert_eq!(confirmation.email, "ana@example.com");
    assert!(observer.has_changed().unwrap());
    assert!(observer.borrow_and_update().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_immediate_double_submit_places_one_order() {
    let config = StoreConfig::default();
    let gateway = Arc::new(SimulatedGateway::from_config(&config.checkout));

    let mut cart = CartStore::from_config(&config);
    let mut flow = buy_now(
        &mut cart,
        priced("a", 4990),
        "Black",
        "M",
        1,
        &config,
        gateway.clone(),
    )
    .unwrap();
    fill_forms(&mut flow);
    flow.advance();
    flow.advance();

    let cart = Mutex::new(cart);
    let (first, second) = tokio::join!(flow.submit(&cart), flow.submit(&cart));

    assert!(first.is_ok());
    assert!(matches!(second, Err(CommerceError::SubmissionInProgress)));
    assert_eq!(gateway.calls(), 1);
    assert!(cart.lock().unwrap().is_empty());
}

/// Stalls on the first order, accepts every later one at once.
#[derive(Default)]
struct StallsOnce {
    calls: AtomicU64,
}

#[async_trait::async_trait]
impl OrderGateway for StallsOnce {
    async fn place_order(&self, _request: &OrderRequest) -> Result<OrderReceipt, SubmissionError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            tokio::time::sleep(Duration::from_secs(5)).await;
        }
        Ok(OrderReceipt::generate())
    }
}

#[tokio::test(start_paused = true)]
async fn test_failed_submission_can_be_retried() {
    let mut config = StoreConfig::default();
    config.checkout.submit_timeout_ms = 1_000;
    let gateway = Arc::new(StallsOnce::default());

    let mut cart = CartStore::from_config(&config);
    cart.add_item(priced("a", 10000), "Black", "G", 1).unwrap();
    let mut flow = CheckoutFlow::begin(&cart, &config, gateway.clone()).unwrap();
    fill_forms(&mut flow);
    flow.advance();
    flow.advance();
    let cart = Mutex::new(cart);

    let err = flow.submit(&cart).await.unwrap_err();
    assert!(matches!(
        err,
        CommerceError::Submission(SubmissionError::Timeout(d)) if d == Duration::from_secs(1)
    ));
    assert_eq!(flow.step(), CheckoutStep::Payment);
    assert!(!flow.is_submitting());
    assert!(!flow.is_complete());
    assert_eq!(cart.lock().unwrap().total_items(), 1);
    assert_eq!(flow.identity().email, "ana@example.com");

    let quoted = flow.quote(&cart.lock().unwrap()).unwrap();
    assert_eq!(quoted.shipping_cost.amount_cents, 2990);

    let confirmation = flow.submit(&cart).await.unwrap();
    assert_eq!(gateway.calls.load(Ordering::SeqCst), 2);
    assert_eq!(confirmation.totals, quoted);
    assert!(flow.is_complete());
    assert!(cart.lock().unwrap().is_empty());
}

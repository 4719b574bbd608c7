//! Price a cart.

use anyhow::Result;
use serde::Serialize;
use vitrine_commerce::cart::{CartStore, PricingEngine, Totals};
use vitrine_commerce::ShippingOptionId;

use super::{build_cart, QuoteArgs};
use crate::context::Context;
use crate::output::format_price;

#[derive(Serialize)]
struct QuoteReport<'a> {
    items: i64,
    shipping_option: &'a ShippingOptionId,
    totals: Totals,
    amount_until_free_shipping: vitrine_commerce::Money,
}

/// Run the quote command.
pub async fn run(args: QuoteArgs, ctx: &Context) -> Result<()> {
    let cart = build_cart(&args.items, ctx)?;
    let shipping = args
        .shipping
        .map(ShippingOptionId::new)
        .unwrap_or_else(|| ctx.config.default_shipping_option.clone());

    let engine = PricingEngine::from_config(&ctx.config);
    let totals = engine.compute_totals(cart.items(), &ctx.config.shipping_options, Some(&shipping))?;
    let until_free = engine.amount_until_free_shipping(&totals.subtotal)?;

    if ctx.output.is_json() {
        ctx.output.json(&QuoteReport {
            items: cart.total_items(),
            shipping_option: &shipping,
            totals,
            amount_until_free_shipping: until_free,
        });
        return Ok(());
    }

    ctx.output.header("Resumo do pedido");
    print_lines(&cart, &engine, ctx)?;
    print_totals(&totals, ctx);
    if !totals.free_shipping {
        ctx.output.info(&format!(
            "Faltam {} para frete grátis",
            format_price(&until_free)
        ));
    }

    Ok(())
}

/// Print one row per cart line.
pub fn print_lines(cart: &CartStore, engine: &PricingEngine, ctx: &Context) -> Result<()> {
    for item in cart.items() {
        let line_total = engine.line_total(item)?;
        ctx.output.list_item(&format!(
            "{} ({} / {}) x{}  {}",
            item.product.name,
            item.selected_color,
            item.selected_size,
            item.quantity,
            format_price(&line_total)
        ));
    }
    Ok(())
}

/// Print subtotal, shipping and total.
pub fn print_totals(totals: &Totals, ctx: &Context) {
    ctx.output.kv("Subtotal", &format_price(&totals.subtotal));
    let shipping = if totals.free_shipping {
        "Grátis".to_string()
    } else {
        format_price(&totals.shipping_cost)
    };
    ctx.output.kv("Frete", &shipping);
    ctx.output.kv("Total", &format_price(&totals.total));
}

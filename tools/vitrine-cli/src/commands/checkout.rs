//! Run a checkout end to end.

use std::sync::{Arc, Mutex};

use anyhow::{Context as _, Result};
use dialoguer::Confirm;
use vitrine_commerce::cart::PricingEngine;
use vitrine_commerce::checkout::{
    AddressForm, CheckoutFlow, CheckoutStep, IdentityForm, OrderGateway, PaymentForm,
    SimulatedGateway,
};

use super::quote::{print_lines, print_totals};
use super::{build_cart, CheckoutArgs};
use crate::context::Context;
use crate::output::format_price;

/// Run the checkout command.
pub async fn run(args: CheckoutArgs, ctx: &Context) -> Result<()> {
    let cart = build_cart(&args.items, ctx)?;

    let mut gateway = SimulatedGateway::from_config(&ctx.config.checkout);
    if let Some(reason) = &args.reject {
        gateway = gateway.rejecting(reason.as_str());
    }
    let gateway: Arc<dyn OrderGateway> = Arc::new(gateway);

    let mut flow = CheckoutFlow::begin(&cart, &ctx.config, gateway)?;
    if let Some(shipping) = &args.shipping {
        flow.select_shipping(shipping.as_str());
    }
    fill_forms(&mut flow, &args);

    ctx.output.header("Checkout");
    for step in CheckoutStep::ALL {
        ctx.output
            .step(step.number(), CheckoutStep::ALL.len(), step.display_name());
        flow.try_advance()
            .with_context(|| format!("Step {} is incomplete", step.display_name()))?;
    }

    let totals = flow.quote(&cart)?;
    if !ctx.output.is_json() {
        ctx.output.info("");
        print_lines(&cart, &PricingEngine::from_config(&ctx.config), ctx)?;
        ctx.output.kv("Entrega", &flow.address().one_line());
        ctx.output.kv("Cartão", &flow.payment().masked_card_number());
        print_totals(&totals, ctx);
    }

    if !args.yes && !ctx.output.is_json() {
        ctx.output.info("");
        let confirmed = Confirm::new()
            .with_prompt(format!("Confirmar pedido de {}?", format_price(&totals.total)))
            .default(true)
            .interact()?;

        if !confirmed {
            ctx.output.warn("Checkout cancelled");
            return Ok(());
        }
    }

    let cart = Mutex::new(cart);
    let spinner = ctx.output.spinner("Enviando pedido...");
    let result = {
        let submit = flow.submit(&cart);
        tokio::pin!(submit);
        loop {
            tokio::select! {
                result = &mut submit => break result,
                _ = tokio::signal::ctrl_c() => {
                    if flow.cancel_submission() {
                        spinner.set_message("Cancelando...");
                    }
                }
            }
        }
    };
    spinner.finish_and_clear();

    let confirmation = result.context("Order was not placed")?;

    if ctx.output.is_json() {
        ctx.output.json(&confirmation);
        return Ok(());
    }

    ctx.output.success(&format!(
        "Pedido {} realizado com sucesso!",
        confirmation.order_number
    ));
    ctx.output.kv("Total", &format_price(&confirmation.totals.total));
    ctx.output.kv(
        "Data",
        &confirmation
            .placed_at
            .with_timezone(&chrono::Local)
            .format("%d/%m/%Y %H:%M")
            .to_string(),
    );

    Ok(())
}

fn fill_forms(flow: &mut CheckoutFlow, args: &CheckoutArgs) {
    flow.set_identity(IdentityForm::new(
        args.name.as_str(),
        args.email.as_str(),
        args.phone.as_str(),
        args.document.as_str(),
    ));
    flow.set_address(AddressForm {
        zip: args.zip.clone(),
        state: args.state.clone(),
        city: args.city.clone(),
        neighborhood: args.neighborhood.clone(),
        street: args.street.clone(),
        number: args.number.clone(),
        complement: args.complement.clone(),
    });
    flow.set_payment(PaymentForm::new(
        args.card_number.as_str(),
        args.card_name.as_str(),
        args.card_expiry.as_str(),
        args.card_cvv.as_str(),
    ));
}

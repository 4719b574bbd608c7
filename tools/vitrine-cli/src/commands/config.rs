//! Configuration management commands.

use std::fs;

use anyhow::{bail, Context as _, Result};
use vitrine_commerce::StoreConfig;

use super::{ConfigArgs, ConfigCommand};
use crate::config::generate_default_config;
use crate::context::Context;
use crate::output::format_price;

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx).await,
        ConfigCommand::Init { force } => init_config(force, ctx).await,
        ConfigCommand::Validate => validate_config(ctx).await,
    }
}

async fn show_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Current Configuration");

    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    let source = ctx
        .config_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(defaults)".to_string());
    ctx.output.kv("source", &source);

    let config = &ctx.config;
    ctx.output.info("");
    ctx.output.info("[store]");
    ctx.output.kv("currency", config.currency.code());
    ctx.output.kv(
        "free_shipping_above",
        &format_price(&config.free_shipping_threshold()),
    );
    ctx.output
        .kv("fallback_shipping", &format_price(&config.fallback_shipping()));
    ctx.output
        .kv("default_shipping_option", config.default_shipping_option.as_str());
    ctx.output.kv(
        "max_quantity_per_item",
        &config.max_quantity_per_item.to_string(),
    );

    ctx.output.info("");
    ctx.output.info("[checkout]");
    ctx.output.kv(
        "submit_timeout_ms",
        &config.checkout.submit_timeout_ms.to_string(),
    );
    ctx.output.kv(
        "simulated_latency_ms",
        &config.checkout.simulated_latency_ms.to_string(),
    );

    ctx.output.info("");
    ctx.output.info("Shipping options:");
    for option in &config.shipping_options {
        ctx.output.list_item(&format!(
            "{} - {} ({}, {})",
            option.id,
            option.name,
            format_price(&option.price),
            option.estimated_days
        ));
    }

    Ok(())
}

async fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.cwd.join("vitrine.toml");

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    let content = generate_default_config(&StoreConfig::default())?;
    fs::write(&config_path, content)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    ctx.output.success(&format!("Created: {}", config_path.display()));

    Ok(())
}

async fn validate_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Validating configuration");

    let Some(path) = &ctx.config_path else {
        ctx.output
            .warn("No config file found; the built-in defaults are in use");
        return Ok(());
    };

    // Loading the context already parsed and validated the file.
    let mut warnings: Vec<String> = Vec::new();
    let config = &ctx.config;

    if config
        .shipping_options
        .iter()
        .any(|o| o.price.amount_cents > config.free_shipping_threshold_cents)
    {
        warnings.push("a shipping option costs more than the free-shipping threshold".to_string());
    }
    if config.checkout.simulated_latency_ms >= config.checkout.submit_timeout_ms {
        warnings.push(
            "checkout.simulated_latency_ms is not below submit_timeout_ms; every simulated order will time out"
                .to_string(),
        );
    }

    for warning in &warnings {
        ctx.output.warn(&format!("Warning: {}", warning));
    }

    if warnings.is_empty() {
        ctx.output.success(&format!("{} is valid", path.display()));
    } else {
        ctx.output
            .success(&format!("{} is valid (with warnings)", path.display()));
    }

    Ok(())
}

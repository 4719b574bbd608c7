//! Show one product.

use anyhow::{anyhow, Result};
use vitrine_commerce::catalog::ProductCatalog;
use vitrine_commerce::ProductId;

use super::ProductArgs;
use crate::context::Context;
use crate::output::{format_price, product_badges};

/// Run the product command.
pub async fn run(args: ProductArgs, ctx: &Context) -> Result<()> {
    let product = ctx
        .catalog
        .get_by_id(&ProductId::new(args.id.as_str()))
        .ok_or_else(|| anyhow!("Unknown product: {}", args.id))?;

    if ctx.output.is_json() {
        ctx.output.json(&product);
        return Ok(());
    }

    ctx.output.header(&product.name);
    ctx.output.kv("id", product.id.as_str());
    ctx.output.kv("price", &format_price(&product.price));
    ctx.output.kv("category", product.category.as_str());
    let badges = product_badges(&product);
    if !badges.is_empty() {
        ctx.output.kv("shelves", &badges);
    }
    if !product.description.is_empty() {
        ctx.output.kv("description", &product.description);
    }

    for variant in &product.variants {
        ctx.output.info("");
        ctx.output.info(&format!("{} ({})", variant.color(), variant.color_code()));
        for size in variant.sizes() {
            let stock = if size.stock == 0 {
                "esgotado".to_string()
            } else {
                format!("{} em estoque", size.stock)
            };
            ctx.output.list_item(&format!("{}: {}", size.size, stock));
        }
    }

    Ok(())
}

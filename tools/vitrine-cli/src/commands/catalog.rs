//! Browse the catalog.

use anyhow::{Context as _, Result};
use vitrine_commerce::catalog::{CatalogQuery, ProductCatalog};
use vitrine_commerce::Money;

use super::CatalogArgs;
use crate::context::Context;
use crate::output::{format_price, product_badges};

/// Run the catalog command.
pub async fn run(args: CatalogArgs, ctx: &Context) -> Result<()> {
    let currency = ctx.config.currency;
    let parse_price = |raw: &Option<String>| -> Result<Option<Money>> {
        raw.as_deref()
            .map(|p| Money::parse(p, currency).with_context(|| format!("Invalid price: {p}")))
            .transpose()
    };

    let mut query = CatalogQuery::new()
        .with_price_range(parse_price(&args.min)?, parse_price(&args.max)?)
        .with_sort(args.sort.into());
    if let Some(category) = &args.category {
        query = query.with_category(category.as_str());
    }
    if let Some(filter) = args.filter {
        query = query.with_flag(filter.into());
    }

    let products = query.run(&ctx.catalog);

    if ctx.output.is_json() {
        ctx.output.json(&products);
        return Ok(());
    }

    ctx.output.header(&format!(
        "Catálogo ({} de {} produtos, {})",
        products.len(),
        ctx.catalog.all().len(),
        query.sort.display_name()
    ));

    if products.is_empty() {
        ctx.output.info("Nenhum produto encontrado");
        return Ok(());
    }

    let widths = [26, 28, 14];
    ctx.output.table_row(&["ID", "NOME", "PREÇO"], &widths);
    for product in &products {
        let price = format_price(&product.price);
        let badges = product_badges(product);
        ctx.output.table_row(
            &[
                product.id.as_str(),
                product.name.as_str(),
                price.as_str(),
                badges.as_str(),
            ],
            &[widths[0], widths[1], widths[2], 0],
        );
    }

    Ok(())
}

//! CLI command implementations.

pub mod catalog;
pub mod checkout;
pub mod config;
pub mod product;
pub mod quote;

use std::str::FromStr;

use anyhow::{anyhow, bail, Context as _, Result};
use clap::{Args, Subcommand, ValueEnum};
use vitrine_commerce::cart::CartStore;
use vitrine_commerce::catalog::{FlagFilter, ProductCatalog, SortOption};
use vitrine_commerce::ProductId;

use crate::context::Context;

/// A cart line given on the command line as `id:color:size[:qty]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemSpec {
    pub product_id: String,
    pub color: String,
    pub size: String,
    pub quantity: i64,
}

impl FromStr for ItemSpec {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(':').collect();
        let (product_id, color, size, quantity) = match parts.as_slice() {
            [id, color, size] => (*id, *color, *size, 1),
            [id, color, size, qty] => {
                let qty = qty
                    .trim()
                    .parse()
                    .with_context(|| format!("invalid quantity {qty:?} in {s:?}"))?;
                (*id, *color, *size, qty)
            }
            _ => bail!("expected id:color:size[:qty], got {s:?}"),
        };
        if product_id.trim().is_empty() {
            bail!("missing product id in {s:?}");
        }
        Ok(Self {
            product_id: product_id.trim().to_string(),
            color: color.trim().to_string(),
            size: size.trim().to_string(),
            quantity,
        })
    }
}

/// Build a cart from item specs against the catalog.
pub fn build_cart(items: &[ItemSpec], ctx: &Context) -> Result<CartStore> {
    let mut cart = CartStore::from_config(&ctx.config);
    for item in items {
        let product = ctx
            .catalog
            .get_by_id(&ProductId::new(item.product_id.as_str()))
            .ok_or_else(|| anyhow!("Unknown product: {}", item.product_id))?;
        cart.add_item(product, &item.color, &item.size, item.quantity)
            .with_context(|| format!("Cannot add {}", item.product_id))?;
    }
    Ok(cart)
}

/// Shelf filter accepted by `catalog --filter`.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FilterArg {
    New,
    Bestseller,
}

impl From<FilterArg> for FlagFilter {
    fn from(arg: FilterArg) -> Self {
        match arg {
            FilterArg::New => FlagFilter::NewArrivals,
            FilterArg::Bestseller => FlagFilter::BestSellers,
        }
    }
}

/// Sort accepted by `catalog --sort`.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum SortArg {
    #[default]
    Featured,
    PriceAsc,
    PriceDesc,
    Name,
}

impl From<SortArg> for SortOption {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Featured => SortOption::Featured,
            SortArg::PriceAsc => SortOption::PriceAsc,
            SortArg::PriceDesc => SortOption::PriceDesc,
            SortArg::Name => SortOption::Name,
        }
    }
}

/// Arguments for the catalog command.
#[derive(Args)]
pub struct CatalogArgs {
    /// Only products in this category.
    #[arg(long)]
    pub category: Option<String>,

    /// Only one shelf.
    #[arg(long, value_enum)]
    pub filter: Option<FilterArg>,

    /// Minimum price (e.g., 500 or 499.90).
    #[arg(long)]
    pub min: Option<String>,

    /// Maximum price.
    #[arg(long)]
    pub max: Option<String>,

    /// Sort order.
    #[arg(long, value_enum, default_value_t = SortArg::Featured)]
    pub sort: SortArg,
}

/// Arguments for the product command.
#[derive(Args)]
pub struct ProductArgs {
    /// Product id.
    pub id: String,
}

/// Arguments for the quote command.
#[derive(Args)]
pub struct QuoteArgs {
    /// Cart line as id:color:size[:qty]. Repeatable.
    #[arg(short, long = "item", required = true)]
    pub items: Vec<ItemSpec>,

    /// Shipping option id (defaults to the configured one).
    #[arg(short, long)]
    pub shipping: Option<String>,
}

/// Arguments for the checkout command.
#[derive(Args)]
pub struct CheckoutArgs {
    /// Cart line as id:color:size[:qty]. Repeatable.
    #[arg(short, long = "item", required = true)]
    pub items: Vec<ItemSpec>,

    /// Shipping option id (defaults to the configured one).
    #[arg(short, long)]
    pub shipping: Option<String>,

    /// Full name.
    #[arg(long, default_value = "")]
    pub name: String,

    /// Email.
    #[arg(long, default_value = "")]
    pub email: String,

    /// Phone.
    #[arg(long, default_value = "")]
    pub phone: String,

    /// CPF.
    #[arg(long, default_value = "")]
    pub document: String,

    /// Postal code.
    #[arg(long, default_value = "")]
    pub zip: String,

    /// State code.
    #[arg(long, default_value = "")]
    pub state: String,

    /// City.
    #[arg(long, default_value = "")]
    pub city: String,

    /// Neighborhood.
    #[arg(long, default_value = "")]
    pub neighborhood: String,

    /// Street.
    #[arg(long, default_value = "")]
    pub street: String,

    /// House or building number.
    #[arg(long, default_value = "")]
    pub number: String,

    /// Apartment, block, etc.
    #[arg(long)]
    pub complement: Option<String>,

    /// Card number.
    #[arg(long, default_value = "")]
    pub card_number: String,

    /// Name on the card.
    #[arg(long, default_value = "")]
    pub card_name: String,

    /// Card expiry (MM/YY).
    #[arg(long, default_value = "")]
    pub card_expiry: String,

    /// Card security code.
    #[arg(long, default_value = "")]
    pub card_cvv: String,

    /// Make the simulated gateway reject the order.
    #[arg(long)]
    pub reject: Option<String>,

    /// Skip confirmation prompt.
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Initialize a new config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// Validate the config file.
    Validate,
}

//! Product catalog module.
//!
//! Contains products, validated variants, the read-only catalog store and
//! the catalog page query.

mod product;
mod query;
mod store;

pub use product::{Product, SizeStock, Variant};
pub use query::{CatalogQuery, FlagFilter, SortOption};
pub use store::{Category, ProductCatalog, StaticCatalog};

//! Read-only product catalog.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::error::CommerceError;
use crate::ids::{CategoryId, ProductId};

/// Seed data bundled with the crate.
const SEED_CATALOG: &str = include_str!("../../data/catalog.json");

/// A flat product category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    /// Category identifier (slug).
    pub id: CategoryId,
    /// Display name.
    pub name: String,
}

/// Read-only queries over the product collection.
///
/// Products are handed out as `Arc`s so cart lines share the catalog's
/// data instead of copying it.
pub trait ProductCatalog {
    /// Look up a product by id.
    fn get_by_id(&self, id: &ProductId) -> Option<Arc<Product>>;

    /// Every product, in catalog order.
    fn all(&self) -> Vec<Arc<Product>>;

    /// Products in a category.
    fn list_by_category(&self, category: &CategoryId) -> Vec<Arc<Product>> {
        self.all()
            .into_iter()
            .filter(|p| &p.category == category)
            .collect()
    }

    /// Products flagged as featured.
    fn list_featured(&self) -> Vec<Arc<Product>> {
        self.all().into_iter().filter(|p| p.featured).collect()
    }

    /// Products flagged as best sellers.
    fn list_best_sellers(&self) -> Vec<Arc<Product>> {
        self.all().into_iter().filter(|p| p.best_seller).collect()
    }

    /// Products flagged as new arrivals.
    fn list_new_arrivals(&self) -> Vec<Arc<Product>> {
        self.all().into_iter().filter(|p| p.new_arrival).collect()
    }
}

/// Serialized catalog layout.
#[derive(Debug, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    categories: Vec<Category>,
    products: Vec<Product>,
}

/// In-memory catalog over a fixed product list.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    categories: Vec<Category>,
    products: Vec<Arc<Product>>,
}

impl StaticCatalog {
    /// Build a catalog from products and categories.
    pub fn new(categories: Vec<Category>, products: Vec<Product>) -> Self {
        Self {
            categories,
            products: products.into_iter().map(Arc::new).collect(),
        }
    }

    /// Parse a catalog from its JSON document.
    ///
    /// Variants are validated while parsing; duplicate product ids are rejected.
    pub fn from_json(json: &str) -> Result<Self, CommerceError> {
        let doc: CatalogDocument = serde_json::from_str(json)?;

        for (i, product) in doc.products.iter().enumerate() {
            if doc.products[..i].iter().any(|p| p.id == product.id) {
                return Err(CommerceError::SerializationError(format!(
                    "duplicate product id {}",
                    product.id
                )));
            }
        }

        tracing::debug!(
            products = doc.products.len(),
            categories = doc.categories.len(),
            "catalog loaded"
        );
        Ok(Self::new(doc.categories, doc.products))
    }

    /// The bundled storefront catalog.
    pub fn seeded() -> Result<Self, CommerceError> {
        Self::from_json(SEED_CATALOG)
    }

    /// All categories.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Number of products.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Check if the catalog has no products.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl ProductCatalog for StaticCatalog {
    fn get_by_id(&self, id: &ProductId) -> Option<Arc<Product>> {
        self.products.iter().find(|p| &p.id == id).cloned()
    }

    fn all(&self) -> Vec<Arc<Product>> {
        self.products.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(products: &[Arc<Product>]) -> Vec<&str> {
        products.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_seeded_catalog() {
        let catalog = StaticCatalog::seeded().unwrap();
        assert_eq!(catalog.len(), 6);
        assert_eq!(catalog.categories().len(), 6);
    }

    #[test]
    fn test_get_by_id_shares_product() {
        let catalog = StaticCatalog::seeded().unwrap();
        let id = ProductId::new("luxury-polo-black");
        let a = catalog.get_by_id(&id).unwrap();
        let b = catalog.get_by_id(&id).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.price.amount_cents, 59000);
        assert!(catalog.get_by_id(&ProductId::new("missing")).is_none());
    }

    #[test]
    fn test_flag_listings() {
        let catalog = StaticCatalog::seeded().unwrap();
        assert_eq!(
            ids(&catalog.list_featured()),
            vec!["classic-white-shirt", "premium-leather-jacket", "leather-accessories-set"]
        );
        assert_eq!(
            ids(&catalog.list_best_sellers()),
            vec!["classic-white-shirt", "tailored-navy-pants", "luxury-polo-black"]
        );
        assert_eq!(
            ids(&catalog.list_new_arrivals()),
            vec!["premium-leather-jacket", "luxury-polo-black", "cashmere-turtleneck"]
        );
    }

    #[test]
    fn test_list_by_category() {
        let catalog = StaticCatalog::seeded().unwrap();
        let pants = catalog.list_by_category(&CategoryId::new("pants"));
        assert_eq!(ids(&pants), vec!["tailored-navy-pants"]);
        assert!(catalog.list_by_category(&CategoryId::new("shoes")).is_empty());
    }

    #[test]
    fn test_rejects_invalid_variant_in_document() {
        let json = r##"{"products":[{"id":"x","name":"X",
            "price":{"amount_cents":100,"currency":"BRL"},"category":"c",
            "variants":[{"color":"Preto","color_code":"#000","sizes":[{"size":"M","stock":-2}]}]}]}"##;
        assert!(StaticCatalog::from_json(json).is_err());
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let product = r##"{"id":"x","name":"X","price":{"amount_cents":100,"currency":"BRL"},
            "category":"c","variants":[{"color":"Preto","color_code":"#000","sizes":[{"size":"M","stock":1}]}]}"##;
        let json = format!(r#"{{"products":[{product},{product}]}}"#);
        assert!(StaticCatalog::from_json(&json).is_err());
    }
}

//! Catalog page filtering and sorting.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::catalog::{Product, ProductCatalog};
use crate::ids::CategoryId;
use crate::money::Money;

/// Shelf filter applied on top of category and price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlagFilter {
    /// Only new arrivals.
    NewArrivals,
    /// Only best sellers.
    BestSellers,
}

/// Sort options for the catalog page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SortOption {
    /// Featured products first, catalog order otherwise.
    #[default]
    Featured,
    /// Sort by price, low to high.
    PriceAsc,
    /// Sort by price, high to low.
    PriceDesc,
    /// Sort by name A-Z.
    Name,
}

impl SortOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOption::Featured => "featured",
            SortOption::PriceAsc => "price-asc",
            SortOption::PriceDesc => "price-desc",
            SortOption::Name => "name",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "featured" => Some(SortOption::Featured),
            "price-asc" => Some(SortOption::PriceAsc),
            "price-desc" => Some(SortOption::PriceDesc),
            "name" => Some(SortOption::Name),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SortOption::Featured => "Featured",
            SortOption::PriceAsc => "Price: Low to High",
            SortOption::PriceDesc => "Price: High to Low",
            SortOption::Name => "Name: A-Z",
        }
    }
}

/// A catalog listing query.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CatalogQuery {
    /// Restrict to one category.
    pub category: Option<CategoryId>,
    /// Inclusive lower price bound.
    pub min_price: Option<Money>,
    /// Inclusive upper price bound.
    pub max_price: Option<Money>,
    /// Shelf filter.
    pub flag: Option<FlagFilter>,
    /// Sort order.
    pub sort: SortOption,
}

impl CatalogQuery {
    /// Create an unfiltered query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to a category.
    pub fn with_category(mut self, category: impl Into<CategoryId>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Restrict to an inclusive price range.
    pub fn with_price_range(mut self, min: Option<Money>, max: Option<Money>) -> Self {
        self.min_price = min;
        self.max_price = max;
        self
    }

    /// Apply a shelf filter.
    pub fn with_flag(mut self, flag: FlagFilter) -> Self {
        self.flag = Some(flag);
        self
    }

    /// Set sort option.
    pub fn with_sort(mut self, sort: SortOption) -> Self {
        self.sort = sort;
        self
    }

    /// Check whether a product passes every filter.
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(category) = &self.category {
            if &product.category != category {
                return false;
            }
        }
        if let Some(min) = &self.min_price {
            if product.price.amount_cents < min.amount_cents {
                return false;
            }
        }
        if let Some(max) = &self.max_price {
            if product.price.amount_cents > max.amount_cents {
                return false;
            }
        }
        match self.flag {
            Some(FlagFilter::NewArrivals) => product.new_arrival,
            Some(FlagFilter::BestSellers) => product.best_seller,
            None => true,
        }
    }

    /// Run the query against a catalog.
    pub fn run(&self, catalog: &impl ProductCatalog) -> Vec<Arc<Product>> {
        let mut products: Vec<Arc<Product>> = catalog
            .all()
            .into_iter()
            .filter(|p| self.matches(p))
            .collect();

        // sort_by is stable, so ties keep catalog order
        match self.sort {
            SortOption::Featured => products.sort_by_key(|p| !p.featured),
            SortOption::PriceAsc => products.sort_by_key(|p| p.price.amount_cents),
            SortOption::PriceDesc => {
                products.sort_by(|a, b| b.price.amount_cents.cmp(&a.price.amount_cents))
            }
            SortOption::Name => products.sort_by(|a, b| a.name.cmp(&b.name)),
        }
        products
    }
}

//! Product and variant types.

use crate::error::CommerceError;
use crate::ids::{CategoryId, ProductId};
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// A product in the catalog.
///
/// Products are immutable once loaded; the cart holds them behind an `Arc`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    /// Unique product identifier (slug).
    pub id: ProductId,
    /// Product name.
    pub name: String,
    /// Full description.
    #[serde(default)]
    pub description: String,
    /// Unit price.
    pub price: Money,
    /// Category this product belongs to.
    pub category: CategoryId,
    /// Image paths, first one is the cover.
    #[serde(default)]
    pub images: Vec<String>,
    /// Purchasable color variants.
    pub variants: Vec<Variant>,
    /// Shown in the featured shelf.
    #[serde(default)]
    pub featured: bool,
    /// Shown in the new arrivals shelf.
    #[serde(default)]
    pub new_arrival: bool,
    /// Shown in the best sellers shelf.
    #[serde(default)]
    pub best_seller: bool,
}

impl Product {
    /// Create a product with no variants and no flags.
    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        price: Money,
        category: impl Into<CategoryId>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            price,
            category: category.into(),
            images: Vec::new(),
            variants: Vec::new(),
            featured: false,
            new_arrival: false,
            best_seller: false,
        }
    }

    /// Add a variant.
    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variants.push(variant);
        self
    }

    /// Look up the variant for a color.
    pub fn variant(&self, color: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.color == color)
    }

    /// Check that a (color, size) pair is purchasable.
    pub fn ensure_offers(&self, color: &str, size: &str) -> Result<(), CommerceError> {
        let variant = self
            .variant(color)
            .ok_or_else(|| CommerceError::VariantNotFound {
                product_id: self.id.to_string(),
                color: color.to_string(),
            })?;

        if variant.stock_for(size).is_none() {
            return Err(CommerceError::SizeNotFound {
                product_id: self.id.to_string(),
                color: color.to_string(),
                size: size.to_string(),
            });
        }
        Ok(())
    }

    /// Cover image path.
    pub fn cover_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// A color option of a product, partitioned into sizes.
///
/// Construction rejects a variant with no sizes, a blank color, duplicate
/// sizes or negative stock. Deserialization goes through the same checks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "VariantRecord")]
pub struct Variant {
    color: String,
    color_code: String,
    sizes: Vec<SizeStock>,
}

impl Variant {
    /// Build a validated variant from `(size, stock)` pairs.
    pub fn new<S: Into<String>>(
        color: impl Into<String>,
        color_code: impl Into<String>,
        sizes: impl IntoIterator<Item = (S, i64)>,
    ) -> Result<Self, CommerceError> {
        VariantRecord {
            color: color.into(),
            color_code: color_code.into(),
            sizes: sizes
                .into_iter()
                .map(|(size, stock)| SizeRecord {
                    size: size.into(),
                    stock,
                })
                .collect(),
        }
        .try_into()
    }

    /// Color name.
    pub fn color(&self) -> &str {
        &self.color
    }

    /// Hex swatch code.
    pub fn color_code(&self) -> &str {
        &self.color_code
    }

    /// Sizes with their stock.
    pub fn sizes(&self) -> &[SizeStock] {
        &self.sizes
    }

    /// Stock for a size, None if the size is not offered.
    ///
    /// Stock is informational; the cart never decrements it.
    pub fn stock_for(&self, size: &str) -> Option<u32> {
        self.sizes.iter().find(|s| s.size == size).map(|s| s.stock)
    }
}

/// One size of a variant and its stock count.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SizeStock {
    /// Size label (e.g., "M", "42", "Único").
    pub size: String,
    /// Units in stock.
    pub stock: u32,
}

/// Unvalidated variant shape as it appears in catalog data.
#[derive(Debug, Clone, Deserialize)]
struct VariantRecord {
    color: String,
    color_code: String,
    sizes: Vec<SizeRecord>,
}

#[derive(Debug, Clone, Deserialize)]
struct SizeRecord {
    size: String,
    stock: i64,
}

impl TryFrom<VariantRecord> for Variant {
    type Error = CommerceError;

    fn try_from(record: VariantRecord) -> Result<Self, Self::Error> {
        if record.color.trim().is_empty() {
            return Err(CommerceError::InvalidVariant("color is blank".to_string()));
        }
        if record.sizes.is_empty() {
            return Err(CommerceError::InvalidVariant(format!(
                "{} has no sizes",
                record.color
            )));
        }

        let mut sizes: Vec<SizeStock> = Vec::with_capacity(record.sizes.len());
        for SizeRecord { size, stock } in record.sizes {
            if size.trim().is_empty() {
                return Err(CommerceError::InvalidVariant(format!(
                    "{} has a blank size",
                    record.color
                )));
            }
            if sizes.iter().any(|s| s.size == size) {
                return Err(CommerceError::InvalidVariant(format!(
                    "{} lists size {size} twice",
                    record.color
                )));
            }
            let stock = u32::try_from(stock).map_err(|_| {
                CommerceError::InvalidVariant(format!(
                    "{} size {size} has invalid stock {stock}",
                    record.color
                ))
            })?;
            sizes.push(SizeStock { size, stock });
        }

        Ok(Variant {
            color: record.color,
            color_code: record.color_code,
            sizes,
        })
    }
}

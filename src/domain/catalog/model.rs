use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::CatalogError;

// ============================================================================
// Catalog Records
// ============================================================================

/// A purchasable SKU of a product. `stock` is the only availability figure in
/// the system; carts and orders never cache it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variation {
    pub id: Uuid,
    pub sku: String,
    pub price: i64,
    pub stock: i32,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category_id: Option<Uuid>,
    pub variations: Vec<Variation>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(new_product: NewProduct) -> Result<Self, CatalogError> {
        new_product.validate()?;

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            name: new_product.name.trim().to_string(),
            description: new_product.description,
            category_id: new_product.category_id,
            variations: new_product
                .variations
                .into_iter()
                .map(NewVariation::into_variation)
                .collect(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn variation(&self, variation_id: Uuid) -> Option<&Variation> {
        self.variations.iter().find(|v| v.id == variation_id)
    }

    pub fn add_variation(&mut self, new_variation: NewVariation) -> Result<&Variation, CatalogError> {
        new_variation.validate()?;
        if self.variations.iter().any(|v| v.sku == new_variation.sku) {
            return Err(CatalogError::DuplicateSku(new_variation.sku));
        }

        let index = self.variations.len();
        self.variations.push(new_variation.into_variation());
        self.updated_at = Utc::now();

        Ok(&self.variations[index])
    }

    pub fn set_variation_stock(&mut self, variation_id: Uuid, stock: i32) -> Result<(), CatalogError> {
        let variation = self
            .variations
            .iter_mut()
            .find(|v| v.id == variation_id)
            .ok_or(CatalogError::VariationNotFound(variation_id))?;
        variation.stock = stock;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn skus(&self) -> impl Iterator<Item = &str> {
        self.variations.iter().map(|v| v.sku.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub parent_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Category {
    pub fn new(new_category: NewCategory) -> Result<Self, CatalogError> {
        new_category.validate()?;
        Ok(Self {
            id: Uuid::new_v4(),
            name: new_category.name.trim().to_string(),
            slug: new_category.slug,
            parent_id: new_category.parent_id,
            created_at: Utc::now(),
        })
    }
}

// ============================================================================
// Creation Inputs
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct NewVariation {
    pub sku: String,
    pub price: i64,
    #[serde(default)]
    pub stock: i32,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl NewVariation {
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.sku.trim().is_empty() {
            return Err(CatalogError::EmptySku);
        }
        if self.price < 0 {
            return Err(CatalogError::InvalidPrice(self.price));
        }
        if self.stock < 0 {
            return Err(CatalogError::InvalidStock(self.stock));
        }
        Ok(())
    }

    fn into_variation(self) -> Variation {
        Variation {
            id: Uuid::new_v4(),
            sku: self.sku,
            price: self.price,
            stock: self.stock,
            attributes: self.attributes,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub variations: Vec<NewVariation>,
}

impl NewProduct {
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.name.trim().is_empty() {
            return Err(CatalogError::EmptyName);
        }

        let mut seen = HashSet::new();
        for variation in &self.variations {
            variation.validate()?;
            if !seen.insert(variation.sku.as_str()) {
                return Err(CatalogError::DuplicateSku(variation.sku.clone()));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCategory {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
}

impl NewCategory {
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.name.trim().is_empty() {
            return Err(CatalogError::EmptyName);
        }
        let valid_slug = !self.slug.is_empty()
            && self
                .slug
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        if !valid_slug {
            return Err(CatalogError::InvalidSlug(self.slug.clone()));
        }
        Ok(())
    }
}

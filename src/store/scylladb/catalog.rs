use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use scylla::client::session::Session;
use uuid::Uuid;

use super::{fetch_payload, fetch_payloads};
use crate::domain::catalog::{Category, Product, Variation};
use crate::store::{CatalogRepository, Page, Paged, ProductFilter, RepositoryError};

// ============================================================================
// Catalog Repository - products, variation/SKU indexes, categories
// ============================================================================

pub struct ScyllaCatalogRepository {
    session: Arc<Session>,
}

impl ScyllaCatalogRepository {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    async fn sku_owner(&self, sku: &str) -> Result<Option<Uuid>> {
        let result = self
            .session
            .query_unpaged("SELECT product_id FROM sku_index WHERE sku = ?", (sku,))
            .await?;

        let rows_result = match result.into_rows_result() {
            Ok(rows) => rows,
            Err(_) => return Ok(None),
        };

        Ok(rows_result.maybe_first_row::<(Uuid,)>()?.map(|(product_id,)| product_id))
    }

    async fn product_for_variation(&self, variation_id: Uuid) -> Result<Option<Uuid>> {
        let result = self
            .session
            .query_unpaged(
                "SELECT product_id FROM variation_index WHERE variation_id = ?",
                (variation_id,),
            )
            .await?;

        let rows_result = match result.into_rows_result() {
            Ok(rows) => rows,
            Err(_) => return Ok(None),
        };

        Ok(rows_result.maybe_first_row::<(Uuid,)>()?.map(|(product_id,)| product_id))
    }

    async fn load_product(&self, id: Uuid) -> Result<Option<Product>> {
        fetch_payload(&self.session, "SELECT payload FROM products WHERE id = ?", (id,)).await
    }

    async fn write_product(&self, product: &Product) -> Result<()> {
        let payload = serde_json::to_string(product)?;
        self.session
            .query_unpaged(
                "INSERT INTO products (id, category_id, payload, created_at) VALUES (?, ?, ?, ?)",
                (product.id, product.category_id, payload, product.created_at),
            )
            .await?;
        Ok(())
    }

    async fn index_variations(&self, product: &Product) -> Result<()> {
        for variation in &product.variations {
            self.session
                .query_unpaged(
                    "INSERT INTO variation_index (variation_id, product_id) VALUES (?, ?)",
                    (variation.id, product.id),
                )
                .await?;
            self.session
                .query_unpaged(
                    "INSERT INTO sku_index (sku, product_id, variation_id) VALUES (?, ?, ?)",
                    (variation.sku.as_str(), product.id, variation.id),
                )
                .await?;
        }
        Ok(())
    }

    async fn unindex_variation(&self, variation: &Variation) -> Result<()> {
        self.session
            .query_unpaged(
                "DELETE FROM variation_index WHERE variation_id = ?",
                (variation.id,),
            )
            .await?;
        self.session
            .query_unpaged("DELETE FROM sku_index WHERE sku = ?", (variation.sku.as_str(),))
            .await?;
        Ok(())
    }

    /// First SKU of `product` that is registered to a different product.
    async fn taken_sku(&self, product: &Product) -> Result<Option<String>> {
        for sku in product.skus() {
            if let Some(owner) = self.sku_owner(sku).await? {
                if owner != product.id {
                    return Ok(Some(sku.to_string()));
                }
            }
        }
        Ok(None)
    }

    async fn load_category_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        let result = self
            .session
            .query_unpaged("SELECT category_id FROM category_slugs WHERE slug = ?", (slug,))
            .await?;

        let category_id = match result.into_rows_result() {
            Ok(rows) => rows.maybe_first_row::<(Uuid,)>()?.map(|(id,)| id),
            Err(_) => None,
        };

        match category_id {
            Some(id) => {
                fetch_payload(&self.session, "SELECT payload FROM categories WHERE id = ?", (id,))
                    .await
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl CatalogRepository for ScyllaCatalogRepository {
    async fn create_product(&self, product: &Product) -> Result<(), RepositoryError> {
        if let Some(sku) = self.taken_sku(product).await? {
            return Err(RepositoryError::Conflict(format!("SKU already in use: {sku}")));
        }

        self.write_product(product).await?;
        self.index_variations(product).await?;

        tracing::debug!(
            product_id = %product.id,
            variation_count = product.variations.len(),
            "Stored product"
        );
        Ok(())
    }

    async fn get_product_by_id(&self, id: Uuid) -> Result<Option<Product>, RepositoryError> {
        Ok(self.load_product(id).await?)
    }

    async fn update_product(&self, product: &Product) -> Result<(), RepositoryError> {
        let existing = self
            .load_product(product.id)
            .await?
            .ok_or_else(|| RepositoryError::not_found("product", product.id))?;

        if let Some(sku) = self.taken_sku(product).await? {
            return Err(RepositoryError::Conflict(format!("SKU already in use: {sku}")));
        }

        for dropped in existing
            .variations
            .iter()
            .filter(|old| product.variation(old.id).is_none())
        {
            self.unindex_variation(dropped).await?;
        }

        self.write_product(product).await?;
        self.index_variations(product).await?;
        Ok(())
    }

    async fn delete_product(&self, id: Uuid) -> Result<(), RepositoryError> {
        let existing = self
            .load_product(id)
            .await?
            .ok_or_else(|| RepositoryError::not_found("product", id))?;

        for variation in &existing.variations {
            self.unindex_variation(variation).await?;
        }
        self.session
            .query_unpaged("DELETE FROM products WHERE id = ?", (id,))
            .await
            .map_err(anyhow::Error::from)?;
        Ok(())
    }

    async fn list_products(
        &self,
        filter: &ProductFilter,
        page: Page,
    ) -> Result<Paged<Product>, RepositoryError> {
        let mut products: Vec<Product> =
            fetch_payloads(&self.session, "SELECT payload FROM products", ()).await?;

        products.retain(|product| filter.matches(product));
        products.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        Ok(page.apply(products))
    }

    async fn get_variation_by_sku(&self, sku: &str) -> Result<Option<Variation>, RepositoryError> {
        let Some(product_id) = self.sku_owner(sku).await? else {
            return Ok(None);
        };

        Ok(self.load_product(product_id).await?.and_then(|product| {
            product
                .variations
                .into_iter()
                .find(|variation| variation.sku == sku)
        }))
    }

    async fn update_variation_stock(
        &self,
        variation_id: Uuid,
        new_quantity: i32,
    ) -> Result<(), RepositoryError> {
        let product_id = self
            .product_for_variation(variation_id)
            .await?
            .ok_or_else(|| RepositoryError::not_found("variation", variation_id))?;
        let mut product = self
            .load_product(product_id)
            .await?
            .ok_or_else(|| RepositoryError::not_found("product", product_id))?;

        product
            .set_variation_stock(variation_id, new_quantity)
            .map_err(|_| RepositoryError::not_found("variation", variation_id))?;
        self.write_product(&product).await?;

        tracing::debug!(
            product_id = %product_id,
            variation_id = %variation_id,
            stock = new_quantity,
            "Stored variation stock"
        );
        Ok(())
    }

    async fn create_category(&self, category: &Category) -> Result<(), RepositoryError> {
        if self.load_category_by_slug(&category.slug).await?.is_some() {
            return Err(RepositoryError::Conflict(format!(
                "category slug already in use: {}",
                category.slug
            )));
        }

        let payload = serde_json::to_string(category).map_err(anyhow::Error::from)?;
        self.session
            .query_unpaged(
                "INSERT INTO categories (id, slug, payload) VALUES (?, ?, ?)",
                (category.id, category.slug.as_str(), payload),
            )
            .await
            .map_err(anyhow::Error::from)?;
        self.session
            .query_unpaged(
                "INSERT INTO category_slugs (slug, category_id) VALUES (?, ?)",
                (category.slug.as_str(), category.id),
            )
            .await
            .map_err(anyhow::Error::from)?;
        Ok(())
    }

    async fn get_category_by_id(&self, id: Uuid) -> Result<Option<Category>, RepositoryError> {
        Ok(fetch_payload(&self.session, "SELECT payload FROM categories WHERE id = ?", (id,)).await?)
    }

    async fn get_category_by_slug(&self, slug: &str) -> Result<Option<Category>, RepositoryError> {
        Ok(self.load_category_by_slug(slug).await?)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let mut categories: Vec<Category> =
            fetch_payloads(&self.session, "SELECT payload FROM categories", ()).await?;
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }
}

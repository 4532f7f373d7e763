use std::sync::Arc;

use uuid::Uuid;

use super::error::ServiceError;
use crate::domain::catalog::{
    CatalogError, Category, NewCategory, NewProduct, NewVariation, Product, Variation,
};
use crate::store::{CatalogRepository, Page, Paged, ProductFilter};

#[derive(Clone)]
pub struct CatalogService {
    repository: Arc<dyn CatalogRepository>,
}

impl CatalogService {
    pub fn new(repository: Arc<dyn CatalogRepository>) -> Self {
        Self { repository }
    }

    // ------------------------------------------------------------------------
    // Categories
    // ------------------------------------------------------------------------

    pub async fn create_category(&self, new_category: NewCategory) -> Result<Category, ServiceError> {
        let category = Category::new(new_category)?;

        if self
            .repository
            .get_category_by_slug(&category.slug)
            .await?
            .is_some()
        {
            tracing::warn!(slug = %category.slug, "Category slug already taken");
            return Err(CatalogError::DuplicateSlug(category.slug).into());
        }
        if let Some(parent_id) = category.parent_id {
            self.get_category(parent_id).await?;
        }

        self.repository.create_category(&category).await?;
        tracing::info!(category_id = %category.id, slug = %category.slug, "Category created");
        Ok(category)
    }

    pub async fn get_category(&self, id: Uuid) -> Result<Category, ServiceError> {
        self.repository
            .get_category_by_id(id)
            .await?
            .ok_or_else(|| CatalogError::CategoryNotFound(id).into())
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, ServiceError> {
        Ok(self.repository.list_categories().await?)
    }

    // ------------------------------------------------------------------------
    // Products
    // ------------------------------------------------------------------------

    pub async fn create_product(&self, new_product: NewProduct) -> Result<Product, ServiceError> {
        let product = Product::new(new_product)?;

        if let Some(category_id) = product.category_id {
            self.get_category(category_id).await?;
        }
        for sku in product.skus() {
            self.ensure_sku_free(sku).await?;
        }

        self.repository.create_product(&product).await?;
        tracing::info!(
            product_id = %product.id,
            variations = product.variations.len(),
            "Product created"
        );
        Ok(product)
    }

    pub async fn get_product(&self, id: Uuid) -> Result<Product, ServiceError> {
        self.repository
            .get_product_by_id(id)
            .await?
            .ok_or_else(|| CatalogError::ProductNotFound(id).into())
    }

    pub async fn list_products(
        &self,
        filter: &ProductFilter,
        page: Page,
    ) -> Result<Paged<Product>, ServiceError> {
        Ok(self.repository.list_products(filter, page).await?)
    }

    pub async fn delete_product(&self, id: Uuid) -> Result<(), ServiceError> {
        self.get_product(id).await?;
        self.repository.delete_product(id).await?;
        tracing::info!(product_id = %id, "Product deleted");
        Ok(())
    }

    pub async fn add_variation(
        &self,
        product_id: Uuid,
        new_variation: NewVariation,
    ) -> Result<Variation, ServiceError> {
        new_variation.validate()?;
        let mut product = self.get_product(product_id).await?;
        self.ensure_sku_free(&new_variation.sku).await?;

        let variation = product.add_variation(new_variation)?.clone();
        self.repository.update_product(&product).await?;

        tracing::info!(
            product_id = %product_id,
            variation_id = %variation.id,
            sku = %variation.sku,
            "Variation added"
        );
        Ok(variation)
    }

    /// Overwrite a variation's stock level.
    pub async fn set_variation_stock(&self, variation_id: Uuid, stock: i32) -> Result<(), ServiceError> {
        if stock < 0 {
            return Err(CatalogError::InvalidStock(stock).into());
        }
        self.repository
            .update_variation_stock(variation_id, stock)
            .await?;

        tracing::info!(variation_id = %variation_id, stock = stock, "Stock set");
        Ok(())
    }

    async fn ensure_sku_free(&self, sku: &str) -> Result<(), ServiceError> {
        if self.repository.get_variation_by_sku(sku).await?.is_some() {
            tracing::warn!(sku = %sku, "SKU already in use");
            return Err(CatalogError::DuplicateSku(sku.to_string()).into());
        }
        Ok(())
    }
}

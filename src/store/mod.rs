// ============================================================================
// Persistence Layer - Repository Contracts
// ============================================================================
//
// Services depend only on these traits. Two adapters implement them:
// - memory: process-local maps, used by tests and `--storage memory`
// - scylladb: ScyllaDB tables with JSON-encoded aggregate payloads
//
// None of the adapters offers transactions across calls: a service that
// writes an aggregate and then a stock level performs two independent writes.
//
// ============================================================================

mod memory;
mod scylladb;

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::cart::Cart;
use crate::domain::catalog::{Category, Product, Variation};
use crate::domain::order::Order;

pub use memory::{InMemoryCartRepository, InMemoryCatalogRepository, InMemoryOrderRepository};
pub use scylladb::{connect, init_schema, ScyllaCartRepository, ScyllaCatalogRepository, ScyllaOrderRepository};

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("{0}")]
    Conflict(String),

    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl RepositoryError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        RepositoryError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

// ============================================================================
// Listing
// ============================================================================

/// 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u32,
    pub limit: u32,
}

impl Page {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    pub fn offset(&self) -> usize {
        (self.page as usize - 1) * self.limit as usize
    }

    /// Slice an already ordered collection.
    pub fn apply<T>(&self, all: Vec<T>) -> Paged<T> {
        let total = all.len();
        let items = all
            .into_iter()
            .skip(self.offset())
            .take(self.limit as usize)
            .collect();
        Paged {
            items,
            total,
            page: self.page,
            limit: self.limit,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: u32,
    pub limit: u32,
}

#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub category_id: Option<Uuid>,
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        match self.category_id {
            Some(category_id) => product.category_id == Some(category_id),
            None => true,
        }
    }
}

// ============================================================================
// Repository Traits
// ============================================================================

#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Fails with `Conflict` when any of the product's SKUs is already taken.
    async fn create_product(&self, product: &Product) -> Result<(), RepositoryError>;
    async fn get_product_by_id(&self, id: Uuid) -> Result<Option<Product>, RepositoryError>;
    /// Replace a stored product, re-checking SKU ownership.
    async fn update_product(&self, product: &Product) -> Result<(), RepositoryError>;
    async fn delete_product(&self, id: Uuid) -> Result<(), RepositoryError>;
    async fn list_products(
        &self,
        filter: &ProductFilter,
        page: Page,
    ) -> Result<Paged<Product>, RepositoryError>;
    async fn get_variation_by_sku(&self, sku: &str) -> Result<Option<Variation>, RepositoryError>;
    async fn update_variation_stock(
        &self,
        variation_id: Uuid,
        new_quantity: i32,
    ) -> Result<(), RepositoryError>;

    async fn create_category(&self, category: &Category) -> Result<(), RepositoryError>;
    async fn get_category_by_id(&self, id: Uuid) -> Result<Option<Category>, RepositoryError>;
    async fn get_category_by_slug(&self, slug: &str) -> Result<Option<Category>, RepositoryError>;
    async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError>;
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn create(&self, order: &Order) -> Result<(), RepositoryError>;
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Order>, RepositoryError>;
    async fn update(&self, order: &Order) -> Result<(), RepositoryError>;
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;
    /// Newest first.
    async fn list(&self, page: Page) -> Result<Paged<Order>, RepositoryError>;
    /// Newest first.
    async fn get_by_customer_id(&self, customer_id: Uuid) -> Result<Vec<Order>, RepositoryError>;
}

/// Carts are stored whole: item-level changes are made on the aggregate and
/// written back with `update`.
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Fails with `Conflict` when the user already has a cart.
    async fn create(&self, cart: &Cart) -> Result<(), RepositoryError>;
    async fn get_by_user_id(&self, user_id: Uuid) -> Result<Option<Cart>, RepositoryError>;
    async fn update(&self, cart: &Cart) -> Result<(), RepositoryError>;
    async fn delete(&self, user_id: Uuid) -> Result<(), RepositoryError>;
}

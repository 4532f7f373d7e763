use uuid::Uuid;

// ============================================================================
// Catalog Validation Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogError {
    #[error("Product not found: {0}")]
    ProductNotFound(Uuid),

    #[error("Variation not found: {0}")]
    VariationNotFound(Uuid),

    #[error("Category not found: {0}")]
    CategoryNotFound(Uuid),

    #[error("SKU already in use: {0}")]
    DuplicateSku(String),

    #[error("Category slug already in use: {0}")]
    DuplicateSlug(String),

    #[error("Name cannot be empty")]
    EmptyName,

    #[error("SKU cannot be empty")]
    EmptySku,

    #[error("Invalid slug: {0}")]
    InvalidSlug(String),

    #[error("Invalid price: {0}")]
    InvalidPrice(i64),

    #[error("Invalid stock quantity: {0}")]
    InvalidStock(i32),
}

use uuid::Uuid;

// ============================================================================
// Cart Business Rule Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CartError {
    #[error("Invalid item quantity: {0}")]
    InvalidQuantity(i32),

    #[error("Cart amount out of range")]
    AmountOverflow,

    #[error("Cart item not found: {0}")]
    ItemNotFound(Uuid),
}

use uuid::Uuid;

use super::value_objects::OrderStatus;

// ============================================================================
// Order Business Rule Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OrderError {
    #[error("Order items can only be changed while pending (current status: {0})")]
    NotPending(OrderStatus),

    #[error("Cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Order is in terminal status {0} and accepts no further transitions")]
    TerminalState(OrderStatus),

    #[error("Operation not allowed in order status: {0}")]
    InvalidState(OrderStatus),

    #[error("Order item not found: product {product_id}, variation {variation_id}")]
    ItemNotFound { product_id: Uuid, variation_id: Uuid },

    #[error("Invalid item quantity: {0}")]
    InvalidQuantity(i32),

    #[error("Order amount out of range")]
    AmountOverflow,

    #[error("Unknown order status: {0}")]
    UnknownStatus(String),
}

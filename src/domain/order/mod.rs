// ============================================================================
// Order Domain - Business Logic for Order Aggregate
// ============================================================================
//
// - Value objects (OrderItem, OrderStatus, ShippingInfo, PaymentInfo)
// - Errors (OrderError enum)
// - Aggregate (Order with its status machine and line bookkeeping)
//
// Persistence and stock reservation live in `store` and `services`.
//
// ============================================================================

pub mod value_objects;
pub mod errors;
pub mod aggregate;

// Re-export for convenience
pub use value_objects::*;
pub use errors::*;
pub use aggregate::*;

// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Each area has its own subdirectory with its records, errors and (for the
// aggregates) the methods that are the only way to mutate them:
// - catalog: products, variations, categories
// - order:   order aggregate and status machine
// - cart:    cart aggregate and conversion to an order
//
// Nothing here performs I/O.
//
// ============================================================================

pub mod catalog;
pub mod order;
pub mod cart;

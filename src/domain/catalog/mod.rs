// ============================================================================
// Catalog Domain - Products, Variations and Categories
// ============================================================================
//
// Leaf records: the catalog store is the single authority on price and stock.
//
// ============================================================================

pub mod errors;
pub mod model;

pub use errors::*;
pub use model::*;

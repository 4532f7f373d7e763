// ============================================================================
// Cart Domain - Business Logic for Cart Aggregate
// ============================================================================

pub mod errors;
pub mod aggregate;

pub use errors::*;
pub use aggregate::*;

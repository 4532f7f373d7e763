// Private module declarations
mod cart;
mod catalog;
mod error;
mod inventory;
mod order;

use std::sync::Arc;

use inventory::Inventory;

use crate::metrics::Metrics;
use crate::store::{CartRepository, CatalogRepository, OrderRepository, Page};

// Re-export for public API
pub use cart::CartService;
pub use catalog::CatalogService;
pub use error::{parse_id, ErrorKind, ServiceError};
pub use order::{OrderService, PaymentDetails, TrackingDetails};

// ============================================================================
// Application Services
// ============================================================================
//
// Services orchestrate aggregates, repositories and stock. They are the
// only callers of `CatalogRepository::update_variation_stock` apart from
// the admin stock endpoint.
//
// ============================================================================

#[derive(Clone)]
pub struct Services {
    pub catalog: CatalogService,
    pub orders: OrderService,
    pub carts: CartService,
}

impl Services {
    pub fn new(
        catalog: Arc<dyn CatalogRepository>,
        orders: Arc<dyn OrderRepository>,
        carts: Arc<dyn CartRepository>,
        metrics: Arc<Metrics>,
    ) -> Self {
        let inventory = Inventory::new(catalog.clone(), metrics.clone());
        Self {
            catalog: CatalogService::new(catalog),
            orders: OrderService::new(orders.clone(), inventory.clone(), metrics.clone()),
            carts: CartService::new(carts, orders, inventory, metrics),
        }
    }
}

/// Page size policy applied to list endpoints.
#[derive(Debug, Clone, Copy)]
pub struct Pagination {
    pub default_limit: u32,
    pub max_limit: u32,
}

impl Pagination {
    pub fn page(&self, page: Option<u32>, limit: Option<u32>) -> Page {
        let limit = limit
            .unwrap_or(self.default_limit)
            .min(self.max_limit.max(1));
        Page::new(page.unwrap_or(1), limit)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            default_limit: 20,
            max_limit: 100,
        }
    }
}

use std::sync::Arc;

use uuid::Uuid;

use super::error::ServiceError;
use crate::domain::catalog::{Product, Variation};
use crate::metrics::Metrics;
use crate::store::CatalogRepository;

// ============================================================================
// Inventory - stock reads and writes shared by the order and cart services
// ============================================================================
//
// Every adjustment is a plain read-modify-write against the catalog store.
// There is no lock or version check: two requests that read the same stock
// level can both pass `ensure_available` and both write, overselling the
// variation. Callers also write their aggregate in a separate call, so a
// failure between the two leaves stock and the aggregate out of step.
//
// ============================================================================

#[derive(Clone)]
pub struct Inventory {
    catalog: Arc<dyn CatalogRepository>,
    metrics: Arc<Metrics>,
}

impl Inventory {
    pub fn new(catalog: Arc<dyn CatalogRepository>, metrics: Arc<Metrics>) -> Self {
        Self { catalog, metrics }
    }

    /// Look up a product and one of its variations.
    pub async fn find(
        &self,
        product_id: Uuid,
        variation_id: Uuid,
    ) -> Result<(Product, Variation), ServiceError> {
        let product = self
            .catalog
            .get_product_by_id(product_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("product", product_id))?;
        let variation = product
            .variation(variation_id)
            .cloned()
            .ok_or_else(|| ServiceError::not_found("variation", variation_id))?;

        tracing::debug!(
            product_id = %product_id,
            variation_id = %variation_id,
            stock = variation.stock,
            "Loaded variation"
        );
        Ok((product, variation))
    }

    pub fn ensure_available(variation: &Variation, requested: i32) -> Result<(), ServiceError> {
        if variation.stock < requested {
            tracing::warn!(
                variation_id = %variation.id,
                requested = requested,
                available = variation.stock,
                "Insufficient stock"
            );
            return Err(ServiceError::InsufficientStock {
                variation_id: variation.id,
                requested,
                available: variation.stock,
            });
        }
        Ok(())
    }

    /// Decrement stock from the level read in `variation`.
    pub async fn reserve(&self, variation: &Variation, quantity: i32) -> Result<(), ServiceError> {
        let remaining = variation.stock - quantity;
        self.catalog
            .update_variation_stock(variation.id, remaining)
            .await?;
        self.metrics.record_stock_adjustment("reserve", quantity);

        tracing::info!(
            variation_id = %variation.id,
            quantity = quantity,
            stock = remaining,
            "Reserved stock"
        );
        Ok(())
    }

    /// Return units to stock. A variation that no longer exists is skipped
    /// so lines for deleted products can still be removed.
    pub async fn release(
        &self,
        product_id: Uuid,
        variation_id: Uuid,
        quantity: i32,
    ) -> Result<(), ServiceError> {
        let variation = match self.find(product_id, variation_id).await {
            Ok((_, variation)) => variation,
            Err(ServiceError::NotFound { entity, id }) => {
                tracing::warn!(
                    entity = entity,
                    id = %id,
                    quantity = quantity,
                    "Stock not returned, catalog entry is gone"
                );
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let restored = variation.stock.checked_add(quantity).ok_or_else(|| {
            ServiceError::InvalidArgument(format!(
                "stock for variation {} cannot exceed {}",
                variation.id,
                i32::MAX
            ))
        })?;
        self.catalog
            .update_variation_stock(variation.id, restored)
            .await?;
        self.metrics.record_stock_adjustment("release", quantity);

        tracing::info!(
            variation_id = %variation.id,
            quantity = quantity,
            stock = restored,
            "Released stock"
        );
        Ok(())
    }
}

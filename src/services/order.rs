use std::sync::Arc;

use serde::Deserialize;
use uuid::Uuid;

use super::error::ServiceError;
use super::inventory::Inventory;
use crate::domain::order::{Order, OrderError, OrderStatus, ShippingInfo};
use crate::metrics::Metrics;
use crate::store::{OrderRepository, Page, Paged};

// ============================================================================
// Order Service
// ============================================================================
//
// Line changes write the order first and the stock level second. The two
// writes are independent; see `Inventory` for the consequences.
//
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentDetails {
    pub method: String,
    pub transaction_id: String,
    pub amount: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackingDetails {
    pub carrier: String,
    pub tracking_number: String,
}

#[derive(Clone)]
pub struct OrderService {
    repository: Arc<dyn OrderRepository>,
    inventory: Inventory,
    metrics: Arc<Metrics>,
}

impl OrderService {
    pub fn new(repository: Arc<dyn OrderRepository>, inventory: Inventory, metrics: Arc<Metrics>) -> Self {
        Self {
            repository,
            inventory,
            metrics,
        }
    }

    pub async fn create_order(
        &self,
        customer_id: Uuid,
        shipping_info: ShippingInfo,
    ) -> Result<Order, ServiceError> {
        let order = Order::new(customer_id, shipping_info);
        self.repository.create(&order).await?;
        self.metrics.orders_created_total.inc();

        tracing::info!(order_id = %order.id(), customer_id = %customer_id, "Order created");
        Ok(order)
    }

    pub async fn get_order(&self, order_id: Uuid) -> Result<Order, ServiceError> {
        let order = self
            .repository
            .get_by_id(order_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("order", order_id))?;

        tracing::debug!(order_id = %order_id, status = %order.status(), "Loaded order");
        Ok(order)
    }

    pub async fn list_orders(&self, page: Page) -> Result<Paged<Order>, ServiceError> {
        Ok(self.repository.list(page).await?)
    }

    pub async fn customer_orders(&self, customer_id: Uuid) -> Result<Vec<Order>, ServiceError> {
        Ok(self.repository.get_by_customer_id(customer_id).await?)
    }

    /// Only pending or cancelled orders can be deleted. Stock held by a
    /// pending order is not returned.
    pub async fn delete_order(&self, order_id: Uuid) -> Result<(), ServiceError> {
        let order = self.get_order(order_id).await?;
        match order.status() {
            OrderStatus::Pending | OrderStatus::Cancelled => {}
            other => {
                tracing::warn!(order_id = %order_id, status = %other, "Refusing to delete order");
                return Err(OrderError::InvalidState(other).into());
            }
        }

        self.repository.delete(order_id).await?;
        tracing::info!(order_id = %order_id, "Order deleted");
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Lines
    // ------------------------------------------------------------------------

    pub async fn add_item(
        &self,
        order_id: Uuid,
        product_id: Uuid,
        variation_id: Uuid,
        quantity: i32,
    ) -> Result<Order, ServiceError> {
        let mut order = self.get_order(order_id).await?;
        order.ensure_pending()?;
        let (product, variation) = self.inventory.find(product_id, variation_id).await?;
        Inventory::ensure_available(&variation, quantity)?;

        order.add_item(
            product_id,
            variation_id,
            variation.sku.clone(),
            product.name,
            variation.price,
            quantity,
        )?;
        self.repository.update(&order).await?;
        self.inventory.reserve(&variation, quantity).await?;

        tracing::info!(
            order_id = %order_id,
            variation_id = %variation_id,
            quantity = quantity,
            total = order.total_amount(),
            "Order item added"
        );
        Ok(order)
    }

    /// Set a line's quantity, moving only the difference in or out of stock.
    /// Zero or below removes the line.
    pub async fn update_item_quantity(
        &self,
        order_id: Uuid,
        product_id: Uuid,
        variation_id: Uuid,
        quantity: i32,
    ) -> Result<Order, ServiceError> {
        if quantity <= 0 {
            return self.remove_item(order_id, product_id, variation_id).await;
        }

        let mut order = self.get_order(order_id).await?;
        order.ensure_pending()?;
        let current = order
            .quantity_of(product_id, variation_id)
            .ok_or(OrderError::ItemNotFound { product_id, variation_id })?;
        let delta = quantity - current;

        if delta > 0 {
            let (_, variation) = self.inventory.find(product_id, variation_id).await?;
            Inventory::ensure_available(&variation, delta)?;

            order.update_item_quantity(product_id, variation_id, quantity)?;
            self.repository.update(&order).await?;
            self.inventory.reserve(&variation, delta).await?;
        } else {
            order.update_item_quantity(product_id, variation_id, quantity)?;
            self.repository.update(&order).await?;
            if delta < 0 {
                self.inventory.release(product_id, variation_id, -delta).await?;
            }
        }

        tracing::info!(
            order_id = %order_id,
            variation_id = %variation_id,
            from = current,
            to = quantity,
            total = order.total_amount(),
            "Order item quantity updated"
        );
        Ok(order)
    }

    pub async fn remove_item(
        &self,
        order_id: Uuid,
        product_id: Uuid,
        variation_id: Uuid,
    ) -> Result<Order, ServiceError> {
        let mut order = self.get_order(order_id).await?;
        order.ensure_pending()?;
        let held = order
            .quantity_of(product_id, variation_id)
            .ok_or(OrderError::ItemNotFound { product_id, variation_id })?;

        order.remove_item(product_id, variation_id)?;
        self.repository.update(&order).await?;
        self.inventory.release(product_id, variation_id, held).await?;

        tracing::info!(
            order_id = %order_id,
            variation_id = %variation_id,
            quantity = held,
            total = order.total_amount(),
            "Order item removed"
        );
        Ok(order)
    }

    // ------------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------------

    /// Cancelling does not return stock.
    pub async fn update_status(&self, order_id: Uuid, next: OrderStatus) -> Result<Order, ServiceError> {
        let mut order = self.get_order(order_id).await?;
        let previous = order.status();

        if let Err(e) = order.update_status(next) {
            tracing::warn!(order_id = %order_id, from = %previous, to = %next, error = %e, "Status change rejected");
            return Err(e.into());
        }
        self.repository.update(&order).await?;
        self.metrics
            .record_status_transition(previous.as_str(), next.as_str());

        tracing::info!(order_id = %order_id, from = %previous, to = %next, "Order status changed");
        Ok(order)
    }

    pub async fn set_payment_info(
        &self,
        order_id: Uuid,
        payment: PaymentDetails,
    ) -> Result<Order, ServiceError> {
        if payment.amount < 0 {
            return Err(ServiceError::InvalidArgument(format!(
                "payment amount must not be negative: {}",
                payment.amount
            )));
        }

        let mut order = self.get_order(order_id).await?;
        order.set_payment_info(payment.method, payment.transaction_id, payment.amount)?;
        self.repository.update(&order).await?;

        tracing::info!(
            order_id = %order_id,
            amount = payment.amount,
            paid_at = ?order.payment_info().map(|p| p.paid_at),
            "Payment recorded"
        );
        Ok(order)
    }

    pub async fn set_tracking_info(
        &self,
        order_id: Uuid,
        tracking: TrackingDetails,
    ) -> Result<Order, ServiceError> {
        let mut order = self.get_order(order_id).await?;
        order.set_tracking_info(tracking.carrier, tracking.tracking_number)?;
        self.repository.update(&order).await?;

        tracing::info!(
            order_id = %order_id,
            carrier = ?order.shipping_info().carrier,
            "Tracking recorded"
        );
        Ok(order)
    }
}

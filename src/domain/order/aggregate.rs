use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::OrderError;
use super::value_objects::{OrderItem, OrderStatus, PaymentInfo, ShippingInfo};

// ============================================================================
// Order Aggregate - Domain Logic
// ============================================================================
//
// Invariants:
// 1. `total_amount` equals the sum of item subtotals after every mutation
// 2. At most one line per (product, variation) pair
// 3. Lines can only change while the order is pending
// 4. Status follows the transition table in `OrderStatus::can_transition_to`
//
// Stock is not touched here; the order service reserves and releases it.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    // Identity
    id: Uuid,
    customer_id: Uuid,

    // Current State
    items: Vec<OrderItem>,
    total_amount: i64,
    status: OrderStatus,
    shipping_info: ShippingInfo,
    payment_info: Option<PaymentInfo>,

    // Audit Trail
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Order {
    pub fn new(customer_id: Uuid, shipping_info: ShippingInfo) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            customer_id,
            items: Vec::new(),
            total_amount: 0,
            status: OrderStatus::Pending,
            shipping_info,
            payment_info: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Build a pending order from lines that are already unique per
    /// (product, variation), as produced by a cart.
    pub(crate) fn with_items(
        customer_id: Uuid,
        shipping_info: ShippingInfo,
        items: Vec<OrderItem>,
    ) -> Self {
        let mut order = Self::new(customer_id, shipping_info);
        order.items = items;
        order.recalculate_total();
        order
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn customer_id(&self) -> Uuid {
        self.customer_id
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn total_amount(&self) -> i64 {
        self.total_amount
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn shipping_info(&self) -> &ShippingInfo {
        &self.shipping_info
    }

    pub fn payment_info(&self) -> Option<&PaymentInfo> {
        self.payment_info.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Quantity currently held for a (product, variation) line, if any.
    pub fn quantity_of(&self, product_id: Uuid, variation_id: Uuid) -> Option<i32> {
        self.items
            .iter()
            .find(|item| item.matches(product_id, variation_id))
            .map(|item| item.quantity)
    }

    pub fn ensure_pending(&self) -> Result<(), OrderError> {
        match self.status {
            OrderStatus::Pending => Ok(()),
            other => Err(OrderError::NotPending(other)),
        }
    }

    pub fn add_item(
        &mut self,
        product_id: Uuid,
        variation_id: Uuid,
        sku: impl Into<String>,
        name: impl Into<String>,
        price: i64,
        quantity: i32,
    ) -> Result<(), OrderError> {
        self.ensure_pending()?;
        if quantity <= 0 {
            return Err(OrderError::InvalidQuantity(quantity));
        }

        match self
            .items
            .iter()
            .position(|item| item.matches(product_id, variation_id))
        {
            Some(index) => {
                let mut merged = self.items[index].clone();
                let quantity = merged
                    .quantity
                    .checked_add(quantity)
                    .ok_or(OrderError::AmountOverflow)?;
                merged.set_quantity(quantity)?;
                self.ensure_total_fits(self.items[index].subtotal, merged.subtotal)?;
                self.items[index] = merged;
            }
            None => {
                let item = OrderItem::new(
                    product_id,
                    variation_id,
                    sku.into(),
                    name.into(),
                    price,
                    quantity,
                )?;
                self.ensure_total_fits(0, item.subtotal)?;
                self.items.push(item);
            }
        }

        self.recalculate_total();
        Ok(())
    }

    /// Set a line's quantity. Zero or negative removes the line.
    pub fn update_item_quantity(
        &mut self,
        product_id: Uuid,
        variation_id: Uuid,
        quantity: i32,
    ) -> Result<(), OrderError> {
        self.ensure_pending()?;
        if quantity <= 0 {
            return self.remove_item(product_id, variation_id);
        }

        let index = self
            .items
            .iter()
            .position(|item| item.matches(product_id, variation_id))
            .ok_or(OrderError::ItemNotFound { product_id, variation_id })?;
        let mut updated = self.items[index].clone();
        updated.set_quantity(quantity)?;
        self.ensure_total_fits(self.items[index].subtotal, updated.subtotal)?;
        self.items[index] = updated;

        self.recalculate_total();
        Ok(())
    }

    pub fn remove_item(&mut self, product_id: Uuid, variation_id: Uuid) -> Result<(), OrderError> {
        self.ensure_pending()?;

        let index = self
            .items
            .iter()
            .position(|item| item.matches(product_id, variation_id))
            .ok_or(OrderError::ItemNotFound { product_id, variation_id })?;
        self.items.remove(index);

        self.recalculate_total();
        Ok(())
    }

    pub fn update_status(&mut self, next: OrderStatus) -> Result<(), OrderError> {
        if self.status.is_terminal() {
            return Err(OrderError::TerminalState(self.status));
        }
        if !self.status.can_transition_to(next) {
            return Err(OrderError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }

        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn set_payment_info(
        &mut self,
        method: impl Into<String>,
        transaction_id: impl Into<String>,
        amount: i64,
    ) -> Result<(), OrderError> {
        self.ensure_pending()?;

        let now = Utc::now();
        self.payment_info = Some(PaymentInfo {
            method: method.into(),
            transaction_id: transaction_id.into(),
            amount,
            paid_at: now,
        });
        self.updated_at = now;
        Ok(())
    }

    pub fn set_tracking_info(
        &mut self,
        carrier: impl Into<String>,
        tracking_number: impl Into<String>,
    ) -> Result<(), OrderError> {
        match self.status {
            OrderStatus::Paid | OrderStatus::Shipped => {}
            other => return Err(OrderError::InvalidState(other)),
        }

        self.shipping_info.carrier = Some(carrier.into());
        self.shipping_info.tracking_number = Some(tracking_number.into());
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Check that swapping a line subtotal of `replaced` for `subtotal`
    /// keeps the total in range. Subtotals are never negative.
    fn ensure_total_fits(&self, replaced: i64, subtotal: i64) -> Result<(), OrderError> {
        (self.total_amount - replaced)
            .checked_add(subtotal)
            .map(|_| ())
            .ok_or(OrderError::AmountOverflow)
    }

    fn recalculate_total(&mut self) {
        self.total_amount = self.items.iter().map(|item| item.subtotal).sum();
        self.updated_at = Utc::now();
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

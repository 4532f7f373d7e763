use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::CartError;
use crate::domain::order::{line_subtotal, Order, OrderItem, ShippingInfo};

// ============================================================================
// Cart Aggregate
// ============================================================================
//
// Lines merge on (product, variation) when added, but are addressed by their
// own item id afterwards. `total_amount` is recomputed on every mutation.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: Uuid,
    pub product_id: Uuid,
    pub variation_id: Uuid,
    pub sku: String,
    pub name: String,
    pub price: i64,
    pub quantity: i32,
    pub subtotal: i64,
    pub added_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CartItem {
    fn set_quantity(&mut self, quantity: i32) -> Result<(), CartError> {
        self.subtotal = line_subtotal(self.price, quantity).ok_or(CartError::AmountOverflow)?;
        self.quantity = quantity;
        self.updated_at = Utc::now();
        Ok(())
    }
}

impl From<&CartItem> for OrderItem {
    fn from(item: &CartItem) -> Self {
        OrderItem {
            product_id: item.product_id,
            variation_id: item.variation_id,
            sku: item.sku.clone(),
            name: item.name.clone(),
            price: item.price,
            quantity: item.quantity,
            subtotal: item.subtotal,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    id: Uuid,
    user_id: Uuid,
    items: Vec<CartItem>,
    total_amount: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Cart {
    pub fn new(user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            items: Vec::new(),
            total_amount: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn item(&self, item_id: Uuid) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == item_id)
    }

    pub fn total_amount(&self) -> i64 {
        self.total_amount
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Add a line, merging into an existing one for the same product and
    /// variation. Returns the id of the affected line.
    pub fn add_item(
        &mut self,
        product_id: Uuid,
        variation_id: Uuid,
        sku: impl Into<String>,
        name: impl Into<String>,
        price: i64,
        quantity: i32,
    ) -> Result<Uuid, CartError> {
        if quantity <= 0 {
            return Err(CartError::InvalidQuantity(quantity));
        }

        let item_id = match self
            .items
            .iter()
            .position(|item| item.product_id == product_id && item.variation_id == variation_id)
        {
            Some(index) => {
                let mut merged = self.items[index].clone();
                let quantity = merged
                    .quantity
                    .checked_add(quantity)
                    .ok_or(CartError::AmountOverflow)?;
                merged.set_quantity(quantity)?;
                self.ensure_total_fits(self.items[index].subtotal, merged.subtotal)?;
                let id = merged.id;
                self.items[index] = merged;
                id
            }
            None => {
                let subtotal = line_subtotal(price, quantity).ok_or(CartError::AmountOverflow)?;
                self.ensure_total_fits(0, subtotal)?;
                let now = Utc::now();
                let item = CartItem {
                    id: Uuid::new_v4(),
                    product_id,
                    variation_id,
                    sku: sku.into(),
                    name: name.into(),
                    price,
                    quantity,
                    subtotal,
                    added_at: now,
                    updated_at: now,
                };
                let id = item.id;
                self.items.push(item);
                id
            }
        };

        self.recalculate_total();
        Ok(item_id)
    }

    pub fn update_item_quantity(&mut self, item_id: Uuid, quantity: i32) -> Result<(), CartError> {
        if quantity <= 0 {
            return Err(CartError::InvalidQuantity(quantity));
        }

        let index = self
            .items
            .iter()
            .position(|item| item.id == item_id)
            .ok_or(CartError::ItemNotFound(item_id))?;
        let mut updated = self.items[index].clone();
        updated.set_quantity(quantity)?;
        self.ensure_total_fits(self.items[index].subtotal, updated.subtotal)?;
        self.items[index] = updated;

        self.recalculate_total();
        Ok(())
    }

    /// Remove a line. The last line takes the removed line's slot, so the
    /// order of the remaining lines is not preserved.
    pub fn remove_item(&mut self, item_id: Uuid) -> Result<CartItem, CartError> {
        let index = self
            .items
            .iter()
            .position(|item| item.id == item_id)
            .ok_or(CartError::ItemNotFound(item_id))?;
        let removed = self.items.swap_remove(index);

        self.recalculate_total();
        Ok(removed)
    }

    pub fn clear_items(&mut self) -> Vec<CartItem> {
        let drained = std::mem::take(&mut self.items);
        self.recalculate_total();
        drained
    }

    /// Snapshot every line into a new pending order for this cart's user.
    /// Stock is not re-validated here.
    pub fn convert_to_order(&self, shipping_info: ShippingInfo) -> Order {
        let items = self.items.iter().map(OrderItem::from).collect();
        Order::with_items(self.user_id, shipping_info, items)
    }

    /// Subtotals are never negative, so only the addition can overflow.
    fn ensure_total_fits(&self, replaced: i64, subtotal: i64) -> Result<(), CartError> {
        (self.total_amount - replaced)
            .checked_add(subtotal)
            .map(|_| ())
            .ok_or(CartError::AmountOverflow)
    }

    fn recalculate_total(&mut self) {
        self.total_amount = self.items.iter().map(|item| item.subtotal).sum();
        self.updated_at = Utc::now();
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

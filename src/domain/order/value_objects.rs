use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::OrderError;

// ============================================================================
// Order Value Objects
// ============================================================================

/// Lifecycle status of an order.
///
/// Allowed edges: `Pending -> Paid | Cancelled`, `Paid -> Shipped | Cancelled`,
/// `Shipped -> Delivered`. `Delivered` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Paid,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::Paid)
                | (OrderStatus::Pending, OrderStatus::Cancelled)
                | (OrderStatus::Paid, OrderStatus::Shipped)
                | (OrderStatus::Paid, OrderStatus::Cancelled)
                | (OrderStatus::Shipped, OrderStatus::Delivered)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| OrderError::UnknownStatus(s.to_string()))
    }
}

/// A single order line. Price, SKU and name are copied from the catalog when
/// the line is added and never looked up again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: Uuid,
    pub variation_id: Uuid,
    pub sku: String,
    pub name: String,
    pub price: i64,
    pub quantity: i32,
    pub subtotal: i64,
}

impl OrderItem {
    pub(crate) fn new(
        product_id: Uuid,
        variation_id: Uuid,
        sku: String,
        name: String,
        price: i64,
        quantity: i32,
    ) -> Result<Self, OrderError> {
        let subtotal = line_subtotal(price, quantity).ok_or(OrderError::AmountOverflow)?;
        Ok(Self {
            product_id,
            variation_id,
            sku,
            name,
            price,
            quantity,
            subtotal,
        })
    }

    pub fn matches(&self, product_id: Uuid, variation_id: Uuid) -> bool {
        self.product_id == product_id && self.variation_id == variation_id
    }

    /// Leaves the line untouched when the new subtotal does not fit.
    pub(crate) fn set_quantity(&mut self, quantity: i32) -> Result<(), OrderError> {
        self.subtotal = line_subtotal(self.price, quantity).ok_or(OrderError::AmountOverflow)?;
        self.quantity = quantity;
        Ok(())
    }
}

/// `price * quantity`, or `None` when it does not fit in an `i64`.
pub(crate) fn line_subtotal(price: i64, quantity: i32) -> Option<i64> {
    price.checked_mul(i64::from(quantity))
}

/// Where an order ships to, plus carrier tracking once dispatched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingInfo {
    pub recipient_name: String,
    pub address_line1: String,
    #[serde(default)]
    pub address_line2: Option<String>,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub carrier: Option<String>,
    #[serde(default)]
    pub tracking_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentInfo {
    pub method: String,
    pub transaction_id: String,
    pub amount: i64,
    pub paid_at: DateTime<Utc>,
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_item_subtotal() {
        let mut item = OrderItem::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "SKU-1".to_string(),
            "Mug".to_string(),
            250,
            4,
        )
        .unwrap();
        assert_eq!(item.subtotal, 1000);

        item.set_quantity(1).unwrap();
        assert_eq!(item.quantity, 1);
        assert_eq!(item.subtotal, 250);
    }

    #[test]
    fn test_order_item_subtotal_out_of_range() {
        let price = i64::MAX / 2 + 1;
        let result = OrderItem::new(Uuid::new_v4(), Uuid::new_v4(), "BIG".into(), "Big".into(), price, 2);
        assert_eq!(result, Err(OrderError::AmountOverflow));

        let mut item = OrderItem::new(Uuid::new_v4(), Uuid::new_v4(), "BIG".into(), "Big".into(), price, 1)
            .unwrap();
        assert_eq!(item.set_quantity(3), Err(OrderError::AmountOverflow));
        assert_eq!(item.quantity, 1);
        assert_eq!(item.subtotal, price);
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(!OrderStatus::Paid.is_terminal());
        assert!(!OrderStatus::Shipped.is_terminal());
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("paid".parse::<OrderStatus>().unwrap(), OrderStatus::Paid);
        assert_eq!(" Shipped ".parse::<OrderStatus>().unwrap(), OrderStatus::Shipped);
        assert!(matches!(
            "refunded".parse::<OrderStatus>(),
            Err(OrderError::UnknownStatus(_))
        ));
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&OrderStatus::Delivered).unwrap();
        assert_eq!(json, "\"delivered\"");

        let status: OrderStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(status, OrderStatus::Cancelled);
    }
}

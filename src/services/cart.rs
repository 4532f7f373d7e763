use std::sync::Arc;

use uuid::Uuid;

use super::error::ServiceError;
use super::inventory::Inventory;
use crate::domain::cart::{Cart, CartError, CartItem};
use crate::domain::order::{Order, ShippingInfo};
use crate::metrics::Metrics;
use crate::store::{CartRepository, OrderRepository, RepositoryError};

// ============================================================================
// Cart Service
// ============================================================================
//
// Cart lines hold stock the same way order lines do. Checkout hands the
// reservation over to the new order without touching stock again.
//
// ============================================================================

#[derive(Clone)]
pub struct CartService {
    carts: Arc<dyn CartRepository>,
    orders: Arc<dyn OrderRepository>,
    inventory: Inventory,
    metrics: Arc<Metrics>,
}

impl CartService {
    pub fn new(
        carts: Arc<dyn CartRepository>,
        orders: Arc<dyn OrderRepository>,
        inventory: Inventory,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            carts,
            orders,
            inventory,
            metrics,
        }
    }

    /// Fetch the user's cart, creating an empty one on first use.
    pub async fn get_or_create(&self, user_id: Uuid) -> Result<Cart, ServiceError> {
        if let Some(cart) = self.carts.get_by_user_id(user_id).await? {
            return Ok(cart);
        }

        let cart = Cart::new(user_id);
        match self.carts.create(&cart).await {
            Ok(()) => {
                tracing::info!(user_id = %user_id, cart_id = %cart.id(), "Cart created");
                Ok(cart)
            }
            // Another request created it in between.
            Err(RepositoryError::Conflict(_)) => self.get_existing(user_id).await,
            Err(e) => Err(e.into()),
        }
    }

    pub async fn add_item(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        variation_id: Uuid,
        quantity: i32,
    ) -> Result<Cart, ServiceError> {
        if quantity <= 0 {
            return Err(CartError::InvalidQuantity(quantity).into());
        }
        let (product, variation) = self.inventory.find(product_id, variation_id).await?;
        Inventory::ensure_available(&variation, quantity)?;

        let add = |cart: &mut Cart| {
            cart.add_item(
                product_id,
                variation_id,
                variation.sku.clone(),
                product.name.clone(),
                variation.price,
                quantity,
            )
        };

        // A first add stores the cart with its line, so a rejected add
        // never leaves an empty cart behind.
        let (cart, item_id) = match self.carts.get_by_user_id(user_id).await? {
            Some(mut cart) => {
                let item_id = add(&mut cart)?;
                self.carts.update(&cart).await?;
                (cart, item_id)
            }
            None => {
                let mut cart = Cart::new(user_id);
                let item_id = add(&mut cart)?;
                match self.carts.create(&cart).await {
                    Ok(()) => {
                        tracing::info!(user_id = %user_id, cart_id = %cart.id(), "Cart created");
                        (cart, item_id)
                    }
                    Err(RepositoryError::Conflict(_)) => {
                        let mut cart = self.get_existing(user_id).await?;
                        let item_id = add(&mut cart)?;
                        self.carts.update(&cart).await?;
                        (cart, item_id)
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        };
        self.inventory.reserve(&variation, quantity).await?;

        tracing::info!(
            user_id = %user_id,
            item_id = %item_id,
            quantity = quantity,
            total = cart.total_amount(),
            "Cart item added"
        );
        Ok(cart)
    }

    /// Set a line's quantity, moving only the difference in or out of stock.
    /// Zero or below removes the line.
    pub async fn update_item_quantity(
        &self,
        user_id: Uuid,
        item_id: Uuid,
        quantity: i32,
    ) -> Result<Cart, ServiceError> {
        if quantity <= 0 {
            return self.remove_item(user_id, item_id).await;
        }

        let mut cart = self.get_existing(user_id).await?;
        let item = cart
            .item(item_id)
            .cloned()
            .ok_or(CartError::ItemNotFound(item_id))?;
        let delta = quantity - item.quantity;

        if delta > 0 {
            let (_, variation) = self.inventory.find(item.product_id, item.variation_id).await?;
            Inventory::ensure_available(&variation, delta)?;

            cart.update_item_quantity(item_id, quantity)?;
            self.carts.update(&cart).await?;
            self.inventory.reserve(&variation, delta).await?;
        } else {
            cart.update_item_quantity(item_id, quantity)?;
            self.carts.update(&cart).await?;
            if delta < 0 {
                self.inventory
                    .release(item.product_id, item.variation_id, -delta)
                    .await?;
            }
        }

        tracing::info!(
            user_id = %user_id,
            item_id = %item_id,
            from = item.quantity,
            to = quantity,
            total = cart.total_amount(),
            "Cart item quantity updated"
        );
        Ok(cart)
    }

    pub async fn remove_item(&self, user_id: Uuid, item_id: Uuid) -> Result<Cart, ServiceError> {
        let mut cart = self.get_existing(user_id).await?;
        let removed = cart.remove_item(item_id)?;
        self.carts.update(&cart).await?;
        self.inventory
            .release(removed.product_id, removed.variation_id, removed.quantity)
            .await?;

        tracing::info!(
            user_id = %user_id,
            item_id = %item_id,
            quantity = removed.quantity,
            total = cart.total_amount(),
            "Cart item removed"
        );
        Ok(cart)
    }

    /// Empty the cart and return every line's stock.
    pub async fn clear_cart(&self, user_id: Uuid) -> Result<Cart, ServiceError> {
        let mut cart = self.get_existing(user_id).await?;
        let drained = cart.clear_items();
        self.carts.update(&cart).await?;
        self.release_all(&drained).await?;

        tracing::info!(user_id = %user_id, lines = drained.len(), "Cart cleared");
        Ok(cart)
    }

    /// Drop the cart entirely, returning its stock first.
    pub async fn delete_cart(&self, user_id: Uuid) -> Result<(), ServiceError> {
        let cart = self.get_existing(user_id).await?;
        self.carts.delete(user_id).await?;
        self.release_all(cart.items()).await?;

        tracing::info!(user_id = %user_id, cart_id = %cart.id(), "Cart deleted");
        Ok(())
    }

    /// Turn the cart into a pending order and empty it. Stock stays with
    /// the lines, so nothing is re-checked or reserved here.
    pub async fn checkout(&self, user_id: Uuid, shipping_info: ShippingInfo) -> Result<Order, ServiceError> {
        let mut cart = self.get_existing(user_id).await?;
        if cart.is_empty() {
            tracing::warn!(user_id = %user_id, "Checkout of empty cart");
            return Err(ServiceError::EmptyCart);
        }

        let order = cart.convert_to_order(shipping_info);
        self.orders.create(&order).await?;
        cart.clear_items();
        self.carts.update(&cart).await?;

        self.metrics.orders_created_total.inc();
        self.metrics.checkouts_total.inc();
        tracing::info!(
            user_id = %user_id,
            order_id = %order.id(),
            lines = order.items().len(),
            total = order.total_amount(),
            "Cart checked out"
        );
        Ok(order)
    }

    async fn get_existing(&self, user_id: Uuid) -> Result<Cart, ServiceError> {
        self.carts
            .get_by_user_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("cart", user_id))
    }

    async fn release_all(&self, items: &[CartItem]) -> Result<(), ServiceError> {
        for item in items {
            self.inventory
                .release(item.product_id, item.variation_id, item.quantity)
                .await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::OrderStatus;
    use crate::services::test_support::{fixture, seed_product, shipping, stock_of};
    use crate::services::ErrorKind;

    #[tokio::test]
    async fn test_get_or_create_is_idempotent() {
        let fx = fixture();
        let user_id = Uuid::new_v4();

        let first = fx.services.carts.get_or_create(user_id).await.unwrap();
        let second = fx.services.carts.get_or_create(user_id).await.unwrap();

        assert_eq!(first.id(), second.id());
        assert!(first.is_empty());
    }

    #[tokio::test]
    async fn test_repeat_add_merges_and_reserves() {
        let fx = fixture();
        let carts = &fx.services.carts;
        let product = seed_product(&fx.catalog, "KETTLE", 10, 8).await;
        let user_id = Uuid::new_v4();

        carts.add_item(user_id, product.id, product.variations[0].id, 2).await.unwrap();
        let cart = carts.add_item(user_id, product.id, product.variations[0].id, 3).await.unwrap();

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 5);
        assert_eq!(cart.total_amount(), 50);
        assert_eq!(stock_of(&fx.catalog, &product).await, 3);
    }

    #[tokio::test]
    async fn test_add_beyond_stock_fails() {
        let fx = fixture();
        let carts = &fx.services.carts;
        let product = seed_product(&fx.catalog, "KETTLE", 10, 1).await;
        let user_id = Uuid::new_v4();

        let err = carts
            .add_item(user_id, product.id, product.variations[0].id, 2)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InsufficientStock);
        assert!(fx.carts.get_by_user_id(user_id).await.unwrap().is_none());
        assert_eq!(stock_of(&fx.catalog, &product).await, 1);
    }

    #[tokio::test]
    async fn test_rejected_first_add_creates_no_cart() {
        let fx = fixture();
        let carts = &fx.services.carts;
        let product = seed_product(&fx.catalog, "KETTLE", 10, 5).await;
        let user_id = Uuid::new_v4();

        let unknown = carts
            .add_item(user_id, Uuid::new_v4(), Uuid::new_v4(), 1)
            .await
            .unwrap_err();
        assert_eq!(unknown.kind(), ErrorKind::NotFound);

        let zero = carts
            .add_item(user_id, product.id, product.variations[0].id, 0)
            .await
            .unwrap_err();
        assert!(matches!(zero, ServiceError::Cart(CartError::InvalidQuantity(0))));

        assert!(fx.carts.get_by_user_id(user_id).await.unwrap().is_none());

        let cart = carts.add_item(user_id, product.id, product.variations[0].id, 1).await.unwrap();
        assert_eq!(fx.carts.get_by_user_id(user_id).await.unwrap(), Some(cart));
    }

    #[tokio::test]
    async fn test_line_amount_out_of_range_is_rejected() {
        let fx = fixture();
        let carts = &fx.services.carts;
        let price = i64::MAX / 2 + 1;
        let product = seed_product(&fx.catalog, "GOLD", price, 5).await;
        let user_id = Uuid::new_v4();

        let err = carts
            .add_item(user_id, product.id, product.variations[0].id, 2)
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Cart(CartError::AmountOverflow)));
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(fx.carts.get_by_user_id(user_id).await.unwrap().is_none());
        assert_eq!(stock_of(&fx.catalog, &product).await, 5);

        let cart = carts.add_item(user_id, product.id, product.variations[0].id, 1).await.unwrap();
        let err = carts
            .update_item_quantity(user_id, cart.items()[0].id, 2)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(stock_of(&fx.catalog, &product).await, 4);
    }

    #[tokio::test]
    async fn test_release_past_stock_ceiling_fails() {
        let fx = fixture();
        let carts = &fx.services.carts;
        let product = seed_product(&fx.catalog, "KETTLE", 10, 5).await;
        let user_id = Uuid::new_v4();
        let cart = carts.add_item(user_id, product.id, product.variations[0].id, 5).await.unwrap();

        fx.services
            .catalog
            .set_variation_stock(product.variations[0].id, i32::MAX)
            .await
            .unwrap();

        let err = carts.remove_item(user_id, cart.items()[0].id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(stock_of(&fx.catalog, &product).await, i32::MAX);
    }

    #[tokio::test]
    async fn test_update_moves_only_the_delta() {
        let fx = fixture();
        let carts = &fx.services.carts;
        let product = seed_product(&fx.catalog, "KETTLE", 10, 5).await;
        let user_id = Uuid::new_v4();
        let cart = carts.add_item(user_id, product.id, product.variations[0].id, 3).await.unwrap();
        let item_id = cart.items()[0].id;
        assert_eq!(stock_of(&fx.catalog, &product).await, 2);

        carts.update_item_quantity(user_id, item_id, 1).await.unwrap();
        assert_eq!(stock_of(&fx.catalog, &product).await, 4);

        let cart = carts.update_item_quantity(user_id, item_id, 5).await.unwrap();
        assert_eq!(cart.total_amount(), 50);
        assert_eq!(stock_of(&fx.catalog, &product).await, 0);

        let err = carts.update_item_quantity(user_id, item_id, 6).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientStock);
    }

    #[tokio::test]
    async fn test_update_to_zero_removes_line() {
        let fx = fixture();
        let carts = &fx.services.carts;
        let product = seed_product(&fx.catalog, "KETTLE", 10, 5).await;
        let user_id = Uuid::new_v4();
        let cart = carts.add_item(user_id, product.id, product.variations[0].id, 3).await.unwrap();

        let cart = carts.update_item_quantity(user_id, cart.items()[0].id, 0).await.unwrap();

        assert!(cart.is_empty());
        assert_eq!(stock_of(&fx.catalog, &product).await, 5);
    }

    #[tokio::test]
    async fn test_remove_unknown_item() {
        let fx = fixture();
        let carts = &fx.services.carts;
        let user_id = Uuid::new_v4();
        carts.get_or_create(user_id).await.unwrap();

        let missing = Uuid::new_v4();
        let err = carts.remove_item(user_id, missing).await.unwrap_err();
        assert!(matches!(err, ServiceError::Cart(CartError::ItemNotFound(id)) if id == missing));

        let no_cart = carts.remove_item(Uuid::new_v4(), missing).await.unwrap_err();
        assert_eq!(no_cart.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_clear_cart_returns_stock() {
        let fx = fixture();
        let carts = &fx.services.carts;
        let lamp = seed_product(&fx.catalog, "LAMP", 10, 5).await;
        let mug = seed_product(&fx.catalog, "MUG", 3, 5).await;
        let user_id = Uuid::new_v4();
        carts.add_item(user_id, lamp.id, lamp.variations[0].id, 2).await.unwrap();
        carts.add_item(user_id, mug.id, mug.variations[0].id, 4).await.unwrap();

        let cart = carts.clear_cart(user_id).await.unwrap();

        assert!(cart.is_empty());
        assert_eq!(cart.total_amount(), 0);
        assert_eq!(stock_of(&fx.catalog, &lamp).await, 5);
        assert_eq!(stock_of(&fx.catalog, &mug).await, 5);
    }

    #[tokio::test]
    async fn test_delete_cart_returns_stock() {
        let fx = fixture();
        let carts = &fx.services.carts;
        let lamp = seed_product(&fx.catalog, "LAMP", 10, 5).await;
        let user_id = Uuid::new_v4();
        let before = carts.add_item(user_id, lamp.id, lamp.variations[0].id, 2).await.unwrap();

        carts.delete_cart(user_id).await.unwrap();

        assert_eq!(stock_of(&fx.catalog, &lamp).await, 5);
        let fresh = carts.get_or_create(user_id).await.unwrap();
        assert_ne!(fresh.id(), before.id());
    }

    #[tokio::test]
    async fn test_checkout_creates_order_and_empties_cart() {
        let fx = fixture();
        let carts = &fx.services.carts;
        let product = seed_product(&fx.catalog, "KETTLE", 10, 5).await;
        let user_id = Uuid::new_v4();
        carts.add_item(user_id, product.id, product.variations[0].id, 2).await.unwrap();

        let order = carts.checkout(user_id, shipping()).await.unwrap();

        assert_eq!(order.customer_id(), user_id);
        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(order.total_amount(), 20);
        assert_eq!(fx.services.orders.get_order(order.id()).await.unwrap(), order);
        assert!(carts.get_or_create(user_id).await.unwrap().is_empty());
        // Reservation moves to the order unchanged.
        assert_eq!(stock_of(&fx.catalog, &product).await, 3);

        let text = fx.metrics.render().unwrap();
        assert!(text.contains("checkouts_total 1"));
    }

    #[tokio::test]
    async fn test_checkout_empty_cart_fails() {
        let fx = fixture();
        let user_id = Uuid::new_v4();
        fx.services.carts.get_or_create(user_id).await.unwrap();

        let err = fx.services.carts.checkout(user_id, shipping()).await.unwrap_err();
        assert!(matches!(err, ServiceError::EmptyCart));
        assert!(fx.services.orders.customer_orders(user_id).await.unwrap().is_empty());
    }
}

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    CartRepository, CatalogRepository, OrderRepository, Page, Paged, ProductFilter,
    RepositoryError,
};
use crate::domain::cart::Cart;
use crate::domain::catalog::{Category, Product, Variation};
use crate::domain::order::Order;

// ============================================================================
// In-Memory Repositories
// ============================================================================
//
// Each call takes the lock for its own duration only. Like the Scylla
// adapter, a read followed by a write from the caller is not atomic.
//
// ============================================================================

#[derive(Debug, Default)]
pub struct InMemoryCatalogRepository {
    products: RwLock<HashMap<Uuid, Product>>,
    categories: RwLock<HashMap<Uuid, Category>>,
}

impl InMemoryCatalogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn sku_owner(products: &HashMap<Uuid, Product>, sku: &str) -> Option<Uuid> {
        products
            .values()
            .find(|product| product.skus().any(|existing| existing == sku))
            .map(|product| product.id)
    }
}

#[async_trait]
impl CatalogRepository for InMemoryCatalogRepository {
    async fn create_product(&self, product: &Product) -> Result<(), RepositoryError> {
        let mut products = self.products.write().await;
        if products.contains_key(&product.id) {
            return Err(RepositoryError::Conflict(format!("product {} already exists", product.id)));
        }
        if let Some(sku) = product.skus().find(|sku| Self::sku_owner(&products, sku).is_some()) {
            return Err(RepositoryError::Conflict(format!("SKU already in use: {sku}")));
        }

        products.insert(product.id, product.clone());
        Ok(())
    }

    async fn get_product_by_id(&self, id: Uuid) -> Result<Option<Product>, RepositoryError> {
        Ok(self.products.read().await.get(&id).cloned())
    }

    async fn update_product(&self, product: &Product) -> Result<(), RepositoryError> {
        let mut products = self.products.write().await;
        if !products.contains_key(&product.id) {
            return Err(RepositoryError::not_found("product", product.id));
        }
        let taken = product.skus().find(|sku| {
            Self::sku_owner(&products, sku).is_some_and(|owner| owner != product.id)
        });
        if let Some(sku) = taken {
            return Err(RepositoryError::Conflict(format!("SKU already in use: {sku}")));
        }

        products.insert(product.id, product.clone());
        Ok(())
    }

    async fn delete_product(&self, id: Uuid) -> Result<(), RepositoryError> {
        self.products
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::not_found("product", id))
    }

    async fn list_products(
        &self,
        filter: &ProductFilter,
        page: Page,
    ) -> Result<Paged<Product>, RepositoryError> {
        let mut matching: Vec<Product> = self
            .products
            .read()
            .await
            .values()
            .filter(|product| filter.matches(product))
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        Ok(page.apply(matching))
    }

    async fn get_variation_by_sku(&self, sku: &str) -> Result<Option<Variation>, RepositoryError> {
        Ok(self
            .products
            .read()
            .await
            .values()
            .flat_map(|product| product.variations.iter())
            .find(|variation| variation.sku == sku)
            .cloned())
    }

    async fn update_variation_stock(
        &self,
        variation_id: Uuid,
        new_quantity: i32,
    ) -> Result<(), RepositoryError> {
        let mut products = self.products.write().await;
        let variation = products
            .values_mut()
            .flat_map(|product| product.variations.iter_mut())
            .find(|variation| variation.id == variation_id)
            .ok_or_else(|| RepositoryError::not_found("variation", variation_id))?;

        variation.stock = new_quantity;
        Ok(())
    }

    async fn create_category(&self, category: &Category) -> Result<(), RepositoryError> {
        let mut categories = self.categories.write().await;
        if categories.values().any(|existing| existing.slug == category.slug) {
            return Err(RepositoryError::Conflict(format!(
                "category slug already in use: {}",
                category.slug
            )));
        }

        categories.insert(category.id, category.clone());
        Ok(())
    }

    async fn get_category_by_id(&self, id: Uuid) -> Result<Option<Category>, RepositoryError> {
        Ok(self.categories.read().await.get(&id).cloned())
    }

    async fn get_category_by_slug(&self, slug: &str) -> Result<Option<Category>, RepositoryError> {
        Ok(self
            .categories
            .read()
            .await
            .values()
            .find(|category| category.slug == slug)
            .cloned())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let mut categories: Vec<Category> = self.categories.read().await.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryOrderRepository {
    orders: RwLock<HashMap<Uuid, Order>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(orders: &mut [Order]) {
    orders.sort_by(|a, b| b.created_at().cmp(&a.created_at()).then(a.id().cmp(&b.id())));
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn create(&self, order: &Order) -> Result<(), RepositoryError> {
        let mut orders = self.orders.write().await;
        if orders.contains_key(&order.id()) {
            return Err(RepositoryError::Conflict(format!("order {} already exists", order.id())));
        }
        orders.insert(order.id(), order.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Order>, RepositoryError> {
        Ok(self.orders.read().await.get(&id).cloned())
    }

    async fn update(&self, order: &Order) -> Result<(), RepositoryError> {
        let mut orders = self.orders.write().await;
        match orders.get_mut(&order.id()) {
            Some(stored) => {
                *stored = order.clone();
                Ok(())
            }
            None => Err(RepositoryError::not_found("order", order.id())),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        self.orders
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::not_found("order", id))
    }

    async fn list(&self, page: Page) -> Result<Paged<Order>, RepositoryError> {
        let mut orders: Vec<Order> = self.orders.read().await.values().cloned().collect();
        newest_first(&mut orders);
        Ok(page.apply(orders))
    }

    async fn get_by_customer_id(&self, customer_id: Uuid) -> Result<Vec<Order>, RepositoryError> {
        let mut orders: Vec<Order> = self
            .orders
            .read()
            .await
            .values()
            .filter(|order| order.customer_id() == customer_id)
            .cloned()
            .collect();
        newest_first(&mut orders);
        Ok(orders)
    }
}

/// Carts keyed by owning user.
#[derive(Debug, Default)]
pub struct InMemoryCartRepository {
    carts: RwLock<HashMap<Uuid, Cart>>,
}

impl InMemoryCartRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CartRepository for InMemoryCartRepository {
    async fn create(&self, cart: &Cart) -> Result<(), RepositoryError> {
        let mut carts = self.carts.write().await;
        if carts.contains_key(&cart.user_id()) {
            return Err(RepositoryError::Conflict(format!(
                "user {} already has a cart",
                cart.user_id()
            )));
        }
        carts.insert(cart.user_id(), cart.clone());
        Ok(())
    }

    async fn get_by_user_id(&self, user_id: Uuid) -> Result<Option<Cart>, RepositoryError> {
        Ok(self.carts.read().await.get(&user_id).cloned())
    }

    async fn update(&self, cart: &Cart) -> Result<(), RepositoryError> {
        let mut carts = self.carts.write().await;
        match carts.get_mut(&cart.user_id()) {
            Some(stored) => {
                *stored = cart.clone();
                Ok(())
            }
            None => Err(RepositoryError::not_found("cart", cart.user_id())),
        }
    }

    async fn delete(&self, user_id: Uuid) -> Result<(), RepositoryError> {
        self.carts
            .write()
            .await
            .remove(&user_id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::not_found("cart", user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::{NewProduct, NewVariation};
    use crate::domain::order::ShippingInfo;
    use std::collections::BTreeMap;

    fn product(name: &str, skus: &[&str]) -> Product {
        Product::new(NewProduct {
            name: name.to_string(),
            description: String::new(),
            category_id: None,
            variations: skus
                .iter()
                .map(|sku| NewVariation {
                    sku: sku.to_string(),
                    price: 100,
                    stock: 3,
                    attributes: BTreeMap::new(),
                })
                .collect(),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_product_rejects_taken_sku() {
        let repo = InMemoryCatalogRepository::new();
        repo.create_product(&product("Lamp", &["LAMP-1"])).await.unwrap();

        let result = repo.create_product(&product("Other Lamp", &["LAMP-1"])).await;
        assert!(matches!(result, Err(RepositoryError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_update_variation_stock() {
        let repo = InMemoryCatalogRepository::new();
        let lamp = product("Lamp", &["LAMP-1", "LAMP-2"]);
        let variation_id = lamp.variations[1].id;
        repo.create_product(&lamp).await.unwrap();

        repo.update_variation_stock(variation_id, 42).await.unwrap();

        let stored = repo.get_product_by_id(lamp.id).await.unwrap().unwrap();
        assert_eq!(stored.variation(variation_id).unwrap().stock, 42);
        assert_eq!(stored.variations[0].stock, 3);

        let missing = repo.update_variation_stock(Uuid::new_v4(), 1).await;
        assert!(matches!(missing, Err(RepositoryError::NotFound { entity: "variation", .. })));
    }

    #[tokio::test]
    async fn test_get_variation_by_sku() {
        let repo = InMemoryCatalogRepository::new();
        let lamp = product("Lamp", &["LAMP-1"]);
        repo.create_product(&lamp).await.unwrap();

        let found = repo.get_variation_by_sku("LAMP-1").await.unwrap();
        assert_eq!(found.map(|v| v.id), Some(lamp.variations[0].id));
        assert!(repo.get_variation_by_sku("NOPE").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_orders_by_customer() {
        let repo = InMemoryOrderRepository::new();
        let customer = Uuid::new_v4();
        let first = Order::new(customer, ShippingInfo::default());
        let second = Order::new(customer, ShippingInfo::default());
        let foreign = Order::new(Uuid::new_v4(), ShippingInfo::default());
        for order in [&first, &second, &foreign] {
            repo.create(order).await.unwrap();
        }

        let orders = repo.get_by_customer_id(customer).await.unwrap();
        assert_eq!(orders.len(), 2);
        assert!(orders.iter().all(|order| order.customer_id() == customer));

        let page = repo.list(Page::new(1, 2)).await.unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.items.len(), 2);
    }

    #[tokio::test]
    async fn test_cart_is_unique_per_user() {
        let repo = InMemoryCartRepository::new();
        let user = Uuid::new_v4();
        repo.create(&Cart::new(user)).await.unwrap();

        let duplicate = repo.create(&Cart::new(user)).await;
        assert!(matches!(duplicate, Err(RepositoryError::Conflict(_))));

        repo.delete(user).await.unwrap();
        assert!(repo.get_by_user_id(user).await.unwrap().is_none());
    }
}

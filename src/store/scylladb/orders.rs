use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use scylla::client::session::Session;
use uuid::Uuid;

use super::{fetch_payload, fetch_payloads};
use crate::domain::order::Order;
use crate::store::{OrderRepository, Page, Paged, RepositoryError};

pub struct ScyllaOrderRepository {
    session: Arc<Session>,
}

impl ScyllaOrderRepository {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    async fn load(&self, id: Uuid) -> Result<Option<Order>> {
        fetch_payload(&self.session, "SELECT payload FROM orders WHERE id = ?", (id,)).await
    }

    async fn write(&self, order: &Order) -> Result<()> {
        let payload = serde_json::to_string(order)?;
        self.session
            .query_unpaged(
                "INSERT INTO orders (id, customer_id, status, payload, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?)",
                (
                    order.id(),
                    order.customer_id(),
                    order.status().as_str(),
                    payload,
                    order.created_at(),
                    order.updated_at(),
                ),
            )
            .await?;

        tracing::debug!(
            order_id = %order.id(),
            status = %order.status(),
            item_count = order.items().len(),
            "Stored order"
        );
        Ok(())
    }
}

fn newest_first(orders: &mut [Order]) {
    orders.sort_by(|a, b| b.created_at().cmp(&a.created_at()).then(a.id().cmp(&b.id())));
}

#[async_trait]
impl OrderRepository for ScyllaOrderRepository {
    async fn create(&self, order: &Order) -> Result<(), RepositoryError> {
        if self.load(order.id()).await?.is_some() {
            return Err(RepositoryError::Conflict(format!("order {} already exists", order.id())));
        }
        Ok(self.write(order).await?)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Order>, RepositoryError> {
        Ok(self.load(id).await?)
    }

    async fn update(&self, order: &Order) -> Result<(), RepositoryError> {
        if self.load(order.id()).await?.is_none() {
            return Err(RepositoryError::not_found("order", order.id()));
        }
        Ok(self.write(order).await?)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        if self.load(id).await?.is_none() {
            return Err(RepositoryError::not_found("order", id));
        }
        self.session
            .query_unpaged("DELETE FROM orders WHERE id = ?", (id,))
            .await
            .map_err(anyhow::Error::from)?;
        Ok(())
    }

    async fn list(&self, page: Page) -> Result<Paged<Order>, RepositoryError> {
        let mut orders: Vec<Order> =
            fetch_payloads(&self.session, "SELECT payload FROM orders", ()).await?;
        newest_first(&mut orders);
        Ok(page.apply(orders))
    }

    async fn get_by_customer_id(&self, customer_id: Uuid) -> Result<Vec<Order>, RepositoryError> {
        let mut orders: Vec<Order> = fetch_payloads(
            &self.session,
            "SELECT payload FROM orders WHERE customer_id = ?",
            (customer_id,),
        )
        .await?;
        newest_first(&mut orders);
        Ok(orders)
    }
}

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use scylla::client::session::Session;
use uuid::Uuid;

use super::fetch_payload;
use crate::domain::cart::Cart;
use crate::store::{CartRepository, RepositoryError};

/// One row per user; the whole cart lives in `payload`.
pub struct ScyllaCartRepository {
    session: Arc<Session>,
}

impl ScyllaCartRepository {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    async fn load(&self, user_id: Uuid) -> Result<Option<Cart>> {
        fetch_payload(&self.session, "SELECT payload FROM carts WHERE user_id = ?", (user_id,)).await
    }

    async fn write(&self, cart: &Cart) -> Result<()> {
        let payload = serde_json::to_string(cart)?;
        self.session
            .query_unpaged(
                "INSERT INTO carts (user_id, cart_id, payload, updated_at) VALUES (?, ?, ?, ?)",
                (cart.user_id(), cart.id(), payload, cart.updated_at()),
            )
            .await?;
        Ok(())
    }
}

#[async_trait]
impl CartRepository for ScyllaCartRepository {
    async fn create(&self, cart: &Cart) -> Result<(), RepositoryError> {
        if self.load(cart.user_id()).await?.is_some() {
            return Err(RepositoryError::Conflict(format!(
                "user {} already has a cart",
                cart.user_id()
            )));
        }
        Ok(self.write(cart).await?)
    }

    async fn get_by_user_id(&self, user_id: Uuid) -> Result<Option<Cart>, RepositoryError> {
        Ok(self.load(user_id).await?)
    }

    async fn update(&self, cart: &Cart) -> Result<(), RepositoryError> {
        if self.load(cart.user_id()).await?.is_none() {
            return Err(RepositoryError::not_found("cart", cart.user_id()));
        }
        Ok(self.write(cart).await?)
    }

    async fn delete(&self, user_id: Uuid) -> Result<(), RepositoryError> {
        if self.load(user_id).await?.is_none() {
            return Err(RepositoryError::not_found("cart", user_id));
        }
        self.session
            .query_unpaged("DELETE FROM carts WHERE user_id = ?", (user_id,))
            .await
            .map_err(anyhow::Error::from)?;
        Ok(())
    }
}

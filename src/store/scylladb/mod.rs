// ============================================================================
// ScyllaDB Repositories
// ============================================================================
//
// Aggregates are stored as JSON payloads in a text column, next to the few
// columns needed for lookups. Secondary lookups (SKU, variation, slug) use
// small index tables that are kept up to date by the same repository calls.
//
// ============================================================================

mod carts;
mod catalog;
mod orders;
mod schema;

use anyhow::Result;
use scylla::client::session::Session;
use scylla::client::session_builder::SessionBuilder;
use scylla::serialize::row::SerializeRow;
use serde::de::DeserializeOwned;

pub use carts::ScyllaCartRepository;
pub use catalog::ScyllaCatalogRepository;
pub use orders::ScyllaOrderRepository;
pub use schema::init_schema;

/// Open a session against the given contact points.
pub async fn connect(nodes: &[String]) -> Result<Session> {
    let mut builder = SessionBuilder::new();
    for node in nodes {
        builder = builder.known_node(node);
    }
    Ok(builder.build().await?)
}

/// Run a query whose rows have a single JSON `payload` column and decode each.
pub(crate) async fn fetch_payloads<T: DeserializeOwned>(
    session: &Session,
    query: &str,
    values: impl SerializeRow,
) -> Result<Vec<T>> {
    let result = session.query_unpaged(query, values).await?;

    let rows_result = match result.into_rows_result() {
        Ok(rows) => rows,
        Err(_) => return Ok(Vec::new()), // No rows
    };

    let mut decoded = Vec::new();
    for row in rows_result.rows::<(String,)>()? {
        let (payload,) = row?;
        decoded.push(serde_json::from_str(&payload)?);
    }

    Ok(decoded)
}

/// Like `fetch_payloads`, for lookups by primary key.
pub(crate) async fn fetch_payload<T: DeserializeOwned>(
    session: &Session,
    query: &str,
    values: impl SerializeRow,
) -> Result<Option<T>> {
    let result = session.query_unpaged(query, values).await?;

    let rows_result = match result.into_rows_result() {
        Ok(rows) => rows,
        Err(_) => return Ok(None),
    };

    match rows_result.maybe_first_row::<(String,)>()? {
        Some((payload,)) => Ok(Some(serde_json::from_str(&payload)?)),
        None => Ok(None),
    }
}

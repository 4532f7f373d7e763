use anyhow::Result;
use scylla::client::session::Session;

// ============================================================================
// Keyspace & Table Definitions
// ============================================================================

const TABLES: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS products (
        id uuid PRIMARY KEY,
        category_id uuid,
        payload text,
        created_at timestamp
    )",
    "CREATE TABLE IF NOT EXISTS variation_index (
        variation_id uuid PRIMARY KEY,
        product_id uuid
    )",
    "CREATE TABLE IF NOT EXISTS sku_index (
        sku text PRIMARY KEY,
        product_id uuid,
        variation_id uuid
    )",
    "CREATE TABLE IF NOT EXISTS categories (
        id uuid PRIMARY KEY,
        slug text,
        payload text
    )",
    "CREATE TABLE IF NOT EXISTS category_slugs (
        slug text PRIMARY KEY,
        category_id uuid
    )",
    "CREATE TABLE IF NOT EXISTS orders (
        id uuid PRIMARY KEY,
        customer_id uuid,
        status text,
        payload text,
        created_at timestamp,
        updated_at timestamp
    )",
    "CREATE INDEX IF NOT EXISTS orders_by_customer ON orders (customer_id)",
    "CREATE TABLE IF NOT EXISTS carts (
        user_id uuid PRIMARY KEY,
        cart_id uuid,
        payload text,
        updated_at timestamp
    )",
];

/// Create the keyspace and tables if needed, then switch the session to it.
pub async fn init_schema(session: &Session, keyspace: &str, replication_factor: u32) -> Result<()> {
    session
        .query_unpaged(
            format!(
                "CREATE KEYSPACE IF NOT EXISTS {keyspace} WITH REPLICATION = \
                 {{'class': 'SimpleStrategy', 'replication_factor': {replication_factor}}}"
            ),
            (),
        )
        .await?;

    session.use_keyspace(keyspace, false).await?;

    for statement in TABLES {
        session.query_unpaged(*statement, ()).await?;
    }

    tracing::info!(keyspace = %keyspace, statements = TABLES.len(), "Schema ready");
    Ok(())
}

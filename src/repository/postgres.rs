use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use sqlx::postgres::{PgConnection, PgPool, PgPoolOptions};

use super::{fold_order_rows, OrderRepository, OrderRow, RepositoryError};
use crate::models::Order;

// ============================================================================
// PostgreSQL Order Repository
// ============================================================================
//
// Tables (see migrations/):
//   orders(id, account_id, total_price, created_at)
//   order_products(id, order_id, product_id, quantity)
//
// The line items of one order are written with a single UNNEST insert, so an
// order costs two statements regardless of its size.
//
// ============================================================================

const INSERT_ORDER: &str = "INSERT INTO orders (account_id, total_price)
     VALUES ($1, $2)
     RETURNING id, created_at";

const INSERT_ORDER_PRODUCTS: &str = "INSERT INTO order_products (order_id, product_id, quantity)
     SELECT $1, t.product_id, t.quantity
     FROM UNNEST($2::text[], $3::int4[]) WITH ORDINALITY AS t(product_id, quantity, ord)
     ORDER BY t.ord";

const SELECT_ORDERS_BY_ACCOUNT: &str = "SELECT o.id, o.account_id, o.total_price, o.created_at,
            op.product_id, op.quantity
     FROM orders o
     JOIN order_products op ON op.order_id = o.id
     WHERE o.account_id = $1
     ORDER BY o.id, op.id";

#[derive(Clone)]
pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        tracing::info!(max_connections, "Connected to order database");
        Ok(Self::new(pool))
    }

    /// Apply the embedded schema migrations.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Wait for in-flight connections and close the pool.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Order database pool closed");
    }
}

/// Header + line items on one connection; the caller owns the transaction.
async fn insert_order(conn: &mut PgConnection, order: &Order) -> Result<(i32, DateTime<Utc>), sqlx::Error> {
    let (id, created_at): (i32, DateTime<Utc>) = sqlx::query_as(INSERT_ORDER)
        .bind(order.account_id)
        .bind(order.total_price)
        .fetch_one(&mut *conn)
        .await?;

    let (product_ids, quantities): (Vec<String>, Vec<i32>) = order
        .products
        .iter()
        .map(|p| (p.id.clone(), p.quantity))
        .unzip();

    let inserted = sqlx::query(INSERT_ORDER_PRODUCTS)
        .bind(id)
        .bind(product_ids)
        .bind(quantities)
        .execute(&mut *conn)
        .await?
        .rows_affected();

    if inserted != order.products.len() as u64 {
        return Err(sqlx::Error::Protocol(format!(
            "inserted {} of {} line items",
            inserted,
            order.products.len()
        )));
    }

    Ok((id, created_at))
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn create_order(&self, mut order: Order) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to begin order transaction");
            RepositoryError::Create(e.into())
        })?;

        match insert_order(&mut *tx, &order).await {
            Ok((id, created_at)) => {
                tx.commit().await.map_err(|e| {
                    tracing::error!(error = %e, order_id = id, "Failed to commit order transaction");
                    RepositoryError::Create(e.into())
                })?;

                order.id = id;
                order.created_at = Some(created_at);

                tracing::info!(
                    order_id = id,
                    account_id = order.account_id,
                    line_items = order.products.len(),
                    total_price = order.total_price,
                    "✅ Order persisted"
                );

                Ok(order)
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    account_id = order.account_id,
                    "Failed to insert order, rolling back"
                );

                if let Err(rollback) = tx.rollback().await {
                    tracing::warn!(error = %rollback, "Rollback of order transaction failed");
                }

                Err(RepositoryError::Create(e.into()))
            }
        }
    }

    async fn get_orders_by_account_id(&self, account_id: i32) -> Result<Vec<Order>, RepositoryError> {
        let rows: Vec<OrderRow> = sqlx::query_as::<_, OrderRow>(SELECT_ORDERS_BY_ACCOUNT)
            .bind(account_id)
            .fetch(&self.pool)
            .try_collect()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, account_id, "Failed to load orders");
                RepositoryError::Find(e.into())
            })?;

        tracing::debug!("Loaded {} order rows for account {}", rows.len(), account_id);

        Ok(fold_order_rows(rows))
    }
}

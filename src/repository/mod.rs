// ============================================================================
// Order Repository
// ============================================================================
//
// Durable, atomic storage of orders and their line items.
//
// - create_order writes the header and every line item in one transaction
// - get_orders_by_account_id reads them back with a single join, folded into
//   one Order per id; line items come back with id + quantity only
//
// ============================================================================

mod memory;
mod postgres;

pub use memory::InMemoryOrderRepository;
pub use postgres::PgOrderRepository;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{Order, OrderedProduct};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Persistence failures. The display text is what callers may see; the
/// source is for logs only.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("could not create order")]
    Create(#[source] BoxError),

    #[error("could not find orders")]
    Find(#[source] BoxError),
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persist `order` and all of its line items atomically. The returned
    /// order carries the store-assigned id and creation time.
    async fn create_order(&self, order: Order) -> Result<Order, RepositoryError>;

    /// All orders of `account_id` in id order, line items unresolved.
    async fn get_orders_by_account_id(&self, account_id: i32) -> Result<Vec<Order>, RepositoryError>;
}

/// One row of the orders/order_products join.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct OrderRow {
    pub id: i32,
    pub account_id: i32,
    pub total_price: i64,
    pub created_at: DateTime<Utc>,
    pub product_id: String,
    pub quantity: i32,
}

/// Fold join rows, ordered by order id, into one Order per distinct id.
///
/// Line items keep row order. Rows for the same order must be adjacent.
pub fn fold_order_rows<I>(rows: I) -> Vec<Order>
where
    I: IntoIterator<Item = OrderRow>,
{
    let mut orders: Vec<Order> = Vec::new();

    for row in rows {
        let item = OrderedProduct::unresolved(row.product_id, row.quantity);

        match orders.last_mut() {
            Some(current) if current.id == row.id => current.products.push(item),
            _ => orders.push(Order {
                id: row.id,
                account_id: row.account_id,
                products: vec![item],
                total_price: row.total_price,
                created_at: Some(row.created_at),
            }),
        }
    }

    orders
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use super::{fold_order_rows, OrderRepository, OrderRow, RepositoryError};
use crate::models::Order;

// ============================================================================
// In-Memory Order Repository
// ============================================================================
//
// Same contract as the PostgreSQL repository, backed by two vectors that
// mirror the orders / order_products tables. Writes are staged and only
// applied once every line item has been accepted, which gives the same
// all-or-nothing behaviour as the database transaction.
//
// A failure can be injected at the N-th line-item insert of the next writes.
//
// ============================================================================

#[derive(Debug, Clone)]
struct OrderHeader {
    id: i32,
    account_id: i32,
    total_price: i64,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct OrderLine {
    order_id: i32,
    product_id: String,
    quantity: i32,
}

#[derive(Default)]
struct Tables {
    next_id: i32,
    orders: Vec<OrderHeader>,
    lines: Vec<OrderLine>,
}

#[derive(Default)]
pub struct InMemoryOrderRepository {
    tables: Mutex<Tables>,
    fail_at_line_item: Mutex<Option<usize>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `create_order` fail when inserting its
    /// `index`-th (zero-based) line item.
    pub async fn fail_at_line_item(&self, index: usize) {
        *self.fail_at_line_item.lock().await = Some(index);
    }

    pub async fn clear_failure(&self) {
        *self.fail_at_line_item.lock().await = None;
    }

    pub async fn order_count(&self) -> usize {
        self.tables.lock().await.orders.len()
    }

    pub async fn line_item_count(&self) -> usize {
        self.tables.lock().await.lines.len()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn create_order(&self, mut order: Order) -> Result<Order, RepositoryError> {
        let fail_at = *self.fail_at_line_item.lock().await;
        let mut tables = self.tables.lock().await;

        let header = OrderHeader {
            id: tables.next_id + 1,
            account_id: order.account_id,
            total_price: order.total_price,
            created_at: Utc::now(),
        };

        let mut staged = Vec::with_capacity(order.products.len());
        for (index, product) in order.products.iter().enumerate() {
            if fail_at == Some(index) {
                tracing::error!(order_id = header.id, index, "Injected line-item failure, rolling back");
                return Err(RepositoryError::Create(
                    format!("injected failure at line item {}", index).into(),
                ));
            }
            if product.quantity <= 0 {
                return Err(RepositoryError::Create(
                    format!("quantity must be positive, got {}", product.quantity).into(),
                ));
            }
            staged.push(OrderLine {
                order_id: header.id,
                product_id: product.id.clone(),
                quantity: product.quantity,
            });
        }

        tables.next_id = header.id;
        tables.orders.push(header.clone());
        tables.lines.extend(staged);

        order.id = header.id;
        order.created_at = Some(header.created_at);

        tracing::debug!(order_id = order.id, line_items = order.products.len(), "Order stored in memory");

        Ok(order)
    }

    async fn get_orders_by_account_id(&self, account_id: i32) -> Result<Vec<Order>, RepositoryError> {
        let guard = self.tables.lock().await;
        let tables = &*guard;

        // Headers are appended in id order, lines in insertion order.
        let rows = tables
            .orders
            .iter()
            .filter(|o| o.account_id == account_id)
            .flat_map(move |o| {
                tables
                    .lines
                    .iter()
                    .filter(move |l| l.order_id == o.id)
                    .map(move |l| OrderRow {
                        id: o.id,
                        account_id: o.account_id,
                        total_price: o.total_price,
                        created_at: o.created_at,
                        product_id: l.product_id.clone(),
                        quantity: l.quantity,
                    })
            })
            .collect::<Vec<_>>();

        Ok(fold_order_rows(rows))
    }
}

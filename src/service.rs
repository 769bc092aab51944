use std::sync::Arc;

use crate::errors::OrderError;
use crate::models::{Order, OrderedProduct};
use crate::repository::OrderRepository;

// ============================================================================
// Order Service
// ============================================================================
//
// Pricing and delegation only. Line items arrive already resolved against
// the catalog; nothing here talks to a collaborator.
//
// ============================================================================

#[derive(Clone)]
pub struct OrderService {
    repository: Arc<dyn OrderRepository>,
}

impl OrderService {
    pub fn new(repository: Arc<dyn OrderRepository>) -> Self {
        Self { repository }
    }

    pub async fn post_order(&self, account_id: i32, products: Vec<OrderedProduct>) -> Result<Order, OrderError> {
        let total_price = total_price(&products)?;
        let order = Order::new(account_id, products, total_price);

        Ok(self.repository.create_order(order).await?)
    }

    pub async fn get_orders_by_account_id(&self, account_id: i32) -> Result<Vec<Order>, OrderError> {
        Ok(self.repository.get_orders_by_account_id(account_id).await?)
    }
}

/// Σ price × quantity in integer currency units.
pub fn total_price(products: &[OrderedProduct]) -> Result<i64, OrderError> {
    products.iter().try_fold(0i64, |total, p| {
        p.price
            .checked_mul(i64::from(p.quantity))
            .and_then(|line| total.checked_add(line))
            .ok_or(OrderError::PriceOverflow)
    })
}

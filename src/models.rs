use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

// ============================================================================
// Domain Models
// ============================================================================
//
// Account and Product are owned by external services; only Order is persisted
// here. An Order's line items durably keep (product_id, quantity) only.
//
// ============================================================================

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Account {
    pub id: i32,
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Unit price in the smallest currency unit.
    pub price: i64,
}

/// One line of an order.
///
/// At creation time it is a pricing snapshot taken from the catalog. When read
/// back from the store only `id` and `quantity` are populated until the
/// catalog detail is re-joined.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct OrderedProduct {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub quantity: i32,
}

impl OrderedProduct {
    /// A stored line item: reference and quantity, nothing resolved.
    pub fn unresolved(id: impl Into<String>, quantity: i32) -> Self {
        Self {
            id: id.into(),
            quantity,
            ..Default::default()
        }
    }

    /// Line item carrying the catalog's current detail for `product`.
    pub fn resolved(product: &Product, quantity: i32) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            quantity,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Order {
    /// Store-assigned; zero until persisted.
    pub id: i32,
    pub account_id: i32,
    pub products: Vec<OrderedProduct>,
    pub total_price: i64,
    /// Store-assigned; `None` until persisted.
    pub created_at: Option<DateTime<Utc>>,
}

impl Order {
    /// An order that has not been written yet.
    pub fn new(account_id: i32, products: Vec<OrderedProduct>, total_price: i64) -> Self {
        Self {
            id: 0,
            account_id,
            products,
            total_price,
            created_at: None,
        }
    }
}

/// A requested line: what the caller asked for before catalog resolution.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct RequestedProduct {
    pub id: String,
    pub quantity: i32,
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unresolved_line_item_has_no_detail() {
        let item = OrderedProduct::unresolved("p-1", 3);

        assert_eq!(item.id, "p-1");
        assert_eq!(item.quantity, 3);
        assert!(item.name.is_empty());
        assert!(item.description.is_empty());
        assert_eq!(item.price, 0);
    }

    #[test]
    fn test_resolved_line_item_copies_catalog_detail() {
        let product = Product {
            id: "p-2".to_string(),
            name: "Kettle".to_string(),
            description: "1.7l, steel".to_string(),
            price: 2599,
        };

        let item = OrderedProduct::resolved(&product, 2);

        assert_eq!(item.id, "p-2");
        assert_eq!(item.name, "Kettle");
        assert_eq!(item.description, "1.7l, steel");
        assert_eq!(item.price, 2599);
        assert_eq!(item.quantity, 2);
    }

    #[test]
    fn test_new_order_is_unpersisted() {
        let order = Order::new(7, vec![OrderedProduct::unresolved("p-1", 1)], 100);

        assert_eq!(order.id, 0);
        assert_eq!(order.account_id, 7);
        assert!(order.created_at.is_none());
    }
}

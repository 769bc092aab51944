mod common;

use common::{product, requested, FakeAccounts, FakeCatalog, Harness};

use order_service::pb::order::order_service_server::OrderService as _;
use order_service::pb::order::{GetOrdersByAccountIdRequest, OrderedProduct, PostOrderRequest};
use order_service::OrderError;
use tonic::{Code, Request};

fn harness() -> Harness {
    Harness::new(
        FakeAccounts::with(&[1, 2]),
        FakeCatalog::with(&[("P1", 1000), ("P2", 2500), ("P3", 300)]),
    )
}

// ============================================================================
// PostOrder
// ============================================================================

#[tokio::test]
async fn test_post_order_prices_from_catalog() {
    let h = harness();
    let orchestrator = h.orchestrator();

    let order = orchestrator
        .place_order(1, vec![requested("P1", 2), requested("P2", 1)])
        .await
        .unwrap();

    assert!(order.id > 0);
    assert_eq!(order.account_id, 1);
    assert_eq!(order.total_price, 4500);
    assert_eq!(order.products.len(), 2);
    assert_eq!(order.products[0].name, "P1 name");
    assert_eq!(order.products[0].price, 1000);
    assert_eq!(order.products[1].quantity, 1);
    assert_eq!(order.created_at.len(), 15);

    assert_eq!(h.catalog.calls(), 1);
    assert_eq!(h.catalog.requested()[0], vec!["P1", "P2"]);
    assert_eq!(h.repository.order_count().await, 1);
    assert_eq!(h.metrics.orders_created.get(), 1);
    assert_eq!(h.metrics.line_items_created.get(), 2);
}

#[tokio::test]
async fn test_post_order_partial_resolution_writes_nothing() {
    let h = harness();
    let orchestrator = h.orchestrator();

    let result = orchestrator
        .place_order(1, vec![requested("P1", 1), requested("P9", 1)])
        .await;

    match result {
        Err(OrderError::ProductsNotFound { missing }) => assert_eq!(missing, vec!["P9"]),
        other => panic!("expected ProductsNotFound, got {:?}", other),
    }
    assert_eq!(h.repository.order_count().await, 0);
    assert_eq!(h.repository.line_item_count().await, 0);
}

#[tokio::test]
async fn test_post_order_unknown_account_skips_catalog() {
    let h = harness();
    let orchestrator = h.orchestrator();

    let result = orchestrator.place_order(42, vec![requested("P1", 1)]).await;

    assert!(matches!(result, Err(OrderError::AccountNotFound(42))));
    assert_eq!(h.accounts.calls(), 1);
    assert_eq!(h.catalog.calls(), 0);
    assert_eq!(h.repository.order_count().await, 0);
}

#[tokio::test]
async fn test_post_order_validates_before_any_call() {
    let h = harness();
    let orchestrator = h.orchestrator();

    let empty = orchestrator.place_order(1, vec![]).await;
    let zero = orchestrator.place_order(1, vec![requested("P1", 0)]).await;

    assert!(matches!(empty, Err(OrderError::EmptyOrder)));
    assert!(matches!(zero, Err(OrderError::InvalidQuantity { quantity: 0, .. })));
    assert_eq!(h.accounts.calls(), 0);
    assert_eq!(h.catalog.calls(), 0);
}

#[tokio::test]
async fn test_post_order_repeated_product_is_one_lookup() {
    let h = harness();
    let orchestrator = h.orchestrator();

    let order = orchestrator
        .place_order(1, vec![requested("P3", 1), requested("P3", 2)])
        .await
        .unwrap();

    assert_eq!(order.products.len(), 2);
    assert_eq!(order.total_price, 900);
    assert_eq!(h.catalog.requested(), vec![vec!["P3".to_string()]]);
}

#[tokio::test]
async fn test_post_order_store_failure_is_atomic() {
    let h = harness();
    h.repository.fail_at_line_item(1).await;
    let orchestrator = h.orchestrator();

    let result = orchestrator
        .place_order(1, vec![requested("P1", 1), requested("P2", 1), requested("P3", 1)])
        .await;

    let err = result.unwrap_err();
    assert!(matches!(err, OrderError::Repository(_)));
    assert_eq!(err.code(), Code::Internal);
    assert_eq!(h.repository.order_count().await, 0);
    assert_eq!(h.repository.line_item_count().await, 0);

    // Nothing half-written shows up in history either.
    h.repository.clear_failure().await;
    assert!(orchestrator.order_history(1).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_post_order_account_service_down() {
    let h = harness();
    h.accounts.set_unavailable(true);
    let orchestrator = h.orchestrator();

    let err = orchestrator
        .place_order(1, vec![requested("P1", 1)])
        .await
        .unwrap_err();

    assert_eq!(err.code(), Code::Unavailable);
    assert_eq!(h.catalog.calls(), 0);
}

// ============================================================================
// GetOrdersByAccountID
// ============================================================================

#[tokio::test]
async fn test_history_unknown_account_skips_catalog() {
    let h = harness();
    let orchestrator = h.orchestrator();

    let result = orchestrator.order_history(42).await;

    assert!(matches!(result, Err(OrderError::AccountNotFound(42))));
    assert_eq!(h.catalog.calls(), 0);
}

#[tokio::test]
async fn test_history_without_orders_skips_catalog() {
    let h = harness();
    let orchestrator = h.orchestrator();

    let orders = orchestrator.order_history(2).await.unwrap();

    assert!(orders.is_empty());
    assert_eq!(h.catalog.calls(), 0);
}

#[tokio::test]
async fn test_history_batches_union_of_product_ids() {
    let h = harness();
    let orchestrator = h.orchestrator();

    orchestrator
        .place_order(1, vec![requested("P1", 1), requested("P2", 1)])
        .await
        .unwrap();
    orchestrator
        .place_order(1, vec![requested("P2", 3), requested("P3", 1)])
        .await
        .unwrap();
    orchestrator.place_order(2, vec![requested("P1", 1)]).await.unwrap();
    let calls_after_writes = h.catalog.calls();

    let orders = orchestrator.order_history(1).await.unwrap();

    assert_eq!(orders.len(), 2);
    assert_eq!(h.catalog.calls(), calls_after_writes + 1);
    let last = h.catalog.requested().pop().unwrap();
    assert_eq!(last, vec!["P1", "P2", "P3"]);

    assert_eq!(orders[0].products[1].id, "P2");
    assert_eq!(orders[0].products[1].name, "P2 name");
    assert_eq!(orders[1].products[0].quantity, 3);
    assert!(orders[0].id < orders[1].id);
}

#[tokio::test]
async fn test_history_is_idempotent() {
    let h = harness();
    let orchestrator = h.orchestrator();
    orchestrator
        .place_order(1, vec![requested("P1", 2), requested("P2", 1)])
        .await
        .unwrap();

    let first = orchestrator.order_history(1).await.unwrap();
    let second = orchestrator.order_history(1).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(h.repository.order_count().await, 1);
}

#[tokio::test]
async fn test_history_reflects_live_catalog_but_keeps_total() {
    let h = harness();
    let orchestrator = h.orchestrator();
    orchestrator
        .place_order(1, vec![requested("P1", 2), requested("P2", 1)])
        .await
        .unwrap();

    h.catalog.insert(product("P1", 1200));
    let orders = orchestrator.order_history(1).await.unwrap();

    assert_eq!(orders[0].products[0].price, 1200);
    assert_eq!(orders[0].total_price, 4500);
}

#[tokio::test]
async fn test_history_fails_when_product_was_deleted() {
    let h = harness();
    let orchestrator = h.orchestrator();
    orchestrator
        .place_order(1, vec![requested("P1", 2), requested("P2", 1)])
        .await
        .unwrap();

    h.catalog.remove("P2");
    let result = orchestrator.order_history(1).await;

    assert!(matches!(
        result,
        Err(OrderError::UnresolvableLineItem { ref product_id, .. }) if product_id == "P2"
    ));
}

// ============================================================================
// RPC surface
// ============================================================================

#[tokio::test]
async fn test_rpc_statuses_are_opaque() {
    let h = harness();
    let orchestrator = h.orchestrator();

    let status = orchestrator
        .post_order(Request::new(PostOrderRequest {
            account_id: 1,
            products: vec![OrderedProduct {
                id: "P9".to_string(),
                quantity: 1,
                ..Default::default()
            }],
        }))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::NotFound);
    assert_eq!(status.message(), "one or more products not found");

    let status = orchestrator
        .get_orders_by_account_id(Request::new(GetOrdersByAccountIdRequest { account_id: 42 }))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::NotFound);
    assert_eq!(status.message(), "account not found");

    assert_eq!(
        h.metrics
            .requests_total
            .with_label_values(&["PostOrder", "products_not_found"])
            .get(),
        1
    );
}

#[tokio::test]
async fn test_rpc_post_then_get() {
    let h = harness();
    let orchestrator = h.orchestrator();

    let posted = orchestrator
        .post_order(Request::new(PostOrderRequest {
            account_id: 1,
            products: vec![
                OrderedProduct {
                    id: "P1".to_string(),
                    quantity: 2,
                    ..Default::default()
                },
                OrderedProduct {
                    id: "P2".to_string(),
                    quantity: 1,
                    ..Default::default()
                },
            ],
        }))
        .await
        .unwrap()
        .into_inner()
        .order
        .unwrap();

    let orders = orchestrator
        .get_orders_by_account_id(Request::new(GetOrdersByAccountIdRequest { account_id: 1 }))
        .await
        .unwrap()
        .into_inner()
        .orders;

    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0], posted);
}

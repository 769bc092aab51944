use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Instant;

use tonic::{Request, Response, Status};
use tracing::instrument;
use uuid::Uuid;

use crate::clients::{AccountDirectory, ClientError, ProductCatalog};
use crate::errors::OrderError;
use crate::metrics::{Metrics, OUTCOME_OK};
use crate::models::{Order, OrderedProduct, Product, RequestedProduct};
use crate::pb::order as pb;
use crate::pb::order::order_service_server::{OrderService as OrderRpc, OrderServiceServer};
use crate::service::OrderService;

// ============================================================================
// Order Orchestrator - RPC-facing handler
// ============================================================================
//
// The only component that talks to the account and catalog services.
//
// PostOrder:  account check → one catalog batch → merge + verify → persist
// GetOrders:  account check → load orders → one catalog batch for the union
//             of product ids → re-join per order
//
// An order is only written when every requested product resolves, and a read
// only succeeds when every stored line item still resolves. Nothing is
// dropped silently.
//
// ============================================================================

const POST_ORDER: &str = "PostOrder";
const GET_ORDERS: &str = "GetOrdersByAccountID";

pub struct OrderOrchestrator {
    service: OrderService,
    accounts: Arc<dyn AccountDirectory>,
    catalog: Arc<dyn ProductCatalog>,
    metrics: Arc<Metrics>,
}

impl OrderOrchestrator {
    pub fn new(
        service: OrderService,
        accounts: Arc<dyn AccountDirectory>,
        catalog: Arc<dyn ProductCatalog>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            service,
            accounts,
            catalog,
            metrics,
        }
    }

    pub fn into_server(self) -> OrderServiceServer<Self> {
        OrderServiceServer::new(self)
    }

    /// Place an order for `account_id`. Fails without writing anything unless
    /// the account exists and every requested product is in the catalog.
    pub async fn place_order(
        &self,
        account_id: i32,
        requested: Vec<RequestedProduct>,
    ) -> Result<pb::Order, OrderError> {
        validate_requested(&requested)?;
        self.ensure_account(account_id).await?;

        let ids = distinct_ids(requested.iter().map(|r| r.id.as_str()));
        let products = self.lookup_products(POST_ORDER, &ids).await?;
        let ordered = merge_requested(&requested, products)?;

        let order = self.service.post_order(account_id, ordered).await?;
        self.metrics.record_order_created(order.products.len());

        let lines = order.products.iter().map(pb::OrderedProduct::from).collect();
        Ok(pb::Order::from_domain(&order, lines)?)
    }

    /// The account's order history with current catalog detail on every line.
    pub async fn order_history(&self, account_id: i32) -> Result<Vec<pb::Order>, OrderError> {
        self.ensure_account(account_id).await?;

        let orders = self.service.get_orders_by_account_id(account_id).await?;
        if orders.is_empty() {
            return Ok(Vec::new());
        }

        let ids = distinct_ids(
            orders
                .iter()
                .flat_map(|o| o.products.iter().map(|p| p.id.as_str())),
        );
        let products = self.lookup_products(GET_ORDERS, &ids).await?;

        rejoin_orders(&orders, products)
    }

    async fn ensure_account(&self, account_id: i32) -> Result<(), OrderError> {
        match self.accounts.get_account(account_id).await {
            Ok(_) => Ok(()),
            Err(ClientError::NotFound(_)) => Err(OrderError::AccountNotFound(account_id)),
            Err(e) => Err(e.into()),
        }
    }

    async fn lookup_products(&self, method: &str, ids: &[String]) -> Result<Vec<Product>, OrderError> {
        self.metrics.record_catalog_lookup(method, ids.len());
        let products = self.catalog.get_products(ids).await?;

        tracing::debug!(requested = ids.len(), returned = products.len(), "Catalog lookup done");
        Ok(products)
    }

    fn finish<T>(&self, method: &str, started: Instant, result: &Result<T, OrderError>) {
        let outcome = match result {
            Ok(_) => OUTCOME_OK,
            Err(e) => e.kind(),
        };
        self.metrics
            .record_request(method, outcome, started.elapsed().as_secs_f64());
    }
}

#[tonic::async_trait]
impl OrderRpc for OrderOrchestrator {
    #[instrument(skip(self, request), fields(request_id = %Uuid::new_v4(), account_id = tracing::field::Empty))]
    async fn post_order(
        &self,
        request: Request<pb::PostOrderRequest>,
    ) -> Result<Response<pb::PostOrderResponse>, Status> {
        let started = Instant::now();
        let req = request.into_inner();
        tracing::Span::current().record("account_id", req.account_id);
        tracing::info!(products = req.products.len(), "PostOrder received");

        let requested = req.products.into_iter().map(RequestedProduct::from).collect();
        let result = self.place_order(req.account_id, requested).await;
        self.finish(POST_ORDER, started, &result);

        let order = result.map_err(OrderError::into_post_status)?;
        tracing::info!(order_id = order.id, total_price = order.total_price, "✅ Order placed");

        Ok(Response::new(pb::PostOrderResponse { order: Some(order) }))
    }

    #[instrument(skip(self, request), fields(request_id = %Uuid::new_v4(), account_id = tracing::field::Empty))]
    async fn get_orders_by_account_id(
        &self,
        request: Request<pb::GetOrdersByAccountIdRequest>,
    ) -> Result<Response<pb::GetOrdersByAccountIdResponse>, Status> {
        let started = Instant::now();
        let account_id = request.into_inner().account_id;
        tracing::Span::current().record("account_id", account_id);

        let result = self.order_history(account_id).await;
        self.finish(GET_ORDERS, started, &result);

        let orders = result.map_err(OrderError::into_get_status)?;
        tracing::info!(orders = orders.len(), "Orders returned");

        Ok(Response::new(pb::GetOrdersByAccountIdResponse { orders }))
    }
}

// ============================================================================
// Resolution Helpers
// ============================================================================

fn validate_requested(requested: &[RequestedProduct]) -> Result<(), OrderError> {
    if requested.is_empty() {
        return Err(OrderError::EmptyOrder);
    }

    if let Some(bad) = requested.iter().find(|r| r.quantity <= 0) {
        return Err(OrderError::InvalidQuantity {
            product_id: bad.id.clone(),
            quantity: bad.quantity,
        });
    }

    Ok(())
}

/// Distinct ids in a stable (sorted) order.
pub fn distinct_ids<'a>(ids: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    ids.into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Pair every requested line with its catalog product. All or nothing: any
/// id missing from `products` fails the whole merge.
pub fn merge_requested(
    requested: &[RequestedProduct],
    products: Vec<Product>,
) -> Result<Vec<OrderedProduct>, OrderError> {
    let by_id: HashMap<String, Product> = products.into_iter().map(|p| (p.id.clone(), p)).collect();

    let mut merged = Vec::with_capacity(requested.len());
    let mut missing = Vec::new();

    for r in requested {
        match by_id.get(&r.id) {
            Some(product) => merged.push(OrderedProduct::resolved(product, r.quantity)),
            None => missing.push(r.id.clone()),
        }
    }

    if merged.len() != requested.len() {
        return Err(OrderError::ProductsNotFound { missing });
    }

    Ok(merged)
}

/// Attach current catalog detail to every stored line item.
pub fn rejoin_orders(orders: &[Order], products: Vec<Product>) -> Result<Vec<pb::Order>, OrderError> {
    let by_id: HashMap<String, Product> = products.into_iter().map(|p| (p.id.clone(), p)).collect();

    orders
        .iter()
        .map(|order| {
            let lines = order
                .products
                .iter()
                .map(|line| {
                    by_id
                        .get(&line.id)
                        .map(|p| pb::OrderedProduct::from(&OrderedProduct::resolved(p, line.quantity)))
                        .ok_or_else(|| OrderError::UnresolvableLineItem {
                            order_id: order.id,
                            product_id: line.id.clone(),
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;

            Ok(pb::Order::from_domain(order, lines)?)
        })
        .collect()
}

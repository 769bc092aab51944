use tonic::transport::Channel;

use crate::models::{Order, RequestedProduct};
use crate::pb::order::order_service_client::OrderServiceClient;
use crate::pb::order::{GetOrdersByAccountIdRequest, OrderedProduct, PostOrderRequest};
use crate::pb::TimestampError;

// ============================================================================
// Order Client
// ============================================================================
//
// Typed client for callers of the order service (e.g. an API gateway).
// Converts wire orders back into domain orders, decoding creation times.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum OrderClientError {
    #[error("could not connect to order service: {0}")]
    Connect(#[from] tonic::transport::Error),

    #[error("order service returned {}: {}", .0.code(), .0.message())]
    Status(#[from] tonic::Status),

    #[error("order service response carried no order")]
    MissingOrder,

    #[error("bad order timestamp: {0}")]
    Timestamp(#[from] TimestampError),
}

#[derive(Clone)]
pub struct OrderClient {
    inner: OrderServiceClient<Channel>,
}

impl OrderClient {
    pub async fn connect(url: impl Into<String>) -> Result<Self, OrderClientError> {
        let inner = OrderServiceClient::connect(url.into()).await?;
        Ok(Self { inner })
    }

    pub fn from_channel(channel: Channel) -> Self {
        Self {
            inner: OrderServiceClient::new(channel),
        }
    }

    pub async fn post_order(
        &self,
        account_id: i32,
        products: &[RequestedProduct],
    ) -> Result<Order, OrderClientError> {
        let request = PostOrderRequest {
            account_id,
            products: products
                .iter()
                .map(|p| OrderedProduct {
                    id: p.id.clone(),
                    quantity: p.quantity,
                    ..Default::default()
                })
                .collect(),
        };

        let mut client = self.inner.clone();
        let response = client.post_order(request).await.map_err(|status| {
            tracing::warn!(account_id, error = %status, "PostOrder failed");
            status
        })?;

        let order = response.into_inner().order.ok_or(OrderClientError::MissingOrder)?;
        Ok(order.into_domain()?)
    }

    pub async fn get_orders_by_account_id(&self, account_id: i32) -> Result<Vec<Order>, OrderClientError> {
        let mut client = self.inner.clone();
        let response = client
            .get_orders_by_account_id(GetOrdersByAccountIdRequest { account_id })
            .await
            .map_err(|status| {
                tracing::warn!(account_id, error = %status, "GetOrdersByAccountID failed");
                status
            })?;

        response
            .into_inner()
            .orders
            .into_iter()
            .map(|o| o.into_domain().map_err(OrderClientError::from))
            .collect()
    }
}

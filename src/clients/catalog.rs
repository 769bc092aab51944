use std::time::Duration;

use async_trait::async_trait;
use tonic::transport::Channel;

use super::{lazy_channel, ClientError, ProductCatalog};
use crate::models::Product;
use crate::pb::catalog::catalog_service_client::CatalogServiceClient;
use crate::pb::catalog::GetProductsRequest;

const SERVICE: &str = "catalog";

#[derive(Clone)]
pub struct GrpcCatalogClient {
    inner: CatalogServiceClient<Channel>,
}

impl GrpcCatalogClient {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let channel = lazy_channel(SERVICE, url, timeout)?;
        Ok(Self::from_channel(channel))
    }

    pub fn from_channel(channel: Channel) -> Self {
        Self {
            inner: CatalogServiceClient::new(channel),
        }
    }
}

#[async_trait]
impl ProductCatalog for GrpcCatalogClient {
    async fn get_products(&self, ids: &[String]) -> Result<Vec<Product>, ClientError> {
        // The catalog lists everything when given no ids and no query.
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut client = self.inner.clone();

        let request = GetProductsRequest {
            offset: 0,
            limit: 0,
            ids: ids.to_vec(),
            query: String::new(),
        };

        let response = client.get_products(request).await.map_err(|status| {
            tracing::error!(id_count = ids.len(), error = %status, "GetProducts failed");
            ClientError::Unavailable { service: SERVICE, status }
        })?;

        Ok(response
            .into_inner()
            .products
            .into_iter()
            .map(Product::from)
            .collect())
    }
}

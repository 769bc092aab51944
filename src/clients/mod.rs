// ============================================================================
// Collaborator Clients
// ============================================================================
//
// The order core talks to two services it does not own:
// - the account directory, to check an account exists
// - the product catalog, to resolve product ids in one batched call
//
// Each is a narrow trait so the orchestrator can be driven by in-process fakes;
// the gRPC implementations live next to it.
//
// ============================================================================

mod account;
mod catalog;

pub use account::GrpcAccountClient;
pub use catalog::GrpcCatalogClient;

use std::time::Duration;

use async_trait::async_trait;
use tonic::transport::{Channel, Endpoint};

use crate::models::{Account, Product};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{service} service call failed: {status}")]
    Unavailable {
        service: &'static str,
        status: tonic::Status,
    },

    #[error("invalid {service} service endpoint '{url}': {source}")]
    Endpoint {
        service: &'static str,
        url: String,
        #[source]
        source: tonic::transport::Error,
    },
}

#[async_trait]
pub trait AccountDirectory: Send + Sync {
    /// `ClientError::NotFound` when no such account exists.
    async fn get_account(&self, id: i32) -> Result<Account, ClientError>;
}

#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Products for `ids`, in no particular order. Ids unknown to the catalog
    /// are simply absent from the result.
    async fn get_products(&self, ids: &[String]) -> Result<Vec<Product>, ClientError>;
}

/// A lazily connected channel with connect and per-request deadlines.
pub(crate) fn lazy_channel(service: &'static str, url: &str, timeout: Duration) -> Result<Channel, ClientError> {
    let endpoint = Endpoint::from_shared(url.to_string()).map_err(|source| ClientError::Endpoint {
        service,
        url: url.to_string(),
        source,
    })?;

    tracing::info!(service, url, timeout_ms = timeout.as_millis() as u64, "Configured upstream channel");

    Ok(endpoint
        .connect_timeout(timeout)
        .timeout(timeout)
        .connect_lazy())
}

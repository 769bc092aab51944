use tonic::{Code, Status};

use crate::clients::ClientError;
use crate::pb::TimestampError;
use crate::repository::RepositoryError;

// ============================================================================
// Order Errors
// ============================================================================
//
// Every failure of a PostOrder / GetOrdersByAccountID call ends up here and is
// turned into exactly one tonic::Status at the RPC boundary. Status messages
// are fixed strings; causes are logged, never sent to the caller.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("account {0} not found")]
    AccountNotFound(i32),

    #[error("one or more products not found: {missing:?}")]
    ProductsNotFound { missing: Vec<String> },

    #[error("order {order_id} references product {product_id} which is no longer in the catalog")]
    UnresolvableLineItem { order_id: i32, product_id: String },

    #[error("order must contain at least one product")]
    EmptyOrder,

    #[error("invalid quantity {quantity} for product {product_id}")]
    InvalidQuantity { product_id: String, quantity: i32 },

    #[error("order total overflows")]
    PriceOverflow,

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("collaborator call failed: {0}")]
    Collaborator(#[source] ClientError),

    #[error("invalid order timestamp: {0}")]
    Timestamp(#[from] TimestampError),
}

impl From<ClientError> for OrderError {
    fn from(e: ClientError) -> Self {
        Self::Collaborator(e)
    }
}

impl OrderError {
    /// The status code the caller sees.
    pub fn code(&self) -> Code {
        match self {
            OrderError::AccountNotFound(_)
            | OrderError::ProductsNotFound { .. }
            | OrderError::UnresolvableLineItem { .. } => Code::NotFound,
            OrderError::EmptyOrder
            | OrderError::InvalidQuantity { .. }
            | OrderError::PriceOverflow => Code::InvalidArgument,
            OrderError::Collaborator(ClientError::NotFound(_)) => Code::NotFound,
            OrderError::Collaborator(ClientError::Unavailable { status, .. }) => match status.code() {
                Code::DeadlineExceeded | Code::Cancelled => status.code(),
                _ => Code::Unavailable,
            },
            OrderError::Collaborator(ClientError::Endpoint { .. })
            | OrderError::Repository(_)
            | OrderError::Timestamp(_) => Code::Internal,
        }
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            OrderError::AccountNotFound(_) => "account_not_found",
            OrderError::ProductsNotFound { .. } => "products_not_found",
            OrderError::UnresolvableLineItem { .. } => "unresolvable_line_item",
            OrderError::EmptyOrder => "empty_order",
            OrderError::InvalidQuantity { .. } => "invalid_quantity",
            OrderError::PriceOverflow => "price_overflow",
            OrderError::Repository(_) => "repository",
            OrderError::Collaborator(_) => "collaborator",
            OrderError::Timestamp(_) => "timestamp",
        }
    }

    /// Opaque status for a PostOrder failure.
    pub fn into_post_status(self) -> Status {
        let message = match &self {
            OrderError::AccountNotFound(_) | OrderError::Collaborator(ClientError::NotFound(_)) => {
                "account not found"
            }
            OrderError::ProductsNotFound { .. } => "one or more products not found",
            OrderError::EmptyOrder => "order must contain at least one product",
            OrderError::InvalidQuantity { .. } => "product quantity must be positive",
            OrderError::PriceOverflow => "order total is too large",
            _ => "could not create order",
        };
        self.into_status(message)
    }

    /// Opaque status for a GetOrdersByAccountID failure.
    pub fn into_get_status(self) -> Status {
        let message = match &self {
            OrderError::AccountNotFound(_) | OrderError::Collaborator(ClientError::NotFound(_)) => {
                "account not found"
            }
            _ => "could not find account's orders",
        };
        self.into_status(message)
    }

    fn into_status(self, message: &str) -> Status {
        let code = self.code();
        match code {
            Code::Internal | Code::Unavailable => tracing::error!(error = %self, ?code, "Request failed"),
            _ => tracing::warn!(error = %self, ?code, "Request rejected"),
        }
        Status::new(code, message)
    }
}

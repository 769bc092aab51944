// ============================================================================
// Wire Types
// ============================================================================
//
// Protobuf messages for the order service and its two collaborators, plus the
// tonic glue generated by build.rs. Field tags follow the published .proto
// contracts of each service.
//
// ============================================================================

mod timestamp;

pub use timestamp::{decode_timestamp, encode_timestamp, TimestampError};

pub mod order {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct OrderedProduct {
        #[prost(string, tag = "1")]
        pub id: String,
        #[prost(string, tag = "2")]
        pub name: String,
        #[prost(string, tag = "3")]
        pub description: String,
        #[prost(int64, tag = "4")]
        pub price: i64,
        #[prost(int32, tag = "5")]
        pub quantity: i32,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Order {
        #[prost(int32, tag = "1")]
        pub id: i32,
        #[prost(int32, tag = "2")]
        pub account_id: i32,
        #[prost(message, repeated, tag = "3")]
        pub products: Vec<OrderedProduct>,
        #[prost(int64, tag = "4")]
        pub total_price: i64,
        /// Creation time in the binary form produced by `encode_timestamp`.
        #[prost(bytes = "vec", tag = "5")]
        pub created_at: Vec<u8>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct PostOrderRequest {
        #[prost(int32, tag = "1")]
        pub account_id: i32,
        /// Only `id` and `quantity` are read.
        #[prost(message, repeated, tag = "2")]
        pub products: Vec<OrderedProduct>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct PostOrderResponse {
        #[prost(message, optional, tag = "1")]
        pub order: Option<Order>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct GetOrdersByAccountIdRequest {
        #[prost(int32, tag = "1")]
        pub account_id: i32,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct GetOrdersByAccountIdResponse {
        #[prost(message, repeated, tag = "1")]
        pub orders: Vec<Order>,
    }

    include!(concat!(env!("OUT_DIR"), "/order.OrderService.rs"));
}

pub mod account {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Account {
        #[prost(int32, tag = "1")]
        pub id: i32,
        #[prost(string, tag = "2")]
        pub name: String,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct GetAccountRequest {
        #[prost(int32, tag = "1")]
        pub id: i32,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct GetAccountResponse {
        #[prost(message, optional, tag = "1")]
        pub account: Option<Account>,
    }

    include!(concat!(env!("OUT_DIR"), "/account.AccountService.rs"));
}

pub mod catalog {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Product {
        #[prost(string, tag = "1")]
        pub id: String,
        #[prost(string, tag = "2")]
        pub name: String,
        #[prost(string, tag = "3")]
        pub description: String,
        #[prost(int64, tag = "4")]
        pub price: i64,
    }

    /// The catalog picks its mode from the populated fields: a non-empty
    /// `query` searches, non-empty `ids` looks up by id, otherwise it pages
    /// through everything.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct GetProductsRequest {
        #[prost(int32, tag = "1")]
        pub offset: i32,
        #[prost(int32, tag = "2")]
        pub limit: i32,
        #[prost(string, repeated, tag = "3")]
        pub ids: Vec<String>,
        #[prost(string, tag = "4")]
        pub query: String,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct GetProductsResponse {
        #[prost(message, repeated, tag = "1")]
        pub products: Vec<Product>,
    }

    include!(concat!(env!("OUT_DIR"), "/catalog.CatalogService.rs"));
}

// ============================================================================
// Domain <-> Wire Conversions
// ============================================================================

use crate::models;

impl From<catalog::Product> for models::Product {
    fn from(p: catalog::Product) -> Self {
        Self {
            id: p.id,
            name: p.name,
            description: p.description,
            price: p.price,
        }
    }
}

impl From<account::Account> for models::Account {
    fn from(a: account::Account) -> Self {
        Self { id: a.id, name: a.name }
    }
}

impl From<&models::OrderedProduct> for order::OrderedProduct {
    fn from(p: &models::OrderedProduct) -> Self {
        Self {
            id: p.id.clone(),
            name: p.name.clone(),
            description: p.description.clone(),
            price: p.price,
            quantity: p.quantity,
        }
    }
}

impl From<order::OrderedProduct> for models::OrderedProduct {
    fn from(p: order::OrderedProduct) -> Self {
        Self {
            id: p.id,
            name: p.name,
            description: p.description,
            price: p.price,
            quantity: p.quantity,
        }
    }
}

impl From<order::OrderedProduct> for models::RequestedProduct {
    fn from(p: order::OrderedProduct) -> Self {
        Self { id: p.id, quantity: p.quantity }
    }
}

impl order::Order {
    /// Wire form of a persisted order with the given (resolved) line items.
    ///
    /// Fails if the order has no creation timestamp, i.e. was never stored.
    pub fn from_domain(
        o: &models::Order,
        products: Vec<order::OrderedProduct>,
    ) -> Result<Self, TimestampError> {
        let created_at = o.created_at.ok_or(TimestampError::Missing)?;

        Ok(Self {
            id: o.id,
            account_id: o.account_id,
            products,
            total_price: o.total_price,
            created_at: encode_timestamp(created_at),
        })
    }

    pub fn into_domain(self) -> Result<models::Order, TimestampError> {
        let created_at = decode_timestamp(&self.created_at)?;

        Ok(models::Order {
            id: self.id,
            account_id: self.account_id,
            products: self.products.into_iter().map(Into::into).collect(),
            total_price: self.total_price,
            created_at: Some(created_at),
        })
    }
}

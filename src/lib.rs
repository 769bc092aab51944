//! Order service: places orders against an account directory and a product
//! catalog, stores them in Postgres and serves them back over gRPC with live
//! catalog detail.

pub mod client;
pub mod clients;
pub mod config;
pub mod errors;
pub mod metrics;
pub mod models;
pub mod orchestrator;
pub mod pb;
pub mod repository;
pub mod service;

pub use client::{OrderClient, OrderClientError};
pub use config::{AppConfig, ConfigError};
pub use errors::OrderError;
pub use orchestrator::OrderOrchestrator;
pub use service::OrderService;

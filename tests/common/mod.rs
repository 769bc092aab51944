#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use order_service::clients::{AccountDirectory, ClientError, ProductCatalog};
use order_service::metrics::Metrics;
use order_service::models::{Account, Product, RequestedProduct};
use order_service::repository::{InMemoryOrderRepository, OrderRepository};
use order_service::{OrderOrchestrator, OrderService};

// ============================================================================
// In-process collaborators
// ============================================================================

#[derive(Default)]
pub struct FakeAccounts {
    accounts: Mutex<HashMap<i32, Account>>,
    calls: AtomicUsize,
    unavailable: Mutex<bool>,
}

impl FakeAccounts {
    pub fn with(ids: &[i32]) -> Self {
        let fake = Self::default();
        {
            let mut accounts = fake.accounts.lock().unwrap();
            for id in ids {
                accounts.insert(
                    *id,
                    Account {
                        id: *id,
                        name: format!("account {}", id),
                    },
                );
            }
        }
        fake
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.lock().unwrap() = unavailable;
    }
}

#[async_trait]
impl AccountDirectory for FakeAccounts {
    async fn get_account(&self, id: i32) -> Result<Account, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if *self.unavailable.lock().unwrap() {
            return Err(ClientError::Unavailable {
                service: "account",
                status: tonic::Status::unavailable("connection refused"),
            });
        }

        self.accounts
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("account {}", id)))
    }
}

#[derive(Default)]
pub struct FakeCatalog {
    products: Mutex<HashMap<String, Product>>,
    calls: AtomicUsize,
    requested: Mutex<Vec<Vec<String>>>,
}

impl FakeCatalog {
    pub fn with(products: &[(&str, i64)]) -> Self {
        let fake = Self::default();
        for (id, price) in products {
            fake.insert(product(id, *price));
        }
        fake
    }

    pub fn insert(&self, product: Product) {
        self.products.lock().unwrap().insert(product.id.clone(), product);
    }

    pub fn remove(&self, id: &str) {
        self.products.lock().unwrap().remove(id);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Id lists of every call so far, in call order.
    pub fn requested(&self) -> Vec<Vec<String>> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProductCatalog for FakeCatalog {
    async fn get_products(&self, ids: &[String]) -> Result<Vec<Product>, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested.lock().unwrap().push(ids.to_vec());

        let products = self.products.lock().unwrap();
        Ok(ids.iter().filter_map(|id| products.get(id).cloned()).collect())
    }
}

pub fn product(id: &str, price: i64) -> Product {
    Product {
        id: id.to_string(),
        name: format!("{} name", id),
        description: format!("{} description", id),
        price,
    }
}

pub fn requested(id: &str, quantity: i32) -> RequestedProduct {
    RequestedProduct {
        id: id.to_string(),
        quantity,
    }
}

// ============================================================================
// Wiring
// ============================================================================

pub struct Harness {
    pub accounts: Arc<FakeAccounts>,
    pub catalog: Arc<FakeCatalog>,
    pub repository: Arc<InMemoryOrderRepository>,
    pub metrics: Arc<Metrics>,
}

impl Harness {
    pub fn new(accounts: FakeAccounts, catalog: FakeCatalog) -> Self {
        Self {
            accounts: Arc::new(accounts),
            catalog: Arc::new(catalog),
            repository: Arc::new(InMemoryOrderRepository::new()),
            metrics: Arc::new(Metrics::new().unwrap()),
        }
    }

    pub fn orchestrator(&self) -> OrderOrchestrator {
        let repository: Arc<dyn OrderRepository> = self.repository.clone();
        OrderOrchestrator::new(
            OrderService::new(repository),
            self.accounts.clone(),
            self.catalog.clone(),
            self.metrics.clone(),
        )
    }
}

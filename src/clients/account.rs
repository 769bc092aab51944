use std::time::Duration;

use async_trait::async_trait;
use tonic::transport::Channel;
use tonic::Code;

use super::{lazy_channel, AccountDirectory, ClientError};
use crate::models::Account;
use crate::pb::account::account_service_client::AccountServiceClient;
use crate::pb::account::GetAccountRequest;

const SERVICE: &str = "account";

#[derive(Clone)]
pub struct GrpcAccountClient {
    inner: AccountServiceClient<Channel>,
}

impl GrpcAccountClient {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let channel = lazy_channel(SERVICE, url, timeout)?;
        Ok(Self::from_channel(channel))
    }

    pub fn from_channel(channel: Channel) -> Self {
        Self {
            inner: AccountServiceClient::new(channel),
        }
    }
}

#[async_trait]
impl AccountDirectory for GrpcAccountClient {
    async fn get_account(&self, id: i32) -> Result<Account, ClientError> {
        let mut client = self.inner.clone();

        let response = client
            .get_account(GetAccountRequest { id })
            .await
            .map_err(|status| match status.code() {
                Code::NotFound => ClientError::NotFound(format!("account {}", id)),
                _ => {
                    tracing::error!(account_id = id, error = %status, "GetAccount failed");
                    ClientError::Unavailable { service: SERVICE, status }
                }
            })?;

        response
            .into_inner()
            .account
            .map(Account::from)
            .ok_or_else(|| ClientError::NotFound(format!("account {}", id)))
    }
}

//! Typed client for the money-movement endpoints.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::{DepositRequest, Transaction, TransferRequest, WithdrawRequest};
use crate::client::{decode, ClientError, CLIENT_NAME_HEADER};

const IDEMPOTENCY_KEY_HEADER: &str = "X-Idempotency-Key";

pub struct AccountOperatorClient {
    base_url: String,
    http: reqwest::Client,
    client_name: String,
}

impl AccountOperatorClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: reqwest::Client::new(),
            client_name: "AccountOperatorClient".to_string(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.client_name = name.into();
        self
    }

    /// POST /deposit. Returns the CREDIT half of the committed pair.
    pub async fn deposit(
        &self,
        request: &DepositRequest,
        idempotency_key: &str,
    ) -> Result<Transaction, ClientError> {
        self.post("deposit", request, idempotency_key).await
    }

    /// POST /withdraw. Returns the DEBIT half of the committed pair.
    pub async fn withdraw(
        &self,
        request: &WithdrawRequest,
        idempotency_key: &str,
    ) -> Result<Transaction, ClientError> {
        self.post("withdraw", request, idempotency_key).await
    }

    /// POST /transfer. Returns the full pair, DEBIT half first.
    pub async fn transfer(
        &self,
        request: &TransferRequest,
        idempotency_key: &str,
    ) -> Result<Vec<Transaction>, ClientError> {
        self.post("transfer", request, idempotency_key).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        payload: &B,
        idempotency_key: &str,
    ) -> Result<T, ClientError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let response = self
            .http
            .post(url)
            .header(IDEMPOTENCY_KEY_HEADER, idempotency_key)
            .header(CLIENT_NAME_HEADER, &self.client_name)
            .json(payload)
            .send()
            .await?;

        decode(response).await
    }
}

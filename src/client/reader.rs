//! Typed client for the read paths.

use crate::api::{Account, Transaction};
use crate::client::{decode, ClientError, CLIENT_NAME_HEADER};

pub struct AccountReaderClient {
    base_url: String,
    http: reqwest::Client,
    client_name: String,
}

impl AccountReaderClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: reqwest::Client::new(),
            client_name: "AccountReaderClient".to_string(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.client_name = name.into();
        self
    }

    /// GET /account/{account_id}/{currency}
    pub async fn get_account_balance(
        &self,
        currency: &str,
        account_id: &str,
    ) -> Result<Account, ClientError> {
        let url = format!("{}/account/{}/{}", self.base_url, account_id, currency);
        let response = self
            .http
            .get(url)
            .header(CLIENT_NAME_HEADER, &self.client_name)
            .send()
            .await?;

        decode(response).await
    }

    /// GET /transactions/{tx_id}
    pub async fn get_transaction(&self, tx_id: i64) -> Result<Transaction, ClientError> {
        let url = format!("{}/transactions/{}", self.base_url, tx_id);
        let response = self
            .http
            .get(url)
            .header(CLIENT_NAME_HEADER, &self.client_name)
            .send()
            .await?;

        decode(response).await
    }

    /// GET /transactions/{account_id}/{currency}
    pub async fn get_transactions(
        &self,
        currency: &str,
        account_id: &str,
    ) -> Result<Vec<Transaction>, ClientError> {
        let url = format!("{}/transactions/{}/{}", self.base_url, account_id, currency);
        let response = self
            .http
            .get(url)
            .header(CLIENT_NAME_HEADER, &self.client_name)
            .send()
            .await?;

        decode(response).await
    }
}

//! Thin typed clients for the wallet API.
//!
//! [`AccountReaderClient`] covers the read paths, [`AccountOperatorClient`]
//! the money movements. Both are plain `reqwest` wrappers; callers who want
//! retries wrap the operator calls with [`crate::retry`], reusing the same
//! idempotency key on every attempt.

pub mod operator;
pub mod reader;

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::api::ErrorResponse;

pub use operator::AccountOperatorClient;
pub use reader::AccountReaderClient;

const CLIENT_NAME_HEADER: &str = "Client-Name";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status. The message carries
    /// the server's `ErrorResponse` message when one was decodable.
    #[error("unexpected status {status}: {message}")]
    UnexpectedStatus { status: u16, message: String },
}

/// Decode a successful body, or surface the server's error message.
pub(crate) async fn decode<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ClientError> {
    let status = response.status();

    if !status.is_success() {
        let message = response
            .json::<ErrorResponse>()
            .await
            .map(|body| body.message)
            .unwrap_or_else(|_| {
                status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_string()
            });

        return Err(ClientError::UnexpectedStatus {
            status: status.as_u16(),
            message,
        });
    }

    Ok(response.json::<T>().await?)
}

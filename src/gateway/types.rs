//! HTTP error type and the domain-error to status mapping.

use axum::{http::StatusCode, response::IntoResponse, Json};

use crate::api::{ErrorResponse, WalletError};

/// Error half of every handler. Serializes as [`ErrorResponse`] with
/// `error_code` mirroring the HTTP status.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// 400 Bad Request
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    /// 404 Not Found
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }

    /// 500 Internal Server Error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    /// 503 Service Unavailable
    pub fn service_unavailable(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, msg)
    }
}

impl From<WalletError> for ApiError {
    fn from(err: WalletError) -> Self {
        use WalletError::*;

        let status = match &err {
            InvalidRequest | InvalidCurrency | InvalidAccountId | InvalidAmount
            | NegativeAmount | SameAccountIds | CompanyAccount | MissingIdempotencyKey => {
                StatusCode::BAD_REQUEST
            }
            AccountNotFound | TransactionNotFound => StatusCode::NOT_FOUND,
            InsufficientBalance | DuplicateTransaction | IncompleteTransaction => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            TransferFailed | Database(_) | Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Server-side detail stays in the logs; the wire message carries
        // only the classified kind.
        let message = match &err {
            Database(inner) => {
                tracing::error!(error = %inner, "unhandled database error");
                "unhandled database error".to_string()
            }
            Unexpected(detail) => {
                tracing::error!(%detail, "unexpected error");
                "transfer failed".to_string()
            }
            other => other.to_string(),
        };

        Self { status, message }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let body = Json(ErrorResponse {
            error_code: self.status.as_u16() as i32,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

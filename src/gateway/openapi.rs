//! OpenAPI document assembly for the wallet API.

use utoipa::OpenApi;

use crate::api::{
    Account, DepositRequest, EntryType, ErrorResponse, Transaction, TransferRequest,
    WithdrawRequest,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "walletd",
        description = "Double-entry wallet service with idempotent transfers"
    ),
    paths(
        crate::gateway::handlers::health::health_check,
        crate::gateway::handlers::account::get_account_balance,
        crate::gateway::handlers::transactions::get_transaction,
        crate::gateway::handlers::transactions::get_transactions,
        crate::gateway::handlers::movement::deposit,
        crate::gateway::handlers::movement::withdraw,
        crate::gateway::handlers::movement::transfer,
    ),
    components(schemas(
        Account,
        Transaction,
        TransferRequest,
        DepositRequest,
        WithdrawRequest,
        ErrorResponse,
        EntryType,
    ))
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_builds() {
        let doc = ApiDoc::openapi();
        let json = doc.to_json().unwrap();
        assert!(json.contains("/transfer"));
        assert!(json.contains("/account/{account_id}/{currency}"));
    }
}

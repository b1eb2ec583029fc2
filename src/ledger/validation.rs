//! Field validation shared by the transfer engine and the read paths.

use crate::api::WalletError;

pub const MAX_CURRENCY_LEN: usize = 10;
pub const MAX_ACCOUNT_ID_LEN: usize = 255;

/// Bound of the `group_id` column. Longer idempotency keys are rejected at
/// the HTTP boundary before they reach the engine.
pub const MAX_IDEMPOTENCY_KEY_LEN: usize = 50;

/// Currency codes are stored trimmed and uppercased.
pub fn normalize_currency(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Account ids are stored trimmed, case preserved.
pub fn normalize_account_id(raw: &str) -> String {
    raw.trim().to_string()
}

pub fn validate_currency(currency: &str) -> Result<(), WalletError> {
    if currency.is_empty() || currency.len() > MAX_CURRENCY_LEN {
        return Err(WalletError::InvalidCurrency);
    }

    Ok(())
}

pub fn validate_account_id(account_id: &str) -> Result<(), WalletError> {
    if account_id.is_empty() || account_id.len() > MAX_ACCOUNT_ID_LEN {
        return Err(WalletError::InvalidAccountId);
    }

    Ok(())
}

/// Currency is checked before the account id; the first failure wins.
pub fn validate_currency_and_account(
    currency: &str,
    account_id: &str,
) -> Result<(), WalletError> {
    validate_currency(currency)?;
    validate_account_id(account_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_currency_to_uppercase() {
        assert_eq!(normalize_currency("  usd "), "USD");
        assert_eq!(normalize_currency("EUR"), "EUR");
    }

    #[test]
    fn normalizes_account_id_preserving_case() {
        assert_eq!(normalize_account_id("  User1 "), "User1");
    }

    #[test]
    fn rejects_empty_and_overlong_currency() {
        assert!(matches!(
            validate_currency(""),
            Err(WalletError::InvalidCurrency)
        ));
        assert!(matches!(
            validate_currency(&"C".repeat(MAX_CURRENCY_LEN + 1)),
            Err(WalletError::InvalidCurrency)
        ));
        assert!(validate_currency(&"C".repeat(MAX_CURRENCY_LEN)).is_ok());
    }

    #[test]
    fn rejects_empty_and_overlong_account_id() {
        assert!(matches!(
            validate_account_id(""),
            Err(WalletError::InvalidAccountId)
        ));
        assert!(matches!(
            validate_account_id(&"a".repeat(MAX_ACCOUNT_ID_LEN + 1)),
            Err(WalletError::InvalidAccountId)
        ));
        assert!(validate_account_id(&"a".repeat(MAX_ACCOUNT_ID_LEN)).is_ok());
    }

    #[test]
    fn currency_failure_wins_over_account_failure() {
        let err = validate_currency_and_account("", "").unwrap_err();
        assert!(matches!(err, WalletError::InvalidCurrency));
    }
}

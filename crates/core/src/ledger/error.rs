//! Ledger error taxonomy.
//!
//! Two kinds of failure flow out of the engine. Business rejections
//! (`InsufficientFunds`, `AccountInactive`) are a normal terminal state of a
//! transaction: the entry is recorded as FAILED and returned to the caller as
//! data. Everything else is a structural or system error surfaced as an `Err`.

use rust_decimal::Decimal;
use solera_shared::types::AccountId;
use thiserror::Error;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Request Shape Errors ==========
    /// Malformed request (self-transfer, destination rules, bad amount).
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    // ========== Business Rejections ==========
    /// Account is inactive and cannot be used.
    #[error("Account {0} is inactive")]
    AccountInactive(AccountId),

    /// Debit would take the account below its balance floor.
    #[error(
        "Insufficient funds on account {account_id}: requested {requested}, available {available}"
    )]
    InsufficientFunds {
        /// The account being debited.
        account_id: AccountId,
        /// The debit amount requested.
        requested: Decimal,
        /// Amount available above the account's floor.
        available: Decimal,
    },

    // ========== Account Errors ==========
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    // ========== Concurrency Errors ==========
    /// Could not acquire the account guard within the bounded wait.
    #[error("Timed out waiting for exclusive access to account {0}")]
    LockTimeout(AccountId),

    // ========== Reference Errors ==========
    /// The externally supplied reference was already used.
    #[error("Duplicate transaction reference: {0}")]
    DuplicateReference(String),

    /// Reference generation kept colliding and gave up.
    #[error("Exhausted transaction reference generation attempts")]
    ReferenceExhausted,

    // ========== Storage Errors ==========
    /// Balance application failed after validation passed; any applied legs
    /// were rolled back and the transaction was marked FAILED.
    #[error("Operation failed: {0}")]
    OperationFailed(String),

    /// Underlying store error.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidOperation(_) => "INVALID_OPERATION",
            Self::AccountInactive(_) => "ACCOUNT_INACTIVE",
            Self::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::LockTimeout(_) => "LOCK_TIMEOUT",
            Self::DuplicateReference(_) => "DUPLICATE_REFERENCE",
            Self::ReferenceExhausted => "REFERENCE_EXHAUSTED",
            Self::OperationFailed(_) => "OPERATION_FAILED",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Returns the HTTP status code hint for the excluded HTTP layer.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidOperation(_) => 400,
            Self::AccountInactive(_) | Self::InsufficientFunds { .. } => 422,
            Self::AccountNotFound(_) => 404,
            Self::DuplicateReference(_) => 409,
            Self::LockTimeout(_) => 503,
            Self::ReferenceExhausted | Self::OperationFailed(_) | Self::Storage(_) => 500,
        }
    }

    /// Returns true if the same request may safely be retried as-is.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::LockTimeout(_))
    }

    /// Returns true if this is a business rejection rather than a system
    /// error. Business rejections are recorded as a FAILED transaction and
    /// returned to the caller as data.
    #[must_use]
    pub const fn is_business_rejection(&self) -> bool {
        matches!(self, Self::AccountInactive(_) | Self::InsufficientFunds { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            LedgerError::InvalidOperation(String::new()).error_code(),
            "INVALID_OPERATION"
        );
        assert_eq!(
            LedgerError::LockTimeout(AccountId::new()).error_code(),
            "LOCK_TIMEOUT"
        );
        assert_eq!(
            LedgerError::DuplicateReference("TXN1".to_string()).error_code(),
            "DUPLICATE_REFERENCE"
        );
        assert_eq!(LedgerError::ReferenceExhausted.error_code(), "REFERENCE_EXHAUSTED");
    }

    #[rstest]
    #[case(LedgerError::InvalidOperation(String::new()), 400)]
    #[case(LedgerError::AccountInactive(AccountId::new()), 422)]
    #[case(LedgerError::AccountNotFound(AccountId::new()), 404)]
    #[case(LedgerError::DuplicateReference(String::new()), 409)]
    #[case(LedgerError::LockTimeout(AccountId::new()), 503)]
    #[case(LedgerError::ReferenceExhausted, 500)]
    #[case(LedgerError::Storage(String::new()), 500)]
    fn test_http_status_codes(#[case] error: LedgerError, #[case] expected: u16) {
        assert_eq!(error.http_status_code(), expected);
    }

    #[test]
    fn test_only_lock_timeout_is_retryable() {
        assert!(LedgerError::LockTimeout(AccountId::new()).is_retryable());
        assert!(!LedgerError::OperationFailed(String::new()).is_retryable());
        assert!(!LedgerError::DuplicateReference(String::new()).is_retryable());
        assert!(!LedgerError::ReferenceExhausted.is_retryable());
    }

    #[test]
    fn test_business_rejections() {
        assert!(LedgerError::AccountInactive(AccountId::new()).is_business_rejection());
        assert!(LedgerError::InsufficientFunds {
            account_id: AccountId::new(),
            requested: dec!(100),
            available: dec!(50),
        }
        .is_business_rejection());
        assert!(!LedgerError::AccountNotFound(AccountId::new()).is_business_rejection());
        assert!(!LedgerError::Storage(String::new()).is_business_rejection());
    }

    #[test]
    fn test_insufficient_funds_display() {
        let id = AccountId::new();
        let err = LedgerError::InsufficientFunds {
            account_id: id,
            requested: dec!(600),
            available: dec!(500),
        };
        assert_eq!(
            err.to_string(),
            format!("Insufficient funds on account {id}: requested 600, available 500")
        );
    }
}

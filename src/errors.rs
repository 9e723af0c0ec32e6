use thiserror::Error;

use crate::decimal::Money;
use crate::types::StudentId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("student not found: {id}")]
    StudentNotFound {
        id: StudentId,
    },

    #[error("invalid payment amount: {amount}")]
    InvalidPaymentAmount {
        amount: Money,
    },

    #[error("payment amount is not numeric: {input:?}")]
    NonNumericAmount {
        input: String,
    },

    #[error("transaction has no authorized actor")]
    MissingActor,

    #[error("staff member not authorized: {staff_id}")]
    Unauthorized {
        staff_id: String,
    },

    #[error("unknown billing category {category:?} for class {class:?}")]
    UnknownCategory {
        category: String,
        class: String,
    },

    #[error("duplicate transaction code: {code}")]
    DuplicateTransactionCode {
        code: String,
    },

    #[error("ledger for student {id} changed during commit: expected {expected} records, found {found}")]
    ConcurrentModification {
        id: StudentId,
        expected: usize,
        found: usize,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("storage error: {message}")]
    Storage {
        message: String,
    },
}

impl LedgerError {
    /// errors raised before any state is touched because the input itself is bad
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            LedgerError::StudentNotFound { .. }
                | LedgerError::InvalidPaymentAmount { .. }
                | LedgerError::NonNumericAmount { .. }
                | LedgerError::MissingActor
                | LedgerError::Unauthorized { .. }
                | LedgerError::UnknownCategory { .. }
        )
    }

    /// errors the service resolves by re-reading and trying again
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LedgerError::DuplicateTransactionCode { .. } | LedgerError::ConcurrentModification { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_error_classification() {
        assert!(LedgerError::MissingActor.is_validation());
        assert!(LedgerError::InvalidPaymentAmount { amount: Money::from_major(-1) }.is_validation());
        assert!(!LedgerError::MissingActor.is_retryable());

        let conflict = LedgerError::ConcurrentModification {
            id: Uuid::new_v4(),
            expected: 1,
            found: 2,
        };
        assert!(conflict.is_retryable());
        assert!(!conflict.is_validation());
    }

    #[test]
    fn test_error_messages() {
        let err = LedgerError::InvalidPaymentAmount { amount: Money::from_major(-5) };
        assert_eq!(err.to_string(), "invalid payment amount: -5.00");

        let err = LedgerError::NonNumericAmount { input: "ten".to_string() };
        assert_eq!(err.to_string(), "payment amount is not numeric: \"ten\"");
    }
}

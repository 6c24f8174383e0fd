use crate::lifecycle::state::TransactionState;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Error)]
pub enum PaymentError {
    #[error("{field}: {message}")]
    Validation {
        field: &'static str,
        code: &'static str,
        message: String,
    },
    #[error("{message}")]
    Gateway {
        code: String,
        message: String,
        retryable: bool,
    },
    #[error("{message}")]
    Signature { message: String },
    #[error("gateway call exceeded {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
    #[error("{message}")]
    Refund {
        code: &'static str,
        message: String,
    },
    #[error("transition {from:?} -> {to:?} is not permitted")]
    InvalidTransition {
        from: TransactionState,
        to: TransactionState,
    },
    #[error("unknown transaction {0}")]
    UnknownTransaction(Uuid),
}

impl PaymentError {
    pub fn gateway(code: &str, message: impl Into<String>, retryable: bool) -> Self {
        PaymentError::Gateway {
            code: code.to_string(),
            message: message.into(),
            retryable,
        }
    }

    pub fn code(&self) -> &str {
        match self {
            PaymentError::Validation { code, .. } => code,
            PaymentError::Gateway { code, .. } => code,
            PaymentError::Signature { .. } => "SIGNATURE_MISMATCH",
            PaymentError::Timeout { .. } => "TIMEOUT",
            PaymentError::Refund { code, .. } => code,
            PaymentError::InvalidTransition { .. } => "INVALID_TRANSITION",
            PaymentError::UnknownTransaction(_) => "TRANSACTION_NOT_FOUND",
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, PaymentError::Gateway { retryable: true, .. })
    }
}

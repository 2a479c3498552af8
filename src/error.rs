use thiserror::Error;

pub type AppResult<T> = Result<T, PaymentError>;

/// Every way a payment operation can fail.
///
/// None of these escape a public operation as an `Err`; the client folds
/// them into a failed [`PaymentResponse`](crate::payments::types::PaymentResponse).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PaymentError {
    #[error("Validation failed: {}", violations.join("; "))]
    Validation { violations: Vec<String> },

    #[error("{message}")]
    Configuration { message: String },

    #[error("Payment failed: {message}")]
    ProviderRejection { provider: String, message: String },

    #[error("Unexpected transaction status: {status}")]
    UnexpectedStatus { status: String },

    #[error("Transaction error: {message}")]
    Transport { message: String },

    #[error("Payment verification timed out after {attempts} attempts")]
    VerificationTimeout { reference: String, attempts: u32 },
}

impl PaymentError {
    pub fn validation(violations: Vec<String>) -> Self {
        Self::Validation { violations }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn provider_rejection(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ProviderRejection {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn unexpected_status(status: impl Into<String>) -> Self {
        Self::UnexpectedStatus {
            status: status.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn verification_timeout(reference: impl Into<String>, attempts: u32) -> Self {
        Self::VerificationTimeout {
            reference: reference.into(),
            attempts,
        }
    }

    /// Short classification label, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::Configuration { .. } => "configuration",
            Self::ProviderRejection { .. } => "provider_rejection",
            Self::UnexpectedStatus { .. } => "unexpected_status",
            Self::Transport { .. } => "transport",
            Self::VerificationTimeout { .. } => "verification_timeout",
        }
    }

    /// True when the request never left the client.
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::Configuration { .. })
    }
}

impl From<reqwest::Error> for PaymentError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            PaymentError::transport(format!("request timed out: {}", err))
        } else {
            PaymentError::transport(format!("request error: {}", err))
        }
    }
}

impl From<serde_json::Error> for PaymentError {
    fn from(err: serde_json::Error) -> Self {
        PaymentError::transport(format!("Invalid response format: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_lists_every_violation() {
        let err = PaymentError::validation(vec![
            "amount must be at least 1".to_string(),
            "email is not a valid address".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "Validation failed: amount must be at least 1; email is not a valid address"
        );
        assert!(err.is_local());
    }

    #[test]
    fn test_transport_message_is_generic_transaction_error() {
        let err = PaymentError::transport("connection refused");
        assert_eq!(err.to_string(), "Transaction error: connection refused");
        assert_eq!(err.kind(), "transport");
        assert!(!err.is_local());
    }

    #[test]
    fn test_rejection_and_unexpected_status_are_distinct() {
        let rejected = PaymentError::provider_rejection("telebirr", "Insufficient balance");
        let unknown = PaymentError::unexpected_status("reversed");
        assert_eq!(rejected.to_string(), "Payment failed: Insufficient balance");
        assert_eq!(unknown.to_string(), "Unexpected transaction status: reversed");
        assert_ne!(rejected.kind(), unknown.kind());
    }

    #[test]
    fn test_timeout_message_names_attempts() {
        let err = PaymentError::verification_timeout("ref-1", 3);
        assert_eq!(
            err.to_string(),
            "Payment verification timed out after 3 attempts"
        );
    }
}

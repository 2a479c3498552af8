//! Result normalization
//!
//! Every public operation ends here exactly once. Settling builds the
//! uniform [`PaymentResponse`] and fires the matching hook.

use crate::error::AppResult;
use crate::payments::traits::PaymentHooks;
use crate::payments::types::{PaymentData, PaymentResponse};
use tracing::{error, info};

pub const VERIFIED_MESSAGE: &str = "Payment verified successfully";
pub const CHECKOUT_MESSAGE: &str = "Payment initialized, redirect the customer to the checkout URL";

/// Fold an operation's result into the response handed to the caller.
///
/// The success hook fires for verified transactions only; an initialized
/// checkout has not been paid yet. The failure hook fires for every error.
pub fn settle(result: AppResult<PaymentData>, hooks: &dyn PaymentHooks) -> PaymentResponse {
    match result {
        Ok(PaymentData::Transaction(transaction)) => {
            info!(
                "Payment verified: reference={}, amount={}",
                transaction.tx_ref, transaction.amount
            );
            hooks.on_success(&transaction);
            PaymentResponse::success(VERIFIED_MESSAGE, PaymentData::Transaction(transaction))
        }
        Ok(data @ PaymentData::Checkout { .. }) => PaymentResponse::success(CHECKOUT_MESSAGE, data),
        Err(e) => {
            error!("Payment operation failed ({}): {}", e.kind(), e);
            let response = PaymentResponse::failure(e);
            hooks.on_failure(&response.message);
            response
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PaymentError;
    use crate::payments::types::TransactionData;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        successes: Mutex<Vec<String>>,
        failures: Mutex<Vec<String>>,
    }

    impl PaymentHooks for Recorder {
        fn on_success(&self, transaction: &TransactionData) {
            self.successes.lock().unwrap().push(transaction.tx_ref.clone());
        }

        fn on_failure(&self, message: &str) {
            self.failures.lock().unwrap().push(message.to_string());
        }
    }

    #[test]
    fn test_verified_fires_success_hook_once() {
        let hooks = Recorder::default();
        let response = settle(
            Ok(PaymentData::Transaction(TransactionData {
                amount: "10".to_string(),
                tx_ref: "abc".to_string(),
                status: "success".to_string(),
                created_at: "now".to_string(),
            })),
            &hooks,
        );
        assert!(response.success);
        assert_eq!(response.message, VERIFIED_MESSAGE);
        assert_eq!(*hooks.successes.lock().unwrap(), vec!["abc"]);
        assert!(hooks.failures.lock().unwrap().is_empty());
    }

    #[test]
    fn test_checkout_fires_no_hook() {
        let hooks = Recorder::default();
        let response = settle(
            Ok(PaymentData::Checkout {
                checkout_url: "https://checkout.example/x".to_string(),
            }),
            &hooks,
        );
        assert!(response.success);
        assert!(hooks.successes.lock().unwrap().is_empty());
        assert!(hooks.failures.lock().unwrap().is_empty());
    }

    #[test]
    fn test_failure_fires_failure_hook_with_message() {
        let hooks = Recorder::default();
        let response = settle(Err(PaymentError::transport("connection reset")), &hooks);
        assert!(!response.success);
        assert!(response.data.is_none());
        assert_eq!(response.message, "Transaction error: connection reset");
        assert_eq!(
            *hooks.failures.lock().unwrap(),
            vec!["Transaction error: connection reset"]
        );
        assert_eq!(response.error, Some(PaymentError::transport("connection reset")));
    }
}

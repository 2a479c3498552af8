//! Payment verification
//!
//! Two adapters produce the same [`VerificationOutcome`]:
//!
//! * [`poll`] confirms an inline mobile-money charge by asking the shared
//!   verification endpoint until the payment leaves the `pending` state or
//!   the retry budget runs out.
//! * [`lookup`] confirms a hosted checkout with a single direct query.

use crate::config::RetryPolicy;
use crate::error::{AppResult, PaymentError};
use crate::payments::traits::{Endpoint, GatewayRequest, GatewayResponse, PaymentGateway};
use crate::payments::types::{PaymentMethod, TransactionData};
use tracing::{debug, info, warn};

/// Where a verification attempt ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
    Verified(TransactionData),
    /// Not terminal; only produced by a single poll classification
    Pending,
    Failed(PaymentError),
    TimedOut { reference: String, attempts: u32 },
}

impl VerificationOutcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, VerificationOutcome::Pending)
    }

    /// Collapse the outcome into the verified transaction or the error
    /// that describes why there is none.
    pub fn into_result(self) -> AppResult<TransactionData> {
        match self {
            VerificationOutcome::Verified(transaction) => Ok(transaction),
            VerificationOutcome::Pending => Err(PaymentError::unexpected_status("pending")),
            VerificationOutcome::Failed(error) => Err(error),
            VerificationOutcome::TimedOut {
                reference,
                attempts,
            } => Err(PaymentError::verification_timeout(reference, attempts)),
        }
    }
}

/// Classify one response from the inline verification endpoint.
///
/// `pending` is the only status that keeps the loop going; anything that is
/// neither success nor pending ends verification straight away.
pub fn classify_poll(
    response: &GatewayResponse,
    reference: &str,
    method: PaymentMethod,
) -> VerificationOutcome {
    if response.is_success() {
        return verified(response, reference);
    }

    let nested_status = response
        .data
        .as_ref()
        .and_then(|data| data.get("status"))
        .and_then(|status| status.as_str());

    if nested_status.is_some_and(|status| status.eq_ignore_ascii_case("pending")) {
        return VerificationOutcome::Pending;
    }

    VerificationOutcome::Failed(PaymentError::provider_rejection(
        method.as_str(),
        response.message_text(),
    ))
}

/// Classify the response of a direct transaction lookup.
pub fn classify_lookup(response: &GatewayResponse, reference: &str) -> VerificationOutcome {
    match response.status.to_ascii_lowercase().as_str() {
        "success" => verified(response, reference),
        "failed" => VerificationOutcome::Failed(PaymentError::provider_rejection(
            PaymentMethod::Chapa.as_str(),
            response.message_text(),
        )),
        _ => VerificationOutcome::Failed(PaymentError::unexpected_status(
            response.status.clone(),
        )),
    }
}

/// Poll the inline verification endpoint until a terminal outcome.
///
/// Requests are strictly sequential. The delay is only awaited between two
/// attempts, so a budget of `n` means at most `n` requests and `n - 1` waits.
pub async fn poll(
    gateway: &dyn PaymentGateway,
    public_key: &str,
    reference: &str,
    method: PaymentMethod,
    policy: RetryPolicy,
) -> VerificationOutcome {
    let request = GatewayRequest::new(Endpoint::InlineVerify, public_key)
        .field("reference", reference)
        .field("payment_method", method.as_str());

    let mut attempts = 0;
    loop {
        attempts += 1;
        debug!(
            "Verifying {} payment: reference={}, attempt={}/{}",
            method, reference, attempts, policy.max_attempts
        );

        let outcome = match gateway.send(request.clone()).await {
            Ok(response) => classify_poll(&response, reference, method),
            Err(e) => {
                warn!("Verification request failed: reference={}, {}", reference, e);
                VerificationOutcome::Failed(e)
            }
        };

        if outcome.is_terminal() {
            return outcome;
        }

        if attempts >= policy.max_attempts {
            warn!(
                "Payment still pending after {} attempts: reference={}",
                attempts, reference
            );
            return VerificationOutcome::TimedOut {
                reference: reference.to_string(),
                attempts,
            };
        }

        info!(
            "Payment pending, retrying in {:?}: reference={}",
            policy.delay, reference
        );
        tokio::time::sleep(policy.delay).await;
    }
}

/// Look a transaction up once by reference.
pub async fn lookup(
    gateway: &dyn PaymentGateway,
    secret_key: &str,
    reference: &str,
) -> VerificationOutcome {
    let request = GatewayRequest::new(
        Endpoint::TransactionVerify(reference.to_string()),
        secret_key,
    );

    match gateway.send(request).await {
        Ok(response) => classify_lookup(&response, reference),
        Err(e) => {
            warn!("Transaction lookup failed: reference={}, {}", reference, e);
            VerificationOutcome::Failed(e)
        }
    }
}

fn verified(response: &GatewayResponse, reference: &str) -> VerificationOutcome {
    match transaction_from(response, reference) {
        Ok(transaction) => VerificationOutcome::Verified(transaction),
        Err(e) => {
            warn!("Verified reply unusable: reference={}, {}", reference, e);
            VerificationOutcome::Failed(e)
        }
    }
}

/// A success reply must at least say how much was paid.
fn transaction_from(response: &GatewayResponse, reference: &str) -> AppResult<TransactionData> {
    let amount = response
        .data_field("amount")
        .ok_or_else(|| PaymentError::transport("Invalid response format: missing amount"))?;

    Ok(TransactionData {
        amount,
        tx_ref: response
            .data_field("tx_ref")
            .or_else(|| response.data_field("reference"))
            .unwrap_or_else(|| reference.to_string()),
        status: "success".to_string(),
        created_at: response
            .data_field("created_at")
            .or_else(|| response.data_field("updated_at"))
            .unwrap_or_else(|| chrono::Utc::now().to_rfc3339()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(body: serde_json::Value) -> GatewayResponse {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_poll_success_is_verified() {
        let outcome = classify_poll(
            &response(json!({
                "status": "success",
                "data": {"amount": "300.00", "created_at": "2024-05-01T10:00:00Z"}
            })),
            "ref123",
            PaymentMethod::Telebirr,
        );
        assert_eq!(
            outcome,
            VerificationOutcome::Verified(TransactionData {
                amount: "300.00".to_string(),
                tx_ref: "ref123".to_string(),
                status: "success".to_string(),
                created_at: "2024-05-01T10:00:00Z".to_string(),
            })
        );
    }

    #[test]
    fn test_poll_nested_pending_keeps_polling() {
        let outcome = classify_poll(
            &response(json!({"status": "failed", "data": {"status": "pending"}})),
            "ref123",
            PaymentMethod::Mpesa,
        );
        assert_eq!(outcome, VerificationOutcome::Pending);
        assert!(!outcome.is_terminal());
    }

    #[test]
    fn test_poll_unknown_status_fails_immediately() {
        let outcome = classify_poll(
            &response(json!({"status": "processing", "message": "hold on"})),
            "ref123",
            PaymentMethod::Ebirr,
        );
        assert_eq!(
            outcome,
            VerificationOutcome::Failed(PaymentError::provider_rejection("ebirr", "hold on"))
        );
    }

    #[test]
    fn test_lookup_distinguishes_failed_from_unknown() {
        let failed = classify_lookup(
            &response(json!({"status": "failed", "message": "Transaction not found"})),
            "ref123",
        );
        assert_eq!(
            failed,
            VerificationOutcome::Failed(PaymentError::provider_rejection(
                "chapa",
                "Transaction not found"
            ))
        );

        let unknown = classify_lookup(&response(json!({"status": "pending"})), "ref123");
        assert_eq!(
            unknown,
            VerificationOutcome::Failed(PaymentError::unexpected_status("pending"))
        );
    }

    #[test]
    fn test_lookup_prefers_provider_reference() {
        let outcome = classify_lookup(
            &response(json!({
                "status": "success",
                "data": {"amount": 500, "tx_ref": "provider-ref", "created_at": "t"}
            })),
            "ref123",
        );
        let transaction = outcome.into_result().unwrap();
        assert_eq!(transaction.tx_ref, "provider-ref");
        assert_eq!(transaction.amount, "500");
    }

    #[test]
    fn test_success_without_amount_is_invalid_response() {
        let expected = VerificationOutcome::Failed(PaymentError::transport(
            "Invalid response format: missing amount",
        ));

        let polled = classify_poll(
            &response(json!({"status": "success", "data": {"tx_ref": "ref123"}})),
            "ref123",
            PaymentMethod::Telebirr,
        );
        assert_eq!(polled, expected);

        let looked_up = classify_lookup(&response(json!({"status": "success"})), "ref123");
        assert_eq!(looked_up, expected);
    }

    #[test]
    fn test_timed_out_becomes_timeout_error() {
        let outcome = VerificationOutcome::TimedOut {
            reference: "ref123".to_string(),
            attempts: 3,
        };
        assert_eq!(
            outcome.into_result(),
            Err(PaymentError::verification_timeout("ref123", 3))
        );
    }
}

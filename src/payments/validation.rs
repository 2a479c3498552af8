//! Request normalization
//!
//! Turns a caller's [`PaymentRequest`] into a [`PaymentRecord`], reporting
//! every violated constraint at once.

use crate::config::ClientConfig;
use crate::error::{AppResult, PaymentError};
use crate::payments::types::{PaymentMethod, PaymentRecord, PaymentRequest, CURRENCY};
use regex::Regex;
use rust_decimal::Decimal;
use std::sync::LazyLock;
use tracing::debug;

/// Any number one of the supported networks could own.
static MOBILE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\+251|251|0)?[79][0-9]{8}$").expect("valid regex"));

/// Ethio Telecom numbers, local or international form.
static TELEBIRR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\+251|251|0)9[0-9]{8}$").expect("valid regex"));

/// Safaricom Ethiopia numbers; the 0700 block is not assigned to M-Pesa.
static MPESA_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\+251|251|0)7[1-9][0-9]{7}$").expect("valid regex"));

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));

const MIN_REFERENCE_LEN: usize = 3;

/// Validate `request` and build the record the router submits.
pub fn normalize(request: PaymentRequest, config: &ClientConfig) -> AppResult<PaymentRecord> {
    let method = request.payment_type.unwrap_or_default();
    let mobile = request.mobile.trim().to_string();
    let mut violations = Vec::new();

    if !MOBILE_PATTERN.is_match(&mobile) {
        violations.push(format!("mobile number '{}' is not valid", mobile));
    } else if let Some(violation) = check_method_mobile(method, &mobile) {
        violations.push(violation);
    }

    if request.amount < Decimal::ONE {
        violations.push(format!("amount must be at least 1, got {}", request.amount));
    }

    if let Some(tx_ref) = &request.tx_ref {
        if tx_ref.trim().chars().count() < MIN_REFERENCE_LEN {
            violations.push(format!(
                "transaction reference must be at least {} characters",
                MIN_REFERENCE_LEN
            ));
        }
    }

    if let Some(email) = &request.email {
        if !EMAIL_PATTERN.is_match(email.trim()) {
            violations.push(format!("email '{}' is not a valid address", email));
        }
    }

    if !config.allows(method) {
        violations.push(format!("payment method '{}' is not enabled", method));
    }

    if !violations.is_empty() {
        debug!("Payment request rejected with {} violation(s)", violations.len());
        return Err(PaymentError::validation(violations));
    }

    let tx_ref = match request.tx_ref {
        Some(tx_ref) => tx_ref.trim().to_string(),
        None => config.reference_generator.generate(),
    };

    Ok(PaymentRecord {
        mobile,
        amount: request.amount,
        currency: CURRENCY.to_string(),
        tx_ref,
        payment_method: method,
        email: request.email.map(|e| e.trim().to_string()),
        first_name: request.first_name,
        last_name: request.last_name,
        customization: request.customization,
        meta: request.meta,
    })
}

/// Provider-specific refinement of the generic mobile check.
fn check_method_mobile(method: PaymentMethod, mobile: &str) -> Option<String> {
    let pattern = match method {
        PaymentMethod::Telebirr => &TELEBIRR_PATTERN,
        PaymentMethod::Mpesa => &MPESA_PATTERN,
        _ => return None,
    };

    if pattern.is_match(mobile) {
        None
    } else {
        Some(format!(
            "mobile number '{}' is not a valid {} number",
            mobile, method
        ))
    }
}

/// Verification references follow the same length rule as request references.
pub fn check_reference(reference: &str) -> AppResult<()> {
    if reference.trim().chars().count() < MIN_REFERENCE_LEN {
        return Err(PaymentError::validation(vec![format!(
            "transaction reference must be at least {} characters",
            MIN_REFERENCE_LEN
        )]));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payments::reference::ReferenceGenerator;
    use rust_decimal_macros::dec;

    fn config() -> ClientConfig {
        ClientConfig::new("pk_test")
            .with_reference_generator(ReferenceGenerator::new(|| "generated01".to_string()))
    }

    fn violations(result: AppResult<PaymentRecord>) -> Vec<String> {
        match result {
            Err(PaymentError::Validation { violations }) => violations,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_defaults_method_and_reference() {
        let record = normalize(PaymentRequest::new("0912345678", dec!(100)), &config()).unwrap();
        assert_eq!(record.payment_method, PaymentMethod::Telebirr);
        assert_eq!(record.tx_ref, "generated01");
        assert_eq!(record.currency, "ETB");
    }

    #[test]
    fn test_keeps_caller_reference() {
        let request = PaymentRequest::new("+251912345678", dec!(1)).with_reference("order-42");
        let record = normalize(request, &config()).unwrap();
        assert_eq!(record.tx_ref, "order-42");
        assert_eq!(record.amount, dec!(1));
    }

    #[test]
    fn test_chapa_accepts_generic_number() {
        let request = PaymentRequest::new("0712345678", dec!(500)).with_method(PaymentMethod::Chapa);
        assert!(normalize(request, &config()).is_ok());
    }

    #[test]
    fn test_mpesa_rejects_unassigned_block() {
        let request = PaymentRequest::new("0700123456", dec!(300)).with_method(PaymentMethod::Mpesa);
        let violations = violations(normalize(request, &config()));
        assert_eq!(violations.len(), 1);
        assert!(violations[0].contains("mpesa"));
    }

    #[test]
    fn test_mpesa_accepts_safaricom_number() {
        let request = PaymentRequest::new("251712345678", dec!(300)).with_method(PaymentMethod::Mpesa);
        assert!(normalize(request, &config()).is_ok());
    }

    #[test]
    fn test_telebirr_rejects_safaricom_number() {
        let request =
            PaymentRequest::new("0712345678", dec!(300)).with_method(PaymentMethod::Telebirr);
        let violations = violations(normalize(request, &config()));
        assert!(violations[0].contains("telebirr"));
    }

    #[test]
    fn test_rejects_non_ascii_digits() {
        let arabic_indic = "09\u{661}\u{662}\u{663}\u{664}\u{665}\u{666}\u{667}\u{668}";
        let request = PaymentRequest::new(arabic_indic, dec!(100));
        let violations = violations(normalize(request, &config()));
        assert_eq!(violations.len(), 1, "{:?}", violations);
        assert!(violations[0].contains("is not valid"));

        let request = PaymentRequest::new("25171234567\u{0668}", dec!(100))
            .with_method(PaymentMethod::Mpesa);
        assert!(normalize(request, &config()).is_err());
    }

    #[test]
    fn test_reports_every_violation() {
        let request = PaymentRequest::new("12345", dec!(0.5))
            .with_reference("ab")
            .with_email("not-an-email");
        let violations = violations(normalize(request, &config()));
        assert_eq!(violations.len(), 4, "{:?}", violations);
        assert!(violations.iter().any(|v| v.contains("mobile")));
        assert!(violations.iter().any(|v| v.contains("amount")));
        assert!(violations.iter().any(|v| v.contains("reference")));
        assert!(violations.iter().any(|v| v.contains("email")));
    }

    #[test]
    fn test_rejects_disabled_method() {
        let config = config().with_allowed_methods(vec![PaymentMethod::Chapa]);
        let request = PaymentRequest::new("0912345678", dec!(10));
        let violations = violations(normalize(request, &config));
        assert_eq!(violations, vec!["payment method 'telebirr' is not enabled"]);
    }

    #[test]
    fn test_check_reference() {
        assert!(check_reference("abc").is_ok());
        assert!(check_reference(" a ").is_err());
    }
}

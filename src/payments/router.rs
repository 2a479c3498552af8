//! Provider routing
//!
//! Each payment method maps to one [`SubmissionStrategy`]. Hosted checkouts
//! stop once the checkout URL is known; inline charges continue into
//! verification polling and only come back with a settled payment.

use crate::config::ClientConfig;
use crate::error::{AppResult, PaymentError};
use crate::payments::traits::{Endpoint, GatewayRequest, PaymentGateway};
use crate::payments::types::{PaymentData, PaymentRecord, SubmissionStrategy};
use crate::payments::verification;
use serde_json::Value;
use tracing::{error, info};

/// Submit `record` with the strategy its payment method calls for.
pub async fn route(
    gateway: &dyn PaymentGateway,
    config: &ClientConfig,
    record: &PaymentRecord,
) -> AppResult<PaymentData> {
    match record.payment_method.strategy() {
        SubmissionStrategy::HostedRedirect => submit_hosted(gateway, config, record).await,
        SubmissionStrategy::InlineMobileMoney => submit_inline(gateway, config, record).await,
    }
}

async fn submit_hosted(
    gateway: &dyn PaymentGateway,
    config: &ClientConfig,
    record: &PaymentRecord,
) -> AppResult<PaymentData> {
    let secret_key = config.secret_key().ok_or_else(|| {
        PaymentError::configuration(format!(
            "Secret key is missing. It is required for {} payments",
            record.payment_method
        ))
    })?;

    info!(
        "Initializing hosted checkout: {} {} {}",
        record.amount, record.currency, record.tx_ref
    );

    let request = hosted_request(config, secret_key, record)?;
    let response = gateway.send(request).await?;

    if !response.is_success() {
        error!(
            "Hosted checkout rejected: reference={}, {}",
            record.tx_ref,
            response.message_text()
        );
        return Err(PaymentError::provider_rejection(
            record.payment_method.as_str(),
            response.message_text(),
        ));
    }

    let checkout_url = response
        .data_field("checkout_url")
        .ok_or_else(|| PaymentError::transport("Invalid response format: missing checkout_url"))?;

    info!("Hosted checkout initialized: reference={}", record.tx_ref);
    Ok(PaymentData::Checkout { checkout_url })
}

async fn submit_inline(
    gateway: &dyn PaymentGateway,
    config: &ClientConfig,
    record: &PaymentRecord,
) -> AppResult<PaymentData> {
    let method = record.payment_method;
    info!(
        "Charging {} wallet: {} {} {}",
        method, record.amount, record.currency, record.tx_ref
    );

    let mut request = GatewayRequest::new(Endpoint::Charge(method), config.public_key.as_str());
    request.form = inline_form(record)?;

    let response = gateway.send(request).await?;
    if !response.is_success() {
        error!(
            "{} charge rejected: reference={}, {}",
            method,
            record.tx_ref,
            response.message_text()
        );
        return Err(PaymentError::provider_rejection(
            method.as_str(),
            response.message_text(),
        ));
    }

    let reference = response
        .data_field("reference")
        .or_else(|| response.data_field("tx_ref"))
        .unwrap_or_else(|| record.tx_ref.clone());

    info!("{} charge accepted, verifying: reference={}", method, reference);

    let transaction =
        verification::poll(gateway, &config.public_key, &reference, method, config.retry)
            .await
            .into_result()?;

    Ok(PaymentData::Transaction(transaction))
}

fn hosted_request(
    config: &ClientConfig,
    secret_key: &str,
    record: &PaymentRecord,
) -> AppResult<GatewayRequest> {
    let customization = record.customization.as_ref().map(to_json_text).transpose()?;
    let meta = record.meta.as_ref().map(to_json_text).transpose()?;

    Ok(GatewayRequest::new(Endpoint::HostedInitialize, secret_key)
        .field("public_key", config.public_key.as_str())
        .field("tx_ref", record.tx_ref.as_str())
        .field("amount", record.amount.to_string())
        .field("currency", record.currency.as_str())
        .field("phone_number", record.mobile.as_str())
        .optional_field("email", record.email.as_deref())
        .optional_field("first_name", record.first_name.as_deref())
        .optional_field("last_name", record.last_name.as_deref())
        .optional_field("callback_url", config.callback_url.as_deref())
        .optional_field("return_url", config.return_url.as_deref())
        .optional_field("customization", customization)
        .optional_field("meta", meta))
}

/// Flatten every non-null field of `record` into form pairs.
///
/// Scalars are sent as their text form; objects and arrays as JSON text.
pub fn inline_form(record: &PaymentRecord) -> AppResult<Vec<(String, String)>> {
    let value = serde_json::to_value(record).map_err(encode_error)?;
    let Value::Object(fields) = value else {
        return Err(PaymentError::transport(
            "could not encode payment request: not an object",
        ));
    };

    Ok(fields
        .into_iter()
        .filter_map(|(name, value)| match value {
            Value::Null => None,
            Value::String(text) => Some((name, text)),
            other => Some((name, other.to_string())),
        })
        .collect())
}

fn to_json_text<T: serde::Serialize>(value: &T) -> AppResult<String> {
    serde_json::to_string(value).map_err(encode_error)
}

fn encode_error(e: serde_json::Error) -> PaymentError {
    PaymentError::transport(format!("could not encode payment request: {}", e))
}

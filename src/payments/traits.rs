//! Transport and notification seams
//!
//! `PaymentGateway` is the only place the engine touches the network, and
//! `PaymentHooks` is the only place it calls back into the application.

use crate::error::AppResult;
use crate::payments::types::{PaymentMethod, TransactionData};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Provider endpoint addressed by a gateway request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// Inline mobile-money charge
    Charge(PaymentMethod),
    /// Hosted checkout initialization
    HostedInitialize,
    /// Shared verification endpoint for inline charges
    InlineVerify,
    /// Direct lookup of a transaction by reference
    TransactionVerify(String),
}

impl Endpoint {
    /// Provider label used in errors and logs.
    pub fn provider(&self) -> &str {
        match self {
            Endpoint::Charge(method) => method.as_str(),
            Endpoint::HostedInitialize | Endpoint::TransactionVerify(_) => {
                PaymentMethod::Chapa.as_str()
            }
            Endpoint::InlineVerify => "verification",
        }
    }
}

/// A single form-encoded request to a provider endpoint
#[derive(Clone, PartialEq, Eq)]
pub struct GatewayRequest {
    pub endpoint: Endpoint,
    /// Bearer credential; public or secret depending on the endpoint
    pub key: String,
    pub form: Vec<(String, String)>,
}

impl GatewayRequest {
    pub fn new(endpoint: Endpoint, key: impl Into<String>) -> Self {
        Self {
            endpoint,
            key: key.into(),
            form: Vec::new(),
        }
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.form.push((name.into(), value.into()));
        self
    }

    pub fn optional_field(self, name: &str, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.field(name, value),
            None => self,
        }
    }

    /// Value of the first form field called `name`.
    pub fn form_value(&self, name: &str) -> Option<&str> {
        self.form
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

impl fmt::Debug for GatewayRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayRequest")
            .field("endpoint", &self.endpoint)
            .field("key", &"<redacted>")
            .field("form", &self.form)
            .finish()
    }
}

/// Decoded provider response body
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct GatewayResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: Option<Value>,
    #[serde(default)]
    pub data: Option<Value>,
}

impl GatewayResponse {
    pub fn is_success(&self) -> bool {
        self.status.eq_ignore_ascii_case("success")
    }

    /// Provider message as text; some providers send an object here.
    pub fn message_text(&self) -> String {
        match &self.message {
            Some(Value::String(message)) => message.clone(),
            Some(Value::Null) | None => format!("provider returned status '{}'", self.status),
            Some(other) => other.to_string(),
        }
    }

    /// String form of `data.<field>`, accepting numbers as well as strings.
    pub fn data_field(&self, field: &str) -> Option<String> {
        match self.data.as_ref()?.get(field)? {
            Value::String(value) if !value.is_empty() => Some(value.clone()),
            Value::Number(value) => Some(value.to_string()),
            _ => None,
        }
    }
}

/// Transport used to reach the provider endpoints
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Send one request and decode the provider's reply.
    ///
    /// A decoded body is returned whatever its `status` says; only
    /// transport failures and undecodable bodies are errors.
    async fn send(&self, request: GatewayRequest) -> AppResult<GatewayResponse>;
}

/// Application callbacks fired when a payment settles
///
/// Both methods default to no-ops. They run synchronously on the task
/// driving the payment and cannot influence the returned response.
pub trait PaymentHooks: Send + Sync {
    fn on_success(&self, _transaction: &TransactionData) {}

    fn on_failure(&self, _message: &str) {}
}

impl<T: PaymentHooks + ?Sized> PaymentHooks for Arc<T> {
    fn on_success(&self, transaction: &TransactionData) {
        (**self).on_success(transaction);
    }

    fn on_failure(&self, message: &str) {
        (**self).on_failure(message);
    }
}

/// Hooks that do nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

impl PaymentHooks for NoopHooks {}

type SuccessFn = Arc<dyn Fn(&TransactionData) + Send + Sync>;
type FailureFn = Arc<dyn Fn(&str) + Send + Sync>;

/// Hooks assembled from closures
#[derive(Clone, Default)]
pub struct CallbackHooks {
    on_success: Option<SuccessFn>,
    on_failure: Option<FailureFn>,
}

impl CallbackHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_success(mut self, f: impl Fn(&TransactionData) + Send + Sync + 'static) -> Self {
        self.on_success = Some(Arc::new(f));
        self
    }

    pub fn with_failure(mut self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_failure = Some(Arc::new(f));
        self
    }
}

impl PaymentHooks for CallbackHooks {
    fn on_success(&self, transaction: &TransactionData) {
        if let Some(f) = &self.on_success {
            f(transaction);
        }
    }

    fn on_failure(&self, message: &str) {
        if let Some(f) = &self.on_failure {
            f(message);
        }
    }
}

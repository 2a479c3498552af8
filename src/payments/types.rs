//! Payment types and data structures
//!
//! Provider-agnostic request, record and response shapes shared by every
//! submission strategy.

use crate::error::PaymentError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The only currency the supported providers settle in.
pub const CURRENCY: &str = "ETB";

/// Supported payment methods
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Hosted checkout; the payer is redirected to the provider's page
    Chapa,
    #[default]
    Telebirr,
    Mpesa,
    #[serde(rename = "cbebirr")]
    CbeBirr,
    Ebirr,
}

/// How a payment method is submitted to the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStrategy {
    /// Initialize a hosted checkout and hand back its URL
    HostedRedirect,
    /// Charge the wallet directly and poll until the payment settles
    InlineMobileMoney,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 5] = [
        PaymentMethod::Chapa,
        PaymentMethod::Telebirr,
        PaymentMethod::Mpesa,
        PaymentMethod::CbeBirr,
        PaymentMethod::Ebirr,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Chapa => "chapa",
            PaymentMethod::Telebirr => "telebirr",
            PaymentMethod::Mpesa => "mpesa",
            PaymentMethod::CbeBirr => "cbebirr",
            PaymentMethod::Ebirr => "ebirr",
        }
    }

    pub fn strategy(&self) -> SubmissionStrategy {
        match self {
            PaymentMethod::Chapa => SubmissionStrategy::HostedRedirect,
            PaymentMethod::Telebirr
            | PaymentMethod::Mpesa
            | PaymentMethod::CbeBirr
            | PaymentMethod::Ebirr => SubmissionStrategy::InlineMobileMoney,
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        PaymentMethod::ALL
            .into_iter()
            .find(|method| method.as_str() == normalized)
            .ok_or_else(|| {
                PaymentError::validation(vec![format!("unsupported payment method '{}'", s)])
            })
    }
}

/// Optional branding for the hosted checkout page
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Customization {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

/// Payment request as supplied by the caller
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    /// Payer's mobile number
    pub mobile: String,
    /// Payment method; telebirr when absent
    #[serde(default)]
    pub payment_type: Option<PaymentMethod>,
    /// Amount in birr, at least 1
    pub amount: Decimal,
    /// Transaction reference; generated when absent
    #[serde(default)]
    pub tx_ref: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub customization: Option<Customization>,
    /// Free-form metadata forwarded to the provider
    #[serde(default)]
    pub meta: Option<serde_json::Map<String, serde_json::Value>>,
}

impl PaymentRequest {
    pub fn new(mobile: impl Into<String>, amount: Decimal) -> Self {
        Self {
            mobile: mobile.into(),
            amount,
            ..Default::default()
        }
    }

    pub fn with_method(mut self, method: PaymentMethod) -> Self {
        self.payment_type = Some(method);
        self
    }

    pub fn with_reference(mut self, tx_ref: impl Into<String>) -> Self {
        self.tx_ref = Some(tx_ref.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_name(mut self, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        self.first_name = Some(first_name.into());
        self.last_name = Some(last_name.into());
        self
    }

    pub fn with_customization(mut self, customization: Customization) -> Self {
        self.customization = Some(customization);
        self
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.meta
            .get_or_insert_with(serde_json::Map::new)
            .insert(key.into(), value);
        self
    }
}

/// Normalized payment, ready to hand to a submission strategy.
///
/// Field names are the wire names used by the inline charge endpoint.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PaymentRecord {
    pub mobile: String,
    pub amount: Decimal,
    pub currency: String,
    pub tx_ref: String,
    pub payment_method: PaymentMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customization: Option<Customization>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Confirmed transaction details
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionData {
    pub amount: String,
    pub tx_ref: String,
    pub status: String,
    pub created_at: String,
}

/// Payload of a successful response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum PaymentData {
    /// Hosted checkout was initialized
    #[serde(rename_all = "camelCase")]
    Checkout { checkout_url: String },
    /// Payment was verified
    Transaction(TransactionData),
}

/// Uniform result of every public operation
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PaymentResponse {
    pub success: bool,
    pub message: String,
    pub data: Option<PaymentData>,
    /// Classified failure, for callers that branch on the kind
    #[serde(skip)]
    pub error: Option<PaymentError>,
}

impl PaymentResponse {
    pub fn success(message: impl Into<String>, data: PaymentData) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: PaymentError) -> Self {
        Self {
            success: false,
            message: error.to_string(),
            data: None,
            error: Some(error),
        }
    }

    pub fn checkout_url(&self) -> Option<&str> {
        match &self.data {
            Some(PaymentData::Checkout { checkout_url }) => Some(checkout_url),
            _ => None,
        }
    }

    pub fn transaction(&self) -> Option<&TransactionData> {
        match &self.data {
            Some(PaymentData::Transaction(data)) => Some(data),
            _ => None,
        }
    }
}

//! Unified client for Ethiopian payment providers.
//!
//! One request shape and one response shape cover the hosted Chapa
//! checkout and the inline mobile-money channels. Inline charges are
//! confirmed by polling; hosted checkouts are confirmed later with
//! [`PaymentClient::verify_transaction`].

pub mod client;
pub mod config;
pub mod error;
pub mod payments;

pub use client::PaymentClient;
pub use config::{ClientConfig, RetryPolicy};
pub use error::{AppResult, PaymentError};
pub use payments::reference::ReferenceGenerator;
pub use payments::traits::{
    CallbackHooks, Endpoint, GatewayRequest, GatewayResponse, NoopHooks, PaymentGateway,
    PaymentHooks,
};
pub use payments::types::{
    Customization, PaymentData, PaymentMethod, PaymentRecord, PaymentRequest, PaymentResponse,
    SubmissionStrategy, TransactionData,
};
pub use payments::verification::VerificationOutcome;

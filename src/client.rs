//! Payment client
//!
//! Composes normalization, routing, verification and settlement into the
//! three public operations. The client holds no per-call state, so one
//! instance can serve independent calls concurrently.

use crate::config::ClientConfig;
use crate::error::{AppResult, PaymentError};
use crate::payments::providers::HttpGateway;
use crate::payments::router;
use crate::payments::settlement::settle;
use crate::payments::traits::PaymentGateway;
use crate::payments::types::{
    PaymentData, PaymentMethod, PaymentRequest, PaymentResponse, SubmissionStrategy,
};
use crate::payments::{validation, verification};
use std::sync::Arc;
use tracing::info;

pub struct PaymentClient {
    config: ClientConfig,
    gateway: Arc<dyn PaymentGateway>,
}

impl PaymentClient {
    /// Create a client that talks to the provider API over HTTP.
    pub fn new(config: ClientConfig) -> AppResult<Self> {
        config.validate()?;
        let gateway = HttpGateway::new(config.base_url.clone(), config.timeout)?;
        Ok(Self {
            config,
            gateway: Arc::new(gateway),
        })
    }

    /// Create a client on top of a caller-provided transport.
    pub fn with_gateway(config: ClientConfig, gateway: Arc<dyn PaymentGateway>) -> AppResult<Self> {
        config.validate()?;
        Ok(Self { config, gateway })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Validate and submit a payment.
    ///
    /// Hosted checkouts succeed with a checkout URL. Inline mobile-money
    /// payments only return once verification polling has settled.
    pub async fn create_payment(&self, request: PaymentRequest) -> PaymentResponse {
        let result = self.try_create_payment(request).await;
        settle(result, self.config.hooks.as_ref())
    }

    /// Poll the inline verification endpoint for `reference`.
    pub async fn verify_payment(&self, reference: &str, method: PaymentMethod) -> PaymentResponse {
        let result = self.try_verify_payment(reference, method).await;
        settle(result, self.config.hooks.as_ref())
    }

    /// Look up a hosted checkout transaction once.
    pub async fn verify_transaction(&self, reference: &str) -> PaymentResponse {
        let result = self.try_verify_transaction(reference).await;
        settle(result, self.config.hooks.as_ref())
    }

    async fn try_create_payment(&self, request: PaymentRequest) -> AppResult<PaymentData> {
        let record = validation::normalize(request, &self.config)?;
        info!(
            "Creating {} payment: reference={}",
            record.payment_method, record.tx_ref
        );
        router::route(self.gateway.as_ref(), &self.config, &record).await
    }

    async fn try_verify_payment(
        &self,
        reference: &str,
        method: PaymentMethod,
    ) -> AppResult<PaymentData> {
        let reference = reference.trim();
        validation::check_reference(reference)?;

        if method.strategy() == SubmissionStrategy::HostedRedirect {
            return Err(PaymentError::validation(vec![format!(
                "{} payments are confirmed with verify_transaction",
                method
            )]));
        }

        let transaction = verification::poll(
            self.gateway.as_ref(),
            &self.config.public_key,
            reference,
            method,
            self.config.retry,
        )
        .await
        .into_result()?;

        Ok(PaymentData::Transaction(transaction))
    }

    async fn try_verify_transaction(&self, reference: &str) -> AppResult<PaymentData> {
        let secret_key = self.config.secret_key().ok_or_else(|| {
            PaymentError::configuration(
                "Secret key is missing. It is required to verify transactions",
            )
        })?;

        let reference = reference.trim();
        validation::check_reference(reference)?;

        let transaction = verification::lookup(self.gateway.as_ref(), secret_key, reference)
            .await
            .into_result()?;

        Ok(PaymentData::Transaction(transaction))
    }
}

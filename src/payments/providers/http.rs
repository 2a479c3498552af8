//! HTTP gateway
//!
//! Sends form-encoded requests to the provider API with `reqwest` and
//! decodes the JSON envelope every endpoint answers with.

use crate::error::{AppResult, PaymentError};
use crate::payments::traits::{Endpoint, GatewayRequest, GatewayResponse, PaymentGateway};
use async_trait::async_trait;
use reqwest::{Client, Method, Url};
use std::time::Duration;
use tracing::{debug, error};

/// `PaymentGateway` backed by the provider's REST API
#[derive(Debug, Clone)]
pub struct HttpGateway {
    base_url: Url,
    client: Client,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("paybridge/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                PaymentError::configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        let base_url = base_url.into();
        let base_url = Url::parse(base_url.trim_end_matches('/')).map_err(|e| {
            PaymentError::configuration(format!("Invalid base URL '{}': {}", base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(PaymentError::configuration(format!(
                "Invalid base URL '{}'",
                base_url
            )));
        }

        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Method and URL for `endpoint`. Path segments are appended one by
    /// one, so a reference is always percent-encoded as a single segment.
    fn route(&self, endpoint: &Endpoint) -> (Method, Url) {
        let (method, segments): (Method, &[&str]) = match endpoint {
            Endpoint::Charge(_) => (Method::POST, &["charges"]),
            Endpoint::HostedInitialize => (Method::POST, &["transaction", "initialize"]),
            Endpoint::InlineVerify => (Method::POST, &["charges", "verify"]),
            Endpoint::TransactionVerify(_) => (Method::GET, &["transaction", "verify"]),
        };

        let mut url = self.base_url.clone();
        // `cannot_be_a_base` is rejected in `new`, so segments are always available
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
            if let Endpoint::TransactionVerify(reference) = endpoint {
                path.push(reference);
            }
        }

        if let Endpoint::Charge(payment_method) = endpoint {
            url.query_pairs_mut().append_pair("type", payment_method.as_str());
        }

        (method, url)
    }
}

#[async_trait]
impl PaymentGateway for HttpGateway {
    async fn send(&self, request: GatewayRequest) -> AppResult<GatewayResponse> {
        let (method, url) = self.route(&request.endpoint);
        debug!("{} {}", method, url);

        let mut builder = self
            .client
            .request(method.clone(), url)
            .bearer_auth(&request.key);

        if method == Method::POST {
            builder = builder.form(&request.form);
        }

        let response = builder.send().await.map_err(|e| {
            error!("{} request failed: {}", request.endpoint.provider(), e);
            PaymentError::from(e)
        })?;

        let status = response.status();
        let body = response.text().await?;

        match serde_json::from_str::<GatewayResponse>(&body) {
            Ok(decoded) => {
                debug!(
                    "{} responded: http={}, status={}",
                    request.endpoint.provider(),
                    status,
                    decoded.status
                );
                Ok(decoded)
            }
            Err(e) if status.is_success() => {
                error!("Failed to parse {} response: {}", request.endpoint.provider(), e);
                Err(PaymentError::from(e))
            }
            Err(_) => {
                error!("{} API error: HTTP {}", request.endpoint.provider(), status);
                Err(PaymentError::transport(format!("HTTP {}: {}", status, body)))
            }
        }
    }
}

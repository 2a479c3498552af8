use crate::error::PaymentError;
use crate::payments::reference::ReferenceGenerator;
use crate::payments::traits::{NoopHooks, PaymentHooks};
use crate::payments::types::PaymentMethod;
use anyhow::{anyhow, Context, Result};
use reqwest::Url;
use std::env;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.chapa.co/v1";

/// Verification polling budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Verification requests sent before giving up on a pending payment
    pub max_attempts: u32,
    /// Pause between two verification requests
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(3),
        }
    }
}

/// Per-client configuration
///
/// The secret key is optional here. It is only demanded when a hosted
/// checkout is initialized or a transaction is looked up directly.
#[derive(Clone)]
pub struct ClientConfig {
    pub public_key: String,
    pub secret_key: Option<String>,
    pub allowed_methods: Vec<PaymentMethod>,
    pub callback_url: Option<String>,
    pub return_url: Option<String>,
    pub retry: RetryPolicy,
    pub base_url: String,
    pub timeout: Duration,
    pub reference_generator: ReferenceGenerator,
    pub hooks: Arc<dyn PaymentHooks>,
}

impl ClientConfig {
    pub fn new(public_key: impl Into<String>) -> Self {
        Self {
            public_key: public_key.into(),
            secret_key: None,
            allowed_methods: PaymentMethod::ALL.to_vec(),
            callback_url: None,
            return_url: None,
            retry: RetryPolicy::default(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            reference_generator: ReferenceGenerator::default(),
            hooks: Arc::new(NoopHooks),
        }
    }

    pub fn with_secret_key(mut self, secret_key: impl Into<String>) -> Self {
        self.secret_key = Some(secret_key.into());
        self
    }

    pub fn with_allowed_methods(mut self, methods: Vec<PaymentMethod>) -> Self {
        self.allowed_methods = methods;
        self
    }

    pub fn with_callback_url(mut self, url: impl Into<String>) -> Self {
        self.callback_url = Some(url.into());
        self
    }

    pub fn with_return_url(mut self, url: impl Into<String>) -> Self {
        self.return_url = Some(url.into());
        self
    }

    pub fn with_retry(mut self, max_attempts: u32, delay: Duration) -> Self {
        self.retry = RetryPolicy {
            max_attempts,
            delay,
        };
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_reference_generator(mut self, generator: ReferenceGenerator) -> Self {
        self.reference_generator = generator;
        self
    }

    pub fn with_hooks(mut self, hooks: impl PaymentHooks + 'static) -> Self {
        self.hooks = Arc::new(hooks);
        self
    }

    /// Secret key, if one was configured and is not blank.
    pub fn secret_key(&self) -> Option<&str> {
        self.secret_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    pub fn allows(&self, method: PaymentMethod) -> bool {
        self.allowed_methods.contains(&method)
    }

    /// Load configuration from `PAYBRIDGE_*` environment variables.
    pub fn from_env() -> Result<Self> {
        let public_key =
            env::var("PAYBRIDGE_PUBLIC_KEY").context("PAYBRIDGE_PUBLIC_KEY not set")?;

        let mut config = ClientConfig::new(public_key);
        config.secret_key = env::var("PAYBRIDGE_SECRET_KEY").ok();
        config.callback_url = env::var("PAYBRIDGE_CALLBACK_URL").ok();
        config.return_url = env::var("PAYBRIDGE_RETURN_URL").ok();

        if let Ok(methods) = env::var("PAYBRIDGE_ALLOWED_METHODS") {
            config.allowed_methods = methods
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| s.parse::<PaymentMethod>().map_err(|e| anyhow!(e)))
                .collect::<Result<Vec<_>>>()
                .context("PAYBRIDGE_ALLOWED_METHODS must list supported payment methods")?;
        }

        if let Ok(max_retries) = env::var("PAYBRIDGE_MAX_RETRIES") {
            config.retry.max_attempts = max_retries
                .parse()
                .context("PAYBRIDGE_MAX_RETRIES must be a valid number")?;
        }

        if let Ok(delay) = env::var("PAYBRIDGE_RETRY_DELAY_SECS") {
            config.retry.delay = Duration::from_secs(
                delay
                    .parse()
                    .context("PAYBRIDGE_RETRY_DELAY_SECS must be a valid number")?,
            );
        }

        if let Ok(base_url) = env::var("PAYBRIDGE_BASE_URL") {
            config.base_url = base_url;
        }

        if let Ok(timeout) = env::var("PAYBRIDGE_TIMEOUT_SECS") {
            config.timeout = Duration::from_secs(
                timeout
                    .parse()
                    .context("PAYBRIDGE_TIMEOUT_SECS must be a valid number")?,
            );
        }

        config.validate()?;
        Ok(config)
    }

    /// Check every constraint and report all violations together.
    pub fn validate(&self) -> Result<(), PaymentError> {
        let mut violations = Vec::new();

        if self.public_key.trim().is_empty() {
            violations.push("public key is required".to_string());
        }

        if self.allowed_methods.is_empty() {
            violations.push("at least one payment method must be allowed".to_string());
        }

        if self.retry.max_attempts == 0 {
            violations.push("max retry attempts must be at least 1".to_string());
        }

        for (name, url) in [
            ("base URL", Some(&self.base_url)),
            ("callback URL", self.callback_url.as_ref()),
            ("return URL", self.return_url.as_ref()),
        ] {
            if let Some(url) = url {
                if Url::parse(url).is_err() {
                    violations.push(format!("{} '{}' is not a valid URL", name, url));
                }
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(PaymentError::validation(violations))
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("public_key", &self.public_key)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .field("allowed_methods", &self.allowed_methods)
            .field("callback_url", &self.callback_url)
            .field("return_url", &self.return_url)
            .field("retry", &self.retry)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

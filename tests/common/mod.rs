#![allow(dead_code)]

use async_trait::async_trait;
use paybridge::{
    AppResult, ClientConfig, GatewayRequest, GatewayResponse, PaymentClient, PaymentError,
    PaymentGateway, PaymentHooks, ReferenceGenerator, TransactionData,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Gateway that replays canned responses and records every request.
#[derive(Default)]
pub struct ScriptedGateway {
    replies: Mutex<VecDeque<AppResult<GatewayResponse>>>,
    requests: Mutex<Vec<GatewayRequest>>,
}

impl ScriptedGateway {
    pub fn new(replies: Vec<AppResult<GatewayResponse>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<GatewayRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl PaymentGateway for ScriptedGateway {
    async fn send(&self, request: GatewayRequest) -> AppResult<GatewayResponse> {
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(PaymentError::transport("no scripted reply left")))
    }
}

/// Hooks that remember what they were called with.
#[derive(Default)]
pub struct RecordingHooks {
    pub successes: Mutex<Vec<TransactionData>>,
    pub failures: Mutex<Vec<String>>,
}

impl RecordingHooks {
    pub fn success_count(&self) -> usize {
        self.successes.lock().unwrap().len()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.lock().unwrap().len()
    }
}

impl PaymentHooks for RecordingHooks {
    fn on_success(&self, transaction: &TransactionData) {
        self.successes.lock().unwrap().push(transaction.clone());
    }

    fn on_failure(&self, message: &str) {
        self.failures.lock().unwrap().push(message.to_string());
    }
}

pub fn reply(body: serde_json::Value) -> AppResult<GatewayResponse> {
    Ok(serde_json::from_value(body).expect("valid gateway response"))
}

pub fn charge_accepted(reference: &str) -> AppResult<GatewayResponse> {
    reply(serde_json::json!({
        "status": "success",
        "message": "Charge initiated",
        "data": {"reference": reference}
    }))
}

pub fn pending() -> AppResult<GatewayResponse> {
    reply(serde_json::json!({
        "status": "failed",
        "message": "Payment is pending",
        "data": {"status": "pending"}
    }))
}

pub fn verified(reference: &str, amount: &str) -> AppResult<GatewayResponse> {
    reply(serde_json::json!({
        "status": "success",
        "message": "Payment verified",
        "data": {
            "amount": amount,
            "tx_ref": reference,
            "status": "success",
            "created_at": "2024-05-01T10:00:00Z"
        }
    }))
}

pub fn test_config() -> ClientConfig {
    ClientConfig::new("pk_test_public")
        .with_retry(3, Duration::from_secs(3))
        .with_reference_generator(ReferenceGenerator::new(|| "generated01".to_string()))
}

pub fn client_with(
    config: ClientConfig,
    gateway: &Arc<ScriptedGateway>,
) -> (PaymentClient, Arc<RecordingHooks>) {
    let hooks = Arc::new(RecordingHooks::default());
    let config = config.with_hooks(hooks.clone());
    let gateway: Arc<dyn PaymentGateway> = gateway.clone();
    let client = PaymentClient::with_gateway(config, gateway).expect("valid config");
    (client, hooks)
}

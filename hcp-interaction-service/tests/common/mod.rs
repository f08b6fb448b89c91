#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use hcp_interaction_service::llm::ChatModel;
use serde_json::Value;
use tower::ServiceExt;

/// Model double: `None` replies make the corresponding call fail.
pub struct StubModel {
    pub chat_reply: Option<String>,
    pub json_reply: Option<String>,
}

impl StubModel {
    pub fn json(reply: &str) -> Self {
        Self {
            chat_reply: Some("stub reply".to_string()),
            json_reply: Some(reply.to_string()),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            chat_reply: None,
            json_reply: None,
        }
    }
}

#[async_trait]
impl ChatModel for StubModel {
    async fn complete(&self, message: &str) -> anyhow::Result<String> {
        self.chat_reply
            .as_ref()
            .map(|reply| format!("{reply}: {message}"))
            .ok_or_else(|| anyhow::anyhow!("provider unreachable"))
    }

    async fn complete_json(&self, _preamble: &str, _prompt: &str) -> anyhow::Result<String> {
        self.json_reply
            .clone()
            .ok_or_else(|| anyhow::anyhow!("provider unreachable"))
    }
}

/// Send a request and return the status plus the body parsed as JSON (`Null` if it isn't).
pub async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

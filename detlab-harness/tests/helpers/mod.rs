#![allow(dead_code)] // not every test binary uses every helper

use std::fs;
use std::path::Path;

use async_trait::async_trait;
use detlab_rules::{ConversionError, DetectionRule, LoadedDetection, RuleConverter};
use detlab_splunk::{HecClient, SplunkSession};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Converter returning a fixed query, standing in for the external capability.
pub struct StaticConverter(pub String);

#[async_trait]
impl RuleConverter for StaticConverter {
    async fn convert(&self, _rule: &DetectionRule) -> Result<String, ConversionError> {
        Ok(self.0.clone())
    }
}

/// Converter that always rejects the rule.
pub struct RejectingConverter;

#[async_trait]
impl RuleConverter for RejectingConverter {
    async fn convert(&self, _rule: &DetectionRule) -> Result<String, ConversionError> {
        Err(ConversionError::Backend {
            message: "unsupported operator".to_string(),
        })
    }
}

pub async fn mock_session(server: &MockServer) -> SplunkSession {
    Mock::given(method("POST"))
        .and(path("/services/auth/login"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "sessionKey": "mock-key" })),
        )
        .mount(server)
        .await;

    SplunkSession::connect(&server.uri(), "admin", "changeme", false)
        .await
        .expect("session should connect")
}

pub fn hec_client(session: SplunkSession, server: &MockServer) -> HecClient {
    HecClient::new(session, &server.uri(), "hec-token", "test")
        .expect("client builds")
        .with_ack_poll_interval(std::time::Duration::from_millis(1))
}

/// Mounts the standard happy-path ingestion mocks: input present, raw
/// send acknowledged on the first poll.
pub async fn mount_ingestion_ok(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/services/data/inputs/http/detlab"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "entry": [] })))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/services/collector/raw"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ackId": 0 })))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/services/collector/ack"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "acks": { "0": true } })))
        .mount(server)
        .await;
}

/// Writes a rule file (and optionally its sample data) into `dir`.
pub fn write_detection(dir: &Path, file_name: &str, yaml: &str, data: Option<(&str, &str)>) {
    fs::write(dir.join(file_name), yaml).expect("write rule");
    if let Some((data_name, contents)) = data {
        fs::write(dir.join(data_name), contents).expect("write data");
    }
}

pub fn load_detection(dir: &Path, file_name: &str) -> LoadedDetection {
    detlab_rules::load_detection(dir.join(file_name)).expect("rule loads")
}

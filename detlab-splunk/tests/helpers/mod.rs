#![allow(dead_code)]

use detlab_splunk::SplunkSession;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mounts the login endpoint and opens a session against the mock server.
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

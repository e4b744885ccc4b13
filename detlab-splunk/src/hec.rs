use std::path::Path;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::time::sleep;
use tracing::{debug, info};
use url::Url;
use uuid::Uuid;

use crate::error::SplunkError;
use crate::session::{join, parse_base_url, SplunkSession};

const DEFAULT_MAX_ACK_POLLS: u32 = 10;
const DEFAULT_ACK_POLL_INTERVAL: Duration = Duration::from_secs(2);
const HTTP_INPUT_NAME: &str = "detlab";

/// Client for the platform's HTTP Event Collector.
///
/// Pushes raw sample-event bytes and waits for the platform's
/// durability acknowledgment. The send itself happens exactly once;
/// only the acknowledgment poll retries, with a bounded attempt count.
#[derive(Clone)]
pub struct HecClient {
    session: SplunkSession,
    base_url: Url,
    token: String,
    index: String,
    max_ack_polls: u32,
    ack_poll_interval: Duration,
}

impl HecClient {
    pub fn new(
        session: SplunkSession,
        base_url: &str,
        token: impl Into<String>,
        index: impl Into<String>,
    ) -> Result<Self, SplunkError> {
        Ok(Self {
            session,
            base_url: parse_base_url(base_url)?,
            token: token.into(),
            index: index.into(),
            max_ack_polls: DEFAULT_MAX_ACK_POLLS,
            ack_poll_interval: DEFAULT_ACK_POLL_INTERVAL,
        })
    }

    /// Overrides the delay between acknowledgment polls (tests shrink it).
    pub fn with_ack_poll_interval(mut self, interval: Duration) -> Self {
        self.ack_poll_interval = interval;
        self
    }

    pub fn with_max_ack_polls(mut self, attempts: u32) -> Self {
        self.max_ack_polls = attempts;
        self
    }

    /// The index sample data lands in.
    pub fn index(&self) -> &str {
        &self.index
    }

    /// Sends a sample-event file and waits for the ingestion acknowledgment.
    pub async fn send(
        &self,
        path: &Path,
        source: &str,
        sourcetype: &str,
        host: &str,
    ) -> Result<(), SplunkError> {
        self.session
            .ensure_http_input(HTTP_INPUT_NAME, &self.index)
            .await?;

        let payload = tokio::fs::read(path)
            .await
            .map_err(|err| SplunkError::Ingestion(format!("reading {}: {}", path.display(), err)))?;

        // Fresh channel per send; acknowledgments are scoped to it.
        let channel = Uuid::new_v4().to_string();
        let ack_id = self
            .post_raw(payload, source, sourcetype, host, &channel)
            .await?;
        info!(file = %path.display(), ack_id, "sample data sent");

        self.await_acknowledgment(ack_id, &channel).await
    }

    async fn post_raw(
        &self,
        payload: Vec<u8>,
        source: &str,
        sourcetype: &str,
        host: &str,
        channel: &str,
    ) -> Result<u64, SplunkError> {
        let url = join(&self.base_url, "services/collector/raw")?;
        let response = self
            .session
            .http
            .post(url)
            .query(&[
                ("index", self.index.as_str()),
                ("source", source),
                ("sourcetype", sourcetype),
                ("host", host),
            ])
            .header("Authorization", format!("Splunk {}", self.token))
            .header("X-Splunk-Request-Channel", channel)
            .body(payload)
            .send()
            .await
            .map_err(|err| SplunkError::Ingestion(err.to_string()))?;

        if !response.status().is_success() {
            return Err(SplunkError::Ingestion(format!(
                "collector returned status {}",
                response.status()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|err| SplunkError::Ingestion(format!("collector response: {}", err)))?;

        body.get("ackId")
            .and_then(Value::as_u64)
            .ok_or_else(|| SplunkError::Ingestion("collector response missing ackId".to_string()))
    }

    /// Polls the acknowledgment endpoint until the ID reads `true`.
    ///
    /// A response without the expected acks map shape is a hard
    /// ingestion error, not a retry.
    async fn await_acknowledgment(&self, ack_id: u64, channel: &str) -> Result<(), SplunkError> {
        let url = join(&self.base_url, "services/collector/ack")?;

        for attempt in 1..=self.max_ack_polls {
            let response = self
                .session
                .http
                .post(url.clone())
                .header("Authorization", format!("Splunk {}", self.token))
                .header("X-Splunk-Request-Channel", channel)
                .json(&json!({ "acks": [ack_id] }))
                .send()
                .await
                .map_err(|err| SplunkError::Ingestion(err.to_string()))?;

            if !response.status().is_success() {
                return Err(SplunkError::Ingestion(format!(
                    "ack endpoint returned status {}",
                    response.status()
                )));
            }

            let body: Value = response
                .json()
                .await
                .map_err(|err| SplunkError::Ingestion(format!("ack response: {}", err)))?;

            let confirmed = body
                .get("acks")
                .and_then(|acks| acks.get(ack_id.to_string()))
                .and_then(Value::as_bool)
                .ok_or_else(|| {
                    SplunkError::Ingestion(format!("ack response missing entry for id {}", ack_id))
                })?;

            if confirmed {
                debug!(ack_id, attempt, "ingestion acknowledged");
                return Ok(());
            }

            if attempt < self.max_ack_polls {
                sleep(self.ack_poll_interval).await;
            }
        }

        Err(SplunkError::IngestionTimeout {
            attempts: self.max_ack_polls,
        })
    }
}

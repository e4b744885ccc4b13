use reqwest::StatusCode;
use serde_json::Value;
use tracing::info;

use crate::error::SplunkError;
use crate::session::{encode_path_segment, SplunkSession};

/// Scheduling metadata applied to deployed detections.
#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    pub cron_schedule: String,
    pub earliest_time: String,
    pub latest_time: String,
    /// Alert when the result count is greater than this.
    pub alert_threshold: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            cron_schedule: "*/5 * * * *".to_string(),
            earliest_time: "-5m".to_string(),
            latest_time: "now".to_string(),
            alert_threshold: 0,
        }
    }
}

impl SplunkSession {
    /// Whether a saved search with this name exists.
    pub async fn saved_search_exists(&self, name: &str) -> Result<bool, SplunkError> {
        let url = self.endpoint(&format!(
            "services/saved/searches/{}",
            encode_path_segment(name)
        ))?;
        let response = self
            .http
            .get(url)
            .query(&[("output_mode", "json")])
            .header("Authorization", &self.auth_header)
            .send()
            .await
            .map_err(|err| SplunkError::Transport(err.to_string()))?;

        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(SplunkError::UnexpectedStatus {
                context: "saved-search lookup",
                status,
            }),
        }
    }

    /// Deletes a saved search; deleting a missing one is not an error.
    pub async fn delete_saved_search(&self, name: &str) -> Result<(), SplunkError> {
        let url = self.endpoint(&format!(
            "services/saved/searches/{}",
            encode_path_segment(name)
        ))?;
        let response = self
            .http
            .delete(url)
            .query(&[("output_mode", "json")])
            .header("Authorization", &self.auth_header)
            .send()
            .await
            .map_err(|err| SplunkError::Transport(err.to_string()))?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Ok(()),
            status => Err(SplunkError::UnexpectedStatus {
                context: "saved-search deletion",
                status,
            }),
        }
    }

    /// Creates a scheduled, alert-tracked saved search.
    pub async fn create_saved_search(
        &self,
        name: &str,
        search: &str,
        schedule: &ScheduleConfig,
    ) -> Result<(), SplunkError> {
        let url = self.endpoint("services/saved/searches")?;
        let threshold = schedule.alert_threshold.to_string();
        let response = self
            .http
            .post(url)
            .form(&[
                ("name", name),
                ("search", search),
                ("is_scheduled", "1"),
                ("cron_schedule", schedule.cron_schedule.as_str()),
                ("dispatch.earliest_time", schedule.earliest_time.as_str()),
                ("dispatch.latest_time", schedule.latest_time.as_str()),
                ("request.ui_dispatch_app", "search"),
                ("request.ui_dispatch_view", "search"),
                ("alert_type", "number of events"),
                ("alert_comparator", "greater than"),
                ("alert_threshold", threshold.as_str()),
                ("alert.track", "1"),
                ("output_mode", "json"),
            ])
            .header("Authorization", &self.auth_header)
            .send()
            .await
            .map_err(|err| SplunkError::Transport(err.to_string()))?;

        if !response.status().is_success() {
            return Err(SplunkError::UnexpectedStatus {
                context: "saved-search creation",
                status: response.status(),
            });
        }

        info!(name, "saved search created");
        Ok(())
    }

    /// Names of every saved search visible to the session.
    pub async fn list_saved_searches(&self) -> Result<Vec<String>, SplunkError> {
        let url = self.endpoint("services/saved/searches")?;
        let response = self
            .http
            .get(url)
            .query(&[("output_mode", "json"), ("count", "0")])
            .header("Authorization", &self.auth_header)
            .send()
            .await
            .map_err(|err| SplunkError::Transport(err.to_string()))?;

        if !response.status().is_success() {
            return Err(SplunkError::UnexpectedStatus {
                context: "saved-search listing",
                status: response.status(),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|err| SplunkError::Decode(err.to_string()))?;

        let names = body["entry"]
            .as_array()
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| entry["name"].as_str())
                    .map(|name| name.to_string())
                    .collect()
            })
            .unwrap_or_default();

        Ok(names)
    }
}

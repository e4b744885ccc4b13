use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::SplunkError;
use crate::session::SplunkSession;

/// Makes a query unambiguously a search or a pipe-generator before
/// submission: anything starting with neither `|` nor the `search `
/// directive gets the directive prepended.
pub fn normalize_search(query: &str) -> String {
    let trimmed = query.trim();
    if trimmed.starts_with('|') || trimmed.starts_with("search ") {
        trimmed.to_string()
    } else {
        format!("search {}", trimmed)
    }
}

#[derive(Debug, Deserialize)]
struct JobCreated {
    sid: String,
}

impl SplunkSession {
    /// Runs a query in blocking mode; true iff it matched at least one event.
    pub async fn run_search(&self, query: &str) -> Result<bool, SplunkError> {
        let count = self.blocking_search_count(query).await?;
        debug!(results = count, "search completed");
        Ok(count > 0)
    }

    /// Deletes every event in `index` via a blocking delete-search.
    pub async fn delete_index_data(&self, index: &str) -> Result<(), SplunkError> {
        let query = format!("search index={} | delete", index);
        self.blocking_search_count(&query).await?;
        info!(index, "ingested data deleted");
        Ok(())
    }

    async fn blocking_search_count(&self, query: &str) -> Result<u64, SplunkError> {
        let query = normalize_search(query);

        let jobs_url = self.endpoint("services/search/jobs")?;
        let response = self
            .http
            .post(jobs_url)
            .form(&[
                ("search", query.as_str()),
                ("exec_mode", "blocking"),
                ("output_mode", "json"),
            ])
            .header("Authorization", &self.auth_header)
            .send()
            .await
            .map_err(|err| SplunkError::Query(err.to_string()))?;

        if !response.status().is_success() {
            return Err(SplunkError::Query(format!(
                "job submission returned status {}",
                response.status()
            )));
        }

        let job: JobCreated = response
            .json()
            .await
            .map_err(|err| SplunkError::Query(format!("job submission response: {}", err)))?;

        let job_url = self.endpoint(&format!("services/search/jobs/{}", job.sid))?;
        let response = self
            .http
            .get(job_url)
            .query(&[("output_mode", "json")])
            .header("Authorization", &self.auth_header)
            .send()
            .await
            .map_err(|err| SplunkError::Query(err.to_string()))?;

        if !response.status().is_success() {
            return Err(SplunkError::Query(format!(
                "job readback returned status {}",
                response.status()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|err| SplunkError::Query(format!("job readback response: {}", err)))?;

        Ok(result_count(&body))
    }
}

// Splunk reports job content values as strings; a missing count is zero.
fn result_count(body: &Value) -> u64 {
    match &body["entry"][0]["content"]["resultCount"] {
        Value::Number(n) => n.as_u64().unwrap_or(0),
        Value::String(s) => s.parse().unwrap_or(0),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_queries_gain_the_search_directive() {
        assert_eq!(normalize_search("EventID=4688"), "search EventID=4688");
    }

    #[test]
    fn pipe_generators_pass_through() {
        assert_eq!(normalize_search("| tstats count"), "| tstats count");
    }

    #[test]
    fn explicit_searches_pass_through() {
        assert_eq!(normalize_search("search index=x"), "search index=x");
    }

    #[test]
    fn result_count_tolerates_string_and_missing_values() {
        let as_string = json!({"entry": [{"content": {"resultCount": "3"}}]});
        assert_eq!(result_count(&as_string), 3);

        let as_number = json!({"entry": [{"content": {"resultCount": 7}}]});
        assert_eq!(result_count(&as_number), 7);

        let missing = json!({"entry": [{"content": {}}]});
        assert_eq!(result_count(&missing), 0);
    }
}

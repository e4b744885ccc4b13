use std::sync::Arc;

use detlab_rules::{inject_index_filter, LoadedDetection, RuleConverter};
use detlab_splunk::{ScheduleConfig, SplunkSession};
use tracing::{info, warn};

use crate::error::HarnessError;
use crate::runner::{BatchSummary, RuleReport};

/// Deploys detection rules as scheduled saved searches.
///
/// Deploys are create-or-replace: an existing saved search with the
/// rule's name is deleted first, so at most one instance per name
/// exists and the latest deploy's configuration wins.
pub struct Deployer {
    session: SplunkSession,
    converter: Arc<dyn RuleConverter>,
    index_filter: String,
    schedule: ScheduleConfig,
}

impl Deployer {
    pub fn new(session: SplunkSession, converter: Arc<dyn RuleConverter>, lab_host: &str) -> Self {
        Self {
            session,
            converter,
            index_filter: format!("index=win host={}", lab_host),
            schedule: ScheduleConfig::default(),
        }
    }

    /// Replaces the default `index=win host=<lab>` scoping filter.
    pub fn with_index_filter(mut self, filter: impl Into<String>) -> Self {
        self.index_filter = filter.into();
        self
    }

    pub fn with_schedule(mut self, schedule: ScheduleConfig) -> Self {
        self.schedule = schedule;
        self
    }

    /// Converts and deploys one rule under its file-stem name.
    pub async fn deploy(&self, detection: &LoadedDetection) -> Result<(), HarnessError> {
        let query = self.converter.convert(&detection.rule).await?;
        let search = inject_index_filter(&query, &self.index_filter);

        if self.session.saved_search_exists(&detection.name).await? {
            self.session.delete_saved_search(&detection.name).await?;
        }
        self.session
            .create_saved_search(&detection.name, &search, &self.schedule)
            .await?;

        info!(rule = %detection.name, "detection deployed");
        Ok(())
    }

    /// Deploys every rule; one rule's failure never stops the rest.
    pub async fn deploy_batch(&self, detections: &[LoadedDetection]) -> BatchSummary {
        let mut summary = BatchSummary::default();
        for detection in detections {
            let report = match self.deploy(detection).await {
                Ok(()) => RuleReport {
                    name: detection.name.clone(),
                    passed: true,
                    error: None,
                },
                Err(err) => {
                    warn!(rule = %detection.name, error = %err, "deploy failed");
                    RuleReport {
                        name: detection.name.clone(),
                        passed: false,
                        error: Some(err),
                    }
                }
            };
            summary.push(report);
        }
        summary
    }

    /// Removes a deployed detection by name.
    pub async fn remove(&self, name: &str) -> Result<(), HarnessError> {
        self.session.delete_saved_search(name).await?;
        Ok(())
    }

    /// Lists deployed saved-search names.
    pub async fn list(&self) -> Result<Vec<String>, HarnessError> {
        Ok(self.session.list_saved_searches().await?)
    }
}

use std::sync::Arc;
use std::time::Duration;

use detlab_rules::{LoadedDetection, RuleConverter};
use detlab_splunk::{HecClient, SplunkSession};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::error::HarnessError;

/// Event host tag applied to every ingested sample.
const EVENT_HOST: &str = "test";
/// Settle time between a confirmed send and the query, covering
/// indexing lag (the ingestion ack only confirms durability).
const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(3);

/// Polarity of a detection test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestKind {
    /// The rule is expected to fire on the replayed data.
    TruePositive,
    /// The rule is expected to stay silent.
    FalsePositive,
}

/// Outcome of one rule's test run.
#[derive(Debug)]
pub struct RuleReport {
    pub name: String,
    pub passed: bool,
    /// The error that failed the rule, when failure came from an error
    /// rather than a wrong verdict.
    pub error: Option<HarnessError>,
}

/// Aggregate outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub reports: Vec<RuleReport>,
}

impl BatchSummary {
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    pub(crate) fn push(&mut self, report: RuleReport) {
        self.total += 1;
        if report.passed {
            self.passed += 1;
        } else {
            self.failed += 1;
        }
        self.reports.push(report);
    }
}

/// Runs detection rules against a live platform.
///
/// Per rule: `LOADED → (DATA_SENT)? → QUERY_EXECUTED → {PASSED, FAILED}
/// → (CLEANED_UP)?`. Cleanup deletes the whole ingestion index, runs on
/// the error path too, and its own failures never flip a verdict.
pub struct TestRunner {
    session: SplunkSession,
    hec: HecClient,
    converter: Arc<dyn RuleConverter>,
    settle_delay: Duration,
    cleanup: bool,
}

impl TestRunner {
    pub fn new(session: SplunkSession, hec: HecClient, converter: Arc<dyn RuleConverter>) -> Self {
        Self {
            session,
            hec,
            converter,
            settle_delay: DEFAULT_SETTLE_DELAY,
            cleanup: true,
        }
    }

    /// Overrides the indexing-lag settle delay (tests shrink it to zero).
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Suppresses post-test cleanup, preserving ingested data for analysis.
    pub fn with_cleanup(mut self, cleanup: bool) -> Self {
        self.cleanup = cleanup;
        self
    }

    /// Tests a single rule; never returns an error, the report carries it.
    pub async fn run_test(&self, detection: &LoadedDetection, kind: TestKind) -> RuleReport {
        info!(rule = %detection.name, "testing detection");

        let mut data_sent = false;
        let report = match self.execute(detection, kind, &mut data_sent).await {
            Ok(passed) => RuleReport {
                name: detection.name.clone(),
                passed,
                error: None,
            },
            Err(err) => {
                warn!(rule = %detection.name, error = %err, "detection test errored");
                RuleReport {
                    name: detection.name.clone(),
                    passed: false,
                    error: Some(err),
                }
            }
        };

        if data_sent && self.cleanup {
            // Best effort on both the success and the error path; a
            // failed cleanup never changes the verdict.
            if let Err(err) = self.session.delete_index_data(self.hec.index()).await {
                warn!(rule = %detection.name, error = %err, "cleanup failed");
            }
        }

        report
    }

    /// Tests every rule sequentially; one rule's failure never stops the rest.
    pub async fn run_batch(&self, detections: &[LoadedDetection], kind: TestKind) -> BatchSummary {
        let mut summary = BatchSummary::default();
        for detection in detections {
            let report = self.run_test(detection, kind).await;
            if report.passed {
                info!(rule = %report.name, "PASSED");
            } else {
                info!(rule = %report.name, "FAILED");
            }
            summary.push(report);
        }
        summary
    }

    async fn execute(
        &self,
        detection: &LoadedDetection,
        kind: TestKind,
        data_sent: &mut bool,
    ) -> Result<bool, HarnessError> {
        if let Some(data_path) = detection.data_path() {
            if !data_path.exists() {
                return Err(HarnessError::DataFileMissing {
                    path: data_path.display().to_string(),
                });
            }

            info!(rule = %detection.name, file = %data_path.display(), "sending sample data");
            self.hec
                .send(
                    &data_path,
                    &detection.rule.source,
                    &detection.rule.sourcetype,
                    EVENT_HOST,
                )
                .await?;
            *data_sent = true;

            if !self.settle_delay.is_zero() {
                sleep(self.settle_delay).await;
            }
        }

        let query = self.converter.convert(&detection.rule).await?;
        debug!(rule = %detection.name, %query, "running converted query");
        let matched = self.session.run_search(&query).await?;

        Ok(match kind {
            TestKind::TruePositive => matched,
            TestKind::FalsePositive => !matched,
        })
    }
}

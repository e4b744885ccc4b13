//! Orchestration for detlab: the per-rule test-execution protocol and
//! the deploy path that turns rules into scheduled saved searches.
//!
//! The protocol is the only stateful piece of the system: ingest sample
//! data, wait out indexing lag, convert and run the rule's query, read
//! the verdict off the hit count, then clean the ingestion index up.
//! Every failure is caught at the rule boundary so a batch never aborts
//! because one rule misbehaved.

mod deploy;
mod error;
mod runner;

pub use deploy::Deployer;
pub use error::HarnessError;
pub use runner::{BatchSummary, RuleReport, TestKind, TestRunner};

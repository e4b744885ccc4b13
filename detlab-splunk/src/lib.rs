//! Thin typed clients over the Splunk HTTP surfaces detlab touches.
//!
//! Two endpoints exist on the platform: the management API (session
//! auth, blocking search jobs, saved-search CRUD, HTTP-input setup) and
//! the HTTP Event Collector used to ingest sample event data. A single
//! [`SplunkSession`] is opened per run and injected into every component
//! that needs platform access; the [`HecClient`] borrows its transport.

mod error;
mod hec;
mod saved_search;
mod search;
mod session;

pub use error::SplunkError;
pub use hec::HecClient;
pub use saved_search::ScheduleConfig;
pub use search::normalize_search;
pub use session::SplunkSession;

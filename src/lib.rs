pub mod adapters;
pub mod alerts;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod grading;
pub mod pipeline;
pub mod resolver;
pub mod roster;
pub mod snapshot;

pub use adapters::{AlertSink, FetchOutcome, LogSink, SlackWebhook, StatSource};
pub use alerts::{dedup_key, AlertEvent, EventLedger, LedgerEntry};
pub use config::AppConfig;
pub use error::{PulseError, Result, SourceError};
pub use grading::{grade_line, grade_record};
pub use pipeline::{Pipeline, RunSummary};
pub use resolver::{AttemptOutcome, Resolution, SourceAttempt, StatResolver};

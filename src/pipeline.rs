//! Run orchestration.
//!
//! One call to [`Pipeline::run`] is one polling cycle: resolve every athlete
//! under a bounded worker pool and a run-level deadline, grade, dedupe
//! against the persisted ledger, deliver the new events, and replace the
//! snapshot. Source flakiness degrades individual athletes to "no data";
//! only a missing roster fails the run itself.

use std::sync::Arc;

use chrono::{Local, Utc};
use futures_util::{stream, StreamExt};
use tokio::time::{timeout_at, Instant};
use tracing::{info, warn};

use crate::adapters::{
    AlertSink, FixtureSource, MlbStatsApi, NcaaOrg, PrestoSports, Sidearm, StatBroadcast,
};
use crate::alerts::{self, EventLedger};
use crate::config::AppConfig;
use crate::domain::{Athlete, GradedRecord};
use crate::error::{PulseError, Result};
use crate::grading::grade_record;
use crate::resolver::{AttemptOutcome, Resolution, StatResolver};
use crate::snapshot;

/// What a run did, for the operator log and the exit path
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub athletes: usize,
    pub unavailable: usize,
    pub events_emitted: usize,
}

pub struct Pipeline {
    config: AppConfig,
    resolver: Arc<StatResolver>,
    sink: Arc<dyn AlertSink>,
}

impl Pipeline {
    pub fn new(config: AppConfig, resolver: StatResolver, sink: Arc<dyn AlertSink>) -> Self {
        Self {
            config,
            resolver: Arc::new(resolver),
            sink,
        }
    }

    /// Resolver wired to the live providers
    pub fn live_resolver(config: &AppConfig) -> Result<StatResolver> {
        let sources = &config.sources;
        let pro = MlbStatsApi::new(&sources.mlb_base_url)
            .map_err(|e| PulseError::Internal(format!("pro source init: {e}")))?;

        // Collegiate chain, narrowest/highest-quality first
        let collegiate: Vec<Arc<dyn crate::adapters::StatSource>> = vec![
            Arc::new(
                Sidearm::new(sources.sidearm.clone())
                    .map_err(|e| PulseError::Internal(format!("sidearm init: {e}")))?,
            ),
            Arc::new(
                PrestoSports::new(sources.presto.clone())
                    .map_err(|e| PulseError::Internal(format!("presto init: {e}")))?,
            ),
            Arc::new(
                StatBroadcast::new(sources.statbroadcast.clone())
                    .map_err(|e| PulseError::Internal(format!("statbroadcast init: {e}")))?,
            ),
            Arc::new(
                NcaaOrg::new(sources.ncaa_org.clone())
                    .map_err(|e| PulseError::Internal(format!("ncaa.org init: {e}")))?,
            ),
        ];

        Ok(StatResolver::new(
            Arc::new(pro),
            collegiate,
            config.run.source_timeout(),
        ))
    }

    /// Resolver that serves canned lines for every level, for offline demo runs
    pub fn offline_resolver(config: &AppConfig) -> StatResolver {
        let fixture = Arc::new(FixtureSource::from_file_or_empty(
            &config.sources.fixture_path,
        ));
        StatResolver::new(
            fixture.clone(),
            vec![fixture],
            config.run.source_timeout(),
        )
    }

    /// Execute one full polling cycle.
    pub async fn run(&self, athletes: Vec<Athlete>) -> Result<RunSummary> {
        let now = Utc::now();
        let today = Local::now().date_naive();
        info!(athletes = athletes.len(), "starting pulse run");

        let mut ledger = EventLedger::load(&self.config.output.ledger_path);
        ledger.prune_before(today);

        let resolutions = self.resolve_all(&athletes).await;

        let graded: Vec<GradedRecord> = athletes
            .into_iter()
            .zip(resolutions)
            .map(|(athlete, resolution)| {
                log_resolution(&athlete, &resolution);
                grade_record(athlete, resolution.record)
            })
            .collect();

        for record in &graded {
            info!(
                name = %record.athlete.name,
                summary = %record
                    .record
                    .line()
                    .map(|l| l.summary.as_str())
                    .unwrap_or("\u{2014}"),
                grade = %record
                    .grade
                    .map(|g| g.as_str())
                    .unwrap_or("no_data"),
                "graded"
            );
        }

        let (events, ledger) = alerts::dedupe(&graded, ledger, now);
        info!(new_events = events.len(), "dedup complete");

        // At-least-once: a failed delivery is logged, not retried into a
        // duplicate storm; the ledger already holds the fact
        for event in &events {
            if let Err(err) = self.sink.deliver(event).await {
                warn!(key = %event.dedup_key, error = %err, "alert delivery failed");
            }
        }

        let snap = snapshot::build(&graded, now);
        snapshot::write(&snap, &self.config.output.snapshot_path)?;
        ledger.persist(&self.config.output.ledger_path)?;

        let unavailable = graded.iter().filter(|g| g.record.is_unavailable()).count();
        let summary = RunSummary {
            athletes: graded.len(),
            unavailable,
            events_emitted: events.len(),
        };
        info!(
            athletes = summary.athletes,
            unavailable = summary.unavailable,
            events = summary.events_emitted,
            "pulse run complete"
        );
        Ok(summary)
    }

    /// Fan athlete resolutions out over the bounded pool, under the run
    /// deadline. Results come back in roster order regardless of completion
    /// order; athletes cut off by the deadline resolve unavailable instead
    /// of failing the run.
    async fn resolve_all(&self, athletes: &[Athlete]) -> Vec<Resolution> {
        let deadline = Instant::now() + self.config.run.run_deadline();

        let mut indexed: Vec<(usize, Resolution)> = stream::iter(athletes.iter().enumerate())
            .map(|(idx, athlete)| {
                let resolver = Arc::clone(&self.resolver);
                async move {
                    let resolution = match timeout_at(deadline, resolver.resolve(athlete)).await {
                        Ok(resolution) => resolution,
                        Err(_) => {
                            warn!(name = %athlete.name, "run deadline hit mid-resolution");
                            Resolution::deadline_exceeded()
                        }
                    };
                    (idx, resolution)
                }
            })
            .buffer_unordered(self.config.run.max_concurrent_fetches)
            .collect()
            .await;

        indexed.sort_by_key(|(idx, _)| *idx);
        indexed.into_iter().map(|(_, r)| r).collect()
    }
}

/// Surface the attempt trail for athletes that came up empty, keeping
/// "school had no game" and "feed broke" distinguishable in the logs.
fn log_resolution(athlete: &Athlete, resolution: &Resolution) {
    if !resolution.record.is_unavailable() {
        return;
    }
    let transient = resolution
        .attempts
        .iter()
        .filter(|a| matches!(a.outcome, AttemptOutcome::TransientError(_)))
        .count();
    if transient > 0 {
        warn!(
            name = %athlete.name,
            attempts = resolution.attempts.len(),
            transient,
            "unavailable with source failures"
        );
    }
}

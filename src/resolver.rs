//! Stat resolution.
//!
//! One resolver per run, shared across athletes; it holds the level-specific
//! adapter chains and carries no per-athlete state, so resolutions are
//! independent and safe to fan out. Pro athletes get the single
//! authoritative source; collegiate athletes walk the fallback chain in
//! fixed order until something answers.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, warn};

use crate::adapters::{FetchOutcome, StatSource};
use crate::domain::{Athlete, GameLine, Level, StatRecord, UnavailableReason};

/// How one adapter call went. `TransientError` covers timeouts, transport
/// failures, and malformed responses; for fallback purposes it equals
/// NotFound, but it is logged distinctly so "the school had no game" and
/// "the feed broke" stay distinguishable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Found,
    NotFound,
    TransientError(String),
}

/// One entry in an athlete's resolution trail
#[derive(Debug, Clone)]
pub struct SourceAttempt {
    pub source: &'static str,
    pub outcome: AttemptOutcome,
}

/// The resolver's full answer for one athlete: the canonical record plus the
/// ordered attempts that produced it.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub record: StatRecord,
    pub attempts: Vec<SourceAttempt>,
}

impl Resolution {
    /// Marker for athletes cut off by the run-level deadline
    pub fn deadline_exceeded() -> Self {
        Self {
            record: StatRecord::Unavailable(UnavailableReason::DeadlineExceeded),
            attempts: Vec::new(),
        }
    }
}

pub struct StatResolver {
    pro: Arc<dyn StatSource>,
    collegiate: Vec<Arc<dyn StatSource>>,
    call_timeout: Duration,
}

impl StatResolver {
    /// `collegiate` must be ordered narrowest/highest-quality first; the
    /// chain is tried strictly in the given order.
    pub fn new(
        pro: Arc<dyn StatSource>,
        collegiate: Vec<Arc<dyn StatSource>>,
        call_timeout: Duration,
    ) -> Self {
        Self {
            pro,
            collegiate,
            call_timeout,
        }
    }

    pub async fn resolve(&self, athlete: &Athlete) -> Resolution {
        match athlete.level {
            Level::Pro => self.resolve_pro(athlete).await,
            Level::Ncaa => self.resolve_collegiate(athlete).await,
        }
    }

    /// The pro provider is authoritative: NotFound means the athlete has no
    /// game today, and there is nothing to fall back to.
    async fn resolve_pro(&self, athlete: &Athlete) -> Resolution {
        let (attempt, line) = self.attempt(self.pro.as_ref(), athlete).await;
        let record = match (line, &attempt.outcome) {
            (Some(line), _) => StatRecord::Line(line),
            (None, AttemptOutcome::TransientError(_)) => {
                StatRecord::Unavailable(UnavailableReason::SourcesExhausted)
            }
            (None, _) => StatRecord::Unavailable(UnavailableReason::NoGameToday),
        };
        Resolution {
            record,
            attempts: vec![attempt],
        }
    }

    async fn resolve_collegiate(&self, athlete: &Athlete) -> Resolution {
        let mut attempts = Vec::with_capacity(self.collegiate.len());

        for source in &self.collegiate {
            let (attempt, line) = self.attempt(source.as_ref(), athlete).await;
            attempts.push(attempt);
            if let Some(line) = line {
                return Resolution {
                    record: StatRecord::Line(line),
                    attempts,
                };
            }
        }

        debug!(name = %athlete.name, "collegiate chain exhausted");
        Resolution {
            record: StatRecord::Unavailable(UnavailableReason::SourcesExhausted),
            attempts,
        }
    }

    /// One adapter call under its own timeout. Never propagates an error;
    /// failure becomes a TransientError attempt and the chain moves on.
    async fn attempt(
        &self,
        source: &dyn StatSource,
        athlete: &Athlete,
    ) -> (SourceAttempt, Option<GameLine>) {
        let outcome = match timeout(self.call_timeout, source.fetch(athlete)).await {
            Ok(Ok(FetchOutcome::Found(line))) => {
                debug!(source = source.id(), name = %athlete.name, "line found");
                return (
                    SourceAttempt {
                        source: source.id(),
                        outcome: AttemptOutcome::Found,
                    },
                    Some(line),
                );
            }
            Ok(Ok(FetchOutcome::NotFound)) => {
                debug!(source = source.id(), name = %athlete.name, "no game at source");
                AttemptOutcome::NotFound
            }
            Ok(Err(err)) => {
                warn!(source = source.id(), name = %athlete.name, error = %err, "source failed");
                AttemptOutcome::TransientError(err.to_string())
            }
            Err(_) => {
                warn!(
                    source = source.id(),
                    name = %athlete.name,
                    timeout_secs = self.call_timeout.as_secs(),
                    "source timed out"
                );
                AttemptOutcome::TransientError(format!(
                    "timed out after {:?}",
                    self.call_timeout
                ))
            }
        };

        (
            SourceAttempt {
                source: source.id(),
                outcome,
            },
            None,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GameStatus, Role};
    use crate::error::SourceError;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted source for exercising chain behavior
    struct Scripted {
        id: &'static str,
        script: ScriptedOutcome,
        calls: AtomicUsize,
    }

    enum ScriptedOutcome {
        Found,
        NotFound,
        Fail,
        Hang,
    }

    impl Scripted {
        fn new(id: &'static str, script: ScriptedOutcome) -> Arc<Self> {
            Arc::new(Self {
                id,
                script,
                calls: AtomicUsize::new(0),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl StatSource for Scripted {
        fn id(&self) -> &'static str {
            self.id
        }

        async fn fetch(&self, _athlete: &Athlete) -> Result<FetchOutcome, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.script {
                ScriptedOutcome::Found => Ok(FetchOutcome::Found(sample_line())),
                ScriptedOutcome::NotFound => Ok(FetchOutcome::NotFound),
                ScriptedOutcome::Fail => {
                    Err(SourceError::Malformed("scripted failure".to_string()))
                }
                ScriptedOutcome::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(FetchOutcome::NotFound)
                }
            }
        }
    }

    fn sample_line() -> GameLine {
        GameLine {
            date: NaiveDate::from_ymd_opt(2026, 8, 7).unwrap(),
            context: String::new(),
            status: GameStatus::Final,
            debut: false,
            batting: Some(Default::default()),
            pitching: None,
            summary: String::new(),
        }
    }

    fn athlete(level: Level) -> Athlete {
        Athlete {
            name: "Test Athlete".to_string(),
            org: "Testville".to_string(),
            level,
            tier: 1,
            role: Role::Hitter,
            client: true,
            position: String::new(),
            draft_class: String::new(),
            x_handle: String::new(),
        }
    }

    #[tokio::test]
    async fn pro_not_found_is_terminal() {
        let pro = Scripted::new("pro", ScriptedOutcome::NotFound);
        let chain = Scripted::new("fallback", ScriptedOutcome::Found);
        let resolver = StatResolver::new(
            pro.clone(),
            vec![chain.clone()],
            Duration::from_secs(1),
        );

        let resolution = resolver.resolve(&athlete(Level::Pro)).await;
        assert!(matches!(
            resolution.record,
            StatRecord::Unavailable(UnavailableReason::NoGameToday)
        ));
        assert_eq!(chain.call_count(), 0, "fallback chain must not be consulted");
    }

    #[tokio::test]
    async fn collegiate_chain_stops_at_first_found() {
        let first = Scripted::new("first", ScriptedOutcome::NotFound);
        let second = Scripted::new("second", ScriptedOutcome::Found);
        let third = Scripted::new("third", ScriptedOutcome::Found);
        let resolver = StatResolver::new(
            Scripted::new("pro", ScriptedOutcome::NotFound),
            vec![first.clone(), second.clone(), third.clone()],
            Duration::from_secs(1),
        );

        let resolution = resolver.resolve(&athlete(Level::Ncaa)).await;
        assert!(matches!(resolution.record, StatRecord::Line(_)));
        assert_eq!(resolution.attempts.len(), 2);
        assert_eq!(third.call_count(), 0, "chain must stop at the first hit");
    }

    #[tokio::test]
    async fn transient_error_falls_through_like_not_found() {
        let failing = Scripted::new("failing", ScriptedOutcome::Fail);
        let backup = Scripted::new("backup", ScriptedOutcome::Found);
        let resolver = StatResolver::new(
            Scripted::new("pro", ScriptedOutcome::NotFound),
            vec![failing, backup],
            Duration::from_secs(1),
        );

        let resolution = resolver.resolve(&athlete(Level::Ncaa)).await;
        assert!(matches!(resolution.record, StatRecord::Line(_)));
        assert!(matches!(
            resolution.attempts[0].outcome,
            AttemptOutcome::TransientError(_)
        ));
    }

    #[tokio::test]
    async fn hung_source_times_out_and_chain_continues() {
        let hanging = Scripted::new("hanging", ScriptedOutcome::Hang);
        let backup = Scripted::new("backup", ScriptedOutcome::Found);
        let resolver = StatResolver::new(
            Scripted::new("pro", ScriptedOutcome::NotFound),
            vec![hanging, backup],
            Duration::from_millis(50),
        );

        let resolution = resolver.resolve(&athlete(Level::Ncaa)).await;
        assert!(matches!(resolution.record, StatRecord::Line(_)));
        assert!(matches!(
            resolution.attempts[0].outcome,
            AttemptOutcome::TransientError(_)
        ));
    }

    #[tokio::test]
    async fn exhausted_chain_is_unavailable() {
        let resolver = StatResolver::new(
            Scripted::new("pro", ScriptedOutcome::NotFound),
            vec![
                Scripted::new("a", ScriptedOutcome::NotFound),
                Scripted::new("b", ScriptedOutcome::Fail),
            ],
            Duration::from_secs(1),
        );

        let resolution = resolver.resolve(&athlete(Level::Ncaa)).await;
        assert!(matches!(
            resolution.record,
            StatRecord::Unavailable(UnavailableReason::SourcesExhausted)
        ));
        assert_eq!(resolution.attempts.len(), 2);
    }
}

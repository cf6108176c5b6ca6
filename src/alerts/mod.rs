//! Alert deduplication.
//!
//! The whole pipeline re-fetches full game state every run, so alerting
//! correctness lives entirely here: each qualifying game fact must be
//! surfaced exactly once no matter how many runs observe it, and a fact
//! whose count grows (the 2nd home run) is a new fact. The deduplicator is
//! a pure transform over (graded records, ledger): load, transform,
//! persist happens in the pipeline, never in here.

pub mod ledger;

pub use ledger::{dedup_key, EventLedger, LedgerEntry};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::domain::{Criterion, CriterionHit, GradedRecord};

/// A newly-qualifying event bound for the notification sink
#[derive(Debug, Clone, Serialize)]
pub struct AlertEvent {
    pub athlete: String,
    pub org: String,
    pub tier: u8,
    pub criterion: Criterion,
    pub count: u32,
    pub dedup_key: String,
    pub message: String,
    pub emitted_at: DateTime<Utc>,
}

/// Criteria that trigger notifications, with their tier gates. Everything
/// else the grading engine matches stays snapshot-only.
fn max_eligible_tier(criterion: Criterion) -> Option<u8> {
    match criterion {
        Criterion::HomeRun => Some(4),
        Criterion::Pitched => Some(4),
        Criterion::FivePlusStrikeouts => Some(4),
        Criterion::ThreePlusTimesOnBase => Some(2),
        _ => None,
    }
}

/// Compare the current run's graded output against the ledger and emit the
/// facts not yet announced. Returns the events plus the updated ledger.
pub fn dedupe(
    graded: &[GradedRecord],
    mut ledger: EventLedger,
    now: DateTime<Utc>,
) -> (Vec<AlertEvent>, EventLedger) {
    let mut events = Vec::new();

    for record in graded {
        // Followed prospects are graded and appear in the snapshot, but
        // notifications are for represented clients only
        if !record.athlete.client {
            continue;
        }
        let Some(line) = record.record.line() else {
            continue;
        };

        for hit in &record.criteria {
            let Some(max_tier) = max_eligible_tier(hit.criterion) else {
                continue;
            };
            if record.athlete.tier > max_tier {
                continue;
            }

            let key = dedup_key(line.date, &record.athlete.name, hit.criterion.as_str());
            match ledger.get(&key) {
                Some(entry) if hit.count <= entry.last_count => {
                    debug!(key, count = hit.count, "already announced, suppressing");
                    continue;
                }
                _ => {}
            }

            let first_emitted = ledger
                .get(&key)
                .map(|e| e.first_emitted)
                .unwrap_or(now);
            ledger.record(
                key.clone(),
                LedgerEntry {
                    first_emitted,
                    last_count: hit.count,
                    game_date: line.date,
                },
            );

            events.push(AlertEvent {
                athlete: record.athlete.name.clone(),
                org: record.athlete.org.clone(),
                tier: record.athlete.tier,
                criterion: hit.criterion,
                count: hit.count,
                dedup_key: key,
                message: render_message(record, hit),
                emitted_at: now,
            });
        }
    }

    (events, ledger)
}

/// Human-readable notification text per criterion
fn render_message(record: &GradedRecord, hit: &CriterionHit) -> String {
    let name = &record.athlete.name;
    let org = &record.athlete.org;
    let tier = record.athlete.tier_label();
    let (context, summary) = record
        .record
        .line()
        .map(|l| (l.context.as_str(), l.summary.as_str()))
        .unwrap_or(("", ""));

    match hit.criterion {
        Criterion::HomeRun => {
            let hr_text = if hit.count > 1 {
                format!("{} HRs", hit.count)
            } else {
                "a HR".to_string()
            };
            format!("\u{26be} *{name}* ({tier}) just hit {hr_text}!\n_{org}_ \u{2014} {context}")
        }
        Criterion::Pitched => {
            format!("\u{1f525} *{name}* ({tier}) is pitching!\n_{org}_ \u{2014} {context}")
        }
        Criterion::FivePlusStrikeouts => {
            format!(
                "\u{1f3af} *{name}* ({tier}) has {} K's!\n_{org}_ \u{2014} {context}",
                hit.count
            )
        }
        Criterion::ThreePlusTimesOnBase => {
            format!(
                "\u{1f4aa} *{name}* ({tier}) has reached base {} times!\n_{org}_ \u{2014} {summary} \u{2014} {context}",
                hit.count
            )
        }
        other => format!("*{name}* ({tier}): {other}\n_{org}_ \u{2014} {context}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Athlete, BattingLine, GameLine, GameStatus, Level, PerformanceGrade, Role, StatRecord,
    };
    use chrono::NaiveDate;

    fn athlete(name: &str, tier: u8, client: bool) -> Athlete {
        Athlete {
            name: name.to_string(),
            org: "Testville".to_string(),
            level: Level::Pro,
            tier,
            role: Role::Hitter,
            client,
            position: "Hitter".to_string(),
            draft_class: String::new(),
            x_handle: String::new(),
        }
    }

    fn hr_record(name: &str, tier: u8, hr_count: u32) -> GradedRecord {
        let line = GameLine {
            date: NaiveDate::from_ymd_opt(2026, 8, 7).unwrap(),
            context: "TST 4, OPP 2 | Final".to_string(),
            status: GameStatus::Final,
            debut: false,
            batting: Some(BattingLine {
                at_bats: 4,
                hits: hr_count,
                home_runs: hr_count,
                ..Default::default()
            }),
            pitching: None,
            summary: String::new(),
        }
        .with_summary();
        GradedRecord {
            athlete: athlete(name, tier, true),
            record: StatRecord::Line(line),
            grade: Some(PerformanceGrade::Standout),
            criteria: vec![CriterionHit::new(Criterion::HomeRun, hr_count)],
        }
    }

    #[test]
    fn first_observation_emits_once() {
        let graded = vec![hr_record("A", 3, 1)];
        let (events, ledger) = dedupe(&graded, EventLedger::new(), Utc::now());
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].criterion, Criterion::HomeRun);

        // Identical second run: nothing new
        let (events, _) = dedupe(&graded, ledger, Utc::now());
        assert!(events.is_empty());
    }

    #[test]
    fn count_increase_retriggers() {
        let (events, ledger) = dedupe(&[hr_record("A", 3, 1)], EventLedger::new(), Utc::now());
        assert_eq!(events.len(), 1);

        let (events, ledger) = dedupe(&[hr_record("A", 3, 2)], ledger, Utc::now());
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].count, 2);
        assert!(events[0].message.contains("2 HRs"));

        // Count stays at 2: suppressed again
        let (events, _) = dedupe(&[hr_record("A", 3, 2)], ledger, Utc::now());
        assert!(events.is_empty());
    }

    #[test]
    fn times_on_base_gated_to_top_tiers() {
        let make = |tier| {
            let mut rec = hr_record("A", tier, 0);
            rec.criteria = vec![CriterionHit::new(Criterion::ThreePlusTimesOnBase, 4)];
            rec
        };
        let (events, _) = dedupe(&[make(3)], EventLedger::new(), Utc::now());
        assert!(events.is_empty(), "tier 3 must not alert on times on base");

        let (events, _) = dedupe(&[make(1)], EventLedger::new(), Utc::now());
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn non_clients_never_alert() {
        let mut rec = hr_record("A", 1, 1);
        rec.athlete.client = false;
        let (events, _) = dedupe(&[rec], EventLedger::new(), Utc::now());
        assert!(events.is_empty());
    }

    #[test]
    fn non_alertable_criteria_are_ignored() {
        let mut rec = hr_record("A", 1, 1);
        rec.criteria = vec![CriterionHit::new(Criterion::MultiHit, 2)];
        let (events, ledger) = dedupe(&[rec], EventLedger::new(), Utc::now());
        assert!(events.is_empty());
        assert!(ledger.is_empty());
    }
}

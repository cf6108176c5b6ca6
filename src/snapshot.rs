//! Snapshot assembly.
//!
//! The snapshot is the dashboard's entire world: it is rebuilt from scratch
//! every run and replaces the previous document wholesale, so athletes
//! dropped from the roster disappear and unavailable athletes show an
//! explicit no-data marker instead of last run's numbers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::domain::{GameLine, GradedRecord, StatRecord};
use crate::error::Result;

/// One athlete's row in the snapshot document. Field names match what the
/// dashboard already consumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub player_name: String,
    pub team: String,
    pub level: String,
    pub tier: u8,
    pub position: String,
    pub is_client: bool,
    pub stats_summary: String,
    /// Canonical stat line; absent when the athlete was unavailable
    pub stats: Option<GameLine>,
    pub game_context: String,
    pub game_status: String,
    /// Grade label with emoji, or the no-data marker
    pub performance_grade: String,
    /// Matched criterion ids, for dashboards that want the detail
    pub criteria: Vec<String>,
    pub social_search_url: String,
    pub draft_class: String,
}

/// The full per-run output document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub generated_at: DateTime<Utc>,
    pub entries: Vec<SnapshotEntry>,
}

const GRADE_NO_DATA: &str = "\u{2014} No Data";

/// Assemble the snapshot from this run's graded records, in roster order.
pub fn build(graded: &[GradedRecord], generated_at: DateTime<Utc>) -> Snapshot {
    let entries = graded
        .iter()
        .map(|record| {
            let (summary, context, status) = match &record.record {
                StatRecord::Line(line) => (
                    line.summary.clone(),
                    line.context.clone(),
                    line.status.as_str().to_string(),
                ),
                StatRecord::Unavailable(reason) => {
                    ("No game data".to_string(), reason.to_string(), "N/A".to_string())
                }
            };

            SnapshotEntry {
                player_name: record.athlete.name.clone(),
                team: record.athlete.org.clone(),
                level: record.athlete.level.as_str().to_string(),
                tier: record.athlete.tier,
                position: record.athlete.position.clone(),
                is_client: record.athlete.client,
                stats_summary: summary,
                stats: record.record.line().cloned(),
                game_context: context,
                game_status: status,
                performance_grade: record
                    .grade
                    .map(|g| g.label().to_string())
                    .unwrap_or_else(|| GRADE_NO_DATA.to_string()),
                criteria: record
                    .criteria
                    .iter()
                    .map(|h| h.criterion.as_str().to_string())
                    .collect(),
                social_search_url: social_search_url(&record.athlete.name, &record.athlete.org),
                draft_class: record.athlete.draft_class.clone(),
            }
        })
        .collect();

    Snapshot {
        generated_at,
        entries,
    }
}

/// X live-search deep link: quoted name plus the org's last word as a
/// keyword ("Yankees", not "New York Yankees").
pub fn social_search_url(name: &str, org: &str) -> String {
    let keyword = org.split_whitespace().last().unwrap_or("");
    let query = format!("\"{name}\" {keyword}");
    format!(
        "https://x.com/search?q={}&f=live",
        urlencoding::encode(query.trim())
    )
}

/// Write the snapshot, atomically replacing the previous document.
pub fn write<P: AsRef<Path>>(snapshot: &Snapshot, path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, serde_json::to_vec_pretty(snapshot)?)?;
    if let Err(err) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(err.into());
    }

    info!(entries = snapshot.entries.len(), path = %path.display(), "snapshot written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Athlete, BattingLine, GameLine, GameStatus, Level, PerformanceGrade, Role,
        UnavailableReason,
    };
    use chrono::NaiveDate;

    fn athlete(name: &str) -> Athlete {
        Athlete {
            name: name.to_string(),
            org: "New York Yankees".to_string(),
            level: Level::Pro,
            tier: 1,
            role: Role::Hitter,
            client: true,
            position: "Hitter".to_string(),
            draft_class: "N/A".to_string(),
            x_handle: String::new(),
        }
    }

    #[test]
    fn unavailable_athletes_get_explicit_no_data_marker() {
        let graded = vec![GradedRecord {
            athlete: athlete("A"),
            record: StatRecord::Unavailable(UnavailableReason::SourcesExhausted),
            grade: None,
            criteria: Vec::new(),
        }];
        let snapshot = build(&graded, Utc::now());
        assert_eq!(snapshot.entries[0].stats_summary, "No game data");
        assert!(snapshot.entries[0].stats.is_none());
        assert_eq!(snapshot.entries[0].game_status, "N/A");
        assert_eq!(snapshot.entries[0].performance_grade, GRADE_NO_DATA);
    }

    #[test]
    fn entries_follow_input_order() {
        let make = |name: &str| GradedRecord {
            athlete: athlete(name),
            record: StatRecord::Line(
                GameLine {
                    date: NaiveDate::from_ymd_opt(2026, 8, 7).unwrap(),
                    context: String::new(),
                    status: GameStatus::Final,
                    debut: false,
                    batting: Some(BattingLine::default()),
                    pitching: None,
                    summary: String::new(),
                }
                .with_summary(),
            ),
            grade: Some(PerformanceGrade::Routine),
            criteria: Vec::new(),
        };
        let snapshot = build(&[make("B"), make("A")], Utc::now());
        let names: Vec<_> = snapshot.entries.iter().map(|e| e.player_name.as_str()).collect();
        assert_eq!(names, ["B", "A"]);
    }

    #[test]
    fn social_url_uses_last_org_word() {
        let url = social_search_url("Dax Kilby", "New York Yankees");
        assert!(url.contains("Yankees"));
        assert!(!url.contains("New%20York%20Yankees"));
        assert!(url.ends_with("&f=live"));
    }
}

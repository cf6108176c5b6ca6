//! PrestoSports stats feed adapter.
//!
//! Second stop in the collegiate chain. Presto feeds split the box score
//! into batting and pitching tables rather than nesting lines per player,
//! and use camelCase field names.

use chrono::{Local, NaiveDate};
use reqwest::Client;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

use super::{find_player, pick, pick_str, pick_u32, FetchOutcome, StatSource};
use crate::domain::{Athlete, BattingLine, Decision, GameLine, GameStatus, PitchingLine};
use crate::error::SourceError;

#[derive(Clone)]
pub struct PrestoSports {
    http: Client,
    feeds: HashMap<String, String>,
}

impl PrestoSports {
    pub fn new(feeds: HashMap<String, String>) -> Result<Self, SourceError> {
        let http = Client::builder()
            .user_agent("dugout-pulse/0.1")
            .build()
            .map_err(SourceError::Http)?;
        Ok(Self { http, feeds })
    }

    fn event_context(feed: &Value) -> (NaiveDate, String, GameStatus) {
        let event = pick(feed, &["event", "game"]).unwrap_or(&Value::Null);
        let date = pick_str(event, &["date", "eventDate"])
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .unwrap_or_else(|| Local::now().date_naive());
        let status_raw = pick_str(event, &["status"]).unwrap_or("Final");
        let opponent = pick_str(event, &["opponent"]).unwrap_or("");
        let result = pick_str(event, &["result", "score"]).unwrap_or("");
        let context = if opponent.is_empty() {
            status_raw.to_string()
        } else if result.is_empty() {
            format!("vs {opponent} | {status_raw}")
        } else {
            format!("vs {opponent} | {result}")
        };
        (date, context, GameStatus::from_provider(status_raw))
    }

    fn batting_from(row: &Value) -> BattingLine {
        BattingLine {
            at_bats: pick_u32(row, &["atBats", "ab"]).unwrap_or(0),
            hits: pick_u32(row, &["hits", "h"]).unwrap_or(0),
            home_runs: pick_u32(row, &["homeRuns", "hr"]).unwrap_or(0),
            rbi: pick_u32(row, &["rbi"]).unwrap_or(0),
            runs: pick_u32(row, &["runs", "r"]).unwrap_or(0),
            stolen_bases: pick_u32(row, &["stolenBases", "sb"]).unwrap_or(0),
            walks: pick_u32(row, &["walks", "bb"]).unwrap_or(0),
            // Presto tables don't carry HBP; times-on-base undercounts
            hit_by_pitch: 0,
            cycle: false,
            first_career_home_run: false,
        }
    }

    fn pitching_from(row: &Value) -> PitchingLine {
        PitchingLine {
            outs: pick_str(row, &["inningsPitched", "ip"])
                .and_then(PitchingLine::outs_from_innings)
                .unwrap_or(0),
            earned_runs: pick_u32(row, &["earnedRuns", "er"]).unwrap_or(0),
            strikeouts: pick_u32(row, &["strikeouts", "so"]).unwrap_or(0),
            walks_allowed: pick_u32(row, &["walks", "bb"]).unwrap_or(0),
            hits_allowed: pick_u32(row, &["hits", "h"]).unwrap_or(0),
            decision: match pick_str(row, &["decision", "wls"]) {
                Some("W") => Decision::Win,
                Some("L") => Decision::Loss,
                Some("S") | Some("SV") => Decision::Save,
                _ => Decision::None,
            },
            no_hitter: false,
            first_career_win: false,
            first_career_save: false,
        }
    }
}

#[async_trait::async_trait]
impl StatSource for PrestoSports {
    fn id(&self) -> &'static str {
        "presto_sports"
    }

    async fn fetch(&self, athlete: &Athlete) -> Result<FetchOutcome, SourceError> {
        let Some(url) = self.feeds.get(&athlete.org) else {
            debug!(school = %athlete.org, "no Presto feed configured");
            return Ok(FetchOutcome::NotFound);
        };

        let resp = self.http.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(SourceError::Status(resp.status().as_u16()));
        }
        let feed: Value = resp.json().await.map_err(SourceError::Http)?;

        let stats = pick(&feed, &["stats", "boxscore"])
            .ok_or_else(|| SourceError::Malformed("feed has no stats block".to_string()))?;

        let batting_row = stats
            .get("batting")
            .and_then(|v| v.as_array())
            .and_then(|rows| find_player(rows, &athlete.name));
        let pitching_row = stats
            .get("pitching")
            .and_then(|v| v.as_array())
            .and_then(|rows| find_player(rows, &athlete.name));

        if batting_row.is_none() && pitching_row.is_none() {
            return Ok(FetchOutcome::NotFound);
        }

        let (date, context, status) = Self::event_context(&feed);
        let line = GameLine {
            date,
            context,
            status,
            debut: false,
            batting: batting_row.map(Self::batting_from),
            pitching: pitching_row.map(Self::pitching_from),
            summary: String::new(),
        }
        .with_summary();

        Ok(FetchOutcome::Found(line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn batting_table_row_parses() {
        let row = json!({"name": "Myles Bailey", "atBats": 4, "hits": 2, "runs": 1});
        let line = PrestoSports::batting_from(&row);
        assert_eq!(line.at_bats, 4);
        assert_eq!(line.hits, 2);
        assert_eq!(line.runs, 1);
        assert_eq!(line.walks, 0);
    }

    #[test]
    fn pitching_decision_from_wls_column() {
        let row = json!({"name": "A", "inningsPitched": "7.0", "earnedRuns": 1, "strikeouts": 9, "wls": "W"});
        let line = PrestoSports::pitching_from(&row);
        assert_eq!(line.outs, 21);
        assert_eq!(line.decision, Decision::Win);
    }

    #[test]
    fn event_context_prefers_result_line() {
        let feed = json!({"event": {"date": "2026-04-02", "opponent": "Miami", "status": "Final", "result": "FSU 5, MIA 4"}});
        let (date, context, status) = PrestoSports::event_context(&feed);
        assert_eq!(date, NaiveDate::from_ymd_opt(2026, 4, 2).unwrap());
        assert_eq!(context, "vs Miami | FSU 5, MIA 4");
        assert_eq!(status, GameStatus::Final);
    }
}

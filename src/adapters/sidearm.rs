//! Sidearm Sports stats feed adapter.
//!
//! Many D1 programs publish through Sidearm; each school gets its own feed
//! URL in config. Narrowest coverage but the richest lines of the collegiate
//! chain (walks, HBP, decisions), so it is tried first.

use chrono::{Local, NaiveDate};
use reqwest::Client;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

use super::{find_player, pick, pick_bool, pick_str, pick_u32, FetchOutcome, StatSource};
use crate::domain::{Athlete, BattingLine, Decision, GameLine, GameStatus, PitchingLine};
use crate::error::SourceError;

#[derive(Clone)]
pub struct Sidearm {
    http: Client,
    /// School name -> stats feed URL
    feeds: HashMap<String, String>,
}

impl Sidearm {
    pub fn new(feeds: HashMap<String, String>) -> Result<Self, SourceError> {
        let http = Client::builder()
            .user_agent("dugout-pulse/0.1")
            .build()
            .map_err(SourceError::Http)?;
        Ok(Self { http, feeds })
    }

    fn parse_line(&self, feed: &Value, player: &Value) -> GameLine {
        let game = feed.get("game").unwrap_or(&Value::Null);

        let date = pick_str(game, &["date", "game_date"])
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .unwrap_or_else(|| Local::now().date_naive());

        let status_raw = pick_str(game, &["status", "game_status"]).unwrap_or("Final");
        let opponent = pick_str(game, &["opponent", "opponent_name"]).unwrap_or("");
        let score = pick_str(game, &["score", "result"]).unwrap_or("");
        let context = match (opponent.is_empty(), score.is_empty()) {
            (false, false) => format!("vs {opponent} | {score}"),
            (false, true) => format!("vs {opponent} | {status_raw}"),
            _ => status_raw.to_string(),
        };

        let batting = player.get("batting").and_then(|b| {
            if !b.is_object() {
                return None;
            }
            Some(BattingLine {
                at_bats: pick_u32(b, &["ab", "at_bats"]).unwrap_or(0),
                hits: pick_u32(b, &["h", "hits"]).unwrap_or(0),
                home_runs: pick_u32(b, &["hr", "home_runs"]).unwrap_or(0),
                rbi: pick_u32(b, &["rbi"]).unwrap_or(0),
                runs: pick_u32(b, &["r", "runs"]).unwrap_or(0),
                stolen_bases: pick_u32(b, &["sb", "stolen_bases"]).unwrap_or(0),
                walks: pick_u32(b, &["bb", "walks"]).unwrap_or(0),
                hit_by_pitch: pick_u32(b, &["hbp", "hit_by_pitch"]).unwrap_or(0),
                cycle: pick_bool(b, &["cycle", "hit_for_cycle"]).unwrap_or(false),
                first_career_home_run: pick_bool(b, &["first_career_hr"]).unwrap_or(false),
            })
        });

        let pitching = player.get("pitching").and_then(|p| {
            if !p.is_object() {
                return None;
            }
            let outs = pick_str(p, &["ip", "innings_pitched"])
                .and_then(PitchingLine::outs_from_innings)
                .unwrap_or(0);
            Some(PitchingLine {
                outs,
                earned_runs: pick_u32(p, &["er", "earned_runs"]).unwrap_or(0),
                strikeouts: pick_u32(p, &["k", "so", "strikeouts"]).unwrap_or(0),
                walks_allowed: pick_u32(p, &["bb", "walks"]).unwrap_or(0),
                hits_allowed: pick_u32(p, &["h", "hits"]).unwrap_or(0),
                decision: match pick_str(p, &["decision"]) {
                    Some("W") => Decision::Win,
                    Some("L") => Decision::Loss,
                    Some("SV") | Some("S") => Decision::Save,
                    Some("H") | Some("HLD") => Decision::Hold,
                    _ => Decision::None,
                },
                no_hitter: pick_bool(p, &["no_hitter"]).unwrap_or(false),
                first_career_win: pick_bool(p, &["first_career_win"]).unwrap_or(false),
                first_career_save: pick_bool(p, &["first_career_save"]).unwrap_or(false),
            })
        });

        GameLine {
            date,
            context,
            status: GameStatus::from_provider(status_raw),
            debut: pick_bool(player, &["debut", "is_debut"]).unwrap_or(false),
            batting,
            pitching,
            summary: String::new(),
        }
        .with_summary()
    }
}

#[async_trait::async_trait]
impl StatSource for Sidearm {
    fn id(&self) -> &'static str {
        "sidearm"
    }

    async fn fetch(&self, athlete: &Athlete) -> Result<FetchOutcome, SourceError> {
        let Some(url) = self.feeds.get(&athlete.org) else {
            debug!(school = %athlete.org, "no Sidearm feed configured");
            return Ok(FetchOutcome::NotFound);
        };

        let resp = self
            .http
            .get(url)
            .query(&[("format", "json")])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(SourceError::Status(resp.status().as_u16()));
        }
        let feed: Value = resp.json().await.map_err(SourceError::Http)?;

        let players = pick(&feed, &["players", "roster"])
            .and_then(|v| v.as_array())
            .ok_or_else(|| SourceError::Malformed("feed has no players array".to_string()))?;

        match find_player(players, &athlete.name) {
            Some(player) => {
                let line = self.parse_line(&feed, player);
                if line.batting.is_none() && line.pitching.is_none() {
                    // On the roster but no line today
                    return Ok(FetchOutcome::NotFound);
                }
                Ok(FetchOutcome::Found(line))
            }
            None => Ok(FetchOutcome::NotFound),
        }
    }
}

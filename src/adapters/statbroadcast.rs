//! StatBroadcast live-event feed adapter.
//!
//! Third stop in the collegiate chain. StatBroadcast is an in-game feed:
//! lines update while the game runs, the schema groups players under the two
//! competing teams, and counting stats are strings. No walk or HBP columns,
//! so on-base counts degrade to hits.

use chrono::{Local, NaiveDate};
use reqwest::Client;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

use super::{find_player, pick, pick_str, pick_u32, FetchOutcome, StatSource};
use crate::domain::{Athlete, BattingLine, GameLine, GameStatus, PitchingLine};
use crate::error::SourceError;

#[derive(Clone)]
pub struct StatBroadcast {
    http: Client,
    feeds: HashMap<String, String>,
}

impl StatBroadcast {
    pub fn new(feeds: HashMap<String, String>) -> Result<Self, SourceError> {
        let http = Client::builder()
            .user_agent("dugout-pulse/0.1")
            .build()
            .map_err(SourceError::Http)?;
        Ok(Self { http, feeds })
    }

    /// Players appear under whichever of the two team blocks they belong to.
    fn all_players(feed: &Value) -> Vec<&Value> {
        let mut out = Vec::new();
        if let Some(teams) = pick(feed, &["teams"]).and_then(|v| v.as_array()) {
            for team in teams {
                if let Some(players) = pick(team, &["players", "lineup"]).and_then(|v| v.as_array())
                {
                    out.extend(players.iter());
                }
            }
        }
        out
    }

    fn parse_line(feed: &Value, player: &Value) -> GameLine {
        let date = pick_str(feed, &["date", "event_date"])
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .unwrap_or_else(|| Local::now().date_naive());

        // Live feed: "period" present means the game is still running
        let status = match pick_str(feed, &["status"]) {
            Some(s) => GameStatus::from_provider(s),
            None if pick(feed, &["period"]).is_some() => GameStatus::Live,
            None => GameStatus::Other("Unknown".to_string()),
        };

        let title = pick_str(feed, &["title", "event"]).unwrap_or("");
        let score = pick_str(feed, &["score"]).unwrap_or("");
        let context = match (title.is_empty(), score.is_empty()) {
            (false, false) => format!("{title} | {score}"),
            (false, true) => title.to_string(),
            _ => status.as_str().to_string(),
        };

        let batting = pick(player, &["hitting", "batting"]).and_then(|b| {
            b.is_object().then(|| BattingLine {
                at_bats: pick_u32(b, &["ab"]).unwrap_or(0),
                hits: pick_u32(b, &["h"]).unwrap_or(0),
                home_runs: pick_u32(b, &["hr"]).unwrap_or(0),
                rbi: pick_u32(b, &["rbi"]).unwrap_or(0),
                runs: pick_u32(b, &["r"]).unwrap_or(0),
                stolen_bases: pick_u32(b, &["sb"]).unwrap_or(0),
                walks: 0,
                hit_by_pitch: 0,
                cycle: false,
                first_career_home_run: false,
            })
        });

        let pitching = pick(player, &["pitching"]).and_then(|p| {
            p.is_object().then(|| PitchingLine {
                outs: pick_str(p, &["ip"])
                    .and_then(PitchingLine::outs_from_innings)
                    .unwrap_or(0),
                earned_runs: pick_u32(p, &["er"]).unwrap_or(0),
                strikeouts: pick_u32(p, &["k", "so"]).unwrap_or(0),
                walks_allowed: pick_u32(p, &["bb"]).unwrap_or(0),
                hits_allowed: pick_u32(p, &["h"]).unwrap_or(0),
                decision: Default::default(),
                no_hitter: false,
                first_career_win: false,
                first_career_save: false,
            })
        });

        GameLine {
            date,
            context,
            status,
            debut: false,
            batting,
            pitching,
            summary: String::new(),
        }
        .with_summary()
    }
}

#[async_trait::async_trait]
impl StatSource for StatBroadcast {
    fn id(&self) -> &'static str {
        "statbroadcast"
    }

    async fn fetch(&self, athlete: &Athlete) -> Result<FetchOutcome, SourceError> {
        let Some(url) = self.feeds.get(&athlete.org) else {
            debug!(school = %athlete.org, "no StatBroadcast feed configured");
            return Ok(FetchOutcome::NotFound);
        };

        let resp = self.http.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(SourceError::Status(resp.status().as_u16()));
        }
        let feed: Value = resp.json().await.map_err(SourceError::Http)?;

        let players = Self::all_players(&feed);
        if players.is_empty() {
            return Err(SourceError::Malformed(
                "event feed has no team player lists".to_string(),
            ));
        }

        let owned: Vec<Value> = players.into_iter().cloned().collect();
        match find_player(&owned, &athlete.name) {
            Some(player) => {
                let line = Self::parse_line(&feed, player);
                if line.batting.is_none() && line.pitching.is_none() {
                    return Ok(FetchOutcome::NotFound);
                }
                Ok(FetchOutcome::Found(line))
            }
            None => Ok(FetchOutcome::NotFound),
        }
    }
}

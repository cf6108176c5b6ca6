//! stats.ncaa.org box score adapter.
//!
//! Last resort of the collegiate chain: widest coverage, thinnest and least
//! reliable data. The box score feed carries only the basic counting stats
//! and changes shape often, so everything here parses defensively.

use chrono::{Local, NaiveDate};
use reqwest::Client;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

use super::{find_player, pick, pick_str, pick_u32, FetchOutcome, StatSource};
use crate::domain::{Athlete, BattingLine, GameLine, GameStatus, PitchingLine};
use crate::error::SourceError;

#[derive(Clone)]
pub struct NcaaOrg {
    http: Client,
    feeds: HashMap<String, String>,
}

impl NcaaOrg {
    pub fn new(feeds: HashMap<String, String>) -> Result<Self, SourceError> {
        let http = Client::builder()
            .user_agent("dugout-pulse/0.1")
            .build()
            .map_err(SourceError::Http)?;
        Ok(Self { http, feeds })
    }

    fn parse_line(feed: &Value, player: &Value) -> GameLine {
        let date = pick_str(feed, &["game_date", "date"])
            .and_then(|d| {
                NaiveDate::parse_from_str(d, "%m/%d/%Y")
                    .or_else(|_| NaiveDate::parse_from_str(d, "%Y-%m-%d"))
                    .ok()
            })
            .unwrap_or_else(|| Local::now().date_naive());

        let batting = pick(player, &["batting", "hitting"]).and_then(|b| {
            b.is_object().then(|| BattingLine {
                at_bats: pick_u32(b, &["ab", "at_bats"]).unwrap_or(0),
                hits: pick_u32(b, &["h", "hits"]).unwrap_or(0),
                home_runs: pick_u32(b, &["hr"]).unwrap_or(0),
                rbi: pick_u32(b, &["rbi"]).unwrap_or(0),
                runs: pick_u32(b, &["r", "runs"]).unwrap_or(0),
                stolen_bases: 0,
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
                strikeouts: pick_u32(p, &["so", "k"]).unwrap_or(0),
                walks_allowed: 0,
                hits_allowed: pick_u32(p, &["h"]).unwrap_or(0),
                decision: Default::default(),
                no_hitter: false,
                first_career_win: false,
                first_career_save: false,
            })
        });

        GameLine {
            date,
            context: pick_str(feed, &["matchup", "title"]).unwrap_or("").to_string(),
            // The feed only appears once the box score is filed
            status: GameStatus::Final,
            debut: false,
            batting,
            pitching,
            summary: String::new(),
        }
        .with_summary()
    }
}

#[async_trait::async_trait]
impl StatSource for NcaaOrg {
    fn id(&self) -> &'static str {
        "ncaa_org"
    }

    async fn fetch(&self, athlete: &Athlete) -> Result<FetchOutcome, SourceError> {
        let Some(url) = self.feeds.get(&athlete.org) else {
            debug!(school = %athlete.org, "no stats.ncaa.org feed configured");
            return Ok(FetchOutcome::NotFound);
        };

        let resp = self.http.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(SourceError::Status(resp.status().as_u16()));
        }
        let feed: Value = resp.json().await.map_err(SourceError::Http)?;

        let players = pick(&feed, &["players", "box_score", "boxscore"])
            .and_then(|v| v.as_array())
            .ok_or_else(|| SourceError::Malformed("box score has no player rows".to_string()))?;

        match find_player(players, &athlete.name) {
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

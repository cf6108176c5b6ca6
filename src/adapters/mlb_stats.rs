//! Official pro stats provider (MLB Stats API).
//!
//! Authoritative for Pro-level athletes: a miss here means "no game today",
//! not "try another source". Lookup is exact-name against the provider's
//! player index, then today's schedule is scanned for a boxscore containing
//! the player.

use chrono::{Local, NaiveDate};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use super::{pick, pick_str, pick_u32, FetchOutcome, StatSource};
use crate::domain::{
    Athlete, BattingLine, Decision, GameLine, GameStatus, PitchingLine, Role,
};
use crate::error::SourceError;

/// Org display names that differ from the franchise names the provider's
/// schedule uses. "Unsigned" means there is nothing to look up at all.
fn franchise_name(org: &str) -> Option<&str> {
    match org {
        "" | "Unsigned" => None,
        "Athletics" => Some("Oakland Athletics"),
        other => Some(other),
    }
}

#[derive(Clone)]
pub struct MlbStatsApi {
    http: Client,
    base_url: String,
}

impl MlbStatsApi {
    pub fn new(base_url: &str) -> Result<Self, SourceError> {
        let http = Client::builder()
            .user_agent("dugout-pulse/0.1")
            .build()
            .map_err(SourceError::Http)?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json(&self, path: &str) -> Result<Value, SourceError> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self.http.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(SourceError::Status(resp.status().as_u16()));
        }
        resp.json::<Value>().await.map_err(SourceError::Http)
    }

    /// Look up the provider's player id by exact name. The index search may
    /// return several candidates; the first exact (case-insensitive) match
    /// wins, otherwise the first result, matching the provider's own ranking.
    async fn lookup_player(&self, name: &str) -> Result<Option<u64>, SourceError> {
        let body = self
            .get_json(&format!(
                "/api/v1/people/search?names={}",
                urlencoding::encode(name)
            ))
            .await?;

        let people = match body.get("people").and_then(|v| v.as_array()) {
            Some(people) if !people.is_empty() => people,
            _ => return Ok(None),
        };

        let exact = people.iter().find(|p| {
            pick_str(p, &["fullName", "name"])
                .map(|n| n.eq_ignore_ascii_case(name))
                .unwrap_or(false)
        });
        let person = exact.unwrap_or(&people[0]);
        Ok(person.get("id").and_then(|v| v.as_u64()))
    }

    /// Today's schedule, with games involving the athlete's franchise moved
    /// to the front so the common case costs one boxscore fetch.
    async fn todays_games(&self, date: NaiveDate, org: &str) -> Result<Vec<Value>, SourceError> {
        let body = self
            .get_json(&format!(
                "/api/v1/schedule?sportId=1&date={}&hydrate=linescore",
                date.format("%Y-%m-%d")
            ))
            .await?;

        let mut games: Vec<Value> = body
            .get("dates")
            .and_then(|v| v.as_array())
            .and_then(|dates| dates.first())
            .and_then(|d| d.get("games"))
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();

        if let Some(franchise) = franchise_name(org) {
            games.sort_by_key(|g| !game_involves(g, franchise));
        }
        Ok(games)
    }

    async fn boxscore(&self, game_pk: u64) -> Result<Value, SourceError> {
        self.get_json(&format!("/api/v1/game/{game_pk}/boxscore"))
            .await
    }

    /// Find the player's entry in either team's boxscore player map.
    fn player_entry<'a>(boxscore: &'a Value, player_id: u64) -> Option<&'a Value> {
        let key = format!("ID{player_id}");
        ["home", "away"].iter().find_map(|side| {
            boxscore
                .get("teams")
                .and_then(|t| t.get(*side))
                .and_then(|t| t.get("players"))
                .and_then(|p| p.get(&key))
        })
    }

    fn extract_line(&self, date: NaiveDate, game: &Value, entry: &Value) -> GameLine {
        let stats = entry.get("stats").unwrap_or(&Value::Null);

        // A player can carry both lines in one game; take whatever the
        // boxscore actually has and let role sort out the grading paths.
        let batting = stats.get("batting").and_then(parse_batting);
        let pitching = stats.get("pitching").and_then(parse_pitching);

        let (context, status) = game_context(game);

        GameLine {
            date,
            context,
            status,
            debut: pick(entry, &["isDebut", "debut"])
                .and_then(|v| v.as_bool())
                .unwrap_or(false),
            batting,
            pitching,
            summary: String::new(),
        }
        .with_summary()
    }
}

fn game_involves(game: &Value, franchise: &str) -> bool {
    ["home", "away"].iter().any(|side| {
        game.pointer(&format!("/teams/{side}/team/name"))
            .and_then(|v| v.as_str())
            .map(|n| n.eq_ignore_ascii_case(franchise))
            .unwrap_or(false)
    })
}

fn game_context(game: &Value) -> (String, GameStatus) {
    let status_raw = game
        .pointer("/status/detailedState")
        .and_then(|v| v.as_str())
        .unwrap_or("Unknown");
    let status = GameStatus::from_provider(status_raw);

    let team = |side: &str| -> (String, i64) {
        let name = game
            .pointer(&format!("/teams/{side}/team/name"))
            .and_then(|v| v.as_str())
            .unwrap_or("?")
            .to_string();
        let score = game
            .pointer(&format!("/teams/{side}/score"))
            .and_then(|v| v.as_i64())
            .unwrap_or(0);
        (name, score)
    };
    let (home, home_score) = team("home");
    let (away, away_score) = team("away");

    let context = match status {
        GameStatus::Final => format!("{away} {away_score}, {home} {home_score} | Final"),
        GameStatus::Live => {
            let half = game
                .pointer("/linescore/inningState")
                .and_then(|v| v.as_str())
                .unwrap_or("");
            let inning = game
                .pointer("/linescore/currentInningOrdinal")
                .and_then(|v| v.as_str())
                .unwrap_or("");
            format!("{away} {away_score}, {home} {home_score} | {half} {inning}")
        }
        _ => format!("{away} vs {home} | {status_raw}"),
    };
    (context, status)
}

fn parse_batting(stats: &Value) -> Option<BattingLine> {
    // A present-but-empty batting object means the player didn't bat
    if !stats.is_object() || stats.as_object().map(|o| o.is_empty()).unwrap_or(true) {
        return None;
    }
    Some(BattingLine {
        at_bats: pick_u32(stats, &["atBats", "at_bats", "ab"]).unwrap_or(0),
        hits: pick_u32(stats, &["hits", "h"]).unwrap_or(0),
        home_runs: pick_u32(stats, &["homeRuns", "home_runs", "hr"]).unwrap_or(0),
        rbi: pick_u32(stats, &["rbi"]).unwrap_or(0),
        runs: pick_u32(stats, &["runs", "r"]).unwrap_or(0),
        stolen_bases: pick_u32(stats, &["stolenBases", "sb"]).unwrap_or(0),
        walks: pick_u32(stats, &["baseOnBalls", "walks", "bb"]).unwrap_or(0),
        hit_by_pitch: pick_u32(stats, &["hitByPitch", "hbp"]).unwrap_or(0),
        cycle: false,
        first_career_home_run: false,
    })
}

fn parse_pitching(stats: &Value) -> Option<PitchingLine> {
    if !stats.is_object() || stats.as_object().map(|o| o.is_empty()).unwrap_or(true) {
        return None;
    }
    let outs = pick_str(stats, &["inningsPitched", "ip"])
        .and_then(PitchingLine::outs_from_innings)
        .or_else(|| pick_u32(stats, &["outs"]))
        .unwrap_or(0);

    Some(PitchingLine {
        outs,
        earned_runs: pick_u32(stats, &["earnedRuns", "er"]).unwrap_or(0),
        strikeouts: pick_u32(stats, &["strikeOuts", "strikeouts", "so", "k"]).unwrap_or(0),
        walks_allowed: pick_u32(stats, &["baseOnBalls", "bb"]).unwrap_or(0),
        hits_allowed: pick_u32(stats, &["hits", "h"]).unwrap_or(0),
        decision: parse_decision(stats),
        no_hitter: false,
        first_career_win: false,
        first_career_save: false,
    })
}

/// The boxscore carries the game decision in the pitcher's note ("(W, 5-2)")
/// rather than a dedicated field. No note, no decision.
fn parse_decision(stats: &Value) -> Decision {
    let note = pick_str(stats, &["note"]).unwrap_or("");
    let note = note.trim_start_matches('(');
    if note.starts_with('W') {
        Decision::Win
    } else if note.starts_with('L') {
        Decision::Loss
    } else if note.starts_with("SV") || note.starts_with('S') {
        Decision::Save
    } else if note.starts_with('H') {
        Decision::Hold
    } else {
        Decision::None
    }
}

#[async_trait::async_trait]
impl StatSource for MlbStatsApi {
    fn id(&self) -> &'static str {
        "mlb_stats_api"
    }

    async fn fetch(&self, athlete: &Athlete) -> Result<FetchOutcome, SourceError> {
        if franchise_name(&athlete.org).is_none() {
            debug!(name = %athlete.name, "unsigned / no org, skipping pro lookup");
            return Ok(FetchOutcome::NotFound);
        }

        let player_id = match self.lookup_player(&athlete.name).await? {
            Some(id) => id,
            None => {
                debug!(name = %athlete.name, "not in provider player index");
                return Ok(FetchOutcome::NotFound);
            }
        };

        let today = Local::now().date_naive();
        let games = self.todays_games(today, &athlete.org).await?;
        if games.is_empty() {
            return Ok(FetchOutcome::NotFound);
        }

        for game in &games {
            let Some(game_pk) = game.get("gamePk").and_then(|v| v.as_u64()) else {
                warn!(source = self.id(), "schedule entry missing gamePk");
                continue;
            };
            let boxscore = self.boxscore(game_pk).await?;
            if let Some(entry) = Self::player_entry(&boxscore, player_id) {
                let line = self.extract_line(today, game, entry);
                // An entry with no stat line at all (bench player listed in
                // the boxscore) is not a game appearance
                if line.batting.is_none() && line.pitching.is_none() {
                    if athlete.role == Role::Pitcher {
                        debug!(name = %athlete.name, game_pk, "listed but no pitching line yet");
                    }
                    continue;
                }
                return Ok(FetchOutcome::Found(line));
            }
        }

        Ok(FetchOutcome::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decision_parsed_from_note() {
        assert_eq!(parse_decision(&json!({"note": "(W, 5-2)"})), Decision::Win);
        assert_eq!(parse_decision(&json!({"note": "(SV, 12)"})), Decision::Save);
        assert_eq!(parse_decision(&json!({"note": "(H, 4)"})), Decision::Hold);
        assert_eq!(parse_decision(&json!({})), Decision::None);
    }

    #[test]
    fn empty_stat_objects_degrade_to_absent_lines() {
        assert!(parse_batting(&json!({})).is_none());
        assert!(parse_pitching(&json!({})).is_none());
        assert!(parse_batting(&Value::Null).is_none());
    }

    #[test]
    fn drifted_field_names_still_parse() {
        let line = parse_batting(&json!({"at_bats": "4", "h": 2, "hr": 1})).unwrap();
        assert_eq!(line.at_bats, 4);
        assert_eq!(line.hits, 2);
        assert_eq!(line.home_runs, 1);
        // Missing fields degrade to zero, not an error
        assert_eq!(line.rbi, 0);
    }

    #[test]
    fn final_game_context_renders_scoreline() {
        let game = json!({
            "status": {"detailedState": "Final"},
            "teams": {
                "home": {"team": {"name": "Boston Red Sox"}, "score": 5},
                "away": {"team": {"name": "Tampa Bay Rays"}, "score": 2}
            }
        });
        let (context, status) = game_context(&game);
        assert_eq!(status, GameStatus::Final);
        assert_eq!(context, "Tampa Bay Rays 2, Boston Red Sox 5 | Final");
    }
}

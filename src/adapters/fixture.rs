//! Canned-line source for offline runs.
//!
//! Loads pre-built game lines from a JSON file so the whole pipeline can be
//! exercised without touching a live provider: demo runs before the season
//! starts, and integration tests.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

use super::{FetchOutcome, StatSource};
use crate::domain::{Athlete, GameLine};
use crate::error::{PulseError, Result, SourceError};

#[derive(Debug, Deserialize)]
struct FixtureEntry {
    name: String,
    line: GameLine,
}

#[derive(Clone, Default)]
pub struct FixtureSource {
    lines: HashMap<String, GameLine>,
}

impl FixtureSource {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(&path)?;
        let entries: Vec<FixtureEntry> = serde_json::from_str(&raw)?;
        info!(
            path = %path.as_ref().display(),
            entries = entries.len(),
            "loaded fixture lines"
        );
        Ok(Self::from_entries(
            entries.into_iter().map(|e| (e.name, e.line)),
        ))
    }

    pub fn from_entries<I: IntoIterator<Item = (String, GameLine)>>(entries: I) -> Self {
        let lines = entries
            .into_iter()
            .map(|(name, line)| (name.trim().to_lowercase(), line.with_summary()))
            .collect();
        Self { lines }
    }
}

impl FixtureSource {
    /// Missing fixture file is a usable (empty) source: every athlete just
    /// resolves unavailable, which is what an offline dry run should show.
    pub fn from_file_or_empty<P: AsRef<Path>>(path: P) -> Self {
        match Self::from_file(&path) {
            Ok(source) => source,
            Err(PulseError::Io(_)) => {
                info!(path = %path.as_ref().display(), "no fixture file, using empty source");
                Self::default()
            }
            Err(err) => {
                tracing::warn!(error = %err, "fixture file unreadable, using empty source");
                Self::default()
            }
        }
    }
}

#[async_trait::async_trait]
impl StatSource for FixtureSource {
    fn id(&self) -> &'static str {
        "fixture"
    }

    async fn fetch(&self, athlete: &Athlete) -> std::result::Result<FetchOutcome, SourceError> {
        match self.lines.get(&athlete.name.trim().to_lowercase()) {
            Some(line) => Ok(FetchOutcome::Found(line.clone())),
            None => Ok(FetchOutcome::NotFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BattingLine, GameStatus};
    use chrono::NaiveDate;

    fn sample_line() -> GameLine {
        GameLine {
            date: NaiveDate::from_ymd_opt(2026, 8, 7).unwrap(),
            context: "NYY 6, BOS 3 | Final".to_string(),
            status: GameStatus::Final,
            debut: false,
            batting: Some(BattingLine {
                at_bats: 4,
                hits: 2,
                home_runs: 1,
                rbi: 3,
                ..Default::default()
            }),
            pitching: None,
            summary: String::new(),
        }
    }

    #[tokio::test]
    async fn lookup_is_name_insensitive() {
        let source =
            FixtureSource::from_entries([("Dax Kilby".to_string(), sample_line())]);
        let athlete = Athlete {
            name: "dax kilby".to_string(),
            org: "New York Yankees".to_string(),
            level: crate::domain::Level::Pro,
            tier: 1,
            role: crate::domain::Role::Hitter,
            client: true,
            position: "Hitter".to_string(),
            draft_class: String::new(),
            x_handle: String::new(),
        };
        match source.fetch(&athlete).await.unwrap() {
            FetchOutcome::Found(line) => assert_eq!(line.summary, "2-4, HR, 3 RBI"),
            FetchOutcome::NotFound => panic!("expected fixture hit"),
        }
    }
}

//! Persisted alert-dedup state.
//!
//! The ledger is the only state that crosses run boundaries. It is loaded
//! once at run start, transformed purely by the deduplicator, and written
//! back once at run end as a single atomic replace; the scheduler
//! guarantees at most one run in flight, so no locking is needed.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{error, info, warn};

use crate::error::Result;

/// Last-emitted state for one (athlete, criterion, game date) fact.
/// The count is what makes re-polling idempotent without swallowing genuine
/// repeats: a re-fetched unchanged line compares equal, a 2nd home run
/// compares greater.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub first_emitted: DateTime<Utc>,
    pub last_count: u32,
    pub game_date: NaiveDate,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLedger {
    entries: HashMap<String, LedgerEntry>,
}

impl EventLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&LedgerEntry> {
        self.entries.get(key)
    }

    pub fn record(&mut self, key: String, entry: LedgerEntry) {
        self.entries.insert(key, entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop entries from earlier game days to bound growth. Same-day entries
    /// are never pruned; they are exactly the ones suppressing repeats.
    pub fn prune_before(&mut self, today: NaiveDate) {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.game_date >= today);
        let dropped = before - self.entries.len();
        if dropped > 0 {
            info!(dropped, retained = self.entries.len(), "pruned stale ledger entries");
        }
    }

    /// Load the ledger, failing safe: an unreadable or malformed file yields
    /// an empty ledger rather than aborting the run. That trades a one-time
    /// re-announcement of already-seen events for availability, and is loud
    /// about it since dedup correctness changes for this run.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "no ledger file yet, starting empty");
                return Self::new();
            }
            Err(err) => {
                error!(
                    path = %path.display(),
                    error = %err,
                    "ledger unreadable — treating as empty, duplicate alerts possible this run"
                );
                return Self::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(ledger) => ledger,
            Err(err) => {
                error!(
                    path = %path.display(),
                    error = %err,
                    "ledger corrupt — treating as empty, duplicate alerts possible this run"
                );
                Self::new()
            }
        }
    }

    /// Atomic replace: write to a sibling temp file, then rename over the
    /// old ledger so a crash mid-write never leaves a half-written file.
    pub fn persist<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(self)?)?;
        if let Err(err) = std::fs::rename(&tmp, path) {
            let _ = std::fs::remove_file(&tmp);
            warn!(path = %path.display(), error = %err, "ledger rename failed");
            return Err(err.into());
        }
        Ok(())
    }
}

/// Stable dedup key for one qualifying game fact
pub fn dedup_key(game_date: NaiveDate, athlete_name: &str, criterion: &str) -> String {
    format!(
        "{}|{}|{}",
        game_date.format("%Y-%m-%d"),
        athlete_name.trim().to_lowercase(),
        criterion
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn entry(game_date: NaiveDate, count: u32) -> LedgerEntry {
        LedgerEntry {
            first_emitted: Utc::now(),
            last_count: count,
            game_date,
        }
    }

    #[test]
    fn dedup_key_is_stable_across_runs() {
        let a = dedup_key(date(2026, 8, 7), "Garrett Whitlock", "home_run");
        let b = dedup_key(date(2026, 8, 7), "  garrett whitlock ", "home_run");
        assert_eq!(a, b);
        assert_eq!(a, "2026-08-07|garrett whitlock|home_run");
    }

    #[test]
    fn prune_keeps_today_drops_yesterday() {
        let mut ledger = EventLedger::new();
        ledger.record("old".to_string(), entry(date(2026, 8, 6), 1));
        ledger.record("new".to_string(), entry(date(2026, 8, 7), 1));
        ledger.prune_before(date(2026, 8, 7));
        assert!(ledger.get("old").is_none());
        assert!(ledger.get("new").is_some());
    }

    #[test]
    fn load_missing_file_is_empty() {
        let ledger = EventLedger::load("/nonexistent/path/ledger.json");
        assert!(ledger.is_empty());
    }

    #[test]
    fn corrupt_file_fails_safe_to_empty() {
        let dir = std::env::temp_dir().join("dugout-ledger-corrupt-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("ledger.json");
        std::fs::write(&path, b"{not json").unwrap();
        let ledger = EventLedger::load(&path);
        assert!(ledger.is_empty());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn persist_then_load_round_trips() {
        let dir = std::env::temp_dir().join("dugout-ledger-roundtrip-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("ledger.json");

        let mut ledger = EventLedger::new();
        ledger.record(
            dedup_key(date(2026, 8, 7), "A", "home_run"),
            entry(date(2026, 8, 7), 2),
        );
        ledger.persist(&path).unwrap();

        let reloaded = EventLedger::load(&path);
        let stored = reloaded
            .get(&dedup_key(date(2026, 8, 7), "A", "home_run"))
            .unwrap();
        assert_eq!(stored.last_count, 2);
        std::fs::remove_dir_all(&dir).ok();
    }
}

//! Source adapters.
//!
//! Each adapter wraps one external stat provider behind the uniform
//! `StatSource` capability; the resolver holds ordered lists of these, so
//! supporting a new provider means writing one adapter and inserting it into
//! a chain. Adapters normalize their provider's schema into `GameLine` and
//! must degrade missing or drifted fields to absent values instead of
//! failing the fetch.

pub mod fixture;
pub mod mlb_stats;
pub mod ncaa_org;
pub mod presto;
pub mod sidearm;
pub mod slack;
pub mod statbroadcast;

pub use fixture::FixtureSource;
pub use mlb_stats::MlbStatsApi;
pub use ncaa_org::NcaaOrg;
pub use presto::PrestoSports;
pub use sidearm::Sidearm;
pub use slack::{AlertSink, LogSink, SlackWebhook};
pub use statbroadcast::StatBroadcast;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{Athlete, GameLine};
use crate::error::SourceError;

/// Successful adapter call: either a normalized line or a definitive
/// "this source has no game for this athlete".
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    Found(GameLine),
    NotFound,
}

/// One external stat provider.
#[async_trait]
pub trait StatSource: Send + Sync {
    /// Stable identifier used in attempt trails and logs
    fn id(&self) -> &'static str;

    /// Fetch and normalize the athlete's current game line.
    /// Transport and decoding failures are `SourceError`; "no game" is a
    /// successful `NotFound`.
    async fn fetch(&self, athlete: &Athlete) -> Result<FetchOutcome, SourceError>;
}

// Tolerant JSON navigation shared by the adapters. Provider feeds drift;
// these accept the first key that exists and coerce string-typed numbers.

pub(crate) fn pick<'a>(root: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| root.get(*key))
}

pub(crate) fn pick_str<'a>(root: &'a Value, keys: &[&str]) -> Option<&'a str> {
    pick(root, keys).and_then(|v| v.as_str())
}

pub(crate) fn pick_u32(root: &Value, keys: &[&str]) -> Option<u32> {
    pick(root, keys).and_then(|v| match v {
        Value::Number(n) => n.as_u64().map(|n| n as u32),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

pub(crate) fn pick_bool(root: &Value, keys: &[&str]) -> Option<bool> {
    pick(root, keys).and_then(|v| {
        if let Some(b) = v.as_bool() {
            Some(b)
        } else {
            v.as_str()
                .map(|s| matches!(s, "true" | "TRUE" | "1" | "yes" | "YES"))
        }
    })
}

/// Case-insensitive exact name match against a list of player objects.
/// Exact-match-only is a known limitation of the whole pipeline, kept
/// deliberately; fuzzy matching against the wrong athlete is worse than a
/// miss.
pub(crate) fn find_player<'a>(players: &'a [Value], name: &str) -> Option<&'a Value> {
    players.iter().find(|p| {
        pick_str(p, &["name", "player_name", "fullName", "full_name"])
            .map(|n| n.trim().eq_ignore_ascii_case(name.trim()))
            .unwrap_or(false)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pick_u32_coerces_string_numbers() {
        let v = json!({"hits": "3", "ab": 4});
        assert_eq!(pick_u32(&v, &["hits"]), Some(3));
        assert_eq!(pick_u32(&v, &["ab"]), Some(4));
        assert_eq!(pick_u32(&v, &["missing", "ab"]), Some(4));
        assert_eq!(pick_u32(&v, &["nope"]), None);
    }

    #[test]
    fn find_player_is_case_insensitive_exact() {
        let players = vec![
            json!({"name": "Kyle Jones"}),
            json!({"player_name": "Myles Bailey"}),
        ];
        assert!(find_player(&players, "kyle jones").is_some());
        assert!(find_player(&players, "Myles Bailey").is_some());
        assert!(find_player(&players, "Kyle").is_none());
    }
}

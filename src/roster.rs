//! Roster boundary.
//!
//! Upstream acquisition (the agency's sheet and its export job) is external;
//! this module owns the validated edge: raw published rows come in, `Athlete`
//! records come out. Rows at levels we don't track are dropped here so the
//! core never sees them.

use reqwest::Client;
use serde::Deserialize;
use tracing::{info, warn};

use crate::config::RosterConfig;
use crate::domain::{Athlete, Level, Role};
use crate::error::{PulseError, Result};

/// A raw roster row as published. Field names follow the sheet's export;
/// unknown levels survive deserialization and are filtered afterwards so one
/// bad row never poisons the batch.
#[derive(Debug, Clone, Deserialize)]
pub struct RosterRow {
    pub name: String,
    #[serde(alias = "team", alias = "organization")]
    pub org: String,
    pub level: String,
    #[serde(default)]
    pub tier: Option<i64>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub draft_class: Option<String>,
    #[serde(default)]
    pub x_handle: Option<String>,
    /// Represented client vs. followed prospect; defaults to client,
    /// matching the primary sheet
    #[serde(default = "default_client")]
    pub client: bool,
}

fn default_client() -> bool {
    true
}

/// Keep only recognized levels and normalize each surviving row.
pub fn normalize(rows: Vec<RosterRow>) -> Vec<Athlete> {
    let total = rows.len();
    let athletes: Vec<Athlete> = rows.into_iter().filter_map(normalize_row).collect();
    info!(
        kept = athletes.len(),
        dropped = total - athletes.len(),
        "roster filtered to tracked levels"
    );
    athletes
}

fn normalize_row(row: RosterRow) -> Option<Athlete> {
    let level = match row.level.trim() {
        "Pro" => Level::Pro,
        "NCAA" => Level::Ncaa,
        other => {
            // High School and anything else the sheet grows is out of scope
            tracing::debug!(name = %row.name, level = other, "dropping row at untracked level");
            return None;
        }
    };

    let name = row.name.trim().to_string();
    if name.is_empty() {
        warn!("dropping roster row with empty name");
        return None;
    }

    let position = row.position.unwrap_or_default().trim().to_string();
    let tier = coerce_tier(row.tier, &name);

    Some(Athlete {
        role: Role::from_position(&position),
        name,
        org: row.org.trim().to_string(),
        level,
        tier,
        client: row.client,
        position,
        draft_class: row.draft_class.unwrap_or_default(),
        x_handle: row.x_handle.unwrap_or_default(),
    })
}

/// Tier must land in 1..=4. Missing or out-of-range values become tier 4
/// (lowest priority) so the athlete still flows through the pipeline but
/// never passes the tier-gated alert checks.
fn coerce_tier(tier: Option<i64>, name: &str) -> u8 {
    match tier {
        Some(t @ 1..=4) => t as u8,
        Some(t) => {
            warn!(name, tier = t, "tier out of range, treating as tier 4");
            4
        }
        None => 4,
    }
}

/// Fetch the roster from the configured file or URL.
pub async fn load(cfg: &RosterConfig, http: &Client) -> Result<Vec<Athlete>> {
    let rows = if let Some(path) = &cfg.path {
        info!(path, "loading roster from file");
        let raw = std::fs::read_to_string(path)
            .map_err(|e| PulseError::Roster(format!("read {path}: {e}")))?;
        serde_json::from_str::<Vec<RosterRow>>(&raw)
            .map_err(|e| PulseError::Roster(format!("parse {path}: {e}")))?
    } else if let Some(url) = &cfg.url {
        info!(url, "fetching roster");
        let resp = http
            .get(url)
            .send()
            .await
            .map_err(|e| PulseError::Roster(format!("fetch {url}: {e}")))?;
        if !resp.status().is_success() {
            return Err(PulseError::Roster(format!(
                "roster endpoint returned {}",
                resp.status()
            )));
        }
        resp.json::<Vec<RosterRow>>()
            .await
            .map_err(|e| PulseError::Roster(format!("decode roster body: {e}")))?
    } else {
        return Err(PulseError::Roster(
            "no roster source configured".to_string(),
        ));
    };

    info!(rows = rows.len(), "fetched roster rows");
    Ok(normalize(rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, level: &str, tier: Option<i64>) -> RosterRow {
        RosterRow {
            name: name.to_string(),
            org: "Testville".to_string(),
            level: level.to_string(),
            tier,
            position: Some("Hitter".to_string()),
            draft_class: None,
            x_handle: None,
            client: true,
        }
    }

    #[test]
    fn untracked_levels_are_filtered() {
        let rows = vec![
            row("A", "Pro", Some(1)),
            row("B", "High School", Some(1)),
            row("C", "NCAA", Some(2)),
        ];
        let athletes = normalize(rows);
        assert_eq!(athletes.len(), 2);
        assert_eq!(athletes[0].level, Level::Pro);
        assert_eq!(athletes[1].level, Level::Ncaa);
    }

    #[test]
    fn bad_tier_coerces_to_lowest_priority() {
        let athletes = normalize(vec![
            row("A", "Pro", Some(99)),
            row("B", "Pro", None),
            row("C", "Pro", Some(0)),
        ]);
        assert!(athletes.iter().all(|a| a.tier == 4));
    }

    #[test]
    fn pitcher_positions_map_to_role() {
        let mut r = row("A", "Pro", Some(1));
        r.position = Some("RHP".to_string());
        let athletes = normalize(vec![r]);
        assert_eq!(athletes[0].role, Role::Pitcher);
    }

    #[test]
    fn empty_names_are_dropped() {
        let athletes = normalize(vec![row("  ", "Pro", Some(1))]);
        assert!(athletes.is_empty());
    }
}

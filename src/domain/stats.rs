//! Canonical stat records.
//!
//! Every source adapter normalizes its own schema into these types; the rest
//! of the pipeline never sees a provider-specific shape. A record is either a
//! populated game line or an explicit unavailable marker, never a zeroed
//! line silently standing in for "no data".

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Pitching decision credited to the athlete for the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Win,
    Loss,
    Save,
    Hold,
    #[default]
    None,
}

impl Decision {
    /// Scoreline suffix ("W", "L", "SV", "HLD")
    pub fn abbrev(&self) -> Option<&'static str> {
        match self {
            Decision::Win => Some("W"),
            Decision::Loss => Some("L"),
            Decision::Save => Some("SV"),
            Decision::Hold => Some("HLD"),
            Decision::None => None,
        }
    }
}

/// Game state as reported by the source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Final,
    Live,
    Scheduled,
    Other(String),
}

impl GameStatus {
    pub fn as_str(&self) -> &str {
        match self {
            GameStatus::Final => "Final",
            GameStatus::Live => "Live",
            GameStatus::Scheduled => "Scheduled",
            GameStatus::Other(s) => s,
        }
    }

    /// Map a provider's free-form status string
    pub fn from_provider(status: &str) -> Self {
        match status {
            "Final" | "Game Over" | "Completed Early" => GameStatus::Final,
            "In Progress" | "Live" => GameStatus::Live,
            "Scheduled" | "Pre-Game" | "Warmup" => GameStatus::Scheduled,
            other => GameStatus::Other(other.to_string()),
        }
    }
}

/// One game's batting line
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BattingLine {
    pub at_bats: u32,
    pub hits: u32,
    pub home_runs: u32,
    pub rbi: u32,
    pub runs: u32,
    #[serde(default)]
    pub stolen_bases: u32,
    #[serde(default)]
    pub walks: u32,
    #[serde(default)]
    pub hit_by_pitch: u32,
    #[serde(default)]
    pub cycle: bool,
    #[serde(default)]
    pub first_career_home_run: bool,
}

impl BattingLine {
    /// Times on base from the components the source actually reported.
    /// Sources that omit walks/HBP undercount; that degrades the tier-gated
    /// on-base alert, never the grade.
    pub fn times_on_base(&self) -> u32 {
        self.hits + self.walks + self.hit_by_pitch
    }

    /// Hitless at-bats beyond any home runs; "0-for-4 or worse" means four of
    /// these with no non-homer hit to show for them.
    pub fn hitless_at_bats(&self) -> u32 {
        self.at_bats.saturating_sub(self.hits)
    }

    pub fn non_homer_hits(&self) -> u32 {
        self.hits.saturating_sub(self.home_runs)
    }
}

/// One game's pitching line. Innings are stored as outs recorded so partial
/// innings stay exact ("6.2 IP" = 20 outs).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PitchingLine {
    pub outs: u32,
    pub earned_runs: u32,
    pub strikeouts: u32,
    #[serde(default)]
    pub walks_allowed: u32,
    #[serde(default)]
    pub hits_allowed: u32,
    #[serde(default)]
    pub decision: Decision,
    #[serde(default)]
    pub no_hitter: bool,
    #[serde(default)]
    pub first_career_win: bool,
    #[serde(default)]
    pub first_career_save: bool,
}

impl PitchingLine {
    /// Parse a baseball innings string ("6.2" = 6 innings, 2 outs).
    /// Malformed values degrade to None rather than guessing.
    pub fn outs_from_innings(ip: &str) -> Option<u32> {
        let ip = ip.trim();
        if ip.is_empty() {
            return None;
        }
        let (whole, frac) = match ip.split_once('.') {
            Some((w, f)) => (w, f),
            None => (ip, "0"),
        };
        let whole: u32 = whole.parse().ok()?;
        let frac: u32 = frac.parse().ok()?;
        if frac > 2 {
            return None;
        }
        Some(whole * 3 + frac)
    }

    /// Render outs back to the conventional "6.2" form
    pub fn innings_display(&self) -> String {
        format!("{}.{}", self.outs / 3, self.outs % 3)
    }

    pub fn appeared(&self) -> bool {
        self.outs > 0
    }
}

/// Normalized per-game stat line for one athlete
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameLine {
    /// Date of the underlying game; anchors alert dedup keys
    pub date: NaiveDate,
    /// Human-readable scoreline ("BOS 5, TB 2 | Final")
    pub context: String,
    pub status: GameStatus,
    #[serde(default)]
    pub debut: bool,
    pub batting: Option<BattingLine>,
    pub pitching: Option<PitchingLine>,
    /// Pre-rendered summary ("2-4, HR, 3 RBI")
    pub summary: String,
}

impl GameLine {
    /// Build the conventional one-line batting summary
    pub fn batting_summary(line: &BattingLine) -> String {
        let mut parts = vec![format!("{}-{}", line.hits, line.at_bats)];
        if line.home_runs > 1 {
            parts.push(format!("{} HR", line.home_runs));
        } else if line.home_runs == 1 {
            parts.push("HR".to_string());
        }
        if line.rbi > 0 {
            parts.push(format!("{} RBI", line.rbi));
        }
        if line.runs > 0 {
            parts.push(format!("{} R", line.runs));
        }
        if line.stolen_bases > 0 {
            parts.push(format!("{} SB", line.stolen_bases));
        }
        parts.join(", ")
    }

    /// Build the conventional one-line pitching summary
    pub fn pitching_summary(line: &PitchingLine) -> String {
        let mut parts = vec![format!("{} IP", line.innings_display())];
        if line.hits_allowed > 0 {
            parts.push(format!("{} H", line.hits_allowed));
        }
        parts.push(format!("{} ER", line.earned_runs));
        parts.push(format!("{} K", line.strikeouts));
        if line.walks_allowed > 0 {
            parts.push(format!("{} BB", line.walks_allowed));
        }
        if let Some(abbrev) = line.decision.abbrev() {
            parts.push(abbrev.to_string());
        }
        parts.join(", ")
    }

    /// Fill in `summary` from whichever lines are present
    pub fn with_summary(mut self) -> Self {
        let mut parts = Vec::new();
        if let Some(b) = &self.batting {
            parts.push(Self::batting_summary(b));
        }
        if let Some(p) = &self.pitching {
            parts.push(Self::pitching_summary(p));
        }
        if !parts.is_empty() {
            self.summary = parts.join(" | ");
        }
        self
    }
}

/// Why an athlete's stats could not be resolved this run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailableReason {
    /// Authoritative provider had no game for the athlete today
    NoGameToday,
    /// Every adapter in the fallback chain came up empty or failed
    SourcesExhausted,
    /// The run-level deadline expired before this athlete resolved
    DeadlineExceeded,
}

impl UnavailableReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnavailableReason::NoGameToday => "no game today",
            UnavailableReason::SourcesExhausted => "sources exhausted",
            UnavailableReason::DeadlineExceeded => "run deadline exceeded",
        }
    }
}

impl std::fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The resolver's verdict for one athlete: a populated line, or an explicit
/// marker saying why there is none.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StatRecord {
    Line(GameLine),
    Unavailable(UnavailableReason),
}

impl StatRecord {
    pub fn line(&self) -> Option<&GameLine> {
        match self {
            StatRecord::Line(line) => Some(line),
            StatRecord::Unavailable(_) => None,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, StatRecord::Unavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn innings_parse_round_trip() {
        assert_eq!(PitchingLine::outs_from_innings("6.2"), Some(20));
        assert_eq!(PitchingLine::outs_from_innings("0.1"), Some(1));
        assert_eq!(PitchingLine::outs_from_innings("7"), Some(21));
        let line = PitchingLine {
            outs: 20,
            ..Default::default()
        };
        assert_eq!(line.innings_display(), "6.2");
    }

    #[test]
    fn innings_parse_rejects_garbage() {
        assert_eq!(PitchingLine::outs_from_innings("6.4"), None);
        assert_eq!(PitchingLine::outs_from_innings("abc"), None);
        assert_eq!(PitchingLine::outs_from_innings(""), None);
    }

    #[test]
    fn batting_summary_matches_convention() {
        let line = BattingLine {
            at_bats: 4,
            hits: 2,
            home_runs: 1,
            rbi: 3,
            runs: 1,
            ..Default::default()
        };
        assert_eq!(GameLine::batting_summary(&line), "2-4, HR, 3 RBI, 1 R");
    }

    #[test]
    fn pitching_summary_includes_decision() {
        let line = PitchingLine {
            outs: 18,
            earned_runs: 1,
            strikeouts: 6,
            hits_allowed: 4,
            decision: Decision::Win,
            ..Default::default()
        };
        assert_eq!(GameLine::pitching_summary(&line), "6.0 IP, 4 H, 1 ER, 6 K, W");
    }
}

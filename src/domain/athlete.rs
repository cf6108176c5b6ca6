use serde::{Deserialize, Serialize};

/// Competition level of a tracked athlete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Level {
    Pro,
    #[serde(rename = "NCAA")]
    Ncaa,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Pro => "Pro",
            Level::Ncaa => "NCAA",
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Playing role. Two-way athletes are graded on both paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Hitter,
    Pitcher,
    #[serde(rename = "Two-Way")]
    TwoWay,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Hitter => "Hitter",
            Role::Pitcher => "Pitcher",
            Role::TwoWay => "Two-Way",
        }
    }

    /// Parse a roster position string. Anything unrecognized is a hitter.
    pub fn from_position(position: &str) -> Self {
        match position.trim() {
            "Pitcher" | "P" | "RHP" | "LHP" => Role::Pitcher,
            "Two-Way" | "TWP" => Role::TwoWay,
            _ => Role::Hitter,
        }
    }

    pub fn bats(&self) -> bool {
        matches!(self, Role::Hitter | Role::TwoWay)
    }

    pub fn pitches(&self) -> bool {
        matches!(self, Role::Pitcher | Role::TwoWay)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A tracked athlete, immutable for the duration of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Athlete {
    /// Identity: exact name as it appears in provider indexes
    pub name: String,
    /// Organization (club or school)
    pub org: String,
    pub level: Level,
    /// Priority tier, 1 (highest) to 4
    pub tier: u8,
    pub role: Role,
    /// Represented client vs. merely-followed prospect; only clients alert
    pub client: bool,
    /// Position string as listed on the roster sheet
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub draft_class: String,
    #[serde(default)]
    pub x_handle: String,
}

impl Athlete {
    /// Label used in alert messages ("T1".."T4")
    pub fn tier_label(&self) -> String {
        format!("T{}", self.tier)
    }
}

//! Performance grades and the criteria that justify them.

use serde::{Deserialize, Serialize};

use super::athlete::Athlete;
use super::stats::StatRecord;

/// Overall performance grade for one game line. Precedence runs top-down;
/// a record gets exactly one grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceGrade {
    Milestone,
    Standout,
    Good,
    Routine,
    SoftFlag,
}

impl PerformanceGrade {
    /// Precedence rank, 0 highest. Lower rank wins when two-way paths merge.
    pub fn rank(&self) -> u8 {
        match self {
            PerformanceGrade::Milestone => 0,
            PerformanceGrade::Standout => 1,
            PerformanceGrade::Good => 2,
            PerformanceGrade::Routine => 3,
            PerformanceGrade::SoftFlag => 4,
        }
    }

    /// Pick the higher-precedence of two grades
    pub fn max_precedence(self, other: Self) -> Self {
        if other.rank() < self.rank() {
            other
        } else {
            self
        }
    }

    /// Dashboard-facing label with the conventional emoji prefix
    pub fn label(&self) -> &'static str {
        match self {
            PerformanceGrade::Milestone => "\u{1f48e} Milestone",
            PerformanceGrade::Standout => "\u{1f525} Standout",
            PerformanceGrade::Good => "\u{2705} Good",
            PerformanceGrade::Routine => "\u{1f610} Routine",
            PerformanceGrade::SoftFlag => "\u{1f6a9} Soft Flag",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PerformanceGrade::Milestone => "milestone",
            PerformanceGrade::Standout => "standout",
            PerformanceGrade::Good => "good",
            PerformanceGrade::Routine => "routine",
            PerformanceGrade::SoftFlag => "soft_flag",
        }
    }
}

impl std::fmt::Display for PerformanceGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Stable criterion identifiers. These appear in ledger keys and alert
/// payloads, so renaming one invalidates persisted dedup state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    // Milestones
    Debut,
    FirstHomeRun,
    Cycle,
    NoHitter,
    FirstWin,
    FirstSave,
    // Hitter
    HomeRun,
    ThreePlusHits,
    ThreePlusRbi,
    MultiHit,
    RunBattedIn,
    RunScored,
    BaseHit,
    HitlessGame,
    ThreePlusTimesOnBase,
    // Pitcher
    QualityStart,
    FivePlusStrikeouts,
    Save,
    ScorelessOuting,
    ShortOutingBlowup,
    Pitched,
}

impl Criterion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Criterion::Debut => "debut",
            Criterion::FirstHomeRun => "first_home_run",
            Criterion::Cycle => "cycle",
            Criterion::NoHitter => "no_hitter",
            Criterion::FirstWin => "first_win",
            Criterion::FirstSave => "first_save",
            Criterion::HomeRun => "home_run",
            Criterion::ThreePlusHits => "three_plus_hits",
            Criterion::ThreePlusRbi => "three_plus_rbi",
            Criterion::MultiHit => "multi_hit",
            Criterion::RunBattedIn => "run_batted_in",
            Criterion::RunScored => "run_scored",
            Criterion::BaseHit => "base_hit",
            Criterion::HitlessGame => "hitless_game",
            Criterion::ThreePlusTimesOnBase => "three_plus_times_on_base",
            Criterion::QualityStart => "quality_start",
            Criterion::FivePlusStrikeouts => "five_plus_strikeouts",
            Criterion::Save => "save",
            Criterion::ScorelessOuting => "scoreless_outing",
            Criterion::ShortOutingBlowup => "short_outing_blowup",
            Criterion::Pitched => "pitched",
        }
    }
}

impl std::fmt::Display for Criterion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A matched criterion plus the observable count backing it (1 for boolean
/// facts). The deduplicator compares counts across runs, so "2nd HR" is a
/// new fact while a re-fetched unchanged line is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriterionHit {
    pub criterion: Criterion,
    pub count: u32,
}

impl CriterionHit {
    pub fn new(criterion: Criterion, count: u32) -> Self {
        Self { criterion, count }
    }
}

/// One athlete's fully graded run output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradedRecord {
    pub athlete: Athlete,
    pub record: StatRecord,
    /// None when the record is Unavailable
    pub grade: Option<PerformanceGrade>,
    pub criteria: Vec<CriterionHit>,
}

impl GradedRecord {
    pub fn hit(&self, criterion: Criterion) -> Option<&CriterionHit> {
        self.criteria.iter().find(|h| h.criterion == criterion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_precedence_ordering() {
        assert!(PerformanceGrade::Milestone.rank() < PerformanceGrade::Standout.rank());
        assert!(PerformanceGrade::Standout.rank() < PerformanceGrade::Good.rank());
        assert!(PerformanceGrade::Good.rank() < PerformanceGrade::Routine.rank());
        assert!(PerformanceGrade::Routine.rank() < PerformanceGrade::SoftFlag.rank());
    }

    #[test]
    fn max_precedence_picks_higher() {
        assert_eq!(
            PerformanceGrade::SoftFlag.max_precedence(PerformanceGrade::Standout),
            PerformanceGrade::Standout
        );
        assert_eq!(
            PerformanceGrade::Good.max_precedence(PerformanceGrade::Good),
            PerformanceGrade::Good
        );
    }

    #[test]
    fn criterion_ids_are_stable() {
        assert_eq!(Criterion::HomeRun.as_str(), "home_run");
        assert_eq!(Criterion::FivePlusStrikeouts.as_str(), "five_plus_strikeouts");
        assert_eq!(Criterion::ThreePlusTimesOnBase.as_str(), "three_plus_times_on_base");
    }
}

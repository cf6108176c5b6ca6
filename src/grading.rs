//! Grading engine.
//!
//! Pure and deterministic: a canonical record plus a role in, one grade plus
//! every matched criterion out. Grade precedence is evaluated top-down and
//! the first matching category wins, but lower-precedence criteria stay in
//! the matched list: alerting keys off individual criteria, not the grade.

use crate::domain::{
    Athlete, BattingLine, CriterionHit, Decision, GameLine, GradedRecord, PerformanceGrade,
    PitchingLine, Role, StatRecord,
};
use crate::domain::Criterion::*;

/// Grade a resolved record. Unavailable records carry no grade and no
/// criteria; they surface in the snapshot as "no game data" only.
pub fn grade_record(athlete: Athlete, record: StatRecord) -> GradedRecord {
    let (grade, criteria) = match record.line() {
        Some(line) => {
            let (g, c) = grade_line(line, athlete.role);
            (Some(g), c)
        }
        None => (None, Vec::new()),
    };
    GradedRecord {
        athlete,
        record,
        grade,
        criteria,
    }
}

/// Grade one game line for the given role. Two-way athletes run both paths;
/// the higher-precedence grade wins and the criteria merge.
pub fn grade_line(line: &GameLine, role: Role) -> (PerformanceGrade, Vec<CriterionHit>) {
    let mut criteria = Vec::new();
    let mut grade: Option<PerformanceGrade> = None;

    if line.debut {
        criteria.push(CriterionHit::new(Debut, 1));
        grade = Some(PerformanceGrade::Milestone);
    }

    if role.bats() {
        if let Some(batting) = &line.batting {
            let path = grade_batting(batting, &mut criteria);
            grade = Some(grade.map_or(path, |g| g.max_precedence(path)));
        }
    }

    // Any pitching line is graded on the pitching path, whatever the roster
    // role says: a position player pressed into mop-up duty still "entered
    // the game" for alerting purposes.
    if let Some(pitching) = &line.pitching {
        if role.pitches() || pitching.appeared() {
            let path = grade_pitching(pitching, &mut criteria);
            grade = Some(grade.map_or(path, |g| g.max_precedence(path)));
        }
    }

    (grade.unwrap_or(PerformanceGrade::Routine), criteria)
}

fn grade_batting(b: &BattingLine, criteria: &mut Vec<CriterionHit>) -> PerformanceGrade {
    let mut milestone = false;
    let mut standout = false;
    let mut good = false;
    let mut soft_flag = false;

    if b.first_career_home_run && b.home_runs >= 1 {
        criteria.push(CriterionHit::new(FirstHomeRun, 1));
        milestone = true;
    }
    if b.cycle {
        criteria.push(CriterionHit::new(Cycle, 1));
        milestone = true;
    }

    if b.home_runs >= 1 {
        criteria.push(CriterionHit::new(HomeRun, b.home_runs));
        standout = true;
    }
    if b.hits >= 3 {
        criteria.push(CriterionHit::new(ThreePlusHits, b.hits));
        standout = true;
    }
    if b.rbi >= 3 {
        criteria.push(CriterionHit::new(ThreePlusRbi, b.rbi));
        standout = true;
    }

    if b.hits >= 2 {
        criteria.push(CriterionHit::new(MultiHit, b.hits));
        good = true;
    }
    if b.rbi >= 1 {
        criteria.push(CriterionHit::new(RunBattedIn, b.rbi));
        good = true;
    }
    if b.runs >= 1 {
        criteria.push(CriterionHit::new(RunScored, b.runs));
        good = true;
    }

    if b.hits >= 1 {
        criteria.push(CriterionHit::new(BaseHit, b.hits));
    }

    // "0-for-4 or worse": four hitless at-bats with nothing but (at most)
    // homers to show for the day
    if b.hitless_at_bats() >= 4 && b.non_homer_hits() == 0 {
        criteria.push(CriterionHit::new(HitlessGame, b.at_bats));
        soft_flag = true;
    }

    let tob = b.times_on_base();
    if tob >= 3 {
        criteria.push(CriterionHit::new(ThreePlusTimesOnBase, tob));
    }

    pick_grade(milestone, standout, good, soft_flag)
}

fn grade_pitching(p: &PitchingLine, criteria: &mut Vec<CriterionHit>) -> PerformanceGrade {
    let mut milestone = false;
    let mut standout = false;
    let mut good = false;
    let mut soft_flag = false;

    if p.no_hitter {
        criteria.push(CriterionHit::new(NoHitter, 1));
        milestone = true;
    }
    if p.decision == Decision::Win && p.first_career_win {
        criteria.push(CriterionHit::new(FirstWin, 1));
        milestone = true;
    }
    if p.decision == Decision::Save && p.first_career_save {
        criteria.push(CriterionHit::new(FirstSave, 1));
        milestone = true;
    }

    // Quality-start-equivalent: 6+ innings, 3 or fewer earned runs
    if p.outs >= 18 && p.earned_runs <= 3 {
        criteria.push(CriterionHit::new(QualityStart, p.outs));
        standout = true;
    }
    if p.strikeouts >= 5 {
        criteria.push(CriterionHit::new(FivePlusStrikeouts, p.strikeouts));
        standout = true;
    }
    if p.decision == Decision::Save {
        criteria.push(CriterionHit::new(Save, 1));
        standout = true;
    }

    // 3+ clean innings, not a single earned run
    if p.outs >= 9 && p.earned_runs == 0 {
        criteria.push(CriterionHit::new(ScorelessOuting, p.outs));
        good = true;
    }

    // Blowup in a short outing: 3+ earned runs in under 4 innings
    if p.earned_runs >= 3 && p.outs < 12 {
        criteria.push(CriterionHit::new(ShortOutingBlowup, p.earned_runs));
        soft_flag = true;
    }

    if p.appeared() {
        criteria.push(CriterionHit::new(Pitched, 1));
    }

    pick_grade(milestone, standout, good, soft_flag)
}

/// Top-down precedence. SoftFlag sits below Routine in precedence, so it
/// only becomes the grade when nothing above it matched.
fn pick_grade(milestone: bool, standout: bool, good: bool, soft_flag: bool) -> PerformanceGrade {
    if milestone {
        PerformanceGrade::Milestone
    } else if standout {
        PerformanceGrade::Standout
    } else if good {
        PerformanceGrade::Good
    } else if soft_flag {
        PerformanceGrade::SoftFlag
    } else {
        PerformanceGrade::Routine
    }
}

use clap::{Parser, Subcommand};

use crate::adapters::{FetchOutcome, FixtureSource, StatSource};
use crate::config::AppConfig;
use crate::domain::{Athlete, Level, Role};
use crate::error::{PulseError, Result};
use crate::grading::grade_line;

#[derive(Parser)]
#[command(name = "dugout")]
#[command(version = "0.1.0")]
#[command(about = "Athlete performance pulse and alerting pipeline", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config directory
    #[arg(short, long, default_value = "config")]
    pub config_dir: String,

    /// Log alerts instead of delivering them
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one polling cycle against the live sources
    Run,
    /// Run one polling cycle against the canned fixture lines (no network)
    Offline,
    /// Grade a single fixture athlete and print the result
    Grade {
        /// Athlete name as it appears in the fixture file
        name: String,
        /// Role to grade as (Hitter, Pitcher, Two-Way)
        #[arg(long, default_value = "Hitter")]
        role: String,
    },
}

/// Diagnostic: grade one canned line and show the matched criteria.
pub async fn grade_fixture_line(config: &AppConfig, name: &str, role: &str) -> Result<()> {
    let source = FixtureSource::from_file(&config.sources.fixture_path)?;
    let role = Role::from_position(role);
    let athlete = Athlete {
        name: name.to_string(),
        org: String::new(),
        level: Level::Pro,
        tier: 1,
        role,
        client: true,
        position: role.as_str().to_string(),
        draft_class: String::new(),
        x_handle: String::new(),
    };

    match source.fetch(&athlete).await {
        Ok(FetchOutcome::Found(line)) => {
            let (grade, criteria) = grade_line(&line, role);
            println!("{name} ({role})");
            println!("  line:  {}", line.summary);
            println!("  grade: {}", grade.label());
            for hit in criteria {
                println!("  match: {} (count {})", hit.criterion, hit.count);
            }
            Ok(())
        }
        Ok(FetchOutcome::NotFound) => Err(PulseError::Internal(format!(
            "no fixture line for '{name}' in {}",
            config.sources.fixture_path
        ))),
        Err(err) => Err(PulseError::Internal(format!("fixture fetch failed: {err}"))),
    }
}

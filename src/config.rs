use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub roster: RosterConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub alerts: AlertsConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the tracked-athlete roster comes from. Acquisition upstream of this
/// (the spreadsheet, the export job) is somebody else's problem; we consume
/// the published rows from a URL or a local file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RosterConfig {
    /// HTTP endpoint serving the roster rows as JSON
    #[serde(default)]
    pub url: Option<String>,
    /// Local file fallback (takes precedence when both are set)
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourcesConfig {
    /// Official pro stats API base URL
    #[serde(default = "default_mlb_base_url")]
    pub mlb_base_url: String,
    /// School name -> Sidearm stats feed URL
    #[serde(default)]
    pub sidearm: HashMap<String, String>,
    /// School name -> PrestoSports stats feed URL
    #[serde(default)]
    pub presto: HashMap<String, String>,
    /// School name -> StatBroadcast event feed URL
    #[serde(default)]
    pub statbroadcast: HashMap<String, String>,
    /// School name -> stats.ncaa.org box score feed URL
    #[serde(default)]
    pub ncaa_org: HashMap<String, String>,
    /// Canned game lines for offline runs
    #[serde(default = "default_fixture_path")]
    pub fixture_path: String,
}

fn default_mlb_base_url() -> String {
    "https://statsapi.mlb.com".to_string()
}

fn default_fixture_path() -> String {
    "data/fixture_lines.json".to_string()
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            mlb_base_url: default_mlb_base_url(),
            sidearm: HashMap::new(),
            presto: HashMap::new(),
            statbroadcast: HashMap::new(),
            ncaa_org: HashMap::new(),
            fixture_path: default_fixture_path(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlertsConfig {
    /// Slack incoming-webhook URL; unset means log-only delivery
    #[serde(default)]
    pub slack_webhook_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Snapshot document consumed by the dashboard
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: String,
    /// Persisted alert-dedup ledger
    #[serde(default = "default_ledger_path")]
    pub ledger_path: String,
}

fn default_snapshot_path() -> String {
    "data/current_pulse.json".to_string()
}

fn default_ledger_path() -> String {
    "data/alert_ledger.json".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
            ledger_path: default_ledger_path(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    /// Concurrent athlete resolutions in flight
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_fetches: usize,
    /// Timeout per adapter call in seconds
    #[serde(default = "default_source_timeout")]
    pub source_timeout_secs: u64,
    /// Deadline for the whole resolve phase in seconds; athletes still
    /// pending at the deadline are marked unavailable
    #[serde(default = "default_run_deadline")]
    pub run_deadline_secs: u64,
}

fn default_max_concurrent() -> usize {
    8
}

fn default_source_timeout() -> u64 {
    15
}

fn default_run_deadline() -> u64 {
    120
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: default_max_concurrent(),
            source_timeout_secs: default_source_timeout(),
            run_deadline_secs: default_run_deadline(),
        }
    }
}

impl RunConfig {
    pub fn source_timeout(&self) -> Duration {
        Duration::from_secs(self.source_timeout_secs)
    }

    pub fn run_deadline(&self) -> Duration {
        Duration::from_secs(self.run_deadline_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            .set_default("run.max_concurrent_fetches", 8)?
            .set_default("run.source_timeout_secs", 15)?
            .set_default("run.run_deadline_secs", 120)?
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("DUGOUT_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (DUGOUT_ROSTER__URL, etc.)
            .add_source(
                Environment::with_prefix("DUGOUT")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Validate configuration, collecting every problem instead of stopping
    /// at the first
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.roster.url.is_none() && self.roster.path.is_none() {
            errors.push("roster.url or roster.path must be set".to_string());
        }

        if self.run.max_concurrent_fetches == 0 {
            errors.push("run.max_concurrent_fetches must be at least 1".to_string());
        }

        if self.run.source_timeout_secs == 0 {
            errors.push("run.source_timeout_secs must be positive".to_string());
        }

        if self.run.run_deadline_secs < self.run.source_timeout_secs {
            errors.push(
                "run.run_deadline_secs should be at least run.source_timeout_secs".to_string(),
            );
        }

        if self.output.snapshot_path.is_empty() {
            errors.push("output.snapshot_path must not be empty".to_string());
        }

        if self.output.ledger_path.is_empty() {
            errors.push("output.ledger_path must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_config() -> AppConfig {
        AppConfig {
            roster: RosterConfig {
                url: None,
                path: Some("data/roster.json".to_string()),
            },
            sources: SourcesConfig::default(),
            alerts: AlertsConfig::default(),
            output: OutputConfig::default(),
            run: RunConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(minimal_config().validate().is_ok());
    }

    #[test]
    fn missing_roster_source_is_rejected() {
        let mut cfg = minimal_config();
        cfg.roster.path = None;
        let errors = cfg.validate().unwrap_err();
        assert!(errors.iter().any(|e| e.contains("roster")));
    }

    #[test]
    fn deadline_shorter_than_timeout_is_rejected() {
        let mut cfg = minimal_config();
        cfg.run.run_deadline_secs = 5;
        cfg.run.source_timeout_secs = 15;
        let errors = cfg.validate().unwrap_err();
        assert!(errors.iter().any(|e| e.contains("run_deadline_secs")));
    }
}

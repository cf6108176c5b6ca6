use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use dugout::adapters::{AlertSink, LogSink, SlackWebhook};
use dugout::cli::{self, Cli, Commands};
use dugout::config::{AppConfig, LoggingConfig};
use dugout::error::Result;
use dugout::pipeline::Pipeline;
use dugout::roster;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_from(&cli.config_dir)?;
    init_logging(&config.logging);

    if let Err(errors) = config.validate() {
        for problem in &errors {
            error!("config: {problem}");
        }
        anyhow::bail!("invalid configuration ({} problems)", errors.len());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_cycle(config, cli.dry_run, false).await?,
        Commands::Offline => run_cycle(config, true, true).await?,
        Commands::Grade { name, role } => cli::grade_fixture_line(&config, &name, &role).await?,
    }

    Ok(())
}

/// One polling cycle. A roster failure is the one condition that exits
/// non-zero so the external scheduler sees it; everything downstream
/// degrades per-athlete instead.
async fn run_cycle(config: AppConfig, dry_run: bool, offline: bool) -> Result<()> {
    let http = reqwest::Client::new();
    let athletes = roster::load(&config.roster, &http).await?;
    if athletes.is_empty() {
        return Err(dugout::error::PulseError::Roster(
            "roster loaded but no tracked athletes survived filtering".to_string(),
        ));
    }

    let sink = alert_sink(&config, dry_run);
    let resolver = if offline {
        info!("offline mode: serving fixture lines");
        Pipeline::offline_resolver(&config)
    } else {
        Pipeline::live_resolver(&config)?
    };

    Pipeline::new(config, resolver, sink).run(athletes).await?;
    Ok(())
}

fn alert_sink(config: &AppConfig, dry_run: bool) -> Arc<dyn AlertSink> {
    if dry_run {
        info!("dry run: alerts will be logged, not delivered");
        return Arc::new(LogSink);
    }
    if let Some(url) = &config.alerts.slack_webhook_url {
        return SlackWebhook::new(url.clone());
    }
    if let Some(sink) = SlackWebhook::from_env() {
        return sink;
    }
    info!("no Slack webhook configured, logging alerts instead");
    Arc::new(LogSink)
}

fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},dugout=debug", config.level)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    if config.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

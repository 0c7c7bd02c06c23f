use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use tracing::{error, info};

use daily_mirror::daily::{run_update_once, start_daily_updater, DailyUpdater, HttpFetcher, UpstreamApi};
use daily_mirror::web::{AppState, WebServer};
use daily_mirror::{
    ColumnFeedGenerator, Config, DailyService, Database, IngestionPipeline, MirrorError, Result,
};

/// Mirror a daily news feed and serve it back.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the read API and the periodic updater (default)
    Serve,
    /// Run one daily ingestion and column regeneration, then exit
    Update,
    /// Ingest the listing for one `date_before` (YYYYMMDD), then exit
    Ingest { date: String },
}

struct Components {
    pipeline: Arc<IngestionPipeline>,
    columns: Arc<ColumnFeedGenerator>,
}

async fn build(config: &Config) -> Result<Components> {
    let db = Database::open(&config.database.path).await?;
    let fetcher = Arc::new(HttpFetcher::new(&config.upstream)?);
    let api = UpstreamApi::from_config(&config.upstream);

    let pipeline = Arc::new(IngestionPipeline::new(db, fetcher.clone(), api));
    let columns = Arc::new(ColumnFeedGenerator::from_config(fetcher, config));

    Ok(Components { pipeline, columns })
}

async fn serve(config: Config) -> Result<()> {
    let Components { pipeline, columns } = build(&config).await?;

    if config.schedule.enabled {
        let updater = DailyUpdater::new(
            pipeline.clone(),
            columns.clone(),
            config.columns.names.clone(),
            &config.schedule,
        )?;
        start_daily_updater(updater);
    } else {
        info!("Periodic updates disabled");
    }

    let state = AppState::new(DailyService::new(pipeline), columns)
        .with_webhook_script(config.webhook.script.clone());
    WebServer::new(&config.server, state)?.run().await
}

async fn update(config: Config) -> Result<()> {
    let Components { pipeline, columns } = build(&config).await?;
    let tz: Tz = config
        .schedule
        .timezone
        .parse()
        .map_err(|_| MirrorError::Config(format!("unknown timezone: {}", config.schedule.timezone)))?;

    let outcome = run_update_once(&pipeline, &columns, &config.columns.names, &tz).await;
    if outcome.report.is_none() {
        return Err(MirrorError::Fetch(format!(
            "daily ingestion for {} failed",
            outcome.target
        )));
    }
    Ok(())
}

async fn ingest(config: Config, date: &str) -> Result<()> {
    let Components { pipeline, .. } = build(&config).await?;
    let report = pipeline.ingest(date).await?;
    info!(?report, "Ingestion finished");
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::load_with_env(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {}: {e}", cli.config.display());
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    // Initialize logging
    if let Err(e) = daily_mirror::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        daily_mirror::logging::init_console_only(&config.logging.level);
    }

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return ExitCode::FAILURE;
    }

    let result = match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            info!(
                "Daily mirror starting on {}:{}",
                config.server.host, config.server.port
            );
            serve(config).await
        }
        Command::Update => update(config).await,
        Command::Ingest { date } => ingest(config, &date).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults_to_serve() {
        let cli = Cli::parse_from(["daily-mirror"]);
        assert_eq!(cli.config, PathBuf::from("config.toml"));
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_ingest() {
        let cli = Cli::parse_from(["daily-mirror", "--config", "my.toml", "ingest", "20240102"]);
        assert_eq!(cli.config, PathBuf::from("my.toml"));
        assert!(matches!(cli.command, Some(Command::Ingest { date }) if date == "20240102"));
    }
}

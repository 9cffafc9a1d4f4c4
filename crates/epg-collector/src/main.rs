use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::info;
use tracing_subscriber::{Layer, layer::SubscriberExt, util::SubscriberInitExt};

use epg_collector::{
    config::{Config, LogFormat},
    database::{Database, repositories::SeaOrmCollectionStore},
    ingestor::{CollectionOrchestrator, SchedulerService},
    sources::HttpUpstreamSource,
    utils::url::UrlUtils,
    web::{AppState, WebServer},
};

#[derive(Parser)]
#[command(name = "epg-collector")]
#[command(version)]
#[command(about = "Collects a channel playlist and per-channel EPG into a database")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "CONFIG_FILE", default_value = "config.toml")]
    config: String,

    /// Listening IP address
    #[arg(short = 'H', long, value_name = "IP")]
    host: Option<String>,

    /// Listening port
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,

    /// Database URL (overrides config file)
    #[arg(short = 'd', long, value_name = "URL")]
    database_url: Option<String>,

    /// Log level (overrides config file)
    #[arg(short = 'v', long)]
    log_level: Option<String>,

    /// Log output format: json or pretty
    #[arg(long)]
    log_format: Option<LogFormat>,
}

fn init_tracing(level: &str, format: LogFormat) {
    let log_filter = if level == "trace" {
        format!("epg_collector={level},tower_http=trace")
    } else {
        format!("epg_collector={level}")
    };

    let fmt_layer = match format {
        LogFormat::Json => tracing_subscriber::fmt::layer().json().boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer().pretty().boxed(),
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(fmt_layer)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load_from_file(&cli.config)?;

    // Override config with CLI arguments
    if let Some(host) = cli.host {
        config.web.host = host;
    }
    if let Some(port) = cli.port {
        config.web.port = port;
    }
    if let Some(database_url) = cli.database_url {
        config.database.url = database_url;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }

    init_tracing(&config.logging.level, config.logging.format);
    info!("Starting EPG collector v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration loaded from: {}", cli.config);
    info!(
        "Using database: {}",
        UrlUtils::obfuscate_credentials(&config.database.url)
    );

    let database = Database::new(&config.database).await?;
    database.migrate().await?;
    info!("Database connection established and migrations applied");

    let store = Arc::new(SeaOrmCollectionStore::new(database.connection()));
    let source = Arc::new(HttpUpstreamSource::new(&config.upstream)?);
    let orchestrator = CollectionOrchestrator::new(source, store, &config.collection);

    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    let scheduler = SchedulerService::new(
        orchestrator.clone(),
        &config.collection,
        shutdown_tx.subscribe(),
    )?;

    let web_server = WebServer::new(&config.web, AppState::new(orchestrator.clone()))?;
    info!(
        "Starting web server on {}:{}",
        web_server.host(),
        web_server.port()
    );

    // Signals once the listener is bound or failed to bind
    let (server_ready_tx, server_ready_rx) = tokio::sync::oneshot::channel();
    let server_shutdown_rx = shutdown_tx.subscribe();
    let server_handle = tokio::spawn(async move {
        if let Err(e) = web_server
            .serve_with_shutdown(server_ready_tx, server_shutdown_rx)
            .await
        {
            tracing::error!("Web server failed: {}", e);
        }
    });

    match server_ready_rx.await {
        Ok(Ok(())) => {
            info!("Web server is now listening, starting background services...");
        }
        Ok(Err(bind_error)) => {
            tracing::error!("Failed to bind web server: {}", bind_error);
            return Err(bind_error);
        }
        Err(_) => {
            tracing::error!("Web server task completed without signaling");
            return Err(anyhow::anyhow!("Web server failed to start"));
        }
    }

    info!("Starting scheduler service");
    tokio::spawn(async move {
        if let Err(e) = scheduler.start().await {
            tracing::error!("Scheduler service failed: {}", e);
        }
    });

    if config.collection.run_on_startup {
        let bootstrap = orchestrator.clone();
        let tz_offset = config.collection.default_timezone;
        tokio::spawn(async move {
            match bootstrap.bootstrap(tz_offset).await {
                Ok(summary) => info!(
                    channels = summary.playlist.received,
                    channels_failed = summary.playlist.failed.len(),
                    programs_saved = summary.epg.programs_saved,
                    epg_failures = summary.epg.failure_count,
                    "Initial collection completed"
                ),
                Err(e) => tracing::error!("Initial collection failed: {}", e),
            }
        });
    }

    info!("All services started successfully");

    tokio::signal::ctrl_c().await?;
    info!("Received Ctrl+C, shutting down gracefully");
    let _ = shutdown_tx.send(());

    server_handle.await?;
    Ok(())
}

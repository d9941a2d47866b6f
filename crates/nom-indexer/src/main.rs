use anyhow::{Context, Result};
use clap::{Arg, Command};
use nom_indexer::config::{Config, LoggingConfig};
use nom_indexer::{db, CronIntervals, Indexer, NodeClient, SubscriptionTimings};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn init_logging(cfg: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.level.clone()));
    if cfg.format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn shutdown_signal() -> Result<&'static str> {
    let mut term = signal(SignalKind::terminate()).context("failed to install SIGTERM handler")?;
    tokio::select! {
        _ = tokio::signal::ctrl_c() => Ok("SIGINT"),
        _ = term.recv() => Ok("SIGTERM"),
    }
}

async fn run(cfg: Config) -> Result<()> {
    let pool = db::new_pool(&cfg.database).await?;
    db::run_migrations(&pool, &cfg.migrations_path).await?;

    let node = NodeClient::connect(&cfg.node.ws_url)
        .await
        .context("failed to connect to node")?;
    info!(node_url = %cfg.node.ws_url, "connected to node");

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        match shutdown_signal().await {
            Ok(sig) => info!(signal = sig, "received shutdown signal"),
            Err(e) => error!(error = %e, "signal handler failed"),
        }
        signal_cancel.cancel();
    });

    let indexer = Indexer::with_timings(
        Arc::new(node),
        pool.clone(),
        cancel.clone(),
        SubscriptionTimings::default(),
        CronIntervals::from_config(&cfg.cron),
    );
    let result = indexer.run().await;
    pool.close().await;

    match result {
        Ok(()) => {
            info!("indexer stopped gracefully");
            Ok(())
        }
        Err(e) if cancel.is_cancelled() => {
            info!(error = %e, "indexer stopped during shutdown");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let matches = Command::new("nom-indexer")
        .about("PostgreSQL indexer for the Network of Momentum")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("PATH")
                .help("Path to the configuration file"),
        )
        .get_matches();

    let cfg = match Config::load(matches.get_one::<String>("config").map(String::as_str)) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("failed to load configuration: {e:#}");
            return ExitCode::FAILURE;
        }
    };
    init_logging(&cfg.logging);
    info!(
        node_url = %cfg.node.ws_url,
        database = %cfg.database.host,
        "starting nom-indexer"
    );

    match run(cfg).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "indexer failed");
            ExitCode::FAILURE
        }
    }
}

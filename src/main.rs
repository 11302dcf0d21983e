//! sshpool - Bounded SSH Session Pool
//!
//! This is the main entry point for the sshpool keeper: it opens sessions to
//! the configured targets, keeps them pooled and re-validated, and closes
//! everything on shutdown.

use anyhow::{Context, Result};
use clap::Parser;
use sshpool::config::{load_config, TargetConfig};
use sshpool::pool::SessionPool;
use sshpool::ssh::{ConnectOptions, SshConnector};
use sshpool::SessionFactory;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// sshpool - keep a bounded pool of live SSH sessions
#[derive(Parser, Debug)]
#[command(name = "sshpool")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Enable JSON logging format
    #[arg(long)]
    json_log: bool,

    /// Seconds between target re-validation rounds
    #[arg(short, long, default_value_t = 60)]
    revalidate_interval: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging
    setup_logging(&args.log_level, args.json_log)?;

    // Load configuration
    let config = load_config(&args.config)?;

    info!("sshpool v{}", sshpool::VERSION);
    info!("Configuration loaded from: {:?}", args.config);
    info!("Targets: {}", config.targets.len());

    let targets = config
        .targets
        .iter()
        .map(|target| Ok((target.clone(), connect_options(target)?)))
        .collect::<Result<Vec<_>>>()?;

    let pool = SessionPool::new(config.pool.clone(), SshConnector::default());

    // Setup shutdown signal
    let (shutdown_tx, mut shutdown_rx) = broadcast::channel(1);

    // Handle Ctrl+C and termination signals (cross-platform)
    let shutdown_tx_clone = shutdown_tx.clone();
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            let mut sigterm = signal(SignalKind::terminate())
                .expect("Failed to setup SIGTERM handler");

            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("Received Ctrl+C, shutting down...");
                }
                _ = sigterm.recv() => {
                    info!("Received SIGTERM, shutting down...");
                }
            }
        }

        #[cfg(not(unix))]
        {
            // On Windows, only handle Ctrl+C
            let _ = tokio::signal::ctrl_c().await;
            info!("Received Ctrl+C, shutting down...");
        }

        let _ = shutdown_tx_clone.send(true);
    });

    warm_up(&pool, &targets).await;

    let interval = Duration::from_secs(args.revalidate_interval.max(1));
    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            _ = tokio::time::sleep(interval) => {
                revalidate(&pool, &targets).await;
            }
        }
    }

    pool.close().await;
    info!("sshpool stopped");
    Ok(())
}

/// Build connect options for a target
fn connect_options(target: &TargetConfig) -> Result<ConnectOptions> {
    let mut options = ConnectOptions::new().timeout(target.connect_timeout);

    if let Some(password) = &target.password {
        options = options.password(password.clone());
    }

    if let Some(path) = &target.private_key_file {
        let pem = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read private key: {:?}", path))?;
        options = options.private_key(pem, target.passphrase.clone().unwrap_or_default());
    }

    Ok(options)
}

/// Open the configured number of sessions per target and pool them
async fn warm_up(pool: &Arc<SessionPool<SshConnector>>, targets: &[(TargetConfig, ConnectOptions)]) {
    for (target, options) in targets {
        let identity = target.identity();
        let key = identity.key();

        for _ in 0..target.connections {
            let session = match pool.factory().construct(&identity, options).await {
                Ok(session) => session,
                Err(e) => {
                    warn!("Failed to open session to {}: {}", identity, e);
                    break;
                }
            };

            if let Err(rejected) = pool.put(&key, session).await {
                warn!("Pool refused session for {}: {}", key, rejected.reason());
                let _ = pool.factory().close(rejected.into_session()).await;
                break;
            }
        }
    }

    info!("Pool warmed up: {} sessions", pool.len().await);
}

/// Check out one session per target; each is checked back in on drop
async fn revalidate(pool: &Arc<SessionPool<SshConnector>>, targets: &[(TargetConfig, ConnectOptions)]) {
    for (target, options) in targets {
        let identity = target.identity();
        match pool.checkout(&identity, options).await {
            Ok(session) => info!(
                "{}: session alive for {:?}",
                identity,
                session.connected_for()
            ),
            Err(e) => warn!("{}: no usable session: {}", identity, e),
        }
    }

    let stats = pool.stats().snapshot();
    info!(
        "Pool: pooled={}, checked_out={}, created={}, expired={}, probe_failed={}",
        pool.len().await,
        stats.total_checked_out,
        stats.total_created,
        stats.total_expired,
        stats.total_probe_failed
    );
}

/// Setup logging based on configuration
fn setup_logging(level: &str, json: bool) -> Result<()> {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    if json {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .with_target(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }

    Ok(())
}

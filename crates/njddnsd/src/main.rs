// # njddnsd - Njalla DDNS Daemon
//
// This is a thin integration layer: all reconciliation logic lives in
// njddns-core. The daemon is responsible for:
// 1. Reading configuration from environment variables and the secret file
// 2. Initializing logging and the runtime
// 3. Wiring the echo-service resolver and the Njalla provider into the engine
// 4. Translating SIGTERM/SIGINT into an engine shutdown
//
// ## Configuration
//
// ### Required
// - `njalla_update_interval`: Seconds between reconciliation cycles
// - `njalla_update`: JSON list of records, e.g.
//   `{"update":[{"sub":"home","domain":"example.com"}]}`
//
// ### Secret
// - `DDNS_TOKEN_FILE`: File holding the Njalla API token
//   (default `/vault/secrets/api.txt`)
//
// ### Optional
// - `DDNS_LOG_LEVEL`: trace, debug, info (default), warn, error
// - `DDNS_MODE`: live (default) or dry-run
// - `DDNS_HTTP_TIMEOUT_SECS`: Per-request timeout (default 30)
// - `DDNS_PROVIDER_ENDPOINT`: Njalla JSON-RPC endpoint
// - `DDNS_IP_SOURCE_URLS`: Comma-separated echo services (at least two)
//
// ## Example
//
// ```bash
// echo -n "$NJALLA_TOKEN" > /vault/secrets/api.txt
// export njalla_update_interval=300
// export njalla_update='{"update":[{"sub":"home","domain":"example.com"}]}'
//
// njddnsd
// ```

mod config;

use anyhow::Result;
use config::Config;
use njddns_core::{DdnsEngine, EngineEvent};
use njddns_provider_njalla::NjallaProvider;
use std::process::ExitCode;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum DdnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {:#}", e);
        return DdnsExitCode::ConfigError.into();
    }

    // validate() has already checked the level name
    let log_level = config.log_level().unwrap_or(tracing::Level::INFO);
    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    info!("Starting njddnsd daemon");
    info!(
        "Configuration loaded: {} target(s), interval {}s, mode {}",
        config.targets.len(),
        config.interval_secs,
        config.mode
    );

    // A single task drives everything; no need for worker threads.
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        let (engine, events) = match build_engine(&config) {
            Ok(parts) => parts,
            Err(e) => {
                error!("Startup error: {:#}", e);
                return DdnsExitCode::ConfigError;
            }
        };

        if let Err(e) = run_daemon(engine, events).await {
            error!("Daemon error: {:#}", e);
            DdnsExitCode::RuntimeError
        } else {
            DdnsExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Wire the resolver and provider into an engine
fn build_engine(config: &Config) -> Result<(DdnsEngine, mpsc::Receiver<EngineEvent>)> {
    let resolver = njddns_ip_http::resolver_from_config(&config.ip_source_config())?;
    info!("Cross-checking {} IP source(s)", resolver.source_count());

    let provider = NjallaProvider::from_config(&config.provider_config())?;
    info!("Using Njalla endpoint {}", config.provider_endpoint);

    for target in &config.targets {
        info!("Managing record: {}", target);
    }

    Ok(DdnsEngine::new(
        resolver,
        Box::new(provider),
        config.ddns_config(),
    )?)
}

/// Run the engine until a shutdown signal arrives
async fn run_daemon(
    mut engine: DdnsEngine,
    mut events: mpsc::Receiver<EngineEvent>,
) -> Result<()> {
    let shutdown_rx = shutdown_on_signal()?;

    // The engine already logs what it does; keep the channel drained.
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            debug!("Engine event: {:?}", event);
        }
    });

    engine.run_with_shutdown(Some(shutdown_rx)).await?;

    info!("Shutting down daemon");
    Ok(())
}

/// Fire a oneshot on SIGTERM or SIGINT
///
/// Handlers are installed before returning so that a signal arriving
/// during the first cycle is not lost.
#[cfg(unix)]
fn shutdown_on_signal() -> Result<oneshot::Receiver<()>> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        let name = tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
        };
        info!("Received shutdown signal: {}", name);
        let _ = tx.send(());
    });

    Ok(rx)
}

/// Fire a oneshot on Ctrl-C
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
fn shutdown_on_signal() -> Result<oneshot::Receiver<()>> {
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received shutdown signal: SIGINT");
                let _ = tx.send(());
            }
            Err(e) => {
                error!("Failed to wait for CTRL-C: {}", e);
                // Keep the sender alive so the engine is not stopped.
                std::future::pending::<()>().await;
                drop(tx);
            }
        }
    });
    Ok(rx)
}

//! VIGIL daemon — entry point for running the attestation service.

mod config;
mod logging;
mod shutdown;

use clap::Parser;
use config::ServiceConfig;
use shutdown::ShutdownController;
use std::sync::Arc;
use std::time::Duration;
use vigil_attest::{AttestationEngine, CleanupSweeper};
use vigil_registry::{ClientRegistry, UsageLog};
use vigil_rpc::{AppState, RpcServer};
use vigil_types::SystemEntropy;

#[derive(Parser)]
#[command(name = "vigil-daemon", about = "VIGIL behavioral attestation service")]
struct Cli {
    /// Port the HTTP API listens on.
    #[arg(long, env = "VIGIL_PORT")]
    port: Option<u16>,

    /// Admin credential for the /admin surface. Empty disables it.
    #[arg(long, env = "VIGIL_ADMIN_TOKEN")]
    admin_token: Option<String>,

    /// Period of the expired-entry sweeper, in seconds.
    #[arg(long, env = "VIGIL_SWEEP_INTERVAL")]
    sweep_interval: Option<u64>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, default_value = "info", env = "VIGIL_LOG_LEVEL")]
    log_level: String,

    /// Log format: "human" or "json".
    #[arg(long, default_value = "human", env = "VIGIL_LOG_FORMAT")]
    log_format: String,

    /// Path to a TOML configuration file. If provided, file settings are
    /// used as the base; CLI flags and env vars override them.
    #[arg(long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match cli.config.as_deref() {
        Some(path) => {
            let cfg = ServiceConfig::from_toml_file(path)?;
            ServiceConfig {
                log_level: cli.log_level,
                log_format: cli.log_format,
                ..cfg
            }
        }
        None => ServiceConfig {
            log_level: cli.log_level,
            log_format: cli.log_format,
            ..ServiceConfig::default()
        },
    };
    if let Some(port) = cli.port {
        config.listen_port = port;
    }
    if let Some(token) = cli.admin_token {
        config.admin_token = token;
    }
    if let Some(interval) = cli.sweep_interval {
        config.sweep_interval_secs = interval;
    }

    logging::init_logging(&config.log_level, &config.log_format);

    if config.admin_token().is_none() {
        tracing::warn!("no admin token configured — admin API is disabled");
    }

    let entropy = Arc::new(SystemEntropy);
    let registry = Arc::new(ClientRegistry::new(entropy.clone()));
    let usage_log = Arc::new(UsageLog::new());
    let engine = Arc::new(AttestationEngine::new(
        registry,
        usage_log,
        entropy,
        config.params.clone(),
    ));

    let controller = Arc::new(ShutdownController::new());
    let signal_task = {
        let controller = Arc::clone(&controller);
        tokio::spawn(async move { controller.wait_for_signal().await })
    };

    let sweeper = CleanupSweeper::new(
        Arc::clone(engine.nonce_store()),
        Arc::clone(engine.session_store()),
        Duration::from_secs(config.sweep_interval_secs),
    );
    let sweeper_handle = sweeper.spawn(controller.subscribe());

    let state = AppState {
        engine,
        admin_token: config.admin_token(),
    };
    let server = RpcServer::new(config.listen_port);

    tracing::info!(
        port = config.listen_port,
        sweep_interval_secs = config.sweep_interval_secs,
        "starting VIGIL attestation service"
    );

    // The server drains in-flight requests and returns once the shutdown
    // broadcast fires (or on a bind/serve error).
    server.serve(state, controller.subscribe()).await?;

    // Make sure the sweeper is told to stop even if serve errored out
    controller.shutdown();
    sweeper_handle.await?;
    signal_task.abort();

    tracing::info!("VIGIL daemon exited cleanly");
    Ok(())
}

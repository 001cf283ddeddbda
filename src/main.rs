//! Main entry point for the tictac-room game service
//!
//! Starts the arena, the optional health server and the console transport,
//! then runs until stdin closes or a shutdown signal arrives.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tictac_room::config::AppConfig;
use tictac_room::service::{AppState, HealthCheck};
use tokio::io::BufReader;
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

/// Tic-tac-toe game service with bot play, matchmaking and a leaderboard
#[derive(Parser)]
#[command(
    name = "tictac-room",
    version,
    about = "Tic-tac-toe game service with bot play and matchmaking",
    long_about = "tictac-room runs tic-tac-toe sessions on 3x3 and 4x4 boards, either against \
                 a seeded bot or against another participant paired from a per-size queue. \
                 Commands are read from stdin, one per line; type 'help' for the list."
)]
struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Perform health check and exit
    #[arg(long, help = "Perform a health check and exit with status code")]
    health_check: bool,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Health port override
    #[arg(long, value_name = "PORT", help = "Override health and metrics server port")]
    health_port: Option<u16>,

    /// Bot seed override
    #[arg(long, value_name = "SEED", help = "Seed bot decisions for reproducible games")]
    bot_seed: Option<u64>,

    /// Disable the health server
    #[arg(long, help = "Do not serve the health and metrics endpoints")]
    no_health_server: bool,

    /// Enable debug mode
    #[arg(short, long, help = "Enable debug mode with verbose logging")]
    debug: bool,

    /// Dry run mode (validate config and exit)
    #[arg(
        long,
        help = "Validate configuration and exit without starting service"
    )]
    dry_run: bool,
}

/// Initialize structured logging with the configured level
///
/// Logs go to stderr so they do not interleave with console game output.
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Perform health check and return appropriate exit code
async fn perform_health_check(mut config: AppConfig) -> Result<()> {
    info!("Performing health check...");

    config.service.enable_health_server = false;
    let mut app_state = AppState::new(config).await?;
    app_state.start().await?;

    let health = HealthCheck::check(app_state.probe()).await;
    app_state.shutdown().await?;

    match health {
        Ok(health) => {
            println!("Health Check: {}", health.status);
            println!("  Active Sessions: {}", health.stats.active_sessions);
            println!("  Players Waiting: {}", health.stats.players_waiting);
            for check in &health.checks {
                println!("  {}: {}", check.name, check.status);
            }

            if health.status == tictac_room::service::HealthStatus::Healthy {
                std::process::exit(0);
            } else {
                std::process::exit(1);
            }
        }
        Err(e) => {
            error!("Health check failed: {}", e);
            std::process::exit(1);
        }
    }
}

/// Wait for shutdown signals (SIGINT, SIGTERM)
async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C) signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}

/// Display startup banner with service information
fn display_startup_banner(config: &AppConfig) {
    info!("🚀 tictac-room game service");
    info!("   Service: {}", config.service.name);
    info!("   Log level: {}", config.service.log_level);
    if config.service.enable_health_server {
        info!("   Health port: {}", config.service.health_port);
    } else {
        info!("   Health server: disabled");
    }
    info!("   Board sizes: {:?}", config.game.board_sizes);
    match config.game.bot_seed {
        Some(seed) => info!("   Bot seed: {}", seed),
        None => info!("   Bot seed: random"),
    }
    info!(
        "   Leaderboard: {} entries max, top {} shown",
        config.game.leaderboard_max_entries, config.game.leaderboard_limit
    );
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
}

/// Load and merge configuration from file/environment and CLI arguments
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    // Apply CLI overrides
    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    if let Some(health_port) = args.health_port {
        config.service.health_port = health_port;
    }

    if let Some(seed) = args.bot_seed {
        config.game.bot_seed = Some(seed);
    }

    if args.no_health_server {
        config.service.enable_health_server = false;
    }

    tictac_room::config::validate_config(&config)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });

    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    if args.health_check {
        return perform_health_check(config).await;
    }

    if args.dry_run {
        info!("Configuration validation successful");
        display_startup_banner(&config);
        info!("Dry run completed - exiting without starting service");
        return Ok(());
    }

    display_startup_banner(&config);

    info!("Initializing service components...");
    let mut app_state = match AppState::new(config.clone()).await {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    };

    info!("Starting service...");
    if let Err(e) = app_state.start().await {
        error!("Failed to start service: {}", e);
        std::process::exit(1);
    }

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let transport = app_state.console_transport();
    let mut console_task = tokio::spawn(async move {
        let stdin = BufReader::new(tokio::io::stdin());
        if let Err(e) = transport.run(stdin, shutdown_rx).await {
            error!("Console transport failed: {}", e);
        }
    });

    info!("✅ tictac-room is running");
    info!("Press Ctrl+C to shutdown gracefully...");

    tokio::select! {
        _ = wait_for_shutdown_signal() => {
            info!("🛑 Shutdown signal received, beginning graceful shutdown...");
            let _ = shutdown_tx.send(());
        }
        _ = &mut console_task => {
            info!("🛑 Console closed, beginning graceful shutdown...");
        }
    }

    let shutdown_timeout = config.shutdown_timeout();
    let shutdown = async {
        if !console_task.is_finished() {
            let _ = (&mut console_task).await;
        }
        app_state.shutdown().await
    };

    match tokio::time::timeout(shutdown_timeout, shutdown).await {
        Ok(Ok(())) => info!("✅ Graceful shutdown completed successfully"),
        Ok(Err(e)) => error!("Shutdown failed: {}", e),
        Err(_) => warn!("⚠️  Shutdown timeout exceeded, forcing exit"),
    }

    info!("🛑 tictac-room stopped");
    Ok(())
}

//! Main application state and service coordination
//!
//! This module contains the AppState that wires the arena, leaderboard,
//! transport and metrics together and owns the background tasks.

use crate::arena::ArenaManager;
use crate::config::AppConfig;
use crate::leaderboard::{InMemoryDirectory, InMemoryLeaderboard};
use crate::metrics::health::HealthServerConfig;
use crate::metrics::{HealthServer, MetricsCollector, MetricsService};
use crate::service::health::{HealthCheck, HealthStatus, ServiceProbe};
use crate::transport::{ConsoleNotifier, ConsoleTransport, GameService};
use anyhow::Result;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tracing::{debug, error, info, warn};

/// Service-level errors
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Service initialization error: {message}")]
    Initialization { message: String },

    #[error("Background task error: {message}")]
    BackgroundTask { message: String },
}

/// Main application state containing all service components
pub struct AppState {
    /// Application configuration
    config: AppConfig,

    /// Queues, registry and sessions
    arena: Arc<ArenaManager>,

    /// Command handlers shared by transports
    game_service: Arc<GameService>,

    /// Display names used for leaderboard credit
    directory: Arc<InMemoryDirectory>,

    /// Output side of the console transport
    notifier: Arc<ConsoleNotifier>,

    /// Metrics service for monitoring and health checks
    metrics_service: Arc<MetricsService>,

    /// Inputs for health checks
    probe: ServiceProbe,

    /// Background task handles
    background_tasks: Vec<JoinHandle<()>>,

    /// Service status
    is_running: Arc<RwLock<bool>>,
}

impl AppState {
    /// Initialize the application printing to stdout
    pub async fn new(config: AppConfig) -> Result<Self, ServiceError> {
        Self::with_notifier(config, Arc::new(ConsoleNotifier::stdout())).await
    }

    /// Initialize the application with a specific console notifier
    pub async fn with_notifier(
        config: AppConfig,
        notifier: Arc<ConsoleNotifier>,
    ) -> Result<Self, ServiceError> {
        info!("Initializing tictac-room game service");
        info!(
            "Configuration: service={}, board_sizes={:?}, bot_seed={:?}",
            config.service.name, config.game.board_sizes, config.game.bot_seed
        );

        crate::config::validate_config(&config).map_err(|e| ServiceError::Configuration {
            message: e.to_string(),
        })?;

        let metrics_collector =
            Arc::new(
                MetricsCollector::new().map_err(|e| ServiceError::Initialization {
                    message: format!("Failed to create metrics collector: {}", e),
                })?,
            );

        let arena = Arc::new(ArenaManager::with_metrics(
            config.game.board_sizes.clone(),
            config.game.bot_seed,
            metrics_collector.clone(),
        ));

        let directory = Arc::new(InMemoryDirectory::new());
        let leaderboard = Arc::new(InMemoryLeaderboard::new(
            config.game.leaderboard_max_entries,
        ));
        let game_service = Arc::new(
            GameService::new(
                arena.clone(),
                notifier.clone(),
                directory.clone(),
                leaderboard,
            )
            .with_leaderboard_limit(config.game.leaderboard_limit),
        );

        let is_running = Arc::new(RwLock::new(false));
        let probe = ServiceProbe::new(
            config.service.name.clone(),
            arena.clone(),
            is_running.clone(),
        );

        let metrics_service = Self::initialize_metrics(&config, metrics_collector, &probe);

        Ok(Self {
            config,
            arena,
            game_service,
            directory,
            notifier,
            metrics_service,
            probe,
            background_tasks: Vec::new(),
            is_running,
        })
    }

    /// Start the health server and background tasks
    pub async fn start(&mut self) -> Result<(), ServiceError> {
        info!("Starting tictac-room game service");

        *self.is_running.write().await = true;

        if self.config.service.enable_health_server {
            self.start_metrics_service().await?;
        } else {
            info!("Health server disabled - skipping metrics endpoints");
        }

        self.start_background_tasks();

        info!("✅ tictac-room game service started successfully");
        Ok(())
    }

    /// Perform graceful shutdown
    pub async fn shutdown(&mut self) -> Result<(), ServiceError> {
        info!("Starting graceful shutdown of tictac-room service");

        *self.is_running.write().await = false;

        if self.config.service.enable_health_server {
            info!("Stopping metrics service...");
            if let Err(e) = self.metrics_service.stop().await {
                warn!("Failed to stop metrics service: {}", e);
            } else {
                info!("✅ Metrics service stopped");
            }
        }

        self.stop_background_tasks().await;

        let final_stats = self
            .arena
            .stats()
            .map_err(|e| ServiceError::BackgroundTask {
                message: format!("Failed to get final stats: {}", e),
            })?;

        info!("Final service statistics: {:?}", final_stats);
        info!("✅ tictac-room service shutdown completed");

        Ok(())
    }

    /// Get service configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Check if service is running
    pub async fn is_running(&self) -> bool {
        *self.is_running.read().await
    }

    pub fn arena(&self) -> Arc<ArenaManager> {
        self.arena.clone()
    }

    pub fn game_service(&self) -> Arc<GameService> {
        self.game_service.clone()
    }

    pub fn metrics_service(&self) -> Arc<MetricsService> {
        self.metrics_service.clone()
    }

    pub fn probe(&self) -> &ServiceProbe {
        &self.probe
    }

    /// Build a console transport reading commands for this service
    pub fn console_transport(&self) -> ConsoleTransport {
        ConsoleTransport::new(
            self.game_service.clone(),
            self.directory.clone(),
            self.notifier.clone(),
        )
    }

    fn initialize_metrics(
        config: &AppConfig,
        metrics_collector: Arc<MetricsCollector>,
        probe: &ServiceProbe,
    ) -> Arc<MetricsService> {
        let health_config = HealthServerConfig {
            port: config.service.health_port,
            host: "0.0.0.0".to_string(),
        };

        let health_server = Arc::new(
            HealthServer::new(health_config, metrics_collector.clone()).with_probe(probe.clone()),
        );

        Arc::new(MetricsService::new(metrics_collector, health_server))
    }

    async fn start_metrics_service(&mut self) -> Result<(), ServiceError> {
        info!("Starting metrics and health endpoints");

        let metrics_service = self.metrics_service.clone();
        let port = self.config.service.health_port;

        let metrics_handle = tokio::spawn(async move {
            if let Err(e) = metrics_service.start().await {
                error!("Metrics service failed: {}", e);
            } else {
                info!("Metrics service task completed");
            }
        });

        self.background_tasks.push(metrics_handle);

        // Give the server a moment to start up
        tokio::time::sleep(Duration::from_millis(100)).await;

        info!("✅ Metrics service started on port {}", port);
        Ok(())
    }

    fn start_background_tasks(&mut self) {
        info!("Starting health metrics task (60s interval)...");

        let health_metrics_task = {
            let metrics_collector = self.metrics_service.collector();
            let probe = self.probe.clone();
            let is_running = self.is_running.clone();

            tokio::spawn(async move {
                let mut interval = tokio::time::interval(Duration::from_secs(60));
                info!("Health metrics task started");

                while *is_running.read().await {
                    interval.tick().await;

                    metrics_collector.update_uptime(Duration::from_secs(probe.uptime_seconds()));

                    let status = match HealthCheck::check(&probe).await {
                        Ok(health) => {
                            debug!(
                                "Health metrics - sessions: {}, waiting: {}, moves: {}",
                                health.stats.active_sessions,
                                health.stats.players_waiting,
                                health.stats.moves_applied
                            );
                            health.status
                        }
                        Err(e) => {
                            warn!("Health check failed in background task: {}", e);
                            HealthStatus::Unhealthy
                        }
                    };
                    metrics_collector.update_health_status(status.gauge_value());
                }

                info!("Health metrics task stopped");
            })
        };

        self.background_tasks.push(health_metrics_task);
        info!(
            "{} background tasks running",
            self.background_tasks.len()
        );
    }

    async fn stop_background_tasks(&mut self) {
        let task_count = self.background_tasks.len();
        if task_count == 0 {
            info!("No background tasks to stop");
            return;
        }

        info!("Stopping {} background tasks...", task_count);

        for (i, task) in self.background_tasks.drain(..).enumerate() {
            debug!("Aborting background task {}/{}", i + 1, task_count);
            task.abort();
        }

        info!("✅ All {} background tasks stopped", task_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OpponentPreference;

    fn quiet_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.service.enable_health_server = false;
        config.game.bot_seed = Some(3);
        config
    }

    #[tokio::test]
    async fn test_start_and_shutdown() {
        let notifier = Arc::new(ConsoleNotifier::with_writer(tokio::io::sink()));
        let mut app = AppState::with_notifier(quiet_config(), notifier)
            .await
            .unwrap();
        assert!(!app.is_running().await);

        app.start().await.unwrap();
        assert!(app.is_running().await);
        assert_eq!(
            HealthCheck::liveness_check(app.probe()).await.unwrap(),
            HealthStatus::Healthy
        );

        app.arena()
            .request_match(1, 4, OpponentPreference::Human)
            .unwrap();

        app.shutdown().await.unwrap();
        assert!(!app.is_running().await);
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let mut config = quiet_config();
        config.game.board_sizes = vec![7];

        let result = AppState::new(config).await;
        assert!(matches!(result, Err(ServiceError::Configuration { .. })));
    }

    #[tokio::test]
    async fn test_configured_sizes_reach_arena() {
        let mut config = quiet_config();
        config.game.board_sizes = vec![4];
        let app = AppState::new(config).await.unwrap();

        assert_eq!(app.arena().allowed_sizes(), &[4]);
        assert!(app
            .arena()
            .request_match(1, 3, OpponentPreference::Human)
            .is_err());
    }
}

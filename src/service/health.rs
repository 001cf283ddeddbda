//! Health check endpoints and monitoring
//!
//! This module provides health check functionality for the tictac-room
//! service, including readiness and liveness probes.

use crate::arena::ArenaManager;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::{debug, error};

/// Health check status
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    /// Gauge value reported to Prometheus
    pub fn gauge_value(&self) -> u8 {
        match self {
            HealthStatus::Healthy => 2,
            HealthStatus::Degraded => 1,
            HealthStatus::Unhealthy => 0,
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "✅ healthy"),
            HealthStatus::Degraded => write!(f, "⚠️  degraded"),
            HealthStatus::Unhealthy => write!(f, "❌ unhealthy"),
        }
    }
}

/// Everything a health check needs to look at
#[derive(Clone)]
pub struct ServiceProbe {
    service_name: String,
    arena: Arc<ArenaManager>,
    is_running: Arc<RwLock<bool>>,
    started_at: Instant,
}

impl ServiceProbe {
    pub fn new(
        service_name: impl Into<String>,
        arena: Arc<ArenaManager>,
        is_running: Arc<RwLock<bool>>,
    ) -> Self {
        Self {
            service_name: service_name.into(),
            arena,
            is_running,
            started_at: Instant::now(),
        }
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn arena(&self) -> Arc<ArenaManager> {
        self.arena.clone()
    }

    pub async fn is_running(&self) -> bool {
        *self.is_running.read().await
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheck {
    /// Overall service status
    pub status: HealthStatus,
    /// Service name
    pub service: String,
    /// Service version
    pub version: String,
    /// Current timestamp
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Detailed component checks
    pub checks: Vec<ComponentCheck>,
    /// Service statistics
    pub stats: ServiceStats,
}

/// Individual component health check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentCheck {
    /// Component name
    pub name: String,
    /// Component status
    pub status: HealthStatus,
    /// Optional error message if unhealthy
    pub message: Option<String>,
    /// Check duration in milliseconds
    pub duration_ms: u64,
}

/// Service statistics for health reporting
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceStats {
    /// Sessions currently being played
    pub active_sessions: usize,
    /// Participants waiting in any queue
    pub players_waiting: usize,
    /// Sessions created since service start
    pub sessions_created: u64,
    /// Moves applied since service start
    pub moves_applied: u64,
    /// Games that ended with a line
    pub games_won: u64,
    /// Full boards that were cleared
    pub draw_resets: u64,
    /// Seconds since the probe was created
    pub uptime_seconds: u64,
}

impl HealthCheck {
    /// Perform a comprehensive health check of the service
    pub async fn check(probe: &ServiceProbe) -> Result<Self> {
        let mut checks = Vec::new();
        let mut overall_status = HealthStatus::Healthy;

        // Check if service is running
        let service_check = Self::check_service_running(probe).await;
        if service_check.status != HealthStatus::Healthy {
            overall_status = HealthStatus::Unhealthy;
        }
        checks.push(service_check);

        // Check arena
        let arena_check = Self::check_arena(probe);
        if arena_check.status == HealthStatus::Unhealthy {
            overall_status = HealthStatus::Unhealthy;
        } else if arena_check.status == HealthStatus::Degraded
            && overall_status == HealthStatus::Healthy
        {
            overall_status = HealthStatus::Degraded;
        }
        checks.push(arena_check);

        let stats = Self::gather_service_stats(probe);

        Ok(HealthCheck {
            status: overall_status,
            service: probe.service_name().to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: chrono::Utc::now(),
            checks,
            stats,
        })
    }

    /// Simple liveness check - just verify service is running
    pub async fn liveness_check(probe: &ServiceProbe) -> Result<HealthStatus> {
        if probe.is_running().await {
            Ok(HealthStatus::Healthy)
        } else {
            Ok(HealthStatus::Unhealthy)
        }
    }

    /// Readiness check - verify service can handle commands
    pub async fn readiness_check(probe: &ServiceProbe) -> Result<HealthStatus> {
        if !probe.is_running().await {
            return Ok(HealthStatus::Unhealthy);
        }

        Ok(Self::check_arena(probe).status)
    }

    async fn check_service_running(probe: &ServiceProbe) -> ComponentCheck {
        let start = Instant::now();

        let (status, message) = if probe.is_running().await {
            (HealthStatus::Healthy, None)
        } else {
            (
                HealthStatus::Unhealthy,
                Some("Service is not running".to_string()),
            )
        };

        ComponentCheck {
            name: "service_running".to_string(),
            status,
            message,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }

    /// A poisoned lock makes the arena unusable
    fn check_arena(probe: &ServiceProbe) -> ComponentCheck {
        let start = Instant::now();

        let (status, message) = match probe.arena().stats() {
            Ok(_) => (HealthStatus::Healthy, None),
            Err(e) => {
                error!("Arena stats check failed: {}", e);
                (
                    HealthStatus::Unhealthy,
                    Some(format!("Stats check failed: {}", e)),
                )
            }
        };

        ComponentCheck {
            name: "arena".to_string(),
            status,
            message,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }

    fn gather_service_stats(probe: &ServiceProbe) -> ServiceStats {
        match probe.arena().stats() {
            Ok(stats) => ServiceStats {
                active_sessions: stats.active_sessions,
                players_waiting: stats.players_waiting.iter().map(|(_, n)| n).sum(),
                sessions_created: stats.sessions_created,
                moves_applied: stats.moves_applied,
                games_won: stats.games_won,
                draw_resets: stats.draw_resets,
                uptime_seconds: probe.uptime_seconds(),
            },
            Err(e) => {
                debug!("Failed to get arena stats for health check: {}", e);
                ServiceStats {
                    uptime_seconds: probe.uptime_seconds(),
                    ..ServiceStats::default()
                }
            }
        }
    }
}

/// Convert health check to JSON string
impl HealthCheck {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| anyhow::anyhow!("Failed to serialize health check: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OpponentPreference;

    fn probe(running: bool) -> ServiceProbe {
        ServiceProbe::new(
            "tictac-room",
            Arc::new(ArenaManager::new(vec![3, 4], Some(1))),
            Arc::new(RwLock::new(running)),
        )
    }

    #[tokio::test]
    async fn test_running_service_is_healthy() {
        let probe = probe(true);
        probe
            .arena()
            .request_match(1, 3, OpponentPreference::Human)
            .unwrap();

        let health = HealthCheck::check(&probe).await.unwrap();
        assert_eq!(health.status, HealthStatus::Healthy);
        assert_eq!(health.service, "tictac-room");
        assert_eq!(health.stats.players_waiting, 1);
        assert_eq!(health.checks.len(), 2);

        assert_eq!(
            HealthCheck::readiness_check(&probe).await.unwrap(),
            HealthStatus::Healthy
        );
        assert!(health.to_json().unwrap().contains("\"healthy\""));
    }

    #[tokio::test]
    async fn test_stopped_service_is_unhealthy() {
        let probe = probe(false);

        let health = HealthCheck::check(&probe).await.unwrap();
        assert_eq!(health.status, HealthStatus::Unhealthy);
        assert_eq!(
            HealthCheck::liveness_check(&probe).await.unwrap(),
            HealthStatus::Unhealthy
        );
        assert_eq!(
            HealthCheck::readiness_check(&probe).await.unwrap(),
            HealthStatus::Unhealthy
        );
    }

    #[test]
    fn test_gauge_values() {
        assert_eq!(HealthStatus::Healthy.gauge_value(), 2);
        assert_eq!(HealthStatus::Degraded.gauge_value(), 1);
        assert_eq!(HealthStatus::Unhealthy.gauge_value(), 0);
    }
}

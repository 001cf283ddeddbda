//! Metrics collection using Prometheus
//!
//! This module provides metrics collection for the tictac-room game service
//! using Prometheus metrics.

use crate::types::{GameMode, RejectReason};
use anyhow::Result;
use prometheus::{
    Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, IntGaugeVec, Opts, Registry,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Why a session left the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEndReason {
    Won,
    Surrender,
    Exit,
}

impl SessionEndReason {
    fn as_str(&self) -> &'static str {
        match self {
            SessionEndReason::Won => "won",
            SessionEndReason::Surrender => "surrender",
            SessionEndReason::Exit => "exit",
        }
    }
}

/// Who played a move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveActor {
    Human,
    Bot,
}

/// Main metrics collector for the game service
#[derive(Clone)]
pub struct MetricsCollector {
    /// Prometheus registry
    registry: Arc<Registry>,

    /// Service-level metrics
    service_metrics: ServiceMetrics,

    /// Queue-related metrics
    queue_metrics: QueueMetrics,

    /// Session-related metrics
    session_metrics: SessionMetrics,

    /// Performance metrics
    performance_metrics: PerformanceMetrics,
}

/// Service-level metrics
#[derive(Clone)]
pub struct ServiceMetrics {
    /// Service uptime in seconds
    pub uptime_seconds: IntGauge,

    /// Transport commands handled
    pub commands_total: IntCounterVec,

    /// Health check status (0=unhealthy, 1=degraded, 2=healthy)
    pub health_status: IntGauge,
}

/// Matchmaking queue metrics
#[derive(Clone)]
pub struct QueueMetrics {
    /// Participants currently waiting per board size
    pub players_waiting: IntGaugeVec,

    /// Total queue joins per board size
    pub queue_joins_total: IntCounterVec,

    /// Total voluntary queue exits per board size
    pub queue_exits_total: IntCounterVec,

    /// Total successful pairings per board size
    pub pairings_total: IntCounterVec,
}

/// Game session metrics
#[derive(Clone)]
pub struct SessionMetrics {
    /// Live sessions
    pub active_sessions: IntGauge,

    /// Sessions created by mode and size
    pub sessions_started_total: IntCounterVec,

    /// Sessions ended by reason
    pub sessions_ended_total: IntCounterVec,

    /// Applied moves by actor
    pub moves_total: IntCounterVec,

    /// Rejected moves by reason
    pub rejected_moves_total: IntCounterVec,

    /// Boards cleared after a draw
    pub draw_resets_total: IntCounter,
}

/// Performance metrics
#[derive(Clone)]
pub struct PerformanceMetrics {
    /// Move submission processing time
    pub move_processing_duration: Histogram,

    /// Match request processing time
    pub match_request_duration: Histogram,
}

impl MetricsCollector {
    /// Create a new metrics collector with default registry
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());
        Self::with_registry(registry)
    }

    /// Create a new metrics collector with custom registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let service_metrics = ServiceMetrics::new(&registry)?;
        let queue_metrics = QueueMetrics::new(&registry)?;
        let session_metrics = SessionMetrics::new(&registry)?;
        let performance_metrics = PerformanceMetrics::new(&registry)?;

        Ok(Self {
            registry,
            service_metrics,
            queue_metrics,
            session_metrics,
            performance_metrics,
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    pub fn service(&self) -> &ServiceMetrics {
        &self.service_metrics
    }

    pub fn queue(&self) -> &QueueMetrics {
        &self.queue_metrics
    }

    pub fn session(&self) -> &SessionMetrics {
        &self.session_metrics
    }

    pub fn performance(&self) -> &PerformanceMetrics {
        &self.performance_metrics
    }

    /// Record a participant joining a size bucket
    pub fn record_queue_join(&self, size: usize) {
        self.queue_metrics
            .queue_joins_total
            .with_label_values(&[&size.to_string()])
            .inc();
    }

    /// Record a participant leaving a size bucket voluntarily
    pub fn record_queue_exit(&self, size: usize) {
        self.queue_metrics
            .queue_exits_total
            .with_label_values(&[&size.to_string()])
            .inc();
    }

    /// Record two participants being paired
    pub fn record_pairing(&self, size: usize) {
        self.queue_metrics
            .pairings_total
            .with_label_values(&[&size.to_string()])
            .inc();
    }

    /// Set the current waiting count for a bucket
    pub fn update_players_waiting(&self, size: usize, waiting: usize) {
        self.queue_metrics
            .players_waiting
            .with_label_values(&[&size.to_string()])
            .set(waiting as i64);
    }

    /// Record a session being created
    pub fn record_session_started(&self, mode: GameMode, size: usize) {
        self.session_metrics
            .sessions_started_total
            .with_label_values(&[&mode.to_string(), &size.to_string()])
            .inc();
    }

    /// Record a session leaving the registry
    pub fn record_session_ended(&self, reason: SessionEndReason) {
        self.session_metrics
            .sessions_ended_total
            .with_label_values(&[reason.as_str()])
            .inc();
    }

    pub fn update_active_sessions(&self, active: usize) {
        self.session_metrics.active_sessions.set(active as i64);
    }

    /// Record an applied move
    pub fn record_move(&self, actor: MoveActor) {
        let actor_str = match actor {
            MoveActor::Human => "human",
            MoveActor::Bot => "bot",
        };

        self.session_metrics
            .moves_total
            .with_label_values(&[actor_str])
            .inc();
    }

    /// Record a rejected move
    pub fn record_rejected_move(&self, reason: RejectReason) {
        self.session_metrics
            .rejected_moves_total
            .with_label_values(&[reason.as_str()])
            .inc();
    }

    pub fn record_draw_reset(&self) {
        self.session_metrics.draw_resets_total.inc();
    }

    /// Record move submission duration
    pub fn record_move_processing(&self, duration: Duration) {
        self.performance_metrics
            .move_processing_duration
            .observe(duration.as_secs_f64());
    }

    /// Record match request duration
    pub fn record_match_request(&self, duration: Duration) {
        self.performance_metrics
            .match_request_duration
            .observe(duration.as_secs_f64());
    }

    /// Record a transport command
    pub fn record_command(&self, command: &str) {
        self.service_metrics
            .commands_total
            .with_label_values(&[command])
            .inc();
    }

    /// Update health status
    pub fn update_health_status(&self, status: u8) {
        self.service_metrics.health_status.set(status as i64);
    }

    /// Update service uptime
    pub fn update_uptime(&self, uptime: Duration) {
        self.service_metrics
            .uptime_seconds
            .set(uptime.as_secs() as i64);
    }

    /// Create a timer for measuring operation duration
    pub fn start_timer(&self) -> MetricsTimer {
        MetricsTimer::new()
    }
}

/// Timer for measuring operation durations
pub struct MetricsTimer {
    start: Instant,
}

impl MetricsTimer {
    fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get the elapsed duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stop the timer and return the duration
    pub fn stop(self) -> Duration {
        self.elapsed()
    }
}

impl ServiceMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let uptime_seconds =
            IntGauge::new("tictac_room_uptime_seconds", "Service uptime in seconds")?;
        registry.register(Box::new(uptime_seconds.clone()))?;

        let commands_total = IntCounterVec::new(
            Opts::new("tictac_room_commands_total", "Transport commands handled"),
            &["command"],
        )?;
        registry.register(Box::new(commands_total.clone()))?;

        let health_status = IntGauge::new(
            "tictac_room_health_status",
            "Health status (0=unhealthy, 1=degraded, 2=healthy)",
        )?;
        registry.register(Box::new(health_status.clone()))?;

        Ok(Self {
            uptime_seconds,
            commands_total,
            health_status,
        })
    }
}

impl QueueMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let players_waiting = IntGaugeVec::new(
            Opts::new(
                "tictac_room_players_waiting",
                "Participants currently waiting in queue",
            ),
            &["size"],
        )?;
        registry.register(Box::new(players_waiting.clone()))?;

        let queue_joins_total = IntCounterVec::new(
            Opts::new("tictac_room_queue_joins_total", "Total queue joins"),
            &["size"],
        )?;
        registry.register(Box::new(queue_joins_total.clone()))?;

        let queue_exits_total = IntCounterVec::new(
            Opts::new("tictac_room_queue_exits_total", "Total voluntary queue exits"),
            &["size"],
        )?;
        registry.register(Box::new(queue_exits_total.clone()))?;

        let pairings_total = IntCounterVec::new(
            Opts::new("tictac_room_pairings_total", "Total participants paired"),
            &["size"],
        )?;
        registry.register(Box::new(pairings_total.clone()))?;

        Ok(Self {
            players_waiting,
            queue_joins_total,
            queue_exits_total,
            pairings_total,
        })
    }
}

impl SessionMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let active_sessions =
            IntGauge::new("tictac_room_active_sessions", "Number of live sessions")?;
        registry.register(Box::new(active_sessions.clone()))?;

        let sessions_started_total = IntCounterVec::new(
            Opts::new("tictac_room_sessions_started_total", "Total sessions created"),
            &["mode", "size"],
        )?;
        registry.register(Box::new(sessions_started_total.clone()))?;

        let sessions_ended_total = IntCounterVec::new(
            Opts::new("tictac_room_sessions_ended_total", "Total sessions ended"),
            &["reason"],
        )?;
        registry.register(Box::new(sessions_ended_total.clone()))?;

        let moves_total = IntCounterVec::new(
            Opts::new("tictac_room_moves_total", "Total moves applied"),
            &["actor"],
        )?;
        registry.register(Box::new(moves_total.clone()))?;

        let rejected_moves_total = IntCounterVec::new(
            Opts::new("tictac_room_rejected_moves_total", "Total moves rejected"),
            &["reason"],
        )?;
        registry.register(Box::new(rejected_moves_total.clone()))?;

        let draw_resets_total = IntCounter::new(
            "tictac_room_draw_resets_total",
            "Total boards cleared after a draw",
        )?;
        registry.register(Box::new(draw_resets_total.clone()))?;

        Ok(Self {
            active_sessions,
            sessions_started_total,
            sessions_ended_total,
            moves_total,
            rejected_moves_total,
            draw_resets_total,
        })
    }
}

impl PerformanceMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let move_processing_duration = Histogram::with_opts(
            HistogramOpts::new(
                "tictac_room_move_processing_duration_seconds",
                "Move processing time",
            )
            .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1]),
        )?;
        registry.register(Box::new(move_processing_duration.clone()))?;

        let match_request_duration = Histogram::with_opts(
            HistogramOpts::new(
                "tictac_room_match_request_duration_seconds",
                "Match request processing time",
            )
            .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1]),
        )?;
        registry.register(Box::new(match_request_duration.clone()))?;

        Ok(Self {
            move_processing_duration,
            match_request_duration,
        })
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new().expect("Failed to create default metrics collector")
    }
}

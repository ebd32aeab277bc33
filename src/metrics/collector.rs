//! Metrics collection using Prometheus

use crate::source::FetchSummary;
use crate::table::SkippedRow;
use anyhow::{Context, Result};
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Metrics collector for one pipeline run
#[derive(Clone)]
pub struct MetricsCollector {
    /// Prometheus registry
    registry: Arc<Registry>,

    /// Record fetching metrics
    fetch_metrics: FetchMetrics,

    /// Table building and rating metrics
    rating_metrics: RatingMetrics,
}

/// Record fetching metrics
#[derive(Clone)]
pub struct FetchMetrics {
    /// Records fetched from the source
    pub records_fetched_total: IntCounter,

    /// Retries after transient fetch failures
    pub fetch_retries_total: IntCounter,

    /// Fetch runs by stop reason
    pub fetch_stops_total: IntCounterVec,
}

/// Table building and rating metrics
#[derive(Clone)]
pub struct RatingMetrics {
    /// Rows left out of the rating, by error kind
    pub rows_skipped_total: IntCounterVec,

    /// Games rated by the engine
    pub games_rated_total: IntCounter,

    /// Teams with a rating after the last run
    pub teams_rated: IntGauge,

    /// Time spent folding a table through the engine
    pub rating_fold_duration: Histogram,
}

impl MetricsCollector {
    /// Create a new metrics collector with its own registry
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());
        Self::with_registry(registry)
    }

    /// Create a new metrics collector with custom registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let fetch_metrics = FetchMetrics::new(&registry)?;
        let rating_metrics = RatingMetrics::new(&registry)?;

        Ok(Self {
            registry,
            fetch_metrics,
            rating_metrics,
        })
    }

    pub fn fetch(&self) -> &FetchMetrics {
        &self.fetch_metrics
    }

    pub fn rating(&self) -> &RatingMetrics {
        &self.rating_metrics
    }

    /// Record the outcome of a fetch loop
    pub fn record_fetch(&self, summary: &FetchSummary) {
        self.fetch_metrics
            .records_fetched_total
            .inc_by(summary.fetched);
        self.fetch_metrics
            .fetch_retries_total
            .inc_by(summary.retries);

        let reason = match summary.stop_reason {
            crate::source::StopReason::Exhausted { .. } => "exhausted",
            crate::source::StopReason::SafetyBound => "safety_bound",
            crate::source::StopReason::RetriesExhausted { .. } => "retries_exhausted",
        };
        self.fetch_metrics
            .fetch_stops_total
            .with_label_values(&[reason])
            .inc();
    }

    /// Record rows that were left out, labelled by error kind
    pub fn record_skipped(&self, skipped: &[SkippedRow]) {
        for row in skipped {
            self.rating_metrics
                .rows_skipped_total
                .with_label_values(&[row.kind.as_str()])
                .inc();
        }
    }

    /// Record a completed fold over a table
    pub fn record_rating_fold(&self, games_rated: usize, teams_rated: usize, duration: Duration) {
        self.rating_metrics
            .games_rated_total
            .inc_by(games_rated as u64);
        self.rating_metrics.teams_rated.set(teams_rated as i64);
        self.rating_metrics
            .rating_fold_duration
            .observe(duration.as_secs_f64());
    }

    /// Export every registered metric in the Prometheus text format
    pub fn render_text(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buffer)
            .context("Failed to encode metrics")?;
        String::from_utf8(buffer).context("Metrics output is not valid UTF-8")
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

impl FetchMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let records_fetched_total = IntCounter::new(
            "bughouse_elo_records_fetched_total",
            "Game records fetched from the source",
        )?;
        registry.register(Box::new(records_fetched_total.clone()))?;

        let fetch_retries_total = IntCounter::new(
            "bughouse_elo_fetch_retries_total",
            "Retries after transient fetch failures",
        )?;
        registry.register(Box::new(fetch_retries_total.clone()))?;

        let fetch_stops_total = IntCounterVec::new(
            Opts::new(
                "bughouse_elo_fetch_stops_total",
                "Fetch runs by stop reason",
            ),
            &["reason"],
        )?;
        registry.register(Box::new(fetch_stops_total.clone()))?;

        Ok(Self {
            records_fetched_total,
            fetch_retries_total,
            fetch_stops_total,
        })
    }
}

impl RatingMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let rows_skipped_total = IntCounterVec::new(
            Opts::new(
                "bughouse_elo_rows_skipped_total",
                "Rows left out of the rating",
            ),
            &["reason"],
        )?;
        registry.register(Box::new(rows_skipped_total.clone()))?;

        let games_rated_total =
            IntCounter::new("bughouse_elo_games_rated_total", "Games rated")?;
        registry.register(Box::new(games_rated_total.clone()))?;

        let teams_rated = IntGauge::new("bughouse_elo_teams_rated", "Teams with a rating")?;
        registry.register(Box::new(teams_rated.clone()))?;

        let rating_fold_duration = Histogram::with_opts(
            HistogramOpts::new(
                "bughouse_elo_rating_fold_duration_seconds",
                "Time spent rating a game table",
            )
            .buckets(vec![0.0001, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
        )?;
        registry.register(Box::new(rating_fold_duration.clone()))?;

        Ok(Self {
            rows_skipped_total,
            games_rated_total,
            teams_rated,
            rating_fold_duration,
        })
    }
}

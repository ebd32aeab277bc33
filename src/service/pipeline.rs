//! One end-to-end rating run
//!
//! The async part is limited to fetching; everything after the fetch is a
//! pure function of the fetched records and the rating configuration, so
//! running it twice over the same records gives the same report.

use crate::config::{AppConfig, RatingConfig};
use crate::metrics::MetricsCollector;
use crate::rating::RatingEngine;
use crate::source::{
    extract_record, DirectoryRecordSource, FetchSettings, FetchSummary, FetchedRecord,
    HttpRecordSource, RecordFetcher, RecordSource,
};
use crate::stats::{participation_table, player_stats, team_stats, PlayerStat, TeamStat};
use crate::table::{build_table, SkippedRow};
use crate::types::{GameResult, RawRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Everything computed from a set of records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Standings {
    /// Rows that made it into the game table
    pub games: usize,
    pub results: Vec<GameResult>,
    /// Final team ratings
    pub ratings: BTreeMap<String, f64>,
    pub team_stats: Vec<TeamStat>,
    pub player_stats: Vec<PlayerStat>,
    /// Rows rejected by the table builder or the engine, by game index
    pub skipped: Vec<SkippedRow>,
}

/// Result of a full pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub fetch: FetchSummary,
    #[serde(flatten)]
    pub standings: Standings,
}

/// Build the configured record source: a local directory when one is set,
/// otherwise the HTTP archive
pub fn source_from_config(config: &AppConfig) -> Arc<dyn RecordSource> {
    match &config.source.directory {
        Some(directory) => Arc::new(DirectoryRecordSource::new(directory.clone())),
        None => Arc::new(HttpRecordSource::new(
            config.source.base_url.clone(),
            config.request_timeout(),
        )),
    }
}

/// Extract the tag fields of every fetched record
pub fn extract_all(records: &[FetchedRecord]) -> Vec<RawRecord> {
    records
        .iter()
        .map(|record| extract_record(&record.text, record.game_index))
        .collect()
}

/// Build the game table, rate it and aggregate the statistics
pub fn compute_standings(
    records: &[RawRecord],
    config: &RatingConfig,
) -> crate::error::Result<Standings> {
    timed_standings(records, config).map(|(standings, _)| standings)
}

/// [`compute_standings`] plus the time spent in the rating fold alone
fn timed_standings(
    records: &[RawRecord],
    config: &RatingConfig,
) -> crate::error::Result<(Standings, Duration)> {
    let table = build_table(records)?;

    let mut engine = RatingEngine::new(config)?;
    let fold_started = Instant::now();
    let run = engine.process_table(&table.rows)?;
    let fold_duration = fold_started.elapsed();
    let ratings = engine.into_ratings();

    let participations = participation_table(&table.rows, &run.results)?;
    debug!("Exploded {} participation rows", participations.len());

    let mut skipped = table.skipped;
    skipped.extend(run.skipped);
    skipped.sort_by_key(|row| row.game_index);

    let standings = Standings {
        games: table.rows.len(),
        team_stats: team_stats(&participations, &ratings),
        player_stats: player_stats(&participations),
        ratings: ratings.to_btree(),
        results: run.results,
        skipped,
    };
    Ok((standings, fold_duration))
}

/// Fetches records from a source and turns them into a report
pub struct Pipeline {
    source: Arc<dyn RecordSource>,
    fetch_settings: FetchSettings,
    rating: RatingConfig,
    metrics: Arc<MetricsCollector>,
}

impl Pipeline {
    pub fn new(
        source: Arc<dyn RecordSource>,
        fetch_settings: FetchSettings,
        rating: RatingConfig,
        metrics: Arc<MetricsCollector>,
    ) -> Self {
        Self {
            source,
            fetch_settings,
            rating,
            metrics,
        }
    }

    /// Pipeline with the source and settings described by `config`
    pub fn from_config(config: &AppConfig, metrics: Arc<MetricsCollector>) -> Self {
        Self::new(
            source_from_config(config),
            FetchSettings::from(&config.source),
            config.rating.clone(),
            metrics,
        )
    }

    pub fn metrics(&self) -> Arc<MetricsCollector> {
        self.metrics.clone()
    }

    /// Fetch every available record and compute the report
    pub async fn run(&self) -> crate::error::Result<PipelineReport> {
        let fetcher = RecordFetcher::new(self.source.clone(), self.fetch_settings.clone());
        let (records, fetch) = fetcher.fetch_all().await?;
        self.metrics.record_fetch(&fetch);

        let raw = extract_all(&records);

        let timer = self.metrics.start_timer();
        let (standings, fold_duration) = timed_standings(&raw, &self.rating)?;
        let elapsed = timer.stop();

        self.metrics.record_rating_fold(
            standings.results.len(),
            standings.ratings.len(),
            fold_duration,
        );
        self.metrics.record_skipped(&standings.skipped);

        info!(
            "Pipeline finished: {} records, {} games rated, {} teams, {} skipped in {:.2}ms (fold {:.2}ms)",
            fetch.fetched,
            standings.results.len(),
            standings.ratings.len(),
            standings.skipped.len(),
            elapsed.as_secs_f64() * 1000.0,
            fold_duration.as_secs_f64() * 1000.0
        );

        Ok(PipelineReport { fetch, standings })
    }
}

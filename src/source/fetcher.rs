//! Sequential fetch loop over a record source
//!
//! Ids are requested in increasing order starting at `first_game_id`. The
//! first non-success answer ends the run; it is the expected way for a run
//! to finish, not an error. Transient failures are retried a bounded number
//! of times before the loop gives up on the remaining ids.

use crate::config::SourceSettings;
use crate::error::BughouseError;
use crate::source::provider::{FetchResponse, RecordSource};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Fetch loop parameters
#[derive(Debug, Clone, PartialEq)]
pub struct FetchSettings {
    pub first_game_id: u64,
    pub max_games: u64,
    pub max_retry_attempts: u32,
    pub retry_delay: Duration,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self::from(&SourceSettings::default())
    }
}

impl From<&SourceSettings> for FetchSettings {
    fn from(settings: &SourceSettings) -> Self {
        Self {
            first_game_id: settings.first_game_id,
            max_games: settings.max_games,
            max_retry_attempts: settings.max_retry_attempts,
            retry_delay: Duration::from_millis(settings.retry_delay_ms),
        }
    }
}

/// One fetched record, tagged with its sequence index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedRecord {
    pub game_index: u64,
    pub text: String,
}

/// Why the fetch loop stopped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum StopReason {
    /// The source had no record for `game_id`
    Exhausted { game_id: u64, status: u16 },
    /// `max_games` records were fetched
    SafetyBound,
    /// A transient failure persisted through every retry
    RetriesExhausted { game_id: u64, message: String },
}

/// Outcome of a fetch loop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchSummary {
    pub fetched: u64,
    pub retries: u64,
    pub stop_reason: StopReason,
}

enum Attempt {
    Found(String),
    Stop(StopReason),
}

/// Drives a [`RecordSource`] from the first id until it runs dry
pub struct RecordFetcher {
    source: Arc<dyn RecordSource>,
    settings: FetchSettings,
}

impl RecordFetcher {
    pub fn new(source: Arc<dyn RecordSource>, settings: FetchSettings) -> Self {
        Self { source, settings }
    }

    /// Fetch records until the source is exhausted or the safety bound is hit.
    ///
    /// Records come back in ascending `game_index` order.
    pub async fn fetch_all(&self) -> crate::error::Result<(Vec<FetchedRecord>, FetchSummary)> {
        info!(
            "Fetching game records from {} starting at id {}",
            self.source.describe(),
            self.settings.first_game_id
        );

        let mut records = Vec::new();
        let mut retries = 0u64;
        let mut game_id = self.settings.first_game_id;

        let stop_reason = loop {
            if records.len() as u64 >= self.settings.max_games {
                warn!(
                    "Stopping after {} records: safety bound reached",
                    self.settings.max_games
                );
                break StopReason::SafetyBound;
            }

            match self.fetch_with_retry(game_id, &mut retries).await? {
                Attempt::Found(text) => {
                    debug!("Fetched game {} ({} bytes)", game_id, text.len());
                    records.push(FetchedRecord {
                        game_index: game_id,
                        text,
                    });
                    game_id += 1;
                }
                Attempt::Stop(reason) => break reason,
            }
        };

        info!(
            "Fetched {} game records ({} retries), stop reason: {:?}",
            records.len(),
            retries,
            stop_reason
        );

        let summary = FetchSummary {
            fetched: records.len() as u64,
            retries,
            stop_reason,
        };
        Ok((records, summary))
    }

    async fn fetch_with_retry(
        &self,
        game_id: u64,
        retries: &mut u64,
    ) -> crate::error::Result<Attempt> {
        let mut attempt = 0u32;

        loop {
            let failure = match self.source.fetch(game_id).await {
                Ok(FetchResponse::Found(text)) => return Ok(Attempt::Found(text)),
                Ok(FetchResponse::Missing { status }) if !is_transient_status(status) => {
                    debug!("Game {} not available (status {})", game_id, status);
                    return Ok(Attempt::Stop(StopReason::Exhausted { game_id, status }));
                }
                Ok(FetchResponse::Missing { status }) => format!("status {}", status),
                Err(e) => {
                    let message = match e.downcast_ref::<BughouseError>() {
                        Some(BughouseError::FetchFailed { message, .. }) => Some(message.clone()),
                        _ => None,
                    };
                    match message {
                        Some(message) => message,
                        None => return Err(e),
                    }
                }
            };

            if attempt >= self.settings.max_retry_attempts {
                warn!(
                    "Giving up on game {} after {} attempts: {}",
                    game_id,
                    attempt + 1,
                    failure
                );
                return Ok(Attempt::Stop(StopReason::RetriesExhausted {
                    game_id,
                    message: failure,
                }));
            }

            attempt += 1;
            *retries += 1;
            warn!(
                "Transient failure fetching game {} ({}), retry {}/{}",
                game_id, failure, attempt, self.settings.max_retry_attempts
            );
            tokio::time::sleep(self.settings.retry_delay).await;
        }
    }
}

/// Statuses worth asking again for
fn is_transient_status(status: u16) -> bool {
    status == 429 || status >= 500
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::provider::{InMemoryRecordSource, MockRecordSource};
    use mockall::predicate::eq;
    use mockall::Sequence;

    fn settings(max_games: u64, max_retry_attempts: u32) -> FetchSettings {
        FetchSettings {
            first_game_id: 1,
            max_games,
            max_retry_attempts,
            retry_delay: Duration::from_millis(1),
        }
    }

    fn fetch_failed(game_id: u64) -> anyhow::Error {
        BughouseError::FetchFailed {
            game_id,
            message: "connection reset".to_string(),
        }
        .into()
    }

    #[tokio::test]
    async fn test_fetch_stops_at_first_missing_record() {
        let source = Arc::new(InMemoryRecordSource::new(vec![
            "a".to_string(),
            "b".to_string(),
            "c".to_string(),
        ]));
        let fetcher = RecordFetcher::new(source, settings(100, 0));

        let (records, summary) = fetcher.fetch_all().await.unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(
            records.iter().map(|r| r.game_index).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(records[2].text, "c");
        assert_eq!(summary.fetched, 3);
        assert_eq!(
            summary.stop_reason,
            StopReason::Exhausted {
                game_id: 4,
                status: 404
            }
        );
    }

    #[tokio::test]
    async fn test_fetch_respects_safety_bound() {
        let source = Arc::new(InMemoryRecordSource::new(vec!["x".to_string(); 10]));
        let fetcher = RecordFetcher::new(source, settings(4, 0));

        let (records, summary) = fetcher.fetch_all().await.unwrap();

        assert_eq!(records.len(), 4);
        assert_eq!(summary.stop_reason, StopReason::SafetyBound);
    }

    #[tokio::test]
    async fn test_empty_source_is_not_an_error() {
        let fetcher = RecordFetcher::new(
            Arc::new(InMemoryRecordSource::default()),
            settings(100, 0),
        );

        let (records, summary) = fetcher.fetch_all().await.unwrap();

        assert!(records.is_empty());
        assert_eq!(
            summary.stop_reason,
            StopReason::Exhausted {
                game_id: 1,
                status: 404
            }
        );
    }

    #[tokio::test]
    async fn test_transient_failure_is_retried() {
        let mut source = MockRecordSource::new();
        let mut seq = Sequence::new();

        source
            .expect_describe()
            .returning(|| "mock".to_string());
        source
            .expect_fetch()
            .with(eq(1))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|id| Err(fetch_failed(id)));
        source
            .expect_fetch()
            .with(eq(1))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(FetchResponse::Missing { status: 503 }));
        source
            .expect_fetch()
            .with(eq(1))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(FetchResponse::Found("game one".to_string())));
        source
            .expect_fetch()
            .with(eq(2))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(FetchResponse::Missing { status: 404 }));

        let fetcher = RecordFetcher::new(Arc::new(source), settings(100, 2));
        let (records, summary) = fetcher.fetch_all().await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(summary.retries, 2);
        assert_eq!(
            summary.stop_reason,
            StopReason::Exhausted {
                game_id: 2,
                status: 404
            }
        );
    }

    #[tokio::test]
    async fn test_persistent_failure_stops_the_run() {
        let mut source = MockRecordSource::new();
        source
            .expect_describe()
            .returning(|| "mock".to_string());
        source
            .expect_fetch()
            .with(eq(1))
            .times(1)
            .returning(|_| Ok(FetchResponse::Found("game one".to_string())));
        source
            .expect_fetch()
            .with(eq(2))
            .times(3)
            .returning(|id| Err(fetch_failed(id)));

        let fetcher = RecordFetcher::new(Arc::new(source), settings(100, 2));
        let (records, summary) = fetcher.fetch_all().await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(summary.retries, 2);
        assert_eq!(
            summary.stop_reason,
            StopReason::RetriesExhausted {
                game_id: 2,
                message: "connection reset".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_unexpected_error_propagates() {
        let mut source = MockRecordSource::new();
        source
            .expect_describe()
            .returning(|| "mock".to_string());
        source.expect_fetch().returning(|_| {
            Err(BughouseError::InternalError {
                message: "boom".to_string(),
            }
            .into())
        });

        let fetcher = RecordFetcher::new(Arc::new(source), settings(100, 2));
        assert!(fetcher.fetch_all().await.is_err());
    }

    #[test]
    fn test_transient_statuses() {
        assert!(is_transient_status(500));
        assert!(is_transient_status(503));
        assert!(is_transient_status(429));
        assert!(!is_transient_status(404));
        assert!(!is_transient_status(403));
    }
}

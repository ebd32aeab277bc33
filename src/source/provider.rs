//! Record source interface and implementations
//!
//! A record source answers one question: what is the text of game `id`?
//! Any non-success answer is reported as [`FetchResponse::Missing`]; only
//! failures to get an answer at all (transport errors, unreadable files) are
//! errors.

use crate::error::BughouseError;
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// Answer of a record source for a single game id
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchResponse {
    /// Raw record text
    Found(String),
    /// The source answered with a non-success status
    Missing { status: u16 },
}

/// Trait for sources of raw game records
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch the record with the given id
    async fn fetch(&self, game_id: u64) -> crate::error::Result<FetchResponse>;

    /// Human readable description for logs
    fn describe(&self) -> String;
}

/// Game archive reachable over HTTP, one record per `{base_url}{id}`
#[derive(Debug, Clone)]
pub struct HttpRecordSource {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpRecordSource {
    /// Create a new HTTP record source
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            base_url: base_url.into(),
            agent,
        }
    }

    /// URL of a single record
    pub fn url_for(&self, game_id: u64) -> String {
        format!("{}{}", self.base_url, game_id)
    }
}

#[async_trait]
impl RecordSource for HttpRecordSource {
    async fn fetch(&self, game_id: u64) -> crate::error::Result<FetchResponse> {
        let agent = self.agent.clone();
        let url = self.url_for(game_id);
        debug!("GET {}", url);

        let outcome = tokio::task::spawn_blocking(move || match agent.get(&url).call() {
            // ureq only reports 4xx and 5xx as errors; 1xx and 3xx arrive here
            Ok(response) if !(200..300).contains(&response.status()) => {
                Ok(FetchResponse::Missing {
                    status: response.status(),
                })
            }
            Ok(response) => response
                .into_string()
                .map(FetchResponse::Found)
                .map_err(|e| format!("failed to read response body: {}", e)),
            Err(ureq::Error::Status(status, _)) => Ok(FetchResponse::Missing { status }),
            Err(ureq::Error::Transport(err)) => Err(format!("http transport failure: {}", err)),
        })
        .await
        .map_err(|e| BughouseError::InternalError {
            message: format!("fetch task for game {} failed: {}", game_id, e),
        })?;

        outcome.map_err(|message| BughouseError::FetchFailed { game_id, message }.into())
    }

    fn describe(&self) -> String {
        format!("http archive {}", self.base_url)
    }
}

/// Directory of `{id}.pgn` files, for offline runs
#[derive(Debug, Clone)]
pub struct DirectoryRecordSource {
    directory: PathBuf,
}

impl DirectoryRecordSource {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// Path of a single record
    pub fn path_for(&self, game_id: u64) -> PathBuf {
        self.directory.join(format!("{}.pgn", game_id))
    }
}

#[async_trait]
impl RecordSource for DirectoryRecordSource {
    async fn fetch(&self, game_id: u64) -> crate::error::Result<FetchResponse> {
        let path = self.path_for(game_id);
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(FetchResponse::Found(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(FetchResponse::Missing { status: 404 })
            }
            Err(e) => Err(BughouseError::FetchFailed {
                game_id,
                message: format!("failed to read {}: {}", path.display(), e),
            }
            .into()),
        }
    }

    fn describe(&self) -> String {
        format!("directory {}", self.directory.display())
    }
}

/// In-memory records; game id 1 is the first entry
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecordSource {
    records: Vec<String>,
}

impl InMemoryRecordSource {
    pub fn new(records: Vec<String>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl RecordSource for InMemoryRecordSource {
    async fn fetch(&self, game_id: u64) -> crate::error::Result<FetchResponse> {
        let record = usize::try_from(game_id)
            .ok()
            .and_then(|id| id.checked_sub(1))
            .and_then(|index| self.records.get(index));

        Ok(match record {
            Some(text) => FetchResponse::Found(text.clone()),
            None => FetchResponse::Missing { status: 404 },
        })
    }

    fn describe(&self) -> String {
        format!("in-memory ({} records)", self.records.len())
    }
}

//! Test fixtures and record sources for integration testing
#![allow(dead_code)]

use async_trait::async_trait;
use bughouse_elo::error::Result;
use bughouse_elo::source::{FetchResponse, RecordSource};
use std::sync::Mutex;

/// Builder for bughouse records in the archive's tag-block format
#[derive(Debug, Clone)]
pub struct GameRecordBuilder {
    white_a: Option<String>,
    black_b: Option<String>,
    white_b: Option<String>,
    black_a: Option<String>,
    date: String,
    round: Option<String>,
    result: Option<String>,
    termination: String,
    outcome: String,
}

impl GameRecordBuilder {
    /// Red is WhiteA + BlackB, Blue is WhiteB + BlackA
    pub fn new(red: (&str, &str), blue: (&str, &str)) -> Self {
        Self {
            white_a: Some(red.0.to_string()),
            black_b: Some(red.1.to_string()),
            white_b: Some(blue.0.to_string()),
            black_a: Some(blue.1.to_string()),
            date: "2019.05.12".to_string(),
            round: Some("1".to_string()),
            result: Some("1-0".to_string()),
            termination: "normal".to_string(),
            outcome: "Game won by checkmate".to_string(),
        }
    }

    pub fn round(mut self, round: u32) -> Self {
        self.round = Some(round.to_string());
        self
    }

    pub fn raw_round(mut self, round: Option<&str>) -> Self {
        self.round = round.map(str::to_string);
        self
    }

    pub fn result(mut self, result: &str) -> Self {
        self.result = Some(result.to_string());
        self
    }

    pub fn outcome(mut self, outcome: &str) -> Self {
        self.outcome = outcome.to_string();
        self
    }

    pub fn build(&self) -> String {
        let mut text = String::new();
        let mut tag = |name: &str, value: &Option<String>| {
            if let Some(value) = value {
                text.push_str(&format!("[{} \"{}\"]\n", name, value));
            }
        };

        tag("WhiteA", &self.white_a);
        tag("BlackA", &self.black_a);
        tag("WhiteB", &self.white_b);
        tag("BlackB", &self.black_b);
        tag("UTCDate", &Some(self.date.clone()));
        tag("Round", &self.round);
        tag("Result", &self.result);
        tag("Termination", &Some(self.termination.clone()));
        tag("Outcome", &Some(self.outcome.clone()));

        text.push_str("\n{[%clk 0:03:00]} 1A. e4 {[%clk 0:02:59]} 1a. d4\n");
        text
    }
}

/// A match of consecutive rounds between the same two teams, red score per game
pub fn match_records(red: (&str, &str), blue: (&str, &str), red_scores: &[u32]) -> Vec<String> {
    red_scores
        .iter()
        .enumerate()
        .map(|(i, score)| {
            GameRecordBuilder::new(red, blue)
                .round(i as u32 + 1)
                .result(&format!("{}-{}", score, 1 - score))
                .build()
        })
        .collect()
}

/// Record source that remembers which ids were requested
#[derive(Debug, Default)]
pub struct RecordingSource {
    records: Vec<String>,
    requested: Mutex<Vec<u64>>,
}

impl RecordingSource {
    pub fn new(records: Vec<String>) -> Self {
        Self {
            records,
            requested: Mutex::new(Vec::new()),
        }
    }

    /// Get all requested ids (for testing)
    pub fn requested(&self) -> Vec<u64> {
        self.requested
            .lock()
            .map(|ids| ids.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl RecordSource for RecordingSource {
    async fn fetch(&self, game_id: u64) -> Result<FetchResponse> {
        if let Ok(mut ids) = self.requested.lock() {
            ids.push(game_id);
        }

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
        format!("recording source ({} records)", self.records.len())
    }
}

//! Rendering of pipeline reports
//!
//! Two output shapes: the full report as JSON, or the `team_stat` and
//! `player_stat` tables as aligned plain text.

use crate::service::PipelineReport;
use crate::stats::{PlayerStat, TeamStat};
use anyhow::Context;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::Path;
use std::str::FromStr;

/// Output format of the report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Table,
    Json,
}

impl FromStr for ReportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "table" | "text" => Ok(ReportFormat::Table),
            "json" => Ok(ReportFormat::Json),
            other => Err(crate::error::BughouseError::ConfigurationError {
                message: format!("Unknown report format: {}", other),
            }
            .into()),
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormat::Table => write!(f, "table"),
            ReportFormat::Json => write!(f, "json"),
        }
    }
}

/// Render a report in the requested format
pub fn render(report: &PipelineReport, format: ReportFormat) -> crate::error::Result<String> {
    match format {
        ReportFormat::Json => render_json(report),
        ReportFormat::Table => Ok(render_tables(report)),
    }
}

pub fn render_json(report: &PipelineReport) -> crate::error::Result<String> {
    serde_json::to_string_pretty(report).context("Failed to serialize report")
}

/// Summary header followed by the team and player tables
pub fn render_tables(report: &PipelineReport) -> String {
    let standings = &report.standings;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Fetched {} records, rated {} games across {} teams ({} rows skipped)",
        report.fetch.fetched,
        standings.results.len(),
        standings.ratings.len(),
        standings.skipped.len()
    );
    out.push('\n');
    out.push_str(&team_table(&standings.team_stats));
    out.push('\n');
    out.push_str(&player_table(&standings.player_stats));

    if !standings.skipped.is_empty() {
        out.push_str("\nskipped\n");
        for row in &standings.skipped {
            let _ = writeln!(out, "  {:>6}  {:<18}  {}", row.game_index, row.kind, row.message);
        }
    }

    out
}

/// The `team_stat` table
pub fn team_table(stats: &[TeamStat]) -> String {
    let width = column_width("team", stats.iter().map(|s| s.team.as_str()));
    let mut out = String::from("team_stat\n");

    let _ = writeln!(
        out,
        "{:<width$}  {:>7}  {:>5}  {:>7}  {:>7}  {:>8}",
        "team", "matches", "games", "score", "winrate", "rating"
    );
    for stat in stats {
        let _ = writeln!(
            out,
            "{:<width$}  {:>7}  {:>5}  {:>7.1}  {:>7.3}  {:>8.2}",
            stat.team.as_str(),
            stat.matches,
            stat.games,
            stat.score,
            stat.win_rate,
            stat.rating
        );
    }
    out
}

/// The `player_stat` table
pub fn player_table(stats: &[PlayerStat]) -> String {
    let width = column_width("player", stats.iter().map(|s| s.player.as_str()));
    let mut out = String::from("player_stat\n");

    let _ = writeln!(
        out,
        "{:<width$}  {:>7}  {:>5}  {:>5}  {:>7}  {:>7}",
        "player", "matches", "games", "teams", "score", "winrate"
    );
    for stat in stats {
        let _ = writeln!(
            out,
            "{:<width$}  {:>7}  {:>5}  {:>5}  {:>7.1}  {:>7.3}",
            stat.player, stat.matches, stat.games, stat.teams, stat.score, stat.win_rate
        );
    }
    out
}

/// Write rendered output to `path`, or stdout when no path is given
pub fn write_output(rendered: &str, path: Option<&Path>) -> crate::error::Result<()> {
    match path {
        Some(path) => std::fs::write(path, rendered)
            .with_context(|| format!("Failed to write report to {}", path.display())),
        None => {
            print!("{}", rendered);
            Ok(())
        }
    }
}

fn column_width<'a>(header: &str, values: impl Iterator<Item = &'a str>) -> usize {
    values
        .map(|value| value.chars().count())
        .max()
        .unwrap_or(0)
        .max(header.len())
}

//! Tag extraction from bughouse PGN records
//!
//! A record starts with a block of `[Tag "value"]` lines. Only the tags the
//! rating pipeline needs are pulled out; a tag that is missing from the
//! record is reported as `None` rather than an error.

use crate::types::RawRecord;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::debug;

static TAG_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^\s*\[\s*([A-Za-z][A-Za-z0-9_]*)\s+(.*?)\s*\]\s*$"#)
        .expect("valid tag line regex")
});

/// Tags read from every record, in the order of the extracted tuple
pub const EXTRACTED_TAGS: [&str; 9] = [
    "WhiteA",
    "WhiteB",
    "BlackA",
    "BlackB",
    "UTCDate",
    "Round",
    "Result",
    "Termination",
    "Outcome",
];

/// Collect all tag pairs of a record. The first occurrence of a tag wins.
pub fn extract_tags(text: &str) -> HashMap<String, String> {
    let mut tags = HashMap::new();
    for captures in TAG_LINE_RE.captures_iter(text) {
        let name = captures[1].to_string();
        let value = captures[2].replace('"', "").trim().to_string();
        tags.entry(name).or_insert(value);
    }
    tags
}

/// Extract the fields the pipeline consumes from one record
pub fn extract_record(text: &str, game_index: u64) -> RawRecord {
    let mut tags = extract_tags(text);

    let missing: Vec<&str> = EXTRACTED_TAGS
        .iter()
        .copied()
        .filter(|tag| !tags.contains_key(*tag))
        .collect();
    if !missing.is_empty() {
        debug!("Game {} is missing tags: {}", game_index, missing.join(", "));
    }

    RawRecord {
        game_index,
        white_a: tags.remove("WhiteA"),
        white_b: tags.remove("WhiteB"),
        black_a: tags.remove("BlackA"),
        black_b: tags.remove("BlackB"),
        date: tags.remove("UTCDate"),
        round: tags.remove("Round"),
        result: tags.remove("Result"),
        termination: tags.remove("Termination"),
        outcome: tags.remove("Outcome"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECORD: &str = r#"[Event "Casual bughouse"]
[Site "bughouse.pro"]
[UTCDate "2019.05.12"]
[Round "2"]
[WhiteA "alice"]
[BlackA "bob"]
[WhiteB "carol"]
[BlackB "dave"]
[Result "1-0"]
[Termination "normal"]
[Outcome "bob checkmated by alice"]

1A. e4 1a. e5 1B. d4 1b. d5
"#;

    #[test]
    fn test_extract_full_record() {
        let record = extract_record(RECORD, 42);

        assert_eq!(record.game_index, 42);
        assert_eq!(record.white_a.as_deref(), Some("alice"));
        assert_eq!(record.black_a.as_deref(), Some("bob"));
        assert_eq!(record.white_b.as_deref(), Some("carol"));
        assert_eq!(record.black_b.as_deref(), Some("dave"));
        assert_eq!(record.date.as_deref(), Some("2019.05.12"));
        assert_eq!(record.round.as_deref(), Some("2"));
        assert_eq!(record.result.as_deref(), Some("1-0"));
        assert_eq!(record.termination.as_deref(), Some("normal"));
        assert_eq!(record.outcome.as_deref(), Some("bob checkmated by alice"));
    }

    #[test]
    fn test_missing_tag_is_none_not_empty() {
        let record = extract_record("[Round \"1\"]\n[Outcome \"\"]\n", 1);

        assert_eq!(record.round.as_deref(), Some("1"));
        assert_eq!(record.outcome.as_deref(), Some(""));
        assert_eq!(record.termination, None);
        assert_eq!(record.white_a, None);
    }

    #[test]
    fn test_unquoted_values_and_first_occurrence() {
        let tags = extract_tags("[Round 3]\n[Round \"4\"]\n  [Result  0-1 ]\n");
        assert_eq!(tags["Round"], "3");
        assert_eq!(tags["Result"], "0-1");
    }

    #[test]
    fn test_move_text_is_ignored() {
        let tags = extract_tags(RECORD);
        assert_eq!(tags.len(), 11);
        assert!(!tags.contains_key("1A."));
    }
}

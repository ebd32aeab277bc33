//! Game record retrieval and field extraction
//!
//! Records are fetched one id at a time from a [`RecordSource`] until the
//! source reports that no further game exists, then the tag block of each
//! record is turned into a [`crate::types::RawRecord`].

pub mod extractor;
pub mod fetcher;
pub mod provider;

// Re-export commonly used types
pub use extractor::extract_record;
pub use fetcher::{FetchSettings, FetchSummary, FetchedRecord, RecordFetcher, StopReason};
pub use provider::{
    DirectoryRecordSource, FetchResponse, HttpRecordSource, InMemoryRecordSource, RecordSource,
};

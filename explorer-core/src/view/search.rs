//! src/view/search.rs
//! ============================================================================
//! # Search Task: completed result container
//!
//! The search itself runs elsewhere. Once it completes, its results are
//! handed to the connector which forwards them untouched to the panel that
//! renders them.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use compact_str::CompactString;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTask {
    query: CompactString,
    base_directory: PathBuf,
    results: Vec<PathBuf>,
    completed_at: DateTime<Utc>,
}

impl SearchTask {
    #[must_use]
    pub fn new(query: &str, base_directory: PathBuf, results: Vec<PathBuf>) -> Self {
        Self {
            query: CompactString::new(query),
            base_directory,
            results,
            completed_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[must_use]
    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    /// Matched paths in the order the search produced them.
    #[must_use]
    pub fn results(&self) -> &[PathBuf] {
        &self.results
    }

    #[must_use]
    pub const fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    #[must_use]
    pub fn total_matches(&self) -> usize {
        self.results.len()
    }
}

//! Reading source abstraction.
//!
//! This module provides a trait-based abstraction over the backend that
//! stores water-flow readings, with implementations for an HTTP backend
//! and an in-process store (demos and tests).

mod http;
mod memory;
mod reading;

pub use http::HttpReadingSource;
pub use memory::MemoryReadingSource;
pub use reading::{NewReading, Reading, ReadingSnapshot};

use std::fmt::Debug;

use async_trait::async_trait;
use thiserror::Error;

/// Errors from fetching or appending readings.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Could not reach the backend.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Request timed out.
    #[error("request timed out")]
    Timeout,

    /// Backend answered with a non-success status.
    #[error("backend returned status {0}")]
    Http(u16),

    /// The response body could not be deserialized.
    #[error("failed to parse response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SourceError::Timeout
        } else if err.is_connect() {
            SourceError::Connection(err.to_string())
        } else if err.is_decode() {
            SourceError::Parse(err.to_string())
        } else if let Some(status) = err.status() {
            SourceError::Http(status.as_u16())
        } else {
            SourceError::Connection(err.to_string())
        }
    }
}

/// Trait for the backend that stores readings.
///
/// `fetch` returns the full ordered reading list, oldest first; callers
/// replace their view wholesale rather than merging. `submit` appends one
/// reading. Neither call is cancelled or retried by this crate.
///
/// # Example
///
/// ```
/// use aquawatch::{MemoryReadingSource, ReadingSource};
///
/// let source = MemoryReadingSource::new();
/// assert_eq!(source.description(), "memory");
/// ```
#[async_trait]
pub trait ReadingSource: Send + Sync + Debug {
    /// Fetch the current snapshot of all readings, oldest first.
    async fn fetch(&self) -> Result<ReadingSnapshot, SourceError>;

    /// Append a new reading.
    async fn submit(&self, reading: NewReading) -> Result<(), SourceError>;

    /// Human-readable description of the source.
    ///
    /// Used for display in the status line.
    fn description(&self) -> &str;
}

//! In-memory reading source.
//!
//! A backend stand-in for demos and tests: keeps the reading list in
//! process and assigns identifiers and timestamps on submit. Clones share
//! the same store, so a test can inspect the backend independently of the
//! app under test.

use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;

use super::{NewReading, Reading, ReadingSnapshot, ReadingSource, SourceError};

/// A reading source that stores readings in process memory.
///
/// # Example
///
/// ```
/// use aquawatch::{MemoryReadingSource, NewReading, ReadingSource};
///
/// # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
/// let source = MemoryReadingSource::new();
/// source.submit(NewReading { flow_rate: 5.0, quantity: 20.0 }).await.unwrap();
/// let snapshot = source.fetch().await.unwrap();
/// assert_eq!(snapshot.len(), 1);
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct MemoryReadingSource {
    store: Arc<Mutex<Store>>,
    description: String,
}

#[derive(Debug, Default)]
struct Store {
    readings: Vec<Reading>,
    next_id: u64,
}

impl MemoryReadingSource {
    /// Create an empty in-memory source.
    pub fn new() -> Self {
        Self {
            store: Arc::new(Mutex::new(Store::default())),
            description: "memory".to_string(),
        }
    }

    /// Number of readings currently stored.
    pub fn len(&self) -> usize {
        self.store.lock().readings.len()
    }

    /// Whether the store holds no readings.
    pub fn is_empty(&self) -> bool {
        self.store.lock().readings.is_empty()
    }
}

impl Default for MemoryReadingSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ReadingSource for MemoryReadingSource {
    async fn fetch(&self) -> Result<ReadingSnapshot, SourceError> {
        Ok(self.store.lock().readings.clone())
    }

    async fn submit(&self, reading: NewReading) -> Result<(), SourceError> {
        let mut store = self.store.lock();
        store.next_id += 1;
        let id = format!("mem-{}", store.next_id);
        store.readings.push(Reading {
            id,
            flow_rate: reading.flow_rate,
            quantity: reading.quantity,
            timestamp: Utc::now(),
        });
        Ok(())
    }

    fn description(&self) -> &str {
        &self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_submit_then_fetch_preserves_order() {
        let source = MemoryReadingSource::new();
        source
            .submit(NewReading {
                flow_rate: 5.0,
                quantity: 20.0,
            })
            .await
            .unwrap();
        source
            .submit(NewReading {
                flow_rate: 7.5,
                quantity: 10.0,
            })
            .await
            .unwrap();

        let snapshot = source.fetch().await.unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].flow_rate, 5.0);
        assert_eq!(snapshot[1].flow_rate, 7.5);
        assert_ne!(snapshot[0].id, snapshot[1].id);
    }

    #[tokio::test]
    async fn test_fetch_empty_store() {
        let source = MemoryReadingSource::new();
        assert!(source.fetch().await.unwrap().is_empty());
        assert!(source.is_empty());
    }

    #[tokio::test]
    async fn test_clones_share_the_store() {
        let source = MemoryReadingSource::new();
        let backend = source.clone();

        source
            .submit(NewReading {
                flow_rate: 1.0,
                quantity: 2.0,
            })
            .await
            .unwrap();

        assert_eq!(backend.len(), 1);
    }
}

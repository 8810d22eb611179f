//! HTTP reading source.
//!
//! Talks to the JSON reading backend: `GET` returns the full reading list,
//! `POST` appends one reading. No retries and no request cancellation; the
//! caller awaits completion or failure.

use reqwest::Client;

use super::{NewReading, ReadingSnapshot, ReadingSource, SourceError};

/// A reading source backed by an HTTP endpoint.
///
/// # Example
///
/// ```no_run
/// use aquawatch::{HttpReadingSource, ReadingSource};
///
/// # async fn run() -> Result<(), aquawatch::SourceError> {
/// let source = HttpReadingSource::new("http://localhost:5000/api/water");
/// let snapshot = source.fetch().await?;
/// println!("got {} readings", snapshot.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpReadingSource {
    client: Client,
    endpoint: String,
    description: String,
}

impl HttpReadingSource {
    /// Create a source for the given endpoint with a default client.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(Client::new(), endpoint)
    }

    /// Create a source with a preconfigured client (timeouts, proxies).
    pub fn with_client(client: Client, endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        let description = format!("http: {}", endpoint);
        Self {
            client,
            endpoint,
            description,
        }
    }

    /// Returns the endpoint being polled.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl ReadingSource for HttpReadingSource {
    async fn fetch(&self) -> Result<ReadingSnapshot, SourceError> {
        let response = self.client.get(&self.endpoint).send().await?;

        if !response.status().is_success() {
            return Err(SourceError::Http(response.status().as_u16()));
        }

        let snapshot = response
            .json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;
        Ok(snapshot)
    }

    async fn submit(&self, reading: NewReading) -> Result<(), SourceError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&reading)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SourceError::Http(response.status().as_u16()));
        }

        // Acknowledgment only; no response body is required.
        Ok(())
    }

    fn description(&self) -> &str {
        &self.description
    }
}

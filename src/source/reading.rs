//! Wire types for water-flow readings.
//!
//! Field names match the JSON served by the reading backend, so these types
//! serve as the common data format between the backend producer and this
//! monitoring consumer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One recorded flow-rate/quantity/timestamp sample.
///
/// Immutable once created; the backend assigns the identifier and timestamp
/// when a reading is submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Opaque identifier assigned by the backend.
    #[serde(rename = "_id")]
    pub id: String,

    /// Flow rate in litres per minute.
    #[serde(rename = "flowRate")]
    pub flow_rate: f64,

    /// Quantity in litres.
    pub quantity: f64,

    /// When the reading was recorded.
    pub timestamp: DateTime<Utc>,
}

/// The full ordered reading list returned by one poll, oldest first.
///
/// Each poll replaces the previous snapshot wholesale; there is no
/// incremental merge.
pub type ReadingSnapshot = Vec<Reading>;

/// Payload for appending a new reading.
///
/// The backend fills in the identifier and timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NewReading {
    #[serde(rename = "flowRate")]
    pub flow_rate: f64,
    pub quantity: f64,
}

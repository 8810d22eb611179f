//! # aquawatch
//!
//! A water-flow monitoring client with debounced overflow alerting.
//!
//! This crate records and reviews water-flow readings (flow rate, quantity,
//! timestamp) against a reading backend and raises an alert when the flow
//! rate stays above a threshold long enough to indicate an overflow. The
//! core is the [`OverflowMonitor`] state machine; everything around it is
//! thin plumbing that supplies readings and dispatches commands.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                       Application                          │
//! │  ┌─────────┐     ┌───────────────┐     ┌───────────────┐  │
//! │  │  app    │────▶│ data::monitor │────▶│ alert channel │  │
//! │  │ (state) │     │  (detection)  │     │ + watch state │  │
//! │  └────┬────┘     └───────────────┘     └───────────────┘  │
//! │       │                                                    │
//! │       ▼                                                    │
//! │  ┌─────────┐                                               │
//! │  │ source  │◀── HttpReadingSource | MemoryReadingSource   │
//! │  │ (input) │                                               │
//! │  └─────────┘                                               │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: Poll driver and command interface (fetch, submit, clear)
//!   plus the queue of user-facing notices
//! - **[`source`]**: Reading source abstraction ([`ReadingSource`] trait)
//!   with HTTP and in-memory implementations
//! - **[`data`]**: The overflow-detection core, a debounce timer keyed to
//!   sustained threshold violation, observable through an alert channel and
//!   a watch subscription
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Poll an HTTP reading backend
//! aquawatch --endpoint http://localhost:5000/api/water
//!
//! # Run self-contained against an in-process store
//! aquawatch --memory
//! ```
//!
//! ### As a library
//!
//! ```
//! use aquawatch::{App, MemoryReadingSource, MonitorConfig};
//!
//! let source = MemoryReadingSource::new();
//! let app = App::new(Box::new(source), MonitorConfig::default());
//! ```
//!
//! ### Against an HTTP backend
//!
//! ```no_run
//! use aquawatch::{App, HttpReadingSource, MonitorConfig};
//!
//! # async fn run() {
//! let source = HttpReadingSource::new("http://localhost:5000/api/water");
//! let mut app = App::new(Box::new(source), MonitorConfig::default());
//! app.fetch_latest().await;
//! if app.overflowing() {
//!     eprintln!("water is overflowing");
//! }
//! # }
//! ```

pub mod app;
pub mod data;
pub mod source;

// Re-export main types for convenience
pub use app::{App, Notice, NoticeKind};
pub use data::{MonitorConfig, OverflowAlert, OverflowMonitor};
pub use source::{
    HttpReadingSource, MemoryReadingSource, NewReading, Reading, ReadingSnapshot, ReadingSource,
    SourceError,
};

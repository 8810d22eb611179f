//! Data models and the overflow-detection core.
//!
//! ## Submodules
//!
//! - [`duration`]: Parsing and formatting of duration strings (e.g., "5s", "500ms")
//! - [`monitor`]: The debounced overflow state machine ([`OverflowMonitor`])
//!
//! ## Data Flow
//!
//! ```text
//! ReadingSnapshot (one poll, oldest first)
//!        │
//!        ▼  last().map(|r| r.flow_rate)
//! OverflowMonitor::observe()
//!        │
//!        ├──▶ overflowing: bool (watch channel, view subscribes)
//!        │
//!        └──▶ OverflowAlert (emitted once per elapsed debounce window)
//! ```

pub mod duration;
pub mod monitor;

pub use monitor::{MonitorConfig, OverflowAlert, OverflowMonitor};

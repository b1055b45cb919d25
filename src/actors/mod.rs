//! Actor running the probe loop
//!
//! The loop runs as an independent async task controlled through an mpsc
//! command channel, the same way the rest of the monitor talks to it.
//!
//! ## Architecture Overview
//!
//! ```text
//!   ProbeHandle ──commands──▶ ProbeActor ──record──▶ MonitorMetrics ◀──gather── scrape server
//!                              │     ▲
//!                              ▼     │
//!                           Probing → Sleeping
//! ```
//!
//! ## Communication Patterns
//!
//! 1. **Commands**: `ProbeNow` and `Shutdown` via mpsc
//! 2. **Request/Response**: `ProbeNow` answers with the `ProbeResult` over a oneshot
//! 3. **Shared state**: results land in the metrics registry, which scrapes read concurrently

pub mod messages;
pub mod probe;

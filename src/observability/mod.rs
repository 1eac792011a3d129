//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Routing produces:
//!     → logging.rs (structured log events)
//!     → metrics.rs (dispatch and build counters)
//!
//! Consumers:
//!     → stderr log output
//!     → Metrics endpoint (Prometheus scrape, watch mode only)
//! ```

pub mod logging;
pub mod metrics;

//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Executor events (attempt, retry, success, failure):
//!     → telemetry.rs (TelemetryObserver)
//!         → tracing events (logging.rs installs the subscriber)
//!         → metrics.rs (counters, histogram)
//! ```
//!
//! # Design Decisions
//! - The executor itself never logs; observers do
//! - Metrics are opt-in through config

pub mod logging;
pub mod metrics;
pub mod telemetry;

pub use logging::init_logging;
pub use telemetry::TelemetryObserver;

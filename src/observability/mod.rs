//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Registry and dispatcher produce:
//!     → logging.rs (structured log events keyed by handler_id)
//!     → metrics.rs (call counters, registered-handler gauge)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - `RUST_LOG` overrides the configured level
//! - Metrics are cheap no-ops until an exporter is installed

pub mod logging;
pub mod metrics;

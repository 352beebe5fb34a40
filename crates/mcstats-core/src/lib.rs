//! mcstats core: metric model, request translation, and the statsd line codec.
//!
//! This crate turns an inbound parameter bag into a single metric event and
//! renders it as a statsd datagram. It intentionally carries no socket, HTTP, or
//! runtime dependencies so the gateway and tests can share it freely.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Malformed input degrades to default values; the only rejection is an
//! unknown metric type, surfaced as `RelayError`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod metric;
pub mod params;
pub mod protocol;
pub mod translate;

/// Shared result type.
pub use error::{Result, RelayError};
pub use metric::{EmitOptions, MetricEvent, MetricKind, MetricValue};
pub use params::Params;

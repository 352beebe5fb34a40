//! mcstats gateway library entry.
//!
//! This crate wires config loading, the HTTP transport, and the statsd emitter
//! into the relay service. It is intended to be consumed by the binary
//! (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod emitter;
pub mod ops;
pub mod router;
pub mod transport;

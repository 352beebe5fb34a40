//! Transport layer (HTTP).
//!
//! Exposes the ingest handler and the codec that decodes request parameters
//! once before they reach the translator.

pub mod codec;
pub mod http;

//! Top-level facade crate for mcstats.
//!
//! Re-exports core types and the gateway library so users can depend on a single crate.

pub mod core {
    pub use mcstats_core::*;
}

pub mod gateway {
    pub use mcstats_gateway::*;
}

//! Wire protocol definitions.
//!
//! - [`line`]: statsd / DogStatsD text line, one datagram per event

pub mod line;

//! Bookings server.
//!
//! Configuration loading and the metrics exporter, used by the `bookings`
//! binary.

pub mod config;
pub mod metrics;

pub use config::{Config, ConfigError, SessionBackend};

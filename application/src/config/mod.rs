//! Application-level configuration.
//!
//! - [`CycleConfig`]: cognitive cycle control (caps, timeouts, thresholds)

pub mod cycle_config;

pub use cycle_config::CycleConfig;

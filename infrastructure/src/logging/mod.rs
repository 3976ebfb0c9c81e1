//! Logging infrastructure: structured cycle event logging.
//!
//! Provides [`JsonlCycleLogger`], a JSONL file writer that implements the
//! [`CycleLogger`](bdi_application::CycleLogger) port.

mod jsonl_logger;

pub use jsonl_logger::JsonlCycleLogger;

//! Action executor adapters.

mod simulated;

pub use simulated::SimulatedActionExecutor;

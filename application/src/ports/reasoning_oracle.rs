//! Reasoning oracle port
//!
//! Defines the interface to whatever derives new beliefs and desires from
//! the current beliefs: a rule engine, a knowledge graph, or a language
//! model behind an API.

use async_trait::async_trait;
use bdi_domain::{Belief, Desire};
use thiserror::Error;

/// Errors an oracle call can end with.
///
/// Every variant makes the cycle skip the affected phase for the tick.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OracleError {
    #[error("Oracle unavailable: {0}")]
    Unavailable(String),

    #[error("Oracle timed out")]
    Timeout,

    #[error("Invalid oracle response: {0}")]
    InvalidResponse(String),
}

/// Opaque reasoning capability consumed by the cognitive cycle.
#[async_trait]
pub trait ReasoningOracle: Send + Sync {
    /// Beliefs entailed by `beliefs`. They are revised into the store.
    async fn infer(&self, beliefs: &[Belief]) -> Result<Vec<Belief>, OracleError>;

    /// Desires worth pursuing given `beliefs`.
    async fn generate_desires(&self, beliefs: &[Belief]) -> Result<Vec<Desire>, OracleError>;
}

/// Oracle that never infers or desires anything.
pub struct NoReasoning;

#[async_trait]
impl ReasoningOracle for NoReasoning {
    async fn infer(&self, _beliefs: &[Belief]) -> Result<Vec<Belief>, OracleError> {
        Ok(Vec::new())
    }

    async fn generate_desires(&self, _beliefs: &[Belief]) -> Result<Vec<Desire>, OracleError> {
        Ok(Vec::new())
    }
}

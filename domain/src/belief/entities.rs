//! Belief entities

use crate::core::error::DomainError;
use crate::core::ids::BeliefId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Prefix that turns a predicate into its negation (`is` vs `not_is`).
pub const NEGATION_PREFIX: &str = "not_";

/// Identity key of a belief.
///
/// Two beliefs with equal keys are the same belief: revising with a new
/// value supersedes the incumbent instead of adding a second one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BeliefKey {
    /// Key/value style belief (`temp = 25`).
    Named { name: String },
    /// Subject/predicate/object style belief (`light1 is on`).
    Triple {
        subject: String,
        predicate: String,
        object: String,
    },
}

impl BeliefKey {
    pub fn named(name: impl Into<String>) -> Self {
        BeliefKey::Named { name: name.into() }
    }

    pub fn triple(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        BeliefKey::Triple {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }

    /// The subject of a triple, or the name of a named belief.
    pub fn subject(&self) -> &str {
        match self {
            BeliefKey::Named { name } => name,
            BeliefKey::Triple { subject, .. } => subject,
        }
    }

    pub fn predicate(&self) -> Option<&str> {
        match self {
            BeliefKey::Named { .. } => None,
            BeliefKey::Triple { predicate, .. } => Some(predicate),
        }
    }

    pub fn object(&self) -> Option<&str> {
        match self {
            BeliefKey::Named { .. } => None,
            BeliefKey::Triple { object, .. } => Some(object),
        }
    }

    /// True when both keys are triples on the same subject and object whose
    /// predicates are `P` and `not_P`.
    pub fn negates(&self, other: &BeliefKey) -> bool {
        match (self, other) {
            (
                BeliefKey::Triple {
                    subject: s1,
                    predicate: p1,
                    object: o1,
                },
                BeliefKey::Triple {
                    subject: s2,
                    predicate: p2,
                    object: o2,
                },
            ) if s1 == s2 && o1 == o2 => {
                p1.strip_prefix(NEGATION_PREFIX) == Some(p2.as_str())
                    || p2.strip_prefix(NEGATION_PREFIX) == Some(p1.as_str())
            }
            _ => false,
        }
    }
}

impl std::fmt::Display for BeliefKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BeliefKey::Named { name } => write!(f, "{}", name),
            BeliefKey::Triple {
                subject,
                predicate,
                object,
            } => write!(f, "{} {} {}", subject, predicate, object),
        }
    }
}

/// Confidence of a belief, always within `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Certainty(f64);

impl Certainty {
    pub const CERTAIN: Certainty = Certainty(1.0);

    pub fn new(value: f64) -> Result<Self, DomainError> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(DomainError::InvalidCertainty(value))
        }
    }

    /// Clamp an untrusted value (oracle output, percept) into range.
    ///
    /// NaN maps to 0.0.
    pub fn saturating(value: f64) -> Self {
        if value.is_nan() {
            Self(0.0)
        } else {
            Self(value.clamp(0.0, 1.0))
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for Certainty {
    fn default() -> Self {
        Self::CERTAIN
    }
}

impl TryFrom<f64> for Certainty {
    type Error = DomainError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Certainty> for f64 {
    fn from(c: Certainty) -> Self {
        c.0
    }
}

/// Marks a belief as excluded from desire generation until clarified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewFlag {
    pub reason: String,
    /// The belief it could not be reconciled with, if any.
    pub counterpart: Option<BeliefId>,
    pub flagged_at: DateTime<Utc>,
}

/// A timestamped, certainty-weighted fact held by an agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Belief {
    pub id: BeliefId,
    pub key: BeliefKey,
    /// Opaque content.
    pub value: Value,
    pub certainty: Certainty,
    pub timestamp: DateTime<Utc>,
    /// Where the belief came from (percept, sender id, "inference", ...).
    pub source: Option<String>,
    pub review: Option<ReviewFlag>,
}

impl Belief {
    pub fn new(key: BeliefKey, value: impl Into<Value>) -> Self {
        Self {
            id: BeliefId::generate(),
            key,
            value: value.into(),
            certainty: Certainty::CERTAIN,
            timestamp: Utc::now(),
            source: None,
            review: None,
        }
    }

    pub fn named(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(BeliefKey::named(name), value)
    }

    /// A triple belief; its value defaults to `true`.
    pub fn triple(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self::new(BeliefKey::triple(subject, predicate, object), Value::Bool(true))
    }

    pub fn with_id(mut self, id: impl Into<BeliefId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_certainty(mut self, certainty: Certainty) -> Self {
        self.certainty = certainty;
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// The ontology concept this belief asserts: the object of a triple.
    pub fn concept(&self) -> Option<&str> {
        self.key.object()
    }

    pub fn is_flagged(&self) -> bool {
        self.review.is_some()
    }

    pub fn flag(&mut self, reason: impl Into<String>, counterpart: Option<BeliefId>) {
        self.review = Some(ReviewFlag {
            reason: reason.into(),
            counterpart,
            flagged_at: Utc::now(),
        });
    }
}

/// A raw observation from the environment, turned into a candidate belief
/// during the perceive phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Percept {
    pub key: BeliefKey,
    pub value: Value,
    #[serde(default)]
    pub certainty: Certainty,
    #[serde(default)]
    pub source: Option<String>,
}

impl Percept {
    pub fn new(key: BeliefKey, value: impl Into<Value>) -> Self {
        Self {
            key,
            value: value.into(),
            certainty: Certainty::CERTAIN,
            source: None,
        }
    }

    pub fn with_certainty(mut self, certainty: Certainty) -> Self {
        self.certainty = certainty;
        self
    }

    pub fn into_belief(self, observed_at: DateTime<Utc>) -> Belief {
        let mut belief = Belief::new(self.key, self.value)
            .with_certainty(self.certainty)
            .with_timestamp(observed_at);
        belief.source = Some(self.source.unwrap_or_else(|| "percept".to_string()));
        belief
    }
}

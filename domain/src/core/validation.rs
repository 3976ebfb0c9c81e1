//! Configuration issues.
//!
//! Configuration problems are collected as [`ConfigIssue`]s with a
//! severity instead of aborting on the first one, so that a caller can print
//! every warning and only refuse to start on [`Severity::Error`].
//!
//! # Examples
//!
//! ```
//! use bdi_domain::core::validation::{ConfigIssue, ConfigIssueCode, Severity};
//!
//! let issues = vec![ConfigIssue::warning(
//!     ConfigIssueCode::EmptySection { section: "agents".to_string() },
//!     "no agents configured",
//! )];
//! assert!(!ConfigIssue::has_errors(&issues));
//! ```

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the configuration cannot work at all.
    Error,
    /// Non-fatal: the configuration works but may not behave as expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// A numeric or enumerated field holds a value outside its domain.
    InvalidValue { field: String, value: String },
    /// A field refers to something that is not defined (agent, concept, ...).
    UnknownReference { field: String, value: String },
    /// Two agents share the same id.
    DuplicateAgent { id: String },
    /// A section that is expected to have entries is empty.
    EmptySection { section: String },
}

/// A detected issue in the configuration.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    /// Check whether any issues are errors (i.e. fatal).
    pub fn has_errors(issues: &[ConfigIssue]) -> bool {
        issues.iter().any(|i| i.severity == Severity::Error)
    }
}

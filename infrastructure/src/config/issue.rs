//! Configuration issues reported by [`FileConfig::validate`](super::FileConfig::validate).

use std::fmt;

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the configuration cannot work at all.
    Error,
    /// Non-fatal: a default is used instead of the configured value.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// A string field holds a value outside its fixed set.
    InvalidEnumValue {
        field: String,
        value: String,
        valid_values: Vec<String>,
    },
    /// A numeric limit that must be positive is zero.
    ZeroValue { field: String },
    /// A numeric value is outside its accepted range.
    OutOfRange { field: String, value: String },
}

/// A detected issue in the configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    pub(crate) fn invalid_enum(field: &str, value: &str, valid: &[&str], fallback: &str) -> Self {
        Self::warning(
            ConfigIssueCode::InvalidEnumValue {
                field: field.to_string(),
                value: value.to_string(),
                valid_values: valid.iter().map(|v| v.to_string()).collect(),
            },
            format!(
                "{}: unknown value '{}', falling back to '{}'",
                field, value, fallback
            ),
        )
    }

    pub(crate) fn zero(field: &str, fallback: impl fmt::Display) -> Self {
        Self::warning(
            ConfigIssueCode::ZeroValue {
                field: field.to_string(),
            },
            format!("{}: must be greater than 0, using {}", field, fallback),
        )
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

//! Structured error types shared across skyemit crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`SkyError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (lengths, units, paths, etc.).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.context.insert(key.into(), value.to_string());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for emission model construction and evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum SkyError {
    /// Frequency argument was empty, non-positive or non-finite.
    #[error("invalid frequency input: {0}")]
    InvalidFrequencyInput(ErrorInfo),
    /// Template or spectral parameter maps disagree in length.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(ErrorInfo),
    /// Conversion between incompatible units was requested.
    #[error("unit mismatch: {0}")]
    UnitMismatch(ErrorInfo),
    /// A matrix could not be made positive definite within the iteration cap.
    #[error("numerical instability: {0}")]
    NumericalInstability(ErrorInfo),
    /// A construction parameter failed validation.
    #[error("invalid parameter: {0}")]
    InvalidParameter(ErrorInfo),
    /// Reading maps, tables or configuration from storage failed.
    #[error("io error: {0}")]
    Io(ErrorInfo),
    /// Serialization and schema errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl SkyError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            SkyError::InvalidFrequencyInput(info)
            | SkyError::ShapeMismatch(info)
            | SkyError::UnitMismatch(info)
            | SkyError::NumericalInstability(info)
            | SkyError::InvalidParameter(info)
            | SkyError::Io(info)
            | SkyError::Serde(info) => info,
        }
    }

    /// Shorthand for a [`SkyError::ShapeMismatch`] between two named lengths.
    pub fn shape_mismatch(what: &str, expected: usize, found: usize) -> Self {
        SkyError::ShapeMismatch(
            ErrorInfo::new("length-mismatch", format!("{what} has the wrong length"))
                .with_context("expected", expected)
                .with_context("found", found),
        )
    }
}

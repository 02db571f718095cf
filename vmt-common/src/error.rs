//! Error handling for the VM translator
//!
//! This module defines the boundary errors raised while reading VM source
//! and the diagnostic reporting used by the driver.

use crate::source_loc::SourceLocation;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors detected before an instruction reaches the code generator
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TranslatorError {
    #[error("Parse error at {location}: {message}")]
    ParseError {
        location: SourceLocation,
        message: String,
    },

    #[error("Invalid operand at {location}: {message}")]
    OperandError {
        location: SourceLocation,
        message: String,
    },

    #[error("IO error: {message}")]
    IoError { message: String },

    #[error("Internal translator error: {message}")]
    InternalError { message: String },
}

impl TranslatorError {
    /// Create a parse error
    pub fn parse_error(message: String, location: SourceLocation) -> Self {
        TranslatorError::ParseError { location, message }
    }

    /// Create an operand validation error
    pub fn operand_error(message: String, location: SourceLocation) -> Self {
        TranslatorError::OperandError { location, message }
    }

    /// Location of the offending line, if the error has one
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            TranslatorError::ParseError { location, .. }
            | TranslatorError::OperandError { location, .. } => Some(location),
            TranslatorError::IoError { .. } | TranslatorError::InternalError { .. } => None,
        }
    }
}

/// Convert from std::io::Error
impl From<std::io::Error> for TranslatorError {
    fn from(err: std::io::Error) -> Self {
        TranslatorError::IoError {
            message: err.to_string(),
        }
    }
}

/// Convert from String (for simple error cases)
impl From<String> for TranslatorError {
    fn from(message: String) -> Self {
        TranslatorError::InternalError { message }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A diagnostic message with optional location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub location: Option<SourceLocation>,
}

impl Diagnostic {
    pub fn error(message: String, location: Option<SourceLocation>) -> Self {
        Self {
            severity: Severity::Error,
            message,
            location,
        }
    }

    pub fn warning(message: String, location: Option<SourceLocation>) -> Self {
        Self {
            severity: Severity::Warning,
            message,
            location,
        }
    }
}

impl From<&TranslatorError> for Diagnostic {
    fn from(err: &TranslatorError) -> Self {
        Diagnostic::error(err.to_string(), err.location().cloned())
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)
    }
}

/// Error reporter for collecting and displaying diagnostics
#[derive(Debug, Default)]
pub struct ErrorReporter {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
    warning_count: usize,
}

impl ErrorReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a translator error
    pub fn report(&mut self, err: &TranslatorError) {
        self.diagnostics.push(Diagnostic::from(err));
        self.error_count += 1;
    }

    /// Record a warning
    pub fn warning(&mut self, message: String, location: Option<SourceLocation>) {
        self.diagnostics.push(Diagnostic::warning(message, location));
        self.warning_count += 1;
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Print all diagnostics to stderr
    pub fn print_diagnostics(&self) {
        for diagnostic in &self.diagnostics {
            eprintln!("{}", diagnostic);
        }
    }

    /// Create a summary string
    pub fn summary(&self) -> String {
        match (self.error_count, self.warning_count) {
            (0, 0) => "No errors or warnings".to_string(),
            (0, w) => format!("{} warning{}", w, if w == 1 { "" } else { "s" }),
            (e, 0) => format!("{} error{}", e, if e == 1 { "" } else { "s" }),
            (e, w) => format!(
                "{} error{} and {} warning{}",
                e,
                if e == 1 { "" } else { "s" },
                w,
                if w == 1 { "" } else { "s" }
            ),
        }
    }
}

//! Validation findings.
//!
//! Validation never fails; structural problems are collected as
//! [`ValidationError`] values and returned to the caller.

use std::fmt;

use crate::action::ActionDefinition;
use crate::control::ExecutableStatement;

/// Error codes for validation findings
pub mod error_codes {
    pub const OK: &str = "OK";
    pub const MISSING: &str = "MISSING";
    pub const REFERENCES_UNKNOWN_VARIABLE: &str = "REFERENCES_UNKNOWN_VARIABLE";
    pub const UNINITIALIZED: &str = "UNINITIALIZED";
    pub const OUTPUT_MISSING: &str = "OUTPUT_MISSING";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationErrorKind {
    Ok,
    Missing,
    ReferencesUnknownVariable,
    Uninitialized,
    OutputMissing,
}

impl ValidationErrorKind {
    pub fn code(self) -> &'static str {
        match self {
            ValidationErrorKind::Ok => error_codes::OK,
            ValidationErrorKind::Missing => error_codes::MISSING,
            ValidationErrorKind::ReferencesUnknownVariable => {
                error_codes::REFERENCES_UNKNOWN_VARIABLE
            }
            ValidationErrorKind::Uninitialized => error_codes::UNINITIALIZED,
            ValidationErrorKind::OutputMissing => error_codes::OUTPUT_MISSING,
        }
    }
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A problem found on one parameter of a statement.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Statement the finding is about
    pub statement: ExecutableStatement,
    /// Input, output, resource or attribute name
    pub parameter: String,
    pub kind: ValidationErrorKind,
    pub message: String,
}

impl ValidationError {
    pub fn new(
        statement: impl Into<ExecutableStatement>,
        parameter: impl Into<String>,
        kind: ValidationErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            statement: statement.into(),
            parameter: parameter.into(),
            kind,
            message: message.into(),
        }
    }

    /// The action definition, when the finding is about one.
    pub fn action(&self) -> Option<&ActionDefinition> {
        match &self.statement {
            ExecutableStatement::Action(action) => Some(action),
            ExecutableStatement::Control(_) => None,
        }
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} '{}': {}",
            self.kind.code(),
            self.statement.describe(),
            self.parameter,
            self.message
        )
    }
}

impl std::error::Error for ValidationError {}

/// Formats a list of findings, one per line.
pub struct ValidationReport<'a>(pub &'a [ValidationError]);

impl fmt::Display for ValidationReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "No validation errors");
        }
        write!(f, "Validation errors ({} issues):", self.0.len())?;
        for (i, err) in self.0.iter().enumerate() {
            write!(f, "\n  {}. {}", i + 1, err)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_display_and_report() {
        let action = ActionDefinition::new("ReportComponent");
        let err = ValidationError::new(
            action.clone(),
            "data",
            ValidationErrorKind::ReferencesUnknownVariable,
            "Input references unknown variable.",
        );

        assert_eq!(err.code(), "REFERENCES_UNKNOWN_VARIABLE");
        assert_eq!(err.action(), Some(&action));
        assert_eq!(
            err.to_string(),
            "[REFERENCES_UNKNOWN_VARIABLE] action 'ReportComponent' 'data': Input references unknown variable."
        );

        let report = ValidationReport(std::slice::from_ref(&err)).to_string();
        assert!(report.starts_with("Validation errors (1 issues):"));
        assert_eq!(ValidationReport(&[]).to_string(), "No validation errors");
    }
}

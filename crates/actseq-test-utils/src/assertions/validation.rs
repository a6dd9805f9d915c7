use actseq_dom::{ValidationError, ValidationErrorKind, ValidationReport};
use thiserror::Error;

/// Error type for validation assertion failures
#[derive(Debug, Error)]
pub enum ValidationAssertionError {
    #[error("Expected no validation errors. {0}")]
    Unexpected(String),

    #[error("Expected exactly one validation error, found {count}. {report}")]
    WrongCount { count: usize, report: String },

    #[error("Expected {expected} on '{expected_parameter}', found {actual}")]
    Mismatch {
        expected: ValidationErrorKind,
        expected_parameter: String,
        actual: String,
    },
}

/// Asserts that validation produced no findings.
pub fn assert_no_validation_errors(
    errors: &[ValidationError],
) -> Result<(), ValidationAssertionError> {
    if errors.is_empty() {
        return Ok(());
    }
    Err(ValidationAssertionError::Unexpected(
        ValidationReport(errors).to_string(),
    ))
}

/// Asserts that validation produced exactly one finding, of `kind` and
/// about `parameter`. Returns the finding for further checks.
pub fn assert_single_validation_error<'a>(
    errors: &'a [ValidationError],
    parameter: &str,
    kind: ValidationErrorKind,
) -> Result<&'a ValidationError, ValidationAssertionError> {
    let [error] = errors else {
        return Err(ValidationAssertionError::WrongCount {
            count: errors.len(),
            report: ValidationReport(errors).to_string(),
        });
    };
    if error.kind != kind || error.parameter != parameter {
        return Err(ValidationAssertionError::Mismatch {
            expected: kind,
            expected_parameter: parameter.to_string(),
            actual: error.to_string(),
        });
    }
    Ok(error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actseq_dom::ActionDefinition;

    fn finding(parameter: &str, kind: ValidationErrorKind) -> ValidationError {
        ValidationError::new(ActionDefinition::new("Report"), parameter, kind, "Missing input.")
    }

    #[test]
    fn test_no_errors() {
        assert!(assert_no_validation_errors(&[]).is_ok());
        let err = assert_no_validation_errors(&[finding("data", ValidationErrorKind::Missing)])
            .unwrap_err();
        assert!(err.to_string().contains("[MISSING] action 'Report' 'data'"));
    }

    #[test]
    fn test_single_error() {
        let errors = vec![finding("data", ValidationErrorKind::Missing)];
        assert!(assert_single_validation_error(&errors, "data", ValidationErrorKind::Missing).is_ok());
        assert!(matches!(
            assert_single_validation_error(&errors, "data", ValidationErrorKind::Uninitialized),
            Err(ValidationAssertionError::Mismatch { .. })
        ));
        assert!(matches!(
            assert_single_validation_error(&[], "data", ValidationErrorKind::Missing),
            Err(ValidationAssertionError::WrongCount { count: 0, .. })
        ));
    }
}

//! Rules over the submission as a whole: the declared variable count, the
//! collection name and the ordering invariant of a finished model.
use crate::form::fields::{COLLECTION_NAME, VARIABLE_NUMBER};
use crate::form::FieldKey;
use crate::model::{ParameterExpr, Variable};
use crate::validation::error::{ValidationError, ValidationErrorType, NON_FIELD_ERRORS, REQUIRED_MESSAGE};

/// Parses the count chosen in the first step of the direct-input flow.
pub(crate) fn parse_variable_number(raw: Option<&str>, max: usize) -> Result<usize, ValidationError> {
    let invalid = |message: String| ValidationError::new(VARIABLE_NUMBER, ValidationErrorType::InvalidVariableCount, message);

    let raw = raw.map(str::trim).filter(|s| !s.is_empty()).ok_or_else(|| invalid(REQUIRED_MESSAGE.to_string()))?;
    let count: i64 = raw.parse().map_err(|_| invalid("Enter a whole number.".to_string()))?;
    if count < 1 {
        return Err(invalid("Ensure this value is greater than or equal to 1.".to_string()));
    }
    if count as u64 > max as u64 {
        return Err(invalid(format!("Ensure this value is less than or equal to {}.", max)));
    }
    Ok(count as usize)
}

pub(crate) fn check_variable_count(submitted: usize, variable_count: usize) -> Option<ValidationError> {
    (submitted != variable_count).then(|| {
        ValidationError::new(
            NON_FIELD_ERRORS,
            ValidationErrorType::VariableCountMismatch,
            format!("Expected {} variables, but {} were submitted.", variable_count, submitted),
        )
    })
}

pub(crate) fn check_collection_name(name: Option<&str>) -> Result<&str, ValidationError> {
    name.map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ValidationError::new(COLLECTION_NAME, ValidationErrorType::EmptyCollectionName, REQUIRED_MESSAGE))
}

/// Checks a built model: its length, that each index equals its position, and
/// that every dependent slot reads from a strictly earlier variable.
pub(crate) fn check_ordering(variables: &[Variable], variable_count: usize) -> Vec<ValidationError> {
    let mut errors: Vec<ValidationError> = check_variable_count(variables.len(), variable_count).into_iter().collect();

    for (position, variable) in variables.iter().enumerate() {
        if variable.index != position {
            errors.push(ValidationError::new(
                NON_FIELD_ERRORS,
                ValidationErrorType::IndexMismatch,
                format!("Variable '{}' has index {} but sits at position {}.", variable.name, variable.index, position),
            ));
        }
        for (kind, expr) in variable.parameters() {
            if let Some(source) = expr.source().filter(|&s| s >= position) {
                errors.push(ValidationError::new(
                    FieldKey::Dependency(kind, position).to_string(),
                    ValidationErrorType::ForwardReference,
                    format!(
                        "A parameter of variable {} can only depend on a preceding variable, not on variable {}.",
                        position, source
                    ),
                ));
            }
        }
    }
    errors
}

/// Checks that every dependent slot of a built model carries exactly as many
/// coefficients as its function form takes.
pub(crate) fn check_arity(variables: &[Variable]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for (position, variable) in variables.iter().enumerate() {
        for (kind, expr) in variable.parameters() {
            if let ParameterExpr::Dependent { form, function, coefficients, .. } = expr {
                if coefficients.len() != function.arity() {
                    errors.push(ValidationError::new(
                        FieldKey::Dependency(kind, position).to_string(),
                        ValidationErrorType::CoefficientCountMismatch,
                        format!(
                            "Function form {} takes {} coefficients, but {} were given.",
                            form.0,
                            function.arity(),
                            coefficients.len()
                        ),
                    ));
                }
            }
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Distribution, FunctionFormId, FunctionKind};
    use rstest::rstest;
    use smallvec::smallvec;

    fn constant_variable(index: usize) -> Variable {
        Variable {
            index,
            name: format!("V{}", index),
            symbol: format!("V{}", index),
            distribution: Distribution::Normal,
            scale: ParameterExpr::Constant(1.0),
            shape: ParameterExpr::Constant(1.0),
            location: ParameterExpr::Constant(0.0),
        }
    }

    #[rstest]
    #[case("2", 2)]
    #[case(" 1 ", 1)]
    #[case("10", 10)]
    fn test_variable_number_accepts(#[case] raw: &str, #[case] expected: usize) {
        assert_eq!(parse_variable_number(Some(raw), 10), Ok(expected));
    }

    #[rstest]
    #[case(None, "This field is required.")]
    #[case(Some(""), "This field is required.")]
    #[case(Some("two"), "Enter a whole number.")]
    #[case(Some("1.5"), "Enter a whole number.")]
    #[case(Some("0"), "Ensure this value is greater than or equal to 1.")]
    #[case(Some("-3"), "Ensure this value is greater than or equal to 1.")]
    #[case(Some("11"), "Ensure this value is less than or equal to 10.")]
    fn test_variable_number_rejects(#[case] raw: Option<&str>, #[case] message: &str) {
        let err = parse_variable_number(raw, 10).unwrap_err();
        assert_eq!(err.field, "variable_number");
        assert_eq!(err.message, message);
    }

    #[test]
    fn test_blank_collection_name() {
        assert_eq!(check_collection_name(Some(" Direct input model ")), Ok("Direct input model"));
        let err = check_collection_name(Some("   ")).unwrap_err();
        assert_eq!(err.error_type, ValidationErrorType::EmptyCollectionName);
        assert!(check_collection_name(None).is_err());
    }

    #[test]
    fn test_ordering_accepts_backward_dependencies() {
        let mut second = constant_variable(1);
        second.scale = ParameterExpr::Dependent {
            source: 0,
            form: FunctionFormId(1),
            function: FunctionKind::Power3,
            coefficients: smallvec![1.0, 1.0, 1.0],
        };
        assert!(check_ordering(&[constant_variable(0), second], 2).is_empty());
    }

    #[test]
    fn test_ordering_flags_each_violation() {
        let mut first = constant_variable(0);
        first.shape = ParameterExpr::Dependent {
            source: 0,
            form: FunctionFormId(2),
            function: FunctionKind::Exp3,
            coefficients: smallvec![1.0, 1.0, 1.0],
        };
        let errors = check_ordering(&[first, constant_variable(5)], 3);
        let kinds: Vec<_> = errors.iter().map(|e| e.error_type).collect();
        assert_eq!(
            kinds,
            vec![
                ValidationErrorType::VariableCountMismatch,
                ValidationErrorType::ForwardReference,
                ValidationErrorType::IndexMismatch,
            ]
        );
        assert_eq!(errors[1].field, "shape_dependency_0");
    }

    #[test]
    fn test_arity_flags_short_coefficient_lists() {
        let mut second = constant_variable(1);
        second.location = ParameterExpr::Dependent {
            source: 0,
            form: FunctionFormId(6),
            function: FunctionKind::Logistics4,
            coefficients: smallvec![1.0],
        };
        assert!(check_arity(&[constant_variable(0)]).is_empty());

        let errors = check_arity(&[constant_variable(0), second]);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].error_type, ValidationErrorType::CoefficientCountMismatch);
        assert_eq!(errors[0].field, "location_dependency_1");
        assert_eq!(errors[0].message, "Function form 6 takes 4 coefficients, but 1 were given.");
    }
}

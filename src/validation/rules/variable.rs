//! Rule for a single variable: its labels, its distribution and its three
//! parameter slots.
use super::expression;
use crate::config::Settings;
use crate::form::{FieldKey, VariableDraft};
use crate::model::{Distribution, ParameterExpr, ParameterKind, Variable};
use crate::validation::error::{ValidationError, ValidationErrorType, NOT_CAPITALIZED_MESSAGE};

pub(crate) fn validate_variable(draft: &VariableDraft, settings: &Settings) -> Result<Variable, Vec<ValidationError>> {
    let index = draft.index;
    let mut errors = Vec::new();

    let name = required(draft.name.as_deref(), FieldKey::VariableName(index), &mut errors);
    let symbol = required(draft.symbol.as_deref(), FieldKey::VariableSymbol(index), &mut errors);
    if let Some(err) = symbol.and_then(check_capitalized) {
        errors.push(err.at_field(FieldKey::VariableSymbol(index).to_string()));
    }

    let distribution = match draft.distribution.as_deref() {
        None => {
            errors.push(ValidationError::required(FieldKey::Distribution(index).to_string()));
            None
        }
        Some(value) => {
            let parsed = Distribution::from_form_value(value);
            if parsed.is_none() {
                errors.push(ValidationError::invalid_choice(
                    FieldKey::Distribution(index).to_string(),
                    ValidationErrorType::UnsupportedDistribution,
                    value,
                ));
            }
            parsed
        }
    };

    let mut slot = |kind: ParameterKind| match expression::validate_slot(draft.slot(kind), kind, index, settings) {
        Ok(expr) => Some(expr),
        Err(slot_errors) => {
            errors.extend(slot_errors);
            None
        }
    };
    let scale = slot(ParameterKind::Scale);
    let shape = slot(ParameterKind::Shape);
    let location = slot(ParameterKind::Location);

    match (name, symbol, distribution, scale, shape, location) {
        (Some(name), Some(symbol), Some(distribution), Some(scale), Some(shape), Some(location)) if errors.is_empty() => {
            Ok(Variable {
                index,
                name: name.to_string(),
                symbol: symbol.to_string(),
                distribution,
                scale,
                shape,
                location,
            })
        }
        _ => Err(errors),
    }
}

fn required<'d>(value: Option<&'d str>, field: FieldKey, errors: &mut Vec<ValidationError>) -> Option<&'d str> {
    if value.is_none() {
        errors.push(ValidationError::required(field.to_string()));
    }
    value
}

/// A symbol such as `Hs` or `Tp` must not start with a lowercase letter.
/// Digits and symbols in first position are accepted.
pub(crate) fn check_capitalized(text: &str) -> Option<ValidationError> {
    text.chars().next().filter(|c| c.is_lowercase()).map(|_| ValidationError {
        field: String::new(), // Orchestrator will set this.
        error_type: ValidationErrorType::NameNotCapitalized,
        message: NOT_CAPITALIZED_MESSAGE.to_string(),
    })
}

/// Whether any slot of the variable reads from an earlier variable.
pub(crate) fn is_conditional(variable: &Variable) -> bool {
    variable.parameters().any(|(_, expr)| matches!(expr, ParameterExpr::Dependent { .. }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::FormData;
    use crate::form::SubmissionDraft;

    fn draft(pairs: &[(&str, &str)], index: usize) -> VariableDraft {
        let data: FormData = pairs.iter().copied().collect();
        SubmissionDraft::parse(&data, index + 1).variables.swap_remove(index)
    }

    #[test]
    fn test_constant_weibull() {
        let v = draft(
            &[
                ("variable_name_0", "significant wave height [m]"),
                ("variable_symbol_0", "Hs"),
                ("distribution_0", "Weibull"),
                ("scale_0_0", "2.7"),
                ("shape_0_0", "1.5"),
                ("location_0_0", "0.9"),
            ],
            0,
        );
        let variable = validate_variable(&v, &Settings::default()).unwrap();
        assert_eq!(variable.distribution, Distribution::Weibull);
        assert_eq!(variable.scale, ParameterExpr::Constant(2.7));
        assert_eq!(variable.shape, ParameterExpr::Constant(1.5));
        assert_eq!(variable.location, ParameterExpr::Constant(0.9));
        assert!(!is_conditional(&variable));
    }

    #[test]
    fn test_lowercase_symbol_uses_verbatim_message() {
        let v = draft(
            &[
                ("variable_name_0", "significant wave height [m]"),
                ("variable_symbol_0", "hs"),
                ("distribution_0", "Weibull"),
                ("scale_0_0", "2.7"),
                ("shape_0_0", "1.5"),
                ("location_0_0", "0.9"),
            ],
            0,
        );
        let errors = validate_variable(&v, &Settings::default()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "variable_symbol_0");
        assert_eq!(errors[0].error_type, ValidationErrorType::NameNotCapitalized);
        assert_eq!(errors[0].message, "The first characer should be capizalized.");
    }

    #[test]
    fn test_collects_every_problem() {
        let v = draft(
            &[
                ("variable_symbol_1", "tp"),
                ("distribution_1", "Gumbel"),
                ("scale_dependency_1", "1f2"),
                ("shape_1_0", "abc"),
            ],
            1,
        );
        let errors = validate_variable(&v, &Settings::default()).unwrap_err();
        let kinds: Vec<_> = errors.iter().map(|e| e.error_type).collect();
        assert_eq!(
            kinds,
            vec![
                ValidationErrorType::MissingField,
                ValidationErrorType::NameNotCapitalized,
                ValidationErrorType::UnsupportedDistribution,
                ValidationErrorType::ForwardReference,
                ValidationErrorType::NonNumericCoefficient,
                ValidationErrorType::MissingField,
            ]
        );
        assert_eq!(errors.last().unwrap().field, "location_1_0");
    }

    #[test]
    fn test_capitalization_ignores_non_letters() {
        assert!(check_capitalized("Hs").is_none());
        assert!(check_capitalized("1yr").is_none());
        assert!(check_capitalized("θ").is_some());
    }
}

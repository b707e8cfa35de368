//! Rule for parameter expressions: the dependency token of a slot and the
//! coefficients that go with it.
use crate::config::Settings;
use crate::form::{FieldKey, SlotDraft};
use crate::model::{Coefficients, DependencyEncoding, FunctionFormId, FunctionKind, ParameterExpr, ParameterKind};
use crate::validation::error::{ValidationError, ValidationErrorType};

/// A dependency field after parsing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum DependencyToken {
    Independent,
    Dependent(DependencyEncoding, FunctionKind),
}

/// Parses `"{source}f{form}"`, the no-dependency sentinel, or an absent field.
///
/// The source must name a variable strictly before `variable_index`, which is
/// what keeps every model acyclic without a graph search.
pub(crate) fn parse_dependency_token(
    token: Option<&str>,
    kind: ParameterKind,
    variable_index: usize,
    settings: &Settings,
) -> Result<DependencyToken, ValidationError> {
    let field = FieldKey::Dependency(kind, variable_index);
    let token = match token.map(str::trim) {
        None | Some("") => return Ok(DependencyToken::Independent),
        Some(t) if t == settings.no_dependency_token.trim() => return Ok(DependencyToken::Independent),
        Some(t) => t,
    };

    let malformed = || {
        ValidationError::invalid_choice(field.to_string(), ValidationErrorType::MalformedDependencyToken, token)
    };
    let forward = |source: &str| {
        ValidationError::new(
            field.to_string(),
            ValidationErrorType::ForwardReference,
            format!(
                "A parameter of variable {} can only depend on a preceding variable, not on variable {}.",
                variable_index, source
            ),
        )
    };

    let (source, form) = token.split_once('f').ok_or_else(malformed)?;
    if !is_digits(form) {
        return Err(malformed());
    }
    if source.strip_prefix('-').is_some_and(is_digits) {
        return Err(forward(source));
    }
    if !is_digits(source) {
        return Err(malformed());
    }

    let form_id = form.parse::<u8>().map(FunctionFormId).map_err(|_| malformed())?;
    let function = settings.function_forms.get(form_id).ok_or_else(malformed)?;

    // Digits that overflow usize are certainly not an earlier variable.
    let source_index = source.parse::<usize>().map_err(|_| forward(source))?;
    if source_index >= variable_index {
        return Err(forward(source));
    }

    Ok(DependencyToken::Dependent(DependencyEncoding { source: source_index, form: form_id }, function))
}

/// Validates one parameter slot and builds its expression. All problems with
/// the slot are reported, not just the first.
pub(crate) fn validate_slot(
    slot: &SlotDraft,
    kind: ParameterKind,
    variable_index: usize,
    settings: &Settings,
) -> Result<ParameterExpr, Vec<ValidationError>> {
    match parse_dependency_token(slot.dependency.as_deref(), kind, variable_index, settings) {
        Ok(DependencyToken::Independent) => constant(slot, kind, variable_index).map_err(|e| vec![e]),
        Ok(DependencyToken::Dependent(encoding, function)) => {
            dependent(slot, kind, variable_index, encoding, function)
        }
        Err(token_error) => {
            // The arity is unknown, but the coefficients can still be checked.
            let (_, mut errors) = parse_coefficients(slot, kind, variable_index);
            errors.insert(0, token_error);
            Err(errors)
        }
    }
}

fn constant(slot: &SlotDraft, kind: ParameterKind, variable_index: usize) -> Result<ParameterExpr, ValidationError> {
    let field = FieldKey::Coefficient(kind, variable_index, 0).to_string();
    // Only the first coefficient field carries a constant; the form keeps
    // rendering the others, and they are ignored.
    let raw = slot.coefficients.get(&0).ok_or_else(|| ValidationError::required(field.clone()))?;
    parse_number(raw)
        .map(ParameterExpr::Constant)
        .ok_or_else(|| ValidationError::not_a_number(field))
}

fn dependent(
    slot: &SlotDraft,
    kind: ParameterKind,
    variable_index: usize,
    encoding: DependencyEncoding,
    function: FunctionKind,
) -> Result<ParameterExpr, Vec<ValidationError>> {
    let (coefficients, mut errors) = parse_coefficients(slot, kind, variable_index);

    let arity = function.arity();
    let given = slot.coefficients.len();
    let contiguous = slot.coefficients.keys().copied().eq(0..given);
    if given != arity {
        errors.push(ValidationError::new(
            FieldKey::Dependency(kind, variable_index).to_string(),
            ValidationErrorType::CoefficientCountMismatch,
            format!("Function form {} takes {} coefficients, but {} were given.", encoding.form.0, arity, given),
        ));
    } else if !contiguous {
        errors.push(ValidationError::new(
            FieldKey::Dependency(kind, variable_index).to_string(),
            ValidationErrorType::CoefficientCountMismatch,
            format!("Function form {} takes coefficients at positions 0 to {}.", encoding.form.0, arity - 1),
        ));
    }

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(ParameterExpr::Dependent {
        source: encoding.source,
        form: encoding.form,
        function,
        coefficients,
    })
}

fn parse_coefficients(
    slot: &SlotDraft,
    kind: ParameterKind,
    variable_index: usize,
) -> (Coefficients, Vec<ValidationError>) {
    let mut values = Coefficients::new();
    let mut errors = Vec::new();
    for (&position, raw) in &slot.coefficients {
        match parse_number(raw) {
            Some(v) => values.push(v),
            None => errors.push(ValidationError::not_a_number(
                FieldKey::Coefficient(kind, variable_index, position).to_string(),
            )),
        }
    }
    (values, errors)
}

/// Finite floats only; `"nan"` and `"inf"` parse in Rust but are not numbers here.
fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

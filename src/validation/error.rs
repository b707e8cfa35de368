//! Defines the error types for the validation module.
use serde::Serialize;
use std::collections::BTreeMap;

/// Field key for errors that belong to the submission as a whole.
pub const NON_FIELD_ERRORS: &str = "__all__";

/// Shown when the symbol of a variable starts with a lowercase letter. Existing
/// consumers match on this exact text, spelling included.
pub const NOT_CAPITALIZED_MESSAGE: &str = "The first characer should be capizalized.";

pub const REQUIRED_MESSAGE: &str = "This field is required.";

/// The specific category of a validation error, for callers that branch on
/// the kind rather than the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ValidationErrorType {
    MalformedDependencyToken,
    ForwardReference,
    CoefficientCountMismatch,
    NonNumericCoefficient,
    NameNotCapitalized,
    UnsupportedDistribution,
    VariableCountMismatch,
    EmptyCollectionName,
    InvalidVariableCount,
    IndexMismatch,
    MissingField,
}

/// A structured error report for one submitted field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// The form field the error is displayed next to.
    pub field: String,
    pub error_type: ValidationErrorType,
    /// A human-readable message explaining the error.
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, error_type: ValidationErrorType, message: impl Into<String>) -> Self {
        Self { field: field.into(), error_type, message: message.into() }
    }

    pub fn required(field: impl Into<String>) -> Self {
        Self::new(field, ValidationErrorType::MissingField, REQUIRED_MESSAGE)
    }

    pub fn invalid_choice(field: impl Into<String>, error_type: ValidationErrorType, value: &str) -> Self {
        Self::new(
            field,
            error_type,
            format!("Select a valid choice. {} is not one of the available choices.", value),
        )
    }

    pub fn not_a_number(field: impl Into<String>) -> Self {
        Self::new(field, ValidationErrorType::NonNumericCoefficient, "Enter a number.")
    }

    /// Moves the error onto another field, keeping kind and message.
    pub fn at_field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }
}

/// The outcome of validating one submission: every error found, in the order
/// the fields were checked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    errors: Vec<ValidationError>,
}

impl ValidationReport {
    pub fn new() -> Self { Self::default() }

    pub fn from_errors(errors: Vec<ValidationError>) -> Self { Self { errors } }

    pub fn push(&mut self, error: ValidationError) { self.errors.push(error); }

    pub fn extend(&mut self, errors: impl IntoIterator<Item = ValidationError>) { self.errors.extend(errors); }

    pub fn is_valid(&self) -> bool { self.errors.is_empty() }

    pub fn errors(&self) -> &[ValidationError] { &self.errors }

    pub fn has(&self, error_type: ValidationErrorType) -> bool {
        self.errors.iter().any(|e| e.error_type == error_type)
    }

    pub fn errors_for(&self, field: &str) -> impl Iterator<Item = &ValidationError> {
        let field = field.to_string();
        self.errors.iter().filter(move |e| e.field == field)
    }

    /// Field name to messages, ready for re-display beside the form.
    pub fn by_field(&self) -> BTreeMap<String, Vec<String>> {
        let mut map: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for e in &self.errors {
            map.entry(e.field.clone()).or_default().push(e.message.clone());
        }
        map
    }

    pub fn into_result<T>(self, value: T) -> Result<T, ValidationReport> {
        if self.is_valid() { Ok(value) } else { Err(self) }
    }
}

impl From<Vec<ValidationError>> for ValidationReport {
    fn from(errors: Vec<ValidationError>) -> Self { Self { errors } }
}

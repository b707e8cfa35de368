//! The central validator that runs every rule over a submission.
use super::error::ValidationReport;
use super::rules::{structure, variable};
use crate::config::Settings;
use crate::form::fields::VARIABLE_NUMBER;
use crate::form::{FormData, SubmissionDraft};
use crate::model::Variable;

/// A submission that passed every rule, ready to become a `ModelCollection`.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedSubmission {
    pub collection_name: String,
    pub variables: Vec<Variable>,
}

/// The orchestrator for submission validation.
///
/// Like a linter, it visits every field and collects all errors instead of
/// stopping at the first, so the submitter can fix everything in one pass.
/// Validation is pure; running it twice on the same data gives the same report.
pub struct Validator<'a> {
    settings: &'a Settings,
}

impl<'a> Validator<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }

    /// Validates the variable-count step (`variable_number`).
    pub fn validate_variable_number(&self, data: &FormData) -> Result<usize, ValidationReport> {
        structure::parse_variable_number(data.get(VARIABLE_NUMBER), self.settings.max_variable_count)
            .map_err(|e| ValidationReport::from_errors(vec![e]))
    }

    /// Validates the full model form for `variable_count` variables.
    pub fn validate(&self, data: &FormData, variable_count: usize) -> Result<ValidatedSubmission, ValidationReport> {
        let draft = SubmissionDraft::parse(data, variable_count);
        self.validate_draft(&draft, variable_count)
    }

    pub fn validate_draft(
        &self,
        draft: &SubmissionDraft,
        variable_count: usize,
    ) -> Result<ValidatedSubmission, ValidationReport> {
        let mut report = ValidationReport::new();

        if let Some(err) = structure::check_variable_count(draft.submitted.len(), variable_count) {
            report.push(err);
        }

        // Dependency tokens are checked against the index while each slot is
        // parsed, so a variable can only ever point backwards.
        let mut variables = Vec::with_capacity(variable_count);
        for v in draft.variables.iter().take(variable_count) {
            match variable::validate_variable(v, self.settings) {
                Ok(built) => variables.push(built),
                Err(errors) => report.extend(errors),
            }
        }
        // Positions only line up with indices once every variable was built.
        if variables.len() == variable_count {
            report.extend(structure::check_ordering(&variables, variable_count));
        }

        let collection_name = match structure::check_collection_name(draft.collection_name.as_deref()) {
            Ok(name) => Some(name.to_string()),
            Err(err) => {
                report.push(err);
                None
            }
        };

        match collection_name {
            Some(collection_name) if report.is_valid() => {
                let conditional = variables.iter().filter(|v| variable::is_conditional(v)).count();
                tracing::debug!(
                    collection = %collection_name,
                    variables = variables.len(),
                    conditional,
                    "submission validated"
                );
                Ok(ValidatedSubmission { collection_name, variables })
            }
            _ => {
                tracing::debug!(errors = report.errors().len(), "submission rejected");
                Err(report)
            }
        }
    }
}

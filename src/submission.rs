//! The direct-input flow for a probabilistic model.
//!
//! A submission moves `Empty -> VariableCountChosen -> FieldsEntered` and is
//! then either `Valid` (persisted, terminal) or `Invalid` (errors kept for
//! re-display, fields may be entered again). Validation failures are ordinary
//! outcomes; only store failures and out-of-order calls are errors.

use crate::config::Settings;
use crate::form::FormData;
use crate::model::{CollectionId, ModelCollection, Owner};
use crate::store::{CollectionStore, StoreError};
use crate::validation::{ValidationReport, Validator};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionState {
    Empty,
    VariableCountChosen { variable_count: usize },
    FieldsEntered { variable_count: usize, data: FormData },
    Valid { id: CollectionId },
    Invalid { variable_count: usize, report: ValidationReport },
}

impl SubmissionState {
    fn label(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::VariableCountChosen { .. } => "waiting for fields",
            Self::FieldsEntered { .. } => "waiting to be submitted",
            Self::Valid { .. } => "already persisted",
            Self::Invalid { .. } => "invalid",
        }
    }
}

/// Result of a step that validates user input.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome<T> {
    Accepted(T),
    Rejected(ValidationReport),
}

impl<T> StepOutcome<T> {
    pub fn is_accepted(&self) -> bool { matches!(self, Self::Accepted(_)) }

    pub fn report(&self) -> Option<&ValidationReport> {
        match self {
            Self::Accepted(_) => None,
            Self::Rejected(report) => Some(report),
        }
    }
}

pub type SubmitOutcome = StepOutcome<CollectionId>;

#[derive(Error, Debug)]
pub enum SubmissionError {
    #[error("Cannot {action} while the submission is {state}")]
    InvalidTransition { action: &'static str, state: &'static str },
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct Submission<'a> {
    settings: &'a Settings,
    owner: Owner,
    state: SubmissionState,
}

impl<'a> Submission<'a> {
    pub fn new(settings: &'a Settings, owner: Owner) -> Self {
        Self { settings, owner, state: SubmissionState::Empty }
    }

    pub fn state(&self) -> &SubmissionState { &self.state }

    /// First step: the number of variables. May be repeated until the
    /// submission is persisted.
    pub fn choose_variable_count(&mut self, data: &FormData) -> Result<StepOutcome<usize>, SubmissionError> {
        if matches!(self.state, SubmissionState::Valid { .. }) {
            return Err(self.transition_error("choose a variable count"));
        }
        match Validator::new(self.settings).validate_variable_number(data) {
            Ok(variable_count) => {
                self.state = SubmissionState::VariableCountChosen { variable_count };
                Ok(StepOutcome::Accepted(variable_count))
            }
            Err(report) => Ok(StepOutcome::Rejected(report)),
        }
    }

    pub fn enter_fields(&mut self, data: FormData) -> Result<(), SubmissionError> {
        let variable_count = match self.state {
            SubmissionState::VariableCountChosen { variable_count }
            | SubmissionState::Invalid { variable_count, .. } => variable_count,
            _ => return Err(self.transition_error("enter fields")),
        };
        self.state = SubmissionState::FieldsEntered { variable_count, data };
        Ok(())
    }

    /// Validates the entered fields and, if every field passes, persists the
    /// collection. Nothing is written for a rejected submission.
    pub fn submit<S: CollectionStore>(&mut self, store: &mut S) -> Result<SubmitOutcome, SubmissionError> {
        let SubmissionState::FieldsEntered { variable_count, data } = &self.state else {
            return Err(self.transition_error("submit"));
        };
        let variable_count = *variable_count;

        let validated = Validator::new(self.settings)
            .validate(data, variable_count)
            .and_then(|submission| ModelCollection::from_validated(submission, self.owner.clone()));

        match validated {
            Ok(collection) => {
                // A store failure leaves the fields entered so the submit can be retried.
                let id = store.insert(collection)?;
                self.state = SubmissionState::Valid { id };
                Ok(StepOutcome::Accepted(id))
            }
            Err(report) => {
                let fields: Vec<String> = report.by_field().into_keys().collect();
                tracing::warn!(owner = %self.owner, errors = report.errors().len(), ?fields, "direct input rejected");
                self.state = SubmissionState::Invalid { variable_count, report: report.clone() };
                Ok(StepOutcome::Rejected(report))
            }
        }
    }

    fn transition_error(&self, action: &'static str) -> SubmissionError {
        SubmissionError::InvalidTransition { action, state: self.state.label() }
    }
}

/// Validates `data` for `variable_count` variables and persists it for
/// `owner` in one call.
pub fn submit_direct_input<S: CollectionStore>(
    settings: &Settings,
    store: &mut S,
    owner: Owner,
    data: FormData,
    variable_count: usize,
) -> Result<SubmitOutcome, SubmissionError> {
    let mut submission = Submission::new(settings, owner);
    submission.state = SubmissionState::VariableCountChosen { variable_count };
    submission.enter_fields(data)?;
    submission.submit(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Distribution, FunctionFormId, FunctionKind, ParameterExpr};
    use crate::store::{JsonStore, MemoryStore};
    use crate::validation::{ValidationErrorType, NOT_CAPITALIZED_MESSAGE};

    fn direct_input_form() -> FormData {
        FormData::from_pairs([
            ("variable_name_0", "significant wave height [m]"),
            ("variable_symbol_0", "Hs"),
            ("distribution_0", "Weibull"),
            ("scale_0_0", "2.7"),
            ("shape_0_0", "1.5"),
            ("location_0_0", "0.9"),
            ("variable_name_1", "peak period [s]"),
            ("variable_symbol_1", "Tp"),
            ("distribution_1", "Weibull"),
            ("scale_dependency_1", "0f2"),
            ("scale_1_0", "2.7"),
            ("scale_1_1", "2.7"),
            ("scale_1_2", "2.7"),
            ("shape_dependency_1", "0f1"),
            ("shape_1_0", "1.5"),
            ("shape_1_1", "1.5"),
            ("shape_1_2", "1.5"),
            ("location_dependency_1", "!None"),
            ("location_1_0", "0.9"),
            ("location_1_1", "0.9"),
            ("location_1_2", "0.9"),
            ("collection_name", "Direct input model"),
        ])
    }

    fn owner() -> Owner { Owner::new("max_mustermann") }

    #[test]
    fn test_variable_number_step() {
        let settings = Settings::default();
        let mut submission = Submission::new(&settings, owner());

        let outcome = submission.choose_variable_count(&FormData::from_pairs([("variable_number", "2")])).unwrap();
        assert_eq!(outcome, StepOutcome::Accepted(2));
        assert_eq!(submission.state(), &SubmissionState::VariableCountChosen { variable_count: 2 });

        let rejected = submission.choose_variable_count(&FormData::from_pairs([("variable_number", "0")])).unwrap();
        assert!(!rejected.is_accepted());
        // A rejected count leaves the earlier choice in place.
        assert_eq!(submission.state(), &SubmissionState::VariableCountChosen { variable_count: 2 });
    }

    #[test]
    fn test_two_variable_model_is_persisted() {
        let settings = Settings::default();
        let mut store = MemoryStore::new();
        let mut submission = Submission::new(&settings, owner());

        submission.choose_variable_count(&FormData::from_pairs([("variable_number", "2")])).unwrap();
        submission.enter_fields(direct_input_form()).unwrap();
        let outcome = submission.submit(&mut store).unwrap();

        let StepOutcome::Accepted(id) = outcome else { panic!("expected persisted model") };
        assert_eq!(submission.state(), &SubmissionState::Valid { id });

        let stored = store.get(id).unwrap().expect("record exists");
        let model = &stored.collection;
        assert_eq!(model.name(), "Direct input model");
        assert_eq!(model.owner(), &owner());
        assert_eq!(model.variable_count(), 2);

        let tp = &model.variables()[1];
        assert_eq!(tp.distribution, Distribution::Weibull);
        assert_eq!(
            tp.scale,
            ParameterExpr::Dependent {
                source: 0,
                form: FunctionFormId(2),
                function: FunctionKind::Exp3,
                coefficients: [2.7, 2.7, 2.7].into_iter().collect(),
            }
        );
        assert_eq!(tp.shape.encoding().map(|e| e.to_string()), Some("0f1".to_string()));
        assert_eq!(tp.location, ParameterExpr::Constant(0.9));
        assert_eq!(model.dependency_graph().unwrap().parents_of(1).unwrap(), vec![0]);
    }

    #[test]
    fn test_lowercase_symbol_is_rejected_and_nothing_persisted() {
        let settings = Settings::default();
        let mut store = MemoryStore::new();
        let mut data = direct_input_form();
        data.insert("variable_symbol_0", "hs");

        let outcome = submit_direct_input(&settings, &mut store, owner(), data, 2).unwrap();
        let report = outcome.report().expect("submission should be rejected");
        assert_eq!(report.by_field()["variable_symbol_0"], vec![NOT_CAPITALIZED_MESSAGE.to_string()]);
        assert_eq!(NOT_CAPITALIZED_MESSAGE, "The first characer should be capizalized.");
        assert!(store.is_empty());
    }

    #[test]
    fn test_invalid_submission_can_be_corrected() {
        let settings = Settings::default();
        let mut store = MemoryStore::new();
        let mut submission = Submission::new(&settings, owner());
        submission.choose_variable_count(&FormData::from_pairs([("variable_number", "2")])).unwrap();

        let mut bad = direct_input_form();
        bad.insert("shape_dependency_1", "1f1");
        bad.insert("scale_1_1", "two");
        submission.enter_fields(bad).unwrap();
        let outcome = submission.submit(&mut store).unwrap();
        let report = outcome.report().unwrap();
        assert!(report.has(ValidationErrorType::ForwardReference));
        assert!(report.has(ValidationErrorType::NonNumericCoefficient));
        assert!(matches!(submission.state(), SubmissionState::Invalid { variable_count: 2, .. }));
        assert!(store.is_empty());

        submission.enter_fields(direct_input_form()).unwrap();
        assert!(submission.submit(&mut store).unwrap().is_accepted());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_out_of_order_steps() {
        let settings = Settings::default();
        let mut store = MemoryStore::new();
        let mut submission = Submission::new(&settings, owner());

        assert!(matches!(submission.submit(&mut store), Err(SubmissionError::InvalidTransition { .. })));
        assert!(matches!(
            submission.enter_fields(direct_input_form()),
            Err(SubmissionError::InvalidTransition { .. })
        ));

        submission.choose_variable_count(&FormData::from_pairs([("variable_number", "2")])).unwrap();
        submission.enter_fields(direct_input_form()).unwrap();
        submission.submit(&mut store).unwrap();

        let err = submission.choose_variable_count(&FormData::from_pairs([("variable_number", "2")])).unwrap_err();
        assert_eq!(err.to_string(), "Cannot choose a variable count while the submission is already persisted");
        assert!(matches!(submission.submit(&mut store), Err(SubmissionError::InvalidTransition { .. })));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_json_store_round_trip() {
        let settings = Settings::default();
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonStore::open(dir.path()).unwrap();

        let validated = Validator::new(&settings).validate(&direct_input_form(), 2).unwrap();
        let expected = ModelCollection::from_validated(validated, owner()).unwrap();

        let outcome = submit_direct_input(&settings, &mut store, owner(), direct_input_form(), 2).unwrap();
        let StepOutcome::Accepted(id) = outcome else { panic!("expected persisted model") };

        let reopened = JsonStore::open(dir.path()).unwrap();
        let reloaded = reopened.get(id).unwrap().expect("record exists");
        assert_eq!(reloaded.collection, expected);
        assert_eq!(reopened.list_by_owner(&owner()).unwrap().len(), 1);
        assert!(reopened.owner_usage(&owner()).unwrap() > 0);
    }

    #[test]
    fn test_store_failure_is_not_a_validation_error() {
        let settings = Settings::default();
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonStore::open(dir.path()).unwrap();

        let outcome = submit_direct_input(&settings, &mut store, Owner::new("../escape"), direct_input_form(), 2);
        assert!(matches!(outcome, Err(SubmissionError::Store(StoreError::InvalidOwner(_)))));
    }
}

use crate::config::Settings;
use crate::form::FormData;
use crate::model::Owner;
use crate::store::{format_size, CollectionStore, JsonStore};
use crate::submission::{submit_direct_input, StepOutcome, SubmissionError, SubmitOutcome};
use crate::validation::{ValidationReport, Validator};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use std::collections::HashMap;
use std::path::Path;

/// `(is_valid, errors by field name)`, the shape Django's `form.errors` expects.
type FormErrors = (bool, HashMap<String, Vec<String>>);

fn form_errors(report: Option<&ValidationReport>) -> FormErrors {
    match report {
        None => (true, HashMap::new()),
        Some(report) => (false, report.by_field().into_iter().collect()),
    }
}

/// `(new id, errors by field name)`; exactly one side is populated.
type SubmitResult = (Option<u64>, HashMap<String, Vec<String>>);

fn submit_result(outcome: SubmitOutcome) -> SubmitResult {
    match outcome {
        StepOutcome::Accepted(id) => (Some(id.0), HashMap::new()),
        StepOutcome::Rejected(report) => (None, form_errors(Some(&report)).1),
    }
}

fn load_settings(path: Option<String>) -> PyResult<Settings> {
    let settings = match path {
        Some(path) => Settings::from_path(Path::new(&path)),
        None => Settings::from_env(),
    };
    settings.map_err(|e| PyValueError::new_err(e.to_string()))
}

#[pyclass(name = "_ModelValidator")]
#[derive(Debug, Clone, Default)]
pub struct PyModelValidator {
    settings: Settings,
}

#[pymethods]
impl PyModelValidator {
    #[new]
    #[pyo3(signature = (settings_path=None))]
    pub fn new(settings_path: Option<String>) -> PyResult<Self> {
        Ok(Self { settings: load_settings(settings_path)? })
    }

    pub fn validate_variable_number(&self, data: HashMap<String, String>) -> FormErrors {
        let result = Validator::new(&self.settings).validate_variable_number(&FormData::from(data));
        form_errors(result.err().as_ref())
    }

    pub fn validate_variables(&self, data: HashMap<String, String>, variable_count: usize) -> FormErrors {
        let result = Validator::new(&self.settings).validate(&FormData::from(data), variable_count);
        form_errors(result.err().as_ref())
    }
}

#[pyclass(name = "_CollectionStore")]
#[derive(Debug, Clone)]
pub struct PyCollectionStore {
    store: JsonStore,
    settings: Settings,
}

#[pymethods]
impl PyCollectionStore {
    #[new]
    #[pyo3(signature = (root=None, settings_path=None))]
    pub fn new(root: Option<String>, settings_path: Option<String>) -> PyResult<Self> {
        let settings = load_settings(settings_path)?;
        let root = root.map_or_else(|| settings.store_root.clone(), Into::into);
        let store = JsonStore::open(root).map_err(|e| PyRuntimeError::new_err(e.to_string()))?;
        Ok(Self { store, settings })
    }

    /// Validates and persists a direct-input model. Returns `(id, errors)`:
    /// the new id with no errors, or no id with the errors by field name.
    pub fn submit(
        &mut self,
        owner: String,
        data: HashMap<String, String>,
        variable_count: usize,
    ) -> PyResult<SubmitResult> {
        submit_direct_input(&self.settings, &mut self.store, Owner::new(owner), data.into(), variable_count)
            .map(submit_result)
            .map_err(|e: SubmissionError| PyRuntimeError::new_err(e.to_string()))
    }

    /// `(id, name)` of every collection owned by `owner`.
    pub fn list(&self, owner: String) -> PyResult<Vec<(u64, String)>> {
        let records = self
            .store
            .list_by_owner(&Owner::new(owner))
            .map_err(|e| PyRuntimeError::new_err(e.to_string()))?;
        Ok(records.into_iter().map(|r| (r.id.0, r.collection.name().to_string())).collect())
    }

    pub fn owner_usage(&self, owner: String) -> PyResult<String> {
        self.store
            .owner_usage(&Owner::new(owner))
            .map(format_size)
            .map_err(|e| PyRuntimeError::new_err(e.to_string()))
    }
}

#[pyfunction]
pub fn convert_size(size_bytes: u64) -> String {
    format_size(size_bytes)
}

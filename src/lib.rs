// Crate root for the direct-input model validator.
// The Rust core is usable on its own; with the `python` feature the same
// types are exposed as the `_core` extension module.

pub mod config;
pub mod form;
pub mod graph;
pub mod model;
pub mod store;
pub mod submission;
pub mod validation;

pub use config::{ConfigError, Settings};
pub use form::FormData;
pub use model::{CollectionId, ModelCollection, Owner};
pub use store::{CollectionStore, JsonStore, MemoryStore, StoreError};
pub use submission::{submit_direct_input, StepOutcome, Submission, SubmissionError, SubmitOutcome};
pub use validation::{ValidationReport, Validator};

#[cfg(feature = "python")]
mod bindings {
    pub mod python;
}

#[cfg(feature = "python")]
use pyo3::prelude::*;

// --- Module Definition ---
/// Defines the `_core` Python module. The leading underscore marks it as the
/// compiled component behind the Django forms.
#[cfg(feature = "python")]
#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<bindings::python::PyModelValidator>()?;
    m.add_class::<bindings::python::PyCollectionStore>()?;
    m.add_function(wrap_pyfunction!(bindings::python::convert_size, m)?)?;
    Ok(())
}

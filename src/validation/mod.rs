//! Validation of direct-input model submissions.
//!
//! The `Validator` walks a parsed submission and runs every rule against it:
//! dependency tokens and coefficients per parameter slot, labels and
//! distribution per variable, and count, ordering and naming for the whole
//! collection. Errors are collected per field for re-display.

pub use self::error::{ValidationError, ValidationErrorType, ValidationReport, NON_FIELD_ERRORS, NOT_CAPITALIZED_MESSAGE};
pub use self::validator::{ValidatedSubmission, Validator};

// --- MODULE DECLARATIONS ---
mod error;
mod validator;
pub(crate) mod rules {
    pub mod expression;
    pub mod structure;
    pub mod variable;
}

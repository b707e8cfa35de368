//! Defines the data model of a probabilistic model: variables, their
//! distributions, and the expressions behind each parameter slot.
pub mod collection;
pub mod function;
pub mod types;

// Re-export key types for convenient access
pub use collection::{ConditionalParameters, ModelCollection};
pub use function::{FunctionFormId, FunctionFormTable, FunctionKind};
pub use types::{
    Coefficients, CollectionId, DependencyEncoding, Distribution, Owner, ParameterExpr, ParameterKind, Variable,
};

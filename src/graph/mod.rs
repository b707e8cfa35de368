//! Dependency structure between the variables of a model.
pub mod dag;

pub use dag::{DependencyGraph, GraphError};

use super::types::{Owner, ParameterKind, Variable};
use crate::graph::{DependencyGraph, GraphError};
use crate::validation::rules::structure;
use crate::validation::{ValidatedSubmission, ValidationReport};
use serde::{Deserialize, Serialize};

/// A named, owned probabilistic model: the unit that is persisted.
///
/// Construction checks the ordering invariant (each variable at its own index,
/// every dependency pointing strictly backwards) and that every dependent slot
/// has as many coefficients as its form takes, so a `ModelCollection` value is
/// always acyclic and fully evaluable. Collections loaded from storage are re-checked with
/// [`ModelCollection::check`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelCollection {
    name: String,
    owner: Owner,
    variables: Vec<Variable>,
}

/// Parameter values of one variable, conditional on its parents' values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConditionalParameters {
    pub scale: f64,
    pub shape: f64,
    pub location: f64,
}

impl ModelCollection {
    pub fn new(
        name: impl Into<String>,
        owner: Owner,
        variable_count: usize,
        variables: Vec<Variable>,
    ) -> Result<Self, ValidationReport> {
        let collection = Self { name: name.into(), owner, variables };
        collection.check_with_count(variable_count)?;
        Ok(collection)
    }

    pub fn from_validated(submission: ValidatedSubmission, owner: Owner) -> Result<Self, ValidationReport> {
        let count = submission.variables.len();
        Self::new(submission.collection_name, owner, count, submission.variables)
    }

    /// Re-runs the construction checks.
    pub fn check(&self) -> Result<(), ValidationReport> {
        self.check_with_count(self.variables.len())
    }

    fn check_with_count(&self, variable_count: usize) -> Result<(), ValidationReport> {
        let mut report = ValidationReport::new();
        if let Err(err) = structure::check_collection_name(Some(&self.name)) {
            report.push(err);
        }
        report.extend(structure::check_ordering(&self.variables, variable_count));
        report.extend(structure::check_arity(&self.variables));
        report.into_result(())
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn owner(&self) -> &Owner { &self.owner }
    pub fn variables(&self) -> &[Variable] { &self.variables }
    pub fn variable_count(&self) -> usize { self.variables.len() }

    pub fn dependency_graph(&self) -> Result<DependencyGraph, GraphError> {
        DependencyGraph::from_variables(&self.variables)
    }

    /// Resolves variable `index`'s parameters given `values[j]` for every
    /// variable `j` it depends on. Entries for other variables are ignored.
    pub fn conditional_parameters(&self, index: usize, values: &[f64]) -> Result<ConditionalParameters, GraphError> {
        let variable = self.variables.get(index).ok_or(GraphError::UnknownVariable(index))?;
        let resolve = |kind: ParameterKind| {
            let expr = variable.parameter(kind);
            match expr.source() {
                None => Ok(expr.evaluate(0.0)),
                Some(source) => values
                    .get(source)
                    .map(|&x| expr.evaluate(x))
                    .ok_or(GraphError::MissingValue { variable: index, parent: source }),
            }
        };
        Ok(ConditionalParameters {
            scale: resolve(ParameterKind::Scale)?,
            shape: resolve(ParameterKind::Shape)?,
            location: resolve(ParameterKind::Location)?,
        })
    }

    /// Resolves every variable's parameters at one joint realisation
    /// `values`, visiting variables in dependency order.
    pub fn parameters_at(&self, values: &[f64]) -> Result<Vec<ConditionalParameters>, GraphError> {
        let order = self.dependency_graph()?.evaluation_order()?;
        let mut resolved = vec![None; self.variables.len()];
        for index in order {
            resolved[index] = Some(self.conditional_parameters(index, values)?);
        }
        resolved
            .into_iter()
            .enumerate()
            .map(|(i, p)| p.ok_or(GraphError::UnknownVariable(i)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Distribution, FunctionFormId, FunctionKind, ParameterExpr};
    use crate::validation::ValidationErrorType;
    use smallvec::smallvec;

    fn hs() -> Variable {
        Variable {
            index: 0,
            name: "significant wave height [m]".into(),
            symbol: "Hs".into(),
            distribution: Distribution::Weibull,
            scale: ParameterExpr::Constant(2.7),
            shape: ParameterExpr::Constant(1.5),
            location: ParameterExpr::Constant(0.9),
        }
    }

    fn tp() -> Variable {
        Variable {
            index: 1,
            name: "peak period [s]".into(),
            symbol: "Tp".into(),
            distribution: Distribution::Lognormal,
            scale: ParameterExpr::Dependent {
                source: 0,
                form: FunctionFormId(1),
                function: FunctionKind::Power3,
                coefficients: smallvec![1.0, 2.0, 1.0],
            },
            shape: ParameterExpr::Dependent {
                source: 0,
                form: FunctionFormId(2),
                function: FunctionKind::Exp3,
                coefficients: smallvec![0.1, 1.0, 0.0],
            },
            location: ParameterExpr::Constant(0.0),
        }
    }

    #[test]
    fn test_new_rejects_blank_name_and_bad_order() {
        let report = ModelCollection::new("  ", Owner::new("max"), 2, vec![tp(), hs()]).unwrap_err();
        assert!(report.has(ValidationErrorType::EmptyCollectionName));
        assert!(report.has(ValidationErrorType::IndexMismatch));
        assert!(report.has(ValidationErrorType::ForwardReference));
    }

    #[test]
    fn test_new_rejects_count_mismatch() {
        let report = ModelCollection::new("Model", Owner::new("max"), 3, vec![hs(), tp()]).unwrap_err();
        assert!(report.has(ValidationErrorType::VariableCountMismatch));
    }

    #[test]
    fn test_new_rejects_wrong_coefficient_count() {
        let mut short = tp();
        short.scale = ParameterExpr::Dependent {
            source: 0,
            form: FunctionFormId(6),
            function: FunctionKind::Logistics4,
            coefficients: smallvec![1.0],
        };
        let report = ModelCollection::new("Model", Owner::new("max"), 2, vec![hs(), short]).unwrap_err();
        assert!(report.has(ValidationErrorType::CoefficientCountMismatch));
        assert_eq!(report.by_field().keys().collect::<Vec<_>>(), vec!["scale_dependency_1"]);
    }

    #[test]
    fn test_conditional_parameters() {
        let model = ModelCollection::new("Model", Owner::new("max"), 2, vec![hs(), tp()]).unwrap();
        let p = model.conditional_parameters(1, &[3.0]).unwrap();
        // scale = 1 + 2 * 3^1, shape = 0.1 + 1 * e^0
        assert_eq!(p, ConditionalParameters { scale: 7.0, shape: 1.1, location: 0.0 });

        let err = model.conditional_parameters(1, &[]).unwrap_err();
        assert_eq!(err, GraphError::MissingValue { variable: 1, parent: 0 });
        assert_eq!(model.conditional_parameters(5, &[]).unwrap_err(), GraphError::UnknownVariable(5));
    }

    #[test]
    fn test_parameters_at_covers_every_variable() {
        let model = ModelCollection::new("Model", Owner::new("max"), 2, vec![hs(), tp()]).unwrap();
        let all = model.parameters_at(&[3.0, 10.0]).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0], ConditionalParameters { scale: 2.7, shape: 1.5, location: 0.9 });
        assert_eq!(all[1].scale, 7.0);
    }
}

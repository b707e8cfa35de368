use super::function::{FunctionFormId, FunctionKind};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Coefficients of a dependent parameter. Every built-in form fits inline.
pub type Coefficients = SmallVec<[f64; 4]>;

/// The external principal a collection belongs to (a username).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Owner(pub String);

impl Owner {
    pub fn new(name: impl Into<String>) -> Self { Self(name.into()) }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

/// Store-assigned identifier of a persisted collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CollectionId(pub u64);

impl fmt::Display for CollectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Distribution {
    Weibull,
    Normal,
    Lognormal,
}

impl Distribution {
    pub const ALL: [Distribution; 3] = [Distribution::Weibull, Distribution::Normal, Distribution::Lognormal];

    /// Parses the value submitted by the distribution select box.
    pub fn from_form_value(value: &str) -> Option<Self> {
        match value.trim() {
            "Weibull" => Some(Self::Weibull),
            "Normal" => Some(Self::Normal),
            "Lognormal" | "Lognormal_SigmaMu" => Some(Self::Lognormal),
            _ => None,
        }
    }

    pub fn form_value(&self) -> &'static str {
        match self {
            Self::Weibull => "Weibull",
            Self::Normal => "Normal",
            Self::Lognormal => "Lognormal",
        }
    }
}

/// One of the three parameter slots every distribution carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ParameterKind {
    Scale,
    Shape,
    Location,
}

impl ParameterKind {
    pub const ALL: [ParameterKind; 3] = [ParameterKind::Scale, ParameterKind::Shape, ParameterKind::Location];

    /// Field-name prefix used by the submission form.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Scale => "scale",
            Self::Shape => "shape",
            Self::Location => "location",
        }
    }
}

/// A dependency token `"{source}f{form}"` after parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEncoding {
    pub source: usize,
    pub form: FunctionFormId,
}

impl fmt::Display for DependencyEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}f{}", self.source, self.form.0)
    }
}

/// The value of one parameter slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterExpr {
    Constant(f64),
    /// Computed from the value of an earlier variable.
    Dependent {
        source: usize,
        form: FunctionFormId,
        function: FunctionKind,
        coefficients: Coefficients,
    },
}

impl ParameterExpr {
    /// The variable this expression reads from, if any.
    pub fn source(&self) -> Option<usize> {
        match self {
            Self::Constant(_) => None,
            Self::Dependent { source, .. } => Some(*source),
        }
    }

    pub fn encoding(&self) -> Option<DependencyEncoding> {
        match self {
            Self::Constant(_) => None,
            Self::Dependent { source, form, .. } => Some(DependencyEncoding { source: *source, form: *form }),
        }
    }

    /// Evaluates the expression given the value of its source variable.
    /// Constants ignore `x`.
    pub fn evaluate(&self, x: f64) -> f64 {
        match self {
            Self::Constant(v) => *v,
            Self::Dependent { function, coefficients, .. } => function.evaluate(coefficients, x),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub index: usize,
    pub name: String,
    pub symbol: String,
    pub distribution: Distribution,
    pub scale: ParameterExpr,
    pub shape: ParameterExpr,
    pub location: ParameterExpr,
}

impl Variable {
    pub fn parameter(&self, kind: ParameterKind) -> &ParameterExpr {
        match kind {
            ParameterKind::Scale => &self.scale,
            ParameterKind::Shape => &self.shape,
            ParameterKind::Location => &self.location,
        }
    }

    /// Iterates the slots in form order: scale, shape, location.
    pub fn parameters(&self) -> impl Iterator<Item = (ParameterKind, &ParameterExpr)> {
        ParameterKind::ALL.into_iter().map(move |k| (k, self.parameter(k)))
    }
}

//! The flat field namespace of the direct-input form.
//!
//! `variable_name_1`, `shape_dependency_1` and `scale_1_2` all encode a
//! position in the two-level structure variable -> parameter slot ->
//! coefficient. `FieldKey` is the decoded position; its `Display` produces
//! the wire name again so error reports can point at the submitted field.

use crate::model::ParameterKind;
use std::fmt;

pub const COLLECTION_NAME: &str = "collection_name";
pub const VARIABLE_COUNT: &str = "variable_count";
pub const VARIABLE_NUMBER: &str = "variable_number";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldKey {
    VariableName(usize),
    VariableSymbol(usize),
    Distribution(usize),
    Dependency(ParameterKind, usize),
    Coefficient(ParameterKind, usize, usize),
    CollectionName,
    VariableCount,
    VariableNumber,
}

impl FieldKey {
    pub fn parse(key: &str) -> Option<Self> {
        match key {
            COLLECTION_NAME => return Some(Self::CollectionName),
            VARIABLE_COUNT => return Some(Self::VariableCount),
            VARIABLE_NUMBER => return Some(Self::VariableNumber),
            _ => {}
        }
        if let Some(rest) = key.strip_prefix("variable_name_") {
            return parse_index(rest).map(Self::VariableName);
        }
        if let Some(rest) = key.strip_prefix("variable_symbol_") {
            return parse_index(rest).map(Self::VariableSymbol);
        }
        if let Some(rest) = key.strip_prefix("distribution_") {
            return parse_index(rest).map(Self::Distribution);
        }
        for kind in ParameterKind::ALL {
            let Some(rest) = key.strip_prefix(kind.prefix()).and_then(|r| r.strip_prefix('_')) else {
                continue;
            };
            if let Some(index) = rest.strip_prefix("dependency_") {
                return parse_index(index).map(|i| Self::Dependency(kind, i));
            }
            let (variable, coefficient) = rest.split_once('_')?;
            return Some(Self::Coefficient(kind, parse_index(variable)?, parse_index(coefficient)?));
        }
        None
    }

    /// The variable a per-variable field belongs to.
    pub fn variable_index(&self) -> Option<usize> {
        match *self {
            Self::VariableName(i)
            | Self::VariableSymbol(i)
            | Self::Distribution(i)
            | Self::Dependency(_, i)
            | Self::Coefficient(_, i, _) => Some(i),
            Self::CollectionName | Self::VariableCount | Self::VariableNumber => None,
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VariableName(i) => write!(f, "variable_name_{}", i),
            Self::VariableSymbol(i) => write!(f, "variable_symbol_{}", i),
            Self::Distribution(i) => write!(f, "distribution_{}", i),
            Self::Dependency(kind, i) => write!(f, "{}_dependency_{}", kind.prefix(), i),
            Self::Coefficient(kind, i, j) => write!(f, "{}_{}_{}", kind.prefix(), i, j),
            Self::CollectionName => f.write_str(COLLECTION_NAME),
            Self::VariableCount => f.write_str(VARIABLE_COUNT),
            Self::VariableNumber => f.write_str(VARIABLE_NUMBER),
        }
    }
}

/// Digits only; `"+1"` and `"01x"` are not indices.
fn parse_index(s: &str) -> Option<usize> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

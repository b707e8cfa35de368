//! Function forms a dependent parameter may take.
//!
//! A form id (the number after the `f` in a dependency token) resolves to a
//! `FunctionKind` through a `FunctionFormTable`. The kind fixes how many
//! coefficients the form needs and how they combine with the source value.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FunctionFormId(pub u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FunctionKind {
    /// a + b * x^c
    Power3,
    /// a + b * e^(c * x)
    Exp3,
    /// ln(a + b * sqrt(x / 9.81))
    LnSquare2,
    /// a + 1 / (x + b)^c
    PowerDecrease3,
    /// a + b / (1 + c * x)
    AsymDecrease3,
    /// a + b / (1 + e^(-|c| * (x - d)))
    Logistics4,
}

impl FunctionKind {
    pub fn arity(&self) -> usize {
        match self {
            Self::LnSquare2 => 2,
            Self::Power3 | Self::Exp3 | Self::PowerDecrease3 | Self::AsymDecrease3 => 3,
            Self::Logistics4 => 4,
        }
    }

    /// Evaluates the function at `x`. `coefficients` must hold `arity()` values;
    /// missing ones read as zero.
    pub fn evaluate(&self, coefficients: &[f64], x: f64) -> f64 {
        let c = |i: usize| coefficients.get(i).copied().unwrap_or(0.0);
        match self {
            Self::Power3 => c(0) + c(1) * x.powf(c(2)),
            Self::Exp3 => c(0) + c(1) * (c(2) * x).exp(),
            Self::LnSquare2 => (c(0) + c(1) * (x / 9.81).sqrt()).ln(),
            Self::PowerDecrease3 => c(0) + 1.0 / (x + c(1)).powf(c(2)),
            Self::AsymDecrease3 => c(0) + c(1) / (1.0 + c(2) * x),
            Self::Logistics4 => c(0) + c(1) / (1.0 + (-c(2).abs() * (x - c(3))).exp()),
        }
    }
}

/// Maps form ids to kinds. The default matches the select box of the
/// direct-input form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FunctionFormTable {
    forms: BTreeMap<u8, FunctionKind>,
}

impl Default for FunctionFormTable {
    fn default() -> Self {
        Self::from_pairs([
            (1, FunctionKind::Power3),
            (2, FunctionKind::Exp3),
            (3, FunctionKind::LnSquare2),
            (4, FunctionKind::PowerDecrease3),
            (5, FunctionKind::AsymDecrease3),
            (6, FunctionKind::Logistics4),
        ])
    }
}

impl FunctionFormTable {
    pub fn from_pairs(pairs: impl IntoIterator<Item = (u8, FunctionKind)>) -> Self {
        Self { forms: pairs.into_iter().collect() }
    }

    pub fn get(&self, id: FunctionFormId) -> Option<FunctionKind> {
        self.forms.get(&id.0).copied()
    }

    pub fn ids(&self) -> impl Iterator<Item = FunctionFormId> + '_ {
        self.forms.keys().map(|&id| FunctionFormId(id))
    }

    pub fn is_empty(&self) -> bool { self.forms.is_empty() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, 3)]
    #[case(2, 3)]
    #[case(3, 2)]
    #[case(4, 3)]
    #[case(5, 3)]
    #[case(6, 4)]
    fn test_default_table_arity(#[case] id: u8, #[case] arity: usize) {
        let table = FunctionFormTable::default();
        let kind = table.get(FunctionFormId(id)).expect("form missing from default table");
        assert_eq!(kind.arity(), arity);
    }

    #[test]
    fn test_unknown_form_is_absent() {
        let table = FunctionFormTable::default();
        assert!(table.get(FunctionFormId(0)).is_none());
        assert!(table.get(FunctionFormId(7)).is_none());
    }

    #[test]
    fn test_evaluate_power_and_exp() {
        // 1 + 2 * 3^2 = 19
        assert_eq!(FunctionKind::Power3.evaluate(&[1.0, 2.0, 2.0], 3.0), 19.0);
        // 0.5 + 1 * e^0 = 1.5
        assert_eq!(FunctionKind::Exp3.evaluate(&[0.5, 1.0, 0.7], 0.0), 1.5);
    }

    #[test]
    fn test_evaluate_logistics_midpoint() {
        // At x == d the logistic term is exactly b / 2.
        let v = FunctionKind::Logistics4.evaluate(&[1.0, 4.0, -2.0, 3.0], 3.0);
        assert!((v - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_table_serializes_as_plain_map() {
        let table = FunctionFormTable::from_pairs([(1, FunctionKind::Power3)]);
        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(json, r#"{"1":"Power3"}"#);
        let back: FunctionFormTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back, table);
    }
}

use super::fields::FieldKey;
use super::FormData;
use crate::model::ParameterKind;
use std::collections::{BTreeMap, BTreeSet};

/// Raw inputs of one parameter slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlotDraft {
    pub dependency: Option<String>,
    /// Coefficient position to raw text. Blank fields are left out.
    pub coefficients: BTreeMap<usize, String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDraft {
    pub index: usize,
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub distribution: Option<String>,
    slots: [SlotDraft; 3],
}

impl VariableDraft {
    pub fn empty(index: usize) -> Self {
        Self {
            index,
            name: None,
            symbol: None,
            distribution: None,
            slots: Default::default(),
        }
    }

    pub fn slot(&self, kind: ParameterKind) -> &SlotDraft {
        &self.slots[slot_position(kind)]
    }

    pub fn slot_mut(&mut self, kind: ParameterKind) -> &mut SlotDraft {
        &mut self.slots[slot_position(kind)]
    }
}

fn slot_position(kind: ParameterKind) -> usize {
    match kind {
        ParameterKind::Scale => 0,
        ParameterKind::Shape => 1,
        ParameterKind::Location => 2,
    }
}

/// A submission decoded into variable -> slot -> coefficient, built once from
/// the flat form data so validation never touches field-name strings.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionDraft {
    pub collection_name: Option<String>,
    /// Position `i` holds variable `i`; covers every declared and every
    /// submitted index.
    pub variables: Vec<VariableDraft>,
    /// Variable indices that at least one submitted field referred to.
    pub submitted: BTreeSet<usize>,
}

impl SubmissionDraft {
    pub fn parse(data: &FormData, variable_count: usize) -> Self {
        let mut collection_name = None;
        let mut by_index: BTreeMap<usize, VariableDraft> = BTreeMap::new();

        for (key, value) in data.iter() {
            let Some(field) = FieldKey::parse(key) else { continue };
            let value = value.trim();
            let value = (!value.is_empty()).then(|| value.to_string());

            if field == FieldKey::CollectionName {
                collection_name = value;
                continue;
            }
            let Some(index) = field.variable_index() else { continue };
            let draft = by_index.entry(index).or_insert_with(|| VariableDraft::empty(index));
            match field {
                FieldKey::VariableName(_) => draft.name = value,
                FieldKey::VariableSymbol(_) => draft.symbol = value,
                FieldKey::Distribution(_) => draft.distribution = value,
                FieldKey::Dependency(kind, _) => draft.slot_mut(kind).dependency = value,
                FieldKey::Coefficient(kind, _, position) => {
                    if let Some(v) = value {
                        draft.slot_mut(kind).coefficients.insert(position, v);
                    }
                }
                FieldKey::CollectionName | FieldKey::VariableCount | FieldKey::VariableNumber => {}
            }
        }

        let submitted: BTreeSet<usize> = by_index.keys().copied().collect();
        let len = submitted.last().map_or(0, |&max| max + 1).max(variable_count);
        let variables = (0..len)
            .map(|i| by_index.remove(&i).unwrap_or_else(|| VariableDraft::empty(i)))
            .collect();

        tracing::debug!(
            variable_count,
            submitted = submitted.len(),
            has_name = collection_name.is_some(),
            "parsed submission draft"
        );

        Self { collection_name, variables, submitted }
    }
}

//! The form-submission boundary: raw field data in, nested drafts out.
pub mod draft;
pub mod fields;

pub use draft::{SlotDraft, SubmissionDraft, VariableDraft};
pub use fields::FieldKey;

use std::collections::{BTreeMap, HashMap};

/// Field name to submitted text, as posted by the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData(BTreeMap<String, String>);

impl FormData {
    pub fn new() -> Self { Self::default() }

    pub fn from_pairs<K: Into<String>, V: Into<String>>(pairs: impl IntoIterator<Item = (K, V)>) -> Self {
        Self(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> { self.0.get(key).map(String::as_str) }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self { Self::from_pairs(iter) }
}

impl From<HashMap<String, String>> for FormData {
    fn from(map: HashMap<String, String>) -> Self { Self(map.into_iter().collect()) }
}

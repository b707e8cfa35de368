use super::{CollectionStore, StoreError, StoredCollection};
use crate::model::{CollectionId, ModelCollection, Owner};
use std::collections::BTreeMap;

/// An in-process store. Ids start at 1.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: BTreeMap<CollectionId, ModelCollection>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }
    pub fn len(&self) -> usize { self.records.len() }
    pub fn is_empty(&self) -> bool { self.records.is_empty() }
}

impl CollectionStore for MemoryStore {
    fn insert(&mut self, collection: ModelCollection) -> Result<CollectionId, StoreError> {
        let id = CollectionId(self.records.keys().next_back().map_or(1, |last| last.0 + 1));
        self.records.insert(id, collection);
        Ok(id)
    }

    fn get(&self, id: CollectionId) -> Result<Option<StoredCollection>, StoreError> {
        Ok(self.records.get(&id).map(|c| StoredCollection { id, collection: c.clone() }))
    }

    fn list_by_owner(&self, owner: &Owner) -> Result<Vec<StoredCollection>, StoreError> {
        Ok(self
            .records
            .iter()
            .filter(|(_, c)| c.owner() == owner)
            .map(|(&id, c)| StoredCollection { id, collection: c.clone() })
            .collect())
    }
}

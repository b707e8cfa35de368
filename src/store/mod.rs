//! Durable storage of model collections.
//!
//! Records are immutable: a store only ever creates, reads and lists them.
//! A failed insert leaves nothing behind.

pub mod json;
pub mod memory;
pub mod usage;

pub use json::JsonStore;
pub use memory::MemoryStore;
pub use usage::{format_size, storage_usage};

use crate::model::{CollectionId, ModelCollection, Owner};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Record serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Failed to commit record: {0}")]
    Persist(#[from] tempfile::PersistError),
    #[error("Record '{path}' is corrupt: {reason}")]
    Corrupt { path: PathBuf, reason: String },
    #[error("Owner name '{0}' cannot be used as a storage key")]
    InvalidOwner(String),
    #[error("No free collection id after {0} attempts")]
    IdExhausted(usize),
}

/// A persisted collection together with the id the store gave it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredCollection {
    pub id: CollectionId,
    pub collection: ModelCollection,
}

pub trait CollectionStore {
    /// Persists a new record and returns its id. Atomic: on error no record
    /// exists.
    fn insert(&mut self, collection: ModelCollection) -> Result<CollectionId, StoreError>;

    fn get(&self, id: CollectionId) -> Result<Option<StoredCollection>, StoreError>;

    /// All records of `owner`, ordered by id.
    fn list_by_owner(&self, owner: &Owner) -> Result<Vec<StoredCollection>, StoreError>;
}

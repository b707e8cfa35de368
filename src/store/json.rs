//! json.rs
//! One pretty-printed JSON file per record under `{root}/{owner}/{id}.json`.
//!
//! Ids are reserved by creating `{root}/.ids/{id}` exclusively, so concurrent
//! writers never share an id. The record itself is written to a temp file in
//! the owner's directory and renamed into place without clobbering, so a
//! record is either complete on disk or absent.

use super::usage::storage_usage;
use super::{CollectionStore, StoreError, StoredCollection};
use crate::model::{CollectionId, ModelCollection, Owner};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const ID_DIR: &str = ".ids";
const RECORD_EXTENSION: &str = "json";
const MAX_ID_ATTEMPTS: usize = 16;

#[derive(Debug, Clone)]
pub struct JsonStore {
    root: PathBuf,
}

impl JsonStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(root.join(ID_DIR))?;
        tracing::debug!(root = %root.display(), "opened collection store");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path { &self.root }

    /// Bytes occupied by everything stored for `owner`.
    pub fn owner_usage(&self, owner: &Owner) -> Result<u64, StoreError> {
        Ok(storage_usage(&self.owner_dir(owner)?)?)
    }

    fn owner_dir(&self, owner: &Owner) -> Result<PathBuf, StoreError> {
        let name = owner.as_str();
        let usable = !name.is_empty()
            && !name.starts_with('.')
            && !name.contains(|c: char| c == '/' || c == '\\' || c == '\0');
        if !usable {
            return Err(StoreError::InvalidOwner(name.to_string()));
        }
        Ok(self.root.join(name))
    }

    fn record_path(dir: &Path, id: CollectionId) -> PathBuf {
        dir.join(format!("{}.{}", id, RECORD_EXTENSION))
    }

    fn next_id(&self) -> Result<u64, StoreError> {
        let mut max = 0;
        for entry in fs::read_dir(self.root.join(ID_DIR))? {
            if let Some(id) = entry?.file_name().to_str().and_then(|n| n.parse::<u64>().ok()) {
                max = max.max(id);
            }
        }
        Ok(max + 1)
    }

    fn reserve_id(&self) -> Result<CollectionId, StoreError> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = self.next_id()?;
            let marker = self.root.join(ID_DIR).join(id.to_string());
            match OpenOptions::new().write(true).create_new(true).open(&marker) {
                Ok(_) => return Ok(CollectionId(id)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    tracing::warn!(id, "collection id taken by a concurrent writer, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(StoreError::IdExhausted(MAX_ID_ATTEMPTS))
    }

    fn read_record(path: &Path) -> Result<StoredCollection, StoreError> {
        let corrupt = |reason: String| StoreError::Corrupt { path: path.to_path_buf(), reason };

        let text = fs::read_to_string(path)?;
        let record: StoredCollection = serde_json::from_str(&text).map_err(|e| corrupt(e.to_string()))?;
        let stem = path.file_stem().and_then(|s| s.to_str());
        if stem != Some(record.id.to_string().as_str()) {
            return Err(corrupt(format!("file name does not match id {}", record.id)));
        }
        record.collection.check().map_err(|report| {
            let messages: Vec<&str> = report.errors().iter().map(|e| e.message.as_str()).collect();
            corrupt(messages.join(" "))
        })?;
        Ok(record)
    }

    fn owner_dirs(&self) -> Result<Vec<PathBuf>, StoreError> {
        let mut dirs = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let hidden = entry.file_name().to_str().map_or(true, |n| n.starts_with('.'));
            if !hidden && entry.file_type()?.is_dir() {
                dirs.push(entry.path());
            }
        }
        Ok(dirs)
    }
}

impl CollectionStore for JsonStore {
    fn insert(&mut self, collection: ModelCollection) -> Result<CollectionId, StoreError> {
        let dir = self.owner_dir(collection.owner())?;
        fs::create_dir_all(&dir)?;

        let id = self.reserve_id()?;
        let record = StoredCollection { id, collection };

        let mut tmp = NamedTempFile::new_in(&dir)?;
        serde_json::to_writer_pretty(&mut tmp, &record)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist_noclobber(Self::record_path(&dir, id))?;

        tracing::info!(
            id = id.0,
            owner = %record.collection.owner(),
            name = %record.collection.name(),
            variables = record.collection.variable_count(),
            "collection persisted"
        );
        Ok(id)
    }

    fn get(&self, id: CollectionId) -> Result<Option<StoredCollection>, StoreError> {
        for dir in self.owner_dirs()? {
            let path = Self::record_path(&dir, id);
            if path.is_file() {
                return Self::read_record(&path).map(Some);
            }
        }
        Ok(None)
    }

    fn list_by_owner(&self, owner: &Owner) -> Result<Vec<StoredCollection>, StoreError> {
        let dir = self.owner_dir(owner)?;
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            let record = Self::read_record(&path)?;
            if record.collection.owner() != owner {
                return Err(StoreError::Corrupt { path, reason: "record belongs to another owner".into() });
            }
            records.push(record);
        }
        records.sort_by_key(|r| r.id);
        Ok(records)
    }
}

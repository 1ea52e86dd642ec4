use std::collections::{BTreeMap, HashMap};

use nrepo_types::{ContentObject, Name, StorageId};

use crate::error::{StorageError, StorageResult};
use crate::traits::{ItemMeta, Storage};

/// In-memory, map-based storage backend.
///
/// Intended for tests and embedding. Implements the identical contract as
/// the remote adapter, minus the connection: same id allocation, same
/// replacement semantics, same enumeration guarantees.
pub struct InMemoryStorage {
    entries: BTreeMap<StorageId, ContentObject>,
    by_name: HashMap<Name, StorageId>,
    next_id: StorageId,
}

impl InMemoryStorage {
    /// Create a new empty store. The first insert is assigned id 1.
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            by_name: HashMap::new(),
            next_id: StorageId::FIRST,
        }
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for InMemoryStorage {
    fn insert(&mut self, object: &ContentObject) -> StorageResult<StorageId> {
        if object.name().is_empty() {
            return Err(StorageError::InvalidArgument(
                "cannot insert an object with an empty name".into(),
            ));
        }
        let id = self.next_id;
        if let Some(old) = self.by_name.insert(object.name().clone(), id) {
            self.entries.remove(&old);
        }
        self.entries.insert(id, object.clone());
        self.next_id = id.next();
        Ok(id)
    }

    fn read(&mut self, id: StorageId) -> StorageResult<Option<ContentObject>> {
        Ok(self.entries.get(&id).cloned())
    }

    fn read_name(&mut self, name: &Name) -> StorageResult<Option<ContentObject>> {
        match self.by_name.get(name) {
            Some(id) => Ok(self.entries.get(id).cloned()),
            None => Ok(None),
        }
    }

    fn erase(&mut self, id: StorageId) -> StorageResult<bool> {
        match self.entries.remove(&id) {
            Some(object) => {
                // Drop the index entry only if it still points at this id.
                if self.by_name.get(object.name()) == Some(&id) {
                    self.by_name.remove(object.name());
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn size(&mut self) -> StorageResult<u64> {
        Ok(self.entries.len() as u64)
    }

    fn full_enumerate(&mut self, visitor: &mut dyn FnMut(&ItemMeta)) -> StorageResult<()> {
        for (id, object) in &self.entries {
            visitor(&ItemMeta {
                id: *id,
                name: object.name().clone(),
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryStorage")
            .field("entry_count", &self.entries.len())
            .finish()
    }
}

use std::collections::BTreeSet;

use nrepo_resp::RespConnection;
use nrepo_types::{ContentObject, Name, StorageId, TypeError};
use tracing::{debug, info, warn};

use crate::config::RemoteStoreConfig;
use crate::error::{StorageError, StorageResult};
use crate::key::{display_key, encode_key, parse_obj_key, EntryRef, OBJ_SCAN_PATTERN};
use crate::traits::{ItemMeta, Storage};

/// Keys requested per SCAN round trip during enumeration and recovery.
const SCAN_BATCH: u64 = 64;

/// Storage backend persisting into a remote RESP key/value store.
///
/// Owns a single blocking connection, established at construction and
/// closed when the adapter drops. Construction is atomic: on any failure
/// the partially allocated connection is released and no adapter value
/// exists, so there is no partially usable state to guard against.
///
/// Entries live under two keys derived by [`encode_key`]: the payload
/// under the id key and a name→id index entry beside it. The id counter
/// and the live-entry count are recovered from the store at construction,
/// so ids stay collision-free across adapter restarts.
pub struct RemoteKvStorage {
    conn: RespConnection,
    next_id: StorageId,
    live: u64,
}

impl RemoteKvStorage {
    /// Connect to the configured endpoint and recover adapter state.
    ///
    /// Fails with [`StorageError::InitializationFailure`] naming the
    /// endpoint if the store is unreachable within the connect timeout,
    /// does not answer `PING`, or cannot be scanned for existing entries.
    pub fn connect(config: &RemoteStoreConfig) -> StorageResult<Self> {
        let endpoint = config.endpoint();
        let init_err = |reason: String| StorageError::InitializationFailure {
            endpoint: endpoint.clone(),
            reason,
        };

        let mut conn = RespConnection::connect(
            &config.host,
            config.port,
            config.connect_timeout(),
            config.operation_timeout(),
        )
        .map_err(|e| init_err(e.to_string()))?;
        conn.ping().map_err(|e| init_err(e.to_string()))?;

        let ids = scan_ids(&mut conn).map_err(|e| init_err(e.to_string()))?;
        let live = ids.len() as u64;
        let next_id = ids
            .iter()
            .next_back()
            .map(|id| id.next())
            .unwrap_or(StorageId::FIRST);

        info!(%endpoint, live, next_id = %next_id, "remote storage initialized");
        Ok(Self {
            conn,
            next_id,
            live,
        })
    }

    fn corrupt(key: &[u8], e: TypeError) -> StorageError {
        StorageError::CorruptData {
            key: display_key(key),
            reason: e.to_string(),
        }
    }
}

impl Storage for RemoteKvStorage {
    fn insert(&mut self, object: &ContentObject) -> StorageResult<StorageId> {
        if object.name().is_empty() {
            return Err(StorageError::InvalidArgument(
                "cannot insert an object with an empty name".into(),
            ));
        }
        let payload = object
            .wire_encode()
            .map_err(|e| StorageError::InvalidArgument(format!("unencodable object: {e}")))?;

        let id = self.next_id;
        let name_key = encode_key(EntryRef::ByName(object.name()));
        let previous = self.conn.get(&name_key)?;

        self.conn.set(&encode_key(EntryRef::ById(id)), &payload)?;
        self.conn.set(&name_key, id.to_string().as_bytes())?;

        // Replacement: retire the payload the name previously pointed at.
        let replaced = match previous {
            Some(bytes) => match StorageId::parse_decimal(&bytes) {
                Ok(old) => {
                    let old_key = encode_key(EntryRef::ById(old));
                    self.conn.del(&[old_key.as_slice()])? > 0
                }
                Err(e) => {
                    warn!(name = %object.name(), error = %e, "name index held an unparsable id");
                    false
                }
            },
            None => false,
        };
        if !replaced {
            self.live += 1;
        }

        self.next_id = id.next();
        debug!(%id, name = %object.name(), bytes = payload.len(), "inserted object");
        Ok(id)
    }

    fn read(&mut self, id: StorageId) -> StorageResult<Option<ContentObject>> {
        let key = encode_key(EntryRef::ById(id));
        match self.conn.get(&key)? {
            Some(payload) => {
                let object =
                    ContentObject::wire_decode(&payload).map_err(|e| Self::corrupt(&key, e))?;
                Ok(Some(object))
            }
            None => Ok(None),
        }
    }

    fn read_name(&mut self, name: &Name) -> StorageResult<Option<ContentObject>> {
        let name_key = encode_key(EntryRef::ByName(name));
        match self.conn.get(&name_key)? {
            Some(bytes) => {
                let id = StorageId::parse_decimal(&bytes)
                    .map_err(|e| Self::corrupt(&name_key, e))?;
                // A dangling index entry resolves to not-found.
                self.read(id)
            }
            None => Ok(None),
        }
    }

    fn erase(&mut self, id: StorageId) -> StorageResult<bool> {
        let obj_key = encode_key(EntryRef::ById(id));
        let Some(payload) = self.conn.get(&obj_key)? else {
            return Ok(false);
        };

        match ContentObject::wire_decode(&payload) {
            Ok(object) => {
                // Drop the index entry only if it still points at this id;
                // a replacement may have moved the name elsewhere.
                let name_key = encode_key(EntryRef::ByName(object.name()));
                if let Some(bytes) = self.conn.get(&name_key)? {
                    if StorageId::parse_decimal(&bytes).ok() == Some(id) {
                        self.conn.del(&[name_key.as_slice()])?;
                    }
                }
            }
            Err(e) => {
                warn!(%id, error = %e, "erasing entry with undecodable payload");
            }
        }

        self.conn.del(&[obj_key.as_slice()])?;
        self.live = self.live.saturating_sub(1);
        debug!(%id, "erased entry");
        Ok(true)
    }

    fn size(&mut self) -> StorageResult<u64> {
        Ok(self.live)
    }

    fn full_enumerate(&mut self, visitor: &mut dyn FnMut(&ItemMeta)) -> StorageResult<()> {
        // Snapshot the key set first so the traversal is duplicate-free
        // even when SCAN returns a key in more than one batch.
        let ids = scan_ids(&mut self.conn)?;
        for id in ids {
            let key = encode_key(EntryRef::ById(id));
            let Some(payload) = self.conn.get(&key)? else {
                // Erased between the snapshot and the visit.
                continue;
            };
            let object =
                ContentObject::wire_decode(&payload).map_err(|e| Self::corrupt(&key, e))?;
            visitor(&ItemMeta {
                id,
                name: object.name().clone(),
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for RemoteKvStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteKvStorage")
            .field("endpoint", &self.conn.endpoint())
            .field("next_id", &self.next_id)
            .field("live", &self.live)
            .finish()
    }
}

/// Collect every live entry id by scanning the primary namespace.
///
/// Returns a sorted, deduplicated set. Keys in the namespace that do not
/// parse as primary keys are skipped with a warning.
fn scan_ids(conn: &mut RespConnection) -> Result<BTreeSet<StorageId>, nrepo_resp::RespError> {
    let mut ids = BTreeSet::new();
    let mut cursor = 0;
    loop {
        let (next_cursor, keys) = conn.scan(cursor, OBJ_SCAN_PATTERN, SCAN_BATCH)?;
        for key in keys {
            match parse_obj_key(&key) {
                Some(id) => {
                    ids.insert(id);
                }
                None => {
                    warn!(key = %display_key(&key), "skipping unparsable key in namespace");
                }
            }
        }
        if next_cursor == 0 {
            break;
        }
        cursor = next_cursor;
    }
    Ok(ids)
}

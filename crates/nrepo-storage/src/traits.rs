use nrepo_types::{ContentObject, Name, StorageId};

use crate::error::StorageResult;

/// Per-entry metadata handed to [`Storage::full_enumerate`] visitors.
///
/// Carries enough to rebuild an external index: the entry's id and name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemMeta {
    pub id: StorageId,
    pub name: Name,
}

/// Storage backend for named content objects.
///
/// All implementations must satisfy these invariants:
/// - Objects are immutable once inserted; the store never interprets their
///   content.
/// - Ids are assigned monotonically starting at 1 and never reused within
///   a process lifetime.
/// - Both lookup paths (by id, by name) resolve through the same key
///   scheme; `read` and `read_name` agree after every `insert`.
/// - Not-found is `Ok(None)`, never an error.
/// - `size` reflects every insert and erase exactly.
/// - Errors are propagated to the caller, never retried or swallowed.
///
/// Methods take `&mut self`: a backend does not synchronize internally,
/// and callers invoking it from multiple threads serialize access
/// externally (an outer `Mutex`, or confinement to one worker).
pub trait Storage: Send {
    /// Persist an object and return its freshly allocated id.
    ///
    /// Inserting under a name that already has a live entry replaces it:
    /// the name resolves to the new id, the superseded entry is retired,
    /// and `size` is unchanged.
    ///
    /// Returns `InvalidArgument` for an empty name; nothing is written.
    fn insert(&mut self, object: &ContentObject) -> StorageResult<StorageId>;

    /// Read an entry by id. Returns `Ok(None)` if there is no live entry.
    ///
    /// Stored bytes that fail to decode are a `CorruptData` error, never
    /// silently swallowed.
    fn read(&mut self, id: StorageId) -> StorageResult<Option<ContentObject>>;

    /// Read an entry by name. Same contract as [`Storage::read`]; this is
    /// the primary lookup path for name-based queries.
    fn read_name(&mut self, name: &Name) -> StorageResult<Option<ContentObject>>;

    /// Remove the entry identified by `id`. Returns `true` if an entry was
    /// removed, `false` if there was nothing to erase (idempotent).
    ///
    /// After a successful erase, both `read(id)` and `read_name` of the
    /// entry's name return not-found.
    fn erase(&mut self, id: StorageId) -> StorageResult<bool>;

    /// Number of live entries.
    fn size(&mut self) -> StorageResult<u64>;

    /// Invoke `visitor` exactly once per live entry.
    ///
    /// The traversal is duplicate-free over a snapshot of the live keys;
    /// enumeration order is unspecified. Entries erased mid-traversal may
    /// be skipped, but a visited entry is never partial or corrupt.
    fn full_enumerate(&mut self, visitor: &mut dyn FnMut(&ItemMeta)) -> StorageResult<()>;
}

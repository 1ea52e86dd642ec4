use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::name::Name;

/// Process-local numeric handle assigned to an entry at insert time.
///
/// Ids start at [`StorageId::FIRST`] and increase monotonically; an id is
/// never reused within a process lifetime.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StorageId(u64);

impl StorageId {
    /// The first id an empty store hands out.
    pub const FIRST: StorageId = StorageId(1);

    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw numeric value.
    pub fn get(self) -> u64 {
        self.0
    }

    /// The id that follows this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Parse from the decimal text form used in store values.
    pub fn parse_decimal(text: &[u8]) -> Result<Self, TypeError> {
        let s = std::str::from_utf8(text)
            .map_err(|_| TypeError::Decode("storage id is not utf-8".into()))?;
        let raw: u64 = s
            .parse()
            .map_err(|_| TypeError::Decode(format!("invalid storage id: {s:?}")))?;
        Ok(Self(raw))
    }
}

impl fmt::Debug for StorageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StorageId({})", self.0)
    }
}

impl fmt::Display for StorageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for StorageId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl From<StorageId> for u64 {
    fn from(id: StorageId) -> Self {
        id.0
    }
}

/// Immutable named payload persisted by the repository.
///
/// The unit of storage. A `ContentObject` is created by the caller, never
/// mutated afterwards, and travels through the store as its wire encoding:
/// a self-contained byte sequence that includes the name. The store never
/// interprets the content.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentObject {
    name: Name,
    content: Vec<u8>,
}

impl ContentObject {
    pub fn new(name: Name, content: Vec<u8>) -> Self {
        Self { name, content }
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Serialize to the wire form stored in the backing store.
    pub fn wire_encode(&self) -> Result<Vec<u8>, TypeError> {
        bincode::serialize(self).map_err(|e| TypeError::Serialization(e.to_string()))
    }

    /// Decode the wire form back into an object.
    pub fn wire_decode(bytes: &[u8]) -> Result<Self, TypeError> {
        bincode::deserialize(bytes).map_err(|e| TypeError::Decode(e.to_string()))
    }
}

impl fmt::Debug for ContentObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentObject")
            .field("name", &self.name)
            .field("content_len", &self.content.len())
            .finish()
    }
}

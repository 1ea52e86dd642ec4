//! The canonical store-key scheme.
//!
//! Every key this adapter touches lives under the `nrepo:` namespace and
//! is derived by [`encode_key`], the single derivation function shared by
//! the write path and both read paths:
//!
//! - `nrepo:obj:<decimal id>` — primary record; the value is the object's
//!   wire encoding.
//! - `nrepo:name:<escaped uri>` — secondary index; the value is the
//!   decimal id of the live entry for that name.
//!
//! The escaped uri form never contains glob metacharacters (`*?[` are
//! percent-escaped), so the `nrepo:obj:*` scan pattern cannot collide
//! with name keys.

use nrepo_types::{Name, StorageId};

/// Prefix of primary (payload) keys.
pub const OBJ_PREFIX: &[u8] = b"nrepo:obj:";

/// Prefix of name-index keys.
pub const NAME_PREFIX: &[u8] = b"nrepo:name:";

/// SCAN pattern covering exactly the primary keys.
pub const OBJ_SCAN_PATTERN: &[u8] = b"nrepo:obj:*";

/// A reference to an entry by either of its two handles.
#[derive(Clone, Copy, Debug)]
pub enum EntryRef<'a> {
    ById(StorageId),
    ByName(&'a Name),
}

/// Derive the store key for an entry reference.
pub fn encode_key(entry: EntryRef<'_>) -> Vec<u8> {
    match entry {
        EntryRef::ById(id) => {
            let mut key = OBJ_PREFIX.to_vec();
            key.extend_from_slice(id.to_string().as_bytes());
            key
        }
        EntryRef::ByName(name) => {
            let mut key = NAME_PREFIX.to_vec();
            key.extend_from_slice(name.to_uri().as_bytes());
            key
        }
    }
}

/// Recover the id from a primary key. Returns `None` for keys outside the
/// primary namespace or with a non-numeric suffix.
pub fn parse_obj_key(key: &[u8]) -> Option<StorageId> {
    let suffix = key.strip_prefix(OBJ_PREFIX)?;
    StorageId::parse_decimal(suffix).ok()
}

/// Printable form of a store key for diagnostics.
pub fn display_key(key: &[u8]) -> String {
    String::from_utf8_lossy(key).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_key_is_decimal_under_obj_prefix() {
        let key = encode_key(EntryRef::ById(StorageId::new(7)));
        assert_eq!(key, b"nrepo:obj:7");
    }

    #[test]
    fn name_key_uses_escaped_uri() {
        let name = Name::from_components([b"a b".to_vec(), b"c".to_vec()]).unwrap();
        let key = encode_key(EntryRef::ByName(&name));
        assert_eq!(key, b"nrepo:name:/a%20b/c");
    }

    #[test]
    fn obj_key_roundtrip() {
        let id = StorageId::new(123);
        let key = encode_key(EntryRef::ById(id));
        assert_eq!(parse_obj_key(&key), Some(id));
    }

    #[test]
    fn foreign_keys_do_not_parse() {
        assert_eq!(parse_obj_key(b"nrepo:name:/a"), None);
        assert_eq!(parse_obj_key(b"nrepo:obj:junk"), None);
        assert_eq!(parse_obj_key(b"other:obj:1"), None);
    }

    #[test]
    fn name_keys_contain_no_glob_metacharacters() {
        let name = Name::from_components([b"a*?[b]".to_vec()]).unwrap();
        let key = encode_key(EntryRef::ByName(&name));
        assert!(!key.iter().any(|b| matches!(b, b'*' | b'?' | b'[')));
    }
}

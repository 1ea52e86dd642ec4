//! Storage backends for the nrepo named-content repository.
//!
//! A repository persists immutable [`ContentObject`]s and looks them up by
//! numeric [`StorageId`] or by [`Name`]. All backends implement the
//! [`Storage`] trait:
//!
//! - [`RemoteKvStorage`] — persists into a remote RESP key/value store
//! - [`InMemoryStorage`] — map-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. One canonical key derivation ([`key::encode_key`]) is shared by every
//!    operation; the name→id index is persisted beside the payloads so both
//!    lookup paths resolve through the same scheme.
//! 2. Not-found on read is a normal outcome (`Ok(None)`), never an error.
//! 3. Per-call failures propagate to the immediate caller; the adapter
//!    never retries internally.
//! 4. The adapter does not synchronize concurrent calls. Methods take
//!    `&mut self`; callers that share a backend serialize access
//!    externally.
//!
//! [`ContentObject`]: nrepo_types::ContentObject
//! [`StorageId`]: nrepo_types::StorageId
//! [`Name`]: nrepo_types::Name

pub mod config;
pub mod error;
pub mod key;
pub mod memory;
pub mod remote;
pub mod traits;

pub use config::RemoteStoreConfig;
pub use error::{StorageError, StorageResult};
pub use key::EntryRef;
pub use memory::InMemoryStorage;
pub use remote::RemoteKvStorage;
pub use traits::{ItemMeta, Storage};

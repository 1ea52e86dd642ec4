//! Foundation types for the nrepo named-content repository.
//!
//! This crate provides the value types shared by every other nrepo crate.
//!
//! # Key Types
//!
//! - [`Name`] — Hierarchical content name: an ordered sequence of opaque
//!   byte-string components with a canonical escaped text form
//! - [`ContentObject`] — Immutable named payload with a self-contained
//!   binary wire encoding
//! - [`StorageId`] — Numeric handle assigned to an entry at insert time

pub mod error;
pub mod name;
pub mod object;

pub use error::TypeError;
pub use name::Name;
pub use object::{ContentObject, StorageId};

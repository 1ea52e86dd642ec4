//! Blocking RESP client for the nrepo backing key/value store.
//!
//! The backing store speaks RESP (the wire protocol of Redis-compatible
//! servers). This crate provides exactly the slice of the protocol the
//! storage adapter needs:
//!
//! - [`RespCodec`] — command encoding and reply parsing
//! - [`Reply`] — the parsed server reply variants
//! - [`RespConnection`] — a single blocking TCP connection with bounded
//!   connect and per-operation timeouts
//!
//! Every call is one blocking round trip. The connection is exclusively
//! owned; callers that share it across threads must serialize access
//! themselves.

pub mod codec;
pub mod connection;
pub mod error;

pub use codec::{Reply, RespCodec};
pub use connection::RespConnection;
pub use error::{RespError, RespResult};

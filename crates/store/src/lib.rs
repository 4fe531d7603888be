//! Persistence layer for dexsocial.
//!
//! Everything in this crate is built on a single abstraction: a
//! [`document::DocumentStore`] mapping a logical store key to an ordered
//! array of JSON records, with read-all / overwrite-all semantics. The
//! repositories layered on top own one key each, deserialize rows into typed
//! records at the store boundary, and serialize their read-modify-write
//! cycles through a per-store write guard.

pub mod document;
pub mod pagination;
pub mod records;
pub mod repositories;
pub mod test_utils;

pub use document::{DocumentStore, LocalStore, MemoryStore};
pub use pagination::{Cursor, Page};

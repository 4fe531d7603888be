//! Test utilities for the document store layer.

use std::sync::Arc;

use crate::document::{DocumentStore, MemoryStore};

/// A fresh in-memory store, typed as the trait object repositories take.
#[must_use]
pub fn memory_store() -> Arc<dyn DocumentStore> {
    Arc::new(MemoryStore::new())
}

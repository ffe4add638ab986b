//! In-memory key-value store backing the `db://` scheme.
//!
//! The store is an explicit capability object: it is built at startup,
//! handed to the producers and tools that need it, and all access goes
//! through its methods.

use std::collections::{BTreeMap, HashMap};

use parking_lot::RwLock;
use serde_json::{json, Value};

#[derive(Debug, Default)]
pub struct KeyValueStore {
    collections: RwLock<HashMap<String, BTreeMap<String, Value>>>,
}

impl KeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store with a few sample records.
    pub fn seeded() -> Self {
        let store = Self::new();
        store.put("users", "1", json!({"id": "1", "name": "Ada Lovelace", "role": "admin"}));
        store.put("users", "2", json!({"id": "2", "name": "Grace Hopper", "role": "editor"}));
        store.put(
            "products",
            "1",
            json!({"id": "1", "name": "Analytical Engine", "price": 1843}),
        );
        store
    }

    pub fn get(&self, collection: &str, id: &str) -> Option<Value> {
        self.collections
            .read()
            .get(collection)
            .and_then(|records| records.get(id))
            .cloned()
    }

    /// Insert or replace a record. Returns the previous value.
    pub fn put(&self, collection: &str, id: &str, value: Value) -> Option<Value> {
        self.collections
            .write()
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), value)
    }

    /// Record ids of a collection, sorted. Empty for unknown collections.
    pub fn ids(&self, collection: &str) -> Vec<String> {
        self.collections
            .read()
            .get(collection)
            .map(|records| records.keys().cloned().collect())
            .unwrap_or_default()
    }
}

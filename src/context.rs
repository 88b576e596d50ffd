//! Per-dispatch context threaded through the guard chain into the handler.
//!
//! The context is a plain key-value store. Each guard documents the keys it
//! writes; the handler reads whatever the guards ahead of it produced. A new,
//! empty context is created for every dispatch and dropped afterwards.

use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::error::CommandResult;

/// Mutable key-value bag shared by the guards and the handler of one dispatch.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DispatchContext {
    values: Map<String, Value>,
}

impl DispatchContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a raw JSON value, returning the previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(key.into(), value.into())
    }

    /// Serialize and store a typed value.
    pub fn set<T: Serialize>(&mut self, key: impl Into<String>, value: &T) -> CommandResult<()> {
        self.values.insert(key.into(), serde_json::to_value(value)?);
        Ok(())
    }

    /// Get the raw JSON value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Deserialize the value stored under `key`.
    ///
    /// Returns `Ok(None)` if the key is absent and an error if the stored value
    /// does not have the requested shape.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> CommandResult<Option<T>> {
        self.values
            .get(key)
            .map(|value| serde_json::from_value(value.clone()))
            .transpose()
            .map_err(Into::into)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

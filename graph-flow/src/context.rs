use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;

use crate::error::{GraphError, Result};

/// Context for sharing data between tasks in a graph execution
#[derive(Clone, Debug, Default)]
pub struct Context {
    data: Arc<DashMap<String, Value>>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value under `key`, replacing any previous value.
    pub async fn set(&self, key: impl Into<String>, value: impl serde::Serialize) -> Result<()> {
        let key = key.into();
        let value = serde_json::to_value(value)
            .map_err(|e| GraphError::ContextError(format!("cannot serialize {key}: {e}")))?;
        self.data.insert(key, value);
        Ok(())
    }

    /// Read a value back. Missing keys and values of the wrong shape both yield `None`.
    pub async fn get<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.data
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub async fn remove(&self, key: &str) -> Option<Value> {
        self.data.remove(key).map(|(_, v)| v)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

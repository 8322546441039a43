use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use async_trait::async_trait;

use super::persister::{KeyValuePersister, PersistError};

#[derive(Debug, Clone, Default)]
pub struct InMemoryPersister {
    values: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryPersister {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValuePersister for InMemoryPersister {
    async fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        Ok(self
            .values
            .read()
            .map_err(|_| PersistError::Unavailable(key.to_string()))?
            .get(key)
            .cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), PersistError> {
        self.values
            .write()
            .map_err(|_| PersistError::Unavailable(key.to_string()))?
            .insert(key.to_string(), value);
        Ok(())
    }

    async fn set_many(&self, entries: Vec<(String, String)>) -> Result<(), PersistError> {
        let mut values = self
            .values
            .write()
            .map_err(|_| PersistError::Unavailable("set_many".to_string()))?;
        values.extend(entries);
        Ok(())
    }
}

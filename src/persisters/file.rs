use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use tokio::fs;

use crate::config::Config;

use super::persister::{KeyValuePersister, PersistError};

/// Stores every key as `<directory>/<key>.json`.
///
/// Writes go to a temporary sibling first and are renamed over the target, so a
/// reader never observes a half written collection.
#[derive(Debug, Clone)]
pub struct FilePersister {
    directory: PathBuf,
}

impl FilePersister {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.storage.directory)
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.directory.join(format!("{}.json", file_stem(key)))
    }

    fn staging_path_for(&self, key: &str) -> PathBuf {
        self.directory.join(format!(".{}.json.tmp", file_stem(key)))
    }

    async fn read(&self, path: &Path) -> Result<Option<String>, PersistError> {
        match fs::read_to_string(path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(e, "read", path)),
        }
    }

    async fn stage(&self, key: &str, value: &str) -> Result<PathBuf, PersistError> {
        let staging = self.staging_path_for(key);
        fs::write(&staging, value)
            .await
            .map_err(|e| io_error(e, "stage", &staging))?;
        Ok(staging)
    }

    async fn commit(&self, staging: &Path, key: &str) -> Result<(), PersistError> {
        let target = self.path_for(key);
        fs::rename(staging, &target)
            .await
            .map_err(|e| io_error(e, "commit", &target))
    }

    async fn ensure_directory(&self) -> Result<(), PersistError> {
        fs::create_dir_all(&self.directory)
            .await
            .map_err(|e| io_error(e, "create directory", &self.directory))
    }

    async fn restore(&self, key: &str, previous: Option<String>) -> Result<(), PersistError> {
        match previous {
            Some(value) => {
                let staging = self.stage(key, &value).await?;
                self.commit(&staging, key).await
            }
            None => {
                let target = self.path_for(key);
                fs::remove_file(&target)
                    .await
                    .map_err(|e| io_error(e, "remove", &target))
            }
        }
    }

    async fn discard(&self, staged: &[(String, PathBuf)]) {
        for (_, staging) in staged {
            if let Err(e) = fs::remove_file(staging).await {
                log::warn!("unable to remove {}: {e}", staging.display());
            }
        }
    }
}

#[async_trait]
impl KeyValuePersister for FilePersister {
    async fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        self.read(&self.path_for(key)).await
    }

    async fn set(&self, key: &str, value: String) -> Result<(), PersistError> {
        self.ensure_directory().await?;
        let staging = self.stage(key, &value).await?;
        self.commit(&staging, key).await
    }

    async fn set_many(&self, entries: Vec<(String, String)>) -> Result<(), PersistError> {
        self.ensure_directory().await?;

        let mut staged = Vec::with_capacity(entries.len());
        let mut previous = Vec::with_capacity(entries.len());
        for (key, value) in &entries {
            let before = match self.read(&self.path_for(key)).await {
                Ok(before) => before,
                Err(e) => {
                    self.discard(&staged).await;
                    return Err(e);
                }
            };
            previous.push(before);
            match self.stage(key, value).await {
                Ok(staging) => staged.push((key.clone(), staging)),
                Err(e) => {
                    self.discard(&staged).await;
                    return Err(e);
                }
            }
        }

        for (index, (key, staging)) in staged.iter().enumerate() {
            if let Err(e) = self.commit(staging, key).await {
                log::error!("rolling back {index} committed keys after {e}");
                for ((committed, _), before) in staged[..index].iter().zip(previous.iter()) {
                    if let Err(rollback) = self.restore(committed, before.clone()).await {
                        log::error!("rollback of {committed} failed: {rollback}");
                    }
                }
                self.discard(&staged[index..]).await;
                return Err(e);
            }
        }
        Ok(())
    }
}

fn file_stem(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn io_error(e: std::io::Error, operation: &str, path: &Path) -> PersistError {
    PersistError::Io(e.to_string(), format!("{operation} {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let persister = FilePersister::new(dir.path());
        assert_eq!(None, persister.get("active_tickets").await.unwrap());
    }

    #[tokio::test]
    async fn test_set_creates_directory_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let persister = FilePersister::new(dir.path().join("nested"));
        persister
            .set("active_tickets", "[]".to_string())
            .await
            .unwrap();

        let written =
            std::fs::read_to_string(dir.path().join("nested/active_tickets.json")).unwrap();
        assert_eq!("[]", written);
        assert_eq!(
            Some("[]".to_string()),
            persister.get("active_tickets").await.unwrap()
        );
    }

    #[tokio::test]
    async fn test_set_many_leaves_no_staging_files() {
        let dir = tempfile::tempdir().unwrap();
        let persister = FilePersister::new(dir.path());
        persister
            .set_many(vec![
                ("active_tickets".to_string(), "[]".to_string()),
                ("history_tickets".to_string(), "[1]".to_string()),
            ])
            .await
            .unwrap();

        let mut names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(vec!["active_tickets.json", "history_tickets.json"], names);
    }

    #[tokio::test]
    async fn test_set_many_failure_keeps_previous_values() {
        let dir = tempfile::tempdir().unwrap();
        let persister = FilePersister::new(dir.path());
        persister.set("first", "old".to_string()).await.unwrap();
        // a directory in place of the second target cannot be replaced
        std::fs::create_dir(dir.path().join("second.json")).unwrap();
        std::fs::write(dir.path().join("second.json/keep"), "x").unwrap();

        let result = persister
            .set_many(vec![
                ("first".to_string(), "new".to_string()),
                ("second".to_string(), "new".to_string()),
            ])
            .await;

        assert!(matches!(result, Err(PersistError::Io(_, _))), "{result:?}");
        assert_eq!(Some("old".to_string()), persister.get("first").await.unwrap());
    }

    #[test]
    fn test_file_stem_replaces_separators() {
        assert_eq!("_ticket_parking_active", file_stem("@ticket_parking:active"));
    }
}

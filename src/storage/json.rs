use std::{
    fs::{OpenOptions, read_to_string, remove_file, rename, write},
    path::{Path, PathBuf},
};

use fs2::FileExt;
use serde_json::to_string_pretty;
use tracing::debug;
use uuid::Uuid;

use crate::{
    models::store::Store,
    storage::{Storage, StorageError},
};

/// Keeps the whole document in one pretty-printed JSON file.
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_file_path(&self) -> PathBuf {
        self.path.with_extension("lock")
    }
}

impl Storage for JsonFileStorage {
    fn load(&self) -> Result<Option<Store>, StorageError> {
        match read_to_string(&self.path) {
            Ok(content) => {
                let mut store: Store =
                    serde_json::from_str(&content).map_err(|e| StorageError::ParseFailed {
                        path: self.path.clone(),
                        source: e,
                    })?;

                store.normalize_tags();
                store
                    .validate()
                    .map_err(|e| StorageError::InvalidDocument {
                        path: self.path.clone(),
                        source: e,
                    })?;

                debug!(
                    path = %self.path.display(),
                    daily = store.daily.len(),
                    overall = store.overall.len(),
                    "loaded task file"
                );
                Ok(Some(store))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "task file not found");
                Ok(None)
            }
            Err(e) => Err(StorageError::LoadFailed {
                path: self.path.clone(),
                source: e,
            }),
        }
    }

    fn save(&self, store: &Store) -> Result<(), StorageError> {
        let json =
            to_string_pretty(store).map_err(|e| StorageError::SerializeFailed { source: e })?;

        let unique_temp = format!("{}.tmp.{}", self.path.display(), Uuid::new_v4());
        let temp_path = PathBuf::from(&unique_temp);
        write(&temp_path, json).map_err(|e| StorageError::SaveFailed {
            path: temp_path.clone(),
            source: e,
        })?;

        let lock_file_path = self.lock_file_path();
        let lock_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_file_path)
            .and_then(|file| file.lock_exclusive().map(|()| file));
        let lock_file = match lock_file {
            Ok(file) => file,
            Err(e) => {
                let _ = remove_file(&temp_path);
                return Err(StorageError::SaveFailed {
                    path: lock_file_path,
                    source: e,
                });
            }
        };

        if let Err(e) = rename(&temp_path, &self.path) {
            let _ = remove_file(&temp_path);
            let _ = lock_file.unlock();
            return Err(StorageError::SaveFailed {
                path: self.path.clone(),
                source: e,
            });
        }

        lock_file.unlock().map_err(|e| StorageError::SaveFailed {
            path: self.path.clone(),
            source: e,
        })?;

        debug!(path = %self.path.display(), latest_id = store.latest_id, "saved task file");
        Ok(())
    }
}

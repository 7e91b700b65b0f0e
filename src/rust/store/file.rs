use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use super::{new_snapshot, updated_snapshot, Store, StoreError};
use crate::statistics::{ModelRecord, ModelSnapshot, TokenStatistics};

const MODEL_EXTENSION: &str = "model";

/// Stores each model as a single file in a directory.
///
/// A model file holds the hex SHA-256 digest of its body on the first line
/// followed by the JSON snapshot. Writes go to a temporary file that is then
/// renamed over the old one, so a reader only ever sees a complete commit.
#[derive(Debug)]
pub struct FileStore {
    models_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Creates a FileStore in the default models directory
    pub fn new_default() -> io::Result<Self> {
        Self::new(Self::get_default_models_dir())
    }

    /// Returns the default models directory path
    pub fn get_default_models_dir() -> PathBuf {
        if let Ok(path) = env::var("TOKENSTAT_HOME") {
            return PathBuf::from(path).join("models");
        }

        if let Some(data_dir) = dirs::data_dir() {
            return data_dir.join("tokenstat").join("models");
        }

        if let Some(home_dir) = dirs::home_dir() {
            return home_dir.join(".local").join("share").join("tokenstat").join("models");
        }

        env::temp_dir().join("tokenstat").join("models")
    }

    pub fn new<P: AsRef<Path>>(models_dir: P) -> io::Result<Self> {
        let models_dir = models_dir.as_ref().to_path_buf();
        fs::create_dir_all(&models_dir)?;
        Ok(Self {
            models_dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn models_dir(&self) -> &Path {
        &self.models_dir
    }

    /// Path of the file holding `name`. Names are restricted to ASCII
    /// alphanumerics, `-`, `_` and `.` (not leading) so they map to one file.
    pub fn get_model_path(&self, name: &str) -> Result<PathBuf, StoreError> {
        let valid = !name.is_empty()
            && !name.starts_with('.')
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !valid {
            return Err(StoreError::InvalidName(name.to_string()));
        }
        Ok(self.models_dir.join(format!("{}.{}", name, MODEL_EXTENSION)))
    }

    /// Names of all models in the directory, sorted
    pub fn list(&self) -> Result<Vec<String>, StoreError> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.models_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(MODEL_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Deletes a model. Returns whether it existed.
    pub fn remove(&self, name: &str) -> Result<bool, StoreError> {
        let path = self.get_model_path(name)?;
        let _lock = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)?;
        log::info!("Removed model '{}' from {:?}", name, path);
        Ok(true)
    }

    fn read_snapshot(&self, name: &str, path: &Path) -> Result<ModelSnapshot, StoreError> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(name.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        log::debug!("Read {} bytes from {:?}", bytes.len(), path);

        let split = bytes.iter().position(|&b| b == b'\n').ok_or_else(|| StoreError::InvalidSnapshot {
            name: name.to_string(),
            reason: "missing checksum header".into(),
        })?;
        let expected = String::from_utf8_lossy(&bytes[..split]).trim().to_string();
        let body = &bytes[split + 1..];

        let actual = checksum(body);
        if actual != expected {
            log::error!("Checksum mismatch for model '{}': expected {}, got {}", name, expected, actual);
            return Err(StoreError::ChecksumMismatch {
                name: name.to_string(),
                expected,
                actual,
            });
        }

        let snapshot: ModelSnapshot = serde_json::from_slice(body)?;
        if snapshot.record.name != name {
            return Err(StoreError::InvalidSnapshot {
                name: name.to_string(),
                reason: format!("file holds model '{}'", snapshot.record.name),
            });
        }
        snapshot.validate().map_err(|reason| StoreError::InvalidSnapshot {
            name: name.to_string(),
            reason,
        })?;
        Ok(snapshot)
    }

    fn write_snapshot(&self, path: &Path, snapshot: &ModelSnapshot) -> Result<(), StoreError> {
        let body = serde_json::to_vec(snapshot)?;
        let mut contents = checksum(&body).into_bytes();
        contents.push(b'\n');
        contents.extend_from_slice(&body);

        let tmp_path = path.with_extension(format!("{}.tmp", MODEL_EXTENSION));
        fs::write(&tmp_path, &contents)?;
        if let Err(e) = fs::rename(&tmp_path, path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }
        log::debug!("Committed {} bytes to {:?}", contents.len(), path);
        Ok(())
    }
}

fn checksum(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

impl Store for FileStore {
    /// A name that could never be stored does not exist.
    fn exists(&self, name: &str) -> Result<bool, StoreError> {
        match self.get_model_path(name) {
            Ok(path) => Ok(path.exists()),
            Err(StoreError::InvalidName(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn load(&self, name: &str) -> Result<ModelSnapshot, StoreError> {
        let path = self.get_model_path(name)?;
        self.read_snapshot(name, &path)
    }

    fn create(&self, name: &str, n_classes: usize) -> Result<ModelRecord, StoreError> {
        let path = self.get_model_path(name)?;
        let _lock = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;
        if path.exists() {
            return Err(StoreError::AlreadyExists(name.to_string()));
        }
        let snapshot = new_snapshot(name, n_classes)?;
        self.write_snapshot(&path, &snapshot)?;
        log::info!("Created model '{}' with {} classes at {:?}", name, n_classes, path);
        Ok(snapshot.record)
    }

    fn save(
        &self,
        name: &str,
        classes: &[TokenStatistics],
        last_update: Option<DateTime<Utc>>,
    ) -> Result<(), StoreError> {
        let path = self.get_model_path(name)?;
        let _lock = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;
        let current = self.read_snapshot(name, &path)?;
        let snapshot = updated_snapshot(&current, classes, last_update)?;
        self.write_snapshot(&path, &snapshot)
    }
}

//! JSON file backing the session's storage slots.

use std::collections::BTreeMap;
use std::fs;
use std::io::{ErrorKind as IoErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use careconnect_core::session::CredentialStore;
use careconnect_core::{Error, Result};
use tempfile::NamedTempFile;

use crate::TRACING_TARGET_STORE;

type Slots = BTreeMap<String, String>;

/// [`CredentialStore`] persisting its slots as a flat JSON object.
///
/// Every write replaces the file atomically; removing the last slot
/// deletes the file. An unreadable file is treated as empty on write.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Slots> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == IoErrorKind::NotFound => return Ok(Slots::new()),
            Err(error) => {
                return Err(Error::from(error)
                    .with_context(format!("reading {}", self.path.display())));
            }
        };

        if contents.trim().is_empty() {
            return Ok(Slots::new());
        }

        serde_json::from_str(&contents).map_err(|error| {
            Error::from(error).with_context(format!("parsing {}", self.path.display()))
        })
    }

    /// Loads the slots for modification, starting over if the file is corrupt.
    fn load_for_update(&self) -> Result<Slots> {
        match self.load() {
            Err(error) if error.kind == careconnect_core::ErrorKind::Serialization => {
                tracing::warn!(
                    target: TRACING_TARGET_STORE,
                    path = %self.path.display(),
                    error = %error,
                    "Session file is corrupt, starting over"
                );
                Ok(Slots::new())
            }
            other => other,
        }
    }

    fn save(&self, slots: &Slots) -> Result<()> {
        if slots.is_empty() {
            return match fs::remove_file(&self.path) {
                Err(error) if error.kind() != IoErrorKind::NotFound => Err(Error::from(error)
                    .with_context(format!("removing {}", self.path.display()))),
                _ => Ok(()),
            };
        }

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut file = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut file, slots)?;
        file.write_all(b"\n")?;
        file.as_file().sync_all()?;
        file.persist(&self.path).map_err(|error| {
            Error::from(error.error).with_context(format!("writing {}", self.path.display()))
        })?;

        tracing::trace!(
            target: TRACING_TARGET_STORE,
            path = %self.path.display(),
            slots = slots.len(),
            "Session file written"
        );
        Ok(())
    }

    fn update(&self, change: impl FnOnce(&mut Slots)) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut slots = self.load_for_update()?;
        change(&mut slots);
        self.save(&slots)
    }
}

impl CredentialStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.update(|slots| {
            slots.insert(key.to_owned(), value.to_owned());
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.update(|slots| {
            slots.remove(key);
        })
    }
}

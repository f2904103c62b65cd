use super::codec;
use crate::error::StoreError;
use crate::signature::Registry;
use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// The message store shared by every compilation pass.
#[derive(Clone, Debug)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing or zero-length store is an empty registry.
    pub fn load(&self) -> Result<Registry, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "message store does not exist yet");
                return Ok(Registry::new());
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        let text = String::from_utf8(bytes).map_err(|err| {
            let valid = &err.as_bytes()[..err.utf8_error().valid_up_to()];
            StoreError::Corrupt {
                path: self.path.clone(),
                line: valid.iter().filter(|&&b| b == b'\n').count() + 1,
                reason: "invalid UTF-8".into(),
            }
        })?;

        let entries = codec::decode(&text).map_err(|err| StoreError::Corrupt {
            path: self.path.clone(),
            line: err.line,
            reason: err.reason,
        })?;

        let mut registry = Registry::new();
        registry
            .merge_from_store(entries)
            .map_err(|conflict| StoreError::Conflict {
                path: self.path.clone(),
                conflict,
            })?;
        debug!(path = %self.path.display(), messages = registry.len(), "loaded message store");
        Ok(registry)
    }

    /// Call sites can't be checked against nothing, so an empty store is an
    /// error here rather than an empty registry.
    pub fn load_nonempty(&self) -> Result<Registry, StoreError> {
        let registry = self.load()?;
        if registry.is_empty() {
            return Err(StoreError::Empty {
                path: self.path.clone(),
            });
        }
        Ok(registry)
    }

    /// Merges `registry` with whatever is on disk now and atomically replaces
    /// the store with the result. Entries written by a parallel pass since
    /// this one loaded are kept. Returns the merged registry.
    pub fn persist(&self, registry: &Registry) -> Result<Registry, StoreError> {
        let mut merged = self.load()?;
        merged
            .merge_from_store(registry.iter().cloned())
            .map_err(|conflict| StoreError::Conflict {
                path: self.path.clone(),
                conflict,
            })?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|source| self.io_error(source))?;

        let mut tmp = NamedTempFile::new_in(&dir).map_err(|source| self.io_error(source))?;
        tmp.write_all(codec::encode(&merged).as_bytes())
            .map_err(|source| self.io_error(source))?;
        tmp.as_file()
            .sync_all()
            .map_err(|source| self.io_error(source))?;
        tmp.persist(&self.path).map_err(|source| StoreError::Persist {
            path: self.path.clone(),
            source,
        })?;

        info!(path = %self.path.display(), messages = merged.len(), "wrote message store");
        Ok(merged)
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

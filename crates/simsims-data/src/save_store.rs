//! The save directory: numbered JSON saves, newest last.
//!
//! Saves are named `save_000.json`, `save_001.json`, ... A new save always
//! takes the number after the highest one present, so deleting an old save
//! never causes a newer one to be overwritten.

use simsims_core::serialize::{LoadError, SaveData, SaveError};
use std::path::{Path, PathBuf};

const SAVE_PREFIX: &str = "save_";
const SAVE_EXTENSION: &str = "json";

/// Errors from reading or writing the save directory.
#[derive(Debug, thiserror::Error)]
pub enum SaveStoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not encode save: {0}")]
    Encode(#[from] SaveError),
    #[error("could not load {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: LoadError,
    },
}

/// A directory of numbered saves.
#[derive(Debug, Clone)]
pub struct SaveStore {
    dir: PathBuf,
}

impl SaveStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Save number encoded in a file name, if it is one of ours.
    fn save_number(path: &Path) -> Option<u32> {
        if path.extension()?.to_str()? != SAVE_EXTENSION {
            return None;
        }
        path.file_stem()?
            .to_str()?
            .strip_prefix(SAVE_PREFIX)?
            .parse()
            .ok()
    }

    /// All saves in the directory, oldest first. A missing directory has no
    /// saves.
    pub fn list(&self) -> Result<Vec<PathBuf>, SaveStoreError> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(SaveStoreError::Io {
                    path: self.dir.clone(),
                    source,
                });
            }
        };

        let mut saves: Vec<(u32, PathBuf)> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter_map(|path| Self::save_number(&path).map(|n| (n, path)))
            .collect();
        saves.sort_by_key(|(n, _)| *n);
        Ok(saves.into_iter().map(|(_, path)| path).collect())
    }

    /// Write `data` as the newest save and return its path.
    pub fn save(&self, data: &SaveData) -> Result<PathBuf, SaveStoreError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| SaveStoreError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let next = self
            .list()?
            .iter()
            .filter_map(|p| Self::save_number(p))
            .max()
            .map_or(0, |n| n + 1);
        let path = self
            .dir
            .join(format!("{SAVE_PREFIX}{next:03}.{SAVE_EXTENSION}"));

        let json = data.to_json()?;
        std::fs::write(&path, json).map_err(|source| SaveStoreError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::info!(file = %path.display(), places = data.places.len(), "saved economy");
        Ok(path)
    }

    /// Read and validate one save file.
    pub fn load(&self, path: &Path) -> Result<SaveData, SaveStoreError> {
        let json = std::fs::read_to_string(path).map_err(|source| SaveStoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        SaveData::from_json(&json).map_err(|source| SaveStoreError::Load {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The newest save, if there is one.
    pub fn load_latest(&self) -> Result<Option<SaveData>, SaveStoreError> {
        match self.list()?.last() {
            Some(path) => self.load(path).map(Some),
            None => Ok(None),
        }
    }
}

use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::{Episode, EpisodeFieldUpdate};

/// Errors from the persisted episode collection
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read store {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("store {path:?} is not a valid episode collection: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to write store {path:?}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to serialize episodes: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// The persisted collection of episodes
pub trait EpisodeStore {
    fn read_all(&self) -> Result<Vec<Episode>, StoreError>;

    /// Replace the whole collection
    fn write_all(&self, episodes: &[Episode]) -> Result<(), StoreError>;

    /// Apply a field-level update to one record
    ///
    /// Returns `false` without writing when no record has `id`.
    fn update_fields(&self, id: &str, update: EpisodeFieldUpdate) -> Result<bool, StoreError> {
        let mut episodes = self.read_all()?;
        let Some(episode) = episodes.iter_mut().find(|e| e.id() == id) else {
            return Ok(false);
        };
        episode.apply_update(update);
        self.write_all(&episodes)?;
        Ok(true)
    }
}

/// A pretty-printed JSON array on disk
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("episodes.json");
        self.path
            .with_file_name(format!(".{}.{}.tmp", name, Uuid::new_v4()))
    }

    fn write_file(&self, path: &Path, episodes: &[Episode]) -> Result<(), StoreError> {
        let file = File::create(path).map_err(|e| self.write_err(e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, episodes)?;
        writer.write_all(b"\n").map_err(|e| self.write_err(e))?;
        writer
            .into_inner()
            .map_err(|e| self.write_err(e.into_error()))?
            .sync_all()
            .map_err(|e| self.write_err(e))
    }

    fn write_err(&self, source: std::io::Error) -> StoreError {
        StoreError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

impl EpisodeStore for JsonFileStore {
    fn read_all(&self) -> Result<Vec<Episode>, StoreError> {
        let file = File::open(&self.path).map_err(|source| StoreError::Read {
            path: self.path.clone(),
            source,
        })?;
        let episodes: Vec<Episode> =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| StoreError::Corrupt {
                path: self.path.clone(),
                source,
            })?;
        Ok(episodes.into_iter().map(Episode::with_counted_words).collect())
    }

    /// Serialize to a sibling temp file, then rename it over the store
    fn write_all(&self, episodes: &[Episode]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.write_err(e))?;
        }

        let tmp = self.temp_path();
        let written = self
            .write_file(&tmp, episodes)
            .and_then(|()| std::fs::rename(&tmp, &self.path).map_err(|e| self.write_err(e)));

        if written.is_err() {
            let _ = std::fs::remove_file(&tmp);
        } else {
            debug!("Wrote {} episodes to {:?}", episodes.len(), self.path);
        }
        written
    }
}

impl StoreError {
    /// The store file does not exist yet
    pub fn is_missing(&self) -> bool {
        matches!(self, StoreError::Read { source, .. } if source.kind() == ErrorKind::NotFound)
    }
}

/// Read the collection, treating a store that does not exist yet as empty
///
/// Any other failure is returned, so a pass never overwrites records it
/// could not read.
pub fn load_existing(store: &dyn EpisodeStore) -> Result<Vec<Episode>, StoreError> {
    match store.read_all() {
        Ok(episodes) => Ok(episodes),
        Err(e) if e.is_missing() => {
            warn!("Starting from an empty collection: {}", e);
            Ok(Vec::new())
        }
        Err(e) => Err(e),
    }
}

use crate::history::{History, HistoryItem};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode history: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Owns the in-memory [`History`] and mirrors every change to a JSON file.
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    history: History,
}

impl HistoryStore {
    /// Reads the history file. A missing or unreadable file yields an
    /// empty history.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let history = match read_history_file(&path) {
            Ok(Some(history)) => history,
            Ok(None) => History::default(),
            Err(err) => {
                log::warn!("ignoring unreadable history file: {err}");
                History::default()
            }
        };
        log::debug!("loaded {} history entries from {}", history.len(), path.display());
        Self { path, history }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn append(&mut self, item: HistoryItem) -> &History {
        self.history.push_front(item);
        self.persist();
        &self.history
    }

    pub fn clear(&mut self) -> &History {
        self.history.clear();
        self.persist();
        &self.history
    }

    fn persist(&self) {
        if let Err(err) = write_history_file(&self.path, &self.history) {
            log::warn!("failed to persist history: {err}");
        }
    }
}

fn read_history_file(path: &Path) -> Result<Option<History>, StoreError> {
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    let items: Vec<HistoryItem> =
        serde_json::from_slice(&data).map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(Some(History::from_items(items)))
}

fn write_history_file(path: &Path, history: &History) -> Result<(), StoreError> {
    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(io_err)?;
    }

    let bytes = serde_json::to_vec_pretty(history)?;
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, bytes).map_err(io_err)?;
    match fs::rename(&tmp_path, path) {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            if path.exists() {
                fs::remove_file(path).map_err(io_err)?;
                fs::rename(&tmp_path, path).map_err(io_err)
            } else {
                Err(io_err(rename_err))
            }
        }
    }
}

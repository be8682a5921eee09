use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::domain::Routine;
use crate::error::{AppError, AppResult, SessionError};

/// Where a synced routine is persisted and reloaded from.
///
/// A freshly received routine goes through `save` then `load`, so the
/// in-memory graph always matches what a reload would produce.
pub trait RoutineStore: Send + Sync {
    /// # Errors
    ///
    /// Returns an error when the routine cannot be encoded or written.
    fn save(&self, routine: &Routine) -> AppResult<()>;

    /// # Errors
    ///
    /// Returns an error when stored data cannot be read or decoded.
    fn load(&self) -> AppResult<Option<Routine>>;
}

/// Keeps the serialized routine in memory.
#[derive(Debug, Default)]
pub struct MemoryRoutineStore {
    saved: Mutex<Option<String>>,
}

impl MemoryRoutineStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RoutineStore for MemoryRoutineStore {
    fn save(&self, routine: &Routine) -> AppResult<()> {
        let encoded = serde_json::to_string(routine).map_err(|err| {
            AppError::session(SessionError::Serialize {
                context: "routine store",
                source: err,
            })
        })?;
        *self.saved.lock().unwrap_or_else(PoisonError::into_inner) = Some(encoded);
        Ok(())
    }

    fn load(&self) -> AppResult<Option<Routine>> {
        let saved = self
            .saved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        saved
            .map(|encoded| {
                serde_json::from_str(&encoded).map_err(|err| {
                    AppError::session(SessionError::Deserialize {
                        context: "routine store",
                        source: err,
                    })
                })
            })
            .transpose()
    }
}

/// Persists the routine as a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileRoutineStore {
    path: PathBuf,
}

impl JsonFileRoutineStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RoutineStore for JsonFileRoutineStore {
    fn save(&self, routine: &Routine) -> AppResult<()> {
        let encoded = serde_json::to_string_pretty(routine).map_err(|err| {
            AppError::session(SessionError::Serialize {
                context: "routine store",
                source: err,
            })
        })?;
        std::fs::write(&self.path, encoded).map_err(|err| {
            AppError::session(SessionError::WriteStore {
                path: self.path.clone(),
                source: err,
            })
        })
    }

    fn load(&self) -> AppResult<Option<Routine>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path).map_err(|err| {
            AppError::session(SessionError::ReadStore {
                path: self.path.clone(),
                source: err,
            })
        })?;
        serde_json::from_str(&content).map(Some).map_err(|err| {
            AppError::session(SessionError::Deserialize {
                context: "routine store",
                source: err,
            })
        })
    }
}

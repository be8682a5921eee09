use std::path::Path;

use crate::domain::InputReplay;
use crate::error::{AppError, AppResult, ReplayError};

/// Reads an [`InputReplay`] from a JSON file.
///
/// # Errors
///
/// Returns an error when the file cannot be read or is not a replay.
pub async fn load_replay(path: &Path) -> AppResult<InputReplay> {
    let content = tokio::fs::read_to_string(path).await.map_err(|err| {
        AppError::replay(ReplayError::ReadReplay {
            path: path.to_path_buf(),
            source: err,
        })
    })?;
    serde_json::from_str(&content).map_err(|err| {
        AppError::replay(ReplayError::ParseReplay {
            path: path.to_path_buf(),
            source: err,
        })
    })
}

/// Writes an [`InputReplay`] as pretty JSON.
///
/// # Errors
///
/// Returns an error when the replay cannot be encoded or written.
pub async fn save_replay(path: &Path, replay: &InputReplay) -> AppResult<()> {
    let payload = serde_json::to_string_pretty(replay)?;
    tokio::fs::write(path, payload).await?;
    Ok(())
}

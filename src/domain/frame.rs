use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult, SessionError};

pub const PNG_MIME: &str = "image/png";

/// A screen capture as carried on the wire; `data` is base64 PNG.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    #[serde(default)]
    pub id: Option<i32>,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl Frame {
    #[must_use]
    pub fn from_png(id: Option<i32>, width: u32, height: u32, bytes: &[u8]) -> Self {
        Self {
            id,
            width,
            height,
            data: Some(STANDARD.encode(bytes)),
        }
    }

    fn label(&self) -> String {
        self.id
            .map_or_else(|| "<live>".to_owned(), |id| id.to_string())
    }

    /// Decodes the frame into something a renderer can display.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::MissingData`] when the frame carries no image
    /// data and [`SessionError::InvalidFrameData`] when it is not base64.
    pub fn to_blob(&self) -> AppResult<FrameBlob> {
        let data = self.data.as_deref().filter(|data| !data.is_empty()).ok_or_else(|| {
            AppError::session(SessionError::MissingData {
                frame: self.label(),
                field: "data",
            })
        })?;
        let bytes = STANDARD.decode(data).map_err(|err| {
            AppError::session(SessionError::InvalidFrameData {
                frame: self.label(),
                source: err,
            })
        })?;
        Ok(FrameBlob {
            id: self.id,
            width: self.width,
            height: self.height,
            mime: PNG_MIME,
            bytes,
        })
    }
}

/// Decoded frame bytes ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBlob {
    pub id: Option<i32>,
    pub width: u32,
    pub height: u32,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

//! Media file domain model.
//!
//! Files (gallery images, background music) belong to a tenant. The
//! blob upload itself goes through an external store; the panel only
//! tracks the resulting URL and presentation order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PanelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Music,
    Other,
}

impl MediaKind {
    pub fn parse(value: &str) -> Result<Self, PanelError> {
        match value.trim().to_lowercase().as_str() {
            "image" => Ok(MediaKind::Image),
            "music" => Ok(MediaKind::Music),
            "other" => Ok(MediaKind::Other),
            other => Err(PanelError::validation(format!(
                "unknown media kind '{other}'"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Music => "music",
            MediaKind::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaFile {
    pub id: i64,
    pub tenant_id: i64,
    pub kind: MediaKind,
    pub url: String,
    pub display_name: Option<String>,
    /// Presentation order within a kind; lower sorts first.
    pub display_order: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMediaFile {
    pub tenant_id: i64,
    pub kind: MediaKind,
    pub url: String,
    pub display_name: Option<String>,
    pub display_order: i64,
}

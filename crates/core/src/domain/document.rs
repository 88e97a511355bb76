// Document submission model

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// Media kinds the inference service accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Png,
    Jpeg,
    Webp,
    Pdf,
}

impl MediaKind {
    /// Full default capability set (callers may restrict it per request)
    pub const ALL: [MediaKind; 4] = [
        MediaKind::Png,
        MediaKind::Jpeg,
        MediaKind::Webp,
        MediaKind::Pdf,
    ];

    pub fn from_mime(mime: &str) -> Result<Self, DomainError> {
        match mime {
            "image/png" => Ok(MediaKind::Png),
            "image/jpeg" => Ok(MediaKind::Jpeg),
            "image/webp" => Ok(MediaKind::Webp),
            "application/pdf" => Ok(MediaKind::Pdf),
            other => Err(DomainError::UnsupportedMediaType(other.to_string())),
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            MediaKind::Png => "image/png",
            MediaKind::Jpeg => "image/jpeg",
            MediaKind::Webp => "image/webp",
            MediaKind::Pdf => "application/pdf",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mime_type())
    }
}

/// Raw document handed to the background queue for processing
#[derive(Debug, Clone)]
pub struct DocumentPayload {
    pub content: Vec<u8>,
    pub media_kind: MediaKind,
}

impl DocumentPayload {
    pub fn new(content: Vec<u8>, media_kind: MediaKind) -> Self {
        Self {
            content,
            media_kind,
        }
    }
}

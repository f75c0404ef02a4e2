//! Data models for Print Service

use badgematic_common::IdentityRecord;
use serde::{Deserialize, Serialize};

/// Photo carried by a print request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PhotoPayload {
    /// Inline `data:<mime>;base64,<payload>` URL
    DataUrl { data: String },

    /// Photo saved earlier, relative to the photo directory
    File { path: String },
}

/// Request to print a new badge
#[derive(Debug, Deserialize)]
pub struct StartPrintRequest {
    /// Identity fields for the badge
    pub identity: IdentityRecord,

    /// Captured photo
    pub photo: PhotoPayload,
}

/// Response from starting a print job
#[derive(Debug, Serialize)]
pub struct StartPrintResponse {
    /// Whether the job was started
    pub success: bool,

    /// Job ID for polling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,

    /// Error message if the job could not be started
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Query string for status polling
#[derive(Debug, Default, Deserialize)]
pub struct StatusQuery {
    pub job_id: Option<String>,
}

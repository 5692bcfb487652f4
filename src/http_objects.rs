use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::registry::RegistryError;

/// Caller-facing API error: a status code plus a fixed category message.
/// Raw internal error text is logged but never returned to the caller.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(skip)]
    status_code: StatusCode,
    error: String,
}

impl ApiError {
    pub fn new(status_code: StatusCode, message: &str) -> Self {
        Self {
            status_code,
            error: message.to_string(),
        }
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal_error(message: &str) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!("API Error: {} - {}", self.status_code, self.error);
        (self.status_code, Json(serde_json::json!({ "error": self.error }))).into_response()
    }
}

impl ApiError {
    /// Map an upload failure to its fixed caller-facing message.
    pub fn from_upload_error(e: RegistryError) -> Self {
        match e {
            RegistryError::MissingInput => Self::bad_request("No file part"),
            RegistryError::BlobStore(source) => {
                error!("upload failed in blob store: {source}");
                Self::internal_error("File upload failed")
            }
            RegistryError::MetadataStore(source) => {
                error!("upload failed in metadata store: {source}");
                Self::internal_error("Database insertion failed")
            }
        }
    }

    /// Map a listing failure to its fixed caller-facing message.
    pub fn from_list_error(e: RegistryError) -> Self {
        error!("listing failed: {e}");
        Self::internal_error("Failed to retrieve files")
    }

    /// Map a deletion failure to its fixed caller-facing message.
    pub fn from_delete_error(e: RegistryError) -> Self {
        match e {
            RegistryError::MissingInput => Self::bad_request("No filename"),
            RegistryError::BlobStore(source) => {
                error!("deletion failed in blob store: {source}");
                Self::internal_error("File deletion failed")
            }
            RegistryError::MetadataStore(source) => {
                error!("deletion failed in metadata store: {source}");
                Self::internal_error("Database deletion failed")
            }
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub message: String,
}

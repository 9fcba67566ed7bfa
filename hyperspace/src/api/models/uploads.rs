//! API response models for icon uploads.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Metadata of a stored upload. `filename` is the name to put in a link's `imageurl`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadedFile {
    /// Multipart field the file arrived in (always `file`)
    pub fieldname: String,
    /// Name the client sent
    pub originalname: String,
    pub mimetype: String,
    /// Name assigned by the upload store
    #[schema(example = "1718000000000-mail.png")]
    pub filename: String,
    /// Size in bytes
    pub size: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    #[schema(example = "File uploaded successfully")]
    pub message: String,
    pub file: UploadedFile,
}

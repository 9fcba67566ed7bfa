use crate::AppState;
use crate::api::handlers::read_file_field;
use crate::api::models::uploads::{UploadResponse, UploadedFile};
use crate::errors::Result;
use axum::{
    Json,
    extract::{Multipart, State},
};

#[utoipa::path(
    post,
    path = "/upload",
    tag = "uploads",
    summary = "Upload image",
    description = "Stores one image sent in the multipart field `file`. Put the returned `file.filename` into a link's `imageurl`; the image is then served at `/uploads/{filename}`.",
    request_body(content_type = "multipart/form-data", description = "Image in field `file`"),
    responses(
        (status = 200, description = "File stored", body = UploadResponse),
        (status = 400, description = "No file field or unusable file name"),
        (status = 413, description = "File exceeds the configured size limit"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn upload_file(State(state): State<AppState>, multipart: Multipart) -> Result<Json<UploadResponse>> {
    let upload = read_file_field(multipart, state.config.uploads.max_file_size).await?;
    let filename = state.uploads.store(&upload.file_name, &upload.content).await?;

    tracing::info!(original = %upload.file_name, stored = %filename, size = upload.content.len(), "Stored upload");

    Ok(Json(UploadResponse {
        message: "File uploaded successfully".to_string(),
        file: UploadedFile {
            fieldname: "file".to_string(),
            originalname: upload.file_name,
            mimetype: upload.content_type,
            filename,
            size: upload.content.len() as u64,
        },
    }))
}

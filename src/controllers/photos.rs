use crate::models::upload_dto::{UploadRequest, UploadResponse};
use crate::routes::router::AppState;
use crate::services::orchestrator;
use crate::services::validator::ValidationError;
use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::StatusCode,
};

#[utoipa::path(
    post,
    path = "/api/upload-photos",
    request_body = UploadRequest,
    responses(
        (status = 200, description = "Photos stored", body = UploadResponse),
        (status = 400, description = "Missing tripNum, invalid base64 or oversized body"),
        (status = 401, description = "Missing, invalid or expired bearer token"),
        (status = 500, description = "Storage failure or missing destination")
    ),
    tag = "photos"
)]
pub async fn upload_photos(
    State(state): State<AppState>,
    payload: Result<Json<UploadRequest>, JsonRejection>,
) -> Result<Json<UploadResponse>, (StatusCode, String)> {
    let Json(payload) = payload.map_err(|rejection| {
        let err = reject_body(rejection, state.config.max_body_bytes);
        (StatusCode::BAD_REQUEST, err.to_string())
    })?;

    let file_ids = orchestrator::upload(
        payload,
        state.storage.as_ref(),
        state.destination.as_ref(),
    )
    .await
    .map_err(|e| (e.status_code(), e.to_string()))?;

    Ok(Json(UploadResponse {
        success: true,
        file_ids,
    }))
}

fn reject_body(rejection: JsonRejection, limit: usize) -> ValidationError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ValidationError::PayloadTooLarge(limit)
    } else {
        ValidationError::MalformedBody(rejection.body_text())
    }
}

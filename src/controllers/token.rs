use crate::models::token_dto::{TokenRequest, TokenResponse};
use crate::routes::router::AppState;
use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::StatusCode,
};
use tracing::{error, info};

#[utoipa::path(
    post,
    path = "/api/get-jwt",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 400, description = "Invalid request body"),
        (status = 500, description = "Failed to generate token")
    ),
    tag = "auth"
)]
pub async fn get_jwt(
    State(state): State<AppState>,
    payload: Result<Json<TokenRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, (StatusCode, String)> {
    let Json(payload) = payload.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            format!("Invalid request body: {}", e.body_text()),
        )
    })?;

    let username = payload.username.clone();
    let token = state.tokens.issue(payload.into()).map_err(|e| {
        error!("{e}");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;
    info!("issued token for {username}");

    Ok(Json(TokenResponse { token }))
}

use crate::models::health_dto::Health;
use crate::routes::router::AppState;
use crate::services::storage::Storage;
use axum::extract::State;
use axum::Json;

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service status and active storage backend", body = Health)
    ),
    tag = "health"
)]
pub async fn health(State(state): State<AppState>) -> Json<Health> {
    // Storage is optional, the token endpoint keeps working without it
    let status = if state.storage.is_available() && state.destination.is_some() {
        "ok"
    } else {
        "degraded"
    };

    Json(Health {
        status: status.to_string(),
        storage: state.storage.kind().to_string(),
    })
}

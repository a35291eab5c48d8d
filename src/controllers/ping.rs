use crate::models::ping_dto::Ping;
use axum::extract::Json;
use utoipa;

#[utoipa::path(
    get,
    path = "/test",
    responses(
        (status = 200, description = "Server is running", body = Ping)
    ),
    tag = "health"
)]
pub async fn ping() -> Json<Ping> {
    Json(Ping {
        status: "ok".to_string(),
        message: "Photo server is running".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ping_returns_running() {
        // Call the ping handler
        let response = ping().await;

        // Extract the JSON body
        let ping_response = response.0;

        assert_eq!(ping_response.status, "ok");
        assert_eq!(ping_response.message, "Photo server is running");
    }
}

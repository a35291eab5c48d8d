use crate::routes::router::AppState;
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::Response,
};
use tracing::debug;

/// Reject requests without a valid `Authorization: Bearer <token>` header
/// before the body is read. Validated claims are attached as a request
/// extension.
pub async fn require_bearer(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, (StatusCode, String)> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let claims = state
        .tokens
        .validate(header)
        .map_err(|e| (StatusCode::UNAUTHORIZED, e.to_string()))?;

    debug!("authenticated {} ({})", claims.username, claims.site);
    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::claims_dao::{Claims, Identity};
    use crate::routes::router::testing;
    use axum::body::{to_bytes, Body};
    use axum::{middleware, routing::get, Extension, Router};
    use http::Request;
    use tower::ServiceExt; // for `oneshot`

    async fn whoami(Extension(claims): Extension<Claims>) -> String {
        claims.username
    }

    fn app(state: AppState) -> Router {
        Router::new()
            .route("/whoami", get(whoami))
            .route_layer(middleware::from_fn_with_state(state.clone(), require_bearer))
            .with_state(state)
    }

    fn request(authorization: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("/whoami");
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_valid_token_passes_claims() {
        let tempdir = tempfile::tempdir().unwrap();
        let state = testing::local_state(tempdir.path().to_str().unwrap(), &[]);
        let token = state
            .tokens
            .issue(Identity {
                username: "budi".to_string(),
                emp_code: "EMP001".to_string(),
                site: "SGI053".to_string(),
            })
            .unwrap();

        let response = app(state)
            .oneshot(request(Some(&format!("Bearer {token}"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"budi");
    }

    #[tokio::test]
    async fn test_missing_header_is_unauthorized() {
        let tempdir = tempfile::tempdir().unwrap();
        let state = testing::local_state(tempdir.path().to_str().unwrap(), &[]);

        let response = app(state).oneshot(request(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_invalid_token_is_unauthorized() {
        let tempdir = tempfile::tempdir().unwrap();
        let state = testing::local_state(tempdir.path().to_str().unwrap(), &[]);

        let response = app(state)
            .oneshot(request(Some("Bearer not.a.token")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"Invalid or expired token");
    }
}

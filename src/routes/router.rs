use crate::config::loader::Config;
use crate::controllers::auth::require_bearer;
use crate::controllers::health::__path_health;
use crate::controllers::health::health;
use crate::controllers::photos::__path_upload_photos;
use crate::controllers::photos::upload_photos;
use crate::controllers::ping::__path_ping;
use crate::controllers::ping::ping;
use crate::controllers::token::__path_get_jwt;
use crate::controllers::token::get_jwt;
use crate::datasource::storage::destination;
use crate::models::health_dto::Health;
use crate::models::ping_dto::Ping;
use crate::models::token_dto::{TokenRequest, TokenResponse};
use crate::models::upload_dto::{UploadRequest, UploadResponse};
use crate::services::storage::{StorageBackend, StorageDestination};
use crate::services::token::TokenService;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace;
use tower_http::trace::TraceLayer;
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub tokens: Arc<TokenService>,
    pub storage: Arc<StorageBackend>,
    pub destination: Option<StorageDestination>,
}

impl AppState {
    pub fn new(config: Config, storage: StorageBackend) -> AppState {
        let tokens = TokenService::new(config.jwt_secret.as_bytes(), config.token_ttl());
        let destination = destination(&config.storage);
        AppState {
            config: Arc::new(config),
            tokens: Arc::new(tokens),
            storage: Arc::new(storage),
            destination,
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        get_jwt,
        upload_photos,
        ping,
        health
    ),
    components(
        schemas(TokenRequest, TokenResponse, UploadRequest, UploadResponse, Ping, Health)
    ),
    tags(
        (name = "auth", description = "Token issuance"),
        (name = "photos", description = "Trip photo uploads"),
        (name = "health", description = "Health check endpoints")
    )
)]
struct ApiDoc;

pub fn create_routes(state: AppState) -> Router {
    let mut photos = Router::new()
        .route("/api/upload-photos", post(upload_photos))
        .layer(DefaultBodyLimit::max(state.config.max_body_bytes));
    if state.config.require_auth {
        photos = photos.route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_bearer,
        ));
    }

    Router::new()
        .route("/", get(ping))
        .route("/test", get(ping))
        .route("/health", get(health))
        .route("/api/get-jwt", post(get_jwt))
        .merge(photos)
        .merge(SwaggerUi::new("/swagger").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
        )
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::services::storage::local::LocalStorage;
    use std::collections::HashMap;

    pub const SECRET: &str = "test-secret-key-for-jwt";

    pub fn config(vars: &[(&str, &str)]) -> Config {
        let mut map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        map.entry("JWT_SECRET".to_string())
            .or_insert_with(|| SECRET.to_string());
        Config::from_lookup(move |key: &str| map.get(key).cloned()).unwrap()
    }

    /// State backed by local storage rooted at `root`.
    pub fn local_state(root: &str, vars: &[(&str, &str)]) -> AppState {
        let mut vars = vars.to_vec();
        vars.push(("STORAGE_DESTINATION", root));
        AppState::new(config(&vars), StorageBackend::Local(LocalStorage))
    }
}

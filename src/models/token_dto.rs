use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of `POST /api/get-jwt`. Missing fields deserialize as empty strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct TokenRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default, rename = "empCode")]
    pub emp_code: String,
    #[serde(default)]
    pub site: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UploadRequest {
    #[serde(default, rename = "tripNum")]
    pub trip_num: String,
    /// Base64 image, optionally prefixed with `data:image/jpeg;base64,`
    #[serde(default, rename = "odometerPhoto")]
    pub odometer_photo: Option<String>,
    #[serde(default, rename = "cargoPhoto")]
    pub cargo_photo: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    pub success: bool,
    #[serde(rename = "fileIds")]
    pub file_ids: Vec<String>,
}

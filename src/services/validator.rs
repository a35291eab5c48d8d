use crate::models::upload_dto::UploadRequest;
use crate::utils::io::sanitize_identifier;

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("tripNum is required")]
    MissingTripNum,
    #[error("tripNum does not contain a usable name")]
    InvalidTripNum,
    #[error("Request body exceeds the {0} byte limit")]
    PayloadTooLarge(usize),
    #[error("Invalid request body: {0}")]
    MalformedBody(String),
}

/// An upload request whose trip id is safe to use in storage names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    pub trip: String,
    pub odometer_photo: Option<String>,
    pub cargo_photo: Option<String>,
}

pub fn validate(req: UploadRequest) -> Result<ValidatedRequest, ValidationError> {
    if req.trip_num.is_empty() {
        return Err(ValidationError::MissingTripNum);
    }

    let trip = sanitize_identifier(&req.trip_num);
    if matches!(trip.as_str(), "" | "." | "..") || trip.chars().any(char::is_control) {
        return Err(ValidationError::InvalidTripNum);
    }

    Ok(ValidatedRequest {
        trip,
        odometer_photo: req.odometer_photo.filter(|p| !p.is_empty()),
        cargo_photo: req.cargo_photo.filter(|p| !p.is_empty()),
    })
}

use crate::models::upload_dto::UploadRequest;
use crate::services::storage::{Storage, StorageDestination, StorageError};
use crate::services::validator::{self, ValidationError};
use crate::utils::io::{decode_image, DecodeError};
use axum::http::StatusCode;
use std::fmt;
use tracing::{error, info};

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Storage destination is not configured")]
    MissingDestination,
    #[error("Failed to decode {photo} photo: {source}")]
    Decode {
        photo: Photo,
        #[source]
        source: DecodeError,
    },
    #[error("Failed to upload {photo} photo: {source}")]
    Storage {
        photo: Photo,
        #[source]
        source: StorageError,
    },
}

impl UploadError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            UploadError::Validation(_) | UploadError::Decode { .. } => StatusCode::BAD_REQUEST,
            UploadError::MissingDestination | UploadError::Storage { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Photo slots in processing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Photo {
    Odometer,
    Cargo,
}

impl Photo {
    pub fn logical_name(&self, trip: &str) -> String {
        format!("{trip}_{self}.jpg")
    }
}

impl fmt::Display for Photo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Photo::Odometer => write!(f, "odometer"),
            Photo::Cargo => write!(f, "cargo"),
        }
    }
}

/// Validate `req`, decode every present photo, then store them in order
/// (odometer, cargo). Returns the backend identifiers in the same order.
///
/// A bad photo is rejected before anything is written. A storage failure
/// aborts the request, but photos stored before it are left in place.
pub async fn upload<T>(
    req: UploadRequest,
    storage: &T,
    destination: Option<&StorageDestination>,
) -> Result<Vec<String>, UploadError>
where
    T: Storage,
{
    let req = validator::validate(req)?;
    let destination = destination.ok_or(UploadError::MissingDestination)?;

    let mut staged = Vec::with_capacity(2);
    for (photo, data) in [
        (Photo::Odometer, &req.odometer_photo),
        (Photo::Cargo, &req.cargo_photo),
    ] {
        if let Some(data) = data {
            let bytes = decode_image(data).map_err(|source| UploadError::Decode { photo, source })?;
            staged.push((photo, bytes));
        }
    }

    let mut file_ids = Vec::with_capacity(staged.len());
    for (photo, bytes) in staged {
        let filename = photo.logical_name(&req.trip);
        let id = storage
            .store(&req.trip, &filename, bytes, destination)
            .await
            .map_err(|source| {
                error!("Failed to upload {photo} photo for {}: {source}", req.trip);
                UploadError::Storage { photo, source }
            })?;
        info!("Uploaded {filename} ({}) - ID: {id}", storage.kind());
        file_ids.push(id);
    }

    Ok(file_ids)
}

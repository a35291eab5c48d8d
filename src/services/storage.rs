pub mod drive;
pub mod local;

use axum::http::StatusCode;
use drive::DriveStorage;
use local::LocalStorage;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("Invalid storage name: {0}")]
    InvalidName(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("Unexpected status code: {0}: {1}")]
    UnexpectedStatus(StatusCode, String),
    #[error("Credentials error: {0}")]
    Credentials(String),
}

/// Where a backend puts artifacts: a root directory for the local backend,
/// a parent folder id for Drive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageDestination(String);

impl StorageDestination {
    pub fn new(value: impl Into<String>) -> StorageDestination {
        StorageDestination(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Destination for decoded photos, keyed by trip and logical file name.
pub trait Storage {
    /// Persist `data` as `logical_name` inside `scope` (the sanitized trip id)
    /// and return the backend identifier of the stored artifact.
    async fn store(
        &self,
        scope: &str,
        logical_name: &str,
        data: Vec<u8>,
        destination: &StorageDestination,
    ) -> Result<String, StorageError>;

    async fn fetch(&self, identifier: &str) -> Result<Vec<u8>, StorageError>;

    fn kind(&self) -> &'static str;
}

/// The single backend selected at startup.
pub enum StorageBackend {
    Local(LocalStorage),
    Drive(DriveStorage),
    Unavailable { reason: String },
}

impl StorageBackend {
    pub fn is_available(&self) -> bool {
        !matches!(self, StorageBackend::Unavailable { .. })
    }
}

impl Storage for StorageBackend {
    async fn store(
        &self,
        scope: &str,
        logical_name: &str,
        data: Vec<u8>,
        destination: &StorageDestination,
    ) -> Result<String, StorageError> {
        match self {
            StorageBackend::Local(s) => s.store(scope, logical_name, data, destination).await,
            StorageBackend::Drive(s) => s.store(scope, logical_name, data, destination).await,
            StorageBackend::Unavailable { reason } => Err(StorageError::Unavailable(reason.clone())),
        }
    }

    async fn fetch(&self, identifier: &str) -> Result<Vec<u8>, StorageError> {
        match self {
            StorageBackend::Local(s) => s.fetch(identifier).await,
            StorageBackend::Drive(s) => s.fetch(identifier).await,
            StorageBackend::Unavailable { reason } => Err(StorageError::Unavailable(reason.clone())),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            StorageBackend::Local(s) => s.kind(),
            StorageBackend::Drive(s) => s.kind(),
            StorageBackend::Unavailable { .. } => "unavailable",
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn test_unavailable_backend_rejects_store() {
        let backend = StorageBackend::Unavailable {
            reason: "missing credentials".to_string(),
        };
        let destination = StorageDestination::new("folder");

        let result = backend
            .store("T1", "T1_odometer.jpg", b"x".to_vec(), &destination)
            .await;
        assert!(matches!(result, Err(StorageError::Unavailable(r)) if r == "missing credentials"));

        let result = backend.fetch("anything").await;
        assert!(matches!(result, Err(StorageError::Unavailable(_))));

        assert!(!backend.is_available());
        assert_eq!(backend.kind(), "unavailable");
    }

    #[tokio::test]
    async fn test_local_variant_dispatches() {
        let tempdir = tempfile::tempdir().unwrap();
        let backend = StorageBackend::Local(LocalStorage);
        let destination = StorageDestination::new(tempdir.path().to_str().unwrap());

        let id = backend
            .store("T1", "T1_cargo.jpg", b"cargo".to_vec(), &destination)
            .await
            .unwrap();
        assert_eq!(backend.fetch(&id).await.unwrap(), b"cargo");
        assert!(backend.is_available());
        assert_eq!(backend.kind(), "local");
    }
}

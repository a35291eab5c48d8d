use crate::config::loader::{StorageConfig, StorageKind};
use crate::services::storage::drive::{DriveCredentials, DriveStorage, ServiceAccount};
use crate::services::storage::local::LocalStorage;
use crate::services::storage::{StorageBackend, StorageDestination, StorageError};
use tracing::{info, warn};

/// Build the configured backend once at startup. Failures are logged and
/// produce `StorageBackend::Unavailable` so the rest of the service keeps
/// running.
pub async fn init_storage(config: &StorageConfig) -> StorageBackend {
    match build_backend(config).await {
        Ok(backend) => {
            info!("{} storage backend initialized", backend_name(config.backend));
            backend
        }
        Err(e) => {
            warn!("Failed to initialize {} storage: {e}", backend_name(config.backend));
            warn!("Continuing without storage - token and health endpoints will still work");
            StorageBackend::Unavailable {
                reason: e.to_string(),
            }
        }
    }
}

pub fn destination(config: &StorageConfig) -> Option<StorageDestination> {
    match &config.destination {
        Some(d) => Some(StorageDestination::new(d.clone())),
        None => {
            warn!("no storage destination configured - uploads will fail");
            None
        }
    }
}

async fn build_backend(config: &StorageConfig) -> Result<StorageBackend, StorageError> {
    match config.backend {
        StorageKind::Local => {
            if let Some(root) = &config.destination {
                match tokio::fs::create_dir_all(root).await {
                    Ok(_) => info!("using uploads directory {root}"),
                    Err(e) => return Err(StorageError::Io(e)),
                }
            }
            Ok(StorageBackend::Local(LocalStorage))
        }
        StorageKind::Drive => {
            let credentials = match (&config.access_token, &config.credentials_path) {
                (Some(token), _) => DriveCredentials::AccessToken(token.clone()),
                (None, Some(path)) => {
                    DriveCredentials::ServiceAccount(ServiceAccount::from_file(path)?)
                }
                (None, None) => {
                    return Err(StorageError::Credentials(
                        "set GOOGLE_APPLICATION_CREDENTIALS or DRIVE_ACCESS_TOKEN".to_string(),
                    ))
                }
            };
            Ok(StorageBackend::Drive(DriveStorage::new(
                config.api_base_url.clone(),
                credentials,
            )))
        }
    }
}

fn backend_name(kind: StorageKind) -> &'static str {
    match kind {
        StorageKind::Local => "local",
        StorageKind::Drive => "drive",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::storage::Storage;
    use std::path::PathBuf;

    #[tokio::test]
    async fn test_init_local_creates_root() {
        let tempdir = tempfile::tempdir().unwrap();
        let root = tempdir.path().join("uploads");
        let config = StorageConfig {
            destination: Some(root.to_str().unwrap().to_string()),
            ..Default::default()
        };

        let backend = init_storage(&config).await;
        assert_eq!(backend.kind(), "local");
        assert!(root.is_dir());
    }

    #[tokio::test]
    async fn test_init_drive_without_credentials_is_unavailable() {
        let config = StorageConfig {
            backend: StorageKind::Drive,
            destination: Some("folder-1".to_string()),
            ..Default::default()
        };

        let backend = init_storage(&config).await;
        assert!(!backend.is_available());
    }

    #[tokio::test]
    async fn test_init_drive_unreadable_credentials_is_unavailable() {
        let config = StorageConfig {
            backend: StorageKind::Drive,
            credentials_path: Some(PathBuf::from("/nonexistent/credentials.json")),
            ..Default::default()
        };

        match init_storage(&config).await {
            StorageBackend::Unavailable { reason } => assert!(reason.contains("credentials")),
            other => panic!("expected unavailable backend, got {}", other.kind()),
        }
    }

    #[tokio::test]
    async fn test_init_drive_with_access_token() {
        let config = StorageConfig {
            backend: StorageKind::Drive,
            access_token: Some("token".to_string()),
            ..Default::default()
        };

        let backend = init_storage(&config).await;
        assert_eq!(backend.kind(), "drive");
    }

    #[test]
    fn test_destination() {
        let mut config = StorageConfig::default();
        assert!(destination(&config).is_none());

        config.destination = Some("folder-1".to_string());
        assert_eq!(
            destination(&config),
            Some(StorageDestination::new("folder-1"))
        );
    }
}

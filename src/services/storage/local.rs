use crate::services::storage::{Storage, StorageDestination, StorageError};
use std::io::ErrorKind;
use std::path::{Component, Path};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use uuid::Uuid;

//-------------------------
// local filesystem
//-------------------------
pub struct LocalStorage;

// to prevent directory traversal attacks we ensure the name consists of exactly one normal
// component
fn is_single_component(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

async fn write_synced(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(data).await?;
    file.sync_all().await
}

impl Storage for LocalStorage {
    async fn store(
        &self,
        scope: &str,
        logical_name: &str,
        data: Vec<u8>,
        destination: &StorageDestination,
    ) -> Result<String, StorageError> {
        for name in [scope, logical_name] {
            if !is_single_component(name) {
                return Err(StorageError::InvalidName(name.to_string()));
            }
        }

        let dir = Path::new(destination.as_str()).join(scope);
        fs::create_dir_all(&dir).await?;

        // Same name overwrites, there is no versioning. The new content is
        // staged next to the target so a failed write keeps the previous file.
        let path = dir.join(logical_name);
        let staging = dir.join(format!(".{logical_name}.{}.tmp", Uuid::new_v4().simple()));
        if let Err(e) = write_synced(&staging, &data).await {
            let _ = fs::remove_file(&staging).await;
            return Err(e.into());
        }
        if let Err(e) = fs::rename(&staging, &path).await {
            let _ = fs::remove_file(&staging).await;
            return Err(e.into());
        }

        debug!("wrote {} bytes to {}", data.len(), path.display());
        Ok(path.to_string_lossy().into_owned())
    }

    async fn fetch(&self, identifier: &str) -> Result<Vec<u8>, StorageError> {
        match fs::read(identifier).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StorageError::NotFound(identifier.to_string()))
            }
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    fn kind(&self) -> &'static str {
        "local"
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn destination(tempdir: &TempDir) -> StorageDestination {
        StorageDestination::new(tempdir.path().to_str().unwrap())
    }

    #[tokio::test]
    async fn test_store_creates_trip_directory() {
        let tempdir = TempDir::new().unwrap();

        let id = LocalStorage
            .store("T1", "T1_odometer.jpg", b"odometer".to_vec(), &destination(&tempdir))
            .await
            .unwrap();

        let expected = tempdir.path().join("T1").join("T1_odometer.jpg");
        assert_eq!(PathBuf::from(&id), expected);
        assert_eq!(std::fs::read(expected).unwrap(), b"odometer");
    }

    #[tokio::test]
    async fn test_store_overwrites_same_name() {
        let tempdir = TempDir::new().unwrap();
        let destination = destination(&tempdir);

        let first = LocalStorage
            .store("T1", "T1_cargo.jpg", b"first".to_vec(), &destination)
            .await
            .unwrap();
        let second = LocalStorage
            .store("T1", "T1_cargo.jpg", b"second".to_vec(), &destination)
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(LocalStorage.fetch(&second).await.unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_failed_overwrite_keeps_previous_file() {
        let tempdir = TempDir::new().unwrap();
        let destination = destination(&tempdir);

        let id = LocalStorage
            .store("T1", "T1_cargo.jpg", b"good".to_vec(), &destination)
            .await
            .unwrap();

        // A directory squatting on the target makes the final rename fail
        std::fs::remove_file(&id).unwrap();
        std::fs::create_dir(&id).unwrap();
        std::fs::write(PathBuf::from(&id).join("keep"), b"good").unwrap();

        let result = LocalStorage
            .store("T1", "T1_cargo.jpg", b"bad".to_vec(), &destination)
            .await;
        assert!(matches!(result, Err(StorageError::Io(_))));
        assert_eq!(
            std::fs::read(PathBuf::from(&id).join("keep")).unwrap(),
            b"good"
        );

        // No staging files are left behind
        let leftovers: Vec<_> = std::fs::read_dir(tempdir.path().join("T1"))
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .filter(|n| n.to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn test_store_leaves_only_target() {
        let tempdir = TempDir::new().unwrap();
        let destination = destination(&tempdir);

        for data in [b"first".to_vec(), b"second".to_vec()] {
            LocalStorage
                .store("T1", "T1_odometer.jpg", data, &destination)
                .await
                .unwrap();
        }

        let names: Vec<_> = std::fs::read_dir(tempdir.path().join("T1"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["T1_odometer.jpg"]);
    }

    #[tokio::test]
    async fn test_store_rejects_traversal() {
        let tempdir = TempDir::new().unwrap();
        let destination = destination(&tempdir);

        for (scope, name) in [
            ("..", "x.jpg"),
            ("T1", "../x.jpg"),
            ("a/b", "x.jpg"),
            ("/etc", "x.jpg"),
            ("", "x.jpg"),
        ] {
            let result = LocalStorage
                .store(scope, name, b"x".to_vec(), &destination)
                .await;
            assert!(matches!(result, Err(StorageError::InvalidName(_))));
        }
    }

    #[tokio::test]
    async fn test_fetch_missing() {
        let tempdir = TempDir::new().unwrap();
        let missing = tempdir.path().join("nope.jpg");

        let result = LocalStorage.fetch(missing.to_str().unwrap()).await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_is_single_component() {
        assert!(is_single_component("T1"));
        assert!(is_single_component("T1_odometer.jpg"));
        assert!(!is_single_component("../T1"));
        assert!(!is_single_component("T1/x"));
        assert!(!is_single_component(""));
    }
}

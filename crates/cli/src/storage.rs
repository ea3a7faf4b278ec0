//! Session file for the CLI.
//!
//! A small JSON object holding the same two keys the web front end keeps in
//! its server-side session. Written with mode `0600` on Unix.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use agency_core::User;
use agency_web::session::{StorageError, TokenStorage, keys};
use serde_json::{Map, Value};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

/// Token storage backed by a JSON file.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location: `$HOME/.agency/session.json`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".agency").join("session.json"))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<Map<String, Value>, StorageError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, contents: &Map<String, Value>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(contents)?;

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);
        let mut file = options.open(&self.path).await?;

        // A file left over from an older run keeps its mode on open.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))
                .await?;
        }

        file.write_all(&bytes).await?;
        file.flush().await?;
        Ok(())
    }
}

impl TokenStorage for FileStorage {
    async fn load_token(&self) -> Result<Option<String>, StorageError> {
        let contents = self.read().await?;
        Ok(contents
            .get(keys::TOKEN)
            .and_then(Value::as_str)
            .map(str::to_owned))
    }

    async fn load_user(&self) -> Result<Option<User>, StorageError> {
        let mut contents = self.read().await?;
        match contents.remove(keys::USER) {
            Some(Value::Null) | None => Ok(None),
            Some(user) => Ok(Some(serde_json::from_value(user)?)),
        }
    }

    async fn save(&self, token: &str, user: &User) -> Result<(), StorageError> {
        let mut contents = self.read().await.unwrap_or_default();
        contents.insert(keys::TOKEN.to_owned(), Value::String(token.to_owned()));
        contents.insert(keys::USER.to_owned(), serde_json::to_value(user)?);
        self.write(&contents).await
    }

    async fn clear(&self) -> Result<(), StorageError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use agency_core::{Role, UserId};

    use super::*;

    fn user() -> User {
        User {
            id: UserId::new(1),
            username: "admin".to_string(),
            role: Role::Admin,
        }
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("session.json"));

        assert_eq!(storage.load_token().await.unwrap(), None);
        assert_eq!(storage.load_user().await.unwrap(), None);
        storage.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_save_load_clear() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");
        let storage = FileStorage::new(&path);

        storage.save("T", &user()).await.unwrap();

        let raw: Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(raw["admin_token"], "T");
        assert_eq!(raw["admin_user"]["username"], "admin");

        assert_eq!(storage.load_token().await.unwrap().as_deref(), Some("T"));
        assert_eq!(storage.load_user().await.unwrap(), Some(user()));

        storage.clear().await.unwrap();
        assert!(!path.exists());
        assert_eq!(storage.load_token().await.unwrap(), None);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        FileStorage::new(&path).save("T", &user()).await.unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_existing_file_is_made_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, b"{\"admin_token\": \"old\", \"extra\": 1}").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        let storage = FileStorage::new(&path);
        storage.save("T", &user()).await.unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(storage.load_token().await.unwrap().as_deref(), Some("T"));
        let raw: Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(raw["extra"], 1);
    }
}

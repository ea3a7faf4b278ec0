//! Durable client storage for the bearer token and the signed-in user.
//!
//! Two fixed keys are persisted: [`keys::TOKEN`] and [`keys::USER`]. The web
//! front end keeps them in the visitor's server-side session; the CLI keeps
//! them in a JSON file; tests use [`MemoryStorage`].

use std::future::Future;
use std::sync::Arc;

use agency_core::User;
use thiserror::Error;
use tokio::sync::Mutex;
use tower_sessions::Session;

/// Storage keys.
pub mod keys {
    /// Key for the opaque bearer token.
    pub const TOKEN: &str = "admin_token";

    /// Key for the serialized user object.
    pub const USER: &str = "admin_user";

    /// Key for a one-shot message shown on the next login page render.
    pub const FLASH_ERROR: &str = "auth_error";

    /// Key for a one-shot banner shown on the next dashboard render.
    pub const FLASH_DASHBOARD: &str = "dashboard_error";
}

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The web session could not be read or written.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// A storage file could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Durable storage for the credentials of one client.
pub trait TokenStorage: Send + Sync {
    /// Read the persisted token, if any.
    fn load_token(&self) -> impl Future<Output = Result<Option<String>, StorageError>> + Send;

    /// Read the persisted user, if any.
    fn load_user(&self) -> impl Future<Output = Result<Option<User>, StorageError>> + Send;

    /// Persist a token together with the user it belongs to.
    fn save(
        &self,
        token: &str,
        user: &User,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Remove the persisted token and user.
    fn clear(&self) -> impl Future<Output = Result<(), StorageError>> + Send;
}

impl TokenStorage for Session {
    async fn load_token(&self) -> Result<Option<String>, StorageError> {
        Ok(self.get::<String>(keys::TOKEN).await?)
    }

    async fn load_user(&self) -> Result<Option<User>, StorageError> {
        Ok(self.get::<User>(keys::USER).await?)
    }

    async fn save(&self, token: &str, user: &User) -> Result<(), StorageError> {
        self.insert(keys::TOKEN, token).await?;
        self.insert(keys::USER, user).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.remove::<String>(keys::TOKEN).await?;
        self.remove::<User>(keys::USER).await?;
        Ok(())
    }
}

/// In-memory storage, shared between clones.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<Mutex<StoredCredentials>>,
}

#[derive(Debug, Default)]
struct StoredCredentials {
    token: Option<String>,
    user: Option<User>,
}

impl MemoryStorage {
    /// Create storage that already holds a token (and optionally a user).
    #[must_use]
    pub fn with_token(token: impl Into<String>, user: Option<User>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(StoredCredentials {
                token: Some(token.into()),
                user,
            })),
        }
    }
}

impl TokenStorage for MemoryStorage {
    async fn load_token(&self) -> Result<Option<String>, StorageError> {
        Ok(self.inner.lock().await.token.clone())
    }

    async fn load_user(&self) -> Result<Option<User>, StorageError> {
        Ok(self.inner.lock().await.user.clone())
    }

    async fn save(&self, token: &str, user: &User) -> Result<(), StorageError> {
        let mut stored = self.inner.lock().await;
        stored.token = Some(token.to_owned());
        stored.user = Some(user.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        let mut stored = self.inner.lock().await;
        stored.token = None;
        stored.user = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use agency_core::{Role, UserId};

    use super::*;

    #[tokio::test]
    async fn test_memory_storage_save_and_clear() {
        let storage = MemoryStorage::default();
        assert_eq!(storage.load_token().await.unwrap(), None);

        let user = User {
            id: UserId::new(1),
            username: "admin".to_string(),
            role: Role::Admin,
        };
        storage.save("T", &user).await.unwrap();

        let clone = storage.clone();
        assert_eq!(clone.load_token().await.unwrap().as_deref(), Some("T"));
        assert_eq!(clone.load_user().await.unwrap(), Some(user));

        clone.clear().await.unwrap();
        assert_eq!(storage.load_token().await.unwrap(), None);
        assert_eq!(storage.load_user().await.unwrap(), None);
    }
}

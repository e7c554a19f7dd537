//! Secret service implementation.
//!
//! Loads secret.json once and caches it for the rest of the process.

use crate::paths::EmpathPaths;
use crate::storage::{SecretStorage, SecretStorageError};
use empath_core::config::SecretConfig;
use empath_core::error::{EmpathError, Result};
use empath_core::secret::SecretService;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Service for managing secret configuration.
///
/// # Example
///
/// ```ignore
/// use empath_infrastructure::SecretServiceImpl;
/// use empath_core::secret::SecretService;
///
/// let service = SecretServiceImpl::new(&EmpathPaths::default())?;
/// let secrets = service.load_secrets().await?;
/// ```
#[derive(Clone)]
pub struct SecretServiceImpl {
    /// Cached secret config loaded from storage.
    secrets: Arc<RwLock<Option<SecretConfig>>>,
    storage: Arc<SecretStorage>,
}

impl SecretServiceImpl {
    /// Creates a service reading `secret.json` under `paths`.
    pub fn new(paths: &EmpathPaths) -> Result<Self> {
        let path = paths
            .secret_file()
            .map_err(|e| EmpathError::config(format!("Failed to get secret path: {e}")))?;

        Ok(Self {
            secrets: Arc::new(RwLock::new(None)),
            storage: Arc::new(SecretStorage::new(path)),
        })
    }

    async fn load_secrets_internal(&self) -> Result<SecretConfig> {
        if let Some(cached) = self.secrets.read().await.as_ref() {
            return Ok(cached.clone());
        }

        let loaded = self.storage.load().map_err(|e| match e {
            SecretStorageError::NotFound(path) => EmpathError::config(format!(
                "Secret file not found. Add your Gemini API key to {}",
                path.display()
            )),
            other => EmpathError::config(format!("Failed to load secret.json: {other}")),
        })?;

        *self.secrets.write().await = Some(loaded.clone());
        tracing::debug!("Loaded secrets from {}", self.storage.path().display());

        Ok(loaded)
    }
}

#[async_trait::async_trait]
impl SecretService for SecretServiceImpl {
    async fn load_secrets(&self) -> Result<SecretConfig> {
        self.load_secrets_internal().await
    }

    async fn secret_file_exists(&self) -> bool {
        self.storage.path().exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_secret_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let service = SecretServiceImpl::new(&EmpathPaths::new(Some(temp_dir.path()))).unwrap();

        assert!(!service.secret_file_exists().await);
        let err = service.load_secrets().await.unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("secret.json"));
    }

    #[tokio::test]
    async fn test_secrets_are_cached() {
        let temp_dir = TempDir::new().unwrap();
        let paths = EmpathPaths::new(Some(temp_dir.path()));
        let secret_path = paths.secret_file().unwrap();
        std::fs::write(&secret_path, r#"{"gemini":{"api_key":"first"}}"#).unwrap();

        let service = SecretServiceImpl::new(&paths).unwrap();
        assert!(service.secret_file_exists().await);
        let first = service.load_secrets().await.unwrap();

        std::fs::write(&secret_path, r#"{"gemini":{"api_key":"second"}}"#).unwrap();
        let second = service.load_secrets().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(second.gemini.unwrap().api_key, "first");
    }
}

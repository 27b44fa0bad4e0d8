use std::path::{Path, PathBuf};

use errors::{AuthError, AuthErrorCode};
use jt_core::Principal;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// What survives a restart: who is signed in and how to get a new token.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredSession {
    pub principal: Principal,
    pub refresh_token: String,
}

impl std::fmt::Debug for StoredSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredSession")
            .field("principal", &self.principal)
            .field("refresh_token", &"***")
            .finish()
    }
}

/// JSON file holding the persisted session.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when nothing has been persisted yet.
    pub async fn load(&self) -> Result<Option<StoredSession>, AuthError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(store_error("read", &self.path).with_cause(e)),
        };

        let session = serde_json::from_str(&contents)
            .map_err(|e| store_error("parse", &self.path).with_cause(e))?;
        Ok(Some(session))
    }

    /// Write via a temporary file and rename. On Unix the temporary file is
    /// created owner-only, so the token is never readable by others.
    pub async fn save(&self, session: &StoredSession) -> Result<(), AuthError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| store_error("create directory for", &self.path).with_cause(e))?;
        }

        let json = serde_json::to_vec_pretty(session)
            .map_err(|e| store_error("encode", &self.path).with_cause(e))?;
        let tmp = self.path.with_extension("json.tmp");

        // A leftover temp file would keep its old permissions.
        match tokio::fs::remove_file(&tmp).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(store_error("remove stale", &tmp).with_cause(e)),
        }

        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options
            .open(&tmp)
            .await
            .map_err(|e| store_error("create", &tmp).with_cause(e))?;
        file.write_all(&json)
            .await
            .map_err(|e| store_error("write", &tmp).with_cause(e))?;
        file.sync_all()
            .await
            .map_err(|e| store_error("flush", &tmp).with_cause(e))?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| store_error("replace", &self.path).with_cause(e))?;

        debug!(path = %self.path.display(), "Session persisted");
        Ok(())
    }

    pub async fn clear(&self) -> Result<(), AuthError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(store_error("remove", &self.path).with_cause(e)),
        }
    }
}

fn store_error(operation: &str, path: &Path) -> AuthError {
    AuthError::new(
        AuthErrorCode::Internal,
        format!("Failed to {} session file {}", operation, path.display()),
    )
}

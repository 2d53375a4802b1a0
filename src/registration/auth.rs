//! Session token storage
//! The token is issued by the login flow; this client only reads and clears it.

use crate::registration::error::ClientError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::info;

/// Opaque bearer credential. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Returns `None` for an empty or blank token.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            None
        } else {
            Some(Self(token))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionToken(***)")
    }
}

pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<SessionToken>, ClientError>;
    fn save(&self, token: &SessionToken) -> Result<(), ClientError>;
    fn clear(&self) -> Result<(), ClientError>;
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredSession {
    token: String,
    saved_at: DateTime<Utc>,
}

/// Token kept as JSON in a file, e.g. `data/session.json`.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<SessionToken>, ClientError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let stored: StoredSession = serde_json::from_str(&content)?;
        Ok(SessionToken::new(stored.token))
    }

    fn save(&self, token: &SessionToken) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let stored = StoredSession {
            token: token.expose().to_string(),
            saved_at: Utc::now(),
        };
        let json = serde_json::to_string_pretty(&stored)?;
        std::fs::write(&self.path, json)?;

        info!("Saved session token to {}", self.path.display());
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                info!("Removed session file {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<SessionToken>>,
}

impl MemoryTokenStore {
    pub fn with_token(token: SessionToken) -> Self {
        Self {
            token: Mutex::new(Some(token)),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<SessionToken>, ClientError> {
        let slot = self.token.lock().unwrap_or_else(|p| p.into_inner());
        Ok(slot.clone())
    }

    fn save(&self, token: &SessionToken) -> Result<(), ClientError> {
        let mut slot = self.token.lock().unwrap_or_else(|p| p.into_inner());
        *slot = Some(token.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        let mut slot = self.token.lock().unwrap_or_else(|p| p.into_inner());
        *slot = None;
        Ok(())
    }
}

/// Session context handed to the components that need the credential.
pub struct Session {
    store: Box<dyn TokenStore>,
}

impl Session {
    pub fn new(store: impl TokenStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self::new(FileTokenStore::new(path))
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryTokenStore::default())
    }

    pub fn token(&self) -> Result<Option<SessionToken>, ClientError> {
        self.store.load()
    }

    pub fn sign_in(&self, token: SessionToken) -> Result<(), ClientError> {
        self.store.save(&token)
    }

    pub fn sign_out(&self) -> Result<(), ClientError> {
        self.store.clear()
    }

    pub fn is_signed_in(&self) -> bool {
        matches!(self.token(), Ok(Some(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_token_is_no_token() {
        assert!(SessionToken::new("").is_none());
        assert!(SessionToken::new("  ").is_none());
        let token = SessionToken::new("abc.def").unwrap();
        assert_eq!(format!("{:?}", token), "SessionToken(***)");
    }

    #[test]
    fn test_file_store_round_trip_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::from_file(dir.path().join("nested/session.json"));

        assert!(!session.is_signed_in());
        session.sign_in(SessionToken::new("jwt-123").unwrap()).unwrap();
        assert_eq!(session.token().unwrap().unwrap().expose(), "jwt-123");

        session.sign_out().unwrap();
        assert!(session.token().unwrap().is_none());
        // clearing twice is fine
        session.sign_out().unwrap();
    }

    #[test]
    fn test_file_store_treats_empty_token_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, r#"{"token": "", "saved_at": "2024-01-01T00:00:00Z"}"#).unwrap();

        let store = FileTokenStore::new(&path);
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_corrupt_session_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();

        let err = FileTokenStore::new(&path).load().unwrap_err();
        assert!(matches!(err, ClientError::ParseError(_)));
    }
}

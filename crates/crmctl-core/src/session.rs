// ── Persisted login session ──
//
// The token and signed-in user survive between invocations. Stores are
// swappable so tests can run without touching disk.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crmctl_api::AuthUser;

use crate::error::CoreError;

/// The signed-in user, as much as the console needs of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_id: Option<String>,
    #[serde(default, rename = "roleName", skip_serializing_if = "Option::is_none")]
    pub role_name: Option<String>,
}

impl SessionUser {
    pub fn display_name(&self) -> &str {
        self.username
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.id)
    }
}

impl From<AuthUser> for SessionUser {
    fn from(user: AuthUser) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            role_id: user.role_id,
            role_name: user.role_name,
        }
    }
}

/// Bearer token plus the user it belongs to.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: SecretString,
    pub user: SessionUser,
}

/// On-disk shape: `{"token": "...", "user": {...}}`.
#[derive(Serialize, Deserialize)]
struct StoredSession {
    token: String,
    user: SessionUser,
}

impl From<StoredSession> for Session {
    fn from(stored: StoredSession) -> Self {
        Self {
            token: SecretString::from(stored.token),
            user: stored.user,
        }
    }
}

impl From<&Session> for StoredSession {
    fn from(session: &Session) -> Self {
        Self {
            token: session.token.expose_secret().to_owned(),
            user: session.user.clone(),
        }
    }
}

/// Where the session lives between runs.
pub trait SessionStore: Send + Sync {
    /// The saved session, if any. An unreadable record counts as none.
    fn load(&self) -> Result<Option<Session>, CoreError>;

    fn save(&self, session: &Session) -> Result<(), CoreError>;

    fn clear(&self) -> Result<(), CoreError>;
}

// ── File store ───────────────────────────────────────────────────────

/// JSON file store, readable only by the owner on unix.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn io_error(path: &Path, err: &std::io::Error) -> CoreError {
    CoreError::Session {
        message: format!("{}: {err}", path.display()),
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<Session>, CoreError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(&self.path, &e)),
        };
        match serde_json::from_str::<StoredSession>(&raw) {
            Ok(stored) => {
                debug!(path = %self.path.display(), "session restored");
                Ok(Some(stored.into()))
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring unreadable session file");
                Ok(None)
            }
        }
    }

    fn save(&self, session: &Session) -> Result<(), CoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| io_error(parent, &e))?;
        }
        let json = serde_json::to_string_pretty(&StoredSession::from(session))
            .map_err(|e| CoreError::decode(&e))?;
        std::fs::write(&self.path, json).map_err(|e| io_error(&self.path, &e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))
                .map_err(|e| io_error(&self.path, &e))?;
        }
        debug!(path = %self.path.display(), "session saved");
        Ok(())
    }

    fn clear(&self) -> Result<(), CoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(&self.path, &e)),
        }
    }
}

// ── In-memory store ──────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    slot: Mutex<Option<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            slot: Mutex::new(Some(session)),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<Session>> {
        self.slot
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<Session>, CoreError> {
        Ok(self.slot().clone())
    }

    fn save(&self, session: &Session) -> Result<(), CoreError> {
        *self.slot() = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), CoreError> {
        *self.slot() = None;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn session() -> Session {
        Session {
            token: SecretString::from("tok-123".to_owned()),
            user: SessionUser {
                id: "u1".into(),
                email: Some("ann@example.com".into()),
                username: Some("ann".into()),
                role_id: Some("r1".into()),
                role_name: Some("Sales".into()),
            },
        }
    }

    #[test]
    fn file_store_round_trips_the_persisted_shape() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("nested").join("session.json"));

        assert!(store.load().unwrap().is_none());
        store.save(&session()).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(raw["token"], "tok-123");
        assert_eq!(raw["user"]["roleName"], "Sales");

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.token.expose_secret(), "tok-123");
        assert_eq!(loaded.user, session().user);

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
        store.clear().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn session_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.json"));
        store.save(&session()).unwrap();
        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn corrupt_file_is_treated_as_signed_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(FileSessionStore::new(path).load().unwrap().is_none());
    }

    #[test]
    fn memory_store_holds_one_session() {
        let store = MemorySessionStore::new();
        store.save(&session()).unwrap();
        assert_eq!(store.load().unwrap().unwrap().user.id, "u1");
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }
}

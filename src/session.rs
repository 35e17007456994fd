//! Session persistence
//!
//! All sessions live in a single namespaced JSON record behind a pluggable
//! [`StorageBackend`]. Reads degrade to an empty list on missing or corrupt
//! records and writes are best-effort: the in-memory session stays
//! authoritative, persistence failures are logged and never surface to the
//! conversation.

mod schema;

pub use schema::{ChatSession, Message, Role};

use chrono::Utc;
use rand::Rng;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// File name of the session record, matching the browser-storage key
pub const DEFAULT_STORE_FILE: &str = "leaf-whisper-sessions.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Corrupt session record: {0}")]
    Corrupt(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Raw storage for the serialized session record
pub trait StorageBackend: Send + Sync {
    /// Read the whole record, `None` when nothing was stored yet
    fn load(&self) -> StoreResult<Option<String>>;

    /// Replace the whole record
    fn store(&self, payload: &str) -> StoreResult<()>;

    /// Remove the record entirely
    fn clear(&self) -> StoreResult<()>;
}

/// Backend that keeps the record in a file on disk
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Place the record under the given directory with the default file name
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(DEFAULT_STORE_FILE))
    }
}

impl StorageBackend for FileBackend {
    fn load(&self) -> StoreResult<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(payload) => Ok(Some(payload)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn store(&self, payload: &str) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, payload)?;
        Ok(())
    }

    fn clear(&self) -> StoreResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Backend that keeps the record in memory, for tests and demos
#[derive(Default)]
pub struct MemoryBackend {
    record: Mutex<Option<String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryBackend {
    fn load(&self) -> StoreResult<Option<String>> {
        Ok(self.record.lock().unwrap().clone())
    }

    fn store(&self, payload: &str) -> StoreResult<()> {
        *self.record.lock().unwrap() = Some(payload.to_string());
        Ok(())
    }

    fn clear(&self) -> StoreResult<()> {
        *self.record.lock().unwrap() = None;
        Ok(())
    }
}

/// Typed access to the stored session list
#[derive(Clone)]
pub struct SessionStore {
    backend: Arc<dyn StorageBackend>,
}

impl SessionStore {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// Open a store backed by the given file path
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self::new(Arc::new(FileBackend::new(path.as_ref())))
    }

    pub fn open_in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    // ==================== Session Operations ====================

    /// List all stored sessions, oldest first
    pub fn list_sessions(&self) -> Vec<ChatSession> {
        match self.read_all() {
            Ok(sessions) => sessions,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read session record, starting empty");
                Vec::new()
            }
        }
    }

    /// Fetch one session by id
    pub fn get_session(&self, session_id: &str) -> Option<ChatSession> {
        self.list_sessions()
            .into_iter()
            .find(|session| session.id == session_id)
    }

    /// Insert or replace a session, stamping its `updated_at`
    pub fn save_session(&self, session: &mut ChatSession) {
        session.updated_at = Utc::now();

        let mut sessions = self.list_sessions();
        if let Some(slot) = sessions.iter_mut().find(|s| s.id == session.id) {
            *slot = session.clone();
        } else {
            sessions.push(session.clone());
        }

        if let Err(e) = self.write_all(&sessions) {
            tracing::error!(error = %e, session_id = %session.id, "Failed to persist sessions");
        }
    }

    /// Append a message to a stored session
    pub fn add_message(&self, session_id: &str, message: Message) {
        if let Some(mut session) = self.get_session(session_id) {
            session.messages.push(message);
            self.save_session(&mut session);
        } else {
            tracing::warn!(session_id = %session_id, "Cannot append message, session not stored");
        }
    }

    /// Replace a stored message in place, matched by id
    pub fn update_message(&self, session_id: &str, message: &Message) {
        if let Some(mut session) = self.get_session(session_id) {
            if let Some(slot) = session.messages.iter_mut().find(|m| m.id == message.id) {
                *slot = message.clone();
                self.save_session(&mut session);
            } else {
                tracing::warn!(
                    session_id = %session_id,
                    message_id = %message.id,
                    "Cannot update message, id not found"
                );
            }
        } else {
            tracing::warn!(session_id = %session_id, "Cannot update message, session not stored");
        }
    }

    /// Drop the whole record
    pub fn clear_all(&self) {
        if let Err(e) = self.backend.clear() {
            tracing::error!(error = %e, "Failed to clear session record");
        }
    }

    fn read_all(&self) -> StoreResult<Vec<ChatSession>> {
        match self.backend.load()? {
            Some(payload) => Ok(serde_json::from_str(&payload)?),
            None => Ok(Vec::new()),
        }
    }

    fn write_all(&self, sessions: &[ChatSession]) -> StoreResult<()> {
        let payload = serde_json::to_string(sessions)?;
        self.backend.store(&payload)
    }
}

// ==================== Id Generation ====================

/// Generate a session or message id from the current time plus random bits
pub fn generate_id() -> String {
    let millis = Utc::now().timestamp_millis().unsigned_abs();
    let noise = rand::thread_rng().gen::<u64>();
    format!("{}{}", to_base36(millis), to_base36(noise))
}

#[allow(clippy::cast_possible_truncation)] // value % 36 always fits
fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    if value == 0 {
        return "0".to_string();
    }

    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

// ==================== Session Manager ====================

/// Decides which session the conversation operates on
#[derive(Clone)]
pub struct SessionManager {
    store: SessionStore,
}

impl SessionManager {
    pub fn new(store: SessionStore) -> Self {
        Self { store }
    }

    /// Create and persist a fresh empty session
    pub fn create_session(&self) -> ChatSession {
        let mut session = ChatSession::new(generate_id());
        self.store.save_session(&mut session);
        tracing::debug!(session_id = %session.id, "Created session");
        session
    }

    /// Return the most recently updated session, creating one when none exist
    pub fn current_session(&self) -> ChatSession {
        let mut sessions = self.store.list_sessions();
        sessions.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

        match sessions.into_iter().next() {
            Some(session) => session,
            None => self.create_session(),
        }
    }
}

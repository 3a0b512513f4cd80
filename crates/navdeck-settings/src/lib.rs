#![forbid(unsafe_code)]

//! Scoped key/value settings persistence for NavDeck.
//!
//! The host application exposes two persistence partitions: `world` settings
//! are shared by every connected session, `client` settings belong to a single
//! session. This crate models that split as a [`Scope`] and provides the
//! [`SettingsStore`] backend trait plus the typed [`Settings`] handle the rest
//! of NavDeck consumes.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        Settings                               │
//! │   - Cheap-clone typed handle (serde in/out)                   │
//! │   - No caching: every read goes to the backend                │
//! └──────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      SettingsStore                            │
//! │   - MemoryStore: in-memory (testing, ephemeral sessions)      │
//! │   - FileStore: JSON per scope (requires file-store)           │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Design Invariants
//!
//! 1. **No caching**: the handle never retains values between calls, so a
//!    concurrent writer (another session editing world settings) is always
//!    observed on the next read.
//! 2. **Atomic writes**: file storage uses the write-then-rename pattern; a
//!    crashed write never leaves a truncated document behind.
//! 3. **Graceful degradation**: storage failures never panic; every operation
//!    returns `Result`.
//! 4. **Scope isolation**: a key set in one scope is invisible in the other.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | `StoreError::Io` | File I/O failure | Returns error, nothing written |
//! | `StoreError::Serialization` | JSON encode/decode | Returns error with key context |
//! | `StoreError::Corruption` | Poisoned lock, bad document | Returns error |
//! | Format version mismatch | Older/newer file on disk | Stored document ignored, logged |
//! | Missing key | First run | `Ok(None)` |

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

// ─────────────────────────────────────────────────────────────────────────────
// Scope
// ─────────────────────────────────────────────────────────────────────────────

/// Persistence partition a setting lives in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Shared, durable state visible to every session.
    World,
    /// Per-session state local to this client.
    Client,
}

impl Scope {
    /// Stable name used in storage paths and logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Scope::World => "world",
            Scope::Client => "client",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Error Types
// ─────────────────────────────────────────────────────────────────────────────

/// Errors that can occur during settings storage operations.
#[derive(Debug)]
pub enum StoreError {
    /// I/O error during file operations.
    Io(std::io::Error),
    /// Serialization or deserialization error.
    Serialization(String),
    /// Storage state is corrupted (poisoned lock, invalid document).
    Corruption(String),
    /// Backend is not available (e.g., file storage without a writable dir).
    Unavailable(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "I/O error: {e}"),
            StoreError::Serialization(msg) => write!(f, "serialization error: {msg}"),
            StoreError::Corruption(msg) => write!(f, "storage corruption: {msg}"),
            StoreError::Unavailable(msg) => write!(f, "storage unavailable: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e)
    }
}

/// Result type for settings storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

// ─────────────────────────────────────────────────────────────────────────────
// Storage Backend Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Trait for pluggable settings storage backends.
///
/// Implementations must be thread-safe (`Send + Sync`). Values cross the
/// boundary as raw [`Value`]s; typing happens in the [`Settings`] handle.
///
/// # Implementation Notes
///
/// - `get` must return `Ok(None)` for unknown keys, not an error.
/// - `set` must replace any existing value for the `(scope, key)` pair.
/// - Writes should be atomic per call (write-then-rename for files).
pub trait SettingsStore: Send + Sync {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// Read the value stored under `(scope, key)`, if any.
    fn get(&self, scope: Scope, key: &str) -> StoreResult<Option<Value>>;

    /// Store `value` under `(scope, key)`, replacing any previous value.
    fn set(&self, scope: Scope, key: &str, value: Value) -> StoreResult<()>;

    /// Remove the value stored under `(scope, key)`, if any.
    fn remove(&self, scope: Scope, key: &str) -> StoreResult<()>;

    /// Check if the backend is available and functional.
    fn is_available(&self) -> bool {
        true
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Memory Store (always available)
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory settings backend for testing and ephemeral sessions.
///
/// State is lost when the process exits.
#[derive(Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<(Scope, String), Value>>,
}

impl MemoryStore {
    /// Create a new empty memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemoryStore {
    fn name(&self) -> &str {
        "MemoryStore"
    }

    fn get(&self, scope: Scope, key: &str) -> StoreResult<Option<Value>> {
        let guard = self
            .values
            .read()
            .map_err(|_| StoreError::Corruption("lock poisoned".into()))?;
        Ok(guard.get(&(scope, key.to_owned())).cloned())
    }

    fn set(&self, scope: Scope, key: &str, value: Value) -> StoreResult<()> {
        let mut guard = self
            .values
            .write()
            .map_err(|_| StoreError::Corruption("lock poisoned".into()))?;
        guard.insert((scope, key.to_owned()), value);
        Ok(())
    }

    fn remove(&self, scope: Scope, key: &str) -> StoreResult<()> {
        let mut guard = self
            .values
            .write()
            .map_err(|_| StoreError::Corruption("lock poisoned".into()))?;
        guard.remove(&(scope, key.to_owned()));
        Ok(())
    }
}

impl fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.values.read().map(|g| g.len()).unwrap_or(0);
        f.debug_struct("MemoryStore").field("values", &count).finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File Store (requires file-store feature)
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "file-store")]
mod file_store {
    use super::*;
    use serde::Deserialize;
    use std::fs::{self, File};
    use std::io::{BufReader, BufWriter, Write};
    use std::path::{Path, PathBuf};

    /// On-disk document holding one scope's settings (JSON).
    #[derive(Serialize, Deserialize)]
    struct ScopeFile {
        /// Format version for future migrations.
        format_version: u32,
        /// Map of setting key -> value.
        values: HashMap<String, Value>,
    }

    impl ScopeFile {
        const FORMAT_VERSION: u32 = 1;

        fn new() -> Self {
            Self {
                format_version: Self::FORMAT_VERSION,
                values: HashMap::new(),
            }
        }
    }

    /// File-based settings backend using one JSON document per scope.
    ///
    /// `world.json` holds shared settings, `client.json` the per-session ones.
    /// Each write rewrites the owning scope's document via the temp-file +
    /// rename pattern:
    ///
    /// 1. Write to `{path}.tmp`
    /// 2. Flush and sync
    /// 3. Rename `{path}.tmp` -> `{path}`
    pub struct FileStore {
        root: PathBuf,
    }

    impl FileStore {
        /// Create a file store rooted at the given directory.
        ///
        /// The directory does not need to exist; it is created on first save.
        #[must_use]
        pub fn new(root: impl AsRef<Path>) -> Self {
            Self {
                root: root.as_ref().to_path_buf(),
            }
        }

        /// Create a store at the default location for a host world.
        ///
        /// Uses `$XDG_STATE_HOME/navdeck/{host_id}/` on Linux, falling back
        /// to `~/.local/state`, then the current directory.
        #[must_use]
        pub fn default_for_host(host_id: &str) -> Self {
            let base = state_dir_or_fallback();
            Self {
                root: base.join("navdeck").join(host_id),
            }
        }

        fn scope_path(&self, scope: Scope) -> PathBuf {
            self.root.join(format!("{}.json", scope.as_str()))
        }

        fn temp_path(&self, scope: Scope) -> PathBuf {
            self.root.join(format!("{}.json.tmp", scope.as_str()))
        }

        fn load_doc(&self, scope: Scope) -> StoreResult<HashMap<String, Value>> {
            let path = self.scope_path(scope);
            if !path.exists() {
                // First run - no settings yet
                return Ok(HashMap::new());
            }

            let file = File::open(&path)?;
            let reader = BufReader::new(file);
            let doc: ScopeFile = serde_json::from_reader(reader).map_err(|e| {
                StoreError::Serialization(format!(
                    "failed to parse {} settings: {e}",
                    scope.as_str()
                ))
            })?;

            if doc.format_version != ScopeFile::FORMAT_VERSION {
                tracing::warn!(
                    scope = scope.as_str(),
                    stored = doc.format_version,
                    expected = ScopeFile::FORMAT_VERSION,
                    "settings format version mismatch, ignoring stored document"
                );
                return Ok(HashMap::new());
            }

            Ok(doc.values)
        }

        fn save_doc(&self, scope: Scope, values: HashMap<String, Value>) -> StoreResult<()> {
            fs::create_dir_all(&self.root)?;

            let mut doc = ScopeFile::new();
            doc.values = values;

            let tmp_path = self.temp_path(scope);
            {
                let file = File::create(&tmp_path)?;
                let mut writer = BufWriter::new(file);
                serde_json::to_writer_pretty(&mut writer, &doc).map_err(|e| {
                    StoreError::Serialization(format!(
                        "failed to serialize {} settings: {e}",
                        scope.as_str()
                    ))
                })?;
                writer.flush()?;
                writer.get_ref().sync_all()?;
            }
            fs::rename(&tmp_path, self.scope_path(scope))?;

            tracing::debug!(
                scope = scope.as_str(),
                root = %self.root.display(),
                "saved settings document"
            );
            Ok(())
        }
    }

    /// Get the state directory, falling back to the current dir if unavailable.
    fn state_dir_or_fallback() -> PathBuf {
        if let Ok(state_home) = std::env::var("XDG_STATE_HOME") {
            return PathBuf::from(state_home);
        }
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(".local").join("state");
        }
        PathBuf::from(".")
    }

    impl SettingsStore for FileStore {
        fn name(&self) -> &str {
            "FileStore"
        }

        fn get(&self, scope: Scope, key: &str) -> StoreResult<Option<Value>> {
            let mut doc = self.load_doc(scope)?;
            Ok(doc.remove(key))
        }

        fn set(&self, scope: Scope, key: &str, value: Value) -> StoreResult<()> {
            let mut doc = self.load_doc(scope)?;
            doc.insert(key.to_owned(), value);
            self.save_doc(scope, doc)
        }

        fn remove(&self, scope: Scope, key: &str) -> StoreResult<()> {
            let mut doc = self.load_doc(scope)?;
            if doc.remove(key).is_none() {
                return Ok(());
            }
            self.save_doc(scope, doc)
        }

        fn is_available(&self) -> bool {
            if fs::create_dir_all(&self.root).is_err() {
                return false;
            }
            let test_path = self.root.join(".navdeck_test_write");
            if fs::write(&test_path, b"test").is_ok() {
                let _ = fs::remove_file(&test_path);
                return true;
            }
            false
        }
    }

    impl fmt::Debug for FileStore {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("FileStore").field("root", &self.root).finish()
        }
    }
}

#[cfg(feature = "file-store")]
pub use file_store::FileStore;

// ─────────────────────────────────────────────────────────────────────────────
// Typed Handle
// ─────────────────────────────────────────────────────────────────────────────

/// Cheap-clone typed handle over a [`SettingsStore`] backend.
///
/// All NavDeck components hold a `Settings` and go through it for every
/// read and write. The handle performs serde conversion at the boundary and
/// never caches values, so external writers are tolerated.
#[derive(Clone)]
pub struct Settings {
    backend: Arc<dyn SettingsStore>,
}

impl Settings {
    /// Wrap a storage backend.
    #[must_use]
    pub fn new(backend: Arc<dyn SettingsStore>) -> Self {
        Self { backend }
    }

    /// Create a handle over an ephemeral in-memory backend.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Read and deserialize the value stored under `(scope, key)`.
    ///
    /// Returns `Ok(None)` when the key has never been set.
    pub fn get<T: DeserializeOwned>(&self, scope: Scope, key: &str) -> StoreResult<Option<T>> {
        match self.backend.get(scope, key)? {
            None => Ok(None),
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| StoreError::Serialization(format!("setting `{scope}/{key}`: {e}"))),
        }
    }

    /// Serialize and store `value` under `(scope, key)`.
    pub fn set<T: Serialize + ?Sized>(
        &self,
        scope: Scope,
        key: &str,
        value: &T,
    ) -> StoreResult<()> {
        let value = serde_json::to_value(value)
            .map_err(|e| StoreError::Serialization(format!("setting `{scope}/{key}`: {e}")))?;
        self.backend.set(scope, key, value)
    }

    /// Remove the value stored under `(scope, key)`, if any.
    pub fn remove(&self, scope: Scope, key: &str) -> StoreResult<()> {
        self.backend.remove(scope, key)
    }

    /// Get the backend name for logging.
    #[must_use]
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Check if the storage backend is available.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.backend.is_available()
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("backend", &self.backend.name())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn memory_store_basic_operations() {
        let store = MemoryStore::new();

        assert!(store.get(Scope::World, "missing").unwrap().is_none());

        store.set(Scope::World, "k", json!({"a": 1})).unwrap();
        assert_eq!(store.get(Scope::World, "k").unwrap(), Some(json!({"a": 1})));

        store.set(Scope::World, "k", json!(2)).unwrap();
        assert_eq!(store.get(Scope::World, "k").unwrap(), Some(json!(2)));

        store.remove(Scope::World, "k").unwrap();
        assert!(store.get(Scope::World, "k").unwrap().is_none());
    }

    #[test]
    fn scopes_are_isolated() {
        let store = MemoryStore::new();
        store.set(Scope::World, "k", json!("world")).unwrap();
        store.set(Scope::Client, "k", json!("client")).unwrap();

        assert_eq!(store.get(Scope::World, "k").unwrap(), Some(json!("world")));
        assert_eq!(store.get(Scope::Client, "k").unwrap(), Some(json!("client")));

        store.remove(Scope::Client, "k").unwrap();
        assert_eq!(store.get(Scope::World, "k").unwrap(), Some(json!("world")));
        assert!(store.get(Scope::Client, "k").unwrap().is_none());
    }

    #[test]
    fn typed_handle_round_trip() {
        let settings = Settings::in_memory();

        settings
            .set(Scope::World, "ids", &vec!["a".to_owned(), "b".to_owned()])
            .unwrap();
        let ids: Option<Vec<String>> = settings.get(Scope::World, "ids").unwrap();
        assert_eq!(ids, Some(vec!["a".to_owned(), "b".to_owned()]));

        let missing: Option<Vec<String>> = settings.get(Scope::World, "nope").unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn typed_handle_reports_type_mismatch() {
        let settings = Settings::in_memory();
        settings.set(Scope::Client, "flag", &true).unwrap();

        let err = settings.get::<Vec<String>>(Scope::Client, "flag").unwrap_err();
        match err {
            StoreError::Serialization(msg) => assert!(msg.contains("client/flag")),
            other => panic!("expected Serialization error, got {other}"),
        }
    }

    #[test]
    fn handle_observes_external_writes() {
        // Two handles over the same backend: the second handle's write is
        // visible to the first without any refresh step.
        let backend = Arc::new(MemoryStore::new());
        let a = Settings::new(backend.clone());
        let b = Settings::new(backend);

        b.set(Scope::World, "k", &41).unwrap();
        assert_eq!(a.get::<i32>(Scope::World, "k").unwrap(), Some(41));
        b.set(Scope::World, "k", &42).unwrap();
        assert_eq!(a.get::<i32>(Scope::World, "k").unwrap(), Some(42));
    }

    #[test]
    fn store_error_display() {
        let io_err = StoreError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"));
        assert!(io_err.to_string().contains("I/O error"));

        let corrupt = StoreError::Corruption("bad state".into());
        assert!(corrupt.to_string().contains("corruption"));

        let unavail = StoreError::Unavailable("read-only".into());
        assert!(unavail.to_string().contains("unavailable"));
    }
}

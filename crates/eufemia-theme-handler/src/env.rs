//! Runtime environment abstractions.
//!
//! Resolving and switching themes needs two things from the host: a
//! key/value store that survives reloads and the current URL. Both are traits
//! here so the runtime logic can run in a browser shim, a native preview
//! tool, or a test with nothing but in-memory mocks.
//!
//! A missing [`RuntimeContext`] means "not in a browser" (server render), in
//! which case the default theme is always used.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use url::Url;

use crate::error::StorageError;

/// Name of the URL query parameter that overrides the persisted theme.
pub const THEME_QUERY_PARAM: &str = "eufemia-theme";

/// Persistent string storage, modeled after browser local storage.
pub trait ThemeStorage {
    /// Read a value. `Ok(None)` when the key is not set.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Read access to the current document location.
pub trait Location {
    /// Value of a query parameter, if present.
    fn query_param(&self, name: &str) -> Option<String>;
}

/// Storage and location of one browser-like execution context.
#[derive(Clone)]
pub struct RuntimeContext {
    storage: Rc<dyn ThemeStorage>,
    location: Rc<dyn Location>,
}

impl RuntimeContext {
    pub fn new(storage: Rc<dyn ThemeStorage>, location: Rc<dyn Location>) -> Self {
        Self { storage, location }
    }

    pub fn storage(&self) -> &dyn ThemeStorage {
        self.storage.as_ref()
    }

    pub fn location(&self) -> &dyn Location {
        self.location.as_ref()
    }
}

impl fmt::Debug for RuntimeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeContext").finish_non_exhaustive()
    }
}

// === Locations ===

/// Location backed by a parsed URL.
#[derive(Debug, Clone)]
pub struct UrlLocation {
    url: Url,
}

impl UrlLocation {
    pub fn new(url: Url) -> Self {
        Self { url }
    }

    pub fn parse(input: &str) -> Result<Self, url::ParseError> {
        Ok(Self::new(Url::parse(input)?))
    }
}

impl Location for UrlLocation {
    fn query_param(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    }
}

/// Location built from a bare search string such as `?eufemia-theme=ui`.
#[derive(Debug, Clone, Default)]
pub struct QueryLocation {
    pairs: Vec<(String, String)>,
}

impl QueryLocation {
    pub fn new(search: &str) -> Self {
        let query = search.strip_prefix('?').unwrap_or(search);
        Self {
            pairs: url::form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect(),
        }
    }

    /// A location without any query string.
    pub fn empty() -> Self {
        Self::default()
    }
}

impl Location for QueryLocation {
    fn query_param(&self, name: &str) -> Option<String> {
        self.pairs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    }
}

// === Storages ===

/// Storage persisted as a flat JSON object in a file.
///
/// Every call reads or rewrites the whole file; theme preferences are tiny.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self, key: &str) -> Result<HashMap<String, String>, StorageError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => {
                return Err(StorageError::Read {
                    key: key.to_string(),
                    reason: e.to_string(),
                })
            }
        };
        if content.trim().is_empty() {
            return Ok(HashMap::new());
        }
        serde_json::from_str(&content).map_err(|e| StorageError::Read {
            key: key.to_string(),
            reason: format!("{} is not a storage file: {}", self.path.display(), e),
        })
    }
}

impl ThemeStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_all(key)?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.read_all(key)?;
        items.insert(key.to_string(), value.to_string());

        let write_err = |reason: String| StorageError::Write {
            key: key.to_string(),
            reason,
        };
        let json = serde_json::to_string_pretty(&items).map_err(|e| write_err(e.to_string()))?;
        std::fs::write(&self.path, json).map_err(|e| write_err(e.to_string()))
    }
}

// === Mock implementations for testing ===

/// In-memory storage with switchable failures.
#[derive(Debug, Default)]
pub struct MockStorage {
    items: RefCell<HashMap<String, String>>,
    fail_reads: Cell<bool>,
    fail_writes: Cell<bool>,
    writes: Cell<usize>,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.items.borrow_mut().insert(key.into(), value.into());
        self
    }

    /// Every read fails, as when storage is disabled by the user agent.
    pub fn failing_reads(self) -> Self {
        self.fail_reads.set(true);
        self
    }

    /// Every write fails with [`StorageError::QuotaExceeded`].
    pub fn failing_writes(self) -> Self {
        self.fail_writes.set(true);
        self
    }

    /// Current raw value, bypassing failure switches.
    pub fn item(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    /// Number of successful writes.
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }
}

impl ThemeStorage for MockStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.fail_reads.get() {
            return Err(StorageError::Unavailable);
        }
        Ok(self.item(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes.get() {
            return Err(StorageError::QuotaExceeded(key.to_string()));
        }
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

//! Naming of stylesheet chunks by theme.
//!
//! The bundler asks for a chunk name for every style module. Modules that
//! live in a theme directory (`.../style/themes/theme-sbanken`) are grouped
//! into a chunk named after the theme, so the build emits one stylesheet per
//! theme. Everything else lands in the fallback chunk.
//!
//! Two ways to map a module to a theme, tried in order:
//!
//! 1. An explicit asset map, filled in by whoever knows the build layout
//!    ([`ChunkClassifier::with_asset`]).
//! 2. Path inference: if the module's directory matches one of the configured
//!    file globs, the key is taken from a trailing `theme-<key>` segment.

use std::collections::HashMap;

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::error::ThemeError;

/// Chunk name used when a module cannot be attributed to a theme.
pub const DEFAULT_FALLBACK_CHUNK: &str = "commons";

static THEME_DIR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/.*theme-([^/]*)$").expect("theme directory pattern is valid"));

/// Theme keys seen while classifying, in discovery order, without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThemeDiscovery {
    keys: Vec<String>,
}

impl ThemeDiscovery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `key`. Returns `true` if it was not seen before.
    pub fn record(&mut self, key: &str) -> bool {
        if self.keys.iter().any(|k| k == key) {
            return false;
        }
        self.keys.push(key.to_string());
        true
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }
}

/// Decides the output chunk for style modules.
#[derive(Debug, Clone)]
pub struct ChunkClassifier {
    dirs: GlobSet,
    assets: HashMap<String, String>,
    fallback: String,
}

impl ChunkClassifier {
    /// Compiles `files_globs`. Each glob is matched against module
    /// directories, so only its directory part is used.
    pub fn new<I, S>(files_globs: I) -> Result<Self, ThemeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = GlobSetBuilder::new();
        for glob in files_globs {
            let dir = glob_dir(glob.as_ref());
            builder.add(GlobBuilder::new(dir).literal_separator(true).build()?);
        }

        Ok(Self {
            dirs: builder.build()?,
            assets: HashMap::new(),
            fallback: DEFAULT_FALLBACK_CHUNK.to_string(),
        })
    }

    /// Maps a module directory to a theme key without path inference.
    pub fn with_asset(mut self, module_context: &str, theme_key: impl Into<String>) -> Self {
        self.assets.insert(slash(module_context), theme_key.into());
        self
    }

    /// Overrides the chunk name for unattributed modules.
    pub fn with_fallback(mut self, name: impl Into<String>) -> Self {
        self.fallback = name.into();
        self
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// True if the module directory is inside one of the theme globs.
    pub fn is_in_glob(&self, module_context: &str) -> bool {
        self.dirs.is_match(slash(module_context))
    }

    /// Returns the chunk name for a module directory and records any newly
    /// seen theme key in `discovery`.
    pub fn classify(&self, module_context: &str, discovery: &mut ThemeDiscovery) -> String {
        let path = slash(module_context);

        let key = self.assets.get(&path).cloned().or_else(|| {
            if self.dirs.is_match(&path) {
                theme_key_from_path(&path)
            } else {
                None
            }
        });

        match key {
            Some(key) => {
                if discovery.record(&key) {
                    debug!(theme = %key, module = %path, "discovered theme");
                }
                key
            }
            None => self.fallback.clone(),
        }
    }
}

/// Extracts `<key>` from a path ending in a `...theme-<key>` segment.
pub fn theme_key_from_path(path: &str) -> Option<String> {
    THEME_DIR
        .captures(path)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .filter(|k| !k.is_empty())
        .map(str::to_string)
}

/// Normalizes Windows separators.
fn slash(path: &str) -> String {
    path.replace('\\', "/")
}

/// Directory part of a glob: everything before the last `/`.
fn glob_dir(glob: &str) -> &str {
    match glob.rfind('/') {
        Some(0) => "/",
        Some(i) => &glob[..i],
        None => ".",
    }
}

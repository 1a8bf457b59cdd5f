//! The catalog of themes known to a build.
//!
//! A [`ThemeRegistry`] is created once from [`ThemeHandlerOptions`] and lives
//! for the rest of the build. The set of keys never changes after
//! [`load`](ThemeRegistry::load); only the per-theme descriptor fields
//! (`file`, `is_dev`) are filled in while chunks are classified and documents
//! are rendered.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::ThemeHandlerOptions;
use crate::error::ThemeError;

const BUILD_FIELDS: &[&str] = &["key", "file", "isDev"];

/// A single theme and what the build learned about it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeDescriptor {
    pub key: String,
    pub name: String,
    /// Resolved stylesheet URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_dev: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub hide: bool,
    /// Extra per-theme properties from the configuration.
    #[serde(flatten)]
    pub props: Map<String, Value>,
}

impl ThemeDescriptor {
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            file: None,
            is_dev: false,
            hide: false,
            props: Map::new(),
        }
    }
}

/// The registry as shipped to the browser through bundler constants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeGlobals {
    pub default_theme: String,
    pub themes: IndexMap<String, ThemeDescriptor>,
    pub storage_id: String,
}

/// Available themes, the default theme and the persistence key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeRegistry {
    themes: IndexMap<String, ThemeDescriptor>,
    default_theme: String,
    storage_id: String,
}

impl ThemeRegistry {
    /// Builds the registry from validated options.
    ///
    /// # Errors
    ///
    /// Returns [`ThemeError::Configuration`] if no themes are configured, if
    /// `defaultTheme` is not one of them, or if `storageId` is empty.
    pub fn load(options: &ThemeHandlerOptions) -> Result<Self, ThemeError> {
        if options.themes.is_empty() {
            return Err(ThemeError::configuration("no themes configured"));
        }
        if !options.themes.contains_key(&options.default_theme) {
            return Err(ThemeError::configuration(format!(
                "defaultTheme '{}' is not one of the configured themes ({})",
                options.default_theme,
                options
                    .themes
                    .keys()
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }
        if options.storage_id.is_empty() {
            return Err(ThemeError::configuration("storageId must not be empty"));
        }

        let themes = options
            .themes
            .iter()
            .map(|(key, config)| {
                let name = config.name.clone().unwrap_or_else(|| key.clone());
                let mut descriptor = ThemeDescriptor::new(key.clone(), name);
                descriptor.hide = config.hide;
                // build-owned fields cannot be set from configuration
                descriptor.props = config
                    .props
                    .iter()
                    .filter(|(prop, _)| !BUILD_FIELDS.contains(&prop.as_str()))
                    .map(|(prop, value)| (prop.clone(), value.clone()))
                    .collect();
                (key.clone(), descriptor)
            })
            .collect();

        Ok(Self {
            themes,
            default_theme: options.default_theme.clone(),
            storage_id: options.storage_id.clone(),
        })
    }

    /// Rebuilds a registry from injected globals, e.g. on the client.
    ///
    /// # Errors
    ///
    /// Same rules as [`load`](Self::load).
    pub fn from_globals(globals: RuntimeGlobals) -> Result<Self, ThemeError> {
        if !globals.themes.contains_key(&globals.default_theme) {
            return Err(ThemeError::configuration(format!(
                "defaultTheme '{}' is not one of the injected themes",
                globals.default_theme
            )));
        }
        if globals.storage_id.is_empty() {
            return Err(ThemeError::configuration("storageId must not be empty"));
        }

        let themes = globals
            .themes
            .into_iter()
            .map(|(key, mut descriptor)| {
                descriptor.key = key.clone();
                (key, descriptor)
            })
            .collect();

        Ok(Self {
            themes,
            default_theme: globals.default_theme,
            storage_id: globals.storage_id,
        })
    }

    /// Snapshot of the registry for embedding into the client bundle.
    pub fn globals(&self) -> RuntimeGlobals {
        RuntimeGlobals {
            default_theme: self.default_theme.clone(),
            themes: self.themes.clone(),
            storage_id: self.storage_id.clone(),
        }
    }

    /// True iff `key` names a configured theme.
    pub fn is_valid(&self, key: &str) -> bool {
        self.themes.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&ThemeDescriptor> {
        self.themes.get(key)
    }

    /// Mutable access to a descriptor. The key set itself cannot be changed.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut ThemeDescriptor> {
        self.themes.get_mut(key)
    }

    pub fn default_theme(&self) -> &str {
        &self.default_theme
    }

    pub fn default_descriptor(&self) -> &ThemeDescriptor {
        // load() guarantees the default key is present
        &self.themes[self.default_theme.as_str()]
    }

    pub fn storage_id(&self) -> &str {
        &self.storage_id
    }

    /// Theme keys in configuration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.themes.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ThemeDescriptor> {
        self.themes.values()
    }

    /// Forgets what a build learned: stylesheet URLs and dev-server flags.
    pub fn clear_build_state(&mut self) {
        for descriptor in self.themes.values_mut() {
            descriptor.file = None;
            descriptor.is_dev = false;
        }
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut ThemeDescriptor> {
        self.themes.values_mut()
    }

    pub fn len(&self) -> usize {
        self.themes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
    }

    /// The catalog as embedded into bootstrap scripts and bundler constants.
    pub fn catalog(&self) -> &IndexMap<String, ThemeDescriptor> {
        &self.themes
    }
}

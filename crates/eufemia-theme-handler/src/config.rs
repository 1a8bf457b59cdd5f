//! Plugin options as read from the site configuration.
//!
//! Options are plain serde data. Both YAML and JSON are accepted; the field
//! names are camelCase so the same document can be shared with the host
//! pipeline's own configuration file:
//!
//! ```yaml
//! defaultTheme: ui
//! storageId: eufemia-ui
//! themes:
//!   ui: { name: DNB Eufemia }
//!   sbanken: { name: Sbanken }
//! ```
//!
//! Loading options does not check cross-field rules. That happens in
//! [`ThemeRegistry::load`](crate::ThemeRegistry::load), which is the only way
//! to get a registry and therefore the only way into the rest of the crate.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ThemeError;

/// Default persistence key for the active theme.
pub const DEFAULT_STORAGE_ID: &str = "eufemia-theme";

/// Default name of the core stylesheet bundle.
pub const DEFAULT_CORE_STYLE_NAME: &str = "dnb-ui-core";

/// One entry of the `themes` mapping.
///
/// Any other per-theme property is kept in `props` and shipped with the
/// theme catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeConfig {
    /// Display name. Falls back to the theme key.
    #[serde(default)]
    pub name: Option<String>,
    /// Hidden themes are still valid but not listed in pickers.
    #[serde(default)]
    pub hide: bool,
    #[serde(flatten)]
    pub props: Map<String, Value>,
}

impl ThemeConfig {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

/// All options understood by the theme handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ThemeHandlerOptions {
    pub themes: IndexMap<String, ThemeConfig>,
    pub default_theme: String,
    #[serde(default = "default_storage_id")]
    pub storage_id: String,
    #[serde(default = "default_files_globs")]
    pub files_globs: Vec<String>,
    /// Load order of the theme style files. The order matters.
    #[serde(default = "default_include_files")]
    pub include_files: Vec<String>,
    #[serde(default = "default_true")]
    pub inline_default_theme: bool,
    #[serde(default = "default_true")]
    pub wrap_with_theme_provider: bool,
    #[serde(default = "default_core_style_name")]
    pub core_style_name: String,
    #[serde(default)]
    pub omit_scroll_behavior: bool,
    #[serde(default)]
    pub verbose: bool,
}

fn default_storage_id() -> String {
    DEFAULT_STORAGE_ID.to_string()
}

fn default_core_style_name() -> String {
    DEFAULT_CORE_STYLE_NAME.to_string()
}

fn default_true() -> bool {
    true
}

fn default_files_globs() -> Vec<String> {
    vec![
        "**/style/dnb-ui-core.min.css".to_string(),
        "**/style/themes/**/*-theme-{basis,components,extensions}.min.css".to_string(),
    ]
}

fn default_include_files() -> Vec<String> {
    vec![
        "**/dnb-ui-core.*".to_string(),
        "**/*-theme-extensions.*".to_string(),
        "**/*-theme-components.*".to_string(),
        "**/*-theme-basis.*".to_string(),
    ]
}

impl ThemeHandlerOptions {
    /// Creates options with the given themes and default, everything else defaulted.
    pub fn new<I, K>(themes: I, default_theme: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = (K, ThemeConfig)>,
        K: Into<String>,
    {
        Self {
            themes: themes.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            default_theme: default_theme.into(),
            storage_id: default_storage_id(),
            files_globs: default_files_globs(),
            include_files: default_include_files(),
            inline_default_theme: true,
            wrap_with_theme_provider: true,
            core_style_name: default_core_style_name(),
            omit_scroll_behavior: false,
            verbose: false,
        }
    }

    pub fn with_storage_id(mut self, storage_id: impl Into<String>) -> Self {
        self.storage_id = storage_id.into();
        self
    }

    pub fn with_inline_default_theme(mut self, inline: bool) -> Self {
        self.inline_default_theme = inline;
        self
    }

    pub fn with_wrap_with_theme_provider(mut self, wrap: bool) -> Self {
        self.wrap_with_theme_provider = wrap;
        self
    }

    pub fn with_files_globs<I, S>(mut self, globs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files_globs = globs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Parses options from YAML.
    ///
    /// # Errors
    ///
    /// A missing required field (`themes`, `defaultTheme`) is a
    /// [`ThemeError::Configuration`]; any other syntax or type problem is a
    /// [`ThemeError::Parse`].
    pub fn from_yaml(yaml: &str) -> Result<Self, ThemeError> {
        serde_yaml::from_str(yaml).map_err(|e| options_error(e.to_string()))
    }

    /// Parses options from JSON. Errors as for [`from_yaml`](Self::from_yaml).
    pub fn from_json(json: &str) -> Result<Self, ThemeError> {
        serde_json::from_str(json).map_err(|e| options_error(e.to_string()))
    }

    /// Reads options from a `.json`, `.yaml` or `.yml` file.
    ///
    /// # Errors
    ///
    /// Returns [`ThemeError::Io`] if the file cannot be read, and
    /// [`ThemeError::Configuration`] for any other extension.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ThemeError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&content),
            Some("yaml") | Some("yml") => Self::from_yaml(&content),
            _ => Err(ThemeError::configuration(format!(
                "unsupported options file '{}': expected .json, .yaml or .yml",
                path.display()
            ))),
        }
    }
}

fn options_error(message: String) -> ThemeError {
    if message.contains("missing field") {
        ThemeError::Configuration(message)
    } else {
        ThemeError::Parse(message)
    }
}

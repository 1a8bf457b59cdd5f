//! Inline bootstrap scripts.
//!
//! The scripts run in the document head before first paint. They read the
//! persisted theme and the `eufemia-theme` query parameter and point the
//! `#eufemia-style-theme` link at the right stylesheet. Build-time values
//! are substituted into the script sources with MiniJinja; every value is
//! embedded as a JSON literal.

use minijinja::{AutoEscape, Environment, UndefinedBehavior};
use serde::Serialize;

use crate::error::ThemeError;
use crate::registry::ThemeRegistry;

const PROD_TEMPLATE: &str = "prod.js";
const DEV_TEMPLATE: &str = "dev.js";

/// Development or production rendering.
///
/// Both modes run the same injection algorithm; the mode decides where
/// stylesheets come from and whether the development script is emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMode {
    Development,
    Production,
}

impl BuildMode {
    /// Reads `NODE_ENV`. Anything but `production` is development.
    pub fn from_env() -> Self {
        Self::from_node_env(std::env::var("NODE_ENV").ok().as_deref())
    }

    pub fn from_node_env(value: Option<&str>) -> Self {
        match value {
            Some("production") => BuildMode::Production,
            _ => BuildMode::Development,
        }
    }

    pub fn is_dev(self) -> bool {
        self == BuildMode::Development
    }
}

/// Values substituted into the bootstrap scripts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptValues {
    pub is_dev: String,
    pub default_theme: String,
    pub storage_id: String,
    pub themes: String,
    pub inline_default_theme: String,
}

impl ScriptValues {
    pub fn new(
        registry: &ThemeRegistry,
        mode: BuildMode,
        inline_default_theme: bool,
    ) -> Result<Self, ThemeError> {
        Ok(Self {
            is_dev: js_literal(&mode.is_dev())?,
            default_theme: js_literal(registry.default_theme())?,
            storage_id: js_literal(registry.storage_id())?,
            themes: js_literal(registry.catalog())?,
            inline_default_theme: js_literal(&inline_default_theme)?,
        })
    }
}

/// Serializes `value` as JSON that is safe inside an inline `<script>`.
pub fn js_literal<T: Serialize + ?Sized>(value: &T) -> Result<String, ThemeError> {
    let json = serde_json::to_string(value)?;
    Ok(json.replace("</", "<\\/").replace("<!--", "<\\!--"))
}

/// Compiled script templates.
pub struct BootstrapScripts {
    env: Environment<'static>,
}

impl BootstrapScripts {
    pub fn new() -> Result<Self, ThemeError> {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.add_template(PROD_TEMPLATE, include_str!("scripts/prod.js"))?;
        env.add_template(DEV_TEMPLATE, include_str!("scripts/dev.js"))?;
        Ok(Self { env })
    }

    /// The script that selects the theme stylesheet. Always emitted.
    pub fn render_prod(&self, values: &ScriptValues) -> Result<String, ThemeError> {
        Ok(self.env.get_template(PROD_TEMPLATE)?.render(values)?)
    }

    /// The script that keeps dev-server stylesheets from stacking.
    pub fn render_dev(&self, values: &ScriptValues) -> Result<String, ThemeError> {
        Ok(self.env.get_template(DEV_TEMPLATE)?.render(values)?)
    }
}

impl std::fmt::Debug for BootstrapScripts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapScripts").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ThemeConfig, ThemeHandlerOptions};

    fn registry() -> ThemeRegistry {
        ThemeRegistry::load(&ThemeHandlerOptions::new(
            [
                ("ui", ThemeConfig::named("DNB Eufemia")),
                ("sbanken", ThemeConfig::named("</script><b>")),
            ],
            "ui",
        ))
        .unwrap()
    }

    #[test]
    fn test_build_mode_from_node_env() {
        assert_eq!(BuildMode::from_node_env(Some("production")), BuildMode::Production);
        assert_eq!(BuildMode::from_node_env(Some("development")), BuildMode::Development);
        assert_eq!(BuildMode::from_node_env(None), BuildMode::Development);
    }

    #[test]
    fn test_values_are_json_literals() {
        let values = ScriptValues::new(&registry(), BuildMode::Production, true).unwrap();
        assert_eq!(values.is_dev, "false");
        assert_eq!(values.default_theme, "\"ui\"");
        assert_eq!(values.storage_id, "\"eufemia-theme\"");
        assert_eq!(values.inline_default_theme, "true");
        assert!(values.themes.starts_with(r#"{"ui":{"key":"ui""#));
    }

    #[test]
    fn test_script_end_tag_is_escaped() {
        let values = ScriptValues::new(&registry(), BuildMode::Production, true).unwrap();
        assert!(!values.themes.contains("</script>"));
        assert!(values.themes.contains(r"<\/script>"));
    }

    #[test]
    fn test_prod_script_substitution() {
        let scripts = BootstrapScripts::new().unwrap();
        let values = ScriptValues::new(&registry(), BuildMode::Production, false).unwrap();
        let script = scripts.render_prod(&values).unwrap();

        assert!(script.contains("var isDev = false;"));
        assert!(script.contains("var defaultTheme = \"ui\";"));
        assert!(script.contains("var storageId = \"eufemia-theme\";"));
        assert!(script.contains("var inlineDefaultTheme = false;"));
        assert!(script.contains("globalThis.__updateEufemiaThemeFile"));
        assert!(!script.contains("{{"));
    }

    #[test]
    fn test_dev_script_substitution() {
        let scripts = BootstrapScripts::new().unwrap();
        let values = ScriptValues::new(&registry(), BuildMode::Development, true).unwrap();
        let script = scripts.render_dev(&values).unwrap();
        assert!(script.contains("var isDev = true;"));
        assert!(!script.contains("{{"));
    }
}

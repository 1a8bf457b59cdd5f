//! The theme in effect for one execution context.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Resolved theme plus the presentation properties that travel with it.
///
/// Persisted as JSON. The theme key is stored under `"name"`, which is what
/// already-deployed bootstrap scripts read; `"key"` is accepted on input.
/// Fields this crate does not know are kept in `extra` and written back
/// unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveThemeState {
    #[serde(rename = "name", alias = "key", default)]
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prop_mapping: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dark_mode: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ActiveThemeState {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    /// Builds a state from a persisted JSON object.
    ///
    /// Known fields with an unexpected type are dropped instead of failing
    /// the whole record. An empty or missing key stays empty.
    pub fn from_persisted(mut fields: Map<String, Value>) -> Self {
        let name = take_string(&mut fields, "name");
        let key = take_string(&mut fields, "key");
        let variant = take_string(&mut fields, "variant");
        let size = take_string(&mut fields, "size");
        let prop_mapping = take_string(&mut fields, "propMapping");
        let dark_mode = fields.remove("darkMode").and_then(|v| v.as_bool());

        Self {
            key: name.filter(|k| !k.is_empty()).or(key).unwrap_or_default(),
            variant,
            size,
            prop_mapping,
            dark_mode,
            extra: fields,
        }
    }

    /// Applies every field that is set on `patch`, leaving the rest alone.
    pub fn merge(mut self, patch: &ThemeStatePatch) -> Self {
        if let Some(key) = &patch.key {
            self.key = key.clone();
        }
        if let Some(variant) = &patch.variant {
            self.variant = Some(variant.clone());
        }
        if let Some(size) = &patch.size {
            self.size = Some(size.clone());
        }
        if let Some(prop_mapping) = &patch.prop_mapping {
            self.prop_mapping = Some(prop_mapping.clone());
        }
        if let Some(dark_mode) = patch.dark_mode {
            self.dark_mode = Some(dark_mode);
        }
        self
    }
}

fn take_string(fields: &mut Map<String, Value>, name: &str) -> Option<String> {
    match fields.remove(name) {
        Some(Value::String(s)) => Some(s),
        _ => None,
    }
}

/// Partial update for [`ActiveThemeState`]. `None` means "keep".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThemeStatePatch {
    pub key: Option<String>,
    pub variant: Option<String>,
    pub size: Option<String>,
    pub prop_mapping: Option<String>,
    pub dark_mode: Option<bool>,
}

impl ThemeStatePatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Patch that only switches the theme key.
    pub fn key(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            ..Self::default()
        }
    }

    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = Some(variant.into());
        self
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    pub fn with_prop_mapping(mut self, prop_mapping: impl Into<String>) -> Self {
        self.prop_mapping = Some(prop_mapping.into());
        self
    }

    pub fn with_dark_mode(mut self, dark_mode: bool) -> Self {
        self.dark_mode = Some(dark_mode);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_overrides_only_set_fields() {
        let state = ActiveThemeState {
            key: "ui".into(),
            variant: Some("basis".into()),
            size: Some("large".into()),
            ..Default::default()
        };
        let merged = state.merge(&ThemeStatePatch::key("sbanken").with_dark_mode(true));
        assert_eq!(merged.key, "sbanken");
        assert_eq!(merged.variant.as_deref(), Some("basis"));
        assert_eq!(merged.size.as_deref(), Some("large"));
        assert_eq!(merged.dark_mode, Some(true));
    }

    #[test]
    fn test_empty_patch_is_identity() {
        let state = ActiveThemeState::new("ui");
        assert_eq!(state.clone().merge(&ThemeStatePatch::new()), state);
    }

    #[test]
    fn test_persisted_shape() {
        let state = ActiveThemeState::new("sbanken").merge(&ThemeStatePatch::new().with_prop_mapping("basis"));
        let json = serde_json::to_string(&state).unwrap();
        assert_eq!(json, r#"{"name":"sbanken","propMapping":"basis"}"#);
    }

    #[test]
    fn test_key_alias_and_unknown_fields() {
        let state: ActiveThemeState =
            serde_json::from_str(r#"{"key":"ui","somethingElse":1}"#).unwrap();
        assert_eq!(state.key, "ui");
        assert_eq!(state.extra["somethingElse"], 1);
    }

    fn object(json: &str) -> Map<String, Value> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_from_persisted_drops_mistyped_fields() {
        let state = ActiveThemeState::from_persisted(object(
            r#"{"name":"ui","size":3,"darkMode":"yes","variant":"basis"}"#,
        ));
        assert_eq!(state.key, "ui");
        assert_eq!(state.size, None);
        assert_eq!(state.dark_mode, None);
        assert_eq!(state.variant.as_deref(), Some("basis"));
        assert!(state.extra.is_empty());
    }

    #[test]
    fn test_from_persisted_keeps_unknown_fields() {
        let state = ActiveThemeState::from_persisted(object(
            r#"{"key":"sbanken","contrast":"high","darkMode":true}"#,
        ))
        .merge(&ThemeStatePatch::new().with_size("small"));

        assert_eq!(state.key, "sbanken");
        assert_eq!(
            serde_json::to_string(&state).unwrap(),
            r#"{"name":"sbanken","size":"small","darkMode":true,"contrast":"high"}"#
        );
    }

    #[test]
    fn test_from_persisted_non_string_name() {
        let state = ActiveThemeState::from_persisted(object(r#"{"name":7}"#));
        assert_eq!(state.key, "");
    }
}

//! Resolution of the active theme.
//!
//! ```text
//! resolve
//! ├── no runtime context      → default (server render)
//! ├── ?eufemia-theme=<key>    → wins when non-empty
//! ├── persisted state         → storage[storage_id], JSON object only
//! └── default theme
//! ```
//!
//! The result is always a key from the registry. Anything unexpected along
//! the way is logged and turned into the default theme.

use serde_json::{Map, Value};
use tracing::error;

use crate::env::{RuntimeContext, THEME_QUERY_PARAM};
use crate::error::ThemeError;
use crate::registry::ThemeRegistry;
use crate::state::ActiveThemeState;

/// Determines the theme in effect for `context`.
///
/// Never fails: invalid keys, unreadable storage and malformed persisted
/// state all fall back to `{ key: default_theme }`.
pub fn resolve(registry: &ThemeRegistry, context: Option<&RuntimeContext>) -> ActiveThemeState {
    let Some(context) = context else {
        return ActiveThemeState::new(registry.default_theme());
    };

    match try_resolve(registry, context) {
        Ok(state) => state,
        Err(e) => {
            error!("{}", e);
            ActiveThemeState::new(registry.default_theme())
        }
    }
}

fn try_resolve(
    registry: &ThemeRegistry,
    context: &RuntimeContext,
) -> Result<ActiveThemeState, ThemeError> {
    let persisted = read_persisted(registry, context)?;

    let from_query = context
        .location()
        .query_param(THEME_QUERY_PARAM)
        .filter(|v| !v.is_empty());

    let key = from_query
        .or_else(|| Some(persisted.key.clone()).filter(|k| !k.is_empty()))
        .unwrap_or_else(|| registry.default_theme().to_string());

    if !registry.is_valid(&key) {
        return Err(ThemeError::InvalidThemeKey(key));
    }

    Ok(ActiveThemeState { key, ..persisted })
}

/// Reads the persisted record. Values that do not look like a JSON object
/// are treated as "nothing stored".
fn read_persisted(
    registry: &ThemeRegistry,
    context: &RuntimeContext,
) -> Result<ActiveThemeState, ThemeError> {
    let raw = context.storage().get_item(registry.storage_id())?;

    match raw {
        Some(data) if data.starts_with('{') => {
            let fields: Map<String, Value> = serde_json::from_str(&data)?;
            Ok(ActiveThemeState::from_persisted(fields))
        }
        _ => Ok(ActiveThemeState::default()),
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::config::{ThemeConfig, ThemeHandlerOptions};
    use crate::env::{MockStorage, QueryLocation};

    fn registry() -> ThemeRegistry {
        let options = ThemeHandlerOptions::new(
            [
                ("ui", ThemeConfig::named("DNB Eufemia")),
                ("sbanken", ThemeConfig::named("Sbanken")),
            ],
            "ui",
        )
        .with_storage_id("eufemia-ui");
        ThemeRegistry::load(&options).unwrap()
    }

    fn context(storage: MockStorage, search: &str) -> RuntimeContext {
        RuntimeContext::new(Rc::new(storage), Rc::new(QueryLocation::new(search)))
    }

    #[test]
    fn test_server_render_uses_default() {
        assert_eq!(resolve(&registry(), None), ActiveThemeState::new("ui"));
    }

    #[test]
    fn test_nothing_stored() {
        let ctx = context(MockStorage::new(), "");
        assert_eq!(resolve(&registry(), Some(&ctx)).key, "ui");
    }

    #[test]
    fn test_persisted_key_and_extra_fields() {
        let storage = MockStorage::new()
            .with_item("eufemia-ui", r#"{"name":"sbanken","propMapping":"basis"}"#);
        let state = resolve(&registry(), Some(&context(storage, "")));
        assert_eq!(state.key, "sbanken");
        assert_eq!(state.prop_mapping.as_deref(), Some("basis"));
    }

    #[test]
    fn test_query_wins_over_persisted() {
        let storage = MockStorage::new().with_item("eufemia-ui", r#"{"name":"sbanken"}"#);
        let state = resolve(&registry(), Some(&context(storage, "?eufemia-theme=ui")));
        assert_eq!(state.key, "ui");
    }

    #[test]
    fn test_empty_query_is_ignored() {
        let storage = MockStorage::new().with_item("eufemia-ui", r#"{"name":"sbanken"}"#);
        let state = resolve(&registry(), Some(&context(storage, "?eufemia-theme=")));
        assert_eq!(state.key, "sbanken");
    }

    #[test]
    fn test_invalid_persisted_key_falls_back() {
        let storage = MockStorage::new().with_item("eufemia-ui", r#"{"name":"ghost","size":"large"}"#);
        let state = resolve(&registry(), Some(&context(storage, "")));
        assert_eq!(state, ActiveThemeState::new("ui"));
    }

    #[test]
    fn test_invalid_query_key_falls_back() {
        let state = resolve(
            &registry(),
            Some(&context(MockStorage::new(), "?eufemia-theme=ghost")),
        );
        assert_eq!(state.key, "ui");
    }

    #[test]
    fn test_non_object_value_is_treated_as_empty() {
        let storage = MockStorage::new().with_item("eufemia-ui", "sbanken");
        let state = resolve(&registry(), Some(&context(storage, "")));
        assert_eq!(state.key, "ui");
    }

    #[test]
    fn test_malformed_json_falls_back() {
        let storage = MockStorage::new().with_item("eufemia-ui", "{not json");
        let state = resolve(
            &registry(),
            Some(&context(storage, "?eufemia-theme=sbanken")),
        );
        assert_eq!(state.key, "ui");
    }

    #[test]
    fn test_mistyped_persisted_field_keeps_query() {
        let storage = MockStorage::new().with_item("eufemia-ui", r#"{"name":"ui","size":3}"#);
        let state = resolve(
            &registry(),
            Some(&context(storage, "?eufemia-theme=sbanken")),
        );
        assert_eq!(state.key, "sbanken");
        assert_eq!(state.size, None);
    }

    #[test]
    fn test_unknown_persisted_fields_carry_through() {
        let storage =
            MockStorage::new().with_item("eufemia-ui", r#"{"name":"sbanken","contrast":"high"}"#);
        let state = resolve(&registry(), Some(&context(storage, "")));
        assert_eq!(state.key, "sbanken");
        assert_eq!(state.extra["contrast"], "high");
    }

    #[test]
    fn test_storage_failure_falls_back() {
        let storage = MockStorage::new().failing_reads();
        let state = resolve(
            &registry(),
            Some(&context(storage, "?eufemia-theme=sbanken")),
        );
        assert_eq!(state.key, "ui");
    }
}

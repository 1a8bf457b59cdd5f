//! Changing the active theme at runtime.
//!
//! ```text
//! set_theme(patch)
//!   → resolve() merged with patch
//!   → invalid key?  log, stop
//!   → swap stylesheet ──(on load)──→ publish on "themeHandler", callback
//!   → persist to storage (errors logged)
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use tracing::{debug, error};

use crate::channel::ThemeEventChannel;
use crate::env::RuntimeContext;
use crate::registry::{ThemeDescriptor, ThemeRegistry};
use crate::resolver::resolve;
use crate::state::{ActiveThemeState, ThemeStatePatch};

/// Completion callback handed to [`StylesheetSwap::swap`].
pub type SwapDone = Box<dyn FnOnce()>;

/// Caller callback for [`ThemeSwitcher::set_theme`].
pub type ThemeCallback = Box<dyn FnOnce(&ActiveThemeState)>;

/// Points the live theme stylesheet at another theme.
///
/// Implementations may finish asynchronously but must call `done` exactly
/// once when the new stylesheet is in effect.
pub trait StylesheetSwap {
    fn swap(&self, theme: &ThemeDescriptor, done: SwapDone);
}

/// The `#eufemia-style-theme` link of one document.
///
/// Setting the href takes effect immediately, so `done` runs before
/// [`swap`](StylesheetSwap::swap) returns.
#[derive(Debug, Default)]
pub struct LinkStylesheet {
    href: RefCell<Option<String>>,
    swaps: Cell<usize>,
}

impl LinkStylesheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn href(&self) -> Option<String> {
        self.href.borrow().clone()
    }

    pub fn swap_count(&self) -> usize {
        self.swaps.get()
    }
}

impl StylesheetSwap for LinkStylesheet {
    fn swap(&self, theme: &ThemeDescriptor, done: SwapDone) {
        *self.href.borrow_mut() = theme.file.clone();
        self.swaps.set(self.swaps.get() + 1);
        done();
    }
}

/// Runtime theme switching for one execution context.
pub struct ThemeSwitcher {
    registry: ThemeRegistry,
    context: Option<RuntimeContext>,
    channel: ThemeEventChannel,
    stylesheet: Rc<dyn StylesheetSwap>,
}

impl ThemeSwitcher {
    pub fn new(
        registry: ThemeRegistry,
        context: Option<RuntimeContext>,
        channel: ThemeEventChannel,
        stylesheet: Rc<dyn StylesheetSwap>,
    ) -> Self {
        Self {
            registry,
            context,
            channel,
            stylesheet,
        }
    }

    pub fn registry(&self) -> &ThemeRegistry {
        &self.registry
    }

    /// The theme currently in effect.
    pub fn current(&self) -> ActiveThemeState {
        resolve(&self.registry, self.context.as_ref())
    }

    /// Switches to the theme described by `patch` merged over the current one.
    ///
    /// An invalid key is logged and ignored: nothing is swapped, published
    /// or stored. A failure to persist is logged; the switch itself stays.
    pub fn set_theme(&self, patch: &ThemeStatePatch, callback: Option<ThemeCallback>) {
        let state = self.current().merge(patch);

        let Some(descriptor) = self.registry.get(&state.key) else {
            error!("Not valid themeName: {}", state.key);
            return;
        };

        let channel = self.channel.clone();
        let published = state.clone();
        self.stylesheet.swap(
            descriptor,
            Box::new(move || {
                channel.publish(&published);
                if let Some(callback) = callback {
                    callback(&published);
                }
            }),
        );

        self.persist(&state);
    }

    fn persist(&self, state: &ActiveThemeState) {
        let Some(context) = &self.context else {
            debug!(theme = %state.key, "no storage in this context, theme not persisted");
            return;
        };

        let json = match serde_json::to_string(state) {
            Ok(json) => json,
            Err(e) => {
                error!("{}", e);
                return;
            }
        };

        if let Err(e) = context.storage().set_item(self.registry.storage_id(), &json) {
            error!("{}", e);
        }
    }
}

impl fmt::Debug for ThemeSwitcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeSwitcher")
            .field("registry", &self.registry)
            .field("context", &self.context)
            .field("channel", &self.channel)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ThemeConfig, ThemeHandlerOptions};
    use crate::env::{MockStorage, QueryLocation};

    struct Fixture {
        storage: Rc<MockStorage>,
        link: Rc<LinkStylesheet>,
        channel: ThemeEventChannel,
        switcher: ThemeSwitcher,
    }

    fn fixture(storage: MockStorage) -> Fixture {
        let mut registry = ThemeRegistry::load(&ThemeHandlerOptions::new(
            [
                ("ui", ThemeConfig::named("DNB Eufemia")),
                ("sbanken", ThemeConfig::named("Sbanken")),
            ],
            "ui",
        ))
        .unwrap();
        registry.get_mut("sbanken").unwrap().file = Some("/sbanken.3c4d.css".into());

        let storage = Rc::new(storage);
        let link = Rc::new(LinkStylesheet::new());
        let channel = ThemeEventChannel::new();
        let context = RuntimeContext::new(storage.clone(), Rc::new(QueryLocation::empty()));
        let switcher = ThemeSwitcher::new(registry, Some(context), channel.clone(), link.clone());

        Fixture {
            storage,
            link,
            channel,
            switcher,
        }
    }

    fn record(channel: &ThemeEventChannel) -> (Rc<RefCell<Vec<ActiveThemeState>>>, crate::Subscription) {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        let sub = channel.subscribe(move |s| sink.borrow_mut().push(s.clone()));
        (events, sub)
    }

    #[test]
    fn test_set_valid_theme() {
        let f = fixture(MockStorage::new());
        let (events, _sub) = record(&f.channel);
        let calls = Rc::new(Cell::new(0));

        let c = Rc::clone(&calls);
        f.switcher.set_theme(
            &ThemeStatePatch::key("sbanken"),
            Some(Box::new(move |s| {
                assert_eq!(s.key, "sbanken");
                c.set(c.get() + 1);
            })),
        );

        assert_eq!(calls.get(), 1);
        assert_eq!(*events.borrow(), vec![ActiveThemeState::new("sbanken")]);
        assert_eq!(f.storage.item("eufemia-theme").as_deref(), Some(r#"{"name":"sbanken"}"#));
        assert_eq!(f.link.href().as_deref(), Some("/sbanken.3c4d.css"));
        assert_eq!(f.switcher.current().key, "sbanken");
    }

    #[test]
    fn test_invalid_theme_has_no_effect() {
        let f = fixture(MockStorage::new().with_item("eufemia-theme", r#"{"name":"ui"}"#));
        let (events, _sub) = record(&f.channel);
        let called = Rc::new(Cell::new(false));

        let c = Rc::clone(&called);
        f.switcher.set_theme(
            &ThemeStatePatch::key("doesNotExist"),
            Some(Box::new(move |_| c.set(true))),
        );

        assert!(!called.get());
        assert!(events.borrow().is_empty());
        assert_eq!(f.link.swap_count(), 0);
        assert_eq!(f.storage.write_count(), 0);
        assert_eq!(f.storage.item("eufemia-theme").as_deref(), Some(r#"{"name":"ui"}"#));
    }

    #[test]
    fn test_patch_keeps_persisted_fields() {
        let f = fixture(
            MockStorage::new().with_item("eufemia-theme", r#"{"name":"ui","size":"large"}"#),
        );
        f.switcher
            .set_theme(&ThemeStatePatch::key("sbanken").with_dark_mode(true), None);
        assert_eq!(
            f.storage.item("eufemia-theme").as_deref(),
            Some(r#"{"name":"sbanken","size":"large","darkMode":true}"#)
        );
    }

    #[test]
    fn test_persist_failure_keeps_switch() {
        let f = fixture(MockStorage::new().failing_writes());
        let (events, _sub) = record(&f.channel);

        f.switcher.set_theme(&ThemeStatePatch::key("sbanken"), None);

        assert_eq!(events.borrow().len(), 1);
        assert_eq!(f.link.href().as_deref(), Some("/sbanken.3c4d.css"));
    }

    #[test]
    fn test_server_context_does_not_persist() {
        let registry = ThemeRegistry::load(&ThemeHandlerOptions::new(
            [("ui", ThemeConfig::named("DNB Eufemia"))],
            "ui",
        ))
        .unwrap();
        let channel = ThemeEventChannel::new();
        let (events, _sub) = record(&channel);
        let switcher = ThemeSwitcher::new(registry, None, channel, Rc::new(LinkStylesheet::new()));

        switcher.set_theme(&ThemeStatePatch::new().with_size("small"), None);
        assert_eq!(events.borrow()[0].size.as_deref(), Some("small"));
    }
}

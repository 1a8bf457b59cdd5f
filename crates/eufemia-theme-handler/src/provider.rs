//! UI-side view of the active theme.

use std::cell::RefCell;
use std::rc::Rc;

use crate::channel::{ChannelRegistry, Subscription};
use crate::env::RuntimeContext;
use crate::registry::ThemeRegistry;
use crate::resolver::resolve;
use crate::state::ActiveThemeState;

/// Keeps the latest theme state for a rendered tree.
///
/// Starts from [`resolve`] and follows every change published on the
/// theme handler channel until dropped.
#[derive(Debug)]
pub struct ThemeProvider {
    state: Rc<RefCell<ActiveThemeState>>,
    _subscription: Subscription,
}

impl ThemeProvider {
    pub fn new(
        registry: &ThemeRegistry,
        channels: &ChannelRegistry,
        context: Option<&RuntimeContext>,
    ) -> Self {
        let state = Rc::new(RefCell::new(resolve(registry, context)));

        let sink = Rc::clone(&state);
        let subscription = channels.theme_handler().subscribe(move |next| {
            *sink.borrow_mut() = next.clone();
        });

        Self {
            state,
            _subscription: subscription,
        }
    }

    pub fn theme(&self) -> ActiveThemeState {
        self.state.borrow().clone()
    }
}

/// The root element of a page, optionally wrapped in a [`ThemeProvider`].
#[derive(Debug)]
pub struct RootElement<E> {
    pub element: E,
    pub provider: Option<ThemeProvider>,
}

impl<E> RootElement<E> {
    pub fn plain(element: E) -> Self {
        Self {
            element,
            provider: None,
        }
    }

    pub fn wrapped(element: E, provider: ThemeProvider) -> Self {
        Self {
            element,
            provider: Some(provider),
        }
    }

    pub fn is_wrapped(&self) -> bool {
        self.provider.is_some()
    }
}

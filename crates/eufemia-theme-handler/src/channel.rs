//! Publish/subscribe for theme changes.
//!
//! Channels are looked up by name through a [`ChannelRegistry`], so the
//! switcher and any number of UI providers that ask for the same name share
//! one list of subscribers. Delivery is synchronous and in registration order.
//!
//! Every [`subscribe`](ThemeEventChannel::subscribe) returns a
//! [`Subscription`]. Dropping it removes the callback.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::state::ActiveThemeState;

/// Channel name used by the theme handler itself.
pub const THEME_HANDLER_CHANNEL: &str = "themeHandler";

type Callback = Rc<dyn Fn(&ActiveThemeState)>;

#[derive(Default)]
struct Subscribers {
    next_id: u64,
    callbacks: Vec<(u64, Callback)>,
}

/// A named list of theme-change subscribers.
#[derive(Clone, Default)]
pub struct ThemeEventChannel {
    inner: Rc<RefCell<Subscribers>>,
}

impl ThemeEventChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback` until the returned handle is dropped.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&ActiveThemeState) + 'static,
    {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.callbacks.push((id, Rc::new(callback)));

        Subscription {
            id,
            channel: Rc::downgrade(&self.inner),
        }
    }

    /// Delivers `state` to every current subscriber.
    ///
    /// Subscribers may subscribe or unsubscribe from inside their callback;
    /// changes take effect from the next publish.
    pub fn publish(&self, state: &ActiveThemeState) {
        let snapshot: Vec<Callback> = self
            .inner
            .borrow()
            .callbacks
            .iter()
            .map(|(_, cb)| Rc::clone(cb))
            .collect();

        for callback in snapshot {
            callback(state);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().callbacks.len()
    }
}

impl fmt::Debug for ThemeEventChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeEventChannel")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Handle for one registered callback.
pub struct Subscription {
    id: u64,
    channel: Weak<RefCell<Subscribers>>,
}

impl Subscription {
    /// Removes the callback now. Same as dropping the handle.
    pub fn unsubscribe(self) {}

    fn remove(&self) {
        if let Some(inner) = self.channel.upgrade() {
            inner.borrow_mut().callbacks.retain(|(id, _)| *id != self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.remove();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

/// Named channels for one execution context.
#[derive(Clone, Default, Debug)]
pub struct ChannelRegistry {
    channels: Rc<RefCell<HashMap<String, ThemeEventChannel>>>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the channel for `name`, creating it on first use.
    pub fn channel(&self, name: &str) -> ThemeEventChannel {
        self.channels
            .borrow_mut()
            .entry(name.to_string())
            .or_default()
            .clone()
    }

    /// The channel the theme handler publishes on.
    pub fn theme_handler(&self) -> ThemeEventChannel {
        self.channel(THEME_HANDLER_CHANNEL)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    #[test]
    fn test_publish_in_registration_order() {
        let channel = ThemeEventChannel::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let l1 = Rc::clone(&log);
        let _a = channel.subscribe(move |s| l1.borrow_mut().push(format!("a:{}", s.key)));
        let l2 = Rc::clone(&log);
        let _b = channel.subscribe(move |s| l2.borrow_mut().push(format!("b:{}", s.key)));

        channel.publish(&ActiveThemeState::new("sbanken"));
        assert_eq!(*log.borrow(), vec!["a:sbanken", "b:sbanken"]);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let channel = ThemeEventChannel::new();
        let hits = Rc::new(RefCell::new(0));

        let h = Rc::clone(&hits);
        let sub = channel.subscribe(move |_| *h.borrow_mut() += 1);
        channel.publish(&ActiveThemeState::new("ui"));
        assert_eq!(channel.subscriber_count(), 1);

        sub.unsubscribe();
        channel.publish(&ActiveThemeState::new("ui"));
        assert_eq!(*hits.borrow(), 1);
        assert_eq!(channel.subscriber_count(), 0);
    }

    #[test]
    fn test_subscribe_during_publish() {
        let channel = ThemeEventChannel::new();
        let late = Rc::new(RefCell::new(Vec::new()));

        let inner_channel = channel.clone();
        let inner_late = Rc::clone(&late);
        let _sub = channel.subscribe(move |_| {
            let sub = inner_channel.subscribe(|_| {});
            inner_late.borrow_mut().push(sub);
        });

        channel.publish(&ActiveThemeState::new("ui"));
        assert_eq!(channel.subscriber_count(), 2);
    }

    #[test]
    fn test_subscription_outlives_channel() {
        let channel = ThemeEventChannel::new();
        let sub = channel.subscribe(|_| {});
        drop(channel);
        drop(sub);
    }

    #[test]
    fn test_registry_shares_channels_by_name() {
        let registry = ChannelRegistry::new();
        let hits = Rc::new(RefCell::new(0));

        let h = Rc::clone(&hits);
        let _sub = registry.theme_handler().subscribe(move |_| *h.borrow_mut() += 1);
        registry
            .channel(THEME_HANDLER_CHANNEL)
            .publish(&ActiveThemeState::new("ui"));
        registry.channel("other").publish(&ActiveThemeState::new("ui"));

        assert_eq!(*hits.borrow(), 1);
    }
}

//! Document head injection.
//!
//! [`HeadInjector`] runs once per rendered document and leaves the head with
//! a theme `<link>` placeholder, the inline bootstrap script(s) and, when the
//! default theme is not inlined, a `<noscript>` fallback.

mod bootstrap;
mod element;
mod injector;

pub use bootstrap::{js_literal, BootstrapScripts, BuildMode, ScriptValues};
pub use element::{DocumentHead, HeadComponents, HeadElement, DATA_HREF, DATA_IDENTITY};
pub use injector::{dedupe, theme_key_from_href, HeadInjector, FALLBACK_LINK_ID, THEME_LINK_ID};

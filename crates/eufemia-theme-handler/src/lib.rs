//! # Eufemia Theme Handler
//!
//! Build-time and runtime theme switching for multi-brand static sites.
//!
//! A site ships several visual themes, each a bundle of stylesheets. This
//! crate covers three moments of their life:
//!
//! - **Bundling**: style modules are grouped into one chunk per theme
//!   ([`ChunkClassifier`]) and the theme catalog is defined as client
//!   constants ([`ThemePlugin::on_create_bundler_config`]).
//! - **Rendering**: every generated document gets a theme `<link>`
//!   placeholder and an inline bootstrap script that fills it in before first
//!   paint ([`HeadInjector`]).
//! - **Runtime**: the active theme is read from the URL, persisted storage or
//!   the default ([`resolve`]) and can be changed ([`ThemeSwitcher`]), with
//!   subscribers notified through a [`ThemeEventChannel`].
//!
//! ## Quick Start
//!
//! ```rust
//! use eufemia_theme_handler::{
//!     BuildMode, DocumentHead, HeadElement, ThemeHandlerOptions, ThemePlugin,
//! };
//!
//! let options = ThemeHandlerOptions::from_yaml(r#"
//! defaultTheme: ui
//! themes:
//!   ui: { name: DNB Eufemia }
//!   sbanken: { name: Sbanken }
//! "#).unwrap();
//!
//! let mut plugin = ThemePlugin::new(options).unwrap();
//! assert_eq!(plugin.classify_module("/x/style/themes/theme-sbanken"), "sbanken");
//!
//! let mut head = DocumentHead::new(vec![
//!     HeadElement::inline_style("/sbanken.a1b2.css", ".sbanken{}"),
//! ]);
//! plugin.on_pre_render_html(&mut head, BuildMode::Production).unwrap();
//! assert!(head.to_html().contains(r#"id="eufemia-style-theme""#));
//! ```
//!
//! ## Switching Themes
//!
//! ```rust
//! use std::rc::Rc;
//! use eufemia_theme_handler::{
//!     env::{MockStorage, QueryLocation, RuntimeContext},
//!     ChannelRegistry, LinkStylesheet, ThemeHandlerOptions, ThemeRegistry,
//!     ThemeStatePatch, ThemeSwitcher,
//! };
//!
//! let options = ThemeHandlerOptions::from_yaml(
//!     "defaultTheme: ui\nthemes: { ui: {}, sbanken: {} }",
//! ).unwrap();
//! let registry = ThemeRegistry::load(&options).unwrap();
//!
//! let storage = Rc::new(MockStorage::new());
//! let context = RuntimeContext::new(storage.clone(), Rc::new(QueryLocation::empty()));
//! let channels = ChannelRegistry::new();
//! let switcher = ThemeSwitcher::new(
//!     registry,
//!     Some(context),
//!     channels.theme_handler(),
//!     Rc::new(LinkStylesheet::new()),
//! );
//!
//! switcher.set_theme(&ThemeStatePatch::key("sbanken"), None);
//! assert_eq!(switcher.current().key, "sbanken");
//! ```

mod channel;
mod classify;
pub mod config;
pub mod env;
mod error;
pub mod head;
mod plugin;
mod provider;
mod registry;
mod resolver;
mod state;
mod switcher;

pub use channel::{ChannelRegistry, Subscription, ThemeEventChannel, THEME_HANDLER_CHANNEL};
pub use classify::{theme_key_from_path, ChunkClassifier, ThemeDiscovery, DEFAULT_FALLBACK_CHUNK};
pub use config::{ThemeConfig, ThemeHandlerOptions};
pub use error::{StorageError, ThemeError};
pub use head::{BuildMode, DocumentHead, HeadComponents, HeadElement, HeadInjector};
pub use plugin::{BuildStage, BuildSummary, BundlerConfig, ThemePlugin, GLOBAL_PREFIX};
pub use provider::{RootElement, ThemeProvider};
pub use registry::{RuntimeGlobals, ThemeDescriptor, ThemeRegistry};
pub use resolver::resolve;
pub use state::{ActiveThemeState, ThemeStatePatch};
pub use switcher::{LinkStylesheet, StylesheetSwap, SwapDone, ThemeCallback, ThemeSwitcher};

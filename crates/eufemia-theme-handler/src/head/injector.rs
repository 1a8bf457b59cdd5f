//! Head markup for every rendered document.
//!
//! ```text
//! on_render_document
//!   → prepare      (per document: collect theme hrefs, strip inlined themes)
//!   → compute      (first document only: link + scripts + noscript, cached)
//!     or reuse     (later documents: the cached set, verbatim)
//!   → deduplicate  (first data-href wins)
//!   → emit         (replace the document's head)
//! ```
//!
//! The injected set is the same for every page of a build, so it is computed
//! once and kept until [`HeadInjector::reset`].

use std::collections::HashSet;

use tracing::{debug, warn};

use super::bootstrap::{BootstrapScripts, BuildMode, ScriptValues};
use super::element::{HeadComponents, HeadElement, DATA_HREF, DATA_IDENTITY};
use crate::error::ThemeError;
use crate::registry::ThemeRegistry;

/// Id of the link whose `href` the bootstrap script sets.
pub const THEME_LINK_ID: &str = "eufemia-style-theme";

/// Id of the `<noscript>` fallback link.
pub const FALLBACK_LINK_ID: &str = "eufemia-style-theme-fallback";

/// Computes and caches the theme head elements.
#[derive(Debug)]
pub struct HeadInjector {
    inline_default_theme: bool,
    scripts: BootstrapScripts,
    cache: Vec<HeadElement>,
}

impl HeadInjector {
    pub fn new(inline_default_theme: bool) -> Result<Self, ThemeError> {
        Ok(Self {
            inline_default_theme,
            scripts: BootstrapScripts::new()?,
            cache: Vec::new(),
        })
    }

    /// The injected set from the first document, empty before that.
    pub fn cached(&self) -> &[HeadElement] {
        &self.cache
    }

    /// Forgets the cached set. Call between independent builds.
    pub fn reset(&mut self) {
        self.cache.clear();
    }

    /// Rewrites the head of one document.
    ///
    /// # Errors
    ///
    /// Script substitution errors are returned unchanged. They are fatal for
    /// the build: a broken bootstrap script would ship on every page.
    pub fn on_render_document<H>(
        &mut self,
        head: &mut H,
        registry: &mut ThemeRegistry,
        mode: BuildMode,
    ) -> Result<(), ThemeError>
    where
        H: HeadComponents + ?Sized,
    {
        let mut elements = head.head_components();

        let inlined_default = match mode {
            BuildMode::Production => self.prepare_production(&mut elements, registry),
            BuildMode::Development => {
                prepare_development(registry);
                None
            }
        };

        if self.cache.is_empty() {
            self.cache = self.compute(registry, mode)?;
            debug!(elements = self.cache.len(), ?mode, "computed theme head elements");
        }

        elements.extend(self.cache.iter().cloned());
        elements.extend(inlined_default);

        head.replace_head_components(dedupe(elements));
        Ok(())
    }

    /// Records built theme stylesheet URLs and turns inlined theme styles
    /// into plain elements so they load through the bootstrap script.
    ///
    /// Returns the inlined default theme style, removed from `elements`,
    /// when it is to be kept inline.
    fn prepare_production(
        &self,
        elements: &mut Vec<HeadElement>,
        registry: &mut ThemeRegistry,
    ) -> Option<HeadElement> {
        let mut inlined_default = None;
        let mut kept = Vec::with_capacity(elements.len());

        for mut element in elements.drain(..) {
            let Some((key, href)) = element
                .data_href()
                .and_then(|href| theme_key_from_href(href, registry).map(|k| (k, href.to_string())))
            else {
                kept.push(element);
                continue;
            };

            if let Some(descriptor) = registry.get_mut(&key) {
                descriptor.file = Some(href);
            }

            if self.inline_default_theme && key == registry.default_theme() {
                // later copies would survive dedupe ahead of the theme link
                if inlined_default.is_none() {
                    inlined_default = Some(element);
                }
            } else {
                element.remove_attr(DATA_HREF);
                element.remove_attr(DATA_IDENTITY);
                element.take_inner_html();
                kept.push(element);
            }
        }

        *elements = kept;
        inlined_default
    }

    fn compute(&self, registry: &ThemeRegistry, mode: BuildMode) -> Result<Vec<HeadElement>, ThemeError> {
        let values = ScriptValues::new(registry, mode, self.inline_default_theme)?;
        let mut set = Vec::with_capacity(4);

        set.push(
            HeadElement::new("link")
                .with_key("theme-style")
                .with_attr("id", THEME_LINK_ID)
                .with_attr("rel", "stylesheet")
                .with_attr("type", "text/css")
                .with_attr("as", "style"),
        );

        // The dev script must come before the prod script.
        if mode.is_dev() {
            set.push(
                HeadElement::new("script")
                    .with_key("eufemia-style-theme-script-dev")
                    .with_inner_html(self.scripts.render_dev(&values)?),
            );
        }

        set.push(
            HeadElement::new("script")
                .with_key("eufemia-style-theme-script-prod")
                .with_inner_html(self.scripts.render_prod(&values)?),
        );

        if !self.inline_default_theme {
            let mut fallback = HeadElement::new("link")
                .with_attr("id", FALLBACK_LINK_ID)
                .with_attr("rel", "stylesheet")
                .with_attr("type", "text/css")
                .with_attr("as", "style");
            match &registry.default_descriptor().file {
                Some(file) => fallback.set_attr("href", file.clone()),
                None => warn!(
                    theme = registry.default_theme(),
                    "no stylesheet found for the default theme, noscript fallback has no href"
                ),
            }
            set.push(
                HeadElement::new("noscript")
                    .with_key("theme-style-fallback")
                    .with_child(fallback),
            );
        }

        Ok(set)
    }
}

fn prepare_development(registry: &mut ThemeRegistry) {
    for descriptor in registry.iter_mut() {
        descriptor.is_dev = true;
        // served from the dev server's memory, not from the public folder
        descriptor.file = Some(format!("/{}.css", descriptor.key));
    }
}

/// Theme key of a stylesheet URL such as `/sbanken.a1b2c3.css`.
///
/// The file stem (up to the first dot of the last path segment) must equal
/// a registered key.
pub fn theme_key_from_href(href: &str, registry: &ThemeRegistry) -> Option<String> {
    if !href.contains(".css") {
        return None;
    }
    let path = href.split(['?', '#']).next().unwrap_or(href);
    let file = path.rsplit('/').next()?;
    let (stem, _) = file.split_once('.')?;
    registry.is_valid(stem).then(|| stem.to_string())
}

/// Drops elements whose `data-href` was already seen. Elements without one
/// are always kept.
pub fn dedupe(elements: Vec<HeadElement>) -> Vec<HeadElement> {
    let mut seen = HashSet::new();
    elements
        .into_iter()
        .filter(|element| match element.data_href() {
            Some(href) => seen.insert(href.to_string()),
            None => true,
        })
        .collect()
}

//! Build lifecycle hooks.
//!
//! [`ThemePlugin`] owns everything that has to survive from one hook call
//! to the next within a build: the registry (whose descriptors learn their
//! stylesheet URLs), the list of discovered themes and the cached head
//! elements. Create one per build, or call [`reset`](ThemePlugin::reset)
//! before reusing it.
//!
//! ```text
//! ThemePlugin::new           build start, options validated
//!   → on_create_bundler_config   per bundler stage
//!   → classify_module            per style module
//!   → on_pre_render_html         per document
//!   → wrap_root_element          per page tree
//!   → on_post_build              summary
//! ```

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::channel::ChannelRegistry;
use crate::classify::{ChunkClassifier, ThemeDiscovery};
use crate::config::ThemeHandlerOptions;
use crate::env::RuntimeContext;
use crate::error::ThemeError;
use crate::head::{js_literal, BuildMode, HeadComponents, HeadInjector};
use crate::provider::{RootElement, ThemeProvider};
use crate::registry::ThemeRegistry;

/// Prefix of the constants defined in the client bundle.
pub const GLOBAL_PREFIX: &str = "globalThis.EUFEMIA_THEME_";

/// Bundler stages the host runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStage {
    Develop,
    DevelopHtml,
    BuildJavascript,
    BuildHtml,
}

impl BuildStage {
    /// Only stages that emit client stylesheets split them per theme.
    pub fn names_style_chunks(self) -> bool {
        matches!(self, BuildStage::Develop | BuildStage::BuildJavascript)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BuildStage::Develop => "develop",
            BuildStage::DevelopHtml => "develop-html",
            BuildStage::BuildJavascript => "build-javascript",
            BuildStage::BuildHtml => "build-html",
        }
    }
}

impl fmt::Display for BuildStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildStage {
    type Err = ThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "develop" => Ok(BuildStage::Develop),
            "develop-html" => Ok(BuildStage::DevelopHtml),
            "build-javascript" => Ok(BuildStage::BuildJavascript),
            "build-html" => Ok(BuildStage::BuildHtml),
            other => Err(ThemeError::configuration(format!("unknown build stage '{}'", other))),
        }
    }
}

/// What the plugin contributes to one bundler configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundlerConfig {
    /// Constant name → JavaScript literal.
    pub defines: IndexMap<String, String>,
    /// Whether [`ThemePlugin::classify_module`] names style chunks in this stage.
    pub style_chunk_naming: bool,
}

/// Result of a finished build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    /// Themes found while splitting chunks, in discovery order.
    pub themes: Vec<String>,
}

impl BuildSummary {
    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
    }
}

/// The theme handler as seen by the build pipeline.
#[derive(Debug)]
pub struct ThemePlugin {
    options: ThemeHandlerOptions,
    registry: ThemeRegistry,
    classifier: ChunkClassifier,
    discovery: ThemeDiscovery,
    injector: HeadInjector,
}

impl ThemePlugin {
    /// Validates `options` and sets up build state.
    ///
    /// # Errors
    ///
    /// Configuration errors, invalid `filesGlobs`, or bootstrap script
    /// templates that fail to compile.
    pub fn new(options: ThemeHandlerOptions) -> Result<Self, ThemeError> {
        let registry = ThemeRegistry::load(&options)?;
        let classifier = ChunkClassifier::new(&options.files_globs)?;
        let injector = HeadInjector::new(options.inline_default_theme)?;

        Ok(Self {
            options,
            registry,
            classifier,
            discovery: ThemeDiscovery::new(),
            injector,
        })
    }

    /// Replaces the chunk classifier, e.g. to add an explicit asset map.
    pub fn with_classifier(mut self, classifier: ChunkClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn options(&self) -> &ThemeHandlerOptions {
        &self.options
    }

    pub fn registry(&self) -> &ThemeRegistry {
        &self.registry
    }

    pub fn classifier(&self) -> &ChunkClassifier {
        &self.classifier
    }

    pub fn discovered(&self) -> &[String] {
        self.discovery.keys()
    }

    pub fn head_injector(&self) -> &HeadInjector {
        &self.injector
    }

    /// Constants for the client bundle and whether style chunks are named.
    pub fn on_create_bundler_config(&self, stage: BuildStage) -> Result<BundlerConfig, ThemeError> {
        let mut defines = IndexMap::new();
        defines.insert(
            format!("{}defaultTheme", GLOBAL_PREFIX),
            js_literal(self.registry.default_theme())?,
        );
        defines.insert(
            format!("{}themes", GLOBAL_PREFIX),
            js_literal(self.registry.catalog())?,
        );
        defines.insert(
            format!("{}storageId", GLOBAL_PREFIX),
            js_literal(self.registry.storage_id())?,
        );

        Ok(BundlerConfig {
            defines,
            style_chunk_naming: stage.names_style_chunks(),
        })
    }

    /// Chunk name for a style module, given its directory.
    pub fn classify_module(&mut self, module_context: &str) -> String {
        let chunk = self.classifier.classify(module_context, &mut self.discovery);
        if self.options.verbose {
            debug!(module = module_context, chunk = %chunk, "classified style module");
        }
        chunk
    }

    /// Rewrites the head of one rendered document.
    pub fn on_pre_render_html<H>(&mut self, head: &mut H, mode: BuildMode) -> Result<(), ThemeError>
    where
        H: HeadComponents + ?Sized,
    {
        self.injector
            .on_render_document(head, &mut self.registry, mode)
    }

    /// Reports the themes extracted during the build.
    pub fn on_post_build(&self) -> BuildSummary {
        let summary = BuildSummary {
            themes: self.discovery.keys().to_vec(),
        };

        if summary.is_empty() {
            warn!("No Eufemia themes found!");
        } else {
            info!(
                "Eufemia themes successfully extracted: {}",
                summary.themes.join(", ")
            );
        }
        summary
    }

    /// Wraps a page tree in a [`ThemeProvider`] when configured to.
    pub fn wrap_root_element<E>(
        &self,
        element: E,
        channels: &ChannelRegistry,
        context: Option<&RuntimeContext>,
    ) -> RootElement<E> {
        if self.options.wrap_with_theme_provider {
            RootElement::wrapped(element, ThemeProvider::new(&self.registry, channels, context))
        } else {
            RootElement::plain(element)
        }
    }

    /// Clears per-build state so the plugin can serve another build.
    pub fn reset(&mut self) {
        self.discovery.clear();
        self.injector.reset();
        self.registry.clear_build_state();
    }
}

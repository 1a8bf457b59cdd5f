//! Subcommand bodies. Each returns the text printed on stdout.

use std::fmt::Write as _;
use std::path::Path;
use std::rc::Rc;

use anyhow::{Context, Result};

use eufemia_theme_handler::env::{
    FileStorage, Location, QueryLocation, RuntimeContext, UrlLocation,
};
use eufemia_theme_handler::{
    resolve as resolve_theme, BuildMode, BuildStage, ChannelRegistry, DocumentHead, HeadElement,
    LinkStylesheet, ThemeHandlerOptions, ThemePlugin, ThemeRegistry, ThemeStatePatch,
    ThemeSwitcher,
};

pub fn check(options: ThemeHandlerOptions) -> Result<String> {
    let plugin = ThemePlugin::new(options).context("invalid theme options")?;
    let registry = plugin.registry();

    let width = registry.keys().map(str::len).max().unwrap_or(0);
    let mut out = String::new();
    for descriptor in registry.iter() {
        let mut flags = Vec::new();
        if descriptor.key == registry.default_theme() {
            flags.push("default");
        }
        if descriptor.hide {
            flags.push("hidden");
        }
        let _ = write!(out, "{:width$}  {}", descriptor.key, descriptor.name, width = width);
        if !flags.is_empty() {
            let _ = write!(out, " ({})", flags.join(", "));
        }
        out.push('\n');
    }
    let _ = write!(out, "storage id: {}", registry.storage_id());
    Ok(out)
}

pub fn defines(options: ThemeHandlerOptions, stage: BuildStage) -> Result<String> {
    let plugin = ThemePlugin::new(options).context("invalid theme options")?;
    let config = plugin.on_create_bundler_config(stage)?;

    let lines: Vec<String> = config
        .defines
        .iter()
        .map(|(name, value)| format!("{} = {}", name, value))
        .collect();
    Ok(lines.join("\n"))
}

pub fn classify(options: ThemeHandlerOptions, modules: &[String]) -> Result<String> {
    let mut plugin = ThemePlugin::new(options).context("invalid theme options")?;

    let mut out = String::new();
    for module in modules {
        let chunk = plugin.classify_module(module);
        let _ = writeln!(out, "{}\t{}", chunk, module);
    }

    let summary = plugin.on_post_build();
    if summary.is_empty() {
        out.push_str("themes: none");
    } else {
        let _ = write!(out, "themes: {}", summary.themes.join(", "));
    }
    Ok(out)
}

pub fn head(options: ThemeHandlerOptions, mode: BuildMode, styles: &[String]) -> Result<String> {
    let mut plugin = ThemePlugin::new(options).context("invalid theme options")?;

    let mut head = DocumentHead::new(
        styles
            .iter()
            .map(|href| HeadElement::inline_style(href.clone(), ""))
            .collect(),
    );
    plugin
        .on_pre_render_html(&mut head, mode)
        .context("failed to render theme head elements")?;
    Ok(head.to_html())
}

pub fn resolve(
    options: ThemeHandlerOptions,
    storage: Option<&Path>,
    url: Option<&str>,
) -> Result<String> {
    let registry = ThemeRegistry::load(&options).context("invalid theme options")?;
    let context = match storage {
        Some(path) => Some(runtime_context(path, url)?),
        None => None,
    };

    let state = resolve_theme(&registry, context.as_ref());
    Ok(serde_json::to_string(&state)?)
}

pub fn set(options: ThemeHandlerOptions, storage: &Path, patch: &ThemeStatePatch) -> Result<String> {
    let registry = ThemeRegistry::load(&options).context("invalid theme options")?;
    if let Some(key) = &patch.key {
        anyhow::ensure!(registry.is_valid(key), "unknown theme '{}'", key);
    }

    let context = runtime_context(storage, None)?;
    let channels = ChannelRegistry::new();
    let switcher = ThemeSwitcher::new(
        registry,
        Some(context),
        channels.theme_handler(),
        Rc::new(LinkStylesheet::new()),
    );

    switcher.set_theme(patch, None);
    Ok(serde_json::to_string(&switcher.current())?)
}

pub fn patch(
    theme: String,
    variant: Option<String>,
    size: Option<String>,
    dark_mode: Option<bool>,
) -> ThemeStatePatch {
    let mut patch = ThemeStatePatch::key(theme);
    patch.variant = variant;
    patch.size = size;
    patch.dark_mode = dark_mode;
    patch
}

fn runtime_context(storage: &Path, url: Option<&str>) -> Result<RuntimeContext> {
    let location: Rc<dyn Location> = match url {
        Some(url) if url.contains("://") => {
            Rc::new(UrlLocation::parse(url).with_context(|| format!("invalid URL '{}'", url))?)
        }
        Some(search) => Rc::new(QueryLocation::new(search)),
        None => Rc::new(QueryLocation::empty()),
    };
    Ok(RuntimeContext::new(
        Rc::new(FileStorage::new(storage)),
        location,
    ))
}

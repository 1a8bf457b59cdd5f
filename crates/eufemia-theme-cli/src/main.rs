//! `eufemia-theme`: drive the theme handler from a shell.
//!
//! Every subcommand takes the path to a YAML or JSON options file. Runtime
//! commands (`resolve`, `set`) use a JSON file as persistent storage in place
//! of browser local storage.

mod commands;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use eufemia_theme_handler::{BuildMode, BuildStage, ThemeHandlerOptions};

#[derive(Parser)]
#[command(name = "eufemia-theme")]
#[command(about = "Inspect and exercise Eufemia theme handling")]
#[command(version)]
struct Cli {
    /// Log debug output (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate an options file and list its themes
    Check {
        config: PathBuf,
    },
    /// Print the constants defined in the client bundle
    Defines {
        config: PathBuf,

        /// Bundler stage
        #[arg(short, long, default_value = "build-javascript")]
        stage: BuildStage,
    },
    /// Print the chunk name of each style module directory
    Classify {
        config: PathBuf,

        /// Module directories, in bundler order
        #[arg(required = true)]
        modules: Vec<String>,
    },
    /// Print the head markup injected into a rendered document
    Head {
        config: PathBuf,

        /// Render for the development server
        #[arg(long)]
        dev: bool,

        /// Stylesheet URL inlined into the document, repeatable
        #[arg(long = "style", value_name = "HREF")]
        styles: Vec<String>,
    },
    /// Print the theme that would be active
    Resolve {
        config: PathBuf,

        /// JSON file used as persistent storage
        #[arg(long)]
        storage: Option<PathBuf>,

        /// Page URL or search string, e.g. "?eufemia-theme=sbanken"
        #[arg(long)]
        url: Option<String>,
    },
    /// Switch the persisted theme
    Set {
        config: PathBuf,

        theme: String,

        /// JSON file used as persistent storage
        #[arg(long)]
        storage: PathBuf,

        #[arg(long)]
        variant: Option<String>,

        #[arg(long)]
        size: Option<String>,

        #[arg(long)]
        dark_mode: Option<bool>,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_options(path: &Path, verbose: bool) -> Result<ThemeHandlerOptions> {
    let options = ThemeHandlerOptions::from_file(path)
        .with_context(|| format!("failed to load options from {}", path.display()))?;
    debug!(path = %path.display(), themes = options.themes.len(), "loaded options");
    Ok(if verbose { options.with_verbose(true) } else { options })
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let output = match cli.command {
        Commands::Check { config } => commands::check(load_options(&config, cli.verbose)?)?,
        Commands::Defines { config, stage } => {
            commands::defines(load_options(&config, cli.verbose)?, stage)?
        }
        Commands::Classify { config, modules } => {
            commands::classify(load_options(&config, cli.verbose)?, &modules)?
        }
        Commands::Head { config, dev, styles } => {
            let mode = if dev {
                BuildMode::Development
            } else {
                BuildMode::Production
            };
            commands::head(load_options(&config, cli.verbose)?, mode, &styles)?
        }
        Commands::Resolve {
            config,
            storage,
            url,
        } => commands::resolve(
            load_options(&config, cli.verbose)?,
            storage.as_deref(),
            url.as_deref(),
        )?,
        Commands::Set {
            config,
            theme,
            storage,
            variant,
            size,
            dark_mode,
        } => {
            let patch = commands::patch(theme, variant, size, dark_mode);
            commands::set(load_options(&config, cli.verbose)?, &storage, &patch)?
        }
    };

    println!("{}", output);
    Ok(())
}

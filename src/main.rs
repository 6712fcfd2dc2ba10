//! CLI entry point for methodlens.
//!
//! Loads a runtime image, resolves one method into its docstring, source,
//! aliases and visibility, and prints the result as text or JSON.

use anyhow::Context;
use clap::{
    Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use methodlens::display::THEME;
use methodlens::io::{ExitCode, OutputFormat, OutputManager};
use methodlens::reflect::OwnerTable;
use methodlens::{
    DocStore, MethodDescriptor, OwnerKind, ReflectionSurface, Resolver, RuntimeImage, Settings,
    StoreResult,
};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// Method introspection
#[derive(Parser)]
#[command(
    name = "methodlens",
    version = env!("CARGO_PKG_VERSION"),
    about = "Show the docstring, source, aliases and visibility of a method",
    next_line_help = true,
    styles = clap_cargo_style(),
)]
struct Cli {
    /// Path to custom settings.toml file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
enum Commands {
    /// Initialize project
    #[command(about = "Set up .methodlens directory with default configuration")]
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Show current configuration settings
    #[command(about = "Display active settings from .methodlens/settings.toml")]
    Config,

    /// Resolve one method
    #[command(
        about = "Show docstring, source, aliases and visibility of a method",
        after_help = "Examples:\n  methodlens resolve image.json 'Array#map'\n  methodlens resolve image.json Kernel.puts --json\n\nJSON paths:\n  .data.docstring  .data.source  .data.aliases[]  .data.visibility"
    )]
    Resolve {
        /// Runtime image (JSON snapshot of method tables)
        image: PathBuf,

        /// `Owner#name` for instance methods, `Owner.name` for singleton methods
        target: String,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// List owners and bound method names
    #[command(about = "List owners and their bound methods in a runtime image")]
    List {
        /// Runtime image (JSON snapshot of method tables)
        image: PathBuf,

        /// Only show this owner
        #[arg(long)]
        owner: Option<String>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Serialize)]
struct ResolvedMethod {
    method: String,
    #[serde(flatten)]
    descriptor: MethodDescriptor,
}

impl fmt::Display for ResolvedMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let descriptor = &self.descriptor;
        writeln!(
            f,
            "{} {}",
            THEME.apply(&THEME.header, &self.method),
            THEME.visibility(descriptor.visibility)
        )?;
        if !descriptor.aliases.is_empty() {
            let aliases: Vec<&str> = descriptor.aliases.iter().map(String::as_str).collect();
            writeln!(
                f,
                "{} {}",
                THEME.apply(&THEME.dim, "aliases:"),
                aliases.join(", ")
            )?;
        }
        if !descriptor.docstring.is_empty() {
            write!(f, "\n{}", descriptor.docstring)?;
        }
        match &descriptor.source {
            Some(source) => write!(f, "\n{}", source.trim_end()),
            None => write!(f, "\n{}", THEME.apply(&THEME.dim, "(no source available)")),
        }
    }
}

#[derive(Debug, Serialize)]
struct OwnerListing {
    owner: String,
    kind: OwnerKind,
    methods: Vec<String>,
}

impl OwnerListing {
    fn new(owner: String, kind: OwnerKind, table: &OwnerTable) -> Self {
        Self {
            owner,
            kind,
            methods: table.methods().iter().map(|m| m.name.clone()).collect(),
        }
    }
}

impl fmt::Display for OwnerListing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}",
            THEME.apply(&THEME.code, &self.owner),
            THEME.apply(&THEME.dim, format!("({})", self.methods.len()))
        )?;
        for name in &self.methods {
            write!(f, "\n  {name}")?;
        }
        Ok(())
    }
}

fn main() {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(config_path) => match Settings::load_from(config_path) {
            Ok(settings) => settings,
            Err(e) => {
                eprintln!(
                    "Configuration error loading from {}: {e}",
                    config_path.display()
                );
                std::process::exit(ExitCode::ConfigError.into());
            }
        },
        None => Settings::load().unwrap_or_else(|e| {
            eprintln!("Configuration error: {e}");
            eprintln!("Using default configuration.");
            Settings::default()
        }),
    };

    methodlens::logging::init_logging(settings.debug);

    if cli.config.is_none() && !matches!(cli.command, Commands::Init { .. }) {
        if let Err(reason) = Settings::check_init() {
            debug!(%reason, "using default configuration");
        }
    }

    let code = match run(cli.command, &settings) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}", THEME.error_with_icon(&format!("{e:#}")));
            ExitCode::GeneralError
        }
    };
    if !code.is_success() {
        debug!(code = code as u8, "{}", code.description());
    }
    std::process::exit(code.into());
}

fn run(command: Commands, settings: &Settings) -> anyhow::Result<ExitCode> {
    match command {
        Commands::Init { force } => {
            match Settings::init_config_file(force) {
                Ok(path) => {
                    let verb = if force { "Overwrote" } else { "Created" };
                    println!(
                        "{}",
                        THEME.success_with_icon(&format!(
                            "{verb} configuration file at: {}",
                            path.display()
                        ))
                    );
                    println!("Edit this file to customize your settings.");
                    Ok(ExitCode::Success)
                }
                Err(e) => {
                    eprintln!("{}", THEME.error_with_icon(&e.to_string()));
                    Ok(ExitCode::ConfigError)
                }
            }
        }

        Commands::Config => {
            println!("{}", THEME.apply(&THEME.header, "Current Configuration:"));
            println!("{}", "=".repeat(50));
            let toml_str =
                toml::to_string_pretty(settings).context("Error displaying config")?;
            println!("{toml_str}");
            Ok(ExitCode::Success)
        }

        Commands::Resolve {
            image,
            target,
            json,
        } => resolve(settings, &image, &target, OutputFormat::from_json_flag(json)),

        Commands::List { image, owner, json } => {
            list(&image, owner.as_deref(), OutputFormat::from_json_flag(json))
        }
    }
}

fn resolve(
    settings: &Settings,
    image_path: &Path,
    target: &str,
    format: OutputFormat,
) -> anyhow::Result<ExitCode> {
    let mut output = OutputManager::new(format);

    let image = match RuntimeImage::load(image_path) {
        Ok(image) => image,
        Err(e) => {
            let code = ExitCode::from_image_error(&e);
            return Ok(output.failure(code, &e.to_string(), vec!["Check the image path and JSON"])?);
        }
    };

    let handle = image
        .parse_target(target)
        .and_then(|(owner, name)| image.handle(&owner, &name));
    let Some(handle) = handle else {
        return Ok(output.not_found("Method", target)?);
    };

    let resolver = match load_provider(settings) {
        Ok(Some(store)) => Resolver::from_settings(settings).with_provider(Arc::new(store)),
        Ok(None) => Resolver::from_settings(settings),
        Err(e) => {
            let code = ExitCode::from_store_error(&e);
            return Ok(output.failure(
                code,
                &e.to_string(),
                vec![
                    "Fix or remove the documentation store file",
                    "Set fallback.enabled = false to resolve without it",
                ],
            )?);
        }
    };

    match resolver.resolve(&handle) {
        Ok(descriptor) => Ok(output.success(ResolvedMethod {
            method: handle.qualified_name(),
            descriptor,
        })?),
        Err(e) => Ok(output.error(&e)?),
    }
}

/// Documentation store for primitives, if enabled and present.
fn load_provider(settings: &Settings) -> StoreResult<Option<DocStore>> {
    if !settings.fallback.enabled {
        debug!("fallback documentation disabled");
        return Ok(None);
    }
    match &settings.fallback.store_path {
        Some(path) => DocStore::open_optional(path),
        None => Ok(None),
    }
}

fn list(image_path: &Path, only: Option<&str>, format: OutputFormat) -> anyhow::Result<ExitCode> {
    let mut output = OutputManager::new(format);

    let image = match RuntimeImage::load(image_path) {
        Ok(image) => image,
        Err(e) => {
            let code = ExitCode::from_image_error(&e);
            return Ok(output.failure(code, &e.to_string(), vec!["Check the image path and JSON"])?);
        }
    };

    let listings: Vec<OwnerListing> = image
        .owners()
        .into_iter()
        .filter(|owner| only.is_none_or(|name| owner.name == name))
        .filter_map(|owner| {
            let table = image.table(&owner)?;
            Some(OwnerListing::new(owner.to_string(), owner.kind, table))
        })
        .collect();

    Ok(output.collection(listings, "owners")?)
}

//! modkit - local module source reader
//!
//! Usage:
//!   modkit info ./modules/network/vpc               # Show module metadata
//!   modkit fetch ./modules/network/vpc deploy/vpc   # Copy a module into a deployment
//!   modkit classify github.com/org/repo             # Show how a source is read

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use modkit_core::config::ConfigStore;
use modkit_core::fs::hash_tree;
use modkit_core::module::{ModuleInfo, ModuleKind};
use modkit_core::source::{LocalSourceReader, SourceResolver, api_lookup_key, classify_source};

#[derive(Parser)]
#[command(name = "modkit")]
#[command(about = "Resolve and copy local deployment modules", long_about = None)]
struct Cli {
    /// Config file (defaults to $MODKIT_CONFIG, then the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the inputs, outputs and required APIs of a module
    Info {
        /// Module path (./relative, ../relative or /absolute)
        path: String,

        /// Module kind (terraform or packer)
        #[arg(short, long, default_value = "terraform")]
        kind: ModuleKind,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Copy a module into a deployment directory
    Fetch {
        /// Module path (./relative, ../relative or /absolute)
        path: String,

        /// Destination directory
        dest: PathBuf,

        /// Compare tree digests of source and destination after copying
        #[arg(long)]
        verify: bool,
    },

    /// Show how a source string is classified
    Classify {
        /// Module source string
        source: String,
    },
}

#[derive(Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "modkit=info,modkit_core=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    run_cli(cli)
}

fn run_cli(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Info { path, kind, format } => {
            let resolver = load_resolver(cli.config)?;
            run_info(&resolver, &path, kind, format)?;
        }
        Commands::Fetch { path, dest, verify } => {
            let resolver = load_resolver(cli.config)?;
            run_fetch(&resolver, &path, dest, verify)?;
        }
        Commands::Classify { source } => {
            run_classify(&source);
        }
    }
    Ok(())
}

fn load_resolver(config: Option<PathBuf>) -> Result<SourceResolver> {
    let store = match config {
        Some(path) => ConfigStore::from_path(path),
        None => ConfigStore::from_env_or_default()?,
    };
    let config = store
        .load()
        .with_context(|| format!("Failed to load config: {}", store.config_path().display()))?;

    let local = LocalSourceReader::new().with_api_table(config.api_table());
    Ok(SourceResolver::new(local))
}

fn run_info(
    resolver: &SourceResolver,
    path: &str,
    kind: ModuleKind,
    format: OutputFormat,
) -> Result<()> {
    let info = resolver.get_module_info(path, kind)?;
    match format {
        OutputFormat::Table => print_info_table(path, kind, &info),
        OutputFormat::Json => print_info_json(path, kind, &info)?,
    }
    Ok(())
}

fn run_fetch(resolver: &SourceResolver, path: &str, dest: PathBuf, verify: bool) -> Result<()> {
    resolver.get_module(path, &dest)?;
    tracing::info!(module = path, dest = %dest.display(), "module copied");

    if verify {
        let src_hash = hash_tree(Path::new(path))
            .with_context(|| format!("Failed to hash module: {}", path))?;
        let dst_hash = hash_tree(&dest)
            .with_context(|| format!("Failed to hash destination: {}", dest.display()))?;
        if src_hash != dst_hash {
            anyhow::bail!(
                "Copy of {} differs from source (source: {}, destination: {})",
                path,
                src_hash,
                dst_hash
            );
        }
        println!("{} {}", style("verified").green(), dst_hash);
    }
    Ok(())
}

fn run_classify(source: &str) {
    let kind = classify_source(source);
    println!("Source: {}", source);
    println!("Kind:   {}", style(kind).cyan());
    if let Some(key) = api_lookup_key(source) {
        println!("API key: {}", key);
    }
}

fn print_info_json(path: &str, kind: ModuleKind, info: &ModuleInfo) -> Result<()> {
    let output = serde_json::json!({
        "schema_version": 1,
        "source": path,
        "kind": kind,
        "inputs": info.inputs,
        "outputs": info.outputs,
        "required_apis": info.required_apis,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_info_table(path: &str, kind: ModuleKind, info: &ModuleInfo) {
    println!("Module: {} ({})", path, kind);
    if info.required_apis.is_empty() {
        println!("Required APIs: -");
    } else {
        println!("Required APIs: {}", info.required_apis.join(", "));
    }
    println!();

    println!("{} ({}):", style("Inputs").bold(), info.inputs.len());
    if !info.inputs.is_empty() {
        println!(
            "  {:<24} {:<16} {:<9} Description",
            "Name", "Type", "Required"
        );
        println!("  {}", "-".repeat(70));
        for input in &info.inputs {
            let ty = input.type_expr.as_deref().unwrap_or("any");
            // pad before styling, escape codes would count toward the width
            let required = if input.required {
                style(format!("{:<9}", "yes")).yellow().to_string()
            } else {
                format!("{:<9}", "no")
            };
            println!(
                "  {:<24} {:<16} {} {}",
                truncate(&input.name, 24),
                truncate(&single_line(ty), 16),
                required,
                single_line(input.description.as_deref().unwrap_or("-"))
            );
        }
    }
    println!();

    println!("{} ({}):", style("Outputs").bold(), info.outputs.len());
    for output in &info.outputs {
        let marker = if output.sensitive { " (sensitive)" } else { "" };
        println!(
            "  {:<24} {}{}",
            truncate(&output.name, 24),
            single_line(output.description.as_deref().unwrap_or("-")),
            marker
        );
    }
}

fn single_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}

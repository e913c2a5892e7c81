//! scriba - CLI entry point.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::warn;

use scriba::cache::MessageCache;
use scriba::config::{load_config, Config, GeneratorKind, Preset};
use scriba::driver::{run_commit_flow, RunOptions};
use scriba::generator::{self, Generator, RulesGenerator};
use scriba::git::SystemGit;

/// Stage, commit, and push with auto-generated commit messages.
#[derive(Parser, Debug)]
#[command(name = "scriba")]
#[command(about = "Stage, commit, and push with auto-generated commit messages")]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Generation preset
    #[arg(long, value_enum)]
    preset: Option<Preset>,

    /// Override the model to use
    #[arg(long)]
    model: Option<String>,

    /// Show the generated message without committing
    #[arg(long)]
    dry_run: bool,

    /// Stage all modified files before committing
    #[arg(short = 'a', long)]
    add_all: bool,

    /// Skip git hooks for faster commits
    #[arg(long)]
    no_verify: bool,

    /// Push after committing
    #[arg(short = 'p', long)]
    push: bool,

    /// Force push (use with caution)
    #[arg(long)]
    force_push: bool,

    /// Minimal output
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Disable the message cache
    #[arg(long)]
    no_cache: bool,

    /// Cache directory path
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Inspect and maintain the message cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand, Debug)]
enum CacheAction {
    /// Show cache statistics
    Stats,
    /// Delete cache entries (all of them unless --days is given)
    Clear {
        /// Only delete entries older than this many days
        #[arg(long)]
        days: Option<i64>,
    },
    /// Print cache locations
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref());
    apply_cli_overrides(&mut config, &cli);

    if let Some(Command::Cache { action }) = cli.command {
        return run_cache_command(&config, action);
    }

    // The model path degrades to the rule-based generator when the runtime
    // is not installed; the fingerprint still reflects the requested settings.
    let generator: Box<dyn Generator> = match config.settings.generator {
        GeneratorKind::Model => match generator::model::check_ollama_installed().await {
            Ok(()) => generator::select(&config.settings),
            Err(e) => {
                if !cli.quiet {
                    eprintln!("{e}");
                    eprintln!("Falling back to rule-based generation");
                }
                Box::new(RulesGenerator)
            }
        },
        GeneratorKind::Rules => generator::select(&config.settings),
    };

    let cache = if cli.no_cache {
        None
    } else {
        match MessageCache::open(&config.cache_dir) {
            Ok(c) => Some(c),
            Err(e) => {
                warn!("Cache unavailable, generating without caching: {e}");
                None
            }
        }
    };

    let opts = RunOptions {
        add_all: cli.add_all,
        push: cli.push,
        force_push: cli.force_push,
        no_verify: cli.no_verify,
        dry_run: cli.dry_run,
        quiet: cli.quiet,
    };

    let outcome =
        run_commit_flow(&config, &opts, &SystemGit::default(), generator.as_ref(), cache.as_ref()).await?;

    if !outcome.committed {
        println!("\nGenerated commit message:\n{}", outcome.message);
    }

    Ok(())
}

/// Apply CLI flags over the file/preset configuration.
fn apply_cli_overrides(config: &mut Config, cli: &Cli) {
    if let Some(preset) = cli.preset {
        config.preset = preset;
        config.settings = preset.settings();
    }
    if let Some(ref model) = cli.model {
        config.settings.model = model.clone();
        config.settings.generator = GeneratorKind::Model;
    }
    if let Some(ref cache_dir) = cli.cache_dir {
        config.cache_dir = cache_dir.clone();
    }
}

/// Handle `scriba cache <action>`.
fn run_cache_command(config: &Config, action: CacheAction) -> Result<()> {
    let cache =
        MessageCache::open(&config.cache_dir).context("Failed to open cache directory")?;

    match action {
        CacheAction::Stats => {
            let stats = cache.stats().context("Failed to collect cache stats")?;
            println!("Cache statistics:");
            println!("  Directory: {}", cache.root().display());
            println!("  Entries: {}", stats.entries);
            println!(
                "  Total size: {:.2} KiB",
                stats.total_size_bytes as f64 / 1024.0
            );
            if let Some(oldest) = stats.oldest {
                println!("  Oldest: {}", oldest.format("%Y-%m-%d %H:%M:%S UTC"));
            }
            if let Some(newest) = stats.newest {
                println!("  Newest: {}", newest.format("%Y-%m-%d %H:%M:%S UTC"));
            }
            if !stats.presets.is_empty() {
                println!("  Presets:");
                for (preset, count) in &stats.presets {
                    println!("    {preset}: {count} entries");
                }
            }
        }
        CacheAction::Clear { days } => {
            let older_than = days.map(chrono::Duration::days);
            let removed = cache.clear(older_than).context("Failed to clear cache")?;
            match days {
                Some(days) => println!("Cleared {removed} entries older than {days} days"),
                None => println!("Cleared {removed} entries"),
            }
        }
        CacheAction::Show => {
            println!("Cache directory: {}", cache.root().display());
            println!("Entries: {}", cache.entries_dir().display());
            println!("Index: {}", cache.root().join("index.json").display());
        }
    }

    Ok(())
}

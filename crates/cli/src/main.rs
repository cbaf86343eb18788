//! dirwatch CLI - watch a directory and report when it changes

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use dirwatch::DirectoryWatcher;
use owo_colors::OwoColorize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn, Level};

mod config;
mod reporter;

use config::Config;
use reporter::ChangeReporter;

/// dirwatch - get told when a directory's contents change
#[derive(Parser)]
#[command(name = "dirwatch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (default: <config dir>/dirwatch/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch a directory and print a line whenever it changes
    Watch {
        /// Directory to watch (default: watch.path from the config)
        path: Option<PathBuf>,

        /// Milliseconds between checks (default: watch.poll_interval_ms)
        #[arg(short, long)]
        interval_ms: Option<u64>,

        /// Exit after this many change notifications
        #[arg(long)]
        max_changes: Option<usize>,
    },
    /// Show or edit the configuration
    Config {
        /// Print the config file location
        #[arg(long)]
        path: bool,

        /// Create the config file from the example if it doesn't exist
        #[arg(long)]
        create: bool,

        /// Print an example config file
        #[arg(long)]
        example: bool,

        /// Set a value, e.g. --set watch.poll_interval_ms=500
        #[arg(long, value_name = "KEY=VALUE")]
        set: Option<String>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().or_else(config::config_file_path);
    let config = config::load(config_path.as_deref())?;

    let level = match cli.verbose {
        0 => config.log_level()?,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Watch {
            path,
            interval_ms,
            max_changes,
        } => run_watch(&config, path, interval_ms, max_changes).await,
        Commands::Config {
            path,
            create,
            example,
            set,
        } => {
            if example {
                print!("{}", config::example_config());
                Ok(())
            } else if let Some(assignment) = set {
                run_config_set(config, config_path, &assignment)
            } else if path || create {
                run_config_path(config_path, create)
            } else {
                run_config_list(&config, config_path)
            }
        }
    }
}

async fn run_watch(
    config: &Config,
    path: Option<PathBuf>,
    interval_ms: Option<u64>,
    max_changes: Option<usize>,
) -> Result<()> {
    let path = path
        .or_else(|| config.watch.path.clone())
        .context("No directory to watch: pass a path or set watch.path in the config")?;
    let interval_ms = interval_ms.unwrap_or(config.watch.poll_interval_ms);
    if interval_ms == 0 {
        anyhow::bail!("--interval-ms must be greater than zero");
    }

    let reporter = Arc::new(ChangeReporter::default());
    let mut watcher = DirectoryWatcher::new();
    watcher.set_callback(&reporter);
    watcher
        .watch(&path)
        .with_context(|| format!("Failed to watch {}", path.display()))?;

    let native = watcher.is_watching();
    if !native {
        warn!(
            "{} backend active: no native change notification on this platform, no changes will be reported",
            watcher.backend_name()
        );
    }

    info!("Checking {} every {}ms", path.display(), interval_ms);

    let mut ticker = tokio::time::interval(Duration::from_millis(interval_ms));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                watcher.process();

                if max_changes.is_some_and(|max| reporter.count() >= max) {
                    break;
                }
                if native && !watcher.is_watching() {
                    anyhow::bail!("Stopped watching {}: change subscription was lost", path.display());
                }
            }
            res = &mut shutdown => {
                res.context("Failed to listen for Ctrl+C")?;
                info!("Interrupted, stopping");
                break;
            }
        }
    }

    watcher.unwatch();
    info!("Reported {} change(s)", reporter.count());
    Ok(())
}

fn run_config_list(config: &Config, config_path: Option<PathBuf>) -> Result<()> {
    println!("{}", "dirwatch Configuration".bold());
    match &config_path {
        Some(p) if p.exists() => println!("{}: {}\n", "Location".dimmed(), p.display().dimmed()),
        Some(p) => println!(
            "{}: {} {}\n",
            "Location".dimmed(),
            p.display().dimmed(),
            "(not created, using defaults)".yellow()
        ),
        None => println!("{}\n", "No config directory on this system, using defaults".yellow()),
    }

    println!("{}", "[watch]".yellow());
    println!(
        "  {} = {}",
        "path".cyan(),
        config
            .watch
            .path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(unset)".dimmed().to_string())
    );
    println!(
        "  {} = {} {}",
        "poll_interval_ms".cyan(),
        config.watch.poll_interval_ms,
        format!("({:.1}s)", config.watch.poll_interval_ms as f64 / 1000.0).dimmed()
    );

    println!("\n{}", "[log]".yellow());
    println!("  {} = {}", "level".cyan(), config.log.level);

    Ok(())
}

fn run_config_path(config_path: Option<PathBuf>, create: bool) -> Result<()> {
    let config_path = config_path.context("Could not determine config file path")?;

    if create && config::init_if_missing(&config_path)? {
        println!("{} Created config file at: {}", "✓".green(), config_path.display());
    } else {
        println!("{}", config_path.display());
        if !config_path.exists() {
            println!("{}", "File does not exist. Use --create to create it.".yellow());
        }
    }

    Ok(())
}

fn run_config_set(mut config: Config, config_path: Option<PathBuf>, assignment: &str) -> Result<()> {
    let config_path = config_path.context("Could not determine config file path")?;
    let (key, value) = assignment
        .split_once('=')
        .context("Expected KEY=VALUE, e.g. watch.poll_interval_ms=500")?;

    config::set_value(&mut config, key.trim(), value.trim())?;
    config::save(&config, &config_path)?;

    println!("{} {} = {}", "✓".green(), key.trim().cyan(), value.trim());
    Ok(())
}

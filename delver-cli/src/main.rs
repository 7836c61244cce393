//! Delver CLI — run iterative deep research from the terminal.

use anyhow::{Context, bail};
use clap::Parser;
use delver_core::{DelverConfig, OllamaProvider, ResearchEngine};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Delver: iterative web research with a local LLM
#[derive(Parser, Debug)]
#[command(name = "delver", version, about, long_about = None)]
struct Cli {
    /// Research topic (omit when using a subcommand)
    topic: Option<String>,

    /// Configuration file path (defaults to ./delver.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the research loop budget
    #[arg(long)]
    max_loops: Option<u32>,

    /// Override the search backend (duckduckgo, tavily, perplexity, searxng)
    #[arg(long)]
    search_api: Option<String>,

    /// Fetch full page content for each search result
    #[arg(long)]
    fetch_full_page: bool,

    /// Score and reorder sources by credibility
    #[arg(long)]
    verify_sources: bool,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long)]
    quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Subcommand, Debug)]
enum ConfigAction {
    /// Write a delver.toml with default settings
    Init,
    /// Print the effective configuration
    Show,
}

fn init_tracing(verbose: u8, quiet: bool) {
    let default_level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("delver={default_level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let mut config =
        DelverConfig::load(cli.config.as_deref()).context("failed to load configuration")?;

    // CLI flags override file and environment settings.
    if let Some(max_loops) = cli.max_loops {
        config.research.max_web_research_loops = max_loops;
    }
    if let Some(search_api) = &cli.search_api {
        config.research.search_api = search_api.clone();
    }
    if cli.fetch_full_page {
        config.research.fetch_full_page = true;
    }
    if cli.verify_sources {
        config.research.enable_source_verification = true;
    }

    match cli.command {
        Some(Commands::Config { action }) => run_config(action, &config),
        None => {
            let Some(topic) = cli.topic else {
                bail!("a research topic is required; see `delver --help`");
            };
            run_research(&topic, config, cli.output.as_deref()).await
        }
    }
}

fn run_config(action: ConfigAction, config: &DelverConfig) -> anyhow::Result<()> {
    match action {
        ConfigAction::Init => {
            let path = PathBuf::from(delver_core::config::CONFIG_FILE);
            if path.exists() {
                bail!("{} already exists", path.display());
            }
            let text = toml::to_string_pretty(&DelverConfig::default())
                .context("failed to serialize default configuration")?;
            std::fs::write(&path, text)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Wrote {}", path.display());
            Ok(())
        }
        ConfigAction::Show => {
            let text = toml::to_string_pretty(config)
                .context("failed to serialize configuration")?;
            print!("{text}");
            Ok(())
        }
    }
}

async fn run_research(
    topic: &str,
    config: DelverConfig,
    output: Option<&std::path::Path>,
) -> anyhow::Result<()> {
    let llm = OllamaProvider::new(&config.llm).context("failed to create LLM provider")?;
    let engine = ResearchEngine::new(config, Arc::new(llm));

    let report = engine
        .run(topic)
        .await
        .context("research run failed")?;

    match output {
        Some(path) => {
            std::fs::write(path, &report)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("Report written to {}", path.display());
        }
        None => println!("{report}"),
    }
    Ok(())
}

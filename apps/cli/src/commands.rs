//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use chrono::Utc;
use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use relchron_catalog::{build_catalog, read_catalog, write_catalog};
use relchron_feed::FeedClient;
use relchron_resolver::resolve_document_file;
use relchron_shared::{AppConfig, init_config, load_config, resolve_token};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// relchron — map feature milestones to the releases that shipped them.
#[derive(Parser)]
#[command(
    name = "relchron",
    version,
    about = "Build release version catalogs and resolve feature milestones to versions.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Build version catalogs for all configured sources.
    Build {
        /// Minimum trailing window in days (overrides config).
        #[arg(long)]
        window_days: Option<i64>,

        /// Output directory for catalog documents (overrides config).
        #[arg(short, long)]
        out: Option<String>,
    },

    /// Resolve milestone documents against a built catalog.
    Resolve {
        /// Catalog document to resolve against (defaults to the first
        /// configured source's output).
        #[arg(long)]
        catalog: Option<String>,

        /// Target surface name (overrides config).
        #[arg(long)]
        surface: Option<String>,

        /// Milestone document path(s) (overrides config; repeatable).
        #[arg(long = "doc")]
        docs: Vec<String>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "relchron=info",
        1 => "relchron=debug",
        _ => "relchron=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt().with_env_filter(env_filter).with_target(false).init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Build { window_days, out } => cmd_build(window_days, out.as_deref()).await,
        Command::Resolve {
            catalog,
            surface,
            docs,
        } => cmd_resolve(catalog.as_deref(), surface.as_deref(), &docs).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// build
// ---------------------------------------------------------------------------

async fn cmd_build(window_days: Option<i64>, out: Option<&str>) -> Result<()> {
    let mut config = load_config()?;
    if let Some(days) = window_days {
        config.build.window_days = days;
    }
    if let Some(dir) = out {
        config.build.output_dir = dir.to_string();
    }

    if config.sources.is_empty() {
        return Err(eyre!(
            "no sources configured — add [[sources]] entries to the config file \
             (run `relchron config init` to create one)"
        ));
    }

    let token = resolve_token(&config);
    if token.is_none() {
        info!(
            env = %config.feed.token_env,
            "no feed token in environment, using unauthenticated rate limits"
        );
    }
    let client = FeedClient::new(config.feed.api_base.clone(), token)?;

    let spinner = new_spinner();
    let now = Utc::now();

    for source in &config.sources {
        spinner.set_message(format!(
            "Building catalog for {}/{}",
            source.owner, source.repo
        ));

        let catalog = build_catalog(
            &client,
            &source.owner,
            &source.repo,
            config.build.window_days,
            now,
        )
        .await?;

        let path = source.output_path(&config.build);
        write_catalog(&path, &catalog)?;

        spinner.println(format!(
            "  {}/{}: {} versions -> {}",
            source.owner,
            source.repo,
            catalog.versions.len(),
            path.display()
        ));
    }

    spinner.finish_and_clear();
    println!();
    println!(
        "  Built {} catalog(s), trailing window {} days.",
        config.sources.len(),
        config.build.window_days
    );
    println!();

    Ok(())
}

// ---------------------------------------------------------------------------
// resolve
// ---------------------------------------------------------------------------

async fn cmd_resolve(
    catalog_path: Option<&str>,
    surface: Option<&str>,
    docs: &[String],
) -> Result<()> {
    let config = load_config()?;

    let catalog_path = match catalog_path {
        Some(p) => PathBuf::from(p),
        None => config
            .sources
            .first()
            .map(|s| s.output_path(&config.build))
            .ok_or_else(|| eyre!("no catalog given and no sources configured"))?,
    };
    let surface = surface.unwrap_or(&config.resolve.surface);
    let docs: Vec<&str> = if docs.is_empty() {
        config.resolve.docs.iter().map(String::as_str).collect()
    } else {
        docs.iter().map(String::as_str).collect()
    };

    if docs.is_empty() {
        return Err(eyre!(
            "no milestone documents given — pass --doc or set [resolve].docs in the config"
        ));
    }

    let catalog = read_catalog(&catalog_path)?;
    info!(
        catalog = %catalog_path.display(),
        versions = catalog.versions.len(),
        surface,
        "resolving milestone documents"
    );

    let mut changed = 0usize;
    for doc in &docs {
        let path = PathBuf::from(doc);
        if resolve_document_file(&path, &catalog.versions, surface)? {
            println!("  updated {doc}");
            changed += 1;
        }
    }

    println!();
    println!("  {changed} of {} document(s) changed.", docs.len());
    println!();

    Ok(())
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Progress spinner
// ---------------------------------------------------------------------------

fn new_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner
}

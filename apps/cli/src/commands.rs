//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use folio_core::chat::{ChatClient, ChatConfig};
use folio_core::deploy::{DeployOutcome, DeployProgress, DeployResult, PublishConfig};
use folio_core::pipeline::{self, GenerateConfig};
use folio_core::projects::SyncConfig;
use folio_shared::{AppConfig, init_config, load_config};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// folio: a YAML-driven profile README generator and portfolio backend.
#[derive(Parser)]
#[command(
    name = "folio",
    version,
    about = "Render a profile README from YAML section documents, publish it, and serve the portfolio API.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
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
    /// Render the README from the section documents.
    Generate {
        /// Directory holding the YAML section documents.
        #[arg(long)]
        config_dir: Option<PathBuf>,

        /// README path to write.
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Generate the README and push it to the profile repository.
    Deploy {
        /// Profile repository as owner/name.
        #[arg(long)]
        repo: Option<String>,

        /// Branch to push to.
        #[arg(long)]
        branch: Option<String>,

        /// Commit subject (the date is appended).
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Merge public repositories into project.yaml.
    SyncProjects {
        /// Organization or user whose repositories are listed.
        #[arg(long)]
        username: Option<String>,
    },

    /// Start the HTTP server.
    Serve {
        /// Port to listen on.
        #[arg(short, long)]
        port: Option<u16>,

        /// libSQL database file for location reports.
        #[arg(long)]
        db: Option<PathBuf>,
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
        0 => "folio=info",
        1 => "folio=debug,tower_http=debug",
        _ => "folio=trace,tower_http=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Generate { config_dir, out } => cmd_generate(config_dir, out),
        Command::Deploy {
            repo,
            branch,
            message,
        } => cmd_deploy(repo, branch, message),
        Command::SyncProjects { username } => cmd_sync_projects(username).await,
        Command::Serve { port, db } => cmd_serve(port, db).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_generate(config_dir: Option<PathBuf>, out: Option<PathBuf>) -> Result<()> {
    let mut config = load_config()?;
    if let Some(dir) = config_dir {
        config.paths.config_dir = dir;
    }
    if let Some(out) = out {
        config.paths.output_file = out;
    }

    let generate = GenerateConfig::from_app(&config);
    info!(config_dir = %generate.config_dir.display(), "generating README");

    let result = pipeline::generate_readme(&generate, pipeline::today())?;

    println!();
    println!("  README generated successfully!");
    println!("  Path:      {}", result.output_file.display());
    println!("  Lines:     {}", result.line_count);
    println!("  Documents: {}", result.document_count);
    if !result.failures.is_empty() {
        println!("  Skipped:");
        for failure in &result.failures {
            println!("    {}: {}", failure.file_name, failure.error);
        }
    }
    println!("  Time:      {:.1}s", result.elapsed.as_secs_f64());
    println!();

    Ok(())
}

fn cmd_deploy(
    repo: Option<String>,
    branch: Option<String>,
    message: Option<String>,
) -> Result<()> {
    let mut config = load_config()?;
    if let Some(repo) = repo {
        config.deploy.profile_repo = repo;
    }
    if let Some(branch) = branch {
        config.deploy.branch = branch;
    }
    if let Some(message) = message {
        config.deploy.commit_message = message;
    }

    let publish = PublishConfig::from_app(&config);
    info!(repo = %publish.profile_repo, branch = %publish.branch, "deploying profile README");

    let reporter = CliProgress::new();
    let result = folio_core::deploy::deploy_profile(&publish, pipeline::today(), &reporter)?;

    println!();
    match &result.outcome {
        DeployOutcome::Pushed { commit_message } => {
            println!("  Profile README deployed!");
            println!("  Repo:    {}", publish.profile_repo);
            println!("  Commit:  {commit_message}");
        }
        DeployOutcome::UpToDate => {
            println!("  Profile README is already up to date.");
        }
    }
    println!("  Lines:   {}", result.line_count);
    println!("  Time:    {:.1}s", result.elapsed.as_secs_f64());
    if !config.deploy.github_username.is_empty() {
        println!("  View:    https://github.com/{}", config.deploy.github_username);
    }
    println!();

    Ok(())
}

async fn cmd_sync_projects(username: Option<String>) -> Result<()> {
    let mut config = load_config()?;
    if let Some(username) = username {
        config.github.username = username;
    }

    let sync = SyncConfig::from_app(&config)?;

    let chat = match ChatConfig::for_enhancement(&config).and_then(ChatClient::new) {
        Ok(client) => Some(client),
        Err(e) => {
            warn!(error = %e, "description enhancement disabled, using repository descriptions");
            None
        }
    };

    info!(username = %sync.username, "syncing projects");
    let result = folio_core::projects::sync_projects(&sync, chat.as_ref()).await?;

    println!();
    println!("  Projects synced!");
    println!("  Fetched:  {}", result.fetched);
    println!("  Existing: {}", result.existing);
    println!("  Added:    {}", result.added.len());
    for name in &result.added {
        println!("    + {name}");
    }
    println!("  Skipped:  {}", result.skipped.len());
    println!("  File:     {}", sync.project_file.display());
    println!();

    Ok(())
}

async fn cmd_serve(port: Option<u16>, db: Option<PathBuf>) -> Result<()> {
    let mut config = load_config()?;
    if let Some(port) = port {
        config.server.port = port;
    }
    if let Some(db) = db {
        config.server.db_path = db;
    }

    let state = folio_server::AppState::from_app(&config).await?;
    println!("Starting server on http://localhost:{}/api", config.server.port);

    folio_server::serve(state, config.server.port).await?;
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// Deploy progress shown as an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl DeployProgress for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn done(&self, _result: &DeployResult) {
        self.spinner.finish_and_clear();
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_generate_overrides() {
        let cli = Cli::try_parse_from(["folio", "generate", "--config-dir", "cfg", "-o", "out.md"])
            .unwrap();
        match cli.command {
            Command::Generate { config_dir, out } => {
                assert_eq!(config_dir, Some(PathBuf::from("cfg")));
                assert_eq!(out, Some(PathBuf::from("out.md")));
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["folio", "serve", "--port", "8080", "-vv", "--log-format", "json"])
            .unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.log_format, LogFormat::Json));
        assert!(matches!(cli.command, Command::Serve { port: Some(8080), db: None }));
    }

    #[test]
    fn sync_projects_is_kebab_case() {
        let cli = Cli::try_parse_from(["folio", "sync-projects", "--username", "octo"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::SyncProjects { username: Some(ref u) } if u == "octo"
        ));
    }
}

//! folio CLI: build a static personal homepage from templates and data files.
//!
//! `init` scaffolds a site, `sync` refreshes repository metadata from GitHub,
//! `scholar` regenerates the BibTeX bibliography from Google Scholar, `check`
//! validates everything without writing, and `build` renders every page into the
//! output directory.

mod commands;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "folio",
    about = "Static homepage builder: Handlebars templates + YAML data",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to folio.config.json (default: ./folio.config.json)
    #[arg(long, global = true, default_value = folio_core::config::CONFIG_FILE)]
    config: PathBuf,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new site from the starter templates
    Init {
        /// Site name (creates a directory with this name)
        name: String,

        /// GitHub account shown in the profile and repository sections
        #[arg(long)]
        account: Option<String>,
    },

    /// Render every page into the output directory
    Build {
        /// Remove the output directory before building
        #[arg(long)]
        clean: bool,
    },

    /// Validate config, templates and data without writing anything
    Check,

    /// Refresh repository metadata in _data/repositories.yml from GitHub
    Sync {
        /// GitHub token with read access to the listed repositories
        #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
        token: Option<String>,

        /// GitHub API root
        #[arg(long, hide = true, default_value = folio_github::client::API_BASE_URL)]
        api_url: String,
    },

    /// Regenerate _bibliography/papers.bib from the Google Scholar profile in _data/socials.yml
    Scholar {
        /// SerpAPI key (SERPAPI_KEY is also read when this is unset)
        #[arg(long, env = "SERPAPI_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// SerpAPI root
        #[arg(long, hide = true, default_value = folio_scholar::client::API_BASE_URL)]
        api_url: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Init { name, account } => {
            commands::init::run(&name, account).await?;
        }
        Commands::Build { clean } => {
            commands::build::run(&cli.config, clean).await?;
        }
        Commands::Check => {
            commands::check::run(&cli.config).await?;
        }
        Commands::Sync { token, api_url } => {
            commands::sync::run(&cli.config, token.as_deref(), &api_url).await?;
        }
        Commands::Scholar { api_key, api_url } => {
            commands::scholar::run(&cli.config, api_key, &api_url).await?;
        }
    }

    Ok(())
}

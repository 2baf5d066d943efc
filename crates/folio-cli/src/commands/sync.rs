use std::path::Path;

use anyhow::{Context, Result};

use folio_core::project;
use folio_github::{sync_repositories, GitHubClient, SyncOutcome};

use crate::output;

/// Refresh `github_repos_metadata` in the site's repositories data file.
pub async fn run(config_path: &Path, token: Option<&str>, api_url: &str) -> Result<()> {
    output::print_header("folio sync");

    let (root, config) = project::load_site(config_path)?;
    let data_dir = root.join(&config.paths.data);
    tracing::debug!("syncing data in {}", data_dir.display());

    let token = token.map(str::trim).filter(|t| !t.is_empty()).context(
        "missing GitHub token; pass --token or export GITHUB_TOKEN with a token \
         that can read your repositories",
    )?;
    let client = GitHubClient::with_base_url(token, api_url)?;

    let pb = output::spinner("Fetching repository metadata from GitHub...");
    let outcome = sync_repositories(&data_dir, &client).await;
    pb.finish_and_clear();

    match outcome? {
        SyncOutcome::NoRepositories => output::print_warning(
            "No repositories found; populate 'github_users' or 'github_repos' in _data/repositories.yml",
        ),
        SyncOutcome::Unchanged { repositories } => {
            output::print_success(&format!(
                "Metadata for {repositories} repositories already up to date"
            ));
        }
        SyncOutcome::Updated { repositories, path } => {
            output::print_success(&format!("Saved metadata for {repositories} repositories"));
            output::print_key_value("File", &path.display().to_string());
        }
    }
    Ok(())
}

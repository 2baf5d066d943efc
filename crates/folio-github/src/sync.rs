//! Refresh `_data/repositories.yml` from the GitHub API.
//!
//! The file keeps its hand-edited inputs (`github_users`, `github_repos`, any other
//! keys) and gains a `github_repos_metadata` list the renderer reads.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};

use folio_core::data::{RepositoriesFile, RepositoryEntry, REPOSITORIES_FILE};

use crate::client::GitHubClient;
use crate::error::{Result, SyncError};

/// Default for `repo_description_lines_max` when the file does not set it.
pub const DEFAULT_DESCRIPTION_LINES: u64 = 2;

const LEADING_KEYS: [&str; 4] = [
    "github_users",
    "repo_description_lines_max",
    "github_repos",
    "github_repos_metadata",
];

/// What a sync did to the data file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Neither `github_repos` nor `github_users` named anything.
    NoRepositories,
    /// Fetched metadata matched the file; nothing written.
    Unchanged { repositories: usize },
    /// The file was rewritten.
    Updated { repositories: usize, path: PathBuf },
}

/// Raw top-level mapping plus its typed view.
#[derive(Debug, Clone)]
pub struct RepositoryData {
    pub raw: Mapping,
    pub file: RepositoriesFile,
}

/// Read `repositories.yml`. Missing, empty or unparseable files are errors; a bad
/// value inside an otherwise valid file is skipped with a warning.
pub fn load_data(path: &Path) -> Result<RepositoryData> {
    if !path.exists() {
        return Err(SyncError::MissingDataFile(path.to_path_buf()));
    }
    let text = std::fs::read_to_string(path)?;
    if text.is_empty() {
        return Err(SyncError::EmptyDataFile(path.to_path_buf()));
    }

    let raw: Mapping = serde_yaml::from_str::<Option<Mapping>>(&text)
        .map_err(|source| SyncError::DataParse {
            path: path.to_path_buf(),
            source,
        })?
        .unwrap_or_default();
    let file = RepositoriesFile::from_mapping(&raw, path);

    Ok(RepositoryData { raw, file })
}

/// Manual `github_repos` first, then every repository owned by each user, de-duplicated.
pub async fn resolve_repositories(
    file: &RepositoriesFile,
    client: &GitHubClient,
) -> Result<Vec<String>> {
    let mut resolved: Vec<String> = file
        .github_repos
        .iter()
        .filter(|slug| !slug.trim().is_empty())
        .cloned()
        .collect();
    let mut seen: HashSet<String> = resolved.iter().cloned().collect();

    for user in &file.github_users {
        for slug in client.fetch_user_repositories(user).await? {
            if seen.insert(slug.clone()) {
                resolved.push(slug);
            }
        }
    }
    Ok(resolved)
}

/// Fetch metadata for each slug, in order. The first failure aborts the sync.
pub async fn fetch_metadata(
    slugs: &[String],
    client: &GitHubClient,
) -> Result<Vec<RepositoryEntry>> {
    let mut metadata = Vec::with_capacity(slugs.len());
    for slug in slugs {
        let entry = client.fetch_repo(slug).await?;
        tracing::info!("fetched metadata for {}", entry.slug.as_deref().unwrap_or(slug));
        metadata.push(entry);
    }
    Ok(metadata)
}

/// Build the new top-level mapping: the four repository keys first, then every
/// other key of `raw` in its original order.
pub fn merge(raw: &Mapping, repos: &[String], metadata: &[RepositoryEntry]) -> Result<Mapping> {
    let key = |name: &str| Value::String(name.to_string());

    let users = raw
        .get("github_users")
        .filter(|value| !value.is_null())
        .cloned()
        .unwrap_or_else(|| Value::Sequence(Vec::new()));
    let lines = raw
        .get("repo_description_lines_max")
        .filter(|value| !value.is_null())
        .cloned()
        .unwrap_or_else(|| Value::Number(DEFAULT_DESCRIPTION_LINES.into()));

    let mut merged = Mapping::new();
    merged.insert(key(LEADING_KEYS[0]), users);
    merged.insert(key(LEADING_KEYS[1]), lines);
    merged.insert(key(LEADING_KEYS[2]), serde_yaml::to_value(repos).map_err(to_io)?);
    merged.insert(key(LEADING_KEYS[3]), serde_yaml::to_value(metadata).map_err(to_io)?);

    for (name, value) in raw {
        let leading = name.as_str().is_some_and(|name| LEADING_KEYS.contains(&name));
        if !leading {
            merged.insert(name.clone(), value.clone());
        }
    }
    Ok(merged)
}

fn to_io(err: serde_yaml::Error) -> SyncError {
    SyncError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, err))
}

/// Run a full sync of `<data_dir>/repositories.yml`.
pub async fn sync_repositories(data_dir: &Path, client: &GitHubClient) -> Result<SyncOutcome> {
    let path = data_dir.join(REPOSITORIES_FILE);
    let data = load_data(&path)?;

    let repos = resolve_repositories(&data.file, client).await?;
    if repos.is_empty() {
        tracing::warn!(
            "no repositories found; populate 'github_users' or 'github_repos' in {}",
            path.display()
        );
        return Ok(SyncOutcome::NoRepositories);
    }

    let metadata = fetch_metadata(&repos, client).await?;
    let repositories = metadata.len();

    if data.file.github_repos_metadata == metadata && data.file.github_repos == repos {
        tracing::info!("repository metadata already up to date, skipping write");
        return Ok(SyncOutcome::Unchanged { repositories });
    }

    let merged = merge(&data.raw, &repos, &metadata)?;
    let contents = serde_yaml::to_string(&merged).map_err(to_io)?;
    std::fs::write(&path, contents)?;
    tracing::info!("saved metadata for {repositories} repositories to {}", path.display());

    Ok(SyncOutcome::Updated { repositories, path })
}

//! Data provider: repository records, the primary account, social links and
//! localized page data, read from YAML files in the site's data directory.
//!
//! ## Files
//!
//! ```text
//! _data/
//! ├── repositories.yml     # github_users, github_repos, github_repos_metadata
//! ├── socials.yml          # ordered social links (github_username, email, ...)
//! ├── about.en.yml         # page-local data, one file per language
//! ├── about.yml            # language-neutral fallback
//! └── strings.zh.yml       # UI strings per language
//! ```
//!
//! Absence is never an error here: a missing or unparseable file produces empty data
//! and a warning, and the corresponding page section is omitted.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_yaml::Mapping;

use crate::error::{FolioError, Result};

/// Repository list and metadata file, also rewritten by `folio sync`.
pub const REPOSITORIES_FILE: &str = "repositories.yml";
/// Social links file.
pub const SOCIALS_FILE: &str = "socials.yml";

const DEFAULT_DESCRIPTION_LINES: u32 = 2;

/// On-disk shape of `repositories.yml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepositoriesFile {
    #[serde(default)]
    pub github_users: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_description_lines_max: Option<u32>,
    #[serde(default)]
    pub github_repos: Vec<String>,
    #[serde(default)]
    pub github_repos_metadata: Vec<RepositoryEntry>,
}

/// One entry of `github_repos_metadata`, as written by `folio sync`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepositoryEntry {
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub stars: Option<u64>,
    #[serde(default)]
    pub updated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl RepositoriesFile {
    /// Read each top-level key, and each list entry, on its own.
    ///
    /// A malformed value only costs that value: a bad metadata entry is skipped with a
    /// warning while the rest of the file, `github_users` included, still loads. `origin`
    /// names the file in log output.
    pub fn from_mapping(mapping: &Mapping, origin: &Path) -> Self {
        Self {
            github_users: lenient_list(mapping, "github_users", origin),
            repo_description_lines_max: lenient(mapping, "repo_description_lines_max", origin),
            github_repos: lenient_list(mapping, "github_repos", origin),
            github_repos_metadata: lenient_list(mapping, "github_repos_metadata", origin),
        }
    }
}

fn lenient<T: DeserializeOwned>(mapping: &Mapping, key: &str, origin: &Path) -> Option<T> {
    let value = mapping.get(key).filter(|v| !v.is_null())?;
    serde_yaml::from_value(value.clone())
        .map_err(|e| tracing::warn!("{}: ignoring '{key}': {e}", origin.display()))
        .ok()
}

fn lenient_list<T: DeserializeOwned>(mapping: &Mapping, key: &str, origin: &Path) -> Vec<T> {
    let Some(value) = mapping.get(key).filter(|v| !v.is_null()) else {
        return Vec::new();
    };
    let Some(items) = value.as_sequence() else {
        tracing::warn!("{}: ignoring '{key}': expected a list", origin.display());
        return Vec::new();
    };
    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            serde_yaml::from_value(item.clone())
                .map_err(|e| {
                    tracing::warn!("{}: skipping {key}[{index}]: {e}", origin.display())
                })
                .ok()
        })
        .collect()
}

/// Optional structured fields of a repository.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryMetadata {
    pub stars: Option<u64>,
    pub language: Option<String>,
    pub url: Option<String>,
    pub homepage: Option<String>,
    pub keywords: Vec<String>,
    pub updated: Option<String>,
}

/// A repository to list on the site. `name` is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRecord {
    pub name: String,
    pub slug: Option<String>,
    pub description: String,
    pub metadata: Option<RepositoryMetadata>,
}

impl RepositoryRecord {
    /// Record built from a bare `owner/repo` slug.
    pub fn from_slug(slug: &str) -> Option<Self> {
        let slug = slug.trim();
        let name = slug_name(slug)?;
        Some(Self {
            name,
            slug: Some(slug.to_string()),
            description: String::new(),
            metadata: None,
        })
    }

    /// Record built from a metadata entry. Returns `None` when no name can be resolved.
    pub fn from_entry(entry: &RepositoryEntry) -> Option<Self> {
        let slug = non_empty(entry.slug.as_deref());
        let name = non_empty(entry.name.as_deref()).or_else(|| slug.as_deref().and_then(slug_name))?;
        Some(Self {
            name,
            slug,
            description: entry.description.clone().unwrap_or_default().trim().to_string(),
            metadata: Some(RepositoryMetadata {
                stars: entry.stars,
                language: non_empty(entry.language.as_deref()),
                url: non_empty(entry.url.as_deref()),
                homepage: non_empty(entry.homepage.as_deref()),
                keywords: entry
                    .keywords
                    .iter()
                    .filter_map(|k| non_empty(Some(k.as_str())))
                    .collect(),
                updated: non_empty(entry.updated.as_deref()),
            }),
        })
    }

    /// Public URL: explicit metadata URL, else derived from the slug.
    pub fn url(&self) -> Option<String> {
        self.metadata
            .as_ref()
            .and_then(|m| m.url.clone())
            .or_else(|| self.slug.as_ref().map(|s| format!("https://github.com/{s}")))
    }

    /// A record missing its metadata, description, or language.
    pub fn is_partial(&self) -> bool {
        match &self.metadata {
            None => true,
            Some(meta) => self.description.is_empty() || meta.language.is_none(),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

fn slug_name(slug: &str) -> Option<String> {
    non_empty(slug.trim().trim_end_matches('/').rsplit('/').next())
}

/// A source of repository records.
///
/// `records` returns `None` when the source has nothing to offer, which lets the
/// provider fall through to the next, simpler source.
pub trait RepositorySource {
    /// Short identifier used in log output.
    fn name(&self) -> &'static str;

    fn records(&self) -> Option<Vec<RepositoryRecord>>;
}

/// Rich records from `github_repos_metadata`.
pub struct MetadataSource<'a>(pub &'a RepositoriesFile);

impl RepositorySource for MetadataSource<'_> {
    fn name(&self) -> &'static str {
        "metadata"
    }

    fn records(&self) -> Option<Vec<RepositoryRecord>> {
        let records: Vec<_> = self
            .0
            .github_repos_metadata
            .iter()
            .filter_map(|entry| {
                RepositoryRecord::from_entry(entry).or_else(|| {
                    tracing::warn!("dropping repository metadata entry without a name: {entry:?}");
                    None
                })
            })
            .collect();
        (!records.is_empty()).then_some(records)
    }
}

/// Name-only records derived from the `github_repos` slug list.
pub struct SlugSource<'a>(pub &'a RepositoriesFile);

impl RepositorySource for SlugSource<'_> {
    fn name(&self) -> &'static str {
        "slugs"
    }

    fn records(&self) -> Option<Vec<RepositoryRecord>> {
        let records: Vec<_> = self
            .0
            .github_repos
            .iter()
            .filter_map(|slug| {
                RepositoryRecord::from_slug(slug).or_else(|| {
                    tracing::warn!("skipping unusable repository slug '{slug}'");
                    None
                })
            })
            .collect();
        (!records.is_empty()).then_some(records)
    }
}

/// Try each source in order and return the first non-empty result.
pub fn first_available(sources: &[&dyn RepositorySource]) -> Vec<RepositoryRecord> {
    for source in sources {
        if let Some(records) = source.records() {
            tracing::debug!("loaded {} repositories from {} source", records.len(), source.name());
            return records;
        }
        tracing::debug!("repository source '{}' unavailable", source.name());
    }
    Vec::new()
}

/// A named social link, in file order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SocialLink {
    pub name: String,
    pub value: String,
}

/// Read-only view of every data file the renderer needs.
#[derive(Debug, Clone, Default)]
pub struct DataProvider {
    dir: PathBuf,
    account: Option<String>,
    repositories: Vec<RepositoryRecord>,
    socials: Vec<SocialLink>,
    description_lines_max: u32,
}

impl DataProvider {
    /// Load the data directory. Never fails; problems are logged and yield empty data.
    pub fn load(dir: &Path) -> Self {
        let repos_path = dir.join(REPOSITORIES_FILE);
        let repos_file = read_optional::<Mapping>(&repos_path)
            .map(|m| RepositoriesFile::from_mapping(&m, &repos_path))
            .unwrap_or_default();
        let socials = read_optional::<Mapping>(&dir.join(SOCIALS_FILE))
            .map(|m| social_links(&m))
            .unwrap_or_default();

        let repositories = first_available(&[
            &MetadataSource(&repos_file),
            &SlugSource(&repos_file),
        ]);

        let account = repos_file
            .github_users
            .iter()
            .find_map(|user| non_empty(Some(user.as_str())))
            .or_else(|| {
                socials
                    .iter()
                    .find(|link| link.name == "github_username")
                    .and_then(|link| non_empty(Some(link.value.as_str())))
            });

        Self {
            dir: dir.to_path_buf(),
            account,
            repositories,
            socials,
            description_lines_max: repos_file
                .repo_description_lines_max
                .unwrap_or(DEFAULT_DESCRIPTION_LINES),
        }
    }

    /// Provider over in-memory data, with no backing directory.
    pub fn from_parts(account: Option<String>, repositories: Vec<RepositoryRecord>) -> Self {
        Self {
            dir: PathBuf::new(),
            account,
            repositories,
            socials: Vec::new(),
            description_lines_max: DEFAULT_DESCRIPTION_LINES,
        }
    }

    pub fn with_socials(mut self, socials: Vec<SocialLink>) -> Self {
        self.socials = socials;
        self
    }

    pub fn primary_account(&self) -> Option<&str> {
        self.account.as_deref()
    }

    pub fn repository_records(&self) -> &[RepositoryRecord] {
        &self.repositories
    }

    pub fn socials(&self) -> &[SocialLink] {
        &self.socials
    }

    pub fn description_lines_max(&self) -> u32 {
        self.description_lines_max
    }

    /// Localized data file `<name>.<lang>.yml`, falling back to `<name>.yml`.
    pub fn localized(&self, name: &str, lang: &str) -> Option<Value> {
        if self.dir.as_os_str().is_empty() {
            return None;
        }
        let candidates = [
            self.dir.join(format!("{name}.{lang}.yml")),
            self.dir.join(format!("{name}.yml")),
        ];
        candidates.iter().find_map(|path| read_optional::<Value>(path))
    }
}

/// Read and deserialize a YAML file, treating absence and parse errors as "no data".
fn read_optional<T: DeserializeOwned>(path: &Path) -> Option<T> {
    if !path.exists() {
        tracing::debug!("data file {} not present", path.display());
        return None;
    }
    match read_yaml(path) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("{e}: {}", error_chain(&e));
            None
        }
    }
}

/// Strict YAML read. An empty file yields `Ok(None)`.
pub fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let contents = std::fs::read_to_string(path)?;
    if contents.trim().is_empty() {
        return Ok(None);
    }
    serde_yaml::from_str(&contents)
        .map(Some)
        .map_err(|e| FolioError::DataParse {
            path: path.to_path_buf(),
            source: e,
        })
}

fn error_chain(err: &FolioError) -> String {
    std::error::Error::source(err)
        .map(|s| s.to_string())
        .unwrap_or_default()
}

fn social_links(mapping: &Mapping) -> Vec<SocialLink> {
    mapping
        .iter()
        .filter_map(|(key, value)| {
            let name = key.as_str()?.to_string();
            let value = match value {
                serde_yaml::Value::String(s) => s.trim().to_string(),
                serde_yaml::Value::Number(n) => n.to_string(),
                serde_yaml::Value::Bool(b) => b.to_string(),
                _ => return None,
            };
            (!value.is_empty()).then_some(SocialLink { name, value })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, contents: &str) {
        std::fs::write(dir.join(name), contents).unwrap();
    }

    #[test]
    fn test_metadata_source_preferred() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            REPOSITORIES_FILE,
            r#"
github_users: [jane]
github_repos: [jane/alpha, jane/beta]
github_repos_metadata:
  - slug: jane/alpha
    name: alpha
    description: First project
    language: Rust
    stars: 12
"#,
        );
        let data = DataProvider::load(dir.path());
        assert_eq!(data.primary_account(), Some("jane"));
        let records = data.repository_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "alpha");
        assert_eq!(records[0].metadata.as_ref().unwrap().stars, Some(12));
        assert!(!records[0].is_partial());
    }

    #[test]
    fn test_falls_back_to_slugs() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            REPOSITORIES_FILE,
            "github_repos: [jane/alpha, ' ', bob/beta]\ngithub_repos_metadata: []\n",
        );
        let data = DataProvider::load(dir.path());
        let names: Vec<_> = data.repository_records().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "beta"]);
        assert!(data.repository_records()[0].metadata.is_none());
        assert!(data.repository_records()[0].is_partial());
        assert_eq!(
            data.repository_records()[1].url().as_deref(),
            Some("https://github.com/bob/beta")
        );
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let data = DataProvider::load(Path::new("/tmp/folio_data_dir_that_does_not_exist"));
        assert!(data.primary_account().is_none());
        assert!(data.repository_records().is_empty());
        assert!(data.socials().is_empty());
        assert_eq!(data.description_lines_max(), 2);
    }

    #[test]
    fn test_malformed_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), REPOSITORIES_FILE, "github_repos: [unclosed\n");
        let data = DataProvider::load(dir.path());
        assert!(data.repository_records().is_empty());
    }

    #[test]
    fn test_bad_metadata_entry_skipped_alone() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            REPOSITORIES_FILE,
            r#"
github_users: [jane]
repo_description_lines_max: 4
github_repos_metadata:
  - name: alpha
    description: A
  - name: beta
    stars: many
  - name: gamma
    description: C
"#,
        );
        let data = DataProvider::load(dir.path());
        assert_eq!(data.primary_account(), Some("jane"));
        assert_eq!(data.description_lines_max(), 4);
        let names: Vec<_> = data.repository_records().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "gamma"]);
    }

    #[test]
    fn test_bad_top_level_key_keeps_the_rest() {
        let mapping: Mapping = serde_yaml::from_str(
            "github_users: jane
repo_description_lines_max: lots
github_repos: [jane/a, [x], jane/b]
",
        )
        .unwrap();
        let file = RepositoriesFile::from_mapping(&mapping, Path::new(REPOSITORIES_FILE));
        assert!(file.github_users.is_empty());
        assert!(file.repo_description_lines_max.is_none());
        assert_eq!(file.github_repos, vec!["jane/a".to_string(), "jane/b".to_string()]);
    }

    #[test]
    fn test_account_falls_back_to_socials() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            SOCIALS_FILE,
            "email: jane@example.com\ngithub_username: jane-gh\nscholar_userid: abc123\n",
        );
        let data = DataProvider::load(dir.path());
        assert_eq!(data.primary_account(), Some("jane-gh"));
        let names: Vec<_> = data.socials().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["email", "github_username", "scholar_userid"]);
    }

    #[test]
    fn test_unnamed_metadata_entry_dropped() {
        let file = RepositoriesFile {
            github_repos_metadata: vec![
                RepositoryEntry::default(),
                RepositoryEntry {
                    slug: Some("jane/gamma".into()),
                    ..RepositoryEntry::default()
                },
            ],
            ..RepositoriesFile::default()
        };
        let records = MetadataSource(&file).records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "gamma");
    }

    #[test]
    fn test_localized_fallback() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "about.yml", "greeting: Hello\n");
        write(dir.path(), "about.zh.yml", "greeting: 你好\n");
        let data = DataProvider::load(dir.path());
        assert_eq!(data.localized("about", "zh").unwrap()["greeting"], "你好");
        assert_eq!(data.localized("about", "en").unwrap()["greeting"], "Hello");
        assert!(data.localized("missing", "en").is_none());
    }

    #[test]
    fn test_empty_strings_become_absent_metadata() {
        let entry = RepositoryEntry {
            slug: Some("jane/delta".into()),
            name: Some("delta".into()),
            description: Some("".into()),
            homepage: Some("".into()),
            language: Some("".into()),
            ..RepositoryEntry::default()
        };
        let record = RepositoryRecord::from_entry(&entry).unwrap();
        let meta = record.metadata.as_ref().unwrap();
        assert!(meta.homepage.is_none());
        assert!(meta.language.is_none());
        assert!(record.is_partial());
    }
}

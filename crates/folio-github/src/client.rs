//! Minimal GitHub REST client: one repository's metadata, one user's repositories.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;

use folio_core::data::RepositoryEntry;

use crate::error::{Result, SyncError};

/// Public GitHub API endpoint.
pub const API_BASE_URL: &str = "https://api.github.com";

/// User agent sent with every request.
pub const USER_AGENT: &str = "folio-repo-sync";

/// Default timeout for GitHub requests (30 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Page size used when listing a user's repositories (GitHub's maximum).
pub const REPOS_PER_PAGE: usize = 100;

const API_VERSION: &str = "2022-11-28";

#[derive(Debug, Deserialize)]
struct RepoPayload {
    name: Option<String>,
    description: Option<String>,
    topics: Option<Vec<String>>,
    homepage: Option<String>,
    language: Option<String>,
    stargazers_count: Option<u64>,
    updated_at: Option<String>,
    html_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserRepoPayload {
    full_name: Option<String>,
}

/// Authenticated client for the GitHub REST API.
pub struct GitHubClient {
    http: Client,
    base_url: String,
}

impl GitHubClient {
    /// Client against the public API.
    pub fn new(token: &str) -> Result<Self> {
        Self::with_base_url(token, API_BASE_URL)
    }

    /// Client against another API root (GitHub Enterprise, test servers).
    pub fn with_base_url(token: &str, base_url: &str) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| SyncError::InvalidToken)?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("X-GitHub-Api-Version", HeaderValue::from_static(API_VERSION));

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(DEFAULT_TIMEOUT)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch metadata for one `owner/repo` slug.
    pub async fn fetch_repo(&self, slug: &str) -> Result<RepositoryEntry> {
        let slug = slug.trim();
        if slug.is_empty() {
            return Err(SyncError::EmptySlug);
        }

        let url = format!("{}/repos/{slug}", self.base_url);
        let response = self.http.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(SyncError::RepoNotFound(slug.to_string()));
        }
        let payload: RepoPayload = checked(response, &url)?.json().await?;

        let fallback_name = slug.rsplit('/').next().unwrap_or(slug).to_string();
        Ok(RepositoryEntry {
            slug: Some(slug.to_string()),
            name: Some(payload.name.filter(|n| !n.is_empty()).unwrap_or(fallback_name)),
            description: Some(payload.description.unwrap_or_default()),
            keywords: payload.topics.unwrap_or_default(),
            homepage: Some(payload.homepage.unwrap_or_default()),
            language: Some(payload.language.unwrap_or_default()),
            stars: Some(payload.stargazers_count.unwrap_or(0)),
            updated: payload.updated_at,
            url: payload.html_url,
        })
    }

    /// List the slugs of every repository owned by `user`, most recently updated first.
    pub async fn fetch_user_repositories(&self, user: &str) -> Result<Vec<String>> {
        let user = user.trim();
        if user.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/users/{user}/repos", self.base_url);
        let per_page = REPOS_PER_PAGE.to_string();
        let mut slugs = Vec::new();
        let mut page = 1u32;

        loop {
            let page_param = page.to_string();
            let response = self
                .http
                .get(&url)
                .query(&[
                    ("type", "owner"),
                    ("per_page", per_page.as_str()),
                    ("page", page_param.as_str()),
                    ("sort", "updated"),
                    ("direction", "desc"),
                ])
                .send()
                .await?;
            if response.status() == StatusCode::NOT_FOUND {
                return Err(SyncError::UserNotFound(user.to_string()));
            }
            let batch: Vec<UserRepoPayload> = checked(response, &url)?.json().await?;
            if batch.is_empty() {
                break;
            }

            let full_page = batch.len() >= REPOS_PER_PAGE;
            slugs.extend(batch.into_iter().filter_map(|repo| repo.full_name));
            if !full_page {
                break;
            }
            page += 1;
        }

        tracing::info!("discovered {} repos for user '{user}'", slugs.len());
        Ok(slugs)
    }
}

fn checked(response: Response, url: &str) -> Result<Response> {
    response.error_for_status().map_err(|source| SyncError::Api {
        url: url.to_string(),
        source,
    })
}

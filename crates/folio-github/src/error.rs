//! Errors raised while syncing repository metadata.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("repository slug cannot be empty")]
    EmptySlug,

    #[error("repository '{0}' does not exist or is private")]
    RepoNotFound(String),

    #[error("GitHub user '{0}' does not exist or is private")]
    UserNotFound(String),

    /// Non-success status from the GitHub API.
    #[error("GitHub API error for {url}")]
    Api {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The token cannot be used as an HTTP header value.
    #[error("GitHub token contains characters not allowed in an HTTP header")]
    InvalidToken,

    #[error("data file {0} not found")]
    MissingDataFile(PathBuf),

    #[error("data file {0} is empty; restore it before running the sync")]
    EmptyDataFile(PathBuf),

    #[error("unable to parse {path}")]
    DataParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Alias for `Result<T, SyncError>`.
pub type Result<T> = std::result::Result<T, SyncError>;

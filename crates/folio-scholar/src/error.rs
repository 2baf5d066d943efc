//! Errors raised while importing publications.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScholarError {
    #[error("socials file {0} not found")]
    MissingSocialsFile(PathBuf),

    #[error("unable to parse {path}")]
    SocialsParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("no 'scholar_userid' set in {0}")]
    MissingScholarId(PathBuf),

    #[error("SerpAPI key cannot be empty")]
    MissingApiKey,

    /// Non-success status from SerpAPI without an error message.
    #[error("SerpAPI returned {status} for {url}")]
    Api { url: String, status: u16 },

    /// SerpAPI answered with an `error` field instead of results.
    #[error("SerpAPI: {0}")]
    Service(String),

    #[error("no publications retrieved for Scholar ID '{0}'")]
    NoPublications(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Alias for `Result<T, ScholarError>`.
pub type Result<T> = std::result::Result<T, ScholarError>;

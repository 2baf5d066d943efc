//! `folio scholar`: refresh `papers.bib` from Google Scholar.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde_yaml::{Mapping, Value};

use folio_core::data::SOCIALS_FILE;

use crate::bibtex::{
    build_entry, render_file, sort_publications, ManualOverrides, BIBLIOGRAPHY_FILE,
    MANUAL_OVERRIDES_FILE,
};
use crate::client::SerpApiClient;
use crate::error::{Result, ScholarError};
use crate::publication::Publication;

/// Summary of one bibliography refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateReport {
    pub scholar_id: String,
    pub path: PathBuf,
    /// Generated entries written.
    pub written: usize,
    /// Generated entries dropped because a manual override has the same key.
    pub overridden: usize,
    pub manual_entries: usize,
}

/// The `scholar_userid` from `<data_dir>/socials.yml`.
pub fn load_scholar_user_id(data_dir: &Path) -> Result<String> {
    let path = data_dir.join(SOCIALS_FILE);
    if !path.exists() {
        return Err(ScholarError::MissingSocialsFile(path));
    }
    let contents = std::fs::read_to_string(&path)?;
    if contents.trim().is_empty() {
        return Err(ScholarError::MissingScholarId(path));
    }
    let socials: Option<Mapping> =
        serde_yaml::from_str(&contents).map_err(|source| ScholarError::SocialsParse {
            path: path.clone(),
            source,
        })?;

    let id = socials
        .as_ref()
        .and_then(|m| m.get("scholar_userid"))
        .and_then(|v| match v {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .filter(|id| !id.is_empty());
    id.ok_or(ScholarError::MissingScholarId(path))
}

/// Fetch the author's publications and rewrite `<bibliography_dir>/papers.bib`.
pub async fn update_bibliography(
    client: &SerpApiClient,
    data_dir: &Path,
    bibliography_dir: &Path,
) -> Result<UpdateReport> {
    let scholar_id = load_scholar_user_id(data_dir)?;
    let publications = client.fetch_publications(&scholar_id).await?;
    write_bibliography(&scholar_id, publications, bibliography_dir, Utc::now())
}

/// Sort, key and write `publications`, leaving out keys a manual override claims.
pub fn write_bibliography(
    scholar_id: &str,
    mut publications: Vec<Publication>,
    bibliography_dir: &Path,
    generated_at: DateTime<Utc>,
) -> Result<UpdateReport> {
    sort_publications(&mut publications);

    let mut keys = Vec::with_capacity(publications.len());
    let entries: Vec<_> = publications
        .iter()
        .map(|publication| build_entry(publication, &mut keys))
        .collect();

    let overrides = ManualOverrides::load(&bibliography_dir.join(MANUAL_OVERRIDES_FILE))?;
    let total = entries.len();
    let entries: Vec<_> = entries
        .into_iter()
        .filter(|entry| !overrides.keys.contains(&entry.key))
        .collect();
    let overridden = total - entries.len();
    if overridden > 0 {
        tracing::info!("skipped {overridden} generated entries replaced by manual overrides");
    }

    std::fs::create_dir_all(bibliography_dir)?;
    let path = bibliography_dir.join(BIBLIOGRAPHY_FILE);
    std::fs::write(
        &path,
        render_file(&entries, scholar_id, &overrides, generated_at),
    )?;
    tracing::info!("wrote {} entries to {}", entries.len(), path.display());

    Ok(UpdateReport {
        scholar_id: scholar_id.to_string(),
        path,
        written: entries.len(),
        overridden,
        manual_entries: overrides.keys.len(),
    })
}

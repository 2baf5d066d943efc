//! Site directory scaffolding and config discovery.
//!
//! `folio init` creates a new site from the embedded starter; every other command
//! loads an existing site through [`load_site`].
//!
//! ## Directory layout
//!
//! ```text
//! <site>/
//! ├── folio.config.json          # SiteConfig
//! ├── templates/
//! │   ├── layouts/default.html
//! │   ├── pages/{about,repositories}.html
//! │   └── partials/*.html
//! ├── _data/                     # YAML data files
//! └── _site/                     # build output (created by `folio build`)
//! ```

use std::path::{Path, PathBuf};

use crate::config::{SiteConfig, CONFIG_FILE};
use crate::error::{FolioError, Result};
use crate::templates::embedded;
use crate::templates::renderer::TemplateRenderer;

/// Create a new site directory populated with the starter templates and data.
///
/// `account` seeds `github_users` and `github_username`; without it the profile and
/// repository sections stay empty until the data files are edited.
pub fn scaffold(site_dir: &Path, title: &str, account: Option<&str>) -> Result<SiteConfig> {
    if site_dir.exists() {
        return Err(FolioError::ProjectExists(site_dir.to_path_buf()));
    }
    std::fs::create_dir_all(site_dir)?;

    let config = SiteConfig::starter(title);
    config.save(&site_dir.join(CONFIG_FILE))?;

    for (rel, contents) in embedded::STARTER_FILES {
        write_file(&site_dir.join(rel), contents)?;
    }

    let renderer = TemplateRenderer::new();
    let data = serde_json::json!({ "account": account.unwrap_or_default() });
    for (rel, template) in embedded::STARTER_DATA_TEMPLATES {
        let contents = renderer.render_str(template, &data)?;
        write_file(&site_dir.join(rel), &contents)?;
    }

    tracing::info!("scaffolded site at {}", site_dir.display());
    Ok(config)
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents)?;
    Ok(())
}

/// Resolve the site root from a config path and load the config.
///
/// The root is the directory containing the config file.
pub fn load_site(config_path: &Path) -> Result<(PathBuf, SiteConfig)> {
    if !config_path.exists() {
        return Err(FolioError::NotAProject(config_path.to_path_buf()));
    }
    let root = match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let config = SiteConfig::load(config_path)?;
    Ok((root, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataProvider;

    #[test]
    fn test_scaffold_writes_starter_site() {
        let dir = tempfile::tempdir().unwrap();
        let site = dir.path().join("homepage");
        scaffold(&site, "Jane Doe", Some("jane")).unwrap();

        assert!(site.join(CONFIG_FILE).exists());
        assert!(site.join("templates/layouts/default.html").exists());
        assert!(site.join("templates/partials/repository.html").exists());

        let data = DataProvider::load(&site.join("_data"));
        assert_eq!(data.primary_account(), Some("jane"));
        assert!(data.repository_records().is_empty());
    }

    #[test]
    fn test_scaffold_without_account() {
        let dir = tempfile::tempdir().unwrap();
        let site = dir.path().join("homepage");
        scaffold(&site, "Jane Doe", None).unwrap();
        let data = DataProvider::load(&site.join("_data"));
        assert!(data.primary_account().is_none());
    }

    #[test]
    fn test_scaffold_refuses_existing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let err = scaffold(dir.path(), "Jane", None).unwrap_err();
        assert!(matches!(err, FolioError::ProjectExists(_)));
    }

    #[test]
    fn test_load_site_resolves_root() {
        let dir = tempfile::tempdir().unwrap();
        let site = dir.path().join("homepage");
        scaffold(&site, "Jane", None).unwrap();
        let (root, config) = load_site(&site.join(CONFIG_FILE)).unwrap();
        assert_eq!(root, site);
        assert_eq!(config.site.title, "Jane");
    }

    #[test]
    fn test_load_site_missing_config() {
        let err = load_site(Path::new("/tmp/folio_missing_site/folio.config.json")).unwrap_err();
        assert!(matches!(err, FolioError::NotAProject(_)));
    }
}

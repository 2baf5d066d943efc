//! Site configuration (`folio.config.json`).
//!
//! The whole site is described by one [`SiteConfig`] value that is loaded once and
//! passed explicitly to the data provider, the context builder and the site builder.
//! Nothing reads configuration from ambient state.
//!
//! ```json
//! {
//!   "site": { "title": "Jane Doe", "url": "https://jane.example", "baseurl": "" },
//!   "profile": { "name": "Jane Doe", "affiliation": "Example University" },
//!   "languages": ["en", "zh"],
//!   "features": { "social_icons": true },
//!   "pages": [
//!     { "name": "about", "template": "pages/about", "layout": "layouts/default",
//!       "output": "index.html", "localized": true, "data": "about" }
//!   ]
//! }
//! ```

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{FolioError, Result};

/// File name of the site configuration inside a site directory.
pub const CONFIG_FILE: &str = "folio.config.json";

/// Top-level site configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub site: SiteMeta,
    #[serde(default)]
    pub profile: ProfileConfig,
    /// Language codes; the first entry is the default language.
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,
    #[serde(default)]
    pub features: FeatureConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub repositories: RepositoryDisplay,
    pub pages: Vec<PageConfig>,
}

/// Site-wide metadata exposed to every page as `site`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteMeta {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
    /// Path prefix prepended to every page URL (e.g. `/homepage`).
    #[serde(default)]
    pub baseurl: String,
}

/// Owner profile shown in the profile section when an account identifier exists.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affiliation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Raw feature switches as written in the config file.
///
/// These are resolved once into [`crate::context::Features`] when a page context is
/// built; templates never see the raw switches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureConfig {
    #[serde(default = "default_true")]
    pub profile: bool,
    #[serde(default = "default_true")]
    pub repositories: bool,
    #[serde(default)]
    pub social_icons: bool,
    #[serde(default = "default_true")]
    pub language_switcher: bool,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            profile: true,
            repositories: true,
            social_icons: false,
            language_switcher: true,
        }
    }
}

/// Directory layout of a site, relative to the site root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_templates_dir")]
    pub templates: PathBuf,
    #[serde(default = "default_data_dir")]
    pub data: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output: PathBuf,
    /// Where `folio scholar` writes `papers.bib` and reads manual overrides.
    #[serde(default = "default_bibliography_dir")]
    pub bibliography: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            templates: default_templates_dir(),
            data: default_data_dir(),
            output: default_output_dir(),
            bibliography: default_bibliography_dir(),
        }
    }
}

/// How repository records are presented.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryDisplay {
    /// Description shown for records with no description.
    #[serde(default = "default_placeholder")]
    pub placeholder: String,
}

impl Default for RepositoryDisplay {
    fn default() -> Self {
        Self {
            placeholder: default_placeholder(),
        }
    }
}

/// One logical page of the site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageConfig {
    pub name: String,
    /// Template name, relative to the templates directory without extension.
    pub template: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Output path relative to the output directory (e.g. `repositories/index.html`).
    pub output: PathBuf,
    /// Render once per configured language instead of only the default one.
    #[serde(default)]
    pub localized: bool,
    /// Base name of a page-local data file (`<data>.<lang>.yml` or `<data>.yml`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

fn default_languages() -> Vec<String> {
    vec!["en".into()]
}

fn default_true() -> bool {
    true
}

fn default_templates_dir() -> PathBuf {
    PathBuf::from("templates")
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("_data")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("_site")
}

fn default_bibliography_dir() -> PathBuf {
    PathBuf::from("_bibliography")
}

fn default_placeholder() -> String {
    "No description available.".into()
}

impl SiteConfig {
    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| FolioError::ConfigNotFound {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&contents).map_err(|e| FolioError::ConfigParse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Save configuration as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| FolioError::ConfigParse {
            path: path.to_path_buf(),
            source: e,
        })?;
        std::fs::write(path, format!("{json}\n"))?;
        Ok(())
    }

    /// Starter configuration written by `folio init`.
    pub fn starter(title: &str) -> Self {
        Self {
            site: SiteMeta {
                title: title.to_string(),
                description: format!("Personal homepage of {title}"),
                url: String::new(),
                baseurl: String::new(),
            },
            profile: ProfileConfig {
                name: Some(title.to_string()),
                ..ProfileConfig::default()
            },
            languages: vec!["en".into(), "zh".into()],
            features: FeatureConfig {
                social_icons: true,
                ..FeatureConfig::default()
            },
            paths: PathsConfig::default(),
            repositories: RepositoryDisplay::default(),
            pages: vec![
                PageConfig {
                    name: "about".into(),
                    template: "pages/about".into(),
                    layout: Some("layouts/default".into()),
                    title: Some("About".into()),
                    output: PathBuf::from("index.html"),
                    localized: true,
                    data: Some("about".into()),
                },
                PageConfig {
                    name: "repositories".into(),
                    template: "pages/repositories".into(),
                    layout: Some("layouts/default".into()),
                    title: Some("Repositories".into()),
                    output: PathBuf::from("repositories/index.html"),
                    localized: false,
                    data: None,
                },
            ],
        }
    }

    /// The default language (first configured entry).
    pub fn default_language(&self) -> &str {
        self.languages.first().map(String::as_str).unwrap_or("en")
    }

    /// Languages a page is rendered in.
    pub fn page_languages<'a>(&'a self, page: &PageConfig) -> &'a [String] {
        if page.localized {
            &self.languages
        } else {
            &self.languages[..self.languages.len().min(1)]
        }
    }

    /// Output path of `page` in `lang`, relative to the output directory.
    ///
    /// The default language writes to the page's own `output`; other languages are
    /// nested under a directory named after the language code.
    pub fn output_path(&self, page: &PageConfig, lang: &str) -> PathBuf {
        let output = normalized(&page.output);
        if lang == self.default_language() {
            output
        } else {
            Path::new(lang).join(output)
        }
    }

    /// Public URL of `page` in `lang`, honouring `baseurl` and collapsing `index.html`.
    pub fn page_url(&self, page: &PageConfig, lang: &str) -> String {
        let path = self.output_path(page, lang);
        let mut rel = path
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => part.to_str(),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/");
        if rel == "index.html" {
            rel.clear();
        } else if let Some(dir) = rel.strip_suffix("/index.html") {
            rel = format!("{dir}/");
        }
        format!("{}/{}", self.site.baseurl.trim_end_matches('/'), rel)
    }

    /// Reject configurations that cannot produce a consistent site.
    pub fn validate(&self) -> Result<()> {
        if self.pages.is_empty() {
            return Err(FolioError::InvalidConfig("no pages configured".into()));
        }

        if self.languages.is_empty() {
            return Err(FolioError::InvalidConfig(
                "at least one language is required".into(),
            ));
        }
        let mut seen_langs = HashSet::new();
        for lang in &self.languages {
            let valid = !lang.is_empty()
                && lang.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
            if !valid {
                return Err(FolioError::InvalidConfig(format!(
                    "invalid language code '{lang}'"
                )));
            }
            if !seen_langs.insert(lang.as_str()) {
                return Err(FolioError::InvalidConfig(format!(
                    "language '{lang}' listed twice"
                )));
            }
        }

        self.validate_paths()?;

        let mut names = HashSet::new();
        let mut outputs = HashSet::new();
        for page in &self.pages {
            if page.name.trim().is_empty() {
                return Err(FolioError::InvalidConfig("page with empty name".into()));
            }
            if !names.insert(page.name.as_str()) {
                return Err(FolioError::InvalidConfig(format!(
                    "page '{}' defined twice",
                    page.name
                )));
            }
            let escapes = page
                .output
                .components()
                .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
            if page.output.as_os_str().is_empty() || escapes {
                return Err(FolioError::InvalidConfig(format!(
                    "page '{}' has invalid output path '{}' (must be relative, without '..')",
                    page.name,
                    page.output.display()
                )));
            }
            for lang in self.page_languages(page) {
                let out = self.output_path(page, lang);
                if !outputs.insert(out.clone()) {
                    return Err(FolioError::InvalidConfig(format!(
                        "output path '{}' is produced by more than one page",
                        out.display()
                    )));
                }
            }
        }

        Ok(())
    }

    /// The output directory must be a real subdirectory that holds none of the
    /// templates, data or bibliography, since `build --clean` deletes it.
    fn validate_paths(&self) -> Result<()> {
        let output = normalized(&self.paths.output);
        if output.as_os_str().is_empty() || output.components().any(|c| c == Component::ParentDir)
        {
            return Err(FolioError::InvalidConfig(format!(
                "output directory '{}' must be a subdirectory of the site",
                self.paths.output.display()
            )));
        }
        let sources = [
            ("templates", &self.paths.templates),
            ("data", &self.paths.data),
            ("bibliography", &self.paths.bibliography),
        ];
        for (label, dir) in sources {
            let dir = normalized(dir);
            if dir.starts_with(&output) || output.starts_with(&dir) {
                return Err(FolioError::InvalidConfig(format!(
                    "output directory '{}' overlaps the {label} directory '{}'",
                    self.paths.output.display(),
                    dir.display()
                )));
            }
        }
        Ok(())
    }
}

/// `path` without `.` components.
fn normalized(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| *c != Component::CurDir)
        .collect()
}

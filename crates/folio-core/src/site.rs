//! Site build: config + templates + data → one output file per (page, language).
//!
//! A build runs in two phases. Every page is rendered into memory first; only when all
//! of them succeed are the files written to the output directory. A malformed template
//! therefore aborts the build without leaving a half-written site behind.

use std::path::{Path, PathBuf};

use crate::config::{PageConfig, SiteConfig};
use crate::context::PageContext;
use crate::data::DataProvider;
use crate::error::{FolioError, Result};
use crate::templates::renderer::TemplateRenderer;

/// One rendered page, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub name: String,
    pub lang: String,
    /// Path relative to the output directory.
    pub path: PathBuf,
    pub html: String,
}

/// Summary of a completed build.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub output_dir: PathBuf,
    pub pages: Vec<RenderedPage>,
    pub templates: usize,
    pub repositories: usize,
    pub account: Option<String>,
}

/// Everything needed to render a site, loaded once.
pub struct Site {
    root: PathBuf,
    config: SiteConfig,
    renderer: TemplateRenderer,
    data: DataProvider,
}

impl Site {
    /// Validate the config, load every template (fatal on syntax errors) and the data.
    pub fn load(root: &Path, config: SiteConfig) -> Result<Self> {
        config.validate()?;

        let templates_dir = root.join(&config.paths.templates);
        tracing::info!("loading templates from {}", templates_dir.display());
        let renderer = TemplateRenderer::from_dir(&templates_dir)?;

        for page in &config.pages {
            for name in std::iter::once(&page.template).chain(page.layout.as_ref()) {
                if !renderer.has_template(name) {
                    return Err(FolioError::UnknownTemplate(format!(
                        "{name} (referenced by page '{}')",
                        page.name
                    )));
                }
            }
        }

        let data_dir = root.join(&config.paths.data);
        tracing::info!("loading data from {}", data_dir.display());
        let data = DataProvider::load(&data_dir);

        Ok(Self {
            root: root.to_path_buf(),
            config,
            renderer,
            data,
        })
    }

    /// Assemble a site from parts that are already loaded.
    pub fn from_parts(
        root: &Path,
        config: SiteConfig,
        renderer: TemplateRenderer,
        data: DataProvider,
    ) -> Self {
        Self {
            root: root.to_path_buf(),
            config,
            renderer,
            data,
        }
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn data(&self) -> &DataProvider {
        &self.data
    }

    pub fn renderer(&self) -> &TemplateRenderer {
        &self.renderer
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.join(&self.config.paths.output)
    }

    /// Render one page in one language.
    pub fn render_page(&self, page: &PageConfig, lang: &str) -> Result<RenderedPage> {
        let context = PageContext::build(&self.config, &self.data, page, lang);
        let body = self.renderer.render(&page.template, &context.to_value())?;

        let html = match &page.layout {
            Some(layout) => {
                let mut wrapped = context;
                wrapped.insert("content", body);
                self.renderer.render(layout, &wrapped.into_value())?
            }
            None => body,
        };

        tracing::debug!("rendered page '{}' [{lang}] ({} bytes)", page.name, html.len());
        Ok(RenderedPage {
            name: page.name.clone(),
            lang: lang.to_string(),
            path: self.config.output_path(page, lang),
            html,
        })
    }

    /// Render every page in every language it is published in, in config order.
    pub fn render_all(&self) -> Result<Vec<RenderedPage>> {
        let mut pages = Vec::new();
        for page in &self.config.pages {
            for lang in self.config.page_languages(page) {
                pages.push(self.render_page(page, lang)?);
            }
        }
        Ok(pages)
    }

    /// Render everything, then write it to the output directory.
    ///
    /// With `clean`, the previous output is removed first. Nothing is removed or
    /// written unless every page rendered.
    pub fn build(&self, clean: bool) -> Result<BuildReport> {
        let pages = self.render_all()?;
        if clean {
            self.clean()?;
        }
        let output_dir = self.output_dir();
        write_pages(&output_dir, &pages)?;
        tracing::info!("wrote {} pages to {}", pages.len(), output_dir.display());

        Ok(BuildReport {
            output_dir,
            pages,
            templates: self.renderer.template_names().count(),
            repositories: self.data.repository_records().len(),
            account: self.data.primary_account().map(str::to_string),
        })
    }

    /// Remove the output directory, refusing to touch anything outside the site root.
    pub fn clean(&self) -> Result<()> {
        let output_dir = self.output_dir();
        if !output_dir.exists() {
            return Ok(());
        }
        let root = self.root.canonicalize()?;
        let target = output_dir.canonicalize()?;
        if target == root || !target.starts_with(&root) {
            return Err(FolioError::InvalidConfig(format!(
                "refusing to clean output directory {} outside the site root",
                output_dir.display()
            )));
        }
        tracing::info!("removing {}", output_dir.display());
        std::fs::remove_dir_all(&target)?;
        Ok(())
    }
}

/// Write rendered pages below `output_dir`, creating directories as needed.
pub fn write_pages(output_dir: &Path, pages: &[RenderedPage]) -> Result<()> {
    for page in pages {
        let path = output_dir.join(&page.path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, &page.html)?;
        tracing::debug!("wrote {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{RepositoryMetadata, RepositoryRecord};

    fn site_with(
        templates: &[(&str, &str)],
        account: Option<&str>,
        records: Vec<RepositoryRecord>,
    ) -> Site {
        let mut renderer = TemplateRenderer::new();
        for (name, src) in templates {
            renderer.register(name, src, Path::new(name)).unwrap();
        }
        let data = DataProvider::from_parts(account.map(str::to_string), records);
        Site::from_parts(Path::new("."), SiteConfig::starter("Jane"), renderer, data)
    }

    fn repo(name: &str) -> RepositoryRecord {
        RepositoryRecord {
            name: name.into(),
            slug: Some(format!("jane/{name}")),
            description: format!("{name} description"),
            metadata: Some(RepositoryMetadata {
                language: Some("Rust".into()),
                ..RepositoryMetadata::default()
            }),
        }
    }

    const LAYOUT: &str = "<html>{{{content}}}</html>";
    const ABOUT: &str = "{{#if profile}}<section id=\"profile\">{{profile.account}}</section>{{/if}}[{{lang}}]";
    const REPOS: &str = "{{#if repositories}}<div class=\"repo-list\">{{#each repositories}}{{include \"partials/repository\" repo=this}}{{/each}}</div>{{/if}}";
    const REPO: &str = "<article>{{repo.name}}</article>";

    fn templates() -> Vec<(&'static str, &'static str)> {
        vec![
            ("layouts/default", LAYOUT),
            ("pages/about", ABOUT),
            ("pages/repositories", REPOS),
            ("partials/repository", REPO),
        ]
    }

    #[test]
    fn test_three_records_render_three_items_in_order() {
        let site = site_with(&templates(), None, vec![repo("one"), repo("two"), repo("three")]);
        let page = site.render_page(&site.config().pages[1], "en").unwrap();
        assert_eq!(page.html.matches("<article>").count(), 3);
        let one = page.html.find("one").unwrap();
        let two = page.html.find("two").unwrap();
        let three = page.html.find("three").unwrap();
        assert!(one < two && two < three);
        assert!(page.html.starts_with("<html>"));
    }

    #[test]
    fn test_empty_records_render_no_listing_markup() {
        let site = site_with(&templates(), Some("jane"), vec![]);
        let page = site.render_page(&site.config().pages[1], "en").unwrap();
        assert_eq!(page.html, "<html></html>");
        assert!(!page.html.contains("repo-list"));
    }

    #[test]
    fn test_missing_account_omits_profile() {
        let site = site_with(&templates(), None, vec![]);
        let page = site.render_page(&site.config().pages[0], "en").unwrap();
        assert!(!page.html.contains("profile"));

        let site = site_with(&templates(), Some("jane"), vec![]);
        let page = site.render_page(&site.config().pages[0], "en").unwrap();
        assert!(page.html.contains("<section id=\"profile\">jane</section>"));
    }

    #[test]
    fn test_render_all_covers_languages() {
        let site = site_with(&templates(), None, vec![]);
        let pages = site.render_all().unwrap();
        let paths: Vec<_> = pages.iter().map(|p| p.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("index.html"),
                PathBuf::from("zh/index.html"),
                PathBuf::from("repositories/index.html"),
            ]
        );
        assert!(pages[1].html.contains("[zh]"));
    }

    #[test]
    fn test_render_all_is_deterministic() {
        let site = site_with(&templates(), Some("jane"), vec![repo("a"), repo("b")]);
        assert_eq!(site.render_all().unwrap(), site.render_all().unwrap());
    }

    #[test]
    fn test_write_pages_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let pages = vec![RenderedPage {
            name: "about".into(),
            lang: "zh".into(),
            path: PathBuf::from("zh/index.html"),
            html: "<p>hi</p>".into(),
        }];
        write_pages(dir.path(), &pages).unwrap();
        let written = std::fs::read_to_string(dir.path().join("zh/index.html")).unwrap();
        assert_eq!(written, "<p>hi</p>");
    }
}

//! Handlebars-based template renderer for site pages.
//!
//! Wraps the [`handlebars::Handlebars`] engine with **strict mode disabled**: a
//! `{{variable}}` that is not in the page context renders as an empty string, and
//! `{{#if}}` / `{{#each}}` over a missing key render nothing. Missing data is never an
//! error for a page; the section just disappears.
//!
//! Structural problems are the opposite. Every template is compiled when it is
//! registered, and a malformed one (unclosed block, bad expression) fails immediately
//! with its name, file and line/column. Literal `include` targets are checked for
//! existence and cycles by [`TemplateRenderer::validate`].
//!
//! ## Usage
//!
//! ```ignore
//! use crate::templates::renderer::TemplateRenderer;
//!
//! let renderer = TemplateRenderer::from_dir(Path::new("templates"))?;
//! let html = renderer.render("pages/about", &context.into_value())?;
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use handlebars::{Handlebars, Template, TemplateError};
use serde_json::Value;
use walkdir::WalkDir;

use crate::error::{FolioError, Result};
use crate::templates::include::{self, IncludeHelper, INCLUDE_HELPER};

/// Origin path reported for templates that were not read from a file.
const INLINE: &str = "<inline>";

/// Template registry and renderer.
pub struct TemplateRenderer {
    hbs: Handlebars<'static>,
    sources: BTreeMap<String, String>,
    paths: BTreeMap<String, PathBuf>,
}

impl TemplateRenderer {
    /// Create an empty renderer with the `include` helper registered.
    pub fn new() -> Self {
        let mut hbs = Handlebars::new();
        hbs.set_strict_mode(false);
        hbs.register_helper(INCLUDE_HELPER, Box::new(IncludeHelper));
        Self {
            hbs,
            sources: BTreeMap::new(),
            paths: BTreeMap::new(),
        }
    }

    /// Load every template under `dir` and validate the include graph.
    ///
    /// Template names are the path relative to `dir`, without extension and with `/`
    /// separators: `templates/partials/repo.html` is registered as `partials/repo`.
    /// Hidden files and directories are skipped.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let mut renderer = Self::new();

        let walker = WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry.file_name()));

        for entry in walker {
            let entry = entry.map_err(|e| FolioError::Other(e.into()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(name) = template_name(dir, entry.path()) else {
                continue;
            };
            let source = std::fs::read_to_string(entry.path())?;
            renderer.register(&name, &source, entry.path())?;
        }

        tracing::debug!(
            "loaded {} templates from {}",
            renderer.sources.len(),
            dir.display()
        );
        renderer.validate()?;
        Ok(renderer)
    }

    /// Compile and register one template. Fails on malformed syntax.
    pub fn register(&mut self, name: &str, source: &str, origin: &Path) -> Result<()> {
        if self.sources.contains_key(name) {
            return Err(FolioError::InvalidConfig(format!(
                "template '{name}' is defined twice ({} and {})",
                self.paths[name].display(),
                origin.display()
            )));
        }
        self.hbs
            .register_template_string(name, source)
            .map_err(|e| syntax_error(name, origin, &e))?;
        self.sources.insert(name.to_string(), source.to_string());
        self.paths.insert(name.to_string(), origin.to_path_buf());
        tracing::debug!("registered template '{name}'");
        Ok(())
    }

    /// Check literal include targets and include cycles across all templates.
    pub fn validate(&self) -> Result<()> {
        include::check_graph(&self.sources)
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.sources.contains_key(name)
    }

    /// Registered template names, sorted.
    pub fn template_names(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(String::as_str)
    }

    /// Render a registered template with the given context.
    pub fn render(&self, name: &str, data: &Value) -> Result<String> {
        if !self.has_template(name) {
            return Err(FolioError::UnknownTemplate(name.to_string()));
        }
        self.hbs
            .render(name, data)
            .map_err(|e| FolioError::TemplateRender {
                name: name.to_string(),
                message: e.to_string(),
            })
    }

    /// Render a template string that is not part of the registry.
    ///
    /// The string may still include registered templates.
    pub fn render_str(&self, template: &str, data: &Value) -> Result<String> {
        Template::compile(template).map_err(|e| syntax_error(INLINE, Path::new(INLINE), &e))?;
        for reference in include::references(template) {
            if !self.has_template(&reference.target) {
                return Err(FolioError::UnknownInclude {
                    template: INLINE.into(),
                    include: reference.target,
                    line: reference.line,
                });
            }
        }
        self.hbs
            .render_template(template, data)
            .map_err(|e| FolioError::TemplateRender {
                name: INLINE.into(),
                message: e.to_string(),
            })
    }
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn syntax_error(name: &str, origin: &Path, err: &TemplateError) -> FolioError {
    let (line, column) = match err.pos() {
        Some((line, column)) => (Some(line), Some(column)),
        None => (None, None),
    };
    FolioError::TemplateSyntax {
        name: name.to_string(),
        path: origin.to_path_buf(),
        line,
        column,
        message: err.reason().to_string(),
    }
}

fn is_hidden(file_name: &std::ffi::OsStr) -> bool {
    file_name.to_str().is_some_and(|s| s.starts_with('.'))
}

fn template_name(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?.with_extension("");
    let parts: Option<Vec<&str>> = rel.components().map(|c| c.as_os_str().to_str()).collect();
    let name = parts?.join("/");
    (!name.is_empty()).then_some(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn renderer(templates: &[(&str, &str)]) -> TemplateRenderer {
        let mut r = TemplateRenderer::new();
        for (name, src) in templates {
            r.register(name, src, Path::new(name)).unwrap();
        }
        r.validate().unwrap();
        r
    }

    #[test]
    fn test_missing_variable_renders_empty() {
        let r = renderer(&[("t", "[{{profile.name}}]")]);
        assert_eq!(r.render("t", &json!({})).unwrap(), "[]");
    }

    #[test]
    fn test_dotted_path_substitution_escapes_html() {
        let r = renderer(&[("t", "{{site.title}} / {{{site.raw}}}")]);
        let out = r
            .render("t", &json!({ "site": { "title": "A & B", "raw": "<b>x</b>" } }))
            .unwrap();
        assert_eq!(out, "A &amp; B / <b>x</b>");
    }

    #[test]
    fn test_conditional_false_never_renders_body() {
        let r = renderer(&[("t", "{{#if enabled}}SECRET{{/if}}done")]);
        let out = r.render("t", &json!({ "enabled": false })).unwrap();
        assert_eq!(out, "done");
        assert!(!out.contains("SECRET"));
        assert_eq!(r.render("t", &json!({})).unwrap(), "done");
        assert_eq!(r.render("t", &json!({ "enabled": true })).unwrap(), "SECRETdone");
    }

    #[test]
    fn test_iteration_preserves_order() {
        let r = renderer(&[("t", "{{#each repos}}<li>{{name}}</li>{{/each}}")]);
        let data = json!({ "repos": [{ "name": "c" }, { "name": "a" }, { "name": "b" }] });
        let out = r.render("t", &data).unwrap();
        assert_eq!(out, "<li>c</li><li>a</li><li>b</li>");
        assert_eq!(out.matches("<li>").count(), 3);
    }

    #[test]
    fn test_iteration_over_empty_omits_body() {
        let r = renderer(&[("t", "<ul>{{#each repos}}<li>{{name}}</li>{{/each}}</ul>")]);
        assert_eq!(r.render("t", &json!({ "repos": [] })).unwrap(), "<ul></ul>");
    }

    #[test]
    fn test_include_passes_only_explicit_params() {
        let r = renderer(&[
            ("page", "{{#each repos}}{{include \"card\" repo=this}}{{/each}}"),
            ("card", "<{{repo.name}}|{{secret}}>"),
        ]);
        let data = json!({ "secret": "leak", "repos": [{ "name": "a" }, { "name": "b" }] });
        assert_eq!(r.render("page", &data).unwrap(), "<a|><b|>");
    }

    #[test]
    fn test_include_unknown_dynamic_target_fails() {
        let r = renderer(&[("page", "{{include target}}")]);
        let err = r.render("page", &json!({ "target": "nowhere" })).unwrap_err();
        assert!(matches!(err, FolioError::TemplateRender { .. }));
    }

    #[test]
    fn test_dynamic_include_cycle_is_an_error() {
        let r = renderer(&[("a", "{{include next next=next}}")]);
        let err = r.render("a", &json!({ "next": "a" })).unwrap_err();
        match err {
            FolioError::TemplateRender { name, message } => {
                assert_eq!(name, "a");
                assert!(message.contains("include cycle: a -> a"), "{message}");
            }
            other => panic!("unexpected error: {other}"),
        }

        // The include stack is unwound after a failure.
        let ok = renderer(&[("page", "[{{include \"leaf\"}}]"), ("leaf", "leaf")]);
        assert_eq!(ok.render("page", &json!({})).unwrap(), "[leaf]");
    }

    #[test]
    fn test_dynamic_include_cycle_through_two_templates() {
        let r = renderer(&[
            ("a", "{{include next next=back back=next}}"),
            ("b", "{{include next next=back back=next}}"),
        ]);
        let err = r.render("a", &json!({ "next": "b", "back": "a" })).unwrap_err();
        assert!(err.to_string().contains("include cycle: b -> a -> b"), "{err}");
    }

    #[test]
    fn test_unclosed_block_is_fatal_with_location() {
        let mut r = TemplateRenderer::new();
        let err = r
            .register(
                "pages/about",
                "<p>\n{{#if profile}}\n<b>{{profile.name}}</b>\n",
                Path::new("templates/pages/about.html"),
            )
            .unwrap_err();
        match err {
            FolioError::TemplateSyntax { name, path, .. } => {
                assert_eq!(name, "pages/about");
                assert_eq!(path, PathBuf::from("templates/pages/about.html"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_render_is_deterministic() {
        let r = renderer(&[("t", "{{#each xs}}{{@index}}:{{this}};{{/each}}{{m.b}}{{m.a}}")]);
        let data = json!({ "xs": ["x", "y"], "m": { "a": 1, "b": 2 } });
        let first = r.render("t", &data).unwrap();
        let second = r.render("t", &data).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, "0:x;1:y;21");
    }

    #[test]
    fn test_render_str_with_include() {
        let r = renderer(&[("greeting", "hello {{who}}")]);
        let out = r
            .render_str("{{include \"greeting\" who=name}}!", &json!({ "name": "jane" }))
            .unwrap();
        assert_eq!(out, "hello jane!");
        assert!(matches!(
            r.render_str("{{#each xs}}", &json!({})),
            Err(FolioError::TemplateSyntax { .. })
        ));
    }

    #[test]
    fn test_unknown_template() {
        let r = renderer(&[]);
        assert!(matches!(
            r.render("nope", &json!({})),
            Err(FolioError::UnknownTemplate(_))
        ));
    }

    #[test]
    fn test_from_dir_names_and_hidden_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("partials")).unwrap();
        std::fs::create_dir_all(dir.path().join(".git")).unwrap();
        std::fs::write(dir.path().join("partials/card.html"), "card").unwrap();
        std::fs::write(dir.path().join("index.html"), "{{include \"partials/card\"}}").unwrap();
        std::fs::write(dir.path().join(".git/HEAD"), "{{#if").unwrap();
        std::fs::write(dir.path().join(".draft.html"), "{{#if").unwrap();

        let r = TemplateRenderer::from_dir(dir.path()).unwrap();
        let names: Vec<_> = r.template_names().collect();
        assert_eq!(names, vec!["index", "partials/card"]);
        assert_eq!(r.render("index", &json!({})).unwrap(), "card");
    }

    #[test]
    fn test_from_dir_reports_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("broken.html");
        std::fs::write(&bad, "ok\n{{#each items}}\n{{name}}\n").unwrap();
        match TemplateRenderer::from_dir(dir.path()) {
            Err(FolioError::TemplateSyntax { name, path, .. }) => {
                assert_eq!(name, "broken");
                assert_eq!(path, bad);
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("malformed template accepted"),
        }
    }
}

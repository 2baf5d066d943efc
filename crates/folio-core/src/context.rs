//! Page contexts: the named variables one page render can see.
//!
//! A [`PageContext`] is built fresh for every (page, language) pair from the explicitly
//! passed [`SiteConfig`] and [`DataProvider`], handed to the renderer, and dropped.
//!
//! Feature switches are resolved into [`Features`] exactly once here. A disabled or
//! empty section is simply left out of the context, so templates gate on presence
//! (`{{#if repositories}}`) and never re-interpret raw configuration.
//!
//! | key | present when |
//! |-----|--------------|
//! | `site`, `page`, `lang`, `features`, `repo_description_lines_max` | always |
//! | `profile` | an account identifier exists and the profile feature is on |
//! | `repositories` | the repositories feature is on and records exist |
//! | `socials` | social icons are on and links exist |
//! | `languages` | the page is localized into more than one language |
//! | `data` | the page names a data file that exists |
//! | `t` | `strings.<lang>.yml` (or `strings.yml`) exists |

use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::{PageConfig, SiteConfig};
use crate::data::{DataProvider, RepositoryRecord};

/// Base name of the localized UI strings file.
pub const STRINGS_DATA: &str = "strings";

/// Feature toggles after resolution against the available data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Features {
    pub profile: bool,
    pub repositories: bool,
    pub social_icons: bool,
    pub language_switcher: bool,
}

impl Features {
    /// Combine configured switches with data availability for one page.
    pub fn resolve(config: &SiteConfig, data: &DataProvider, page: &PageConfig) -> Self {
        let flags = &config.features;
        Self {
            profile: flags.profile && data.primary_account().is_some(),
            repositories: flags.repositories && !data.repository_records().is_empty(),
            social_icons: flags.social_icons && !data.socials().is_empty(),
            language_switcher: flags.language_switcher
                && page.localized
                && config.languages.len() > 1,
        }
    }
}

/// Template-facing projection of a [`RepositoryRecord`].
///
/// Partial records get the configured placeholder description and `partial: true`;
/// unknown metadata fields are omitted rather than rendered empty.
#[derive(Debug, Clone, Serialize)]
pub struct RepositoryView {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stars: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    pub partial: bool,
}

impl RepositoryView {
    pub fn new(record: &RepositoryRecord, placeholder: &str) -> Self {
        let meta = record.metadata.clone().unwrap_or_default();
        let description = if record.description.is_empty() {
            placeholder.to_string()
        } else {
            record.description.clone()
        };
        Self {
            name: record.name.clone(),
            slug: record.slug.clone(),
            url: record.url(),
            description,
            stars: meta.stars,
            language: meta.language,
            homepage: meta.homepage,
            keywords: meta.keywords,
            updated: meta.updated,
            partial: record.is_partial(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct ProfileView<'a> {
    account: &'a str,
    github_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    position: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    affiliation: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<&'a str>,
}

#[derive(Debug, Clone, Serialize)]
struct LanguageLink {
    code: String,
    url: String,
    current: bool,
}

/// Variables available to one page render.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageContext {
    values: Map<String, Value>,
}

impl PageContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the context for `page` rendered in `lang`.
    pub fn build(config: &SiteConfig, data: &DataProvider, page: &PageConfig, lang: &str) -> Self {
        let features = Features::resolve(config, data, page);
        let mut ctx = Self::new();

        ctx.insert(
            "site",
            serde_json::json!({
                "title": config.site.title,
                "description": config.site.description,
                "url": config.site.url,
                "baseurl": config.site.baseurl,
            }),
        );
        ctx.insert(
            "page",
            serde_json::json!({
                "name": page.name,
                "title": page.title.as_deref().unwrap_or(&page.name),
                "url": config.page_url(page, lang),
                "lang": lang,
            }),
        );
        ctx.insert("lang", lang);
        ctx.insert("features", to_value(&features));
        ctx.insert("repo_description_lines_max", data.description_lines_max());

        if features.profile {
            if let Some(account) = data.primary_account() {
                let profile = &config.profile;
                ctx.insert(
                    "profile",
                    to_value(&ProfileView {
                        account,
                        github_url: format!("https://github.com/{account}"),
                        name: profile.name.as_deref(),
                        position: profile.position.as_deref(),
                        affiliation: profile.affiliation.as_deref(),
                        email: profile.email.as_deref(),
                        image: profile.image.as_deref(),
                    }),
                );
            }
        }

        if features.repositories {
            let views: Vec<_> = data
                .repository_records()
                .iter()
                .map(|record| RepositoryView::new(record, &config.repositories.placeholder))
                .collect();
            ctx.insert("repositories", to_value(&views));
        }

        if features.social_icons {
            ctx.insert("socials", to_value(data.socials()));
        }

        if features.language_switcher {
            let links: Vec<_> = config
                .languages
                .iter()
                .map(|code| LanguageLink {
                    code: code.clone(),
                    url: config.page_url(page, code),
                    current: code == lang,
                })
                .collect();
            ctx.insert("languages", to_value(&links));
        }

        if let Some(name) = &page.data {
            if let Some(value) = data.localized(name, lang) {
                ctx.insert("data", value);
            }
        }

        if let Some(strings) = data.localized(STRINGS_DATA, lang) {
            ctx.insert("t", strings);
        }

        ctx
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.values.insert(key.to_string(), value.into());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Resolve a dotted path such as `profile.name` or `repositories.0.name`.
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let mut current = self.values.get(parts.next()?)?;
        for part in parts {
            current = match current {
                Value::Object(map) => map.get(part)?,
                Value::Array(items) => items.get(part.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.values.clone())
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.values)
    }
}

impl From<Map<String, Value>> for PageContext {
    fn from(values: Map<String, Value>) -> Self {
        Self { values }
    }
}

fn to_value<T: Serialize + ?Sized>(value: &T) -> Value {
    // Views are plain structs of strings, numbers and bools.
    serde_json::to_value(value).unwrap_or(Value::Null)
}

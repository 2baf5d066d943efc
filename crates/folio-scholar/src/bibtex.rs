//! BibTeX generation for fetched publications.
//!
//! Everything here is pure: publications in, entry text out. Keys are
//! `<first-author-surname>-<year>` slugs made unique by a numeric suffix, entries are
//! typed from the venue fields, and hand-written entries in `manual_overrides.bib`
//! replace generated ones with the same key.

use std::collections::BTreeSet;
use std::path::Path;

use chrono::{DateTime, Utc};
use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::error::Result;
use crate::publication::Publication;

/// Generated bibliography file name inside the bibliography directory.
pub const BIBLIOGRAPHY_FILE: &str = "papers.bib";
/// Hand-maintained entries that take precedence over generated ones.
pub const MANUAL_OVERRIDES_FILE: &str = "manual_overrides.bib";

/// BibTeX entry type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    Article,
    InProceedings,
    PhdThesis,
    Misc,
}

impl EntryType {
    /// Journal wins over conference; a citation line mentioning a thesis marks a thesis.
    pub fn determine(publication: &Publication) -> Self {
        let bib = &publication.bib;
        if present(&bib.journal).is_some() {
            return Self::Article;
        }
        if present(&bib.booktitle).is_some() {
            return Self::InProceedings;
        }
        let citation = bib.citation.as_deref().unwrap_or_default().to_lowercase();
        if citation.contains("thesis") {
            Self::PhdThesis
        } else {
            Self::Misc
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Article => "article",
            Self::InProceedings => "inproceedings",
            Self::PhdThesis => "phdthesis",
            Self::Misc => "misc",
        }
    }
}

/// One generated entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BibEntry {
    pub key: String,
    pub entry_type: EntryType,
    pub text: String,
}

/// ASCII slug for citation keys: accents stripped, other runs collapsed to `-`.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for ch in text.nfkd().filter(|c| !is_combining_mark(*c)) {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        "publication".to_string()
    } else {
        slug
    }
}

/// `base`, or `base-2`, `base-3`, ... whichever is not taken yet.
pub fn unique_key(base: &str, existing: &[String]) -> String {
    let mut key = base.to_string();
    let mut index = 2;
    while existing.iter().any(|k| *k == key) {
        key = format!("{base}-{index}");
        index += 1;
    }
    key
}

/// Trim and collapse internal whitespace.
pub fn sanitize(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Numeric year, `0` when missing or not a number.
pub fn parse_year(value: Option<&str>) -> i64 {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(0)
}

/// Newest first; ties broken by title, also descending. Equal keys keep their order.
pub fn sort_publications(publications: &mut [Publication]) {
    publications.sort_by(|a, b| {
        let key = |p: &Publication| (parse_year(p.bib.pub_year.as_deref()), p.bib.title.clone());
        key(b).cmp(&key(a))
    });
}

/// Build one entry, registering its key in `existing_keys`.
pub fn build_entry(publication: &Publication, existing_keys: &mut Vec<String>) -> BibEntry {
    let bib = &publication.bib;
    let title = present(&bib.title).unwrap_or("Untitled");
    let year = present(&bib.pub_year).unwrap_or("n.d.");
    let authors = present(&bib.author).unwrap_or("Unknown");

    let first_author = authors.split(" and ").next().unwrap_or_default().trim();
    let surname = first_author.split_whitespace().last().unwrap_or("publication");
    let key = unique_key(&slugify(&format!("{surname}-{year}")), existing_keys);
    existing_keys.push(key.clone());

    let entry_type = EntryType::determine(publication);
    let url = present(&publication.pub_url).or(present(&bib.url));

    let fields = [
        ("author", Some(authors)),
        ("title", Some(title)),
        ("journal", present(&bib.journal)),
        ("booktitle", present(&bib.booktitle)),
        ("publisher", present(&bib.publisher)),
        ("volume", present(&bib.volume)),
        ("number", present(&bib.number)),
        ("pages", present(&bib.pages)),
        ("year", Some(year)),
        ("abstract", present(&bib.abstract_text)),
        ("url", url),
        ("bibtex_show", Some("true")),
    ];

    let formatted: Vec<String> = fields
        .iter()
        .filter(|(field, _)| match entry_type {
            EntryType::Article => *field != "booktitle",
            EntryType::InProceedings => *field != "journal",
            _ => true,
        })
        .filter_map(|(field, value)| {
            let value = sanitize((*value)?);
            (!value.is_empty()).then(|| format!("  {field} = {{{value}}}"))
        })
        .collect();

    let text = format!(
        "@{}{{{key},\n{}\n}}\n",
        entry_type.as_str(),
        formatted.join(",\n")
    );
    BibEntry {
        key,
        entry_type,
        text,
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// Hand-written entries appended verbatim after the generated ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManualOverrides {
    pub keys: BTreeSet<String>,
    /// Trimmed file contents plus a trailing newline; empty when there is nothing.
    pub text: String,
}

impl ManualOverrides {
    /// Read `path`; a missing or blank file means no overrides.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Ok(Self::parse(&std::fs::read_to_string(path)?))
    }

    pub fn parse(contents: &str) -> Self {
        let trimmed = contents.trim();
        if trimmed.is_empty() {
            return Self::default();
        }
        let keys = entry_key_pattern()
            .map(|re| {
                re.captures_iter(trimmed)
                    .map(|c| c[1].trim().to_string())
                    .collect()
            })
            .unwrap_or_default();
        Self {
            keys,
            text: format!("{trimmed}\n"),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

fn entry_key_pattern() -> Option<Regex> {
    Regex::new(r"@\w+\{([^,]+),").ok()
}

/// Full `papers.bib` contents.
pub fn render_file(
    entries: &[BibEntry],
    scholar_id: &str,
    overrides: &ManualOverrides,
    generated_at: DateTime<Utc>,
) -> String {
    let mut out = format!(
        "%% Auto-generated on {} UTC\n%% Source: Google Scholar ID {scholar_id}\n\n",
        generated_at.format("%Y-%m-%d %H:%M:%S")
    );
    for entry in entries {
        out.push_str(&entry.text);
        out.push('\n');
    }
    if !overrides.is_empty() {
        out.push_str(&format!(
            "\n%% Manual overrides appended from {MANUAL_OVERRIDES_FILE}\n\n"
        ));
        out.push_str(overrides.text.trim_end());
        out.push('\n');
    }
    out
}

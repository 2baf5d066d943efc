//! A publication as the BibTeX writer sees it.

/// Bibliographic fields; every one may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BibFields {
    pub title: Option<String>,
    pub pub_year: Option<String>,
    /// Authors joined with ` and `.
    pub author: Option<String>,
    pub journal: Option<String>,
    pub booktitle: Option<String>,
    pub publisher: Option<String>,
    pub volume: Option<String>,
    pub number: Option<String>,
    pub pages: Option<String>,
    pub abstract_text: Option<String>,
    pub url: Option<String>,
    /// Free-form venue line as Scholar lists it, e.g. "PhD thesis, Some University".
    pub citation: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Publication {
    pub bib: BibFields,
    /// Link to the publication page; preferred over `bib.url`.
    pub pub_url: Option<String>,
}

//! SerpAPI client for Google Scholar author pages.

use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{Result, ScholarError};
use crate::publication::{BibFields, Publication};

/// Public SerpAPI endpoint.
pub const API_BASE_URL: &str = "https://serpapi.com";

/// User agent sent with every request.
pub const USER_AGENT: &str = "folio-scholar";

/// Default timeout for SerpAPI requests (60 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Articles requested per page (SerpAPI's maximum for author pages).
pub const ARTICLES_PER_PAGE: usize = 100;

const ENGINE: &str = "google_scholar_author";

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AuthorPage {
    error: Option<String>,
    #[serde(default)]
    articles: Vec<ArticlePayload>,
}

#[derive(Debug, Clone, Deserialize)]
struct ArticlePayload {
    title: Option<String>,
    link: Option<String>,
    citation_id: Option<String>,
    authors: Option<String>,
    publication: Option<String>,
    year: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CitationPage {
    error: Option<String>,
    citation: Option<CitationPayload>,
}

#[derive(Debug, Default, Deserialize)]
struct CitationPayload {
    title: Option<String>,
    link: Option<String>,
    authors: Option<String>,
    publication_date: Option<String>,
    journal: Option<String>,
    conference: Option<String>,
    book: Option<String>,
    volume: Option<String>,
    issue: Option<String>,
    pages: Option<String>,
    publisher: Option<String>,
    description: Option<String>,
}

/// Client for the SerpAPI `google_scholar_author` engine.
pub struct SerpApiClient {
    http: Client,
    endpoint: String,
    api_key: String,
}

impl SerpApiClient {
    /// Client against the public API.
    pub fn new(api_key: &str) -> Result<Self> {
        Self::with_base_url(api_key, API_BASE_URL)
    }

    /// Client against another API root (test servers).
    pub fn with_base_url(api_key: &str, base_url: &str) -> Result<Self> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(ScholarError::MissingApiKey);
        }
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(DEFAULT_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            endpoint: format!("{}/search.json", base_url.trim_end_matches('/')),
            api_key: api_key.to_string(),
        })
    }

    /// Every publication of `author_id` with its citation details filled in.
    ///
    /// A publication whose details cannot be fetched is skipped with a warning; an
    /// author with no usable publications at all is an error.
    pub async fn fetch_publications(&self, author_id: &str) -> Result<Vec<Publication>> {
        let articles = self.list_articles(author_id).await?;
        tracing::info!("found {} articles for Scholar ID '{author_id}'", articles.len());

        let mut publications = Vec::with_capacity(articles.len());
        for article in articles {
            let label = article.title.clone().unwrap_or_default();
            let Some(citation_id) = article.citation_id.as_deref() else {
                tracing::warn!("skipping '{label}': no citation id");
                continue;
            };
            match self.fetch_citation(citation_id).await {
                Ok(citation) => publications.push(to_publication(&article, citation)),
                Err(err) => tracing::warn!("failed to fill publication '{label}': {err}"),
            }
        }

        if publications.is_empty() {
            return Err(ScholarError::NoPublications(author_id.to_string()));
        }
        Ok(publications)
    }

    async fn list_articles(&self, author_id: &str) -> Result<Vec<ArticlePayload>> {
        let num = ARTICLES_PER_PAGE.to_string();
        let mut articles = Vec::new();
        let mut start = 0usize;

        loop {
            let start_param = start.to_string();
            let page: AuthorPage = self
                .get(&[
                    ("author_id", author_id),
                    ("hl", "en"),
                    ("num", num.as_str()),
                    ("start", start_param.as_str()),
                ])
                .await?;
            if let Some(message) = page.error {
                return Err(ScholarError::Service(message));
            }

            let full_page = page.articles.len() >= ARTICLES_PER_PAGE;
            articles.extend(page.articles);
            if !full_page {
                break;
            }
            start += ARTICLES_PER_PAGE;
        }
        Ok(articles)
    }

    async fn fetch_citation(&self, citation_id: &str) -> Result<CitationPayload> {
        let page: CitationPage = self
            .get(&[("view_op", "view_citation"), ("citation_id", citation_id)])
            .await?;
        if let Some(message) = page.error {
            return Err(ScholarError::Service(message));
        }
        Ok(page.citation.unwrap_or_default())
    }

    async fn get<T: DeserializeOwned>(&self, params: &[(&str, &str)]) -> Result<T> {
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("engine", ENGINE)])
            .query(params)
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await?;
        Ok(self.checked(response).await?.json().await?)
    }

    async fn checked(&self, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.json::<ErrorBody>().await.ok().and_then(|b| b.error);
        Err(match message {
            Some(message) => ScholarError::Service(message),
            None => ScholarError::Api {
                url: self.endpoint.clone(),
                status: status.as_u16(),
            },
        })
    }
}

fn to_publication(article: &ArticlePayload, citation: CitationPayload) -> Publication {
    let year = citation
        .publication_date
        .as_deref()
        .and_then(|date| date.split('/').next())
        .map(str::trim)
        .filter(|y| !y.is_empty())
        .map(str::to_string)
        .or_else(|| article.year.clone());
    let authors = citation.authors.or_else(|| article.authors.clone());

    Publication {
        bib: BibFields {
            title: citation.title.or_else(|| article.title.clone()),
            pub_year: year,
            author: authors.as_deref().map(join_authors),
            journal: citation.journal,
            booktitle: citation.conference.or(citation.book),
            publisher: citation.publisher,
            volume: citation.volume,
            number: citation.issue,
            pages: citation.pages,
            abstract_text: citation.description,
            url: article.link.clone(),
            citation: article.publication.clone(),
        },
        pub_url: citation.link,
    }
}

/// `"A Smith, B Jones"` to `"A Smith and B Jones"`.
fn join_authors(authors: &str) -> String {
    authors
        .split(',')
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .collect::<Vec<_>>()
        .join(" and ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client(server: &mockito::ServerGuard) -> SerpApiClient {
        SerpApiClient::with_base_url("test-key", &server.url()).unwrap()
    }

    fn author_query(start: &str) -> Matcher {
        Matcher::AllOf(vec![
            Matcher::UrlEncoded("engine".into(), ENGINE.into()),
            Matcher::UrlEncoded("author_id".into(), "abc123".into()),
            Matcher::UrlEncoded("start".into(), start.into()),
            Matcher::UrlEncoded("api_key".into(), "test-key".into()),
        ])
    }

    fn citation_query(id: &str) -> Matcher {
        Matcher::AllOf(vec![
            Matcher::UrlEncoded("view_op".into(), "view_citation".into()),
            Matcher::UrlEncoded("citation_id".into(), id.into()),
        ])
    }

    #[test]
    fn test_join_authors() {
        assert_eq!(join_authors("Y LeCun, Y Bengio,  G Hinton"), "Y LeCun and Y Bengio and G Hinton");
        assert_eq!(join_authors("Solo"), "Solo");
    }

    #[test]
    fn test_blank_api_key_rejected() {
        assert!(matches!(
            SerpApiClient::new("  "),
            Err(ScholarError::MissingApiKey)
        ));
    }

    #[tokio::test]
    async fn test_fetch_publications_fills_details() {
        let mut server = mockito::Server::new_async().await;
        let list = server
            .mock("GET", "/search.json")
            .match_query(author_query("0"))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "articles": [
                        { "title": "Deep learning", "link": "https://scholar.example/1",
                          "citation_id": "c1", "authors": "Y LeCun, Y Bengio",
                          "publication": "Nature 521, 2015", "year": "2015" },
                        { "title": "Broken", "citation_id": "c2" },
                        { "title": "Orphan" }
                    ]
                }"#,
            )
            .create_async()
            .await;
        let first = server
            .mock("GET", "/search.json")
            .match_query(citation_query("c1"))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "citation": {
                        "title": "Deep learning",
                        "link": "https://nature.example/dl",
                        "authors": "Yann LeCun, Yoshua Bengio, Geoffrey Hinton",
                        "publication_date": "2015/5/28",
                        "journal": "Nature",
                        "volume": "521",
                        "issue": "7553",
                        "pages": "436-444",
                        "description": "Deep learning allows..."
                    }
                }"#,
            )
            .create_async()
            .await;
        let broken = server
            .mock("GET", "/search.json")
            .match_query(citation_query("c2"))
            .with_status(500)
            .create_async()
            .await;

        let pubs = client(&server).fetch_publications("abc123").await.unwrap();
        list.assert_async().await;
        first.assert_async().await;
        broken.assert_async().await;

        assert_eq!(pubs.len(), 1);
        let bib = &pubs[0].bib;
        assert_eq!(bib.author.as_deref(), Some("Yann LeCun and Yoshua Bengio and Geoffrey Hinton"));
        assert_eq!(bib.pub_year.as_deref(), Some("2015"));
        assert_eq!(bib.journal.as_deref(), Some("Nature"));
        assert_eq!(bib.number.as_deref(), Some("7553"));
        assert_eq!(bib.citation.as_deref(), Some("Nature 521, 2015"));
        assert_eq!(bib.url.as_deref(), Some("https://scholar.example/1"));
        assert_eq!(pubs[0].pub_url.as_deref(), Some("https://nature.example/dl"));
    }

    #[tokio::test]
    async fn test_fetch_publications_paginates() {
        let mut server = mockito::Server::new_async().await;
        let first_page: Vec<_> = (0..ARTICLES_PER_PAGE)
            .map(|i| serde_json::json!({ "title": format!("Paper {i}") }))
            .collect();
        let page1 = server
            .mock("GET", "/search.json")
            .match_query(author_query("0"))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(serde_json::json!({ "articles": first_page }).to_string())
            .create_async()
            .await;
        let page2 = server
            .mock("GET", "/search.json")
            .match_query(author_query("100"))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{ "articles": [ { "title": "Last", "citation_id": "c9", "year": "2020" } ] }"#)
            .create_async()
            .await;
        let _detail = server
            .mock("GET", "/search.json")
            .match_query(citation_query("c9"))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{ "citation": { "conference": "Conf" } }"#)
            .create_async()
            .await;

        let pubs = client(&server).fetch_publications("abc123").await.unwrap();
        page1.assert_async().await;
        page2.assert_async().await;

        assert_eq!(pubs.len(), 1);
        assert_eq!(pubs[0].bib.title.as_deref(), Some("Last"));
        assert_eq!(pubs[0].bib.pub_year.as_deref(), Some("2020"));
        assert_eq!(pubs[0].bib.booktitle.as_deref(), Some("Conf"));
    }

    #[tokio::test]
    async fn test_service_error_message_surfaces() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/search.json")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_header("content-type", "application/json")
            .with_body(r#"{ "error": "Invalid API key." }"#)
            .create_async()
            .await;

        let err = client(&server).fetch_publications("abc123").await.unwrap_err();
        assert!(matches!(err, ScholarError::Service(m) if m == "Invalid API key."));
    }

    #[tokio::test]
    async fn test_no_publications_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/search.json")
            .match_query(author_query("0"))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{ "articles": [] }"#)
            .create_async()
            .await;

        let err = client(&server).fetch_publications("abc123").await.unwrap_err();
        assert!(matches!(err, ScholarError::NoPublications(id) if id == "abc123"));
    }
}

//! Google Scholar publication import for folio sites.
//!
//! Fetches an author's publications through SerpAPI, turns them into BibTeX entries
//! and writes `_bibliography/papers.bib`, appending hand-maintained entries from
//! `manual_overrides.bib` in place of generated ones with the same key.

pub mod bibtex;
pub mod client;
pub mod error;
pub mod publication;
pub mod update;

pub use client::SerpApiClient;
pub use error::{Result, ScholarError};
pub use update::{load_scholar_user_id, update_bibliography, UpdateReport};

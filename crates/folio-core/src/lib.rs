//! Core library for the folio homepage builder.
//!
//! Turns a site directory (config, Handlebars templates, YAML data files) into static
//! pages. The pieces compose in one direction:
//!
//! - [`config::SiteConfig`]: explicitly passed site configuration
//! - [`data::DataProvider`]: repository records, primary account, socials, localized data
//! - [`context::PageContext`]: the variables of one (page, language) render
//! - [`templates::renderer::TemplateRenderer`]: substitution, conditionals, iteration, includes
//! - [`site::Site`]: renders every page and writes the output directory
//!
//! Fetching repository metadata from GitHub lives in the separate
//! [`folio_github`](https://docs.rs/folio-github) crate; nothing here touches the network.

pub mod config;
pub mod context;
pub mod data;
pub mod error;
pub mod project;
pub mod site;
pub mod templates;

//! Template system for folio sites.
//!
//! Site templates live under the site's `templates/` directory and are rendered at
//! build time with [Handlebars](https://handlebarsjs.com/) through
//! [`renderer::TemplateRenderer`]. The starter site used by `folio init` is embedded
//! into the binary in [`embedded`].
//!
//! ## Directives
//!
//! - `{{site.title}}`: dotted-path substitution, HTML-escaped; missing → empty
//! - `{{{content}}}`: raw substitution (layouts use it for the page body)
//! - `{{#if profile}}…{{else}}…{{/if}}`: conditional block
//! - `{{#each repositories}}…{{/each}}`: iteration; the element is `this`
//! - `{{include "partials/repository" repo=this}}`: include with explicit parameters,
//!   see [`include`]
//!
//! ## Naming
//!
//! A template's name is its path under `templates/` without extension:
//! `templates/partials/repository.html` → `partials/repository`.

pub mod embedded;
pub mod include;
pub mod renderer;

//! Compile-time embedded starter site for `folio init`.
//!
//! Each entry pairs a path inside the new site with a file from `templates/starter/`
//! loaded via [`include_str!`]. The paths are relative to this source file
//! (`crates/folio-core/src/templates/embedded.rs`).
//!
//! ## Adding a starter file
//!
//! 1. Place the file under `templates/starter/`, mirroring its path in a site
//! 2. Add it to [`STARTER_FILES`] (or [`STARTER_DATA_TEMPLATES`] if it needs the account)
//! 3. Run `cargo build`; a wrong path fails compilation
//!
//! ## Warning
//!
//! Do NOT rename or move starter files without updating the `include_str!` path here.
//! The starter pages must keep rendering against the keys built by
//! [`crate::context::PageContext::build`]; the `starter_site` integration test covers this.

// -------------------------------------------------------
// Layouts, pages and partials (copied verbatim)
// -------------------------------------------------------

pub const LAYOUT_DEFAULT: &str = include_str!("../../../../templates/starter/templates/layouts/default.html");
pub const PAGE_ABOUT: &str = include_str!("../../../../templates/starter/templates/pages/about.html");
pub const PAGE_REPOSITORIES: &str = include_str!("../../../../templates/starter/templates/pages/repositories.html");
pub const PARTIAL_PROFILE: &str = include_str!("../../../../templates/starter/templates/partials/profile.html");
pub const PARTIAL_REPOSITORY: &str = include_str!("../../../../templates/starter/templates/partials/repository.html");
pub const PARTIAL_SOCIALS: &str = include_str!("../../../../templates/starter/templates/partials/socials.html");
pub const PARTIAL_LANGUAGE_SWITCHER: &str = include_str!("../../../../templates/starter/templates/partials/language_switcher.html");

// -------------------------------------------------------
// Data files
// -------------------------------------------------------

pub const ABOUT_EN: &str = include_str!("../../../../templates/starter/_data/about.en.yml");
pub const ABOUT_ZH: &str = include_str!("../../../../templates/starter/_data/about.zh.yml");
pub const STRINGS_EN: &str = include_str!("../../../../templates/starter/_data/strings.en.yml");
pub const STRINGS_ZH: &str = include_str!("../../../../templates/starter/_data/strings.zh.yml");

// Rendered with `{ "account": ... }` before writing.
pub const REPOSITORIES_TMPL: &str = include_str!("../../../../templates/starter/_data/repositories.yml.tmpl");
pub const SOCIALS_TMPL: &str = include_str!("../../../../templates/starter/_data/socials.yml.tmpl");

/// Files written as-is, keyed by their path inside the site.
pub const STARTER_FILES: &[(&str, &str)] = &[
    ("templates/layouts/default.html", LAYOUT_DEFAULT),
    ("templates/pages/about.html", PAGE_ABOUT),
    ("templates/pages/repositories.html", PAGE_REPOSITORIES),
    ("templates/partials/profile.html", PARTIAL_PROFILE),
    ("templates/partials/repository.html", PARTIAL_REPOSITORY),
    ("templates/partials/socials.html", PARTIAL_SOCIALS),
    ("templates/partials/language_switcher.html", PARTIAL_LANGUAGE_SWITCHER),
    ("_data/about.en.yml", ABOUT_EN),
    ("_data/about.zh.yml", ABOUT_ZH),
    ("_data/strings.en.yml", STRINGS_EN),
    ("_data/strings.zh.yml", STRINGS_ZH),
];

/// Files rendered with the account before writing, keyed by their path inside the site.
pub const STARTER_DATA_TEMPLATES: &[(&str, &str)] = &[
    ("_data/repositories.yml", REPOSITORIES_TMPL),
    ("_data/socials.yml", SOCIALS_TMPL),
];

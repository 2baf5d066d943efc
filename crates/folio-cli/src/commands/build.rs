use std::path::Path;

use anyhow::Result;

use folio_core::project;
use folio_core::site::Site;

use crate::output;

/// Render every page of the site and write the output directory.
///
/// Nothing is cleaned or written until every page has rendered.
pub async fn run(config_path: &Path, clean: bool) -> Result<()> {
    output::print_header("folio build");

    output::print_step(1, 2, "Loading config, templates and data...");
    let (root, config) = project::load_site(config_path)?;
    let site = Site::load(&root, config)?;

    let action = if clean {
        "Rendering pages and replacing output..."
    } else {
        "Rendering pages..."
    };
    output::print_step(2, 2, action);
    let report = site.build(clean)?;

    output::print_success("Build complete");
    output::print_key_value("Output", &report.output_dir.display().to_string());
    output::print_key_value("Templates", &report.templates.to_string());
    output::print_key_value("Repositories", &report.repositories.to_string());
    if let Some(account) = &report.account {
        output::print_key_value("Account", account);
    }
    for page in &report.pages {
        let label = format!("{} [{}]", page.name, page.lang);
        output::print_key_value(&label, &page.path.display().to_string());
    }

    Ok(())
}

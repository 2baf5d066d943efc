use std::path::Path;

use anyhow::Result;

use folio_core::project;
use folio_core::site::Site;

use crate::output;

/// Load and render the whole site in memory without touching the output directory.
pub async fn run(config_path: &Path) -> Result<()> {
    output::print_header("folio check");

    output::print_step(1, 2, "Loading config, templates and data...");
    let (root, config) = project::load_site(config_path)?;
    let site = Site::load(&root, config)?;

    output::print_step(2, 2, "Rendering pages...");
    let pages = site.render_all()?;

    let data = site.data();
    match data.primary_account() {
        Some(account) => output::print_key_value("Account", account),
        None => output::print_warning("No primary account; the profile section is omitted"),
    }
    let records = data.repository_records();
    let partial = records.iter().filter(|r| r.is_partial()).count();
    output::print_key_value("Repositories", &records.len().to_string());
    if partial > 0 {
        output::print_warning(&format!(
            "{partial} repositories lack metadata; run `folio sync` to fetch it"
        ));
    }

    output::print_success(&format!(
        "{} templates, {} pages render cleanly",
        site.renderer().template_names().count(),
        pages.len()
    ));
    Ok(())
}

use std::path::Path;

use anyhow::{Context, Result};

use folio_core::project;
use folio_scholar::{update_bibliography, SerpApiClient};

use crate::output;

/// Rebuild the site's BibTeX bibliography from its Google Scholar profile.
pub async fn run(config_path: &Path, api_key: Option<String>, api_url: &str) -> Result<()> {
    output::print_header("folio scholar");

    let (root, config) = project::load_site(config_path)?;
    let data_dir = root.join(&config.paths.data);
    let bibliography_dir = root.join(&config.paths.bibliography);

    let api_key = api_key
        .or_else(|| std::env::var("SERPAPI_KEY").ok())
        .filter(|k| !k.trim().is_empty())
        .context("missing SerpAPI key; pass --api-key or export SERPAPI_API_KEY")?;
    let client = SerpApiClient::with_base_url(&api_key, api_url)?;

    let pb = output::spinner("Fetching publications from Google Scholar...");
    let report = update_bibliography(&client, &data_dir, &bibliography_dir).await;
    pb.finish_and_clear();
    let report = report?;

    output::print_success(&format!("Wrote {} generated entries", report.written));
    output::print_key_value("Scholar ID", &report.scholar_id);
    output::print_key_value("File", &report.path.display().to_string());
    if report.manual_entries > 0 {
        output::print_key_value(
            "Manual overrides",
            &format!(
                "{} appended, {} generated entries replaced",
                report.manual_entries, report.overridden
            ),
        );
    }
    Ok(())
}

use std::path::Path;

use anyhow::Result;
use dialoguer::Input;

use folio_core::project;

use crate::output;

/// Initialize a new folio site.
///
/// Writes the config, the starter templates and the data files. If no account is
/// given and a terminal is attached, prompts for one; an empty answer leaves the
/// profile and repository sections empty.
pub async fn run(name: &str, account: Option<String>) -> Result<()> {
    output::print_header(&format!("folio init: {name}"));

    let account = match account {
        Some(account) => Some(account),
        None if console::user_attended() => {
            let answer: String = Input::new()
                .with_prompt("GitHub account (leave empty to skip)")
                .allow_empty(true)
                .interact_text()?;
            Some(answer)
        }
        None => None,
    };
    let account = account
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty());

    let site_dir = Path::new(name);
    output::print_step(1, 2, &format!("Creating site directory: {name}/"));
    let config = project::scaffold(site_dir, name, account.as_deref())?;

    output::print_step(2, 2, "Checking the starter site");
    let site = folio_core::site::Site::load(site_dir, config)?;
    output::print_key_value("Pages", &site.config().pages.len().to_string());
    output::print_key_value("Languages", &site.config().languages.join(", "));
    match &account {
        Some(account) => output::print_key_value("Account", account),
        None => output::print_warning(
            "No GitHub account set; edit _data/repositories.yml to add one",
        ),
    }

    output::print_success(&format!("Site '{name}' created"));
    println!();
    println!("  Next steps:");
    println!("    cd {name}");
    if account.is_some() {
        println!("    GITHUB_TOKEN=... folio sync");
    }
    println!("    folio build");
    println!();

    Ok(())
}

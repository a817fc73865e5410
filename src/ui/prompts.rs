use anyhow::Result;
use dialoguer::{MultiSelect, Select};
use is_terminal::IsTerminal;

use crate::migration::Project;

/// Prompts only make sense when a person is at both ends of the terminal
pub fn is_interactive() -> bool {
    std::io::stdin().is_terminal() && std::io::stdout().is_terminal()
}

/// Read an API key without echoing it
pub fn prompt_api_key(side: &str, username: Option<&str>) -> Result<String> {
    let prompt = match username {
        Some(user) => format!("{} API key for {}: ", side, user),
        None => format!("{} API key: ", side),
    };
    Ok(rpassword::prompt_password(prompt)?)
}

/// Pick the source projects to export; every project starts checked
pub fn select_projects(projects: &[Project]) -> Result<Vec<Project>> {
    if projects.is_empty() {
        return Ok(Vec::new());
    }

    let items: Vec<String> = projects.iter().map(|p| p.to_string()).collect();
    let defaults = vec![true; items.len()];

    let selection = MultiSelect::new()
        .with_prompt("Select projects to export (space to toggle, enter to confirm)")
        .items(&items)
        .defaults(&defaults)
        .interact()?;

    Ok(selection.into_iter().map(|i| projects[i].clone()).collect())
}

/// Pick the destination project for `source`, or skip it.
///
/// Defaults to the destination project with the same id when there is one.
pub fn select_destination(source: &Project, destinations: &[Project]) -> Result<Option<String>> {
    let mut items: Vec<String> = destinations.iter().map(|p| p.to_string()).collect();
    items.push("Skip this project".to_string());
    let skip_index = items.len() - 1;

    let default_index = destinations
        .iter()
        .position(|p| p.id == source.id)
        .unwrap_or(skip_index);

    let selection = Select::new()
        .with_prompt(format!("Destination for {}", source))
        .items(&items)
        .default(default_index)
        .interact()?;

    Ok(destinations.get(selection).map(|p| p.id.clone()))
}

/// Yes/No choice; `true` on "Yes"
pub fn prompt_confirmation(prompt: &str, default_yes: bool) -> Result<bool> {
    let choice = Select::new()
        .with_prompt(prompt)
        .items(&["Yes", "No"])
        .default(if default_yes { 0 } else { 1 })
        .interact()?;

    Ok(choice == 0)
}

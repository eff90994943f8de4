/*
[INPUT]:  Interactive user input via CLI
[OUTPUT]: Generated YAML configuration file
[POS]:    Command layer - initialization
[UPDATE]: When ConsoleConfig schema changes
*/

use anyhow::Result;
use console::style;
use dialoguer::{Confirm, Input, Password, Select, theme::ColorfulTheme};
use std::path::Path;

use crate::config::ConsoleConfig;

const LOG_LEVELS: [&str; 4] = ["info", "debug", "warn", "error"];

pub fn run_init(output: &Path) -> Result<()> {
    println!("{}", style("Welcome to Chaos Console Init").bold().cyan());
    println!(
        "{}",
        style("This will guide you through creating a console configuration.").dim()
    );

    let theme = ColorfulTheme::default();

    if output.exists() {
        let overwrite = Confirm::with_theme(&theme)
            .with_prompt(format!("{} exists. Overwrite?", output.display()))
            .default(false)
            .interact()?;
        if !overwrite {
            println!("{}", style("Aborted.").yellow());
            return Ok(());
        }
    }

    let defaults = ConsoleConfig::default();

    println!("\n{}", style("--- Service ---").bold());
    let endpoint: String = Input::with_theme(&theme)
        .with_prompt("Endpoint")
        .default(defaults.endpoint.clone())
        .validate_with(|value: &String| -> Result<(), String> {
            url::Url::parse(value).map(|_| ()).map_err(|err| err.to_string())
        })
        .interact_text()?;

    let namespace: String = Input::with_theme(&theme)
        .with_prompt("Namespace (empty for none)")
        .allow_empty(true)
        .interact_text()?;

    let access_token = Password::with_theme(&theme)
        .with_prompt("Access token (empty for none)")
        .allow_empty_password(true)
        .interact()?;

    println!("\n{}", style("--- Logging ---").bold());
    let level = Select::with_theme(&theme)
        .with_prompt("Log level")
        .items(&LOG_LEVELS)
        .default(0)
        .interact()?;

    let config = ConsoleConfig {
        endpoint,
        namespace: non_empty(namespace),
        access_token: non_empty(access_token),
        log: crate::config::LogConfig {
            level: LOG_LEVELS[level].to_string(),
            ..defaults.log.clone()
        },
        ..defaults
    };
    config.validate()?;
    config.write_yaml(output)?;

    println!("\n{}", style("SUCCESS!").bold().green());
    println!(
        "Configuration written to: {}",
        style(output.display()).cyan()
    );
    Ok(())
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_answers_become_none() {
        assert_eq!(non_empty("  ".to_string()), None);
        assert_eq!(non_empty(" ns ".to_string()), Some("ns".to_string()));
    }
}

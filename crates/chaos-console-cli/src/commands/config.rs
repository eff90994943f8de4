/*
[INPUT]:  Loaded ConsoleConfig
[OUTPUT]: Effective settings printed for the user
[POS]:    Command layer - config check
[UPDATE]: When new config sections should be reported
*/

use anyhow::Result;
use console::style;
use std::io::Write;

use crate::config::ConsoleConfig;
use crate::session::SessionStore;

pub fn check(config: &ConsoleConfig, out: &mut dyn Write) -> Result<()> {
    config.validate()?;

    writeln!(out, "{}", style("configuration ok").green())?;
    writeln!(out, "  endpoint:   {}", config.endpoint)?;
    writeln!(out, "  namespace:  {}", config.namespace.as_deref().unwrap_or("-"))?;
    writeln!(
        out,
        "  token:      {}",
        if config.access_token.is_some() { "set" } else { "not set" }
    )?;
    writeln!(
        out,
        "  poll:       every {}ms, give up after {} errors",
        config.poll.interval_ms, config.poll.max_consecutive_errors
    )?;
    let session = match &config.session_dir {
        Some(dir) => SessionStore::new(dir).path().display().to_string(),
        None => SessionStore::in_data_dir()
            .map(|store| store.path().display().to_string())
            .unwrap_or_else(|_| "-".to_string()),
    };
    writeln!(out, "  session:    {session}")?;
    Ok(())
}

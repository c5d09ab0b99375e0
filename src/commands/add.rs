use anyhow::{Context, Result};
use cares_core::admin::AdminGate;
use cares_core::config::CaresConfig;
use cares_core::{service, EventStore, NewEvent};
use chrono::NaiveDate;
use dialoguer::Input;
use owo_colors::OwoColorize;

use crate::render::Render;

/// Fields given on the command line; anything missing is prompted for.
pub struct AddArgs {
    pub title: Option<String>,
    pub organization: Option<String>,
    pub date: Option<String>,
    pub tags: Option<String>,
    pub spots: Option<u32>,
}

pub fn run(config: &CaresConfig, args: AddArgs) -> Result<()> {
    let password =
        rpassword::prompt_password("  Admin password: ").context("Failed to read password")?;
    AdminGate::new(config.admin_password.clone()).check(&password)?;

    let title = match args.title {
        Some(t) => t,
        None => prompt_text("  Event title")?,
    };

    let organization = match args.organization {
        Some(o) => o,
        None => prompt_text("  Organization")?,
    };

    let date = match args.date {
        Some(d) => parse_date(&d)?,
        None => prompt_with_retry("  Date (YYYY-MM-DD)", parse_date)?,
    };

    let tags = match args.tags {
        Some(t) => t,
        None => prompt_text("  Tags (comma-separated, e.g. environment, cleanup)")?,
    };

    let spots = match args.spots {
        Some(s) => s,
        None => Input::<u32>::new()
            .with_prompt("  Number of spots")
            .default(1)
            .interact_text()?,
    };

    let fields = NewEvent {
        title,
        organization,
        date: date.format("%Y-%m-%d").to_string(),
        tags,
        spots: Some(spots),
    };

    let store = EventStore::from_config(config);
    let event = store.update(|events| service::add(events, fields))?;

    println!("{} {}", "Event added:".green(), event.render());
    Ok(())
}

fn prompt_text(prompt: &str) -> Result<String> {
    Ok(Input::<String>::new().with_prompt(prompt).interact_text()?)
}

/// Prompt until the input parses.
fn prompt_with_retry<T, F>(prompt: &str, parse: F) -> Result<T>
where
    F: Fn(&str) -> Result<T>,
{
    loop {
        let input: String = Input::new().with_prompt(prompt).interact_text()?;
        match parse(&input) {
            Ok(result) => return Ok(result),
            Err(e) => {
                eprintln!("  {}", e.to_string().red());
            }
        }
    }
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| anyhow::anyhow!("Invalid date '{}'. Expected YYYY-MM-DD", s))
}

use anyhow::Result;
use cares_core::config::CaresConfig;
use cares_core::{service, EventStore};
use owo_colors::OwoColorize;

use crate::render::{date_label, Render};

pub fn run(config: &CaresConfig, all: bool) -> Result<()> {
    let store = EventStore::from_config(config);
    let today = chrono::Local::now().date_naive();

    // Unlike the server, report a broken events file instead of showing nothing
    let events = store.load()?;

    let events = if all {
        let mut events = events;
        events.sort_by_key(|e| e.date);
        events
    } else {
        service::upcoming(&events, today)
    };

    if events.is_empty() {
        println!("{}", "No upcoming events found".dimmed());
        return Ok(());
    }

    // Group events by day and print
    let mut current_date = None;

    for event in &events {
        if current_date != Some(event.date) {
            if current_date.is_some() {
                println!();
            }
            println!("{}", date_label(event.date, today).bold());
            current_date = Some(event.date);
        }

        println!("  {}", event.render());
    }

    Ok(())
}

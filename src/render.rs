//! Terminal rendering for cares types.

use cares_core::Event;
use chrono::NaiveDate;
use owo_colors::OwoColorize;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for Event {
    fn render(&self) -> String {
        let id = format!("{:>5}", format!("#{}", self.id));
        let details = format!("{} · {} {}", self.organization, self.spots, pluralize("spot", self.spots));
        let tags = self.tags.join(", ");

        format!(
            "{} {} {} {}",
            id.dimmed(),
            self.title.bold(),
            details.dimmed(),
            format!("[{tags}]").cyan()
        )
    }
}

/// Human-readable day label (e.g. "Today", "Tomorrow", "Wed May 1 2030")
pub fn date_label(date: NaiveDate, today: NaiveDate) -> String {
    match (date - today).num_days() {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        _ => date.format("%a %b %-d %Y").to_string(),
    }
}

fn pluralize(word: &str, count: u32) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}

//! Volunteer event records.
//!
//! An `Event` is what lives in the events file. A `NewEvent` is the raw
//! add-event form before validation; see [`crate::service::add`].

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A volunteer opportunity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Unique, positive, assigned as max existing id + 1
    pub id: u64,
    pub title: String,
    pub organization: String,
    /// Serialized as YYYY-MM-DD
    pub date: NaiveDate,
    /// Number of volunteers wanted
    pub spots: u32,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.title, self.organization)
    }
}

/// The add-event form as submitted. Every field is required;
/// presence is checked when the event is built.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewEvent {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub organization: String,
    /// YYYY-MM-DD, parsed when the event is built
    #[serde(default)]
    pub date: String,
    /// Comma-separated, e.g. "environment, cleanup"
    #[serde(default)]
    pub tags: String,
    pub spots: Option<u32>,
}

/// Split a comma-separated tag list, trimming each tag and dropping empties.
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tags() {
        assert_eq!(parse_tags("environment, cleanup"), vec!["environment", "cleanup"]);
        assert_eq!(parse_tags("  kids ,, elderly  ,"), vec!["kids", "elderly"]);
        assert!(parse_tags(" , ").is_empty());
    }

    #[test]
    fn test_event_json_shape() {
        let event = Event {
            id: 7,
            title: "Lake Walk".to_string(),
            organization: "Friends of Lakes".to_string(),
            date: NaiveDate::from_ymd_opt(2030, 5, 1).unwrap(),
            spots: 12,
            tags: vec!["environment".to_string()],
        };

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["date"], "2030-05-01");
        assert_eq!(value["id"], 7);
        assert_eq!(value["tags"][0], "environment");
    }

    #[test]
    fn test_event_rejects_invalid_date() {
        let json = r#"{"id":1,"title":"t","organization":"o","date":"2030-02-30","spots":1,"tags":[]}"#;
        assert!(serde_json::from_str::<Event>(json).is_err());
    }
}

//! Per-visitor session state.
//!
//! A session lives as long as the visitor's browser session and is never
//! written to disk. Enrollments recorded here are not stored on the event.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{CaresError, CaresResult};

/// The three views a visitor can navigate between
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    #[default]
    AllEvents,
    MyEvents,
    AddEvent,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Session {
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub enrolled_event_ids: HashSet<u64>,
    pub current_page: Page,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the visitor's identity. Both fields are required; on failure the
    /// session is unchanged. Logging in again keeps existing enrollments.
    pub fn login(&mut self, name: &str, email: &str) -> CaresResult<()> {
        let name = name.trim();
        let email = email.trim();

        if name.is_empty() || email.is_empty() {
            return Err(CaresError::Validation(
                "Please enter both your name and email to log in".into(),
            ));
        }

        self.user_name = Some(name.to_string());
        self.user_email = Some(email.to_string());
        Ok(())
    }

    pub fn is_logged_in(&self) -> bool {
        self.user_name.is_some()
    }

    /// The logged-in identity as (name, email).
    pub fn identity(&self) -> Option<(&str, &str)> {
        Some((self.user_name.as_deref()?, self.user_email.as_deref()?))
    }

    /// Record an enrollment. Returns false if already enrolled.
    pub fn enroll(&mut self, event_id: u64) -> bool {
        self.enrolled_event_ids.insert(event_id)
    }

    pub fn is_enrolled(&self, event_id: u64) -> bool {
        self.enrolled_event_ids.contains(&event_id)
    }

    pub fn navigate(&mut self, page: Page) {
        self.current_page = page;
    }
}

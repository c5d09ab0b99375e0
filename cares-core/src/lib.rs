//! Core of the Bengaluru Cares volunteer board.
//!
//! - `event`: the `Event` record and the raw add-event form
//! - `store`: the JSON file the events live in
//! - `service`: listing, filtering and creating events
//! - `session`: per-visitor login and enrollment state
//! - `notify`: signup confirmations
//! - `admin`: the shared password in front of the add-event form

pub mod admin;
pub mod config;
pub mod error;
pub mod event;
pub mod notify;
pub mod service;
pub mod session;
pub mod store;

pub use error::{CaresError, CaresResult};
pub use event::{Event, NewEvent};
pub use session::{Page, Session};
pub use store::EventStore;

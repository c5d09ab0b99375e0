//! Flat-file event storage.
//!
//! The whole collection lives in one JSON array. Every save rewrites the
//! file: the new content goes to a sibling temp file which is then renamed
//! over the original, so readers never observe a half-written array.
//! Read-modify-write cycles go through [`EventStore::update`], which holds an
//! exclusive advisory lock on `<file>.lock` for the duration.

use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::config::CaresConfig;
use crate::error::{CaresError, CaresResult};
use crate::event::Event;

#[derive(Debug, Clone)]
pub struct EventStore {
    path: PathBuf,
}

impl EventStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        EventStore { path: path.into() }
    }

    pub fn from_config(config: &CaresConfig) -> Self {
        Self::new(config.data_file_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all events. A missing file is an empty collection; an unreadable
    /// or malformed one is an error.
    pub fn load(&self) -> CaresResult<Vec<Event>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(CaresError::StorageRead(format!(
                    "{}: {e}",
                    self.path.display()
                )));
            }
        };

        let events: Vec<Event> = serde_json::from_str(&content)
            .map_err(|e| CaresError::StorageRead(format!("{}: {e}", self.path.display())))?;

        check_records(&events)
            .map_err(|e| CaresError::StorageRead(format!("{}: {e}", self.path.display())))?;

        Ok(events)
    }

    /// Load all events, treating any read failure as "no events".
    pub fn load_or_empty(&self) -> Vec<Event> {
        self.load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to an empty event list");
            Vec::new()
        })
    }

    /// Overwrite the file with `events`, pretty-printed with 2-space indent.
    pub fn save(&self, events: &[Event]) -> CaresResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.write_error(e))?;
        }

        let mut content = serde_json::to_string_pretty(events)
            .map_err(|e| CaresError::Serialization(e.to_string()))?;
        content.push('\n');

        let tmp_path = self.sibling("tmp");
        fs::write(&tmp_path, content).map_err(|e| self.write_error(e))?;
        fs::rename(&tmp_path, &self.path).map_err(|e| self.write_error(e))?;

        tracing::debug!(path = %self.path.display(), count = events.len(), "saved events");
        Ok(())
    }

    /// Load, let `f` mutate the collection, and save it back while holding
    /// the store's exclusive lock. Nothing is written if `f` fails.
    ///
    /// Uses the strict [`load`](Self::load) so a corrupt file is never
    /// replaced by a collection built from nothing.
    pub fn update<T>(&self, f: impl FnOnce(&mut Vec<Event>) -> CaresResult<T>) -> CaresResult<T> {
        let _lock = self.lock()?;

        let mut events = self.load()?;
        let result = f(&mut events)?;
        self.save(&events)?;

        Ok(result)
    }

    /// Blocks until no other `update` holds the lock. Released on drop.
    fn lock(&self) -> CaresResult<File> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.write_error(e))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.sibling("lock"))
            .map_err(|e| self.write_error(e))?;

        file.lock_exclusive().map_err(|e| self.write_error(e))?;

        Ok(file)
    }

    fn sibling(&self, extension: &str) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "events.json".into());
        name.push(".");
        name.push(extension);
        self.path.with_file_name(name)
    }

    fn write_error(&self, e: std::io::Error) -> CaresError {
        CaresError::StorageWrite(format!("{}: {e}", self.path.display()))
    }
}

/// Ids must be positive and unique, spots positive.
fn check_records(events: &[Event]) -> Result<(), String> {
    let mut seen = HashSet::new();

    for event in events {
        if event.id == 0 {
            return Err(format!("event '{}' has id 0", event.title));
        }
        if event.spots == 0 {
            return Err(format!("event {} has no spots", event.id));
        }
        if !seen.insert(event.id) {
            return Err(format!("duplicate event id {}", event.id));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::NewEvent;
    use crate::service;
    use chrono::NaiveDate;

    fn make_event(id: u64, date: &str) -> Event {
        Event {
            id,
            title: format!("Event {id}"),
            organization: "Green Bengaluru".to_string(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            spots: 10,
            tags: vec!["environment".to_string(), "cleanup".to_string()],
        }
    }

    fn temp_store() -> (tempfile::TempDir, EventStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = EventStore::new(dir.path().join("assets/events.json"));
        (dir, store)
    }

    #[test]
    fn test_missing_file_is_empty() {
        let (_dir, store) = temp_store();
        assert!(store.load().unwrap().is_empty());
        assert!(store.load_or_empty().is_empty());
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let (_dir, store) = temp_store();
        let events = vec![make_event(3, "2030-05-01"), make_event(1, "2029-01-15")];

        store.save(&events).unwrap();

        assert_eq!(store.load().unwrap(), events);
    }

    #[test]
    fn test_save_is_pretty_printed() {
        let (_dir, store) = temp_store();
        store.save(&[make_event(1, "2030-05-01")]).unwrap();

        let content = fs::read_to_string(store.path()).unwrap();
        assert!(content.starts_with("[\n  {\n    \"id\": 1,"));
        assert!(content.contains("\"date\": \"2030-05-01\""));
        assert!(!store.sibling("tmp").exists());
    }

    #[test]
    fn test_corrupt_file() {
        let (_dir, store) = temp_store();
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "{ not json").unwrap();

        assert!(matches!(store.load(), Err(CaresError::StorageRead(_))));
        assert!(store.load_or_empty().is_empty());
    }

    #[test]
    fn test_load_rejects_broken_records() {
        let (_dir, store) = temp_store();

        let mut zero_spots = make_event(2, "2030-05-01");
        zero_spots.spots = 0;

        for events in [
            vec![make_event(1, "2030-05-01"), make_event(1, "2030-06-01")],
            vec![make_event(0, "2030-05-01")],
            vec![zero_spots],
        ] {
            store.save(&events).unwrap();
            assert!(matches!(store.load(), Err(CaresError::StorageRead(_))));
            assert!(store.load_or_empty().is_empty());
        }
    }

    #[test]
    fn test_concurrent_updates_keep_every_event() {
        let (_dir, store) = temp_store();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    store
                        .update(|events| {
                            service::add(
                                events,
                                NewEvent {
                                    title: format!("Drive {i}"),
                                    organization: "Helping Hands".to_string(),
                                    date: "2030-05-01".to_string(),
                                    tags: "community".to_string(),
                                    spots: Some(3),
                                },
                            )
                        })
                        .unwrap()
                })
            })
            .collect();

        let mut ids: Vec<u64> = handles.into_iter().map(|h| h.join().unwrap().id).collect();
        ids.sort_unstable();
        assert_eq!(ids, (1..=8).collect::<Vec<u64>>());

        let events = store.load().unwrap();
        assert_eq!(events.len(), 8);
        let titles: HashSet<String> = events.into_iter().map(|e| e.title).collect();
        assert_eq!(titles.len(), 8);
    }

    #[test]
    fn test_update_refuses_to_overwrite_corrupt_file() {
        let (_dir, store) = temp_store();
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "{ not json").unwrap();

        let result = store.update(|events| {
            events.push(make_event(1, "2030-05-01"));
            Ok(())
        });

        assert!(matches!(result, Err(CaresError::StorageRead(_))));
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "{ not json");
    }

    #[test]
    fn test_update_skips_save_on_error() {
        let (_dir, store) = temp_store();
        store.save(&[make_event(1, "2030-05-01")]).unwrap();

        let result: CaresResult<()> = store.update(|events| {
            events.clear();
            Err(CaresError::Validation("nope".into()))
        });

        assert!(result.is_err());
        assert_eq!(store.load().unwrap().len(), 1);
    }

    #[test]
    fn test_update_persists_changes() {
        let (_dir, store) = temp_store();

        let count = store
            .update(|events| {
                events.push(make_event(1, "2030-05-01"));
                events.push(make_event(2, "2030-06-01"));
                Ok(events.len())
            })
            .unwrap();

        assert_eq!(count, 2);
        assert_eq!(store.load().unwrap().len(), 2);
    }
}

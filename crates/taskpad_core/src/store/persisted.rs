//! Value wrapper kept in sync with a JSON-encoded storage slot.
//!
//! # Responsibility
//! - Load the slot once on open, falling back to a caller default.
//! - Write the slot through on every set, keeping an in-memory mirror.
//!
//! # Invariants
//! - Reads never touch storage after open; they return the mirror.
//! - After `set`/`update` returns, `get` observes the new value even when
//!   serialization or the slot write failed.
//! - Failures are logged at `warn` and never returned.
//! - When the slot could not be read on open, the store runs detached: the
//!   mirror still changes but the slot is never written, so a transient
//!   read error cannot clobber stored data with the default.
//! - Two stores on the same key do not observe each other's writes until
//!   one of them is reopened.

use crate::repo::slot_repo::SlotRepository;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// In-memory value backed by one slot of a `SlotRepository`.
pub struct PersistedStore<T, R> {
    repo: R,
    key: String,
    value: T,
    revision: u64,
    load_failed: bool,
}

impl<T, R> PersistedStore<T, R>
where
    T: Serialize + DeserializeOwned,
    R: SlotRepository,
{
    /// Opens the store, reading `key` once.
    ///
    /// Returns `default` when the slot is absent, blank, unreadable or does
    /// not decode as `T`.
    pub fn open(repo: R, key: impl Into<String>, default: T) -> Self {
        let key = key.into();
        let (value, load_failed) = match load(&repo, &key) {
            Ok(Some(value)) => (value, false),
            Ok(None) => (default, false),
            Err(()) => (default, true),
        };
        Self {
            repo,
            key,
            value,
            revision: 0,
            load_failed,
        }
    }

    /// Whether the slot read on open failed. Detached stores never write.
    pub fn load_failed(&self) -> bool {
        self.load_failed
    }

    /// Returns the current value.
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Number of setter calls since open.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Replaces the value and writes it through to the slot.
    pub fn set(&mut self, value: T) -> &T {
        self.persist(&value);
        self.value = value;
        self.revision += 1;
        &self.value
    }

    /// Derives the next value from the current one, then behaves like `set`.
    pub fn update(&mut self, next: impl FnOnce(&T) -> T) -> &T {
        let value = next(&self.value);
        self.set(value)
    }

    fn persist(&self, value: &T) {
        if self.load_failed {
            warn!(
                "event=slot_write module=store status=skipped key={} error_code=load_failed",
                self.key
            );
            return;
        }

        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(
                    "event=slot_write module=store status=error key={} error_code=serialize_failed error={err}",
                    self.key
                );
                return;
            }
        };

        match self.repo.write_slot(&self.key, &raw) {
            Ok(()) => debug!(
                "event=slot_write module=store status=ok key={} bytes={}",
                self.key,
                raw.len()
            ),
            Err(err) => warn!(
                "event=slot_write module=store status=error key={} error_code=write_failed error={err}",
                self.key
            ),
        }
    }
}

/// Reads and decodes the slot.
///
/// `Ok(None)` means "use the default": the slot is absent, blank or does not
/// decode. `Err(())` means storage itself could not be read.
fn load<T, R>(repo: &R, key: &str) -> Result<Option<T>, ()>
where
    T: DeserializeOwned,
    R: SlotRepository,
{
    let raw = match repo.read_slot(key) {
        Ok(Some(raw)) if !raw.trim().is_empty() => raw,
        Ok(_) => {
            debug!("event=slot_read module=store status=ok key={key} source=default");
            return Ok(None);
        }
        Err(err) => {
            warn!(
                "event=slot_read module=store status=error key={key} error_code=read_failed error={err}"
            );
            return Err(());
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => {
            debug!("event=slot_read module=store status=ok key={key} source=slot");
            Ok(Some(value))
        }
        Err(err) => {
            warn!(
                "event=slot_read module=store status=error key={key} error_code=deserialize_failed error={err}"
            );
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PersistedStore;
    use crate::repo::slot_repo::{MemorySlotRepository, RepoError, RepoResult, SlotRepository};
    use std::collections::BTreeMap;

    struct ReadOnlyRepo;

    impl SlotRepository for ReadOnlyRepo {
        fn read_slot(&self, _key: &str) -> RepoResult<Option<String>> {
            Ok(None)
        }

        fn write_slot(&self, _key: &str, _value: &str) -> RepoResult<()> {
            Err(RepoError::Unavailable("quota exceeded".to_string()))
        }

        fn remove_slot(&self, _key: &str) -> RepoResult<()> {
            Ok(())
        }
    }

    #[test]
    fn absent_slot_yields_default_without_writing() {
        let repo = MemorySlotRepository::new();
        let store = PersistedStore::open(&repo, "counter", 7_u32);
        assert_eq!(*store.get(), 7);
        assert_eq!(store.revision(), 0);
        assert!(repo.is_empty());
    }

    #[test]
    fn set_writes_json_and_updates_mirror() {
        let repo = MemorySlotRepository::new();
        let mut store = PersistedStore::open(&repo, "counter", 0_u32);

        assert_eq!(*store.set(3), 3);
        assert_eq!(*store.update(|current| current + 1), 4);
        assert_eq!(store.revision(), 2);
        assert_eq!(repo.raw_slot("counter").as_deref(), Some("4"));
    }

    #[test]
    fn blank_slot_is_treated_as_absent() {
        let repo = MemorySlotRepository::with_slot("names", "  ");
        let store = PersistedStore::open(&repo, "names", vec!["x".to_string()]);
        assert_eq!(store.get(), &vec!["x".to_string()]);
    }

    /// Holds data but fails every read.
    struct UnreadableRepo {
        inner: MemorySlotRepository,
    }

    impl SlotRepository for UnreadableRepo {
        fn read_slot(&self, _key: &str) -> RepoResult<Option<String>> {
            Err(RepoError::Unavailable("disk detached".to_string()))
        }

        fn write_slot(&self, key: &str, value: &str) -> RepoResult<()> {
            self.inner.write_slot(key, value)
        }

        fn remove_slot(&self, key: &str) -> RepoResult<()> {
            self.inner.remove_slot(key)
        }
    }

    #[test]
    fn write_failures_are_absorbed() {
        let mut store = PersistedStore::open(ReadOnlyRepo, "counter", 1_u32);
        assert_eq!(*store.get(), 1);
        assert!(!store.load_failed());

        assert_eq!(*store.set(9), 9);
        assert_eq!(*store.get(), 9);
    }

    #[test]
    fn failed_read_detaches_store_from_slot() {
        let inner = MemorySlotRepository::with_slot("counter", "41");
        let mut store = PersistedStore::open(
            UnreadableRepo {
                inner: inner.clone(),
            },
            "counter",
            0_u32,
        );
        assert!(store.load_failed());
        assert_eq!(*store.get(), 0);

        assert_eq!(*store.set(5), 5);
        assert_eq!(store.revision(), 1);
        assert_eq!(inner.raw_slot("counter").as_deref(), Some("41"));
    }

    #[test]
    fn unserializable_value_still_updates_mirror() {
        let repo = MemorySlotRepository::new();
        let mut store: PersistedStore<BTreeMap<(u8, u8), String>, _> =
            PersistedStore::open(&repo, "grid", BTreeMap::new());

        let mut grid = BTreeMap::new();
        grid.insert((1, 2), "cell".to_string());
        store.set(grid.clone());

        assert_eq!(store.get(), &grid);
        assert!(repo.raw_slot("grid").is_none());
    }
}

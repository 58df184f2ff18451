use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::db::KeyValueStore;
use crate::error::{LedgerError, RecordKind, Result};
use crate::model::Order;

/// A record kept in a persisted history list.
pub trait Record: Serialize + DeserializeOwned + Clone {
    const KIND: RecordKind;
    const STORAGE_KEY: &'static str;
    type Patch;

    fn id(&self) -> i64;
    fn set_id(&mut self, id: i64);

    /// Combines a re-saved form with the stored record it replaces.
    fn merge_edit(prior: &Self, incoming: Self) -> Self;

    fn apply_patch(&mut self, patch: Self::Patch);

    /// Re-establishes list order after a save. Default keeps insertion order.
    fn arrange(_records: &mut [Self]) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl FromStr for Direction {
    type Err = LedgerError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            _ => Err(LedgerError::InvalidDirection(s.to_string())),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => f.write_str("up"),
            Direction::Down => f.write_str("down"),
        }
    }
}

/// An ordered history list mirrored, whole, to one key of a `KeyValueStore`.
///
/// Every mutation builds the next list, writes it, and only then replaces the
/// in-memory copy. A failed write leaves the store exactly as it was.
pub struct HistoryStore<R, S> {
    backend: S,
    records: Vec<R>,
    last_id: i64,
}

impl<R: Record, S: KeyValueStore> HistoryStore<R, S> {
    /// Reads the collection from `backend`. Undecodable records are skipped.
    pub fn load(backend: S) -> Result<Self> {
        let records = match backend.get(R::STORAGE_KEY)? {
            Some(raw) => decode_records::<R>(&raw),
            None => Vec::new(),
        };
        let last_id = records.iter().map(R::id).max().unwrap_or(0);
        log::debug!("loaded {} {} record(s)", records.len(), R::KIND);
        Ok(HistoryStore {
            backend,
            records,
            last_id,
        })
    }

    pub fn list(&self) -> &[R] {
        &self.records
    }

    pub fn get(&self, id: i64) -> Option<&R> {
        self.records.iter().find(|r| r.id() == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn position(&self, id: i64) -> Result<usize> {
        self.records
            .iter()
            .position(|r| r.id() == id)
            .ok_or(LedgerError::NotFound { kind: R::KIND, id })
    }

    /// Inserts `record` at the front with a fresh id, or replaces the record
    /// with `editing_id` in place. Returns the id of the saved record.
    pub fn save(&mut self, mut record: R, editing_id: Option<i64>) -> Result<i64> {
        let mut next = self.records.clone();
        let (id, fresh_id) = match editing_id {
            Some(id) => {
                let idx = self.position(id)?;
                let merged = R::merge_edit(&next[idx], record);
                next[idx] = merged;
                (id, None)
            }
            None => {
                let id = self.next_id();
                record.set_id(id);
                next.insert(0, record);
                (id, Some(id))
            }
        };
        R::arrange(&mut next);

        self.commit(next)?;
        if let Some(id) = fresh_id {
            self.last_id = id;
        }
        log::info!(
            "{} {} {}",
            if editing_id.is_some() { "updated" } else { "created" },
            R::KIND,
            id
        );
        Ok(id)
    }

    /// Merges `patch` into the record with `id`.
    pub fn update(&mut self, id: i64, patch: R::Patch) -> Result<&R> {
        let idx = self.position(id)?;
        let mut next = self.records.clone();
        next[idx].apply_patch(patch);
        R::arrange(&mut next);
        self.commit(next)?;
        log::info!("patched {} {}", R::KIND, id);
        let idx = self.position(id)?;
        Ok(&self.records[idx])
    }

    /// Removes the record with `id`. Confirmation is the caller's job.
    pub fn delete(&mut self, id: i64) -> Result<R> {
        let idx = self.position(id)?;
        let mut next = self.records.clone();
        let removed = next.remove(idx);
        self.commit(next)?;
        log::info!("deleted {} {}", R::KIND, id);
        Ok(removed)
    }

    fn commit(&mut self, next: Vec<R>) -> Result<()> {
        let encoded = serde_json::to_string(&next)?;
        if let Err(e) = self.backend.set(R::STORAGE_KEY, &encoded) {
            log::error!("failed to persist {}: {}", R::STORAGE_KEY, e);
            return Err(e);
        }
        self.records = next;
        Ok(())
    }

    // Millisecond clock, bumped so ids stay unique within the same millisecond.
    fn next_id(&self) -> i64 {
        chrono::Utc::now().timestamp_millis().max(self.last_id + 1)
    }
}

impl<S: KeyValueStore> HistoryStore<Order, S> {
    /// Swaps the order with its neighbour. Returns `false` at either end of the list.
    pub fn reorder(&mut self, id: i64, direction: Direction) -> Result<bool> {
        let idx = self.position(id)?;
        let target = match direction {
            Direction::Up if idx > 0 => idx - 1,
            Direction::Down if idx + 1 < self.records.len() => idx + 1,
            _ => return Ok(false),
        };
        let mut next = self.records.clone();
        next.swap(idx, target);
        self.commit(next)?;
        log::info!("moved order {} {}", id, direction);
        Ok(true)
    }
}

fn decode_records<R: Record>(raw: &str) -> Vec<R> {
    let items = match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Array(items)) => items,
        Ok(_) => {
            log::warn!("{} is not a list; starting empty", R::STORAGE_KEY);
            return Vec::new();
        }
        Err(e) => {
            log::warn!("{} is not valid JSON ({}); starting empty", R::STORAGE_KEY, e);
            return Vec::new();
        }
    };
    items
        .into_iter()
        .enumerate()
        .filter_map(|(i, item)| match serde_json::from_value::<R>(item) {
            Ok(record) => Some(record),
            Err(e) => {
                log::warn!("skipping {} entry {}: {}", R::STORAGE_KEY, i, e);
                None
            }
        })
        .collect()
}

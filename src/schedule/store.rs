use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use super::types::{Assignment, ShowKey, MAX_DOOR};
use crate::error::Result;

/// Assignments by show. Entries appear on the first edit that changes
/// something and are never removed; a show without an entry is unstaffed.
///
/// Serializes as a plain JSON object `{"<show key>": {"host": .., "door": [..]}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssignmentStore {
    map: BTreeMap<ShowKey, Assignment>,
}

impl AssignmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// The assignment for `key`, or an empty one.
    pub fn assignment(&self, key: &ShowKey) -> Assignment {
        self.map.get(key).cloned().unwrap_or_default()
    }

    pub fn contains(&self, key: &ShowKey) -> bool {
        self.map.contains_key(key)
    }

    /// Stored entries in show-key order.
    pub fn iter(&self) -> impl Iterator<Item = (&ShowKey, &Assignment)> {
        self.map.iter()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Make `name` the host of `key`, dropping them from the door first.
    /// An empty name clears the host and leaves the door alone.
    /// Returns whether the stored assignment changed.
    pub fn set_host(&mut self, key: &ShowKey, name: &str) -> bool {
        let mut next = self.assignment(key);
        if !name.is_empty() {
            next.door.retain(|d| d != name);
        }
        next.host = name.to_string();
        self.commit(key, next)
    }

    /// Add (`included`) or remove `name` on the door of `key`.
    ///
    /// Adding is ignored once the door holds [`MAX_DOOR`] people or when
    /// `name` is already there. The current host is never committed to the
    /// door. Returns whether the stored assignment changed.
    pub fn set_door(&mut self, key: &ShowKey, name: &str, included: bool) -> bool {
        let current = self.assignment(key);
        let mut door = current.door.clone();

        if included {
            if !door.iter().any(|d| d == name) && door.len() < MAX_DOOR {
                door.push(name.to_string());
            }
        } else {
            door.retain(|d| d != name);
        }
        door.retain(|d| *d != current.host);

        self.commit(
            key,
            Assignment {
                host: current.host,
                door,
            },
        )
    }

    fn commit(&mut self, key: &ShowKey, next: Assignment) -> bool {
        let unchanged = match self.map.get(key) {
            Some(existing) => *existing == next,
            None => next == Assignment::default(),
        };
        if unchanged {
            debug!(show = %key, "assignment unchanged");
            return false;
        }
        self.map.insert(key.clone(), next);
        true
    }
}

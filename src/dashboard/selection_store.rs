//! Optimistic shortlist membership for one staff member
//!
//! Each composite key moves through a small state machine:
//! `Idle -> Pending -> Idle` when the server accepts the write and
//! `Pending -> RolledBack -> Idle` when it does not. `RolledBack` lasts until
//! the key is toggled again or a snapshot is applied.
//!
//! Snapshots carry the generation they were requested at. A toggle fences its
//! key at the generation current when it completes, and a snapshot at or below
//! that fence (or arriving while the key is still pending) leaves the key's
//! local membership alone.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

use crate::applications::models::SelectionMeta;
use crate::selections::models::SelectionKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyState {
    #[default]
    Idle,
    Pending,
    RolledBack,
}

#[derive(Debug, Clone, Default)]
struct KeyEntry {
    state: KeyState,
    fence: u64,
    sequence: u64,
}

/// Handle for one in-flight toggle, returned by [`SelectionStore::begin_toggle`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleTicket {
    pub key: String,
    /// Optimistic membership after the flip
    pub selected: bool,
    sequence: u64,
    previous_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct SelectionStore {
    /// Optimistic membership, server order first then local additions
    selected: Vec<String>,
    confirmed: HashMap<String, SelectionMeta>,
    local_times: HashMap<String, DateTime<Utc>>,
    last_local_time: Option<DateTime<Utc>>,
    keys: HashMap<String, KeyEntry>,
    next_sequence: u64,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_selected(&self, application_id: &str, subject: &str) -> bool {
        self.contains(&SelectionKey::new(application_id, subject).to_string())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.selected.iter().any(|k| k == key)
    }

    /// Composite keys currently shown as selected
    pub fn selections(&self) -> &[String] {
        &self.selected
    }

    pub fn key_state(&self, key: &str) -> KeyState {
        self.keys.get(key).map(|entry| entry.state).unwrap_or_default()
    }

    /// Metadata for every selected key; local timestamps stand in until the
    /// server has confirmed an addition.
    pub fn selection_data(&self) -> HashMap<String, SelectionMeta> {
        self.selected
            .iter()
            .filter_map(|key| {
                let subject = self
                    .confirmed
                    .get(key)
                    .map(|meta| meta.subject.clone())
                    .or_else(|| key.parse::<SelectionKey>().ok().map(|k| k.subject))?;
                let created_at = self
                    .local_times
                    .get(key)
                    .copied()
                    .or_else(|| self.confirmed.get(key).map(|meta| meta.created_at))?;
                Some((key.clone(), SelectionMeta { subject, created_at }))
            })
            .collect()
    }

    /// Flips the key locally and marks it pending.
    pub fn begin_toggle(
        &mut self,
        application_id: &str,
        subject: &str,
        generation: u64,
    ) -> ToggleTicket {
        let key = SelectionKey::new(application_id, subject).to_string();
        let previous_time = self.local_times.get(&key).copied();
        let selected = !self.contains(&key);

        if selected {
            self.selected.push(key.clone());
            let at = self.next_local_time();
            self.local_times.insert(key.clone(), at);
        } else {
            self.selected.retain(|k| k != &key);
            self.local_times.remove(&key);
        }

        self.next_sequence += 1;
        let sequence = self.next_sequence;
        let entry = self.keys.entry(key.clone()).or_default();
        entry.state = KeyState::Pending;
        entry.fence = entry.fence.max(generation);
        entry.sequence = sequence;

        ToggleTicket {
            key,
            selected,
            sequence,
            previous_time,
        }
    }

    /// Settles a toggle. Returns `true` when the optimistic flip was reverted.
    ///
    /// A ticket superseded by a newer toggle of the same key changes nothing.
    pub fn complete(&mut self, ticket: &ToggleTicket, succeeded: bool, generation: u64) -> bool {
        let Some(entry) = self.keys.get_mut(&ticket.key) else {
            return false;
        };
        if entry.sequence != ticket.sequence {
            return false;
        }
        entry.fence = entry.fence.max(generation);

        if succeeded {
            entry.state = KeyState::Idle;
            return false;
        }

        entry.state = KeyState::RolledBack;
        if ticket.selected {
            self.selected.retain(|k| k != &ticket.key);
            self.local_times.remove(&ticket.key);
        } else {
            self.selected.push(ticket.key.clone());
            if let Some(at) = ticket.previous_time {
                self.local_times.insert(ticket.key.clone(), at);
            }
        }
        true
    }

    /// Replaces confirmed state with a snapshot fetched at `generation`,
    /// keeping pending and fenced keys as they are locally.
    pub fn apply_snapshot(
        &mut self,
        generation: u64,
        selections: Vec<String>,
        selection_data: HashMap<String, SelectionMeta>,
    ) {
        let protected: Vec<String> = self
            .keys
            .iter()
            .filter(|(_, entry)| entry.state == KeyState::Pending || generation <= entry.fence)
            .map(|(key, _)| key.clone())
            .collect();
        let is_protected = |key: &str| protected.iter().any(|p| p == key);

        let mut selected: Vec<String> = selections
            .into_iter()
            .filter(|key| !is_protected(key))
            .collect();
        for key in &protected {
            if self.contains(key) && !selected.contains(key) {
                selected.push(key.clone());
            }
        }

        let mut confirmed: HashMap<String, SelectionMeta> = selection_data
            .into_iter()
            .filter(|(key, _)| !is_protected(key))
            .collect();
        for key in &protected {
            if let Some(meta) = self.confirmed.remove(key) {
                confirmed.insert(key.clone(), meta);
            }
        }

        self.local_times.retain(|key, _| is_protected(key));
        self.selected = selected;
        self.confirmed = confirmed;

        self.keys.retain(|key, entry| {
            if entry.state == KeyState::RolledBack {
                entry.state = KeyState::Idle;
            }
            entry.state == KeyState::Pending || is_protected(key)
        });
    }

    /// Strictly increasing so two quick additions never tie.
    fn next_local_time(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let at = match self.last_local_time {
            Some(last) if now <= last => last + Duration::milliseconds(1),
            _ => now,
        };
        self.last_local_time = Some(at);
        at
    }
}

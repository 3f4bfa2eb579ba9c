use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attendance state of one `(event, user)` pair after a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RsvpStatus {
    Joined,
    NotJoined,
}

impl RsvpStatus {
    pub fn is_joined(self) -> bool {
        matches!(self, RsvpStatus::Joined)
    }

    /// Status line shown to the user after a toggle.
    pub fn message(self) -> &'static str {
        match self {
            RsvpStatus::Joined => "RSVP confirmed!",
            RsvpStatus::NotJoined => "RSVP cancelled",
        }
    }
}

/// Authoritative mapping from event id to the ids of its attendees.
///
/// The `rsvp_count` field on [`Event`](crate::Event) is only a cached mirror
/// of [`count`](RsvpLedger::count). Two invariants hold at all times: a user
/// id appears at most once per event, and an event whose attendee list
/// empties is dropped from the map entirely, so no empty entry persists.
///
/// The ledger performs no identity checks — callers gate mutations on an
/// authenticated actor.
///
/// Serializes transparently as an object of arrays:
///
/// ```text
/// { "evt-1": ["user-1", "user-2"], "evt-9": ["user-2"] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RsvpLedger {
    entries: BTreeMap<String, Vec<String>>,
}

impl RsvpLedger {
    pub fn new() -> Self {
        RsvpLedger::default()
    }

    /// Join `user_id` to `event_id`. No-op when already joined.
    ///
    /// Returns whether a change occurred.
    pub fn add(&mut self, event_id: &str, user_id: &str) -> bool {
        let attendees = self.entries.entry(event_id.to_string()).or_default();
        if attendees.iter().any(|id| id == user_id) {
            return false;
        }
        attendees.push(user_id.to_string());
        true
    }

    /// Withdraw `user_id` from `event_id`. No-op when not joined.
    ///
    /// Dropping the last attendee removes the event key entirely.
    /// Returns whether a change occurred.
    pub fn remove(&mut self, event_id: &str, user_id: &str) -> bool {
        let Some(attendees) = self.entries.get_mut(event_id) else {
            return false;
        };
        let before = attendees.len();
        attendees.retain(|id| id != user_id);
        let changed = attendees.len() != before;
        if attendees.is_empty() {
            self.entries.remove(event_id);
        }
        changed
    }

    /// Flip the attendance state of `(event_id, user_id)`.
    ///
    /// Deliberately non-idempotent: two toggles restore the ledger to its
    /// state before either call.
    pub fn toggle(&mut self, event_id: &str, user_id: &str) -> RsvpStatus {
        if self.is_joined(event_id, user_id) {
            self.remove(event_id, user_id);
            RsvpStatus::NotJoined
        } else {
            self.add(event_id, user_id);
            RsvpStatus::Joined
        }
    }

    pub fn is_joined(&self, event_id: &str, user_id: &str) -> bool {
        self.entries
            .get(event_id)
            .is_some_and(|attendees| attendees.iter().any(|id| id == user_id))
    }

    /// Attendee count for `event_id`, 0 when absent.
    pub fn count(&self, event_id: &str) -> usize {
        self.entries.get(event_id).map_or(0, Vec::len)
    }

    /// Attendee ids for `event_id` in join order, empty when absent.
    pub fn attendees(&self, event_id: &str) -> &[String] {
        self.entries.get(event_id).map_or(&[], Vec::as_slice)
    }

    /// Number of events with at least one attendee.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(event_id, attendees)| (event_id.as_str(), attendees.as_slice()))
    }
}

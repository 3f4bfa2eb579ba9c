use crate::store::StoreKey;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Error raised at the persistence boundary.
///
/// Only opening the store and writing through it can fail; reads are
/// fail-soft and fall back to the caller-supplied default instead.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to open store directory {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to watch store directory {path}: {source}")]
    Watch {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    #[error("failed to encode {key}: {source}")]
    Encode {
        key: StoreKey,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write {key}: {source}")]
    Write {
        key: StoreKey,
        #[source]
        source: io::Error,
    },

    #[error("failed to remove {key}: {source}")]
    Remove {
        key: StoreKey,
        #[source]
        source: io::Error,
    },
}

/// Error raised by directory operations.
///
/// Validation and authorization are checked in full before any mutation, so
/// every variant here implies nothing was written. Persistence failures never
/// surface through this type — lifecycle operations keep the in-memory state
/// and log the degraded write instead.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("event form failed validation: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("no user is signed in")]
    NotSignedIn,

    #[error("user {user_id} is not the organizer of event {event_id}")]
    NotOrganizer { user_id: String, event_id: String },

    #[error("no event with id {0}")]
    UnknownEvent(String),

    #[error("no user matching {0}")]
    UnknownUser(String),
}

/// The event form fields a validation message can attach to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventField {
    Title,
    Description,
    Category,
    Location,
    Start,
    End,
}

impl std::fmt::Display for EventField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EventField::Title => "title",
            EventField::Description => "description",
            EventField::Category => "category",
            EventField::Location => "location",
            EventField::Start => "start",
            EventField::End => "end",
        };
        f.write_str(name)
    }
}

/// Field-keyed validation messages for an event form.
///
/// Serializes as a plain object (`{"title": "...", "end": "..."}`) so a UI
/// can attach each message to its input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    fields: BTreeMap<EventField, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        ValidationErrors::default()
    }

    pub fn insert(&mut self, field: EventField, message: impl Into<String>) {
        self.fields.insert(field, message.into());
    }

    /// The message attached to `field`, if any.
    pub fn get(&self, field: EventField) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EventField, &str)> {
        self.fields.iter().map(|(field, msg)| (*field, msg.as_str()))
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, message) in &self.fields {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

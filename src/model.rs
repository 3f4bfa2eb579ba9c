//! Typed records for the events directory.
//!
//! Field names serialize in camelCase so the on-disk JSON matches what the
//! directory UI reads and writes.

use crate::error::{EventField, ValidationErrors};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Closed set of event categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Hackathon,
    Fest,
    Workshop,
    Seminar,
    Meetup,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Category; 5] = [
        Category::Hackathon,
        Category::Fest,
        Category::Workshop,
        Category::Seminar,
        Category::Meetup,
    ];
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Category::Hackathon => "Hackathon",
            Category::Fest => "Fest",
            Category::Workshop => "Workshop",
            Category::Seminar => "Seminar",
            Category::Meetup => "Meetup",
        };
        f.write_str(name)
    }
}

/// Color theme preference, persisted as `"light"` / `"dark"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// The opposite theme.
    ///
    /// ```
    /// use quadboard::Theme;
    ///
    /// assert_eq!(Theme::Light.toggled(), Theme::Dark);
    /// assert_eq!(Theme::Dark.toggled(), Theme::Light);
    /// ```
    pub fn toggled(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// Point-in-time copy of a user's public identity, embedded in an [`Event`]
/// at creation.
///
/// This is a snapshot, not a live reference — later edits to the user's
/// profile do not rewrite events they already organize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organizer {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub handle: String,
}

impl Organizer {
    /// Capture the organizer snapshot for `user`. The handle is the local
    /// part of the email address, or empty when there is no `@`.
    pub fn snapshot_of(user: &User) -> Organizer {
        let handle = user
            .email
            .split_once('@')
            .map(|(local, _)| local.to_string())
            .unwrap_or_default();
        Organizer {
            id: user.id.clone(),
            name: user.name.clone(),
            avatar_url: user.avatar_url.clone(),
            handle,
        }
    }
}

/// A schedulable campus activity record.
///
/// `rsvp_count` is a cached mirror refreshed when the event is created or
/// updated; the authoritative attendee sets live in the
/// [`RsvpLedger`](crate::RsvpLedger).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub location: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub organizer: Organizer,
    #[serde(default)]
    pub rsvp_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// True when the event starts strictly after `now`.
    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.start > now
    }

    /// True when the event ended strictly before `now`.
    pub fn is_past(&self, now: DateTime<Utc>) -> bool {
        self.end < now
    }
}

/// Per-user settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub theme: Theme,
    pub notifications: bool,
    pub default_category: Category,
}

impl Default for Preferences {
    fn default() -> Self {
        Preferences {
            theme: Theme::Light,
            notifications: true,
            default_category: Category::Hackathon,
        }
    }
}

/// A directory member.
///
/// `rsvps` is a membership list (no duplicates) of event ids the user joined;
/// `created_event_ids` lists the events they organize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub rsvps: Vec<String>,
    #[serde(default)]
    pub created_event_ids: Vec<String>,
    #[serde(default)]
    pub preferences: Preferences,
}

impl User {
    /// Whether this user's membership list contains `event_id`.
    pub fn has_rsvped(&self, event_id: &str) -> bool {
        self.rsvps.iter().any(|id| id == event_id)
    }
}

/// Input for [`Directory::register`](crate::Directory::register).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub avatar_url: String,
}

/// Form input for creating or editing an event.
///
/// Optional fields stay optional so an incomplete form can be represented;
/// [`validate`](EventDraft::validate) reports every problem at once as a
/// field-keyed map.
///
/// # Examples
///
/// ```
/// use quadboard::{Category, EventDraft, EventField};
/// use chrono::{TimeZone, Utc};
///
/// let now = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
/// let draft = EventDraft {
///     title: "Rust workshop".into(),
///     description: "Hands-on borrow checker session".into(),
///     location: "Lab 2".into(),
///     category: Some(Category::Workshop),
///     start: Some(now + chrono::Duration::days(3)),
///     end: Some(now + chrono::Duration::days(3) + chrono::Duration::hours(2)),
///     ..EventDraft::default()
/// };
/// assert!(draft.validate(now).is_ok());
///
/// let errors = EventDraft::default().validate(now).unwrap_err();
/// assert!(errors.get(EventField::Title).is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    pub location: String,
    pub category: Option<Category>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
    pub image_url: Option<String>,
}

impl EventDraft {
    /// Check the draft against the form rules.
    ///
    /// All checks run before any error is returned, so the map covers every
    /// failing field at once. Lengths count characters of the trimmed text.
    /// The start-in-the-past rule applies at creation and edit time only —
    /// events already stored are never re-checked.
    ///
    /// # Errors
    ///
    /// Returns the field-keyed [`ValidationErrors`] map when any rule fails.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<(), ValidationErrors> {
        self.checked(now).map(|_| ())
    }

    /// Like [`validate`](Self::validate), but hands back the required fields
    /// so callers that passed validation need no re-unwrapping.
    pub(crate) fn checked(
        &self,
        now: DateTime<Utc>,
    ) -> Result<(Category, DateTime<Utc>, DateTime<Utc>), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.title.trim().chars().count() < 3 {
            errors.insert(
                EventField::Title,
                "Title must be at least 3 characters long",
            );
        }
        if self.description.trim().chars().count() < 10 {
            errors.insert(
                EventField::Description,
                "Description must be at least 10 characters long",
            );
        }
        if self.category.is_none() {
            errors.insert(EventField::Category, "Please select a category");
        }
        if self.location.trim().chars().count() < 3 {
            errors.insert(
                EventField::Location,
                "Location must be at least 3 characters long",
            );
        }
        if self.start.is_none() {
            errors.insert(EventField::Start, "Start date and time are required");
        }
        if self.end.is_none() {
            errors.insert(EventField::End, "End date and time are required");
        }
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if start >= end {
                errors.insert(EventField::End, "End time must be after start time");
            }
            if start < now {
                errors.insert(EventField::Start, "Start time cannot be in the past");
            }
        }

        // A missing field always carries an error, so the fallthrough arm
        // never returns an empty map.
        match (self.category, self.start, self.end) {
            (Some(category), Some(start), Some(end)) if errors.is_empty() => {
                Ok((category, start, end))
            }
            _ => Err(errors),
        }
    }
}

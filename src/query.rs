//! Pure filter/sort pipeline over event collections.
//!
//! Everything here is side-effect free: callers pass a snapshot in and get an
//! ordered snapshot back. Predicates combine conjunctively and are evaluated
//! in a fixed order (search → category → date range → organizer) so composed
//! results stay reproducible even though the predicates touch disjoint fields.

use crate::model::{Category, Event};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

/// Active query constraints, as assembled by a search box, category chips,
/// date pickers and an organizer picker. Empty or absent fields impose no
/// constraint; `FilterSpec::default()` matches everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterSpec {
    pub search: String,
    pub categories: Vec<Category>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub organizer_ids: Vec<String>,
}

/// Sort order for the filtered result.
///
/// Title keys compare by Unicode-lowercased text — the stand-in for the
/// locale-aware comparison a browser would do. Every order is stable: events
/// with equal keys keep their input order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    #[default]
    DateAsc,
    DateDesc,
    TitleAsc,
    TitleDesc,
    Popularity,
}

impl SortKey {
    /// Parse a sort key name. Unknown names fall back to `DateAsc`.
    ///
    /// ```
    /// use quadboard::SortKey;
    ///
    /// assert_eq!(SortKey::parse("popularity"), SortKey::Popularity);
    /// assert_eq!(SortKey::parse("shoe-size"), SortKey::DateAsc);
    /// ```
    pub fn parse(name: &str) -> SortKey {
        match name {
            "date-asc" => SortKey::DateAsc,
            "date-desc" => SortKey::DateDesc,
            "title-asc" => SortKey::TitleAsc,
            "title-desc" => SortKey::TitleDesc,
            "popularity" => SortKey::Popularity,
            _ => SortKey::DateAsc,
        }
    }
}

/// Case-insensitive substring match against title, description, location,
/// organizer name, or any tag. A blank or whitespace-only term matches
/// everything.
pub fn matches_search(event: &Event, term: &str) -> bool {
    let term = term.trim();
    if term.is_empty() {
        return true;
    }
    let needle = term.to_lowercase();
    let hit = |text: &str| text.to_lowercase().contains(&needle);
    hit(&event.title)
        || hit(&event.description)
        || hit(&event.location)
        || hit(&event.organizer.name)
        || event.tags.iter().any(|tag| hit(tag))
}

/// Category membership; an empty set is a no-op.
pub fn matches_categories(event: &Event, categories: &[Category]) -> bool {
    categories.is_empty() || categories.contains(&event.category)
}

/// The event's `start` must lie within `[start_date, end_date]`, inclusive.
/// A single bound constrains one side only; no bounds is a no-op.
pub fn matches_date_range(
    event: &Event,
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
) -> bool {
    if let Some(start) = start_date {
        if event.start < start {
            return false;
        }
    }
    if let Some(end) = end_date {
        if event.start > end {
            return false;
        }
    }
    true
}

/// Organizer membership by id; an empty set is a no-op.
pub fn matches_organizers(event: &Event, organizer_ids: &[String]) -> bool {
    organizer_ids.is_empty() || organizer_ids.iter().any(|id| *id == event.organizer.id)
}

/// Conjunction of all predicates in the fixed evaluation order.
pub fn matches(event: &Event, spec: &FilterSpec) -> bool {
    matches_search(event, &spec.search)
        && matches_categories(event, &spec.categories)
        && matches_date_range(event, spec.start_date, spec.end_date)
        && matches_organizers(event, &spec.organizer_ids)
}

/// Stable in-place sort by the given key.
pub fn sort_events(events: &mut [Event], key: SortKey) {
    match key {
        SortKey::DateAsc => events.sort_by_key(|e| e.start),
        SortKey::DateDesc => events.sort_by_key(|e| Reverse(e.start)),
        SortKey::TitleAsc => events.sort_by_cached_key(|e| e.title.to_lowercase()),
        SortKey::TitleDesc => events.sort_by_cached_key(|e| Reverse(e.title.to_lowercase())),
        SortKey::Popularity => events.sort_by_key(|e| Reverse(e.rsvp_count)),
    }
}

/// Filter `events` by `spec`, then sort once with `key`.
///
/// Returns an owned, ordered snapshot; the input is untouched. The result is
/// never longer than the input.
pub fn filter_and_sort(events: &[Event], spec: &FilterSpec, key: SortKey) -> Vec<Event> {
    let mut selected: Vec<Event> = events
        .iter()
        .filter(|event| matches(event, spec))
        .cloned()
        .collect();
    sort_events(&mut selected, key);
    selected
}

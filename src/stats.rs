//! Aggregation over event collections: distinct values, counts, rankings.

use crate::model::{Category, Event, Organizer};
use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

/// How many entries [`popular_categories`] keeps when building a [`Summary`].
pub const DEFAULT_POPULAR_LIMIT: usize = 5;

/// One row of the popular-category ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    pub category: Category,
    pub count: usize,
}

/// Dashboard roll-up of a collection at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total: usize,
    pub upcoming: usize,
    pub past: usize,
    pub this_week: usize,
    pub popular: Vec<CategoryCount>,
}

/// Distinct categories in first-seen order.
pub fn unique_categories(events: &[Event]) -> Vec<Category> {
    let mut seen = Vec::new();
    for event in events {
        if !seen.contains(&event.category) {
            seen.push(event.category);
        }
    }
    seen
}

/// Distinct organizer snapshots keyed by id, in first-seen order.
///
/// First occurrence wins: later snapshots with the same id are not merged,
/// so stale organizer metadata from older events may surface.
pub fn unique_organizers(events: &[Event]) -> Vec<Organizer> {
    let mut organizers: Vec<Organizer> = Vec::new();
    for event in events {
        if !organizers.iter().any(|o| o.id == event.organizer.id) {
            organizers.push(event.organizer.clone());
        }
    }
    organizers
}

/// Event count per category, descending, truncated to `limit`.
///
/// Ties keep first-seen category order — the count pass appends categories as
/// they appear and the sort is stable.
pub fn popular_categories(events: &[Event], limit: usize) -> Vec<CategoryCount> {
    let mut counts: Vec<CategoryCount> = Vec::new();
    for event in events {
        match counts.iter_mut().find(|c| c.category == event.category) {
            Some(entry) => entry.count += 1,
            None => counts.push(CategoryCount {
                category: event.category,
                count: 1,
            }),
        }
    }
    counts.sort_by_key(|c| Reverse(c.count));
    counts.truncate(limit);
    counts
}

/// Number of events starting strictly after `now`.
pub fn upcoming_count(events: &[Event], now: DateTime<Utc>) -> usize {
    events.iter().filter(|e| e.is_upcoming(now)).count()
}

/// Number of events that ended strictly before `now`.
pub fn past_count(events: &[Event], now: DateTime<Utc>) -> usize {
    events.iter().filter(|e| e.is_past(now)).count()
}

/// Events whose `start` falls within the calendar week containing `now`.
///
/// A week runs Sunday through Saturday, whole days, in the viewer's local
/// time zone.
pub fn this_week_events(events: &[Event], now: DateTime<Utc>) -> Vec<Event> {
    let (sunday, saturday) = local_week_of(now);
    events
        .iter()
        .filter(|event| {
            let day = event.start.with_timezone(&Local).date_naive();
            day >= sunday && day <= saturday
        })
        .cloned()
        .collect()
}

/// Full roll-up: totals, upcoming/past/this-week counts, and the top
/// [`DEFAULT_POPULAR_LIMIT`] categories.
pub fn summary(events: &[Event], now: DateTime<Utc>) -> Summary {
    Summary {
        total: events.len(),
        upcoming: upcoming_count(events, now),
        past: past_count(events, now),
        this_week: this_week_events(events, now).len(),
        popular: popular_categories(events, DEFAULT_POPULAR_LIMIT),
    }
}

/// Civil dates of the Sunday and Saturday bounding the local week of `at`.
/// Comparing civil dates keeps daylight-saving shifts out of the arithmetic.
fn local_week_of(at: DateTime<Utc>) -> (NaiveDate, NaiveDate) {
    let today = at.with_timezone(&Local).date_naive();
    let days_since_sunday = i64::from(today.weekday().num_days_from_sunday());
    let sunday = today - Duration::days(days_since_sunday);
    (sunday, sunday + Duration::days(6))
}

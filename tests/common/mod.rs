#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use quadboard::{Category, Directory, Event, EventDraft, Organizer, Preferences, User};

/// Fixed reference instant so test data is reproducible.
pub fn base_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 12, 12, 0, 0).unwrap()
}

pub fn sample_user(id: &str, name: &str, email: &str) -> User {
    User {
        id: id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        avatar_url: format!("https://avatars.example/{id}.png"),
        rsvps: Vec::new(),
        created_event_ids: Vec::new(),
        preferences: Preferences::default(),
    }
}

/// Two-hour event starting at `start`, organized by `organizer`.
pub fn sample_event(
    id: &str,
    title: &str,
    category: Category,
    start: DateTime<Utc>,
    organizer: &User,
) -> Event {
    Event {
        id: id.to_string(),
        title: title.to_string(),
        description: format!("All about {title}, in plenty of detail."),
        category,
        location: "Main Hall".to_string(),
        start,
        end: start + Duration::hours(2),
        tags: Vec::new(),
        image_url: None,
        organizer: Organizer::snapshot_of(organizer),
        rsvp_count: 0,
        created_at: start - Duration::days(7),
        updated_at: start - Duration::days(7),
    }
}

/// A draft that passes validation, starting three days after `now`.
pub fn valid_draft(title: &str, category: Category, now: DateTime<Utc>) -> EventDraft {
    let start = now + Duration::days(3);
    EventDraft {
        title: title.to_string(),
        description: format!("All about {title}, in plenty of detail."),
        location: "Main Hall".to_string(),
        category: Some(category),
        start: Some(start),
        end: Some(start + Duration::hours(2)),
        tags: Vec::new(),
        image_url: None,
    }
}

/// Directory with two users (alice signed in as the first seeded user) and
/// three of alice's events.
pub fn seeded_directory(dir: &std::path::Path) -> Directory {
    let alice = sample_user("u-alice", "Alice Chen", "alice@campus.edu");
    let bob = sample_user("u-bob", "Bob Osei", "bob@campus.edu");
    let now = Utc::now();
    let mut alice_seed = alice.clone();
    alice_seed.created_event_ids = vec!["e-1".into(), "e-2".into(), "e-3".into()];
    let events = vec![
        sample_event(
            "e-1",
            "Spring Hackathon",
            Category::Hackathon,
            now + Duration::days(5),
            &alice,
        ),
        sample_event(
            "e-2",
            "Intro to Rust",
            Category::Workshop,
            now + Duration::days(10),
            &alice,
        ),
        sample_event(
            "e-3",
            "Robotics Club Meetup",
            Category::Meetup,
            now + Duration::days(1),
            &alice,
        ),
    ];
    Directory::builder(dir)
        .watch(false)
        .seed(events, vec![alice_seed, bob])
        .open()
        .unwrap()
}

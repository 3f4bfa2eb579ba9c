//! Browsing the events board from one session.
//!
//! Registers an organizer, publishes a handful of events, then walks the
//! query pipeline: filtering, sorting, RSVPs and the dashboard summary.

use chrono::{Duration, Utc};
use quadboard::{Category, Directory, EventDraft, FilterSpec, NewUser, SortKey};

fn draft(title: &str, category: Category, days_out: i64, tags: &[&str]) -> EventDraft {
    let start = Utc::now() + Duration::days(days_out);
    EventDraft {
        title: title.to_string(),
        description: format!("Join us for {title} in the student center."),
        location: "Student Center".to_string(),
        category: Some(category),
        start: Some(start),
        end: Some(start + Duration::hours(3)),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        image_url: None,
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let mut board = Directory::builder(dir.path()).watch(false).open()?;

    // Sign up and publish some events.
    let me = board.register(NewUser {
        name: "Sam Rivera".into(),
        email: "sam@campus.edu".into(),
        avatar_url: String::new(),
    });
    println!("Signed in as {} <{}>", me.name, me.email);

    for (title, category, days_out, tags) in [
        ("Spring Hackathon", Category::Hackathon, 12, vec!["coding"]),
        ("Intro to Rust", Category::Workshop, 3, vec!["rust", "beginners"]),
        ("Night Market Fest", Category::Fest, 6, vec!["food"]),
        ("Robotics Meetup", Category::Meetup, 3, vec!["hardware"]),
    ] {
        let event = board.create_event(&draft(title, category, days_out, &tags))?;
        println!("Published {:12} {}", format!("[{}]", event.category), event.title);
    }

    // Filter: search plus a category set.
    let spec = FilterSpec {
        search: "rust".into(),
        categories: vec![Category::Workshop, Category::Meetup],
        ..FilterSpec::default()
    };
    println!("\nWorkshops and meetups matching \"rust\":");
    for event in board.query(&spec, SortKey::DateAsc) {
        println!("  {} at {}", event.title, event.start.format("%Y-%m-%d %H:%M"));
    }

    // RSVP to everything soon, then sort by popularity.
    let soon: Vec<String> = board
        .query(&FilterSpec::default(), SortKey::DateAsc)
        .into_iter()
        .take(2)
        .map(|e| e.id)
        .collect();
    for id in &soon {
        let status = board.toggle_rsvp(id)?;
        println!("\n{} -> {}", id, status.message());
    }

    println!("\nBy popularity:");
    for event in board.query(&FilterSpec::default(), SortKey::Popularity) {
        println!("  {:2} going  {}", event.rsvp_count, event.title);
    }

    // Dashboard numbers.
    let stats = board.stats(Utc::now());
    println!(
        "\n{} events total, {} upcoming, {} this week",
        stats.total, stats.upcoming, stats.this_week
    );
    for entry in &stats.popular {
        println!("  {}: {}", entry.category, entry.count);
    }

    Ok(())
}

//! Two sessions sharing one store directory, like two browser tabs.
//!
//! Tab B blocks on the filesystem watcher; tab A makes changes from another
//! thread. Every write A makes shows up in B through `wait_external_change`,
//! while A itself never reacts to its own writes.

use chrono::{Duration as ChronoDuration, Utc};
use quadboard::{Category, Directory, EventDraft, NewUser, Theme, WaitResult};
use std::time::Duration;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().to_path_buf();

    // Tab B: watch the store and fold in whatever the other tab does.
    let watcher_path = path.clone();
    let tab_b = std::thread::spawn(move || {
        let mut board = Directory::open(&watcher_path).expect("open tab B");
        let mut rounds = 0;
        while rounds < 3 {
            match board.wait_external_change(Duration::from_secs(5)) {
                WaitResult::Changed(keys) => {
                    rounds += 1;
                    println!("[tab B] changed: {keys:?}");
                    println!(
                        "[tab B] now sees {} events, theme {:?}, user {:?}",
                        board.events().len(),
                        board.theme(),
                        board.current_user().map(|u| u.name.as_str())
                    );
                }
                WaitResult::Timeout => {
                    println!("[tab B] quiet, giving up");
                    break;
                }
            }
        }
    });

    // Tab A: a user doing things.
    std::thread::sleep(Duration::from_millis(300));
    let mut board = Directory::builder(&path).watch(false).open()?;

    let me = board.register(NewUser {
        name: "Priya Nair".into(),
        email: "priya@campus.edu".into(),
        avatar_url: String::new(),
    });
    println!("[tab A] registered {}", me.name);
    std::thread::sleep(Duration::from_millis(300));

    let start = Utc::now() + ChronoDuration::days(2);
    let event = board.create_event(&EventDraft {
        title: "Game Jam Kickoff".into(),
        description: "48 hours of building games together.".into(),
        location: "Innovation Lab".into(),
        category: Some(Category::Hackathon),
        start: Some(start),
        end: Some(start + ChronoDuration::hours(4)),
        tags: vec!["games".into()],
        image_url: None,
    })?;
    println!("[tab A] published {}", event.title);
    std::thread::sleep(Duration::from_millis(300));

    board.set_theme(Theme::Dark);
    println!("[tab A] switched to dark mode");

    // A context is never notified about its own writes.
    assert!(board.sync_external_changes().is_empty());

    tab_b.join().expect("tab B thread");
    Ok(())
}

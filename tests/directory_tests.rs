mod common;

use common::{sample_user, seeded_directory, valid_draft};
use chrono::{Duration, Utc};
use quadboard::{
    Category, Directory, DirectoryError, EventDraft, EventField, NewUser, Theme,
    DEFAULT_RELATED_LIMIT,
};
use tempfile::tempdir;

#[test]
fn test_first_seeded_user_is_signed_in() {
    let dir = tempdir().unwrap();
    let board = seeded_directory(dir.path());

    let user = board.current_user().unwrap();
    assert_eq!(user.id, "u-alice");
    assert_eq!(board.users().len(), 2);
    assert_eq!(board.events().len(), 3);
}

#[test]
fn test_sign_in_by_email() {
    let dir = tempdir().unwrap();
    let mut board = seeded_directory(dir.path());

    let user = board.sign_in("bob@campus.edu").unwrap();
    assert_eq!(user.id, "u-bob");
    assert_eq!(board.current_user().unwrap().id, "u-bob");

    let err = board.sign_in("nobody@campus.edu").unwrap_err();
    assert!(matches!(err, DirectoryError::UnknownUser(_)));
    // A failed sign-in does not end the existing session.
    assert_eq!(board.current_user().unwrap().id, "u-bob");
}

#[test]
fn test_sign_out() {
    let dir = tempdir().unwrap();
    let mut board = seeded_directory(dir.path());

    board.sign_out();
    assert!(board.current_user().is_none());

    let err = board.create_event(&valid_draft("X", Category::Fest, Utc::now()));
    assert!(matches!(err, Err(DirectoryError::NotSignedIn)));
}

#[test]
fn test_register_applies_defaults_and_signs_in() {
    let dir = tempdir().unwrap();
    let mut board = seeded_directory(dir.path());

    let user = board.register(NewUser {
        name: "Dana Flores".into(),
        email: "dana@campus.edu".into(),
        avatar_url: String::new(),
    });

    // Generated id, clean slate, default preferences.
    assert_eq!(user.id.len(), 36, "uuid format: {}", user.id);
    assert!(user.rsvps.is_empty());
    assert!(user.created_event_ids.is_empty());
    assert_eq!(user.preferences.theme, Theme::Light);
    assert!(user.preferences.notifications);
    assert_eq!(user.preferences.default_category, Category::Hackathon);

    assert_eq!(board.current_user().unwrap().id, user.id);
    assert_eq!(board.users().len(), 3);
    assert!(board.sign_in("dana@campus.edu").is_ok());
}

#[test]
fn test_update_profile_mirrors_into_users() {
    let dir = tempdir().unwrap();
    let mut board = seeded_directory(dir.path());

    let updated = board
        .update_profile(|user| user.name = "Alice Q. Chen".to_string())
        .unwrap();
    assert_eq!(updated.name, "Alice Q. Chen");
    assert_eq!(board.current_user().unwrap().name, "Alice Q. Chen");

    let in_list = board.users().iter().find(|u| u.id == "u-alice").unwrap();
    assert_eq!(in_list.name, "Alice Q. Chen");
}

#[test]
fn test_update_profile_requires_session() {
    let dir = tempdir().unwrap();
    let mut board = seeded_directory(dir.path());
    board.sign_out();

    let err = board.update_profile(|user| user.name = "Ghost".into());
    assert!(matches!(err, Err(DirectoryError::NotSignedIn)));
}

#[test]
fn test_update_preferences() {
    let dir = tempdir().unwrap();
    let mut board = seeded_directory(dir.path());

    let updated = board
        .update_preferences(|prefs| {
            prefs.notifications = false;
            prefs.default_category = Category::Seminar;
        })
        .unwrap();
    assert!(!updated.preferences.notifications);
    assert_eq!(
        board.current_user().unwrap().preferences.default_category,
        Category::Seminar
    );
}

#[test]
fn test_profile_edit_keeps_organizer_snapshots() {
    let dir = tempdir().unwrap();
    let mut board = seeded_directory(dir.path());

    board
        .update_profile(|user| user.name = "Renamed".to_string())
        .unwrap();

    // Events keep the identity captured at creation time.
    assert_eq!(board.event_by_id("e-1").unwrap().organizer.name, "Alice Chen");
}

#[test]
fn test_create_event() {
    let dir = tempdir().unwrap();
    let mut board = seeded_directory(dir.path());

    let mut draft = valid_draft("Quiz Night", Category::Seminar, Utc::now());
    draft.tags = vec!["trivia".into()];
    let event = board.create_event(&draft).unwrap();

    assert_eq!(event.title, "Quiz Night");
    assert_eq!(event.category, Category::Seminar);
    assert_eq!(event.tags, vec!["trivia".to_string()]);
    assert_eq!(event.rsvp_count, 0);
    assert_eq!(event.created_at, event.updated_at);

    // Organizer snapshot copied from the signed-in user.
    assert_eq!(event.organizer.id, "u-alice");
    assert_eq!(event.organizer.name, "Alice Chen");
    assert_eq!(event.organizer.handle, "alice");

    assert_eq!(board.events().len(), 4);
    let creator = board.current_user().unwrap();
    assert!(creator.created_event_ids.contains(&event.id));
}

#[test]
fn test_create_reports_every_invalid_field() {
    let dir = tempdir().unwrap();
    let mut board = seeded_directory(dir.path());

    let err = board.create_event(&EventDraft::default()).unwrap_err();
    let DirectoryError::Validation(errors) = err else {
        panic!("expected validation errors");
    };

    assert_eq!(
        errors.get(EventField::Title),
        Some("Title must be at least 3 characters long")
    );
    assert_eq!(
        errors.get(EventField::Description),
        Some("Description must be at least 10 characters long")
    );
    assert_eq!(errors.get(EventField::Category), Some("Please select a category"));
    assert_eq!(
        errors.get(EventField::Location),
        Some("Location must be at least 3 characters long")
    );
    assert_eq!(
        errors.get(EventField::Start),
        Some("Start date and time are required")
    );
    assert_eq!(
        errors.get(EventField::End),
        Some("End date and time are required")
    );
    assert_eq!(board.events().len(), 3, "nothing written on failure");
}

#[test]
fn test_create_rejects_bad_times() {
    let dir = tempdir().unwrap();
    let mut board = seeded_directory(dir.path());
    let now = Utc::now();

    // Start in the past.
    let mut draft = valid_draft("Time Travel", Category::Fest, now);
    draft.start = Some(now - Duration::hours(1));
    let err = board.create_event(&draft).unwrap_err();
    let DirectoryError::Validation(errors) = err else {
        panic!("expected validation errors");
    };
    assert_eq!(
        errors.get(EventField::Start),
        Some("Start time cannot be in the past")
    );

    // End not after start.
    let mut draft = valid_draft("Ouroboros", Category::Fest, now);
    draft.end = draft.start;
    let err = board.create_event(&draft).unwrap_err();
    let DirectoryError::Validation(errors) = err else {
        panic!("expected validation errors");
    };
    assert_eq!(
        errors.get(EventField::End),
        Some("End time must be after start time")
    );
}

#[test]
fn test_whitespace_does_not_count_toward_length() {
    let dir = tempdir().unwrap();
    let mut board = seeded_directory(dir.path());

    let mut draft = valid_draft("ok", Category::Fest, Utc::now());
    draft.title = "  ab  ".into();
    let err = board.create_event(&draft).unwrap_err();
    let DirectoryError::Validation(errors) = err else {
        panic!("expected validation errors");
    };
    assert!(errors.get(EventField::Title).is_some());
}

#[test]
fn test_description_length_boundary() {
    let dir = tempdir().unwrap();
    let mut board = seeded_directory(dir.path());

    let mut draft = valid_draft("Boundary", Category::Seminar, Utc::now());
    draft.description = "123456789".into();
    let err = board.create_event(&draft).unwrap_err();
    let DirectoryError::Validation(errors) = err else {
        panic!("expected validation errors");
    };
    assert_eq!(
        errors.get(EventField::Description),
        Some("Description must be at least 10 characters long")
    );

    draft.description = "1234567890".into();
    assert!(board.create_event(&draft).is_ok());
}

#[test]
fn test_update_event_replaces_editable_fields() {
    let dir = tempdir().unwrap();
    let mut board = seeded_directory(dir.path());
    let before = board.event_by_id("e-1").unwrap().clone();

    let mut draft = valid_draft("Spring Hackathon XL", Category::Hackathon, Utc::now());
    draft.location = "Gym".into();
    let updated = board.update_event("e-1", &draft).unwrap();

    assert_eq!(updated.id, "e-1");
    assert_eq!(updated.title, "Spring Hackathon XL");
    assert_eq!(updated.location, "Gym");
    assert_eq!(updated.created_at, before.created_at);
    assert_eq!(updated.organizer, before.organizer);
    assert!(updated.updated_at > before.updated_at);

    assert_eq!(board.event_by_id("e-1").unwrap().title, "Spring Hackathon XL");
}

#[test]
fn test_update_event_validates_before_mutating() {
    let dir = tempdir().unwrap();
    let mut board = seeded_directory(dir.path());
    let before = board.event_by_id("e-1").unwrap().clone();
    let now = Utc::now();

    // Start moved into the past.
    let mut draft = valid_draft("Rescheduled", Category::Hackathon, now);
    draft.start = Some(now - Duration::hours(1));
    let err = board.update_event("e-1", &draft).unwrap_err();
    let DirectoryError::Validation(errors) = err else {
        panic!("expected validation errors");
    };
    assert_eq!(
        errors.get(EventField::Start),
        Some("Start time cannot be in the past")
    );

    // Description trimmed below the minimum.
    let mut draft = valid_draft("Rescheduled", Category::Hackathon, now);
    draft.description = "too short".into();
    let err = board.update_event("e-1", &draft).unwrap_err();
    let DirectoryError::Validation(errors) = err else {
        panic!("expected validation errors");
    };
    assert_eq!(
        errors.get(EventField::Description),
        Some("Description must be at least 10 characters long")
    );

    // Rejected edits leave the stored event untouched.
    assert_eq!(board.event_by_id("e-1").unwrap(), &before);
}

#[test]
fn test_update_event_requires_organizer() {
    let dir = tempdir().unwrap();
    let mut board = seeded_directory(dir.path());
    board.sign_in("bob@campus.edu").unwrap();

    let draft = valid_draft("Hijacked", Category::Fest, Utc::now());
    let err = board.update_event("e-1", &draft).unwrap_err();
    assert!(matches!(err, DirectoryError::NotOrganizer { .. }));
    assert_eq!(board.event_by_id("e-1").unwrap().title, "Spring Hackathon");
}

#[test]
fn test_update_unknown_event() {
    let dir = tempdir().unwrap();
    let mut board = seeded_directory(dir.path());

    let draft = valid_draft("Nowhere", Category::Fest, Utc::now());
    let err = board.update_event("e-missing", &draft).unwrap_err();
    assert!(matches!(err, DirectoryError::UnknownEvent(_)));
}

#[test]
fn test_delete_event() {
    let dir = tempdir().unwrap();
    let mut board = seeded_directory(dir.path());
    board.toggle_rsvp("e-1").unwrap();

    board.delete_event("e-1").unwrap();

    assert!(board.event_by_id("e-1").is_none());
    assert_eq!(board.events().len(), 2);
    let user = board.current_user().unwrap();
    assert!(!user.created_event_ids.contains(&"e-1".to_string()));
    // No cascade: the ledger entry for the dead event survives.
    assert_eq!(board.ledger().count("e-1"), 1);
}

#[test]
fn test_delete_requires_organizer() {
    let dir = tempdir().unwrap();
    let mut board = seeded_directory(dir.path());
    board.sign_in("bob@campus.edu").unwrap();

    let err = board.delete_event("e-1").unwrap_err();
    assert!(matches!(err, DirectoryError::NotOrganizer { .. }));
    assert_eq!(board.events().len(), 3);
}

#[test]
fn test_toggle_rsvp_syncs_every_mirror() {
    let dir = tempdir().unwrap();
    let mut board = seeded_directory(dir.path());

    let status = board.toggle_rsvp("e-1").unwrap();
    assert!(status.is_joined());
    assert_eq!(status.message(), "RSVP confirmed!");

    assert!(board.has_rsvped("e-1", "u-alice"));
    assert!(board.current_user().unwrap().has_rsvped("e-1"));
    let in_list = board.users().iter().find(|u| u.id == "u-alice").unwrap();
    assert!(in_list.has_rsvped("e-1"));
    assert_eq!(board.event_by_id("e-1").unwrap().rsvp_count, 1);

    let status = board.toggle_rsvp("e-1").unwrap();
    assert!(!status.is_joined());
    assert_eq!(status.message(), "RSVP cancelled");
    assert!(!board.has_rsvped("e-1", "u-alice"));
    assert!(!board.current_user().unwrap().has_rsvped("e-1"));
    assert_eq!(board.event_by_id("e-1").unwrap().rsvp_count, 0);
}

#[test]
fn test_rsvp_and_cancel_report_changes() {
    let dir = tempdir().unwrap();
    let mut board = seeded_directory(dir.path());

    assert!(board.rsvp("e-1").unwrap());
    assert!(!board.rsvp("e-1").unwrap(), "already joined");
    assert_eq!(board.rsvp_count("e-1"), 1);

    assert!(board.cancel_rsvp("e-1").unwrap());
    assert!(!board.cancel_rsvp("e-1").unwrap(), "already cancelled");
    assert_eq!(board.rsvp_count("e-1"), 0);
}

#[test]
fn test_rsvp_unknown_event() {
    let dir = tempdir().unwrap();
    let mut board = seeded_directory(dir.path());

    let err = board.toggle_rsvp("e-missing").unwrap_err();
    assert!(matches!(err, DirectoryError::UnknownEvent(_)));
}

#[test]
fn test_counts_from_several_users() {
    let dir = tempdir().unwrap();
    let mut board = seeded_directory(dir.path());

    board.rsvp("e-1").unwrap();
    board.sign_in("bob@campus.edu").unwrap();
    board.rsvp("e-1").unwrap();

    assert_eq!(board.rsvp_count("e-1"), 2);
    assert_eq!(board.ledger().attendees("e-1"), ["u-alice", "u-bob"]);
    assert_eq!(board.event_with_rsvp_count("e-1").unwrap().rsvp_count, 2);
}

#[test]
fn test_rsvped_and_created_views() {
    let dir = tempdir().unwrap();
    let mut board = seeded_directory(dir.path());

    board.rsvp("e-2").unwrap();
    let rsvped = board.rsvped_events();
    assert_eq!(rsvped.len(), 1);
    assert_eq!(rsvped[0].id, "e-2");

    let created = board.created_events();
    assert_eq!(created.len(), 3, "alice organizes all seeded events");

    board.sign_in("bob@campus.edu").unwrap();
    assert!(board.created_events().is_empty());
    assert!(board.rsvped_events().is_empty());

    board.sign_out();
    assert!(board.created_events().is_empty());
    assert!(board.rsvped_events().is_empty());
}

#[test]
fn test_query_and_category_views() {
    let dir = tempdir().unwrap();
    let board = seeded_directory(dir.path());

    let workshops = board.events_by_category(Category::Workshop);
    assert_eq!(workshops.len(), 1);
    assert_eq!(workshops[0].id, "e-2");

    let spec = quadboard::FilterSpec {
        search: "rust".into(),
        ..Default::default()
    };
    let hits = board.query(&spec, quadboard::SortKey::DateAsc);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "e-2");
}

#[test]
fn test_related_events() {
    let dir = tempdir().unwrap();
    let mut board = seeded_directory(dir.path());

    // Add more meetups so the limit matters.
    for i in 0..8 {
        let draft = valid_draft(&format!("Meetup {i}"), Category::Meetup, Utc::now());
        board.create_event(&draft).unwrap();
    }

    let related = board.related_events("e-3", DEFAULT_RELATED_LIMIT);
    assert_eq!(related.len(), DEFAULT_RELATED_LIMIT);
    assert!(related.iter().all(|e| e.category == Category::Meetup));
    assert!(related.iter().all(|e| e.id != "e-3"), "anchor excluded");

    assert!(board.related_events("e-missing", DEFAULT_RELATED_LIMIT).is_empty());
}

#[test]
fn test_stats_view() {
    let dir = tempdir().unwrap();
    let board = seeded_directory(dir.path());

    let s = board.stats(Utc::now());
    assert_eq!(s.total, 3);
    assert_eq!(s.upcoming, 3);
    assert_eq!(s.past, 0);
}

#[test]
fn test_theme_toggle_persists() {
    let dir = tempdir().unwrap();
    {
        let mut board = seeded_directory(dir.path());
        assert_eq!(board.theme(), Theme::Light);
        assert_eq!(board.toggle_theme(), Theme::Dark);
    }

    let board = Directory::builder(dir.path()).watch(false).open().unwrap();
    assert_eq!(board.theme(), Theme::Dark);
}

#[test]
fn test_seed_never_overwrites_existing_data() {
    let dir = tempdir().unwrap();
    {
        let _board = seeded_directory(dir.path());
    }

    // Re-open with a different seed; the original data must survive.
    let stranger = sample_user("u-zed", "Zed", "zed@campus.edu");
    let board = Directory::builder(dir.path())
        .watch(false)
        .seed(Vec::new(), vec![stranger])
        .open()
        .unwrap();

    assert_eq!(board.users().len(), 2);
    assert!(board.users().iter().all(|u| u.id != "u-zed"));
    assert_eq!(board.current_user().unwrap().id, "u-alice");
}

#[test]
fn test_state_survives_reopen() {
    let dir = tempdir().unwrap();
    let event_id;
    {
        let mut board = seeded_directory(dir.path());
        let draft = valid_draft("Persistent Event", Category::Fest, Utc::now());
        event_id = board.create_event(&draft).unwrap().id;
        board.toggle_rsvp(&event_id).unwrap();
    }

    let board = Directory::builder(dir.path()).watch(false).open().unwrap();
    assert_eq!(board.events().len(), 4);
    assert!(board.event_by_id(&event_id).is_some());
    assert!(board.has_rsvped(&event_id, "u-alice"));
    assert_eq!(board.event_by_id(&event_id).unwrap().rsvp_count, 1);
}

#[test]
fn test_clear_all_resets_everything() {
    let dir = tempdir().unwrap();
    let mut board = seeded_directory(dir.path());
    board.toggle_rsvp("e-1").unwrap();
    board.set_theme(Theme::Dark);

    board.clear_all();

    assert!(board.events().is_empty());
    assert!(board.users().is_empty());
    assert!(board.current_user().is_none());
    assert!(board.ledger().is_empty());
    assert_eq!(board.theme(), Theme::Light);
    assert!(!dir.path().join("events.json").exists());
    assert!(!dir.path().join("theme.json").exists());
}

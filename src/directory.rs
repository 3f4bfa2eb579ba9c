//! The directory façade: one explicit session object owning the store and
//! the five record cells. Nothing in the crate is global — open a
//! [`Directory`] at session start, drop it at session end.

use crate::cell::StoreCell;
use crate::error::{DirectoryError, StoreError};
use crate::model::{Category, Event, EventDraft, NewUser, Organizer, Preferences, Theme, User};
use crate::query::{self, FilterSpec, SortKey};
use crate::rsvp::{RsvpLedger, RsvpStatus};
use crate::stats::{self, Summary};
use crate::store::{Store, StoreKey, WaitResult};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::time::Duration;
use uuid::Uuid;

/// Default number of events [`Directory::related_events`] returns.
pub const DEFAULT_RELATED_LIMIT: usize = 6;

/// Configures and opens a [`Directory`].
///
/// ```no_run
/// use quadboard::Directory;
///
/// let board = Directory::builder("./board").watch(false).open()?;
/// # Ok::<(), quadboard::StoreError>(())
/// ```
pub struct DirectoryBuilder {
    dir: PathBuf,
    watch: bool,
    seed_events: Vec<Event>,
    seed_users: Vec<User>,
}

impl DirectoryBuilder {
    /// Whether to start the filesystem watcher. Defaults to `true`; batch
    /// tools that never sync can skip it.
    pub fn watch(mut self, watch: bool) -> Self {
        self.watch = watch;
        self
    }

    /// Starter data applied on open. Only collections that are empty on disk
    /// are filled; existing data always wins.
    pub fn seed(mut self, events: Vec<Event>, users: Vec<User>) -> Self {
        self.seed_events = events;
        self.seed_users = users;
        self
    }

    /// Open the directory.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the store directory cannot be created
    /// or the watcher cannot be started.
    pub fn open(self) -> Result<Directory, StoreError> {
        let store = if self.watch {
            Store::open(&self.dir)?
        } else {
            Store::open_unwatched(&self.dir)?
        };
        let mut directory = Directory::from_store(store);
        if !self.seed_events.is_empty() || !self.seed_users.is_empty() {
            directory.seed(self.seed_events, self.seed_users);
        }
        Ok(directory)
    }
}

/// A campus events directory backed by one on-disk store.
///
/// The directory owns the in-memory snapshots of all five collections and is
/// the session context: the "current actor" for lifecycle and RSVP
/// operations is whoever is signed in on *this* instance. Several instances
/// (same process or not) may share a store directory; each observes the
/// others through [`sync_external_changes`](Directory::sync_external_changes)
/// with last-write-wins semantics per key.
pub struct Directory {
    store: Store,
    events: StoreCell<Vec<Event>>,
    users: StoreCell<Vec<User>>,
    current_user: StoreCell<Option<User>>,
    theme: StoreCell<Theme>,
    rsvps: StoreCell<RsvpLedger>,
}

impl Directory {
    /// Open or create a directory rooted at `dir` with the watcher running.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the store cannot be opened.
    pub fn open(dir: impl AsRef<Path>) -> Result<Directory, StoreError> {
        Directory::builder(dir).open()
    }

    /// Start configuring a directory.
    pub fn builder(dir: impl AsRef<Path>) -> DirectoryBuilder {
        DirectoryBuilder {
            dir: dir.as_ref().to_path_buf(),
            watch: true,
            seed_events: Vec::new(),
            seed_users: Vec::new(),
        }
    }

    fn from_store(mut store: Store) -> Directory {
        // Exactly one seeding read per cell.
        let events = StoreCell::new(StoreKey::Events, store.read_records(StoreKey::Events));
        let users = StoreCell::new(StoreKey::Users, store.read_records(StoreKey::Users));
        let current_user =
            StoreCell::new(StoreKey::CurrentUser, store.read(StoreKey::CurrentUser, None));
        let theme = StoreCell::new(StoreKey::Theme, store.read(StoreKey::Theme, Theme::default()));
        let rsvps = StoreCell::new(StoreKey::Rsvps, store.read(StoreKey::Rsvps, RsvpLedger::new()));
        Directory {
            store,
            events,
            users,
            current_user,
            theme,
            rsvps,
        }
    }

    // --- snapshots ---

    /// Every stored event, input order. No I/O.
    pub fn events(&self) -> &[Event] {
        self.events.get()
    }

    /// Every registered user.
    pub fn users(&self) -> &[User] {
        self.users.get()
    }

    /// The signed-in user, if any.
    pub fn current_user(&self) -> Option<&User> {
        self.current_user.get().as_ref()
    }

    /// The authoritative RSVP ledger.
    pub fn ledger(&self) -> &RsvpLedger {
        self.rsvps.get()
    }

    pub fn theme(&self) -> Theme {
        *self.theme.get()
    }

    /// The on-disk location backing this directory.
    pub fn dir(&self) -> &Path {
        self.store.dir()
    }

    // --- session ---

    /// Sign in as the user registered under `email`.
    ///
    /// Local trust model: the account is looked up, nothing is verified.
    ///
    /// # Errors
    ///
    /// [`DirectoryError::UnknownUser`] when no account matches.
    pub fn sign_in(&mut self, email: &str) -> Result<User, DirectoryError> {
        let user = self
            .users
            .get()
            .iter()
            .find(|u| u.email == email)
            .cloned()
            .ok_or_else(|| DirectoryError::UnknownUser(email.to_string()))?;
        self.current_user.set(&mut self.store, Some(user.clone()));
        Ok(user)
    }

    pub fn sign_out(&mut self) {
        self.current_user.set(&mut self.store, None);
    }

    /// Create an account with default preferences and sign it in.
    pub fn register(&mut self, new_user: NewUser) -> User {
        let user = User {
            id: Uuid::new_v4().to_string(),
            name: new_user.name,
            email: new_user.email,
            avatar_url: new_user.avatar_url,
            rsvps: Vec::new(),
            created_event_ids: Vec::new(),
            preferences: Preferences::default(),
        };
        let stored = user.clone();
        self.users.update(&mut self.store, |mut users| {
            users.push(stored);
            users
        });
        self.current_user.set(&mut self.store, Some(user.clone()));
        user
    }

    /// Edit the signed-in user's profile.
    ///
    /// The edit lands in both the users collection and the current-user
    /// pointer. Events they already organize keep their original organizer
    /// snapshot. The id is the row key and cannot be edited.
    ///
    /// # Errors
    ///
    /// [`DirectoryError::NotSignedIn`] when nobody is signed in.
    pub fn update_profile(
        &mut self,
        edit: impl FnOnce(&mut User),
    ) -> Result<User, DirectoryError> {
        let mut user = self.actor()?;
        let id = user.id.clone();
        edit(&mut user);
        user.id = id;
        self.store_user(user.clone());
        Ok(user)
    }

    /// Edit the signed-in user's preferences.
    ///
    /// # Errors
    ///
    /// [`DirectoryError::NotSignedIn`] when nobody is signed in.
    pub fn update_preferences(
        &mut self,
        edit: impl FnOnce(&mut Preferences),
    ) -> Result<User, DirectoryError> {
        self.update_profile(|user| edit(&mut user.preferences))
    }

    // --- event lifecycle ---

    /// Create an event organized by the signed-in user.
    ///
    /// The signed-in check and draft validation run in full before anything
    /// is written. The stored event embeds an organizer snapshot copied from
    /// the actor, starts with an empty attendee mirror, and its id is
    /// recorded in the actor's `created_event_ids`.
    ///
    /// # Errors
    ///
    /// [`DirectoryError::NotSignedIn`] or [`DirectoryError::Validation`]
    /// with a field-keyed message map.
    pub fn create_event(&mut self, draft: &EventDraft) -> Result<Event, DirectoryError> {
        let mut actor = self.actor()?;
        let now = Utc::now();
        let (category, start, end) = draft.checked(now)?;

        let event = Event {
            id: Uuid::new_v4().to_string(),
            title: draft.title.clone(),
            description: draft.description.clone(),
            category,
            location: draft.location.clone(),
            start,
            end,
            tags: draft.tags.clone(),
            image_url: draft.image_url.clone(),
            organizer: Organizer::snapshot_of(&actor),
            rsvp_count: 0,
            created_at: now,
            updated_at: now,
        };

        let stored = event.clone();
        self.events.update(&mut self.store, |mut events| {
            events.push(stored);
            events
        });
        actor.created_event_ids.push(event.id.clone());
        self.store_user(actor);
        Ok(event)
    }

    /// Replace the editable fields of an event the signed-in user organizes.
    ///
    /// All checks precede any mutation. `updated_at` is refreshed and the
    /// cached `rsvp_count` re-mirrored from the ledger.
    ///
    /// # Errors
    ///
    /// [`DirectoryError::NotSignedIn`], [`DirectoryError::UnknownEvent`],
    /// [`DirectoryError::NotOrganizer`], or [`DirectoryError::Validation`].
    pub fn update_event(
        &mut self,
        event_id: &str,
        draft: &EventDraft,
    ) -> Result<Event, DirectoryError> {
        let actor = self.actor()?;
        let now = Utc::now();
        let existing = self.find_event(event_id)?;
        Self::ensure_organizer(&actor, existing)?;
        let (category, start, end) = draft.checked(now)?;

        let mut updated = existing.clone();
        updated.title = draft.title.clone();
        updated.description = draft.description.clone();
        updated.category = category;
        updated.location = draft.location.clone();
        updated.start = start;
        updated.end = end;
        updated.tags = draft.tags.clone();
        updated.image_url = draft.image_url.clone();
        updated.rsvp_count = self.rsvps.get().count(event_id);
        updated.updated_at = now;

        let stored = updated.clone();
        self.events.update(&mut self.store, |mut events| {
            if let Some(slot) = events.iter_mut().find(|e| e.id == stored.id) {
                *slot = stored;
            }
            events
        });
        Ok(updated)
    }

    /// Delete an event the signed-in user organizes.
    ///
    /// The id is withdrawn from the organizer's `created_event_ids`. Ledger
    /// entries for the event are deliberately left in place — no cascade.
    ///
    /// # Errors
    ///
    /// [`DirectoryError::NotSignedIn`], [`DirectoryError::UnknownEvent`], or
    /// [`DirectoryError::NotOrganizer`]; the event is untouched on failure.
    pub fn delete_event(&mut self, event_id: &str) -> Result<(), DirectoryError> {
        let mut actor = self.actor()?;
        let existing = self.find_event(event_id)?;
        Self::ensure_organizer(&actor, existing)?;

        self.events.update(&mut self.store, |mut events| {
            events.retain(|e| e.id != event_id);
            events
        });
        actor.created_event_ids.retain(|id| id != event_id);
        self.store_user(actor);
        Ok(())
    }

    // --- RSVPs ---

    /// Flip the signed-in user's attendance for `event_id`.
    ///
    /// Besides the ledger, three mirrors are kept in step: the actor's
    /// membership list, the users collection, and the event's cached
    /// `rsvp_count`. The returned status carries the user-facing message.
    ///
    /// # Errors
    ///
    /// [`DirectoryError::NotSignedIn`] or [`DirectoryError::UnknownEvent`].
    pub fn toggle_rsvp(&mut self, event_id: &str) -> Result<RsvpStatus, DirectoryError> {
        let actor = self.actor()?;
        self.find_event(event_id)?;

        let mut ledger = self.rsvps.get().clone();
        let status = ledger.toggle(event_id, &actor.id);
        self.rsvps.set(&mut self.store, ledger);
        self.sync_rsvp_mirrors(actor, event_id, status.is_joined());
        Ok(status)
    }

    /// Join the signed-in user to `event_id`. No-op when already joined.
    ///
    /// Returns whether a change occurred.
    ///
    /// # Errors
    ///
    /// [`DirectoryError::NotSignedIn`] or [`DirectoryError::UnknownEvent`].
    pub fn rsvp(&mut self, event_id: &str) -> Result<bool, DirectoryError> {
        let actor = self.actor()?;
        self.find_event(event_id)?;

        let mut ledger = self.rsvps.get().clone();
        let changed = ledger.add(event_id, &actor.id);
        if changed {
            self.rsvps.set(&mut self.store, ledger);
            self.sync_rsvp_mirrors(actor, event_id, true);
        }
        Ok(changed)
    }

    /// Withdraw the signed-in user from `event_id`. No-op when not joined.
    ///
    /// Returns whether a change occurred.
    ///
    /// # Errors
    ///
    /// [`DirectoryError::NotSignedIn`] or [`DirectoryError::UnknownEvent`].
    pub fn cancel_rsvp(&mut self, event_id: &str) -> Result<bool, DirectoryError> {
        let actor = self.actor()?;
        self.find_event(event_id)?;

        let mut ledger = self.rsvps.get().clone();
        let changed = ledger.remove(event_id, &actor.id);
        if changed {
            self.rsvps.set(&mut self.store, ledger);
            self.sync_rsvp_mirrors(actor, event_id, false);
        }
        Ok(changed)
    }

    /// Whether `user_id` is joined to `event_id`, per the authoritative
    /// ledger.
    pub fn has_rsvped(&self, event_id: &str, user_id: &str) -> bool {
        self.rsvps.get().is_joined(event_id, user_id)
    }

    /// Attendee count for `event_id` from the authoritative ledger.
    pub fn rsvp_count(&self, event_id: &str) -> usize {
        self.rsvps.get().count(event_id)
    }

    /// The event with its cached `rsvp_count` refreshed from the ledger.
    pub fn event_with_rsvp_count(&self, event_id: &str) -> Option<Event> {
        let mut event = self.event_by_id(event_id)?.clone();
        event.rsvp_count = self.rsvps.get().count(event_id);
        Some(event)
    }

    // --- queries ---

    /// Filtered, ordered snapshot of the events collection.
    pub fn query(&self, spec: &FilterSpec, sort: SortKey) -> Vec<Event> {
        query::filter_and_sort(self.events.get(), spec, sort)
    }

    pub fn event_by_id(&self, event_id: &str) -> Option<&Event> {
        self.events.get().iter().find(|e| e.id == event_id)
    }

    /// Events in `category`, input order.
    pub fn events_by_category(&self, category: Category) -> Vec<Event> {
        self.events
            .get()
            .iter()
            .filter(|e| e.category == category)
            .cloned()
            .collect()
    }

    /// Up to `limit` events sharing a category with `event_id`, excluding
    /// the event itself, input order. Unknown ids yield an empty list.
    pub fn related_events(&self, event_id: &str, limit: usize) -> Vec<Event> {
        let Some(anchor) = self.event_by_id(event_id) else {
            return Vec::new();
        };
        self.events
            .get()
            .iter()
            .filter(|e| e.category == anchor.category && e.id != event_id)
            .take(limit)
            .cloned()
            .collect()
    }

    /// Events organized by the signed-in user; empty when signed out.
    pub fn created_events(&self) -> Vec<Event> {
        let Some(user) = self.current_user.get() else {
            return Vec::new();
        };
        self.events
            .get()
            .iter()
            .filter(|e| user.created_event_ids.iter().any(|id| *id == e.id))
            .cloned()
            .collect()
    }

    /// Events on the signed-in user's membership list; empty when signed
    /// out.
    pub fn rsvped_events(&self) -> Vec<Event> {
        let Some(user) = self.current_user.get() else {
            return Vec::new();
        };
        self.events
            .get()
            .iter()
            .filter(|e| user.has_rsvped(&e.id))
            .cloned()
            .collect()
    }

    /// Dashboard roll-up of the current events collection.
    pub fn stats(&self, now: DateTime<Utc>) -> Summary {
        stats::summary(self.events.get(), now)
    }

    // --- theme ---

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme.set(&mut self.store, theme);
    }

    /// Flip between light and dark; returns the new theme.
    pub fn toggle_theme(&mut self) -> Theme {
        let next = self.theme.get().toggled();
        self.theme.set(&mut self.store, next);
        next
    }

    // --- store plumbing ---

    /// Fill empty collections with starter data.
    ///
    /// Existing data is never overwritten. When nobody is signed in and
    /// users exist afterwards, the first user becomes the current one.
    pub fn seed(&mut self, events: Vec<Event>, users: Vec<User>) {
        if self.events.get().is_empty() && !events.is_empty() {
            self.events.set(&mut self.store, events);
        }
        if self.users.get().is_empty() && !users.is_empty() {
            self.users.set(&mut self.store, users);
        }
        if self.current_user.get().is_none() {
            if let Some(first) = self.users.get().first().cloned() {
                self.current_user.set(&mut self.store, Some(first));
            }
        }
    }

    /// Remove every key from the store and reset all snapshots.
    pub fn clear_all(&mut self) {
        self.events.clear(&mut self.store);
        self.users.clear(&mut self.store);
        self.current_user.clear(&mut self.store);
        self.theme.clear(&mut self.store);
        self.rsvps.clear(&mut self.store);
    }

    /// Fold in writes made by other contexts.
    ///
    /// Polls the store and reloads every cell whose key changed on disk,
    /// replacing the in-memory snapshot (last writer wins, no merge).
    /// Returns the keys that were refreshed.
    pub fn sync_external_changes(&mut self) -> Vec<StoreKey> {
        let changed = self.store.poll_changes();
        for key in &changed {
            match key {
                StoreKey::Events => {
                    let value = self.store.read_records(StoreKey::Events);
                    self.events.adopt(value);
                }
                StoreKey::Users => {
                    let value = self.store.read_records(StoreKey::Users);
                    self.users.adopt(value);
                }
                StoreKey::CurrentUser => {
                    let value = self.store.read(StoreKey::CurrentUser, None);
                    self.current_user.adopt(value);
                }
                StoreKey::Theme => {
                    let value = self.store.read(StoreKey::Theme, Theme::default());
                    self.theme.adopt(value);
                }
                StoreKey::Rsvps => {
                    let value = self.store.read(StoreKey::Rsvps, RsvpLedger::new());
                    self.rsvps.adopt(value);
                }
            }
        }
        changed
    }

    /// Block until another context changes the store, then fold the changes
    /// in. A timeout leaves every snapshot untouched.
    pub fn wait_external_change(&mut self, timeout: Duration) -> WaitResult {
        let result = self.store.wait_for_change(timeout);
        if let WaitResult::Changed(_) = &result {
            self.sync_external_changes();
        }
        result
    }

    // --- internals ---

    /// The signed-in user, cloned.
    fn actor(&self) -> Result<User, DirectoryError> {
        self.current_user
            .get()
            .clone()
            .ok_or(DirectoryError::NotSignedIn)
    }

    fn find_event(&self, event_id: &str) -> Result<&Event, DirectoryError> {
        self.event_by_id(event_id)
            .ok_or_else(|| DirectoryError::UnknownEvent(event_id.to_string()))
    }

    fn ensure_organizer(actor: &User, event: &Event) -> Result<(), DirectoryError> {
        if event.organizer.id == actor.id {
            Ok(())
        } else {
            Err(DirectoryError::NotOrganizer {
                user_id: actor.id.clone(),
                event_id: event.id.clone(),
            })
        }
    }

    /// Write `user` into the users collection and, when they are the one
    /// signed in, the current-user pointer.
    fn store_user(&mut self, user: User) {
        self.users.update(&mut self.store, |mut users| {
            match users.iter_mut().find(|u| u.id == user.id) {
                Some(slot) => *slot = user.clone(),
                None => users.push(user.clone()),
            }
            users
        });
        let signed_in = self
            .current_user
            .get()
            .as_ref()
            .is_some_and(|cur| cur.id == user.id);
        if signed_in {
            self.current_user.set(&mut self.store, Some(user));
        }
    }

    /// Re-mirror one user's ledger change into the membership list, the
    /// users collection, and the event's cached count.
    fn sync_rsvp_mirrors(&mut self, mut actor: User, event_id: &str, joined: bool) {
        if joined {
            if !actor.has_rsvped(event_id) {
                actor.rsvps.push(event_id.to_string());
            }
        } else {
            actor.rsvps.retain(|id| id != event_id);
        }
        self.store_user(actor);

        let count = self.rsvps.get().count(event_id);
        self.events.update(&mut self.store, |mut events| {
            if let Some(event) = events.iter_mut().find(|e| e.id == event_id) {
                event.rsvp_count = count;
            }
            events
        });
    }
}

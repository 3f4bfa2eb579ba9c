mod cell;
mod directory;
mod error;
mod model;
pub mod query;
mod rsvp;
pub mod stats;
mod store;

pub use cell::StoreCell;
pub use directory::{Directory, DirectoryBuilder, DEFAULT_RELATED_LIMIT};
pub use error::{DirectoryError, EventField, StoreError, ValidationErrors};
pub use model::{Category, Event, EventDraft, NewUser, Organizer, Preferences, Theme, User};
pub use query::{FilterSpec, SortKey};
pub use rsvp::{RsvpLedger, RsvpStatus};
pub use stats::{CategoryCount, Summary, DEFAULT_POPULAR_LIMIT};
pub use store::{Store, StoreKey, WaitResult};

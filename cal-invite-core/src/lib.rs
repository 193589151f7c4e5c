//! Core library for cal-invite.
//!
//! Turns a single event description into "add to calendar" links for web
//! calendar services and into RFC 5545 iCalendar text:
//! - `event` holds the validated `Event` model
//! - `provider` holds one encoder per target and the `Provider` registry
//! - `cache`, `download` and `config` are optional collaborators around generation

pub mod cache;
pub mod clock;
pub mod config;
pub mod download;
pub mod error;
pub mod event;
pub mod format;
pub mod provider;

pub use clock::GenerateContext;
pub use error::{CalInviteError, CalInviteResult};
pub use event::{Event, EventAttributes, EventTimezone, EventUpdate, Session, SessionAttributes};
pub use provider::{Encoder, Provider, generate, generate_with};

/// Build and validate an event from plain attributes.
pub fn build_event(attributes: EventAttributes) -> CalInviteResult<Event> {
    Event::new(attributes)
}

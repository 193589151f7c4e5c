//! The event model shared by every provider encoder.
//!
//! An `Event` is built once from a plain `EventAttributes` set and validated on
//! construction. Encoders only ever see a validated event; the only way to
//! change one afterwards is `update_attributes`, which re-runs validation
//! before committing anything.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, FixedOffset, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{CalInviteError, CalInviteResult};

pub const DEFAULT_TIMEZONE: &str = "UTC";

/// One start/end pair to render, always in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// A session as supplied by a caller, with any UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionAttributes {
    pub start_time: DateTime<FixedOffset>,
    pub end_time: DateTime<FixedOffset>,
}

/// Plain attribute set an `Event` is constructed from.
///
/// Deserializes from JSON/TOML with RFC 3339 timestamps; every field except
/// `title` may be omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventAttributes {
    pub title: String,
    pub start_time: Option<DateTime<FixedOffset>>,
    pub end_time: Option<DateTime<FixedOffset>>,
    pub all_day: bool,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub location: Option<String>,
    /// Virtual meeting link
    pub url: Option<String>,
    pub attendees: Vec<String>,
    pub show_attendees: bool,
    /// IANA name or `±HH:MM`; "UTC" when absent
    pub timezone: Option<String>,
    pub multi_day_sessions: Vec<SessionAttributes>,
}

/// Partial update merged field-by-field into an existing event.
///
/// `None` leaves a field untouched. Optional fields take `Some(None)` to clear them.
#[derive(Debug, Clone, Default)]
pub struct EventUpdate {
    pub title: Option<String>,
    pub start_time: Option<Option<DateTime<FixedOffset>>>,
    pub end_time: Option<Option<DateTime<FixedOffset>>>,
    pub all_day: Option<bool>,
    pub description: Option<Option<String>>,
    pub notes: Option<Option<String>>,
    pub location: Option<Option<String>>,
    pub url: Option<Option<String>>,
    pub attendees: Option<Vec<String>>,
    pub show_attendees: Option<bool>,
    pub timezone: Option<String>,
    pub multi_day_sessions: Option<Vec<SessionAttributes>>,
}

/// Display timezone of an event. Never affects the stored UTC instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventTimezone {
    #[default]
    Utc,
    Named(Tz),
    Fixed(FixedOffset),
}

impl FromStr for EventTimezone {
    type Err = CalInviteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if s == DEFAULT_TIMEZONE {
            return Ok(EventTimezone::Utc);
        }

        if let Ok(tz) = s.parse::<Tz>() {
            return Ok(EventTimezone::Named(tz));
        }

        parse_fixed_offset(s).map(EventTimezone::Fixed).ok_or_else(|| {
            CalInviteError::Validation(format!(
                "Unknown timezone '{}'. Expected an IANA name (e.g. America/New_York) or an offset like +01:00",
                s
            ))
        })
    }
}

impl fmt::Display for EventTimezone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventTimezone::Utc => f.write_str(DEFAULT_TIMEZONE),
            EventTimezone::Named(tz) => f.write_str(tz.name()),
            EventTimezone::Fixed(offset) => {
                let secs = offset.local_minus_utc();
                let sign = if secs < 0 { '-' } else { '+' };
                let secs = secs.abs();
                write!(f, "{}{:02}:{:02}", sign, secs / 3600, (secs % 3600) / 60)
            }
        }
    }
}

/// Parse `+HH:MM` / `-HH:MM`
fn parse_fixed_offset(s: &str) -> Option<FixedOffset> {
    let (sign, rest) = match s.as_bytes().first()? {
        b'+' => (1, &s[1..]),
        b'-' => (-1, &s[1..]),
        _ => return None,
    };
    let (hours, minutes) = rest.split_once(':')?;
    if hours.len() != 2 || minutes.len() != 2 {
        return None;
    }
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// A validated calendar event, possibly spanning several sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "EventAttributes", into = "EventAttributes")]
pub struct Event {
    pub(crate) title: String,
    pub(crate) start_time: Option<DateTime<Utc>>,
    pub(crate) end_time: Option<DateTime<Utc>>,
    pub(crate) all_day: bool,
    pub(crate) description: Option<String>,
    pub(crate) notes: Option<String>,
    pub(crate) location: Option<String>,
    pub(crate) url: Option<String>,
    pub(crate) attendees: Vec<String>,
    pub(crate) show_attendees: bool,
    pub(crate) timezone: EventTimezone,
    pub(crate) multi_day_sessions: Vec<Session>,
}

impl Event {
    /// Build and validate an event. All instants are normalized to UTC.
    pub fn new(attributes: EventAttributes) -> CalInviteResult<Self> {
        let timezone = match attributes.timezone.as_deref() {
            Some(tz) => tz.parse()?,
            None => EventTimezone::Utc,
        };

        let event = Event {
            title: attributes.title,
            start_time: attributes.start_time.map(|t| t.with_timezone(&Utc)),
            end_time: attributes.end_time.map(|t| t.with_timezone(&Utc)),
            all_day: attributes.all_day,
            description: attributes.description,
            notes: attributes.notes,
            location: attributes.location,
            url: attributes.url,
            attendees: attributes.attendees,
            show_attendees: attributes.show_attendees,
            timezone,
            multi_day_sessions: attributes
                .multi_day_sessions
                .into_iter()
                .map(to_session)
                .collect(),
        };

        event.validate()?;
        Ok(event)
    }

    /// Merge `update` into this event. The event is left untouched if the
    /// merged state does not validate.
    pub fn update_attributes(&mut self, update: EventUpdate) -> CalInviteResult<()> {
        let mut candidate = self.clone();

        if let Some(title) = update.title {
            candidate.title = title;
        }
        if let Some(start) = update.start_time {
            candidate.start_time = start.map(|t| t.with_timezone(&Utc));
        }
        if let Some(end) = update.end_time {
            candidate.end_time = end.map(|t| t.with_timezone(&Utc));
        }
        if let Some(all_day) = update.all_day {
            candidate.all_day = all_day;
        }
        if let Some(description) = update.description {
            candidate.description = description;
        }
        if let Some(notes) = update.notes {
            candidate.notes = notes;
        }
        if let Some(location) = update.location {
            candidate.location = location;
        }
        if let Some(url) = update.url {
            candidate.url = url;
        }
        if let Some(attendees) = update.attendees {
            candidate.attendees = attendees;
        }
        if let Some(show) = update.show_attendees {
            candidate.show_attendees = show;
        }
        if let Some(tz) = update.timezone {
            candidate.timezone = tz.parse()?;
        }
        if let Some(sessions) = update.multi_day_sessions {
            candidate.multi_day_sessions = sessions.into_iter().map(to_session).collect();
        }

        candidate.validate()?;
        *self = candidate;
        Ok(())
    }

    fn validate(&self) -> CalInviteResult<()> {
        if self.title.trim().is_empty() {
            return Err(CalInviteError::Validation("Title is required".into()));
        }

        if !self.all_day && self.multi_day_sessions.is_empty() {
            if self.start_time.is_none() {
                return Err(CalInviteError::Validation(
                    "Start time is required for non-all-day events".into(),
                ));
            }
            if self.end_time.is_none() {
                return Err(CalInviteError::Validation(
                    "End time is required for non-all-day events".into(),
                ));
            }
        }

        Ok(())
    }

    /// The start/end pairs to render: the multi-day sessions if there are any,
    /// otherwise the single event-level pair.
    ///
    /// Recomputed on every call.
    pub fn sessions(&self) -> impl Iterator<Item = Session> + '_ {
        let single = if self.multi_day_sessions.is_empty() {
            self.start_time
                .zip(self.end_time)
                .map(|(start, end)| Session { start, end })
        } else {
            None
        };

        self.multi_day_sessions.iter().copied().chain(single)
    }

    /// Express `instant` in the event's timezone. UTC events get the instant back as-is.
    pub fn localize(&self, instant: DateTime<Utc>) -> DateTime<FixedOffset> {
        match self.timezone {
            EventTimezone::Utc => instant.fixed_offset(),
            EventTimezone::Named(tz) => instant.with_timezone(&tz).fixed_offset(),
            EventTimezone::Fixed(offset) => instant.with_timezone(&offset),
        }
    }

    /// Date range of an all-day event. A missing start is `now`, a missing end
    /// is one day after the start.
    pub fn all_day_bounds(&self, now: DateTime<Utc>) -> Session {
        let start = self.start_time.unwrap_or(now);
        let end = self.end_time.unwrap_or(start + Duration::days(1));
        Session { start, end }
    }

    /// Canonical JSON of every field, keys sorted, suitable for hashing.
    pub fn cache_fingerprint(&self) -> CalInviteResult<String> {
        let value = serde_json::to_value(EventAttributes::from(self.clone()))
            .map_err(|e| CalInviteError::Encoding(e.to_string()))?;
        Ok(canonicalize(value).to_string())
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.start_time
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.end_time
    }

    pub fn is_all_day(&self) -> bool {
        self.all_day
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn attendees(&self) -> &[String] {
        &self.attendees
    }

    pub fn show_attendees(&self) -> bool {
        self.show_attendees
    }

    pub fn timezone(&self) -> EventTimezone {
        self.timezone
    }

    pub fn multi_day_sessions(&self) -> &[Session] {
        &self.multi_day_sessions
    }
}

fn to_session(attrs: SessionAttributes) -> Session {
    Session {
        start: attrs.start_time.with_timezone(&Utc),
        end: attrs.end_time.with_timezone(&Utc),
    }
}

/// Rebuild every object with its keys in sorted order. `serde_json::Map` only
/// sorts while its `preserve_order` feature is off, and any crate in the graph
/// (`config` has a forwarding feature) can switch it on.
fn canonicalize(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let mut entries: Vec<_> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            serde_json::Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, canonicalize(v)))
                    .collect(),
            )
        }
        serde_json::Value::Array(items) => {
            serde_json::Value::Array(items.into_iter().map(canonicalize).collect())
        }
        other => other,
    }
}

impl TryFrom<EventAttributes> for Event {
    type Error = CalInviteError;

    fn try_from(attributes: EventAttributes) -> Result<Self, Self::Error> {
        Event::new(attributes)
    }
}

impl From<Event> for EventAttributes {
    fn from(event: Event) -> Self {
        EventAttributes {
            title: event.title,
            start_time: event.start_time.map(|t| t.fixed_offset()),
            end_time: event.end_time.map(|t| t.fixed_offset()),
            all_day: event.all_day,
            description: event.description,
            notes: event.notes,
            location: event.location,
            url: event.url,
            attendees: event.attendees,
            show_attendees: event.show_attendees,
            timezone: Some(event.timezone.to_string()),
            multi_day_sessions: event
                .multi_day_sessions
                .into_iter()
                .map(|s| SessionAttributes {
                    start_time: s.start.fixed_offset(),
                    end_time: s.end.fixed_offset(),
                })
                .collect(),
        }
    }
}

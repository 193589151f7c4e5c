//! Formatting helpers shared by the provider encoders: URL encoding, ICS
//! text escaping, timestamp profiles and description/location composition.

use std::fmt::Display;

use chrono::{DateTime, TimeZone, Utc};

use crate::event::Event;

/// Label put in front of the virtual meeting link when it is folded into a description.
pub const VIRTUAL_MEETING_LABEL: &str = "Virtual Meeting URL";

/// Percent-encode `value` as an `application/x-www-form-urlencoded` component (spaces become `+`).
pub fn url_encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// Escape a TEXT value per RFC 5545 §3.3.11. Absent input yields an empty string.
///
/// Carriage returns become `\r` so no bare CR lands in a content line.
pub fn escape_ics_text<'a>(value: impl Into<Option<&'a str>>) -> String {
    let Some(value) = value.into() else {
        return String::new();
    };

    let mut out = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            ',' => out.push_str("\\,"),
            ';' => out.push_str("\\;"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out
}

/// Inverse of `escape_ics_text`. Unknown escapes are kept verbatim.
pub fn unescape_ics_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some(',') => out.push(','),
            Some(';') => out.push(';'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// `YYYYMMDDTHHMMSSZ`
pub fn format_utc_timestamp(instant: &DateTime<Utc>) -> String {
    instant.format("%Y%m%dT%H%M%SZ").to_string()
}

/// `YYYY-MM-DDTHH:MM:SSZ`, the extended form used by the Outlook compose forms.
pub fn format_utc_timestamp_extended(instant: &DateTime<Utc>) -> String {
    instant.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// `YYYYMMDDTHHMMSS` in the instant's own offset, with no zone designator.
pub fn format_local_timestamp<Tz: TimeZone>(instant: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    instant.format("%Y%m%dT%H%M%S").to_string()
}

/// How a date-only value is spelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateStyle {
    /// `YYYYMMDD` (ICS, Google, Yahoo)
    Basic,
    /// `YYYY-MM-DD` (Outlook, Office365)
    Extended,
}

pub fn format_date_only<Tz: TimeZone>(instant: &DateTime<Tz>, style: DateStyle) -> String
where
    Tz::Offset: Display,
{
    match style {
        DateStyle::Basic => instant.format("%Y%m%d").to_string(),
        DateStyle::Extended => instant.format("%Y-%m-%d").to_string(),
    }
}

/// Description text: the raw description, then `Notes: ...`, then the virtual
/// meeting line when `include_url` is set. Blocks are separated by a blank line.
pub fn compose_description(event: &Event, include_url: bool) -> String {
    let mut parts: Vec<String> = Vec::new();

    if let Some(description) = event.description() {
        parts.push(description.to_string());
    }
    if let Some(notes) = event.notes() {
        parts.push(format!("Notes: {}", notes));
    }
    if include_url {
        if let Some(url) = event.url() {
            parts.push(format!("{}: {}", VIRTUAL_MEETING_LABEL, url));
        }
    }

    parts.join("\n\n")
}

/// Location with the meeting link folded in, for targets that have no separate URL field.
pub fn compose_location(event: &Event) -> String {
    match (event.location(), event.url()) {
        (Some(location), Some(url)) => format!("{}\n{}", location, url),
        (Some(location), None) => location.to_string(),
        (None, Some(url)) => url.to_string(),
        (None, None) => String::new(),
    }
}

/// Attendees to publish. Empty unless `show_attendees` is set.
pub fn filtered_attendees(event: &Event) -> &[String] {
    if event.show_attendees() {
        event.attendees()
    } else {
        &[]
    }
}

/// Ordered query-string builder. Insertion order is output order.
#[derive(Debug, Default, Clone)]
pub struct QueryParams {
    pairs: Vec<(&'static str, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a form-urlencoded value.
    pub fn push(&mut self, key: &'static str, value: &str) -> &mut Self {
        self.pairs.push((key, url_encode(value)));
        self
    }

    /// Add a value the caller built from URL-safe characters only.
    pub fn push_raw(&mut self, key: &'static str, value: impl Into<String>) -> &mut Self {
        self.pairs.push((key, value.into()));
        self
    }

    /// Add `value` unless it is absent or empty.
    pub fn push_opt(&mut self, key: &'static str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            self.push(key, value);
        }
        self
    }

    pub fn to_query(&self) -> String {
        self.pairs
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&")
    }

    pub fn to_url(&self, base: &str) -> String {
        format!("{}?{}", base, self.to_query())
    }
}

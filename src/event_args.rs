//! Event flags shared by `generate` and `download`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use cal_invite_core::{EventAttributes, EventTimezone, SessionAttributes};
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use clap::Args;

#[derive(Args, Debug, Default)]
pub struct EventArgs {
    /// Event title
    #[arg(short, long, required_unless_present = "from_file")]
    pub title: Option<String>,

    /// Start (RFC 3339, or e.g. "2025-03-20T15:00" in the event timezone)
    #[arg(short, long)]
    pub start: Option<String>,

    /// End date/time
    #[arg(short, long, conflicts_with = "duration")]
    pub end: Option<String>,

    /// Duration (e.g., "30m", "1h", "2h30m")
    #[arg(short, long, conflicts_with = "end")]
    pub duration: Option<String>,

    #[arg(long)]
    pub all_day: bool,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub notes: Option<String>,

    #[arg(short, long)]
    pub location: Option<String>,

    /// Virtual meeting link
    #[arg(long)]
    pub url: Option<String>,

    /// Attendee email (repeatable)
    #[arg(short, long = "attendee")]
    pub attendees: Vec<String>,

    /// Include attendees in the output
    #[arg(long)]
    pub show_attendees: bool,

    /// IANA name or +HH:MM (defaults to the configured timezone)
    #[arg(long)]
    pub timezone: Option<String>,

    /// One session of a multi-day event (repeatable)
    #[arg(long = "session", value_name = "START/END")]
    pub sessions: Vec<String>,

    /// Read event attributes from a JSON or TOML file instead of flags
    #[arg(long)]
    pub from_file: Option<PathBuf>,
}

impl EventArgs {
    /// Resolve flags (or the attribute file) into event attributes.
    /// `default_timezone` applies when none is given.
    pub fn into_attributes(self, default_timezone: &str) -> Result<EventAttributes> {
        if let Some(path) = &self.from_file {
            return load_attributes(path, default_timezone);
        }

        let timezone = self
            .timezone
            .unwrap_or_else(|| default_timezone.to_string());
        let tz: EventTimezone = timezone.parse()?;

        let start_time = self
            .start
            .as_deref()
            .map(|s| parse_time(s, tz))
            .transpose()?;

        let end_time = match (self.end.as_deref(), self.duration.as_deref(), start_time) {
            (Some(end), _, _) => Some(parse_time(end, tz)?),
            (None, Some(duration), Some(start)) => Some(
                start
                    .checked_add_signed(parse_duration(duration)?)
                    .ok_or_else(|| anyhow!("Duration too large: \"{}\"", duration))?,
            ),
            (None, Some(_), None) => anyhow::bail!("--duration needs --start"),
            // Timed events default to one hour
            (None, None, Some(start)) if !self.all_day => Some(start + Duration::hours(1)),
            _ => None,
        };

        let multi_day_sessions = self
            .sessions
            .iter()
            .map(|s| parse_session(s, tz))
            .collect::<Result<Vec<_>>>()?;

        Ok(EventAttributes {
            title: self.title.unwrap_or_default(),
            start_time,
            end_time,
            all_day: self.all_day,
            description: self.description,
            notes: self.notes,
            location: self.location,
            url: self.url,
            attendees: self.attendees,
            show_attendees: self.show_attendees,
            timezone: Some(timezone),
            multi_day_sessions,
        })
    }
}

/// `.json` files are parsed as JSON, anything else as TOML.
fn load_attributes(path: &Path, default_timezone: &str) -> Result<EventAttributes> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read {}", path.display()))?;

    let mut attributes: EventAttributes = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON in {}", path.display()))?,
        _ => toml::from_str(&content)
            .with_context(|| format!("Invalid TOML in {}", path.display()))?,
    };

    if attributes.timezone.is_none() {
        attributes.timezone = Some(default_timezone.to_string());
    }

    Ok(attributes)
}

/// Parse RFC 3339, or a local date/time interpreted in `tz`.
fn parse_time(input: &str, tz: EventTimezone) -> Result<DateTime<FixedOffset>> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt);
    }

    let naive = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(input, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| anyhow!("Could not parse date/time: \"{}\"", input))?;

    let local = match tz {
        EventTimezone::Utc => Some(Utc.from_utc_datetime(&naive).fixed_offset()),
        EventTimezone::Named(zone) => zone
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.fixed_offset()),
        EventTimezone::Fixed(offset) => offset.from_local_datetime(&naive).single(),
    };

    local.ok_or_else(|| anyhow!("\"{}\" does not exist in timezone {}", input, tz))
}

fn parse_duration(input: &str) -> Result<Duration> {
    let std_dur = humantime::parse_duration(input)
        .with_context(|| format!("Could not parse duration: \"{}\"", input))?;
    Duration::from_std(std_dur).context("Duration too large")
}

/// `START/END`
fn parse_session(input: &str, tz: EventTimezone) -> Result<SessionAttributes> {
    let (start, end) = input
        .split_once('/')
        .ok_or_else(|| anyhow!("Session must look like START/END: \"{}\"", input))?;

    Ok(SessionAttributes {
        start_time: parse_time(start, tz)?,
        end_time: parse_time(end, tz)?,
    })
}

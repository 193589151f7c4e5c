//! RFC 5545 iCalendar generation.
//!
//! Lines are CRLF-joined and never folded. Property order inside a VEVENT is
//! fixed: UID, DTSTAMP, DTSTART, DTEND, SUMMARY, then the optional
//! DESCRIPTION, LOCATION, URL and ATTENDEE lines.

use crate::clock::GenerateContext;
use crate::error::{CalInviteError, CalInviteResult};
use crate::event::{Event, Session};
use crate::format::{
    DateStyle, compose_description, escape_ics_text, filtered_attendees, format_date_only,
    format_local_timestamp, format_utc_timestamp,
};

use super::{Encoder, Timing};

pub const PRODID: &str = "-//CalInvite//EN";
pub const UID_DOMAIN: &str = "cal-invite";

const CRLF: &str = "\r\n";

/// Generic `.ics` content; serves both the `ical` and `ics` provider ids.
#[derive(Debug, Clone, Copy, Default)]
pub struct IcsEncoder;

impl Encoder for IcsEncoder {
    fn encode(&self, event: &Event, ctx: &GenerateContext) -> CalInviteResult<String> {
        let mut lines = vec![
            "BEGIN:VCALENDAR".to_string(),
            "VERSION:2.0".to_string(),
            format!("PRODID:{}", PRODID),
            "CALSCALE:GREGORIAN".to_string(),
            "METHOD:PUBLISH".to_string(),
        ];

        match Timing::of(event, ctx)? {
            Timing::AllDay(range) => {
                let dtstart = format!(
                    "DTSTART;VALUE=DATE:{}",
                    format_date_only(&range.start, DateStyle::Basic)
                );
                let dtend = format!(
                    "DTEND;VALUE=DATE:{}",
                    format_date_only(&range.end, DateStyle::Basic)
                );
                push_vevent(&mut lines, event, ctx, dtstart, dtend)?;
            }
            Timing::Timed(sessions) => {
                for Session { start, end } in sessions {
                    let tzid = event.timezone();
                    let dtstart = format!(
                        "DTSTART;TZID={}:{}",
                        tzid,
                        format_local_timestamp(&event.localize(start))
                    );
                    let dtend = format!(
                        "DTEND;TZID={}:{}",
                        tzid,
                        format_local_timestamp(&event.localize(end))
                    );
                    push_vevent(&mut lines, event, ctx, dtstart, dtend)?;
                }
            }
        }

        lines.push("END:VCALENDAR".to_string());
        Ok(lines.join(CRLF))
    }
}

fn push_vevent(
    lines: &mut Vec<String>,
    event: &Event,
    ctx: &GenerateContext,
    dtstart: String,
    dtend: String,
) -> CalInviteResult<()> {
    lines.push("BEGIN:VEVENT".to_string());
    lines.push(format!("UID:{}", generate_uid(ctx)));
    lines.push(format!("DTSTAMP:{}", format_utc_timestamp(&ctx.now())));
    lines.push(dtstart);
    lines.push(dtend);
    lines.push(format!("SUMMARY:{}", escape_ics_text(event.title())));

    let description = compose_description(event, true);
    if !description.is_empty() {
        lines.push(format!("DESCRIPTION:{}", escape_ics_text(description.as_str())));
    }

    if let Some(location) = event.location().filter(|l| !l.is_empty()) {
        lines.push(format!("LOCATION:{}", escape_ics_text(location)));
    }

    if let Some(url) = event.url() {
        lines.push(format!("URL:{}", single_line("url", url)?));
    }

    for attendee in filtered_attendees(event) {
        lines.push(format!(
            "ATTENDEE;RSVP=TRUE:mailto:{}",
            single_line("attendee", attendee.trim())?
        ));
    }

    lines.push("END:VEVENT".to_string());
    Ok(())
}

/// `{unix-seconds}-{16 hex chars}@cal-invite`, fresh for every VEVENT.
fn generate_uid(ctx: &GenerateContext) -> String {
    format!("{}-{}@{}", ctx.now().timestamp(), ctx.random_hex(8), UID_DOMAIN)
}

/// URI-valued properties are emitted verbatim, so they must not be able to
/// break out of their content line.
fn single_line<'a>(field: &str, value: &'a str) -> CalInviteResult<&'a str> {
    if value.is_empty() || value.chars().any(|c| c.is_control()) {
        return Err(CalInviteError::Encoding(format!(
            "{} {:?} cannot be written as a single content line",
            field, value
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventAttributes, SessionAttributes};
    use chrono::{DateTime, FixedOffset, TimeZone, Utc};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    fn ctx() -> GenerateContext {
        GenerateContext::fixed(now(), 42)
    }

    fn at(day: u32, h: u32) -> DateTime<FixedOffset> {
        Utc.with_ymd_and_hms(2024, 1, day, h, 0, 0).unwrap().fixed_offset()
    }

    fn meeting(attrs: EventAttributes) -> Event {
        Event::new(EventAttributes {
            title: "Test Meeting".to_string(),
            start_time: Some(at(1, 9)),
            end_time: Some(at(1, 10)),
            ..attrs
        })
        .unwrap()
    }

    fn vevent_lines(ics: &str) -> Vec<&str> {
        ics.split(CRLF)
            .skip_while(|l| *l != "BEGIN:VEVENT")
            .take_while(|l| *l != "END:VEVENT")
            .collect()
    }

    #[test]
    fn test_generate_ics_timed_event() {
        let ics = IcsEncoder.encode(&meeting(EventAttributes::default()), &ctx()).unwrap();

        assert!(ics.starts_with(
            "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//CalInvite//EN\r\nCALSCALE:GREGORIAN\r\nMETHOD:PUBLISH\r\nBEGIN:VEVENT\r\n"
        ));
        assert!(ics.ends_with("\r\nEND:VEVENT\r\nEND:VCALENDAR"));
        assert!(ics.contains("\r\nDTSTART;TZID=UTC:20240101T090000\r\n"), "{}", ics);
        assert!(ics.contains("\r\nDTEND;TZID=UTC:20240101T100000\r\n"), "{}", ics);
        assert!(ics.contains("\r\nSUMMARY:Test Meeting\r\n"), "{}", ics);
        assert!(ics.contains("\r\nDTSTAMP:20240315T120000Z\r\n"), "{}", ics);
        assert!(!ics.contains("DESCRIPTION"), "{}", ics);
        assert!(
            !ics.replace(CRLF, "").contains('\n'),
            "bare LF in output: {:?}",
            ics
        );
    }

    #[test]
    fn test_generate_ics_property_order() {
        let event = meeting(EventAttributes {
            description: Some("Agenda".to_string()),
            location: Some("Room 1".to_string()),
            url: Some("https://meet.test.com".to_string()),
            attendees: vec!["a@example.com".to_string()],
            show_attendees: true,
            ..Default::default()
        });

        let ics = IcsEncoder.encode(&event, &ctx()).unwrap();
        let names: Vec<&str> = vevent_lines(&ics)
            .iter()
            .map(|l| l.split([':', ';']).next().unwrap_or_default())
            .collect();

        assert_eq!(
            names,
            [
                "BEGIN", "UID", "DTSTAMP", "DTSTART", "DTEND", "SUMMARY", "DESCRIPTION",
                "LOCATION", "URL", "ATTENDEE"
            ]
        );
    }

    #[test]
    fn test_generate_ics_localizes_timed_events() {
        let event = meeting(EventAttributes {
            timezone: Some("America/New_York".to_string()),
            ..Default::default()
        });

        let ics = IcsEncoder.encode(&event, &ctx()).unwrap();
        assert!(
            ics.contains("DTSTART;TZID=America/New_York:20240101T040000"),
            "{}",
            ics
        );
        assert!(ics.contains("DTEND;TZID=America/New_York:20240101T050000"), "{}", ics);
    }

    #[test]
    fn test_generate_ics_escapes_text() {
        let event = meeting(EventAttributes {
            title: "Review; Q1, Q2".to_string(),
            description: Some("Line one\nLine two".to_string()),
            notes: Some("C:\\temp".to_string()),
            url: Some("https://meet.test.com/a,b".to_string()),
            ..Default::default()
        });

        let ics = IcsEncoder.encode(&event, &ctx()).unwrap();
        assert!(ics.contains("SUMMARY:Review\\; Q1\\, Q2\r\n"), "{}", ics);
        assert!(
            ics.contains(
                "DESCRIPTION:Line one\\nLine two\\n\\nNotes: C:\\\\temp\\n\\nVirtual Meeting URL: https://meet.test.com/a\\,b\r\n"
            ),
            "{}",
            ics
        );
        assert!(ics.contains("URL:https://meet.test.com/a,b\r\n"), "{}", ics);
    }

    #[test]
    fn test_generate_ics_all_day_event_has_value_date() {
        let event = Event::new(EventAttributes {
            title: "Holiday".to_string(),
            all_day: true,
            multi_day_sessions: vec![SessionAttributes {
                start_time: at(5, 9),
                end_time: at(5, 17),
            }],
            ..Default::default()
        })
        .unwrap();

        let ics = IcsEncoder.encode(&event, &ctx()).unwrap();
        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 1);
        assert!(ics.contains("DTSTART;VALUE=DATE:20240315\r\n"), "{}", ics);
        assert!(ics.contains("DTEND;VALUE=DATE:20240316\r\n"), "{}", ics);
        assert!(!ics.contains("TZID"), "{}", ics);
    }

    #[test]
    fn test_generate_ics_one_vevent_per_session_with_unique_uids() {
        let event = Event::new(EventAttributes {
            title: "Conference".to_string(),
            multi_day_sessions: (1..=3)
                .map(|d| SessionAttributes {
                    start_time: at(d, 9),
                    end_time: at(d, 17),
                })
                .collect(),
            ..Default::default()
        })
        .unwrap();

        let ics = IcsEncoder.encode(&event, &ctx()).unwrap();
        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 3);

        let uids: Vec<&str> = ics.split(CRLF).filter(|l| l.starts_with("UID:")).collect();
        assert_eq!(uids.len(), 3);
        for uid in &uids {
            let value = uid.trim_start_matches("UID:");
            let (prefix, domain) = value.split_once('@').unwrap();
            assert_eq!(domain, "cal-invite");
            let (secs, suffix) = prefix.split_once('-').unwrap();
            assert_eq!(secs, now().timestamp().to_string());
            assert_eq!(suffix.len(), 16);
            assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
        }
        assert_ne!(uids[0], uids[1]);
        assert_ne!(uids[1], uids[2]);
    }

    #[test]
    fn test_generate_ics_hides_attendees_unless_shown() {
        let hidden = meeting(EventAttributes {
            attendees: vec!["a@example.com".to_string(), "b@example.com".to_string()],
            ..Default::default()
        });
        let ics = IcsEncoder.encode(&hidden, &ctx()).unwrap();
        assert!(!ics.contains("ATTENDEE"), "{}", ics);

        let shown = meeting(EventAttributes {
            attendees: vec!["a@example.com".to_string(), "b@example.com".to_string()],
            show_attendees: true,
            ..Default::default()
        });
        let ics = IcsEncoder.encode(&shown, &ctx()).unwrap();
        assert!(ics.contains("ATTENDEE;RSVP=TRUE:mailto:a@example.com\r\n"));
        assert!(ics.contains("ATTENDEE;RSVP=TRUE:mailto:b@example.com\r\n"));
    }

    #[test]
    fn test_generate_ics_skips_empty_location() {
        let event = meeting(EventAttributes {
            location: Some(String::new()),
            ..Default::default()
        });

        let ics = IcsEncoder.encode(&event, &ctx()).unwrap();
        assert!(!ics.contains("LOCATION"), "{}", ics);
    }

    #[test]
    fn test_generate_ics_rejects_multiline_attendee() {
        let event = meeting(EventAttributes {
            attendees: vec!["a@example.com\r\nX-INJECTED:1".to_string()],
            show_attendees: true,
            ..Default::default()
        });

        let err = IcsEncoder.encode(&event, &ctx()).unwrap_err();
        assert!(matches!(err, CalInviteError::Encoding(_)), "{}", err);
    }
}

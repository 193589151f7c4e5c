//! Outlook compose-form URLs, for both outlook.live.com (personal accounts)
//! and outlook.office.com (Office365 / work accounts).

use crate::clock::GenerateContext;
use crate::error::CalInviteResult;
use crate::event::Event;
use crate::format::{
    DateStyle, QueryParams, compose_description, filtered_attendees, format_date_only,
    format_utc_timestamp_extended,
};

use super::{Encoder, Timing};

/// Personal Outlook.com accounts.
pub static OUTLOOK_LIVE: OutlookEncoder = OutlookEncoder {
    base_url: "https://outlook.live.com/calendar/0/action/compose",
    compose_path: "/calendar/0/action/compose",
};

/// Office365 work/school accounts.
pub static OFFICE365: OutlookEncoder = OutlookEncoder {
    base_url: "https://outlook.office.com/owa/",
    compose_path: "/calendar/action/compose",
};

/// Outlook deep link. Both Outlook flavours share the parameter set and only
/// differ in host and compose path.
///
/// The compose form takes a single range, so multi-day events use their first session.
#[derive(Debug, Clone, Copy)]
pub struct OutlookEncoder {
    base_url: &'static str,
    compose_path: &'static str,
}

impl Encoder for OutlookEncoder {
    fn encode(&self, event: &Event, ctx: &GenerateContext) -> CalInviteResult<String> {
        let mut params = QueryParams::new();
        params
            .push_raw("path", self.compose_path)
            .push("subject", event.title());

        match Timing::of(event, ctx)? {
            Timing::AllDay(range) => {
                params
                    .push_raw("allday", "true")
                    .push("startdt", &format_date_only(&range.start, DateStyle::Extended))
                    .push("enddt", &format_date_only(&range.end, DateStyle::Extended));
            }
            Timing::Timed(sessions) => {
                // Timing::Timed is never empty
                if let Some(first) = sessions.first() {
                    params
                        .push("startdt", &format_utc_timestamp_extended(&first.start))
                        .push("enddt", &format_utc_timestamp_extended(&first.end));
                }
            }
        }

        let body = compose_description(event, true);
        let to = filtered_attendees(event).join(";");

        params
            .push_opt("body", Some(&body))
            .push_opt("location", event.location())
            .push_opt("to", Some(&to));

        Ok(params.to_url(self.base_url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventAttributes, SessionAttributes};
    use chrono::{DateTime, FixedOffset, TimeZone, Utc};

    fn ctx() -> GenerateContext {
        GenerateContext::fixed(Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap(), 9)
    }

    fn hour(day: u32, h: u32) -> DateTime<FixedOffset> {
        Utc.with_ymd_and_hms(2024, 1, day, h, 0, 0).unwrap().fixed_offset()
    }

    fn full_event() -> Event {
        Event::new(EventAttributes {
            title: "Test Meeting".to_string(),
            start_time: Some(hour(1, 9)),
            end_time: Some(hour(1, 10)),
            description: Some("Test Description".to_string()),
            location: Some("Test Location".to_string()),
            url: Some("https://meet.test.com".to_string()),
            attendees: vec!["a@example.com".to_string(), "b@example.com".to_string()],
            show_attendees: true,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_outlook_calendar_url() {
        let url = OUTLOOK_LIVE.encode(&full_event(), &ctx()).unwrap();
        assert!(
            url.starts_with("https://outlook.live.com/calendar/0/action/compose?path=/calendar/0/action/compose&subject=Test+Meeting"),
            "{}",
            url
        );
        assert!(url.contains("&startdt=2024-01-01T09%3A00%3A00Z"), "{}", url);
        assert!(url.contains("&enddt=2024-01-01T10%3A00%3A00Z"), "{}", url);
        assert!(url.contains(
            "&body=Test+Description%0A%0AVirtual+Meeting+URL%3A+https%3A%2F%2Fmeet.test.com"
        ));
        assert!(url.contains("&location=Test+Location"), "{}", url);
        assert!(url.ends_with("&to=a%40example.com%3Bb%40example.com"), "{}", url);
        assert!(!url.contains("allday"), "{}", url);
    }

    #[test]
    fn test_office365_calendar_url() {
        let url = OFFICE365.encode(&full_event(), &ctx()).unwrap();
        assert!(
            url.starts_with("https://outlook.office.com/owa/?path=/calendar/action/compose&subject=Test+Meeting"),
            "{}",
            url
        );
        assert!(url.contains("startdt=2024-01-01T09%3A00%3A00Z"), "{}", url);
        assert!(url.contains("enddt=2024-01-01T10%3A00%3A00Z"), "{}", url);
        assert!(url.contains("body="), "{}", url);
        assert!(url.contains("location="), "{}", url);
    }

    #[test]
    fn test_all_day_uses_dates_and_flag() {
        let event = Event::new(EventAttributes {
            title: "Company Holiday".to_string(),
            all_day: true,
            start_time: Some(hour(1, 0)),
            ..Default::default()
        })
        .unwrap();

        let url = OUTLOOK_LIVE.encode(&event, &ctx()).unwrap();
        assert!(
            url.contains("&allday=true&startdt=2024-01-01&enddt=2024-01-02"),
            "{}",
            url
        );
    }

    #[test]
    fn test_multi_day_uses_first_session() {
        let event = Event::new(EventAttributes {
            title: "Conference".to_string(),
            multi_day_sessions: vec![
                SessionAttributes {
                    start_time: hour(3, 9),
                    end_time: hour(3, 17),
                },
                SessionAttributes {
                    start_time: hour(4, 9),
                    end_time: hour(4, 17),
                },
            ],
            ..Default::default()
        })
        .unwrap();

        let url = OFFICE365.encode(&event, &ctx()).unwrap();
        assert!(url.contains("startdt=2024-01-03T09%3A00%3A00Z"), "{}", url);
        assert!(url.contains("enddt=2024-01-03T17%3A00%3A00Z"), "{}", url);
        assert!(!url.contains("2024-01-04"), "{}", url);
    }

    #[test]
    fn test_absent_fields_are_omitted() {
        let event = Event::new(EventAttributes {
            title: "Bare".to_string(),
            start_time: Some(hour(1, 9)),
            end_time: Some(hour(1, 10)),
            attendees: vec!["hidden@example.com".to_string()],
            ..Default::default()
        })
        .unwrap();

        let url = OUTLOOK_LIVE.encode(&event, &ctx()).unwrap();
        for key in ["body=", "location=", "to="] {
            assert!(!url.contains(key), "{} should be omitted: {}", key, url);
        }
    }
}

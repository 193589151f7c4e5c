//! Yahoo Calendar URLs.

use crate::clock::GenerateContext;
use crate::error::CalInviteResult;
use crate::event::{Event, Session};
use crate::format::{
    DateStyle, QueryParams, compose_description, format_date_only, format_utc_timestamp,
};

use super::{Encoder, Timing};

const BASE_URL: &str = "https://calendar.yahoo.com/";

/// Yahoo has no multi-range form: multi-day events produce one URL per
/// session, newline separated. Attendees are never emitted.
#[derive(Debug, Clone, Copy, Default)]
pub struct YahooEncoder;

impl Encoder for YahooEncoder {
    fn encode(&self, event: &Event, ctx: &GenerateContext) -> CalInviteResult<String> {
        let urls = match Timing::of(event, ctx)? {
            Timing::AllDay(range) => vec![session_url(event, &range, true)],
            Timing::Timed(sessions) => sessions
                .iter()
                .map(|s| session_url(event, s, false))
                .collect(),
        };

        Ok(urls.join("\n"))
    }
}

fn session_url(event: &Event, session: &Session, all_day: bool) -> String {
    let (st, et) = if all_day {
        (
            format_date_only(&session.start, DateStyle::Basic),
            format_date_only(&session.end, DateStyle::Basic),
        )
    } else {
        (
            format_utc_timestamp(&session.start),
            format_utc_timestamp(&session.end),
        )
    };
    let desc = compose_description(event, true);
    let timezone = event.timezone().to_string();

    let mut params = QueryParams::new();
    params
        .push_raw("v", "60")
        .push_raw("view", "d")
        .push_raw("type", "20")
        .push("title", event.title())
        .push("st", &st)
        .push("et", &et)
        .push_opt("desc", Some(&desc))
        .push_opt("in_loc", event.location())
        .push("crnd", &timezone);

    if all_day {
        params.push_raw("allday", "true");
    }

    params.to_url(BASE_URL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventAttributes, SessionAttributes};
    use chrono::{DateTime, FixedOffset, TimeZone, Utc};

    fn ctx() -> GenerateContext {
        GenerateContext::fixed(Utc.with_ymd_and_hms(2024, 6, 30, 23, 0, 0).unwrap(), 5)
    }

    fn hour(day: u32, h: u32) -> DateTime<FixedOffset> {
        Utc.with_ymd_and_hms(2024, 4, day, h, 0, 0).unwrap().fixed_offset()
    }

    #[test]
    fn test_yahoo_calendar_url() {
        let event = Event::new(EventAttributes {
            title: "Test Meeting".to_string(),
            start_time: Some(hour(1, 9)),
            end_time: Some(hour(1, 10)),
            description: Some("Weekly sync".to_string()),
            location: Some("Test Location".to_string()),
            url: Some("https://meet.test.com".to_string()),
            attendees: vec!["a@example.com".to_string()],
            show_attendees: true,
            timezone: Some("America/New_York".to_string()),
            ..Default::default()
        })
        .unwrap();

        let url = YahooEncoder.encode(&event, &ctx()).unwrap();
        assert_eq!(
            url,
            "https://calendar.yahoo.com/?v=60&view=d&type=20&title=Test+Meeting\
             &st=20240401T090000Z&et=20240401T100000Z\
             &desc=Weekly+sync%0A%0AVirtual+Meeting+URL%3A+https%3A%2F%2Fmeet.test.com\
             &in_loc=Test+Location&crnd=America%2FNew_York"
        );
        assert!(!url.contains("example.com"), "attendees must not be emitted");
    }

    #[test]
    fn test_all_day_event() {
        let event = Event::new(EventAttributes {
            title: "Offsite".to_string(),
            all_day: true,
            ..Default::default()
        })
        .unwrap();

        let url = YahooEncoder.encode(&event, &ctx()).unwrap();
        assert!(url.contains("&st=20240630&et=20240701"), "{}", url);
        assert!(url.ends_with("&crnd=UTC&allday=true"), "{}", url);
    }

    #[test]
    fn test_multi_day_produces_one_url_per_session() {
        let event = Event::new(EventAttributes {
            title: "Conference".to_string(),
            multi_day_sessions: vec![
                SessionAttributes {
                    start_time: hour(1, 9),
                    end_time: hour(1, 17),
                },
                SessionAttributes {
                    start_time: hour(2, 9),
                    end_time: hour(2, 17),
                },
            ],
            ..Default::default()
        })
        .unwrap();

        let output = YahooEncoder.encode(&event, &ctx()).unwrap();
        let urls: Vec<_> = output.lines().collect();
        assert_eq!(urls.len(), 2, "{}", output);
        assert!(urls[0].contains("st=20240401T090000Z&et=20240401T170000Z"));
        assert!(urls[1].contains("st=20240402T090000Z&et=20240402T170000Z"));
    }
}

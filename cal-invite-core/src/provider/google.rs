//! Google Calendar "render" template URLs.

use crate::clock::GenerateContext;
use crate::error::CalInviteResult;
use crate::event::{Event, Session};
use crate::format::{
    DateStyle, QueryParams, compose_description, filtered_attendees, format_date_only,
    format_utc_timestamp,
};

use super::{Encoder, Timing};

const BASE_URL: &str = "https://calendar.google.com/calendar/render";

/// Builds `calendar.google.com/calendar/render?action=TEMPLATE...` links.
///
/// Timed events use UTC instants; multi-day sessions become a comma-separated
/// list of ranges in `dates`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoogleEncoder;

impl Encoder for GoogleEncoder {
    fn encode(&self, event: &Event, ctx: &GenerateContext) -> CalInviteResult<String> {
        let dates = match Timing::of(event, ctx)? {
            Timing::AllDay(Session { start, end }) => format!(
                "{}/{}",
                format_date_only(&start, DateStyle::Basic),
                format_date_only(&end, DateStyle::Basic)
            ),
            Timing::Timed(sessions) => sessions
                .iter()
                .map(|s| {
                    format!(
                        "{}/{}",
                        format_utc_timestamp(&s.start),
                        format_utc_timestamp(&s.end)
                    )
                })
                .collect::<Vec<_>>()
                .join(","),
        };

        let details = compose_description(event, true);
        let attendees = filtered_attendees(event).join(",");

        let mut params = QueryParams::new();
        params
            .push_raw("action", "TEMPLATE")
            .push("text", event.title())
            .push_raw("dates", dates)
            .push_opt("details", Some(&details))
            .push_opt("location", event.location())
            .push_opt("add", Some(&attendees));

        Ok(params.to_url(BASE_URL))
    }
}

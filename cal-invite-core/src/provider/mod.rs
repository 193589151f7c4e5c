//! Provider encoders and the registry that dispatches to them.
//!
//! Each target calendar system has one `Encoder`. A `Provider` is the typed
//! identifier callers select by; `Provider::encoder` is the registry.

mod google;
mod ics;
mod outlook;
mod yahoo;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clock::GenerateContext;
use crate::error::{CalInviteError, CalInviteResult};
use crate::event::{Event, Session};

pub use google::GoogleEncoder;
pub use ics::{IcsEncoder, PRODID, UID_DOMAIN};
pub use outlook::{OFFICE365, OUTLOOK_LIVE, OutlookEncoder};
pub use yahoo::YahooEncoder;

/// Turns an event into a provider-specific string (URL or ICS text).
pub trait Encoder: Send + Sync {
    fn encode(&self, event: &Event, ctx: &GenerateContext) -> CalInviteResult<String>;
}

/// Supported targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Google,
    Outlook,
    Office365,
    Yahoo,
    Ical,
    Ics,
}

impl Provider {
    pub const ALL: [Provider; 6] = [
        Provider::Google,
        Provider::Outlook,
        Provider::Office365,
        Provider::Yahoo,
        Provider::Ical,
        Provider::Ics,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Provider::Google => "google",
            Provider::Outlook => "outlook",
            Provider::Office365 => "office365",
            Provider::Yahoo => "yahoo",
            Provider::Ical => "ical",
            Provider::Ics => "ics",
        }
    }

    /// True for providers that produce an "add to calendar" web URL.
    pub fn is_web(&self) -> bool {
        !matches!(self, Provider::Ical | Provider::Ics)
    }

    pub fn encoder(&self) -> &'static dyn Encoder {
        match self {
            Provider::Google => &GoogleEncoder,
            Provider::Outlook => &OUTLOOK_LIVE,
            Provider::Office365 => &OFFICE365,
            Provider::Yahoo => &YahooEncoder,
            Provider::Ical | Provider::Ics => &IcsEncoder,
        }
    }
}

impl FromStr for Provider {
    type Err = CalInviteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim().to_ascii_lowercase();
        Provider::ALL
            .into_iter()
            .find(|p| p.id() == token)
            .ok_or_else(|| CalInviteError::UnknownProvider(s.to_string()))
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Generate the output for `provider_id` using the real clock and OS randomness.
pub fn generate(event: &Event, provider_id: &str) -> CalInviteResult<String> {
    let provider: Provider = provider_id.parse()?;
    generate_with(event, provider, &GenerateContext::system())
}

/// Generate the output for `provider` with an explicit clock/random source.
pub fn generate_with(
    event: &Event,
    provider: Provider,
    ctx: &GenerateContext,
) -> CalInviteResult<String> {
    debug!(
        provider = %provider,
        title = event.title(),
        sessions = event.sessions().count(),
        "encoding event"
    );
    let output = provider.encoder().encode(event, ctx)?;
    debug!(provider = %provider, bytes = output.len(), "encoded event");
    Ok(output)
}

/// The shape an event is rendered in. All-day wins over multi-session.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Timing {
    AllDay(Session),
    Timed(Vec<Session>),
}

impl Timing {
    pub(crate) fn of(event: &Event, ctx: &GenerateContext) -> CalInviteResult<Self> {
        if event.is_all_day() {
            return Ok(Timing::AllDay(event.all_day_bounds(ctx.now())));
        }

        if !event.multi_day_sessions().is_empty() {
            return Ok(Timing::Timed(event.multi_day_sessions().to_vec()));
        }

        // Validated events always have both; re-checked since encoders can be
        // handed any Event value.
        let start = event
            .start_time()
            .ok_or(CalInviteError::MissingRequiredField("start_time"))?;
        let end = event
            .end_time()
            .ok_or(CalInviteError::MissingRequiredField("end_time"))?;

        Ok(Timing::Timed(vec![Session { start, end }]))
    }
}

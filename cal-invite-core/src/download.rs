//! Helpers for serving generated ICS content as a file download.

use chrono::{DateTime, Utc};

use crate::clock::GenerateContext;
use crate::format::{DateStyle, format_date_only};

pub const CONTENT_TYPE: &str = "text/calendar; charset=UTF-8";

/// Replace every character outside `[0-9A-Za-z.-]` with `_`.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// `{lowercased title}_{YYYYMMDD}.ics`, sanitized.
pub fn download_filename(title: &str, date: &DateTime<Utc>) -> String {
    sanitize_filename(&format!(
        "{}_{}.ics",
        title.to_lowercase(),
        format_date_only(date, DateStyle::Basic)
    ))
}

/// HTTP headers for an attachment download, in emission order.
pub fn headers(filename: &str) -> Vec<(&'static str, String)> {
    vec![
        ("Content-Type", CONTENT_TYPE.to_string()),
        (
            "Content-Disposition",
            format!("attachment; filename={}", sanitize_filename(filename)),
        ),
    ]
}

/// ICS content bundled with the file name and headers it should be served under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IcsDownload {
    pub content: String,
    pub filename: String,
    pub headers: Vec<(&'static str, String)>,
}

pub fn wrap_for_download(content: String, title: &str, ctx: &GenerateContext) -> IcsDownload {
    let filename = download_filename(title, &ctx.now());
    let headers = headers(&filename);

    IcsDownload {
        content,
        filename,
        headers,
    }
}

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cal_invite_core::config::CalInviteConfig;
use cal_invite_core::download::wrap_for_download;
use cal_invite_core::{GenerateContext, Provider, build_event, generate_with};
use owo_colors::OwoColorize;
use tracing::debug;

use crate::event_args::EventArgs;

pub fn run(args: EventArgs, out_dir: Option<PathBuf>, config: &CalInviteConfig) -> Result<()> {
    let out_dir = out_dir.unwrap_or_else(|| PathBuf::from("."));
    let path = write_ics(args, &out_dir, &config.timezone, &GenerateContext::system())?;

    println!("{}", format!("  Saved: {}", path.display()).green());

    Ok(())
}

/// Generate the ICS and write it under its download filename in `out_dir`.
fn write_ics(
    args: EventArgs,
    out_dir: &Path,
    default_timezone: &str,
    ctx: &GenerateContext,
) -> Result<PathBuf> {
    let event = build_event(args.into_attributes(default_timezone)?)?;
    let content = generate_with(&event, Provider::Ics, ctx)?;
    let download = wrap_for_download(content, event.title(), ctx);

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Could not create {}", out_dir.display()))?;

    let path = out_dir.join(&download.filename);
    std::fs::write(&path, download.content)
        .with_context(|| format!("Could not write {}", path.display()))?;
    debug!(path = %path.display(), "wrote ics file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn write_ics_uses_download_filename() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = GenerateContext::fixed(Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(), 4);
        let args = EventArgs {
            title: Some("Team Offsite!".to_string()),
            start: Some("2025-03-20T09:00".to_string()),
            end: Some("2025-03-20T17:00".to_string()),
            ..Default::default()
        };

        let path = write_ics(args, &dir.path().join("out"), "UTC", &ctx).unwrap();

        assert_eq!(
            path.file_name().and_then(|n| n.to_str()),
            Some("team_offsite__20250301.ics")
        );
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("BEGIN:VCALENDAR\r\n"));
        assert!(contents.contains("DTSTART;TZID=UTC:20250320T090000"), "{}", contents);
    }

    #[test]
    fn write_ics_rejects_invalid_event() {
        let dir = tempfile::tempdir().unwrap();
        let args = EventArgs {
            title: Some("No start".to_string()),
            ..Default::default()
        };

        let err = write_ics(args, dir.path(), "UTC", &GenerateContext::system()).unwrap_err();
        assert!(err.to_string().contains("Start time is required"), "{}", err);
    }
}

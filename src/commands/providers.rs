use anyhow::Result;
use cal_invite_core::Provider;
use owo_colors::OwoColorize;

pub fn run() -> Result<()> {
    for provider in Provider::ALL {
        let kind = if provider.is_web() {
            "web URL"
        } else {
            "iCalendar (.ics)"
        };
        println!("  {:<10} {}", provider.id().bold(), kind.dimmed());
    }

    Ok(())
}

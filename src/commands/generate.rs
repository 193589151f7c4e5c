use anyhow::Result;
use cal_invite_core::config::CalInviteConfig;
use cal_invite_core::{GenerateContext, Provider, build_event, generate_with};

use crate::event_args::EventArgs;

pub fn run(provider: &str, args: EventArgs, config: &CalInviteConfig) -> Result<()> {
    let provider = resolve_provider(provider)?;
    let event = build_event(args.into_attributes(&config.timezone)?)?;

    let output = generate_with(&event, provider, &GenerateContext::system())?;
    println!("{}", output);

    Ok(())
}

fn resolve_provider(name: &str) -> Result<Provider> {
    name.parse().map_err(|e| {
        let available: Vec<_> = Provider::ALL.iter().map(|p| p.id()).collect();
        anyhow::anyhow!("{}. Available: {}", e, available.join(", "))
    })
}
